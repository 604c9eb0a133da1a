//! 阶段三：并行运行images、link-requests与url-suggestion agent

use anyhow::Result;
use chrono::Utc;
use uuid::Uuid;

use crate::pipeline::context::PipelineContext;
use crate::pipeline::extract::ToolCallLog;
use crate::pipeline::links::agents::{images, link_requests, url_suggestion};
use crate::pipeline::merge::{TextModification, apply_modifications};
use crate::pipeline::types::{
    ImageSuggestion, LinkRequest, OrchestrationInput, Phase3Result, UrlSuggestion,
};
use crate::session::{SessionStatus, SessionUpdate};

/// 执行阶段三
///
/// 三个agent并行fan-out，失败隔离策略与阶段一一致。配图建议中带
/// 位置锚点的条目按声明顺序并入正文，互链请求与URL建议作为附属
/// 产物随结果返回。
pub async fn execute(
    ctx: &PipelineContext,
    session_id: Uuid,
    input: &OrchestrationInput,
    article: &str,
) -> Result<(String, Phase3Result)> {
    ctx.update_session(
        session_id,
        SessionUpdate {
            status: Some(SessionStatus::Phase3),
            phase3_started_at: Some(Utc::now()),
            ..Default::default()
        },
    )
    .await?;
    ctx.report(
        session_id,
        "phase3",
        "并行运行images、link-requests与url-suggestion agent",
    )
    .await;

    let images_definition = images::agent(input);
    let requests_definition = link_requests::agent(input);
    let url_definition = url_suggestion::agent(input);
    let images_prompt = images::user_prompt(article);
    let requests_prompt = link_requests::user_prompt(article);
    let url_prompt = url_suggestion::user_prompt(article);

    let (images_outcome, requests_outcome, url_outcome) = futures::join!(
        ctx.runtime.run(&images_definition, &images_prompt, &[]),
        ctx.runtime.run(&requests_definition, &requests_prompt, &[]),
        ctx.runtime.run(&url_definition, &url_prompt, &[]),
    );

    let image_suggestions: Vec<ImageSuggestion> = match images_outcome {
        Ok(run) => ToolCallLog::collect(&run).drain_as("suggest_image"),
        Err(e) => {
            ctx.report(
                session_id,
                "phase3",
                &format!("images agent失败，按空结果处理: {}", e),
            )
            .await;
            Vec::new()
        }
    };
    let link_request_items: Vec<LinkRequest> = match requests_outcome {
        Ok(run) => ToolCallLog::collect(&run).drain_as("request_link"),
        Err(e) => {
            ctx.report(
                session_id,
                "phase3",
                &format!("link-requests agent失败，按空结果处理: {}", e),
            )
            .await;
            Vec::new()
        }
    };
    let url_pick: Option<UrlSuggestion> = match url_outcome {
        Ok(run) => ToolCallLog::collect(&run).last_as("suggest_url"),
        Err(e) => {
            ctx.report(
                session_id,
                "phase3",
                &format!("url-suggestion agent失败，按空结果处理: {}", e),
            )
            .await;
            None
        }
    };

    let modifications: Vec<TextModification> = image_suggestions
        .iter()
        .filter_map(ImageSuggestion::to_modification)
        .collect();
    let outcome = apply_modifications(article, &modifications);

    let result = Phase3Result {
        images: image_suggestions,
        link_requests: link_request_items,
        url_suggestion: url_pick,
    };

    ctx.update_session(
        session_id,
        SessionUpdate {
            final_article: Some(outcome.document.clone()),
            phase3_result: Some(serde_json::to_value(&result)?),
            phase3_completed_at: Some(Utc::now()),
            ..Default::default()
        },
    )
    .await?;
    ctx.report(
        session_id,
        "phase3",
        &format!(
            "阶段三完成：配图 {} 条，互链请求 {} 条",
            result.images.len(),
            result.link_requests.len()
        ),
    )
    .await;

    Ok((outcome.document, result))
}
