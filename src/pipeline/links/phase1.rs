//! 阶段一：并行运行internal-links与client-mention agent

use anyhow::Result;
use chrono::Utc;
use uuid::Uuid;

use crate::pipeline::context::PipelineContext;
use crate::pipeline::extract::ToolCallLog;
use crate::pipeline::links::agents::{client_mention, internal_links};
use crate::pipeline::merge::{TextModification, apply_modifications};
use crate::pipeline::types::{ClientMention, InternalLink, OrchestrationInput, Phase1Result};
use crate::session::{SessionStatus, SessionUpdate};

/// 执行阶段一
///
/// 两个agent并行fan-out；单个agent失败不中止兄弟agent，失败方的
/// 贡献按空结果处理。合并顺序固定为agent声明顺序（先internal-links
/// 后client-mention），与网络返回先后无关，保证产出确定性。
pub async fn execute(
    ctx: &PipelineContext,
    session_id: Uuid,
    input: &OrchestrationInput,
    article: &str,
) -> Result<(String, Phase1Result)> {
    ctx.update_session(
        session_id,
        SessionUpdate {
            status: Some(SessionStatus::Phase1),
            phase1_started_at: Some(Utc::now()),
            ..Default::default()
        },
    )
    .await?;
    ctx.report(
        session_id,
        "phase1",
        "并行运行internal-links与client-mention agent",
    )
    .await;

    let internal_definition = internal_links::agent(input);
    let mention_definition = client_mention::agent(input);
    let internal_prompt = internal_links::user_prompt(article);
    let mention_prompt = client_mention::user_prompt(article);

    let (internal_outcome, mention_outcome) = futures::join!(
        ctx.runtime.run(&internal_definition, &internal_prompt, &[]),
        ctx.runtime.run(&mention_definition, &mention_prompt, &[]),
    );

    let internal_links: Vec<InternalLink> = match internal_outcome {
        Ok(run) => ToolCallLog::collect(&run).drain_as("insert_internal_link"),
        Err(e) => {
            ctx.report(
                session_id,
                "phase1",
                &format!("internal-links agent失败，按空结果处理: {}", e),
            )
            .await;
            Vec::new()
        }
    };
    let client_mentions: Vec<ClientMention> = match mention_outcome {
        Ok(run) => ToolCallLog::collect(&run).drain_as("add_client_mention"),
        Err(e) => {
            ctx.report(
                session_id,
                "phase1",
                &format!("client-mention agent失败，按空结果处理: {}", e),
            )
            .await;
            Vec::new()
        }
    };

    let mut modifications: Vec<TextModification> = internal_links
        .iter()
        .map(InternalLink::to_modification)
        .collect();
    modifications.extend(client_mentions.iter().map(ClientMention::to_modification));

    let outcome = apply_modifications(article, &modifications);
    for skipped in &outcome.skipped {
        ctx.report(
            session_id,
            "phase1",
            &format!("锚点未命中，跳过一条{:?}修改: {}", skipped.source, skipped.anchor),
        )
        .await;
    }

    let result = Phase1Result {
        internal_links,
        client_mentions,
    };

    ctx.update_session(
        session_id,
        SessionUpdate {
            article_after_phase1: Some(outcome.document.clone()),
            phase1_result: Some(serde_json::to_value(&result)?),
            phase1_completed_at: Some(Utc::now()),
            ..Default::default()
        },
    )
    .await?;
    ctx.report(
        session_id,
        "phase1",
        &format!(
            "阶段一完成：站内链接 {} 条，品牌提及 {} 条",
            result.internal_links.len(),
            result.client_mentions.len()
        ),
    )
    .await;

    Ok((outcome.document, result))
}
