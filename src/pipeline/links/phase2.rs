//! 阶段二：client-link agent的脚本化多轮对话

use anyhow::Result;
use chrono::Utc;
use uuid::Uuid;

use crate::llm::events::ChatTurn;
use crate::pipeline::context::PipelineContext;
use crate::pipeline::extract::ToolCallLog;
use crate::pipeline::links::agents::client_link;
use crate::pipeline::merge::apply_modifications;
use crate::pipeline::types::{ClientLinkPlacement, OrchestrationInput, Phase2Result};
use crate::session::{SessionStatus, SessionUpdate};

/// 固定的refinement脚本：初始放置之后恰好三轮追问
const REFINEMENT_SCRIPT: [&str; 3] = [
    "审视你当前的放置方案：锚文本是否自然融入句子？改写句读起来是否通顺？如需改进，请用 place_client_link 提交新的方案。",
    "检查放置位置的上下文：该段落与客户业务的关联是否足够强？是否存在关联更强的段落？如有更好的位置，请用 place_client_link 提交新的方案。",
    "最后一轮确认：确保改写句保留原句的事实与语气，锚文本自然且不过长。请用 place_client_link 提交你的最终方案，或说明维持现有方案的理由。",
];

/// 执行阶段二
///
/// 单一agent在一条不断演进的会话历史上进行"初始放置+三轮追问"的
/// 固定脚本对话，每轮都携带此前全部历史。每轮至多更新一个候选放置
/// 方案，后轮覆盖前轮（overwrite-by-recency），只有最终方案落到正文。
/// 阶段内唯一agent失败即阶段失败。
pub async fn execute(
    ctx: &PipelineContext,
    session_id: Uuid,
    input: &OrchestrationInput,
    article: &str,
) -> Result<(String, Phase2Result)> {
    ctx.update_session(
        session_id,
        SessionUpdate {
            status: Some(SessionStatus::Phase2),
            phase2_started_at: Some(Utc::now()),
            ..Default::default()
        },
    )
    .await?;
    ctx.report(session_id, "phase2", "client-link agent开始多轮放置对话").await;

    let definition = client_link::agent(input);
    let mut history: Vec<ChatTurn> = Vec::new();
    let mut placement: Option<ClientLinkPlacement> = None;
    let mut prompt = client_link::opening_prompt(article);
    let mut turns = 0;

    for round in 0..=REFINEMENT_SCRIPT.len() {
        let run = ctx.runtime.run(&definition, &prompt, &history).await?;
        turns += 1;

        if let Some(updated) =
            ToolCallLog::collect(&run).last_as::<ClientLinkPlacement>("place_client_link")
        {
            ctx.report(
                session_id,
                "phase2",
                &format!("第 {} 轮提交放置方案：锚文本「{}」", turns, updated.anchor_text),
            )
            .await;
            placement = Some(updated);
        }

        // 回复文本进入会话历史，是跨轮refinement的载体
        let reply = run.final_message().unwrap_or_default().to_string();
        history.push(ChatTurn::user(prompt.clone()));
        history.push(ChatTurn::assistant(reply));

        if round < REFINEMENT_SCRIPT.len() {
            prompt = REFINEMENT_SCRIPT[round].to_string();
        }
    }

    if placement.is_none() {
        ctx.report(session_id, "phase2", "对话结束但agent未提交任何放置方案").await;
    }

    let modifications: Vec<_> = placement
        .iter()
        .map(ClientLinkPlacement::to_modification)
        .collect();
    let outcome = apply_modifications(article, &modifications);

    let result = Phase2Result {
        client_link: placement,
        refinement_turns: turns,
    };

    ctx.update_session(
        session_id,
        SessionUpdate {
            article_after_phase2: Some(outcome.document.clone()),
            phase2_result: Some(serde_json::to_value(&result)?),
            phase2_completed_at: Some(Utc::now()),
            ..Default::default()
        },
    )
    .await?;
    ctx.report(session_id, "phase2", "阶段二完成").await;

    Ok((outcome.document, result))
}
