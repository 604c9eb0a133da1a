//! 大纲生成流水线
//!
//! triage → {clarify(暂停) → } instruction → deep-research。
//! 澄清暂停是整个引擎唯一一处真正的挂起：流水线持久化continuation
//! 状态后提前返回，等待调用方显式携带答案恢复，而不是被自动重入。
//! 与links流水线不同，本流水线的失败在标记会话后以错误形式重新抛出。

use anyhow::{Result, anyhow};
use schemars::schema_for;
use std::collections::HashSet;
use uuid::Uuid;

use crate::llm::events::ChatTurn;
use crate::pipeline::context::PipelineContext;
use crate::pipeline::types::{
    ClarifyingQuestions, OutlineInput, OutlineResult, OutlineStartResult, ResearchBrief,
    TriageDecision,
};
use crate::session::{AgentState, SessionError, SessionRecord, SessionStatus, SessionUpdate};

pub mod agents;

/// 启动大纲生成
///
/// 一次调用要么驶向完成（needs_clarification=false且outline就绪），
/// 要么停在澄清暂停点（needs_clarification=true且问题清单就绪）。
pub async fn start(ctx: &PipelineContext, input: OutlineInput) -> Result<OutlineStartResult> {
    // 同一parent下多次生成以version区分，max+1分配
    let version = match &input.parent_workflow_id {
        Some(parent) => ctx
            .store
            .latest_version_for_parent(parent)
            .await?
            .map_or(1, |latest| latest + 1),
        None => 1,
    };

    let mut record = SessionRecord::new(
        SessionStatus::Triaging,
        input.parent_workflow_id.clone(),
    );
    record.version = version;
    record.outline_prompt = Some(input.prompt.clone());
    record.input = serde_json::to_value(&input).ok();
    let session_id = record.id;

    println!(
        "🚀 开始执行Weaver大纲生成流程...会话 {} (v{})",
        session_id, version
    );
    ctx.store.create(record).await?;

    match drive_start(ctx, session_id, &input.prompt).await {
        Ok(result) => Ok(result),
        Err(e) => Err(mark_failed(ctx, session_id, e).await),
    }
}

/// 携带澄清答案恢复暂停的会话
///
/// 会话不存在、不处于澄清暂停、或continuation状态缺失，都是
/// 可恢复的报告型错误（"session not found or invalid state"）。
pub async fn continue_with_answers(
    ctx: &PipelineContext,
    session_id: Uuid,
    answers: &[String],
) -> Result<OutlineResult> {
    let record = ctx
        .store
        .get(session_id)
        .await?
        .ok_or(SessionError::NotFound(session_id))?;

    if record.status != SessionStatus::Clarifying {
        return Err(SessionError::InvalidState(session_id).into());
    }
    let state = record
        .agent_state
        .ok_or(SessionError::InvalidState(session_id))?;
    let topic = record
        .outline_prompt
        .ok_or(SessionError::InvalidState(session_id))?;

    println!(
        "🔄 恢复会话 {}，携带 {} 条澄清答案",
        session_id,
        answers.len()
    );

    let mut history = state.history;
    history.push(ChatTurn::user(format_answers(
        &state.pending_questions,
        answers,
    )));

    match run_research(ctx, session_id, &topic, history, Some(answers)).await {
        Ok((outline, citations)) => Ok(OutlineResult { outline, citations }),
        Err(e) => Err(mark_failed(ctx, session_id, e).await),
    }
}

/// 从triage决策驶向暂停点或完成
async fn drive_start(
    ctx: &PipelineContext,
    session_id: Uuid,
    topic: &str,
) -> Result<OutlineStartResult> {
    ctx.report(session_id, "triaging", "triage agent评估主题清晰度").await;

    let triage_definition = agents::triage::agent();
    let schema = serde_json::to_value(schema_for!(TriageDecision))?;
    let decision_value = ctx
        .runtime
        .extract(
            &triage_definition,
            &agents::triage::user_prompt(topic),
            &schema,
        )
        .await?;
    let decision: TriageDecision = serde_json::from_value(decision_value)?;

    let mut history = vec![ChatTurn::user(topic.to_string())];

    if decision.needs_clarification {
        ctx.report(session_id, "clarifying", "主题信息不足，生成澄清问题").await;

        let clarifier_definition = agents::clarifier::agent();
        let schema = serde_json::to_value(schema_for!(ClarifyingQuestions))?;
        let questions_value = ctx
            .runtime
            .extract(
                &clarifier_definition,
                &agents::clarifier::user_prompt(topic),
                &schema,
            )
            .await?;
        let clarifying: ClarifyingQuestions = serde_json::from_value(questions_value)?;
        history.push(ChatTurn::assistant(clarifying.questions.join("\n")));

        // 真正的挂起点：持久化continuation状态后提前返回
        let state = AgentState::awaiting_answers(history, clarifying.questions.clone());
        ctx.update_session(
            session_id,
            SessionUpdate {
                status: Some(SessionStatus::Clarifying),
                agent_state: Some(state),
                ..Default::default()
            },
        )
        .await?;
        ctx.report(session_id, "clarifying", "等待调用方补充澄清答案").await;

        return Ok(OutlineStartResult {
            session_id,
            needs_clarification: true,
            questions: clarifying.questions,
            outline: None,
            citations: Vec::new(),
        });
    }

    let (outline, citations) = run_research(ctx, session_id, topic, history, None).await?;
    Ok(OutlineStartResult {
        session_id,
        needs_clarification: false,
        questions: Vec::new(),
        outline: Some(outline),
        citations,
    })
}

/// 指令构建 + 深度调研，驶向完成
async fn run_research(
    ctx: &PipelineContext,
    session_id: Uuid,
    topic: &str,
    history: Vec<ChatTurn>,
    answers: Option<&[String]>,
) -> Result<(String, Vec<String>)> {
    ctx.report(session_id, "researching", "构建调研指令").await;

    let instruction_definition = agents::instruction_builder::agent();
    let schema = serde_json::to_value(schema_for!(ResearchBrief))?;
    let brief_value = ctx
        .runtime
        .extract(
            &instruction_definition,
            &agents::instruction_builder::user_prompt(topic, answers),
            &schema,
        )
        .await?;
    let brief: ResearchBrief = serde_json::from_value(brief_value)?;

    ctx.update_session(session_id, SessionUpdate::with_status(SessionStatus::Researching))
        .await?;
    ctx.report(session_id, "researching", "deep-research agent开始长文调研").await;

    let research_definition =
        agents::deep_research::agent(ctx.config.llm.disable_preset_tools);
    let run = ctx
        .runtime
        .run(
            &research_definition,
            &agents::deep_research::user_prompt(&brief.brief),
            &history,
        )
        .await?;

    let outline = run
        .final_message()
        .map(str::to_string)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| anyhow!("deep-research agent未产出大纲"))?;
    let citations = extract_citations(&outline);

    ctx.update_session(
        session_id,
        SessionUpdate {
            status: Some(SessionStatus::Completed),
            final_outline: Some(outline.clone()),
            citations: Some(citations.clone()),
            ..Default::default()
        },
    )
    .await?;
    ctx.report(session_id, "completed", "大纲生成完成").await;
    ctx.progress.unsubscribe(session_id).await;
    println!("✓ Weaver大纲生成流程执行完毕");

    Ok((outline, citations))
}

/// 从大纲文本提取引用链接（markdown链接优先，裸URL兜底，保序去重）
pub fn extract_citations(text: &str) -> Vec<String> {
    let link_pattern = regex::Regex::new(r"\[[^\]]*\]\((https?://[^)\s]+)\)").unwrap();
    let bare_pattern = regex::Regex::new(r#"https?://[^\s)\]>"]+"#).unwrap();

    let mut seen = HashSet::new();
    let mut citations = Vec::new();

    for captures in link_pattern.captures_iter(text) {
        if let Some(url) = captures.get(1) {
            let url = url.as_str().to_string();
            if seen.insert(url.clone()) {
                citations.push(url);
            }
        }
    }
    for url in bare_pattern.find_iter(text) {
        let url = url.as_str().to_string();
        if seen.insert(url.clone()) {
            citations.push(url);
        }
    }

    citations
}

/// 把问题与答案配对成一条用户消息
fn format_answers(questions: &[String], answers: &[String]) -> String {
    let mut text = String::from("以下是澄清问题的回答：\n");
    for (index, answer) in answers.iter().enumerate() {
        match questions.get(index) {
            Some(question) => {
                text.push_str(&format!("{}. {} → {}\n", index + 1, question, answer))
            }
            None => text.push_str(&format!("{}. {}\n", index + 1, answer)),
        }
    }
    text
}

/// 标记会话失败后把错误原样抛回调用方
async fn mark_failed(
    ctx: &PipelineContext,
    session_id: Uuid,
    error: anyhow::Error,
) -> anyhow::Error {
    eprintln!("❌ 大纲生成失败: {}", error);

    let update = SessionUpdate {
        status: Some(SessionStatus::Failed),
        error_message: Some(error.to_string()),
        ..Default::default()
    };
    if let Err(e) = ctx.update_session(session_id, update).await {
        eprintln!("❌ 标记会话失败状态时出错: {}", e);
    }
    ctx.progress.unsubscribe(session_id).await;

    error
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_citations_prefers_markdown_links() {
        let outline = "## Section\n- point [Rust Book](https://doc.rust-lang.org/book/)\n\n参考来源：https://blog.example.com/post";
        let citations = extract_citations(outline);

        assert_eq!(
            citations,
            vec![
                "https://doc.rust-lang.org/book/".to_string(),
                "https://blog.example.com/post".to_string(),
            ]
        );
    }

    #[test]
    fn test_extract_citations_dedupes() {
        let outline =
            "[a](https://a.example/x) and again [b](https://a.example/x) plus https://a.example/x";
        assert_eq!(extract_citations(outline).len(), 1);
    }

    #[test]
    fn test_extract_citations_empty() {
        assert!(extract_citations("no links here").is_empty());
    }

    #[test]
    fn test_format_answers_pairs_questions() {
        let questions = vec!["Who is the audience?".to_string()];
        let answers = vec!["Backend engineers".to_string(), "Extra note".to_string()];
        let text = format_answers(&questions, &answers);

        assert!(text.contains("1. Who is the audience? → Backend engineers"));
        assert!(text.contains("2. Extra note"));
    }
}
