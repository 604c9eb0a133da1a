//! 链接编排流水线
//!
//! 三个阶段严格串行，阶段N+1在阶段N的文档快照落库前不会开始。
//! 预期内的失败不抛异常：会话标记failed后返回success=false的结果，
//! 调用方总能拿回一篇文章（失败时为未修改的原文）。

use anyhow::Result;
use serde_json::Value;
use uuid::Uuid;

use crate::pipeline::context::PipelineContext;
use crate::pipeline::types::{
    AppliedModifications, LinkOrchestrationResult, OrchestrationInput, Phase1Result, Phase2Result,
    Phase3Result, SessionProgress,
};
use crate::session::{SessionError, SessionRecord, SessionStatus, SessionUpdate};

pub mod agents;
pub mod phase1;
pub mod phase2;
pub mod phase3;

/// 跨阶段传递的进行中状态
struct PhaseProgress {
    document: String,
    phase1: Option<Phase1Result>,
    phase2: Option<Phase2Result>,
    phase3: Option<Phase3Result>,
}

impl PhaseProgress {
    fn fresh(article: String) -> Self {
        Self {
            document: article,
            phase1: None,
            phase2: None,
            phase3: None,
        }
    }

    /// 从持久化会话重建进度：已完成的阶段复用存量快照与结果
    fn from_record(record: &SessionRecord, input: &OrchestrationInput) -> Result<Self> {
        let phase1 = parse_completed_phase(
            record.phase1_completed_at.is_some(),
            &record.phase1_result,
            record.id,
        )?;
        let phase2 = parse_completed_phase(
            record.phase2_completed_at.is_some(),
            &record.phase2_result,
            record.id,
        )?;
        let phase3 = parse_completed_phase(
            record.phase3_completed_at.is_some(),
            &record.phase3_result,
            record.id,
        )?;

        // 文档快照取最后一个已完成阶段的产出
        let document = if phase3.is_some() {
            record.final_article.clone()
        } else if phase2.is_some() {
            record.article_after_phase2.clone()
        } else if phase1.is_some() {
            record.article_after_phase1.clone()
        } else {
            record
                .original_article
                .clone()
                .or_else(|| Some(input.article.clone()))
        }
        .ok_or(SessionError::InvalidState(record.id))?;

        Ok(Self {
            document,
            phase1,
            phase2,
            phase3,
        })
    }
}

/// 已完成阶段的结果必须在库，缺失视为状态不一致
fn parse_completed_phase<T: serde::de::DeserializeOwned>(
    completed: bool,
    stored: &Option<Value>,
    session_id: Uuid,
) -> Result<Option<T>> {
    if !completed {
        return Ok(None);
    }
    let value = stored
        .clone()
        .ok_or(SessionError::InvalidState(session_id))?;
    let parsed = serde_json::from_value(value)
        .map_err(|_| SessionError::InvalidState(session_id))?;
    Ok(Some(parsed))
}

/// 执行完整的链接编排流程
///
/// 永不暂停、永不向调用方抛预期内异常。任何阶段的致命错误都会把
/// 会话标记为failed并返回success=false的结果。
pub async fn orchestrate(
    ctx: &PipelineContext,
    input: OrchestrationInput,
) -> LinkOrchestrationResult {
    let mut record = SessionRecord::new(
        SessionStatus::Initializing,
        input.parent_workflow_id.clone(),
    );
    record.original_article = Some(input.article.clone());
    record.input = serde_json::to_value(&input).ok();
    let session_id = record.id;

    println!("🚀 开始执行Weaver链接编排流程...会话 {}", session_id);

    if let Err(e) = ctx.store.create(record).await {
        return LinkOrchestrationResult::failure(
            session_id,
            input.article.clone(),
            format!("创建会话失败: {}", e),
        );
    }

    let progress = PhaseProgress::fresh(input.article.clone());
    match drive_phases(ctx, session_id, &input, progress).await {
        Ok(result) => result,
        Err(e) => fail_session(ctx, session_id, &input.article, e).await,
    }
}

/// 恢复会话，从首个缺少完成时间戳的阶段继续
///
/// 会话不存在或无法重建输入属于可恢复的报告型错误。已完成的会话
/// 直接返回存量产物，不重跑任何阶段。
pub async fn resume_session(
    ctx: &PipelineContext,
    session_id: Uuid,
) -> Result<LinkOrchestrationResult> {
    let record = ctx
        .store
        .get(session_id)
        .await?
        .ok_or(SessionError::NotFound(session_id))?;

    if record.status == SessionStatus::Completed {
        return assemble_completed(&record);
    }

    let input: OrchestrationInput = record
        .input
        .clone()
        .and_then(|value| serde_json::from_value(value).ok())
        .ok_or(SessionError::InvalidState(session_id))?;

    let progress = PhaseProgress::from_record(&record, &input)?;
    println!("🔄 恢复会话 {}...", session_id);

    match drive_phases(ctx, session_id, &input, progress).await {
        Ok(result) => Ok(result),
        Err(e) => Ok(fail_session(ctx, session_id, &input.article, e).await),
    }
}

/// 会话进度投影，供轮询方使用
pub async fn get_session_progress(
    ctx: &PipelineContext,
    session_id: Uuid,
) -> Result<SessionProgress> {
    let record = ctx
        .store
        .get(session_id)
        .await?
        .ok_or(SessionError::NotFound(session_id))?;

    let phase_label = match record.status {
        SessionStatus::Initializing => "初始化中",
        SessionStatus::Phase1 => "阶段一：站内链接与品牌提及",
        SessionStatus::Phase2 => "阶段二：客户链接放置",
        SessionStatus::Phase3 => "阶段三：配图与附属产物",
        SessionStatus::Triaging => "分诊中",
        SessionStatus::Clarifying => "等待澄清",
        SessionStatus::Researching => "深度调研中",
        SessionStatus::Completed => "已完成",
        SessionStatus::Failed => "已失败",
    };

    Ok(SessionProgress {
        session_id,
        status: record.status,
        phase_label: phase_label.to_string(),
        phase1_completed_at: record.phase1_completed_at,
        phase2_completed_at: record.phase2_completed_at,
        phase3_completed_at: record.phase3_completed_at,
        error_message: record.error_message,
    })
}

/// 依次补完缺失的阶段并组装终态结果
async fn drive_phases(
    ctx: &PipelineContext,
    session_id: Uuid,
    input: &OrchestrationInput,
    mut progress: PhaseProgress,
) -> Result<LinkOrchestrationResult> {
    if progress.phase1.is_none() {
        let (document, result) =
            phase1::execute(ctx, session_id, input, &progress.document).await?;
        progress.document = document;
        progress.phase1 = Some(result);
    }
    if progress.phase2.is_none() {
        let (document, result) =
            phase2::execute(ctx, session_id, input, &progress.document).await?;
        progress.document = document;
        progress.phase2 = Some(result);
    }
    if progress.phase3.is_none() {
        let (document, result) =
            phase3::execute(ctx, session_id, input, &progress.document).await?;
        progress.document = document;
        progress.phase3 = Some(result);
    }

    let phase1 = progress.phase1.take().unwrap_or_default();
    let phase2 = progress.phase2.take().unwrap_or_default();
    let phase3 = progress.phase3.take().unwrap_or_default();

    ctx.update_session(
        session_id,
        SessionUpdate {
            status: Some(SessionStatus::Completed),
            final_article: Some(progress.document.clone()),
            ..Default::default()
        },
    )
    .await?;
    ctx.report(session_id, "completed", "链接编排完成").await;
    ctx.progress.unsubscribe(session_id).await;
    println!("✓ Weaver链接编排流程执行完毕");

    Ok(LinkOrchestrationResult {
        success: true,
        session_id,
        final_article: progress.document,
        modifications: AppliedModifications {
            internal_links: phase1.internal_links,
            client_mentions: phase1.client_mentions,
            client_link: phase2.client_link,
            images: phase3.images.clone(),
        },
        link_requests: phase3.link_requests,
        url_suggestion: phase3.url_suggestion,
        error: None,
    })
}

/// 从已完成的会话记录组装结果（恢复幂等）
fn assemble_completed(record: &SessionRecord) -> Result<LinkOrchestrationResult> {
    let phase1: Phase1Result =
        parse_completed_phase(true, &record.phase1_result, record.id)?.unwrap_or_default();
    let phase2: Phase2Result =
        parse_completed_phase(true, &record.phase2_result, record.id)?.unwrap_or_default();
    let phase3: Phase3Result =
        parse_completed_phase(true, &record.phase3_result, record.id)?.unwrap_or_default();

    let final_article = record
        .final_article
        .clone()
        .ok_or(SessionError::InvalidState(record.id))?;

    Ok(LinkOrchestrationResult {
        success: true,
        session_id: record.id,
        final_article,
        modifications: AppliedModifications {
            internal_links: phase1.internal_links,
            client_mentions: phase1.client_mentions,
            client_link: phase2.client_link,
            images: phase3.images.clone(),
        },
        link_requests: phase3.link_requests,
        url_suggestion: phase3.url_suggestion,
        error: None,
    })
}

/// 标记会话失败并构造降级结果
async fn fail_session(
    ctx: &PipelineContext,
    session_id: Uuid,
    article: &str,
    error: anyhow::Error,
) -> LinkOrchestrationResult {
    eprintln!("❌ 链接编排失败: {}", error);

    let update = SessionUpdate {
        status: Some(SessionStatus::Failed),
        error_message: Some(error.to_string()),
        ..Default::default()
    };
    if let Err(e) = ctx.update_session(session_id, update).await {
        eprintln!("❌ 标记会话失败状态时出错: {}", e);
    }
    ctx.progress.unsubscribe(session_id).await;

    LinkOrchestrationResult::failure(session_id, article.to_string(), error.to_string())
}
