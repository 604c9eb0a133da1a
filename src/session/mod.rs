//! 会话与检查点模型
//!
//! 会话是一次流水线运行的持久化记录，也是恢复的单元：进程崩溃后
//! 可以从首个缺少完成时间戳的阶段继续。字段只向前推进，已完成阶段
//! 的数据不会被回滚。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use crate::llm::events::ChatTurn;

pub mod store;

pub use store::{FileSessionStore, MemorySessionStore, SessionStore};

/// continuation状态格式版本
pub const AGENT_STATE_VERSION: u32 = 1;

/// 会话状态机
///
/// links流水线：initializing → phase1 → phase2 → phase3 → completed。
/// outline流水线：triaging → {clarifying → researching} | researching → completed。
/// failed可从任意状态到达。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    #[serde(rename = "initializing")]
    Initializing,
    #[serde(rename = "phase1")]
    Phase1,
    #[serde(rename = "phase2")]
    Phase2,
    #[serde(rename = "phase3")]
    Phase3,
    #[serde(rename = "triaging")]
    Triaging,
    #[serde(rename = "clarifying")]
    Clarifying,
    #[serde(rename = "researching")]
    Researching,
    #[serde(rename = "completed")]
    Completed,
    #[serde(rename = "failed")]
    Failed,
}

impl SessionStatus {
    /// 是否为终态
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Failed)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SessionStatus::Initializing => "initializing",
            SessionStatus::Phase1 => "phase1",
            SessionStatus::Phase2 => "phase2",
            SessionStatus::Phase3 => "phase3",
            SessionStatus::Triaging => "triaging",
            SessionStatus::Clarifying => "clarifying",
            SessionStatus::Researching => "researching",
            SessionStatus::Completed => "completed",
            SessionStatus::Failed => "failed",
        };
        write!(f, "{}", label)
    }
}

/// continuation所处的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContinuationStage {
    /// 等待外部补充澄清答案
    #[serde(rename = "awaiting_answers")]
    AwaitingAnswers,
}

/// 可恢复的continuation状态
///
/// 版本化的自有格式（会话历史 + 阶段标记），与模型Provider无关，
/// 持久化在会话记录中以支撑跨进程恢复。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentState {
    pub version: u32,
    pub stage: ContinuationStage,
    /// 截至暂停点的完整会话历史
    pub history: Vec<ChatTurn>,
    /// 暂停时向调用方抛出的澄清问题
    pub pending_questions: Vec<String>,
}

impl AgentState {
    pub fn awaiting_answers(history: Vec<ChatTurn>, pending_questions: Vec<String>) -> Self {
        Self {
            version: AGENT_STATE_VERSION,
            stage: ContinuationStage::AwaitingAnswers,
            history,
            pending_questions,
        }
    }
}

/// 会话记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: Uuid,
    /// 所属工作流标识（外部系统的关联键，本引擎不解释其含义）
    pub parent_workflow_id: Option<String>,
    pub status: SessionStatus,
    /// 同一parent下的第几次生成（max+1分配）
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// 调用输入快照（恢复时重建Input）
    pub input: Option<Value>,

    // links流水线的文档版本链：original → afterPhase1 → afterPhase2 → final
    pub original_article: Option<String>,
    pub article_after_phase1: Option<String>,
    pub article_after_phase2: Option<String>,
    pub final_article: Option<String>,

    // 各阶段结构化结果
    pub phase1_result: Option<Value>,
    pub phase2_result: Option<Value>,
    pub phase3_result: Option<Value>,

    // 阶段时间戳
    pub phase1_started_at: Option<DateTime<Utc>>,
    pub phase1_completed_at: Option<DateTime<Utc>>,
    pub phase2_started_at: Option<DateTime<Utc>>,
    pub phase2_completed_at: Option<DateTime<Utc>>,
    pub phase3_started_at: Option<DateTime<Utc>>,
    pub phase3_completed_at: Option<DateTime<Utc>>,

    // outline流水线
    pub outline_prompt: Option<String>,
    pub agent_state: Option<AgentState>,
    pub final_outline: Option<String>,
    pub citations: Option<Vec<String>>,

    pub error_message: Option<String>,
}

impl SessionRecord {
    /// 创建新会话记录
    pub fn new(status: SessionStatus, parent_workflow_id: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            parent_workflow_id,
            status,
            version: 1,
            created_at: now,
            updated_at: now,
            input: None,
            original_article: None,
            article_after_phase1: None,
            article_after_phase2: None,
            final_article: None,
            phase1_result: None,
            phase2_result: None,
            phase3_result: None,
            phase1_started_at: None,
            phase1_completed_at: None,
            phase2_started_at: None,
            phase2_completed_at: None,
            phase3_started_at: None,
            phase3_completed_at: None,
            outline_prompt: None,
            agent_state: None,
            final_outline: None,
            citations: None,
            error_message: None,
        }
    }
}

/// 字段级部分更新
///
/// 只包含要设置的字段；会话字段只向前设置，不支持清空。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionUpdate {
    pub status: Option<SessionStatus>,
    pub input: Option<Value>,
    pub original_article: Option<String>,
    pub article_after_phase1: Option<String>,
    pub article_after_phase2: Option<String>,
    pub final_article: Option<String>,
    pub phase1_result: Option<Value>,
    pub phase2_result: Option<Value>,
    pub phase3_result: Option<Value>,
    pub phase1_started_at: Option<DateTime<Utc>>,
    pub phase1_completed_at: Option<DateTime<Utc>>,
    pub phase2_started_at: Option<DateTime<Utc>>,
    pub phase2_completed_at: Option<DateTime<Utc>>,
    pub phase3_started_at: Option<DateTime<Utc>>,
    pub phase3_completed_at: Option<DateTime<Utc>>,
    pub outline_prompt: Option<String>,
    pub agent_state: Option<AgentState>,
    pub final_outline: Option<String>,
    pub citations: Option<Vec<String>>,
    pub error_message: Option<String>,
}

impl SessionUpdate {
    /// 把更新应用到记录上
    pub fn apply(self, record: &mut SessionRecord) {
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(input) = self.input {
            record.input = Some(input);
        }
        if let Some(article) = self.original_article {
            record.original_article = Some(article);
        }
        if let Some(article) = self.article_after_phase1 {
            record.article_after_phase1 = Some(article);
        }
        if let Some(article) = self.article_after_phase2 {
            record.article_after_phase2 = Some(article);
        }
        if let Some(article) = self.final_article {
            record.final_article = Some(article);
        }
        if let Some(result) = self.phase1_result {
            record.phase1_result = Some(result);
        }
        if let Some(result) = self.phase2_result {
            record.phase2_result = Some(result);
        }
        if let Some(result) = self.phase3_result {
            record.phase3_result = Some(result);
        }
        if let Some(at) = self.phase1_started_at {
            record.phase1_started_at = Some(at);
        }
        if let Some(at) = self.phase1_completed_at {
            record.phase1_completed_at = Some(at);
        }
        if let Some(at) = self.phase2_started_at {
            record.phase2_started_at = Some(at);
        }
        if let Some(at) = self.phase2_completed_at {
            record.phase2_completed_at = Some(at);
        }
        if let Some(at) = self.phase3_started_at {
            record.phase3_started_at = Some(at);
        }
        if let Some(at) = self.phase3_completed_at {
            record.phase3_completed_at = Some(at);
        }
        if let Some(prompt) = self.outline_prompt {
            record.outline_prompt = Some(prompt);
        }
        if let Some(state) = self.agent_state {
            record.agent_state = Some(state);
        }
        if let Some(outline) = self.final_outline {
            record.final_outline = Some(outline);
        }
        if let Some(citations) = self.citations {
            record.citations = Some(citations);
        }
        if let Some(message) = self.error_message {
            record.error_message = Some(message);
        }
        record.updated_at = Utc::now();
    }

    pub fn with_status(status: SessionStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

/// 会话层可恢复错误
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("会话不存在: {0}")]
    NotFound(Uuid),
    #[error("会话 {0} 不存在可恢复状态")]
    InvalidState(Uuid),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_record_defaults() {
        let record = SessionRecord::new(SessionStatus::Initializing, Some("wf-1".to_string()));

        assert_eq!(record.status, SessionStatus::Initializing);
        assert_eq!(record.version, 1);
        assert_eq!(record.parent_workflow_id.as_deref(), Some("wf-1"));
        assert!(record.phase1_completed_at.is_none());
        assert!(!record.status.is_terminal());
    }

    #[test]
    fn test_update_sets_fields_forward_only() {
        let mut record = SessionRecord::new(SessionStatus::Initializing, None);
        let before = record.updated_at;

        let update = SessionUpdate {
            status: Some(SessionStatus::Phase1),
            original_article: Some("article".to_string()),
            phase1_result: Some(json!({"internal_links": []})),
            ..Default::default()
        };
        update.apply(&mut record);

        assert_eq!(record.status, SessionStatus::Phase1);
        assert_eq!(record.original_article.as_deref(), Some("article"));
        assert!(record.updated_at >= before);

        // An empty update must not roll anything back
        SessionUpdate::default().apply(&mut record);
        assert_eq!(record.original_article.as_deref(), Some("article"));
        assert_eq!(record.status, SessionStatus::Phase1);
    }

    #[test]
    fn test_status_serde_labels() {
        let value = serde_json::to_value(SessionStatus::Clarifying).unwrap();
        assert_eq!(value, "clarifying");
        assert_eq!(SessionStatus::Phase2.to_string(), "phase2");
    }

    #[test]
    fn test_agent_state_roundtrip() {
        let state = AgentState::awaiting_answers(
            vec![ChatTurn::user("topic"), ChatTurn::assistant("questions")],
            vec!["Who is the audience?".to_string()],
        );
        let serialized = serde_json::to_string(&state).unwrap();
        let back: AgentState = serde_json::from_str(&serialized).unwrap();

        assert_eq!(back.version, AGENT_STATE_VERSION);
        assert_eq!(back.stage, ContinuationStage::AwaitingAnswers);
        assert_eq!(back.history.len(), 2);
        assert_eq!(back.pending_questions.len(), 1);
    }

    #[test]
    fn test_terminal_status() {
        assert!(SessionStatus::Completed.is_terminal());
        assert!(SessionStatus::Failed.is_terminal());
        assert!(!SessionStatus::Clarifying.is_terminal());
    }
}
