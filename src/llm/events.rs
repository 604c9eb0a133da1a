//! Agent运行事件 - 以强类型判别联合描述一次agent运行产出的事件流

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 会话角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
}

/// 一条会话记录 - 与具体模型Provider解耦的可移植格式
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// agent运行事件
///
/// 事件只有两种：工具调用与文本输出。文本输出只有`text`一个字段，
/// 消费方不需要做多字段探测。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum AgentEvent {
    /// agent发起了一次工具调用
    #[serde(rename = "tool_called")]
    ToolCalled { name: String, arguments: Value },
    /// agent产出了一段文本消息
    #[serde(rename = "message_output")]
    MessageOutput { text: String },
}

/// 一次agent运行的完整产出
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentRun {
    pub events: Vec<AgentEvent>,
}

impl AgentRun {
    pub fn new(events: Vec<AgentEvent>) -> Self {
        Self { events }
    }

    /// 最后一条文本消息（多轮对话的agent回复）
    pub fn final_message(&self) -> Option<&str> {
        self.events.iter().rev().find_map(|event| match event {
            AgentEvent::MessageOutput { text } => Some(text.as_str()),
            _ => None,
        })
    }

    /// 按发生顺序遍历工具调用
    pub fn tool_calls(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.events.iter().filter_map(|event| match event {
            AgentEvent::ToolCalled { name, arguments } => Some((name.as_str(), arguments)),
            _ => None,
        })
    }
}
