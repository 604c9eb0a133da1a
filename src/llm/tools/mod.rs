//! Agent内置工具
//!
//! 编辑类工具不直接修改文章，只把调用参数记录到共享的[`EditSink`]，
//! 由流水线在agent运行结束后统一提取、合并。

use serde_json::Value;
use std::sync::{Arc, Mutex};

pub mod recorders;
pub mod web_search;

pub use recorders::{
    AgentToolAddClientMention, AgentToolInsertInternalLink, AgentToolPlaceClientLink,
    AgentToolRequestLink, AgentToolSuggestImage, AgentToolSuggestUrl,
};
pub use web_search::AgentToolWebSearch;

/// 一次被记录的工具调用
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub tool: &'static str,
    pub arguments: Value,
}

/// 编辑调用的共享落点
///
/// 同一次agent运行中的所有记录型工具共享一个sink，
/// 记录顺序即调用发生顺序。
#[derive(Debug, Clone, Default)]
pub struct EditSink {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl EditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次工具调用
    pub fn record(&self, tool: &'static str, arguments: Value) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall { tool, arguments });
        }
    }

    /// 取出全部记录（按调用顺序）
    pub fn drain(&self) -> Vec<RecordedCall> {
        match self.calls.lock() {
            Ok(mut calls) => calls.drain(..).collect(),
            Err(_) => Vec::new(),
        }
    }
}

/// 记录型工具错误
#[derive(Debug)]
pub struct RecorderToolError;

impl std::fmt::Display for RecorderToolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Recorder tool error")
    }
}

impl std::error::Error for RecorderToolError {}
