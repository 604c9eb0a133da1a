//! 工具调用提取器
//!
//! 消费一次agent运行的事件序列，把工具调用参数按工具名归集成
//! 有序列表。未注册的工具名在类型化提取时被忽略而非报错，
//! 保证新增工具不会击穿既有流水线；零次调用得到空列表。

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;

use crate::llm::events::AgentRun;

/// 按工具名归集的调用参数
#[derive(Debug, Default)]
pub struct ToolCallLog {
    by_tool: HashMap<String, Vec<Value>>,
}

impl ToolCallLog {
    /// 从一次agent运行收集全部工具调用（保持发生顺序）
    pub fn collect(run: &AgentRun) -> Self {
        let mut by_tool: HashMap<String, Vec<Value>> = HashMap::new();
        for (name, arguments) in run.tool_calls() {
            by_tool
                .entry(name.to_string())
                .or_default()
                .push(arguments.clone());
        }
        Self { by_tool }
    }

    /// 指定工具的调用次数
    pub fn count(&self, tool_name: &str) -> usize {
        self.by_tool.get(tool_name).map_or(0, Vec::len)
    }

    /// 把指定工具的参数列表反序列化为类型化结果
    ///
    /// 无法解析的参数对象跳过并报告，不中断流水线。
    pub fn drain_as<T: DeserializeOwned>(&self, tool_name: &str) -> Vec<T> {
        let Some(calls) = self.by_tool.get(tool_name) else {
            return Vec::new();
        };

        calls
            .iter()
            .filter_map(|arguments| match serde_json::from_value(arguments.clone()) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    eprintln!("   ⚠️ 工具 {} 的参数无法解析，已跳过: {}", tool_name, e);
                    None
                }
            })
            .collect()
    }

    /// 指定工具的最后一次调用（多轮refinement的覆盖语义）
    pub fn last_as<T: DeserializeOwned>(&self, tool_name: &str) -> Option<T> {
        self.drain_as(tool_name).into_iter().next_back()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::events::AgentEvent;
    use crate::pipeline::types::{ClientLinkPlacement, InternalLink};
    use serde_json::json;

    fn tool_event(name: &str, arguments: Value) -> AgentEvent {
        AgentEvent::ToolCalled {
            name: name.to_string(),
            arguments,
        }
    }

    #[test]
    fn test_collects_calls_by_tool_in_order() {
        let run = AgentRun::new(vec![
            tool_event(
                "insert_internal_link",
                json!({
                    "sentence": "First sentence.",
                    "anchor_text": "First",
                    "target_url": "https://blog.example.com/1"
                }),
            ),
            AgentEvent::MessageOutput {
                text: "placing links".to_string(),
            },
            tool_event(
                "insert_internal_link",
                json!({
                    "sentence": "Second sentence.",
                    "anchor_text": "Second",
                    "target_url": "https://blog.example.com/2"
                }),
            ),
        ]);

        let log = ToolCallLog::collect(&run);
        assert_eq!(log.count("insert_internal_link"), 2);

        let links: Vec<InternalLink> = log.drain_as("insert_internal_link");
        assert_eq!(links[0].anchor_text, "First");
        assert_eq!(links[1].anchor_text, "Second");
    }

    #[test]
    fn test_unknown_tools_are_ignored() {
        let run = AgentRun::new(vec![tool_event("future_tool", json!({"x": 1}))]);
        let log = ToolCallLog::collect(&run);

        let links: Vec<InternalLink> = log.drain_as("insert_internal_link");
        assert!(links.is_empty());
    }

    #[test]
    fn test_zero_calls_is_empty_not_error() {
        let log = ToolCallLog::collect(&AgentRun::default());
        assert_eq!(log.count("insert_internal_link"), 0);
        let links: Vec<InternalLink> = log.drain_as("insert_internal_link");
        assert!(links.is_empty());
    }

    #[test]
    fn test_malformed_arguments_are_skipped() {
        let run = AgentRun::new(vec![
            tool_event("insert_internal_link", json!({"bogus": true})),
            tool_event(
                "insert_internal_link",
                json!({
                    "sentence": "Valid.",
                    "anchor_text": "Valid",
                    "target_url": "https://blog.example.com/v"
                }),
            ),
        ]);

        let links: Vec<InternalLink> =
            ToolCallLog::collect(&run).drain_as("insert_internal_link");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].sentence, "Valid.");
    }

    #[test]
    fn test_last_call_wins() {
        let run = AgentRun::new(vec![
            tool_event(
                "place_client_link",
                json!({
                    "sentence": "Old spot.",
                    "anchor_text": "old",
                    "rewritten": "Old [old](https://acme.example) spot."
                }),
            ),
            tool_event(
                "place_client_link",
                json!({
                    "sentence": "New spot.",
                    "anchor_text": "new",
                    "rewritten": "New [new](https://acme.example) spot."
                }),
            ),
        ]);

        let last: ClientLinkPlacement = ToolCallLog::collect(&run)
            .last_as("place_client_link")
            .unwrap();
        assert_eq!(last.anchor_text, "new");
    }
}
