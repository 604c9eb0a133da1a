//! Mock Agent运行时 - 供测试以脚本化响应驱动流水线

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::llm::events::{AgentRun, ChatTurn};
use crate::llm::runtime::{AgentDefinition, AgentRuntime};

/// 单次调用的脚本化行为
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// extract调用返回该JSON值
    Extract(Value),
    /// run调用返回该事件序列
    Run(AgentRun),
    /// 调用失败
    Fail(String),
}

/// 一次被记录的调用
#[derive(Debug, Clone)]
pub struct MockCall {
    pub agent: String,
    pub prompt: String,
    pub history_len: usize,
}

/// 脚本化的Agent运行时
///
/// 按agent名称排队响应，先进先出。脚本耗尽后的调用视为测试配置错误。
/// 克隆共享同一份脚本与调用记录，便于测试侧在运行后断言。
#[derive(Clone, Default)]
pub struct MockAgentRuntime {
    scripts: Arc<Mutex<HashMap<String, VecDeque<MockBehavior>>>>,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

impl MockAgentRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为指定agent追加一条脚本
    pub fn script(&self, agent_name: &str, behavior: MockBehavior) {
        let mut scripts = self.scripts.lock().unwrap();
        scripts
            .entry(agent_name.to_string())
            .or_default()
            .push_back(behavior);
    }

    /// 已记录的调用（按发生顺序）
    pub fn recorded_calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    fn next_behavior(&self, agent_name: &str) -> Result<MockBehavior> {
        let mut scripts = self.scripts.lock().unwrap();
        scripts
            .get_mut(agent_name)
            .and_then(|queue| queue.pop_front())
            .ok_or_else(|| anyhow!("mock脚本未配置: {}", agent_name))
    }

    fn record(&self, agent: &AgentDefinition, prompt: &str, history_len: usize) {
        self.calls.lock().unwrap().push(MockCall {
            agent: agent.name.to_string(),
            prompt: prompt.to_string(),
            history_len,
        });
    }
}

#[async_trait]
impl AgentRuntime for MockAgentRuntime {
    async fn extract(
        &self,
        agent: &AgentDefinition,
        user_prompt: &str,
        _output_schema: &Value,
    ) -> Result<Value> {
        self.record(agent, user_prompt, 0);
        match self.next_behavior(agent.name)? {
            MockBehavior::Extract(value) => Ok(value),
            MockBehavior::Fail(message) => Err(anyhow!(message)),
            MockBehavior::Run(_) => Err(anyhow!(
                "mock脚本类型不匹配: {} 期望Extract，配置了Run",
                agent.name
            )),
        }
    }

    async fn run(
        &self,
        agent: &AgentDefinition,
        user_prompt: &str,
        history: &[ChatTurn],
    ) -> Result<AgentRun> {
        self.record(agent, user_prompt, history.len());
        match self.next_behavior(agent.name)? {
            MockBehavior::Run(run) => Ok(run),
            MockBehavior::Fail(message) => Err(anyhow!(message)),
            MockBehavior::Extract(_) => Err(anyhow!(
                "mock脚本类型不匹配: {} 期望Run，配置了Extract",
                agent.name
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::events::AgentEvent;
    use crate::llm::runtime::ModelTier;
    use serde_json::json;

    fn test_agent(name: &'static str) -> AgentDefinition {
        AgentDefinition::new(name, ModelTier::Efficient, "test".to_string())
    }

    #[tokio::test]
    async fn test_scripts_consumed_in_order() {
        let runtime = MockAgentRuntime::new();
        runtime.script("triage", MockBehavior::Extract(json!({"first": true})));
        runtime.script("triage", MockBehavior::Extract(json!({"first": false})));

        let agent = test_agent("triage");
        let schema = json!({});
        let first = runtime.extract(&agent, "p", &schema).await.unwrap();
        let second = runtime.extract(&agent, "p", &schema).await.unwrap();
        assert_eq!(first["first"], true);
        assert_eq!(second["first"], false);

        // Exhausted script is a test configuration error
        assert!(runtime.extract(&agent, "p", &schema).await.is_err());
    }

    #[tokio::test]
    async fn test_fail_behavior_and_call_recording() {
        let runtime = MockAgentRuntime::new();
        runtime.script("internal-links", MockBehavior::Fail("boom".to_string()));
        runtime.script(
            "internal-links",
            MockBehavior::Run(AgentRun::new(vec![AgentEvent::MessageOutput {
                text: "ok".to_string(),
            }])),
        );

        let agent = test_agent("internal-links");
        let history = vec![ChatTurn::user("hello")];

        let err = runtime.run(&agent, "p1", &history).await;
        assert!(err.is_err());

        let run = runtime.run(&agent, "p2", &history).await.unwrap();
        assert_eq!(run.final_message(), Some("ok"));

        let calls = runtime.recorded_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].prompt, "p1");
        assert_eq!(calls[1].history_len, 1);
    }
}
