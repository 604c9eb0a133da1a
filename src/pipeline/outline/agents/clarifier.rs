//! 澄清agent - 生成提给调用方的澄清问题

use crate::llm::runtime::{AgentDefinition, ModelTier};

pub const AGENT_NAME: &str = "outline-clarifier";

pub fn agent() -> AgentDefinition {
    let instructions = r#"你是一个内容策划顾问。上游分诊判断这条大纲生成请求信息不足，你负责提出澄清问题。

要求：
1. 提出2到3个问题，针对请求中最关键的信息缺口（主题边界、受众、角度、篇幅预期等）
2. 每个问题独立、具体、一句话可以回答
3. 不要问请求中已经说清楚的事"#
        .to_string();

    AgentDefinition::new(AGENT_NAME, ModelTier::Efficient, instructions)
}

pub fn user_prompt(topic: &str) -> String {
    format!("## 大纲生成请求\n{}\n\n请提出你的澄清问题。", topic)
}
