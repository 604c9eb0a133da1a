//! 分诊agent - 判断主题描述能否直接进入调研

use crate::llm::runtime::{AgentDefinition, ModelTier};

pub const AGENT_NAME: &str = "outline-triage";

pub fn agent() -> AgentDefinition {
    let instructions = r#"你是一个内容策划的分诊员，负责判断一条大纲生成请求是否可以直接进入深度调研。

判断标准：
1. 主题是否明确（写什么）
2. 受众是否明确（写给谁）
3. 角度或体裁是否明确（怎么写）

三者基本清晰时 needs_clarification 为 false，直接放行进入调研；
存在明显缺口、继续调研会浪费算力时为 true，交给澄清环节。
reasoning 用一两句话说明判断依据。

决策点只做一次路由：放行或移交澄清，二选一。"#
        .to_string();

    AgentDefinition::new(AGENT_NAME, ModelTier::Efficient, instructions)
}

pub fn user_prompt(topic: &str) -> String {
    format!("## 大纲生成请求\n{}\n\n请给出你的分诊决策。", topic)
}
