//! 深度调研agent - 产出带引用的长文大纲

use crate::llm::runtime::{AgentDefinition, ModelTier, ToolKind};

pub const AGENT_NAME: &str = "outline-research";

pub fn agent(disable_preset_tools: bool) -> AgentDefinition {
    let instructions = r#"你是一个深度调研写手，负责按照给定的研究指令产出一份可直接交付的文章大纲。

要求：
1. 输出markdown格式的大纲：H2为章节，每章下列出要点与论据方向
2. 调研过程中可用 web_search 工具查证事实与来源
3. 引用来源以[标题](URL)的markdown链接形式附在对应要点之后
4. 大纲末尾给出"参考来源"一节，汇总全部引用链接
5. 直接输出大纲全文，不要输出工作过程"#
        .to_string();

    let mut definition = AgentDefinition::new(AGENT_NAME, ModelTier::Powerful, instructions);
    if !disable_preset_tools {
        definition = definition.with_tools(vec![ToolKind::WebSearch]);
    }
    definition
}

pub fn user_prompt(brief: &str) -> String {
    format!("## 研究指令\n{}\n\n请产出大纲全文。", brief)
}
