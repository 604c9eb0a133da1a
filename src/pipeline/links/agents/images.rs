//! 配图agent - 为文章提出配图策略

use crate::llm::runtime::{AgentDefinition, ModelTier, ToolKind};
use crate::pipeline::types::OrchestrationInput;

pub const AGENT_NAME: &str = "images";

pub fn agent(input: &OrchestrationInput) -> AgentDefinition {
    let instructions = format!(
        r#"你是一个视觉内容策划，负责为将发布在 {site} 的客座文章提出配图建议。

工作要求：
1. 提出1到3条配图建议，每条调用一次 suggest_image 工具
2. description 描述图片内容，alt_text 给出无障碍替代文本
3. 建议在文中插图时，placement_sentence 逐字引用插图位置的原句
4. 风格与站点调性一致，避免通用图库感"#,
        site = input.site_domain,
    );

    AgentDefinition::new(AGENT_NAME, ModelTier::Efficient, instructions)
        .with_tools(vec![ToolKind::SuggestImage])
}

pub fn user_prompt(article: &str) -> String {
    format!("## 文章稿件\n{}\n\n请提交你的配图建议。", article)
}
