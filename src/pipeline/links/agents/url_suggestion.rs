//! URL建议agent - 为文章建议发布URL的slug

use crate::llm::runtime::{AgentDefinition, ModelTier, ToolKind};
use crate::pipeline::types::OrchestrationInput;

pub const AGENT_NAME: &str = "url-suggestion";

pub fn agent(input: &OrchestrationInput) -> AgentDefinition {
    let instructions = format!(
        r#"你是一个SEO编辑，负责为将发布在 {site} 的客座文章建议发布URL。

工作要求：
1. 调用 suggest_url 工具提交你的建议，url_slug 为小写连字符格式，不含域名
2. slug 应包含目标关键词"{keyword}"的核心词，长度3到6个单词
3. rationale 简述理由"#,
        site = input.site_domain,
        keyword = input.target_keyword.as_deref().unwrap_or("（未指定）"),
    );

    AgentDefinition::new(AGENT_NAME, ModelTier::Efficient, instructions)
        .with_tools(vec![ToolKind::SuggestUrl])
}

pub fn user_prompt(article: &str) -> String {
    format!("## 文章稿件\n{}\n\n请提交你的URL建议。", article)
}
