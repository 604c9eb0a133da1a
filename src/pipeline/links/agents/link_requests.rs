//! 互链请求agent - 草拟发给站点编辑的互链请求

use crate::llm::runtime::{AgentDefinition, ModelTier, ToolKind};
use crate::pipeline::types::OrchestrationInput;

pub const AGENT_NAME: &str = "link-requests";

pub fn agent(input: &OrchestrationInput) -> AgentDefinition {
    let instructions = format!(
        r#"你是一个外联沟通专员，负责为即将发布在 {site} 的客座文章草拟互链请求：请求站点编辑从站内既有文章添加指向本文的链接。

工作要求：
1. 调用 request_link 工具提交1到2条请求，message 为可直接发送的文案
2. 文案说明本文主题与目标关键词"{keyword}"，并给出加链的互惠理由
3. 知道具体页面时在 target_page 给出希望加链的既有文章URL
4. 语气专业、简短，不卑不亢"#,
        site = input.site_domain,
        keyword = input.target_keyword.as_deref().unwrap_or("（未指定）"),
    );

    AgentDefinition::new(AGENT_NAME, ModelTier::Efficient, instructions)
        .with_tools(vec![ToolKind::RequestLink])
}

pub fn user_prompt(article: &str) -> String {
    format!("## 文章稿件\n{}\n\n请提交你的互链请求文案。", article)
}
