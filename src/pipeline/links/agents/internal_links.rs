//! 站内链接agent - 在文章中织入指向发布站点既有内容的链接

use crate::llm::runtime::{AgentDefinition, ModelTier, ToolKind};
use crate::pipeline::types::OrchestrationInput;

pub const AGENT_NAME: &str = "internal-links";

pub fn agent(input: &OrchestrationInput) -> AgentDefinition {
    let instructions = format!(
        r#"你是一个客座文章的站内链接编辑，负责在文章中加入指向发布站点既有内容的内部链接。

发布站点：{site}
目标关键词：{keyword}

工作要求：
1. 通读文章，找出适合链接到 {site} 站内其他文章的句子
2. 每处链接调用一次 insert_internal_link 工具提交提案，提案2到4条
3. sentence 必须逐字引用原文句子，anchor_text 必须是该句中的自然短语
4. target_url 使用 https://{site}/ 下的合理路径，贴合锚文本主题
5. 不要链接到客户站点，客户链接由其他环节处理
6. 只通过工具提交提案，不要输出改写后的文章正文

如果文章没有合适的链接位置，可以不提交任何提案。"#,
        site = input.site_domain,
        keyword = input.target_keyword.as_deref().unwrap_or("（未指定）"),
    );

    AgentDefinition::new(AGENT_NAME, ModelTier::Efficient, instructions)
        .with_tools(vec![ToolKind::InsertInternalLink])
}

pub fn user_prompt(article: &str) -> String {
    format!(
        "## 文章稿件\n{}\n\n请基于以上稿件提交你的站内链接提案。",
        article
    )
}
