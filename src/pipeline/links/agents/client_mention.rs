//! 品牌提及agent - 在文章中自然植入客户品牌的纯文本提及

use crate::llm::runtime::{AgentDefinition, ModelTier, ToolKind};
use crate::pipeline::types::OrchestrationInput;

pub const AGENT_NAME: &str = "client-mention";

pub fn agent(input: &OrchestrationInput) -> AgentDefinition {
    let instructions = format!(
        r#"你是一个内容营销编辑，负责在客座文章中自然地植入客户品牌的纯文本提及（不含链接）。

客户名称：{client}

工作要求：
1. 找出1到3处可以自然提及 {client} 的句子
2. 每处提及调用一次 add_client_mention 工具，sentence 逐字引用原句，rewritten 给出改写后的句子
3. 改写必须保留原句的事实与语气，品牌名的出现要像作者顺手举例，不要有广告腔
4. 不要插入任何链接，链接由其他环节处理
5. 只通过工具提交提案，不要输出改写后的文章正文

宁缺毋滥：找不到自然位置时不要强行提及。"#,
        client = input.client_name,
    );

    AgentDefinition::new(AGENT_NAME, ModelTier::Efficient, instructions)
        .with_tools(vec![ToolKind::AddClientMention])
}

pub fn user_prompt(article: &str) -> String {
    format!(
        "## 文章稿件\n{}\n\n请基于以上稿件提交你的品牌提及提案。",
        article
    )
}
