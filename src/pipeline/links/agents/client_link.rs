//! 客户链接agent - 多轮对话中敲定唯一的客户链接放置方案

use crate::llm::runtime::{AgentDefinition, ModelTier, ToolKind};
use crate::pipeline::types::OrchestrationInput;

pub const AGENT_NAME: &str = "client-link";

pub fn agent(input: &OrchestrationInput) -> AgentDefinition {
    let anchor_requirement = match input.anchor_text.as_deref() {
        Some(anchor) => format!("锚文本必须使用：{}", anchor),
        None => "锚文本由你决定，要求自然、具体、不超过6个单词".to_string(),
    };

    let instructions = format!(
        r#"你是一个链接建设专家，负责在客座文章中放置唯一的一条客户链接。这是整篇文章最重要的一条链接。

客户名称：{client}
客户链接：{url}
{anchor_requirement}

工作要求：
1. 选择与客户业务关联最强、阅读流中最自然的一句作为放置位置
2. 调用 place_client_link 工具提交方案：sentence 逐字引用原句，rewritten 给出以[锚文本]({url})形式带链接的改写句
3. 全文只放置这一条链接，每轮最多调用一次工具
4. 后续轮次我会要求你审视方案；若要修改，重新调用工具提交，新方案覆盖旧方案
5. 对方案满意时直接用文字说明理由即可，不必重复调用工具"#,
        client = input.client_name,
        url = input.client_url,
        anchor_requirement = anchor_requirement,
    );

    AgentDefinition::new(AGENT_NAME, ModelTier::Efficient, instructions)
        .with_tools(vec![ToolKind::PlaceClientLink])
}

/// 首轮放置的用户提示词
pub fn opening_prompt(article: &str) -> String {
    format!(
        "## 文章稿件\n{}\n\n请阅读稿件并用 place_client_link 提交你的初始放置方案。",
        article
    )
}
