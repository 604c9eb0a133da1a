//! 编辑记录工具族
//!
//! 每个工具对应一种编辑提案。工具调用不修改文章本身，
//! 参数写入共享的EditSink后返回受理确认，由阶段执行器统一合并。

use rig::tool::Tool;
use serde::{Deserialize, Serialize};

use super::{EditSink, RecorderToolError};

/// 编辑提案的受理确认
#[derive(Debug, Serialize)]
pub struct EditAck {
    pub accepted: bool,
}

impl EditAck {
    fn ok() -> Self {
        Self { accepted: true }
    }
}

/// 站内链接插入工具
#[derive(Debug, Clone)]
pub struct AgentToolInsertInternalLink {
    sink: EditSink,
}

/// 站内链接参数
#[derive(Debug, Serialize, Deserialize)]
pub struct InsertInternalLinkArgs {
    /// 文章中被链接的原句（必须与原文逐字一致）
    pub sentence: String,
    /// 锚文本（原句中的子串）
    pub anchor_text: String,
    /// 站内目标链接
    pub target_url: String,
    /// 选择该位置的理由
    pub reason: Option<String>,
}

impl AgentToolInsertInternalLink {
    pub fn new(sink: EditSink) -> Self {
        Self { sink }
    }
}

impl Tool for AgentToolInsertInternalLink {
    const NAME: &'static str = "insert_internal_link";

    type Error = RecorderToolError;
    type Args = InsertInternalLinkArgs;
    type Output = EditAck;

    async fn definition(&self, _prompt: String) -> rig::completion::ToolDefinition {
        rig::completion::ToolDefinition {
            name: Self::NAME.to_string(),
            description: "在文章中插入一条指向发布站点既有内容的站内链接。sentence必须逐字引用原文句子，anchor_text必须是该句中的子串。".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "sentence": {
                        "type": "string",
                        "description": "文章中被链接的原句，需与原文逐字一致"
                    },
                    "anchor_text": {
                        "type": "string",
                        "description": "锚文本，必须是sentence中的子串"
                    },
                    "target_url": {
                        "type": "string",
                        "description": "发布站点上的目标页面URL"
                    },
                    "reason": {
                        "type": "string",
                        "description": "选择该位置的理由"
                    }
                },
                "required": ["sentence", "anchor_text", "target_url"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        println!("   🔧 tool called...insert_internal_link@{}", args.anchor_text);
        self.sink.record(
            Self::NAME,
            serde_json::to_value(&args).map_err(|_| RecorderToolError)?,
        );
        Ok(EditAck::ok())
    }
}

/// 客户品牌提及工具
#[derive(Debug, Clone)]
pub struct AgentToolAddClientMention {
    sink: EditSink,
}

/// 品牌提及参数
#[derive(Debug, Serialize, Deserialize)]
pub struct AddClientMentionArgs {
    /// 被改写的原句（必须与原文逐字一致）
    pub sentence: String,
    /// 改写后的句子，自然地提及客户品牌（不含链接）
    pub rewritten: String,
    /// 改写理由
    pub reason: Option<String>,
}

impl AgentToolAddClientMention {
    pub fn new(sink: EditSink) -> Self {
        Self { sink }
    }
}

impl Tool for AgentToolAddClientMention {
    const NAME: &'static str = "add_client_mention";

    type Error = RecorderToolError;
    type Args = AddClientMentionArgs;
    type Output = EditAck;

    async fn definition(&self, _prompt: String) -> rig::completion::ToolDefinition {
        rig::completion::ToolDefinition {
            name: Self::NAME.to_string(),
            description: "将文章中的某一句改写为自然提及客户品牌的版本（纯文本提及，不插入链接）。".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "sentence": {
                        "type": "string",
                        "description": "被改写的原句，需与原文逐字一致"
                    },
                    "rewritten": {
                        "type": "string",
                        "description": "改写后的句子，应自然融入品牌名"
                    },
                    "reason": {
                        "type": "string",
                        "description": "改写理由"
                    }
                },
                "required": ["sentence", "rewritten"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        println!("   🔧 tool called...add_client_mention");
        self.sink.record(
            Self::NAME,
            serde_json::to_value(&args).map_err(|_| RecorderToolError)?,
        );
        Ok(EditAck::ok())
    }
}

/// 客户链接放置工具
#[derive(Debug, Clone)]
pub struct AgentToolPlaceClientLink {
    sink: EditSink,
}

/// 客户链接参数
#[derive(Debug, Serialize, Deserialize)]
pub struct PlaceClientLinkArgs {
    /// 被改写的原句（必须与原文逐字一致）
    pub sentence: String,
    /// 锚文本
    pub anchor_text: String,
    /// 改写后的句子，以markdown形式携带客户链接
    pub rewritten: String,
    /// 放置理由
    pub reason: Option<String>,
}

impl AgentToolPlaceClientLink {
    pub fn new(sink: EditSink) -> Self {
        Self { sink }
    }
}

impl Tool for AgentToolPlaceClientLink {
    const NAME: &'static str = "place_client_link";

    type Error = RecorderToolError;
    type Args = PlaceClientLinkArgs;
    type Output = EditAck;

    async fn definition(&self, _prompt: String) -> rig::completion::ToolDefinition {
        rig::completion::ToolDefinition {
            name: Self::NAME.to_string(),
            description: "在文章中放置唯一的一条客户链接。每轮最多调用一次，后续轮次的调用会覆盖此前的放置方案。".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "sentence": {
                        "type": "string",
                        "description": "被改写的原句，需与原文逐字一致"
                    },
                    "anchor_text": {
                        "type": "string",
                        "description": "客户链接的锚文本"
                    },
                    "rewritten": {
                        "type": "string",
                        "description": "改写后的句子，以[锚文本](URL)形式携带客户链接"
                    },
                    "reason": {
                        "type": "string",
                        "description": "放置理由"
                    }
                },
                "required": ["sentence", "anchor_text", "rewritten"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        println!("   🔧 tool called...place_client_link@{}", args.anchor_text);
        self.sink.record(
            Self::NAME,
            serde_json::to_value(&args).map_err(|_| RecorderToolError)?,
        );
        Ok(EditAck::ok())
    }
}

/// 配图建议工具
#[derive(Debug, Clone)]
pub struct AgentToolSuggestImage {
    sink: EditSink,
}

/// 配图建议参数
#[derive(Debug, Serialize, Deserialize)]
pub struct SuggestImageArgs {
    /// 图片内容描述
    pub description: String,
    /// 替代文本
    pub alt_text: String,
    /// 插图位置锚点（文章原句，可选；提供时会在该句后插入图片占位）
    pub placement_sentence: Option<String>,
    /// 图片风格
    pub style: Option<String>,
}

impl AgentToolSuggestImage {
    pub fn new(sink: EditSink) -> Self {
        Self { sink }
    }
}

impl Tool for AgentToolSuggestImage {
    const NAME: &'static str = "suggest_image";

    type Error = RecorderToolError;
    type Args = SuggestImageArgs;
    type Output = EditAck;

    async fn definition(&self, _prompt: String) -> rig::completion::ToolDefinition {
        rig::completion::ToolDefinition {
            name: Self::NAME.to_string(),
            description: "为文章提出一条配图建议。提供placement_sentence时，流水线会在该句之后插入markdown图片占位。".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "description": {
                        "type": "string",
                        "description": "图片内容描述"
                    },
                    "alt_text": {
                        "type": "string",
                        "description": "图片替代文本"
                    },
                    "placement_sentence": {
                        "type": "string",
                        "description": "插图位置锚点，需与原文某句逐字一致"
                    },
                    "style": {
                        "type": "string",
                        "description": "图片风格（如photo、illustration、diagram）"
                    }
                },
                "required": ["description", "alt_text"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        println!("   🔧 tool called...suggest_image");
        self.sink.record(
            Self::NAME,
            serde_json::to_value(&args).map_err(|_| RecorderToolError)?,
        );
        Ok(EditAck::ok())
    }
}

/// 站内互链请求工具
#[derive(Debug, Clone)]
pub struct AgentToolRequestLink {
    sink: EditSink,
}

/// 互链请求参数
#[derive(Debug, Serialize, Deserialize)]
pub struct RequestLinkArgs {
    /// 发给站点编辑的互链请求文案
    pub message: String,
    /// 希望对方从哪篇既有文章加链（可选）
    pub target_page: Option<String>,
}

impl AgentToolRequestLink {
    pub fn new(sink: EditSink) -> Self {
        Self { sink }
    }
}

impl Tool for AgentToolRequestLink {
    const NAME: &'static str = "request_link";

    type Error = RecorderToolError;
    type Args = RequestLinkArgs;
    type Output = EditAck;

    async fn definition(&self, _prompt: String) -> rig::completion::ToolDefinition {
        rig::completion::ToolDefinition {
            name: Self::NAME.to_string(),
            description: "草拟一条发给发布站点编辑的互链请求，请求站点既有文章链接到本篇客座文章。".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "message": {
                        "type": "string",
                        "description": "互链请求文案"
                    },
                    "target_page": {
                        "type": "string",
                        "description": "希望加链的既有文章URL"
                    }
                },
                "required": ["message"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        println!("   🔧 tool called...request_link");
        self.sink.record(
            Self::NAME,
            serde_json::to_value(&args).map_err(|_| RecorderToolError)?,
        );
        Ok(EditAck::ok())
    }
}

/// 发布URL建议工具
#[derive(Debug, Clone)]
pub struct AgentToolSuggestUrl {
    sink: EditSink,
}

/// URL建议参数
#[derive(Debug, Serialize, Deserialize)]
pub struct SuggestUrlArgs {
    /// 建议的URL slug（不含域名）
    pub url_slug: String,
    /// 建议理由
    pub rationale: Option<String>,
}

impl AgentToolSuggestUrl {
    pub fn new(sink: EditSink) -> Self {
        Self { sink }
    }
}

impl Tool for AgentToolSuggestUrl {
    const NAME: &'static str = "suggest_url";

    type Error = RecorderToolError;
    type Args = SuggestUrlArgs;
    type Output = EditAck;

    async fn definition(&self, _prompt: String) -> rig::completion::ToolDefinition {
        rig::completion::ToolDefinition {
            name: Self::NAME.to_string(),
            description: "为本篇客座文章建议发布URL的slug，应包含目标关键词且符合站点惯例。".to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "url_slug": {
                        "type": "string",
                        "description": "建议的URL slug，小写连字符格式"
                    },
                    "rationale": {
                        "type": "string",
                        "description": "建议理由"
                    }
                },
                "required": ["url_slug"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        println!("   🔧 tool called...suggest_url@{}", args.url_slug);
        self.sink.record(
            Self::NAME,
            serde_json::to_value(&args).map_err(|_| RecorderToolError)?,
        );
        Ok(EditAck::ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recorder_appends_to_sink() {
        let sink = EditSink::new();
        let tool = AgentToolPlaceClientLink::new(sink.clone());

        let ack = tool
            .call(PlaceClientLinkArgs {
                sentence: "Widgets are useful.".to_string(),
                anchor_text: "widgets".to_string(),
                rewritten: "[widgets](https://acme.example/product) are useful.".to_string(),
                reason: None,
            })
            .await
            .unwrap();

        assert!(ack.accepted);
        let calls = sink.drain();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].tool, "place_client_link");
        assert_eq!(calls[0].arguments["anchor_text"], "widgets");
    }

    #[tokio::test]
    async fn test_sink_preserves_call_order() {
        let sink = EditSink::new();
        let internal = AgentToolInsertInternalLink::new(sink.clone());
        let mention = AgentToolAddClientMention::new(sink.clone());

        internal
            .call(InsertInternalLinkArgs {
                sentence: "a".to_string(),
                anchor_text: "a".to_string(),
                target_url: "https://blog.example.com/a".to_string(),
                reason: None,
            })
            .await
            .unwrap();
        mention
            .call(AddClientMentionArgs {
                sentence: "b".to_string(),
                rewritten: "b with Acme".to_string(),
                reason: None,
            })
            .await
            .unwrap();

        let calls = sink.drain();
        assert_eq!(calls[0].tool, "insert_internal_link");
        assert_eq!(calls[1].tool, "add_client_mention");
        assert!(sink.drain().is_empty());
    }
}
