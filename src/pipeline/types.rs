//! 流水线共享类型

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pipeline::merge::{EditSource, TextModification};
use crate::session::SessionStatus;

/// links流水线的调用输入
///
/// 纯数据对象，不承载任何HTTP层语义。恢复会话时从会话记录的
/// input快照反序列化重建。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationInput {
    /// 文章稿件
    pub article: String,
    /// 客户名称
    pub client_name: String,
    /// 客户目标链接
    pub client_url: String,
    /// 期望的锚文本
    pub anchor_text: Option<String>,
    /// 发布站点域名
    pub site_domain: String,
    /// 目标关键词
    pub target_keyword: Option<String>,
    /// 所属工作流标识
    pub parent_workflow_id: Option<String>,
}

/// 站内链接提案
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InternalLink {
    pub sentence: String,
    pub anchor_text: String,
    pub target_url: String,
    pub reason: Option<String>,
}

impl InternalLink {
    /// 转换为文本修改：把句中锚文本替换为markdown链接
    pub fn to_modification(&self) -> TextModification {
        let linked = self.sentence.replacen(
            self.anchor_text.as_str(),
            &format!("[{}]({})", self.anchor_text, self.target_url),
            1,
        );
        TextModification {
            anchor: self.sentence.clone(),
            replacement: linked,
            source: EditSource::InternalLinks,
        }
    }
}

/// 品牌提及提案
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClientMention {
    pub sentence: String,
    pub rewritten: String,
    pub reason: Option<String>,
}

impl ClientMention {
    pub fn to_modification(&self) -> TextModification {
        TextModification {
            anchor: self.sentence.clone(),
            replacement: self.rewritten.clone(),
            source: EditSource::ClientMention,
        }
    }
}

/// 客户链接放置方案
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClientLinkPlacement {
    pub sentence: String,
    pub anchor_text: String,
    pub rewritten: String,
    pub reason: Option<String>,
}

impl ClientLinkPlacement {
    pub fn to_modification(&self) -> TextModification {
        TextModification {
            anchor: self.sentence.clone(),
            replacement: self.rewritten.clone(),
            source: EditSource::ClientLink,
        }
    }
}

/// 配图建议
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ImageSuggestion {
    pub description: String,
    pub alt_text: String,
    pub placement_sentence: Option<String>,
    pub style: Option<String>,
}

impl ImageSuggestion {
    /// 有位置锚点时转换为文本修改：在锚点句后插入图片占位
    pub fn to_modification(&self) -> Option<TextModification> {
        let sentence = self.placement_sentence.as_deref()?;
        let placeholder = format!(
            "{}\n\n![{}](images/{}.png)",
            sentence,
            self.alt_text,
            slugify(&self.alt_text)
        );
        Some(TextModification {
            anchor: sentence.to_string(),
            replacement: placeholder,
            source: EditSource::Images,
        })
    }
}

/// 互链请求
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LinkRequest {
    pub message: String,
    pub target_page: Option<String>,
}

/// 发布URL建议
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UrlSuggestion {
    pub url_slug: String,
    pub rationale: Option<String>,
}

/// 阶段一结果
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Phase1Result {
    pub internal_links: Vec<InternalLink>,
    pub client_mentions: Vec<ClientMention>,
}

/// 阶段二结果
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Phase2Result {
    /// 最终生效的客户链接放置方案（末轮覆盖前轮）
    pub client_link: Option<ClientLinkPlacement>,
    /// 实际进行的对话轮数
    pub refinement_turns: usize,
}

/// 阶段三结果
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Phase3Result {
    pub images: Vec<ImageSuggestion>,
    pub link_requests: Vec<LinkRequest>,
    pub url_suggestion: Option<UrlSuggestion>,
}

/// 编排应用到正文的全部修改
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppliedModifications {
    pub internal_links: Vec<InternalLink>,
    pub client_mentions: Vec<ClientMention>,
    pub client_link: Option<ClientLinkPlacement>,
    pub images: Vec<ImageSuggestion>,
}

/// links流水线结果
///
/// 预期内的失败不以异常形式抛出：success=false且final_article
/// 回退为调用方提供的原文。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkOrchestrationResult {
    pub success: bool,
    pub session_id: Uuid,
    pub final_article: String,
    pub modifications: AppliedModifications,
    pub link_requests: Vec<LinkRequest>,
    pub url_suggestion: Option<UrlSuggestion>,
    pub error: Option<String>,
}

impl LinkOrchestrationResult {
    /// 构造失败结果：原文原样返回
    pub fn failure(session_id: Uuid, article: String, error: String) -> Self {
        Self {
            success: false,
            session_id,
            final_article: article,
            modifications: AppliedModifications::default(),
            link_requests: Vec::new(),
            url_suggestion: None,
            error: Some(error),
        }
    }
}

/// outline流水线的调用输入
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineInput {
    pub prompt: String,
    pub parent_workflow_id: Option<String>,
}

/// outline启动结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineStartResult {
    pub session_id: Uuid,
    pub needs_clarification: bool,
    /// 需要澄清时抛给调用方的问题
    pub questions: Vec<String>,
    /// 无需澄清时一次调用直达的大纲
    pub outline: Option<String>,
    pub citations: Vec<String>,
}

/// outline完成结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineResult {
    pub outline: String,
    pub citations: Vec<String>,
}

/// triage agent的结构化决策
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TriageDecision {
    /// 是否需要向调用方澄清后才能进入调研
    pub needs_clarification: bool,
    pub reasoning: Option<String>,
}

/// 澄清agent的结构化输出
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClarifyingQuestions {
    /// 2-3个澄清问题
    pub questions: Vec<String>,
}

/// 指令构建agent的结构化输出
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResearchBrief {
    /// 交给深度调研agent的完整研究指令
    pub brief: String,
}

/// 会话进度投影（只读，供轮询方使用）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionProgress {
    pub session_id: Uuid,
    pub status: SessionStatus,
    /// 面向人的阶段描述
    pub phase_label: String,
    pub phase1_completed_at: Option<DateTime<Utc>>,
    pub phase2_completed_at: Option<DateTime<Utc>>,
    pub phase3_completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
}

impl SessionProgress {
    /// 三个阶段是否全部完成
    pub fn all_phases_completed(&self) -> bool {
        self.phase1_completed_at.is_some()
            && self.phase2_completed_at.is_some()
            && self.phase3_completed_at.is_some()
    }
}

/// 把文本转成小写连字符slug
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut last_dash = true;
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_link_modification() {
        let link = InternalLink {
            sentence: "Our widget guide covers the basics.".to_string(),
            anchor_text: "widget guide".to_string(),
            target_url: "https://blog.example.com/widget-guide".to_string(),
            reason: None,
        };

        let modification = link.to_modification();
        assert_eq!(modification.anchor, "Our widget guide covers the basics.");
        assert_eq!(
            modification.replacement,
            "Our [widget guide](https://blog.example.com/widget-guide) covers the basics."
        );
        assert_eq!(modification.source, EditSource::InternalLinks);
    }

    #[test]
    fn test_internal_link_with_foreign_anchor_text_keeps_sentence() {
        // Anchor text not present in the quoted sentence: the modification
        // degrades to a no-op replacement instead of corrupting the sentence.
        let link = InternalLink {
            sentence: "A sentence.".to_string(),
            anchor_text: "missing".to_string(),
            target_url: "https://blog.example.com/x".to_string(),
            reason: None,
        };
        assert_eq!(link.to_modification().replacement, "A sentence.");
    }

    #[test]
    fn test_image_modification_requires_placement() {
        let without_placement = ImageSuggestion {
            description: "diagram".to_string(),
            alt_text: "Flow diagram".to_string(),
            placement_sentence: None,
            style: None,
        };
        assert!(without_placement.to_modification().is_none());

        let with_placement = ImageSuggestion {
            placement_sentence: Some("See the flow below.".to_string()),
            ..without_placement
        };
        let modification = with_placement.to_modification().unwrap();
        assert!(modification.replacement.starts_with("See the flow below."));
        assert!(
            modification
                .replacement
                .contains("![Flow diagram](images/flow-diagram.png)")
        );
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Flow Diagram"), "flow-diagram");
        assert_eq!(slugify("  Acme's 10x Guide! "), "acme-s-10x-guide");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn test_failure_result_returns_original_article() {
        let result = LinkOrchestrationResult::failure(
            Uuid::new_v4(),
            "original".to_string(),
            "model unavailable".to_string(),
        );
        assert!(!result.success);
        assert_eq!(result.final_article, "original");
        assert!(result.modifications.client_link.is_none());
        assert_eq!(result.error.as_deref(), Some("model unavailable"));
    }
}
