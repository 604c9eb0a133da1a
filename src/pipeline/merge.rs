//! 文本修改合并器
//!
//! 把一组位置化的文本修改应用到基准文档上，产出下一个文档版本。
//! 修改按列表顺序依次应用，重叠的修改后者生效（last-wins，见下）；
//! 编辑范围之外的内容逐字节保留。

use serde::{Deserialize, Serialize};

/// 编辑提案来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditSource {
    #[serde(rename = "internal_links")]
    InternalLinks,
    #[serde(rename = "client_mention")]
    ClientMention,
    #[serde(rename = "client_link")]
    ClientLink,
    #[serde(rename = "images")]
    Images,
}

/// 一条文本修改
///
/// anchor为文档中要被替换的原文片段，replacement为替换内容。
/// 插入语义通过"replacement = 原文 + 新增内容"表达。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextModification {
    pub anchor: String,
    pub replacement: String,
    pub source: EditSource,
}

/// 被跳过的修改
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedModification {
    pub anchor: String,
    pub source: EditSource,
}

/// 合并结果
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// 合并后的文档
    pub document: String,
    /// 成功应用的修改数
    pub applied: usize,
    /// 锚点未命中而被跳过的修改
    pub skipped: Vec<SkippedModification>,
}

/// 把修改列表应用到基准文档
///
/// 按列表顺序依次替换各修改锚点的首次出现。锚点在当前文档中不存在
/// 时跳过该修改并记录，不视为错误：前序修改可能已消耗该锚点，
/// 重叠修改以列表顺序裁决，后者生效。对同一基准重复应用同一列表
/// 产出相同结果。
pub fn apply_modifications(base: &str, modifications: &[TextModification]) -> MergeOutcome {
    let mut document = base.to_string();
    let mut applied = 0;
    let mut skipped = Vec::new();

    for modification in modifications {
        if modification.anchor.is_empty() || !document.contains(modification.anchor.as_str()) {
            skipped.push(SkippedModification {
                anchor: modification.anchor.clone(),
                source: modification.source,
            });
            continue;
        }

        document = document.replacen(modification.anchor.as_str(), &modification.replacement, 1);
        applied += 1;
    }

    MergeOutcome {
        document,
        applied,
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn modification(anchor: &str, replacement: &str) -> TextModification {
        TextModification {
            anchor: anchor.to_string(),
            replacement: replacement.to_string(),
            source: EditSource::InternalLinks,
        }
    }

    #[test]
    fn test_apply_single_replacement() {
        let base = "Widgets are useful. They save time.";
        let outcome = apply_modifications(
            base,
            &[modification(
                "Widgets are useful.",
                "[Widgets](https://blog.example.com/widgets) are useful.",
            )],
        );

        assert_eq!(
            outcome.document,
            "[Widgets](https://blog.example.com/widgets) are useful. They save time."
        );
        assert_eq!(outcome.applied, 1);
        assert!(outcome.skipped.is_empty());
    }

    #[test]
    fn test_content_outside_spans_is_untouched() {
        let base = "Intro.\n\nBody sentence one. Body sentence two.\n\nOutro.";
        let outcome = apply_modifications(
            base,
            &[modification("Body sentence one.", "Edited sentence one.")],
        );

        assert!(outcome.document.starts_with("Intro.\n\n"));
        assert!(outcome.document.ends_with("\n\nOutro."));
        assert!(outcome.document.contains("Body sentence two."));
    }

    #[test]
    fn test_replaces_only_first_occurrence() {
        let base = "repeat. repeat.";
        let outcome = apply_modifications(base, &[modification("repeat.", "done.")]);

        assert_eq!(outcome.document, "done. repeat.");
    }

    #[test]
    fn test_missing_anchor_is_skipped_not_error() {
        let base = "Some article text.";
        let outcome = apply_modifications(base, &[modification("not present", "x")]);

        assert_eq!(outcome.document, base);
        assert_eq!(outcome.applied, 0);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].anchor, "not present");
    }

    #[test]
    fn test_overlapping_modifications_later_wins() {
        let base = "The quick brown fox jumps.";
        // The first edit consumes the anchor the second edit targets; the
        // second then rewrites the survivor, so the later edit's text wins.
        let outcome = apply_modifications(
            base,
            &[
                modification("quick brown fox", "fast fox"),
                modification("fast fox jumps.", "fast fox leaps."),
            ],
        );

        assert_eq!(outcome.document, "The fast fox leaps.");
        assert_eq!(outcome.applied, 2);
    }

    #[test]
    fn test_consumed_anchor_reports_skip() {
        let base = "alpha beta gamma";
        let outcome = apply_modifications(
            base,
            &[
                modification("alpha beta", "delta"),
                modification("alpha", "omega"),
            ],
        );

        assert_eq!(outcome.document, "delta gamma");
        assert_eq!(outcome.skipped.len(), 1);
    }

    #[test]
    fn test_reapplying_to_same_base_is_stable() {
        let base = "Widgets are useful.";
        let mods = vec![modification(
            "Widgets",
            "[Widgets](https://blog.example.com/w)",
        )];

        let first = apply_modifications(base, &mods);
        let second = apply_modifications(base, &mods);
        assert_eq!(first.document, second.document);
    }

    #[test]
    fn test_empty_modification_list() {
        let outcome = apply_modifications("unchanged", &[]);
        assert_eq!(outcome.document, "unchanged");
        assert_eq!(outcome.applied, 0);
    }

    #[test]
    fn test_empty_anchor_is_skipped() {
        let outcome = apply_modifications("text", &[modification("", "x")]);
        assert_eq!(outcome.document, "text");
        assert_eq!(outcome.skipped.len(), 1);
    }
}
