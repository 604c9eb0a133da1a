use anyhow::{Result, anyhow};
use serde_json::Value;

use crate::config::LLMConfig;
use crate::llm::runtime::ModelTier;

/// 按模型档位选择模型
pub fn befitting_model(llm_config: &LLMConfig, tier: ModelTier) -> String {
    match tier {
        ModelTier::Efficient => llm_config.model_efficient.clone(),
        ModelTier::Powerful => llm_config.model_powerful.clone(),
    }
}

/// 从模型回复中提取JSON负载
///
/// 容忍三种形态：裸JSON、```json围栏、混杂说明文字的回复（取首个
/// 大括号到末个大括号之间的内容）。
pub fn parse_json_payload(response: &str) -> Result<Value> {
    let trimmed = response.trim();

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Ok(value);
    }

    // 围栏代码块
    if let Some(fenced) = extract_fenced_block(trimmed)
        && let Ok(value) = serde_json::from_str::<Value>(fenced.trim())
    {
        return Ok(value);
    }

    // 混杂文本，截取大括号范围
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}'))
        && start < end
        && let Ok(value) = serde_json::from_str::<Value>(&trimmed[start..=end])
    {
        return Ok(value);
    }

    Err(anyhow!("模型回复中未找到可解析的JSON负载"))
}

/// 提取```json或```围栏中的内容
fn extract_fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after_fence = &text[start + 3..];
    let body_start = after_fence.find('\n')?;
    let body = &after_fence[body_start + 1..];
    let end = body.find("```")?;
    Some(&body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_json() {
        let value = parse_json_payload(r#"{"needs_clarification": true}"#).unwrap();
        assert_eq!(value["needs_clarification"], true);
    }

    #[test]
    fn test_parse_fenced_json() {
        let response = "Here is the result:\n```json\n{\"questions\": [\"q1\", \"q2\"]}\n```";
        let value = parse_json_payload(response).unwrap();
        assert_eq!(value["questions"][1], "q2");
    }

    #[test]
    fn test_parse_json_embedded_in_prose() {
        let response = "根据分析，结论如下：{\"url_slug\": \"acme-guide\"} 以上。";
        let value = parse_json_payload(response).unwrap();
        assert_eq!(value["url_slug"], "acme-guide");
    }

    #[test]
    fn test_parse_failure() {
        assert!(parse_json_payload("no json here").is_err());
    }

    #[test]
    fn test_befitting_model() {
        let config = LLMConfig {
            model_efficient: "fast".to_string(),
            model_powerful: "smart".to_string(),
            ..Default::default()
        };
        assert_eq!(befitting_model(&config, ModelTier::Efficient), "fast");
        assert_eq!(befitting_model(&config, ModelTier::Powerful), "smart");
    }
}
