use super::*;
use std::io::Write;

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.pipeline, PipelineKind::Links);
    assert!(config.article_path.is_none());
    assert!(config.outline_prompt.is_none());
    assert!(config.client_name.is_empty());
    assert!(!config.verbose);
}

#[test]
fn test_default_llm_config() {
    let llm = LLMConfig::default();

    assert_eq!(llm.provider, LLMProvider::OpenAI);
    assert!(!llm.api_base_url.is_empty());
    assert!(!llm.model_efficient.is_empty());
    assert!(!llm.model_powerful.is_empty());
    assert_eq!(llm.max_tokens, 131072);
    assert_eq!(llm.temperature, 0.1);
    assert_eq!(llm.retry_attempts, 3);
    assert_eq!(llm.retry_delay_ms, 1000);
    assert_eq!(llm.timeout_seconds, 300);
    assert!(!llm.disable_preset_tools);
}

#[test]
fn test_default_store_config() {
    let store = StoreConfig::default();

    assert!(store.persist);
    assert_eq!(store.store_dir, PathBuf::from(".weaver/sessions"));
}

#[test]
fn test_provider_from_str() {
    use std::str::FromStr;

    assert_eq!(LLMProvider::from_str("openai").unwrap(), LLMProvider::OpenAI);
    assert_eq!(
        LLMProvider::from_str("DeepSeek").unwrap(),
        LLMProvider::DeepSeek
    );
    assert_eq!(
        LLMProvider::from_str("anthropic").unwrap(),
        LLMProvider::Anthropic
    );
    assert!(LLMProvider::from_str("unknown").is_err());
}

#[test]
fn test_provider_display_roundtrip() {
    use std::str::FromStr;

    for provider in [
        LLMProvider::OpenAI,
        LLMProvider::Moonshot,
        LLMProvider::DeepSeek,
        LLMProvider::Mistral,
        LLMProvider::OpenRouter,
        LLMProvider::Anthropic,
        LLMProvider::Gemini,
        LLMProvider::Ollama,
    ] {
        let rendered = provider.to_string();
        assert_eq!(LLMProvider::from_str(&rendered).unwrap(), provider);
    }
}

#[test]
fn test_validate_links_requires_article_and_client() {
    let config = Config::default();
    assert!(config.validate().is_err());

    let config = Config {
        article_path: Some(PathBuf::from("draft.md")),
        client_name: "Acme".to_string(),
        client_url: "https://acme.example/product".to_string(),
        site_domain: "blog.example.com".to_string(),
        ..Default::default()
    };
    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_outline_requires_prompt() {
    let config = Config {
        pipeline: PipelineKind::Outline,
        ..Default::default()
    };
    assert!(config.validate().is_err());

    let config = Config {
        pipeline: PipelineKind::Outline,
        outline_prompt: Some("   ".to_string()),
        ..Default::default()
    };
    assert!(config.validate().is_err());

    let config = Config {
        pipeline: PipelineKind::Outline,
        outline_prompt: Some("Write a guide to Rust async".to_string()),
        ..Default::default()
    };
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_from_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("weaver.toml");
    let mut file = File::create(&path).unwrap();
    write!(
        file,
        r#"
pipeline = "links"
article_path = "draft.md"
client_name = "Acme"
client_url = "https://acme.example/product"
site_domain = "blog.example.com"
verbose = true

[llm]
provider = "deepseek"
api_key = "sk-test"
api_base_url = "https://api.deepseek.com"
model_efficient = "deepseek-chat"
model_powerful = "deepseek-reasoner"
max_tokens = 32768
temperature = 0.2
retry_attempts = 2
retry_delay_ms = 500
timeout_seconds = 120
disable_preset_tools = false

[store]
persist = false
store_dir = ".weaver/sessions"
"#
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.pipeline, PipelineKind::Links);
    assert_eq!(config.llm.provider, LLMProvider::DeepSeek);
    assert_eq!(config.llm.max_tokens, 32768);
    assert!(!config.store.persist);
    assert!(config.verbose);
}

#[test]
fn test_config_from_missing_file() {
    let path = PathBuf::from("/nonexistent/weaver.toml");
    assert!(Config::from_file(&path).is_err());
}
