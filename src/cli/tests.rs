use super::*;
use crate::config::PipelineKind;
use clap::Parser;

fn parse(args: &[&str]) -> Args {
    Args::try_parse_from(std::iter::once("linkweaver-rs").chain(args.iter().copied())).unwrap()
}

#[test]
fn test_minimal_links_args() {
    let args = parse(&[
        "--article",
        "draft.md",
        "--client-name",
        "Acme",
        "--client-url",
        "https://acme.example/product",
        "--site",
        "blog.example.com",
    ]);

    let config = args.into_config();
    assert_eq!(config.pipeline, PipelineKind::Links);
    assert_eq!(config.article_path, Some(PathBuf::from("draft.md")));
    assert_eq!(config.client_name, "Acme");
    assert_eq!(config.client_url, "https://acme.example/product");
    assert_eq!(config.site_domain, "blog.example.com");
    assert!(config.validate().is_ok());
}

#[test]
fn test_outline_args() {
    let args = parse(&["--outline", "Write a comprehensive guide to Rust async"]);

    let config = args.into_config();
    assert_eq!(config.pipeline, PipelineKind::Outline);
    assert_eq!(
        config.outline_prompt.as_deref(),
        Some("Write a comprehensive guide to Rust async")
    );
    assert!(config.validate().is_ok());
}

#[test]
fn test_llm_overrides() {
    let args = parse(&[
        "--outline",
        "topic",
        "--llm-provider",
        "deepseek",
        "--model-efficient",
        "deepseek-chat",
        "--model-powerful",
        "deepseek-reasoner",
        "--max-tokens",
        "32768",
        "--temperature",
        "0.5",
        "--timeout-seconds",
        "60",
    ]);

    let config = args.into_config();
    assert_eq!(config.llm.provider, crate::config::LLMProvider::DeepSeek);
    assert_eq!(config.llm.model_efficient, "deepseek-chat");
    assert_eq!(config.llm.model_powerful, "deepseek-reasoner");
    assert_eq!(config.llm.max_tokens, 32768);
    assert_eq!(config.llm.temperature, 0.5);
    assert_eq!(config.llm.timeout_seconds, 60);
}

#[test]
fn test_unknown_provider_keeps_existing() {
    let args = parse(&["--outline", "topic", "--llm-provider", "whatever"]);

    let config = args.into_config();
    assert_eq!(config.llm.provider, crate::config::LLMProvider::OpenAI);
}

#[test]
fn test_store_flags() {
    let args = parse(&[
        "--outline",
        "topic",
        "--store-dir",
        "/tmp/weaver-sessions",
        "--no-persist",
    ]);

    let config = args.into_config();
    assert_eq!(config.store.store_dir, PathBuf::from("/tmp/weaver-sessions"));
    assert!(!config.store.persist);
}

#[test]
fn test_resume_flag() {
    let args = parse(&["--resume", "0193adfc-aaaa-bbbb-cccc-0123456789ab"]);

    let config = args.into_config();
    assert_eq!(
        config.resume_session_id.as_deref(),
        Some("0193adfc-aaaa-bbbb-cccc-0123456789ab")
    );
    // Resume pulls its input from the persisted session snapshot
    assert!(config.validate().is_ok());
}

#[test]
fn test_verbose_flag() {
    let args = parse(&["--outline", "topic", "--verbose"]);
    let config = args.into_config();
    assert!(config.verbose);
}
