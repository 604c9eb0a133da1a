use super::*;
use crate::llm::events::{AgentEvent, AgentRun};
use crate::llm::mock::{MockAgentRuntime, MockBehavior};
use crate::pipeline::types::AppliedModifications;
use serde_json::json;
use uuid::Uuid;

fn test_context(runtime: MockAgentRuntime) -> PipelineContext {
    PipelineContext::with_parts(
        Config::default(),
        Arc::new(runtime),
        Arc::new(MemorySessionStore::new()),
    )
}

fn empty_run() -> MockBehavior {
    MockBehavior::Run(AgentRun::default())
}

#[tokio::test]
async fn test_links_pipeline_wiring_through_context() {
    let runtime = MockAgentRuntime::new();
    runtime.script(
        "internal-links",
        MockBehavior::Run(AgentRun::new(vec![AgentEvent::ToolCalled {
            name: "insert_internal_link".to_string(),
            arguments: json!({
                "sentence": "Widgets save time.",
                "anchor_text": "Widgets",
                "target_url": "https://blog.example.com/widgets"
            }),
        }])),
    );
    runtime.script("client-mention", empty_run());
    // Four scripted turns for the client-link conversation
    for _ in 0..4 {
        runtime.script("client-link", empty_run());
    }
    runtime.script("images", empty_run());
    runtime.script("link-requests", empty_run());
    runtime.script("url-suggestion", empty_run());

    let context = test_context(runtime);
    let input = OrchestrationInput {
        article: "Widgets save time. They are great.".to_string(),
        client_name: "Acme".to_string(),
        client_url: "https://acme.example/product".to_string(),
        anchor_text: None,
        site_domain: "blog.example.com".to_string(),
        target_keyword: None,
        parent_workflow_id: None,
    };

    let result = links::orchestrate(&context, input).await;
    assert!(result.success);
    assert!(result.final_article.contains("[Widgets](https://blog.example.com/widgets)"));
}

#[test]
fn test_finish_links_fails_on_unsuccessful_result() {
    let config = Config::default();
    let result = LinkOrchestrationResult::failure(
        Uuid::new_v4(),
        "article".to_string(),
        "model down".to_string(),
    );

    let outcome = finish_links(&config, &result);
    assert!(outcome.is_err());
}

#[test]
fn test_finish_links_writes_output_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let output_path = dir.path().join("final.md");
    let config = Config {
        output_path: Some(output_path.clone()),
        ..Default::default()
    };

    let result = LinkOrchestrationResult {
        success: true,
        session_id: Uuid::new_v4(),
        final_article: "final text".to_string(),
        modifications: AppliedModifications::default(),
        link_requests: Vec::new(),
        url_suggestion: None,
        error: None,
    };

    finish_links(&config, &result).unwrap();
    assert_eq!(std::fs::read_to_string(output_path).unwrap(), "final text");
}

#[test]
fn test_finish_outline_writes_output_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let output_path = dir.path().join("outline.md");
    let config = Config {
        output_path: Some(output_path.clone()),
        ..Default::default()
    };

    finish_outline(&config, "## Outline", &["https://a.example".to_string()]).unwrap();
    assert_eq!(std::fs::read_to_string(output_path).unwrap(), "## Outline");
}
