/*!
 * Tests for the Claude provider
 */

use std::sync::Arc;
use textai::app_config::{ClaudeConfig, ProviderConfig, ProviderKind};
use textai::errors::ProviderError;
use textai::prompts::PromptTemplates;
use textai::providers::Provider;
use textai::providers::claude::{Claude, ClaudeResponse};
use textai::transport::CallContext;

use crate::common::{MockTransport, TEST_API_KEY, provider_with, success_body, test_config};

#[test]
fn test_claude_new_withEmptyKey_shouldFailWithMissingCredential() {
    let result = Claude::new(
        ProviderConfig::new(ProviderKind::Claude),
        ClaudeConfig::default(),
        PromptTemplates::default(),
        Arc::new(MockTransport::new()),
    );

    match result {
        Err(error @ ProviderError::MissingCredential { .. }) => {
            assert_eq!(error.provider(), ProviderKind::Claude);
            assert!(error.to_string().contains("CLAUDE_API_KEY"));
        }
        other => panic!("Expected MissingCredential, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_claude_buildRequest_shouldCarryModelAndMaxTokens() {
    let settings = ProviderConfig::new(ProviderKind::Claude)
        .with_api_key(TEST_API_KEY)
        .with_model("claude-3-opus");
    let options = ClaudeConfig {
        max_tokens: 256,
        ..ClaudeConfig::default()
    };
    let provider = Claude::new(
        settings,
        options,
        PromptTemplates::default(),
        Arc::new(MockTransport::new()),
    )
    .unwrap();

    let json = serde_json::to_value(provider.build_request("hello")).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "model": "claude-3-opus",
            "messages": [{"role": "user", "content": "hello"}],
            "max_tokens": 256
        })
    );
}

#[test]
fn test_claude_extractText_withNonTextFirstBlock_shouldReturnNone() {
    let response: ClaudeResponse =
        serde_json::from_str(r#"{"content":[{"type":"tool_use","id":"x"}]}"#).unwrap();
    assert_eq!(Claude::extract_text(&response), None);
}

#[tokio::test]
async fn test_claude_summarize_shouldSendApiKeyAndVersionHeaders() {
    let transport = MockTransport::replying(200, success_body(ProviderKind::Claude, "Short."));
    let provider = provider_with(ProviderKind::Claude, &test_config(), transport.clone());

    let text = provider
        .summarize(&CallContext::new(), "A very long text.")
        .await
        .unwrap();
    assert_eq!(text, "Short.");

    let request = transport.last_request();
    assert!(request.url.ends_with("/v1/messages"));
    assert_eq!(request.header_value("x-api-key"), Some(TEST_API_KEY));
    assert_eq!(request.header_value("anthropic-version"), Some("2023-06-01"));
    assert_eq!(request.header_value("authorization"), None);

    let body = transport.last_request_json();
    assert_eq!(body["messages"][0]["role"], "user");
    assert_eq!(body["messages"][0]["content"], "Summarize: A very long text.");
    assert_eq!(body["max_tokens"], 1024);
}

#[tokio::test]
async fn test_claude_emptyContent_shouldBeEmptyResult() {
    let transport = MockTransport::replying(200, r#"{"content":[],"stop_reason":"end_turn"}"#);
    let provider = provider_with(ProviderKind::Claude, &test_config(), transport);

    let result = provider.general(&CallContext::new(), "hello").await;
    assert!(matches!(result, Err(ProviderError::EmptyResult { provider: ProviderKind::Claude })));
}

#[tokio::test]
async fn test_claude_overloaded_shouldReturnBackendError() {
    let transport = MockTransport::replying(529, r#"{"type":"error","error":{"type":"overloaded_error"}}"#);
    let provider = provider_with(ProviderKind::Claude, &test_config(), transport);

    let error = provider.general(&CallContext::new(), "hello").await.unwrap_err();
    assert_eq!(error.status(), Some(529));
    assert_eq!(error.provider(), ProviderKind::Claude);
}
