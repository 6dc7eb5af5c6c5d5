/*!
 * Tests for the Gemini provider
 */

use std::sync::Arc;
use textai::app_config::{ProviderConfig, ProviderKind};
use textai::errors::ProviderError;
use textai::prompts::PromptTemplates;
use textai::providers::Provider;
use textai::providers::gemini::{Gemini, GeminiResponse};
use textai::transport::CallContext;

use crate::common::{MockTransport, TEST_API_KEY, provider_with, success_body, test_config};

fn gemini(transport: Arc<MockTransport>) -> Gemini {
    let settings = ProviderConfig::new(ProviderKind::Gemini)
        .with_api_key("secret key")
        .with_model("gemini-pro")
        .with_endpoint("https://example.test/v1beta/models/");
    Gemini::new(settings, PromptTemplates::default(), transport).expect("gemini should build")
}

#[test]
fn test_gemini_new_withEmptyKey_shouldFailWithMissingCredential() {
    let transport = Arc::new(MockTransport::new());
    let settings = ProviderConfig::new(ProviderKind::Gemini);
    let result = Gemini::new(settings, PromptTemplates::default(), transport.clone());

    match result {
        Err(ProviderError::MissingCredential { provider, env_var }) => {
            assert_eq!(provider, ProviderKind::Gemini);
            assert_eq!(env_var, "GEMINI_API_KEY");
        }
        other => panic!("Expected MissingCredential, got {:?}", other.map(|_| ())),
    }
    assert_eq!(transport.call_count(), 0);
}

#[test]
fn test_gemini_requestUrl_shouldAppendModelAndEncodedKey() {
    let provider = gemini(Arc::new(MockTransport::new()));
    assert_eq!(
        provider.method_url(),
        "https://example.test/v1beta/models/gemini-pro:generateContent"
    );
    assert_eq!(
        provider.request_url().unwrap(),
        "https://example.test/v1beta/models/gemini-pro:generateContent?key=secret+key"
    );
}

#[tokio::test]
async fn test_gemini_general_shouldSendContentsPartsWithKeyInQuery() {
    let transport = MockTransport::replying(200, success_body(ProviderKind::Gemini, "hi"));
    let provider = provider_with(ProviderKind::Gemini, &test_config(), transport.clone());

    let text = provider.general(&CallContext::new(), "hello there").await.unwrap();
    assert_eq!(text, "hi");

    let request = transport.last_request();
    assert!(request.url.ends_with(&format!(":generateContent?key={}", TEST_API_KEY)));
    assert_eq!(request.header_value("authorization"), None);
    assert_eq!(
        transport.last_request_json(),
        serde_json::json!({"contents": [{"parts": [{"text": "hello there"}]}]})
    );
}

#[tokio::test]
async fn test_gemini_extractText_withSpecExample_shouldReturnHi() {
    let body = r#"{"candidates":[{"content":{"parts":[{"text":"hi"}]}}]}"#;
    let response: GeminiResponse = serde_json::from_str(body).unwrap();
    assert_eq!(Gemini::extract_text(&response).as_deref(), Some("hi"));

    let transport = MockTransport::replying(200, body);
    let provider = provider_with(ProviderKind::Gemini, &test_config(), transport);
    assert_eq!(provider.summarize(&CallContext::new(), "text").await.unwrap(), "hi");
}

#[tokio::test]
async fn test_gemini_candidateWithoutParts_shouldBeEmptyResult() {
    let transport = MockTransport::replying(200, r#"{"candidates":[{"content":{"parts":[]}}]}"#);
    let provider = provider_with(ProviderKind::Gemini, &test_config(), transport);

    let result = provider.general(&CallContext::new(), "hello").await;
    assert!(matches!(result, Err(ProviderError::EmptyResult { provider: ProviderKind::Gemini })));
}

#[tokio::test]
async fn test_gemini_blockedCandidate_shouldBeEmptyResult() {
    let transport = MockTransport::replying(200, r#"{"candidates":[{"finishReason":"SAFETY"}]}"#);
    let provider = provider_with(ProviderKind::Gemini, &test_config(), transport);

    let result = provider.general(&CallContext::new(), "hello").await;
    assert!(matches!(result, Err(ProviderError::EmptyResult { .. })));
}
