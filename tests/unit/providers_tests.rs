/*!
 * Behaviour shared by every provider implementation
 */

use std::time::Duration;
use textai::app_config::ProviderKind;
use textai::errors::{ProviderError, TransportFailure};
use textai::prompts::Operation;
use textai::providers::Provider;
use textai::transport::CallContext;

use crate::common::{
    MockReply, MockTransport, provider_with, sent_prompt, success_body, test_config,
};

/// Every operation returns the backend's text and sends the expected prompt
#[tokio::test]
async fn test_allProviders_allOperations_shouldSendTemplatedPromptAndReturnText() {
    let config = test_config();
    let cases = [
        (Operation::Rewrite, "Rewrite: some text"),
        (Operation::translate("German"), "Translate into German: some text"),
        (Operation::Summarize, "Summarize: some text"),
        (Operation::General, "some text"),
    ];

    for kind in ProviderKind::ALL {
        for (operation, expected_prompt) in &cases {
            let transport = MockTransport::replying(200, success_body(kind, "answer"));
            let provider = provider_with(kind, &config, transport.clone());

            let text = provider
                .run(&CallContext::new(), operation, "some text")
                .await
                .unwrap_or_else(|e| panic!("{} {} failed: {}", kind, operation.name(), e));

            assert_eq!(text, "answer", "{} {}", kind, operation.name());
            assert_eq!(transport.call_count(), 1, "{} {}", kind, operation.name());
            assert_eq!(
                sent_prompt(kind, &transport.last_request_json()),
                *expected_prompt,
                "{} {}",
                kind,
                operation.name()
            );
        }
    }
}

/// A blank target language falls back to English for every backend
#[tokio::test]
async fn test_allProviders_translateWithBlankLanguage_shouldDefaultToEnglish() {
    for kind in ProviderKind::ALL {
        let transport = MockTransport::replying(200, success_body(kind, "hello"));
        let provider = provider_with(kind, &test_config(), transport.clone());

        let text = provider
            .translate(&CallContext::new(), "bonjour", "")
            .await
            .unwrap();
        assert_eq!(text, "hello");

        let prompt = sent_prompt(kind, &transport.last_request_json());
        assert!(prompt.contains("English"), "{}: {}", kind, prompt);
        assert!(prompt.ends_with("bonjour"), "{}: {}", kind, prompt);
    }
}

#[tokio::test]
async fn test_allProviders_serverError_shouldReturnBackendErrorWithRawBody() {
    for kind in ProviderKind::ALL {
        let transport = MockTransport::replying(500, "oops");
        let provider = provider_with(kind, &test_config(), transport);

        match provider.summarize(&CallContext::new(), "text").await {
            Err(ProviderError::BackendError { provider, status, body }) => {
                assert_eq!(provider, kind);
                assert_eq!(status, 500);
                assert_eq!(body, "oops");
            }
            other => panic!("{}: expected BackendError, got {:?}", kind, other),
        }
    }
}

#[tokio::test]
async fn test_allProviders_emptyEnvelope_shouldReturnEmptyResult() {
    for kind in ProviderKind::ALL {
        let transport = MockTransport::replying(200, "{}");
        let provider = provider_with(kind, &test_config(), transport);

        let result = provider.general(&CallContext::new(), "hello").await;
        match result {
            Err(ProviderError::EmptyResult { provider }) => assert_eq!(provider, kind),
            other => panic!("{}: expected EmptyResult, got {:?}", kind, other),
        }
    }
}

/// An explicit `null` result list counts as empty, not as malformed
#[tokio::test]
async fn test_allProviders_nullResultList_shouldReturnEmptyResult() {
    let cases = [
        (ProviderKind::Gemini, r#"{"candidates":null}"#),
        (ProviderKind::Gemini, r#"{"candidates":[{"content":{"parts":null}}]}"#),
        (ProviderKind::OpenAI, r#"{"choices":null}"#),
        (ProviderKind::Claude, r#"{"content":null}"#),
        (ProviderKind::Ollama, r#"{"response":null}"#),
    ];

    for (kind, body) in cases {
        let transport = MockTransport::replying(200, body);
        let provider = provider_with(kind, &test_config(), transport);

        match provider.general(&CallContext::new(), "hello").await {
            Err(ProviderError::EmptyResult { provider }) => assert_eq!(provider, kind),
            other => panic!("{} {}: expected EmptyResult, got {:?}", kind, body, other),
        }
    }
}

#[tokio::test]
async fn test_allProviders_nonJsonBody_shouldReturnDecodeFailure() {
    for kind in ProviderKind::ALL {
        let transport = MockTransport::replying(200, "<html>gateway</html>");
        let provider = provider_with(kind, &test_config(), transport);

        let result = provider.general(&CallContext::new(), "hello").await;
        assert!(
            matches!(result, Err(ProviderError::DecodeFailure { provider, .. }) if provider == kind),
            "{}: {:?}",
            kind,
            result
        );
    }
}

#[tokio::test]
async fn test_allProviders_connectionFailure_shouldReturnTransportFailure() {
    for kind in ProviderKind::ALL {
        let failure = TransportFailure::Connection("connection refused".to_string());
        let transport = MockTransport::failing(failure.clone());
        let provider = provider_with(kind, &test_config(), transport);

        match provider.rewrite(&CallContext::new(), "text").await {
            Err(ProviderError::TransportFailure { provider, cause }) => {
                assert_eq!(provider, kind);
                assert_eq!(cause, failure);
            }
            other => panic!("{}: expected TransportFailure, got {:?}", kind, other),
        }
    }
}

/// A hanging backend is abandoned when the deadline passes
#[tokio::test]
async fn test_allProviders_hangingBackend_shouldFailWithDeadlineExceeded() {
    for kind in ProviderKind::ALL {
        let transport = MockTransport::hanging();
        let provider = provider_with(kind, &test_config(), transport.clone());
        let ctx = CallContext::with_timeout(Duration::from_millis(50));

        let started = std::time::Instant::now();
        let result = provider.general(&ctx, "hello").await;

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(transport.call_count(), 1);
        match result {
            Err(ProviderError::TransportFailure { cause, .. }) => {
                assert_eq!(cause, TransportFailure::DeadlineExceeded);
                assert!(cause.is_cancellation());
            }
            other => panic!("{}: expected DeadlineExceeded, got {:?}", kind, other),
        }
    }
}

#[tokio::test]
async fn test_allProviders_cancelledMidCall_shouldFailWithCanceled() {
    for kind in ProviderKind::ALL {
        let transport = MockTransport::hanging();
        let provider = provider_with(kind, &test_config(), transport);
        let ctx = CallContext::with_timeout(Duration::from_secs(30));

        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        match provider.summarize(&ctx, "text").await {
            Err(ProviderError::TransportFailure { cause, .. }) => {
                assert_eq!(cause, TransportFailure::Canceled);
            }
            other => panic!("{}: expected Canceled, got {:?}", kind, other),
        }
    }
}

#[tokio::test]
async fn test_allProviders_alreadyCancelled_shouldNotReachBackend() {
    for kind in ProviderKind::ALL {
        let transport = MockTransport::replying(200, success_body(kind, "never"));
        let provider = provider_with(kind, &test_config(), transport.clone());
        let ctx = CallContext::new();
        ctx.cancel();

        let result = provider.general(&ctx, "hello").await;
        assert!(matches!(
            result,
            Err(ProviderError::TransportFailure {
                cause: TransportFailure::Canceled,
                ..
            })
        ));
        assert_eq!(transport.call_count(), 0);
    }
}

#[tokio::test]
async fn test_provider_eachCall_shouldSendExactlyOneRequest() {
    let transport = MockTransport::replying(500, "first");
    transport.push(MockReply::Response(textai::transport::HttpResponse::new(
        200,
        success_body(ProviderKind::Ollama, "second"),
    )));
    let provider = provider_with(ProviderKind::Ollama, &test_config(), transport.clone());

    // No retry after a failure: the second reply is only seen by the second call
    let first = provider.general(&CallContext::new(), "one").await;
    assert!(matches!(first, Err(ProviderError::BackendError { status: 500, .. })));
    assert_eq!(transport.call_count(), 1);

    let second = provider.general(&CallContext::new(), "two").await.unwrap();
    assert_eq!(second, "second");
    assert_eq!(transport.call_count(), 2);
}

#[test]
fn test_createProvider_hostedWithoutKey_shouldFailForEveryHostedBackend() {
    use std::sync::Arc;
    use textai::errors::AppError;
    use textai::providers::create_provider;

    for kind in ProviderKind::ALL {
        let transport = Arc::new(MockTransport::new());
        let result = create_provider(kind, &test_config(), "", transport);
        if kind.requires_api_key() {
            match result {
                Err(AppError::Provider(ProviderError::MissingCredential { provider, .. })) => {
                    assert_eq!(provider, kind)
                }
                Err(other) => panic!("{}: expected MissingCredential, got {:?}", kind, other),
                Ok(_) => panic!("{}: expected MissingCredential", kind),
            }
        } else {
            assert!(result.is_ok());
        }
    }
}
