/*!
 * Provider implementations for the supported AI backends.
 *
 * This module contains client implementations for each backend wire protocol:
 * - Gemini: contents/parts generateContent API
 * - OpenAI: messages-array chat completions API
 * - Claude: Anthropic messages API
 * - Ollama: local single-prompt completion API
 *
 * Every provider exposes the same four operations. Prompt construction is
 * shared here; each backend only builds its envelope and extracts the text.
 */

use async_trait::async_trait;
use log::{debug, error};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::Debug;
use std::sync::Arc;

use crate::app_config::{Config, ProviderConfig, ProviderKind};
use crate::errors::{AppError, ProviderError, snippet};
use crate::prompts::{Operation, PromptTemplates};
use crate::transport::{CallContext, HttpRequest, Transport};

/// Common trait for all AI providers
///
/// This trait defines the interface that all provider implementations must follow,
/// allowing them to be used interchangeably by the dispatcher. Each operation
/// performs exactly one outbound call and is never retried here.
#[async_trait]
pub trait Provider: Send + Sync + Debug {
    /// Backend this provider talks to
    fn kind(&self) -> ProviderKind;

    /// Templates used for the templated operations
    fn prompts(&self) -> &PromptTemplates;

    /// Send a finished prompt and return the extracted text
    async fn send_prompt(&self, ctx: &CallContext, prompt: &str) -> Result<String, ProviderError>;

    /// Rewrite `input` using the rewrite template
    async fn rewrite(&self, ctx: &CallContext, input: &str) -> Result<String, ProviderError> {
        self.run(ctx, &Operation::Rewrite, input).await
    }

    /// Translate `input` into `target_language`
    async fn translate(
        &self,
        ctx: &CallContext,
        input: &str,
        target_language: &str,
    ) -> Result<String, ProviderError> {
        self.run(ctx, &Operation::translate(target_language), input).await
    }

    /// Summarize `input` using the summarize template
    async fn summarize(&self, ctx: &CallContext, input: &str) -> Result<String, ProviderError> {
        self.run(ctx, &Operation::Summarize, input).await
    }

    /// Send `input` verbatim
    async fn general(&self, ctx: &CallContext, input: &str) -> Result<String, ProviderError> {
        self.run(ctx, &Operation::General, input).await
    }

    /// Build the prompt for `operation` and send it
    async fn run(
        &self,
        ctx: &CallContext,
        operation: &Operation,
        input: &str,
    ) -> Result<String, ProviderError> {
        let prompt = self.prompts().build(operation, input);
        debug!(
            "{}: {} request, prompt is {} chars",
            self.kind(),
            operation.name(),
            prompt.chars().count()
        );
        self.send_prompt(ctx, &prompt).await
    }
}

pub mod claude;
pub mod gemini;
pub mod ollama;
pub mod openai;

pub use claude::Claude;
pub use gemini::Gemini;
pub use ollama::Ollama;
pub use openai::OpenAI;

/// Reject a hosted backend's settings when the API key is absent
/// Read a JSON list where both a missing key and `null` mean empty
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

pub(crate) fn require_api_key(settings: &ProviderConfig) -> Result<(), ProviderError> {
    match settings.kind.api_key_env() {
        Some(env_var) if settings.api_key_missing() => Err(ProviderError::MissingCredential {
            provider: settings.kind,
            env_var,
        }),
        _ => Ok(()),
    }
}

/// Serialize `request`, POST it, and decode the JSON response envelope
///
/// Non-2xx statuses become `BackendError` with the raw body; a body that does
/// not match `Resp` becomes `DecodeFailure`.
pub(crate) async fn exchange_json<Req, Resp>(
    transport: &dyn Transport,
    ctx: &CallContext,
    provider: ProviderKind,
    request: HttpRequest,
    payload: &Req,
) -> Result<Resp, ProviderError>
where
    Req: Serialize + Sync,
    Resp: DeserializeOwned,
{
    let body = serde_json::to_vec(payload).map_err(|e| ProviderError::InvalidRequest {
        provider,
        message: format!("failed to serialize request: {}", e),
    })?;

    let request = HttpRequest { body, ..request };

    let response = transport.post_json(ctx, request).await.map_err(|cause| {
        error!("{} API call failed: {}", provider.display_name(), cause);
        ProviderError::TransportFailure { provider, cause }
    })?;

    if !response.is_success() {
        error!(
            "{} API error ({}): {}",
            provider.display_name(),
            response.status,
            snippet(&response.body)
        );
        return Err(ProviderError::BackendError {
            provider,
            status: response.status,
            body: response.body,
        });
    }

    serde_json::from_str::<Resp>(&response.body).map_err(|e| {
        error!(
            "Failed to parse {} API response: {}. Raw response (first 500 chars): {}",
            provider.display_name(),
            e,
            snippet(&response.body)
        );
        ProviderError::DecodeFailure {
            provider,
            message: e.to_string(),
        }
    })
}

/// Create the provider for `kind` from configuration
///
/// `api_key` is ignored by backends that need none. Hosted backends fail with
/// `MissingCredential` before any network call when it is empty.
pub fn create_provider(
    kind: ProviderKind,
    config: &Config,
    api_key: &str,
    transport: Arc<dyn Transport>,
) -> Result<Box<dyn Provider>, AppError> {
    let prompts = config.prompt_templates()?;
    let settings = config.provider_config(kind, api_key);

    let provider: Box<dyn Provider> = match kind {
        ProviderKind::Gemini => Box::new(Gemini::new(settings, prompts, transport)?),
        ProviderKind::OpenAI => Box::new(OpenAI::new(
            settings,
            config.openai.clone(),
            prompts,
            transport,
        )?),
        ProviderKind::Claude => Box::new(Claude::new(
            settings,
            config.claude.clone(),
            prompts,
            transport,
        )?),
        ProviderKind::Ollama => Box::new(Ollama::new(settings, prompts, transport)),
    };

    debug!("Created {} provider", provider.kind().display_name());
    Ok(provider)
}
