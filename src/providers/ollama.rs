use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::app_config::{ProviderConfig, ProviderKind};
use crate::errors::ProviderError;
use crate::prompts::PromptTemplates;
use crate::providers::{Provider, exchange_json};
use crate::transport::{CallContext, HttpRequest, Transport};

/// Ollama client for interacting with a local Ollama server
///
/// Ollama needs no credentials; any configured API key is ignored.
pub struct Ollama {
    /// Model and endpoint
    settings: ProviderConfig,
    /// Prompt templates
    prompts: PromptTemplates,
    /// Shared HTTP transport
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for Ollama {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ollama")
            .field("model", &self.settings.model)
            .field("endpoint", &self.settings.endpoint)
            .finish()
    }
}

/// Generate request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model name to use for generation
    model: String,
    /// Prompt to generate from
    prompt: String,
    /// Whether to stream the response
    stream: bool,
}

/// Generation response from the Ollama API
#[derive(Debug, Deserialize)]
pub struct GenerationResponse {
    /// Model name
    #[serde(default)]
    pub model: Option<String>,
    /// Generated text
    #[serde(default)]
    pub response: Option<String>,
    /// Whether the generation is complete
    #[serde(default)]
    pub done: bool,
    /// Number of prompt tokens
    #[serde(default)]
    pub prompt_eval_count: Option<u64>,
    /// Number of generated tokens
    #[serde(default)]
    pub eval_count: Option<u64>,
    /// Total duration of the request in nanoseconds
    #[serde(default)]
    pub total_duration: Option<u64>,
}

impl GenerationRequest {
    /// Create a new non-streaming generation request
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            stream: false,
        }
    }
}

impl Ollama {
    /// Create a new Ollama client
    pub fn new(settings: ProviderConfig, prompts: PromptTemplates, transport: Arc<dyn Transport>) -> Self {
        Self {
            settings: ProviderConfig {
                kind: ProviderKind::Ollama,
                ..settings
            },
            prompts,
            transport,
        }
    }

    /// Extract the `response` field
    pub fn extract_text(response: &GenerationResponse) -> Option<String> {
        response.response.clone()
    }
}

#[async_trait]
impl Provider for Ollama {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Ollama
    }

    fn prompts(&self) -> &PromptTemplates {
        &self.prompts
    }

    async fn send_prompt(&self, ctx: &CallContext, prompt: &str) -> Result<String, ProviderError> {
        debug!("Ollama request to {}", self.settings.endpoint);

        let payload = GenerationRequest::new(&self.settings.model, prompt);
        let response: GenerationResponse = exchange_json(
            self.transport.as_ref(),
            ctx,
            ProviderKind::Ollama,
            HttpRequest::new(self.settings.endpoint.clone(), Vec::new()),
            &payload,
        )
        .await?;

        if !response.done {
            debug!("Ollama reported an unfinished generation");
        }
        if let (Some(prompt_tokens), Some(eval_tokens)) = (response.prompt_eval_count, response.eval_count) {
            debug!(
                "Ollama usage: {} prompt tokens, {} generated tokens in {:?} ns",
                prompt_tokens, eval_tokens, response.total_duration
            );
        }

        Self::extract_text(&response).ok_or(ProviderError::EmptyResult {
            provider: ProviderKind::Ollama,
        })
    }
}
