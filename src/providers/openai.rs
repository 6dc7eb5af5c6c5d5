use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::app_config::{OpenAIConfig, ProviderConfig, ProviderKind};
use crate::errors::ProviderError;
use crate::prompts::PromptTemplates;
use crate::providers::{Provider, exchange_json, require_api_key};
use crate::transport::{CallContext, HttpRequest, Transport};

/// OpenAI client for the chat completions API
pub struct OpenAI {
    /// Model, endpoint and API key
    settings: ProviderConfig,
    /// System prompt and temperature
    options: OpenAIConfig,
    /// Prompt templates
    prompts: PromptTemplates,
    /// Shared HTTP transport
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for OpenAI {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAI")
            .field("model", &self.settings.model)
            .field("endpoint", &self.settings.endpoint)
            .field("temperature", &self.options.temperature)
            .finish()
    }
}

/// OpenAI chat request
#[derive(Debug, Serialize)]
pub struct OpenAIRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<OpenAIMessage>,

    /// Temperature for generation
    temperature: f32,
}

/// OpenAI message format
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OpenAIMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,

    /// Content of the message, null for some assistant replies
    #[serde(default)]
    pub content: Option<String>,
}

/// OpenAI chat response
#[derive(Debug, Deserialize)]
pub struct OpenAIResponse {
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub choices: Vec<OpenAIChoice>,
    /// Token usage information
    #[serde(default)]
    pub usage: Option<OpenAIUsage>,
}

/// A single completion choice
#[derive(Debug, Deserialize)]
pub struct OpenAIChoice {
    pub message: OpenAIMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Token usage information
#[derive(Debug, Deserialize)]
pub struct OpenAIUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
}

impl OpenAIRequest {
    /// Create a new chat request
    pub fn new(model: impl Into<String>, temperature: f32) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature,
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(OpenAIMessage {
            role: role.into(),
            content: Some(content.into()),
        });
        self
    }
}

impl OpenAI {
    /// Create a new OpenAI client, failing when the API key is absent
    pub fn new(
        settings: ProviderConfig,
        options: OpenAIConfig,
        prompts: PromptTemplates,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ProviderError> {
        let settings = ProviderConfig {
            kind: ProviderKind::OpenAI,
            ..settings
        };
        require_api_key(&settings)?;
        Ok(Self {
            settings,
            options,
            prompts,
            transport,
        })
    }

    /// Build the chat envelope: optional system message, then the prompt
    pub fn build_request(&self, prompt: &str) -> OpenAIRequest {
        let request = OpenAIRequest::new(&self.settings.model, self.options.temperature);
        let request = if self.options.system_prompt.is_empty() {
            request
        } else {
            request.add_message("system", &self.options.system_prompt)
        };
        request.add_message("user", prompt)
    }

    /// Extract `choices[0].message.content`
    pub fn extract_text(response: &OpenAIResponse) -> Option<String> {
        response.choices.first()?.message.content.clone()
    }
}

#[async_trait]
impl Provider for OpenAI {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAI
    }

    fn prompts(&self) -> &PromptTemplates {
        &self.prompts
    }

    async fn send_prompt(&self, ctx: &CallContext, prompt: &str) -> Result<String, ProviderError> {
        debug!("OpenAI request to {}", self.settings.endpoint);

        let request = HttpRequest::new(self.settings.endpoint.clone(), Vec::new())
            .header("Authorization", format!("Bearer {}", self.settings.api_key));
        let payload = self.build_request(prompt);
        let response: OpenAIResponse = exchange_json(
            self.transport.as_ref(),
            ctx,
            ProviderKind::OpenAI,
            request,
            &payload,
        )
        .await?;

        if let Some(usage) = &response.usage {
            debug!(
                "OpenAI usage: {} prompt tokens, {} completion tokens",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        Self::extract_text(&response).ok_or(ProviderError::EmptyResult {
            provider: ProviderKind::OpenAI,
        })
    }
}
