use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::app_config::{ClaudeConfig, ProviderConfig, ProviderKind};
use crate::errors::ProviderError;
use crate::prompts::PromptTemplates;
use crate::providers::{Provider, exchange_json, require_api_key};
use crate::transport::{CallContext, HttpRequest, Transport};

/// Claude client for interacting with the Anthropic messages API
pub struct Claude {
    /// Model, endpoint and API key
    settings: ProviderConfig,
    /// Token limit and API version
    options: ClaudeConfig,
    /// Prompt templates
    prompts: PromptTemplates,
    /// Shared HTTP transport
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for Claude {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Claude")
            .field("model", &self.settings.model)
            .field("endpoint", &self.settings.endpoint)
            .field("max_tokens", &self.options.max_tokens)
            .finish()
    }
}

/// Claude message request
#[derive(Debug, Serialize)]
pub struct ClaudeRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<ClaudeMessage>,

    /// Maximum number of tokens to generate
    max_tokens: u32,
}

/// Claude message format
#[derive(Debug, Serialize, Deserialize)]
pub struct ClaudeMessage {
    /// Role of the message sender (user, assistant)
    pub role: String,

    /// Content of the message
    pub content: String,
}

/// Token usage information
#[derive(Debug, Deserialize)]
pub struct TokenUsage {
    /// Number of input tokens
    #[serde(default)]
    pub input_tokens: u32,
    /// Number of output tokens
    #[serde(default)]
    pub output_tokens: u32,
}

/// Claude response
#[derive(Debug, Deserialize)]
pub struct ClaudeResponse {
    /// The content blocks of the response
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub content: Vec<ClaudeContent>,
    /// Why generation stopped
    #[serde(default)]
    pub stop_reason: Option<String>,
    /// Token usage information
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

/// Individual content block in a Claude response
#[derive(Debug, Deserialize)]
pub struct ClaudeContent {
    /// The type of content
    #[serde(rename = "type", default)]
    pub content_type: String,

    /// The text content, absent for non-text blocks
    #[serde(default)]
    pub text: Option<String>,
}

impl ClaudeRequest {
    /// Create a new Claude request
    pub fn new(model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            max_tokens,
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, role: impl Into<String>, content: impl Into<String>) -> Self {
        self.messages.push(ClaudeMessage {
            role: role.into(),
            content: content.into(),
        });
        self
    }
}

impl Claude {
    /// Create a new Claude client, failing when the API key is absent
    pub fn new(
        settings: ProviderConfig,
        options: ClaudeConfig,
        prompts: PromptTemplates,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ProviderError> {
        let settings = ProviderConfig {
            kind: ProviderKind::Claude,
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

    /// Build the messages envelope with a single user message
    pub fn build_request(&self, prompt: &str) -> ClaudeRequest {
        ClaudeRequest::new(&self.settings.model, self.options.max_tokens).add_message("user", prompt)
    }

    /// Extract `content[0].text`
    pub fn extract_text(response: &ClaudeResponse) -> Option<String> {
        response.content.first()?.text.clone()
    }
}

#[async_trait]
impl Provider for Claude {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Claude
    }

    fn prompts(&self) -> &PromptTemplates {
        &self.prompts
    }

    async fn send_prompt(&self, ctx: &CallContext, prompt: &str) -> Result<String, ProviderError> {
        debug!("Claude request to {}", self.settings.endpoint);

        let request = HttpRequest::new(self.settings.endpoint.clone(), Vec::new())
            .header("x-api-key", &self.settings.api_key)
            .header("anthropic-version", &self.options.anthropic_version);
        let payload = self.build_request(prompt);
        let response: ClaudeResponse = exchange_json(
            self.transport.as_ref(),
            ctx,
            ProviderKind::Claude,
            request,
            &payload,
        )
        .await?;

        if let Some(usage) = &response.usage {
            debug!(
                "Claude usage: {} input tokens, {} output tokens, stop reason {:?}",
                usage.input_tokens, usage.output_tokens, response.stop_reason
            );
        }

        Self::extract_text(&response).ok_or(ProviderError::EmptyResult {
            provider: ProviderKind::Claude,
        })
    }
}
