use async_trait::async_trait;
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

use crate::app_config::{ProviderConfig, ProviderKind};
use crate::errors::ProviderError;
use crate::prompts::PromptTemplates;
use crate::providers::{Provider, exchange_json, require_api_key};
use crate::transport::{CallContext, HttpRequest, Transport};

/// Gemini client for the generateContent API
///
/// Authenticates with the API key as the `key` query parameter.
pub struct Gemini {
    /// Model, endpoint and API key
    settings: ProviderConfig,
    /// Prompt templates
    prompts: PromptTemplates,
    /// Shared HTTP transport
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for Gemini {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gemini")
            .field("model", &self.settings.model)
            .field("endpoint", &self.settings.endpoint)
            .finish()
    }
}

/// Gemini generateContent request
#[derive(Debug, Serialize)]
pub struct GeminiRequest {
    /// Conversation contents
    pub contents: Vec<GeminiContent>,
}

/// A content entry made of parts
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct GeminiContent {
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub parts: Vec<GeminiPart>,
}

/// A single part; only text parts are produced or read
#[derive(Debug, Serialize, Deserialize)]
pub struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Gemini generateContent response
#[derive(Debug, Deserialize)]
pub struct GeminiResponse {
    #[serde(default, deserialize_with = "super::null_as_empty")]
    pub candidates: Vec<GeminiCandidate>,
    /// Token usage information
    #[serde(default, rename = "usageMetadata")]
    pub usage_metadata: Option<GeminiUsage>,
}

/// One generated candidate
#[derive(Debug, Deserialize)]
pub struct GeminiCandidate {
    #[serde(default)]
    pub content: Option<GeminiContent>,
}

/// Token counts reported by Gemini
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiUsage {
    #[serde(default)]
    pub prompt_token_count: Option<u64>,
    #[serde(default)]
    pub candidates_token_count: Option<u64>,
}

impl GeminiRequest {
    /// Create a request with a single text part
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: Some(prompt.into()),
                }],
            }],
        }
    }
}

impl Gemini {
    /// Create a new Gemini client, failing when the API key is absent
    pub fn new(
        settings: ProviderConfig,
        prompts: PromptTemplates,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ProviderError> {
        let settings = ProviderConfig {
            kind: ProviderKind::Gemini,
            ..settings
        };
        require_api_key(&settings)?;
        Ok(Self {
            settings,
            prompts,
            transport,
        })
    }

    /// `{endpoint}/{model}:generateContent`, without credentials
    pub fn method_url(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.settings.endpoint.trim_end_matches('/'),
            self.settings.model
        )
    }

    /// Full request URL with the API key as a query parameter
    pub fn request_url(&self) -> Result<String, ProviderError> {
        let mut url = Url::parse(&self.method_url()).map_err(|e| ProviderError::InvalidRequest {
            provider: ProviderKind::Gemini,
            message: format!("invalid endpoint URL: {}", e),
        })?;
        url.query_pairs_mut().append_pair("key", &self.settings.api_key);
        Ok(url.to_string())
    }

    /// Extract `candidates[0].content.parts[0].text`
    pub fn extract_text(response: &GeminiResponse) -> Option<String> {
        response
            .candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .clone()
    }
}

#[async_trait]
impl Provider for Gemini {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn prompts(&self) -> &PromptTemplates {
        &self.prompts
    }

    async fn send_prompt(&self, ctx: &CallContext, prompt: &str) -> Result<String, ProviderError> {
        let url = self.request_url()?;
        debug!("Gemini request to {}", self.method_url());

        let payload = GeminiRequest::new(prompt);
        let response: GeminiResponse = exchange_json(
            self.transport.as_ref(),
            ctx,
            ProviderKind::Gemini,
            HttpRequest::new(url, Vec::new()),
            &payload,
        )
        .await?;

        if let Some(usage) = &response.usage_metadata {
            debug!(
                "Gemini usage: {:?} prompt tokens, {:?} candidate tokens",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        Self::extract_text(&response).ok_or(ProviderError::EmptyResult {
            provider: ProviderKind::Gemini,
        })
    }
}
