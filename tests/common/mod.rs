/*!
 * Common test utilities for the textai test suite
 */

use std::path::{Path, PathBuf};
use std::fs;
use std::sync::Arc;
use anyhow::Result;
use tempfile::TempDir;

use textai::app_config::{Config, ProviderKind};
use textai::providers::{Provider, create_provider};


pub use mock_transport::{MockReply, MockTransport};

/// API key used for hosted backends in tests
pub const TEST_API_KEY: &str = "test-key";

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &[u8]) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Configuration with short, recognisable templates
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.prompts.rewrite = "Rewrite:".to_string();
    config.prompts.translate = "Translate into {target_language}:".to_string();
    config.prompts.summarize = "Summarize:".to_string();
    config
}

/// Configuration pointing every backend at `base_url`
pub fn config_for_server(base_url: &str) -> Config {
    let mut config = test_config();
    config.base_endpoints.gemini = format!("{}/v1beta/models", base_url);
    config.base_endpoints.openai = format!("{}/v1/chat/completions", base_url);
    config.base_endpoints.claude = format!("{}/v1/messages", base_url);
    config.base_endpoints.ollama = format!("{}/api/generate", base_url);
    config
}

/// Build a provider of `kind` over `transport` with the test key
pub fn provider_with(kind: ProviderKind, config: &Config, transport: Arc<MockTransport>) -> Box<dyn Provider> {
    create_provider(kind, config, TEST_API_KEY, transport).expect("provider should be constructible")
}

/// A well-formed success envelope for `kind` carrying `text`
pub fn success_body(kind: ProviderKind, text: &str) -> String {
    let value = match kind {
        ProviderKind::Gemini => serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": text}], "role": "model"}, "finishReason": "STOP"}],
            "usageMetadata": {"promptTokenCount": 5, "candidatesTokenCount": 2}
        }),
        ProviderKind::OpenAI => serde_json::json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": text}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 5, "completion_tokens": 2}
        }),
        ProviderKind::Claude => serde_json::json!({
            "id": "msg_1",
            "type": "message",
            "role": "assistant",
            "model": "claude-3-5-haiku-latest",
            "content": [{"type": "text", "text": text}],
            "stop_reason": "end_turn",
            "stop_sequence": null,
            "usage": {"input_tokens": 5, "output_tokens": 2}
        }),
        ProviderKind::Ollama => serde_json::json!({
            "model": "llama3.2",
            "created_at": "2024-01-01T00:00:00Z",
            "response": text,
            "done": true,
            "prompt_eval_count": 5,
            "eval_count": 2
        }),
    };
    value.to_string()
}

/// The prompt text a backend received, read back from its request envelope
pub fn sent_prompt(kind: ProviderKind, body: &serde_json::Value) -> String {
    let prompt = match kind {
        ProviderKind::Gemini => &body["contents"][0]["parts"][0]["text"],
        ProviderKind::OpenAI => {
            let messages = body["messages"].as_array().expect("messages array");
            &messages[messages.len() - 1]["content"]
        }
        ProviderKind::Claude => &body["messages"][0]["content"],
        ProviderKind::Ollama => &body["prompt"],
    };
    prompt.as_str().expect("prompt should be a string").to_string()
}
