//! Anthropic Messages API client.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::{debug, instrument};

use crate::config::AiConfig;

use super::error::{AiError, ApiErrorResponse};
use super::types::{ChatRequest, ChatResponse, Message, Tool, ToolChoice};
use super::{GenerativeModel, StructuredPrompt};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Claude API client.
#[derive(Clone)]
pub struct ClaudeClient {
    inner: Arc<ClaudeClientInner>,
}

struct ClaudeClientInner {
    client: reqwest::Client,
    model: String,
}

impl ClaudeClient {
    /// Create a new client with the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns `AiError::Config` if the API key is not a valid header value
    /// or the HTTP client cannot be built.
    pub fn new(config: &AiConfig) -> Result<Self, AiError> {
        let api_key = HeaderValue::from_str(config.api_key.expose_secret())
            .map_err(|_| AiError::Config("API key contains invalid characters".to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("x-api-key", api_key);
        headers.insert(
            "anthropic-version",
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| AiError::Config(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(ClaudeClientInner {
                client,
                model: config.model.clone(),
            }),
        })
    }

    /// Send a single-turn request that must be answered by calling `tool`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns an error response.
    #[instrument(skip(self, system, messages, tool), fields(model = %self.inner.model, tool = %tool.name))]
    pub async fn call_tool(
        &self,
        system: String,
        messages: Vec<Message>,
        tool: Tool,
    ) -> Result<ChatResponse, AiError> {
        let request = ChatRequest {
            model: self.inner.model.clone(),
            max_tokens: DEFAULT_MAX_TOKENS,
            messages,
            system: Some(system),
            tool_choice: Some(ToolChoice::Tool {
                name: tool.name.clone(),
            }),
            tools: vec![tool],
        };

        let response = self
            .inner
            .client
            .post(ANTHROPIC_API_URL)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(error_from_status(status, response).await);
        }

        let body = response.text().await?;
        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| AiError::Parse(format!("Failed to parse response: {e}")))?;
        debug!(
            input_tokens = parsed.usage.input_tokens,
            output_tokens = parsed.usage.output_tokens,
            "Model responded"
        );
        Ok(parsed)
    }
}

#[async_trait]
impl GenerativeModel for ClaudeClient {
    async fn generate(&self, prompt: StructuredPrompt) -> Result<serde_json::Value, AiError> {
        let tool_name = prompt.tool.name.clone();
        let response = self
            .call_tool(prompt.system, vec![Message::user(prompt.user)], prompt.tool)
            .await?;
        response
            .tool_input(&tool_name)
            .cloned()
            .ok_or_else(|| AiError::Parse(format!("model did not call {tool_name}")))
    }
}

/// Map an error status code to an `AiError`.
async fn error_from_status(status: reqwest::StatusCode, response: reqwest::Response) -> AiError {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);
        return AiError::RateLimited(retry_after);
    }

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return AiError::Unauthorized("Invalid API key".to_string());
    }

    match response.text().await {
        Ok(body) => match serde_json::from_str::<ApiErrorResponse>(&body) {
            Ok(api_error) => AiError::Api {
                error_type: api_error.error.error_type,
                message: api_error.error.message,
            },
            Err(_) => AiError::Api {
                error_type: status.to_string(),
                message: body,
            },
        },
        Err(e) => AiError::Http(e),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;

    use super::*;

    #[test]
    fn test_client_is_send_sync_clone() {
        fn assert_traits<T: Send + Sync + Clone>() {}
        assert_traits::<ClaudeClient>();
    }

    #[test]
    fn test_rejects_key_with_newline() {
        let config = AiConfig {
            api_key: SecretString::from("sk-ant\nbad"),
            model: "claude-sonnet-4-20250514".to_string(),
            timeout: Duration::from_secs(5),
        };
        assert!(matches!(ClaudeClient::new(&config), Err(AiError::Config(_))));
    }
}
