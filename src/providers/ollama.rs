use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::errors::ProviderError;
use crate::providers::{CompletionRequest, Provider};

/// Path of the single-prompt endpoint
const GENERATE_PATH: &str = "/api/generate";
/// Path of the message-list endpoint, used when the generate path is missing
const CHAT_PATH: &str = "/api/chat";
/// Path used to probe the server
const VERSION_PATH: &str = "/api/version";

/// Ollama client for interacting with Ollama API
#[derive(Debug)]
pub struct Ollama {
    /// Base URL of the Ollama API, without trailing slash
    base_url: String,
    /// HTTP client for making requests
    client: Client,
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
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
}

/// Generation options for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Chat message object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user, assistant)
    pub role: String,
    /// Content of the message
    pub content: String,
}

/// Chat request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model name to use for generation
    model: String,
    /// Messages of the conversation
    messages: Vec<ChatMessage>,
    /// Whether to stream the response
    stream: bool,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
}

impl GenerationRequest {
    /// Build the single-prompt shape of a completion request
    pub fn from_completion(request: &CompletionRequest) -> Self {
        Self {
            model: request.model.clone(),
            prompt: request.combined_prompt(),
            stream: false,
            options: request.temperature.map(|temperature| GenerationOptions { temperature: Some(temperature) }),
        }
    }
}

impl ChatRequest {
    /// Build the message-list shape: the instruction as system message and
    /// the bare source text as user message
    pub fn from_completion(request: &CompletionRequest) -> Self {
        Self {
            model: request.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: request.instruction.clone(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.text.clone(),
                },
            ],
            stream: false,
            options: request.temperature.map(|temperature| GenerationOptions { temperature: Some(temperature) }),
        }
    }
}

impl Ollama {
    /// Create a new Ollama client for a base URL such as `http://localhost:11434`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        let client = Client::builder()
            .timeout(timeout)
            // Ollama uses HTTP/1.1
            .http1_only()
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .map_err(|e| ProviderError::ConnectionError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { base_url, client })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Pull the generated text out of either response shape
    ///
    /// Prefers a non-empty `response` field, then `message.content`; a body
    /// carrying neither yields an empty string.
    pub fn extract_text(body: &Value) -> String {
        let response = body.get("response").and_then(Value::as_str).unwrap_or("");
        if !response.is_empty() {
            return response.to_string();
        }

        body.get("message")
            .and_then(|message| message.get("content"))
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string()
    }

    /// POST a JSON body and parse the JSON reply
    async fn post_json<T: Serialize + Sync + ?Sized>(&self, path: &str, body: &T) -> Result<Value, ProviderError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self.client.post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| Self::transport_error(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: error_text,
            });
        }

        let response_text = response.text().await
            .map_err(|e| ProviderError::RequestFailed(format!("Failed to read response body from {}: {}", url, e)))?;

        serde_json::from_str::<Value>(&response_text).map_err(|e| {
            error!("Failed to parse Ollama API response: {}. Raw response (first 500 chars): {}",
                  e, response_text.chars().take(500).collect::<String>());
            ProviderError::ParseError(e.to_string())
        })
    }

    fn transport_error(url: &str, error: reqwest::Error) -> ProviderError {
        if error.is_timeout() {
            ProviderError::Timeout(format!("{}: {}", url, error))
        } else if error.is_connect() {
            ProviderError::ConnectionError(format!("{}: {}", url, error))
        } else {
            ProviderError::RequestFailed(format!("{}: {}", url, error))
        }
    }
}

#[async_trait]
impl Provider for Ollama {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let generate = GenerationRequest::from_completion(request);

        match self.post_json(GENERATE_PATH, &generate).await {
            Ok(body) => Ok(Self::extract_text(&body)),
            Err(e) if e.is_not_found() => {
                debug!("{} not available, falling back to {}", GENERATE_PATH, CHAT_PATH);
                let chat = ChatRequest::from_completion(request);
                let body = self.post_json(CHAT_PATH, &chat).await?;
                Ok(Self::extract_text(&body))
            }
            Err(e) => Err(e),
        }
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        let url = format!("{}{}", self.base_url, VERSION_PATH);
        let response = self.client.get(&url)
            .send()
            .await
            .map_err(|e| Self::transport_error(&url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::ApiError {
                status_code: status.as_u16(),
                message: format!("Version probe failed at {}", url),
            });
        }

        let body: Value = response.json()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Failed to parse Ollama version response: {}", e)))?;
        debug!("Connected to Ollama {}", body.get("version").and_then(Value::as_str).unwrap_or("unknown"));

        Ok(())
    }
}
