use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace};

use crate::backend::client::{ChatMessage, VisionClient};
use crate::backend::utils::{check_response_status, handle_http_error};
use crate::error::{LatexifyError, Result};
use crate::media::ImageFile;

const DEFAULT_BASE_URL: &str = "https://api.x.ai/v1";

/// Grok models available for vision queries and completions.
///
/// These are convenience variants for common Grok models. For the latest
/// available models and their identifiers, check the
/// [xAI Models Documentation](https://docs.x.ai/docs/models).
///
/// # Using Custom Models
///
/// Any model name can be specified using the `Custom` variant or `FromStr`:
///
/// ```rust
/// use latexify::GrokModel;
/// use std::str::FromStr;
///
/// let model = GrokModel::Custom("grok-custom".to_string());
/// let model = GrokModel::from_str("grok-custom").unwrap();
/// let model = GrokModel::from_string("grok-custom");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Model {
    /// Grok Vision Beta (original multimodal vision model)
    GrokVisionBeta,
    /// Grok-2 Vision (multimodal vision model)
    Grok2Vision,
    /// Grok-4 (flagship model with 256k context window)
    Grok4,
    /// Grok-3 (previous generation model with 131k context window)
    Grok3,
    /// Grok-3 Mini (efficient variant with 131k context window)
    Grok3Mini,
    /// Custom model name (for new models or Grok-compatible endpoints)
    Custom(String),
}

impl Model {
    pub fn as_str(&self) -> &str {
        match self {
            Model::GrokVisionBeta => "grok-vision-beta",
            Model::Grok2Vision => "grok-2-vision-1212",
            Model::Grok4 => "grok-4-0709",
            Model::Grok3 => "grok-3",
            Model::Grok3Mini => "grok-3-mini",
            Model::Custom(name) => name,
        }
    }

    /// Create a model from a string. This is a convenience method that always
    /// succeeds: unknown names become `Custom(name)`.
    pub fn from_string(name: impl Into<String>) -> Self {
        let name = name.into();
        match name.as_str() {
            "grok-vision-beta" => Model::GrokVisionBeta,
            "grok-2-vision-1212" => Model::Grok2Vision,
            "grok-4-0709" => Model::Grok4,
            "grok-3" => Model::Grok3,
            "grok-3-mini" => Model::Grok3Mini,
            _ => Model::Custom(name),
        }
    }
}

impl FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Model::from_string(s))
    }
}

impl From<&str> for Model {
    fn from(s: &str) -> Self {
        Model::from_string(s)
    }
}

impl From<String> for Model {
    fn from(s: String) -> Self {
        Model::from_string(s)
    }
}

/// Configuration for the Grok client
#[derive(Debug, Clone)]
pub struct GrokConfig {
    pub api_key: String,
    pub model: Model,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout: Option<Duration>,
    /// Custom base URL for Grok-compatible APIs (e.g., local LLMs, proxy endpoints)
    /// Defaults to "https://api.x.ai/v1" if not set
    pub base_url: Option<String>,
}

/// Grok client for vision queries and text completions
pub struct GrokClient {
    config: GrokConfig,
    client: reqwest::Client,
}

// Grok API request and response structures (OpenAI-compatible)
#[derive(Debug, Serialize)]
struct ApiChatMessage {
    role: String,
    content: MessageContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<MessagePart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum MessagePart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ApiChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct ResponseMessage {
    role: String,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageInfo {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
    #[serde(default)]
    usage: Option<UsageInfo>,
}

impl GrokClient {
    /// Create a new Grok client with the provided API key.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Your xAI API key
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use latexify::GrokClient;
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = GrokClient::new("your-xai-api-key")?;
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(name = "grok_client_new", skip(api_key))]
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(LatexifyError::ConfigError(
                "API key cannot be empty".to_string(),
            ));
        }

        info!("Creating new Grok client");
        trace!("API key length: {}", api_key.len());

        let config = GrokConfig {
            api_key,
            model: Model::GrokVisionBeta,
            temperature: 0.0,
            max_tokens: None,
            timeout: None, // Default: no timeout (uses reqwest's default)
            base_url: None,
        };

        debug!("Grok client created with default configuration");
        Ok(Self {
            config,
            client: reqwest::Client::new(),
        })
    }

    /// Create a new Grok client by reading the API key from the
    /// `XAI_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `XAI_API_KEY` is not set. No network
    /// activity happens before the key is found.
    #[instrument(name = "grok_client_from_env")]
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("XAI_API_KEY").map_err(|_| {
            LatexifyError::ConfigError("XAI_API_KEY not found in environment variables".to_string())
        })?;

        info!("Creating new Grok client from environment variable");
        Self::new(api_key)
    }

    /// Set the model to use
    #[instrument(skip(self))]
    pub fn model(mut self, model: Model) -> Self {
        debug!(
            previous_model = ?self.config.model,
            new_model = ?model,
            "Setting Grok model"
        );
        self.config.model = model;
        self
    }

    /// Set the temperature (0.0 to 1.0, lower = more deterministic)
    #[instrument(skip(self))]
    pub fn temperature(mut self, temp: f32) -> Self {
        debug!(
            previous_temp = self.config.temperature,
            new_temp = temp,
            "Setting temperature"
        );
        self.config.temperature = temp;
        self
    }

    /// Set the maximum tokens to generate
    #[instrument(skip(self))]
    pub fn max_tokens(mut self, max: u32) -> Self {
        debug!(
            previous_max = ?self.config.max_tokens,
            new_max = max,
            "Setting max_tokens"
        );
        // Ensure max_tokens is at least 1 to avoid API errors
        self.config.max_tokens = Some(max.max(1));
        self
    }

    /// Set the timeout for HTTP requests.
    ///
    /// Applies to each HTTP request made by the client.
    #[instrument(skip(self))]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        debug!(
            previous_timeout = ?self.config.timeout,
            new_timeout = ?timeout,
            "Setting timeout"
        );
        self.config.timeout = Some(timeout);

        // Rebuild reqwest client with the timeout immediately
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(
                    error = %e,
                    "Failed to build reqwest client with timeout, using default"
                );
                reqwest::Client::new()
            });

        self
    }

    /// Set a custom base URL for Grok-compatible APIs (e.g., local LLMs,
    /// proxy endpoints, test servers).
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL without trailing slash (e.g., "http://localhost:1234/v1")
    #[instrument(skip(self, base_url))]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url_str = base_url.into();
        debug!(
            previous_base_url = ?self.config.base_url,
            new_base_url = %base_url_str,
            "Setting custom base URL"
        );
        self.config.base_url = Some(base_url_str);
        self
    }

    /// Send an image file and a text prompt, returning the model's answer.
    ///
    /// Reads and encodes the image at `path`, builds a single-turn request
    /// with exactly one text part and one inline image part, and returns the
    /// first completion choice's message text.
    #[instrument(
        name = "grok_query_with_image",
        skip(self, path, prompt),
        fields(
            model = %self.config.model.as_str(),
            prompt_len = prompt.len()
        )
    )]
    pub async fn query_with_image(&self, path: impl AsRef<Path>, prompt: &str) -> Result<String> {
        let image = ImageFile::from_path(path)?;
        self.send_chat(&[ChatMessage::user_with_image(prompt, image)])
            .await
    }

    fn build_message_content(msg: &ChatMessage) -> Result<MessageContent> {
        if msg.images.is_empty() {
            return Ok(MessageContent::Text(msg.content.clone()));
        }

        let mut parts = Vec::new();
        if !msg.content.is_empty() {
            parts.push(MessagePart::Text {
                text: msg.content.clone(),
            });
        }

        for image in &msg.images {
            if image.data.is_empty() {
                return Err(LatexifyError::ConfigError(
                    "image inline data cannot be empty".to_string(),
                ));
            }
            if image.mime_type.is_empty() {
                return Err(LatexifyError::ConfigError(
                    "image mime_type cannot be empty".to_string(),
                ));
            }
            parts.push(MessagePart::ImageUrl {
                image_url: ImageUrl {
                    url: image.to_data_uri(),
                    detail: Some("auto".to_string()),
                },
            });
        }

        Ok(MessageContent::Parts(parts))
    }

    async fn send_chat(&self, messages: &[ChatMessage]) -> Result<String> {
        let api_messages: Vec<ApiChatMessage> = messages
            .iter()
            .map(|msg| {
                Ok(ApiChatMessage {
                    role: msg.role.as_str().to_string(),
                    content: Self::build_message_content(msg)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            message_count = api_messages.len(),
            "Building Grok API request"
        );
        let request = ChatCompletionRequest {
            model: self.config.model.as_str().to_string(),
            messages: api_messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let base_url = self.config.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let url = format!("{}/chat/completions", base_url);
        debug!(url = %url, "Sending request to Grok API");
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(handle_http_error)?;

        let response = check_response_status(response).await?;

        debug!("Successfully received response from Grok API");
        let body = response.text().await.map_err(handle_http_error)?;
        let completion: ChatCompletionResponse = serde_json::from_str(&body).map_err(|e| {
            error!(error = %e, "Failed to parse JSON response from Grok API");
            LatexifyError::from(e)
        })?;

        if let Some(usage) = &completion.usage {
            debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Token usage"
            );
        }

        let Some(choice) = completion.choices.first() else {
            error!("Grok API returned empty choices array");
            return Err(LatexifyError::UnexpectedResponse(
                "no completion choices returned".to_string(),
            ));
        };

        if let Some(finish_reason) = &choice.finish_reason {
            trace!(finish_reason = %finish_reason, "Completion finish reason");
        }

        if let Some(content) = &choice.message.content {
            debug!(
                content_len = content.len(),
                "Successfully extracted content from response"
            );
            Ok(content.clone())
        } else {
            error!("No content in Grok API response");
            Err(LatexifyError::UnexpectedResponse(
                "no content in response".to_string(),
            ))
        }
    }
}

#[async_trait]
impl VisionClient for GrokClient {
    #[instrument(
        name = "grok_chat",
        skip(self, messages),
        fields(
            model = %self.config.model.as_str(),
            message_count = messages.len()
        )
    )]
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        self.send_chat(messages).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_content_text_only_serializes_as_string() {
        let msg = ChatMessage::user("hello");
        let content = GrokClient::build_message_content(&msg).expect("content should build");
        let json = serde_json::to_value(&content).expect("content should serialize");
        assert_eq!(json, serde_json::json!("hello"));
    }

    #[test]
    fn test_message_content_with_image_serializes_as_parts() {
        let msg = ChatMessage::user_with_image(
            "Convert this image to LaTeX code",
            ImageFile::from_bytes(b"abc", "image/png"),
        );
        let content = GrokClient::build_message_content(&msg).expect("content should build");
        let json = serde_json::to_value(&content).expect("content should serialize");

        let parts = json.as_array().expect("content should be an array");
        assert_eq!(parts.len(), 2);
        assert_eq!(json[0]["type"], "text");
        assert_eq!(json[0]["text"], "Convert this image to LaTeX code");
        assert_eq!(json[1]["type"], "image_url");
        assert_eq!(json[1]["image_url"]["url"], "data:image/png;base64,YWJj");
    }

    #[test]
    fn test_message_content_empty_image_data_rejected() {
        let msg = ChatMessage::user_with_image("prompt", ImageFile::from_bytes(b"", "image/png"));
        let result = GrokClient::build_message_content(&msg);
        assert!(matches!(result, Err(LatexifyError::ConfigError(_))));
    }

    #[test]
    fn test_request_serialization_skips_absent_max_tokens() {
        let request = ChatCompletionRequest {
            model: "grok-vision-beta".to_string(),
            messages: vec![ApiChatMessage {
                role: "user".to_string(),
                content: MessageContent::Text("hi".to_string()),
            }],
            temperature: 0.0,
            max_tokens: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "grok-vision-beta");
        assert!(json.get("max_tokens").is_none());
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "hi");
    }

    #[test]
    fn test_model_from_string_round_trip() {
        assert_eq!(Model::from_string("grok-vision-beta"), Model::GrokVisionBeta);
        assert_eq!(Model::from_string("grok-2-vision-1212"), Model::Grok2Vision);
        assert_eq!(
            Model::from_string("grok-new-model"),
            Model::Custom("grok-new-model".to_string())
        );
        assert_eq!(Model::from_string("grok-3").as_str(), "grok-3");
    }

    #[test]
    fn test_new_rejects_empty_api_key() {
        let result = GrokClient::new("");
        assert!(matches!(result, Err(LatexifyError::ConfigError(_))));
    }
}
