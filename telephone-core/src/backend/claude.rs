//! Text generation through Anthropic's Messages API.

use super::{clean_line, BackendError, TextGenerator};
use async_trait::async_trait;
use base64::Engine;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const API_BASE: &str = "https://api.anthropic.com/v1";
const API_VERSION: &str = "2023-06-01";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

const CREATE_SYSTEM: &str = "You are playing a drawing telephone game. \
Reply with one short, vivid scene that someone could sketch in a minute. \
One sentence, no quotes, no explanation.";

const GUESS_SYSTEM: &str = "You are playing a drawing telephone game. \
Look at the drawing and guess the short prompt it was drawn from. \
One sentence, no quotes, no explanation.";

/// Claude-backed [`TextGenerator`].
#[derive(Clone)]
pub struct ClaudeText {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: usize,
}

impl ClaudeText {
    /// Create a generator with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .connect_timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 100,
        })
    }

    /// Create a generator from the ANTHROPIC_API_KEY environment variable.
    pub fn from_env() -> Result<Self, BackendError> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| BackendError::NoApiKey)?;
        Self::new(api_key)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    async fn complete(
        &self,
        system: &str,
        content: Vec<ApiContentBlock>,
    ) -> Result<String, BackendError> {
        let request = ApiRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            system: system.to_string(),
            messages: vec![ApiMessage {
                role: "user".to_string(),
                content,
            }],
            temperature: Some(1.0),
        };

        let response = self
            .client
            .post(format!("{API_BASE}/messages"))
            .headers(self.build_headers()?)
            .json(&request)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(BackendError::Api { status, message });
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;

        let text: String = api_response
            .content
            .into_iter()
            .filter_map(|block| match block {
                ApiContent::Text { text } => Some(text),
                ApiContent::Other => None,
            })
            .collect();

        clean_line(&text).ok_or(BackendError::Empty)
    }

    fn build_headers(&self) -> Result<HeaderMap, BackendError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&self.api_key)
                .map_err(|e| BackendError::Parse(format!("Invalid API key: {e}")))?,
        );
        headers.insert("anthropic-version", HeaderValue::from_static(API_VERSION));
        Ok(headers)
    }
}

#[async_trait]
impl TextGenerator for ClaudeText {
    async fn generate_text(&self, context: &str) -> Result<String, BackendError> {
        let prompt = ApiContentBlock::Text {
            text: context.to_string(),
        };
        self.complete(CREATE_SYSTEM, vec![prompt]).await
    }

    async fn describe_drawing(&self, drawing: &str) -> Result<String, BackendError> {
        let drawing_block = match image_media_type(drawing) {
            Some(media_type) => {
                let bytes = tokio::fs::read(drawing).await?;
                ApiContentBlock::Image {
                    source: ApiImageSource {
                        r#type: "base64".to_string(),
                        media_type: media_type.to_string(),
                        data: base64::engine::general_purpose::STANDARD.encode(bytes),
                    },
                }
            }
            None => {
                let sketch = tokio::fs::read_to_string(drawing).await?;
                ApiContentBlock::Text {
                    text: format!("The drawing is this text sketch:\n{sketch}"),
                }
            }
        };

        self.complete(
            GUESS_SYSTEM,
            vec![
                drawing_block,
                ApiContentBlock::Text {
                    text: "What prompt was this drawn from?".to_string(),
                },
            ],
        )
        .await
    }
}

/// Media type for image references Claude can look at directly.
fn image_media_type(drawing: &str) -> Option<&'static str> {
    let extension = Path::new(drawing).extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

#[derive(Debug, Serialize)]
struct ApiRequest {
    model: String,
    max_tokens: usize,
    system: String,
    messages: Vec<ApiMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: String,
    content: Vec<ApiContentBlock>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiContentBlock {
    Text { text: String },
    Image { source: ApiImageSource },
}

#[derive(Debug, Serialize)]
struct ApiImageSource {
    r#type: String,
    media_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    content: Vec<ApiContent>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiContent {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}
