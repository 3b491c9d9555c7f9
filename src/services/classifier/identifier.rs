use crate::error::{AppError, MISSING_KEY_MESSAGE};
use crate::services::image_payload::ImagePayload;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";
pub const FALLBACK_LABEL: &str = "unknown item";

const PROMPT: &str = "Identify this waste item in 1-3 words. Just name the object, nothing else. Examples: 'plastic bottle', 'banana peel', 'battery', 'newspaper'.";
// Low randomness and a short answer keep labels stable across calls.
const TEMPERATURE: f32 = 0.4;
const MAX_OUTPUT_TOKENS: u32 = 50;

/// Turns an image into a short lowercase label naming the object.
#[async_trait]
pub trait Identifier: Send + Sync {
    async fn identify(&self, image: &ImagePayload) -> Result<String, AppError>;
}

#[derive(serde::Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(serde::Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(serde::Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    Image { inline_data: InlineData<'a> },
}

#[derive(serde::Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(serde::Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(serde::Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(serde::Deserialize, Default)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(serde::Deserialize, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(serde::Deserialize, Default)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

/// Pull the label out of a `generateContent` response body.
/// Anything missing, blank or unparseable yields [`FALLBACK_LABEL`].
pub fn extract_label(body: &str) -> String {
    let parsed: GenerateResponse = serde_json::from_str(body).unwrap_or_default();
    parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| FALLBACK_LABEL.to_string())
}

#[derive(Clone)]
pub struct GeminiIdentifier {
    client: reqwest::Client,
    api_base: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiIdentifier {
    pub fn new(
        api_key: Option<String>,
        api_base: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/models/{}:generateContent", self.api_base, self.model)
    }
}

#[async_trait]
impl Identifier for GeminiIdentifier {
    async fn identify(&self, image: &ImagePayload) -> Result<String, AppError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Configuration(MISSING_KEY_MESSAGE.to_string()))?;

        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text { text: PROMPT },
                    Part::Image {
                        inline_data: InlineData {
                            mime_type: image.mime_type(),
                            data: &image.base64,
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        debug!(model = %self.model, mime = image.mime_type(), "sending image to oracle");
        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), body = %body, "oracle returned an error");
            return Err(AppError::Upstream(format!(
                "Gemini API error: {} - {}",
                status.as_u16(),
                body
            )));
        }

        Ok(extract_label(&body))
    }
}
