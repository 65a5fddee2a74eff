use crate::types::{PipelineError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, warn};

/// Payload sent to the model: either a bare prompt string or a structured
/// content list, matching the proxy's `string|array` contract.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ModelContents {
    Prompt(String),
    Parts(Vec<Value>),
}

impl ModelContents {
    /// Flatten to text for logging and call recording.
    pub fn as_text(&self) -> String {
        match self {
            ModelContents::Prompt(prompt) => prompt.clone(),
            ModelContents::Parts(parts) => serde_json::to_string(parts).unwrap_or_default(),
        }
    }
}

/// Generation options, split into named modes so image-only and text-only
/// knobs cannot be mixed on one request.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum GenerationConfig {
    Text(TextConfig),
    Image(ImageConfig),
}

impl GenerationConfig {
    pub fn is_image_generation(&self) -> bool {
        matches!(self, GenerationConfig::Image(_))
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Value>>,
}

impl TextConfig {
    /// Plain prose request with no structural constraints.
    pub fn plain() -> Self {
        Self::default()
    }

    /// Constrain the response to a JSON shape; the proxy returns the result
    /// as serialized JSON text for the caller to parse.
    pub fn with_schema(schema: Value) -> Self {
        Self {
            response_mime_type: Some("application/json".to_string()),
            response_schema: Some(schema),
            tools: None,
        }
    }

    /// Enable web-search augmentation.
    pub fn with_search() -> Self {
        Self {
            response_mime_type: None,
            response_schema: None,
            tools: Some(vec![serde_json::json!({ "googleSearch": {} })]),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    pub is_image_generation: bool,
    pub number_of_images: u8,
    pub aspect_ratio: String,
    pub output_mime_type: String,
}

impl ImageConfig {
    /// Single 16:9 JPEG, the shape every image call site in the pipeline uses.
    pub fn single_jpeg_16x9() -> Self {
        Self {
            is_image_generation: true,
            number_of_images: 1,
            aspect_ratio: "16:9".to_string(),
            output_mime_type: "image/jpeg".to_string(),
        }
    }
}

/// Normalized gateway response: text for prose/JSON requests, base64 image
/// bytes for image requests.
#[derive(Debug, Clone)]
pub enum GatewayResponse {
    Text(String),
    ImageBytes(String),
}

impl GatewayResponse {
    pub fn into_text(self) -> Result<String> {
        match self {
            GatewayResponse::Text(text) => Ok(text),
            GatewayResponse::ImageBytes(_) => Err(PipelineError::General(
                "expected text response, got image bytes".to_string(),
            )),
        }
    }

    pub fn into_image_bytes(self) -> Result<String> {
        match self {
            GatewayResponse::ImageBytes(bytes) => Ok(bytes),
            GatewayResponse::Text(_) => Err(PipelineError::General(
                "expected image response, got text".to_string(),
            )),
        }
    }
}

/// The sole network boundary between pipeline stages and the generative-AI
/// backend. Stateless: no caching, no retries — retry policy belongs to
/// callers that need it.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn invoke(
        &self,
        model: &str,
        contents: ModelContents,
        config: GenerationConfig,
    ) -> Result<GatewayResponse>;
}

#[derive(Serialize)]
struct ProxyRequest<'a> {
    model: &'a str,
    contents: &'a ModelContents,
    config: &'a GenerationConfig,
}

#[derive(Deserialize)]
struct ProxyEnvelope {
    text: Option<String>,
    #[serde(rename = "imageBytes")]
    image_bytes: Option<String>,
}

#[derive(Deserialize)]
struct ProxyErrorBody {
    error: String,
    details: Option<String>,
}

/// HTTP implementation of the gateway, posting to the proxy endpoint.
pub struct HttpGateway {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpGateway {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(180))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/gemini-proxy", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl ModelGateway for HttpGateway {
    async fn invoke(
        &self,
        model: &str,
        contents: ModelContents,
        config: GenerationConfig,
    ) -> Result<GatewayResponse> {
        let is_image = config.is_image_generation();
        debug!("Invoking model {} (image generation: {})", model, is_image);

        let request = ProxyRequest {
            model,
            contents: &contents,
            config: &config,
        };
        let response = self.client.post(&self.endpoint).json(&request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ProxyErrorBody>(&body) {
                Ok(err) => match err.details {
                    Some(details) => format!("{}: {}", err.error, details),
                    None => err.error,
                },
                Err(_) => status
                    .canonical_reason()
                    .unwrap_or("backend request failed")
                    .to_string(),
            };
            warn!("Proxy call failed for model {}: HTTP {} {}", model, status, message);
            return Err(PipelineError::Proxy {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: ProxyEnvelope = response.json().await?;
        if is_image {
            match envelope.image_bytes {
                Some(bytes) => Ok(GatewayResponse::ImageBytes(bytes)),
                None => Err(PipelineError::Proxy {
                    status: status.as_u16(),
                    message: "no image produced".to_string(),
                }),
            }
        } else {
            match envelope.text {
                Some(text) => Ok(GatewayResponse::Text(text)),
                None => Err(PipelineError::Proxy {
                    status: status.as_u16(),
                    message: "backend envelope missing text".to_string(),
                }),
            }
        }
    }
}

/// One call seen by the mock gateway, for prompt-construction assertions.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub model: String,
    pub prompt: String,
    pub is_image: bool,
}

/// Scripted gateway double for development and testing. Text and image
/// responses are held in separate FIFO queues so the concurrent inline-image
/// calls cannot steal a text stage's response.
#[derive(Default)]
pub struct MockGateway {
    text_responses: Mutex<VecDeque<Result<String>>>,
    image_responses: Mutex<VecDeque<Result<String>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_text(&self, text: impl Into<String>) {
        self.text_responses
            .lock()
            .unwrap()
            .push_back(Ok(text.into()));
    }

    pub fn push_text_error(&self, error: PipelineError) {
        self.text_responses.lock().unwrap().push_back(Err(error));
    }

    pub fn push_image(&self, bytes: impl Into<String>) {
        self.image_responses
            .lock()
            .unwrap()
            .push_back(Ok(bytes.into()));
    }

    pub fn push_image_error(&self, error: PipelineError) {
        self.image_responses.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelGateway for MockGateway {
    async fn invoke(
        &self,
        model: &str,
        contents: ModelContents,
        config: GenerationConfig,
    ) -> Result<GatewayResponse> {
        let is_image = config.is_image_generation();
        self.calls.lock().unwrap().push(RecordedCall {
            model: model.to_string(),
            prompt: contents.as_text(),
            is_image,
        });

        if is_image {
            match self.image_responses.lock().unwrap().pop_front() {
                Some(result) => result.map(GatewayResponse::ImageBytes),
                None => Err(PipelineError::General(
                    "mock gateway: no image response scripted".to_string(),
                )),
            }
        } else {
            match self.text_responses.lock().unwrap().pop_front() {
                Some(result) => result.map(GatewayResponse::Text),
                None => Err(PipelineError::General(
                    "mock gateway: no text response scripted".to_string(),
                )),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_config_serializes_camel_case() {
        let config = GenerationConfig::Text(TextConfig::with_schema(serde_json::json!({
            "type": "object"
        })));
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["responseMimeType"], "application/json");
        assert!(value["responseSchema"].is_object());
        assert!(value.get("tools").is_none());
    }

    #[test]
    fn search_config_carries_tools_only() {
        let config = GenerationConfig::Text(TextConfig::with_search());
        let value = serde_json::to_value(&config).unwrap();
        assert!(value.get("responseSchema").is_none());
        assert!(value["tools"][0].get("googleSearch").is_some());
    }

    #[test]
    fn image_config_serializes_image_flags() {
        let config = GenerationConfig::Image(ImageConfig::single_jpeg_16x9());
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["isImageGeneration"], true);
        assert_eq!(value["numberOfImages"], 1);
        assert_eq!(value["aspectRatio"], "16:9");
        assert_eq!(value["outputMimeType"], "image/jpeg");
    }

    #[test]
    fn contents_serialize_untagged() {
        let prompt = serde_json::to_value(ModelContents::Prompt("hi".to_string())).unwrap();
        assert_eq!(prompt, serde_json::json!("hi"));

        let parts =
            serde_json::to_value(ModelContents::Parts(vec![serde_json::json!({"text": "hi"})]))
                .unwrap();
        assert!(parts.is_array());
    }
}
