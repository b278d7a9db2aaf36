//! Visual service port for the upstream text-to-image API.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AdapterError;

/// Status code the upstream uses for a successful generation.
pub const SUCCESS_CODE: i64 = 10000;

/// A high-quality image generation request.
///
/// Only the prompt varies between invocations; every other field is fixed
/// by [`GenerationRequest::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Request kind understood by the upstream.
    pub req_key: String,
    /// The text prompt, passed through unvalidated.
    pub prompt: String,
    /// Model version tag.
    pub model_version: String,
    /// Scheduling config tag.
    pub req_schedule_conf: String,
    /// Seed; `-1` lets the upstream pick one.
    pub seed: i64,
    /// Guidance scale.
    pub scale: f64,
    /// Diffusion steps.
    pub ddim_steps: u32,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Whether the upstream should return image URLs instead of bytes only.
    pub return_url: bool,
    /// Logo overlay settings.
    pub logo_info: LogoInfo,
}

/// Logo overlay settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogoInfo {
    /// Whether to stamp a logo on the image.
    pub add_logo: bool,
}

impl GenerationRequest {
    /// Build the fixed generation request for `prompt`.
    #[must_use]
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            req_key: "high_quality_image_generation".to_string(),
            prompt: prompt.into(),
            model_version: "general_v4.0".to_string(),
            req_schedule_conf: "general_v40_s".to_string(),
            seed: -1,
            scale: 3.5,
            ddim_steps: 25,
            width: 1024,
            height: 1024,
            return_url: false,
            logo_info: LogoInfo { add_logo: false },
        }
    }
}

/// Whatever the upstream client handed back, before normalization.
///
/// Serialized untagged, so a cassette stores the raw response as-is:
/// `null` is [`RawResponse::Empty`], a string is [`RawResponse::Text`] and
/// anything else is [`RawResponse::Structured`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawResponse {
    /// Nothing came back.
    Empty,
    /// A JSON document as text.
    Text(String),
    /// Already-decoded JSON.
    Structured(Value),
}

impl RawResponse {
    /// Normalize into structured JSON.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::EmptyResponse`] for empty or falsy responses and
    /// [`AdapterError::Parse`] when text is not valid JSON.
    pub fn into_structured(self) -> Result<Value, AdapterError> {
        match self {
            Self::Empty => Err(AdapterError::EmptyResponse),
            Self::Text(text) if text.is_empty() => Err(AdapterError::EmptyResponse),
            Self::Text(text) => Ok(serde_json::from_str(&text)?),
            Self::Structured(value) if is_falsy(&value) => Err(AdapterError::EmptyResponse),
            Self::Structured(value) => Ok(value),
        }
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

/// Upstream response body for a generation call.
///
/// `code`, `message` and `request_id` are kept as raw JSON: the upstream does
/// not always type them consistently, and an odd type there must not hide
/// the rest of the response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationResponse {
    /// Status code; [`SUCCESS_CODE`] on success.
    #[serde(default)]
    pub code: Option<Value>,
    /// Human-readable status message.
    #[serde(default)]
    pub message: Option<Value>,
    /// Upstream request identifier.
    #[serde(default)]
    pub request_id: Option<Value>,
    /// Result payload.
    #[serde(default)]
    pub data: Option<GenerationData>,
}

/// Result payload of a generation call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationData {
    /// Base64-encoded images, in upstream order.
    #[serde(default)]
    pub binary_data_base64: Option<Vec<String>>,
}

impl GenerationResponse {
    /// Whether the upstream reported success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code.as_ref().and_then(Value::as_i64) == Some(SUCCESS_CODE)
    }

    /// Status message as text, if the upstream sent a non-null one.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        self.message.as_ref().and_then(value_text)
    }

    /// Request identifier as text, if the upstream sent a non-null one.
    #[must_use]
    pub fn request_id(&self) -> Option<String> {
        self.request_id.as_ref().and_then(value_text)
    }

    /// The base64 image blobs, empty when none were sent.
    #[must_use]
    pub fn images(&self) -> &[String] {
        self.data.as_ref().and_then(|d| d.binary_data_base64.as_deref()).unwrap_or_default()
    }
}

/// Strings as-is, other scalars and containers as their JSON text.
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Boxed future type returned by [`VisualService::cv_process`].
pub type ProcessFuture<'a> =
    Pin<Box<dyn Future<Output = Result<RawResponse, AdapterError>> + Send + 'a>>;

/// Runs computer-vision processing actions against the upstream API.
pub trait VisualService: Send + Sync {
    /// Submit a generation request and wait for the raw response.
    fn cv_process(&self, request: &GenerationRequest) -> ProcessFuture<'_>;
}
