//! Prompt in, image file out: the generation pipeline.

use std::path::{Path, PathBuf};

use base64::Engine;
use serde_json::Value;
use tracing::debug;

use crate::error::AdapterError;
use crate::output::{artifact_filename, save_image, unix_timestamp};
use crate::ports::visual_service::{GenerationRequest, GenerationResponse, VisualService};

/// A generated image that has been written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArtifact {
    /// File name within the output directory.
    pub filename: String,
    /// Full path of the written file.
    pub path: PathBuf,
    /// Upstream request id, if the upstream sent one.
    pub request_id: Option<String>,
}

/// Turns a prompt into an image file using a configured visual service.
pub struct ImageGenerationAdapter {
    service: Box<dyn VisualService>,
}

impl ImageGenerationAdapter {
    /// Create an adapter around an already-authenticated service.
    #[must_use]
    pub fn new(service: Box<dyn VisualService>) -> Self {
        Self { service }
    }

    /// Generate one image for `prompt` and save it under `output_dir`.
    ///
    /// Only the first returned image is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails, the response is empty, unparsable,
    /// unsuccessful or carries no image, or the image cannot be decoded or written.
    pub async fn run(
        &self,
        prompt: &str,
        output_dir: &Path,
    ) -> Result<OutputArtifact, AdapterError> {
        let request = GenerationRequest::new(prompt);
        debug!(prompt_chars = prompt.chars().count(), "submitting generation request");

        let raw = self.service.cv_process(&request).await?;
        let response = validate(raw.into_structured()?)?;

        // Non-empty by `validate`.
        let encoded = &response.images()[0];
        let data = base64::engine::general_purpose::STANDARD.decode(encoded)?;

        let filename = artifact_filename(unix_timestamp());
        let path = save_image(output_dir, &filename, &data)?;
        debug!(bytes = data.len(), "image written");

        Ok(OutputArtifact { filename, path, request_id: response.request_id() })
    }
}

/// Check the status code and image list of a structured response.
///
/// The status is read before the payload is typed, so an error response
/// always reaches the caller with its details even if its payload is malformed.
fn validate(value: Value) -> Result<GenerationResponse, AdapterError> {
    let status = GenerationResponse {
        code: value.get("code").cloned(),
        message: value.get("message").cloned(),
        ..GenerationResponse::default()
    };

    if !status.is_success() {
        let message = status.message().unwrap_or_else(|| "Unknown".to_string());
        return Err(AdapterError::Api { message, details: value });
    }

    let response: GenerationResponse = serde_json::from_value(value)?;
    if response.images().is_empty() {
        return Err(AdapterError::NoImageData);
    }

    Ok(response)
}
