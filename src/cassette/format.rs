//! On-disk cassette layout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Port name used for the visual service in cassettes.
pub const VISUAL_SERVICE_PORT: &str = "visual_service";

/// Method name used for `cv_process` calls in cassettes.
pub const CV_PROCESS_METHOD: &str = "cv_process";

/// Recorded input of a `cv_process` call.
///
/// Every other request field is fixed, so only the prompt is kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordedPrompt {
    /// Prompt the call was made with.
    pub prompt: String,
}

/// A recorded session of port interactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cassette {
    /// Human-readable cassette name.
    pub name: String,
    /// When the cassette was written.
    pub recorded_at: DateTime<Utc>,
    /// Git commit the recording was made from.
    pub commit: String,
    /// Interactions in recording order.
    pub interactions: Vec<Interaction>,
}

/// One call through a port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    /// Position in the recording.
    pub seq: u64,
    /// Port name, e.g. `visual_service`.
    pub port: String,
    /// Method name, e.g. `cv_process`.
    pub method: String,
    /// Serialized call input.
    pub input: serde_json::Value,
    /// Serialized result, `{"Ok": ...}` or `{"Err": "..."}`.
    pub output: serde_json::Value,
}
