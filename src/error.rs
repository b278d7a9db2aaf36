//! Unified error type for dreamgen.

use thiserror::Error;

/// Errors that can occur while generating and saving an image.
///
/// The `Display` text of each variant is what ends up in the `error` field of
/// the JSON failure report.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Startup failed before any request could be made.
    #[error("Setup error: {0}")]
    Setup(String),

    /// Fewer than the required positional arguments were given.
    #[error("Missing arguments")]
    MissingArguments,

    /// The command line could not be parsed.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The upstream call returned nothing usable.
    #[error("Empty response from API")]
    EmptyResponse,

    /// The upstream returned text that is not valid JSON.
    #[error("{0}")]
    Parse(#[from] serde_json::Error),

    /// The upstream answered with a non-success status code.
    #[error("API Error: {message}")]
    Api {
        /// Upstream message, or `"Unknown"` when absent.
        message: String,
        /// The raw upstream response body.
        details: serde_json::Value,
    },

    /// The upstream reported success but sent no images.
    #[error("No image data received")]
    NoImageData,

    /// A network error occurred.
    #[error("{0}")]
    Network(#[from] reqwest::Error),

    /// The upstream rejected the request at the HTTP layer.
    #[error("{body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The image payload was not valid base64.
    #[error("{0}")]
    Decode(#[from] base64::DecodeError),

    /// An I/O error occurred.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// A replayed interaction failed or the cassette ran out.
    #[error("{0}")]
    Replay(String),
}

impl AdapterError {
    /// Raw upstream response to attach to the failure report, if any.
    #[must_use]
    pub fn details(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Api { details, .. } => Some(details),
            _ => None,
        }
    }
}
