//! Service context that bundles all port trait objects.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::adapters::live::volcengine::VolcengineVisualService;
use crate::adapters::recording::visual_service::RecordingVisualService;
use crate::adapters::replaying::visual_service::ReplayingVisualService;
use crate::cassette::config::load_cassette;
use crate::cassette::format::VISUAL_SERVICE_PORT;
use crate::cassette::recorder::CassetteRecorder;
use crate::config::EndpointConfig;
use crate::credentials::Credentials;
use crate::error::AdapterError;
use crate::ports::VisualService;

/// Bundles all port trait objects into a single context.
pub struct ServiceContext {
    /// Visual service port.
    pub service: Box<dyn VisualService>,
}

/// Handle to a recording session that must be finished after use.
pub struct RecordingSession {
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingSession {
    /// Finish the recording and write cassette files to disk.
    ///
    /// Every service holding the recorder must have been dropped first.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be written.
    pub fn finish(self) -> Result<PathBuf, String> {
        let recorder = Arc::try_unwrap(self.recorder)
            .map_err(|_| "Recording adapter still has references".to_string())?
            .into_inner()
            .map_err(|e| format!("Recorder lock poisoned: {e}"))?;
        recorder.finish().map_err(|e| format!("Failed to write cassette: {e}"))
    }
}

impl ServiceContext {
    /// Create a live context talking to `endpoint` with `credentials`.
    #[must_use]
    pub fn live(credentials: Credentials, endpoint: EndpointConfig) -> Self {
        Self { service: Box::new(VolcengineVisualService::new(credentials, endpoint)) }
    }

    /// Create a recording context that wraps a live adapter with a recorder.
    #[must_use]
    pub fn recording(
        credentials: Credentials,
        endpoint: EndpointConfig,
    ) -> (Self, RecordingSession) {
        let live_ctx = Self::live(credentials, endpoint);

        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let path = PathBuf::from(".dreamgen/cassettes")
            .join(&timestamp)
            .join(format!("{VISUAL_SERVICE_PORT}.cassette.yaml"));

        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(
            path,
            format!("{timestamp}-{VISUAL_SERVICE_PORT}"),
            get_commit_hash(),
        )));

        let service = RecordingVisualService::new(live_ctx.service, Arc::clone(&recorder));

        (Self { service: Box::new(service) }, RecordingSession { recorder })
    }

    /// Create a replaying context from a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be loaded.
    pub fn replaying(path: &Path) -> Result<Self, AdapterError> {
        let replayer = load_cassette(path)
            .map_err(|e| AdapterError::Setup(format!("Failed to load cassette: {e}")))?;
        let service = ReplayingVisualService::new(Arc::new(Mutex::new(replayer)));
        Ok(Self { service: Box::new(service) })
    }
}

/// Get the current git commit hash, or "unknown" if unavailable.
fn get_commit_hash() -> String {
    std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map_or_else(|| "unknown".to_string(), |s| s.trim().to_string())
}
