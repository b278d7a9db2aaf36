//! Replaying adapter for the `VisualService` port.

use std::sync::{Arc, Mutex};

use super::{next_output, replay_result};
use crate::cassette::format::{CV_PROCESS_METHOD, VISUAL_SERVICE_PORT};
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::visual_service::{GenerationRequest, ProcessFuture, RawResponse, VisualService};

/// Serves recorded visual service results from a cassette.
pub struct ReplayingVisualService {
    replayer: Arc<Mutex<CassetteReplayer>>,
}

impl ReplayingVisualService {
    /// Create a replaying service backed by the given replayer.
    #[must_use]
    pub fn new(replayer: Arc<Mutex<CassetteReplayer>>) -> Self {
        Self { replayer }
    }
}

impl VisualService for ReplayingVisualService {
    fn cv_process(&self, _request: &GenerationRequest) -> ProcessFuture<'_> {
        let output = next_output(&self.replayer, VISUAL_SERVICE_PORT, CV_PROCESS_METHOD);
        Box::pin(async move { replay_result::<RawResponse>(output?) })
    }
}
