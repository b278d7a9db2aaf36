//! Recording adapter for the `VisualService` port.

use std::sync::{Arc, Mutex};

use super::record_result;
use crate::cassette::format::{CV_PROCESS_METHOD, RecordedPrompt, VISUAL_SERVICE_PORT};
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::visual_service::{GenerationRequest, ProcessFuture, VisualService};

/// Records visual service interactions while delegating to an inner implementation.
pub struct RecordingVisualService {
    inner: Box<dyn VisualService>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingVisualService {
    /// Creates a new recording service wrapping the given implementation.
    pub fn new(inner: Box<dyn VisualService>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

impl VisualService for RecordingVisualService {
    fn cv_process(&self, request: &GenerationRequest) -> ProcessFuture<'_> {
        let request = request.clone();
        let recorder = Arc::clone(&self.recorder);

        Box::pin(async move {
            let result = self.inner.cv_process(&request).await;
            let input = RecordedPrompt { prompt: request.prompt };
            record_result(&recorder, VISUAL_SERVICE_PORT, CV_PROCESS_METHOD, &input, &result);
            result
        })
    }
}
