//! Live adapter for the Volcengine Visual API (`CVProcess` action).

use chrono::Utc;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use tracing::debug;

use crate::config::EndpointConfig;
use crate::credentials::Credentials;
use crate::error::AdapterError;
use crate::ports::visual_service::{GenerationRequest, ProcessFuture, RawResponse, VisualService};
use crate::signing::{SignableRequest, Signer};

const ACTION: &str = "CVProcess";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Live visual service that signs and sends requests to the upstream API.
pub struct VolcengineVisualService {
    client: Client,
    credentials: Credentials,
    endpoint: EndpointConfig,
}

impl VolcengineVisualService {
    /// Create a client for `endpoint` authenticated with `credentials`.
    #[must_use]
    pub fn new(credentials: Credentials, endpoint: EndpointConfig) -> Self {
        Self { client: Client::new(), credentials, endpoint }
    }

    fn url(&self) -> String {
        format!("{}://{}/", self.endpoint.scheme, self.endpoint.host)
    }
}

impl VisualService for VolcengineVisualService {
    fn cv_process(&self, request: &GenerationRequest) -> ProcessFuture<'_> {
        let request = request.clone();
        Box::pin(async move {
            let body = serde_json::to_vec(&request)?;
            let query = [("Action", ACTION), ("Version", self.endpoint.version.as_str())];

            let signer =
                Signer::new(&self.credentials, &self.endpoint.region, &self.endpoint.service);
            let signed = signer.sign(
                &SignableRequest {
                    method: "POST",
                    path: "/",
                    query: &query,
                    host: &self.endpoint.host,
                    content_type: JSON_CONTENT_TYPE,
                    body: &body,
                },
                Utc::now(),
            );

            debug!(host = %self.endpoint.host, action = ACTION, "sending request");

            let response = self
                .client
                .post(self.url())
                .query(&query)
                .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
                .header("X-Date", &signed.x_date)
                .header("X-Content-Sha256", &signed.content_sha256)
                .header(AUTHORIZATION, &signed.authorization)
                .body(body)
                .send()
                .await?;

            let status = response.status();
            let response_text = response.text().await?;
            debug!(status = status.as_u16(), bytes = response_text.len(), "received response");

            if !status.is_success() {
                return classify_failure(status.as_u16(), response_text);
            }

            Ok(RawResponse::Text(response_text))
        })
    }
}

/// Business errors often arrive with a 4xx/5xx status but still carry a
/// `code` body; hand those back so the caller reports them with details.
fn classify_failure(status: u16, body: String) -> Result<RawResponse, AdapterError> {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&body) {
        if value.get("code").is_some() {
            return Ok(RawResponse::Structured(value));
        }
    }
    let body = if body.trim().is_empty() { format!("HTTP {status}") } else { body };
    Err(AdapterError::Http { status, body })
}
