//! Analysis service client for communicating with the study planning backend.
//!
//! Provides type-safe methods for:
//! - Full drug analysis (literature, PK, design, sample size, regulatory)
//! - Synopsis document generation
//! - Health checks

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};
use uuid::Uuid;

use crate::domain::{AnalysisDocument, AnalysisRequest, SynopsisRequest};
use crate::error::{ClientError, ClientResult};

/// Operations the view controller needs from the backend.
#[async_trait]
pub trait AnalysisApi: Send + Sync {
    /// Base URL the client talks to, for user-facing messages.
    fn base_url(&self) -> &str;

    async fn full_analysis(&self, request: &AnalysisRequest) -> ClientResult<AnalysisDocument>;

    /// Returns the raw bytes of the generated document.
    async fn generate_full_synopsis(&self, request: &SynopsisRequest) -> ClientResult<Vec<u8>>;

    async fn health(&self) -> ClientResult<Value>;
}

/// HTTP client for the analysis service.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    health_timeout: Duration,
}

/// Error body returned by the backend on failure statuses.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ApiErrorResponse {
    fn into_message(self) -> Option<String> {
        self.error
            .or(self.message)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    }
}

impl ApiClient {
    /// Create a new analysis service client.
    ///
    /// `timeout_seconds` of `None` leaves analysis calls unbounded.
    pub fn new(
        base_url: &str,
        timeout_seconds: Option<u64>,
        health_timeout_seconds: u64,
    ) -> ClientResult<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::Network(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(base_url = base_url, "Analysis client initialized");

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            health_timeout: Duration::from_secs(health_timeout_seconds),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach a fresh request id and send.
    async fn send(&self, req: RequestBuilder, url: &str) -> ClientResult<Response> {
        let request_id = Uuid::new_v4().to_string();
        debug!(url = %url, request_id = %request_id, "Analysis service request");

        req.header("x-request-id", &request_id)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, url = %url, request_id = %request_id, "Analysis service request failed");
                ClientError::Network(e.to_string())
            })
    }

    /// POST a JSON body and return the successful response.
    async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> ClientResult<Response> {
        let url = self.url(path);
        let req = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(body);

        let response = self.send(req, &url).await?;
        check_status(response).await
    }
}

/// Pass through 2xx responses; turn anything else into a server error,
/// carrying the backend's message when the body has one.
async fn check_status(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<ApiErrorResponse>()
        .await
        .ok()
        .and_then(ApiErrorResponse::into_message);

    match &message {
        Some(msg) => warn!(status = %status, message = %msg, "Analysis service error"),
        None => warn!(status = %status, "Analysis service error without message"),
    }

    Err(ClientError::Server {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl AnalysisApi for ApiClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run the full analysis for a drug.
    #[instrument(skip(self, request), fields(inn = %request.inn))]
    async fn full_analysis(&self, request: &AnalysisRequest) -> ClientResult<AnalysisDocument> {
        let response = self.post("/full-analysis", request).await?;

        let body = response.bytes().await.map_err(|e| {
            error!(error = %e, "Failed to read analysis response");
            ClientError::Network(e.to_string())
        })?;

        AnalysisDocument::from_slice(&body).map_err(|e| {
            error!(error = %e, "Failed to parse analysis response");
            e
        })
    }

    /// Generate a synopsis document.
    #[instrument(skip(self, request), fields(format = %request.output_format()))]
    async fn generate_full_synopsis(&self, request: &SynopsisRequest) -> ClientResult<Vec<u8>> {
        let response = self.post("/generate-full-synopsis", request).await?;

        let body = response.bytes().await.map_err(|e| {
            error!(error = %e, "Failed to read synopsis body");
            ClientError::Network(e.to_string())
        })?;

        debug!(bytes = body.len(), "Synopsis received");
        Ok(body.to_vec())
    }

    /// Check analysis service health.
    async fn health(&self) -> ClientResult<Value> {
        let url = self.url("/health");
        let req = self.client.get(&url).timeout(self.health_timeout);

        let response = check_status(self.send(req, &url).await?).await?;

        response
            .json::<Value>()
            .await
            .map_err(|e| ClientError::MalformedResponse(e.to_string()))
    }
}
