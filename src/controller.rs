//! View controller: owns the UI state machine and the retained analysis.
//!
//! Idle → Loading → Success | Error, with every new action re-entering
//! Loading. Actions may overlap; each takes a ticket from a monotonically
//! increasing sequence and only the holder of the latest ticket may
//! publish its outcome.

use chrono::Utc;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::domain::{AnalysisDocument, FormState, SavedDocument, SynopsisRequest};
use crate::error::{ClientError, ClientResult};
use crate::payload::{build_request, build_synopsis_request};
use crate::services::{synopsis_file_name, AnalysisApi, DocumentSink};
use crate::view::{UiState, ViewSnapshot};

#[derive(Default)]
struct ControllerState {
    /// Ticket of the most recently started action.
    latest: u64,
    snapshot: ViewSnapshot,
    retained: Option<Arc<AnalysisDocument>>,
}

pub struct ViewController {
    api: Arc<dyn AnalysisApi>,
    sink: Arc<dyn DocumentSink>,
    inner: Mutex<ControllerState>,
}

impl ViewController {
    pub fn new(api: Arc<dyn AnalysisApi>, sink: Arc<dyn DocumentSink>) -> Self {
        Self {
            api,
            sink,
            inner: Mutex::new(ControllerState::default()),
        }
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        self.inner.lock().snapshot.clone()
    }

    /// Last successful analysis, kept for synopsis generation.
    pub fn retained(&self) -> Option<Arc<AnalysisDocument>> {
        self.inner.lock().retained.clone()
    }

    /// Run the full analysis for the current form.
    #[instrument(skip(self, form), fields(inn = %form.inn.trim()))]
    pub async fn run_analysis(&self, form: &FormState) -> ViewSnapshot {
        let request = match build_request(form) {
            Ok(request) => request,
            Err(e) => {
                let ticket = self.begin(false);
                self.fail(ticket, &e);
                return self.snapshot();
            }
        };

        let ticket = self.begin(true);
        let outcome = self.api.full_analysis(&request).await;

        match outcome {
            Ok(document) => {
                let document = Arc::new(document);
                self.settle(ticket, |state| {
                    info!(inn = %request.inn, "Analysis completed");
                    state.retained = Some(document.clone());
                    state.snapshot.state = UiState::Success(document);
                });
            }
            Err(e) => self.fail(ticket, &e),
        }

        self.snapshot()
    }

    /// Generate a synopsis in the form's output format and save it.
    ///
    /// Reuses the retained analysis when there is one; otherwise the
    /// request is built from the form.
    #[instrument(skip(self, form), fields(format = %form.output_format))]
    pub async fn run_document_generation(&self, form: &FormState) -> ViewSnapshot {
        let retained = self.retained();
        let request = match build_synopsis_request(retained.as_deref(), form, form.output_format) {
            Ok(request) => request,
            Err(e) => {
                let ticket = self.begin(false);
                self.fail(ticket, &e);
                return self.snapshot();
            }
        };
        let inn = request
            .inn()
            .map(str::to_string)
            .unwrap_or_else(|| form.inn.trim().to_string());

        debug!(reused_analysis = retained.is_some(), "Requesting synopsis");
        let ticket = self.begin(true);

        match self.generate_and_save(ticket, &inn, &request).await {
            Ok(Some(saved)) => {
                self.settle(ticket, |state| {
                    state.snapshot.state = match &state.retained {
                        Some(document) => UiState::Success(document.clone()),
                        None => UiState::Idle,
                    };
                    state.snapshot.download = Some(saved);
                });
            }
            Ok(None) => {}
            Err(e) => self.fail(ticket, &e),
        }

        self.snapshot()
    }

    /// `Ok(None)` when the action was superseded before the file was written.
    async fn generate_and_save(
        &self,
        ticket: u64,
        inn: &str,
        request: &SynopsisRequest,
    ) -> ClientResult<Option<SavedDocument>> {
        let body = self.api.generate_full_synopsis(request).await?;

        if !self.is_current(ticket) {
            debug!(ticket, "Discarding superseded synopsis");
            return Ok(None);
        }

        let file_name = synopsis_file_name(inn, Utc::now(), request.output_format());
        self.sink.save(&file_name, &body).await.map(Some)
    }

    /// Ping the backend once at startup.
    ///
    /// Failure shows a connectivity error unless another action has
    /// started since; it never blocks other actions.
    pub async fn startup_health_check(&self) -> ClientResult<Value> {
        let ticket = self.inner.lock().latest;

        match self.api.health().await {
            Ok(status) => {
                info!(status = %status, "Analysis service status");
                Ok(status)
            }
            Err(e) => {
                warn!(error = %e, "Analysis service unavailable");
                let message = format!(
                    "Cannot connect to the server. Make sure the backend is running at {}",
                    self.api.base_url()
                );
                self.settle(ticket, |state| {
                    state.snapshot.state = UiState::Error(message);
                });
                Err(e)
            }
        }
    }

    /// Start a new action and hand out its ticket.
    fn begin(&self, loading: bool) -> u64 {
        let mut state = self.inner.lock();
        state.latest += 1;
        if loading {
            state.snapshot = ViewSnapshot {
                state: UiState::Loading,
                download: None,
            };
        }
        debug!(ticket = state.latest, loading, "Action started");
        state.latest
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.inner.lock().latest == ticket
    }

    /// Apply an outcome if `ticket` is still the latest; stale outcomes are dropped.
    fn settle(&self, ticket: u64, apply: impl FnOnce(&mut ControllerState)) -> bool {
        let mut state = self.inner.lock();
        if state.latest != ticket {
            debug!(ticket, latest = state.latest, "Discarding stale response");
            return false;
        }
        apply(&mut *state);
        debug!(ticket, state = state.snapshot.state.name(), "Action settled");
        true
    }

    fn fail(&self, ticket: u64, error: &ClientError) {
        warn!(code = error.error_code(), error = %error, "Action failed");
        let message = error.user_message();
        self.settle(ticket, |state| {
            state.snapshot = ViewSnapshot {
                state: UiState::Error(message),
                download: None,
            };
        });
    }
}
