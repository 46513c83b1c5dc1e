//! Submission client — the one-shot remote call that forwards a draft to
//! the form endpoint.
//!
//! The endpoint contract is Web3Forms-shaped: a form-encoded POST carrying
//! an access key, a subject, sender identity, and flow-specific fields;
//! the response is JSON `{ success, message? }`. Anything other than a 2xx
//! with `success: true` is a submission failure. Modules take the client
//! as `Arc<dyn SubmissionClient>`, so tests substitute the doubles below.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use tokio::sync::Notify;
use tracing::{debug, warn};

use metamech_core::config::SubmissionConfig;
use metamech_core::{SiteError, SiteResult};

use crate::draft::{CheckoutFlow, OrderDraft};

/// Form-encoded payload for one submission attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionRequest {
    pub subject: String,
    pub from_name: String,
    pub from_email: String,
    /// Flow-specific fields in wire order, field name → value.
    pub fields: Vec<(&'static str, String)>,
}

impl SubmissionRequest {
    /// Build the payload for a flow. Field names match what the site forms
    /// have always sent, per flow.
    pub fn build(flow: CheckoutFlow, draft: &OrderDraft) -> Self {
        let (subject, fields): (String, Vec<(&'static str, String)>) = match flow {
            CheckoutFlow::Order => (
                format!("Order Details - {}", draft.company_name),
                vec![
                    ("plan", draft.plan.to_string()),
                    ("fullName", draft.full_name.clone()),
                    ("companyName", draft.company_name.clone()),
                    ("vatNumber", draft.vat_number.clone()),
                    ("country", draft.country.clone()),
                    ("address", draft.address.clone()),
                    ("email", draft.email.clone()),
                    ("phone", draft.phone.clone()),
                ],
            ),
            CheckoutFlow::TrialRequest => (
                format!("Trial Download Request - {}", draft.company_name),
                vec![
                    ("name", draft.full_name.clone()),
                    ("company", draft.company_name.clone()),
                    ("email", draft.email.clone()),
                    ("country", draft.country.clone()),
                    ("phone", draft.phone.clone()),
                ],
            ),
            CheckoutFlow::DemoRequest => (
                format!("Demo Request - {}", draft.company_name),
                vec![
                    ("name", draft.full_name.clone()),
                    ("company", draft.company_name.clone()),
                    ("email", draft.email.clone()),
                    ("phone", draft.phone.clone()),
                    ("message", draft.message.clone()),
                ],
            ),
        };

        Self {
            subject,
            from_name: draft.full_name.clone(),
            from_email: draft.email.clone(),
            fields,
        }
    }

    /// The complete wire form, access key included.
    pub fn form_pairs(&self, access_key: &str) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("access_key", access_key.to_string()),
            ("subject", self.subject.clone()),
            ("from_name", self.from_name.clone()),
            ("from_email", self.from_email.clone()),
        ];
        pairs.extend(self.fields.iter().cloned());
        pairs
    }
}

/// What a successful submission returns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionReceipt {
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EndpointResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

/// One-shot remote submission. Implementations make at most one attempt
/// per call; retry policy is the caller's (and the caller never retries
/// automatically).
#[async_trait]
pub trait SubmissionClient: Send + Sync {
    async fn submit(&self, request: &SubmissionRequest) -> SiteResult<SubmissionReceipt>;
}

/// HTTP client for the production form endpoint.
pub struct Web3FormsClient {
    http: reqwest::Client,
    endpoint: String,
    access_key: String,
}

impl Web3FormsClient {
    pub fn new(config: &SubmissionConfig) -> SiteResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| SiteError::Config(format!("http client: {e}")))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            access_key: config.access_key.clone(),
        })
    }
}

#[async_trait]
impl SubmissionClient for Web3FormsClient {
    async fn submit(&self, request: &SubmissionRequest) -> SiteResult<SubmissionReceipt> {
        debug!(subject = %request.subject, "submitting form");

        let response = self
            .http
            .post(&self.endpoint)
            .form(&request.form_pairs(&self.access_key))
            .send()
            .await
            .map_err(|e| SiteError::Submission(format!("transport: {e}")))?;

        let status = response.status();
        let body: EndpointResponse = response
            .json()
            .await
            .map_err(|e| SiteError::Submission(format!("malformed response: {e}")))?;

        if status.is_success() && body.success {
            Ok(SubmissionReceipt {
                message: body.message,
            })
        } else {
            let reason = body
                .message
                .unwrap_or_else(|| format!("endpoint returned {status}"));
            warn!(%status, %reason, "form submission rejected");
            Err(SiteError::Submission(reason))
        }
    }
}

/// Double that always resolves the same way.
pub struct StaticClient {
    outcome: Result<SubmissionReceipt, String>,
}

impl StaticClient {
    pub fn succeeding() -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(SubmissionReceipt::default()),
        })
    }

    pub fn failing(reason: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(reason.into()),
        })
    }
}

#[async_trait]
impl SubmissionClient for StaticClient {
    async fn submit(&self, _request: &SubmissionRequest) -> SiteResult<SubmissionReceipt> {
        match &self.outcome {
            Ok(receipt) => Ok(receipt.clone()),
            Err(reason) => Err(SiteError::Submission(reason.clone())),
        }
    }
}

/// Double that records every request it sees, then succeeds.
#[derive(Default)]
pub struct RecordingClient {
    requests: Mutex<Vec<SubmissionRequest>>,
}

impl RecordingClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn requests(&self) -> Vec<SubmissionRequest> {
        self.requests.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl SubmissionClient for RecordingClient {
    async fn submit(&self, request: &SubmissionRequest) -> SiteResult<SubmissionReceipt> {
        self.requests.lock().push(request.clone());
        Ok(SubmissionReceipt::default())
    }
}

/// Double whose calls stay pending until released, for exercising the
/// in-flight guard. Counts how many calls actually reached the remote.
pub struct HeldClient {
    release: Notify,
    calls: Mutex<usize>,
}

impl HeldClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            release: Notify::new(),
            calls: Mutex::new(0),
        })
    }

    /// Let one pending call resolve successfully.
    pub fn release_one(&self) {
        self.release.notify_one();
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock()
    }
}

#[async_trait]
impl SubmissionClient for HeldClient {
    async fn submit(&self, _request: &SubmissionRequest) -> SiteResult<SubmissionReceipt> {
        *self.calls.lock() += 1;
        self.release.notified().await;
        Ok(SubmissionReceipt::default())
    }
}
