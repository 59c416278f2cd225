//! Submission client — posts a record snapshot to the backend.
//!
//! The backend persists the payload and notifies the study team by
//! email. Its reply is `{ ok: true, caseNumber, email? }` on success
//! (`email: "failed"` means the notification leg failed — the
//! submission itself still succeeded, the store is the record of
//! truth) or `{ ok: false, error }` on failure. The endpoint seam is a
//! trait so the session logic can be exercised against a scripted
//! backend.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::config;
use crate::record::{Field, FormRecord};

// ─── Types ────────────────────────────────────────────────────────────────────

/// Wire payload: the record number plus every record field under its
/// wire key. Tri-states travel as `null`/`false`/`true`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmitPayload(Map<String, Value>);

impl SubmitPayload {
    pub fn build(record_number: i64, record: &FormRecord) -> Self {
        let mut map = Map::new();
        map.insert("recordNumber".to_string(), record_number.into());
        for field in Field::ALL {
            map.insert(field.key().to_string(), record.json_value(field));
        }
        Self(map)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// A successful submission as the backend reported it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    /// Server-assigned case number; feeds counter reconciliation.
    pub case_number: i64,
    /// False when the backend stored the record but could not send the
    /// notification email. Non-fatal.
    pub email_delivered: bool,
}

/// Response body from the `/api/submit` endpoint.
#[derive(Debug, Deserialize)]
struct SubmitResponse {
    ok: bool,
    #[serde(rename = "caseNumber")]
    case_number: Option<i64>,
    error: Option<String>,
    email: Option<String>,
}

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("Cannot reach submission backend at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Backend returned status {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("Cannot parse backend response: {0}")]
    ResponseParsing(String),

    /// The backend answered, and said no. Local state must not change.
    #[error("Submission rejected: {0}")]
    Rejected(String),
}

/// Seam for the submission backend.
pub trait SubmissionEndpoint {
    fn submit(&self, payload: &SubmitPayload) -> Result<SubmitOutcome, SubmitError>;
}

// ─── HTTP client ──────────────────────────────────────────────────────────────

/// HTTP client for the submission backend.
pub struct HttpSubmitClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl HttpSubmitClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs,
        }
    }

    /// Client for the configured backend (`MECMO_SUBMIT_URL`), 30s timeout.
    pub fn from_env() -> Self {
        Self::new(&config::submit_base_url(), 30)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl SubmissionEndpoint for HttpSubmitClient {
    fn submit(&self, payload: &SubmitPayload) -> Result<SubmitOutcome, SubmitError> {
        let url = format!("{}/api/submit", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    SubmitError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    SubmitError::Timeout(self.timeout_secs)
                } else {
                    SubmitError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| SubmitError::HttpClient(e.to_string()))?;

        interpret_response(status.as_u16(), &body)
    }
}

/// Interpret the backend's reply.
///
/// The backend answers rejections with a JSON body even on non-2xx
/// statuses, so the body is parsed first; the status only matters when
/// the body is not parseable.
fn interpret_response(status: u16, body: &str) -> Result<SubmitOutcome, SubmitError> {
    let parsed: SubmitResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(_) if status >= 400 => {
            return Err(SubmitError::Backend {
                status,
                body: body.to_string(),
            });
        }
        Err(e) => return Err(SubmitError::ResponseParsing(e.to_string())),
    };

    if !parsed.ok {
        let reason = parsed
            .error
            .unwrap_or_else(|| format!("backend status {status}"));
        return Err(SubmitError::Rejected(reason));
    }

    let case_number = parsed
        .case_number
        .ok_or_else(|| SubmitError::ResponseParsing("ok response without caseNumber".into()))?;
    let email_delivered = parsed.email.as_deref() != Some("failed");

    if !email_delivered {
        tracing::warn!(case_number, "submission stored but notification email failed");
    }
    tracing::info!(case_number, "submission accepted");

    Ok(SubmitOutcome {
        case_number,
        email_delivered,
    })
}

// ─── Tests ────────────────────────────────────────────────────────────────────
