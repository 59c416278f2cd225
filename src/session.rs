//! Form session — single-threaded orchestration of one editing session.
//!
//! Owns the in-progress record and the durable record counter, and
//! drives the three ways a record leaves the session: tabular export,
//! document export, and submission. All operations are synchronous;
//! there is exactly one active editing session per process, so the only
//! guard needed is the in-flight submission flag an interactive layer
//! uses to disable its submit control.

use std::path::PathBuf;

use thiserror::Error;

use crate::config;
use crate::export::{self, csv, pdf, ExportError};
use crate::record::{Field, FieldValue, FormRecord, TriState};
use crate::sequence::RecordCounter;
use crate::store::{LocalStore, StoreError};
use crate::submit::{SubmissionEndpoint, SubmitError, SubmitOutcome, SubmitPayload};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Submit error: {0}")]
    Submit(#[from] SubmitError),

    #[error("A submission is already in flight")]
    SubmissionInFlight,
}

/// A completed export: which number it was filed under and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub record_number: i64,
    pub path: PathBuf,
}

/// One editing session.
pub struct FormSession {
    record: FormRecord,
    counter: RecordCounter,
    exports_dir: PathBuf,
    submitting: bool,
    last_case: Option<i64>,
    last_submit_error: Option<String>,
}

impl FormSession {
    /// Session over the default app data directory.
    pub fn open_default() -> Result<Self, StoreError> {
        let counter = RecordCounter::open(LocalStore::open_default()?)?;
        Ok(Self::new(counter, config::exports_dir()))
    }

    pub fn new(counter: RecordCounter, exports_dir: PathBuf) -> Self {
        Self {
            record: FormRecord::new(),
            counter,
            exports_dir,
            submitting: false,
            last_case: None,
            last_submit_error: None,
        }
    }

    // ── Record access ────────────────────────────────────

    pub fn record(&self) -> &FormRecord {
        &self.record
    }

    pub fn get(&self, field: Field) -> FieldValue {
        self.record.get(field)
    }

    pub fn set(&mut self, field: Field, value: FieldValue) {
        self.record.set(field, value);
    }

    pub fn set_text(&mut self, field: Field, value: impl Into<String>) {
        self.record.set_text(field, value);
    }

    pub fn set_answer(&mut self, field: Field, value: impl Into<TriState>) {
        self.record.set_answer(field, value);
    }

    /// Number the next export or submission will carry.
    pub fn record_number(&self) -> i64 {
        self.counter.current()
    }

    /// Case number assigned by the backend for the most recent
    /// successful submission this session.
    pub fn last_case(&self) -> Option<i64> {
        self.last_case
    }

    /// Reason the most recent submission failed, if it did. Cleared by
    /// the next successful submission.
    pub fn last_submit_error(&self) -> Option<&str> {
        self.last_submit_error.as_deref()
    }

    /// True while a submission is outstanding. An interactive layer
    /// disables its submit control on this.
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    // ── Lifecycle ────────────────────────────────────────

    /// Clear every field. The record number does not move.
    pub fn reset_form(&mut self) {
        self.record.reset();
    }

    /// Advance to the next record number and start a fresh record.
    pub fn new_form(&mut self) -> Result<i64, SessionError> {
        let next = self.counter.advance_local()?;
        self.record = FormRecord::new();
        Ok(next)
    }

    // ── Exports ──────────────────────────────────────────

    /// Export the current record as a numbered CSV file, then advance
    /// the counter. The counter only moves once the artifact is fully
    /// on disk.
    pub fn export_csv(&mut self) -> Result<ExportArtifact, SessionError> {
        let snapshot = self.record.snapshot();
        let record_number = self.counter.current();

        let text = csv::serialize(record_number, &snapshot)?;
        let filename = export::export_filename(record_number, "csv");
        let path = export::write_export_file(text.as_bytes(), &filename, &self.exports_dir)?;

        self.counter.advance_local()?;
        tracing::info!(record_number, path = %path.display(), "CSV exported");
        Ok(ExportArtifact {
            record_number,
            path,
        })
    }

    /// Export the current record as a numbered PDF file, then advance
    /// the counter.
    pub fn export_pdf(&mut self) -> Result<ExportArtifact, SessionError> {
        let snapshot = self.record.snapshot();
        let record_number = self.counter.current();

        let bytes = pdf::serialize(record_number, &snapshot)?;
        let filename = export::export_filename(record_number, "pdf");
        let path = export::write_export_file(&bytes, &filename, &self.exports_dir)?;

        self.counter.advance_local()?;
        tracing::info!(record_number, path = %path.display(), "PDF exported");
        Ok(ExportArtifact {
            record_number,
            path,
        })
    }

    // ── Submission ───────────────────────────────────────

    /// Submit the current record to the backend.
    ///
    /// On success the counter reconciles to the server-assigned case
    /// number and a fresh record replaces the submitted one. On any
    /// failure nothing moves: counter, record, and draft stay exactly
    /// as they were so the medic can retry.
    pub fn submit<E: SubmissionEndpoint>(
        &mut self,
        endpoint: &E,
    ) -> Result<SubmitOutcome, SessionError> {
        if self.submitting {
            return Err(SessionError::SubmissionInFlight);
        }
        self.submitting = true;

        let payload = SubmitPayload::build(self.counter.current(), &self.record.snapshot());
        let result = endpoint.submit(&payload);
        self.submitting = false;

        match result {
            Ok(outcome) => {
                self.counter.reconcile(outcome.case_number)?;
                self.record = FormRecord::new();
                self.last_case = Some(outcome.case_number);
                self.last_submit_error = None;
                tracing::info!(case_number = outcome.case_number, "submitted");
                Ok(outcome)
            }
            Err(e) => {
                self.last_submit_error = Some(e.to_string());
                tracing::warn!(error = %e, "submission failed, local state preserved");
                Err(e.into())
            }
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
