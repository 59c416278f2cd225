use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "mECMO EMS Intake";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Title printed at the top of the PDF export.
pub const DOCUMENT_TITLE: &str = "mECMO Patient – EMS INFO";

/// Filename prefix for both export formats (`mECMO_EMS_<n>.csv` / `.pdf`).
pub const EXPORT_FILE_PREFIX: &str = "mECMO_EMS";

/// First record number handed out on a machine that has never exported.
pub const INITIAL_RECORD_NUMBER: i64 = 712;

/// Durable-store key the record number is persisted under.
pub const RECORD_NUMBER_KEY: &str = "mecmo_record_number";

/// Canonical follow-up recipient. The record itself starts empty; an
/// interactive layer may prefill the follow-up email field with this.
pub const FOLLOW_UP_EMAIL: &str = "ecmodata@umn.edu";

/// Default filter when RUST_LOG is not set.
pub fn default_log_filter() -> &'static str {
    "info"
}

/// Get the application data directory
/// ~/MecmoIntake/ on all platforms (user-visible, holds store + exports)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("MecmoIntake")
}

/// Directory exported CSV/PDF artifacts are written to.
pub fn exports_dir() -> PathBuf {
    app_data_dir().join("exports")
}

/// Base URL of the submission backend.
///
/// `MECMO_SUBMIT_URL` overrides; the default matches a locally-run
/// backend. The `/api/submit` path is appended by the client.
pub fn submit_base_url() -> String {
    std::env::var("MECMO_SUBMIT_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}
