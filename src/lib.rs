//! Form-state and export core for the mECMO EMS cardiac-arrest intake
//! form: the record model with its conditional-field policy, the
//! tabular and document serializers, the persisted record counter, and
//! the submission client. Interactive rendering and the backend itself
//! live outside this crate.

pub mod config;
pub mod export;
pub mod record;
pub mod sequence;
pub mod session;
pub mod store;
pub mod submit;
pub mod visibility;

pub use record::{Field, FieldKind, FieldValue, FormRecord, Section, TriState};
pub use sequence::RecordCounter;
pub use session::{ExportArtifact, FormSession, SessionError};
pub use store::{LocalStore, StoreError};
pub use submit::{HttpSubmitClient, SubmissionEndpoint, SubmitError, SubmitOutcome, SubmitPayload};

use tracing_subscriber::EnvFilter;

/// Initialize tracing for whatever shell embeds the crate.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} v{}", config::APP_NAME, config::APP_VERSION);
}
