//! Record numbering — a persisted counter reconciled with the backend.
//!
//! Every exported artifact is labeled with the current record number.
//! The number is seeded locally (712 on a fresh machine), advances by
//! one per completed export or explicit new form, and is overwritten by
//! the server-assigned case number after a successful submission so the
//! backend stays the source of truth for case numbering.

use crate::config::{INITIAL_RECORD_NUMBER, RECORD_NUMBER_KEY};
use crate::store::{LocalStore, StoreError};

/// The durable record counter.
///
/// `reconcile` is the only operation that may lower the value;
/// `advance_local` only ever increases it.
pub struct RecordCounter {
    store: LocalStore,
    value: i64,
}

impl RecordCounter {
    /// Load the counter from the store, seeding it on first use.
    pub fn open(store: LocalStore) -> Result<Self, StoreError> {
        let value = match store.get_i64(RECORD_NUMBER_KEY)? {
            Some(value) => value,
            None => {
                store.put_i64(RECORD_NUMBER_KEY, INITIAL_RECORD_NUMBER)?;
                tracing::info!(seed = INITIAL_RECORD_NUMBER, "record counter seeded");
                INITIAL_RECORD_NUMBER
            }
        };
        Ok(Self { store, value })
    }

    /// The number the next export/submission will carry.
    pub fn current(&self) -> i64 {
        self.value
    }

    /// Advance by exactly one and persist. Returns the new value.
    pub fn advance_local(&mut self) -> Result<i64, StoreError> {
        let next = self.value + 1;
        self.store.put_i64(RECORD_NUMBER_KEY, next)?;
        self.value = next;
        tracing::debug!(record_number = next, "record counter advanced");
        Ok(next)
    }

    /// Overwrite with the server-assigned case number and persist.
    pub fn reconcile(&mut self, server_id: i64) -> Result<(), StoreError> {
        self.store.put_i64(RECORD_NUMBER_KEY, server_id)?;
        tracing::info!(
            from = self.value,
            to = server_id,
            "record counter reconciled to server case number"
        );
        self.value = server_id;
        Ok(())
    }
}
