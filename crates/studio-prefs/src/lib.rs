//! studio-prefs library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.

pub mod application;
pub mod infrastructure;

pub use application::preferences_store::{
    LoadError, PersistenceError, PreferencesStore, StoreError, StoreOrigin,
};
pub use application::snapshot_storage::{SnapshotStorage, StorageError};
