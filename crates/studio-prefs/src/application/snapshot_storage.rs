//! The durable storage port used by [`PreferencesStore`](super::preferences_store::PreferencesStore).
//!
//! Any medium that can read and write a whole [`Snapshot`] under a namespaced
//! identifier satisfies the contract: a file per namespace, an in-memory map
//! for tests, a remote configuration service.  The store never assumes the
//! medium is synchronous; both operations are `async`.

use std::path::PathBuf;

use async_trait::async_trait;
use studio_core::Snapshot;
use thiserror::Error;

/// Error type for snapshot storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing preferences at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The persisted snapshot could not be parsed.
    #[error("failed to parse preferences snapshot: {0}")]
    Parse(String),

    /// The snapshot could not be serialised.
    #[error("failed to serialize preferences snapshot: {0}")]
    Serialize(String),

    /// The namespace cannot be used as a storage identifier.
    #[error("invalid preferences namespace: {0:?}")]
    InvalidNamespace(String),

    /// The backend is not reachable or refused the operation.
    #[error("preferences storage unavailable: {0}")]
    Unavailable(String),
}

/// Trait abstracting snapshot persistence.
///
/// The production implementation writes files
/// ([`FileSnapshotStorage`](crate::infrastructure::storage::file::FileSnapshotStorage));
/// tests use [`MemorySnapshotStorage`](crate::infrastructure::storage::memory::MemorySnapshotStorage)
/// or the `mockall`-generated `MockSnapshotStorage`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnapshotStorage: Send + Sync {
    /// Reads the snapshot stored under `namespace`.
    ///
    /// Returns `Ok(None)` when nothing has been persisted yet (first run).
    async fn load_snapshot(&self, namespace: &str) -> Result<Option<Snapshot>, StorageError>;

    /// Replaces the snapshot stored under `namespace`.
    async fn save_snapshot(&self, namespace: &str, snapshot: &Snapshot)
        -> Result<(), StorageError>;
}
