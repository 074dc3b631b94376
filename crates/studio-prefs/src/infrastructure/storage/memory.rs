//! In-memory snapshot storage.
//!
//! Allows tests to exercise the store's save/load paths without a file
//! system, and to inject storage failures on demand.

use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Mutex, MutexGuard, PoisonError,
};

use async_trait::async_trait;
use studio_core::Snapshot;

use crate::application::snapshot_storage::{SnapshotStorage, StorageError};

/// A [`SnapshotStorage`] backed by a `HashMap` keyed by namespace.
#[derive(Default)]
pub struct MemorySnapshotStorage {
    snapshots: Mutex<HashMap<String, Snapshot>>,
    fail_saves: AtomicBool,
    fail_loads: AtomicBool,
    save_count: AtomicUsize,
}

impl MemorySnapshotStorage {
    /// Creates an empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a storage that already holds `snapshot` under `namespace`.
    pub fn with_snapshot(namespace: impl Into<String>, snapshot: Snapshot) -> Self {
        let storage = Self::new();
        storage.snapshots().insert(namespace.into(), snapshot);
        storage
    }

    /// When `true`, every subsequent `save_snapshot` fails with
    /// [`StorageError::Unavailable`].
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// When `true`, every subsequent `load_snapshot` fails with
    /// [`StorageError::Unavailable`].
    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    /// Number of successful `save_snapshot` calls.
    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }

    /// Returns a copy of the snapshot stored under `namespace`.
    pub fn snapshot(&self, namespace: &str) -> Option<Snapshot> {
        self.snapshots().get(namespace).cloned()
    }

    fn snapshots(&self) -> MutexGuard<'_, HashMap<String, Snapshot>> {
        self.snapshots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl SnapshotStorage for MemorySnapshotStorage {
    async fn load_snapshot(&self, namespace: &str) -> Result<Option<Snapshot>, StorageError> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("injected load failure".to_string()));
        }
        Ok(self.snapshot(namespace))
    }

    async fn save_snapshot(&self, namespace: &str, snapshot: &Snapshot) -> Result<(), StorageError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("injected save failure".to_string()));
        }
        self.snapshots()
            .insert(namespace.to_string(), snapshot.clone());
        self.save_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studio_core::PreferenceSet;

    fn snapshot(theme: &str) -> Snapshot {
        Snapshot::new([("theme", theme)].into_iter().collect::<PreferenceSet>())
    }

    #[tokio::test]
    async fn test_load_returns_none_for_unknown_namespace() {
        let storage = MemorySnapshotStorage::new();
        assert!(storage.load_snapshot("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load_returns_same_snapshot() {
        // Arrange
        let storage = MemorySnapshotStorage::new();

        // Act
        storage.save_snapshot("ns", &snapshot("dark")).await.unwrap();

        // Assert
        assert_eq!(storage.load_snapshot("ns").await.unwrap(), Some(snapshot("dark")));
        assert_eq!(storage.save_count(), 1);
    }

    #[tokio::test]
    async fn test_namespaces_are_isolated() {
        let storage = MemorySnapshotStorage::with_snapshot("a", snapshot("dark"));

        storage.save_snapshot("b", &snapshot("light")).await.unwrap();

        assert_eq!(storage.snapshot("a"), Some(snapshot("dark")));
        assert_eq!(storage.snapshot("b"), Some(snapshot("light")));
    }

    #[tokio::test]
    async fn test_injected_save_failure_leaves_previous_snapshot() {
        let storage = MemorySnapshotStorage::with_snapshot("ns", snapshot("dark"));
        storage.fail_saves(true);

        let result = storage.save_snapshot("ns", &snapshot("light")).await;

        assert!(matches!(result, Err(StorageError::Unavailable(_))));
        assert_eq!(storage.snapshot("ns"), Some(snapshot("dark")));
        assert_eq!(storage.save_count(), 0);
    }

    #[tokio::test]
    async fn test_injected_load_failure_can_be_cleared() {
        let storage = MemorySnapshotStorage::new();
        storage.fail_loads(true);
        assert!(storage.load_snapshot("ns").await.is_err());

        storage.fail_loads(false);
        assert!(storage.load_snapshot("ns").await.is_ok());
    }
}
