//! PreferencesStore: the session's single source of truth for user preferences.
//!
//! The store holds the current [`PreferenceSet`], a shadow copy of the last
//! successfully persisted set, and an "unsaved changes" (dirty) flag.  Edits
//! are applied in memory immediately; nothing is written until [`save`] is
//! called explicitly.
//!
//! # State machine (for beginners)
//!
//! ```text
//!            set_value / restore_defaults
//!   Clean ─────────────────────────────────►  Dirty ──┐ set_value
//!     ▲  ▲                                      │  ◄───┘
//!     │  └──────────── save (ok) ───────────────┤
//!     └─────────────── reset ───────────────────┘
//! ```
//!
//! - `save` while `Clean` still performs the storage write.
//! - A failed `save` changes nothing: values and dirty flag stay as they were.
//!
//! # Saves that overlap edits
//!
//! [`save`] snapshots the set when it is *called*, then awaits the storage
//! write without holding the state lock.  Every edit (and every reset) bumps
//! an edit sequence number.  When the write completes, the dirty flag is
//! cleared only if the sequence number is unchanged; otherwise a newer edit
//! exists that the write did not include, and the store stays `Dirty`.
//! Concurrent saves are serialised, so storage sees them in call order.
//!
//! [`save`]: PreferencesStore::save

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use studio_core::{
    PreferenceSet, PreferenceValue, Snapshot, UnknownKeyError, ValidationError, SNAPSHOT_VERSION,
};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::snapshot_storage::{SnapshotStorage, StorageError};

/// Error raised when the initial snapshot load fails.
///
/// Never surfaced by [`PreferencesStore::open`]: the store logs it and falls
/// back to defaults.  [`PreferencesStore::origin`] reports that this happened.
pub type LoadError = StorageError;

/// Error returned by [`PreferencesStore::save`] when the storage write fails.
#[derive(Debug, Error)]
#[error("failed to persist preferences for namespace {namespace:?}: {source}")]
pub struct PersistenceError {
    pub namespace: String,
    #[source]
    pub source: StorageError,
}

/// Umbrella error for callers that validate, edit and save in one flow.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    UnknownKey(#[from] UnknownKeyError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// How the store's initial values were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOrigin {
    /// A persisted snapshot was merged onto the defaults.
    Snapshot,
    /// Nothing was persisted yet, or the store was built without loading.
    Defaults,
    /// Loading failed; the defaults were used instead.
    DefaultsAfterLoadError,
}

/// Mutable state guarded by the store's lock.
#[derive(Debug)]
struct StoreState {
    /// Current in-memory values, including unsaved edits.
    current: PreferenceSet,
    /// Values as of the last successful save (or the initial load).
    last_saved: PreferenceSet,
    dirty: bool,
    /// Bumped on every edit and reset.
    edit_seq: u64,
}

/// The preferences store.
///
/// All methods take `&self`; the store is usually shared as
/// `Arc<PreferencesStore>` between the UI and background tasks.
pub struct PreferencesStore {
    storage: Arc<dyn SnapshotStorage>,
    namespace: String,
    defaults: PreferenceSet,
    origin: StoreOrigin,
    state: Mutex<StoreState>,
    /// Serialises storage writes so they land in call order.
    save_lock: tokio::sync::Mutex<()>,
    dirty_tx: watch::Sender<bool>,
}

impl PreferencesStore {
    /// Opens the store for `namespace`, seeding it from the persisted snapshot
    /// if one exists and from `defaults` otherwise.
    ///
    /// Persisted keys with no entry in `defaults` are ignored, as are values
    /// whose type does not match the default.  A load failure is logged and
    /// the defaults are used; it is never returned.
    pub async fn open(
        storage: Arc<dyn SnapshotStorage>,
        namespace: impl Into<String>,
        defaults: PreferenceSet,
    ) -> Self {
        let namespace = namespace.into();

        let (initial, origin) = match storage.load_snapshot(&namespace).await {
            Ok(Some(snapshot)) => {
                if snapshot.version > SNAPSHOT_VERSION {
                    warn!(
                        namespace = %namespace,
                        version = snapshot.version,
                        "snapshot was written by a newer release; loading known keys only"
                    );
                }
                let (merged, report) = defaults.merged_with(&snapshot.values);
                if !report.is_clean() {
                    info!(
                        namespace = %namespace,
                        unknown = report.ignored_unknown.len(),
                        mismatched = report.ignored_mismatched.len(),
                        "ignored stale entries in persisted preferences"
                    );
                }
                debug!(namespace = %namespace, applied = report.applied, "loaded preferences");
                (merged, StoreOrigin::Snapshot)
            }
            Ok(None) => {
                debug!(namespace = %namespace, "no persisted preferences; using defaults");
                (defaults.clone(), StoreOrigin::Defaults)
            }
            Err(e) => {
                warn!(
                    namespace = %namespace,
                    error = %e,
                    "failed to load preferences; using defaults"
                );
                (defaults.clone(), StoreOrigin::DefaultsAfterLoadError)
            }
        };

        Self::from_parts(storage, namespace, defaults, initial, origin)
    }

    /// Builds a store holding `defaults` without reading storage.
    pub fn with_defaults(
        storage: Arc<dyn SnapshotStorage>,
        namespace: impl Into<String>,
        defaults: PreferenceSet,
    ) -> Self {
        let initial = defaults.clone();
        Self::from_parts(
            storage,
            namespace.into(),
            defaults,
            initial,
            StoreOrigin::Defaults,
        )
    }

    fn from_parts(
        storage: Arc<dyn SnapshotStorage>,
        namespace: String,
        defaults: PreferenceSet,
        initial: PreferenceSet,
        origin: StoreOrigin,
    ) -> Self {
        let (dirty_tx, _) = watch::channel(false);
        Self {
            storage,
            namespace,
            defaults,
            origin,
            state: Mutex::new(StoreState {
                last_saved: initial.clone(),
                current: initial,
                dirty: false,
                edit_seq: 0,
            }),
            save_lock: tokio::sync::Mutex::new(()),
            dirty_tx,
        }
    }

    // ── Reads ─────────────────────────────────────────────────────────────────

    /// Returns the current in-memory value for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownKeyError`] if `key` has no registered default.
    pub fn get_value(&self, key: &str) -> Result<PreferenceValue, UnknownKeyError> {
        match self.lock_state().current.get(key) {
            Some(value) => Ok(value.clone()),
            None => Err(self.unknown_key(key)),
        }
    }

    /// Returns a copy of every current value.
    pub fn values(&self) -> PreferenceSet {
        self.lock_state().current.clone()
    }

    /// Returns `true` if `key` has a registered default.
    pub fn contains_key(&self, key: &str) -> bool {
        self.defaults.contains_key(key)
    }

    /// Returns `true` if edits exist that have not been saved.
    pub fn is_dirty(&self) -> bool {
        self.lock_state().dirty
    }

    /// Subscribes to dirty-flag changes.
    ///
    /// The receiver is notified only when the flag actually flips.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.dirty_tx.subscribe()
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn origin(&self) -> StoreOrigin {
        self.origin
    }

    /// The registered defaults this store was built with.
    pub fn defaults(&self) -> &PreferenceSet {
        &self.defaults
    }

    // ── Edits ─────────────────────────────────────────────────────────────────

    /// Overwrites the in-memory value for `key` and marks the store dirty.
    ///
    /// No type or range validation is performed; callers validate against the
    /// setting's descriptor first.  Nothing is persisted.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownKeyError`] if `key` has no registered default; the
    /// store is left unchanged.
    pub fn set_value(
        &self,
        key: &str,
        value: impl Into<PreferenceValue>,
    ) -> Result<(), UnknownKeyError> {
        if !self.defaults.contains_key(key) {
            return Err(self.unknown_key(key));
        }
        let mut state = self.lock_state();
        state.current.insert(key, value);
        state.edit_seq += 1;
        self.set_dirty(&mut state, true);
        Ok(())
    }

    /// Discards unsaved edits, restoring the last successfully saved values
    /// (or the initial values if nothing was saved this session).
    ///
    /// Local and synchronous: storage is not consulted.
    pub fn reset(&self) {
        let mut state = self.lock_state();
        let restored = state.last_saved.clone();
        state.current = restored;
        state.edit_seq += 1;
        self.set_dirty(&mut state, false);
        debug!(namespace = %self.namespace, "discarded unsaved preference edits");
    }

    /// Sets every key back to its registered default.
    ///
    /// This is an edit like any other: the store becomes dirty and the
    /// defaults are only persisted by a subsequent [`save`](Self::save).
    pub fn restore_defaults(&self) {
        let mut state = self.lock_state();
        state.current = self.defaults.clone();
        state.edit_seq += 1;
        self.set_dirty(&mut state, true);
    }

    // ── Persistence ───────────────────────────────────────────────────────────

    /// Persists the entire current set.
    ///
    /// The snapshot is taken when `save` is called.  On success the dirty flag
    /// is cleared unless an edit or reset happened while the write was in
    /// flight.  Saving a clean store still performs the write.
    ///
    /// # Errors
    ///
    /// Returns [`PersistenceError`] wrapping the storage error.  The in-memory
    /// values and the dirty flag are left untouched.
    pub async fn save(&self) -> Result<(), PersistenceError> {
        let (snapshot, started_at) = {
            let state = self.lock_state();
            (Snapshot::new(state.current.clone()), state.edit_seq)
        };

        let _write_guard = self.save_lock.lock().await;
        let written = self.storage.save_snapshot(&self.namespace, &snapshot).await;

        match written {
            Ok(()) => {
                let keys = snapshot.values.len();
                let mut state = self.lock_state();
                state.last_saved = snapshot.values;
                let superseded = state.edit_seq != started_at;
                self.set_dirty(&mut state, superseded);
                if superseded {
                    debug!(
                        namespace = %self.namespace,
                        "preferences changed while saving; newer edits remain unsaved"
                    );
                }
                info!(namespace = %self.namespace, keys, "preferences saved");
                Ok(())
            }
            Err(source) => {
                warn!(
                    namespace = %self.namespace,
                    error = %source,
                    "failed to save preferences"
                );
                Err(PersistenceError {
                    namespace: self.namespace.clone(),
                    source,
                })
            }
        }
    }

    // ── Internals ─────────────────────────────────────────────────────────────

    fn lock_state(&self) -> MutexGuard<'_, StoreState> {
        // Each critical section leaves the state consistent before any call
        // that could panic, so a poisoned guard is still usable.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_dirty(&self, state: &mut StoreState, dirty: bool) {
        state.dirty = dirty;
        self.dirty_tx.send_if_modified(|current| {
            if *current == dirty {
                false
            } else {
                *current = dirty;
                true
            }
        });
    }

    fn unknown_key(&self, key: &str) -> UnknownKeyError {
        error!(namespace = %self.namespace, key, "access to unregistered preference key");
        UnknownKeyError(key.to_string())
    }
}
