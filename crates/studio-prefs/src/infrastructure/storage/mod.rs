//! Storage infrastructure: snapshot persistence adapters.
//!
//! Both adapters implement the application layer's
//! [`SnapshotStorage`](crate::application::snapshot_storage::SnapshotStorage)
//! port:
//!
//! - **`file`**   – One TOML (or JSON) file per namespace in the
//!   platform-appropriate config directory.  Writes are atomic: the snapshot
//!   goes to a temporary file that is then renamed over the old one.
//! - **`memory`** – A process-local map with failure injection, used by tests
//!   and for sessions that must not touch the disk.
//!
//! Keeping storage concerns here means the file format can change (or a
//! remote backend can be added) without touching the store.

pub mod file;
pub mod memory;
