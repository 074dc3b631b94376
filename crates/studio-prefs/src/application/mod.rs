//! Application layer for the preferences store.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (pure data and rules, here the `studio-core` crate) and the
//! infrastructure (files, terminals, UI shells).
//!
//! Code in this layer:
//!
//! - **Orchestrates** domain objects to fulfil a user goal (e.g., "apply this
//!   edit and remember that it is not saved yet").
//! - **Depends on abstractions** (the [`snapshot_storage::SnapshotStorage`]
//!   trait) rather than concrete implementations, so a file, an in-memory map,
//!   or a remote config service can be plugged in without changing this code.
//! - **Contains no file system access** of its own.
//!
//! # Sub-modules
//!
//! - **`preferences_store`** – The single source of truth for a session's
//!   preferences: edit, save, reset, and the observable dirty flag.
//!
//! - **`snapshot_storage`**  – The port the store persists through, plus its
//!   error type.

pub mod preferences_store;
pub mod snapshot_storage;
