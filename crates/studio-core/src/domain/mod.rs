//! Domain entities for Studio preferences.
//!
//! This module contains pure data types with no infrastructure dependencies.
//!
//! # What belongs here? (for beginners)
//!
//! The domain layer holds the values the rest of the workspace moves around:
//! what a preference value is, what a complete set of preferences looks like,
//! and how a persisted snapshot is merged back onto the defaults when a
//! session starts.  Nothing here reads files, awaits futures, or logs to a
//! terminal, so every rule can be unit-tested in isolation.

/// Key → value map, persisted snapshots, and the snapshot merge rules.
pub mod set;

/// The heterogeneous preference value type.
pub mod value;
