//! # studio-core
//!
//! Shared library for Studio preferences containing the preference value
//! model, setting descriptors, and the built-in settings catalog used by the
//! dashboard's settings page.
//!
//! This crate has zero dependencies on file systems, async runtimes, or UI
//! frameworks.  Persistence and the edit/save/reset state machine live in
//! `studio-prefs`.
//!
//! # Architecture overview (for beginners)
//!
//! A user's preferences are a flat map from a setting key (e.g. `"theme"`) to
//! a value.  Values are heterogeneous: a toggle stores a boolean, a slider a
//! number, a selector a string.  This crate defines:
//!
//! - **`domain`** – The data that gets stored: [`PreferenceValue`] (a tagged
//!   union of bool / integer / float / text), [`PreferenceSet`] (the full
//!   key → value map), and [`Snapshot`] (a versioned, persisted copy of a set).
//!
//! - **`schema`** – The metadata the UI renders from: a [`SettingDescriptor`]
//!   says which category a key belongs to, which control edits it (toggle,
//!   select, slider, text), and what its default is.  A [`SettingsSchema`]
//!   groups descriptors, produces the default [`PreferenceSet`], and validates
//!   user input before it reaches the store.

pub mod domain;
pub mod schema;

// Re-export the most-used types at the crate root so callers can write
// `studio_core::PreferenceValue` instead of `studio_core::domain::value::PreferenceValue`.
pub use domain::set::{MergeReport, PreferenceSet, Snapshot, UnknownKeyError, SNAPSHOT_VERSION};
pub use domain::value::{PreferenceValue, ValueKind};
pub use schema::catalog::studio_schema;
pub use schema::descriptor::{ControlKind, SettingCategory, SettingDescriptor, ValidationError};
pub use schema::registry::{SchemaError, SettingsSchema};
