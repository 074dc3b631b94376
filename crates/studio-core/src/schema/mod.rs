//! Setting descriptors and the schema that groups them.
//!
//! The preference store is deliberately type-agnostic: it stores whatever
//! [`PreferenceValue`](crate::PreferenceValue) it is handed.  Checking that a
//! font size is a number between 12 and 24 is the job of whoever talks to the
//! user, and that caller does it with the descriptors in this module.
//!
//! - **`descriptor`** – One setting: key, label, category, control kind.
//! - **`registry`**   – [`SettingsSchema`](registry::SettingsSchema): an
//!   ordered, duplicate-free list of descriptors with lookup, defaults, and
//!   validation.
//! - **`catalog`**    – The settings the Studio dashboard actually declares.

pub mod catalog;
pub mod descriptor;
pub mod registry;
