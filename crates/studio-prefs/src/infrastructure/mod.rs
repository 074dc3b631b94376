//! Infrastructure layer for the preferences store.
//!
//! Contains the outward-facing adapters: snapshot storage (files on disk, an
//! in-memory map) and the UI command bridge.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `studio_core`, but MUST NOT be imported by the `application` or domain
//! layers.

pub mod storage;
pub mod ui_bridge;
