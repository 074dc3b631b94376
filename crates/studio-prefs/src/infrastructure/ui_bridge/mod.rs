//! UI command bridge: exposes the preferences store to a desktop or web shell.
//!
//! Every command function here delegates to the shared [`SettingsState`] and
//! returns a JSON-serialisable [`CommandResult`].  The presentation layer is
//! the only consumer of this module; it must NOT be imported by the
//! application or domain layers.
//!
//! # How a settings page uses these commands (for beginners)
//!
//! ```js
//! const settings = await invoke("get_settings");          // render controls
//! await invoke("update_setting", { key: "theme", value: "dark" });
//! const dirty = await invoke("get_dirty");                // show "Unsaved changes"
//! await invoke("save_settings");                          // or "reset_settings"
//! ```
//!
//! # Validation happens here, not in the store
//!
//! The store accepts any value for a registered key.  `update_setting` is
//! the boundary where user input arrives, so it converts the JSON value using
//! the setting's descriptor and rejects anything the descriptor does not
//! allow before calling [`PreferencesStore::set_value`].
//!
//! # `CommandResult<T>` wrapper
//!
//! All commands return `CommandResult<T>` rather than `Result<T, E>`, so every
//! response has the same shape: `{ success: bool, data: T | null, error:
//! string | null }`.  A failed save therefore arrives as `success: false` with
//! the storage error message, distinct from a successful save.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use studio_core::{ControlKind, PreferenceValue, SettingDescriptor, SettingsSchema};

use crate::application::preferences_store::{PreferencesStore, StoreError};

// ── Shared state ──────────────────────────────────────────────────────────────

/// State shared between UI commands: the store and the schema its UI renders.
pub struct SettingsState {
    pub store: Arc<PreferencesStore>,
    pub schema: SettingsSchema,
}

impl SettingsState {
    pub fn new(store: Arc<PreferencesStore>, schema: SettingsSchema) -> Arc<Self> {
        Arc::new(Self { store, schema })
    }
}

// ── Data Transfer Objects ─────────────────────────────────────────────────────

/// One setting as rendered by the settings page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingDto {
    pub key: String,
    pub label: String,
    /// Lowercase category id, e.g. `"appearance"`.
    pub category: String,
    /// Section heading, e.g. `"AI Generation"`.
    pub category_label: String,
    pub control: ControlKind,
    pub value: Value,
}

impl SettingDto {
    fn new(descriptor: &SettingDescriptor, value: Option<PreferenceValue>) -> Self {
        Self {
            key: descriptor.key.clone(),
            label: descriptor.label.clone(),
            category: descriptor.category.id().to_string(),
            category_label: descriptor.category.label().to_string(),
            control: descriptor.control.clone(),
            value: value.as_ref().map_or(Value::Null, to_json),
        }
    }
}

/// Unified response wrapper used by UI commands.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResult<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

impl<T: Serialize, E: std::fmt::Display> From<Result<T, E>> for CommandResult<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::err(e.to_string()),
        }
    }
}

// ── Value conversion ──────────────────────────────────────────────────────────

/// Converts a preference value to JSON.  Non-finite floats become `null`.
pub fn to_json(value: &PreferenceValue) -> Value {
    match value {
        PreferenceValue::Bool(b) => Value::Bool(*b),
        PreferenceValue::Int(n) => Value::from(*n),
        PreferenceValue::Float(x) => Value::from(*x),
        PreferenceValue::Text(s) => Value::String(s.clone()),
    }
}

/// Converts a JSON value from the UI into a preference value shaped like
/// `descriptor`'s default (`1` becomes `Float` for a fractional slider,
/// `20.0` becomes `Int` for an integral one), then validates it.
fn from_json(descriptor: &SettingDescriptor, value: Value) -> Result<PreferenceValue, StoreError> {
    let converted = match value {
        Value::Bool(b) => PreferenceValue::Bool(b),
        Value::String(s) => PreferenceValue::Text(s),
        Value::Number(n) => {
            let raw = match n.as_i64() {
                Some(i) => PreferenceValue::Int(i),
                None => PreferenceValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            };
            // A number that cannot take the default's shape (20.5 for an
            // integral slider) is left as is for validation to reject.
            raw.conformed_to(&descriptor.default_value()).unwrap_or(raw)
        }
        other => {
            // Arrays, objects and null have no preference representation;
            // pass the JSON text through so validation reports a kind mismatch.
            PreferenceValue::Text(other.to_string())
        }
    };
    descriptor.validate(&converted)?;
    Ok(converted)
}

// ── Commands ──────────────────────────────────────────────────────────────────

/// Returns every setting with its descriptor and current value, in schema
/// order.
pub async fn get_settings(state: Arc<SettingsState>) -> CommandResult<Vec<SettingDto>> {
    let values = state.store.values();
    let dtos = state
        .schema
        .descriptors()
        .iter()
        .map(|d| SettingDto::new(d, values.get(&d.key).cloned()))
        .collect();
    CommandResult::ok(dtos)
}

/// Returns the current value of one setting.
pub async fn get_setting(state: Arc<SettingsState>, key: String) -> CommandResult<Value> {
    state.store.get_value(&key).map(|v| to_json(&v)).into()
}

/// Validates and applies one edit.  Nothing is persisted.
pub async fn update_setting(
    state: Arc<SettingsState>,
    key: String,
    value: Value,
) -> CommandResult<()> {
    let descriptor = match state.schema.descriptor(&key) {
        Some(d) => d,
        None => return CommandResult::err(format!("unknown setting: {key:?}")),
    };
    let result = from_json(descriptor, value)
        .and_then(|v| state.store.set_value(&key, v).map_err(StoreError::from));
    result.into()
}

/// Persists all current values.
pub async fn save_settings(state: Arc<SettingsState>) -> CommandResult<()> {
    state.store.save().await.into()
}

/// Discards unsaved edits.
pub async fn reset_settings(state: Arc<SettingsState>) -> CommandResult<()> {
    state.store.reset();
    CommandResult::ok(())
}

/// Sets every setting back to its default (unsaved until `save_settings`).
pub async fn restore_default_settings(state: Arc<SettingsState>) -> CommandResult<()> {
    state.store.restore_defaults();
    CommandResult::ok(())
}

/// Returns whether unsaved edits exist.
pub async fn get_dirty(state: Arc<SettingsState>) -> CommandResult<bool> {
    CommandResult::ok(state.store.is_dirty())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
