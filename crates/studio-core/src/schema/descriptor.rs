//! Setting descriptors: UI-facing metadata for a single preference key.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::value::{PreferenceValue, ValueKind};

/// Absolute tolerance for slider range and step checks.
const SLIDER_EPSILON: f64 = 1e-9;

/// Settings page section a descriptor is rendered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingCategory {
    Appearance,
    Notifications,
    Generation,
    Privacy,
    Account,
}

impl SettingCategory {
    /// All categories in settings page order.
    pub const ALL: [SettingCategory; 5] = [
        SettingCategory::Appearance,
        SettingCategory::Notifications,
        SettingCategory::Generation,
        SettingCategory::Privacy,
        SettingCategory::Account,
    ];

    /// Stable lowercase identifier, matching the serialised form.
    pub fn id(&self) -> &'static str {
        match self {
            SettingCategory::Appearance => "appearance",
            SettingCategory::Notifications => "notifications",
            SettingCategory::Generation => "generation",
            SettingCategory::Privacy => "privacy",
            SettingCategory::Account => "account",
        }
    }

    /// Section heading shown in the UI.
    pub fn label(&self) -> &'static str {
        match self {
            SettingCategory::Appearance => "Appearance",
            SettingCategory::Notifications => "Notifications",
            SettingCategory::Generation => "AI Generation",
            SettingCategory::Privacy => "Privacy",
            SettingCategory::Account => "Account",
        }
    }
}

impl fmt::Display for SettingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The control that edits a setting, with its kind-specific constraints and
/// default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ControlKind {
    /// On/off switch.
    Toggle { default: bool },
    /// Drop-down or segmented selector over a fixed option list.
    Select { options: Vec<String>, default: String },
    /// Numeric slider.  When `min`, `max`, `step` and `default` are all whole
    /// numbers the slider produces [`PreferenceValue::Int`] values.
    Slider {
        min: f64,
        max: f64,
        step: f64,
        default: f64,
    },
    /// Free-form text input.
    Text {
        default: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_len: Option<usize>,
    },
}

impl ControlKind {
    /// The value kind this control produces.
    pub fn value_kind(&self) -> ValueKind {
        match self {
            ControlKind::Toggle { .. } => ValueKind::Bool,
            ControlKind::Slider { .. } => ValueKind::Number,
            ControlKind::Select { .. } | ControlKind::Text { .. } => ValueKind::Text,
        }
    }

    /// Short control name used in DTOs and CLI output.
    pub fn name(&self) -> &'static str {
        match self {
            ControlKind::Toggle { .. } => "toggle",
            ControlKind::Select { .. } => "select",
            ControlKind::Slider { .. } => "slider",
            ControlKind::Text { .. } => "text",
        }
    }
}

/// Errors produced when user input does not satisfy a descriptor.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ValidationError {
    /// No descriptor exists for the key.
    #[error("unknown setting: {0:?}")]
    UnknownKey(String),

    #[error("{key}: expected a {expected} value, got a {found} value")]
    KindMismatch {
        key: String,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("{key}: {value:?} is not one of {options:?}")]
    NotAnOption {
        key: String,
        value: String,
        options: Vec<String>,
    },

    #[error("{key}: {value} is outside {min}..={max}")]
    OutOfRange {
        key: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{key}: {value} is not a multiple of {step} from {min}")]
    OffStep {
        key: String,
        value: f64,
        min: f64,
        step: f64,
    },

    #[error("{key}: text is {len} characters, limit is {max}")]
    TooLong { key: String, len: usize, max: usize },

    /// The raw input could not be read as the control's value kind.
    #[error("{key}: cannot read {input:?} as a {expected} value")]
    Unparseable {
        key: String,
        input: String,
        expected: ValueKind,
    },
}

/// Describes how one preference key is rendered and edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingDescriptor {
    /// Preference key, e.g. `"fontSize"`.
    pub key: String,
    /// Human-readable label.
    pub label: String,
    /// Settings page section.
    pub category: SettingCategory,
    /// Control kind, constraints and default.
    pub control: ControlKind,
}

impl SettingDescriptor {
    pub fn toggle(
        key: impl Into<String>,
        label: impl Into<String>,
        category: SettingCategory,
        default: bool,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            category,
            control: ControlKind::Toggle { default },
        }
    }

    pub fn select<I, S>(
        key: impl Into<String>,
        label: impl Into<String>,
        category: SettingCategory,
        options: I,
        default: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            key: key.into(),
            label: label.into(),
            category,
            control: ControlKind::Select {
                options: options.into_iter().map(Into::into).collect(),
                default: default.into(),
            },
        }
    }

    pub fn slider(
        key: impl Into<String>,
        label: impl Into<String>,
        category: SettingCategory,
        min: f64,
        max: f64,
        step: f64,
        default: f64,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            category,
            control: ControlKind::Slider {
                min,
                max,
                step,
                default,
            },
        }
    }

    pub fn text(
        key: impl Into<String>,
        label: impl Into<String>,
        category: SettingCategory,
        default: impl Into<String>,
        max_len: Option<usize>,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            category,
            control: ControlKind::Text {
                default: default.into(),
                max_len,
            },
        }
    }

    /// Returns the value a fresh store holds for this key.
    pub fn default_value(&self) -> PreferenceValue {
        match &self.control {
            ControlKind::Toggle { default } => PreferenceValue::Bool(*default),
            ControlKind::Select { default, .. } => PreferenceValue::Text(default.clone()),
            ControlKind::Slider {
                min,
                max,
                step,
                default,
            } => {
                if is_integral(&[*min, *max, *step, *default]) {
                    PreferenceValue::Int(*default as i64)
                } else {
                    PreferenceValue::Float(*default)
                }
            }
            ControlKind::Text { default, .. } => PreferenceValue::Text(default.clone()),
        }
    }

    /// Checks `value` against this descriptor's kind and constraints.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] the value violates.
    pub fn validate(&self, value: &PreferenceValue) -> Result<(), ValidationError> {
        let expected = self.control.value_kind();
        if value.kind() != expected {
            return Err(ValidationError::KindMismatch {
                key: self.key.clone(),
                expected,
                found: value.kind(),
            });
        }

        match (&self.control, value) {
            (ControlKind::Select { options, .. }, PreferenceValue::Text(s)) => {
                if !options.iter().any(|o| o == s) {
                    return Err(ValidationError::NotAnOption {
                        key: self.key.clone(),
                        value: s.clone(),
                        options: options.clone(),
                    });
                }
            }
            (
                ControlKind::Slider {
                    min, max, step, ..
                },
                number,
            ) => {
                // Kind already checked, so this is Int or Float.
                let x = number.as_f64().unwrap_or(f64::NAN);
                self.check_slider(x, *min, *max, *step)?;
            }
            (ControlKind::Text { max_len: Some(max), .. }, PreferenceValue::Text(s)) => {
                let len = s.chars().count();
                if len > *max {
                    return Err(ValidationError::TooLong {
                        key: self.key.clone(),
                        len,
                        max: *max,
                    });
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Parses raw user input (a CLI argument, a text field) into a value for
    /// this setting, then validates it.
    ///
    /// Toggles accept `true/false`, `on/off`, `yes/no` and `1/0`
    /// (case-insensitive).  Integral sliders produce `Int`, others `Float`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Unparseable`] if the text cannot be read as
    /// the control's value kind, or any error [`validate`](Self::validate)
    /// reports.
    pub fn parse(&self, input: &str) -> Result<PreferenceValue, ValidationError> {
        let trimmed = input.trim();
        let unparseable = || ValidationError::Unparseable {
            key: self.key.clone(),
            input: input.to_string(),
            expected: self.control.value_kind(),
        };

        let value = match &self.control {
            ControlKind::Toggle { .. } => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "on" | "yes" | "1" => PreferenceValue::Bool(true),
                "false" | "off" | "no" | "0" => PreferenceValue::Bool(false),
                _ => return Err(unparseable()),
            },
            ControlKind::Select { .. } => PreferenceValue::Text(trimmed.to_string()),
            ControlKind::Slider { .. } => {
                if let Ok(n) = trimmed.parse::<i64>() {
                    match self.default_value() {
                        PreferenceValue::Int(_) => PreferenceValue::Int(n),
                        _ => PreferenceValue::Float(n as f64),
                    }
                } else {
                    let x = trimmed.parse::<f64>().map_err(|_| unparseable())?;
                    if !x.is_finite() {
                        return Err(unparseable());
                    }
                    PreferenceValue::Float(x)
                }
            }
            ControlKind::Text { .. } => PreferenceValue::Text(input.to_string()),
        };

        self.validate(&value)?;
        Ok(value)
    }

    /// Checks that the descriptor itself is consistent (default satisfies its
    /// own constraints, slider bounds are ordered, options are non-empty).
    pub(crate) fn check(&self) -> Result<(), String> {
        match &self.control {
            ControlKind::Select { options, .. } if options.is_empty() => {
                return Err("select has no options".to_string());
            }
            ControlKind::Slider { min, max, step, .. } => {
                if !(min.is_finite() && max.is_finite() && step.is_finite()) {
                    return Err("slider bounds must be finite".to_string());
                }
                if min > max {
                    return Err(format!("slider min {min} is greater than max {max}"));
                }
                if *step <= 0.0 {
                    return Err(format!("slider step {step} must be positive"));
                }
            }
            _ => {}
        }
        self.validate(&self.default_value())
            .map_err(|e| format!("default is invalid: {e}"))
    }

    fn check_slider(&self, x: f64, min: f64, max: f64, step: f64) -> Result<(), ValidationError> {
        if !x.is_finite() || x < min - SLIDER_EPSILON || x > max + SLIDER_EPSILON {
            return Err(ValidationError::OutOfRange {
                key: self.key.clone(),
                value: x,
                min,
                max,
            });
        }
        let steps = (x - min) / step;
        if (steps - steps.round()).abs() * step > SLIDER_EPSILON.max(step * 1e-6) {
            return Err(ValidationError::OffStep {
                key: self.key.clone(),
                value: x,
                min,
                step,
            });
        }
        Ok(())
    }
}

fn is_integral(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite() && v.fract() == 0.0)
}
