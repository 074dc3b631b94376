//! Heterogeneous preference values.
//!
//! A single preference map mixes booleans (toggles), numbers (sliders), and
//! strings (selectors, free text).  [`PreferenceValue`] is the tagged union
//! that holds any of them.  It serialises *untagged*, so a persisted snapshot
//! reads like hand-written config:
//!
//! ```toml
//! animations = true
//! fontSize = 16
//! creativity = 0.7
//! theme = "system"
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single preference value.
///
/// Variant order matters for untagged deserialisation: an integer literal
/// must become [`PreferenceValue::Int`] before [`PreferenceValue::Float`] is
/// tried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PreferenceValue {
    /// On/off value, edited by a toggle.
    Bool(bool),
    /// Whole number, e.g. a font size.
    Int(i64),
    /// Fractional number, e.g. a creativity slider in `0.0..=1.0`.
    Float(f64),
    /// Free text or a selector option.
    Text(String),
}

/// Coarse value category used for type checks at the storage and UI boundary.
///
/// `Int` and `Float` share [`ValueKind::Number`] so a slider persisted as `20`
/// still matches a default of `20.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Number,
    Text,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Bool => "boolean",
            ValueKind::Number => "number",
            ValueKind::Text => "text",
        };
        f.write_str(name)
    }
}

impl PreferenceValue {
    /// Returns the coarse kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            PreferenceValue::Bool(_) => ValueKind::Bool,
            PreferenceValue::Int(_) | PreferenceValue::Float(_) => ValueKind::Number,
            PreferenceValue::Text(_) => ValueKind::Text,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PreferenceValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value as an integer.
    ///
    /// A `Float` with no fractional part converts; anything else is `None`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            PreferenceValue::Int(n) => Some(*n),
            PreferenceValue::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            _ => None,
        }
    }

    /// Returns the value as a float (integers widen losslessly up to 2^53).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PreferenceValue::Int(n) => Some(*n as f64),
            PreferenceValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PreferenceValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Reshapes this value to the variant of `template` (usually a
    /// registered default).
    ///
    /// Numbers convert between `Int` and `Float` when no information is lost:
    /// `20.0` becomes `Int(20)` for an integer template, `1` becomes
    /// `Float(1.0)` for a float template.  Returns `None` when the value
    /// cannot take the template's shape (a fractional or non-finite number
    /// for an integer, any cross-kind pair).
    pub fn conformed_to(&self, template: &PreferenceValue) -> Option<PreferenceValue> {
        match (template, self) {
            (PreferenceValue::Int(_), _) => self.as_i64().map(PreferenceValue::Int),
            (PreferenceValue::Float(_), PreferenceValue::Int(n)) => {
                Some(PreferenceValue::Float(*n as f64))
            }
            (PreferenceValue::Float(_), PreferenceValue::Float(x)) if x.is_finite() => {
                Some(self.clone())
            }
            (PreferenceValue::Bool(_), PreferenceValue::Bool(_))
            | (PreferenceValue::Text(_), PreferenceValue::Text(_)) => Some(self.clone()),
            _ => None,
        }
    }
}

impl fmt::Display for PreferenceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreferenceValue::Bool(b) => write!(f, "{b}"),
            PreferenceValue::Int(n) => write!(f, "{n}"),
            PreferenceValue::Float(x) => write!(f, "{x}"),
            PreferenceValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for PreferenceValue {
    fn from(value: bool) -> Self {
        PreferenceValue::Bool(value)
    }
}

impl From<i64> for PreferenceValue {
    fn from(value: i64) -> Self {
        PreferenceValue::Int(value)
    }
}

impl From<i32> for PreferenceValue {
    fn from(value: i32) -> Self {
        PreferenceValue::Int(i64::from(value))
    }
}

impl From<f64> for PreferenceValue {
    fn from(value: f64) -> Self {
        PreferenceValue::Float(value)
    }
}

impl From<&str> for PreferenceValue {
    fn from(value: &str) -> Self {
        PreferenceValue::Text(value.to_string())
    }
}

impl From<String> for PreferenceValue {
    fn from(value: String) -> Self {
        PreferenceValue::Text(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_groups_int_and_float_as_number() {
        assert_eq!(PreferenceValue::Int(3).kind(), ValueKind::Number);
        assert_eq!(PreferenceValue::Float(0.5).kind(), ValueKind::Number);
        assert_eq!(PreferenceValue::Bool(true).kind(), ValueKind::Bool);
        assert_eq!(PreferenceValue::from("dark").kind(), ValueKind::Text);
    }

    #[test]
    fn test_as_i64_accepts_whole_float_only() {
        assert_eq!(PreferenceValue::Float(20.0).as_i64(), Some(20));
        assert_eq!(PreferenceValue::Float(20.5).as_i64(), None);
        assert_eq!(PreferenceValue::Text("20".into()).as_i64(), None);
    }

    #[test]
    fn test_conformed_to_reshapes_numbers_without_loss() {
        let int = PreferenceValue::Int(16);
        let float = PreferenceValue::Float(0.7);

        assert_eq!(PreferenceValue::Float(20.0).conformed_to(&int), Some(PreferenceValue::Int(20)));
        assert_eq!(PreferenceValue::Float(20.5).conformed_to(&int), None);
        assert_eq!(PreferenceValue::Int(1).conformed_to(&float), Some(PreferenceValue::Float(1.0)));
        assert_eq!(PreferenceValue::Float(f64::INFINITY).conformed_to(&float), None);
    }

    #[test]
    fn test_conformed_to_rejects_cross_kind_values() {
        let toggle = PreferenceValue::Bool(true);

        assert_eq!(PreferenceValue::from("yes").conformed_to(&toggle), None);
        assert_eq!(PreferenceValue::Int(1).conformed_to(&PreferenceValue::from("a")), None);
        assert_eq!(
            PreferenceValue::Bool(false).conformed_to(&toggle),
            Some(PreferenceValue::Bool(false))
        );
    }

    #[test]
    fn test_as_f64_widens_integers() {
        assert_eq!(PreferenceValue::Int(16).as_f64(), Some(16.0));
        assert_eq!(PreferenceValue::Bool(false).as_f64(), None);
    }

    #[test]
    fn test_json_integer_deserializes_as_int_not_float() {
        let v: PreferenceValue = serde_json::from_str("20").unwrap();
        assert_eq!(v, PreferenceValue::Int(20));

        let v: PreferenceValue = serde_json::from_str("0.7").unwrap();
        assert_eq!(v, PreferenceValue::Float(0.7));
    }

    #[test]
    fn test_serializes_untagged() {
        assert_eq!(serde_json::to_string(&PreferenceValue::Bool(true)).unwrap(), "true");
        assert_eq!(
            serde_json::to_string(&PreferenceValue::from("system")).unwrap(),
            "\"system\""
        );
    }

    #[test]
    fn test_display_renders_bare_value() {
        assert_eq!(PreferenceValue::from("dark").to_string(), "dark");
        assert_eq!(PreferenceValue::Int(14).to_string(), "14");
        assert_eq!(PreferenceValue::Bool(false).to_string(), "false");
    }
}
