//! [`SettingsSchema`]: the ordered set of descriptors a UI declares.

use std::collections::HashMap;

use thiserror::Error;

use super::descriptor::{SettingCategory, SettingDescriptor, ValidationError};
use crate::domain::set::PreferenceSet;
use crate::domain::value::PreferenceValue;

/// Errors raised while building a [`SettingsSchema`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("setting key must not be empty")]
    EmptyKey,

    #[error("duplicate setting key: {0:?}")]
    DuplicateKey(String),

    #[error("invalid descriptor for {key:?}: {reason}")]
    InvalidDescriptor { key: String, reason: String },
}

/// An ordered, duplicate-free collection of [`SettingDescriptor`]s.
///
/// Declaration order is preserved so the settings page renders controls in
/// the order they were declared.  Lookup by key goes through a `HashMap`
/// index into the descriptor vector.
#[derive(Debug, Clone)]
pub struct SettingsSchema {
    descriptors: Vec<SettingDescriptor>,
    index: HashMap<String, usize>,
}

impl SettingsSchema {
    /// Builds a schema, rejecting empty or duplicate keys and descriptors
    /// whose default violates their own constraints.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] found, in declaration order.
    pub fn new(descriptors: Vec<SettingDescriptor>) -> Result<Self, SchemaError> {
        let mut index = HashMap::with_capacity(descriptors.len());
        for (i, descriptor) in descriptors.iter().enumerate() {
            if descriptor.key.is_empty() {
                return Err(SchemaError::EmptyKey);
            }
            descriptor
                .check()
                .map_err(|reason| SchemaError::InvalidDescriptor {
                    key: descriptor.key.clone(),
                    reason,
                })?;
            if index.insert(descriptor.key.clone(), i).is_some() {
                return Err(SchemaError::DuplicateKey(descriptor.key.clone()));
            }
        }
        Ok(Self { descriptors, index })
    }

    /// Returns the default [`PreferenceSet`]: one entry per descriptor.
    pub fn defaults(&self) -> PreferenceSet {
        self.descriptors
            .iter()
            .map(|d| (d.key.clone(), d.default_value()))
            .collect()
    }

    pub fn descriptor(&self, key: &str) -> Option<&SettingDescriptor> {
        self.index.get(key).map(|&i| &self.descriptors[i])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// All descriptors in declaration order.
    pub fn descriptors(&self) -> &[SettingDescriptor] {
        &self.descriptors
    }

    /// Descriptors in `category`, in declaration order.
    pub fn by_category(
        &self,
        category: SettingCategory,
    ) -> impl Iterator<Item = &SettingDescriptor> {
        self.descriptors
            .iter()
            .filter(move |d| d.category == category)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Validates `value` for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownKey`] if no descriptor exists, or the
    /// descriptor's own validation error.
    pub fn validate(&self, key: &str, value: &PreferenceValue) -> Result<(), ValidationError> {
        self.lookup(key)?.validate(value)
    }

    /// Parses raw user input for `key` into a validated value.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownKey`] if no descriptor exists, or the
    /// descriptor's parse/validation error.
    pub fn parse_value(&self, key: &str, input: &str) -> Result<PreferenceValue, ValidationError> {
        self.lookup(key)?.parse(input)
    }

    fn lookup(&self, key: &str) -> Result<&SettingDescriptor, ValidationError> {
        self.descriptor(key)
            .ok_or_else(|| ValidationError::UnknownKey(key.to_string()))
    }
}
