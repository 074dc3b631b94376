//! Integration tests for the studio-core public API.
//!
//! These tests exercise the built-in catalog, descriptor validation, and
//! snapshot merging together, the way a settings page does when it loads a
//! persisted snapshot and then edits values from user input.

use studio_core::{
    studio_schema, PreferenceSet, PreferenceValue, SettingCategory, Snapshot, ValidationError,
};

#[test]
fn test_parse_then_validate_round_trips_through_the_catalog() {
    let schema = studio_schema();

    let theme = schema.parse_value("theme", "dark").expect("dark is a theme option");
    let size = schema.parse_value("fontSize", "20").expect("20 is in range");
    let creativity = schema.parse_value("creativity", "0.3").expect("0.3 is on step");

    assert_eq!(theme, PreferenceValue::from("dark"));
    assert_eq!(size, PreferenceValue::Int(20));
    assert_eq!(creativity, PreferenceValue::Float(0.3));
    assert!(schema.validate("theme", &theme).is_ok());
}

#[test]
fn test_parse_rejects_values_the_settings_page_cannot_produce() {
    let schema = studio_schema();

    assert!(matches!(
        schema.parse_value("fontSize", "48"),
        Err(ValidationError::OutOfRange { .. })
    ));
    assert!(matches!(
        schema.parse_value("imageQuality", "8k"),
        Err(ValidationError::NotAnOption { .. })
    ));
    assert!(matches!(
        schema.parse_value("doesNotExist", "1"),
        Err(ValidationError::UnknownKey(_))
    ));
}

#[test]
fn test_snapshot_from_older_release_merges_onto_current_defaults() {
    // Arrange: a snapshot written by a release that still had `betaFeatures`
    // and stored `weeklyDigest` as a string.
    let json = r#"{
        "version": 1,
        "values": {
            "theme": "dark",
            "fontSize": 18,
            "betaFeatures": true,
            "weeklyDigest": "yes"
        }
    }"#;
    let snapshot: Snapshot = serde_json::from_str(json).expect("valid snapshot");
    let defaults = studio_schema().defaults();

    // Act
    let (merged, report) = defaults.merged_with(&snapshot.values);

    // Assert
    assert_eq!(merged.get("theme"), Some(&PreferenceValue::from("dark")));
    assert_eq!(merged.get("fontSize"), Some(&PreferenceValue::Int(18)));
    assert_eq!(merged.get("weeklyDigest"), Some(&PreferenceValue::Bool(true)));
    assert!(!merged.contains_key("betaFeatures"));
    assert_eq!(merged.len(), defaults.len());
    assert_eq!(report.applied, 2);
    assert_eq!(report.ignored_unknown, vec!["betaFeatures".to_string()]);
    assert_eq!(report.ignored_mismatched, vec!["weeklyDigest".to_string()]);
}

#[test]
fn test_toml_snapshot_of_defaults_reloads_identically() {
    let defaults = studio_schema().defaults();

    let text = toml::to_string_pretty(&Snapshot::new(defaults.clone())).expect("serialize");
    let reloaded: Snapshot = toml::from_str(&text).expect("deserialize");

    assert_eq!(reloaded.values, defaults);
}

#[test]
fn test_generation_section_lists_controls_in_declaration_order() {
    let schema = studio_schema();

    let keys: Vec<&str> = schema
        .by_category(SettingCategory::Generation)
        .map(|d| d.key.as_str())
        .collect();

    assert_eq!(
        keys,
        vec!["defaultModel", "creativity", "imageQuality", "autoSaveDrafts"]
    );
}

#[test]
fn test_empty_set_merge_yields_defaults() {
    let defaults = studio_schema().defaults();

    let (merged, report) = defaults.merged_with(&PreferenceSet::new());

    assert_eq!(merged, defaults);
    assert_eq!(report.applied, 0);
    assert!(report.is_clean());
}
