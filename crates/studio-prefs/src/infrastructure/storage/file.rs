//! File-based snapshot persistence.
//!
//! Each namespace is stored as one file in a directory, by default the
//! platform-appropriate config directory:
//! - Windows:  `%APPDATA%\StudioPrefs\<namespace>.toml`
//! - Linux:    `~/.config/studio-prefs/<namespace>.toml`
//! - macOS:    `~/Library/Application Support/StudioPrefs/<namespace>.toml`
//!
//! # File format
//!
//! TOML by default, JSON on request.  Example:
//!
//! ```toml
//! version = 1
//!
//! [values]
//! animations = true
//! fontSize = 20
//! theme = "dark"
//! ```
//!
//! # Atomic writes
//!
//! A save never truncates the existing file in place.  The new snapshot is
//! written to a uniquely named temporary file in the same directory and then
//! renamed over the target, so a crash mid-write leaves either the old or the
//! new snapshot on disk, never a partial one.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use studio_core::{PreferenceValue, Snapshot};
use tracing::debug;
use uuid::Uuid;

use crate::application::snapshot_storage::{SnapshotStorage, StorageError};

/// On-disk encoding for snapshot files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SnapshotFormat {
    #[default]
    Toml,
    Json,
}

impl SnapshotFormat {
    /// File extension (without the dot).
    pub fn extension(self) -> &'static str {
        match self {
            SnapshotFormat::Toml => "toml",
            SnapshotFormat::Json => "json",
        }
    }

    /// Encodes `snapshot`.  Non-finite floats are rejected in every format:
    /// JSON would write them as `null`, which does not load back.
    fn encode(self, snapshot: &Snapshot) -> Result<String, StorageError> {
        if let Some((key, value)) = snapshot
            .values
            .iter()
            .find(|(_, v)| matches!(v, PreferenceValue::Float(x) if !x.is_finite()))
        {
            return Err(StorageError::Serialize(format!(
                "{key:?} holds the non-finite number {value}"
            )));
        }
        match self {
            SnapshotFormat::Toml => toml::to_string_pretty(snapshot)
                .map_err(|e| StorageError::Serialize(e.to_string())),
            SnapshotFormat::Json => serde_json::to_string_pretty(snapshot)
                .map_err(|e| StorageError::Serialize(e.to_string())),
        }
    }

    fn decode(self, content: &str) -> Result<Snapshot, StorageError> {
        match self {
            SnapshotFormat::Toml => {
                toml::from_str(content).map_err(|e| StorageError::Parse(e.to_string()))
            }
            SnapshotFormat::Json => {
                serde_json::from_str(content).map_err(|e| StorageError::Parse(e.to_string()))
            }
        }
    }
}

/// A [`SnapshotStorage`] that keeps one file per namespace in `dir`.
#[derive(Debug, Clone)]
pub struct FileSnapshotStorage {
    dir: PathBuf,
    format: SnapshotFormat,
}

impl FileSnapshotStorage {
    /// Stores snapshots in `dir` using `format`.  The directory is created on
    /// the first save.
    pub fn new(dir: impl Into<PathBuf>, format: SnapshotFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
        }
    }

    /// Stores snapshots in the platform config directory.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NoPlatformConfigDir`] when the platform config
    /// base directory cannot be determined from the environment.
    pub fn in_config_dir(format: SnapshotFormat) -> Result<Self, StorageError> {
        Ok(Self::new(config_dir()?, format))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn format(&self) -> SnapshotFormat {
        self.format
    }

    /// Resolves the file path for `namespace`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidNamespace`] if `namespace` is empty,
    /// starts with `.`, or contains anything other than ASCII letters, digits,
    /// `-`, `_` and `.`.
    pub fn path_for(&self, namespace: &str) -> Result<PathBuf, StorageError> {
        validate_namespace(namespace)?;
        Ok(self
            .dir
            .join(format!("{namespace}.{}", self.format.extension())))
    }
}

#[async_trait]
impl SnapshotStorage for FileSnapshotStorage {
    async fn load_snapshot(&self, namespace: &str) -> Result<Option<Snapshot>, StorageError> {
        let path = self.path_for(namespace)?;

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                let snapshot = self.format.decode(&content)?;
                debug!(path = %path.display(), "read preferences snapshot");
                Ok(Some(snapshot))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io { path, source }),
        }
    }

    async fn save_snapshot(&self, namespace: &str, snapshot: &Snapshot) -> Result<(), StorageError> {
        let path = self.path_for(namespace)?;
        let content = self.format.encode(snapshot)?;

        // Ensure directory exists before writing.
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| StorageError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let tmp = self.dir.join(format!(".{namespace}.{}.tmp", Uuid::new_v4()));
        if let Err(source) = tokio::fs::write(&tmp, content).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(StorageError::Io { path: tmp, source });
        }
        if let Err(source) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(StorageError::Io { path, source });
        }

        debug!(path = %path.display(), "wrote preferences snapshot");
        Ok(())
    }
}

fn validate_namespace(namespace: &str) -> Result<(), StorageError> {
    let valid = !namespace.is_empty()
        && !namespace.starts_with('.')
        && namespace
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidNamespace(namespace.to_string()))
    }
}

// ── Config directory ──────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for snapshot files.
///
/// # Errors
///
/// Returns [`StorageError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, StorageError> {
    platform_config_dir().ok_or(StorageError::NoPlatformConfigDir)
}

/// Resolves the platform config directory including the `StudioPrefs` subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        // %APPDATA% e.g. C:\Users\<user>\AppData\Roaming
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("StudioPrefs"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("studio-prefs"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("StudioPrefs")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use studio_core::PreferenceSet;

    /// Creates a unique, empty scratch directory under the system temp dir.
    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("studio_prefs_test_{}", Uuid::new_v4()))
    }

    fn sample_snapshot() -> Snapshot {
        let values: PreferenceSet = [
            ("theme", PreferenceValue::from("dark")),
            ("fontSize", PreferenceValue::Int(20)),
            ("creativity", PreferenceValue::Float(0.4)),
            ("animations", PreferenceValue::Bool(false)),
        ]
        .into_iter()
        .collect();
        Snapshot::new(values)
    }

    #[tokio::test]
    async fn test_load_returns_none_when_file_absent() {
        // Arrange
        let storage = FileSnapshotStorage::new(scratch_dir(), SnapshotFormat::Toml);

        // Act
        let result = storage.load_snapshot("studio-settings").await;

        // Assert
        assert!(result.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_toml_save_and_load_round_trip() {
        // Arrange
        let dir = scratch_dir();
        let storage = FileSnapshotStorage::new(&dir, SnapshotFormat::Toml);

        // Act
        storage
            .save_snapshot("studio-settings", &sample_snapshot())
            .await
            .expect("save");
        let loaded = storage.load_snapshot("studio-settings").await.expect("load");

        // Assert
        assert_eq!(loaded, Some(sample_snapshot()));
        let text = std::fs::read_to_string(dir.join("studio-settings.toml")).unwrap();
        assert!(text.contains("theme = \"dark\""), "unexpected TOML:\n{text}");

        // Cleanup
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_json_save_and_load_round_trip() {
        let dir = scratch_dir();
        let storage = FileSnapshotStorage::new(&dir, SnapshotFormat::Json);

        storage
            .save_snapshot("studio-settings", &sample_snapshot())
            .await
            .expect("save");
        let loaded = storage.load_snapshot("studio-settings").await.expect("load");

        assert_eq!(loaded, Some(sample_snapshot()));
        assert!(dir.join("studio-settings.json").exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_non_finite_float_is_rejected_and_previous_file_kept() {
        // Arrange
        let dir = scratch_dir();
        let storage = FileSnapshotStorage::new(&dir, SnapshotFormat::Json);
        storage
            .save_snapshot("studio-settings", &sample_snapshot())
            .await
            .expect("save");
        let before = std::fs::read_to_string(dir.join("studio-settings.json")).unwrap();
        let mut values = sample_snapshot().values;
        values.insert("creativity", f64::INFINITY);

        // Act
        let result = storage
            .save_snapshot("studio-settings", &Snapshot::new(values))
            .await;

        // Assert
        assert!(matches!(result, Err(StorageError::Serialize(ref m)) if m.contains("creativity")));
        let after = std::fs::read_to_string(dir.join("studio-settings.json")).unwrap();
        assert_eq!(before, after);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_encode_rejects_nan_in_toml_too() {
        let mut values = sample_snapshot().values;
        values.insert("creativity", f64::NAN);

        let result = SnapshotFormat::Toml.encode(&Snapshot::new(values));

        assert!(matches!(result, Err(StorageError::Serialize(_))));
    }

    #[tokio::test]
    async fn test_save_leaves_no_temporary_files() {
        let dir = scratch_dir();
        let storage = FileSnapshotStorage::new(&dir, SnapshotFormat::Toml);

        storage.save_snapshot("a", &sample_snapshot()).await.unwrap();
        storage.save_snapshot("a", &sample_snapshot()).await.unwrap();

        let names: Vec<String> = std::fs::read_dir(&dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.toml".to_string()]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_load_malformed_file_returns_parse_error() {
        // Arrange
        let dir = scratch_dir();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("broken.toml"), "[[[ not valid toml").unwrap();
        let storage = FileSnapshotStorage::new(&dir, SnapshotFormat::Toml);

        // Act
        let result = storage.load_snapshot("broken").await;

        // Assert
        assert!(matches!(result, Err(StorageError::Parse(_))));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_minimal_toml_uses_default_version() {
        let dir = scratch_dir();
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("minimal.toml"), "[values]\ntheme = \"light\"\n").unwrap();
        let storage = FileSnapshotStorage::new(&dir, SnapshotFormat::Toml);

        let snapshot = storage.load_snapshot("minimal").await.unwrap().unwrap();

        assert_eq!(snapshot.version, studio_core::SNAPSHOT_VERSION);
        assert_eq!(snapshot.values.get("theme"), Some(&PreferenceValue::from("light")));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_path_for_rejects_path_like_namespaces() {
        let storage = FileSnapshotStorage::new(scratch_dir(), SnapshotFormat::Toml);
        for bad in ["", "../escape", "a/b", ".hidden", "with space"] {
            assert!(
                matches!(storage.path_for(bad), Err(StorageError::InvalidNamespace(_))),
                "namespace {bad:?} must be rejected"
            );
        }
    }

    #[test]
    fn test_path_for_uses_format_extension() {
        let storage = FileSnapshotStorage::new("/prefs", SnapshotFormat::Json);
        assert_eq!(
            storage.path_for("studio-settings").unwrap(),
            PathBuf::from("/prefs/studio-settings.json")
        );
    }

    #[test]
    fn test_platform_config_dir_returns_some_on_this_platform() {
        // Only asserted when the relevant env var is available; stripped
        // containers may have none.
        let result = platform_config_dir();
        #[cfg(target_os = "windows")]
        if std::env::var_os("APPDATA").is_some() {
            assert!(result.is_some());
        }
        #[cfg(target_os = "linux")]
        {
            let has_xdg = std::env::var_os("XDG_CONFIG_HOME").is_some();
            let has_home = std::env::var_os("HOME").is_some();
            if has_xdg || has_home {
                assert!(result.is_some());
            }
        }
        #[cfg(target_os = "macos")]
        if std::env::var_os("HOME").is_some() {
            assert!(result.is_some());
        }
        let _ = result;
    }
}
