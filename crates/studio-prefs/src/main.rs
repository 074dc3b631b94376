//! Studio preferences CLI: inspect and edit the persisted settings snapshot.
//!
//! # Usage
//!
//! ```text
//! studio-prefs [OPTIONS] <COMMAND>
//!
//! Commands:
//!   list                    Print every setting with its current value
//!   get <KEY>               Print one value
//!   set <KEY=VALUE>...      Validate, apply and save one or more edits
//!   defaults                Restore every setting to its default and save
//!   export                  Print the current values as JSON
//!
//! Options:
//!   --dir <DIR>             Snapshot directory [default: platform config dir]
//!   --namespace <NAME>      Snapshot namespace [default: studio-settings]
//!   --format <FORMAT>       toml | json [default: toml]
//!   --force                 Allow `set`/`defaults` to overwrite an unreadable snapshot
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable                 | Description                     |
//! |--------------------------|---------------------------------|
//! | `STUDIO_PREFS_DIR`       | Snapshot directory              |
//! | `STUDIO_PREFS_NAMESPACE` | Snapshot namespace              |
//! | `STUDIO_PREFS_FORMAT`    | Snapshot encoding               |
//! | `RUST_LOG`               | Log filter (default `info`)     |
//!
//! Logs go to stderr so that `get` and `export` output can be piped.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use studio_core::{studio_schema, PreferenceValue, SettingsSchema};
use studio_prefs::infrastructure::storage::file::{FileSnapshotStorage, SnapshotFormat};
use studio_prefs::{PreferencesStore, SnapshotStorage, StoreOrigin};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Inspect and edit Studio preferences.
#[derive(Debug, Parser)]
#[command(
    name = "studio-prefs",
    about = "Inspect and edit persisted Studio preferences",
    version
)]
struct Cli {
    /// Directory holding the snapshot files.
    ///
    /// Defaults to the platform config directory (for example
    /// `~/.config/studio-prefs` on Linux).
    #[arg(long, env = "STUDIO_PREFS_DIR")]
    dir: Option<PathBuf>,

    /// Namespace the snapshot is stored under.
    #[arg(long, default_value = "studio-settings", env = "STUDIO_PREFS_NAMESPACE")]
    namespace: String,

    /// Snapshot encoding.
    #[arg(long, value_enum, default_value_t = Format::Toml, env = "STUDIO_PREFS_FORMAT")]
    format: Format,

    /// Let `set` and `defaults` overwrite a snapshot that could not be read.
    #[arg(long)]
    force: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Toml,
    Json,
}

impl From<Format> for SnapshotFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Toml => SnapshotFormat::Toml,
            Format::Json => SnapshotFormat::Json,
        }
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print every setting, grouped by settings page section.
    List,
    /// Print the current value of one setting.
    Get { key: String },
    /// Validate and apply `KEY=VALUE` edits, then save.
    Set {
        #[arg(required = true, value_name = "KEY=VALUE")]
        assignments: Vec<String>,
    },
    /// Restore every setting to its default, then save.
    Defaults,
    /// Print the current values as a JSON object.
    Export,
}

impl Cli {
    fn storage(&self) -> anyhow::Result<FileSnapshotStorage> {
        let format = SnapshotFormat::from(self.format);
        match &self.dir {
            Some(dir) => Ok(FileSnapshotStorage::new(dir, format)),
            None => FileSnapshotStorage::in_config_dir(format)
                .context("no --dir given and no platform config directory found"),
        }
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn print_list(store: &PreferencesStore, schema: &SettingsSchema) -> anyhow::Result<()> {
    let values = store.values();
    for category in studio_core::SettingCategory::ALL {
        let mut descriptors = schema.by_category(category).peekable();
        if descriptors.peek().is_none() {
            continue;
        }
        println!("[{category}]");
        for descriptor in descriptors {
            let value = values
                .get(&descriptor.key)
                .with_context(|| format!("no value for {:?}", descriptor.key))?;
            println!(
                "  {:<20} = {:<10} # {} ({})",
                descriptor.key,
                value,
                descriptor.label,
                descriptor.control.name()
            );
        }
    }
    Ok(())
}

/// Splits `KEY=VALUE` and parses the value against the key's descriptor.
fn parse_assignment(
    schema: &SettingsSchema,
    assignment: &str,
) -> anyhow::Result<(String, PreferenceValue)> {
    let Some((key, raw)) = assignment.split_once('=') else {
        bail!("expected KEY=VALUE, got {assignment:?}");
    };
    let key = key.trim();
    let value = schema.parse_value(key, raw.trim())?;
    Ok((key.to_string(), value))
}

/// Refuses to overwrite a snapshot this build failed to read unless forced.
fn ensure_writable(origin: StoreOrigin, force: bool) -> anyhow::Result<()> {
    if origin == StoreOrigin::DefaultsAfterLoadError && !force {
        bail!(
            "the existing snapshot could not be read; refusing to overwrite it \
             (fix or remove the file, or pass --force)"
        );
    }
    Ok(())
}

async fn save(store: &PreferencesStore) -> anyhow::Result<()> {
    store
        .save()
        .await
        .with_context(|| format!("could not save namespace {:?}", store.namespace()))
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries command output.  Level is overridden
    // by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let storage = cli.storage()?;
    info!(
        dir = %storage.dir().display(),
        namespace = %cli.namespace,
        "opening preferences"
    );

    let schema = studio_schema();
    let store = PreferencesStore::open(
        Arc::new(storage) as Arc<dyn SnapshotStorage>,
        cli.namespace.clone(),
        schema.defaults(),
    )
    .await;
    if store.origin() == StoreOrigin::DefaultsAfterLoadError {
        warn!("existing snapshot could not be read; showing defaults");
    }

    match cli.command {
        Command::List => print_list(&store, &schema)?,
        Command::Get { key } => {
            let value = store.get_value(&key)?;
            println!("{value}");
        }
        Command::Set { assignments } => {
            ensure_writable(store.origin(), cli.force)?;
            // Parse everything first so one bad pair leaves the snapshot untouched.
            let edits = assignments
                .iter()
                .map(|a| parse_assignment(&schema, a))
                .collect::<anyhow::Result<Vec<_>>>()?;
            for (key, value) in edits {
                store.set_value(&key, value)?;
            }
            save(&store).await?;
        }
        Command::Defaults => {
            ensure_writable(store.origin(), cli.force)?;
            store.restore_defaults();
            save(&store).await?;
        }
        Command::Export => {
            let json = serde_json::to_string_pretty(&store.values())
                .context("could not encode preferences as JSON")?;
            println!("{json}");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_set_with_multiple_assignments() {
        let cli = Cli::try_parse_from([
            "studio-prefs",
            "--dir",
            "/tmp/prefs",
            "--format",
            "json",
            "set",
            "theme=dark",
            "fontSize=18",
        ])
        .unwrap();

        assert_eq!(cli.format, Format::Json);
        assert_eq!(cli.dir, Some(PathBuf::from("/tmp/prefs")));
        match cli.command {
            Command::Set { assignments } => assert_eq!(assignments, ["theme=dark", "fontSize=18"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_rejects_set_without_assignments() {
        assert!(Cli::try_parse_from(["studio-prefs", "set"]).is_err());
    }

    #[test]
    fn test_ensure_writable_refuses_after_load_error() {
        assert!(ensure_writable(StoreOrigin::DefaultsAfterLoadError, false).is_err());
        assert!(ensure_writable(StoreOrigin::DefaultsAfterLoadError, true).is_ok());
        assert!(ensure_writable(StoreOrigin::Snapshot, false).is_ok());
        assert!(ensure_writable(StoreOrigin::Defaults, false).is_ok());
    }

    #[test]
    fn test_cli_parses_force_flag() {
        let cli = Cli::try_parse_from(["studio-prefs", "--force", "defaults"]).unwrap();
        assert!(cli.force);
    }

    #[test]
    fn test_parse_assignment_uses_descriptor() {
        let schema = studio_schema();

        let (key, value) = parse_assignment(&schema, "animations = off").unwrap();

        assert_eq!(key, "animations");
        assert_eq!(value, PreferenceValue::Bool(false));
    }

    #[test]
    fn test_parse_assignment_rejects_missing_equals() {
        let schema = studio_schema();
        assert!(parse_assignment(&schema, "theme").is_err());
    }

    #[test]
    fn test_parse_assignment_rejects_invalid_value() {
        let schema = studio_schema();
        assert!(parse_assignment(&schema, "fontSize=200").is_err());
    }
}
