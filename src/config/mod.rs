//! Configuration management for the crosshair overlay
//!
//! Two JSON files live side by side in the config directory:
//! - **settings**: the live `SettingsRecord`, rewritten after every edit
//! - **profile**: named snapshots of that record, managed from the settings dialog

pub mod profile;
pub mod settings;

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub use profile::{ProfileError, ProfileStore, Profiles};
pub use settings::{SettingsRecord, SettingsStore};

/// `$XDG_CONFIG_HOME/crosshair-overlay`, or `./crosshair-overlay` without a config dir
pub fn default_config_dir() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(crate::constants::config::APP_DIR);
    path
}

/// Serialize `value` as pretty JSON and replace `path` with it.
///
/// Writes to a sibling temp file first and renames it over the target, so a
/// reader never observes a half-written file even when saves happen many
/// times per second.
pub(crate) fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {:?}", parent))?;
    }

    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {:?} to JSON", path))?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, json).with_context(|| format!("Failed to write {:?}", tmp))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("Failed to move {:?} into place at {:?}", tmp, path))?;
    Ok(())
}
