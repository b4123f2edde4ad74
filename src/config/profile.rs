//! Named profiles: full `SettingsRecord` snapshots keyed by name
//!
//! The "Default" profile is always present and cannot be deleted.

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use super::settings::SettingsRecord;
use crate::constants::config;

/// Profile name -> settings snapshot, sorted by name
pub type Profiles = BTreeMap<String, SettingsRecord>;

/// User-facing rejections from profile operations
#[derive(Debug)]
pub enum ProfileError {
    /// "Default" cannot be deleted
    DefaultProtected,
    /// No profile with this name
    NotFound(String),
    /// Blank profile names are not allowed
    EmptyName,
    /// Writing profiles.json failed
    Io(anyhow::Error),
}

impl fmt::Display for ProfileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileError::DefaultProtected => {
                write!(f, "{} profile cannot be deleted.", config::DEFAULT_PROFILE)
            }
            ProfileError::NotFound(name) => write!(f, "Profile '{name}' does not exist."),
            ProfileError::EmptyName => write!(f, "Profile name cannot be empty."),
            ProfileError::Io(e) => write!(f, "Failed to save profiles: {e:#}"),
        }
    }
}

impl std::error::Error for ProfileError {}

/// Profile set loaded from and written back to `profiles.json`
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
    profiles: Profiles,
}

impl ProfileStore {
    /// Load `profiles.json` from `dir`, seeding "Default" from `current` when needed
    pub fn open(dir: &Path, current: &SettingsRecord) -> Self {
        let path = dir.join(config::PROFILES_FILENAME);
        let profiles = Self::load_all(&path, current);
        Self { path, profiles }
    }

    /// Read the persisted profile set.
    ///
    /// Without a file this is `{"Default": current}`. A set that lost its
    /// "Default" entry gets it back from `current`. Each entry is
    /// default-filled on its own, so a bad field never drops a profile.
    pub fn load_all(path: &Path, current: &SettingsRecord) -> Profiles {
        let mut profiles = match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<BTreeMap<String, Value>>(&contents) {
                Ok(entries) => {
                    info!(path = %path.display(), count = entries.len(), "Loaded profiles");
                    entries
                        .into_iter()
                        .map(|(name, entry)| {
                            let record = SettingsRecord::from_json_lenient(&entry);
                            (name, record)
                        })
                        .collect()
                }
                Err(e) => {
                    error!(path = %path.display(), error = %e, "Failed to parse profiles, starting from Default only");
                    Profiles::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Profiles::new(),
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to read profiles, starting from Default only");
                Profiles::new()
            }
        };

        for (name, record) in profiles.iter_mut() {
            record.validate_and_clamp();
            record.profile_name = name.clone();
        }

        profiles
            .entry(config::DEFAULT_PROFILE.to_string())
            .or_insert_with(|| SettingsRecord {
                profile_name: config::DEFAULT_PROFILE.to_string(),
                ..current.clone()
            });
        profiles
    }

    /// Replace the persisted profile set with `profiles`
    pub fn save_all(path: &Path, profiles: &Profiles) -> Result<()> {
        super::write_json_atomic(path, profiles)
            .with_context(|| format!("Failed to save profiles to {:?}", path))?;
        info!(path = %path.display(), count = profiles.len(), "Saved profiles");
        Ok(())
    }

    pub fn profiles(&self) -> &Profiles {
        &self.profiles
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(name)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert or overwrite `name` with `record`, then persist
    pub fn create(&mut self, name: &str, record: &SettingsRecord) -> Result<(), ProfileError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProfileError::EmptyName);
        }

        let snapshot = SettingsRecord {
            profile_name: name.to_string(),
            ..record.clone()
        };
        let mut updated = self.profiles.clone();
        let replaced = updated.insert(name.to_string(), snapshot).is_some();
        self.commit(updated)?;
        info!(profile = %name, replaced, "Saved profile");
        Ok(())
    }

    /// Remove `name` and persist. "Default" is refused and nothing changes.
    pub fn delete(&mut self, name: &str) -> Result<(), ProfileError> {
        if name == config::DEFAULT_PROFILE {
            warn!(profile = %name, "Refusing to delete the Default profile");
            return Err(ProfileError::DefaultProtected);
        }
        let mut updated = self.profiles.clone();
        if updated.remove(name).is_none() {
            return Err(ProfileError::NotFound(name.to_string()));
        }
        self.commit(updated)?;
        info!(profile = %name, "Deleted profile");
        Ok(())
    }

    /// Stored record for `name`, for the caller to merge into the live settings
    pub fn switch(&self, name: &str) -> Result<SettingsRecord, ProfileError> {
        self.profiles
            .get(name)
            .cloned()
            .ok_or_else(|| ProfileError::NotFound(name.to_string()))
    }

    /// Write `updated` and adopt it only once it is on disk
    fn commit(&mut self, updated: Profiles) -> Result<(), ProfileError> {
        Self::save_all(&self.path, &updated).map_err(ProfileError::Io)?;
        self.profiles = updated;
        Ok(())
    }
}
