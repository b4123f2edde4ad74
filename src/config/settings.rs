//! Live settings record and its JSON store
//!
//! The schema only ever grows: every field carries a serde default so files
//! written by older versions load with the missing keys filled in.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::color::Rgb;
use crate::constants::{config, defaults, validation};

/// Full crosshair configuration. One live instance plus one per profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsRecord {
    /// Rendered bitmap edge length in pixels
    #[serde(default = "default_size", deserialize_with = "deserialize_count")]
    pub size: u32,

    /// Source image; empty forces the procedural plus-sign
    #[serde(rename = "crosshair", default = "default_image_path")]
    pub image_path: String,

    #[serde(rename = "x", default, deserialize_with = "deserialize_offset")]
    pub offset_x: f64,
    #[serde(rename = "y", default, deserialize_with = "deserialize_offset")]
    pub offset_y: f64,

    #[serde(default = "default_true")]
    pub hide_on_right_click: bool,

    #[serde(rename = "profile", default = "default_profile_name")]
    pub profile_name: String,

    /// `#RRGGBB`, kept as text and parsed at render time
    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_opacity")]
    pub opacity: f32,

    #[serde(default = "default_true")]
    pub use_color_overlay: bool,

    #[serde(default, deserialize_with = "deserialize_count")]
    pub monitor_index: u32,

    #[serde(default)]
    pub follow_mouse: bool,

    /// Position refresh period in milliseconds
    #[serde(
        rename = "timer_interval",
        default = "default_timer_interval",
        deserialize_with = "deserialize_count"
    )]
    pub timer_interval_ms: u32,

    /// Arrow-key increment used by the settings dialog in follow-mouse mode
    #[serde(default = "default_step")]
    pub step: f64,
}

fn default_size() -> u32 {
    defaults::SIZE
}

fn default_image_path() -> String {
    defaults::IMAGE_PATH.to_string()
}

fn default_true() -> bool {
    true
}

fn default_profile_name() -> String {
    config::DEFAULT_PROFILE.to_string()
}

fn default_color() -> String {
    defaults::COLOR.to_string()
}

fn default_opacity() -> f32 {
    defaults::OPACITY
}

fn default_timer_interval() -> u32 {
    defaults::TIMER_INTERVAL_MS
}

fn default_step() -> f64 {
    defaults::STEP
}

/// Numbers as they show up in hand-edited or older files
#[derive(Deserialize)]
#[serde(untagged)]
enum LenientNumber {
    Int(i64),
    Float(f64),
    Text(String),
    Null,
}

impl LenientNumber {
    fn as_f64(&self) -> f64 {
        match self {
            LenientNumber::Int(i) => *i as f64,
            LenientNumber::Float(f) => *f,
            LenientNumber::Text(s) => s.trim().parse().unwrap_or(0.0),
            LenientNumber::Null => 0.0,
        }
    }
}

/// Offsets accept integers, floats, numeric strings and `null` (read as 0)
fn deserialize_offset<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = LenientNumber::deserialize(deserializer)?.as_f64();
    Ok(if value.is_finite() { value } else { 0.0 })
}

/// Non-negative integers; negative values saturate to 0, fractions truncate
fn deserialize_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = LenientNumber::deserialize(deserializer)?.as_f64();
    if value.is_nan() || value <= 0.0 {
        Ok(0)
    } else {
        Ok(value.min(u32::MAX as f64) as u32)
    }
}

impl Default for SettingsRecord {
    fn default() -> Self {
        Self {
            size: default_size(),
            image_path: default_image_path(),
            offset_x: 0.0,
            offset_y: 0.0,
            hide_on_right_click: true,
            profile_name: default_profile_name(),
            color: default_color(),
            opacity: default_opacity(),
            use_color_overlay: true,
            monitor_index: 0,
            follow_mouse: false,
            timer_interval_ms: default_timer_interval(),
            step: default_step(),
        }
    }
}

impl SettingsRecord {
    /// Parsed tint color, red when the stored hex is unusable
    pub fn rgb(&self) -> Rgb {
        Rgb::parse(&self.color).unwrap_or_else(|| {
            error!(color = %self.color, "Invalid color hex, using red");
            Rgb::RED
        })
    }

    pub fn set_rgb(&mut self, rgb: Rgb) {
        self.color = rgb.to_hex_string();
    }

    /// Configured source image, `None` when the path is blank
    pub fn image_path(&self) -> Option<&Path> {
        let trimmed = self.image_path.trim();
        (!trimmed.is_empty()).then(|| Path::new(trimmed))
    }

    /// Build a record from parsed JSON one field at a time.
    ///
    /// A field with an unusable value takes its default and the rest of the
    /// object is kept. Anything other than an object gives all defaults.
    pub fn from_json_lenient(value: &Value) -> Self {
        let Some(fields) = value.as_object() else {
            warn!("Settings entry is not a JSON object, using defaults");
            return Self::default();
        };

        let mut accepted = Map::new();
        for (key, field) in fields {
            let mut candidate = accepted.clone();
            candidate.insert(key.clone(), field.clone());
            match serde_json::from_value::<SettingsRecord>(Value::Object(candidate.clone())) {
                Ok(_) => accepted = candidate,
                Err(e) => warn!(field = %key, error = %e, "Ignoring invalid settings field, using its default"),
            }
        }

        serde_json::from_value(Value::Object(accepted)).unwrap_or_default()
    }

    /// Clamp numeric fields into their accepted ranges
    pub fn validate_and_clamp(&mut self) {
        use validation::*;

        if self.size < MIN_SIZE {
            warn!(size = self.size, min = MIN_SIZE, "size below minimum, clamping");
            self.size = MIN_SIZE;
        } else if self.size > MAX_SIZE {
            warn!(size = self.size, max = MAX_SIZE, "size exceeds maximum, clamping");
            self.size = MAX_SIZE;
        }

        if self.opacity.is_nan() {
            warn!(using = defaults::OPACITY, "opacity is not a number, using default");
            self.opacity = defaults::OPACITY;
        } else if !(MIN_OPACITY..=MAX_OPACITY).contains(&self.opacity) {
            warn!(opacity = self.opacity, "opacity outside 0.0..=1.0, clamping");
            self.opacity = self.opacity.clamp(MIN_OPACITY, MAX_OPACITY);
        }

        if self.timer_interval_ms < MIN_TIMER_INTERVAL_MS {
            warn!(timer_interval = self.timer_interval_ms, min = MIN_TIMER_INTERVAL_MS, "timer_interval below minimum, clamping");
            self.timer_interval_ms = MIN_TIMER_INTERVAL_MS;
        } else if self.timer_interval_ms > MAX_TIMER_INTERVAL_MS {
            warn!(timer_interval = self.timer_interval_ms, max = MAX_TIMER_INTERVAL_MS, "timer_interval exceeds maximum, clamping");
            self.timer_interval_ms = MAX_TIMER_INTERVAL_MS;
        }

        if !self.step.is_finite() {
            warn!(using = defaults::STEP, "step is not a finite number, using default");
            self.step = defaults::STEP;
        } else if self.step < MIN_STEP {
            warn!(step = self.step, min = MIN_STEP, "step below minimum, clamping");
            self.step = MIN_STEP;
        } else if self.step > MAX_STEP {
            warn!(step = self.step, max = MAX_STEP, "step exceeds maximum, clamping");
            self.step = MAX_STEP;
        }

        if self.profile_name.trim().is_empty() {
            self.profile_name = default_profile_name();
        }
    }
}

/// Reads and writes the live `SettingsRecord`
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `settings.json` inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(config::SETTINGS_FILENAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the settings file; relative image paths resolve here
    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }

    /// Load the persisted record, default-filling anything missing.
    ///
    /// Never fails: an absent file gives all defaults, a malformed one is
    /// logged and left untouched on disk until the next save.
    pub fn load(&self) -> SettingsRecord {
        match self.try_load() {
            Ok(Some(mut record)) => {
                record.validate_and_clamp();
                info!(path = %self.path.display(), profile = %record.profile_name, "Loaded settings");
                record
            }
            Ok(None) => {
                info!(path = %self.path.display(), "Settings file not found, using defaults");
                SettingsRecord::default()
            }
            Err(e) => {
                error!(path = %self.path.display(), error = ?e, "Failed to load settings, using defaults");
                SettingsRecord::default()
            }
        }
    }

    fn try_load(&self) -> Result<Option<SettingsRecord>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read settings from {:?}", self.path));
            }
        };

        let value: Value = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings JSON from {:?}", self.path))?;
        Ok(Some(SettingsRecord::from_json_lenient(&value)))
    }

    /// Overwrite the settings file with the full record
    pub fn save(&self, record: &SettingsRecord) -> Result<()> {
        super::write_json_atomic(&self.path, record)
            .with_context(|| format!("Failed to save settings to {:?}", self.path))?;
        debug!(path = %self.path.display(), "Saved settings");
        Ok(())
    }

    /// Source image for `record`, resolved against the config directory
    pub fn resolve_image_path(&self, record: &SettingsRecord) -> Option<PathBuf> {
        record.image_path().map(|p| self.dir().join(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn store_with(contents: &str) -> (TempDir, SettingsStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::in_dir(dir.path());
        fs::write(store.path(), contents).unwrap();
        (dir, store)
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::in_dir(dir.path());
        assert_eq!(store.load(), SettingsRecord::default());
    }

    #[test]
    fn test_load_old_file_fills_missing_fields() {
        // Written before color/opacity/monitor/follow/timer/step existed
        let (_dir, store) = store_with(
            r#"{ "size": 64, "crosshair": "dot.png", "x": 3, "y": -2.5, "hide_on_right_click": false }"#,
        );

        let record = store.load();
        assert_eq!(record.size, 64);
        assert_eq!(record.image_path, "dot.png");
        assert_eq!(record.offset_x, 3.0);
        assert_eq!(record.offset_y, -2.5);
        assert!(!record.hide_on_right_click);

        assert_eq!(record.profile_name, "Default");
        assert_eq!(record.color, "#FF0000");
        assert_eq!(record.opacity, 1.0);
        assert!(record.use_color_overlay);
        assert_eq!(record.monitor_index, 0);
        assert!(!record.follow_mouse);
        assert_eq!(record.timer_interval_ms, 10);
        assert_eq!(record.step, 0.1);
    }

    #[test]
    fn test_each_missing_field_defaults_and_others_survive() {
        let full = json!({
            "size": 120,
            "crosshair": "/tmp/c.png",
            "x": 1.5,
            "y": 2.25,
            "hide_on_right_click": false,
            "profile": "Sniper",
            "color": "#00FF00",
            "opacity": 0.5,
            "use_color_overlay": false,
            "monitor_index": 1,
            "follow_mouse": true,
            "timer_interval": 20,
            "step": 0.5
        });
        let full_record: SettingsRecord = serde_json::from_value(full.clone()).unwrap();
        let defaults = serde_json::to_value(SettingsRecord::default()).unwrap();

        for key in full.as_object().unwrap().keys() {
            let mut partial = full.clone();
            partial.as_object_mut().unwrap().remove(key);
            let (_dir, store) = store_with(&partial.to_string());

            let loaded = serde_json::to_value(store.load()).unwrap();
            let expected_full = serde_json::to_value(&full_record).unwrap();
            for (k, v) in loaded.as_object().unwrap() {
                if k == key {
                    assert_eq!(v, &defaults[k], "missing {key} should take its default");
                } else {
                    assert_eq!(v, &expected_full[k], "{k} should survive when {key} is missing");
                }
            }
        }
    }

    #[test]
    fn test_null_offsets_read_as_zero() {
        let (_dir, store) = store_with(r#"{ "x": null, "y": "4" }"#);
        let record = store.load();
        assert_eq!(record.offset_x, 0.0);
        assert_eq!(record.offset_y, 4.0);
    }

    #[test]
    fn test_wrongly_typed_fields_default_and_others_survive() {
        let (_dir, store) = store_with(
            r#"{ "size": 64, "x": 12, "follow_mouse": true, "opacity": null, "step": null, "hide_on_right_click": 1 }"#,
        );
        let record = store.load();
        assert_eq!(record.size, 64);
        assert_eq!(record.offset_x, 12.0);
        assert!(record.follow_mouse);
        assert_eq!(record.opacity, 1.0);
        assert_eq!(record.step, 0.1);
        assert!(record.hide_on_right_click);
    }

    #[test]
    fn test_non_object_file_gives_defaults() {
        let (_dir, store) = store_with("[1, 2, 3]");
        assert_eq!(store.load(), SettingsRecord::default());
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let (_dir, store) = store_with(
            r#"{ "size": 5000, "opacity": 3.0, "timer_interval": 0, "step": 0.0, "monitor_index": -3 }"#,
        );
        let record = store.load();
        assert_eq!(record.size, 400);
        assert_eq!(record.opacity, 1.0);
        assert_eq!(record.timer_interval_ms, 1);
        assert_eq!(record.step, 0.1);
        assert_eq!(record.monitor_index, 0);
    }

    #[test]
    fn test_malformed_file_gives_defaults_and_is_kept() {
        let (_dir, store) = store_with("{ not json");
        assert_eq!(store.load(), SettingsRecord::default());
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "{ not json");
    }

    #[test]
    fn test_save_then_load_preserves_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::in_dir(&dir.path().join("nested"));
        let record = SettingsRecord {
            size: 77,
            offset_x: -12.34,
            follow_mouse: true,
            color: "#123456".to_string(),
            ..SettingsRecord::default()
        };

        store.save(&record).unwrap();
        assert_eq!(store.load(), record);
    }

    #[test]
    fn test_repeated_saves_leave_complete_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::in_dir(dir.path());
        let mut record = SettingsRecord::default();
        for i in 0..50 {
            record.offset_x = i as f64 * 0.01;
            store.save(&record).unwrap();
        }
        assert_eq!(store.load(), record);
        assert!(!dir.path().join("settings.json.tmp").exists());
    }

    #[test]
    fn test_saved_keys_match_file_format() {
        let value = serde_json::to_value(SettingsRecord::default()).unwrap();
        let mut keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            [
                "color", "crosshair", "follow_mouse", "hide_on_right_click", "monitor_index",
                "opacity", "profile", "size", "step", "timer_interval", "use_color_overlay", "x", "y",
            ]
        );
    }

    #[test]
    fn test_blank_image_path_means_none() {
        let record = SettingsRecord { image_path: "  ".to_string(), ..SettingsRecord::default() };
        assert_eq!(record.image_path(), None);
    }

    #[test]
    fn test_relative_image_path_resolves_against_config_dir() {
        let store = SettingsStore::new("/home/u/.config/crosshair-overlay/settings.json");
        let record = SettingsRecord::default();
        assert_eq!(
            store.resolve_image_path(&record),
            Some(PathBuf::from("/home/u/.config/crosshair-overlay/crosshair.png"))
        );

        let absolute = SettingsRecord { image_path: "/opt/x.png".to_string(), ..record };
        assert_eq!(store.resolve_image_path(&absolute), Some(PathBuf::from("/opt/x.png")));
    }

    #[test]
    fn test_invalid_color_renders_red() {
        let record = SettingsRecord { color: "nope".to_string(), ..SettingsRecord::default() };
        assert_eq!(record.rgb(), Rgb::RED);
    }
}
