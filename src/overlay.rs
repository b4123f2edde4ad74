//! Overlay state owned by the UI thread
//!
//! `OverlayController` holds the live `SettingsRecord`, the rendered bitmap,
//! visibility flags and the last computed position. Every mutation re-renders
//! and persists through the settings store.

use tracing::{debug, error, info};

use crate::commands::OverlayCommand;
use crate::config::{ProfileError, ProfileStore, SettingsRecord, SettingsStore};
use crate::constants::config;
use crate::crosshair::{self, CrosshairParams, RenderedBitmap};
use crate::positioning::{self, MonitorRect, NudgeDirection, PlacementInput};

pub struct OverlayController {
    store: SettingsStore,
    settings: SettingsRecord,
    bitmap: RenderedBitmap,
    /// Bumped on every re-render so the GUI knows to re-upload the texture
    bitmap_revision: u64,
    /// Toggled by F3 / tray
    visible: bool,
    /// Right button held with hide-on-right-click enabled
    temp_hidden: bool,
    /// Settings at the time the dialog opened, restored on cancel
    snapshot: Option<SettingsRecord>,
    /// Loaded once per settings-dialog session
    profiles: Option<ProfileStore>,
    position: (i32, i32),
    quit_requested: bool,
}

impl OverlayController {
    /// Load persisted settings and render the initial bitmap
    pub fn new(store: SettingsStore) -> Self {
        let settings = store.load();
        Self::with_settings(store, settings)
    }

    pub fn with_settings(store: SettingsStore, settings: SettingsRecord) -> Self {
        let mut controller = Self {
            store,
            settings,
            bitmap: RenderedBitmap::fallback(),
            bitmap_revision: 0,
            visible: true,
            temp_hidden: false,
            snapshot: None,
            profiles: None,
            position: (0, 0),
            quit_requested: false,
        };
        controller.rebuild();
        controller
    }

    pub fn settings(&self) -> &SettingsRecord {
        &self.settings
    }

    pub fn bitmap(&self) -> &RenderedBitmap {
        &self.bitmap
    }

    pub fn bitmap_revision(&self) -> u64 {
        self.bitmap_revision
    }

    pub fn position(&self) -> (i32, i32) {
        self.position
    }

    /// Whether the crosshair should be painted this frame
    pub fn is_drawn(&self) -> bool {
        self.visible && !self.temp_hidden
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn settings_open(&self) -> bool {
        self.snapshot.is_some()
    }

    pub fn handle_command(&mut self, command: OverlayCommand) {
        debug!(command = ?command, "Handling overlay command");
        match command {
            OverlayCommand::OpenSettings => {
                self.open_settings();
            }
            OverlayCommand::ToggleVisibility => self.toggle_visibility(),
            OverlayCommand::HideTemporarily => {
                if self.settings.hide_on_right_click && self.visible {
                    self.temp_hidden = true;
                }
            }
            OverlayCommand::ShowTemporarily => self.temp_hidden = false,
            OverlayCommand::Quit => {
                info!("Quit requested");
                self.quit_requested = true;
            }
        }
    }

    pub fn toggle_visibility(&mut self) {
        self.visible = !self.visible;
        self.temp_hidden = false;
        info!(visible = self.visible, "Toggled crosshair visibility");
    }

    /// Start a settings session; `false` when one is already open
    pub fn open_settings(&mut self) -> bool {
        if self.snapshot.is_some() {
            debug!("Settings dialog already open");
            return false;
        }
        self.snapshot = Some(self.settings.clone());
        self.profiles = Some(ProfileStore::open(self.store.dir(), &self.settings));
        info!("Opened settings");
        true
    }

    /// Keep the edited settings and close the session
    pub fn accept_settings(&mut self) {
        if self.snapshot.take().is_some() {
            self.profiles = None;
            self.persist();
            info!("Settings accepted");
        }
    }

    /// Restore the settings from when the dialog opened and close the session
    pub fn cancel_settings(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            self.profiles = None;
            self.settings = snapshot;
            self.rebuild();
            self.persist();
            info!("Settings edits reverted");
        }
    }

    /// Replace the live settings with an edited copy, re-render and save
    pub fn apply_live(&mut self, mut record: SettingsRecord) {
        record.validate_and_clamp();
        if record == self.settings {
            return;
        }
        let rerender = render_inputs_differ(&self.settings, &record);
        self.settings = record;
        if rerender {
            self.rebuild();
        }
        self.persist();
    }

    /// Move the offsets for live preview without saving
    pub fn preview_offset(&mut self, x: f64, y: f64) {
        self.settings.offset_x = x;
        self.settings.offset_y = y;
    }

    /// Set the offsets and save
    pub fn commit_offset(&mut self, x: f64, y: f64) {
        self.preview_offset(x, y);
        self.persist();
    }

    /// Shift the offsets by `step` in `direction` and save
    pub fn nudge_offset(&mut self, direction: NudgeDirection, step: f64) {
        let (x, y) = positioning::apply_nudge(
            (self.settings.offset_x, self.settings.offset_y),
            direction,
            step,
        );
        self.commit_offset(x, y);
    }

    /// Recompute the top-left corner from the current settings and bitmap
    pub fn reposition(&mut self, monitors: &[MonitorRect], cursor: (i32, i32)) -> (i32, i32) {
        self.position = positioning::compute_position(&PlacementInput {
            monitors,
            monitor_index: self.settings.monitor_index,
            follow_mouse: self.settings.follow_mouse,
            cursor,
            offset_x: self.settings.offset_x,
            offset_y: self.settings.offset_y,
            bitmap_width: self.bitmap.width() as i32,
            bitmap_height: self.bitmap.height() as i32,
        });
        self.position
    }

    /// Profiles of the open settings session
    pub fn profiles(&self) -> Option<&ProfileStore> {
        self.profiles.as_ref()
    }

    fn profiles_mut(&mut self) -> &mut ProfileStore {
        self.profiles
            .get_or_insert_with(|| ProfileStore::open(self.store.dir(), &self.settings))
    }

    /// Save the live settings as profile `name` and make it the active profile
    pub fn save_profile(&mut self, name: &str) -> Result<(), ProfileError> {
        let record = self.settings.clone();
        self.profiles_mut().create(name, &record)?;
        self.switch_profile(name.trim())
    }

    /// Delete profile `name`; the active profile falls back to "Default"
    pub fn delete_profile(&mut self, name: &str) -> Result<(), ProfileError> {
        self.profiles_mut().delete(name)?;
        self.switch_profile(config::DEFAULT_PROFILE)
    }

    /// Load profile `name` into the live settings
    pub fn switch_profile(&mut self, name: &str) -> Result<(), ProfileError> {
        let mut record = self.profiles_mut().switch(name)?;
        record.profile_name = name.to_string();
        info!(profile = %name, "Switched profile");
        self.apply_live(record);
        Ok(())
    }

    fn rebuild(&mut self) {
        let image_path = self.store.resolve_image_path(&self.settings);
        let params = CrosshairParams::from_settings(&self.settings, image_path.as_deref());
        self.bitmap = crosshair::build(&params);
        self.bitmap_revision += 1;
        debug!(revision = self.bitmap_revision, width = self.bitmap.width(), height = self.bitmap.height(), "Crosshair rebuilt");
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.settings) {
            error!(error = ?e, "Failed to save settings");
        }
    }
}

/// Whether switching from `old` to `new` changes the rendered bitmap
fn render_inputs_differ(old: &SettingsRecord, new: &SettingsRecord) -> bool {
    old.size != new.size
        || old.image_path != new.image_path
        || old.color != new.color
        || old.opacity != new.opacity
        || old.use_color_overlay != new.use_color_overlay
}
