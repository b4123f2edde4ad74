//! GUI-specific constants for layout, colors and intervals

use egui;

/// Settings dialog dimensions
pub const SETTINGS_WIDTH: f32 = 420.0;
pub const SETTINGS_HEIGHT: f32 = 620.0;
pub const SETTINGS_MIN_WIDTH: f32 = 360.0;
pub const SETTINGS_MIN_HEIGHT: f32 = 480.0;
pub const SETTINGS_TITLE: &str = "Settings";

/// Viewport id salt of the settings dialog
pub const SETTINGS_VIEWPORT: &str = "crosshair_settings";

/// Layout spacing
pub const SECTION_SPACING: f32 = 15.0;
pub const ITEM_SPACING: f32 = 8.0;
pub const LABEL_WIDTH: f32 = 130.0;

/// Message colors
pub const WARNING_COLOR: egui::Color32 = egui::Color32::from_rgb(200, 120, 0);
pub const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(200, 0, 0);

/// Opacity slider bounds in percent
pub const OPACITY_PERCENT_MIN: u32 = 10;
pub const OPACITY_PERCENT_MAX: u32 = 100;

/// How often the monitor layout is re-queried
pub const MONITOR_REFRESH_INTERVAL_MS: u64 = 2000;

/// File types offered by the image picker
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "ico"];
