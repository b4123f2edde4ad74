//! Application-wide constants
//!
//! This module contains all magic numbers and string literals used throughout
//! the application, providing a single source of truth for constant values.

/// Config file locations
pub mod config {
    /// Directory under the user's config dir
    pub const APP_DIR: &str = "crosshair-overlay";

    /// Live settings record
    pub const SETTINGS_FILENAME: &str = "settings.json";

    /// Named profile snapshots
    pub const PROFILES_FILENAME: &str = "profiles.json";

    /// Profile that always exists and cannot be deleted
    pub const DEFAULT_PROFILE: &str = "Default";
}

/// Default values for every settings field
pub mod defaults {
    pub const SIZE: u32 = 40;
    pub const IMAGE_PATH: &str = "crosshair.png";
    pub const COLOR: &str = "#FF0000";
    pub const OPACITY: f32 = 1.0;
    pub const TIMER_INTERVAL_MS: u32 = 10;
    pub const STEP: f64 = 0.1;
}

/// Accepted ranges, enforced after load
pub mod validation {
    pub const MIN_SIZE: u32 = 10;
    pub const MAX_SIZE: u32 = 400;

    pub const MIN_OPACITY: f32 = 0.0;
    pub const MAX_OPACITY: f32 = 1.0;

    pub const MIN_TIMER_INTERVAL_MS: u32 = 1;
    pub const MAX_TIMER_INTERVAL_MS: u32 = 100;

    pub const MIN_STEP: f64 = 0.1;
    pub const MAX_STEP: f64 = 10.0;
}

/// Crosshair rendering constants
pub mod render {
    /// Stroke width of the procedural plus-sign
    pub const LINE_THICKNESS: u32 = 2;

    /// Edge length of the last-resort bitmap
    pub const FALLBACK_SIZE: u32 = 40;

    /// Color of the last-resort bitmap (opaque red)
    pub const FALLBACK_RGB: [u8; 3] = [0xFF, 0x00, 0x00];
}

/// Overlay placement constants
pub mod positioning {
    /// Substituted when the rendered bitmap reports a non-positive size
    pub const DEGENERATE_BITMAP_SIZE: i32 = 40;

    /// Display size assumed when no monitor can be enumerated
    pub const FALLBACK_MONITOR_WIDTH: u32 = 1920;
    pub const FALLBACK_MONITOR_HEIGHT: u32 = 1080;
}

/// Offset nudge steps for the position dialog
pub mod nudge {
    pub const BASE_STEP: f64 = 0.01;
    pub const SHIFT_STEP: f64 = 0.1;
    pub const CTRL_STEP: f64 = 1.0;
}

/// Input event constants (from evdev)
pub mod input {
    /// Key press event value
    pub const KEY_PRESS: i32 = 1;

    /// Key release event value
    pub const KEY_RELEASE: i32 = 0;

    /// Capacity of the listener -> UI command channel
    pub const COMMAND_QUEUE_CAPACITY: usize = 64;
}

/// Filesystem paths
pub mod paths {
    /// evdev device nodes
    pub const DEV_INPUT: &str = "/dev/input";
}

/// Permission hints shown when input devices are unreadable
pub mod permissions {
    pub const INPUT_GROUP: &str = "input";
    pub const ADD_TO_INPUT_GROUP: &str = "sudo usermod -aG input $USER";
}

/// Tray icon constants
pub mod tray {
    pub const ID: &str = "crosshair-overlay";
    pub const TITLE: &str = "Crosshair Overlay";
    pub const ICON_NAME: &str = "crosshairs";
}
