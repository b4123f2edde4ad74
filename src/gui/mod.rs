//! Overlay window and settings dialog on eframe/egui

mod app;
mod components;
mod constants;
mod settings_dialog;

pub use app::{OverlayOptions, run_overlay};
