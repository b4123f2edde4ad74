pub mod crosshair_settings;
pub mod offset_dialog;
pub mod profile_selector;

pub use offset_dialog::{OffsetAction, OffsetDialog, pressed_arrows};
pub use profile_selector::{ProfileAction, ProfileSelector};
