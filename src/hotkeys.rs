use anyhow::{Context, Result};
use evdev::{Device, EventSummary, KeyCode};
use std::thread;
use tracing::{debug, error, info, warn};

use crate::commands::{CommandSender, OverlayCommand};
use crate::constants::{input, paths, permissions};

/// F2 opens settings, F3 toggles the crosshair
const SETTINGS_KEY: KeyCode = KeyCode::KEY_F2;
const TOGGLE_KEY: KeyCode = KeyCode::KEY_F3;

/// Map one key/button event to the command it triggers
fn command_for(key: KeyCode, value: i32) -> Option<OverlayCommand> {
    match (key, value) {
        (SETTINGS_KEY, input::KEY_PRESS) => Some(OverlayCommand::OpenSettings),
        (TOGGLE_KEY, input::KEY_PRESS) => Some(OverlayCommand::ToggleVisibility),
        (KeyCode::BTN_RIGHT, input::KEY_PRESS) => Some(OverlayCommand::HideTemporarily),
        (KeyCode::BTN_RIGHT, input::KEY_RELEASE) => Some(OverlayCommand::ShowTemporarily),
        _ => None,
    }
}

/// Find keyboards (F2) and mice (right button)
fn find_input_devices() -> Result<Vec<Device>> {
    info!(path = %paths::DEV_INPUT, "Scanning for keyboard and mouse devices...");

    let mut devices = Vec::new();

    for entry in std::fs::read_dir(paths::DEV_INPUT)
        .context(format!("Failed to read {} - are you in the '{}' group?", paths::DEV_INPUT, permissions::INPUT_GROUP))?
    {
        let path = entry?.path();

        let Ok(device) = Device::open(&path) else {
            continue;
        };
        let Some(keys) = device.supported_keys() else {
            continue;
        };

        let keyboard = keys.contains(SETTINGS_KEY) || keys.contains(TOGGLE_KEY);
        let mouse = keys.contains(KeyCode::BTN_RIGHT);
        if keyboard || mouse {
            info!(device_path = %path.display(), name = ?device.name(), keyboard, mouse, "Found input device");
            devices.push(device);
        }
    }

    if devices.is_empty() {
        anyhow::bail!(
            "No keyboard or mouse device found. Ensure you're in '{}' group:\n\
             {}\n\
             Then log out and back in.",
            permissions::INPUT_GROUP,
            permissions::ADD_TO_INPUT_GROUP
        )
    }

    info!(count = devices.len(), "Listening on input device(s)");

    Ok(devices)
}

/// Spawn one detached listener thread per keyboard/mouse device
pub fn spawn_listener(sender: CommandSender) -> Result<Vec<thread::JoinHandle<()>>> {
    let devices = find_input_devices()?;
    let mut handles = Vec::new();

    for device in devices {
        let sender = sender.clone();
        let handle = thread::Builder::new()
            .name("input-listener".to_string())
            .spawn(move || {
                info!(device = ?device.name(), "Input listener started");
                if let Err(e) = listen_for_input(device, sender) {
                    error!(error = %e, "Input listener error");
                }
            })
            .context("Failed to spawn input listener thread")?;
        handles.push(handle);
    }

    Ok(handles)
}

/// Forward hotkey and right-button events from a single device
fn listen_for_input(mut device: Device, sender: CommandSender) -> Result<()> {
    loop {
        // Blocks until events are available
        let events = device.fetch_events().context("Failed to fetch events")?;

        for event in events {
            let EventSummary::Key(_, key, value) = event.destructure() else {
                continue;
            };
            debug!(key = ?key, value, "Key event");

            if let Some(command) = command_for(key, value) {
                info!(key = ?key, command = ?command, "Input event, sending command");
                sender.send(command);
            }
        }
    }
}

/// Check if hotkeys are available (user has input group permissions)
pub fn check_permissions() -> bool {
    std::fs::read_dir(paths::DEV_INPUT).is_ok()
}

/// Print helpful error message if permissions missing
pub fn print_permission_error() {
    error!(path = %paths::DEV_INPUT, "Cannot access input devices");
    error!(group = %permissions::INPUT_GROUP, "Hotkeys and right-click hiding require group membership");
    error!(command = %permissions::ADD_TO_INPUT_GROUP, "Add user to input group");
    error!("  Then log out and back in");
    warn!(continuing = true, "Continuing without hotkey support...");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_keys_fire_on_press_only() {
        assert_eq!(command_for(KeyCode::KEY_F2, input::KEY_PRESS), Some(OverlayCommand::OpenSettings));
        assert_eq!(command_for(KeyCode::KEY_F3, input::KEY_PRESS), Some(OverlayCommand::ToggleVisibility));
        assert_eq!(command_for(KeyCode::KEY_F2, input::KEY_RELEASE), None);
        // Autorepeat
        assert_eq!(command_for(KeyCode::KEY_F3, 2), None);
    }

    #[test]
    fn test_right_button_press_and_release() {
        assert_eq!(command_for(KeyCode::BTN_RIGHT, input::KEY_PRESS), Some(OverlayCommand::HideTemporarily));
        assert_eq!(command_for(KeyCode::BTN_RIGHT, input::KEY_RELEASE), Some(OverlayCommand::ShowTemporarily));
    }

    #[test]
    fn test_other_keys_ignored() {
        assert_eq!(command_for(KeyCode::BTN_LEFT, input::KEY_PRESS), None);
        assert_eq!(command_for(KeyCode::KEY_TAB, input::KEY_PRESS), None);
    }
}
