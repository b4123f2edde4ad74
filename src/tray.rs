//! System tray icon via D-Bus StatusNotifier

use anyhow::{Context, Result};
use ksni::menu::StandardItem;
use ksni::{MenuItem, ToolTip, TrayMethods};
use std::thread;
use tracing::{error, info};

use crate::commands::{CommandSender, OverlayCommand};
use crate::constants::tray;

struct CrosshairTray {
    sender: CommandSender,
}

impl CrosshairTray {
    fn item(label: &str, command: OverlayCommand) -> MenuItem<Self> {
        StandardItem {
            label: label.into(),
            activate: Box::new(move |this: &mut Self| {
                info!(command = ?command, "Tray menu activated");
                this.sender.send(command);
            }),
            ..Default::default()
        }
        .into()
    }
}

impl ksni::Tray for CrosshairTray {
    fn id(&self) -> String {
        tray::ID.into()
    }

    fn title(&self) -> String {
        tray::TITLE.into()
    }

    fn icon_name(&self) -> String {
        tray::ICON_NAME.into()
    }

    fn category(&self) -> ksni::Category {
        ksni::Category::ApplicationStatus
    }

    fn tool_tip(&self) -> ToolTip {
        ToolTip {
            title: tray::TITLE.into(),
            description: "F2: settings, F3: show/hide".into(),
            icon_name: tray::ICON_NAME.into(),
            icon_pixmap: Vec::new(),
        }
    }

    fn menu(&self) -> Vec<MenuItem<Self>> {
        vec![
            Self::item("Show/Hide Crosshair", OverlayCommand::ToggleVisibility),
            Self::item("Settings", OverlayCommand::OpenSettings),
            MenuItem::Separator,
            Self::item("Exit", OverlayCommand::Quit),
        ]
    }
}

/// Run the tray service on its own thread with a single-threaded runtime
pub fn spawn_tray(sender: CommandSender) -> Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("tray".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    error!(error = %e, "Failed to build tray runtime");
                    return;
                }
            };

            runtime.block_on(async move {
                match (CrosshairTray { sender }).spawn().await {
                    Ok(_handle) => {
                        info!("Tray icon registered");
                        // Keep the handle alive for the lifetime of the process
                        std::future::pending::<()>().await;
                    }
                    Err(e) => error!(error = %e, "Failed to register tray icon (is a StatusNotifier host running?)"),
                }
            });
        })
        .context("Failed to spawn tray thread")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ksni::Tray;

    #[test]
    fn test_menu_entries() {
        let (sender, _rx) = crate::commands::channel(egui::Context::default());
        let tray = CrosshairTray { sender };

        let labels: Vec<_> = tray
            .menu()
            .into_iter()
            .filter_map(|item| match item {
                MenuItem::Standard(item) => Some(item.label),
                _ => None,
            })
            .collect();
        assert_eq!(labels, ["Show/Hide Crosshair", "Settings", "Exit"]);
    }

    #[test]
    fn test_menu_activation_sends_command() {
        let (sender, rx) = crate::commands::channel(egui::Context::default());
        let mut tray = CrosshairTray { sender };

        for item in tray.menu() {
            if let MenuItem::Standard(item) = item
                && item.label == "Exit"
            {
                (item.activate)(&mut tray);
            }
        }
        assert_eq!(rx.try_recv().ok(), Some(OverlayCommand::Quit));
    }
}
