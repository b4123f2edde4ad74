//! Commands sent from listener threads to the UI thread

use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use tracing::{debug, warn};

use crate::constants::input;

/// Requests produced by hotkeys, the mouse listener, the tray and signals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayCommand {
    /// F2 or tray "Settings"
    OpenSettings,

    /// F3 or tray "Show/Hide Crosshair"
    ToggleVisibility,

    /// Right mouse button pressed
    HideTemporarily,

    /// Right mouse button released
    ShowTemporarily,

    /// Tray "Exit", SIGINT or SIGTERM
    Quit,
}

/// Sending half handed to listener threads.
///
/// Every successful send wakes the UI loop so the command is handled even
/// while the overlay is otherwise idle.
#[derive(Clone)]
pub struct CommandSender {
    tx: SyncSender<OverlayCommand>,
    waker: egui::Context,
}

impl CommandSender {
    /// Never blocks; a full queue drops the command
    pub fn send(&self, command: OverlayCommand) -> bool {
        match self.tx.try_send(command) {
            Ok(()) => {
                debug!(command = ?command, "Queued overlay command");
                self.waker.request_repaint();
                true
            }
            Err(TrySendError::Full(command)) => {
                warn!(command = ?command, capacity = input::COMMAND_QUEUE_CAPACITY, "Command queue full, dropping command");
                false
            }
            Err(TrySendError::Disconnected(command)) => {
                debug!(command = ?command, "UI thread gone, dropping command");
                false
            }
        }
    }
}

/// Bounded channel between listener threads and the UI thread
pub fn channel(waker: egui::Context) -> (CommandSender, Receiver<OverlayCommand>) {
    let (tx, rx) = mpsc::sync_channel(input::COMMAND_QUEUE_CAPACITY);
    (CommandSender { tx, waker }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_arrive_in_order() {
        let (sender, rx) = channel(egui::Context::default());
        assert!(sender.send(OverlayCommand::HideTemporarily));
        assert!(sender.send(OverlayCommand::ShowTemporarily));
        assert!(sender.send(OverlayCommand::Quit));

        let received: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            received,
            [
                OverlayCommand::HideTemporarily,
                OverlayCommand::ShowTemporarily,
                OverlayCommand::Quit
            ]
        );
    }

    #[test]
    fn test_full_queue_drops_without_blocking() {
        let (sender, rx) = channel(egui::Context::default());
        for _ in 0..input::COMMAND_QUEUE_CAPACITY {
            assert!(sender.send(OverlayCommand::ToggleVisibility));
        }
        assert!(!sender.send(OverlayCommand::Quit));
        assert_eq!(rx.try_iter().count(), input::COMMAND_QUEUE_CAPACITY);
    }

    #[test]
    fn test_send_after_receiver_dropped() {
        let (sender, rx) = channel(egui::Context::default());
        drop(rx);
        assert!(!sender.send(OverlayCommand::OpenSettings));
    }
}
