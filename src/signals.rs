use anyhow::{Context, Result};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;
use std::thread;
use tracing::info;

use crate::commands::{CommandSender, OverlayCommand};

/// Turn SIGINT/SIGTERM into a `Quit` command so the UI loop shuts down cleanly
pub fn spawn_signal_listener(sender: CommandSender) -> Result<thread::JoinHandle<()>> {
    let mut signals = Signals::new([SIGINT, SIGTERM]).context("Failed to register signal handlers")?;

    thread::Builder::new()
        .name("signals".to_string())
        .spawn(move || {
            for signal in signals.forever() {
                info!(signal, "Received termination signal, quitting");
                sender.send(OverlayCommand::Quit);
            }
        })
        .context("Failed to spawn signal listener thread")
}
