use anyhow::{Context, Result};
use tracing::{debug, warn};
use x11rb::connection::{Connection, RequestConnection};
use x11rb::protocol::randr::{self, ConnectionExt as RandrExt, MonitorInfo};
use x11rb::protocol::xproto::{ConnectionExt as _, Screen, Window};
use x11rb::rust_connection::RustConnection;

use crate::positioning::MonitorRect;

/// Monitor and cursor queries against the X server
pub struct DisplayQueries {
    conn: RustConnection,
    root: Window,
    screen_size: (u16, u16),
    has_randr: bool,
}

impl DisplayQueries {
    /// Connect to `$DISPLAY`
    pub fn connect() -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(None).context("Failed to connect to X11 server")?;
        let screen: &Screen = conn
            .setup()
            .roots
            .get(screen_num)
            .context(format!("X11 screen {} not found", screen_num))?;
        let root = screen.root;
        let screen_size = (screen.width_in_pixels, screen.height_in_pixels);

        let has_randr = conn
            .extension_information(randr::X11_EXTENSION_NAME)
            .context("Failed to query RandR extension")?
            .is_some();
        if !has_randr {
            warn!("RandR extension unavailable, treating the whole screen as one monitor");
        }

        debug!(screen = screen_num, width = screen_size.0, height = screen_size.1, "Connected to X11");
        Ok(Self {
            conn,
            root,
            screen_size,
            has_randr,
        })
    }

    /// Active monitors, primary first. Never empty.
    pub fn monitors(&self) -> Vec<MonitorRect> {
        let monitors = if self.has_randr {
            match self.randr_monitors() {
                Ok(monitors) => monitors,
                Err(e) => {
                    warn!(error = ?e, "Failed to enumerate monitors");
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        if monitors.is_empty() {
            let (width, height) = self.screen_size;
            return vec![MonitorRect::new(0, 0, width as u32, height as u32)];
        }
        monitors
    }

    fn randr_monitors(&self) -> Result<Vec<MonitorRect>> {
        let reply = self
            .conn
            .randr_get_monitors(self.root, true)
            .context("Failed to query RandR monitors")?
            .reply()
            .context("Failed to get reply for RandR monitors query")?;
        Ok(order_monitors(&reply.monitors))
    }

    /// Pointer position in root-window coordinates
    pub fn cursor_position(&self) -> Result<(i32, i32)> {
        let reply = self
            .conn
            .query_pointer(self.root)
            .context("Failed to query pointer")?
            .reply()
            .context("Failed to get reply for pointer query")?;
        Ok((reply.root_x as i32, reply.root_y as i32))
    }
}

/// Primary monitor first, the rest in server order
fn order_monitors(infos: &[MonitorInfo]) -> Vec<MonitorRect> {
    let to_rect = |m: &MonitorInfo| MonitorRect::new(m.x as i32, m.y as i32, m.width as u32, m.height as u32);
    infos
        .iter()
        .filter(|m| m.primary)
        .chain(infos.iter().filter(|m| !m.primary))
        .map(to_rect)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(x: i16, width: u16, primary: bool) -> MonitorInfo {
        MonitorInfo {
            name: 0,
            primary,
            automatic: true,
            x,
            y: 0,
            width,
            height: 1080,
            width_in_millimeters: 0,
            height_in_millimeters: 0,
            outputs: Vec::new(),
        }
    }

    #[test]
    fn test_primary_monitor_comes_first() {
        let infos = [info(0, 1920, false), info(1920, 2560, true), info(4480, 1280, false)];
        assert_eq!(
            order_monitors(&infos),
            [
                MonitorRect::new(1920, 0, 2560, 1080),
                MonitorRect::new(0, 0, 1920, 1080),
                MonitorRect::new(4480, 0, 1280, 1080),
            ]
        );
    }

    #[test]
    fn test_negative_origin_is_kept() {
        let infos = [info(-1920, 1920, true)];
        assert_eq!(order_monitors(&infos)[0].left(), -1920);
    }
}
