//! Overlay application: transparent click-through root viewport plus the
//! on-demand settings dialog

use std::sync::mpsc::Receiver;
use std::time::{Duration, Instant};

use anyhow::{Result, anyhow};
use eframe::{CreationContext, NativeOptions, egui};
use tracing::{error, info, warn};

use super::constants::*;
use super::settings_dialog::{DialogOutcome, SettingsDialog};
use crate::commands::{self, OverlayCommand};
use crate::config::SettingsStore;
use crate::constants::tray;
use crate::overlay::OverlayController;
use crate::positioning::MonitorRect;
use crate::x11_utils::DisplayQueries;
use crate::{hotkeys, signals};

/// Startup switches from the command line
#[derive(Debug, Clone, Copy)]
pub struct OverlayOptions {
    pub hotkeys: bool,
    pub tray: bool,
    pub open_settings: bool,
}

/// Geometry last sent to the window system, in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WindowGeometry {
    position: (i32, i32),
    size: (u32, u32),
}

struct OverlayApp {
    controller: OverlayController,
    commands: Receiver<OverlayCommand>,
    display: Option<DisplayQueries>,
    monitors: Vec<MonitorRect>,
    last_monitor_refresh: Instant,
    texture: Option<egui::TextureHandle>,
    texture_revision: u64,
    geometry: Option<WindowGeometry>,
    dialog: SettingsDialog,
}

impl OverlayApp {
    fn new(cc: &CreationContext<'_>, mut controller: OverlayController, options: OverlayOptions) -> Self {
        info!("Initializing crosshair overlay");

        let (sender, commands) = commands::channel(cc.egui_ctx.clone());

        if options.hotkeys {
            if hotkeys::check_permissions() {
                match hotkeys::spawn_listener(sender.clone()) {
                    Ok(handles) => info!(listeners = handles.len(), "Hotkey support enabled (F2 settings, F3 toggle, right-click hide)"),
                    Err(e) => {
                        error!(error = %e, "Failed to start hotkey listener");
                        hotkeys::print_permission_error();
                    }
                }
            } else {
                hotkeys::print_permission_error();
            }
        } else {
            info!("Hotkeys disabled");
        }

        if options.tray {
            if let Err(e) = crate::tray::spawn_tray(sender.clone()) {
                error!(error = ?e, "Failed to start tray icon");
            }
        } else {
            info!("Tray icon disabled");
        }

        if let Err(e) = signals::spawn_signal_listener(sender) {
            warn!(error = ?e, "Failed to install signal handlers");
        }

        let display = match DisplayQueries::connect() {
            Ok(display) => Some(display),
            Err(e) => {
                warn!(error = ?e, "X11 queries unavailable, assuming a single {}x{} monitor",
                    crate::constants::positioning::FALLBACK_MONITOR_WIDTH,
                    crate::constants::positioning::FALLBACK_MONITOR_HEIGHT);
                None
            }
        };
        let monitors = display.as_ref().map(DisplayQueries::monitors).unwrap_or_default();
        info!(count = monitors.len(), "Monitors detected");

        if options.open_settings {
            controller.open_settings();
        }

        Self {
            controller,
            commands,
            display,
            monitors,
            last_monitor_refresh: Instant::now(),
            texture: None,
            texture_revision: 0,
            geometry: None,
            dialog: SettingsDialog::default(),
        }
    }

    fn drain_commands(&mut self) {
        while let Ok(command) = self.commands.try_recv() {
            self.controller.handle_command(command);
        }
    }

    fn refresh_monitors(&mut self) {
        if self.last_monitor_refresh.elapsed() < Duration::from_millis(MONITOR_REFRESH_INTERVAL_MS) {
            return;
        }
        self.last_monitor_refresh = Instant::now();
        if let Some(display) = &self.display {
            let monitors = display.monitors();
            if monitors != self.monitors {
                info!(count = monitors.len(), "Monitor layout changed");
                self.monitors = monitors;
            }
        }
    }

    fn cursor_position(&self) -> (i32, i32) {
        if !self.controller.settings().follow_mouse {
            return (0, 0);
        }
        match &self.display {
            Some(display) => display.cursor_position().unwrap_or_else(|e| {
                warn!(error = ?e, "Failed to query cursor position");
                (0, 0)
            }),
            None => (0, 0),
        }
    }

    /// Re-upload the bitmap after the controller re-rendered it
    fn sync_texture(&mut self, ctx: &egui::Context) {
        if self.texture.is_some() && self.texture_revision == self.controller.bitmap_revision() {
            return;
        }
        let bitmap = self.controller.bitmap();
        let image = egui::ColorImage::from_rgba_unmultiplied(
            [bitmap.width() as usize, bitmap.height() as usize],
            bitmap.pixels(),
        );
        match &mut self.texture {
            Some(texture) => texture.set(image, egui::TextureOptions::NEAREST),
            None => {
                self.texture = Some(ctx.load_texture("crosshair", image, egui::TextureOptions::NEAREST));
            }
        }
        self.texture_revision = self.controller.bitmap_revision();
    }

    /// Move/resize the overlay window when the computed geometry changed
    fn sync_geometry(&mut self, ctx: &egui::Context) {
        let bitmap = self.controller.bitmap();
        let geometry = WindowGeometry {
            position: self.controller.position(),
            size: (bitmap.width(), bitmap.height()),
        };
        if self.geometry == Some(geometry) {
            return;
        }

        let ppp = ctx.pixels_per_point();
        let (x, y) = geometry.position;
        let (w, h) = geometry.size;
        ctx.send_viewport_cmd(egui::ViewportCommand::OuterPosition(egui::pos2(
            x as f32 / ppp,
            y as f32 / ppp,
        )));
        if self.geometry.map(|g| g.size) != Some(geometry.size) {
            ctx.send_viewport_cmd(egui::ViewportCommand::InnerSize(egui::vec2(
                w as f32 / ppp,
                h as f32 / ppp,
            )));
        }
        self.geometry = Some(geometry);
    }

    fn paint_crosshair(&self, ctx: &egui::Context) {
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                if !self.controller.is_drawn() {
                    return;
                }
                if let Some(texture) = &self.texture {
                    let rect = ui.max_rect();
                    let uv = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));
                    ui.painter().image(texture.id(), rect, uv, egui::Color32::WHITE);
                }
            });
    }

    fn show_settings(&mut self, ctx: &egui::Context) {
        if !self.controller.settings_open() {
            return;
        }
        let monitor_count = self.monitors.len();
        match self.dialog.show(ctx, &mut self.controller, monitor_count) {
            DialogOutcome::Open => {}
            DialogOutcome::Accepted => {
                self.controller.accept_settings();
                self.dialog.reset();
            }
            DialogOutcome::Cancelled => {
                self.controller.cancel_settings();
                self.dialog.reset();
            }
            DialogOutcome::Exit => {
                self.controller.accept_settings();
                self.dialog.reset();
                self.controller.handle_command(OverlayCommand::Quit);
            }
        }
    }
}

impl eframe::App for OverlayApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_commands();
        if self.controller.quit_requested() {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        self.show_settings(ctx);

        self.refresh_monitors();
        let cursor = self.cursor_position();
        self.controller.reposition(&self.monitors, cursor);

        self.sync_texture(ctx);
        self.sync_geometry(ctx);
        self.paint_crosshair(ctx);

        ctx.request_repaint_after(Duration::from_millis(
            self.controller.settings().timer_interval_ms as u64,
        ));
    }

    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        egui::Rgba::TRANSPARENT.to_array()
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if self.controller.settings_open() {
            self.controller.accept_settings();
        }
        info!("Overlay exiting");
    }
}

/// Build the controller and run the overlay until quit
pub fn run_overlay(store: SettingsStore, options: OverlayOptions) -> Result<()> {
    let controller = OverlayController::new(store);
    let bitmap = controller.bitmap();

    let native_options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(tray::TITLE)
            .with_inner_size([bitmap.width() as f32, bitmap.height() as f32])
            .with_transparent(true)
            .with_decorations(false)
            .with_resizable(false)
            .with_always_on_top()
            .with_mouse_passthrough(true)
            .with_taskbar(false),
        ..Default::default()
    };

    eframe::run_native(
        tray::TITLE,
        native_options,
        Box::new(move |cc| Ok(Box::new(OverlayApp::new(cc, controller, options)))),
    )
    .map_err(|err| anyhow!("Failed to launch overlay: {err}"))
}
