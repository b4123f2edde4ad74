//! Arrow-key offset adjustment dialog

use eframe::egui;

use crate::constants::nudge;
use crate::gui::constants::*;
use crate::positioning::{self, NudgeDirection, NudgeModifiers};

const ARROWS: [(egui::Key, NudgeDirection); 4] = [
    (egui::Key::ArrowLeft, NudgeDirection::Left),
    (egui::Key::ArrowRight, NudgeDirection::Right),
    (egui::Key::ArrowUp, NudgeDirection::Up),
    (egui::Key::ArrowDown, NudgeDirection::Down),
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OffsetAction {
    None,
    /// Offsets moved; show them without saving
    Preview(f64, f64),
    /// Keep these offsets
    Save(f64, f64),
    /// Restore these offsets
    Cancel(f64, f64),
}

#[derive(Debug, Default)]
pub struct OffsetDialog {
    open: bool,
    follow_mouse: bool,
    x: f64,
    y: f64,
    original: (f64, f64),
}

impl OffsetDialog {
    pub fn open(&mut self, x: f64, y: f64, follow_mouse: bool) {
        self.open = true;
        self.follow_mouse = follow_mouse;
        self.x = x;
        self.y = y;
        self.original = (x, y);
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Close without saving; the offsets to restore when it was open
    pub fn abandon(&mut self) -> Option<(f64, f64)> {
        if !self.open {
            return None;
        }
        self.open = false;
        Some(self.original)
    }

    /// Apply one arrow-key press
    fn nudge(&mut self, direction: NudgeDirection, modifiers: NudgeModifiers) {
        let step = positioning::nudge_step(modifiers);
        (self.x, self.y) = positioning::apply_nudge((self.x, self.y), direction, step);
    }

    pub fn ui(&mut self, ctx: &egui::Context) -> OffsetAction {
        if !self.open {
            return OffsetAction::None;
        }

        let mut action = OffsetAction::None;

        let presses = pressed_arrows(ctx);
        for (direction, modifiers) in presses {
            self.nudge(direction, modifiers);
            action = OffsetAction::Preview(self.x, self.y);
        }

        egui::Window::new("Set Position")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                let target = if self.follow_mouse {
                    "the pinned position relative to the mouse"
                } else {
                    "the fixed position"
                };
                ui.label(format!("To set {target}, use the arrow keys."));
                ui.label(
                    egui::RichText::new(format!(
                        "Step {}, hold Shift for {}, Ctrl for {}",
                        nudge::BASE_STEP,
                        nudge::SHIFT_STEP,
                        nudge::CTRL_STEP
                    ))
                    .small()
                    .weak(),
                );

                ui.add_space(ITEM_SPACING);
                ui.label(egui::RichText::new(offset_label(self.x, self.y)).monospace());
                ui.add_space(ITEM_SPACING);

                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        action = OffsetAction::Save(self.x, self.y);
                        self.open = false;
                    }
                    if ui.button("Cancel").clicked() {
                        action = OffsetAction::Cancel(self.original.0, self.original.1);
                        self.open = false;
                    }
                });
            });

        action
    }
}

/// Arrow keys pressed this frame, with the modifiers held at the time
pub fn pressed_arrows(ctx: &egui::Context) -> Vec<(NudgeDirection, NudgeModifiers)> {
    ctx.input(|i| {
        let modifiers = NudgeModifiers {
            shift: i.modifiers.shift,
            ctrl: i.modifiers.ctrl,
        };
        ARROWS
            .iter()
            .filter(|(key, _)| i.key_pressed(*key))
            .map(|(_, direction)| (*direction, modifiers))
            .collect()
    })
}

fn offset_label(x: f64, y: f64) -> String {
    format!("X: {x:.2}  Y: {y:.2}")
}
