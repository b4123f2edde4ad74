//! Settings dialog shown in its own viewport

use eframe::egui;
use tracing::debug;

use super::components::{
    OffsetAction, OffsetDialog, ProfileAction, ProfileSelector, crosshair_settings, pressed_arrows,
};
use super::constants::*;
use crate::overlay::OverlayController;

/// What the user did with the dialog this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogOutcome {
    Open,
    Accepted,
    Cancelled,
    Exit,
}

#[derive(Default)]
pub struct SettingsDialog {
    profiles: ProfileSelector,
    offset: OffsetDialog,
}

impl SettingsDialog {
    /// Drop per-session UI state after the dialog closed
    pub fn reset(&mut self) {
        self.profiles.reset();
        self.offset.close();
    }

    pub fn show(
        &mut self,
        ctx: &egui::Context,
        controller: &mut OverlayController,
        monitor_count: usize,
    ) -> DialogOutcome {
        let builder = egui::ViewportBuilder::default()
            .with_title(SETTINGS_TITLE)
            .with_inner_size([SETTINGS_WIDTH, SETTINGS_HEIGHT])
            .with_min_inner_size([SETTINGS_MIN_WIDTH, SETTINGS_MIN_HEIGHT]);

        ctx.show_viewport_immediate(
            egui::ViewportId::from_hash_of(SETTINGS_VIEWPORT),
            builder,
            |ctx, _class| self.contents(ctx, controller, monitor_count),
        )
    }

    fn contents(
        &mut self,
        ctx: &egui::Context,
        controller: &mut OverlayController,
        monitor_count: usize,
    ) -> DialogOutcome {
        // Closing the window discards edits, like Cancel
        if ctx.input(|i| i.viewport().close_requested()) {
            debug!("Settings window closed");
            return DialogOutcome::Cancelled;
        }

        match self.offset.ui(ctx) {
            OffsetAction::None => {}
            OffsetAction::Preview(x, y) | OffsetAction::Cancel(x, y) => controller.preview_offset(x, y),
            OffsetAction::Save(x, y) => controller.commit_offset(x, y),
        }

        // In follow-mouse mode the arrow keys move the crosshair by `step`
        if !self.offset.is_open()
            && controller.settings().follow_mouse
            && ctx.memory(|m| m.focused().is_none())
        {
            let step = controller.settings().step;
            for (direction, _) in pressed_arrows(ctx) {
                controller.nudge_offset(direction, step);
            }
        }

        let mut outcome = DialogOutcome::Open;

        egui::TopBottomPanel::bottom("settings_buttons").show(ctx, |ui| {
            ui.add_space(ITEM_SPACING);
            ui.horizontal(|ui| {
                if ui.button("OK").clicked() {
                    outcome = DialogOutcome::Accepted;
                }
                if ui.button("Cancel").clicked() {
                    outcome = DialogOutcome::Cancelled;
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Exit").on_hover_text("Quit the overlay").clicked() {
                        outcome = DialogOutcome::Exit;
                    }
                });
            });
            ui.add_space(ITEM_SPACING);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                let mut edited = controller.settings().clone();
                if crosshair_settings::ui(ui, &mut edited, monitor_count) {
                    controller.apply_live(edited);
                }

                ui.add_space(ITEM_SPACING);
                let settings = controller.settings();
                if ui.button("Set Crosshair Position").clicked() {
                    self.offset.open(settings.offset_x, settings.offset_y, settings.follow_mouse);
                }

                ui.add_space(SECTION_SPACING);

                let active = controller.settings().profile_name.clone();
                let action = match controller.profiles() {
                    Some(profiles) => self.profiles.ui(ui, profiles, &active),
                    None => ProfileAction::None,
                };
                let result = match action {
                    ProfileAction::None => None,
                    ProfileAction::Switch(name) => Some(controller.switch_profile(&name)),
                    ProfileAction::Save(name) => Some(controller.save_profile(&name)),
                    ProfileAction::Delete(name) => Some(controller.delete_profile(&name)),
                };
                if let Some(result) = result {
                    self.profiles.report(result);
                }
            });
        });

        self.settle_offset(outcome, controller);
        outcome
    }

    /// OK or Exit with "Set Position" still open drops the previewed offsets
    fn settle_offset(&mut self, outcome: DialogOutcome, controller: &mut OverlayController) {
        if matches!(outcome, DialogOutcome::Accepted | DialogOutcome::Exit)
            && let Some((x, y)) = self.offset.abandon()
        {
            debug!("Position dialog closed with the settings, restoring offsets");
            controller.preview_offset(x, y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SettingsStore;

    #[test]
    fn test_accept_with_open_position_dialog_keeps_original_offsets() {
        let dir = tempfile::tempdir().unwrap();
        let mut controller = OverlayController::new(SettingsStore::in_dir(dir.path()));
        let mut dialog = SettingsDialog::default();
        controller.open_settings();
        dialog.offset.open(0.0, 0.0, false);

        controller.preview_offset(25.0, -3.0);
        dialog.settle_offset(DialogOutcome::Accepted, &mut controller);
        controller.accept_settings();

        let saved = SettingsStore::in_dir(dir.path()).load();
        assert_eq!((saved.offset_x, saved.offset_y), (0.0, 0.0));
        assert!(!dialog.offset.is_open());
    }

    #[test]
    fn test_settle_ignores_closed_position_dialog() {
        let dir = tempfile::tempdir().unwrap();
        let mut controller = OverlayController::new(SettingsStore::in_dir(dir.path()));
        let mut dialog = SettingsDialog::default();

        controller.commit_offset(4.0, 5.0);
        dialog.settle_offset(DialogOutcome::Exit, &mut controller);

        assert_eq!((controller.settings().offset_x, controller.settings().offset_y), (4.0, 5.0));
    }
}
