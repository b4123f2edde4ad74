use eframe::egui;

use crate::config::{ProfileError, ProfileStore};
use crate::constants::config;
use crate::gui::constants::*;

pub struct ProfileSelector {
    new_profile_name: String,
    show_save_dialog: bool,
    show_delete_confirm: bool,
    message: Option<(String, egui::Color32)>,
}

impl ProfileSelector {
    pub fn new() -> Self {
        Self {
            new_profile_name: String::new(),
            show_save_dialog: false,
            show_delete_confirm: false,
            message: None,
        }
    }

    /// Forget dialog state between settings sessions
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Show the outcome of an action returned by `ui`
    pub fn report(&mut self, result: Result<(), ProfileError>) {
        self.message = match result {
            Ok(()) => None,
            Err(ProfileError::Io(e)) => Some((format!("Failed to save profiles: {e:#}"), ERROR_COLOR)),
            Err(e) => Some((e.to_string(), WARNING_COLOR)),
        };
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, profiles: &ProfileStore, active: &str) -> ProfileAction {
        let mut action = ProfileAction::None;

        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("Profile:").strong());

                egui::ComboBox::from_id_salt("profile_selector")
                    .selected_text(active)
                    .show_ui(ui, |ui| {
                        for name in profiles.names() {
                            if ui.selectable_label(name == active, name).clicked() && name != active {
                                action = ProfileAction::Switch(name.to_string());
                            }
                        }
                    });
            });

            ui.add_space(ITEM_SPACING);

            ui.horizontal(|ui| {
                if ui.button("💾 Save as Profile").clicked() {
                    self.show_save_dialog = true;
                    self.new_profile_name.clear();
                }

                if ui.button("🗑 Delete Profile").clicked() {
                    if active == config::DEFAULT_PROFILE {
                        // Rejected by the store too; surface the warning without a confirm step
                        self.report(Err(ProfileError::DefaultProtected));
                    } else {
                        self.show_delete_confirm = true;
                    }
                }
            });

            if let Some((text, color)) = &self.message {
                ui.colored_label(*color, text);
            }
        });

        if self.show_save_dialog
            && let Some(save) = self.save_dialog(ui.ctx(), profiles)
        {
            action = save;
        }

        if self.show_delete_confirm
            && let Some(delete) = self.delete_confirm_dialog(ui.ctx(), active)
        {
            action = delete;
        }

        action
    }

    fn save_dialog(&mut self, ctx: &egui::Context, profiles: &ProfileStore) -> Option<ProfileAction> {
        let mut action = None;

        egui::Window::new("Save Profile")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label("Profile name:");
                let response = ui.text_edit_singleline(&mut self.new_profile_name);
                let entered = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

                let name = self.new_profile_name.trim();
                if profiles.contains(name) {
                    ui.label(
                        egui::RichText::new(format!("'{name}' will be overwritten"))
                            .small()
                            .color(WARNING_COLOR),
                    );
                }

                ui.add_space(ITEM_SPACING);

                ui.horizontal(|ui| {
                    let save_clicked = ui
                        .add_enabled(!name.is_empty(), egui::Button::new("Save"))
                        .clicked();
                    if (save_clicked || entered) && !name.is_empty() {
                        action = Some(ProfileAction::Save(name.to_string()));
                        self.show_save_dialog = false;
                    }

                    if ui.button("Cancel").clicked() {
                        self.show_save_dialog = false;
                    }
                });
            });

        action
    }

    fn delete_confirm_dialog(&mut self, ctx: &egui::Context, active: &str) -> Option<ProfileAction> {
        let mut action = None;

        egui::Window::new("Delete Profile")
            .collapsible(false)
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!("Delete profile '{active}'?"));
                ui.colored_label(ERROR_COLOR, "This cannot be undone!");

                ui.add_space(ITEM_SPACING);

                ui.horizontal(|ui| {
                    if ui.button("Delete").clicked() {
                        action = Some(ProfileAction::Delete(active.to_string()));
                        self.show_delete_confirm = false;
                    }

                    if ui.button("Cancel").clicked() {
                        self.show_delete_confirm = false;
                    }
                });
            });

        action
    }
}

impl Default for ProfileSelector {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProfileAction {
    None,
    Switch(String),
    Save(String),
    Delete(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_default_protected_shows_warning() {
        let mut selector = ProfileSelector::new();
        selector.report(Err(ProfileError::DefaultProtected));
        let (text, color) = selector.message.clone().unwrap();
        assert_eq!(text, "Default profile cannot be deleted.");
        assert_eq!(color, WARNING_COLOR);

        selector.report(Ok(()));
        assert!(selector.message.is_none());
    }
}
