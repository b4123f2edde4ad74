//! Crosshair appearance and placement settings

use eframe::egui;
use rfd::FileDialog;
use std::path::Path;

use crate::color::Rgb;
use crate::config::SettingsRecord;
use crate::constants::validation;
use crate::gui::constants::*;

/// Renders the settings form and returns true if any field changed
pub fn ui(ui: &mut egui::Ui, record: &mut SettingsRecord, monitor_count: usize) -> bool {
    let mut changed = false;

    ui.group(|ui| {
        ui.label(egui::RichText::new("Crosshair").strong());
        ui.add_space(ITEM_SPACING);

        egui::Grid::new("crosshair_settings_grid")
            .num_columns(2)
            .min_col_width(LABEL_WIDTH)
            .spacing([ITEM_SPACING, ITEM_SPACING])
            .show(ui, |ui| {
                ui.label("Crosshair Size:");
                changed |= ui
                    .add(egui::Slider::new(
                        &mut record.size,
                        validation::MIN_SIZE..=validation::MAX_SIZE,
                    ))
                    .changed();
                ui.end_row();

                ui.label("Step Size:");
                changed |= ui
                    .add(
                        egui::DragValue::new(&mut record.step)
                            .range(validation::MIN_STEP..=validation::MAX_STEP)
                            .speed(0.1)
                            .fixed_decimals(1),
                    )
                    .changed();
                ui.end_row();

                ui.label("Crosshair Image:");
                changed |= image_picker(ui, &mut record.image_path);
                ui.end_row();

                ui.label("Crosshair Color:");
                let mut rgb = record.rgb().channels();
                if ui.color_edit_button_srgb(&mut rgb).changed() {
                    record.set_rgb(Rgb::from(rgb));
                    changed = true;
                }
                ui.end_row();

                ui.label("Opacity:");
                let mut percent = (record.opacity * 100.0).round() as u32;
                if ui
                    .add(egui::Slider::new(&mut percent, OPACITY_PERCENT_MIN..=OPACITY_PERCENT_MAX).suffix("%"))
                    .changed()
                {
                    record.opacity = percent as f32 / 100.0;
                    changed = true;
                }
                ui.end_row();

                ui.label("Monitor:");
                changed |= monitor_combo(ui, &mut record.monitor_index, monitor_count);
                ui.end_row();

                ui.label("Follow time (ms):");
                changed |= ui
                    .add(
                        egui::DragValue::new(&mut record.timer_interval_ms)
                            .range(validation::MIN_TIMER_INTERVAL_MS..=validation::MAX_TIMER_INTERVAL_MS),
                    )
                    .changed();
                ui.end_row();
            });

        ui.add_space(ITEM_SPACING);

        changed |= ui
            .checkbox(&mut record.hide_on_right_click, "Hide on right click")
            .changed();
        changed |= ui
            .checkbox(&mut record.use_color_overlay, "Use color overlay for image")
            .changed();
        changed |= ui
            .checkbox(&mut record.follow_mouse, "Pin crosshair to mouse")
            .changed();

        if record.follow_mouse {
            ui.label(
                egui::RichText::new("Arrow keys move the crosshair by the step size")
                    .small()
                    .weak(),
            );
        }
    });

    changed
}

/// File name label with Browse/Clear buttons
fn image_picker(ui: &mut egui::Ui, image_path: &mut String) -> bool {
    let mut changed = false;

    ui.horizontal(|ui| {
        if ui.button("Browse…").clicked()
            && let Some(path) = FileDialog::new()
                .set_title("Select crosshair image")
                .add_filter("Images", IMAGE_EXTENSIONS)
                .pick_file()
        {
            let selected = path.to_string_lossy().to_string();
            if *image_path != selected {
                *image_path = selected;
                changed = true;
            }
        }

        if ui
            .add_enabled(!image_path.is_empty(), egui::Button::new("Clear"))
            .on_hover_text("Use the built-in plus-sign")
            .clicked()
        {
            image_path.clear();
            changed = true;
        }

        let name = display_name(image_path);
        ui.label(name).on_hover_text(image_path.as_str());
    });

    changed
}

fn monitor_combo(ui: &mut egui::Ui, monitor_index: &mut u32, monitor_count: usize) -> bool {
    let mut changed = false;
    let count = monitor_count.max(1) as u32;
    // Stored index may point past the current layout; it renders on monitor 1
    let shown = if *monitor_index < count { *monitor_index } else { 0 };

    egui::ComboBox::from_id_salt("monitor_selector")
        .selected_text(format!("Monitor {}", shown + 1))
        .show_ui(ui, |ui| {
            for idx in 0..count {
                if ui
                    .selectable_label(*monitor_index == idx, format!("Monitor {}", idx + 1))
                    .clicked()
                    && *monitor_index != idx
                {
                    *monitor_index = idx;
                    changed = true;
                }
            }
        });

    changed
}

/// File name shown next to the picker
fn display_name(image_path: &str) -> String {
    if image_path.trim().is_empty() {
        return "(plus-sign)".to_string();
    }
    Path::new(image_path)
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| image_path.to_string())
}
