use std::sync::Arc;

use anyhow::Context;
use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::filter::Selection;
use crate::data::loader::DataSource;
use crate::state::{AppState, ChartKind, ExportTarget};

// ---------------------------------------------------------------------------
// Left side panel – filter form
// ---------------------------------------------------------------------------

/// Render the left filter panel. Edits only touch the draft filters until
/// "Apply filters" is pressed.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    // ---- Branding (centered) ----
    let image_path = state.config.branding_image.clone();
    ui.vertical_centered(|ui: &mut Ui| {
        if image_path.exists() {
            ui.add(
                egui::Image::new(format!("file://{}", image_path.display()))
                    .max_width(ui.available_width() * 0.8)
                    .max_height(120.0)
                    .corner_radius(4.0),
            );
        } else {
            ui.small(format!("Place '{}' to show a logo here.", image_path.display()));
        }
    });
    ui.add_space(4.0);

    ui.heading("Filters");
    ui.separator();

    if state.raw.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    let options = state.options.clone();
    let mut apply = false;
    let mut reset = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Chart kind ----
            ui.strong("Chart type");
            ui.horizontal(|ui: &mut Ui| {
                ui.radio_value(&mut state.chart_kind, ChartKind::Bars, "Bars");
                ui.radio_value(&mut state.chart_kind, ChartKind::Pie, "Pie");
            });
            ui.separator();

            // ---- Range filter ----
            if let (Some((lo, hi)), Some(range)) = (state.range_bounds, state.draft.range.as_mut()) {
                ui.strong(format!("{} range", range.column));
                ui.add(egui::Slider::new(&mut range.min, lo..=hi).step_by(1.0).text("min"));
                ui.add(egui::Slider::new(&mut range.max, lo..=hi).step_by(1.0).text("max"));
                if range.min > range.max {
                    range.max = range.min;
                }
                ui.separator();
            }

            // ---- Per-column multiselects (collapsible) ----
            for opt in &options {
                let Some(selection) = state.draft.selection_mut(&opt.column) else {
                    continue;
                };

                let summary = match selection {
                    Selection::All => "all".to_string(),
                    Selection::Subset(set) => format!("{}/{}", set.len(), opt.values.len()),
                };
                let header_text = format!("{}  ({summary})", opt.label);

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(&opt.column)
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        let mut all = selection.is_all();
                        if ui.checkbox(&mut all, "all").changed() && all {
                            *selection = Selection::All;
                        }
                        for val in &opt.values {
                            let mut checked = !selection.is_all() && selection.contains(val);
                            if ui.checkbox(&mut checked, val.to_string()).changed() {
                                selection.toggle(val);
                            }
                        }
                    });
            }

            ui.add_space(8.0);
            ui.horizontal(|ui: &mut Ui| {
                apply = ui.button("Apply filters").clicked();
                reset = ui.small_button("Reset").clicked();
            });
        });

    if apply {
        state.apply_filters();
    } else if reset {
        state.reset_filters();
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload default data").clicked() {
                state.load_default();
                ui.close_menu();
            }
        });

        ui.separator();
        ui.strong("Telemarketing analysis");
        ui.separator();

        if let (Some(raw), Some(analysis)) = (&state.raw, &state.analysis) {
            ui.label(format!(
                "{}: {} rows loaded, {} after filters",
                state.origin.as_deref().unwrap_or("data"),
                raw.len(),
                analysis.filtered.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open bank marketing data")
        .add_filter("Supported files", &["csv", "xlsx", "xls", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", &["xlsx", "xls"])
        .pick_file();

    let Some(path) = file else {
        return;
    };
    match std::fs::read(&path) {
        Ok(bytes) => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            state.load(&DataSource::Upload {
                name,
                bytes: Arc::from(bytes),
            });
        }
        Err(e) => {
            log::error!("Failed to read {}: {e}", path.display());
            state.status_message = Some(format!("Error: {e}"));
        }
    }
}

/// Ask where to save an export and write it there.
pub fn save_export_dialog(state: &mut AppState, target: ExportTarget) {
    let result = state.export(target).and_then(|(name, bytes)| {
        let Some(path) = rfd::FileDialog::new()
            .set_title("Save as Excel")
            .set_file_name(name)
            .add_filter("Excel", &["xlsx"])
            .save_file()
        else {
            return Ok(());
        };
        std::fs::write(&path, bytes.as_slice())
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("Exported {target:?} to {}", path.display());
        Ok(())
    });
    if let Err(e) = result {
        log::error!("Export failed: {e:#}");
        state.status_message = Some(format!("Error: {e:#}"));
    }
}
