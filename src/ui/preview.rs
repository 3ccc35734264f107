use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::aggregate::FrequencyTable;
use crate::data::model::{CellValue, Table};
use crate::state::{AppState, ExportTarget};
use crate::ui::panels::save_export_dialog;

// ---------------------------------------------------------------------------
// Central panel – table previews and proportion tables
// ---------------------------------------------------------------------------

/// Before/after previews, export buttons and the outcome proportion tables.
pub fn results(ui: &mut Ui, state: &mut AppState) {
    let (Some(raw), Some(analysis)) = (&state.raw, &state.analysis) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to start  (File → Open…)");
        });
        return;
    };
    let rows = state.config.preview_rows;
    let outcome = &state.config.outcome_column;
    let mut export = None;

    ui.heading("Before filters");
    table_grid(ui, "raw_preview", &raw.head(rows));
    ui.separator();

    ui.heading("After filters");
    if analysis.filtered.is_empty() {
        ui.label("No rows match the current filters.");
    } else {
        table_grid(ui, "filtered_preview", &analysis.filtered.head(rows));
    }
    if ui.button("📥 Download filtered table (Excel)").clicked() {
        export = Some(ExportTarget::FilteredTable);
    }
    ui.separator();

    ui.heading(format!("Acceptance proportion ({outcome})"));
    ui.columns(2, |cols| {
        cols[0].strong("Original data");
        rates_grid(&mut cols[0], "raw_rates", &analysis.raw_rates);
        if cols[0].button("📥 Download (Excel)").clicked() {
            export = Some(ExportTarget::RawRates);
        }

        cols[1].strong("Filtered data");
        rates_grid(&mut cols[1], "filtered_rates", &analysis.filtered_rates);
        if cols[1].button("📥 Download (Excel)").clicked() {
            export = Some(ExportTarget::FilteredRates);
        }
    });
    ui.separator();

    if let Some(target) = export {
        save_export_dialog(state, target);
    }
}

fn rates_grid(ui: &mut Ui, id: &str, rates: &FrequencyTable) {
    if rates.is_empty() {
        ui.label("No rows.");
        return;
    }
    egui::Grid::new(id).striped(true).show(ui, |ui: &mut Ui| {
        ui.strong(&rates.column);
        ui.strong("Share (%)");
        ui.end_row();
        for share in &rates.shares {
            ui.label(share.label.to_string());
            ui.label(format!("{:.2}", share.percent));
            ui.end_row();
        }
        ui.weak("total");
        ui.weak(format!("{:.2}", rates.total_percent()));
        ui.end_row();
    });
}

/// Render a small table with a header row.
pub fn table_grid(ui: &mut Ui, id: &str, table: &Table) {
    let n_cols = table.column_names().len();
    if n_cols == 0 {
        return;
    }
    ui.push_id(id, |ui: &mut Ui| {
        egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .vscroll(false)
                .columns(Column::auto().at_least(48.0), n_cols)
                .header(20.0, |mut header| {
                    for name in table.column_names() {
                        header.col(|ui: &mut Ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|mut body| {
                    for row in table.rows() {
                        body.row(18.0, |mut cells| {
                            for cell in row {
                                cells.col(|ui: &mut Ui| {
                                    ui.label(cell_text(cell));
                                });
                            }
                        });
                    }
                });
        });
    });
}

fn cell_text(cell: &CellValue) -> String {
    match cell {
        CellValue::Float(v) => format!("{v:.4}"),
        other => other.to_string(),
    }
}
