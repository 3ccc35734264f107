use std::f32::consts::{FRAC_PI_2, TAU};

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Sense, Shape, Stroke, Ui};
use egui_plot::{Bar, BarChart, Plot, PlotPoint, Text};

use crate::color::ColorMap;
use crate::data::aggregate::FrequencyTable;
use crate::state::{AppState, ChartKind};

// ---------------------------------------------------------------------------
// Acceptance comparison charts (central panel)
// ---------------------------------------------------------------------------

/// Raw vs. filtered outcome shares, side by side. The filtered chart is
/// left out when the filters matched nothing.
pub fn comparison(ui: &mut Ui, state: &AppState) {
    let (Some(analysis), Some(colors)) = (&state.analysis, &state.color_map) else {
        return;
    };

    ui.heading("Acceptance proportion chart");
    ui.columns(2, |cols| {
        draw(&mut cols[0], state.chart_kind, "raw_chart", "Raw data", &analysis.raw_rates, colors);
        if analysis.filtered_rates.is_empty() {
            cols[1].label("No filtered rows to chart.");
        } else {
            draw(
                &mut cols[1],
                state.chart_kind,
                "filtered_chart",
                "Filtered data",
                &analysis.filtered_rates,
                colors,
            );
        }
    });
}

fn draw(ui: &mut Ui, kind: ChartKind, id: &str, title: &str, rates: &FrequencyTable, colors: &ColorMap) {
    ui.strong(title);
    match kind {
        ChartKind::Bars => bar_chart(ui, id, rates, colors),
        ChartKind::Pie => pie_chart(ui, rates, colors),
    }
}

fn bar_chart(ui: &mut Ui, id: &str, rates: &FrequencyTable, colors: &ColorMap) {
    let bars: Vec<Bar> = rates
        .shares
        .iter()
        .enumerate()
        .map(|(i, share)| {
            Bar::new(i as f64, share.percent)
                .name(share.label.to_string())
                .fill(colors.color_for(&share.label))
                .width(0.6)
        })
        .collect();

    Plot::new(id)
        .height(260.0)
        .include_y(0.0)
        .include_y(110.0)
        .y_axis_label("Share (%)")
        .show_x(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(&rates.column));
            // Value labels on top of each bar.
            for (i, share) in rates.shares.iter().enumerate() {
                let label = format!("{}: {:.2}", share.label, share.percent);
                plot_ui.text(Text::new(PlotPoint::new(i as f64, share.percent + 5.0), label));
            }
        });
}

fn pie_chart(ui: &mut Ui, rates: &FrequencyTable, colors: &ColorMap) {
    let size = egui::vec2(ui.available_width(), 260.0);
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let rect = response.rect;
    let center = rect.center();
    let radius = rect.width().min(rect.height()) * 0.38;
    let text_color = ui.visuals().text_color();

    let mut start = -FRAC_PI_2;
    for share in &rates.shares {
        let sweep = share.percent as f32 / 100.0 * TAU;
        let fill = colors.color_for(&share.label);
        for piece in sector_pieces(center, radius, start, sweep) {
            painter.add(Shape::convex_polygon(piece, fill, Stroke::NONE));
        }

        let mid = start + sweep / 2.0;
        let dir = egui::vec2(mid.cos(), mid.sin());
        painter.text(
            center + dir * radius * 0.6,
            Align2::CENTER_CENTER,
            format!("{:.2}%", share.percent),
            FontId::proportional(13.0),
            Color32::WHITE,
        );
        painter.text(
            center + dir * radius * 1.18,
            Align2::CENTER_CENTER,
            share.label.to_string(),
            FontId::proportional(13.0),
            text_color,
        );
        start += sweep;
    }
}

/// Split a pie sector into convex polygons of at most a quarter turn each,
/// as `Shape::convex_polygon` requires.
fn sector_pieces(center: Pos2, radius: f32, start: f32, sweep: f32) -> Vec<Vec<Pos2>> {
    if sweep <= 0.0 {
        return Vec::new();
    }
    let n_pieces = (sweep / FRAC_PI_2).ceil().max(1.0) as usize;
    let piece_sweep = sweep / n_pieces as f32;
    // Enough arc points per piece to look round.
    let steps = 16;
    (0..n_pieces)
        .map(|p| {
            let a0 = start + p as f32 * piece_sweep;
            let mut points = Vec::with_capacity(steps + 2);
            points.push(center);
            for s in 0..=steps {
                let a = a0 + piece_sweep * s as f32 / steps as f32;
                points.push(center + egui::vec2(a.cos(), a.sin()) * radius);
            }
            points
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_circle_is_four_quarters() {
        let pieces = sector_pieces(Pos2::ZERO, 10.0, 0.0, TAU);
        assert_eq!(pieces.len(), 4);
        assert!(pieces.iter().all(|p| p[0] == Pos2::ZERO && p.len() == 18));
    }

    #[test]
    fn small_slice_is_one_piece() {
        assert_eq!(sector_pieces(Pos2::ZERO, 10.0, 0.0, 0.3).len(), 1);
        assert!(sector_pieces(Pos2::ZERO, 10.0, 0.0, 0.0).is_empty());
    }
}
