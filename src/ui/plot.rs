use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, Plot};

use crate::state::AppState;
use crate::view::{BarPoint, DashboardView};

const CHART_HEIGHT: f32 = 320.0;

// ---------------------------------------------------------------------------
// Dashboard (central panel)
// ---------------------------------------------------------------------------

/// Render metrics and charts in the central panel.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let Some(view) = &state.view else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a sales file to start  (File → Open…)");
        });
        return;
    };

    ui.heading("📊 Sales dashboard");
    ui.add_space(8.0);
    metric_tiles(ui, view);
    ui.separator();

    if let Some(warning) = &view.warning {
        ui.colored_label(Color32::from_rgb(230, 160, 0), warning.to_string());
        return;
    }

    ui.columns(2, |cols| {
        hour_chart(&mut cols[0], &view.hourly);
        product_line_chart(&mut cols[1], &view.product_lines, state);
    });
}

fn metric_tiles(ui: &mut Ui, view: &DashboardView) {
    let m = &view.metrics;
    ui.columns(3, |cols| {
        let tiles = [
            ("Total sales", m.total_sales.clone()),
            ("Average rating", format!("{} {}", m.average_rating, m.stars)),
            ("Average sale per order", m.average_sale.clone()),
        ];
        for (col, (title, value)) in cols.iter_mut().zip(tiles) {
            col.label(RichText::new(title).strong());
            col.label(RichText::new(value).size(20.0));
        }
    });
}

/// Vertical bars, one per hour of day.
fn hour_chart(ui: &mut Ui, points: &[BarPoint]) {
    ui.label(RichText::new("Sales by hour").strong());
    let bars: Vec<Bar> = points
        .iter()
        .filter_map(|p| {
            let hour: f64 = p.label.parse().ok()?;
            Some(Bar::new(hour, p.value).name(format!("{}:00", p.label)))
        })
        .collect();

    Plot::new("sales_by_hour")
        .height(CHART_HEIGHT)
        .x_axis_label("Hour")
        .y_axis_label("Total")
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .name("Total by hour")
                    .color(Color32::LIGHT_BLUE),
            );
        });
}

/// Horizontal bars, one per product line, smallest first.
fn product_line_chart(ui: &mut Ui, points: &[BarPoint], state: &AppState) {
    ui.label(RichText::new("Sales by product line").strong());
    let bars: Vec<Bar> = points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            Bar::new(i as f64, p.value)
                .name(&p.label)
                .fill(state.color_map.color_for(&p.label))
        })
        .collect();

    let labels: Vec<String> = points.iter().map(|p| p.label.clone()).collect();
    Plot::new("sales_by_product_line")
        .height(CHART_HEIGHT)
        .x_axis_label("Total")
        .y_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() < 1e-6 && idx >= 0.0 {
                labels.get(idx as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        })
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name("Total by product line").horizontal());
        });

    egui::Grid::new("product_line_legend").show(ui, |ui: &mut Ui| {
        for p in points.iter().rev() {
            ui.colored_label(state.color_map.color_for(&p.label), "■");
            ui.label(&p.label);
            ui.end_row();
        }
    });
}
