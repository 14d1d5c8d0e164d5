use eframe::egui;

use crate::state::{AppState, Page, PredictorState};
use crate::ui::{cost_form, panels, plot};

// ---------------------------------------------------------------------------
// Sales dashboard
// ---------------------------------------------------------------------------

pub struct SalesDashboardApp {
    pub state: AppState,
}

impl SalesDashboardApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for SalesDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: metrics and charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                plot::dashboard(ui, &self.state);
            });
        });
    }
}

// ---------------------------------------------------------------------------
// Cost predictor
// ---------------------------------------------------------------------------

pub struct CostPredictorApp {
    pub state: PredictorState,
}

impl CostPredictorApp {
    pub fn new(state: PredictorState) -> Self {
        Self { state }
    }
}

impl eframe::App for CostPredictorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::SidePanel::left("nav_panel")
            .default_width(200.0)
            .resizable(false)
            .show(ctx, |ui| {
                cost_form::nav_panel(ui, &mut self.state);
            });

        egui::CentralPanel::default().show(ctx, |ui| match self.state.page {
            Page::Introduction => cost_form::introduction_page(ui),
            Page::Predict => cost_form::predict_page(ui, &mut self.state),
        });
    }
}
