use eframe::egui::{self, Color32, RichText, Ui};

use crate::predict::encoding::{Region, Sex, Smoker};
use crate::state::{Page, PredictorState};

/// Navigation radio in the side panel.
pub fn nav_panel(ui: &mut Ui, state: &mut PredictorState) {
    ui.heading("Navigation");
    ui.radio_value(&mut state.page, Page::Introduction, "Introduction");
    ui.radio_value(&mut state.page, Page::Predict, "Predict medical cost");
    if state.page == Page::Introduction {
        ui.add_space(8.0);
        ui.colored_label(Color32::DARK_GREEN, "Choose “Predict medical cost” to start");
    }
}

pub fn introduction_page(ui: &mut Ui) {
    ui.heading("Medical cost predictor 💰");
    ui.label(
        "This tool uses a machine-learning model to estimate medical costs, \
         as a reference for insurance pricing.",
    );
    ui.add_space(8.0);
    ui.strong("Background");
    ui.label("• Goal: help insurers price products sensibly and control risk.");
    ui.label("• Model: a random-forest regressor trained on historical claims.");
    ui.add_space(8.0);
    ui.strong("How to use");
    ui.label("• Enter complete, accurate policyholder details for a better estimate.");
    ui.label("• The estimate is a pricing reference; decide with care.");
}

pub fn predict_page(ui: &mut Ui, state: &mut PredictorState) {
    ui.heading("Estimate medical cost");
    ui.label("Enter the policyholder's details, then press “Predict cost”.");
    ui.add_space(8.0);

    let input = &mut state.input;
    egui::Grid::new("policyholder_form")
        .num_columns(2)
        .spacing([24.0, 8.0])
        .show(ui, |ui: &mut Ui| {
            ui.label("Age");
            ui.add(egui::DragValue::new(&mut input.age).range(0..=120));
            ui.end_row();

            ui.label("Sex");
            ui.horizontal(|ui: &mut Ui| {
                for sex in Sex::ALL {
                    ui.radio_value(&mut input.sex, sex, sex.to_string());
                }
            });
            ui.end_row();

            ui.label("BMI");
            ui.add(
                egui::DragValue::new(&mut input.bmi)
                    .range(0.0..=80.0)
                    .speed(0.1)
                    .fixed_decimals(1),
            );
            ui.end_row();

            ui.label("Children");
            ui.add(egui::DragValue::new(&mut input.children).range(0..=20));
            ui.end_row();

            ui.label("Smoker");
            ui.horizontal(|ui: &mut Ui| {
                for smoker in Smoker::ALL {
                    ui.radio_value(&mut input.smoker, smoker, smoker.to_string());
                }
            });
            ui.end_row();

            ui.label("Region");
            egui::ComboBox::from_id_salt("region")
                .selected_text(input.region.to_string())
                .show_ui(ui, |ui: &mut Ui| {
                    for region in Region::ALL {
                        ui.selectable_value(&mut input.region, region, region.to_string());
                    }
                });
            ui.end_row();
        });

    ui.add_space(8.0);
    if ui.button("Predict cost").clicked() {
        state.submit();
    }

    match &state.outcome {
        Some(Ok(cost)) => {
            ui.label(
                RichText::new(format!("Estimated medical cost for this policyholder: {cost:.2}"))
                    .size(18.0),
            );
        }
        Some(Err(msg)) => {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
        None => {}
    }
}
