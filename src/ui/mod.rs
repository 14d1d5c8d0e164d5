//! egui widgets for both dashboards.

pub mod cost_form;
pub mod panels;
pub mod plot;
