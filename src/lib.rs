//! Retail sales dashboard and medical-cost predictor.
//!
//! The sales pipeline is `loader → filter → aggregate → view`; each stage is
//! a pure function of its input. The cost predictor encodes form input and
//! hands it to a trained [`predict::forest::RandomForest`].

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod predict;
pub mod state;
pub mod ui;
pub mod view;
