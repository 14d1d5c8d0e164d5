use std::path::{Path, PathBuf};

use crate::color::ColorMap;
use crate::config::AppConfig;
use crate::data::filter::{init_selection, FilterSelection};
use crate::data::loader::load_file;
use crate::data::model::{CategoryColumn, SalesDataset};
use crate::error::{LoadError, PredictError};
use crate::predict::encoding::Policyholder;
use crate::predict::estimate_cost;
use crate::predict::forest::RandomForest;
use crate::view::{render, DashboardView};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full sales-dashboard state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    pub config: AppConfig,

    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<SalesDataset>,

    /// Sidebar filter selections.
    pub selection: FilterSelection,

    /// Output of [`render`] for the current selection.
    pub view: Option<DashboardView>,

    /// Colours of the product-line bars.
    pub color_map: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Load `path` and make it the current dataset. On failure the previous
    /// dataset stays and the error is kept in `status_message`.
    pub fn open(&mut self, path: &Path) -> Result<(), LoadError> {
        match load_file(path, &self.config.load_options()) {
            Ok(dataset) => {
                log::info!("Loaded {} orders from {}", dataset.len(), path.display());
                self.set_dataset(dataset);
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", path.display());
                self.status_message = Some(format!("Error: {e}"));
                Err(e)
            }
        }
    }

    /// Ingest a newly loaded dataset: every filter starts fully selected.
    pub fn set_dataset(&mut self, dataset: SalesDataset) {
        self.selection = init_selection(&dataset, &self.config.dashboard.filter_columns);
        self.color_map = ColorMap::new(dataset.distinct_values(CategoryColumn::ProductLine));
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refresh();
    }

    /// Recompute the view after a selection change.
    pub fn refresh(&mut self) {
        self.view = self
            .dataset
            .as_ref()
            .map(|ds| render(ds, &self.selection, &self.config.dashboard.currency));
    }

    /// Toggle a single value in a column's filter.
    pub fn toggle_filter_value(&mut self, column: CategoryColumn, value: &str) {
        self.selection.toggle(column, value);
        self.refresh();
    }

    /// Select all values in a column.
    pub fn select_all(&mut self, column: CategoryColumn) {
        if let Some(ds) = &self.dataset {
            self.selection.select_all(column, ds);
            self.refresh();
        }
    }

    /// Deselect all values in a column, which lifts its restriction.
    pub fn select_none(&mut self, column: CategoryColumn) {
        self.selection.clear(column);
        self.refresh();
    }
}

// ---------------------------------------------------------------------------
// Cost predictor state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Introduction,
    Predict,
}

/// State of the cost-predictor window.
pub struct PredictorState {
    pub model_path: PathBuf,
    /// Loaded on first submit and kept afterwards.
    pub model: Option<RandomForest>,
    pub page: Page,
    pub input: Policyholder,
    /// Last estimate, or the error that prevented it.
    pub outcome: Option<Result<f64, String>>,
}

impl PredictorState {
    pub fn new(model_path: PathBuf) -> Self {
        Self {
            model_path,
            model: None,
            page: Page::default(),
            input: Policyholder::default(),
            outcome: None,
        }
    }

    /// Estimate the cost for the current form input.
    pub fn submit(&mut self) {
        let result = self.estimate();
        match &result {
            Ok(cost) => log::info!("estimated cost {cost:.2} for {:?}", self.input),
            Err(e) => log::error!("prediction failed: {e:#}"),
        }
        self.outcome = Some(result.map_err(|e| e.to_string()));
    }

    fn estimate(&mut self) -> Result<f64, PredictError> {
        if self.model.is_none() {
            let model = RandomForest::load(&self.model_path)?;
            log::info!(
                "loaded model with {} trees from {}",
                model.n_trees(),
                self.model_path.display()
            );
            self.model = Some(model);
        }
        match &self.model {
            Some(model) => estimate_cost(model, &self.input),
            None => Err(PredictError::Untrained),
        }
    }
}
