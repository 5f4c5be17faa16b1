//! Application state management
//!
//! Built once before the listener starts and read-only afterwards, so handlers
//! share it through an `Arc` without locks.

use std::time::Instant;
use tracing::{error, info};

use crate::analytics::AnalyticsViews;
use crate::data::{DataLoader, Dataset};
use crate::error::{DashboardError, Result};
use crate::evaluation::performance;
use crate::training::{TrainEngine, TrainedModels};

use super::ServerConfig;

/// Application state shared across handlers
pub struct AppState {
    pub config: ServerConfig,
    dataset: Option<Dataset>,
    views: Option<AnalyticsViews>,
    models: Option<TrainedModels>,
}

impl AppState {
    /// Load the dataset, precompute the views and train both models.
    ///
    /// Load and split failures abort startup. Any other training failure is
    /// logged and leaves the models absent.
    pub fn bootstrap(config: ServerConfig) -> Result<Self> {
        let start = Instant::now();
        let dataset = DataLoader::new().load_dataset(&config.data_path)?;

        let models = match TrainEngine::new(config.pipeline.clone()).train(&dataset) {
            Ok(models) => {
                log_performance(&models);
                Some(models)
            }
            Err(e @ DashboardError::InvalidSplit(_)) => return Err(e),
            Err(e) => {
                error!(error = %e, "Model training failed, model endpoints will report not ready");
                None
            }
        };

        let state = Self::from_parts(config, Some(dataset), models);
        info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            models_trained = state.models_trained(),
            "Application state ready"
        );
        Ok(state)
    }

    /// Assemble a state from already built parts
    pub fn from_parts(
        config: ServerConfig,
        dataset: Option<Dataset>,
        models: Option<TrainedModels>,
    ) -> Self {
        let views = dataset.as_ref().map(AnalyticsViews::build);
        Self {
            config,
            dataset,
            views,
            models,
        }
    }

    pub fn dataset(&self) -> Result<&Dataset> {
        self.dataset.as_ref().ok_or(DashboardError::DataNotReady)
    }

    pub fn views(&self) -> Result<&AnalyticsViews> {
        self.views.as_ref().ok_or(DashboardError::DataNotReady)
    }

    pub fn models(&self) -> Result<&TrainedModels> {
        self.models
            .as_ref()
            .ok_or_else(|| DashboardError::ModelsNotReady("models have not been trained".to_string()))
    }

    pub fn data_loaded(&self) -> bool {
        self.dataset.is_some()
    }

    pub fn models_trained(&self) -> bool {
        self.models.is_some()
    }
}

fn log_performance(models: &TrainedModels) {
    match performance(models) {
        Ok(report) => info!(
            linear_mse = report.linear_regression.mse,
            linear_r2 = report.linear_regression.r2,
            forest_mse = report.random_forest.mse,
            forest_r2 = report.random_forest.r2,
            "Held-out performance"
        ),
        Err(e) => error!(error = %e, "Could not evaluate trained models"),
    }
}
