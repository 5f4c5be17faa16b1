//! Training engine: split once, fit both regressors once

use super::config::PipelineConfig;
use super::linear_models::LinearRegression;
use super::models::Regressor;
use super::random_forest::RandomForest;
use super::split::{train_test_split, TrainTestSplit};
use crate::data::Dataset;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

/// The two regressor variants served by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    LinearRegression,
    RandomForest,
}

impl ModelKind {
    pub const ALL: [ModelKind; 2] = [ModelKind::LinearRegression, ModelKind::RandomForest];

    pub fn key(self) -> &'static str {
        match self {
            ModelKind::LinearRegression => "linear_regression",
            ModelKind::RandomForest => "random_forest",
        }
    }
}

/// Held-out split plus both fitted models, immutable after training
#[derive(Debug, Clone)]
pub struct TrainedModels {
    split: TrainTestSplit,
    linear: LinearRegression,
    forest: RandomForest,
}

impl TrainedModels {
    pub fn split(&self) -> &TrainTestSplit {
        &self.split
    }

    pub fn linear(&self) -> &LinearRegression {
        &self.linear
    }

    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    /// Uniform access to either variant
    pub fn get(&self, kind: ModelKind) -> &dyn Regressor {
        match kind {
            ModelKind::LinearRegression => &self.linear,
            ModelKind::RandomForest => &self.forest,
        }
    }
}

/// Runs the modeling pipeline: split, fit linear, fit forest
#[derive(Debug, Clone, Default)]
pub struct TrainEngine {
    config: PipelineConfig,
}

impl TrainEngine {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Partition the dataset and fit both models on the training rows
    pub fn train(&self, dataset: &Dataset) -> Result<TrainedModels> {
        let x = dataset.feature_matrix();
        let y = dataset.target();

        let split = train_test_split(&x, &y, self.config.test_fraction, self.config.seed)?;
        info!(
            train_rows = split.n_train(),
            test_rows = split.n_test(),
            seed = self.config.seed,
            "Dataset split"
        );

        let mut linear = LinearRegression::new();
        fit_timed(&mut linear, &split)?;

        let mut forest = RandomForest::new(self.config.n_estimators).with_random_state(self.config.seed);
        fit_timed(&mut forest, &split)?;

        Ok(TrainedModels { split, linear, forest })
    }
}

fn fit_timed(model: &mut dyn Regressor, split: &TrainTestSplit) -> Result<()> {
    let start = Instant::now();
    model.fit(&split.x_train, &split.y_train)?;
    info!(
        model = model.name(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Model trained"
    );
    Ok(())
}
