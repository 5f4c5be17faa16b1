//! Held-out evaluation and feature importance reporting

use crate::data::Feature;
use crate::error::{DashboardError, Result};
use crate::training::{ModelKind, Regressor, TrainedModels};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Regression metrics for one model on one dataset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    /// Mean of squared residuals
    pub mse: f64,
    /// Coefficient of determination
    pub r2: f64,
}

impl ModelMetrics {
    /// Compute regression metrics from true and predicted values
    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<Self> {
        Ok(Self {
            mse: mean_squared_error(y_true, y_pred)?,
            r2: r2_score(y_true, y_pred)?,
        })
    }
}

fn check_lengths(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<()> {
    if y_true.len() != y_pred.len() {
        return Err(DashboardError::Shape {
            expected: format!("{} predictions", y_true.len()),
            actual: format!("{} predictions", y_pred.len()),
        });
    }
    if y_true.is_empty() {
        return Err(DashboardError::Validation(
            "cannot evaluate on an empty set".to_string(),
        ));
    }
    Ok(())
}

fn sum_squared_residuals(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (p - t).powi(2))
        .sum()
}

/// Mean of squared residuals; zero only for an exact fit
pub fn mean_squared_error(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64> {
    check_lengths(y_true, y_pred)?;
    Ok(sum_squared_residuals(y_true, y_pred) / y_true.len() as f64)
}

/// `1 - SS_res / SS_tot`. A constant target scores 1.0 when matched exactly and 0.0 otherwise.
pub fn r2_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Result<f64> {
    check_lengths(y_true, y_pred)?;

    let n = y_true.len() as f64;
    let y_mean = y_true.sum() / n;
    let ss_tot: f64 = y_true.iter().map(|y| (y - y_mean).powi(2)).sum();
    let ss_res = sum_squared_residuals(y_true, y_pred);

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}

/// Predict `x` with `model` and score against `y`
pub fn evaluate(model: &dyn Regressor, x: &Array2<f64>, y: &Array1<f64>) -> Result<ModelMetrics> {
    let y_pred = model.predict(x)?;
    ModelMetrics::compute(y, &y_pred)
}

/// Held-out metrics of both served models
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub linear_regression: ModelMetrics,
    pub random_forest: ModelMetrics,
}

/// Recompute both models' metrics on the stored held-out split
pub fn performance(models: &TrainedModels) -> Result<PerformanceReport> {
    let split = models.split();
    let score = |kind: ModelKind| evaluate(models.get(kind), &split.x_test, &split.y_test);

    Ok(PerformanceReport {
        linear_regression: score(ModelKind::LinearRegression)?,
        random_forest: score(ModelKind::RandomForest)?,
    })
}

/// One feature's share of the model's total importance, in percent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Importance ranking for a model exposing importances, highest first.
/// Ties keep canonical feature order.
pub fn importance_report(model: &dyn Regressor) -> Result<Vec<FeatureImportance>> {
    if !model.is_fitted() {
        return Err(DashboardError::ModelNotTrained);
    }
    let importances = model.feature_importances().ok_or_else(|| {
        DashboardError::Computation(format!("{} does not expose feature importances", model.name()))
    })?;
    if importances.len() != Feature::COUNT {
        return Err(DashboardError::Shape {
            expected: format!("{} importances", Feature::COUNT),
            actual: format!("{} importances", importances.len()),
        });
    }

    let mut report: Vec<FeatureImportance> = Feature::ALL
        .iter()
        .zip(importances.iter())
        .map(|(feature, &value)| FeatureImportance {
            feature: feature.label(),
            importance: value * 100.0,
        })
        .collect();

    // Stable sort: equal scores stay in canonical order
    report.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    Ok(report)
}
