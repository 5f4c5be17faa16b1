//! Shared regressor interface

use crate::error::{DashboardError, Result};
use ndarray::{Array1, Array2};

/// Common fit/predict contract for every regressor variant
pub trait Regressor: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// Fit the model once; a second call fails with `AlreadyFitted`
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// One prediction per input row, in input row order
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    fn is_fitted(&self) -> bool;

    /// Normalized per-feature importances (sum to 1), if the model has them
    fn feature_importances(&self) -> Option<Array1<f64>> {
        None
    }
}

/// Validate training input before any model state changes
pub(crate) fn check_fit_input(x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(DashboardError::Shape {
            expected: format!("y length = {}", x.nrows()),
            actual: format!("y length = {}", y.len()),
        });
    }
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(DashboardError::Validation(
            "cannot fit on an empty matrix".to_string(),
        ));
    }
    Ok(())
}

/// Validate prediction input against the width the model was fitted on
pub(crate) fn check_predict_input(x: &Array2<f64>, n_features: usize) -> Result<()> {
    if x.ncols() != n_features {
        return Err(DashboardError::Shape {
            expected: format!("{} features", n_features),
            actual: format!("{} features", x.ncols()),
        });
    }
    Ok(())
}
