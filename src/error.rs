//! Error types for the housing dashboard

use thiserror::Error;

/// Result type alias for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Main error type for the modeling pipeline and analytics views
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Data load error: {0}")]
    DataLoad(String),

    #[error("Invalid split: {0}")]
    InvalidSplit(String),

    #[error("Model not trained")]
    ModelNotTrained,

    #[error("Model already fitted")]
    AlreadyFitted,

    #[error("Models not ready: {0}")]
    ModelsNotReady(String),

    #[error("Data not loaded")]
    DataNotReady,

    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    Shape { expected: String, actual: String },

    #[error("Computation error: {0}")]
    Computation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    /// Whether the error means shared state is not initialized yet
    pub fn is_readiness(&self) -> bool {
        matches!(
            self,
            DashboardError::ModelNotTrained
                | DashboardError::ModelsNotReady(_)
                | DashboardError::DataNotReady
        )
    }
}

impl From<polars::error::PolarsError> for DashboardError {
    fn from(err: polars::error::PolarsError) -> Self {
        DashboardError::DataLoad(err.to_string())
    }
}

impl From<ndarray::ShapeError> for DashboardError {
    fn from(err: ndarray::ShapeError) -> Self {
        DashboardError::Shape {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}
