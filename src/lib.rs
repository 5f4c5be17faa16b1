//! Housing Dashboard - Real-estate valuation analytics and prediction
//!
//! This crate loads a fixed real-estate transaction dataset, fits a linear
//! model and a random forest on a seeded split, and serves descriptive views
//! and price estimates over HTTP.
//!
//! # Modules
//!
//! ## Modeling
//! - [`data`] - Dataset loading and the typed record view
//! - [`training`] - Seeded split, linear regression, random forest
//! - [`evaluation`] - Held-out metrics and feature importance
//! - [`inference`] - Single-record predictions from both models
//! - [`analytics`] - Summary, correlation, scatter, histogram and map views
//!
//! ## Services
//! - [`server`] - HTTP server with REST API
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Modeling
pub mod data;
pub mod training;
pub mod evaluation;
pub mod inference;
pub mod analytics;

// Services
pub mod server;
pub mod cli;

pub use error::{DashboardError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{DashboardError, Result};

    // Data
    pub use crate::data::{Column, DataLoader, Dataset, Feature, Record};

    // Training
    pub use crate::training::{ModelKind, PipelineConfig, Regressor, TrainEngine, TrainedModels};

    // Evaluation
    pub use crate::evaluation::{importance_report, performance, ModelMetrics, PerformanceReport};

    // Inference
    pub use crate::inference::{PredictionRequest, PredictionResult, PredictionService};

    // Analytics
    pub use crate::analytics::AnalyticsViews;

    // Server
    pub use crate::server::{create_router, AppState, ServerConfig};
}
