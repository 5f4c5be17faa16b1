//! Model training module
//!
//! Provides the modeling pipeline used by the dashboard:
//! - Seeded train/test split
//! - Ordinary least squares linear regression
//! - CART regression trees and the Random Forest built from them
//! - A training engine that fits both served models exactly once

mod config;
mod engine;
mod models;
pub mod decision_tree;
pub mod linear_models;
pub mod random_forest;
pub mod split;

pub use config::{PipelineConfig, DEFAULT_N_ESTIMATORS, DEFAULT_SEED, DEFAULT_TEST_FRACTION};
pub use decision_tree::{DecisionTree, TreeNode};
pub use engine::{ModelKind, TrainEngine, TrainedModels};
pub use linear_models::LinearRegression;
pub use models::Regressor;
pub use random_forest::RandomForest;
pub use split::{train_test_split, TrainTestSplit};
