//! Real-estate valuation dataset
//!
//! Loading of the tabular source and the typed, immutable in-memory view
//! every other module reads from.

pub mod dataset;
pub mod loader;

pub use dataset::{Column, Dataset, Feature, FeatureVector, Record};
pub use loader::DataLoader;
