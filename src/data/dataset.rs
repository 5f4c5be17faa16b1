//! Typed records, canonical feature order and the immutable dataset

use crate::error::{DashboardError, Result};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of columns expected in the source table
pub const SOURCE_WIDTH: usize = 8;

/// Canonical names applied positionally to the source columns
pub const SOURCE_COLUMNS: [&str; SOURCE_WIDTH] = [
    "id",
    "transaction_date",
    "house_age",
    "distance_to_mrt",
    "num_convenience_stores",
    "latitude",
    "longitude",
    "price_per_unit_area",
];

/// Name of the target column
pub const TARGET_NAME: &str = "price_per_unit_area";

/// Model input features, declared in canonical order.
///
/// The discriminant is the column index inside every feature matrix, so
/// `Feature::ALL` and `Feature::index` must stay in sync with the training data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    TransactionDate,
    HouseAge,
    DistanceToMrt,
    NumConvenienceStores,
    Latitude,
    Longitude,
}

impl Feature {
    /// All features in canonical order
    pub const ALL: [Feature; 6] = [
        Feature::TransactionDate,
        Feature::HouseAge,
        Feature::DistanceToMrt,
        Feature::NumConvenienceStores,
        Feature::Latitude,
        Feature::Longitude,
    ];

    /// Number of model features
    pub const COUNT: usize = Self::ALL.len();

    /// Column position in a feature matrix
    pub fn index(self) -> usize {
        self as usize
    }

    /// snake_case column name
    pub fn name(self) -> &'static str {
        match self {
            Feature::TransactionDate => "transaction_date",
            Feature::HouseAge => "house_age",
            Feature::DistanceToMrt => "distance_to_mrt",
            Feature::NumConvenienceStores => "num_convenience_stores",
            Feature::Latitude => "latitude",
            Feature::Longitude => "longitude",
        }
    }

    /// Human-readable label, e.g. "Distance To Mrt"
    pub fn label(self) -> String {
        title_case(self.name())
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A queryable numeric column: one of the features or the target price
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Feature(Feature),
    Price,
}

impl Column {
    /// Resolve a column by its snake_case name
    pub fn parse(name: &str) -> Result<Self> {
        if name == TARGET_NAME {
            return Ok(Column::Price);
        }
        Feature::from_name(name)
            .map(Column::Feature)
            .ok_or_else(|| DashboardError::UnknownFeature(name.to_string()))
    }

    pub fn name(self) -> &'static str {
        match self {
            Column::Feature(f) => f.name(),
            Column::Price => TARGET_NAME,
        }
    }

    pub fn label(self) -> String {
        title_case(self.name())
    }
}

/// Turn a snake_case name into space separated capitalized words
pub fn title_case(name: &str) -> String {
    name.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// One real-estate transaction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub transaction_date: f64,
    pub house_age: f64,
    pub distance_to_mrt: f64,
    pub num_convenience_stores: u32,
    pub latitude: f64,
    pub longitude: f64,
    pub price_per_unit_area: f64,
}

impl Record {
    pub fn feature(&self, feature: Feature) -> f64 {
        match feature {
            Feature::TransactionDate => self.transaction_date,
            Feature::HouseAge => self.house_age,
            Feature::DistanceToMrt => self.distance_to_mrt,
            Feature::NumConvenienceStores => f64::from(self.num_convenience_stores),
            Feature::Latitude => self.latitude,
            Feature::Longitude => self.longitude,
        }
    }

    pub fn value(&self, column: Column) -> f64 {
        match column {
            Column::Feature(f) => self.feature(f),
            Column::Price => self.price_per_unit_area,
        }
    }

    pub fn features(&self) -> FeatureVector {
        FeatureVector(Feature::ALL.map(|f| self.feature(f)))
    }
}

/// The six model inputs in canonical order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector(pub [f64; Feature::COUNT]);

impl FeatureVector {
    pub fn get(&self, feature: Feature) -> f64 {
        self.0[feature.index()]
    }

    /// Single-row matrix suitable for `Regressor::predict`
    pub fn to_row(&self) -> Array2<f64> {
        Array2::from_shape_fn((1, Feature::COUNT), |(_, c)| self.0[c])
    }
}

/// Ordered, immutable collection of records loaded once at startup
#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<Record>,
}

impl Dataset {
    /// Build a dataset from already typed records
    pub fn from_records(records: Vec<Record>) -> Result<Self> {
        if records.is_empty() {
            return Err(DashboardError::DataLoad("dataset has no rows".to_string()));
        }
        Ok(Self { records })
    }

    /// Build a dataset from a raw frame, mapping its 8 columns positionally
    /// onto the canonical names.
    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        if df.width() != SOURCE_WIDTH {
            return Err(DashboardError::DataLoad(format!(
                "expected {} columns, found {}",
                SOURCE_WIDTH,
                df.width()
            )));
        }

        let columns: Vec<Vec<f64>> = (0..SOURCE_WIDTH)
            .map(|idx| column_values(df, idx))
            .collect::<Result<_>>()?;

        let records = (0..df.height())
            .map(|row| {
                let stores = columns[4][row];
                if stores < 0.0 || stores.fract() != 0.0 || stores > f64::from(u32::MAX) {
                    return Err(DashboardError::DataLoad(format!(
                        "row {}: num_convenience_stores must be a non-negative whole number, got {}",
                        row, stores
                    )));
                }
                Ok(Record {
                    id: columns[0][row] as i64,
                    transaction_date: columns[1][row],
                    house_age: columns[2][row],
                    distance_to_mrt: columns[3][row],
                    num_convenience_stores: stores as u32,
                    latitude: columns[5][row],
                    longitude: columns[6][row],
                    price_per_unit_area: columns[7][row],
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::from_records(records)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows x 6 matrix in canonical feature order
    pub fn feature_matrix(&self) -> Array2<f64> {
        Array2::from_shape_fn((self.records.len(), Feature::COUNT), |(r, c)| {
            self.records[r].feature(Feature::ALL[c])
        })
    }

    /// Price per unit area for every row
    pub fn target(&self) -> Array1<f64> {
        self.records.iter().map(|r| r.price_per_unit_area).collect()
    }

    /// Every value of one column in dataset order
    pub fn column(&self, column: Column) -> Vec<f64> {
        self.records.iter().map(|r| r.value(column)).collect()
    }
}

fn column_values(df: &DataFrame, idx: usize) -> Result<Vec<f64>> {
    let name = SOURCE_COLUMNS[idx];
    let column = df
        .select_at_idx(idx)
        .ok_or_else(|| DashboardError::DataLoad(format!("missing column {}", name)))?;
    let column_f64 = column.cast(&DataType::Float64)?;
    column_f64
        .f64()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| match value {
            Some(v) if v.is_finite() => Ok(v),
            _ => Err(DashboardError::DataLoad(format!(
                "row {}: column {} is missing or not numeric",
                row, name
            ))),
        })
        .collect()
}
