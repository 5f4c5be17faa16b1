//! Read-only projections of the dataset
//!
//! Everything here is derived from the loaded records alone, never from the
//! models. [`AnalyticsViews::build`] computes all projections once at startup
//! since the dataset never changes afterwards.

use crate::data::{Column, Dataset, Feature};
use crate::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Number of price histogram bins
pub const HISTOGRAM_BINS: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceStats {
    pub mean: f64,
    pub median: f64,
    pub min: f64,
    pub max: f64,
    /// Sample standard deviation (n - 1)
    pub std: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureStats {
    pub avg_house_age: f64,
    pub avg_distance_to_mrt: f64,
    pub avg_convenience_stores: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSummary {
    pub total_records: usize,
    pub price_stats: PriceStats,
    pub feature_stats: FeatureStats,
}

/// Pearson correlation of one feature with price; `None` when undefined
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCorrelation {
    pub feature: String,
    pub correlation: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterSeries {
    pub feature: String,
    pub data: Vec<ScatterPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub bin_start: f64,
    pub bin_end: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub price: f64,
    pub house_age: f64,
    pub distance_to_mrt: f64,
    pub convenience_stores: u32,
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Sample standard deviation; 0.0 for fewer than two values
fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Pearson correlation coefficient, `None` for mismatched, short or constant input
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let (mx, my) = (mean(x), mean(y));

    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (a, b) in x.iter().zip(y) {
        let (dx, dy) = (a - mx, b - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }

    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    Some((sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0))
}

/// Equal-width histogram over the observed range, last bin closed on the right.
/// A degenerate range is widened by 0.5 on each side.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if bins == 0 {
        return Vec::new();
    }

    let (mut lo, mut hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if values.is_empty() {
        (lo, hi) = (0.0, 1.0);
    } else if lo == hi {
        lo -= 0.5;
        hi += 0.5;
    }

    let width = (hi - lo) / bins as f64;
    let edges: Vec<f64> = (0..=bins)
        .map(|i| if i == bins { hi } else { lo + i as f64 * width })
        .collect();

    let mut counts = vec![0usize; bins];
    for &v in values {
        let mut idx = (((v - lo) / width) as usize).min(bins - 1);
        // Correct float rounding against the actual edges
        if v < edges[idx] && idx > 0 {
            idx -= 1;
        } else if idx + 1 < bins && v >= edges[idx + 1] {
            idx += 1;
        }
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            bin_start: edges[i],
            bin_end: edges[i + 1],
            count,
        })
        .collect()
}

pub fn summary(dataset: &Dataset) -> DataSummary {
    let prices = dataset.column(Column::Price);
    let (min, max) = prices
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    DataSummary {
        total_records: dataset.len(),
        price_stats: PriceStats {
            mean: mean(&prices),
            median: median(&prices),
            min,
            max,
            std: sample_std(&prices),
        },
        feature_stats: FeatureStats {
            avg_house_age: mean(&dataset.column(Column::Feature(Feature::HouseAge))),
            avg_distance_to_mrt: mean(&dataset.column(Column::Feature(Feature::DistanceToMrt))),
            avg_convenience_stores: mean(&dataset.column(Column::Feature(Feature::NumConvenienceStores))),
        },
    }
}

/// Correlation of every feature with price, in canonical order
pub fn correlation(dataset: &Dataset) -> Vec<FeatureCorrelation> {
    let prices = dataset.column(Column::Price);
    Feature::ALL
        .iter()
        .map(|&feature| FeatureCorrelation {
            feature: feature.label(),
            correlation: pearson(&dataset.column(Column::Feature(feature)), &prices),
        })
        .collect()
}

/// (value, price) pairs for one column, in dataset order
pub fn scatter(dataset: &Dataset, column: Column) -> ScatterSeries {
    ScatterSeries {
        feature: column.label(),
        data: dataset
            .records()
            .iter()
            .map(|r| ScatterPoint {
                x: r.value(column),
                y: r.price_per_unit_area,
            })
            .collect(),
    }
}

pub fn distribution(dataset: &Dataset) -> Vec<HistogramBin> {
    histogram(&dataset.column(Column::Price), HISTOGRAM_BINS)
}

pub fn geographic(dataset: &Dataset) -> Vec<GeoPoint> {
    dataset
        .records()
        .iter()
        .map(|r| GeoPoint {
            latitude: r.latitude,
            longitude: r.longitude,
            price: r.price_per_unit_area,
            house_age: r.house_age,
            distance_to_mrt: r.distance_to_mrt,
            convenience_stores: r.num_convenience_stores,
        })
        .collect()
}

/// Columns a scatter view can be requested for
const SCATTER_COLUMNS: [Column; 7] = [
    Column::Feature(Feature::TransactionDate),
    Column::Feature(Feature::HouseAge),
    Column::Feature(Feature::DistanceToMrt),
    Column::Feature(Feature::NumConvenienceStores),
    Column::Feature(Feature::Latitude),
    Column::Feature(Feature::Longitude),
    Column::Price,
];

/// All dataset projections, computed once
#[derive(Debug, Clone)]
pub struct AnalyticsViews {
    summary: DataSummary,
    correlation: Vec<FeatureCorrelation>,
    scatter: Vec<(Column, ScatterSeries)>,
    distribution: Vec<HistogramBin>,
    geographic: Vec<GeoPoint>,
}

impl AnalyticsViews {
    pub fn build(dataset: &Dataset) -> Self {
        let views = Self {
            summary: summary(dataset),
            correlation: correlation(dataset),
            scatter: SCATTER_COLUMNS
                .iter()
                .map(|&column| (column, scatter(dataset, column)))
                .collect(),
            distribution: distribution(dataset),
            geographic: geographic(dataset),
        };
        info!(records = dataset.len(), "Analytics views precomputed");
        views
    }

    pub fn summary(&self) -> &DataSummary {
        &self.summary
    }

    pub fn correlation(&self) -> &[FeatureCorrelation] {
        &self.correlation
    }

    /// Scatter series for a column name; unknown names are `UnknownFeature`
    pub fn scatter(&self, name: &str) -> Result<&ScatterSeries> {
        let column = Column::parse(name)?;
        self.scatter
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, series)| series)
            .ok_or_else(|| {
                DashboardError::Computation(format!("no scatter view for {}", column.name()))
            })
    }

    pub fn distribution(&self) -> &[HistogramBin] {
        &self.distribution
    }

    pub fn geographic(&self) -> &[GeoPoint] {
        &self.geographic
    }
}
