//! Single-record price prediction against both fitted models

use crate::data::{Feature, FeatureVector};
use crate::error::{DashboardError, Result};
use crate::training::{ModelKind, TrainedModels};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Prediction input: the six features by name.
///
/// Values are not range-checked; out-of-range inputs are extrapolated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub transaction_date: f64,
    pub house_age: f64,
    pub distance_to_mrt: f64,
    pub num_convenience_stores: u32,
    pub latitude: f64,
    pub longitude: f64,
}

impl PredictionRequest {
    /// Features in canonical order
    pub fn features(&self) -> FeatureVector {
        FeatureVector(Feature::ALL.map(|feature| match feature {
            Feature::TransactionDate => self.transaction_date,
            Feature::HouseAge => self.house_age,
            Feature::DistanceToMrt => self.distance_to_mrt,
            Feature::NumConvenienceStores => f64::from(self.num_convenience_stores),
            Feature::Latitude => self.latitude,
            Feature::Longitude => self.longitude,
        }))
    }
}

/// Both point estimates plus an echo of the input
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub linear_regression_prediction: f64,
    pub random_forest_prediction: f64,
    pub input_features: PredictionRequest,
}

/// Predicts with both fitted models
#[derive(Debug, Clone, Copy)]
pub struct PredictionService<'a> {
    models: &'a TrainedModels,
}

impl<'a> PredictionService<'a> {
    pub fn new(models: &'a TrainedModels) -> Self {
        Self { models }
    }

    /// Build a service from possibly missing models
    pub fn try_new(models: Option<&'a TrainedModels>) -> Result<Self> {
        models
            .map(Self::new)
            .ok_or_else(|| DashboardError::ModelsNotReady("models not trained".to_string()))
    }

    pub fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult> {
        let row = request.features().to_row();

        let estimate = |kind: ModelKind| -> Result<f64> {
            let predictions = self.models.get(kind).predict(&row)?;
            predictions.first().copied().ok_or_else(|| {
                DashboardError::Computation(format!("{} returned no prediction", kind.key()))
            })
        };

        let result = PredictionResult {
            linear_regression_prediction: estimate(ModelKind::LinearRegression)?,
            random_forest_prediction: estimate(ModelKind::RandomForest)?,
            input_features: *request,
        };
        debug!(
            linear = result.linear_regression_prediction,
            forest = result.random_forest_prediction,
            "Prediction served"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::fixtures::synthetic_dataset;
    use crate::training::{PipelineConfig, Regressor, TrainEngine};

    fn sample_request() -> PredictionRequest {
        PredictionRequest {
            transaction_date: 2013.25,
            house_age: 10.0,
            distance_to_mrt: 500.0,
            num_convenience_stores: 5,
            latitude: 24.98,
            longitude: 121.53,
        }
    }

    fn trained() -> TrainedModels {
        TrainEngine::new(PipelineConfig::new().with_n_estimators(10))
            .train(&synthetic_dataset(60))
            .unwrap()
    }

    #[test]
    fn test_features_in_canonical_order() {
        let v = sample_request().features();
        assert_eq!(v.0, [2013.25, 10.0, 500.0, 5.0, 24.98, 121.53]);
        assert_eq!(v.get(Feature::DistanceToMrt), 500.0);
    }

    #[test]
    fn test_predict_is_finite_and_repeatable() {
        let models = trained();
        let service = PredictionService::new(&models);

        let a = service.predict(&sample_request()).unwrap();
        let b = service.predict(&sample_request()).unwrap();

        assert!(a.linear_regression_prediction.is_finite());
        assert!(a.random_forest_prediction.is_finite());
        assert_eq!(a, b);
        assert_eq!(a.input_features, sample_request());
    }

    #[test]
    fn test_matches_direct_model_call() {
        let models = trained();
        let request = sample_request();
        let result = PredictionService::new(&models).predict(&request).unwrap();

        let row = request.features().to_row();
        assert_eq!(result.linear_regression_prediction, models.linear().predict(&row).unwrap()[0]);
        assert_eq!(result.random_forest_prediction, models.forest().predict(&row).unwrap()[0]);
    }

    #[test]
    fn test_out_of_range_input_is_extrapolated() {
        let models = trained();
        let request = PredictionRequest {
            house_age: -50.0,
            distance_to_mrt: 1.0e6,
            ..sample_request()
        };
        let result = PredictionService::new(&models).predict(&request).unwrap();
        assert!(result.linear_regression_prediction.is_finite());
    }

    #[test]
    fn test_not_ready_without_models() {
        assert!(matches!(
            PredictionService::try_new(None),
            Err(DashboardError::ModelsNotReady(_))
        ));
    }

    #[test]
    fn test_request_deserialization() {
        let request: PredictionRequest = serde_json::from_str(
            r#"{"transaction_date":2013.25,"house_age":10,"distance_to_mrt":500,"num_convenience_stores":5,"latitude":24.98,"longitude":121.53}"#,
        )
        .unwrap();
        assert_eq!(request, sample_request());

        let missing = serde_json::from_str::<PredictionRequest>(r#"{"house_age":10}"#);
        assert!(missing.is_err());
        let negative = serde_json::from_str::<PredictionRequest>(
            r#"{"transaction_date":2013.25,"house_age":10,"distance_to_mrt":500,"num_convenience_stores":-1,"latitude":24.98,"longitude":121.53}"#,
        );
        assert!(negative.is_err());
    }
}
