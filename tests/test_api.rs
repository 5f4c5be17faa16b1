//! Integration test: dashboard API over a trained state

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use common::*;
use housing_dashboard::server::{create_router, AppState};
use std::sync::Arc;

const N_RECORDS: usize = 80;

fn test_app() -> Router {
    let dir = tempfile::tempdir().unwrap();
    let data_path = write_valuation_csv(dir.path(), N_RECORDS);
    let config = test_config(data_path, dir.path().join("missing-static"));
    let state = AppState::bootstrap(config).unwrap();
    create_router(Arc::new(state))
}

// ============================================================================
// System
// ============================================================================

#[tokio::test]
async fn test_health_reports_readiness() {
    let (status, body) = get_json(test_app(), "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["data_loaded"], true);
    assert_eq!(body["models_trained"], true);
    assert_eq!(body["records"], N_RECORDS);
}

#[tokio::test]
async fn test_index_falls_back_to_embedded_page() {
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, bytes) = send(test_app(), request).await;
    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(bytes).unwrap();
    assert!(html.contains("Real Estate Valuation Dashboard"));
    assert!(html.contains("/api/predict"));
}

#[tokio::test]
async fn test_embedded_page_charts_every_data_view() {
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (_, bytes) = send(test_app(), request).await;
    let html = String::from_utf8(bytes).unwrap();

    for path in [
        "/api/data/summary",
        "/api/data/correlation",
        "/api/data/distribution",
        "/api/data/geographic",
        "/api/models/feature_importance",
    ] {
        assert!(html.contains(path), "page does not fetch {path}");
    }
    assert!(html.contains("/api/data/scatter/"));
    for feature in ["distance_to_mrt", "house_age", "num_convenience_stores"] {
        assert!(html.contains(&format!("scatter-{feature}")));
        let (status, body) = get_json(test_app(), &format!("/api/data/scatter/{feature}")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"].as_array().is_some_and(|points| !points.is_empty()));
    }
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let (status, body) = get_json(test_app(), "/api/does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], true);
}

#[tokio::test]
async fn test_wrong_method_is_json_405() {
    let (status, body) = get_json(test_app(), "/api/predict").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], true);
}

// ============================================================================
// Dataset views
// ============================================================================

#[tokio::test]
async fn test_summary() {
    let (status, body) = get_json(test_app(), "/api/data/summary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_records"], N_RECORDS);

    let stats = &body["price_stats"];
    let (min, max) = (stats["min"].as_f64().unwrap(), stats["max"].as_f64().unwrap());
    let mean = stats["mean"].as_f64().unwrap();
    let median = stats["median"].as_f64().unwrap();
    assert!(min <= mean && mean <= max);
    assert!(min <= median && median <= max);
    assert!(stats["std"].as_f64().unwrap() > 0.0);

    let features = &body["feature_stats"];
    for key in ["avg_house_age", "avg_distance_to_mrt", "avg_convenience_stores"] {
        assert!(features[key].is_number(), "missing {key}");
    }
}

#[tokio::test]
async fn test_correlation_covers_six_features() {
    let (status, body) = get_json(test_app(), "/api/data/correlation").await;
    assert_eq!(status, StatusCode::OK);

    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 6);
    assert_eq!(items[2]["feature"], "Distance To Mrt");
    for item in items {
        let r = item["correlation"].as_f64().unwrap();
        assert!((-1.0..=1.0).contains(&r));
    }
    // Distance drives price down in the fixture
    assert!(items[2]["correlation"].as_f64().unwrap() < 0.0);
}

#[tokio::test]
async fn test_scatter_known_feature() {
    let (status, body) = get_json(test_app(), "/api/data/scatter/house_age").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["feature"], "House Age");
    let points = body["data"].as_array().unwrap();
    assert_eq!(points.len(), N_RECORDS);
    assert!(points.iter().all(|p| p["x"].is_number() && p["y"].is_number()));
}

#[tokio::test]
async fn test_scatter_price_against_itself() {
    let (status, body) = get_json(test_app(), "/api/data/scatter/price_per_unit_area").await;
    assert_eq!(status, StatusCode::OK);
    for p in body["data"].as_array().unwrap() {
        assert_eq!(p["x"], p["y"]);
    }
}

#[tokio::test]
async fn test_scatter_unknown_feature_is_client_error() {
    let (status, body) = get_json(test_app(), "/api/data/scatter/not_a_feature").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], true);
    assert!(body["message"].as_str().unwrap().contains("not_a_feature"));
}

#[tokio::test]
async fn test_distribution_bins() {
    let (status, body) = get_json(test_app(), "/api/data/distribution").await;
    assert_eq!(status, StatusCode::OK);

    let bins = body.as_array().unwrap();
    assert_eq!(bins.len(), 20);
    let total: u64 = bins.iter().map(|b| b["count"].as_u64().unwrap()).sum();
    assert_eq!(total, N_RECORDS as u64);
    for pair in bins.windows(2) {
        assert_eq!(pair[0]["bin_end"], pair[1]["bin_start"]);
    }
}

#[tokio::test]
async fn test_geographic_one_entry_per_record() {
    let (status, body) = get_json(test_app(), "/api/data/geographic").await;
    assert_eq!(status, StatusCode::OK);

    let points = body.as_array().unwrap();
    assert_eq!(points.len(), N_RECORDS);
    for p in points {
        assert!(p["convenience_stores"].is_u64());
        for key in ["latitude", "longitude", "price", "house_age", "distance_to_mrt"] {
            assert!(p[key].is_number(), "missing {key}");
        }
    }
}

// ============================================================================
// Models
// ============================================================================

#[tokio::test]
async fn test_model_performance() {
    let (status, body) = get_json(test_app(), "/api/models/performance").await;
    assert_eq!(status, StatusCode::OK);
    for model in ["linear_regression", "random_forest"] {
        assert!(body[model]["mse"].as_f64().unwrap() >= 0.0);
        assert!(body[model]["r2"].as_f64().unwrap() <= 1.0);
    }
}

#[tokio::test]
async fn test_feature_importance_sums_to_100() {
    let (status, body) = get_json(test_app(), "/api/models/feature_importance").await;
    assert_eq!(status, StatusCode::OK);

    let items = body.as_array().unwrap();
    assert_eq!(items.len(), 6);
    let values: Vec<f64> = items.iter().map(|i| i["importance"].as_f64().unwrap()).collect();
    assert!(values.iter().all(|v| *v >= 0.0));
    assert!(values.windows(2).all(|w| w[0] >= w[1]));
    assert!((values.iter().sum::<f64>() - 100.0).abs() < 1e-6);
}

#[tokio::test]
async fn test_predict_fixed_input_is_finite_and_repeatable() {
    let app = test_app();
    let payload = sample_prediction().to_string();

    let (status, first) = post_json(app.clone(), "/api/predict", &payload).await;
    assert_eq!(status, StatusCode::OK);
    let (_, second) = post_json(app, "/api/predict", &payload).await;

    for key in ["linear_regression_prediction", "random_forest_prediction"] {
        assert!(first[key].as_f64().unwrap().is_finite());
        assert_eq!(first[key], second[key]);
    }
    assert_eq!(first["input_features"]["num_convenience_stores"], 5);
    assert_eq!(first["input_features"]["distance_to_mrt"], 500.0);
}

#[tokio::test]
async fn test_predict_missing_field_is_422() {
    let mut payload = sample_prediction();
    payload.as_object_mut().unwrap().remove("latitude");

    let (status, body) = post_json(test_app(), "/api/predict", &payload.to_string()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], true);
}

#[tokio::test]
async fn test_predict_wrong_type_is_422() {
    let mut payload = sample_prediction();
    payload["house_age"] = serde_json::json!("ten");

    let (status, _) = post_json(test_app(), "/api/predict", &payload.to_string()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_predict_negative_store_count_is_422() {
    let mut payload = sample_prediction();
    payload["num_convenience_stores"] = serde_json::json!(-2);

    let (status, _) = post_json(test_app(), "/api/predict", &payload.to_string()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_predict_malformed_json_is_422() {
    let (status, body) = post_json(test_app(), "/api/predict", "{not json").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], true);
}
