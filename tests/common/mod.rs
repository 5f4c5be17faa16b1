//! Shared fixtures for the integration tests

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use housing_dashboard::server::ServerConfig;
use housing_dashboard::training::PipelineConfig;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde_json::Value;
use std::io::Write;
use std::path::{Path, PathBuf};
use tower::ServiceExt;

pub const HEADER: &str = "No,X1 transaction date,X2 house age,X3 distance to the nearest MRT station,X4 number of convenience stores,X5 latitude,X6 longitude,Y house price of unit area";

/// Write `n` deterministic valuation rows to `dir/valuation.csv`
pub fn write_valuation_csv(dir: &Path, n: usize) -> PathBuf {
    let path = dir.join("valuation.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "{HEADER}").unwrap();

    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    for i in 0..n {
        let date = 2012.667 + rng.gen_range(0..12) as f64 / 12.0;
        let age = rng.gen_range(0.0..45.0);
        let distance = rng.gen_range(20.0..6500.0);
        let stores: u32 = rng.gen_range(0..=10);
        let lat = rng.gen_range(24.93..25.02);
        let lon = rng.gen_range(121.47..121.57);
        let price = 45.0 - 0.25 * age - 0.006 * distance + 1.2 * stores as f64
            + rng.gen_range(-3.0..3.0);
        writeln!(
            file,
            "{},{:.3},{:.1},{:.5},{},{:.5},{:.5},{:.1}",
            i + 1,
            date,
            age,
            distance,
            stores,
            lat,
            lon,
            price
        )
        .unwrap();
    }
    path
}

/// Server config pointing at `data_path`, with a small forest for speed
pub fn test_config(data_path: PathBuf, static_dir: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        data_path,
        static_dir,
        cors_origin: None,
        pipeline: PipelineConfig::new().with_n_estimators(10),
    }
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, bytes) = send(app, request).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

pub async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, bytes) = send(app, request).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

pub fn sample_prediction() -> Value {
    serde_json::json!({
        "transaction_date": 2013.25,
        "house_age": 10,
        "distance_to_mrt": 500,
        "num_convenience_stores": 5,
        "latitude": 24.98,
        "longitude": 121.53,
    })
}
