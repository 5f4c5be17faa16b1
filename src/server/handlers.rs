//! HTTP request handlers

use std::sync::Arc;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Html,
    Json,
};
use serde_json::{json, Value};
use tracing::debug;

use crate::analytics::{DataSummary, FeatureCorrelation, GeoPoint, HistogramBin, ScatterSeries};
use crate::evaluation::{importance_report, performance, FeatureImportance, PerformanceReport};
use crate::inference::{PredictionRequest, PredictionResult, PredictionService};

use super::error::{Result, ServerError};
use super::state::AppState;

// ============================================================================
// Dataset Views
// ============================================================================

pub async fn data_summary(State(state): State<Arc<AppState>>) -> Result<Json<DataSummary>> {
    Ok(Json(state.views()?.summary().clone()))
}

pub async fn data_correlation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<FeatureCorrelation>>> {
    Ok(Json(state.views()?.correlation().to_vec()))
}

pub async fn data_scatter(
    State(state): State<Arc<AppState>>,
    Path(feature): Path<String>,
) -> Result<Json<ScatterSeries>> {
    let series = state.views()?.scatter(&feature)?;
    Ok(Json(series.clone()))
}

pub async fn data_distribution(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<HistogramBin>>> {
    Ok(Json(state.views()?.distribution().to_vec()))
}

pub async fn data_geographic(State(state): State<Arc<AppState>>) -> Result<Json<Vec<GeoPoint>>> {
    Ok(Json(state.views()?.geographic().to_vec()))
}

// ============================================================================
// Model Handlers
// ============================================================================

pub async fn model_performance(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PerformanceReport>> {
    Ok(Json(performance(state.models()?)?))
}

pub async fn feature_importance(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<FeatureImportance>>> {
    Ok(Json(importance_report(state.models()?.forest())?))
}

pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<PredictionRequest>, JsonRejection>,
) -> Result<Json<PredictionResult>> {
    let Json(request) = payload.map_err(|rejection| {
        debug!(detail = %rejection.body_text(), "Rejected prediction payload");
        ServerError::Unprocessable(rejection.body_text())
    })?;

    let service = PredictionService::new(state.models()?);
    Ok(Json(service.predict(&request)?))
}

// ============================================================================
// System Handlers
// ============================================================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "data_loaded": state.data_loaded(),
        "models_trained": state.models_trained(),
        "records": state.dataset().map(|d| d.len()).unwrap_or(0),
    }))
}

// ============================================================================
// UI Handler
// ============================================================================

/// Serve `index.html` from the static directory, or the embedded page
pub async fn serve_index(State(state): State<Arc<AppState>>) -> Html<String> {
    let index = state.config.static_dir.join("index.html");
    match tokio::fs::read_to_string(&index).await {
        Ok(page) => Html(page),
        Err(_) => Html(EMBEDDED_INDEX_HTML.to_string()),
    }
}

const EMBEDDED_INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Real Estate Valuation Dashboard</title>
    <script src="https://cdn.jsdelivr.net/npm/chart.js"></script>
    <script src="https://cdn.tailwindcss.com"></script>
</head>
<body class="bg-gray-900 text-gray-100 min-h-screen">
    <header class="bg-gray-800 border-b border-gray-700 px-6 py-4">
        <h1 class="text-xl font-bold">Real Estate Valuation Dashboard</h1>
    </header>
    <main class="p-6 grid grid-cols-2 gap-6">
        <section class="bg-gray-800 rounded-lg p-6">
            <h2 class="text-lg font-semibold mb-4">Summary</h2>
            <div id="summary" class="grid grid-cols-3 gap-3 text-sm"></div>
        </section>
        <section class="bg-gray-800 rounded-lg p-6">
            <h2 class="text-lg font-semibold mb-4">Model Performance</h2>
            <div id="performance" class="text-sm"></div>
        </section>
        <section class="bg-gray-800 rounded-lg p-6">
            <h2 class="text-lg font-semibold mb-4">Price Distribution</h2>
            <canvas id="distribution"></canvas>
        </section>
        <section class="bg-gray-800 rounded-lg p-6">
            <h2 class="text-lg font-semibold mb-4">Feature Importance</h2>
            <canvas id="importance"></canvas>
        </section>
        <section class="bg-gray-800 rounded-lg p-6">
            <h2 class="text-lg font-semibold mb-4">Correlation with Price</h2>
            <canvas id="correlation"></canvas>
        </section>
        <section class="bg-gray-800 rounded-lg p-6">
            <h2 class="text-lg font-semibold mb-4">Locations by Price</h2>
            <canvas id="geographic"></canvas>
        </section>
        <section class="bg-gray-800 rounded-lg p-6 col-span-2 grid grid-cols-3 gap-6">
            <div><h2 class="text-lg font-semibold mb-4">Distance to MRT vs Price</h2><canvas id="scatter-distance_to_mrt"></canvas></div>
            <div><h2 class="text-lg font-semibold mb-4">House Age vs Price</h2><canvas id="scatter-house_age"></canvas></div>
            <div><h2 class="text-lg font-semibold mb-4">Convenience Stores vs Price</h2><canvas id="scatter-num_convenience_stores"></canvas></div>
        </section>
        <section class="bg-gray-800 rounded-lg p-6 col-span-2">
            <h2 class="text-lg font-semibold mb-4">Predict Price</h2>
            <form id="predict-form" class="grid grid-cols-3 gap-3 text-sm">
                <input name="transaction_date" value="2013.25" class="bg-gray-700 rounded p-2">
                <input name="house_age" value="10" class="bg-gray-700 rounded p-2">
                <input name="distance_to_mrt" value="500" class="bg-gray-700 rounded p-2">
                <input name="num_convenience_stores" value="5" class="bg-gray-700 rounded p-2">
                <input name="latitude" value="24.98" class="bg-gray-700 rounded p-2">
                <input name="longitude" value="121.53" class="bg-gray-700 rounded p-2">
                <button class="col-span-3 px-6 py-2 bg-blue-600 hover:bg-blue-700 rounded">Predict</button>
            </form>
            <div id="prediction" class="mt-4 text-sm"></div>
        </section>
    </main>
    <script>
        const get = (path) => fetch(path).then(r => r.json());
        get('/api/data/summary').then(s => {
            document.getElementById('summary').innerHTML = [
                ['Records', s.total_records],
                ['Mean price', s.price_stats.mean.toFixed(2)],
                ['Median price', s.price_stats.median.toFixed(2)],
            ].map(([k, v]) => `<div class="bg-gray-700 p-3 rounded"><div class="text-xl font-bold">${v}</div><div class="text-gray-400">${k}</div></div>`).join('');
        });
        get('/api/models/performance').then(p => {
            if (p.error) { document.getElementById('performance').textContent = p.message; return; }
            document.getElementById('performance').innerHTML =
                `Linear regression: MSE ${p.linear_regression.mse.toFixed(2)}, R² ${p.linear_regression.r2.toFixed(3)}<br>` +
                `Random forest: MSE ${p.random_forest.mse.toFixed(2)}, R² ${p.random_forest.r2.toFixed(3)}`;
        });
        get('/api/data/distribution').then(bins => new Chart(document.getElementById('distribution'), {
            type: 'bar',
            data: { labels: bins.map(b => b.bin_start.toFixed(1)), datasets: [{ label: 'Count', data: bins.map(b => b.count) }] },
        }));
        get('/api/data/correlation').then(rows => new Chart(document.getElementById('correlation'), {
            type: 'bar',
            options: { indexAxis: 'y', scales: { x: { min: -1, max: 1 } } },
            data: { labels: rows.map(r => r.feature), datasets: [{ label: 'r', data: rows.map(r => r.correlation) }] },
        }));
        ['distance_to_mrt', 'house_age', 'num_convenience_stores'].forEach(feature =>
            get(`/api/data/scatter/${feature}`).then(s => new Chart(document.getElementById(`scatter-${feature}`), {
                type: 'scatter',
                options: { plugins: { legend: { display: false } } },
                data: { datasets: [{ label: s.feature, data: s.data, pointRadius: 2 }] },
            })));
        get('/api/data/geographic').then(points => {
            const max = Math.max(...points.map(p => p.price));
            new Chart(document.getElementById('geographic'), {
                type: 'scatter',
                options: { plugins: { legend: { display: false } } },
                data: { datasets: [{
                    label: 'Price',
                    data: points.map(p => ({ x: p.longitude, y: p.latitude })),
                    pointRadius: 3,
                    backgroundColor: points.map(p => `rgba(59, 130, 246, ${0.2 + 0.8 * p.price / max})`),
                }] },
            });
        });
        get('/api/models/feature_importance').then(items => {
            if (items.error) return;
            new Chart(document.getElementById('importance'), {
                type: 'bar',
                options: { indexAxis: 'y' },
                data: { labels: items.map(i => i.feature), datasets: [{ label: '%', data: items.map(i => i.importance) }] },
            });
        });
        document.getElementById('predict-form').addEventListener('submit', async (e) => {
            e.preventDefault();
            const body = Object.fromEntries([...new FormData(e.target)].map(([k, v]) => [k, Number(v)]));
            const r = await fetch('/api/predict', { method: 'POST', headers: { 'Content-Type': 'application/json' }, body: JSON.stringify(body) }).then(r => r.json());
            document.getElementById('prediction').textContent = r.error ? r.message :
                `Linear regression: ${r.linear_regression_prediction.toFixed(2)} | Random forest: ${r.random_forest_prediction.toFixed(2)}`;
        });
    </script>
</body>
</html>
"#;
