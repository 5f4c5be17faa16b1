//! Housing Dashboard CLI Module
//!
//! Command-line interface for serving the dashboard and for one-off
//! evaluation and prediction runs against a dataset file.

use clap::{Args, Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::data::DataLoader;
use crate::evaluation::{importance_report, performance, ModelMetrics};
use crate::inference::{PredictionRequest, PredictionService};
use crate::server::{run_server, ServerConfig};
use crate::training::{PipelineConfig, TrainEngine, TrainedModels};

// ─── Styling helpers ───────────────────────────────────────────────────────────

const W: usize = 58; // box inner width

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn line_box_top()    { println!("  {}", dim("┌─────────────────────────────────────────────────────────┐")); }
fn line_box_bottom() { println!("  {}", dim("└─────────────────────────────────────────────────────────┘")); }
fn line_box_sep()    { println!("  {}", dim("├─────────────────────────────────────────────────────────┤")); }

fn line_box(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let pad = W.saturating_sub(visible_len);
    println!("  {}  {}{} {}", dim("│"), content, " ".repeat(pad), dim("│"));
}

fn line_box_center(content: &str) {
    let visible_len = strip_ansi(content).chars().count();
    let total_pad = W.saturating_sub(visible_len);
    let left = total_pad / 2;
    let right = total_pad - left;
    println!("  {}  {}{}{} {}", dim("│"), " ".repeat(left), content, " ".repeat(right), dim("│"));
}

fn line_box_empty() { line_box(""); }

fn strip_ansi(s: &str) -> String {
    let mut out = String::new();
    let mut in_escape = false;
    for c in s.chars() {
        if c == '\x1b' { in_escape = true; continue; }
        if in_escape { if c == 'm' { in_escape = false; } continue; }
        out.push(c);
    }
    out
}

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "housing-dashboard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Real-estate valuation analytics and price prediction")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Server overrides; unset values fall back to `ServerConfig::default()`
#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Server host
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Dataset file (CSV, TSV, JSON, or Parquet)
    #[arg(short, long, env = "DATA_PATH")]
    pub data: Option<PathBuf>,

    /// Directory holding the dashboard assets
    #[arg(long, env = "STATIC_DIR")]
    pub static_dir: Option<PathBuf>,
}

impl ServeArgs {
    /// Apply the given overrides on top of `config`
    pub fn apply(self, mut config: ServerConfig) -> ServerConfig {
        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(data) = self.data {
            config.data_path = data;
        }
        if let Some(static_dir) = self.static_dir {
            config.static_dir = static_dir;
        }
        config
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the dashboard server (default)
    Serve(ServeArgs),

    /// Train both models and print held-out metrics
    Evaluate {
        /// Dataset file
        #[arg(short, long)]
        data: PathBuf,
    },

    /// Train both models and estimate the price of one property.
    /// Values outside the observed range, negative ones included, are extrapolated.
    #[command(allow_negative_numbers = true)]
    Predict {
        /// Dataset file
        #[arg(short, long)]
        data: PathBuf,

        #[arg(long)]
        transaction_date: f64,

        #[arg(long)]
        house_age: f64,

        /// Distance to the nearest MRT station in meters
        #[arg(long)]
        distance_to_mrt: f64,

        #[arg(long)]
        convenience_stores: u32,

        #[arg(long)]
        latitude: f64,

        #[arg(long)]
        longitude: f64,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

fn train_from(data_path: &Path) -> anyhow::Result<TrainedModels> {
    step_run("Loading data");
    let start = Instant::now();
    let dataset = DataLoader::new().load_dataset(data_path)?;
    step_done(&format!("{} rows in {:?}", dataset.len(), start.elapsed()));

    let config = PipelineConfig::default();
    step_run(&format!("Training {} trees + linear model", config.n_estimators.to_string().cyan()));
    let start = Instant::now();
    let models = TrainEngine::new(config).train(&dataset)?;
    step_done(&format!(
        "{} train / {} test in {:?}",
        models.split().n_train(),
        models.split().n_test(),
        start.elapsed()
    ));
    Ok(models)
}

fn print_metrics(name: &str, metrics: &ModelMetrics) {
    println!(
        "  {:<20} {} {}   {} {}",
        muted(name),
        muted("MSE"),
        format!("{:>9.4}", metrics.mse).white().bold(),
        muted("R²"),
        format!("{:.4}", metrics.r2).white().bold()
    );
}

pub fn cmd_evaluate(data_path: &Path) -> anyhow::Result<()> {
    section("Evaluate");
    let models = train_from(data_path)?;
    let report = performance(&models)?;

    println!();
    print_metrics("Linear regression", &report.linear_regression);
    print_metrics("Random forest", &report.random_forest);

    section("Feature importance");
    for item in importance_report(models.forest())? {
        let bar = "█".repeat((item.importance / 2.0).round() as usize);
        println!(
            "  {:<24} {:>6.2}%  {}",
            muted(&item.feature),
            item.importance,
            accent(&bar)
        );
    }
    println!();
    Ok(())
}

pub fn cmd_predict(data_path: &Path, request: &PredictionRequest) -> anyhow::Result<()> {
    section("Predict");
    let models = train_from(data_path)?;
    let result = PredictionService::new(&models).predict(request)?;

    println!();
    println!(
        "  {:<20} {}",
        muted("Linear regression"),
        format!("{:.2}", result.linear_regression_prediction).white().bold()
    );
    println!(
        "  {:<20} {}",
        muted("Random forest"),
        format!("{:.2}", result.random_forest_prediction).white().bold()
    );
    println!();
    Ok(())
}

pub async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = args.apply(ServerConfig::default());

    let base = format!("http://{}:{}", config.host, config.port);
    println!();
    line_box_top();
    line_box_empty();
    line_box_center(&format!("{}", "Real Estate Valuation Dashboard".white().bold()));
    line_box_center(&format!("{}", dim(&format!("v{}", env!("CARGO_PKG_VERSION")))));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box(&kv("Dashboard", &base));
    line_box(&kv("Health   ", &format!("{}/api/health", base)));
    line_box(&kv("Data     ", &config.data_path.display().to_string()));
    line_box_empty();
    line_box_sep();
    line_box_empty();
    line_box_center(&format!("{}", dim("ctrl+c to stop")));
    line_box_empty();
    line_box_bottom();
    println!();

    run_server(config).await
}
