//! Housing Dashboard - Main Entry Point
//!
//! Serves the valuation dashboard by default; `evaluate` and `predict` run
//! the modeling pipeline once from the command line.

use clap::Parser;
use housing_dashboard::cli::{cmd_evaluate, cmd_predict, cmd_serve, Cli, Commands, ServeArgs};
use housing_dashboard::inference::PredictionRequest;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "housing_dashboard=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve(args)) => {
            cmd_serve(args).await?;
        }
        Some(Commands::Evaluate { data }) => {
            cmd_evaluate(&data)?;
        }
        Some(Commands::Predict {
            data,
            transaction_date,
            house_age,
            distance_to_mrt,
            convenience_stores,
            latitude,
            longitude,
        }) => {
            let request = PredictionRequest {
                transaction_date,
                house_age,
                distance_to_mrt,
                num_convenience_stores: convenience_stores,
                latitude,
                longitude,
            };
            cmd_predict(&data, &request)?;
        }
        None => {
            cmd_serve(ServeArgs::default()).await?;
        }
    }

    Ok(())
}
