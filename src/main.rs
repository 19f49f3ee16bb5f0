//! Vehicle pricing preparation - entry point
//!
//! Runs ingestion and then transformation with the static configuration.

use clap::Parser;
use tracing::info;
use vehicle_pricing_prep::config::{IngestionConfig, TransformationConfig};
use vehicle_pricing_prep::ingestion::DataIngestion;
use vehicle_pricing_prep::transformation::DataTransformation;

#[derive(Parser)]
#[command(name = "vehicle-pricing-prep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Clean, split and encode the vehicle pricing dataset")]
struct Cli {}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vehicle_pricing_prep=info".into()),
        )
        .init();

    let _cli = Cli::parse();

    let artifacts = DataIngestion::new(IngestionConfig::default()).initiate_data_ingestion()?;
    info!(
        train = %artifacts.train_data_path.display(),
        test = %artifacts.test_data_path.display(),
        "Data ingestion completed"
    );

    let output = DataTransformation::new(TransformationConfig::default())
        .initiate_data_transformation(&artifacts.train_data_path, &artifacts.test_data_path)?;
    info!(
        train_shape = ?output.train_features.dim(),
        test_shape = ?output.test_features.dim(),
        preprocessor = %output.preprocessor_path.display(),
        "Data transformation completed"
    );

    Ok(())
}
