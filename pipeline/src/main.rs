//! Wellness pipeline - one-shot refresh
//!
//! Runs a single refresh cycle for the configured location and prints the
//! resulting dashboard snapshot as JSON.

use wellness_pipeline::{telemetry, Config, WellnessPipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::load()?;
    telemetry::init_tracing(&config.logging)?;

    tracing::info!("Starting wellness pipeline");
    tracing::info!("Environment: {}", config.environment);

    let pipeline = WellnessPipeline::from_config(&config)?;
    let snapshot = pipeline.refresh(None, None).await;

    if let Some(notice) = &snapshot.notice {
        tracing::warn!("{}: {}", notice.code, notice.message);
    }

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
