mod pipeline;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::pipeline::{run_pipeline, Clients};

#[derive(Debug, Parser)]
#[command(name = "toppages", version)]
#[command(about = "Publish the site's most visited pages as a JSON artifact")]
struct Cli {
    /// Trailing window, in days, over which page views are counted.
    #[arg(default_value = "30")]
    days: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = toppages_core::load_pipeline_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!(env = %config.env, bucket = %config.s3.bucket_name, "starting top pages run");

    let clients = Clients::connect(&config).await?;
    let outcome = run_pipeline(&config, &clients, &cli.days).await?;

    tracing::info!(
        published = outcome.published.len(),
        invalid = outcome.invalid.len(),
        bucket_created = outcome.bucket_created,
        bytes = outcome.bytes,
        key = %config.s3.object_key,
        "top pages published"
    );
    Ok(())
}
