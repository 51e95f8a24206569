//! CLI entry point for ordering images by color and exporting the grid

use clap::Parser;
use huegrid::io::cli::{BatchRunner, Cli};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> huegrid::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "huegrid=warn".into()))
        .with(fmt::layer().without_time().with_writer(std::io::stderr))
        .init();

    let runner = BatchRunner::new(cli);
    if let Some(path) = runner.run().await? {
        tracing::info!(path = %path.display(), "Wrote grid");
    }
    Ok(())
}
