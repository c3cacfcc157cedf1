use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use laterpress::cli::{commands, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise --debug picks the level
    let default_level = if cli.debug { "laterpress=debug" } else { "laterpress=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    commands::convert(&cli).await?;

    Ok(())
}
