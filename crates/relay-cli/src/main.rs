//! Relay CLI.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use relay_cli::{cli, client};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays a clean stream of values.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("relay_cli=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    match cli.command {
        cli::Commands::Publish { url } => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let sent = client::run_publisher(&url, stdin).await?;
            tracing::info!(sent, "Input exhausted, publisher closed");
        }
        cli::Commands::Subscribe { url, reconnect } => {
            client::run_subscriber(&url, reconnect, tokio::io::stdout()).await?;
        }
    }

    Ok(())
}
