use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use confluence_mcp::{check, config::Config, mcp};

#[derive(Parser)]
#[command(name = "confluence-mcp")]
#[command(about = "Confluence tools for AI agents over MCP")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the MCP server via stdio (default)
    Mcp,
    /// Test the Confluence connection and configuration
    Check,
}

/// Initialize tracing. Output always goes to stderr: in MCP mode stdout is
/// the protocol channel, and `check` prints its report on stdout.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "confluence_mcp=info".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = Config::from_env()?;

    match cli.command {
        Some(Commands::Check) => {
            if !check::run(&config).await {
                std::process::exit(1);
            }
        }
        Some(Commands::Mcp) | None => {
            mcp::run_stdio_server(config).await?;
        }
    }

    Ok(())
}
