use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
use commands::audit::AuditArgs;

#[derive(Parser)]
#[command(name = "aegis")]
#[command(about = "AI-assisted smart contract security audits")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit a contract by address lookup or from a source file
    Audit(AuditArgs),
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Phase progress is reported via info-level events, so they must pass
    // the filter even when RUST_LOG is unset.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("aegis_auditor=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Audit(args) => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(commands::audit::execute(args))
        }
    }
}
