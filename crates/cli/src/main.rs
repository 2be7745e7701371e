use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
use commands::{rules::RulesArgs, scan::ScanArgs};

#[derive(Parser)]
#[command(name = "vigil")]
#[command(about = "Static vulnerability analyzer for CosmWasm contracts")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a contract file or source tree for vulnerabilities
    Scan(ScanArgs),

    /// List the built-in rules
    Rules(RulesArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scan(args) => {
            let exit_code = commands::scan::execute(args)?;
            std::process::exit(exit_code);
        }
        Commands::Rules(args) => commands::rules::execute(args),
    }
}
