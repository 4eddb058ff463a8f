//! CLI interface for fact-ledger

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{self, Config};

#[derive(Parser)]
#[command(name = "fact-ledger")]
#[command(about = "Track rated facts about employees and rank them by reputation", long_about = None)]
#[command(version)]
struct Cli {
    /// SQLite database file (overrides the config file)
    #[arg(long, env = "FACT_LEDGER_DB")]
    database: Option<PathBuf>,

    /// CSV export target (overrides the config file)
    #[arg(long)]
    csv: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive menu (default when no command given)
    Interactive,
    /// Inspect or reset the configuration
    Config {
        /// Show the resolved configuration
        #[arg(long)]
        show: bool,
        /// Rewrite the config file with defaults
        #[arg(long)]
        reset: bool,
    },
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        None | Some(Commands::Interactive) => {
            let config = Config::load()?.with_overrides(cli.database, cli.csv);
            crate::interactive::run_interactive(config).await?;
        }
        Some(Commands::Config { show, reset }) => {
            if reset {
                config::reset_config()?;
            } else if show {
                let config = Config::load()?.with_overrides(cli.database, cli.csv);
                config::show_config(&config)?;

                // Only report rows for an existing file; opening would create it
                if config.storage.database_path.exists() {
                    let store = crate::store::open_configured(&config).await?;
                    let (employees, facts) = store.counts().await?;
                    println!("Stored rows:        {} employees, {} facts", employees, facts);
                }
            } else {
                println!("Configuration options:");
                println!("  --show     Display the resolved configuration");
                println!("  --reset    Restore default settings");
                println!();
                println!("Config file: {}", config::config_path()?.display());
            }
        }
    }

    Ok(())
}
