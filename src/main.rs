//! Fact Ledger - employee fact tracking and reputation reports
//!
//! An interactive menu over a local SQLite file.

use crossterm::{execute, style::{Color, Print, ResetColor, SetForegroundColor}};
use fact_ledger::cli;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging (WARN level by default, use RUST_LOG=debug to trace queries)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into())
        )
        .init();

    // Run CLI
    if let Err(e) = cli::run().await {
        let _ = execute!(
            std::io::stderr(),
            SetForegroundColor(Color::Red),
            Print(format!("Error: {:#}\n", e)),
            ResetColor
        );
        std::process::exit(1);
    }
}
