//! Fact Ledger Library
//!
//! Tracks qualitative facts about employees with:
//! - SQLite persistence of employees and rated facts
//! - Rating totals, running history and top-N rankings
//! - Table, line chart and CSV reports
//! - An interactive menu driving all of the above
//!
//! # Example
//!
//! ```ignore
//! use fact_ledger::{FactStore, Rating};
//!
//! #[tokio::main]
//! async fn main() -> fact_ledger::Result<()> {
//!     let store = FactStore::open("system.db").await?;
//!     let ivanov = store.create_employee("Ivanov", "Engineer").await?;
//!     store.create_fact("Fixed the build", Rating::Positive, ivanov.id, chrono::Utc::now()).await?;
//!     println!("{:?}", fact_ledger::rating::employee_totals(&store).await?);
//!     Ok(())
//! }
//! ```

// Core modules (order matters for cross-module dependencies)
pub mod types;
pub mod error;
pub mod config;
pub mod store;
pub mod rating;
pub mod report;
pub mod interactive;
pub mod cli;

// Re-export commonly used types for convenience
pub use types::{Employee, Fact, FactWithEmployee, Rating};

pub use error::{LedgerError, Result};

pub use store::FactStore;

pub use rating::{aggregate_by_employee, rating_to_delta, running_history, Direction};

pub use config::Config;

pub use interactive::{MenuAction, Prompter, Session};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
