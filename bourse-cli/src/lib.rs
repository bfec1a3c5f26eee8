//! Bourse CLI Library
//!
//! Operator front end for the Binance adapter: environment-driven
//! configuration and subcommands that print unified JSON.
//!
//! # Example
//!
//! ```rust,ignore
//! use bourse_cli::{commands, Config};
//! use bourse_connectors::Binance;
//!
//! let config = Config::from_env()?;
//! let exchange = Binance::new(config.binance_config());
//! let output = commands::run(&exchange, commands::Command::Balance, None).await?;
//! ```

#![warn(clippy::all)]

pub mod commands;
pub mod config;
pub mod error;

// Re-exports
pub use commands::Command;
pub use config::Config;
pub use error::{CliError, CliResult};
