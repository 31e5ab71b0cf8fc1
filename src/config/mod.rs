//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (freshness window, storage keys, provider endpoints)
//! - Library configuration types
//! - Command-line options for the binary

mod cli;
mod constants;
mod types;

// Re-export all constants
pub use cli::{Cli, Command, GlobalOpts};
pub use constants::*;
pub use types::{Config, LogFormat, LogLevel, ProviderUrls};
