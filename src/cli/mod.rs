//! CLI module - Command-line interface for the application.
//!
//! Provides commands for:
//! - `serve` - Start the HTTP server
//! - `migrate` - Database migrations
//! - `jobs` - Payment expiry worker and queue maintenance
//! - `admin` - Bootstrap administrator accounts

pub mod args;

pub use args::{Cli, Commands};
