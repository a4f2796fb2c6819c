//! Order Eat - food ordering backend
//!
//! REST API for a pizza and fast-food shop: menu catalog, cart pricing,
//! orders, payments with background expiry, reviews and revenue reports.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Business entities, pricing and state rules
//! - **services**: Application use cases
//! - **infra**: Database, repositories, Redis cache and locks
//! - **jobs**: Background jobs run by the apalis worker
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared types (pagination, responses)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server (applies pending migrations)
//! order-eat serve
//!
//! # Run the payment expiry worker
//! order-eat jobs work
//!
//! # Bootstrap an administrator
//! order-eat admin create --email root@ordereat.vn
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod jobs;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Password, User, UserRole};
pub use errors::{AppError, AppResult};
pub use infra::Cache;
