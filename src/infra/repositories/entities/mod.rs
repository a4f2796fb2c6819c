//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod category;
pub mod dish;
pub mod order;
pub mod review;
pub mod user;
pub mod user_transaction;
