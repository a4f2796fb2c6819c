//! Field validators shared by request bodies.

use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

use crate::config::is_valid_role;
use crate::domain::UserRole;
use crate::errors::{AppError, AppResult};

/// Vietnamese phone numbers: `0` or `+84` followed by 9-10 digits
pub static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\+84|0)[0-9]{9,10}$").expect("phone pattern compiles"));

/// `validator` hook for role fields
pub fn validate_role(role: &str) -> Result<(), ValidationError> {
    if is_valid_role(role) {
        Ok(())
    } else {
        let mut error = ValidationError::new("role");
        error.message = Some("Role must be either 'user' or 'admin'".into());
        Err(error)
    }
}

/// Parse an optional role filter from a query string
pub fn parse_role(role: Option<&str>) -> AppResult<Option<UserRole>> {
    match role {
        None => Ok(None),
        Some(r) if is_valid_role(r) => Ok(Some(UserRole::from(r))),
        Some(r) => Err(AppError::validation(format!("Unknown role '{}'", r))),
    }
}
