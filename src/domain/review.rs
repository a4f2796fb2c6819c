//! Order review with an optional reply from staff.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{MAX_RATING, MIN_RATING};
use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub order_id: Uuid,
    pub user_id: Uuid,
    #[schema(example = 5, minimum = 1, maximum = 5)]
    pub rating: i16,
    pub comment: Option<String>,
    pub admin_reply: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    pub fn is_written_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

/// Reject ratings outside 1..=5
pub fn ensure_rating(rating: i16) -> AppResult<()> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(())
    } else {
        Err(AppError::validation(format!(
            "Rating must be between {} and {}",
            MIN_RATING, MAX_RATING
        )))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub order_id: Uuid,
    pub user_id: Uuid,
    pub rating: i16,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewChanges {
    pub rating: Option<i16>,
    pub comment: Option<String>,
    pub admin_reply: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ReviewFilter {
    pub rating: Option<i16>,
    pub user_id: Option<Uuid>,
    pub order_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        assert!(ensure_rating(1).is_ok());
        assert!(ensure_rating(5).is_ok());
        assert!(ensure_rating(0).is_err());
        assert!(ensure_rating(6).is_err());
    }
}
