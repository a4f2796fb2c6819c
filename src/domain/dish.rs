//! Dish (menu item) entity.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::AppError;

/// Whether a dish can currently be ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DishStatus {
    Available,
    Unavailable,
}

impl DishStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DishStatus::Available => "available",
            DishStatus::Unavailable => "unavailable",
        }
    }
}

impl FromStr for DishStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(DishStatus::Available),
            "unavailable" => Ok(DishStatus::Unavailable),
            other => Err(AppError::internal(format!("Unknown dish status '{}'", other))),
        }
    }
}

/// A menu item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Dish {
    pub id: Uuid,
    #[schema(example = "Pizza Hải Sản")]
    pub name: String,
    pub description: Option<String>,
    /// Price in VND before size and crust options
    #[schema(example = 159000)]
    pub base_price: i64,
    pub status: DishStatus,
    pub category_id: Uuid,
    /// Default size label shown on the menu
    #[schema(example = "medium")]
    pub size: Option<String>,
    #[schema(example = "pizza")]
    pub type_name: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data needed to insert a dish
#[derive(Debug, Clone, PartialEq)]
pub struct NewDish {
    pub name: String,
    pub description: Option<String>,
    pub base_price: i64,
    pub status: DishStatus,
    pub category_id: Uuid,
    pub size: Option<String>,
    pub type_name: Option<String>,
    pub image_url: Option<String>,
}

/// Partial update of a dish; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DishChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub base_price: Option<i64>,
    pub status: Option<DishStatus>,
    pub category_id: Option<Uuid>,
    pub size: Option<String>,
    pub type_name: Option<String>,
    pub image_url: Option<String>,
}

/// Filters for the public dish list
#[derive(Debug, Clone, Default)]
pub struct DishFilter {
    pub category_id: Option<Uuid>,
    pub status: Option<DishStatus>,
    /// Case-insensitive match on name
    pub search: Option<String>,
}
