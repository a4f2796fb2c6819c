//! Cart pricing.
//!
//! A line costs `basePrice + sizeSurcharge(size) + toppingPrice(base)` per
//! unit; a cart costs the sum of its lines. Prices always come from the
//! current dish records, never from the client.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::dish::{Dish, DishStatus};
use crate::config::{
    BASE_PRICE_STUFFED, BASE_PRICE_THICK, BASE_PRICE_THIN, MAX_CART_LINES, MAX_LINE_QUANTITY,
    MAX_TEXT_LENGTH,
    SIZE_SURCHARGE_LARGE, SIZE_SURCHARGE_MEDIUM, SIZE_SURCHARGE_SMALL,
};
use crate::errors::{AppError, AppResult};

/// Portion size chosen for a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DishSize {
    Small,
    Medium,
    Large,
}

impl DishSize {
    pub fn surcharge(self) -> i64 {
        match self {
            DishSize::Small => SIZE_SURCHARGE_SMALL,
            DishSize::Medium => SIZE_SURCHARGE_MEDIUM,
            DishSize::Large => SIZE_SURCHARGE_LARGE,
        }
    }
}

/// Crust chosen for a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CrustBase {
    Thin,
    Thick,
    Stuffed,
}

impl CrustBase {
    pub fn topping_price(self) -> i64 {
        match self {
            CrustBase::Thin => BASE_PRICE_THIN,
            CrustBase::Thick => BASE_PRICE_THICK,
            CrustBase::Stuffed => BASE_PRICE_STUFFED,
        }
    }
}

/// Surcharge for an optional size (no size costs nothing)
pub fn size_surcharge(size: Option<DishSize>) -> i64 {
    size.map(DishSize::surcharge).unwrap_or(0)
}

/// Extra price for an optional crust (no crust costs nothing)
pub fn topping_price(base: Option<CrustBase>) -> i64 {
    base.map(CrustBase::topping_price).unwrap_or(0)
}

/// Price of one unit of a dish with the given options
pub fn unit_price(base_price: i64, size: Option<DishSize>, base: Option<CrustBase>) -> AppResult<i64> {
    base_price
        .checked_add(size_surcharge(size))
        .and_then(|p| p.checked_add(topping_price(base)))
        .ok_or_else(|| AppError::bad_request("Price is out of range"))
}

/// A line of a client cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub dish_id: Uuid,
    #[validate(range(min = 1, max = 99, message = "Quantity must be between 1 and 99"))]
    #[schema(example = 2, minimum = 1, maximum = 99)]
    pub quantity: u32,
    #[serde(default)]
    pub size: Option<DishSize>,
    #[serde(default)]
    pub base: Option<CrustBase>,
    #[serde(default)]
    #[validate(length(max = 1000, message = "Note is too long"))]
    pub note: Option<String>,
}

/// A cart line priced against the current menu
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PricedLine {
    pub dish_id: Uuid,
    pub dish_name: String,
    pub quantity: u32,
    pub size: Option<DishSize>,
    pub base: Option<CrustBase>,
    pub note: Option<String>,
    pub unit_price: i64,
    pub line_total: i64,
}

/// A fully priced cart
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CartQuote {
    pub lines: Vec<PricedLine>,
    pub item_count: u32,
    pub total_amount: i64,
}

/// Price a cart against the dishes it references.
///
/// Fails when the cart is empty or longer than `MAX_CART_LINES`, a dish is
/// unknown or unavailable, or a quantity is outside `1..=MAX_LINE_QUANTITY`.
pub fn price_cart(lines: &[CartLine], dishes: &[Dish]) -> AppResult<CartQuote> {
    if lines.is_empty() {
        return Err(AppError::validation("Cart must contain at least one item"));
    }
    if lines.len() > MAX_CART_LINES {
        return Err(AppError::validation(format!(
            "Cart cannot contain more than {} lines",
            MAX_CART_LINES
        )));
    }

    let menu: HashMap<Uuid, &Dish> = dishes.iter().map(|d| (d.id, d)).collect();
    let mut priced = Vec::with_capacity(lines.len());
    let mut total: i64 = 0;
    let mut item_count: u32 = 0;

    for line in lines {
        if line.quantity == 0 || line.quantity > MAX_LINE_QUANTITY {
            return Err(AppError::validation(format!(
                "Quantity must be between 1 and {}",
                MAX_LINE_QUANTITY
            )));
        }
        if line
            .note
            .as_ref()
            .is_some_and(|n| n.chars().count() as u64 > MAX_TEXT_LENGTH)
        {
            return Err(AppError::validation("Note is too long"));
        }

        let dish = menu.get(&line.dish_id).ok_or(AppError::NotFound("Dish"))?;
        if dish.status != DishStatus::Available {
            return Err(AppError::bad_request(format!(
                "Dish '{}' is not available",
                dish.name
            )));
        }

        let unit = unit_price(dish.base_price, line.size, line.base)?;
        let line_total = unit
            .checked_mul(i64::from(line.quantity))
            .ok_or_else(|| AppError::bad_request("Price is out of range"))?;
        total = total
            .checked_add(line_total)
            .ok_or_else(|| AppError::bad_request("Price is out of range"))?;
        item_count = item_count
            .checked_add(line.quantity)
            .ok_or_else(|| AppError::bad_request("Too many items in cart"))?;

        priced.push(PricedLine {
            dish_id: dish.id,
            dish_name: dish.name.clone(),
            quantity: line.quantity,
            size: line.size,
            base: line.base,
            note: line.note.clone(),
            unit_price: unit,
            line_total,
        });
    }

    Ok(CartQuote {
        lines: priced,
        item_count,
        total_amount: total,
    })
}

impl CartQuote {
    /// Sum of line totals; always equal to `total_amount` for a built quote
    pub fn lines_total(&self) -> i64 {
        self.lines.iter().map(|l| l.line_total).sum()
    }
}

/// Distinct dish ids referenced by a cart, in first-seen order
pub fn referenced_dish_ids(lines: &[CartLine]) -> Vec<Uuid> {
    let mut seen = HashSet::with_capacity(lines.len());
    lines
        .iter()
        .map(|line| line.dish_id)
        .filter(|id| seen.insert(*id))
        .collect()
}
