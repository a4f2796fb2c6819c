//! Order entity and its status lifecycle.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::pricing::{CartQuote, CrustBase, DishSize};
use crate::errors::{AppError, AppResult};

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Delivering,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Preparing,
        OrderStatus::Delivering,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Delivering => "delivering",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Whether an order of `order_type` may move from `self` to `next`.
    ///
    /// Pickup orders go straight from preparing to completed; delivery
    /// orders must pass through delivering.
    pub fn can_transition(&self, next: OrderStatus, order_type: OrderType) -> bool {
        use OrderStatus::*;

        match (self, next) {
            (Pending, Confirmed) | (Pending, Cancelled) => true,
            (Confirmed, Preparing) | (Confirmed, Cancelled) => true,
            (Preparing, Delivering) => order_type == OrderType::Delivery,
            (Preparing, Completed) => order_type == OrderType::Pickup,
            (Delivering, Completed) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| AppError::internal(format!("Unknown order status '{}'", s)))
    }
}

/// Fulfillment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Pickup,
    Delivery,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Pickup => "pickup",
            OrderType::Delivery => "delivery",
        }
    }
}

impl FromStr for OrderType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pickup" => Ok(OrderType::Pickup),
            "delivery" => Ok(OrderType::Delivery),
            other => Err(AppError::internal(format!("Unknown order type '{}'", other))),
        }
    }
}

/// A priced line stored on the order (snapshot at checkout time)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub dish_id: Uuid,
    #[serde(default)]
    pub dish_name: Option<String>,
    pub quantity: u32,
    /// Unit price in VND including size and crust
    pub price: i64,
    #[serde(default)]
    pub size: Option<DishSize>,
    #[serde(default)]
    pub base: Option<CrustBase>,
    #[serde(default)]
    pub note: Option<String>,
}

impl OrderItem {
    /// `None` when the product does not fit in an `i64`
    pub fn line_total(&self) -> Option<i64> {
        self.price.checked_mul(i64::from(self.quantity))
    }
}

/// Order entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub order_items: Vec<OrderItem>,
    pub total_amount: i64,
    pub status: OrderStatus,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub delivery_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }

    /// Check and describe a status change
    pub fn ensure_transition(&self, next: OrderStatus) -> AppResult<()> {
        if self.status == next {
            return Err(AppError::bad_request(format!(
                "Order is already {}",
                next
            )));
        }
        if !self.status.can_transition(next, self.order_type) {
            return Err(AppError::bad_request(format!(
                "Cannot change a {} {} order to {}",
                self.status,
                self.order_type.as_str(),
                next
            )));
        }
        Ok(())
    }
}

/// Data needed to insert an order
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub order_items: Vec<OrderItem>,
    pub total_amount: i64,
    pub status: OrderStatus,
    pub order_type: OrderType,
    pub delivery_address: Option<String>,
}

impl NewOrder {
    /// Build an order from a priced cart
    pub fn from_quote(
        user_id: Uuid,
        quote: CartQuote,
        order_type: OrderType,
        delivery_address: Option<String>,
        status: OrderStatus,
    ) -> Self {
        let order_items = quote
            .lines
            .into_iter()
            .map(|line| OrderItem {
                dish_id: line.dish_id,
                dish_name: Some(line.dish_name),
                quantity: line.quantity,
                price: line.unit_price,
                size: line.size,
                base: line.base,
                note: line.note,
            })
            .collect();

        Self {
            user_id,
            order_items,
            total_amount: quote.total_amount,
            status,
            order_type,
            delivery_address,
        }
    }
}

/// Filters for order listing
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub user_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
    pub order_type: Option<OrderType>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pricing::PricedLine;

    fn order(status: OrderStatus, order_type: OrderType) -> Order {
        Order {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            order_items: vec![],
            total_amount: 0,
            status,
            order_type,
            delivery_address: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_pickup_skips_delivering() {
        let pickup = order(OrderStatus::Preparing, OrderType::Pickup);
        assert!(pickup.ensure_transition(OrderStatus::Completed).is_ok());
        assert!(pickup.ensure_transition(OrderStatus::Delivering).is_err());

        let delivery = order(OrderStatus::Preparing, OrderType::Delivery);
        assert!(delivery.ensure_transition(OrderStatus::Delivering).is_ok());
        assert!(delivery.ensure_transition(OrderStatus::Completed).is_err());
    }

    #[test]
    fn test_terminal_states_are_final() {
        for next in OrderStatus::ALL {
            assert!(!OrderStatus::Completed.can_transition(next, OrderType::Delivery));
            assert!(!OrderStatus::Cancelled.can_transition(next, OrderType::Pickup));
        }
    }

    #[test]
    fn test_cancel_only_before_preparing() {
        assert!(OrderStatus::Pending.can_transition(OrderStatus::Cancelled, OrderType::Pickup));
        assert!(OrderStatus::Confirmed.can_transition(OrderStatus::Cancelled, OrderType::Pickup));
        assert!(!OrderStatus::Preparing.can_transition(OrderStatus::Cancelled, OrderType::Pickup));
    }

    #[test]
    fn test_same_status_is_rejected() {
        let o = order(OrderStatus::Pending, OrderType::Pickup);
        assert!(matches!(
            o.ensure_transition(OrderStatus::Pending),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_status_parses_from_storage() {
        assert_eq!("delivering".parse::<OrderStatus>().unwrap(), OrderStatus::Delivering);
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_items_from_quote_keep_totals() {
        let quote = CartQuote {
            lines: vec![PricedLine {
                dish_id: Uuid::new_v4(),
                dish_name: "Trà Đào".to_string(),
                quantity: 3,
                size: None,
                base: None,
                note: Some("ít đá".to_string()),
                unit_price: 30_000,
                line_total: 90_000,
            }],
            item_count: 3,
            total_amount: 90_000,
        };
        let new_order = NewOrder::from_quote(
            Uuid::new_v4(),
            quote,
            OrderType::Pickup,
            None,
            OrderStatus::Pending,
        );
        let sum: Option<i64> = new_order.order_items.iter().map(OrderItem::line_total).sum();
        assert_eq!(sum, Some(new_order.total_amount));
        assert_eq!(new_order.order_items[0].note.as_deref(), Some("ít đá"));
    }

    #[test]
    fn test_line_total_overflow_is_none() {
        let item = OrderItem {
            dish_id: Uuid::new_v4(),
            dish_name: None,
            quantity: 2,
            price: i64::MAX,
            size: None,
            base: None,
            note: None,
        };
        assert_eq!(item.line_total(), None);
    }

    #[test]
    fn test_type_serializes_as_type_field() {
        let json = serde_json::to_value(order(OrderStatus::Pending, OrderType::Delivery)).unwrap();
        assert_eq!(json["type"], "delivery");
        assert_eq!(json["status"], "pending");
    }
}
