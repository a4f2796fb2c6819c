//! Payment transactions recorded against orders.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::order::OrderStatus;
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Zalopay,
    BankTransfer,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Zalopay => "zalopay",
            PaymentMethod::BankTransfer => "bank_transfer",
        }
    }

    /// Cash is collected at the counter, so it settles immediately
    pub fn settles_immediately(&self) -> bool {
        matches!(self, PaymentMethod::Cash)
    }
}

impl FromStr for PaymentMethod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(PaymentMethod::Cash),
            "zalopay" => Ok(PaymentMethod::Zalopay),
            "bank_transfer" => Ok(PaymentMethod::BankTransfer),
            other => Err(AppError::internal(format!("Unknown payment method '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Success,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Success => "success",
            TransactionStatus::Failed => "failed",
        }
    }

    pub fn is_settled(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }
}

impl FromStr for TransactionStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TransactionStatus::Pending),
            "success" => Ok(TransactionStatus::Success),
            "failed" => Ok(TransactionStatus::Failed),
            other => Err(AppError::internal(format!(
                "Unknown transaction status '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserTransaction {
    pub id: Uuid,
    pub order_id: Uuid,
    pub amount: i64,
    pub method: PaymentMethod,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub order_id: Uuid,
    pub amount: i64,
    pub method: PaymentMethod,
    pub status: TransactionStatus,
}

impl NewTransaction {
    /// A transaction for the full order total in its method's initial status
    pub fn for_order(order_id: Uuid, amount: i64, method: PaymentMethod) -> Self {
        let status = if method.settles_immediately() {
            TransactionStatus::Success
        } else {
            TransactionStatus::Pending
        };
        Self {
            order_id,
            amount,
            method,
            status,
        }
    }
}

/// What the checkout page polls for
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatus {
    pub transaction_id: Uuid,
    pub order_id: Uuid,
    pub status: TransactionStatus,
    pub order_status: OrderStatus,
    /// Whether the client can stop polling
    pub settled: bool,
    pub poll_interval_seconds: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cash_settles_immediately() {
        let tx = NewTransaction::for_order(Uuid::new_v4(), 100_000, PaymentMethod::Cash);
        assert_eq!(tx.status, TransactionStatus::Success);

        let tx = NewTransaction::for_order(Uuid::new_v4(), 100_000, PaymentMethod::Zalopay);
        assert_eq!(tx.status, TransactionStatus::Pending);
    }

    #[test]
    fn test_method_wire_names() {
        let json = serde_json::to_string(&PaymentMethod::BankTransfer).unwrap();
        assert_eq!(json, "\"bank_transfer\"");
        assert_eq!("zalopay".parse::<PaymentMethod>().unwrap(), PaymentMethod::Zalopay);
    }
}
