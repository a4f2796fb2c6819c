//! Report service - revenue over a date range.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;

use crate::domain::report::summarize;
use crate::domain::{DateRange, RevenueReport};
use crate::errors::AppResult;
use crate::infra::UnitOfWork;

#[async_trait]
pub trait ReportService: Send + Sync {
    /// Revenue of completed orders created between `from` and `to` (inclusive days)
    async fn revenue_report(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> AppResult<RevenueReport>;
}

pub struct ReportManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> ReportManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> ReportService for ReportManager<U> {
    async fn revenue_report(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> AppResult<RevenueReport> {
        let range = DateRange::resolve(from, to, Utc::now().date_naive())?;
        let orders = self
            .uow
            .orders()
            .list_created_between(range.start(), range.end_exclusive())
            .await?;

        tracing::debug!(from = %range.from, to = %range.to, orders = orders.len(), "Building revenue report");
        Ok(summarize(range, &orders))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrderStatus;
    use crate::errors::AppError;
    use crate::infra::repositories::MockOrderRepository;
    use crate::services::test_support::{self, TestUnitOfWork};
    use uuid::Uuid;

    #[tokio::test]
    async fn test_report_queries_whole_days() {
        let from = NaiveDate::from_ymd_opt(2026, 4, 1).unwrap();
        let to = NaiveDate::from_ymd_opt(2026, 4, 2).unwrap();

        let mut orders = MockOrderRepository::new();
        orders
            .expect_list_created_between()
            .withf(move |start, end| {
                start.date_naive() == from
                    && end.date_naive() == NaiveDate::from_ymd_opt(2026, 4, 3).unwrap()
            })
            .returning(move |start, _| {
                let mut completed = test_support::order(Uuid::new_v4(), OrderStatus::Completed);
                completed.created_at = start;
                Ok(vec![completed])
            });

        let svc = ReportManager::new(
            TestUnitOfWork {
                orders: Some(orders),
                ..Default::default()
            }
            .build(),
        );

        let report = svc.revenue_report(Some(from), Some(to)).await.unwrap();
        assert_eq!(report.total_revenue, 300_000);
        assert_eq!(report.daily.len(), 2);
    }

    #[tokio::test]
    async fn test_inverted_range_is_rejected() {
        let svc = ReportManager::new(TestUnitOfWork::default().build());
        let result = svc
            .revenue_report(
                NaiveDate::from_ymd_opt(2026, 4, 5),
                NaiveDate::from_ymd_opt(2026, 4, 1),
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
