//! Revenue reporting over a date range.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::order::{Order, OrderStatus};
use crate::config::{DEFAULT_REPORT_RANGE_DAYS, MAX_REPORT_RANGE_DAYS};
use crate::errors::{AppError, AppResult};

/// Inclusive range of calendar days (UTC)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    /// Resolve optional bounds; defaults to the last 30 days ending today.
    ///
    /// The range may span at most `MAX_REPORT_RANGE_DAYS` days and must end
    /// before the last representable date.
    pub fn resolve(
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
        today: NaiveDate,
    ) -> AppResult<Self> {
        let out_of_range = || AppError::validation("Report dates are out of range");

        let to = to.unwrap_or(today);
        to.succ_opt().ok_or_else(out_of_range)?;
        let from = match from {
            Some(from) => from,
            None => to
                .checked_sub_signed(Duration::days(DEFAULT_REPORT_RANGE_DAYS - 1))
                .ok_or_else(out_of_range)?,
        };

        if from > to {
            return Err(AppError::validation("'from' must not be after 'to'"));
        }
        if to.signed_duration_since(from).num_days() >= MAX_REPORT_RANGE_DAYS {
            return Err(AppError::validation(format!(
                "A report can span at most {} days",
                MAX_REPORT_RANGE_DAYS
            )));
        }
        Ok(Self { from, to })
    }

    /// First instant of the range
    pub fn start(&self) -> DateTime<Utc> {
        self.from.and_time(NaiveTime::MIN).and_utc()
    }

    /// First instant after the range
    pub fn end_exclusive(&self) -> DateTime<Utc> {
        match self.to.succ_opt() {
            Some(next) => next.and_time(NaiveTime::MIN).and_utc(),
            None => DateTime::<Utc>::MAX_UTC,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub revenue: i64,
    pub order_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RevenueReport {
    pub from: NaiveDate,
    pub to: NaiveDate,
    /// Sum of completed order totals
    pub total_revenue: i64,
    /// Number of completed orders
    pub order_count: u64,
    pub average_order_value: i64,
    /// One entry per day in the range, zero-filled
    pub daily: Vec<DailyRevenue>,
    /// Orders created in the range, by status
    pub status_breakdown: BTreeMap<String, u64>,
}

/// Summarize the orders created inside `range`.
///
/// Orders outside the range are ignored. Only completed orders count toward
/// revenue; every order counts toward the status breakdown.
pub fn summarize(range: DateRange, orders: &[Order]) -> RevenueReport {
    let mut daily: BTreeMap<NaiveDate, (i64, u64)> = range
        .from
        .iter_days()
        .take_while(|day| *day <= range.to)
        .map(|day| (day, (0, 0)))
        .collect();

    let mut status_breakdown: BTreeMap<String, u64> = OrderStatus::ALL
        .iter()
        .map(|s| (s.as_str().to_string(), 0))
        .collect();
    let mut total_revenue = 0i64;
    let mut order_count = 0u64;

    for order in orders {
        let date = order.created_at.date_naive();
        if date < range.from || date > range.to {
            continue;
        }
        *status_breakdown
            .entry(order.status.as_str().to_string())
            .or_insert(0) += 1;

        if order.status != OrderStatus::Completed {
            continue;
        }
        total_revenue = total_revenue.saturating_add(order.total_amount);
        order_count += 1;
        if let Some(entry) = daily.get_mut(&date) {
            entry.0 = entry.0.saturating_add(order.total_amount);
            entry.1 += 1;
        }
    }

    let average_order_value = if order_count > 0 {
        total_revenue / order_count as i64
    } else {
        0
    };

    RevenueReport {
        from: range.from,
        to: range.to,
        total_revenue,
        order_count,
        average_order_value,
        daily: daily
            .into_iter()
            .map(|(date, (revenue, order_count))| DailyRevenue {
                date,
                revenue,
                order_count,
            })
            .collect(),
        status_breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderType;
    use chrono::TimeZone;
    use uuid::Uuid;

    fn order_on(day: u32, total: i64, status: OrderStatus) -> Order {
        let at = Utc.with_ymd_and_hms(2026, 3, day, 12, 0, 0).unwrap();
        Order {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            order_items: vec![],
            total_amount: total,
            status,
            order_type: OrderType::Pickup,
            delivery_address: None,
            created_at: at,
            updated_at: at,
        }
    }

    fn march(from: u32, to: u32) -> DateRange {
        DateRange {
            from: NaiveDate::from_ymd_opt(2026, 3, from).unwrap(),
            to: NaiveDate::from_ymd_opt(2026, 3, to).unwrap(),
        }
    }

    #[test]
    fn test_only_completed_orders_count_as_revenue() {
        let orders = vec![
            order_on(2, 200_000, OrderStatus::Completed),
            order_on(2, 100_000, OrderStatus::Completed),
            order_on(3, 500_000, OrderStatus::Cancelled),
            order_on(3, 50_000, OrderStatus::Pending),
        ];
        let report = summarize(march(1, 3), &orders);

        assert_eq!(report.total_revenue, 300_000);
        assert_eq!(report.order_count, 2);
        assert_eq!(report.average_order_value, 150_000);
        assert_eq!(report.status_breakdown["cancelled"], 1);
        assert_eq!(report.status_breakdown["delivering"], 0);
    }

    #[test]
    fn test_daily_series_is_zero_filled() {
        let report = summarize(march(1, 3), &[order_on(2, 80_000, OrderStatus::Completed)]);
        let revenue: Vec<i64> = report.daily.iter().map(|d| d.revenue).collect();
        assert_eq!(revenue, vec![0, 80_000, 0]);
    }

    #[test]
    fn test_orders_outside_range_are_ignored() {
        let report = summarize(march(5, 6), &[order_on(2, 80_000, OrderStatus::Completed)]);
        assert_eq!(report.total_revenue, 0);
        assert_eq!(report.average_order_value, 0);
    }

    #[test]
    fn test_range_defaults_and_validation() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
        let range = DateRange::resolve(None, None, today).unwrap();
        assert_eq!(range.to, today);
        assert_eq!(range.from, NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());

        let inverted = DateRange::resolve(Some(today), Some(range.from), today);
        assert!(inverted.is_err());
    }

    #[test]
    fn test_extreme_dates_are_rejected() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();

        let last = DateRange::resolve(None, Some(NaiveDate::MAX), today);
        assert!(matches!(last, Err(AppError::Validation(_))));

        let first = DateRange::resolve(None, Some(NaiveDate::MIN), today);
        assert!(matches!(first, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_range_width_is_capped() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
        let year_ago = NaiveDate::from_ymd_opt(2025, 3, 31).unwrap();
        assert!(DateRange::resolve(Some(year_ago), Some(today), today).is_ok());

        let ancient = NaiveDate::from_ymd_opt(1, 1, 1).unwrap();
        let too_wide = DateRange::resolve(Some(ancient), Some(today), today);
        assert!(matches!(too_wide, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_range_bounds_cover_whole_days() {
        let range = march(1, 1);
        assert_eq!(range.end_exclusive() - range.start(), Duration::days(1));
    }
}
