//! Reporting handlers.

use axum::{
    extract::{Query, State},
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::api::middleware::{require_admin, CurrentUser};
use crate::api::AppState;
use crate::domain::RevenueReport;
use crate::errors::AppResult;
use crate::types::ApiResponse;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RevenueQuery {
    /// First day, inclusive (defaults to 29 days before `to`)
    #[param(example = "2026-03-01")]
    pub from: Option<NaiveDate>,
    /// Last day, inclusive (defaults to today, UTC)
    #[param(example = "2026-03-31")]
    pub to: Option<NaiveDate>,
}

pub fn report_routes() -> Router<AppState> {
    Router::new().route("/revenue", get(revenue_report))
}

#[utoipa::path(
    get,
    path = "/admin/reports/revenue",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(RevenueQuery),
    responses(
        (status = 200, description = "Revenue of completed orders", body = RevenueReport),
        (status = 400, description = "'from' is after 'to'")
    )
)]
pub async fn revenue_report(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<RevenueQuery>,
) -> AppResult<ApiResponse<RevenueReport>> {
    require_admin(&user)?;
    let report = state
        .report_service
        .revenue_report(query.from, query.to)
        .await?;
    Ok(ApiResponse::success(report))
}
