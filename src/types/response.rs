use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use super::pagination::{Paginated, PaginationMeta};
use crate::config::DEFAULT_SUCCESS_MESSAGE;

/// Standard API response envelope: `{ statusCode, message, data, meta? }`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub status_code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PaginationMeta>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self::with_status(StatusCode::OK, data, DEFAULT_SUCCESS_MESSAGE)
    }

    pub fn with_status(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            message: message.into(),
            data: Some(data),
            meta: None,
        }
    }
}

impl<T: Serialize> From<Paginated<T>> for ApiResponse<Vec<T>> {
    fn from(page: Paginated<T>) -> Self {
        Self {
            status_code: StatusCode::OK.as_u16(),
            message: DEFAULT_SUCCESS_MESSAGE.to_string(),
            data: Some(page.data),
            meta: Some(page.meta),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        (status, Json(self)).into_response()
    }
}

/// Created response helper, the common pattern for POST endpoints
pub struct Created<T: Serialize>(pub T);

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> axum::response::Response {
        ApiResponse::with_status(StatusCode::CREATED, self.0, "Created").into_response()
    }
}

/// No content response helper, the common pattern for DELETE endpoints
pub struct NoContent;

impl IntoResponse for NoContent {
    fn into_response(self) -> axum::response::Response {
        StatusCode::NO_CONTENT.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaginationParams;

    #[test]
    fn test_envelope_serializes_camel_case() {
        let body = serde_json::to_value(ApiResponse::success(42)).unwrap();
        assert_eq!(body["statusCode"], 200);
        assert_eq!(body["message"], "Success");
        assert_eq!(body["data"], 42);
        assert!(body.get("meta").is_none());
    }

    #[test]
    fn test_paginated_envelope_carries_meta() {
        let page = Paginated::new(vec!["a", "b"], &PaginationParams::new(1, 2), 5);
        let body = serde_json::to_value(ApiResponse::from(page)).unwrap();
        assert_eq!(body["meta"]["totalPages"], 3);
        assert_eq!(body["meta"]["perPage"], 2);
        assert_eq!(body["data"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_created_sets_status() {
        let response = Created("x").into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
