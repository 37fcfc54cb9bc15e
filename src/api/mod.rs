//! API handlers for Lectern REST endpoints

pub mod books;
pub mod health;
pub mod loans;
pub mod openapi;
pub mod users;

use axum::{
    http::{StatusCode, Uri},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

/// Envelope for single-entity payloads
#[derive(Serialize, ToSchema)]
pub struct DataResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// Always true for successful responses
    pub success: bool,
    /// Optional human-readable outcome
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Response payload
    pub data: T,
}

impl<T> DataResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data,
        }
    }
}

/// Envelope for list payloads
#[derive(Serialize, ToSchema)]
pub struct ListResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    /// Always true for successful responses
    pub success: bool,
    /// Number of rows returned
    pub count: usize,
    /// Response payload
    pub data: Vec<T>,
}

impl<T> ListResponse<T>
where
    T: for<'a> ToSchema<'a>,
{
    pub fn new(data: Vec<T>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

/// Envelope for message-only outcomes
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

/// Body returned for unmatched routes
#[derive(Serialize, ToSchema)]
pub struct RouteNotFound {
    pub error: String,
    pub path: String,
}

/// Fallback handler for unmatched routes
pub async fn not_found(uri: Uri) -> (StatusCode, Json<RouteNotFound>) {
    (
        StatusCode::NOT_FOUND,
        Json(RouteNotFound {
            error: "Route not found".to_string(),
            path: uri.to_string(),
        }),
    )
}
