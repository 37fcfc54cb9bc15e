//! User management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::user::{CreateUser, UpdateUser, User, UserQuery, UserWithLoans},
};

use super::{DataResponse, ListResponse, MessageResponse};

/// List users, optionally filtered by active state
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    params(UserQuery),
    responses(
        (status = 200, description = "List of users", body = ListResponse<User>),
        (status = 400, description = "Invalid active filter")
    )
)]
pub async fn list_users(
    State(state): State<crate::AppState>,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<ListResponse<User>>> {
    let users = state.services.users.list_users(query.active).await?;
    Ok(Json(ListResponse::new(users)))
}

/// Get a user by ID, with their currently active loans
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User with active loans", body = DataResponse<UserWithLoans>),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<DataResponse<UserWithLoans>>> {
    let user = state.services.users.get_user(id).await?;
    Ok(Json(DataResponse::new(user)))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "/users",
    tag = "users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = DataResponse<User>),
        (status = 400, description = "Missing fields or malformed email"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn create_user(
    State(state): State<crate::AppState>,
    Json(user): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<DataResponse<User>>)> {
    let created = state.services.users.create_user(user).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::with_message(
            created,
            "User created successfully",
        )),
    ))
}

/// Partially update a user
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = DataResponse<User>),
        (status = 400, description = "No fields supplied or malformed email"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn update_user(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(patch): Json<UpdateUser>,
) -> AppResult<Json<DataResponse<User>>> {
    let updated = state.services.users.update_user(id, patch).await?;

    Ok(Json(DataResponse::with_message(
        updated,
        "User updated successfully",
    )))
}

/// Deactivate (soft-delete) a user
#[utoipa::path(
    delete,
    path = "/users/{id}/deactivate",
    tag = "users",
    params(
        ("id" = i32, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deactivated", body = MessageResponse),
        (status = 400, description = "User has active loans"),
        (status = 404, description = "User not found")
    )
)]
pub async fn deactivate_user(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<MessageResponse>> {
    state.services.users.deactivate_user(id).await?;

    Ok(Json(MessageResponse {
        success: true,
        message: "User deactivated successfully".to_string(),
    }))
}
