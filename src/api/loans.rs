//! Loan management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::loan::{
        CreateLoanRequest, LoanFilters, LoanQuery, LoanSummary, LoanWithHistory, ReturnInfo,
    },
};

use super::DataResponse;

/// Loan list response, echoing the filters it was produced with
#[derive(Serialize, ToSchema)]
pub struct LoanListResponse {
    pub success: bool,
    pub count: usize,
    pub filters: LoanFilters,
    pub data: Vec<LoanSummary>,
}

/// Return response: the refreshed loan plus the computed return outcome
#[derive(Serialize, ToSchema)]
pub struct ReturnData {
    pub loan: LoanSummary,
    pub return_info: ReturnInfo,
}

/// List loans with optional status and user filters
#[utoipa::path(
    get,
    path = "/loans",
    tag = "loans",
    params(LoanQuery),
    responses(
        (status = 200, description = "List of loans", body = LoanListResponse),
        (status = 400, description = "Invalid filter value")
    )
)]
pub async fn list_loans(
    State(state): State<crate::AppState>,
    Query(query): Query<LoanQuery>,
) -> AppResult<Json<LoanListResponse>> {
    let (filters, loans) = state.services.lending.list_loans(query).await?;

    Ok(Json(LoanListResponse {
        success: true,
        count: loans.len(),
        filters,
        data: loans,
    }))
}

/// Get a loan by ID, with its full history
#[utoipa::path(
    get,
    path = "/loans/{id}",
    tag = "loans",
    params(
        ("id" = i32, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Loan with history", body = DataResponse<LoanWithHistory>),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn get_loan(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<DataResponse<LoanWithHistory>>> {
    let loan = state.services.lending.get_loan(id).await?;
    Ok(Json(DataResponse::new(loan)))
}

/// Create a new loan (borrow a book)
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    request_body = CreateLoanRequest,
    responses(
        (status = 201, description = "Loan created", body = DataResponse<LoanSummary>),
        (status = 400, description = "Missing fields, invalid period, or loan not permitted")
    )
)]
pub async fn create_loan(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateLoanRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<LoanSummary>>)> {
    let loan = state.services.lending.create_loan(request).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::with_message(
            loan,
            "Loan created successfully",
        )),
    ))
}

/// Process a return for a loan
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    params(
        ("id" = String, Path, description = "Loan ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = DataResponse<ReturnData>),
        (status = 400, description = "Non-numeric id, unknown loan, or already returned")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<DataResponse<ReturnData>>> {
    let (message, loan, return_info) = state.services.lending.return_loan(&raw_id).await?;

    Ok(Json(DataResponse::with_message(
        ReturnData { loan, return_info },
        message,
    )))
}
