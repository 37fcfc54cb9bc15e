//! Loan model and related types

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// Loan model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub status: String,
    pub fine_amount: Option<Decimal>,
}

/// Loan joined with user and book display fields
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct LoanSummary {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub status: String,
    pub fine_amount: Option<Decimal>,
    pub user_name: String,
    pub user_email: String,
    pub book_title: String,
    pub book_author: String,
}

/// Loan detail view, joined with user contact and book identification
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct LoanDetails {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub status: String,
    pub fine_amount: Option<Decimal>,
    pub user_name: String,
    pub user_email: String,
    pub user_phone: String,
    pub book_title: String,
    pub book_author: String,
    pub book_isbn: String,
}

/// A user's loan joined with the book title, for the user detail view
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct UserLoan {
    pub id: i32,
    pub user_id: i32,
    pub book_id: i32,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub status: String,
    pub fine_amount: Option<Decimal>,
    pub book_title: String,
}

/// Append-only lifecycle log entry for a loan
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct LoanHistoryEntry {
    pub id: i32,
    pub loan_id: i32,
    pub action: String,
    pub action_date: DateTime<Utc>,
}

/// Loan detail plus its full history, newest first
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoanWithHistory {
    pub loan: LoanDetails,
    pub history: Vec<LoanHistoryEntry>,
}

/// Create loan request. Presence of the required fields is checked in
/// the service layer.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLoanRequest {
    pub user_id: Option<i32>,
    pub book_id: Option<i32>,
    pub loan_days: Option<i64>,
}

/// Outcome of processing a return
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ReturnInfo {
    pub loan_id: i32,
    pub returned_date: NaiveDate,
    pub days_late: i64,
    pub fine_amount: Decimal,
}

/// Query parameters for listing loans
#[derive(Debug, Deserialize, IntoParams)]
pub struct LoanQuery {
    /// Filter by status: "active" or "returned"
    pub status: Option<String>,
    /// Filter by borrowing user id
    pub user_id: Option<String>,
}

/// Echo of the filters a loan listing was produced with
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoanFilters {
    pub status: Option<String>,
    pub user_id: Option<i32>,
}
