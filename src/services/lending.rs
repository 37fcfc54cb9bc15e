//! Lending workflow service.
//!
//! Mutations are two-phase: the repository transaction changes state, then
//! the joined aggregate is re-read for display.

use std::str::FromStr;

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::LoanStatus,
        loan::{
            CreateLoanRequest, LoanFilters, LoanQuery, LoanSummary, LoanWithHistory, ReturnInfo,
        },
    },
    repository::Repository,
};

/// Default loan period in days
const DEFAULT_LOAN_DAYS: i64 = 14;
/// Allowed loan period bounds, inclusive
const MIN_LOAN_DAYS: i64 = 1;
const MAX_LOAN_DAYS: i64 = 30;

/// Resolve the requested loan period against the default and bounds
fn resolve_loan_days(requested: Option<i64>) -> AppResult<i64> {
    let days = requested.unwrap_or(DEFAULT_LOAN_DAYS);
    if !(MIN_LOAN_DAYS..=MAX_LOAN_DAYS).contains(&days) {
        return Err(AppError::Validation(format!(
            "Loan period must be between {} and {} days",
            MIN_LOAN_DAYS, MAX_LOAN_DAYS
        )));
    }
    Ok(days)
}

/// Human-readable outcome of a return, with the fine appended when owed
fn return_message(info: &ReturnInfo) -> String {
    if info.days_late > 0 {
        format!(
            "Book returned successfully. A fine of {} was applied for {} day(s) late",
            info.fine_amount, info.days_late
        )
    } else {
        "Book returned successfully".to_string()
    }
}

#[derive(Clone)]
pub struct LendingService {
    repository: Repository,
}

impl LendingService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List loans with optional status and user filters
    pub async fn list_loans(
        &self,
        query: LoanQuery,
    ) -> AppResult<(LoanFilters, Vec<LoanSummary>)> {
        let status = query
            .status
            .as_deref()
            .map(LoanStatus::from_str)
            .transpose()
            .map_err(|_| {
                AppError::Validation("status must be \"active\" or \"returned\"".to_string())
            })?;

        let user_id = query
            .user_id
            .as_deref()
            .map(|raw| {
                raw.parse::<i32>()
                    .map_err(|_| AppError::Validation("user_id must be a number".to_string()))
            })
            .transpose()?;

        let loans = self.repository.loans.list(status, user_id).await?;

        let filters = LoanFilters {
            status: status.map(|s| s.to_string()),
            user_id,
        };

        Ok((filters, loans))
    }

    /// Get a loan together with its full history
    pub async fn get_loan(&self, id: i32) -> AppResult<LoanWithHistory> {
        let loan = self.repository.loans.get_details(id).await?;
        let history = self.repository.loans.get_history(id).await?;

        Ok(LoanWithHistory { loan, history })
    }

    /// Create a loan and re-read the joined aggregate for display
    pub async fn create_loan(&self, request: CreateLoanRequest) -> AppResult<LoanSummary> {
        let (user_id, book_id) = match (request.user_id, request.book_id) {
            (Some(user_id), Some(book_id)) => (user_id, book_id),
            _ => {
                return Err(AppError::Validation(
                    "Missing required fields: user_id and book_id".to_string(),
                ))
            }
        };

        let loan_days = resolve_loan_days(request.loan_days)?;

        let loan_id = self
            .repository
            .loans
            .create(user_id, book_id, loan_days)
            .await?;

        self.repository.loans.get_summary(loan_id).await
    }

    /// Process a return and re-read the joined aggregate for display.
    /// The raw path identifier must parse as a numeric loan id.
    pub async fn return_loan(&self, raw_id: &str) -> AppResult<(String, LoanSummary, ReturnInfo)> {
        let loan_id = raw_id
            .parse::<i32>()
            .map_err(|_| AppError::Validation("Loan id must be a valid number".to_string()))?;

        let info = self.repository.loans.return_loan(loan_id).await?;
        let loan = self.repository.loans.get_summary(loan_id).await?;

        Ok((return_message(&info), loan, info))
    }
}
