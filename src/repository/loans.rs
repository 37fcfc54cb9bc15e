//! Loans repository: read models plus the lending mutations.
//!
//! Loan creation and return each run as a single transaction with
//! `FOR UPDATE` row locks, so concurrent borrows of one book serialize on
//! the book row and `available_copies` cannot be overdrawn.

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{LoanAction, LoanStatus},
        loan::{Loan, LoanDetails, LoanHistoryEntry, LoanSummary, ReturnInfo, UserLoan},
    },
};

/// Daily fine for late returns, in cents
const DAILY_FINE_CENTS: i64 = 150;

/// Days late and fine owed for a return processed on `returned` against
/// `due`. The fine carries a fixed two-decimal scale.
pub fn late_fee(due: NaiveDate, returned: NaiveDate) -> (i64, Decimal) {
    let days_late = (returned - due).num_days().max(0);
    (days_late, Decimal::new(DAILY_FINE_CENTS * days_late, 2))
}

const SUMMARY_SELECT: &str = r#"
    SELECT l.*,
           u.full_name AS user_name,
           u.email     AS user_email,
           b.title     AS book_title,
           b.author    AS book_author
    FROM loans l
             JOIN users u ON l.user_id = u.id
             JOIN books b ON l.book_id = b.id
"#;

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List loans joined with user and book display fields.
    /// Filters combine with AND; results are newest first.
    pub async fn list(
        &self,
        status: Option<LoanStatus>,
        user_id: Option<i32>,
    ) -> AppResult<Vec<LoanSummary>> {
        let mut query = format!("{} WHERE 1 = 1", SUMMARY_SELECT);
        let mut param_idx = 0;

        if status.is_some() {
            param_idx += 1;
            query.push_str(&format!(" AND l.status = ${}", param_idx));
        }
        if user_id.is_some() {
            param_idx += 1;
            query.push_str(&format!(" AND l.user_id = ${}", param_idx));
        }
        query.push_str(" ORDER BY l.loan_date DESC, l.id DESC");

        let mut builder = sqlx::query_as::<_, LoanSummary>(&query);
        if let Some(status) = status {
            builder = builder.bind(status.as_str());
        }
        if let Some(user_id) = user_id {
            builder = builder.bind(user_id);
        }

        let loans = builder.fetch_all(&self.pool).await?;
        Ok(loans)
    }

    /// Get the joined summary for one loan
    pub async fn get_summary(&self, id: i32) -> AppResult<LoanSummary> {
        let query = format!("{} WHERE l.id = $1", SUMMARY_SELECT);

        sqlx::query_as::<_, LoanSummary>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Get the detail view for one loan, joined with user contact and
    /// book identification
    pub async fn get_details(&self, id: i32) -> AppResult<LoanDetails> {
        sqlx::query_as::<_, LoanDetails>(
            r#"
            SELECT l.*,
                   u.full_name AS user_name,
                   u.email     AS user_email,
                   u.phone     AS user_phone,
                   b.title     AS book_title,
                   b.author    AS book_author,
                   b.isbn      AS book_isbn
            FROM loans l
                     JOIN users u ON l.user_id = u.id
                     JOIN books b ON l.book_id = b.id
            WHERE l.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Loan with id {} not found", id)))
    }

    /// Lifecycle log for a loan, newest first
    pub async fn get_history(&self, loan_id: i32) -> AppResult<Vec<LoanHistoryEntry>> {
        let history = sqlx::query_as::<_, LoanHistoryEntry>(
            "SELECT * FROM loan_history WHERE loan_id = $1 ORDER BY action_date DESC, id DESC",
        )
        .bind(loan_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(history)
    }

    /// A user's active loans joined with book titles, for the user
    /// detail view
    pub async fn get_user_active_loans(&self, user_id: i32) -> AppResult<Vec<UserLoan>> {
        let loans = sqlx::query_as::<_, UserLoan>(
            r#"
            SELECT l.*, b.title AS book_title
            FROM loans l
                     JOIN books b ON l.book_id = b.id
            WHERE l.user_id = $1
              AND l.status = 'active'
            ORDER BY l.loan_date
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(loans)
    }

    /// Create a loan.
    ///
    /// One transaction: lock the user and book rows, reject unknown or
    /// inactive users and exhausted availability, decrement the copy
    /// count, insert the loan and its history row. Lending rejections
    /// surface as `Validation`.
    pub async fn create(&self, user_id: i32, book_id: i32, loan_days: i64) -> AppResult<i32> {
        let mut tx = self.pool.begin().await?;

        let is_active: bool =
            sqlx::query_scalar("SELECT is_active FROM users WHERE id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| {
                    AppError::Validation(format!("User with id {} does not exist", user_id))
                })?;

        if !is_active {
            return Err(AppError::Validation(
                "Cannot create a loan for an inactive user".to_string(),
            ));
        }

        let available_copies: i32 =
            sqlx::query_scalar("SELECT available_copies FROM books WHERE id = $1 FOR UPDATE")
                .bind(book_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| {
                    AppError::Validation(format!("Book with id {} does not exist", book_id))
                })?;

        if available_copies <= 0 {
            return Err(AppError::Validation(
                "No copies of this book are available".to_string(),
            ));
        }

        sqlx::query("UPDATE books SET available_copies = available_copies - 1 WHERE id = $1")
            .bind(book_id)
            .execute(&mut *tx)
            .await?;

        let loan_date = Utc::now().date_naive();
        let due_date = loan_date + Duration::days(loan_days);

        let loan_id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO loans (user_id, book_id, loan_date, due_date, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(loan_date)
        .bind(due_date)
        .bind(LoanStatus::Active.as_str())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO loan_history (loan_id, action, action_date) VALUES ($1, $2, $3)")
            .bind(loan_id)
            .bind(LoanAction::Created.as_str())
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(loan_id)
    }

    /// Return a loan.
    ///
    /// One transaction: lock the loan row, reject unknown or already
    /// returned loans, compute the fine, mark the loan returned, restore
    /// the book's availability (capped at its total) and append the
    /// history row.
    pub async fn return_loan(&self, loan_id: i32) -> AppResult<ReturnInfo> {
        let mut tx = self.pool.begin().await?;

        let loan = sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1 FOR UPDATE")
            .bind(loan_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| {
                AppError::Validation(format!("Loan with id {} does not exist", loan_id))
            })?;

        if loan.status != LoanStatus::Active.as_str() || loan.return_date.is_some() {
            return Err(AppError::Validation(
                "Loan has already been returned".to_string(),
            ));
        }

        let returned_date = Utc::now().date_naive();
        let (days_late, fine_amount) = late_fee(loan.due_date, returned_date);

        sqlx::query("UPDATE loans SET status = $1, return_date = $2, fine_amount = $3 WHERE id = $4")
            .bind(LoanStatus::Returned.as_str())
            .bind(returned_date)
            .bind(fine_amount)
            .bind(loan_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE books SET available_copies = LEAST(available_copies + 1, total_copies) WHERE id = $1",
        )
        .bind(loan.book_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO loan_history (loan_id, action, action_date) VALUES ($1, $2, $3)")
            .bind(loan_id)
            .bind(LoanAction::Returned.as_str())
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(ReturnInfo {
            loan_id,
            returned_date,
            days_late,
            fine_amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn on_time_return_owes_nothing() {
        let (days, fine) = late_fee(date(2025, 3, 15), date(2025, 3, 10));
        assert_eq!(days, 0);
        assert_eq!(fine.to_string(), "0.00");
    }

    #[test]
    fn return_on_due_date_owes_nothing() {
        let (days, fine) = late_fee(date(2025, 3, 15), date(2025, 3, 15));
        assert_eq!(days, 0);
        assert_eq!(fine.to_string(), "0.00");
    }

    #[test]
    fn late_return_accrues_daily_fine() {
        let (days, fine) = late_fee(date(2025, 3, 15), date(2025, 3, 18));
        assert_eq!(days, 3);
        assert_eq!(fine.to_string(), "4.50");
    }

    #[test]
    fn fine_keeps_two_decimal_scale() {
        let (_, fine) = late_fee(date(2025, 3, 15), date(2025, 3, 16));
        assert_eq!(fine.scale(), 2);
        assert_eq!(fine.to_string(), "1.50");
    }
}
