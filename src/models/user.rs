//! User model and related types

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::loan::UserLoan;

/// Email shape check: local-part@domain.tld
pub static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// User model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub address: Option<String>,
    pub registration_date: NaiveDate,
    pub is_active: bool,
}

/// User joined with their currently active loans
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserWithLoans {
    pub user: User,
    pub active_loans: Vec<UserLoan>,
}

/// Create user request. Presence of the required fields is checked in
/// the service layer.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    pub full_name: Option<String>,
    #[validate(regex(path = *EMAIL_RE, message = "Email format is invalid"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Partial update request for a user
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUser {
    pub full_name: Option<String>,
    #[validate(regex(path = *EMAIL_RE, message = "Email format is invalid"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl UpdateUser {
    /// True when no recognized field was supplied
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.address.is_none()
    }
}

/// Query parameters for listing users
#[derive(Debug, Deserialize, IntoParams)]
pub struct UserQuery {
    /// Filter by active state: "true" or "false"
    pub active: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_pattern_accepts_plain_addresses() {
        assert!(EMAIL_RE.is_match("ana@example.com"));
        assert!(EMAIL_RE.is_match("first.last@sub.example.org"));
    }

    #[test]
    fn email_pattern_rejects_malformed_addresses() {
        assert!(!EMAIL_RE.is_match("not-an-email"));
        assert!(!EMAIL_RE.is_match("missing@tld"));
        assert!(!EMAIL_RE.is_match("spaces in@local.com "));
        assert!(!EMAIL_RE.is_match("@no-local.com"));
    }

    #[test]
    fn create_user_validation_flags_bad_email() {
        let user = CreateUser {
            full_name: Some("Ana Torres".to_string()),
            email: Some("not-an-email".to_string()),
            phone: Some("999888777".to_string()),
            address: None,
        };
        assert!(user.validate().is_err());

        let user = CreateUser {
            email: Some("ana@example.com".to_string()),
            ..user
        };
        assert!(user.validate().is_ok());
    }
}
