//! User management service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, UpdateUser, User, UserWithLoans},
    repository::Repository,
};

fn required<'a>(value: &'a Option<String>) -> Option<&'a str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Parse the `active` query filter; anything but "true"/"false" is rejected
fn parse_active_filter(value: Option<&str>) -> AppResult<Option<bool>> {
    match value {
        None => Ok(None),
        Some("true") => Ok(Some(true)),
        Some("false") => Ok(Some(false)),
        Some(other) => Err(AppError::Validation(format!(
            "active must be \"true\" or \"false\", got \"{}\"",
            other
        ))),
    }
}

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List users, optionally filtered by active state
    pub async fn list_users(&self, active: Option<String>) -> AppResult<Vec<User>> {
        let filter = parse_active_filter(active.as_deref())?;
        self.repository.users.list(filter).await
    }

    /// Get a user together with their currently active loans
    pub async fn get_user(&self, id: i32) -> AppResult<UserWithLoans> {
        let user = self.repository.users.get_by_id(id).await?;
        let active_loans = self.repository.loans.get_user_active_loans(id).await?;

        Ok(UserWithLoans { user, active_loans })
    }

    /// Create a new user
    pub async fn create_user(&self, user: CreateUser) -> AppResult<User> {
        let (full_name, email, phone) = match (
            required(&user.full_name),
            required(&user.email),
            required(&user.phone),
        ) {
            (Some(full_name), Some(email), Some(phone)) => (full_name, email, phone),
            _ => {
                return Err(AppError::Validation(
                    "Missing required fields: full_name, email or phone".to_string(),
                ))
            }
        };

        user.validate()
            .map_err(|_| AppError::Validation("Email format is invalid".to_string()))?;

        if self.repository.users.email_exists(email, None).await? {
            return Err(AppError::Conflict(
                "Email is already registered to another user".to_string(),
            ));
        }

        self.repository
            .users
            .create(full_name, email, phone, user.address.as_deref())
            .await
    }

    /// Partially update a user
    pub async fn update_user(&self, id: i32, patch: UpdateUser) -> AppResult<User> {
        self.repository.users.get_by_id(id).await?;

        if patch.is_empty() {
            return Err(AppError::Validation(
                "No fields provided to update".to_string(),
            ));
        }

        patch
            .validate()
            .map_err(|_| AppError::Validation("Email format is invalid".to_string()))?;

        if let Some(ref email) = patch.email {
            if self.repository.users.email_exists(email, Some(id)).await? {
                return Err(AppError::Conflict(
                    "Email is already registered to another user".to_string(),
                ));
            }
        }

        self.repository.users.update(id, &patch).await
    }

    /// Deactivate (soft-delete) a user.
    ///
    /// Rejected while the user holds active loans. Deactivating an
    /// already-inactive user succeeds again: the operation is idempotent.
    pub async fn deactivate_user(&self, id: i32) -> AppResult<()> {
        self.repository.users.get_by_id(id).await?;

        let active_loans = self.repository.users.active_loan_count(id).await?;
        if active_loans > 0 {
            return Err(AppError::Validation(
                "Cannot deactivate a user with active loans".to_string(),
            ));
        }

        self.repository.users.deactivate(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_filter_accepts_only_booleans() {
        assert_eq!(parse_active_filter(None).unwrap(), None);
        assert_eq!(parse_active_filter(Some("true")).unwrap(), Some(true));
        assert_eq!(parse_active_filter(Some("false")).unwrap(), Some(false));
        assert!(parse_active_filter(Some("yes")).is_err());
        assert!(parse_active_filter(Some("1")).is_err());
    }
}
