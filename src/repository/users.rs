//! Users repository for database operations

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::user::{UpdateUser, User},
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List users, optionally filtered by active state
    pub async fn list(&self, is_active: Option<bool>) -> AppResult<Vec<User>> {
        let users = if let Some(active) = is_active {
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE is_active = $1 ORDER BY id")
                .bind(active)
                .fetch_all(&self.pool)
                .await?
        } else {
            sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id")
                .fetch_all(&self.pool)
                .await?
        };

        Ok(users)
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Check if an email is already registered
    pub async fn email_exists(&self, email: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1) AND id != $2)",
            )
            .bind(email)
            .bind(id)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE LOWER(email) = LOWER($1))")
                .bind(email)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    /// Create a new user; registration date is set server-side
    pub async fn create(
        &self,
        full_name: &str,
        email: &str,
        phone: &str,
        address: Option<&str>,
    ) -> AppResult<User> {
        let today = Utc::now().date_naive();

        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO users (full_name, email, phone, address, registration_date, is_active)
            VALUES ($1, $2, $3, $4, $5, TRUE)
            RETURNING id
            "#,
        )
        .bind(full_name)
        .bind(email)
        .bind(phone)
        .bind(address)
        .bind(today)
        .fetch_one(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    /// Update an existing user, applying only the supplied fields
    pub async fn update(&self, id: i32, user: &UpdateUser) -> AppResult<User> {
        // Build dynamic update query
        let mut sets = Vec::new();
        let mut param_idx = 1;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, param_idx));
                    param_idx += 1;
                }
            };
        }

        add_field!(user.full_name, "full_name");
        add_field!(user.email, "email");
        add_field!(user.phone, "phone");
        add_field!(user.address, "address");

        let query = format!(
            "UPDATE users SET {} WHERE id = ${}",
            sets.join(", "),
            param_idx
        );

        let mut builder = sqlx::query(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(user.full_name);
        bind_field!(user.email);
        bind_field!(user.phone);
        bind_field!(user.address);

        builder.bind(id).execute(&self.pool).await?;

        self.get_by_id(id).await
    }

    /// Count a user's currently active loans
    pub async fn active_loan_count(&self, id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM loans WHERE user_id = $1 AND status = 'active'",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Soft-delete a user by clearing the active flag
    pub async fn deactivate(&self, id: i32) -> AppResult<()> {
        sqlx::query("UPDATE users SET is_active = FALSE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
