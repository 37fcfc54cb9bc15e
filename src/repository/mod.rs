//! Repository layer for database operations

pub mod books;
pub mod loans;
pub mod users;

use sqlx::{Pool, Postgres};

use crate::error::AppResult;

/// Maximum concurrent connections held by the pool.
/// Callers queue on acquisition when all are in use.
pub const MAX_CONNECTIONS: u32 = 10;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub users: users::UsersRepository,
    pub loans: loans::LoansRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            loans: loans::LoansRepository::new(pool.clone()),
            pool,
        }
    }

    /// Trivial round-trip query to verify connectivity
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }
}
