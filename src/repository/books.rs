//! Books repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, UpdateBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all books
    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(books)
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Check if an ISBN is already registered
    pub async fn isbn_exists(&self, isbn: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1 AND id != $2)")
                .bind(isbn)
                .bind(id)
                .fetch_one(&self.pool)
                .await?
        } else {
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1)")
                .bind(isbn)
                .fetch_one(&self.pool)
                .await?
        };
        Ok(exists)
    }

    /// Create a new book
    pub async fn create(
        &self,
        title: &str,
        author: &str,
        isbn: &str,
        category: Option<&str>,
        total_copies: i32,
        publication_year: Option<i16>,
    ) -> AppResult<Book> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO books (title, author, isbn, category, total_copies, available_copies, publication_year)
            VALUES ($1, $2, $3, $4, $5, $5, $6)
            RETURNING id
            "#,
        )
        .bind(title)
        .bind(author)
        .bind(isbn)
        .bind(category)
        .bind(total_copies)
        .bind(publication_year)
        .fetch_one(&self.pool)
        .await?;

        self.get_by_id(id).await
    }

    /// Search books by title or author substring, case-insensitive
    pub async fn search(&self, term: &str) -> AppResult<Vec<Book>> {
        let pattern = format!("%{}%", term);

        let books = sqlx::query_as::<_, Book>(
            "SELECT * FROM books WHERE title ILIKE $1 OR author ILIKE $1 ORDER BY id",
        )
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }

    /// Update an existing book, applying only the supplied fields
    pub async fn update(&self, id: i32, book: &UpdateBook) -> AppResult<Book> {
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

        add_field!(book.title, "title");
        add_field!(book.author, "author");
        add_field!(book.isbn, "isbn");
        add_field!(book.category, "category");
        add_field!(book.total_copies, "total_copies");
        add_field!(book.available_copies, "available_copies");
        add_field!(book.publication_year, "publication_year");

        let query = format!(
            "UPDATE books SET {} WHERE id = ${}",
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

        bind_field!(book.title);
        bind_field!(book.author);
        bind_field!(book.isbn);
        bind_field!(book.category);
        bind_field!(book.total_copies);
        bind_field!(book.available_copies);
        bind_field!(book.publication_year);

        builder.bind(id).execute(&self.pool).await?;

        self.get_by_id(id).await
    }
}
