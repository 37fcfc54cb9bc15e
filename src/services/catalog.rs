//! Book catalog service

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
    repository::Repository,
};

fn required<'a>(value: &'a Option<String>) -> Option<&'a str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List all books
    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list().await
    }

    /// Get a book by ID
    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Create a new book
    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        let (title, author, isbn) = match (
            required(&book.title),
            required(&book.author),
            required(&book.isbn),
        ) {
            (Some(title), Some(author), Some(isbn)) => (title, author, isbn),
            _ => {
                return Err(AppError::Validation(
                    "Missing required fields: title, author or isbn".to_string(),
                ))
            }
        };

        if self.repository.books.isbn_exists(isbn, None).await? {
            return Err(AppError::Conflict("ISBN already exists".to_string()));
        }

        let total_copies = book.total_copies.unwrap_or(1);
        if total_copies < 0 {
            return Err(AppError::Validation(
                "total_copies cannot be negative".to_string(),
            ));
        }

        self.repository
            .books
            .create(
                title,
                author,
                isbn,
                book.category.as_deref(),
                total_copies,
                book.publication_year,
            )
            .await
    }

    /// Search books by title or author substring
    pub async fn search_books(&self, term: Option<String>) -> AppResult<(String, Vec<Book>)> {
        let term = match required(&term) {
            Some(term) => term.to_string(),
            None => {
                return Err(AppError::Validation(
                    "A search term is required".to_string(),
                ))
            }
        };

        let books = self.repository.books.search(&term).await?;
        Ok((term, books))
    }

    /// Partially update a book
    pub async fn update_book(&self, id: i32, patch: UpdateBook) -> AppResult<Book> {
        let current = self.repository.books.get_by_id(id).await?;

        if patch.is_empty() {
            return Err(AppError::Validation(
                "No fields provided to update".to_string(),
            ));
        }

        // The availability invariant is checked against the merged row so
        // a patch can never leave available_copies above total_copies.
        let total_copies = patch.total_copies.unwrap_or(current.total_copies);
        let available_copies = patch.available_copies.unwrap_or(current.available_copies);

        if available_copies < 0 || total_copies < 0 {
            return Err(AppError::Validation(
                "Copy counts cannot be negative".to_string(),
            ));
        }
        if available_copies > total_copies {
            return Err(AppError::Validation(
                "Available copies cannot exceed total copies".to_string(),
            ));
        }

        if let Some(ref isbn) = patch.isbn {
            if self.repository.books.isbn_exists(isbn, Some(id)).await? {
                return Err(AppError::Conflict("ISBN already exists".to_string()));
            }
        }

        self.repository.books.update(id, &patch).await
    }
}
