//! Book model and related types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Book model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub category: Option<String>,
    pub total_copies: i32,
    pub available_copies: i32,
    pub publication_year: Option<i16>,
}

/// Create book request. Presence of the required fields is checked in
/// the service layer.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub category: Option<String>,
    pub total_copies: Option<i32>,
    pub publication_year: Option<i16>,
}

/// Partial update request for a book
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub category: Option<String>,
    pub total_copies: Option<i32>,
    pub available_copies: Option<i32>,
    pub publication_year: Option<i16>,
}

impl UpdateBook {
    /// True when no recognized field was supplied
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.isbn.is_none()
            && self.category.is_none()
            && self.total_copies.is_none()
            && self.available_copies.is_none()
            && self.publication_year.is_none()
    }
}

/// Search request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct SearchBooks {
    pub search: Option<String>,
}
