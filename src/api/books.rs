//! Book catalog endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::book::{Book, CreateBook, SearchBooks, UpdateBook},
};

use super::{DataResponse, ListResponse};

/// Search response, echoing the term the results were produced with
#[derive(Serialize, ToSchema)]
pub struct SearchResponse {
    pub success: bool,
    pub count: usize,
    pub search: String,
    pub data: Vec<Book>,
}

/// List all books
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    responses(
        (status = 200, description = "List of books", body = ListResponse<Book>)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
) -> AppResult<Json<ListResponse<Book>>> {
    let books = state.services.catalog.list_books().await?;
    Ok(Json(ListResponse::new(books)))
}

/// Get a book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = DataResponse<Book>),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<DataResponse<Book>>> {
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(DataResponse::new(book)))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = DataResponse<Book>),
        (status = 400, description = "Missing required fields"),
        (status = 409, description = "ISBN already exists")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    Json(book): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<DataResponse<Book>>)> {
    let created = state.services.catalog.create_book(book).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::with_message(
            created,
            "Book created successfully",
        )),
    ))
}

/// Search books by title or author substring
#[utoipa::path(
    post,
    path = "/books/search",
    tag = "books",
    request_body = SearchBooks,
    responses(
        (status = 200, description = "Matching books", body = SearchResponse),
        (status = 400, description = "Missing search term")
    )
)]
pub async fn search_books(
    State(state): State<crate::AppState>,
    Json(request): Json<SearchBooks>,
) -> AppResult<Json<SearchResponse>> {
    let (search, books) = state.services.catalog.search_books(request.search).await?;

    Ok(Json(SearchResponse {
        success: true,
        count: books.len(),
        search,
        data: books,
    }))
}

/// Partially update a book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = DataResponse<Book>),
        (status = 400, description = "No fields supplied or invalid copy counts"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "ISBN already exists")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    Path(id): Path<i32>,
    Json(patch): Json<UpdateBook>,
) -> AppResult<Json<DataResponse<Book>>> {
    let updated = state.services.catalog.update_book(id, patch).await?;

    Ok(Json(DataResponse::with_message(
        updated,
        "Book updated successfully",
    )))
}
