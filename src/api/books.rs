//! Book catalog endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::{messages, AppResult, OrFail},
    models::book::{Book, BookDetails, BookFilter, CreateBook, UpdateBook},
};

use super::{parse_id, ActingUser, AppJson, AppQuery};

/// Confirmation body for deletions
#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// List books with owner, categories and borrow history
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(BookFilter),
    responses(
        (status = 200, description = "Books in creation order", body = Vec<BookDetails>),
        (status = 500, description = "Store failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    AppQuery(filter): AppQuery<BookFilter>,
) -> AppResult<Json<Vec<BookDetails>>> {
    let books = state
        .services
        .catalog
        .list_books(&filter)
        .await
        .or_fail(messages::LIST_BOOKS_FAILED)?;
    Ok(Json(books))
}

/// Get book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = BookDetails),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<BookDetails>> {
    let id = parse_id(&id, messages::BOOK_NOT_FOUND)?;
    let book = state
        .services
        .catalog
        .get_book(id)
        .await
        .or_fail(messages::GET_BOOK_FAILED)?;
    Ok(Json(book))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    params(
        ("X-User-Id" = Option<String>, Header, description = "Owner when the body has no userId")
    ),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 500, description = "Store failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    acting_user: Option<ActingUser>,
    AppJson(data): AppJson<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let book = state
        .services
        .catalog
        .create_book(data, acting_user.map(|u| u.0))
        .await
        .or_fail(messages::CREATE_BOOK_FAILED)?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Update a book; absent fields are left unchanged
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
    AppJson(data): AppJson<UpdateBook>,
) -> AppResult<Json<Book>> {
    let id = parse_id(&id, messages::BOOK_NOT_FOUND)?;
    let book = state
        .services
        .catalog
        .update_book(id, data)
        .await
        .or_fail(messages::UPDATE_BOOK_FAILED)?;
    Ok(Json(book))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = String, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book deleted", body = MessageResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let id = parse_id(&id, messages::BOOK_NOT_FOUND)?;
    state
        .services
        .catalog
        .delete_book(id)
        .await
        .or_fail(messages::DELETE_BOOK_FAILED)?;

    Ok(Json(MessageResponse {
        message: messages::BOOK_DELETED.to_string(),
    }))
}
