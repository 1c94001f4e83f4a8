//! Borrow record endpoints and the borrow/return workflow

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::{messages, AppResult, OrFail},
    models::borrow_record::{
        BorrowBook, BorrowRecord, BorrowRecordDetails, CreateBorrowRecord, UpdateBorrowRecord,
    },
};

use super::{parse_id, ActingUser, AppJson};

/// List borrow records with book, user and status
#[utoipa::path(
    get,
    path = "/borrow-records",
    tag = "borrow-records",
    responses(
        (status = 200, description = "All borrow records", body = Vec<BorrowRecordDetails>),
        (status = 500, description = "Store failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_borrow_records(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<BorrowRecordDetails>>> {
    let records = state
        .services
        .borrows
        .list_records()
        .await
        .or_fail(messages::LIST_RECORDS_FAILED)?;
    Ok(Json(records))
}

/// Get borrow record by ID
#[utoipa::path(
    get,
    path = "/borrow-records/{id}",
    tag = "borrow-records",
    params(
        ("id" = String, Path, description = "Borrow record ID")
    ),
    responses(
        (status = 200, description = "Borrow record", body = BorrowRecordDetails),
        (status = 404, description = "Record not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_borrow_record(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<BorrowRecordDetails>> {
    let id = parse_id(&id, messages::RECORD_NOT_FOUND)?;
    let record = state
        .services
        .borrows
        .get_record(id)
        .await
        .or_fail(messages::GET_RECORD_FAILED)?;
    Ok(Json(record))
}

/// Insert a borrow record as given; book availability is not changed
#[utoipa::path(
    post,
    path = "/borrow-records",
    tag = "borrow-records",
    request_body = CreateBorrowRecord,
    responses(
        (status = 201, description = "Record created", body = BorrowRecord),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_borrow_record(
    State(state): State<crate::AppState>,
    AppJson(data): AppJson<CreateBorrowRecord>,
) -> AppResult<(StatusCode, Json<BorrowRecord>)> {
    let record = state
        .services
        .borrows
        .create_record(data)
        .await
        .or_fail(messages::CREATE_RECORD_FAILED)?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Update `returnedDate` and `notes`; book availability is not changed
#[utoipa::path(
    put,
    path = "/borrow-records/{id}",
    tag = "borrow-records",
    params(
        ("id" = String, Path, description = "Borrow record ID")
    ),
    request_body = UpdateBorrowRecord,
    responses(
        (status = 200, description = "Record updated", body = BorrowRecord),
        (status = 404, description = "Record not found", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_borrow_record(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
    AppJson(data): AppJson<UpdateBorrowRecord>,
) -> AppResult<Json<BorrowRecord>> {
    let id = parse_id(&id, messages::RECORD_NOT_FOUND)?;
    let record = state
        .services
        .borrows
        .update_record(id, data)
        .await
        .or_fail(messages::UPDATE_RECORD_FAILED)?;
    Ok(Json(record))
}

/// Borrow a book on behalf of the acting user
#[utoipa::path(
    post,
    path = "/books/{id}/borrow",
    tag = "borrow-records",
    params(
        ("id" = String, Path, description = "Book ID"),
        ("X-User-Id" = String, Header, description = "Acting user")
    ),
    request_body = BorrowBook,
    responses(
        (status = 201, description = "Book borrowed", body = BorrowRecord),
        (status = 400, description = "Invalid request or missing X-User-Id", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Book already borrowed", body = crate::error::ErrorResponse)
    )
)]
pub async fn borrow_book(
    State(state): State<crate::AppState>,
    ActingUser(user_id): ActingUser,
    Path(id): Path<String>,
    AppJson(request): AppJson<BorrowBook>,
) -> AppResult<(StatusCode, Json<BorrowRecord>)> {
    let book_id = parse_id(&id, messages::BOOK_NOT_FOUND)?;
    let record = state
        .services
        .borrows
        .borrow_book(book_id, user_id, request)
        .await
        .or_fail(messages::BORROW_FAILED)?;
    Ok((StatusCode::CREATED, Json(record)))
}

/// Return a borrowed book
#[utoipa::path(
    post,
    path = "/borrow-records/{id}/return",
    tag = "borrow-records",
    params(
        ("id" = String, Path, description = "Borrow record ID")
    ),
    responses(
        (status = 200, description = "Book returned", body = BorrowRecord),
        (status = 404, description = "Record not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Record already returned", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_book(
    State(state): State<crate::AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<BorrowRecord>> {
    let id = parse_id(&id, messages::RECORD_NOT_FOUND)?;
    let record = state
        .services
        .borrows
        .return_book(id)
        .await
        .or_fail(messages::RETURN_FAILED)?;
    Ok(Json(record))
}
