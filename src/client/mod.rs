//! Typed HTTP client for the Bookshelf API
//!
//! Every call that attributes data to someone sends the client's user in the
//! `X-User-Id` header. Search runs locally over the full book collection.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    api::USER_ID_HEADER,
    error::ErrorResponse,
    models::{
        book::{Book, BookDetails, BookFilter, CreateBook},
        borrow_record::{BorrowBook, BorrowRecord, BorrowRecordDetails},
        category::CategoryDetails,
    },
};

/// Base URL of a locally running server
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("API error {status}: {message}")]
    Api { status: StatusCode, message: String },
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status(),
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Clone)]
pub struct LibraryClient {
    http: Client,
    base_url: String,
    user_id: Uuid,
}

impl LibraryClient {
    /// Client acting as `user_id` against the API rooted at `base_url`
    pub fn new(base_url: &str, user_id: Uuid) -> ClientResult<Self> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id,
        })
    }

    /// Client for a server running locally on the default port
    pub fn local(user_id: Uuid) -> ClientResult<Self> {
        Self::new(DEFAULT_BASE_URL, user_id)
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Fetch all books
    pub async fn fetch_books(&self) -> ClientResult<Vec<BookDetails>> {
        self.send(self.http.get(self.url("/books"))).await
    }

    /// Fetch a book by ID
    pub async fn fetch_book(&self, id: Uuid) -> ClientResult<BookDetails> {
        self.send(self.http.get(self.url(&format!("/books/{}", id))))
            .await
    }

    /// Create a book owned by this client's user unless `userId` is set
    pub async fn create_book(&self, data: &CreateBook) -> ClientResult<Book> {
        self.send(
            self.http
                .post(self.url("/books"))
                .header(USER_ID_HEADER, self.user_id.to_string())
                .json(data),
        )
        .await
    }

    /// Search books by title, category and/or publication year.
    ///
    /// Fetches the whole collection and filters it here.
    pub async fn search_books(&self, filter: &BookFilter) -> ClientResult<Vec<BookDetails>> {
        let books = self.fetch_books().await?;
        Ok(filter.apply(books))
    }

    /// Fetch all categories
    pub async fn fetch_categories(&self) -> ClientResult<Vec<CategoryDetails>> {
        self.send(self.http.get(self.url("/categories"))).await
    }

    /// Borrow a book; the server opens the record and flips availability together
    pub async fn borrow_book(&self, book_id: Uuid, request: &BorrowBook) -> ClientResult<BorrowRecord> {
        self.send(
            self.http
                .post(self.url(&format!("/books/{}/borrow", book_id)))
                .header(USER_ID_HEADER, self.user_id.to_string())
                .json(request),
        )
        .await
    }

    /// Return a borrowed book by its record ID
    pub async fn return_book(&self, record_id: Uuid) -> ClientResult<BorrowRecord> {
        self.send(
            self.http
                .post(self.url(&format!("/borrow-records/{}/return", record_id))),
        )
        .await
    }

    /// Borrow records created by this client's user
    pub async fn fetch_borrowed_books(&self) -> ClientResult<Vec<BorrowRecordDetails>> {
        let records: Vec<BorrowRecordDetails> =
            self.send(self.http.get(self.url("/borrow-records"))).await?;
        Ok(records
            .into_iter()
            .filter(|r| r.record.user_id == self.user_id)
            .collect())
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = request.send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error)
            .unwrap_or(body);

        tracing::debug!("Bookshelf API returned {}: {}", status, message);
        Err(ClientError::Api { status, message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_client_targets_default_api() {
        let user_id = Uuid::new_v4();
        let client = LibraryClient::local(user_id).unwrap();

        assert_eq!(client.user_id(), user_id);
        assert_eq!(client.url("/books"), "http://localhost:3000/api/books");
    }

    #[test]
    fn test_trailing_slash_is_dropped() {
        let client = LibraryClient::new("http://example.test/api/", Uuid::nil()).unwrap();
        assert_eq!(client.url("/categories"), "http://example.test/api/categories");
    }
}
