//! Catalog management service (books and categories)

use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{messages, AppError, AppResult},
    models::{
        book::{Book, BookDetails, BookFilter, CreateBook, UpdateBook},
        category::{Category, CategoryDetails, CreateCategory},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List books, optionally filtered
    pub async fn list_books(&self, filter: &BookFilter) -> AppResult<Vec<BookDetails>> {
        self.repository.books.list(filter).await
    }

    /// Get book by ID with its relations
    pub async fn get_book(&self, id: Uuid) -> AppResult<BookDetails> {
        self.repository.books.get_by_id(id).await
    }

    /// Create a book owned by `userId`, or by the acting user when absent
    pub async fn create_book(&self, data: CreateBook, acting_user: Option<Uuid>) -> AppResult<Book> {
        data.validate()?;

        let owner_id = data
            .user_id
            .or(acting_user)
            .ok_or_else(|| AppError::BadRequest(messages::MISSING_OWNER.to_string()))?;

        if !self.repository.users.exists(owner_id).await? {
            return Err(AppError::BadRequest(messages::UNKNOWN_USER.to_string()));
        }

        let book = self.repository.books.create(&data, owner_id).await?;
        tracing::info!("Catalog create: book id={} \"{}\"", book.id, book.title);
        Ok(book)
    }

    /// Apply a partial update to a book
    pub async fn update_book(&self, id: Uuid, data: UpdateBook) -> AppResult<Book> {
        data.validate()?;

        let book = self.repository.books.update(id, &data).await?;
        if data.is_available.is_some() {
            tracing::debug!(
                "Catalog update: book id={} availability set to {} outside the borrow workflow",
                id,
                book.is_available
            );
        }
        Ok(book)
    }

    /// Delete a book; its borrow records are kept
    pub async fn delete_book(&self, id: Uuid) -> AppResult<()> {
        self.repository.books.delete(id).await?;
        tracing::info!("Catalog delete: book id={}", id);
        Ok(())
    }

    /// List categories with their books
    pub async fn list_categories(&self) -> AppResult<Vec<CategoryDetails>> {
        self.repository.categories.list().await
    }

    /// Create a category
    pub async fn create_category(&self, data: CreateCategory) -> AppResult<Category> {
        data.validate()?;
        self.repository.categories.create(&data).await
    }
}
