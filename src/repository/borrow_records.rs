//! Borrow records repository for database operations
//!
//! The raw `create`/`update` methods touch only the record. `borrow` and
//! `return_record` also maintain the book's availability flag, inside one
//! transaction with the book row locked.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use super::{books::BooksRepository, users::UsersRepository};
use crate::{
    error::{messages, AppError, AppResult},
    models::{
        book::Book,
        borrow_record::{
            BorrowRecord, BorrowRecordDetails, CreateBorrowRecord, NewBorrow, UpdateBorrowRecord,
        },
        user::User,
    },
};

#[derive(Clone)]
pub struct BorrowRecordsRepository {
    pool: Pool<Postgres>,
    books: BooksRepository,
    users: UsersRepository,
}

impl BorrowRecordsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: BooksRepository::new(pool.clone()),
            users: UsersRepository::new(pool.clone()),
            pool,
        }
    }

    /// List every record with its book and user
    pub async fn list(&self) -> AppResult<Vec<BorrowRecordDetails>> {
        let records = sqlx::query_as::<_, BorrowRecord>(
            "SELECT * FROM borrow_records ORDER BY borrowed_date, id",
        )
        .fetch_all(&self.pool)
        .await?;

        self.with_relations(records).await
    }

    /// Get record by ID with its book and user
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<BorrowRecordDetails> {
        let record = self.find(id).await?;
        self.with_relations(vec![record])
            .await?
            .pop()
            .ok_or_else(|| AppError::NotFound(messages::RECORD_NOT_FOUND.to_string()))
    }

    /// Get the bare record row
    pub async fn find(&self, id: Uuid) -> AppResult<BorrowRecord> {
        sqlx::query_as::<_, BorrowRecord>("SELECT * FROM borrow_records WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(messages::RECORD_NOT_FOUND.to_string()))
    }

    /// Insert a record for an existing book, whatever its availability
    pub async fn create(&self, data: &CreateBorrowRecord) -> AppResult<BorrowRecord> {
        sqlx::query_as::<_, BorrowRecord>(
            r#"
            INSERT INTO borrow_records (
                id, borrowed_to, borrowed_date, due_date, returned_date, notes, book_id, user_id
            )
            SELECT $1, $2, COALESCE($3, NOW()), $4, $5, $6, $7, $8
            WHERE EXISTS (SELECT 1 FROM books WHERE id = $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.borrowed_to)
        .bind(data.borrowed_date)
        .bind(data.due_date)
        .bind(data.returned_date)
        .bind(&data.notes)
        .bind(data.book_id)
        .bind(data.user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(messages::BOOK_NOT_FOUND.to_string()))
    }

    /// Overwrite `returned_date` and/or `notes`; absent fields are kept, a null
    /// `notes` clears them
    pub async fn update(&self, id: Uuid, data: &UpdateBorrowRecord) -> AppResult<BorrowRecord> {
        sqlx::query_as::<_, BorrowRecord>(
            r#"
            UPDATE borrow_records
            SET returned_date = COALESCE($2, returned_date),
                notes = CASE WHEN $3 THEN $4 ELSE notes END
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(data.returned_date)
        .bind(data.notes.is_some())
        .bind(data.notes.clone().flatten())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(messages::RECORD_NOT_FOUND.to_string()))
    }

    /// Open a record and mark the book unavailable, atomically
    pub async fn borrow(&self, borrow: &NewBorrow) -> AppResult<BorrowRecord> {
        let mut tx = self.pool.begin().await?;

        // Concurrent borrows of the same book queue here
        let is_available: bool =
            sqlx::query_scalar("SELECT is_available FROM books WHERE id = $1 FOR UPDATE")
                .bind(borrow.book_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound(messages::BOOK_NOT_FOUND.to_string()))?;

        let has_open_record: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM borrow_records WHERE book_id = $1 AND returned_date IS NULL)",
        )
        .bind(borrow.book_id)
        .fetch_one(&mut *tx)
        .await?;

        if !is_available || has_open_record {
            return Err(AppError::Conflict(messages::BOOK_ALREADY_BORROWED.to_string()));
        }

        let record = sqlx::query_as::<_, BorrowRecord>(
            r#"
            INSERT INTO borrow_records (
                id, borrowed_to, borrowed_date, due_date, notes, book_id, user_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&borrow.borrowed_to)
        .bind(borrow.borrowed_date)
        .bind(borrow.due_date)
        .bind(&borrow.notes)
        .bind(borrow.book_id)
        .bind(borrow.user_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE books SET is_available = FALSE, updated_at = NOW() WHERE id = $1")
            .bind(borrow.book_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(record)
    }

    /// Close an open record and make the book available again, atomically
    pub async fn return_record(&self, id: Uuid, returned_at: DateTime<Utc>) -> AppResult<BorrowRecord> {
        let mut tx = self.pool.begin().await?;

        let record = sqlx::query_as::<_, BorrowRecord>(
            "SELECT * FROM borrow_records WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(messages::RECORD_NOT_FOUND.to_string()))?;

        if !record.is_open() {
            return Err(AppError::Conflict(messages::RECORD_ALREADY_RETURNED.to_string()));
        }

        // Absent when the book was deleted; the record is still closed
        sqlx::query("SELECT id FROM books WHERE id = $1 FOR UPDATE")
            .bind(record.book_id)
            .fetch_optional(&mut *tx)
            .await?;

        let returned = sqlx::query_as::<_, BorrowRecord>(
            "UPDATE borrow_records SET returned_date = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(returned_at)
        .fetch_one(&mut *tx)
        .await?;

        // Stays unavailable if another open record exists for the book
        sqlx::query(
            r#"
            UPDATE books
            SET is_available = NOT EXISTS (
                    SELECT 1 FROM borrow_records
                    WHERE book_id = $1 AND returned_date IS NULL
                ),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(record.book_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(returned)
    }

    /// Attach book and user, one query per relation
    async fn with_relations(&self, records: Vec<BorrowRecord>) -> AppResult<Vec<BorrowRecordDetails>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let mut book_ids: Vec<Uuid> = records.iter().map(|r| r.book_id).collect();
        book_ids.sort_unstable();
        book_ids.dedup();
        let mut user_ids: Vec<Uuid> = records.iter().map(|r| r.user_id).collect();
        user_ids.sort_unstable();
        user_ids.dedup();

        let books: HashMap<Uuid, Book> = self
            .books
            .find_by_ids(&book_ids)
            .await?
            .into_iter()
            .map(|b| (b.id, b))
            .collect();
        let users: HashMap<Uuid, User> = self
            .users
            .find_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let now = Utc::now();
        Ok(records
            .into_iter()
            .map(|record| {
                let book = books.get(&record.book_id).cloned();
                let user = users.get(&record.user_id).cloned();
                BorrowRecordDetails::new(record, book, user, now)
            })
            .collect())
    }
}
