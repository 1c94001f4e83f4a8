//! Borrow/return workflow and raw borrow record operations

use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::{
    error::{messages, AppError, AppResult},
    models::borrow_record::{
        BorrowBook, BorrowRecord, BorrowRecordDetails, CreateBorrowRecord, NewBorrow,
        UpdateBorrowRecord,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct BorrowsService {
    repository: Repository,
}

impl BorrowsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// List every borrow record
    pub async fn list_records(&self) -> AppResult<Vec<BorrowRecordDetails>> {
        self.repository.borrow_records.list().await
    }

    /// Get one borrow record by ID
    pub async fn get_record(&self, id: Uuid) -> AppResult<BorrowRecordDetails> {
        self.repository.borrow_records.get_by_id(id).await
    }

    /// Insert a record without touching the book's availability.
    /// A book may end up with several open records this way.
    pub async fn create_record(&self, data: CreateBorrowRecord) -> AppResult<BorrowRecord> {
        self.repository.borrow_records.create(&data).await
    }

    /// Update a record without touching the book's availability.
    /// Re-sending `returnedDate` overwrites the earlier return timestamp.
    pub async fn update_record(&self, id: Uuid, data: UpdateBorrowRecord) -> AppResult<BorrowRecord> {
        self.repository.borrow_records.update(id, &data).await
    }

    /// Lend a book: open a record and mark the book unavailable as one unit
    pub async fn borrow_book(
        &self,
        book_id: Uuid,
        acting_user: Uuid,
        request: BorrowBook,
    ) -> AppResult<BorrowRecord> {
        request.validate()?;

        let borrow = resolve_borrow(book_id, acting_user, request, Utc::now())?;

        if !self.repository.users.exists(acting_user).await? {
            return Err(AppError::BadRequest(messages::UNKNOWN_USER.to_string()));
        }

        let record = match self.repository.borrow_records.borrow(&borrow).await {
            Ok(record) => record,
            Err(AppError::Conflict(msg)) => {
                tracing::warn!("Borrow refused: book id={} is not available", book_id);
                return Err(AppError::Conflict(msg));
            }
            Err(e) => return Err(e),
        };

        tracing::info!(
            "Book id={} borrowed to \"{}\" until {} (record id={})",
            book_id,
            record.borrowed_to,
            record.due_date,
            record.id
        );
        Ok(record)
    }

    /// Take a book back: close the record and make the book available as one unit
    pub async fn return_book(&self, record_id: Uuid) -> AppResult<BorrowRecord> {
        let record = self
            .repository
            .borrow_records
            .return_record(record_id, Utc::now())
            .await?;

        tracing::info!(
            "Book id={} returned (record id={})",
            record.book_id,
            record.id
        );
        Ok(record)
    }
}

/// Fill in defaults and check the dates of a borrow request
fn resolve_borrow(
    book_id: Uuid,
    user_id: Uuid,
    request: BorrowBook,
    now: DateTime<Utc>,
) -> AppResult<NewBorrow> {
    let borrowed_date = request.borrowed_date.unwrap_or(now);

    // Compared by calendar day: a due date picked as "today" is valid
    if request.due_date.date_naive() < borrowed_date.date_naive() {
        return Err(AppError::BadRequest(messages::DUE_BEFORE_BORROWED.to_string()));
    }

    Ok(NewBorrow {
        book_id,
        user_id,
        borrowed_to: request.borrowed_to.trim().to_string(),
        borrowed_date,
        due_date: request.due_date,
        notes: request.notes.filter(|n| !n.trim().is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn request(due: DateTime<Utc>, borrowed: Option<DateTime<Utc>>) -> BorrowBook {
        BorrowBook {
            borrowed_to: "  Charlie ".to_string(),
            due_date: due,
            borrowed_date: borrowed,
            notes: Some(String::new()),
        }
    }

    #[test]
    fn test_borrowed_date_defaults_to_now() {
        let now = Utc.with_ymd_and_hms(2025, 1, 10, 15, 0, 0).unwrap();
        let borrow = resolve_borrow(
            Uuid::new_v4(),
            Uuid::new_v4(),
            request(now + Duration::days(14), None),
            now,
        )
        .unwrap();

        assert_eq!(borrow.borrowed_date, now);
        assert_eq!(borrow.borrowed_to, "Charlie");
        assert!(borrow.notes.is_none());
    }

    #[test]
    fn test_due_today_is_accepted() {
        let now = Utc.with_ymd_and_hms(2025, 1, 10, 15, 0, 0).unwrap();
        let midnight = Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap();
        assert!(resolve_borrow(Uuid::new_v4(), Uuid::new_v4(), request(midnight, None), now).is_ok());
    }

    #[test]
    fn test_due_before_borrowed_is_rejected() {
        let now = Utc.with_ymd_and_hms(2025, 1, 10, 15, 0, 0).unwrap();
        let borrowed = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
        let err = resolve_borrow(
            Uuid::new_v4(),
            Uuid::new_v4(),
            request(borrowed - Duration::days(1), Some(borrowed)),
            now,
        )
        .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(msg) if msg == messages::DUE_BEFORE_BORROWED));
    }
}
