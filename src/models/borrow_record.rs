//! Borrow record model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::book::Book;
use super::dates;
use super::patch;
use super::user::User;

/// Borrow record row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRecord {
    pub id: Uuid,
    /// Free-text borrower name
    pub borrowed_to: String,
    pub borrowed_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub returned_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub book_id: Uuid,
    /// User who recorded the loan
    pub user_id: Uuid,
}

/// Derived loan state. Never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BorrowStatus {
    Active,
    Overdue,
    Returned,
}

impl BorrowRecord {
    /// Open records have not been returned yet
    pub fn is_open(&self) -> bool {
        self.returned_date.is_none()
    }

    pub fn status_at(&self, now: DateTime<Utc>) -> BorrowStatus {
        if !self.is_open() {
            BorrowStatus::Returned
        } else if now > self.due_date {
            BorrowStatus::Overdue
        } else {
            BorrowStatus::Active
        }
    }
}

/// Borrow record with its book (absent once the book is deleted) and user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowRecordDetails {
    #[serde(flatten)]
    pub record: BorrowRecord,
    pub status: BorrowStatus,
    pub book: Option<Book>,
    pub user: Option<User>,
}

impl BorrowRecordDetails {
    pub fn new(record: BorrowRecord, book: Option<Book>, user: Option<User>, now: DateTime<Utc>) -> Self {
        Self {
            status: record.status_at(now),
            record,
            book,
            user,
        }
    }
}

/// Raw borrow record creation. Does not touch the book's availability flag.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBorrowRecord {
    pub borrowed_to: String,
    /// Defaults to now
    #[serde(default, deserialize_with = "dates::deserialize_option")]
    pub borrowed_date: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "dates::deserialize")]
    pub due_date: DateTime<Utc>,
    #[serde(default, deserialize_with = "dates::deserialize_option")]
    pub returned_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
    pub book_id: Uuid,
    pub user_id: Uuid,
}

/// Raw borrow record update. A present `returnedDate` overwrites any earlier
/// one; `notes: null` clears the notes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBorrowRecord {
    #[serde(default, deserialize_with = "dates::deserialize_option", skip_serializing_if = "Option::is_none")]
    pub returned_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "patch::nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub notes: Option<Option<String>>,
}

/// Borrow workflow request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowBook {
    #[validate(custom(function = "not_blank", message = "Le nom de l’emprunteur est requis."))]
    pub borrowed_to: String,
    #[serde(deserialize_with = "dates::deserialize")]
    pub due_date: DateTime<Utc>,
    /// Defaults to now
    #[serde(default, deserialize_with = "dates::deserialize_option", skip_serializing_if = "Option::is_none")]
    pub borrowed_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Fully resolved borrow, as written by the repository
#[derive(Debug, Clone)]
pub struct NewBorrow {
    pub book_id: Uuid,
    pub user_id: Uuid,
    pub borrowed_to: String,
    pub borrowed_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn record(returned: Option<DateTime<Utc>>) -> BorrowRecord {
        BorrowRecord {
            id: Uuid::new_v4(),
            borrowed_to: "Charlie".to_string(),
            borrowed_date: Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap(),
            due_date: Utc.with_ymd_and_hms(2025, 2, 10, 0, 0, 0).unwrap(),
            returned_date: returned,
            notes: None,
            book_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_status_is_derived_from_dates() {
        let open = record(None);
        assert!(open.is_open());
        assert_eq!(open.status_at(open.due_date - Duration::days(1)), BorrowStatus::Active);
        assert_eq!(open.status_at(open.due_date), BorrowStatus::Active);
        assert_eq!(open.status_at(open.due_date + Duration::seconds(1)), BorrowStatus::Overdue);

        let returned = record(Some(Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap()));
        assert!(!returned.is_open());
        assert_eq!(
            returned.status_at(returned.due_date + Duration::days(30)),
            BorrowStatus::Returned
        );
    }

    #[test]
    fn test_details_serialize_flat_camel_case() {
        let rec = record(None);
        let now = rec.due_date + Duration::days(2);
        let json = serde_json::to_value(BorrowRecordDetails::new(rec.clone(), None, None, now)).unwrap();

        assert_eq!(json["borrowedTo"], "Charlie");
        assert_eq!(json["bookId"], rec.book_id.to_string());
        assert_eq!(json["status"], "overdue");
        assert!(json["returnedDate"].is_null());
        assert!(json["book"].is_null());
    }

    #[test]
    fn test_borrow_request_validation() {
        let request: BorrowBook = serde_json::from_value(serde_json::json!({
            "borrowedTo": "   ",
            "dueDate": "2025-02-10"
        }))
        .unwrap();
        assert!(request.validate().is_err());

        let request: BorrowBook = serde_json::from_value(serde_json::json!({
            "borrowedTo": "Dana",
            "dueDate": "2025-02-10T00:00:00.000Z",
            "notes": "Retour anticipé"
        }))
        .unwrap();
        assert!(request.validate().is_ok());
        assert!(request.borrowed_date.is_none());
    }

    #[test]
    fn test_raw_create_requires_due_date() {
        let missing = serde_json::from_value::<CreateBorrowRecord>(serde_json::json!({
            "borrowedTo": "Eve",
            "bookId": Uuid::new_v4(),
            "userId": Uuid::new_v4()
        }));
        assert!(missing.is_err());
    }
}
