//! Data models for Bookshelf

pub mod book;
pub mod borrow_record;
pub mod category;
pub mod dates;
pub mod patch;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookDetails, BookFilter};
pub use borrow_record::{BorrowRecord, BorrowRecordDetails, BorrowStatus};
pub use category::{Category, CategoryDetails, CategoryOnBook};
pub use user::User;
