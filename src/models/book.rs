//! Book model and search filter

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::borrow_record::BorrowRecord;
use super::category::CategoryOnBook;
use super::patch;
use super::user::User;

/// Book row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub publication_year: Option<i32>,
    pub publisher: Option<String>,
    pub page_count: Option<i32>,
    pub language: Option<String>,
    /// Mirrors "no open borrow record exists for this book"
    pub is_available: bool,
    /// Owner
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Book with its owner, categories and borrow history
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookDetails {
    #[serde(flatten)]
    pub book: Book,
    pub user: Option<User>,
    pub categories: Vec<CategoryOnBook>,
    pub borrow_records: Vec<BorrowRecord>,
}

impl BookDetails {
    pub fn has_category(&self, category_id: Uuid) -> bool {
        self.categories.iter().any(|c| c.category_id == category_id)
    }
}

/// Create book request
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Le titre est requis."))]
    pub title: String,
    #[validate(length(min = 1, message = "L’auteur est requis."))]
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "Le nombre de pages doit être positif."))]
    pub page_count: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Owner; defaults to the acting user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    /// Defaults to true
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub category_ids: Vec<Uuid>,
}

/// Partial book update. Absent fields are left unchanged; `null` clears an
/// optional column.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBook {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Le titre est requis."))]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "L’auteur est requis."))]
    pub author: Option<String>,
    #[serde(default, deserialize_with = "patch::nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub isbn: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch::nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch::nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub cover_image_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch::nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<i32>)]
    pub publication_year: Option<Option<i32>>,
    #[serde(default, deserialize_with = "patch::nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub publisher: Option<Option<String>>,
    #[serde(default, deserialize_with = "patch::nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<i32>)]
    #[validate(range(min = 1, message = "Le nombre de pages doit être positif."))]
    pub page_count: Option<Option<i32>>,
    #[serde(default, deserialize_with = "patch::nullable", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub language: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_available: Option<bool>,
    /// Replaces every category link when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_ids: Option<Vec<Uuid>>,
}

impl UpdateBook {
    /// True when no column of the book row itself changes
    pub fn touches_no_column(&self) -> bool {
        self.title.is_none()
            && self.author.is_none()
            && self.isbn.is_none()
            && self.description.is_none()
            && self.cover_image_url.is_none()
            && self.publication_year.is_none()
            && self.publisher.is_none()
            && self.page_count.is_none()
            && self.language.is_none()
            && self.user_id.is_none()
            && self.is_available.is_none()
    }
}

/// Book search filter. Every absent dimension matches all books.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, IntoParams, ToSchema)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BookFilter {
    /// Case-insensitive title fragment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Only books linked to this category
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    /// Exact publication year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_year: Option<i32>,
}

impl BookFilter {
    /// Title fragment, if one was given and is not blank. Matched as given,
    /// surrounding spaces included.
    pub fn title_fragment(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.trim().is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.title_fragment().is_none()
            && self.category_id.is_none()
            && self.publication_year.is_none()
    }

    pub fn matches(&self, book: &BookDetails) -> bool {
        if let Some(fragment) = self.title_fragment() {
            if !book
                .book
                .title
                .to_lowercase()
                .contains(&fragment.to_lowercase())
            {
                return false;
            }
        }

        if let Some(category_id) = self.category_id {
            if !book.has_category(category_id) {
                return false;
            }
        }

        if let Some(year) = self.publication_year {
            if book.book.publication_year != Some(year) {
                return false;
            }
        }

        true
    }

    /// Filter an already fetched collection, keeping its order
    pub fn apply(&self, books: Vec<BookDetails>) -> Vec<BookDetails> {
        if self.is_empty() {
            return books;
        }
        books.into_iter().filter(|b| self.matches(b)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::category::Category;
    use crate::seed::DEMO_BOOKS;

    fn details(title: &str, year: Option<i32>, categories: &[Uuid]) -> BookDetails {
        let now = Utc::now();
        let id = Uuid::new_v4();
        BookDetails {
            book: Book {
                id,
                title: title.to_string(),
                author: "Someone".to_string(),
                isbn: None,
                description: None,
                cover_image_url: None,
                publication_year: year,
                publisher: None,
                page_count: None,
                language: None,
                is_available: true,
                user_id: Uuid::nil(),
                created_at: now,
                updated_at: now,
            },
            user: None,
            categories: categories
                .iter()
                .map(|&category_id| CategoryOnBook {
                    book_id: id,
                    category_id,
                    category: Category {
                        id: category_id,
                        name: "Fiction".to_string(),
                        description: None,
                        created_at: now,
                    },
                })
                .collect(),
            borrow_records: Vec::new(),
        }
    }

    fn titles(books: &[BookDetails]) -> Vec<&str> {
        books.iter().map(|b| b.book.title.as_str()).collect()
    }

    fn demo_fixture() -> Vec<BookDetails> {
        DEMO_BOOKS
            .iter()
            .map(|b| details(b.title, Some(b.publication_year), &[]))
            .collect()
    }

    #[test]
    fn test_empty_filter_returns_everything_in_order() {
        let books = demo_fixture();
        let expected: Vec<String> = books.iter().map(|b| b.book.title.clone()).collect();

        let filtered = BookFilter::default().apply(books);
        assert_eq!(titles(&filtered), expected);
    }

    #[test]
    fn test_blank_title_counts_as_absent() {
        let filter = BookFilter {
            title: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(filter.is_empty());
        assert!(filter.matches(&details("Dune", None, &[])));
    }

    #[test]
    fn test_title_fragment_keeps_surrounding_spaces() {
        let books = vec![
            details("Fahrenheit 451", Some(1953), &[]),
            details("451 degrés", None, &[]),
        ];
        let filter = BookFilter {
            title: Some(" 451".to_string()),
            ..Default::default()
        };

        assert_eq!(filter.title_fragment(), Some(" 451"));
        assert_eq!(titles(&filter.apply(books)), vec!["Fahrenheit 451"]);
    }

    #[test]
    fn test_title_fragment_is_case_insensitive() {
        let books = vec![details("Dune", Some(1965), &[]), details("1984", Some(1949), &[])];
        let filter = BookFilter {
            title: Some("dune".to_string()),
            ..Default::default()
        };

        assert_eq!(titles(&filter.apply(books)), vec!["Dune"]);
    }

    #[test]
    fn test_publication_year_over_demo_fixture() {
        let filter = BookFilter {
            publication_year: Some(1949),
            ..Default::default()
        };

        assert_eq!(titles(&filter.apply(demo_fixture())), vec!["1984"]);
    }

    #[test]
    fn test_category_membership() {
        let fiction = Uuid::new_v4();
        let other = Uuid::new_v4();
        let books = vec![
            details("La Peste", Some(1947), &[fiction]),
            details("Moby Dick", Some(1851), &[other]),
            details("Dune", Some(1965), &[]),
        ];
        let filter = BookFilter {
            category_id: Some(fiction),
            ..Default::default()
        };

        assert_eq!(titles(&filter.apply(books)), vec!["La Peste"]);
    }

    #[test]
    fn test_all_dimensions_must_match() {
        let fiction = Uuid::new_v4();
        let book = details("L’étranger", Some(1942), &[fiction]);

        let hit = BookFilter {
            title: Some("ÉTRANGER".to_string()),
            category_id: Some(fiction),
            publication_year: Some(1942),
        };
        assert!(hit.matches(&book));

        let wrong_year = BookFilter {
            publication_year: Some(1943),
            ..hit.clone()
        };
        assert!(!wrong_year.matches(&book));
    }

    #[test]
    fn test_filter_query_string_names() {
        let filter: BookFilter = serde_json::from_value(serde_json::json!({
            "title": "dune",
            "publicationYear": 1965
        }))
        .unwrap();
        assert_eq!(filter.title_fragment(), Some("dune"));
        assert_eq!(filter.publication_year, Some(1965));
        assert!(filter.category_id.is_none());
    }

    #[test]
    fn test_update_null_clears_optional_column() {
        let update: UpdateBook = serde_json::from_value(serde_json::json!({
            "isbn": null,
            "publisher": "Gallimard"
        }))
        .unwrap();

        assert_eq!(update.isbn, Some(None));
        assert_eq!(update.publisher, Some(Some("Gallimard".to_string())));
        assert_eq!(update.description, None);
        assert!(!update.touches_no_column());
    }

    #[test]
    fn test_update_page_count_must_be_positive() {
        let update = UpdateBook {
            page_count: Some(Some(0)),
            ..Default::default()
        };
        assert!(update.validate().is_err());

        let cleared = UpdateBook {
            page_count: Some(None),
            ..Default::default()
        };
        assert!(cleared.validate().is_ok());
    }

    #[test]
    fn test_update_without_columns() {
        let update = UpdateBook {
            category_ids: Some(vec![Uuid::new_v4()]),
            ..Default::default()
        };
        assert!(update.touches_no_column());

        let update = UpdateBook {
            is_available: Some(false),
            ..Default::default()
        };
        assert!(!update.touches_no_column());
    }
}
