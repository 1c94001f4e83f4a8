//! Categories repository for database operations

use std::collections::HashMap;

use sqlx::{FromRow, Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        book::Book,
        category::{BookInCategory, Category, CategoryDetails, CreateCategory},
    },
};

/// Category link joined with its book
#[derive(FromRow)]
struct BookLinkRow {
    category_id: Uuid,
    #[sqlx(flatten)]
    book: Book,
}

#[derive(Clone)]
pub struct CategoriesRepository {
    pool: Pool<Postgres>,
}

impl CategoriesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List categories with their books
    pub async fn list(&self) -> AppResult<Vec<CategoryDetails>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;

        if categories.is_empty() {
            return Ok(Vec::new());
        }

        let category_ids: Vec<Uuid> = categories.iter().map(|c| c.id).collect();
        let links = sqlx::query_as::<_, BookLinkRow>(
            r#"
            SELECT cb.category_id, b.*
            FROM categories_on_books cb
            JOIN books b ON b.id = cb.book_id
            WHERE cb.category_id = ANY($1)
            ORDER BY b.created_at, b.id
            "#,
        )
        .bind(&category_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut books: HashMap<Uuid, Vec<BookInCategory>> = HashMap::new();
        for link in links {
            books.entry(link.category_id).or_default().push(BookInCategory {
                book_id: link.book.id,
                category_id: link.category_id,
                book: link.book,
            });
        }

        Ok(categories
            .into_iter()
            .map(|category| CategoryDetails {
                books: books.remove(&category.id).unwrap_or_default(),
                category,
            })
            .collect())
    }

    /// Create a category
    pub async fn create(&self, data: &CreateCategory) -> AppResult<Category> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (id, name, description)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.name)
        .bind(&data.description)
        .fetch_one(&self.pool)
        .await?;
        Ok(category)
    }
}
