//! Books repository for database operations

use std::collections::HashMap;

use sqlx::{FromRow, Pool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use super::users::UsersRepository;
use crate::{
    error::{messages, AppError, AppResult},
    models::{
        book::{Book, BookDetails, BookFilter, CreateBook, UpdateBook},
        borrow_record::BorrowRecord,
        category::{Category, CategoryOnBook},
        user::User,
    },
};

/// Category link joined with its category
#[derive(FromRow)]
struct CategoryLinkRow {
    book_id: Uuid,
    #[sqlx(flatten)]
    category: Category,
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
    users: UsersRepository,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            users: UsersRepository::new(pool.clone()),
            pool,
        }
    }

    /// List books matching a filter, with owner, categories and borrow records
    pub async fn list(&self, filter: &BookFilter) -> AppResult<Vec<BookDetails>> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT b.* FROM books b WHERE TRUE");

        if let Some(fragment) = filter.title_fragment() {
            // ICU folding matches Rust's `to_lowercase` whatever the database collation
            builder
                .push(r#" AND lower(b.title COLLATE "und-x-icu") LIKE lower("#)
                .push_bind(format!("%{}%", escape_like(fragment)))
                .push(r#" COLLATE "und-x-icu") ESCAPE '\'"#);
        }
        if let Some(category_id) = filter.category_id {
            builder
                .push(
                    " AND EXISTS (SELECT 1 FROM categories_on_books cb \
                     WHERE cb.book_id = b.id AND cb.category_id = ",
                )
                .push_bind(category_id)
                .push(")");
        }
        if let Some(year) = filter.publication_year {
            builder.push(" AND b.publication_year = ").push_bind(year);
        }
        builder.push(" ORDER BY b.created_at, b.id");

        let books = builder
            .build_query_as::<Book>()
            .fetch_all(&self.pool)
            .await?;

        self.with_relations(books).await
    }

    /// Get book by ID with its relations
    pub async fn get_by_id(&self, id: Uuid) -> AppResult<BookDetails> {
        let book = self.find(id).await?;
        self.with_relations(vec![book])
            .await?
            .pop()
            .ok_or_else(|| AppError::NotFound(messages::BOOK_NOT_FOUND.to_string()))
    }

    /// Get the bare book row
    pub async fn find(&self, id: Uuid) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(messages::BOOK_NOT_FOUND.to_string()))
    }

    /// Batch load bare book rows, for eager joins
    pub async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Book>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let books = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    /// Create a book and its category links
    pub async fn create(&self, data: &CreateBook, owner_id: Uuid) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let book = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (
                id, title, author, isbn, description, cover_image_url, publication_year,
                publisher, page_count, language, is_available, user_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&data.title)
        .bind(&data.author)
        .bind(&data.isbn)
        .bind(&data.description)
        .bind(&data.cover_image_url)
        .bind(data.publication_year)
        .bind(&data.publisher)
        .bind(data.page_count)
        .bind(&data.language)
        .bind(data.is_available.unwrap_or(true))
        .bind(owner_id)
        .fetch_one(&mut *tx)
        .await?;

        link_categories(&mut tx, book.id, &data.category_ids).await?;

        tx.commit().await?;
        Ok(book)
    }

    /// Apply a partial update; `category_ids`, when present, replaces every link
    pub async fn update(&self, id: Uuid, data: &UpdateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let book = if data.touches_no_column() {
            sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
        } else {
            let mut builder = QueryBuilder::<Postgres>::new("UPDATE books SET updated_at = NOW()");

            macro_rules! set_field {
                ($field:expr, $column:literal) => {
                    if let Some(ref value) = $field {
                        builder
                            .push(concat!(", ", $column, " = "))
                            .push_bind(value.clone());
                    }
                };
            }

            set_field!(data.title, "title");
            set_field!(data.author, "author");
            set_field!(data.isbn, "isbn");
            set_field!(data.description, "description");
            set_field!(data.cover_image_url, "cover_image_url");
            set_field!(data.publication_year, "publication_year");
            set_field!(data.publisher, "publisher");
            set_field!(data.page_count, "page_count");
            set_field!(data.language, "language");
            set_field!(data.user_id, "user_id");
            set_field!(data.is_available, "is_available");

            builder.push(" WHERE id = ").push_bind(id).push(" RETURNING *");

            builder
                .build_query_as::<Book>()
                .fetch_optional(&mut *tx)
                .await?
        }
        .ok_or_else(|| AppError::NotFound(messages::BOOK_NOT_FOUND.to_string()))?;

        if let Some(ref category_ids) = data.category_ids {
            sqlx::query("DELETE FROM categories_on_books WHERE book_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            link_categories(&mut tx, id, category_ids).await?;
        }

        tx.commit().await?;
        Ok(book)
    }

    /// Delete a book. Its category links go with it; its borrow records stay.
    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(messages::BOOK_NOT_FOUND.to_string()));
        }
        Ok(())
    }

    /// Attach owner, categories and borrow records, one query per relation
    async fn with_relations(&self, books: Vec<Book>) -> AppResult<Vec<BookDetails>> {
        if books.is_empty() {
            return Ok(Vec::new());
        }

        let book_ids: Vec<Uuid> = books.iter().map(|b| b.id).collect();
        let mut owner_ids: Vec<Uuid> = books.iter().map(|b| b.user_id).collect();
        owner_ids.sort_unstable();
        owner_ids.dedup();

        let owners: HashMap<Uuid, User> = self
            .users
            .find_by_ids(&owner_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();

        let links = sqlx::query_as::<_, CategoryLinkRow>(
            r#"
            SELECT cb.book_id, c.*
            FROM categories_on_books cb
            JOIN categories c ON c.id = cb.category_id
            WHERE cb.book_id = ANY($1)
            ORDER BY c.created_at, c.id
            "#,
        )
        .bind(&book_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut categories: HashMap<Uuid, Vec<CategoryOnBook>> = HashMap::new();
        for link in links {
            categories.entry(link.book_id).or_default().push(CategoryOnBook {
                book_id: link.book_id,
                category_id: link.category.id,
                category: link.category,
            });
        }

        let records = sqlx::query_as::<_, BorrowRecord>(
            "SELECT * FROM borrow_records WHERE book_id = ANY($1) ORDER BY borrowed_date, id",
        )
        .bind(&book_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut borrow_records: HashMap<Uuid, Vec<BorrowRecord>> = HashMap::new();
        for record in records {
            borrow_records.entry(record.book_id).or_default().push(record);
        }

        Ok(books
            .into_iter()
            .map(|book| BookDetails {
                user: owners.get(&book.user_id).cloned(),
                categories: categories.remove(&book.id).unwrap_or_default(),
                borrow_records: borrow_records.remove(&book.id).unwrap_or_default(),
                book,
            })
            .collect())
    }
}

async fn link_categories(
    tx: &mut Transaction<'_, Postgres>,
    book_id: Uuid,
    category_ids: &[Uuid],
) -> AppResult<()> {
    if category_ids.is_empty() {
        return Ok(());
    }

    sqlx::query(
        r#"
        INSERT INTO categories_on_books (book_id, category_id)
        SELECT $1, UNNEST($2::uuid[])
        ON CONFLICT DO NOTHING
        "#,
    )
    .bind(book_id)
    .bind(category_ids)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Escape LIKE wildcards so a title fragment matches literally
fn escape_like(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len());
    for c in fragment.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
