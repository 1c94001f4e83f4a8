//! Demo data set
//!
//! Wipes the store and loads two users, three categories, ten books and three
//! borrow records. Books are assigned to categories cyclically.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error::{AppError, AppResult};

pub struct DemoUser {
    pub email: &'static str,
    pub name: &'static str,
    pub password: &'static str,
}

pub struct DemoCategory {
    pub name: &'static str,
    pub description: &'static str,
}

pub struct DemoBook {
    pub title: &'static str,
    pub author: &'static str,
    pub isbn: &'static str,
    pub description: &'static str,
    pub cover_image_url: &'static str,
    pub publication_year: i32,
    pub publisher: &'static str,
    pub page_count: i32,
    pub language: &'static str,
    /// Index into `DEMO_USERS`
    pub owner: usize,
}

pub struct DemoBorrow {
    /// Index into `DEMO_BOOKS`
    pub book: usize,
    /// Index into `DEMO_USERS`
    pub user: usize,
    pub borrowed_to: &'static str,
    pub borrowed_date: &'static str,
    pub due_date: &'static str,
    pub returned_date: Option<&'static str>,
    pub notes: &'static str,
}

pub const DEMO_USERS: &[DemoUser] = &[
    DemoUser {
        email: "alice@example.com",
        name: "Alice",
        password: "hashed_password_1",
    },
    DemoUser {
        email: "bob@example.com",
        name: "Bob",
        password: "hashed_password_2",
    },
];

pub const DEMO_CATEGORIES: &[DemoCategory] = &[
    DemoCategory {
        name: "Fiction",
        description: "Littérature de fiction",
    },
    DemoCategory {
        name: "Non-Fiction",
        description: "Littérature documentaire",
    },
    DemoCategory {
        name: "Science-Fiction",
        description: "Romans de science-fiction",
    },
];

pub const DEMO_BOOKS: &[DemoBook] = &[
    DemoBook {
        title: "1984",
        author: "George Orwell",
        isbn: "9780451524935",
        description: "Un roman dystopique",
        cover_image_url: "https://example.com/1984.jpg",
        publication_year: 1949,
        publisher: "Secker & Warburg",
        page_count: 328,
        language: "Anglais",
        owner: 0,
    },
    DemoBook {
        title: "Le Meilleur des mondes",
        author: "Aldous Huxley",
        isbn: "9782070360024",
        description: "Un futur où le bonheur est manufacturé",
        cover_image_url: "https://example.com/meilleurdesmondes.jpg",
        publication_year: 1932,
        publisher: "Chatto & Windus",
        page_count: 311,
        language: "Français",
        owner: 0,
    },
    DemoBook {
        title: "Dune",
        author: "Frank Herbert",
        isbn: "9780441013593",
        description: "Une épopée de science-fiction se déroulant sur une planète désertique",
        cover_image_url: "https://example.com/dune.jpg",
        publication_year: 1965,
        publisher: "Chilton Books",
        page_count: 412,
        language: "Anglais",
        owner: 1,
    },
    DemoBook {
        title: "Fahrenheit 451",
        author: "Ray Bradbury",
        isbn: "9781451673319",
        description: "Un monde où les livres sont interdits",
        cover_image_url: "https://example.com/fahrenheit451.jpg",
        publication_year: 1953,
        publisher: "Ballantine Books",
        page_count: 194,
        language: "Anglais",
        owner: 0,
    },
    DemoBook {
        title: "L’étranger",
        author: "Albert Camus",
        isbn: "9782070360025",
        description: "Roman existentiel et absurde",
        cover_image_url: "https://example.com/letranger.jpg",
        publication_year: 1942,
        publisher: "Gallimard",
        page_count: 123,
        language: "Français",
        owner: 1,
    },
    DemoBook {
        title: "Harry Potter à l'école des sorciers",
        author: "J.K. Rowling",
        isbn: "9780747532743",
        description: "Premier tome des aventures d'Harry Potter",
        cover_image_url: "https://example.com/harrypotter1.jpg",
        publication_year: 1997,
        publisher: "Bloomsbury",
        page_count: 223,
        language: "Anglais",
        owner: 0,
    },
    DemoBook {
        title: "Le Seigneur des anneaux : La communauté de l’anneau",
        author: "J.R.R. Tolkien",
        isbn: "9780261102354",
        description: "Première partie de l’épopée du Seigneur des Anneaux",
        cover_image_url: "https://example.com/lotr1.jpg",
        publication_year: 1954,
        publisher: "Allen & Unwin",
        page_count: 423,
        language: "Anglais",
        owner: 1,
    },
    DemoBook {
        title: "L’Attrape-cœurs",
        author: "J.D. Salinger",
        isbn: "9780316769488",
        description: "Roman sur l’adolescence et la rébellion",
        cover_image_url: "https://example.com/attrapecoeurs.jpg",
        publication_year: 1951,
        publisher: "Little, Brown and Company",
        page_count: 277,
        language: "Anglais",
        owner: 0,
    },
    DemoBook {
        title: "La Peste",
        author: "Albert Camus",
        isbn: "9782070360427",
        description: "Roman allégorique sur une épidémie",
        cover_image_url: "https://example.com/lapeste.jpg",
        publication_year: 1947,
        publisher: "Gallimard",
        page_count: 308,
        language: "Français",
        owner: 1,
    },
    DemoBook {
        title: "Moby Dick",
        author: "Herman Melville",
        isbn: "9780142437247",
        description: "La quête obsessionnelle d'un capitaine pour chasser une baleine",
        cover_image_url: "https://example.com/mobydick.jpg",
        publication_year: 1851,
        publisher: "Harper & Brothers",
        page_count: 635,
        language: "Anglais",
        owner: 0,
    },
];

pub const DEMO_BORROWS: &[DemoBorrow] = &[
    DemoBorrow {
        book: 0,
        user: 0,
        borrowed_to: "Charlie",
        borrowed_date: "2025-01-10",
        due_date: "2025-02-10",
        returned_date: None,
        notes: "Emprunt pour étude",
    },
    DemoBorrow {
        book: 3,
        user: 1,
        borrowed_to: "Dana",
        borrowed_date: "2025-03-05",
        due_date: "2025-04-05",
        returned_date: Some("2025-04-02"),
        notes: "Retour anticipé",
    },
    DemoBorrow {
        book: 6,
        user: 0,
        borrowed_to: "Eve",
        borrowed_date: "2025-02-20",
        due_date: "2025-03-20",
        returned_date: None,
        notes: "Emprunt de longue durée",
    },
];

fn demo_date(value: &str) -> AppResult<DateTime<Utc>> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| AppError::Internal(format!("invalid seed date {}", value)))
}

/// True when the book at `index` has an open demo borrow
fn is_borrowed(index: usize) -> bool {
    DEMO_BORROWS
        .iter()
        .any(|b| b.book == index && b.returned_date.is_none())
}

/// Replace the store's content with the demo data set
pub async fn seed_demo_data(pool: &Pool<Postgres>) -> AppResult<()> {
    let mut tx = pool.begin().await?;

    for table in ["borrow_records", "categories_on_books", "books", "categories", "users"] {
        sqlx::query(&format!("DELETE FROM {}", table))
            .execute(&mut *tx)
            .await?;
    }

    let mut user_ids = Vec::with_capacity(DEMO_USERS.len());
    for user in DEMO_USERS {
        let id = Uuid::new_v4();
        sqlx::query("INSERT INTO users (id, email, name, password) VALUES ($1, $2, $3, $4)")
            .bind(id)
            .bind(user.email)
            .bind(user.name)
            .bind(user.password)
            .execute(&mut *tx)
            .await?;
        user_ids.push(id);
    }

    let mut category_ids = Vec::with_capacity(DEMO_CATEGORIES.len());
    for category in DEMO_CATEGORIES {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO categories (id, name, description, created_at) VALUES ($1, $2, $3, clock_timestamp())",
        )
        .bind(id)
        .bind(category.name)
        .bind(category.description)
        .execute(&mut *tx)
        .await?;
        category_ids.push(id);
    }

    let mut book_ids = Vec::with_capacity(DEMO_BOOKS.len());
    for (index, book) in DEMO_BOOKS.iter().enumerate() {
        let id = Uuid::new_v4();
        // clock_timestamp() keeps insertion order visible in created_at inside one transaction
        sqlx::query(
            r#"
            INSERT INTO books (
                id, title, author, isbn, description, cover_image_url, publication_year,
                publisher, page_count, language, is_available, user_id, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, clock_timestamp(), clock_timestamp())
            "#,
        )
        .bind(id)
        .bind(book.title)
        .bind(book.author)
        .bind(book.isbn)
        .bind(book.description)
        .bind(book.cover_image_url)
        .bind(book.publication_year)
        .bind(book.publisher)
        .bind(book.page_count)
        .bind(book.language)
        .bind(!is_borrowed(index))
        .bind(user_ids[book.owner])
        .execute(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO categories_on_books (book_id, category_id) VALUES ($1, $2)")
            .bind(id)
            .bind(category_ids[index % category_ids.len()])
            .execute(&mut *tx)
            .await?;

        book_ids.push(id);
    }

    for borrow in DEMO_BORROWS {
        let returned_date = borrow.returned_date.map(demo_date).transpose()?;
        sqlx::query(
            r#"
            INSERT INTO borrow_records (
                id, borrowed_to, borrowed_date, due_date, returned_date, notes, book_id, user_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(borrow.borrowed_to)
        .bind(demo_date(borrow.borrowed_date)?)
        .bind(demo_date(borrow.due_date)?)
        .bind(returned_date)
        .bind(borrow.notes)
        .bind(book_ids[borrow.book])
        .bind(user_ids[borrow.user])
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    tracing::info!(
        "Seeded {} users, {} categories, {} books, {} borrow records",
        DEMO_USERS.len(),
        DEMO_CATEGORIES.len(),
        DEMO_BOOKS.len(),
        DEMO_BORROWS.len()
    );

    Ok(())
}
