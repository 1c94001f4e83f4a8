//! Bookshelf Server
//!
//! A REST JSON API for a personal book library: a catalog of books with
//! categories, and a borrow/return workflow that keeps each book's
//! availability in step with its open borrow records.

use std::sync::Arc;

use sqlx::{Pool, Postgres};

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod seed;
pub mod services;

pub use api::create_router;
pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}

impl AppState {
    /// Wire repository and services over a connection pool
    pub fn new(config: AppConfig, pool: Pool<Postgres>) -> Self {
        let repository = repository::Repository::new(pool);
        Self {
            config: Arc::new(config),
            services: Arc::new(services::Services::new(repository)),
        }
    }
}
