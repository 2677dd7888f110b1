//! Repository layer for book storage

pub mod books;
pub mod filter;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::{Book, BookInput},
};

pub use filter::{BookFilter, Pagination, SearchField};

/// Persistence contract for book records.
///
/// Implementations own ISBN uniqueness (case-insensitive): `create` and
/// `update` must check and write as one step and report a clash as
/// `AppError::Conflict`. Inputs reaching the store are already validated.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    /// One page of matches, ordered by id, plus the total match count
    async fn search(&self, filter: &BookFilter, pagination: Pagination) -> AppResult<(Vec<Book>, i64)>;

    async fn get_by_id(&self, id: i32) -> AppResult<Book>;

    /// Insert with a freshly assigned id
    async fn create(&self, input: &BookInput) -> AppResult<Book>;

    /// Replace every field of book `id`
    async fn update(&self, id: i32, input: &BookInput) -> AppResult<Book>;

    async fn delete(&self, id: i32) -> AppResult<()>;

    /// Cheap connectivity check for the readiness endpoint
    async fn ping(&self) -> AppResult<()>;
}

/// Main repository struct holding the book store
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn BookStore>,
}

impl Repository {
    /// Repository backed by PostgreSQL
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: Arc::new(books::PgBooksRepository::new(pool)),
        }
    }

    /// Repository backed by an empty in-process store
    pub fn in_memory() -> Self {
        Self {
            books: Arc::new(memory::MemoryBooksRepository::new()),
        }
    }

    pub fn with_store(books: Arc<dyn BookStore>) -> Self {
        Self { books }
    }
}
