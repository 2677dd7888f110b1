//! In-process book store.
//!
//! All writes take the single write lock, which makes the ISBN check and
//! the write one step for every concurrent caller. Ids come from a counter
//! that only grows, so deleted ids are never handed out again.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{BookFilter, BookStore, Pagination};
use crate::{
    error::{AppError, AppResult},
    models::{Book, BookInput},
};

#[derive(Default)]
struct Shelf {
    /// Keyed by id, so iteration is id-ordered
    books: BTreeMap<i32, Book>,
    last_id: i32,
}

impl Shelf {
    /// Whether a book other than `except` already holds `isbn`
    fn isbn_taken(&self, isbn: &str, except: Option<i32>) -> bool {
        let isbn = isbn.to_lowercase();
        self.books
            .values()
            .any(|b| Some(b.id) != except && b.isbn.to_lowercase() == isbn)
    }
}

#[derive(Clone, Default)]
pub struct MemoryBooksRepository {
    shelf: Arc<RwLock<Shelf>>,
}

impl MemoryBooksRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn duplicate_isbn(isbn: &str) -> AppError {
    AppError::Conflict(format!("A book with ISBN {} already exists.", isbn))
}

fn not_found(id: i32) -> AppError {
    AppError::NotFound(format!("Book with ID {} not found.", id))
}

#[async_trait]
impl BookStore for MemoryBooksRepository {
    async fn search(&self, filter: &BookFilter, pagination: Pagination) -> AppResult<(Vec<Book>, i64)> {
        let shelf = self.shelf.read().await;
        let matches: Vec<&Book> = shelf.books.values().filter(|b| filter.matches(b)).collect();
        let total = matches.len() as i64;
        let page = pagination.slice(matches.into_iter().cloned());
        Ok((page, total))
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        let shelf = self.shelf.read().await;
        let book = shelf.books.get(&id).cloned();
        book.ok_or_else(|| not_found(id))
    }

    async fn create(&self, input: &BookInput) -> AppResult<Book> {
        let mut shelf = self.shelf.write().await;
        if shelf.isbn_taken(&input.isbn, None) {
            return Err(duplicate_isbn(&input.isbn));
        }
        let id = shelf
            .last_id
            .checked_add(1)
            .ok_or_else(|| AppError::Internal("Book id space exhausted".to_string()))?;
        shelf.last_id = id;

        let book = input.clone().into_book(id);
        shelf.books.insert(id, book.clone());
        tracing::debug!("Book added: {} (ID: {})", book.title, id);
        Ok(book)
    }

    async fn update(&self, id: i32, input: &BookInput) -> AppResult<Book> {
        let mut shelf = self.shelf.write().await;
        if !shelf.books.contains_key(&id) {
            return Err(not_found(id));
        }
        if shelf.isbn_taken(&input.isbn, Some(id)) {
            return Err(duplicate_isbn(&input.isbn));
        }

        let book = input.clone().into_book(id);
        shelf.books.insert(id, book.clone());
        tracing::debug!("Book updated: {} (ID: {})", book.title, id);
        Ok(book)
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let mut shelf = self.shelf.write().await;
        shelf.books.remove(&id).ok_or_else(|| not_found(id))?;
        tracing::debug!("Book deleted (ID: {})", id);
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
