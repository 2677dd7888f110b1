//! Catalog management service

use crate::{
    error::{AppError, AppResult},
    models::{Book, BookInput},
    repository::{BookFilter, Pagination, Repository},
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Search books on one field, returning a page and the total match count.
    /// Out-of-range paging values are clamped (see [`Pagination::new`]).
    pub async fn search_books(
        &self,
        search_by: &str,
        search_value: &str,
        page: i64,
        page_size: i64,
    ) -> AppResult<(Vec<Book>, i64)> {
        let filter = BookFilter::new(search_by, search_value);
        self.repository
            .books
            .search(&filter, Pagination::new(page, page_size))
            .await
    }

    /// Get book by ID
    pub async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Create a new book. Any ID in the payload is ignored.
    pub async fn create_book(&self, input: BookInput) -> AppResult<Book> {
        let input = BookInput {
            id: None,
            ..input.trimmed()
        };
        input.check()?;
        self.repository.books.create(&input).await
    }

    /// Replace every field of an existing book
    pub async fn update_book(&self, id: i32, input: BookInput) -> AppResult<Book> {
        if input.id != Some(id) {
            return Err(AppError::Validation(
                "ID in URL does not match ID in request body.".to_string(),
            ));
        }
        let input = input.trimmed();
        input.check()?;
        self.repository.books.update(id, &input).await
    }

    /// Delete a book permanently
    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.repository.books.delete(id).await
    }

    /// Check that the book store is reachable
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.books.ping().await
    }
}
