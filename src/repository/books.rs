//! PostgreSQL book store.
//!
//! ISBN uniqueness lives in the schema (`books_isbn_lower_key`, a unique
//! index on `LOWER(isbn)`), so a single INSERT or UPDATE both checks and
//! writes. Its unique violation is the only source of `Conflict`.

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use super::{BookFilter, BookStore, Pagination};
use crate::{
    error::{AppError, AppResult},
    models::{Book, BookInput},
};

const BOOK_COLUMNS: &str = "id, title, author_first_name, author_last_name, isbn, category, \
                            book_type, total_copies, copies_in_use";

/// Translate write failures into the error taxonomy
fn map_write_error(err: sqlx::Error, isbn: &str) -> AppError {
    if let sqlx::Error::Database(ref db) = err {
        if db.is_unique_violation() {
            return AppError::Conflict(format!("A book with ISBN {} already exists.", isbn));
        }
        if db.is_check_violation() {
            return AppError::Validation(format!("Rejected by database: {}", db.message()));
        }
    }
    AppError::Database(err)
}

#[derive(Clone)]
pub struct PgBooksRepository {
    pool: Pool<Postgres>,
}

impl PgBooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookStore for PgBooksRepository {
    async fn search(&self, filter: &BookFilter, pagination: Pagination) -> AppResult<(Vec<Book>, i64)> {
        let (condition, needle) = filter.sql_condition();

        let count_query = format!("SELECT COUNT(*) FROM books WHERE {}", condition);
        let mut count = sqlx::query_scalar::<_, i64>(&count_query);
        if let Some(needle) = needle {
            count = count.bind(needle);
        }
        let total = count.fetch_one(&self.pool).await?;

        let select_query = format!(
            "SELECT {} FROM books WHERE {} ORDER BY id LIMIT {} OFFSET {}",
            BOOK_COLUMNS,
            condition,
            pagination.page_size(),
            pagination.offset()
        );
        let mut select = sqlx::query_as::<_, Book>(&select_query);
        if let Some(needle) = needle {
            select = select.bind(needle);
        }
        let books = select.fetch_all(&self.pool).await?;

        Ok((books, total))
    }

    async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(&format!("SELECT {} FROM books WHERE id = $1", BOOK_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with ID {} not found.", id)))
    }

    async fn create(&self, input: &BookInput) -> AppResult<Book> {
        let book = sqlx::query_as::<_, Book>(&format!(
            r#"
            INSERT INTO books (title, author_first_name, author_last_name, isbn,
                               category, book_type, total_copies, copies_in_use)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(&input.title)
        .bind(&input.author_first_name)
        .bind(&input.author_last_name)
        .bind(&input.isbn)
        .bind(&input.category)
        .bind(&input.book_type)
        .bind(input.total_copies)
        .bind(input.copies_in_use)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &input.isbn))?;

        tracing::info!("Book added: {} (ID: {})", book.title, book.id);
        Ok(book)
    }

    async fn update(&self, id: i32, input: &BookInput) -> AppResult<Book> {
        let book = sqlx::query_as::<_, Book>(&format!(
            r#"
            UPDATE books
            SET title = $2, author_first_name = $3, author_last_name = $4, isbn = $5,
                category = $6, book_type = $7, total_copies = $8, copies_in_use = $9
            WHERE id = $1
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(id)
        .bind(&input.title)
        .bind(&input.author_first_name)
        .bind(&input.author_last_name)
        .bind(&input.isbn)
        .bind(&input.category)
        .bind(&input.book_type)
        .bind(input.total_copies)
        .bind(input.copies_in_use)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &input.isbn))?
        .ok_or_else(|| AppError::NotFound(format!("Book with ID {} not found.", id)))?;

        tracing::info!("Book updated: {} (ID: {})", book.title, book.id);
        Ok(book)
    }

    async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with ID {} not found.", id)));
        }
        tracing::info!("Book deleted (ID: {})", id);
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
