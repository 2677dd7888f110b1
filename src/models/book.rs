//! Book (catalog entry) model and request types

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Book record as persisted in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    /// Store-assigned identifier, never reused
    pub id: i32,
    pub title: String,
    pub author_first_name: String,
    pub author_last_name: String,
    pub isbn: String,
    pub category: String,
    /// Format (Hardcover, Paperback, ...)
    #[serde(rename = "type")]
    pub book_type: String,
    pub total_copies: i32,
    pub copies_in_use: i32,
}

impl Book {
    /// "First Last", the string author searches match against
    pub fn author_full_name(&self) -> String {
        format!("{} {}", self.author_first_name, self.author_last_name)
    }
}

/// Create / full-replacement update payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct BookInput {
    /// Ignored on create; must match the path ID on update
    pub id: Option<i32>,
    #[validate(length(max = 100, message = "Book title must be at most 100 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 50, message = "Author first name is required (max 50 characters)"))]
    pub author_first_name: String,
    #[validate(length(min = 1, max = 50, message = "Author last name is required (max 50 characters)"))]
    pub author_last_name: String,
    #[validate(length(max = 50, message = "Book ISBN must be at most 50 characters"))]
    pub isbn: String,
    #[validate(length(min = 1, max = 50, message = "Category is required (max 50 characters)"))]
    pub category: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 50, message = "Type is required (max 50 characters)"))]
    pub book_type: String,
    #[validate(range(min = 0, message = "Total copies cannot be negative"))]
    pub total_copies: i32,
    #[validate(range(min = 0, message = "Copies in use cannot be negative"))]
    pub copies_in_use: i32,
}

impl BookInput {
    /// Copy with surrounding whitespace stripped from every text field
    pub fn trimmed(&self) -> Self {
        Self {
            id: self.id,
            title: self.title.trim().to_string(),
            author_first_name: self.author_first_name.trim().to_string(),
            author_last_name: self.author_last_name.trim().to_string(),
            isbn: self.isbn.trim().to_string(),
            category: self.category.trim().to_string(),
            book_type: self.book_type.trim().to_string(),
            total_copies: self.total_copies,
            copies_in_use: self.copies_in_use,
        }
    }

    /// Field checks shared by create and update.
    ///
    /// Title and ISBN are checked first and individually, then the derived
    /// field rules, then the copy-count relation.
    pub fn check(&self) -> AppResult<()> {
        if self.title.is_empty() {
            return Err(AppError::Validation("Book title is required.".to_string()));
        }
        if self.isbn.is_empty() {
            return Err(AppError::Validation("Book ISBN is required.".to_string()));
        }
        self.validate()?;
        if self.copies_in_use > self.total_copies {
            return Err(AppError::Validation(
                "Copies in use cannot exceed total copies.".to_string(),
            ));
        }
        Ok(())
    }

    /// Stored record for this payload under the given ID
    pub fn into_book(self, id: i32) -> Book {
        Book {
            id,
            title: self.title,
            author_first_name: self.author_first_name,
            author_last_name: self.author_last_name,
            isbn: self.isbn,
            category: self.category,
            book_type: self.book_type,
            total_copies: self.total_copies,
            copies_in_use: self.copies_in_use,
        }
    }
}

/// Book search query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// One of title, author, isbn, category
    #[serde(alias = "searchBy")]
    pub search_by: Option<String>,
    #[serde(alias = "searchValue")]
    pub search_value: Option<String>,
    pub page: Option<i64>,
    #[serde(alias = "pageSize")]
    pub page_size: Option<i64>,
}
