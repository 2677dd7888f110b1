//! Search filter and pagination shared by every book store.
//!
//! A search names one field and one value. The field token picks the
//! matcher: substring for title, author and ISBN, exact match for category.
//! All comparisons are case-insensitive. Unknown tokens and empty values
//! select no filter at all.

use std::str::FromStr;

use crate::models::Book;

/// Largest page a store will return
pub const MAX_PAGE_SIZE: i64 = 50;

/// Page size used when the caller does not give one
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Fields a search can target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Title,
    Author,
    Isbn,
    Category,
}

impl FromStr for SearchField {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "title" => Ok(SearchField::Title),
            "author" => Ok(SearchField::Author),
            "isbn" => Ok(SearchField::Isbn),
            "category" => Ok(SearchField::Category),
            _ => Err(()),
        }
    }
}

impl SearchField {
    /// SQL predicate testing this field against the lowercased needle bound at `$1`
    pub fn sql_predicate(self) -> &'static str {
        match self {
            SearchField::Title => "strpos(LOWER(title), $1) > 0",
            SearchField::Author => {
                "strpos(LOWER(author_first_name || ' ' || author_last_name), $1) > 0"
            }
            SearchField::Isbn => "strpos(LOWER(isbn), $1) > 0",
            SearchField::Category => "LOWER(category) = $1",
        }
    }

    /// In-memory counterpart of [`SearchField::sql_predicate`]
    pub fn matches(self, book: &Book, needle: &str) -> bool {
        match self {
            SearchField::Title => book.title.to_lowercase().contains(needle),
            SearchField::Author => book.author_full_name().to_lowercase().contains(needle),
            SearchField::Isbn => book.isbn.to_lowercase().contains(needle),
            SearchField::Category => book.category.to_lowercase() == needle,
        }
    }
}

/// Parsed search filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookFilter {
    /// No filter: every book matches
    All,
    /// `needle` is already lowercased
    Field { field: SearchField, needle: String },
}

impl BookFilter {
    pub fn new(field: &str, value: &str) -> Self {
        if value.is_empty() {
            return BookFilter::All;
        }
        match field.parse::<SearchField>() {
            Ok(field) => BookFilter::Field {
                field,
                needle: value.to_lowercase(),
            },
            Err(()) => BookFilter::All,
        }
    }

    pub fn matches(&self, book: &Book) -> bool {
        match self {
            BookFilter::All => true,
            BookFilter::Field { field, needle } => field.matches(book, needle),
        }
    }

    /// WHERE clause body and the value to bind at `$1`, if any
    pub fn sql_condition(&self) -> (&'static str, Option<&str>) {
        match self {
            BookFilter::All => ("TRUE", None),
            BookFilter::Field { field, needle } => (field.sql_predicate(), Some(needle.as_str())),
        }
    }
}

/// A normalized page request.
///
/// Pages start at 1. Out-of-range values are clamped rather than rejected:
/// `page <= 0` becomes page 1 and `page_size` is forced into
/// `1..=MAX_PAGE_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: i64,
    page_size: i64,
}

impl Pagination {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    /// Number of matching rows to skip
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Apply to an id-ordered iterator of matches
    pub fn slice<T>(&self, rows: impl Iterator<Item = T>) -> Vec<T> {
        let skip = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        let take = usize::try_from(self.page_size).unwrap_or(usize::MAX);
        rows.skip(skip).take(take).collect()
    }
}
