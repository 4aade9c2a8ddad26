//! Book records and the write shapes accepted from clients.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Store-assigned identifier of a book row.
pub type BookId = i64;

/// A persisted book.
///
/// `published_year` is always serialized; an unknown year is `null`, never `0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub published_year: Option<i32>,
}

/// Rejections raised before any write reaches the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BookValidationError {
    /// `title` or `author` missing or blank on create
    #[error("Title and author required")]
    MissingTitleOrAuthor,
    /// `title` or `author` set to null or blank on update
    #[error("Title and author cannot be empty")]
    EmptyTitleOrAuthor,
}

/// Fields of a book that does not have an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub published_year: Option<i32>,
}

impl NewBook {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        published_year: Option<i32>,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            published_year,
        }
    }

    pub fn validate(&self) -> Result<(), BookValidationError> {
        if is_blank(&self.title) || is_blank(&self.author) {
            return Err(BookValidationError::MissingTitleOrAuthor);
        }
        Ok(())
    }

    /// Attaches the id assigned by the store.
    pub fn into_book(self, id: BookId) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            published_year: self.published_year,
        }
    }
}

/// Partial update of an existing book.
///
/// `None` leaves the stored value untouched. For `published_year`,
/// `Some(None)` clears the stored year.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub published_year: Option<Option<i32>>,
}

impl BookPatch {
    pub fn validate(&self) -> Result<(), BookValidationError> {
        let blank = |field: &Option<String>| field.as_deref().is_some_and(is_blank);
        if blank(&self.title) || blank(&self.author) {
            return Err(BookValidationError::EmptyTitleOrAuthor);
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.published_year.is_none()
    }

    /// Returns `book` with the patched fields overwritten.
    pub fn apply(self, book: Book) -> Book {
        Book {
            id: book.id,
            title: self.title.unwrap_or(book.title),
            author: self.author.unwrap_or(book.author),
            published_year: self.published_year.unwrap_or(book.published_year),
        }
    }
}

/// Body of `POST /api/v1/books`.
///
/// Every field is optional on the wire so a missing `title` is reported as a
/// validation failure rather than a JSON error. Unknown keys (including a
/// client-supplied `id`) are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct CreateBookRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub published_year: Option<i32>,
}

impl CreateBookRequest {
    pub fn into_new_book(self) -> Result<NewBook, BookValidationError> {
        let book = NewBook {
            title: self.title.unwrap_or_default(),
            author: self.author.unwrap_or_default(),
            published_year: self.published_year,
        };
        book.validate()?;
        Ok(book)
    }
}

/// Body of `PUT /api/v1/books/{id}`.
///
/// Distinguishes an omitted key (`None`) from an explicit `null` (`Some(None)`).
#[derive(Debug, Default, Deserialize)]
pub struct UpdateBookRequest {
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub author: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub published_year: Option<Option<i32>>,
}

impl UpdateBookRequest {
    pub fn into_patch(self) -> Result<BookPatch, BookValidationError> {
        let required = |field: Option<Option<String>>| match field {
            None => Ok(None),
            Some(Some(value)) => Ok(Some(value)),
            Some(None) => Err(BookValidationError::EmptyTitleOrAuthor),
        };

        let patch = BookPatch {
            title: required(self.title)?,
            author: required(self.author)?,
            published_year: self.published_year,
        };
        patch.validate()?;
        Ok(patch)
    }
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
