//! Domain types shared by the store and the HTTP handlers.

pub mod book;

pub use book::{
    Book, BookId, BookPatch, BookValidationError, CreateBookRequest, NewBook, UpdateBookRequest,
};
