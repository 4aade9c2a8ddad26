//! Persistence for book records.
//!
//! A single `books` table in SQLite, reached through a bb8 pool of rusqlite
//! connections. The table is created on open if it does not exist.

mod book_store;
pub mod connection;
pub mod error;
pub mod schema;

pub use book_store::BookStore;
pub use error::{StoreError, StoreResult};
