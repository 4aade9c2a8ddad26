//! SQLite-backed book store.
//!
//! Every operation checks out one pooled connection, runs a single statement
//! (or, for updates, a single transaction) and returns the connection to the
//! pool on every exit path. Absent rows are reported as `Ok(None)` / `Ok(false)`.

use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use super::connection::SqliteConnectionManager;
use super::error::StoreResult;
use super::schema::ensure_schema;
use crate::config::DatabaseConfig;
use crate::model::{Book, BookId, BookPatch, NewBook};

const BOOK_SELECT_SQL: &str = "SELECT id, title, author, published_year FROM books";

type Pool = bb8::Pool<SqliteConnectionManager>;

pub struct BookStore {
    pool: Pool,
}

impl BookStore {
    /// Opens (or creates) the database file and ensures the schema exists.
    pub async fn open(cfg: &DatabaseConfig) -> StoreResult<Self> {
        let manager = SqliteConnectionManager::file(&cfg.path);
        let pool = bb8::Pool::builder()
            .max_size(cfg.pool_size)
            .connection_timeout(Duration::from_secs(10))
            .build(manager)
            .await?;

        let store = Self { pool };
        store.init().await?;
        info!(path = %cfg.path.display(), pool_size = cfg.pool_size, "Book store opened");
        Ok(store)
    }

    /// Opens a private in-memory database.
    ///
    /// The pool holds exactly one connection that never expires, since the
    /// database lives only as long as that connection.
    pub async fn open_in_memory() -> StoreResult<Self> {
        let pool = bb8::Pool::builder()
            .max_size(1)
            .min_idle(Some(1))
            .idle_timeout(None)
            .max_lifetime(None)
            .build(SqliteConnectionManager::memory())
            .await?;

        let store = Self { pool };
        store.init().await?;
        debug!("In-memory book store opened");
        Ok(store)
    }

    async fn init(&self) -> StoreResult<()> {
        let conn = self.pool.get().await?;
        conn.with_connection(ensure_schema).await
    }

    /// All books in insertion order.
    pub async fn list(&self) -> StoreResult<Vec<Book>> {
        let conn = self.pool.get().await?;
        conn.with_connection(|conn| {
            let mut stmt = conn.prepare(&format!("{BOOK_SELECT_SQL} ORDER BY id"))?;
            let books = stmt
                .query_map([], book_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(books)
        })
        .await
    }

    pub async fn get(&self, id: BookId) -> StoreResult<Option<Book>> {
        let conn = self.pool.get().await?;
        conn.with_connection(move |conn| select_book(conn, id)).await
    }

    /// Inserts a book and returns it with its freshly assigned id.
    pub async fn create(&self, book: NewBook) -> StoreResult<Book> {
        book.validate()?;

        let conn = self.pool.get().await?;
        let created = conn
            .with_connection(move |conn| {
                conn.execute(
                    "INSERT INTO books (title, author, published_year) VALUES (?1, ?2, ?3)",
                    params![book.title, book.author, book.published_year],
                )?;
                Ok(book.into_book(conn.last_insert_rowid()))
            })
            .await?;

        debug!(book_id = created.id, "Book created");
        Ok(created)
    }

    /// Applies `patch` to an existing book. Returns `None` without writing
    /// anything when the id is unknown.
    pub async fn update(&self, id: BookId, patch: BookPatch) -> StoreResult<Option<Book>> {
        patch.validate()?;
        if patch.is_empty() {
            return self.get(id).await;
        }

        let conn = self.pool.get().await?;
        let updated = conn
            .with_connection_mut(move |conn| {
                let tx = conn.transaction()?;
                let (set_year, year) = match patch.published_year {
                    Some(year) => (true, year),
                    None => (false, None),
                };

                let changed = tx.execute(
                    "UPDATE books
                     SET
                        title = COALESCE(?1, title),
                        author = COALESCE(?2, author),
                        published_year = CASE WHEN ?3 THEN ?4 ELSE published_year END
                     WHERE id = ?5",
                    params![patch.title, patch.author, set_year, year, id],
                )?;

                if changed == 0 {
                    return Ok(None);
                }

                let book = select_book(&tx, id)?;
                tx.commit()?;
                Ok(book)
            })
            .await?;

        if updated.is_some() {
            debug!(book_id = id, "Book updated");
        }
        Ok(updated)
    }

    /// Hard-deletes a book. Returns `false` when the id is unknown.
    pub async fn delete(&self, id: BookId) -> StoreResult<bool> {
        let conn = self.pool.get().await?;
        let deleted = conn
            .with_connection(move |conn| {
                let changed = conn.execute("DELETE FROM books WHERE id = ?1", params![id])?;
                Ok(changed > 0)
            })
            .await?;

        if deleted {
            debug!(book_id = id, "Book deleted");
        }
        Ok(deleted)
    }

    pub async fn count(&self) -> StoreResult<u64> {
        let conn = self.pool.get().await?;
        conn.with_connection(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))?;
            Ok(count as u64)
        })
        .await
    }

    /// Drops the pool, closing idle connections.
    pub fn close(self) {
        let state = self.pool.state();
        info!(
            connections = state.connections,
            idle = state.idle_connections,
            "Book store closed"
        );
    }
}

fn select_book(conn: &Connection, id: BookId) -> StoreResult<Option<Book>> {
    let book = conn
        .query_row(
            &format!("{BOOK_SELECT_SQL} WHERE id = ?1"),
            params![id],
            book_from_row,
        )
        .optional()?;
    Ok(book)
}

fn book_from_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get(0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        published_year: row.get(3)?,
    })
}

