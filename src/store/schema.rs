use rusqlite::Connection;

use super::error::StoreResult;

const CREATE_BOOKS_SQL: &str = "CREATE TABLE IF NOT EXISTS books (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    author TEXT NOT NULL,
    published_year INTEGER
);";

/// Creates the `books` table if it does not exist yet. Safe to run on every start.
pub fn ensure_schema(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(CREATE_BOOKS_SQL)?;
    Ok(())
}
