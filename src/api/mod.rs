//! Book API: routing, handlers and the error taxonomy clients see.
//!
//! | Method | Path                   | Success            |
//! |--------|------------------------|--------------------|
//! | GET    | `/`, `/health`, `/api/v1` | 200 health status |
//! | GET    | `/api/v1/books`        | 200 array of books |
//! | POST   | `/api/v1/books`        | 201 created book   |
//! | GET    | `/api/v1/books/{id}`   | 200 book           |
//! | PUT    | `/api/v1/books/{id}`   | 200 updated book   |
//! | DELETE | `/api/v1/books/{id}`   | 204 empty body     |

pub mod error;
pub mod handlers;
pub mod health;
pub mod router;

pub use error::{ApiError, ApiResult};
pub use router::{Route, Router};
