//! HTTP/1.1 wire layer.
//!
//! A small keep-alive capable server that turns socket bytes into plain
//! [`request::Request`] values and [`response::Response`] values back into
//! bytes. Routing and business logic live in [`crate::api`].
//!
//! # Architecture
//!
//! - **`connection`**: per-socket request/response state machine
//! - **`parser`**: parses requests out of a byte buffer
//! - **`request`**: request representation and header helpers
//! - **`response`**: response representation, JSON helpers and builder
//! - **`writer`**: serializes and writes responses to the client
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Wait for incoming request data
//!        └──────┬──────┘
//!               │ Request received (malformed → 400, skip to Writing)
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Router dispatches to a handler
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response to client
//!        └──────┬───────────┘
//!               │ Response sent
//!               ├─ Keep-Alive → Reading (same connection)
//!               └─ Close → Closed
//! ```

pub mod connection;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
