//! Bookstore - book inventory service
//!
//! CRUD over book records via a JSON HTTP API, persisted in SQLite.

pub mod api;
pub mod config;
pub mod http;
pub mod model;
pub mod server;
pub mod store;
