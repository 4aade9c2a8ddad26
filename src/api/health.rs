use serde::Serialize;

use crate::http::response::{Response, StatusCode};

pub const SERVICE_NAME: &str = "Bookstore API";

#[derive(Debug, Serialize)]
pub struct HealthStatus<'a> {
    pub status: &'static str,
    pub timestamp: String,
    pub service: &'static str,
    #[serde(rename = "apiURL")]
    pub api_url: &'a str,
}

/// Liveness probe. Does not touch the store.
pub fn health(api_url: &str) -> Response {
    let status = HealthStatus {
        status: "healthy",
        timestamp: chrono::Utc::now().to_rfc3339(),
        service: SERVICE_NAME,
        api_url,
    };
    Response::json(StatusCode::Ok, &status)
}
