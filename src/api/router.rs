//! Maps `(method, path)` to exactly one handler.

use std::sync::Arc;

use tracing::debug;

use super::error::{ApiError, ApiResult};
use super::{handlers, health};
use crate::http::request::{Method, Request};
use crate::http::response::Response;
use crate::model::BookId;
use crate::store::BookStore;

const HEALTH_ALLOW: &str = "GET";
const COLLECTION_ALLOW: &str = "GET, POST";
const ITEM_ALLOW: &str = "GET, PUT, DELETE";

/// A resolved endpoint with its path parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Health,
    ListBooks,
    CreateBook,
    GetBook(BookId),
    UpdateBook(BookId),
    DeleteBook(BookId),
}

impl Route {
    /// Resolves a route from the method and the path (query string ignored).
    ///
    /// Fails with `MethodNotAllowed` for a known path with the wrong method,
    /// `InvalidId` for a non-integer book id and `RouteNotFound` otherwise.
    pub fn resolve(method: &Method, path: &str) -> ApiResult<Route> {
        let path = path.split_once('?').map_or(path, |(path, _)| path);
        let path = match path.strip_suffix('/') {
            Some(stripped) if !stripped.is_empty() => stripped,
            _ => path,
        };

        let segments: Vec<&str> = path.split('/').skip(1).collect();

        match segments.as_slice() {
            [""] | ["health"] | ["api", "v1"] => match method {
                Method::GET => Ok(Route::Health),
                _ => Err(ApiError::MethodNotAllowed {
                    allow: HEALTH_ALLOW,
                }),
            },
            ["api", "v1", "books"] => match method {
                Method::GET => Ok(Route::ListBooks),
                Method::POST => Ok(Route::CreateBook),
                _ => Err(ApiError::MethodNotAllowed {
                    allow: COLLECTION_ALLOW,
                }),
            },
            ["api", "v1", "books", raw_id] => {
                let route: fn(BookId) -> Route = match method {
                    Method::GET => Route::GetBook,
                    Method::PUT => Route::UpdateBook,
                    Method::DELETE => Route::DeleteBook,
                    _ => {
                        return Err(ApiError::MethodNotAllowed { allow: ITEM_ALLOW });
                    }
                };
                let id = raw_id
                    .parse::<BookId>()
                    .map_err(|_| ApiError::InvalidId(raw_id.to_string()))?;
                Ok(route(id))
            }
            _ => Err(ApiError::RouteNotFound),
        }
    }
}

/// Dispatches requests to handlers, holding the shared store.
pub struct Router {
    store: Arc<BookStore>,
    api_url: String,
}

impl Router {
    pub fn new(store: Arc<BookStore>, api_url: impl Into<String>) -> Self {
        Self {
            store,
            api_url: api_url.into(),
        }
    }

    pub fn store(&self) -> &BookStore {
        &self.store
    }

    /// Produces a response for any request; errors become JSON error bodies.
    pub async fn handle(&self, req: &Request) -> Response {
        let result = match Route::resolve(&req.method, &req.path) {
            Ok(route) => {
                debug!(?route, "Route resolved");
                self.dispatch(route, req).await
            }
            Err(err) => Err(err),
        };

        result.unwrap_or_else(ApiError::into_response)
    }

    async fn dispatch(&self, route: Route, req: &Request) -> ApiResult<Response> {
        let store = self.store.as_ref();
        match route {
            Route::Health => Ok(health::health(&self.api_url)),
            Route::ListBooks => handlers::list_books(store).await,
            Route::CreateBook => handlers::create_book(store, &req.body).await,
            Route::GetBook(id) => handlers::get_book(store, id).await,
            Route::UpdateBook(id) => handlers::update_book(store, id, &req.body).await,
            Route::DeleteBook(id) => handlers::delete_book(store, id).await,
        }
    }
}
