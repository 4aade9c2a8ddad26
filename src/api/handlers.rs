//! One handler per book endpoint. Each performs a single store call.

use serde::de::DeserializeOwned;

use super::error::{ApiError, ApiResult};
use crate::http::response::{Response, StatusCode};
use crate::model::{BookId, CreateBookRequest, UpdateBookRequest};
use crate::store::BookStore;

pub async fn list_books(store: &BookStore) -> ApiResult<Response> {
    let books = store.list().await?;
    Ok(Response::json(StatusCode::Ok, &books))
}

pub async fn get_book(store: &BookStore, id: BookId) -> ApiResult<Response> {
    let book = store.get(id).await?.ok_or(ApiError::NotFound)?;
    Ok(Response::json(StatusCode::Ok, &book))
}

pub async fn create_book(store: &BookStore, body: &[u8]) -> ApiResult<Response> {
    let request: CreateBookRequest = parse_json(body)?;
    let book = store.create(request.into_new_book()?).await?;

    Ok(Response::json(StatusCode::Created, &book)
        .with_header("Location", format!("/api/v1/books/{}", book.id)))
}

pub async fn update_book(store: &BookStore, id: BookId, body: &[u8]) -> ApiResult<Response> {
    let request: UpdateBookRequest = parse_json(body)?;
    let book = store
        .update(id, request.into_patch()?)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Response::json(StatusCode::Ok, &book))
}

pub async fn delete_book(store: &BookStore, id: BookId) -> ApiResult<Response> {
    if !store.delete(id).await? {
        return Err(ApiError::NotFound);
    }
    Ok(Response::no_content())
}

/// Request bodies must be JSON objects. serde would otherwise fill the
/// request structs from an array by position.
fn parse_json<T: DeserializeOwned>(body: &[u8]) -> ApiResult<T> {
    let object: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(body)?;
    Ok(serde_json::from_value(serde_json::Value::Object(object))?)
}
