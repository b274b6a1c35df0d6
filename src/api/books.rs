//! Book catalog endpoints

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::{metadata::LookupQuery, Book, BookMetadata, BookQuery, CreateBook},
    AppState,
};

use super::CurrentUser;

/// List available books
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(BookQuery),
    responses(
        (status = 200, description = "Available books", body = Vec<Book>)
    )
)]
pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<BookQuery>,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.catalog.list_books(&query).await?;
    Ok(Json(books))
}

/// Look up bibliographic data by ISBN
#[utoipa::path(
    get,
    path = "/books/lookup",
    tag = "books",
    params(LookupQuery),
    responses(
        (status = 200, description = "Metadata found", body = BookMetadata),
        (status = 400, description = "Invalid ISBN"),
        (status = 404, description = "Book not found in any database")
    )
)]
pub async fn lookup_book(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> AppResult<Json<BookMetadata>> {
    let metadata = state.services.lookup.lookup(&query.isbn).await?;
    Ok(Json(metadata))
}

/// List a book for lending
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book listed", body = Book),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_book(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<Book>)> {
    let book = state.services.catalog.create_book(request, user.id).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

/// Books owned by the authenticated user, newest first
#[utoipa::path(
    get,
    path = "/books/my-books",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Owned books", body = Vec<Book>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_books(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.catalog.my_books(user.id).await?;
    Ok(Json(books))
}
