//! Book catalog service

use crate::{
    error::AppResult,
    lending::LISTING_REWARD,
    models::{Book, BookQuery, CreateBook, NewBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Available books, optionally filtered by title and category
    pub async fn list_books(&self, query: &BookQuery) -> AppResult<Vec<Book>> {
        self.repository.books.search_available(query).await
    }

    /// Books owned by a user, newest first
    pub async fn my_books(&self, owner_id: i32) -> AppResult<Vec<Book>> {
        self.repository.books.list_by_owner(owner_id).await
    }

    /// List a new book; the owner earns a credit for it
    pub async fn create_book(&self, request: CreateBook, owner_id: i32) -> AppResult<Book> {
        let book = NewBook::try_from(request)?;
        let created = self
            .repository
            .books
            .create(owner_id, &book, LISTING_REWARD)
            .await?;

        tracing::info!(
            "Book {} '{}' listed by user {} (+{} credit)",
            created.id,
            created.title,
            owner_id,
            LISTING_REWARD
        );
        Ok(created)
    }
}
