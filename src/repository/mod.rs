//! Repository layer for persistence.
//!
//! Services talk to the stores below through trait objects so the same lending
//! logic runs on Postgres in production and on the in-memory store in tests.
//! Compound operations (listing with reward, opening a request, applying a
//! transition) are single methods so each adapter can make them atomic.

pub mod books;
pub mod memory;
pub mod transactions;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    lending::Transition,
    models::{Book, BookQuery, NewBook, NewUser, Transaction, User},
};

#[async_trait]
pub trait UsersStore: Send + Sync {
    /// Insert a user; a taken email is a validation error
    async fn create(&self, user: &NewUser) -> AppResult<User>;

    async fn get_by_id(&self, id: i32) -> AppResult<User>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
}

#[async_trait]
pub trait BooksStore: Send + Sync {
    /// Insert an available book and credit its owner `reward`
    async fn create(&self, owner_id: i32, book: &NewBook, reward: i32) -> AppResult<Book>;

    async fn get_by_id(&self, id: i32) -> AppResult<Book>;

    /// Available books matching the query, by id
    async fn search_available(&self, query: &BookQuery) -> AppResult<Vec<Book>>;

    /// Books of one owner, newest first
    async fn list_by_owner(&self, owner_id: i32) -> AppResult<Vec<Book>>;
}

#[async_trait]
pub trait TransactionsStore: Send + Sync {
    async fn get_by_id(&self, id: i32) -> AppResult<Transaction>;

    /// Transactions where the user is borrower or owner, by id
    async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<Transaction>>;

    /// Mark the book Pending_Approval (only if still Available) and record the request
    async fn open_request(&self, book: &Book, borrower_id: i32) -> AppResult<Transaction>;

    /// Apply a planned transition to the transaction, its book and the borrower
    async fn apply_transition(&self, id: i32, transition: &Transition) -> AppResult<Transaction>;
}

/// Main repository struct holding one store per aggregate
#[derive(Clone)]
pub struct Repository {
    pub users: Arc<dyn UsersStore>,
    pub books: Arc<dyn BooksStore>,
    pub transactions: Arc<dyn TransactionsStore>,
}

impl Repository {
    /// Create a Postgres-backed repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            users: Arc::new(users::UsersRepository::new(pool.clone())),
            books: Arc::new(books::BooksRepository::new(pool.clone())),
            transactions: Arc::new(transactions::TransactionsRepository::new(pool)),
        }
    }

    /// Create a repository that keeps everything in process memory
    pub fn in_memory() -> Self {
        let store = memory::MemoryStore::default();
        Self {
            users: Arc::new(store.clone()),
            books: Arc::new(store.clone()),
            transactions: Arc::new(store),
        }
    }
}
