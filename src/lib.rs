//! Bookshare Neighborhood Book Sharing Server
//!
//! Residents list books they own, borrow books listed by neighbours and pay
//! for each approved borrow with credits earned by listing. The server exposes
//! a REST JSON API over a lending state machine and a credit ledger.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod lending;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
