//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::AppError;

/// Category value that disables the category filter
pub const ALL_CATEGORIES: &str = "All";

/// Book availability status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum BookStatus {
    Available,
    #[serde(rename = "Pending_Approval")]
    PendingApproval,
    Exchanged,
}

impl BookStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Available => "Available",
            BookStatus::PendingApproval => "Pending_Approval",
            BookStatus::Exchanged => "Exchanged",
        }
    }
}

impl std::str::FromStr for BookStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Available" => Ok(BookStatus::Available),
            "Pending_Approval" => Ok(BookStatus::PendingApproval),
            "Exchanged" => Ok(BookStatus::Exchanged),
            _ => Err(format!("Invalid book status: {}", s)),
        }
    }
}

super::impl_text_status!(BookStatus);

/// Book listed by a user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub condition: String,
    pub category: String,
    pub status: BookStatus,
    pub owner_id: i32,
    pub created_at: DateTime<Utc>,
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Author is required"))]
    pub author: String,
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    #[validate(length(min = 1, message = "Condition is required"))]
    pub condition: String,
    #[validate(length(min = 1, message = "Category is required"))]
    pub category: String,
}

/// Validated book fields ready for insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub condition: String,
    pub category: String,
}

impl TryFrom<CreateBook> for NewBook {
    type Error = AppError;

    fn try_from(request: CreateBook) -> Result<Self, Self::Error> {
        request.validate()?;

        let non_empty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        Ok(NewBook {
            title: request.title,
            author: request.author,
            isbn: non_empty(request.isbn),
            description: non_empty(request.description),
            cover_image: non_empty(request.cover_image),
            condition: request.condition,
            category: request.category,
        })
    }
}

/// Book listing filters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Substring to look for in the title
    pub search: Option<String>,
    /// Exact category, "All" disables the filter
    pub category: Option<String>,
}

impl BookQuery {
    pub fn search_text(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.is_empty())
    }

    pub fn category_filter(&self) -> Option<&str> {
        self.category
            .as_deref()
            .filter(|c| !c.is_empty() && *c != ALL_CATEGORIES)
    }

    /// Whether a book belongs in the public listing for this query
    pub fn matches(&self, book: &Book) -> bool {
        book.status == BookStatus::Available
            && self.search_text().map_or(true, |s| book.title.contains(s))
            && self.category_filter().map_or(true, |c| book.category == c)
    }
}
