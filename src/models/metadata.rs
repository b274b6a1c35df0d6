//! Bibliographic metadata returned by ISBN lookups

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Pre-fill data for the "add book" form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookMetadata {
    pub title: String,
    pub author: String,
    pub description: String,
    pub cover_image: String,
}

/// ISBN lookup query parameters
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LookupQuery {
    /// Raw ISBN, dashes and spaces allowed
    pub isbn: String,
}
