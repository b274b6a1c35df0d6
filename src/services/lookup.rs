//! ISBN metadata lookup against public book databases.
//!
//! Providers are tried in order (Google Books, then Open Library). A provider
//! that errors or has no record hands over to the next one; when every
//! provider misses the lookup fails with `NotFound`.

use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    config::LookupConfig,
    error::{AppError, AppResult},
    models::BookMetadata,
};

static NON_ISBN_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9X]").unwrap());

const UNKNOWN: &str = "Unknown";
const NO_DESCRIPTION: &str = "No description available.";

/// Normalize an ISBN to digits and `X` only
pub fn normalize_isbn(raw: &str) -> String {
    NON_ISBN_CHARS
        .replace_all(&raw.to_uppercase(), "")
        .into_owned()
}

/// Failure talking to a metadata provider
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(u16),
}

/// A remote source of bibliographic metadata
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Metadata for a normalized ISBN, `None` when the provider has no record
    async fn fetch(&self, isbn: &str) -> Result<Option<BookMetadata>, ProviderError>;
}

// ---------------------------------------------------------------------------
// Google Books
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
struct GoogleVolumes {
    #[serde(default)]
    items: Vec<GoogleVolume>,
}

#[derive(Debug, Default, Deserialize)]
struct GoogleVolume {
    #[serde(rename = "volumeInfo", default)]
    volume_info: GoogleVolumeInfo,
}

#[derive(Debug, Default, Deserialize)]
struct GoogleVolumeInfo {
    title: Option<String>,
    #[serde(default)]
    authors: Vec<String>,
    description: Option<String>,
    #[serde(rename = "imageLinks")]
    image_links: Option<GoogleImageLinks>,
}

#[derive(Debug, Default, Deserialize)]
struct GoogleImageLinks {
    thumbnail: Option<String>,
}

impl GoogleVolumes {
    fn into_metadata(self) -> Option<BookMetadata> {
        let info = self.items.into_iter().next()?.volume_info;

        let mut cover_image = info
            .image_links
            .and_then(|links| links.thumbnail)
            .unwrap_or_default();
        if let Some(rest) = cover_image.strip_prefix("http://") {
            cover_image = format!("https://{}", rest);
        }

        Some(BookMetadata {
            title: info.title.unwrap_or_else(|| UNKNOWN.to_string()),
            author: info
                .authors
                .into_iter()
                .next()
                .unwrap_or_else(|| UNKNOWN.to_string()),
            description: info.description.unwrap_or_default(),
            cover_image,
        })
    }
}

pub struct GoogleBooksProvider {
    client: Client,
    base_url: String,
}

impl GoogleBooksProvider {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl MetadataProvider for GoogleBooksProvider {
    fn name(&self) -> &'static str {
        "Google Books"
    }

    async fn fetch(&self, isbn: &str) -> Result<Option<BookMetadata>, ProviderError> {
        let response = self
            .client
            .get(format!("{}/volumes", self.base_url.trim_end_matches('/')))
            .query(&[("q", format!("isbn:{}", isbn))])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }

        let volumes: GoogleVolumes = response.json().await?;
        Ok(volumes.into_metadata())
    }
}

// ---------------------------------------------------------------------------
// Open Library
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct OpenLibraryBook {
    title: Option<String>,
    #[serde(default)]
    authors: Vec<OpenLibraryAuthor>,
    cover: Option<OpenLibraryCover>,
}

#[derive(Debug, Deserialize)]
struct OpenLibraryAuthor {
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenLibraryCover {
    medium: Option<String>,
}

impl OpenLibraryBook {
    fn into_metadata(self) -> BookMetadata {
        BookMetadata {
            title: self.title.unwrap_or_else(|| UNKNOWN.to_string()),
            author: self
                .authors
                .into_iter()
                .next()
                .and_then(|a| a.name)
                .unwrap_or_else(|| UNKNOWN.to_string()),
            description: NO_DESCRIPTION.to_string(),
            cover_image: self.cover.and_then(|c| c.medium).unwrap_or_default(),
        }
    }
}

fn open_library_key(isbn: &str) -> String {
    format!("ISBN:{}", isbn)
}

pub struct OpenLibraryProvider {
    client: Client,
    base_url: String,
}

impl OpenLibraryProvider {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl MetadataProvider for OpenLibraryProvider {
    fn name(&self) -> &'static str {
        "Open Library"
    }

    async fn fetch(&self, isbn: &str) -> Result<Option<BookMetadata>, ProviderError> {
        let key = open_library_key(isbn);
        let response = self
            .client
            .get(format!("{}/api/books", self.base_url.trim_end_matches('/')))
            .query(&[("bibkeys", key.as_str()), ("jscmd", "data"), ("format", "json")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }

        let mut books: HashMap<String, OpenLibraryBook> = response.json().await?;
        Ok(books.remove(&key).map(OpenLibraryBook::into_metadata))
    }
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct LookupService {
    providers: Vec<Arc<dyn MetadataProvider>>,
}

impl LookupService {
    pub fn new(providers: Vec<Arc<dyn MetadataProvider>>) -> Self {
        Self { providers }
    }

    /// Google Books first, Open Library as fallback
    pub fn from_config(config: &LookupConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        let google: Arc<dyn MetadataProvider> = Arc::new(GoogleBooksProvider::new(
            client.clone(),
            &config.google_books_url,
        ));
        let open_library: Arc<dyn MetadataProvider> =
            Arc::new(OpenLibraryProvider::new(client, &config.open_library_url));

        Ok(Self::new(vec![google, open_library]))
    }

    /// Look up metadata for a raw ISBN string
    pub async fn lookup(&self, raw_isbn: &str) -> AppResult<BookMetadata> {
        let isbn = normalize_isbn(raw_isbn);
        if isbn.is_empty() {
            return Err(AppError::Validation("ISBN must contain digits".to_string()));
        }

        tracing::info!("Looking up ISBN {}", isbn);

        for provider in &self.providers {
            match provider.fetch(&isbn).await {
                Ok(Some(metadata)) => {
                    tracing::info!("ISBN {} found in {}", isbn, provider.name());
                    return Ok(metadata);
                }
                Ok(None) => {
                    tracing::debug!("{} has no record for ISBN {}", provider.name(), isbn);
                }
                Err(e) => {
                    tracing::warn!("{} lookup failed for ISBN {}: {}", provider.name(), isbn, e);
                }
            }
        }

        Err(AppError::NotFound("Book not found in any database".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(title: &str) -> BookMetadata {
        BookMetadata {
            title: title.to_string(),
            author: "Frank Herbert".to_string(),
            description: String::new(),
            cover_image: String::new(),
        }
    }

    fn provider(
        name: &'static str,
        result: fn() -> Result<Option<BookMetadata>, ProviderError>,
    ) -> Arc<dyn MetadataProvider> {
        let mut mock = MockMetadataProvider::new();
        mock.expect_name().return_const(name);
        mock.expect_fetch()
            .withf(|isbn| isbn.to_string() == "9780441013593")
            .times(1)
            .returning(move |_| result());
        Arc::new(mock)
    }

    fn unused(name: &'static str) -> Arc<dyn MetadataProvider> {
        let mut mock = MockMetadataProvider::new();
        mock.expect_name().return_const(name);
        mock.expect_fetch().never();
        Arc::new(mock)
    }

    #[test]
    fn test_normalize_isbn() {
        assert_eq!(normalize_isbn("978-0-441-01359-3"), "9780441013593");
        assert_eq!(normalize_isbn(" 0 8044 2957 x "), "080442957X");
        assert_eq!(normalize_isbn("isbn: abc"), "");
    }

    #[test]
    fn test_google_volume_parsing() {
        let body = r#"{
            "items": [{
                "volumeInfo": {
                    "title": "Dune",
                    "authors": ["Frank Herbert", "Someone Else"],
                    "description": "Spice.",
                    "imageLinks": {"thumbnail": "http://books.google.com/cover.jpg"}
                }
            }]
        }"#;
        let volumes: GoogleVolumes = serde_json::from_str(body).unwrap();
        let metadata = volumes.into_metadata().unwrap();
        assert_eq!(metadata.title, "Dune");
        assert_eq!(metadata.author, "Frank Herbert");
        assert_eq!(metadata.description, "Spice.");
        assert_eq!(metadata.cover_image, "https://books.google.com/cover.jpg");
    }

    #[test]
    fn test_google_defaults_and_empty() {
        let volumes: GoogleVolumes =
            serde_json::from_str(r#"{"items": [{"volumeInfo": {}}]}"#).unwrap();
        let metadata = volumes.into_metadata().unwrap();
        assert_eq!(metadata.title, "Unknown");
        assert_eq!(metadata.author, "Unknown");
        assert_eq!(metadata.description, "");
        assert_eq!(metadata.cover_image, "");

        let empty: GoogleVolumes = serde_json::from_str(r#"{"totalItems": 0}"#).unwrap();
        assert!(empty.into_metadata().is_none());
    }

    #[test]
    fn test_open_library_parsing() {
        let body = r#"{
            "ISBN:9780441013593": {
                "title": "Dune",
                "authors": [{"name": "Frank Herbert", "url": "https://openlibrary.org/a"}],
                "cover": {"small": "s.jpg", "medium": "m.jpg"}
            }
        }"#;
        let mut books: HashMap<String, OpenLibraryBook> = serde_json::from_str(body).unwrap();
        let metadata = books
            .remove(&open_library_key("9780441013593"))
            .unwrap()
            .into_metadata();
        assert_eq!(metadata.title, "Dune");
        assert_eq!(metadata.author, "Frank Herbert");
        assert_eq!(metadata.description, "No description available.");
        assert_eq!(metadata.cover_image, "m.jpg");
    }

    #[tokio::test]
    async fn test_primary_provider_wins() {
        let service = LookupService::new(vec![
            provider("primary", || Ok(Some(metadata("From primary")))),
            unused("fallback"),
        ]);

        let found = service.lookup("978-0-441-01359-3").await.unwrap();
        assert_eq!(found.title, "From primary");
    }

    #[tokio::test]
    async fn test_falls_back_on_miss() {
        let service = LookupService::new(vec![
            provider("primary", || Ok(None)),
            provider("fallback", || Ok(Some(metadata("From fallback")))),
        ]);

        let found = service.lookup("9780441013593").await.unwrap();
        assert_eq!(found.title, "From fallback");
    }

    #[tokio::test]
    async fn test_falls_back_on_error() {
        let service = LookupService::new(vec![
            provider("primary", || Err(ProviderError::Status(503))),
            provider("fallback", || Ok(Some(metadata("From fallback")))),
        ]);

        let found = service.lookup("9780441013593").await.unwrap();
        assert_eq!(found.title, "From fallback");
    }

    #[tokio::test]
    async fn test_not_found_when_all_miss() {
        let service = LookupService::new(vec![
            provider("primary", || Ok(None)),
            provider("fallback", || Err(ProviderError::Status(500))),
        ]);

        let result = service.lookup("9780441013593").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_rejects_empty_isbn() {
        let service = LookupService::new(vec![unused("primary")]);
        let result = service.lookup("n/a").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
