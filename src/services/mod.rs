//! Business logic services

pub mod auth;
pub mod catalog;
pub mod lending;
pub mod lookup;

use crate::{config::AppConfig, error::AppResult, lending::LendingPolicy, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub auth: auth::AuthService,
    pub catalog: catalog::CatalogService,
    pub lending: lending::LendingService,
    pub lookup: lookup::LookupService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> AppResult<Self> {
        Ok(Self {
            auth: auth::AuthService::new(repository.clone(), config.auth.clone())?,
            catalog: catalog::CatalogService::new(repository.clone()),
            lending: lending::LendingService::new(
                repository,
                LendingPolicy::from(&config.lending),
            ),
            lookup: lookup::LookupService::from_config(&config.lookup)?,
        })
    }
}
