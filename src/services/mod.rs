//! Business logic services

pub mod catalog;
pub mod lending;
pub mod users;

use crate::{error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub users: users::UsersService,
    pub lending: lending::LendingService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            users: users::UsersService::new(repository.clone()),
            lending: lending::LendingService::new(repository.clone()),
            repository,
        }
    }

    /// Database connectivity self-check
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}
