//! Business logic services

pub mod catalog;
pub mod loans;
pub mod redis;
pub mod users;

use std::sync::Arc;

use crate::{config::AppConfig, repository::Repository};

use self::redis::SessionStore;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub users: users::UsersService,
    pub sessions: Arc<dyn SessionStore>,
}

impl Services {
    /// Create all services over the given repository and session store
    pub fn new(repository: Repository, config: &AppConfig, sessions: Arc<dyn SessionStore>) -> Self {
        Self {
            catalog: catalog::CatalogService::new(&repository, config.catalog.featured_genre_id),
            loans: loans::LoansService::new(repository.instances.clone()),
            users: users::UsersService::new(repository.users.clone(), config.auth.clone()),
            sessions,
        }
    }
}
