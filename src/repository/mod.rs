//! Repository layer for database operations
//!
//! Each entity has a store trait, implemented here against PostgreSQL.
//! Services only see the traits, so they can run against mocks in tests.

pub mod authors;
pub mod book_instances;
pub mod books;
pub mod genres;
pub mod users;

use std::sync::Arc;

use sqlx::{Pool, Postgres};

use crate::error::AppError;

pub use authors::AuthorsStore;
pub use book_instances::BookInstancesStore;
pub use books::BooksStore;
pub use genres::GenresStore;
pub use users::UsersStore;

/// Handles to every store
#[derive(Clone)]
pub struct Repository {
    pub authors: Arc<dyn AuthorsStore>,
    pub books: Arc<dyn BooksStore>,
    pub genres: Arc<dyn GenresStore>,
    pub instances: Arc<dyn BookInstancesStore>,
    pub users: Arc<dyn UsersStore>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            authors: Arc::new(authors::AuthorsRepository::new(pool.clone())),
            books: Arc::new(books::BooksRepository::new(pool.clone())),
            genres: Arc::new(genres::GenresRepository::new(pool.clone())),
            instances: Arc::new(book_instances::BookInstancesRepository::new(pool.clone())),
            users: Arc::new(users::UsersRepository::new(pool)),
        }
    }
}

/// Turn a foreign key violation into a validation error naming the bad reference
pub(crate) fn map_reference_error(e: sqlx::Error, what: &str) -> AppError {
    let is_fk_violation = e
        .as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == "23503")
        .unwrap_or(false);

    if is_fk_violation {
        AppError::Validation(format!("Unknown {} reference", what))
    } else {
        AppError::Database(e)
    }
}
