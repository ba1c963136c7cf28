//! API handlers for the catalog REST endpoints

pub mod auth;
pub mod authors;
pub mod books;
pub mod health;
pub mod index;
pub mod loans;
pub mod openapi;
pub mod session;


use std::marker::PhantomData;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    error::AppError,
    models::user::{Permission, UserClaims},
    AppState,
};

/// Prefix all API routes are nested under
pub const API_PREFIX: &str = "/api/v1";

/// Redirect target after a successful renewal
pub const ALL_BORROWED_PATH: &str = "/api/v1/borrowed";
/// Redirect target after deleting a book
pub const BOOKS_PATH: &str = "/api/v1/books";
/// Redirect target after deleting an author
pub const AUTHORS_PATH: &str = "/api/v1/authors";

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Capability a route requires, named as a type for [`RequirePermission`]
pub trait Capability: Send + Sync + 'static {
    const PERMISSION: Permission;
}

/// Librarians who can mark copies returned and renew loans
pub struct CanMarkReturned;

impl Capability for CanMarkReturned {
    const PERMISSION: Permission = Permission::CanMarkReturned;
}

/// Catalog editors
pub struct ManageCatalog;

impl Capability for ManageCatalog {
    const PERMISSION: Permission = Permission::ManageCatalog;
}

/// Authenticated caller holding capability `C`.
///
/// Runs with the other request-part extractors, so a caller without the
/// capability is turned away before the path or body is looked at.
pub struct RequirePermission<C: Capability>(pub UserClaims, PhantomData<C>);

#[async_trait]
impl<C: Capability> FromRequestParts<AppState> for RequirePermission<C> {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let AuthenticatedUser(claims) = AuthenticatedUser::from_request_parts(parts, state).await?;
        claims.require(C::PERMISSION)?;
        Ok(RequirePermission(claims, PhantomData))
    }
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Home page
        .route("/", get(index::index))
        // Authentication
        .route("/auth/login", post(auth::login))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/search", get(books::search_books))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        .route("/books/:id/instances", post(books::add_copy))
        .route("/genres", get(books::list_genres))
        // Authors
        .route("/authors", get(authors::list_authors).post(authors::create_author))
        .route("/authors/new", get(authors::author_draft))
        .route(
            "/authors/:id",
            get(authors::get_author)
                .put(authors::update_author)
                .delete(authors::delete_author),
        )
        // Loans
        .route("/mybooks", get(loans::borrowed_by_me))
        .route("/borrowed", get(loans::borrowed_by_all))
        .route(
            "/bookinstances/:id/renew",
            get(loans::renewal_form).post(loans::renew_book),
        )
        .with_state(state);

    Router::new()
        .nest(API_PREFIX, api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
