//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, authors, books, health, index, loans};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Catalog API",
        version = "0.1.0",
        description = "Local library catalog REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Home
        index::index,
        // Auth
        auth::login,
        // Books
        books::list_books,
        books::search_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        books::add_copy,
        books::list_genres,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::author_draft,
        authors::create_author,
        authors::update_author,
        authors::delete_author,
        // Loans
        loans::borrowed_by_me,
        loans::borrowed_by_all,
        loans::renewal_form,
        loans::renew_book,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            crate::models::user::Permission,
            // Catalog
            index::IndexContext,
            crate::services::catalog::CatalogCounts,
            crate::models::book::Book,
            crate::models::book::BookDetail,
            crate::models::book::BookForm,
            crate::models::genre::Genre,
            crate::models::author::Author,
            crate::models::author::AuthorDetail,
            crate::models::author::AuthorDraft,
            crate::models::author::AuthorForm,
            crate::models::book_instance::BookInstance,
            crate::models::book_instance::BorrowedInstance,
            crate::models::book_instance::CreateBookInstance,
            crate::models::book_instance::LoanStatus,
            // Renewal
            crate::models::renewal::RenewBookForm,
            crate::models::renewal::RenewalFormState,
            crate::models::renewal::RenewalPage,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "catalog", description = "Home page"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "books", description = "Books, copies and genres"),
        (name = "authors", description = "Authors"),
        (name = "loans", description = "Borrowed copies and renewals")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
