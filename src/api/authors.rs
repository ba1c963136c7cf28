//! Author endpoints

use axum::{
    extract::{Path, Query, State},
    http::{header::LOCATION, HeaderName, StatusCode},
    response::Redirect,
    Json,
};
use axum_extra::extract::WithRejection;

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorDetail, AuthorDraft, AuthorForm},
        pagination::{Page, PageQuery},
    },
};

use super::{ManageCatalog, RequirePermission, AUTHORS_PATH};

/// List authors, ten per page
#[utoipa::path(
    get,
    path = "/authors",
    tag = "authors",
    params(
        ("page" = Option<i64>, Query, description = "Page number (default: 1)")
    ),
    responses(
        (status = 200, description = "Page of authors", body = Page<Author>),
        (status = 404, description = "Invalid page")
    )
)]
pub async fn list_authors(
    State(state): State<crate::AppState>,
    WithRejection(Query(query), _): WithRejection<Query<PageQuery>, AppError>,
) -> AppResult<Json<Page<Author>>> {
    let page = state.services.catalog.list_authors(query).await?;
    Ok(Json(page))
}

/// Author with their books
#[utoipa::path(
    get,
    path = "/authors/{id}",
    tag = "authors",
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 200, description = "Author details", body = AuthorDetail),
        (status = 404, description = "Author not found")
    )
)]
pub async fn get_author(
    State(state): State<crate::AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, AppError>,
) -> AppResult<Json<AuthorDetail>> {
    let author = state.services.catalog.get_author(id).await?;
    Ok(Json(author))
}

/// Initial values of the author create form
#[utoipa::path(
    get,
    path = "/authors/new",
    tag = "authors",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Pre-filled author form", body = AuthorDraft)
    )
)]
pub async fn author_draft(
    State(state): State<crate::AppState>,
    _: RequirePermission<ManageCatalog>,
) -> AppResult<Json<AuthorDraft>> {
    Ok(Json(state.services.catalog.author_draft()))
}

/// Create an author
#[utoipa::path(
    post,
    path = "/authors",
    tag = "authors",
    security(("bearer_auth" = [])),
    request_body = AuthorForm,
    responses(
        (status = 201, description = "Author created", body = Author),
        (status = 400, description = "Invalid form"),
        (status = 403, description = "Missing manage_catalog permission")
    )
)]
pub async fn create_author(
    State(state): State<crate::AppState>,
    _: RequirePermission<ManageCatalog>,
    WithRejection(Json(form), _): WithRejection<Json<AuthorForm>, AppError>,
) -> AppResult<(StatusCode, [(HeaderName, String); 1], Json<Author>)> {
    let author = state.services.catalog.create_author(form).await?;
    let location = format!("{}/{}", AUTHORS_PATH, author.id);
    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(author)))
}

/// Update an author
#[utoipa::path(
    put,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    request_body = AuthorForm,
    responses(
        (status = 200, description = "Author updated", body = Author),
        (status = 400, description = "Invalid form"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn update_author(
    State(state): State<crate::AppState>,
    _: RequirePermission<ManageCatalog>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, AppError>,
    WithRejection(Json(form), _): WithRejection<Json<AuthorForm>, AppError>,
) -> AppResult<Json<Author>> {
    let author = state.services.catalog.update_author(id, form).await?;
    Ok(Json(author))
}

/// Delete an author, then redirect to the author list
#[utoipa::path(
    delete,
    path = "/authors/{id}",
    tag = "authors",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Author ID")
    ),
    responses(
        (status = 303, description = "Deleted; redirect to the author list"),
        (status = 404, description = "Author not found")
    )
)]
pub async fn delete_author(
    State(state): State<crate::AppState>,
    _: RequirePermission<ManageCatalog>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, AppError>,
) -> AppResult<Redirect> {
    state.services.catalog.delete_author(id).await?;
    Ok(Redirect::to(AUTHORS_PATH))
}
