//! Book endpoints

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
        book::{Book, BookDetail, BookForm, TitleQuery},
        book_instance::{BookInstance, CreateBookInstance},
        genre::Genre,
        pagination::{Page, PageQuery},
    },
};

use super::{ManageCatalog, RequirePermission, BOOKS_PATH};

/// List books, ten per page
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    params(
        ("page" = Option<i64>, Query, description = "Page number (default: 1)")
    ),
    responses(
        (status = 200, description = "Page of books", body = Page<Book>),
        (status = 400, description = "Malformed page number"),
        (status = 404, description = "Invalid page")
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    WithRejection(Query(query), _): WithRejection<Query<PageQuery>, AppError>,
) -> AppResult<Json<Page<Book>>> {
    let page = state.services.catalog.list_books(query).await?;
    Ok(Json(page))
}

/// Up to five books whose title contains the given text
#[utoipa::path(
    get,
    path = "/books/search",
    tag = "books",
    params(
        ("title" = String, Query, description = "Case-insensitive title fragment")
    ),
    responses(
        (status = 200, description = "Matching books", body = Vec<Book>)
    )
)]
pub async fn search_books(
    State(state): State<crate::AppState>,
    WithRejection(Query(query), _): WithRejection<Query<TitleQuery>, AppError>,
) -> AppResult<Json<Vec<Book>>> {
    let books = state.services.catalog.search_books(&query.title).await?;
    Ok(Json(books))
}

/// Book with author, genres and copies
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Book details", body = BookDetail),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, AppError>,
) -> AppResult<Json<BookDetail>> {
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book))
}

/// Create a book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = BookForm,
    responses(
        (status = 201, description = "Book created", body = Book),
        (status = 400, description = "Invalid form"),
        (status = 403, description = "Missing manage_catalog permission")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    _: RequirePermission<ManageCatalog>,
    WithRejection(Json(form), _): WithRejection<Json<BookForm>, AppError>,
) -> AppResult<(StatusCode, [(HeaderName, String); 1], Json<Book>)> {
    let book = state.services.catalog.create_book(form).await?;
    let location = format!("{}/{}", BOOKS_PATH, book.id);
    Ok((StatusCode::CREATED, [(LOCATION, location)], Json(book)))
}

/// Update a book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = BookForm,
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 400, description = "Invalid form"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    _: RequirePermission<ManageCatalog>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, AppError>,
    WithRejection(Json(form), _): WithRejection<Json<BookForm>, AppError>,
) -> AppResult<Json<Book>> {
    let book = state.services.catalog.update_book(id, form).await?;
    Ok(Json(book))
}

/// Delete a book, then redirect to the book list
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 303, description = "Deleted; redirect to the book list"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    _: RequirePermission<ManageCatalog>,
    WithRejection(Path(id), _): WithRejection<Path<i32>, AppError>,
) -> AppResult<Redirect> {
    state.services.catalog.delete_book(id).await?;
    Ok(Redirect::to(BOOKS_PATH))
}

/// Add a physical copy of a book
#[utoipa::path(
    post,
    path = "/books/{id}/instances",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Book ID")
    ),
    request_body = CreateBookInstance,
    responses(
        (status = 201, description = "Copy created", body = BookInstance),
        (status = 400, description = "Invalid copy (e.g. borrower without on-loan status)"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn add_copy(
    State(state): State<crate::AppState>,
    _: RequirePermission<ManageCatalog>,
    WithRejection(Path(book_id), _): WithRejection<Path<i32>, AppError>,
    WithRejection(Json(data), _): WithRejection<Json<CreateBookInstance>, AppError>,
) -> AppResult<(StatusCode, Json<BookInstance>)> {
    let copy = state.services.catalog.add_copy(book_id, data).await?;
    Ok((StatusCode::CREATED, Json(copy)))
}

/// Genres a book can be filed under
#[utoipa::path(
    get,
    path = "/genres",
    tag = "books",
    responses(
        (status = 200, description = "All genres", body = Vec<Genre>)
    )
)]
pub async fn list_genres(State(state): State<crate::AppState>) -> AppResult<Json<Vec<Genre>>> {
    let genres = state.services.catalog.list_genres().await?;
    Ok(Json(genres))
}
