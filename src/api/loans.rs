//! Loan endpoints: borrowed lists and renewals

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::WithRejection;
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        book_instance::BorrowedInstance,
        pagination::{Page, PageQuery},
        renewal::{RenewBookForm, RenewalOutcome, RenewalPage},
    },
};

use super::{AuthenticatedUser, CanMarkReturned, RequirePermission, ALL_BORROWED_PATH};

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Copies on loan to the current user
#[utoipa::path(
    get,
    path = "/mybooks",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("page" = Option<i64>, Query, description = "Page number (default: 1)")
    ),
    responses(
        (status = 200, description = "Caller's loans, soonest due first", body = Page<BorrowedInstance>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn borrowed_by_me(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    WithRejection(Query(query), _): WithRejection<Query<PageQuery>, AppError>,
) -> AppResult<Json<Page<BorrowedInstance>>> {
    let page = state
        .services
        .loans
        .borrowed_by_user(claims.user_id, query)
        .await?;
    Ok(Json(page))
}

/// Every copy on loan (librarians only)
#[utoipa::path(
    get,
    path = "/borrowed",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("page" = Option<i64>, Query, description = "Page number (default: 1)")
    ),
    responses(
        (status = 200, description = "All loans, soonest due first", body = Page<BorrowedInstance>),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Missing can_mark_returned permission")
    )
)]
pub async fn borrowed_by_all(
    State(state): State<crate::AppState>,
    _: RequirePermission<CanMarkReturned>,
    WithRejection(Query(query), _): WithRejection<Query<PageQuery>, AppError>,
) -> AppResult<Json<Page<BorrowedInstance>>> {
    let page = state.services.loans.borrowed_by_all(query).await?;
    Ok(Json(page))
}

/// Renewal form for a copy, proposing a date three weeks from today
#[utoipa::path(
    get,
    path = "/bookinstances/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    responses(
        (status = 200, description = "Renewal form", body = RenewalPage),
        (status = 403, description = "Missing can_mark_returned permission"),
        (status = 404, description = "Book instance not found")
    )
)]
pub async fn renewal_form(
    State(state): State<crate::AppState>,
    _: RequirePermission<CanMarkReturned>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> AppResult<Json<RenewalPage>> {
    let page = state.services.loans.renewal_form(id, today()).await?;
    Ok(Json(page))
}

/// Renew a loan
///
/// Redirects to the all-borrowed list on success. A missing, unparseable or
/// out-of-range date sends the form back with an inline error and leaves the
/// copy untouched.
#[utoipa::path(
    post,
    path = "/bookinstances/{id}/renew",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Book instance ID")
    ),
    request_body = RenewBookForm,
    responses(
        (status = 303, description = "Renewed; redirect to the all-borrowed list"),
        (status = 400, description = "Malformed request", body = crate::error::ErrorResponse),
        (status = 403, description = "Missing can_mark_returned permission"),
        (status = 404, description = "Book instance not found"),
        (status = 422, description = "Invalid renewal date", body = RenewalPage)
    )
)]
pub async fn renew_book(
    State(state): State<crate::AppState>,
    _: RequirePermission<CanMarkReturned>,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(Json(form), _): WithRejection<Json<RenewBookForm>, AppError>,
) -> AppResult<Response> {
    match state.services.loans.renew(id, form, today()).await? {
        RenewalOutcome::Renewed(_) => Ok(Redirect::to(ALL_BORROWED_PATH).into_response()),
        RenewalOutcome::Rejected(page) => {
            Ok((StatusCode::UNPROCESSABLE_ENTITY, Json(page)).into_response())
        }
    }
}
