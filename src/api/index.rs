//! Home page endpoint

use axum::{extract::State, Json};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, services::catalog::CatalogCounts};

use super::session::Session;

/// Home page context
#[derive(Serialize, ToSchema)]
pub struct IndexContext {
    #[serde(flatten)]
    pub counts: CatalogCounts,
    /// Earlier visits of this session to the home page
    pub num_visits: i64,
}

/// Catalog counts and the visitor's visit count
#[utoipa::path(
    get,
    path = "/",
    tag = "catalog",
    responses(
        (status = 200, description = "Home page context", body = IndexContext)
    )
)]
pub async fn index(
    State(state): State<crate::AppState>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<IndexContext>)> {
    let cookie_name = &state.config.catalog.session_cookie;
    let session = Session::from_jar(&jar, cookie_name);

    let counts = state.services.catalog.counts().await?;
    let num_visits = state.services.sessions.record_visit(&session.id).await?;

    Ok((
        session.persist(jar, cookie_name),
        Json(IndexContext { counts, num_visits }),
    ))
}
