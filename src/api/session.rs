//! Visitor session cookie

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use uuid::Uuid;

/// Session of the current visitor, identified by a cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    /// Set when the visitor had no (valid) session cookie yet
    pub is_new: bool,
}

impl Session {
    /// Read the session from the cookie jar, starting a new one if absent
    pub fn from_jar(jar: &CookieJar, cookie_name: &str) -> Self {
        match jar
            .get(cookie_name)
            .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
        {
            Some(id) => Self {
                id: id.to_string(),
                is_new: false,
            },
            None => Self {
                id: Uuid::new_v4().to_string(),
                is_new: true,
            },
        }
    }

    /// Add the session cookie to the response jar when the session is new
    pub fn persist(&self, jar: CookieJar, cookie_name: &str) -> CookieJar {
        if !self.is_new {
            return jar;
        }
        jar.add(
            Cookie::build((cookie_name.to_string(), self.id.clone()))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax),
        )
    }
}
