//! Per-browser current user.
//!
//! The selected user id travels in a cookie, so switching users in one
//! browser never affects requests from another. Requests without a usable
//! cookie fall back to the configured default user.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::{db::User, error::ApiError, time::TimeService, users, ApiState};

pub const COOKIE_NAME: &str = "user_id";

/// The user the request acts on behalf of. Rejects with
/// [`ApiError::UserNotFound`] when the selected id has no user row.
pub struct CurrentUser(pub User);

pub fn current_user_id(jar: &CookieJar, default: i64) -> i64 {
    jar.get(COOKIE_NAME)
        .and_then(|cookie| cookie.value().parse().ok())
        .unwrap_or(default)
}

pub fn select(jar: CookieJar, user_id: i64) -> CookieJar {
    jar.add(
        Cookie::build((COOKIE_NAME, user_id.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

#[async_trait]
impl<T: TimeService> FromRequestParts<ApiState<T>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ApiState<T>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let id = current_user_id(&jar, state.default_user_id);

        users::find_user(&state.db, id)
            .await?
            .map(CurrentUser)
            .ok_or(ApiError::UserNotFound)
    }
}
