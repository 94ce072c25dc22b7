use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

/// The `user` header names the acting participant on authenticated routes.
/// Extraction itself never fails; each handler decides how a missing name
/// maps to a status code, since the routes disagree on it.
#[derive(Debug, Clone)]
pub struct ActingUser(pub Option<String>);

impl<S> FromRequestParts<S> for ActingUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .headers
            .get("user")
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        Ok(Self(user))
    }
}
