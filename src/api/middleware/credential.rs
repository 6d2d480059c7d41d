//! Optional caller bearer credential.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_auth::AuthBearer;
use std::convert::Infallible;

/// Bearer token from the `Authorization` header, if one was sent.
///
/// Never rejects: public report reads work without a credential, and the
/// minting handler decides itself whether a missing token is an error.
/// Malformed headers are treated as absent.
///
/// # Header Format
///
/// ```text
/// Authorization: Bearer <token>
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallerCredential(pub Option<String>);

impl CallerCredential {
    pub fn token(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S> FromRequestParts<S> for CallerCredential
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = AuthBearer::from_request_parts(parts, &())
            .await
            .ok()
            .map(|AuthBearer(token)| token)
            .filter(|token| !token.trim().is_empty());

        Ok(CallerCredential(token))
    }
}
