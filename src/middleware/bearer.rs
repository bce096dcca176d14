/// Bearer token extraction
///
/// Pulls the raw token out of `Authorization: Bearer <token>`. Verification
/// is left to the auth service so that token and user failures are reported
/// through the same error taxonomy.

use actix_web::{dev::Payload, http::header, FromRequest, HttpRequest};
use std::future::{ready, Ready};

use crate::error::{AppError, AuthError};

#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl BearerToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse an `Authorization` header value; the scheme is case-insensitive.
    pub fn parse(header_value: &str) -> Option<Self> {
        let (scheme, token) = header_value.trim().split_once(' ')?;
        let token = token.trim();
        if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
            return None;
        }
        Some(Self(token.to_string()))
    }
}

impl FromRequest for BearerToken {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(BearerToken::parse);

        ready(token.ok_or_else(|| {
            tracing::warn!("Missing or invalid Authorization header");
            AppError::Auth(AuthError::InvalidToken)
        }))
    }
}
