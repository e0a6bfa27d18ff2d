//! Bearer token authentication
//!
//! `AuthUser` resolves `Authorization: Bearer <token>` to a registered user by
//! looking up the token's SHA-256 digest. Handlers that require a user take
//! `AuthUser`; handlers where identity is optional take `Option<AuthUser>`,
//! which is `None` when no header is sent but still rejects a bad token.

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{header, request::Parts},
};
use pinpoint_core::{User, token::hash_api_token};
use tracing::debug;

use crate::{app::AppState, error::ApiError};

/// The user a request was authenticated as
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?.ok_or_else(ApiError::unauthorized)?;
        authenticate(state, &token).await
    }
}

impl OptionalFromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        match bearer_token(parts)? {
            Some(token) => authenticate(state, &token).await.map(Some),
            None => Ok(None),
        }
    }
}

/// Extract the bearer token, if an Authorization header is present
fn bearer_token(parts: &Parts) -> Result<Option<String>, ApiError> {
    let Some(value) = parts.headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    let token = value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(ApiError::unauthorized)?;

    Ok(Some(token.to_string()))
}

async fn authenticate(state: &AppState, token: &str) -> Result<AuthUser, ApiError> {
    let user = state
        .store
        .find_user_by_token_hash(&hash_api_token(token))
        .await
        .map_err(|e| ApiError::from_core(e, "Internal error"))?;

    match user {
        Some(user) => Ok(AuthUser(user)),
        None => {
            debug!("Rejected unknown API token");
            Err(ApiError::unauthorized())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(authorization: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/share");
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_missing_header_is_none() {
        assert!(bearer_token(&parts(None)).unwrap().is_none());
    }

    #[test]
    fn test_bearer_token_is_extracted() {
        let token = bearer_token(&parts(Some("Bearer pp_abc "))).unwrap();
        assert_eq!(token.as_deref(), Some("pp_abc"));
    }

    #[test]
    fn test_other_schemes_are_rejected() {
        assert!(bearer_token(&parts(Some("Basic dXNlcjpwYXNz"))).is_err());
        assert!(bearer_token(&parts(Some("Bearer "))).is_err());
    }
}
