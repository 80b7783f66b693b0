//! Session extractor
//!
//! Handlers that take an [`AuthUser`] only run for requests carrying a live
//! session token, sent as `Authorization: Bearer <token>`. Browsers cannot set
//! headers on WebSocket upgrades, so a `token` query parameter is accepted too.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::users::User;

/// The logged-in user behind a request
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
    pub token: String,
}

/// Pull the session token from the Authorization header or `?token=`
pub fn token_from_parts(parts: &Parts) -> Option<String> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            v.strip_prefix("Bearer ")
                .or_else(|| v.strip_prefix("bearer "))
        })
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(token) = header {
        return Some(token.to_string());
    }

    parts.uri.query().and_then(|query| {
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(k, _)| *k == "token")
            .and_then(|(_, v)| urlencoding::decode(v).ok())
            .map(|v| v.into_owned())
            .filter(|t| !t.is_empty())
    })
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_parts(parts)
            .ok_or_else(|| ApiError::Unauthorized("Missing session token".to_string()))?;

        let user = state
            .sessions
            .current_user(&token)
            .await
            .map_err(|e| ApiError::Unauthorized(e.to_string()))?;

        Ok(AuthUser { user, token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(builder: axum::http::request::Builder) -> Parts {
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_token_from_header() {
        let p = parts(Request::builder().uri("/api/medications").header("Authorization", "Bearer abc-123"));
        assert_eq!(token_from_parts(&p).as_deref(), Some("abc-123"));
    }

    #[test]
    fn test_token_from_query() {
        let p = parts(Request::builder().uri("/api/ws?foo=1&token=t%2D9"));
        assert_eq!(token_from_parts(&p).as_deref(), Some("t-9"));
    }

    #[test]
    fn test_missing_token() {
        let p = parts(Request::builder().uri("/api/medications").header("Authorization", "Basic xyz"));
        assert!(token_from_parts(&p).is_none());
    }
}
