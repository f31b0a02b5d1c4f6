use axum::http::{header, request::Parts};
use std::sync::Arc;

use super::error::ApiError;
use crate::auth::token;
use crate::AppContext;

/// Authenticated caller, resolved from the `Authorization: Bearer` header.
///
/// Handlers that take this extractor can only run with a verified identity;
/// there is no anonymous path into the task routes.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub username: String,
}

impl axum::extract::FromRequestParts<Arc<AppContext>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &Arc<AppContext>,
    ) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(ApiError::unauthorized)?;

        let token = token::bearer_token(header_value).ok_or_else(ApiError::unauthorized)?;
        let claims = ctx
            .tokens
            .verify(token)
            .map_err(|_| ApiError::unauthorized())?;

        // The token may outlive the account row; re-check it exists.
        let user = ctx
            .storage
            .get_user(&claims.sub)
            .await
            .map_err(|e| {
                tracing::error!(err = %e, "user lookup failed during auth");
                ApiError::internal()
            })?
            .ok_or_else(ApiError::unauthorized)?;

        Ok(Self {
            id: user.id,
            username: user.username,
        })
    }
}
