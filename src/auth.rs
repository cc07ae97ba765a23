use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::handlers::ErrorResponse;
use crate::models::Claims;
use crate::AppState;

/// Extractor that validates the session JWT.
///
/// Add `auth: AuthSession` to a handler's parameters to require a login;
/// `auth.session_id()` keys the operator's workflow in the store.
pub struct AuthSession {
    pub claims: Claims,
}

impl AuthSession {
    pub fn session_id(&self) -> &str {
        &self.claims.sub
    }
}

#[async_trait::async_trait]
impl FromRequestParts<Arc<AppState>> for AuthSession {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AuthError::MissingToken)?;
        let token = header.strip_prefix("Bearer ").ok_or(AuthError::InvalidToken)?;

        let claims = decode_token(token, &state.config.jwt_secret).ok_or(AuthError::InvalidToken)?;
        Ok(AuthSession { claims })
    }
}

/// Sign a session token that expires together with the controller session
pub fn issue_token(
    session_id: &str,
    username: &str,
    lifetime: std::time::Duration,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now();
    let exp = now + chrono::TimeDelta::seconds(lifetime.as_secs() as i64);

    let claims = Claims {
        sub: session_id.to_string(),
        username: username.to_string(),
        exp: exp.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
}

fn decode_token(token: &str, secret: &str) -> Option<Claims> {
    jsonwebtoken::decode::<Claims>(
        token,
        &jsonwebtoken::DecodingKey::from_secret(secret.as_bytes()),
        &jsonwebtoken::Validation::default(),
    )
    .ok()
    .map(|data| data.claims)
}

pub enum AuthError {
    MissingToken,
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Missing authentication token"),
            AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid or expired token"),
        };
        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
