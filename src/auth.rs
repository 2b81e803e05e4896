//! Bearer token issuing and validation for the back-office endpoints.

use std::future::{Ready, ready};

use actix_web::dev::Payload;
use actix_web::http::StatusCode;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, HttpResponse, ResponseError, web};
use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use crate::domain::auth::AuthenticatedUser;
use crate::dto::api::ApiEnvelope;
use crate::models::config::ServerConfig;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication required")]
    MissingToken,

    #[error("Session expired, please sign in again")]
    Expired,

    #[error("Invalid token")]
    Invalid,

    #[error("Could not sign token: {0}")]
    Signing(String),

    #[error("Authentication is not configured")]
    Misconfigured,
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Signing(_) | AuthError::Misconfigured => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ApiEnvelope::<()>::failure(self.to_string()))
    }
}

/// Expiry timestamp `ttl_secs` from now.
pub fn expires_in(ttl_secs: u64) -> u64 {
    (Utc::now().timestamp().max(0) as u64).saturating_add(ttl_secs)
}

/// Signs the user claims with HS256.
pub fn issue_token(user: &AuthenticatedUser, secret: &str) -> Result<String, AuthError> {
    encode(
        &Header::new(Algorithm::HS256),
        user,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Signing(e.to_string()))
}

/// Verifies signature and expiry, returning the embedded user.
pub fn decode_token(token: &str, secret: &str) -> Result<AuthenticatedUser, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);

    decode::<AuthenticatedUser>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::Expired,
        _ => AuthError::Invalid,
    })
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, AuthError> {
    let config = req
        .app_data::<web::Data<ServerConfig>>()
        .ok_or(AuthError::Misconfigured)?;
    let token = bearer_token(req).ok_or(AuthError::MissingToken)?;

    decode_token(token, &config.secret).inspect_err(|err| {
        log::warn!("Rejected bearer token on {}: {err}", req.path());
    })
}

impl FromRequest for AuthenticatedUser {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::ADMIN_ROLE;

    const SECRET: &str = "test-secret";

    fn user(exp: u64) -> AuthenticatedUser {
        AuthenticatedUser {
            sub: "7".to_string(),
            name: "Moussa Ndiaye".to_string(),
            email: "moussa@example.sn".to_string(),
            roles: vec![ADMIN_ROLE.to_string()],
            exp,
        }
    }

    #[test]
    fn valid_token_yields_claims() {
        let claims = user(expires_in(60));
        let token = issue_token(&claims, SECRET).unwrap();
        assert_eq!(decode_token(&token, SECRET).unwrap(), claims);
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = issue_token(&user(expires_in(0).saturating_sub(3600)), SECRET).unwrap();
        assert!(matches!(decode_token(&token, SECRET), Err(AuthError::Expired)));
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let token = issue_token(&user(expires_in(60)), "other-secret").unwrap();
        assert!(matches!(decode_token(&token, SECRET), Err(AuthError::Invalid)));
        assert!(matches!(decode_token("garbage", SECRET), Err(AuthError::Invalid)));
    }

    #[test]
    fn auth_errors_map_to_status_codes() {
        assert_eq!(AuthError::Expired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::Misconfigured.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
