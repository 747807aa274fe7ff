//! Request authentication.
//!
//! Tokens are issued elsewhere; this service only verifies them. A token is
//! accepted from `Authorization: Bearer <jwt>` or, failing that, from the
//! `token` cookie set by the web client.

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
        HeaderMap,
    },
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

const TOKEN_COOKIE: &str = "token";

/// JWT claims. `sub` is the user's UUID.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub exp: usize,
}

/// The caller, as established by a verified token.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub id: Uuid,
    pub email: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthedUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .or_else(|| cookie_token(&parts.headers))
            .ok_or_else(|| {
                warn!("Authentication failed: no bearer token or token cookie");
                AppError::Unauthorized
            })?;

        let user = verify_token(&token, &state.config.jwt_secret)?;
        debug!(user_id = %user.id, "Authenticated request");
        Ok(user)
    }
}

/// Validates signature and expiry, then resolves the subject to a user id.
pub fn verify_token(token: &str, secret: &str) -> Result<AuthedUser, AppError> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| {
        warn!("Authentication failed: {e}");
        AppError::Unauthorized
    })?
    .claims;

    let id = Uuid::parse_str(&claims.sub).map_err(|_| {
        warn!("Authentication failed: subject is not a UUID");
        AppError::Unauthorized
    })?;

    Ok(AuthedUser {
        id,
        email: claims.email,
    })
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    (!token.is_empty()).then(|| token.to_string())
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == TOKEN_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// Signs a token the way the account service does. Test-only.
#[cfg(test)]
pub(crate) fn issue_test_token(user_id: Uuid, email: &str, secret: &str) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp() as usize,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_verify_round_trip() {
        let id = Uuid::new_v4();
        let token = issue_test_token(id, "asha@example.com", SECRET);
        let user = verify_token(&token, SECRET).unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.email, "asha@example.com");
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = issue_test_token(Uuid::new_v4(), "a@b.co", SECRET);
        assert!(matches!(
            verify_token(&token, "other-secret"),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        use jsonwebtoken::{encode, EncodingKey, Header};

        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            email: "a@b.co".to_string(),
            exp: (chrono::Utc::now() - chrono::Duration::hours(2)).timestamp() as usize,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert!(matches!(
            verify_token(&token, SECRET),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_non_uuid_subject_is_rejected() {
        use jsonwebtoken::{encode, EncodingKey, Header};

        let claims = Claims {
            sub: "64f1c0ffee".to_string(),
            email: "a@b.co".to_string(),
            exp: (chrono::Utc::now() + chrono::Duration::hours(1)).timestamp() as usize,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        assert!(matches!(
            verify_token(&token, SECRET),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_bearer_prefix_is_optional() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc.def"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("abc.def"));
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc.def"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(bearer_token(&headers), None);
    }

    #[test]
    fn test_token_cookie_is_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; token=abc.def; session=xyz"),
        );
        assert_eq!(cookie_token(&headers).as_deref(), Some("abc.def"));

        headers.insert(COOKIE, HeaderValue::from_static("token=; theme=dark"));
        assert_eq!(cookie_token(&headers), None);
    }
}
