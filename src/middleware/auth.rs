use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use uuid::Uuid;

use crate::domain::Role;

type HmacSha256 = Hmac<Sha256>;

/// Caller identity carried by a signed bearer token.
///
/// Token layout: `{user_id}.{role}.{hex(hmac_sha256(secret, "{user_id}.{role}"))}`.
/// Issuance lives outside this service; we only verify.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: Role,
}

/// Mint a token for the given identity. Used by the dev CLI and tests.
pub fn sign_token(secret: &str, user_id: Uuid, role: Role) -> String {
    let payload = format!("{}.{}", user_id, role.as_str());
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(payload.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());
    format!("{}.{}", payload, signature)
}

pub fn verify_token(secret: &str, token: &str) -> Result<Identity, AuthError> {
    let mut parts = token.rsplitn(2, '.');
    let signature = parts.next().ok_or(AuthError::MalformedToken)?;
    let payload = parts.next().ok_or(AuthError::MalformedToken)?;

    let expected = hex::decode(signature).map_err(|_| AuthError::MalformedToken)?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| AuthError::InvalidSecret)?;
    mac.update(payload.as_bytes());

    // Constant-time comparison to prevent timing attacks
    mac.verify_slice(&expected)
        .map_err(|_| AuthError::SignatureMismatch)?;

    let mut fields = payload.splitn(2, '.');
    let user_id = fields
        .next()
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or(AuthError::MalformedToken)?;
    let role = fields
        .next()
        .and_then(|s| s.parse::<Role>().ok())
        .ok_or(AuthError::MalformedToken)?;

    Ok(Identity { user_id, role })
}

#[async_trait]
impl FromRequestParts<crate::AppState> for Identity {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &crate::AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(AuthError::MissingToken)?;

        verify_token(&state.config.auth_secret, token)
    }
}

#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    MalformedToken,
    InvalidSecret,
    SignatureMismatch,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingToken => (StatusCode::UNAUTHORIZED, "Missing bearer token"),
            AuthError::MalformedToken => (StatusCode::UNAUTHORIZED, "Malformed bearer token"),
            AuthError::InvalidSecret => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Invalid auth secret configuration")
            }
            AuthError::SignatureMismatch => {
                (StatusCode::UNAUTHORIZED, "Token signature verification failed")
            }
        };

        tracing::warn!("Authentication failed: {:?}", self);
        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn test_sign_verify_round_trip() {
        let user_id = Uuid::new_v4();
        let token = sign_token(SECRET, user_id, Role::Seller);

        let identity = verify_token(SECRET, &token).unwrap();
        assert_eq!(identity.user_id, user_id);
        assert_eq!(identity.role, Role::Seller);
    }

    #[test]
    fn test_tampered_role_rejected() {
        let user_id = Uuid::new_v4();
        let token = sign_token(SECRET, user_id, Role::Customer);
        let tampered = token.replace(".customer.", ".admin.");

        assert!(matches!(
            verify_token(SECRET, &tampered),
            Err(AuthError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = sign_token(SECRET, Uuid::new_v4(), Role::Admin);
        assert!(matches!(
            verify_token("other-secret", &token),
            Err(AuthError::SignatureMismatch)
        ));
    }

    #[test]
    fn test_garbage_token_rejected() {
        assert!(verify_token(SECRET, "not-a-token").is_err());
        assert!(verify_token(SECRET, "").is_err());
    }
}
