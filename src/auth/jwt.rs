use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use super::{
    claims::Claims,
    dto::{AuthTokens, SafeUser},
};
use crate::{
    config::{JwtConfig, MAX_TOKEN_TTL_SECS},
    state::AppState,
    users::Role,
};

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("signing secret is empty")]
    MissingSecret,
    #[error("token signing failed: {0}")]
    Signing(jsonwebtoken::errors::Error),
    #[error("invalid token")]
    Invalid,
    #[error("token expired")]
    Expired,
}

/// Signing and verification keys plus issuance settings.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}

impl JwtKeys {
    /// Builds the keys and signs a probe token, so a misconfigured signer
    /// fails here instead of on the first login.
    pub fn new(config: &JwtConfig) -> Result<Self, TokenError> {
        if config.secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }
        let keys = Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            issuer: config.issuer.clone(),
            ttl: config.ttl.min(Duration::from_secs(MAX_TOKEN_TTL_SECS)),
        };
        let probe = SafeUser {
            id: Uuid::nil(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            role: Role::User,
        };
        keys.encode(&keys.claims_for(&probe))?;
        Ok(keys)
    }

    fn claims_for(&self, user: &SafeUser) -> Claims {
        let now = OffsetDateTime::now_utc().unix_timestamp() as usize;
        Claims {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
            iss: self.issuer.clone(),
            iat: now,
            exp: now.saturating_add(self.ttl.as_secs() as usize),
        }
    }

    pub(crate) fn encode(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding).map_err(TokenError::Signing)
    }

    /// Issues an access token for `user`. No refresh token is produced.
    pub fn generate_tokens(&self, user: &SafeUser) -> Result<AuthTokens, TokenError> {
        let access_token = self.encode(&self.claims_for(user))?;
        debug!(user_id = %user.id, "jwt signed");
        Ok(AuthTokens { access_token })
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation
    }

    /// Verifies signature, issuer and expiry. An expired token reports
    /// `Expired` whether or not its signature is valid.
    pub fn verify_token(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation()).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature if self.is_expired_unverified(token) => {
                    TokenError::Expired
                }
                _ => TokenError::Invalid,
            }
        })?;
        debug!(user_id = %data.claims.user_id, "jwt verified");
        Ok(data.claims)
    }

    /// Expiry check on a token whose signature already failed. The claims are
    /// only inspected, never trusted.
    fn is_expired_unverified(&self, token: &str) -> bool {
        let mut validation = self.validation();
        validation.insecure_disable_signature_validation();
        validation.validate_exp = true;
        matches!(
            decode::<Claims>(token, &self.decoding, &validation),
            Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature)
        )
    }
}

/// Returns the token from an `Authorization` value of the exact form
/// `Bearer <token>`. Anything else, including an empty token, yields `None`.
pub fn extract_token_from_header(header: Option<&str>) -> Option<&str> {
    let mut parts = header?.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Some(token),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret".into(),
        issuer: "test-issuer".into(),
        ttl: Duration::from_secs(7 * 24 * 3600),
    }
}
