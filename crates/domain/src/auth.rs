//! Bearer-credential verification.
//!
//! Sign-in, sign-up and password flows live in the hosted auth provider;
//! this module only checks that a request carries a credential the provider
//! signed, and extracts the caller's identity from it. The identity is
//! resolved once per request and handed to handlers explicitly, never held
//! as ambient state between requests.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use thiserror::Error;

use crate::model::{UserId, UserIdError};

/// Errors emitted while resolving the caller identity from a request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing bearer credential")]
    MissingCredential,
    #[error("malformed authorization header")]
    MalformedHeader,
    #[error("invalid or expired bearer credential")]
    InvalidCredential,
    #[error("invalid subject in credential: {0}")]
    InvalidSubject(#[from] UserIdError),
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
}

/// Validates HS256 credentials against the shared secret configured for the
/// auth provider. Cheap to clone; one instance lives in the app state.
#[derive(Clone)]
pub struct AuthVerifier {
    decoding: DecodingKey,
    validation: Validation,
}

impl AuthVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Resolves the caller identity from the raw `Authorization` header
    /// value, if any. Expiry is enforced by the JWT validation itself.
    pub fn verify_bearer(&self, header: Option<&str>) -> Result<UserId, AuthError> {
        let header = header.ok_or(AuthError::MissingCredential)?;
        let token = strip_bearer_scheme(header).ok_or(AuthError::MalformedHeader)?;
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|_| AuthError::InvalidCredential)?;
        Ok(UserId::parse(&data.claims.sub)?)
    }
}

fn strip_bearer_scheme(header: &str) -> Option<&str> {
    let rest = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))?;
    let token = rest.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
