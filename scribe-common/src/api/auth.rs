//! Service-key authentication between Scribe services
//!
//! scribe-pm calls scribe-ai with `Authorization: Bearer <service key>`.
//! Keys are compared through their SHA-256 digests so the comparison time
//! does not depend on how many leading bytes match. An empty configured key
//! disables checking.
//!
//! This module contains ONLY pure functions; each service wraps them in its
//! own axum middleware.

use sha2::{Digest, Sha256};
use std::fmt;

/// Authentication failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceAuthError {
    /// No `Authorization: Bearer` header
    MissingKey,
    /// Key present but wrong
    InvalidKey,
}

impl fmt::Display for ServiceAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceAuthError::MissingKey => write!(f, "Missing service key"),
            ServiceAuthError::InvalidKey => write!(f, "Invalid service key"),
        }
    }
}

impl std::error::Error for ServiceAuthError {}

/// SHA-256 digest of a key
pub fn key_digest(key: &str) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(key.as_bytes()));
    out
}

/// Extract the token from an `Authorization` header value
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() {
        Some(token.trim())
    } else {
        None
    }
}

/// Configured service key, held as a digest
#[derive(Clone)]
pub struct ServiceKey {
    digest: Option<[u8; 32]>,
}

impl ServiceKey {
    /// `None` or a blank key disables checking
    pub fn new(key: Option<&str>) -> Self {
        Self {
            digest: key.filter(|k| !k.trim().is_empty()).map(key_digest),
        }
    }

    pub fn disabled() -> Self {
        Self { digest: None }
    }

    pub fn is_disabled(&self) -> bool {
        self.digest.is_none()
    }

    /// Check the raw `Authorization` header value
    pub fn validate(&self, authorization: Option<&str>) -> Result<(), ServiceAuthError> {
        let Some(expected) = &self.digest else {
            return Ok(());
        };

        let token = authorization
            .and_then(bearer_token)
            .ok_or(ServiceAuthError::MissingKey)?;

        let provided = key_digest(token);
        let diff = expected
            .iter()
            .zip(provided.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b));

        if diff == 0 {
            Ok(())
        } else {
            Err(ServiceAuthError::InvalidKey)
        }
    }
}

impl fmt::Debug for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceKey")
            .field("enabled", &!self.is_disabled())
            .finish()
    }
}
