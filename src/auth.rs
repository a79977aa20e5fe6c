//! Login checks.
//!
//! The front-end asks a [`CredentialValidator`] whether a username and
//! password pair is acceptable. The shipped implementation compares
//! against SHA-256 hashes listed in the configuration.

use crate::config::{AuthConfig, UserConfig};
use crate::errors::AuthError;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tracing::{debug, warn};

pub trait CredentialValidator {
    /// Returns the canonical username on success.
    fn validate(&self, username: &str, password: &str) -> Result<String, AuthError>;
}

/// Lowercase hex SHA-256 of a password, as stored in `[[auth.users]]`.
pub fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

/// Users and password hashes known up front.
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials {
    users: HashMap<String, String>,
}

impl StaticCredentials {
    pub fn new(users: &[UserConfig]) -> Self {
        Self {
            users: users
                .iter()
                .map(|u| (u.username.clone(), u.password_sha256.to_lowercase()))
                .collect(),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        if config.required && config.users.is_empty() {
            warn!("Login is required but no users are configured; nobody will be able to log in");
        }
        Self::new(&config.users)
    }
}

impl CredentialValidator for StaticCredentials {
    fn validate(&self, username: &str, password: &str) -> Result<String, AuthError> {
        match self.users.get(username) {
            Some(expected) if *expected == hash_password(password) => {
                debug!("User {} authenticated", username);
                Ok(username.to_string())
            }
            _ => Err(AuthError::InvalidCredentials),
        }
    }
}
