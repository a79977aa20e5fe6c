//! Typed errors for the advisor core.
//!
//! Library-style modules return these; `main` and the interactive loop
//! wrap them in `anyhow` with context.

use std::path::PathBuf;
use thiserror::Error;

/// Problems with a city's listing data.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("failed to read dataset {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("dataset {} is missing required columns: {}", path.display(), missing.join(", "))]
    MissingColumns { path: PathBuf, missing: Vec<String> },

    #[error("unknown city: {0}")]
    UnknownCity(String),

    #[error("no data available for {city}")]
    EmptyDataset { city: String },
}

/// Failures talking to the remote chat-completion service.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("cannot connect to chat service at {0}")]
    Connect(String),

    #[error("chat service rejected the credentials: {0}")]
    Auth(String),

    #[error("chat service rate limit reached: {0}")]
    RateLimited(String),

    #[error("chat service error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("failed to decode chat service response: {0}")]
    Decode(String),

    #[error("chat service returned an empty reply")]
    EmptyReply,

    #[error("no API key configured (set OPENAI_API_KEY or model.api_key)")]
    MissingApiKey,

    #[error("failed to send request: {0}")]
    Transport(String),
}

impl ServiceError {
    /// Whether the same request may succeed if sent again.
    pub fn is_retryable(&self) -> bool {
        match self {
            ServiceError::Timeout(_)
            | ServiceError::Connect(_)
            | ServiceError::RateLimited(_)
            | ServiceError::Transport(_) => true,
            ServiceError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Map a transport-level reqwest failure.
    pub fn from_reqwest(err: reqwest::Error, url: &str, timeout_seconds: u64) -> Self {
        if err.is_timeout() {
            ServiceError::Timeout(timeout_seconds)
        } else if err.is_connect() {
            ServiceError::Connect(url.to_string())
        } else if err.is_decode() {
            ServiceError::Decode(err.to_string())
        } else {
            ServiceError::Transport(err.to_string())
        }
    }

    /// Map a non-success HTTP status and its body.
    pub fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => ServiceError::Auth(body),
            429 => ServiceError::RateLimited(body),
            _ => ServiceError::Api { status, body },
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,
}

/// Errors surfaced at the session boundary.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("no city selected")]
    NoCitySelected,

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Service(#[from] ServiceError),
}
