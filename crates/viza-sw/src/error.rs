//! Worker error types

use viza_net::{Method, NetError};

use crate::lifecycle::WorkerState;

/// Cache storage errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    #[error("cache '{0}' does not exist")]
    NotFound(String),

    #[error("{0} requests cannot be cached")]
    MethodNotCacheable(Method),

    #[error("storage quota exceeded: {needed} bytes needed, {available} available")]
    QuotaExceeded { needed: usize, available: usize },

    #[error("failed to add {url}: {reason}")]
    AddAll { url: String, reason: String },
}

/// Worker errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum WorkerError {
    #[error("install failed: {0}")]
    Install(#[source] CacheError),

    #[error("invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: WorkerState, to: WorkerState },

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Net(#[from] NetError),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
