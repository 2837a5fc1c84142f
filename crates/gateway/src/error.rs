use thiserror::Error;

/// Failures reported by the remote data gateway. Backend business-rule
/// rejections and transport problems stay distinguishable so callers can
/// phrase them differently; nothing here is ever treated as success.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("unauthorized: bearer token missing, expired, or rejected")]
    Unauthorized,
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("request rejected: {0}")]
    Validation(String),
    #[error("backend error: {0}")]
    Api(String),
    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),
    #[error("invalid response from backend: {0}")]
    InvalidResponse(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;
