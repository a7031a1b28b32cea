use thiserror::Error;

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// A required external capability is not configured.
    #[error("{0}")]
    Unavailable(String),

    #[error("upstream call failed: {0:#}")]
    Upstream(#[from] anyhow::Error),

    #[error("malformed upstream response: {0}")]
    MalformedResponse(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("storage error: {0}")]
    Storage(String),
}
