use thiserror::Error;

pub type SiteResult<T> = Result<T, SiteError>;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: missing required fields: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Submission failed: {0}")]
    Submission(String),

    #[error("Payment routing error: {0}")]
    Routing(String),

    #[error("Invalid state: {0}")]
    State(String),

    #[error("Unknown plan: {0}")]
    UnknownPlan(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
