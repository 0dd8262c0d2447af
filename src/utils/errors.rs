use thiserror::Error;

#[derive(Error, Debug)]
pub enum CertError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Certificate not found: {0}")]
    CertNotFound(String),

    #[error("Certificate already revoked: {0}")]
    AlreadyRevoked(String),

    #[error("Duplicate certificate id: {0}")]
    Duplicate(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, CertError>;
