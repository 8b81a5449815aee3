use thiserror::Error;

/// Custom error types for the application.
#[derive(Error, Debug)]
pub enum NexusError {
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Request to AI provider failed: {0}")]
    AiRequest(reqwest::Error),
    #[error("Failed to deserialize AI provider response: {0}")]
    AiDeserialization(reqwest::Error),
    #[error("AI provider returned an error: {0}")]
    AiApi(String),
    #[error("Storage provider connection error: {0}")]
    StorageConnection(String),
    #[error("Storage operation failed: {0}")]
    StorageOperationFailed(String),
    #[error("Failed to serialize result: {0}")]
    JsonSerialization(#[from] serde_json::Error),
    #[error("Company not found: {0}")]
    CompanyNotFound(String),
    #[error("Policy file not found: {0}")]
    PolicyFileNotFound(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<turso::Error> for NexusError {
    fn from(err: turso::Error) -> Self {
        NexusError::StorageOperationFailed(err.to_string())
    }
}

impl From<tenancy::TenancyError> for NexusError {
    fn from(err: tenancy::TenancyError) -> Self {
        NexusError::StorageOperationFailed(err.to_string())
    }
}
