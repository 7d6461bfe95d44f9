use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum SocietyError {
    #[error("Not authorised: no valid credential presented")]
    Unauthenticated,

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: Uuid },

    #[error("Conflict on {resource}: {reason}")]
    Conflict {
        resource: &'static str,
        reason: String,
    },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SocietyError {
    pub fn invalid(field: &str, reason: &str) -> Self {
        SocietyError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(resource: &'static str, id: Uuid) -> Self {
        SocietyError::NotFound { resource, id }
    }
}

impl From<serde_json::Error> for SocietyError {
    fn from(e: serde_json::Error) -> Self {
        SocietyError::Serialization(e.to_string())
    }
}
