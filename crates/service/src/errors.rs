use models::errors::{FieldError, ModelError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0:?}")]
    Validation(Vec<FieldError>),
    #[error("Student {0} not found")]
    NotFound(String),
    #[error("malformed student id: {0}")]
    MalformedId(String),
    #[error("store error: {0}")]
    Store(String),
}

impl ServiceError {
    pub fn not_found(id: impl ToString) -> Self { Self::NotFound(id.to_string()) }
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(fields) => Self::Validation(fields),
            ModelError::InvalidId(raw) => Self::MalformedId(raw),
        }
    }
}

impl From<mongodb::error::Error> for ServiceError {
    fn from(e: mongodb::error::Error) -> Self { Self::Store(e.to_string()) }
}
