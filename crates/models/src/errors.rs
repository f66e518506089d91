use serde::Serialize;
use thiserror::Error;

/// One rejected input field, addressed by its dotted path (`address.city`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub reason: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self { field: field.into(), reason: reason.into() }
    }
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {}", summarize(.0))]
    Validation(Vec<FieldError>),
    #[error("invalid id: {0}")]
    InvalidId(String),
}

fn summarize(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|f| format!("{}: {}", f.field, f.reason))
        .collect::<Vec<_>>()
        .join("; ")
}
