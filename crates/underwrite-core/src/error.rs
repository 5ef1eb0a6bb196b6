use thiserror::Error;

#[derive(Debug, Error)]
pub enum UnderwriteError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Financial impossibility: {0}")]
    FinancialImpossibility(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Failed to render {document}: {reason}")]
    Render { document: String, reason: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl UnderwriteError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        UnderwriteError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for UnderwriteError {
    fn from(e: serde_json::Error) -> Self {
        UnderwriteError::SerializationError(e.to_string())
    }
}
