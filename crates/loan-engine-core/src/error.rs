use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoanEngineError {
    #[error("Invalid phrase format: '{input}': {reason}")]
    InvalidPhraseFormat { input: String, reason: String },

    #[error("Missing required input: {field} cannot be empty")]
    MissingRequiredInput { field: String },

    #[error("Invalid numeric input: {field} = '{value}': {reason}")]
    InvalidNumericInput {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Computation failed in {step}: {reason}")]
    Computation { step: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl LoanEngineError {
    pub(crate) fn phrase(input: &str, reason: impl Into<String>) -> Self {
        LoanEngineError::InvalidPhraseFormat {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn overflow(step: &str) -> Self {
        LoanEngineError::Computation {
            step: step.to_string(),
            reason: "decimal overflow".into(),
        }
    }
}

impl From<serde_json::Error> for LoanEngineError {
    fn from(e: serde_json::Error) -> Self {
        LoanEngineError::SerializationError(e.to_string())
    }
}
