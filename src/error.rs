use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AffordabilityError {
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Unknown region '{0}' in cost table")]
    UnknownRegion(String),

    #[error("Unknown property state '{0}' (expected NEW or SECOND_HAND)")]
    UnknownPropertyState(String),

    #[error("Arithmetic degeneracy in {context}")]
    ArithmeticDegeneracy { context: String },

    #[error("Invalid cost table: {0}")]
    InvalidCostTable(String),
}

impl AffordabilityError {
    pub(crate) fn invalid_input(field: &str, reason: impl Into<String>) -> Self {
        AffordabilityError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn degenerate(context: impl Into<String>) -> Self {
        AffordabilityError::ArithmeticDegeneracy {
            context: context.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AffordabilityError>;
