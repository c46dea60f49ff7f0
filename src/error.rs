use thiserror::Error;

#[derive(Error, Debug)]
pub enum MontonioError {
    #[error("Missing required field: {field}")]
    MissingRequiredField {
        /// First missing key, in canonical claim order
        field: String,
        /// Every missing key, in canonical claim order
        missing: Vec<String>,
    },

    #[error("Invalid value for {field}: expected {expected}")]
    InvalidFieldType {
        field: String,
        expected: &'static str,
    },

    #[error("Malformed token: {0}")]
    MalformedToken(String),

    #[error("Unexpected token algorithm: {0}")]
    UnexpectedAlgorithm(String),

    #[error("Invalid token signature")]
    InvalidSignature,

    #[error("Token expired at {exp}")]
    TokenExpired { exp: i64 },

    #[error("Token not valid yet")]
    TokenNotYetValid,

    #[error("Transport failure: {0}")]
    TransportFailure(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Payment data has not been set")]
    MissingPaymentData,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MontonioError {
    pub(crate) fn missing(missing: Vec<String>) -> Self {
        let field = missing.first().cloned().unwrap_or_default();
        MontonioError::MissingRequiredField { field, missing }
    }

    pub(crate) fn invalid_type(field: &str, expected: &'static str) -> Self {
        MontonioError::InvalidFieldType {
            field: field.to_string(),
            expected,
        }
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        MontonioError::MalformedToken(msg.into())
    }

    /// Name of the offending input field for payload-build errors.
    pub fn field(&self) -> Option<&str> {
        match self {
            MontonioError::MissingRequiredField { field, .. }
            | MontonioError::InvalidFieldType { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Tampering indicators. A callback failing with one of these must be
    /// rejected outright, never treated as a data problem.
    pub fn is_security_failure(&self) -> bool {
        matches!(
            self,
            MontonioError::InvalidSignature | MontonioError::UnexpectedAlgorithm(_)
        )
    }

    /// Errors the caller may reasonably retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, MontonioError::TransportFailure(_))
    }
}

pub type Result<T> = std::result::Result<T, MontonioError>;
