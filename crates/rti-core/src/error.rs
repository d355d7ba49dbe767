//! Error types for the RTI compliance core.

/// RTI core errors.
#[derive(Debug, thiserror::Error)]
pub enum RtiError {
    /// Token endpoint answered with a non-success status.
    #[error("authorization failed (HTTP {status}): {code}: {message}")]
    Auth {
        status: u16,
        code: String,
        message: String,
    },

    /// Required credential fields or settings are missing or invalid.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Payroll record has no attached employee.
    #[error("payroll record {payroll_id} at index {index} has no attached employee")]
    MissingData { payroll_id: String, index: usize },

    /// Network error.
    #[error("network error: {message}")]
    Network { message: String },

    /// Success response that could not be parsed.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// Device store could not be read or written.
    #[error("device store error: {message}")]
    Store { message: String },

    /// Header value that cannot be sent on the wire.
    #[error("invalid header {name}: {message}")]
    InvalidHeader { name: String, message: String },
}

impl RtiError {
    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration { .. } => 2,
            Self::MissingData { .. } => 2,
            Self::InvalidHeader { .. } => 2,

            Self::Auth { .. } => 3,

            Self::Network { .. } => 5,

            Self::InvalidResponse { .. } => 6,
            Self::Store { .. } => 6,
        }
    }

    /// Whether the caller may reasonably retry.
    ///
    /// The core itself never retries; this only classifies the failure.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Auth { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for RtiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
        }
    }
}

/// Result type for RTI core operations.
pub type RtiResult<T> = Result<T, RtiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_data_message_names_record() {
        let err = RtiError::MissingData {
            payroll_id: "pr-7".to_string(),
            index: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("pr-7"));
        assert!(msg.contains("index 2"));
    }

    #[test]
    fn test_retryable_classification() {
        let server = RtiError::Auth {
            status: 503,
            code: "SERVER_ERROR".into(),
            message: "down".into(),
        };
        let denied = RtiError::Auth {
            status: 400,
            code: "invalid_grant".into(),
            message: "expired".into(),
        };
        assert!(server.is_retryable());
        assert!(!denied.is_retryable());
        assert!(!RtiError::Configuration {
            message: "x".into()
        }
        .is_retryable());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            RtiError::Network {
                message: "x".into()
            }
            .exit_code(),
            5
        );
        assert_eq!(
            RtiError::Auth {
                status: 401,
                code: "c".into(),
                message: "m".into()
            }
            .exit_code(),
            3
        );
    }
}
