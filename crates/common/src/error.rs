//! Error types for the FMC provider

use thiserror::Error;

/// Result type alias using the provider Error
pub type Result<T> = std::result::Result<T, Error>;

/// Provider error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("{resource} requires FMC version {required} or newer, connected FMC is {actual}")]
    VersionIncompatible {
        resource: String,
        required: String,
        actual: String,
    },

    #[error("Invalid version string: {0}")]
    InvalidVersion(String),

    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),

    #[error("Invalid import id: {0}")]
    InvalidImportId(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Domain not found: {0}")]
    DomainNotFound(String),
}

impl Error {
    /// HTTP status code carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the backend answered 404
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_detection() {
        let err = Error::Http {
            status: 404,
            message: "gone".to_string(),
        };
        assert!(err.is_not_found());
        assert_eq!(err.status(), Some(404));

        let err = Error::Http {
            status: 500,
            message: "boom".to_string(),
        };
        assert!(!err.is_not_found());

        assert_eq!(Error::Transport("refused".to_string()).status(), None);
    }

    #[test]
    fn test_version_message() {
        let err = Error::VersionIncompatible {
            resource: "fmc_sla_monitors".to_string(),
            required: "7.4.0".to_string(),
            actual: "7.2.5".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "fmc_sla_monitors requires FMC version 7.4.0 or newer, connected FMC is 7.2.5"
        );
    }
}
