use std::{fmt, io};

use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum BuildonomyError {
    #[error("Record store unavailable: {0}")]
    BackendUnavailable(String),
    #[error("Custom error: {0}")]
    Custom(String),
    #[error("Federated query failed: {0}")]
    Federation(String),
    #[error("File System error: {0}")]
    Io(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
    #[error("Update rejected by record store: {0}")]
    UpdateRejected(String),
}

impl BuildonomyError {
    /// True for failures caused by the record store rather than by the request itself. Callers
    /// that want a retry policy key off this; nothing in this crate retries.
    pub fn is_backend_failure(&self) -> bool {
        matches!(
            self,
            BuildonomyError::BackendUnavailable(_) | BuildonomyError::Federation(_)
        )
    }
}

impl From<toml::de::Error> for BuildonomyError {
    fn from(src: toml::de::Error) -> BuildonomyError {
        BuildonomyError::Serialization(format!("Toml deserialization error: {src}"))
    }
}

impl From<toml::ser::Error> for BuildonomyError {
    fn from(src: toml::ser::Error) -> BuildonomyError {
        BuildonomyError::Serialization(format!("Toml serialization error: {src}"))
    }
}

impl From<JsonError> for BuildonomyError {
    fn from(src: JsonError) -> BuildonomyError {
        BuildonomyError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<io::Error> for BuildonomyError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => BuildonomyError::NotFound(format!("{x}")),
            io::ErrorKind::TimedOut => BuildonomyError::BackendUnavailable(format!("{x}")),
            _ => BuildonomyError::Io(format!("IOError: {}", x.kind())),
        }
    }
}

impl From<fmt::Error> for BuildonomyError {
    fn from(x: fmt::Error) -> Self {
        BuildonomyError::Custom(format!("{x}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_io_error_mapping() {
        let missing = io::Error::new(io::ErrorKind::NotFound, "no such file");
        assert!(matches!(
            BuildonomyError::from(missing),
            BuildonomyError::NotFound(_)
        ));

        let timeout = io::Error::new(io::ErrorKind::TimedOut, "slow store");
        let err = BuildonomyError::from(timeout);
        assert!(matches!(err, BuildonomyError::BackendUnavailable(_)));
        assert!(err.is_backend_failure());

        let other = io::Error::new(io::ErrorKind::Other, "boom");
        assert!(matches!(BuildonomyError::from(other), BuildonomyError::Io(_)));
    }

    #[test]
    fn test_rejection_is_not_a_backend_failure() {
        assert!(!BuildonomyError::UpdateRejected("bad".into()).is_backend_failure());
        assert!(!BuildonomyError::NotFound("root".into()).is_backend_failure());
        assert!(BuildonomyError::Federation("source down".into()).is_backend_failure());
    }
}
