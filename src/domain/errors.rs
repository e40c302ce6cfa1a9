use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid pointer at segment '{segment}': {reason}")]
    InvalidPointer { segment: String, reason: String },

    #[error("index out of bounds at segment '{segment}': {index} (length {len})")]
    IndexOutOfBounds {
        segment: String,
        index: usize,
        len: usize,
    },

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("{0}")]
    Io(String),

    #[error("failed to deserialize: {0}")]
    Deserialize(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;

impl DomainError {
    pub(crate) fn invalid_pointer(segment: &str, reason: impl Into<String>) -> Self {
        Self::InvalidPointer {
            segment: segment.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for DomainError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        Self::Deserialize(err.to_string())
    }
}

impl From<serde_yaml::Error> for DomainError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Deserialize(err.to_string())
    }
}
