/// Convenience result type used across framepack.
pub type FramepackResult<T> = Result<T, FramepackError>;

/// Top-level error taxonomy used by encoder and codec APIs.
#[derive(thiserror::Error, Debug)]
pub enum FramepackError {
    /// Invalid user-provided configuration or composition data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A collaborator (still or stream encoder) failed in a non-recoverable way.
    #[error("encode error: {0}")]
    Encode(String),

    /// Malformed container data encountered while reading or writing tags.
    #[error("codec error: {0}")]
    Codec(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FramepackError {
    /// Build a [`FramepackError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`FramepackError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`FramepackError::Codec`] value.
    pub fn codec(msg: impl Into<String>) -> Self {
        Self::Codec(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
