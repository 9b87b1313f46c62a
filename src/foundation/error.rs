/// Convenience result type used across the crate.
pub type SketchResult<T> = Result<T, SketchError>;

/// Top-level error taxonomy used by the filtering APIs.
#[derive(thiserror::Error, Debug)]
pub enum SketchError {
    /// Invalid user-provided parameters or data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while evaluating or rendering an image.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Errors while decoding, encoding or converting image buffers.
    #[error("image error: {0}")]
    Image(String),

    /// Errors when serializing or deserializing settings.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SketchError {
    /// Build a [`SketchError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SketchError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`SketchError::Image`] value.
    pub fn image(msg: impl Into<String>) -> Self {
        Self::Image(msg.into())
    }

    /// Build a [`SketchError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
