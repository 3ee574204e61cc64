/// Convenience result type used across scenelog.
pub type SceneResult<T> = Result<T, SceneError>;

/// Top-level error taxonomy for the scene log, players and collaborators.
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    /// File open/read/write/seek failures, including short reads.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The marker scan reached end of file without a match.
    #[error("scene marker '{marker}' not found in scene log")]
    MarkerNotFound {
        /// Marker that was searched for (lossy UTF-8).
        marker: String,
    },

    /// Invalid configuration or record data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Audio decode or output device failures.
    #[error("audio error: {0}")]
    Audio(String),

    /// Drawing surface or frame sink failures.
    #[error("render error: {0}")]
    Render(String),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SceneError {
    /// Build a [`SceneError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SceneError::Audio`] value.
    pub fn audio(msg: impl Into<String>) -> Self {
        Self::Audio(msg.into())
    }

    /// Build a [`SceneError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// `true` when the error means "this scene's data is absent or truncated".
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::MarkerNotFound { .. } => true,
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::NotFound | std::io::ErrorKind::UnexpectedEof
            ),
            _ => false,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
