/// Convenience result type used across superzoom.
pub type SuperzoomResult<T> = Result<T, SuperzoomError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum SuperzoomError {
    /// Invalid user-provided data or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// Invalid animation curve or easing parameters.
    #[error("animation error: {0}")]
    Animation(String),

    /// The source image (or its fallback) could not be fetched or decoded.
    #[error("load error: {0}")]
    Load(String),

    /// Accompanying audio failed to play. Callers recover by continuing silently.
    #[error("playback error: {0}")]
    Playback(String),

    /// The drawing surface was detached while a run was in flight.
    #[error("render target unavailable: {0}")]
    RenderTargetUnavailable(String),

    /// A recording sink failed to produce an artifact.
    #[error("recording failure: {0}")]
    Recording(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SuperzoomError {
    /// Build a [`SuperzoomError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SuperzoomError::Animation`] value.
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Build a [`SuperzoomError::Load`] value.
    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }

    /// Build a [`SuperzoomError::Playback`] value.
    pub fn playback(msg: impl Into<String>) -> Self {
        Self::Playback(msg.into())
    }

    /// Build a [`SuperzoomError::RenderTargetUnavailable`] value.
    pub fn render_target(msg: impl Into<String>) -> Self {
        Self::RenderTargetUnavailable(msg.into())
    }

    /// Build a [`SuperzoomError::Recording`] value.
    pub fn recording(msg: impl Into<String>) -> Self {
        Self::Recording(msg.into())
    }

    /// Build a [`SuperzoomError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
