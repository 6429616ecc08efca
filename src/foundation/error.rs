/// Convenience result type used across Kinetype.
pub type KinetypeResult<T> = Result<T, KinetypeError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum KinetypeError {
    /// Invalid configuration: bad surface, easing name, duration, frame rate or script.
    #[error("configuration error: {0}")]
    Config(String),

    /// Text measurement or glyph outline failures reported by a glyph source.
    #[error("layout error: {0}")]
    Layout(String),

    /// Errors raised while stepping an animation.
    #[error("animation error: {0}")]
    Animation(String),

    /// A renderer failed while painting a tick.
    #[error("render error: {0}")]
    Render(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl KinetypeError {
    /// Build a [`KinetypeError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build a [`KinetypeError::Layout`] value.
    pub fn layout(msg: impl Into<String>) -> Self {
        Self::Layout(msg.into())
    }

    /// Build a [`KinetypeError::Animation`] value.
    pub fn animation(msg: impl Into<String>) -> Self {
        Self::Animation(msg.into())
    }

    /// Build a [`KinetypeError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
