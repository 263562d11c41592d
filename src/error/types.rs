use thiserror::Error;

use crate::commands::NativeSenderError;

/// Unified result type for the navbridge crate.
pub type Result<T> = std::result::Result<T, NavigationError>;

/// Errors surfaced by command dispatch and component binding.
#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("invalid component: {0}")]
    InvalidComponent(String),
    #[error("layout transform failed: {0}")]
    Transform(String),
    #[error(transparent)]
    Native(#[from] NativeSenderError),
}

impl NavigationError {
    pub(crate) fn transform(message: impl Into<String>) -> Self {
        Self::Transform(message.into())
    }

    pub(crate) fn invalid_component(message: impl Into<String>) -> Self {
        Self::InvalidComponent(message.into())
    }
}
