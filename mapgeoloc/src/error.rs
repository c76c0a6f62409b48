//! Library error types.

use thiserror::Error;

/// Errors raised while wiring the layer and its control.
///
/// Everything past construction degrades silently (hidden accuracy circle,
/// center-only camera, ignored double start) and never produces an error.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeolocationError {
    /// A layer option is out of range.
    #[error("Invalid option {field}: {reason}")]
    InvalidOption { field: &'static str, reason: String },

    /// The host map reports unusable properties.
    #[error("Invalid host map: {0}")]
    InvalidHost(String),

    /// The control is already attached to a map.
    #[error("Control is already attached to a map")]
    ControlAlreadyAttached,

    /// The control is not attached to this map.
    #[error("Control is not attached to this map")]
    ControlNotAttached,
}

impl GeolocationError {
    pub(crate) fn invalid_option(field: &'static str, reason: impl Into<String>) -> Self {
        GeolocationError::InvalidOption {
            field,
            reason: reason.into(),
        }
    }
}
