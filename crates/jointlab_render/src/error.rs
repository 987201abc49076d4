//! Error type for graphics initialization

use std::fmt;

/// Errors surfaced while bringing up the GPU context.
///
/// All of them are fatal at startup; nothing in the render loop reports
/// errors through this type.
#[derive(Debug)]
pub enum RenderError {
    /// Surface creation failed
    Surface(String),
    /// No compatible GPU adapter was found
    NoAdapter,
    /// Device request was rejected
    Device(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Surface(message) => write!(f, "surface creation failed: {message}"),
            RenderError::NoAdapter => write!(f, "no compatible GPU adapter found"),
            RenderError::Device(message) => write!(f, "device request failed: {message}"),
        }
    }
}

impl std::error::Error for RenderError {}
