//! Error type for physics session operations

use std::fmt;

/// Errors surfaced by the physics session.
///
/// The taxonomy is deliberately shallow: a second `init` is a soft failure
/// the caller can treat as "nothing to do", and everything else only occurs
/// when a handle or the session itself is gone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhysicsError {
    /// `init` was called on a session that is already initialized.
    AlreadyInitialized,
    /// An operation that requires an initialized session found none.
    Uninitialized,
    /// A body handle did not resolve to a live body.
    UnknownBody,
}

impl fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhysicsError::AlreadyInitialized => write!(f, "physics session already initialized"),
            PhysicsError::Uninitialized => write!(f, "physics session not initialized"),
            PhysicsError::UnknownBody => write!(f, "unknown rigid body handle"),
        }
    }
}

impl std::error::Error for PhysicsError {}
