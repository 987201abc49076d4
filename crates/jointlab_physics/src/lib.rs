//! Physics session layer for the jointlab harness
//!
//! This crate wraps the rapier3d engine behind a session object with an
//! explicit init/deinit lifecycle, a small body factory, and the fixed-joint
//! creation path whose filter-data side effect the harness exists to
//! document.
//!
//! ## Key Components
//!
//! - [`session::PhysicsSession`] - engine state with init/deinit lifecycle
//! - [`filter::FilterData`] - per-collider snapshot of the four filter words
//! - [`PhysicsSession::attach_fixed_joint`] - snap-and-weld joint creation
//!   with a selectable filter-restore workaround
//!
//! The engine itself (broad phase, solver, integration) is an external
//! collaborator; nothing here reimplements simulation.

pub mod convert;
pub mod error;
pub mod filter;
pub mod joints;
pub mod session;

pub use error::PhysicsError;
pub use filter::FilterData;
pub use session::{PhysicsSession, SessionConfig, LAYER_DYNAMIC, LAYER_WORLD, REFERENCE_DENSITY};

// Engine handle types that cross the crate boundary.
pub use rapier3d::prelude::{ImpulseJointHandle, RigidBodyHandle};
