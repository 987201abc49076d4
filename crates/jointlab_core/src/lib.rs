//! Core types for the jointlab harness
//!
//! The scene model is intentionally small: an [`Entity`] is a transform, a
//! color, and an optional reference to an engine-side rigid body; the
//! [`World`] owns the entity arena, the physics session, and the side table
//! that maps body handles back to their owning entities during state
//! synchronization.

pub mod entity;
pub mod transform;
pub mod world;

pub use entity::{BodyKind, BodyRef, Entity, Material};
pub use transform::Transform;
pub use world::{EntityKey, World};
