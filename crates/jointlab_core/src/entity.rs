//! Entity and material types
//!
//! One entity type covers both movable and immovable objects: the variants
//! differ only in the kind tag on their body reference, not in structure.

use jointlab_physics::RigidBodyHandle;

use crate::Transform;

/// Whether an entity's body is simulated or fixed in the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyKind {
    /// Movable, integrated by the engine
    Dynamic,
    /// Immovable world geometry
    Static,
}

/// Reference to an engine-side rigid body.
///
/// The engine owns the body's lifetime; this is a lookup handle, not an
/// owning pointer.
#[derive(Clone, Copy, Debug)]
pub struct BodyRef {
    /// Dynamic or static
    pub kind: BodyKind,
    /// Handle into the session's body set
    pub handle: RigidBodyHandle,
}

/// A simple material with just a base color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    /// Base color as RGBA (each component 0.0-1.0)
    pub base_color: [f32; 4],
}

impl Default for Material {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Material {
    /// Create a new material with the given RGBA color.
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            base_color: [r, g, b, a],
        }
    }

    /// Create a new opaque material with the given RGB color.
    pub fn from_rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// White material
    pub const WHITE: Self = Self {
        base_color: [1.0, 1.0, 1.0, 1.0],
    };

    /// Red material
    pub const RED: Self = Self {
        base_color: [1.0, 0.2, 0.2, 1.0],
    };

    /// Green material
    pub const GREEN: Self = Self {
        base_color: [0.2, 1.0, 0.2, 1.0],
    };

    /// Blue material
    pub const BLUE: Self = Self {
        base_color: [0.2, 0.2, 1.0, 1.0],
    };
}

/// An object in the scene: transform, color, and an optional physics body.
pub struct Entity {
    /// Optional name for lookup and log labels
    pub name: Option<String>,
    /// World-space transform, synced from the body each tick when dynamic
    pub transform: Transform,
    /// Visual material
    pub material: Material,
    /// Engine body backing this entity, if any
    pub body: Option<BodyRef>,
}

impl Entity {
    /// Create an entity with the given transform and material.
    pub fn new(transform: Transform, material: Material) -> Self {
        Self {
            name: None,
            transform,
            material,
            body: None,
        }
    }

    /// Set the name of this entity.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Attach a body reference to this entity.
    pub fn with_body(mut self, kind: BodyKind, handle: RigidBodyHandle) -> Self {
        self.body = Some(BodyRef { kind, handle });
        self
    }

    /// Whether this entity is backed by a movable body.
    pub fn is_dynamic(&self) -> bool {
        matches!(
            self.body,
            Some(BodyRef {
                kind: BodyKind::Dynamic,
                ..
            })
        )
    }
}
