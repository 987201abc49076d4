//! World container for entities
//!
//! The World owns the entity arena, the physics session, and the side table
//! that recovers the owning entity from an engine body handle during state
//! synchronization. The side table replaces the engine-side opaque user
//! data a back-pointer would need.

use std::collections::HashMap;

use glam::Vec3;
use slotmap::{new_key_type, SlotMap};

use jointlab_physics::{
    ImpulseJointHandle, PhysicsError, PhysicsSession, RigidBodyHandle, SessionConfig,
};

use crate::{BodyKind, Entity, Material, Transform};

new_key_type! {
    /// Key to an entity in the world arena
    pub struct EntityKey;
}

/// The scene world: entities plus the physics session driving them.
pub struct World {
    entities: SlotMap<EntityKey, Entity>,
    /// Side table: engine body handle -> owning entity
    body_index: HashMap<RigidBodyHandle, EntityKey>,
    physics: PhysicsSession,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Create an empty world with an uninitialized physics session.
    pub fn new() -> Self {
        Self {
            entities: SlotMap::with_key(),
            body_index: HashMap::new(),
            physics: PhysicsSession::new(),
        }
    }

    /// Initialize the physics session.
    ///
    /// Fails with [`PhysicsError::AlreadyInitialized`] if called twice
    /// without a deinit in between.
    pub fn init_physics(&mut self, config: &SessionConfig) -> Result<(), PhysicsError> {
        self.physics.init(config)
    }

    /// Release the physics session. Safe no-op when uninitialized.
    pub fn deinit_physics(&mut self) {
        self.physics.deinit();
    }

    /// Access the physics session.
    pub fn physics(&self) -> &PhysicsSession {
        &self.physics
    }

    /// Mutable access to the physics session.
    pub fn physics_mut(&mut self) -> &mut PhysicsSession {
        &mut self.physics
    }

    /// Spawn a movable box entity.
    ///
    /// The entity scale is the full extents (twice the half extents); the
    /// body is registered in the side table for later state sync.
    pub fn spawn_box(
        &mut self,
        name: &str,
        mass: f32,
        half_extents: Vec3,
        position: Vec3,
        material: Material,
    ) -> Result<EntityKey, PhysicsError> {
        let handle = self.physics.spawn_dynamic_box(mass, half_extents, position)?;
        let entity = Entity::new(
            Transform::from_position_scale(position, half_extents * 2.0),
            material,
        )
        .with_name(name)
        .with_body(BodyKind::Dynamic, handle);
        let key = self.entities.insert(entity);
        self.body_index.insert(handle, key);
        log::debug!("spawned dynamic box '{name}' ({mass} kg) at {position:?}");
        Ok(key)
    }

    /// Spawn an immovable box entity (ground, walls).
    pub fn spawn_ground(
        &mut self,
        name: &str,
        half_extents: Vec3,
        position: Vec3,
        material: Material,
    ) -> Result<EntityKey, PhysicsError> {
        let handle = self.physics.spawn_static_box(half_extents, position)?;
        let entity = Entity::new(
            Transform::from_position_scale(position, half_extents * 2.0),
            material,
        )
        .with_name(name)
        .with_body(BodyKind::Static, handle);
        let key = self.entities.insert(entity);
        self.body_index.insert(handle, key);
        log::debug!("spawned static box '{name}' at {position:?}");
        Ok(key)
    }

    /// Copy every movable body's pose into its owning entity.
    ///
    /// Runs after a step has fully resolved, before rendering. Entities are
    /// updated independently; order across bodies is unspecified.
    pub fn sync_from_physics(&mut self) {
        let entities = &mut self.entities;
        let body_index = &self.body_index;
        self.physics.sync_dynamic_poses(|handle, position, rotation| {
            if let Some(&key) = body_index.get(&handle) {
                if let Some(entity) = entities.get_mut(key) {
                    entity.transform.position = position;
                    entity.transform.rotation = rotation;
                }
            }
        });
    }

    /// Advance the simulation by `dt` and sync entity transforms.
    pub fn update(&mut self, dt: f32) {
        self.physics.step(dt);
        self.sync_from_physics();
    }

    /// Weld two entities so their local anchor points coincide.
    ///
    /// `entity_a` is teleported onto `entity_b`'s anchor; see
    /// [`PhysicsSession::attach_fixed_joint`] for the workaround semantics.
    pub fn attach_fixed_joint(
        &mut self,
        entity_a: EntityKey,
        local_anchor_a: Vec3,
        entity_b: EntityKey,
        local_anchor_b: Vec3,
        use_workaround: bool,
    ) -> Result<ImpulseJointHandle, PhysicsError> {
        let body_a = self.body_of(entity_a)?;
        let body_b = self.body_of(entity_b)?;
        self.physics
            .attach_fixed_joint(body_a, local_anchor_a, body_b, local_anchor_b, use_workaround)
    }

    /// Dump the filter words of an entity's body at info level, labeled
    /// with the entity name.
    pub fn log_filter_data(&self, key: EntityKey) {
        let Some(entity) = self.entities.get(key) else {
            return;
        };
        let Some(body) = entity.body else {
            return;
        };
        let label = entity.name.as_deref().unwrap_or("entity");
        self.physics.log_filter_data(label, body.handle);
    }

    fn body_of(&self, key: EntityKey) -> Result<RigidBodyHandle, PhysicsError> {
        self.entities
            .get(key)
            .and_then(|entity| entity.body)
            .map(|body| body.handle)
            .ok_or(PhysicsError::UnknownBody)
    }

    /// Get a reference to an entity by key.
    pub fn get_entity(&self, key: EntityKey) -> Option<&Entity> {
        self.entities.get(key)
    }

    /// Get a mutable reference to an entity by key.
    pub fn get_entity_mut(&mut self, key: EntityKey) -> Option<&mut Entity> {
        self.entities.get_mut(key)
    }

    /// Look up an entity by name.
    pub fn get_by_name(&self, name: &str) -> Option<(EntityKey, &Entity)> {
        self.entities
            .iter()
            .find(|(_, entity)| entity.name.as_deref() == Some(name))
    }

    /// Number of entities.
    #[inline]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Whether the world holds no entities.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterate over all entities.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Iterate over keys and entities.
    pub fn iter_with_keys(&self) -> impl Iterator<Item = (EntityKey, &Entity)> {
        self.entities.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn initialized_world() -> World {
        let mut world = World::new();
        world.init_physics(&SessionConfig::default()).unwrap();
        world
    }

    #[test]
    fn test_world_new_is_empty() {
        let world = World::new();
        assert!(world.is_empty());
        assert_eq!(world.entity_count(), 0);
        assert!(!world.physics().is_initialized());
    }

    #[test]
    fn test_spawn_box_registers_entity_and_body() {
        let mut world = initialized_world();
        let key = world
            .spawn_box(
                "probe",
                50.0,
                Vec3::splat(0.5),
                Vec3::new(0.0, 5.0, 0.0),
                Material::GREEN,
            )
            .unwrap();

        let entity = world.get_entity(key).unwrap();
        assert!(entity.is_dynamic());
        assert_eq!(entity.transform.scale, Vec3::splat(1.0));
        assert_eq!(entity.transform.position, Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(world.physics().body_count(), 1);
    }

    #[test]
    fn test_spawn_requires_initialized_session() {
        let mut world = World::new();
        let err = world.spawn_box("probe", 1.0, Vec3::splat(0.5), Vec3::ZERO, Material::WHITE);
        assert_eq!(err.unwrap_err(), PhysicsError::Uninitialized);
    }

    #[test]
    fn test_get_by_name() {
        let mut world = initialized_world();
        world
            .spawn_ground("ground", Vec3::new(10.0, 0.5, 10.0), Vec3::ZERO, Material::BLUE)
            .unwrap();

        let (_, entity) = world.get_by_name("ground").unwrap();
        assert!(!entity.is_dynamic());
        assert!(world.get_by_name("missing").is_none());
    }

    #[test]
    fn test_update_syncs_dynamic_entities() {
        let mut world = initialized_world();
        let falling = world
            .spawn_box(
                "falling",
                1.0,
                Vec3::splat(0.5),
                Vec3::new(0.0, 10.0, 0.0),
                Material::WHITE,
            )
            .unwrap();
        let ground = world
            .spawn_ground("ground", Vec3::new(10.0, 0.5, 10.0), Vec3::ZERO, Material::BLUE)
            .unwrap();

        for _ in 0..10 {
            world.update(1.0 / 60.0);
        }

        let entity = world.get_entity(falling).unwrap();
        assert!(
            entity.transform.position.y < 10.0,
            "dynamic entity should track its falling body, y={}",
            entity.transform.position.y
        );
        // Static entities keep their spawn transform.
        assert_eq!(world.get_entity(ground).unwrap().transform.position, Vec3::ZERO);
    }

    #[test]
    fn test_attach_fixed_joint_through_entities() {
        let mut world = initialized_world();
        let a = world
            .spawn_box("a", 50.0, Vec3::splat(0.5), Vec3::new(0.0, 5.0, 0.0), Material::GREEN)
            .unwrap();
        let b = world
            .spawn_box("b", 1000.0, Vec3::new(8.0, 0.25, 1.5), Vec3::new(0.0, 4.0, 0.0), Material::RED)
            .unwrap();

        world
            .attach_fixed_joint(a, Vec3::ZERO, b, Vec3::ZERO, true)
            .unwrap();

        world.sync_from_physics();
        let pos_a = world.get_entity(a).unwrap().transform.position;
        let pos_b = world.get_entity(b).unwrap().transform.position;
        assert!((pos_a - pos_b).length() < 1e-4);
    }

    #[test]
    fn test_attach_fixed_joint_unknown_entity() {
        let mut world = initialized_world();
        let a = world
            .spawn_box("a", 1.0, Vec3::splat(0.5), Vec3::ZERO, Material::WHITE)
            .unwrap();
        let missing = EntityKey::default();

        let err = world.attach_fixed_joint(a, Vec3::ZERO, missing, Vec3::ZERO, false);
        assert_eq!(err.unwrap_err(), PhysicsError::UnknownBody);
    }

    #[test]
    fn test_deinit_physics_keeps_entities() {
        let mut world = initialized_world();
        world
            .spawn_box("a", 1.0, Vec3::splat(0.5), Vec3::ZERO, Material::WHITE)
            .unwrap();

        world.deinit_physics();
        assert!(!world.physics().is_initialized());
        // Entities survive as plain scene data; only the bodies are gone.
        assert_eq!(world.entity_count(), 1);

        // Sync after deinit must be a safe no-op.
        world.sync_from_physics();
        world.update(1.0 / 60.0);
    }
}
