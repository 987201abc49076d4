//! Physics session lifecycle and body factory
//!
//! The session owns every engine-side object (pipeline, phases, body and
//! joint sets). All of it is created together by [`PhysicsSession::init`]
//! and dropped together by [`PhysicsSession::deinit`]; the lifecycle is
//! idempotent and symmetric, so a double deinit or a deinit before init is
//! a safe no-op.

use glam::{Quat, Vec3};
use rapier3d::prelude::*;

use crate::convert::{to_iso, to_na_vec, to_quat, to_vec3};
use crate::error::PhysicsError;

/// Collision layer carried by immovable world geometry.
pub const LAYER_WORLD: Group = Group::GROUP_1;
/// Collision layer carried by movable bodies.
pub const LAYER_DYNAMIC: Group = Group::GROUP_2;

/// Reference density used to derive mass and inertia before the explicit
/// mass override in [`PhysicsSession::spawn_dynamic_box`].
pub const REFERENCE_DENSITY: f32 = 10.0;

/// Configuration for the physics session.
#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Gravity acceleration vector
    pub gravity: Vec3,
    /// Default surface friction
    pub friction: f32,
    /// Default surface restitution
    pub restitution: f32,
    /// Worker threads for the engine's internal pool
    pub worker_threads: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.81, 0.0),
            friction: 0.5,
            restitution: 0.6,
            worker_threads: 2,
        }
    }
}

/// Engine state owned by an initialized session.
pub(crate) struct SessionState {
    pub gravity: Vector<Real>,
    pub integration_parameters: IntegrationParameters,
    pub pipeline: PhysicsPipeline,
    pub islands: IslandManager,
    pub broad_phase: DefaultBroadPhase,
    pub narrow_phase: NarrowPhase,
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub impulse_joints: ImpulseJointSet,
    pub multibody_joints: MultibodyJointSet,
    pub ccd_solver: CCDSolver,
    pub query_pipeline: QueryPipeline,
    pub friction: f32,
    pub restitution: f32,
}

/// A physics session with an explicit init/deinit lifecycle.
///
/// `None` state means uninitialized. In-loop operations on an uninitialized
/// session are silent no-ops; only `init` and the factory report errors.
pub struct PhysicsSession {
    pub(crate) state: Option<SessionState>,
}

impl Default for PhysicsSession {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsSession {
    /// Create an uninitialized session.
    pub fn new() -> Self {
        Self { state: None }
    }

    /// Construct the full engine state.
    ///
    /// Returns [`PhysicsError::AlreadyInitialized`] (leaving the existing
    /// state untouched) when called on an initialized session.
    pub fn init(&mut self, config: &SessionConfig) -> Result<(), PhysicsError> {
        if self.state.is_some() {
            return Err(PhysicsError::AlreadyInitialized);
        }

        #[cfg(feature = "parallel")]
        {
            // The engine schedules its own workers; sizing can only be done
            // once per process, later sessions inherit the existing pool.
            if let Err(e) = rayon::ThreadPoolBuilder::new()
                .num_threads(config.worker_threads)
                .build_global()
            {
                log::warn!("worker pool sizing failed, keeping existing pool: {e}");
            }
        }

        self.state = Some(SessionState {
            gravity: to_na_vec(config.gravity),
            integration_parameters: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            friction: config.friction,
            restitution: config.restitution,
        });
        log::info!(
            "physics session initialized (gravity {:?}, {} worker threads)",
            config.gravity,
            config.worker_threads
        );
        Ok(())
    }

    /// Release the engine state. No-op on an uninitialized session.
    pub fn deinit(&mut self) {
        if self.state.take().is_some() {
            log::info!("physics session released");
        }
    }

    /// Whether `init` has run without a matching `deinit`.
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// The engine parallelizes internally but the call is synchronous: it
    /// blocks until the step's results are available. No-op when the session
    /// is uninitialized.
    pub fn step(&mut self, dt: f32) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        state.integration_parameters.dt = dt;
        state.pipeline.step(
            &state.gravity,
            &state.integration_parameters,
            &mut state.islands,
            &mut state.broad_phase,
            &mut state.narrow_phase,
            &mut state.bodies,
            &mut state.colliders,
            &mut state.impulse_joints,
            &mut state.multibody_joints,
            &mut state.ccd_solver,
            Some(&mut state.query_pipeline),
            &(),
            &(),
        );
    }

    /// Spawn a movable box body at `position` with identity orientation.
    ///
    /// The collider is sized from `half_extents` and carries the session's
    /// default surface material. Mass and inertia are first derived from
    /// [`REFERENCE_DENSITY`], then the mass alone is overridden to `mass`;
    /// the inertia keeps the density-derived distribution. Inputs are passed
    /// to the engine uninspected.
    pub fn spawn_dynamic_box(
        &mut self,
        mass: f32,
        half_extents: Vec3,
        position: Vec3,
    ) -> Result<RigidBodyHandle, PhysicsError> {
        let state = self.state.as_mut().ok_or(PhysicsError::Uninitialized)?;

        let body = RigidBodyBuilder::dynamic()
            .translation(to_na_vec(position))
            .build();
        let handle = state.bodies.insert(body);

        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .density(REFERENCE_DENSITY)
            .friction(state.friction)
            .restitution(state.restitution)
            .collision_groups(InteractionGroups::new(LAYER_DYNAMIC, Group::ALL))
            .build();
        state
            .colliders
            .insert_with_parent(collider, handle, &mut state.bodies);

        if let Some(body) = state.bodies.get_mut(handle) {
            let derived = body.mass();
            body.set_additional_mass(mass - derived, true);
        }
        Ok(handle)
    }

    /// Spawn an immovable box body at `position` with identity orientation.
    pub fn spawn_static_box(
        &mut self,
        half_extents: Vec3,
        position: Vec3,
    ) -> Result<RigidBodyHandle, PhysicsError> {
        let state = self.state.as_mut().ok_or(PhysicsError::Uninitialized)?;

        let body = RigidBodyBuilder::fixed()
            .translation(to_na_vec(position))
            .build();
        let handle = state.bodies.insert(body);

        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .friction(state.friction)
            .restitution(state.restitution)
            .collision_groups(InteractionGroups::new(LAYER_WORLD, Group::ALL))
            .build();
        state
            .colliders
            .insert_with_parent(collider, handle, &mut state.bodies);
        Ok(handle)
    }

    /// Current world pose of a body, or `None` if the body (or the session)
    /// is gone.
    pub fn body_pose(&self, handle: RigidBodyHandle) -> Option<(Vec3, Quat)> {
        let state = self.state.as_ref()?;
        let body = state.bodies.get(handle)?;
        let iso = body.position();
        Some((to_vec3(&iso.translation.vector), to_quat(&iso.rotation)))
    }

    /// Teleport a body to the given world pose, waking it.
    pub fn set_body_pose(
        &mut self,
        handle: RigidBodyHandle,
        position: Vec3,
        rotation: Quat,
    ) -> Result<(), PhysicsError> {
        let state = self.state.as_mut().ok_or(PhysicsError::Uninitialized)?;
        let body = state
            .bodies
            .get_mut(handle)
            .ok_or(PhysicsError::UnknownBody)?;
        body.set_position(to_iso(position, rotation), true);
        Ok(())
    }

    /// Current mass of a body.
    pub fn body_mass(&self, handle: RigidBodyHandle) -> Option<f32> {
        let state = self.state.as_ref()?;
        Some(state.bodies.get(handle)?.mass())
    }

    /// Number of bodies in the scene.
    pub fn body_count(&self) -> usize {
        self.state.as_ref().map_or(0, |state| state.bodies.len())
    }

    /// Visit the pose of every movable body.
    ///
    /// Used once per tick for state synchronization after a step has fully
    /// resolved. Visit order across bodies is unspecified.
    pub fn sync_dynamic_poses<F>(&self, mut set_pose: F)
    where
        F: FnMut(RigidBodyHandle, Vec3, Quat),
    {
        let Some(state) = self.state.as_ref() else {
            return;
        };
        for (handle, body) in state.bodies.iter() {
            if !body.is_dynamic() {
                continue;
            }
            let iso = body.position();
            set_pose(
                handle,
                to_vec3(&iso.translation.vector),
                to_quat(&iso.rotation),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_default() {
        let config = SessionConfig::default();
        assert_eq!(config.gravity, Vec3::new(0.0, -9.81, 0.0));
        assert_eq!(config.friction, 0.5);
        assert_eq!(config.restitution, 0.6);
        assert_eq!(config.worker_threads, 2);
    }

    #[test]
    fn test_init_and_deinit() {
        let mut session = PhysicsSession::new();
        assert!(!session.is_initialized());

        session.init(&SessionConfig::default()).unwrap();
        assert!(session.is_initialized());

        session.deinit();
        assert!(!session.is_initialized());
    }

    #[test]
    fn test_double_init_fails_and_keeps_state() {
        let mut session = PhysicsSession::new();
        session.init(&SessionConfig::default()).unwrap();
        let handle = session
            .spawn_dynamic_box(1.0, Vec3::splat(0.5), Vec3::new(0.0, 5.0, 0.0))
            .unwrap();

        let err = session.init(&SessionConfig::default());
        assert_eq!(err, Err(PhysicsError::AlreadyInitialized));

        // The failed init must not have disturbed the existing scene.
        assert!(session.is_initialized());
        assert!(session.body_pose(handle).is_some());
        assert_eq!(session.body_count(), 1);
    }

    #[test]
    fn test_deinit_is_idempotent() {
        let mut session = PhysicsSession::new();

        // Deinit before init must not fault.
        session.deinit();
        assert!(!session.is_initialized());

        session.init(&SessionConfig::default()).unwrap();
        session.deinit();
        session.deinit();
        assert!(!session.is_initialized());
    }

    #[test]
    fn test_deinit_clears_handles() {
        let mut session = PhysicsSession::new();
        session.init(&SessionConfig::default()).unwrap();
        let handle = session
            .spawn_dynamic_box(1.0, Vec3::splat(0.5), Vec3::ZERO)
            .unwrap();

        session.deinit();
        assert!(session.body_pose(handle).is_none());
        assert_eq!(session.body_count(), 0);

        // The session is reusable after a full cycle.
        session.init(&SessionConfig::default()).unwrap();
        assert!(session.is_initialized());
        assert_eq!(session.body_count(), 0);
    }

    #[test]
    fn test_spawn_requires_init() {
        let mut session = PhysicsSession::new();
        let err = session.spawn_dynamic_box(1.0, Vec3::splat(0.5), Vec3::ZERO);
        assert_eq!(err, Err(PhysicsError::Uninitialized));

        let err = session.spawn_static_box(Vec3::splat(0.5), Vec3::ZERO);
        assert_eq!(err, Err(PhysicsError::Uninitialized));
    }

    #[test]
    fn test_step_without_init_is_noop() {
        let mut session = PhysicsSession::new();
        session.step(1.0 / 60.0);
        assert!(!session.is_initialized());
    }

    #[test]
    fn test_mass_override() {
        let mut session = PhysicsSession::new();
        session.init(&SessionConfig::default()).unwrap();

        // Unit cube at reference density would weigh 10; the override wins.
        let handle = session
            .spawn_dynamic_box(50.0, Vec3::splat(0.5), Vec3::ZERO)
            .unwrap();
        let mass = session.body_mass(handle).unwrap();
        assert!((mass - 50.0).abs() < 1e-3, "mass should be 50, got {mass}");
    }

    #[test]
    fn test_dynamic_body_falls_under_gravity() {
        let mut session = PhysicsSession::new();
        session.init(&SessionConfig::default()).unwrap();
        let handle = session
            .spawn_dynamic_box(1.0, Vec3::splat(0.5), Vec3::new(0.0, 10.0, 0.0))
            .unwrap();

        for _ in 0..10 {
            session.step(1.0 / 60.0);
        }

        let (position, _) = session.body_pose(handle).unwrap();
        assert!(
            position.y < 10.0,
            "body should fall under gravity, y={}",
            position.y
        );
    }

    #[test]
    fn test_static_body_does_not_move() {
        let mut session = PhysicsSession::new();
        session.init(&SessionConfig::default()).unwrap();
        let handle = session
            .spawn_static_box(Vec3::new(10.0, 0.5, 10.0), Vec3::ZERO)
            .unwrap();

        for _ in 0..10 {
            session.step(1.0 / 60.0);
        }

        let (position, _) = session.body_pose(handle).unwrap();
        assert_eq!(position, Vec3::ZERO);
    }

    #[test]
    fn test_sync_visits_only_dynamic_bodies() {
        let mut session = PhysicsSession::new();
        session.init(&SessionConfig::default()).unwrap();
        let dynamic = session
            .spawn_dynamic_box(1.0, Vec3::splat(0.5), Vec3::new(0.0, 5.0, 0.0))
            .unwrap();
        let _ground = session
            .spawn_static_box(Vec3::new(10.0, 0.5, 10.0), Vec3::ZERO)
            .unwrap();

        let mut visited = Vec::new();
        session.sync_dynamic_poses(|handle, _, _| visited.push(handle));
        assert_eq!(visited, vec![dynamic]);
    }

    #[test]
    fn test_set_body_pose_teleports() {
        let mut session = PhysicsSession::new();
        session.init(&SessionConfig::default()).unwrap();
        let handle = session
            .spawn_dynamic_box(1.0, Vec3::splat(0.5), Vec3::ZERO)
            .unwrap();

        let rotation = Quat::from_rotation_y(0.5);
        session
            .set_body_pose(handle, Vec3::new(1.0, 2.0, 3.0), rotation)
            .unwrap();

        let (position, q) = session.body_pose(handle).unwrap();
        assert!((position - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-5);
        assert!(q.dot(rotation).abs() > 0.9999);
    }
}
