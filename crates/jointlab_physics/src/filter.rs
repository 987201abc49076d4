//! Per-collider simulation filter snapshots
//!
//! The engine keeps two interaction-group pairs per collider (broad-phase
//! collision groups and solver groups), four 32-bit words in total. Joint
//! creation has been observed on some engine versions to reset these words
//! on the colliders of the joint's second body; the helpers here snapshot
//! and restore them around that call, and dump them in the binary form the
//! diagnostic log compares.

use std::fmt;

use rapier3d::prelude::{ColliderHandle, Group, InteractionGroups, RigidBodyHandle};

use crate::session::{PhysicsSession, SessionState};

/// Snapshot of one collider's filter words.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterData {
    /// Broad-phase collision groups (memberships, filter)
    pub collision: InteractionGroups,
    /// Solver groups (memberships, filter)
    pub solver: InteractionGroups,
}

impl FilterData {
    /// The four words in fixed order: collision memberships, collision
    /// filter, solver memberships, solver filter.
    pub fn words(&self) -> [u32; 4] {
        [
            self.collision.memberships.bits(),
            self.collision.filter.bits(),
            self.solver.memberships.bits(),
            self.solver.filter.bits(),
        ]
    }

    /// Rebuild a snapshot from its four words.
    pub fn from_words(words: [u32; 4]) -> Self {
        Self {
            collision: InteractionGroups::new(
                Group::from_bits_truncate(words[0]),
                Group::from_bits_truncate(words[1]),
            ),
            solver: InteractionGroups::new(
                Group::from_bits_truncate(words[2]),
                Group::from_bits_truncate(words[3]),
            ),
        }
    }
}

impl fmt::Display for FilterData {
    /// Formats the four words as 32-bit patterns, least significant bit
    /// first, matching the diagnostic dump this harness compares by eye.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, word) in self.words().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            for bit in 0..32 {
                write!(f, "{}", (word >> bit) & 1)?;
            }
        }
        Ok(())
    }
}

/// Collider handles attached to `body`, in attachment order.
fn collider_handles(state: &SessionState, body: RigidBodyHandle) -> Vec<ColliderHandle> {
    state
        .bodies
        .get(body)
        .map(|rb| rb.colliders().to_vec())
        .unwrap_or_default()
}

/// Capture the filter words of every collider attached to `body`.
pub(crate) fn collect(state: &SessionState, body: RigidBodyHandle) -> Vec<FilterData> {
    collider_handles(state, body)
        .iter()
        .filter_map(|&handle| state.colliders.get(handle))
        .map(|collider| FilterData {
            collision: collider.collision_groups(),
            solver: collider.solver_groups(),
        })
        .collect()
}

/// Restore previously captured filter words, pairing snapshots to colliders
/// by attachment index.
pub(crate) fn apply(state: &mut SessionState, body: RigidBodyHandle, data: &[FilterData]) {
    let handles = collider_handles(state, body);
    for (snapshot, handle) in data.iter().zip(handles) {
        if let Some(collider) = state.colliders.get_mut(handle) {
            collider.set_collision_groups(snapshot.collision);
            collider.set_solver_groups(snapshot.solver);
        }
    }
}

impl PhysicsSession {
    /// Filter snapshots for every collider attached to `body`, ordered by
    /// attachment index. Empty when the body or the session is gone.
    pub fn collider_filter_data(&self, body: RigidBodyHandle) -> Vec<FilterData> {
        self.state
            .as_ref()
            .map(|state| collect(state, body))
            .unwrap_or_default()
    }

    /// Restore previously captured filter snapshots onto `body`'s colliders.
    pub fn set_collider_filter_data(&mut self, body: RigidBodyHandle, data: &[FilterData]) {
        if let Some(state) = self.state.as_mut() {
            apply(state, body, data);
        }
    }

    /// Dump every collider's filter words for `body` at info level.
    pub fn log_filter_data(&self, label: &str, body: RigidBodyHandle) {
        for (index, data) in self.collider_filter_data(body).iter().enumerate() {
            log::info!("{label} shape {index} filter words: {data}");
        }
    }
}
