//! Player module: body entity, look/movement controller, obstacle collision.
//!
//! ## Sub-module layout
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`state`] | Components (`Player`, `PlayerCamera`, `PlayerKinematics`, `PlayerAnimation`) |
//! | [`control`] | Look, movement, gravity/ground clamp, camera sync |
//! | [`collision`] | `Obstacle` boxes, lazily rebuilt `ObstacleCache`, push-out resolution |
//!
//! All public items are re-exported at this level so the rest of the crate
//! can use flat `crate::player::*` imports.

pub mod collision;
pub mod control;
pub mod state;

// ── Flat re-exports ───────────────────────────────────────────────────────────

pub use collision::{
    mark_obstacle_cache_dirty_system, push_out_of_obstacles, rebuild_obstacle_cache_system,
    Obstacle, ObstacleCache, PushOut, WorldBox,
};
pub use control::{
    ground_contact_system, player_controller_system, step_player, sync_player_camera_system,
};
pub use state::{Player, PlayerAnimation, PlayerCamera, PlayerHitbox, PlayerKinematics};

use crate::config::GameConfig;
use crate::game::FrameSet;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ObstacleCache>().add_systems(
            Update,
            (
                (mark_obstacle_cache_dirty_system, rebuild_obstacle_cache_system).chain(),
                ground_contact_system,
                player_controller_system,
                sync_player_camera_system,
            )
                .chain()
                .in_set(FrameSet::Player),
        );
    }
}

// ── Spawn ─────────────────────────────────────────────────────────────────────

/// Spawn the (invisible) player body at `feet`, facing −Z.
///
/// The body is kinematic: its position is integrated by [`step_player`], not
/// by Rapier.  The capsule collider sits on a child [`PlayerHitbox`] raised so
/// its bottom touches the feet; it lets ray casts exclude the player and lets
/// Rapier report floor contacts for the ground check.
pub fn spawn_player(commands: &mut Commands, config: &GameConfig, feet: Vec3) -> Entity {
    let half_segment = (config.player_height * 0.5 - config.player_half_width).max(0.0);
    let entity = commands
        .spawn((
            Player,
            PlayerKinematics::default(),
            Transform::from_translation(feet),
            Visibility::Hidden,
            RigidBody::KinematicPositionBased,
        ))
        .with_children(|body| {
            body.spawn((
                PlayerHitbox,
                Collider::capsule_y(half_segment, config.player_half_width),
                ActiveCollisionTypes::default() | ActiveCollisionTypes::KINEMATIC_STATIC,
                Transform::from_xyz(0.0, config.player_height * 0.5, 0.0),
                Visibility::Inherited,
            ));
        })
        .id();
    info!("player spawned at {feet:?}");
    entity
}
