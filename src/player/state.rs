//! Player components.
//!
//! Systems that mutate this state are in the sibling modules:
//! - [`super::control`] — look, movement, gravity, camera sync
//! - [`super::collision`] — obstacle cache and push-out resolution

use bevy::prelude::*;

/// Marker component for the player body entity.
#[derive(Component)]
pub struct Player;

/// Marker for the child entity carrying the player's capsule collider.
#[derive(Component)]
pub struct PlayerHitbox;

/// Marker component for the first-person camera.
///
/// The camera is a separate top-level entity (not a child of the body) so
/// that its orientation can carry the scope sway without rotating the body.
#[derive(Component)]
pub struct PlayerCamera;

/// Animation clip selected from the player's movement each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerAnimation {
    #[default]
    Idle,
    Walk,
    Sprint,
    Jump,
}

/// Kinematic state integrated by the player controller.
///
/// The body position itself lives on the entity's `Transform` (feet at
/// `translation`); everything else the controller carries between frames is
/// here.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct PlayerKinematics {
    /// World-space velocity (u/s).
    pub velocity: Vec3,
    pub on_ground: bool,
    /// Set by the physics contact check when a supporting contact normal was
    /// seen this frame; consumed by the next controller step.
    pub support_contact: bool,
    /// Horizontal speed selected this frame (walk or sprint, 0 when idle).
    pub speed: f32,
    /// Look yaw (rad) about world +Y; 0 faces −Z.
    pub yaw: f32,
    /// Look pitch (rad); positive looks up.
    pub pitch: f32,
    pub animation: PlayerAnimation,
}

impl Default for PlayerKinematics {
    fn default() -> Self {
        Self {
            velocity: Vec3::ZERO,
            on_ground: true,
            support_contact: false,
            speed: 0.0,
            yaw: 0.0,
            pitch: 0.0,
            animation: PlayerAnimation::Idle,
        }
    }
}

impl PlayerKinematics {
    /// Horizontal forward unit vector for the current yaw.
    #[inline]
    pub fn forward(&self) -> Vec3 {
        Vec3::new(-self.yaw.sin(), 0.0, -self.yaw.cos())
    }

    /// Horizontal right unit vector for the current yaw.
    #[inline]
    pub fn right(&self) -> Vec3 {
        Vec3::new(self.yaw.cos(), 0.0, -self.yaw.sin())
    }

    /// Camera orientation for the current look angles plus an additive
    /// (yaw, pitch) offset.
    pub fn look_rotation(&self, offset: Vec2) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            self.yaw + offset.x,
            self.pitch + offset.y,
            0.0,
        )
    }
}
