//! Player look, movement, and camera systems.
//!
//! ## Pipeline (runs in order every `Update` frame)
//!
//! 1. [`ground_contact_system`] — flags a supporting physics contact.
//! 2. [`player_controller_system`] — runs [`step_player`] on the body.
//! 3. [`sync_player_camera_system`] — places the camera at eye height and
//!    applies the look angles plus the scope sway, before any weapon fires
//!    from the camera pose this frame.
//!
//! [`step_player`] is a plain function over an [`InputSnapshot`] and the
//! cached obstacle boxes, so the whole movement model is testable without a
//! window, an input device, or a physics world.

use super::collision::{push_out_of_obstacles, ObstacleCache, WorldBox};
use super::state::{Player, PlayerAnimation, PlayerCamera, PlayerHitbox, PlayerKinematics};
use crate::config::GameConfig;
use crate::input::InputSnapshot;
use crate::weapon::Arsenal;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

/// Advance the player by one frame.
///
/// Returns `false` (and changes nothing) while paused or while the pointer is
/// not locked.
pub fn step_player<'a>(
    kin: &mut PlayerKinematics,
    feet: &mut Vec3,
    input: &InputSnapshot,
    delta: f32,
    config: &GameConfig,
    obstacles: impl IntoIterator<Item = &'a WorldBox>,
) -> bool {
    if input.paused || !input.pointer_locked {
        return false;
    }

    // ── Look ──────────────────────────────────────────────────────────────────
    kin.yaw -= input.look_delta.x * config.mouse_sensitivity;
    kin.pitch = (kin.pitch - input.look_delta.y * config.mouse_sensitivity)
        .clamp(-config.pitch_limit, config.pitch_limit);

    // ── Movement intent ───────────────────────────────────────────────────────
    let mut wish = Vec3::ZERO;
    if input.forward {
        wish += kin.forward();
    }
    if input.back {
        wish -= kin.forward();
    }
    if input.right {
        wish += kin.right();
    }
    if input.left {
        wish -= kin.right();
    }
    // Diagonals must not be faster than a single axis.
    let wish = wish.normalize_or_zero();
    let moving = wish != Vec3::ZERO;

    kin.speed = match (moving, input.sprint) {
        (false, _) => 0.0,
        (true, true) => config.sprint_speed,
        (true, false) => config.walk_speed,
    };
    kin.velocity.x = wish.x * kin.speed;
    kin.velocity.z = wish.z * kin.speed;

    // ── Gravity + ground clamp ────────────────────────────────────────────────
    let grounded_before = kin.on_ground || kin.support_contact;
    kin.support_contact = false;
    if input.jump && grounded_before {
        kin.velocity.y = config.jump_speed;
    }
    kin.velocity.y -= config.player_gravity * delta;
    *feet += kin.velocity * delta;

    kin.on_ground = false;
    if feet.y <= config.ground_height {
        feet.y = config.ground_height;
        if kin.velocity.y < 0.0 {
            kin.velocity.y = 0.0;
        }
        kin.on_ground = true;
    }

    // ── Obstacles ─────────────────────────────────────────────────────────────
    let push = push_out_of_obstacles(
        feet,
        &mut kin.velocity,
        config.player_half_width,
        config.player_height,
        config.collision_correction,
        obstacles,
    );
    if push.landed {
        kin.on_ground = true;
    } else if let Some(top) = push.resting_on {
        // Hold the landing height instead of sinking back into the box.
        feet.y = top + config.collision_correction;
        kin.velocity.y = 0.0;
        kin.on_ground = true;
    }

    kin.animation = if !kin.on_ground {
        PlayerAnimation::Jump
    } else if !moving {
        PlayerAnimation::Idle
    } else if input.sprint {
        PlayerAnimation::Sprint
    } else {
        PlayerAnimation::Walk
    };

    true
}

/// Flag [`PlayerKinematics::support_contact`] when Rapier reports a contact
/// whose normal points up enough to stand on.
///
/// Contact normals point from `collider1` to `collider2`; the sign is flipped
/// when the hitbox is the first collider so the normal always points from
/// the ground into the player.
pub fn ground_contact_system(
    mut q_player: Query<&mut PlayerKinematics, With<Player>>,
    q_hitbox: Query<Entity, With<PlayerHitbox>>,
    rapier_context: ReadRapierContext,
    config: Res<GameConfig>,
) {
    let Ok(mut kin) = q_player.single_mut() else {
        return;
    };
    let Ok(hitbox) = q_hitbox.single() else {
        return;
    };
    let Ok(rapier) = rapier_context.single() else {
        return;
    };

    // Kinematic-vs-fixed pairs carry manifold points but no solver
    // contacts, so points are checked directly.
    for contact_pair in rapier.contact_pairs_with(hitbox) {
        let sign = if contact_pair.collider1() == Some(hitbox) {
            -1.0
        } else {
            1.0
        };
        for manifold in contact_pair.manifolds() {
            if manifold.num_points() > 0
                && manifold.normal().y * sign > config.ground_normal_threshold
            {
                kin.support_contact = true;
                return;
            }
        }
    }
}

/// Run one controller step on the player body.
pub fn player_controller_system(
    input: Res<InputSnapshot>,
    time: Res<Time>,
    config: Res<GameConfig>,
    cache: Res<ObstacleCache>,
    mut q_player: Query<(&mut PlayerKinematics, &mut Transform), With<Player>>,
) {
    let Ok((mut kin, mut transform)) = q_player.single_mut() else {
        return;
    };

    let previous = kin.animation;
    let mut feet = transform.translation;
    if !step_player(
        &mut kin,
        &mut feet,
        &input,
        time.delta_secs(),
        &config,
        cache.iter_boxes(),
    ) {
        return;
    }
    transform.translation = feet;
    transform.rotation = Quat::from_rotation_y(kin.yaw);

    if kin.animation != previous {
        debug!("player animation {:?} → {:?}", previous, kin.animation);
    }
}

/// Place the camera at eye height above the body and orient it.
///
/// While scoped, the breathing sway from the [`Arsenal`] is added on top of
/// the look angles; it is zero otherwise, so the view returns exactly to the
/// pre-scope orientation on release.
pub fn sync_player_camera_system(
    q_player: Query<(&Transform, &PlayerKinematics), With<Player>>,
    mut q_camera: Query<&mut Transform, (With<PlayerCamera>, Without<Player>)>,
    arsenal: Option<Res<Arsenal>>,
    config: Res<GameConfig>,
) {
    let Ok((body, kin)) = q_player.single() else {
        return;
    };
    let Ok(mut camera) = q_camera.single_mut() else {
        return;
    };

    let sway = arsenal
        .map(|a| a.scope().sway(config.scope_sway_amplitude))
        .unwrap_or(Vec2::ZERO);
    camera.translation = body.translation + Vec3::Y * config.eye_height;
    camera.rotation = kin.look_rotation(sway);
}

// ── Unit tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn live_input() -> InputSnapshot {
        InputSnapshot {
            pointer_locked: true,
            ..Default::default()
        }
    }

    fn step(kin: &mut PlayerKinematics, feet: &mut Vec3, input: &InputSnapshot) -> bool {
        step_player(kin, feet, input, DT, &GameConfig::default(), std::iter::empty())
    }

    #[test]
    fn paused_input_is_a_no_op() {
        let mut kin = PlayerKinematics::default();
        let mut feet = Vec3::ZERO;
        let input = InputSnapshot {
            paused: true,
            forward: true,
            ..live_input()
        };
        assert!(!step(&mut kin, &mut feet, &input));
        assert_eq!(feet, Vec3::ZERO);
        assert_eq!(kin, PlayerKinematics::default());
    }

    #[test]
    fn unlocked_pointer_is_a_no_op() {
        let mut kin = PlayerKinematics::default();
        let mut feet = Vec3::ZERO;
        let input = InputSnapshot {
            forward: true,
            ..Default::default()
        };
        assert!(!step(&mut kin, &mut feet, &input));
        assert_eq!(feet, Vec3::ZERO);
    }

    #[test]
    fn forward_moves_along_negative_z_at_walk_speed() {
        let mut kin = PlayerKinematics::default();
        let mut feet = Vec3::ZERO;
        let input = InputSnapshot {
            forward: true,
            ..live_input()
        };
        step(&mut kin, &mut feet, &input);
        let cfg = GameConfig::default();
        assert!((feet.z + cfg.walk_speed * DT).abs() < 1e-5, "feet = {feet:?}");
        assert_eq!(kin.animation, PlayerAnimation::Walk);
    }

    #[test]
    fn diagonal_speed_does_not_exceed_single_axis() {
        let mut kin = PlayerKinematics::default();
        let mut feet = Vec3::ZERO;
        let input = InputSnapshot {
            forward: true,
            right: true,
            ..live_input()
        };
        step(&mut kin, &mut feet, &input);
        let horizontal = Vec2::new(kin.velocity.x, kin.velocity.z).length();
        assert!(
            horizontal <= GameConfig::default().walk_speed + 1e-4,
            "diagonal speed {horizontal}"
        );
    }

    #[test]
    fn sprint_selects_sprint_speed_and_animation() {
        let mut kin = PlayerKinematics::default();
        let mut feet = Vec3::ZERO;
        let input = InputSnapshot {
            forward: true,
            sprint: true,
            ..live_input()
        };
        step(&mut kin, &mut feet, &input);
        assert_eq!(kin.speed, GameConfig::default().sprint_speed);
        assert_eq!(kin.animation, PlayerAnimation::Sprint);
    }

    #[test]
    fn standing_still_is_idle_and_grounded() {
        let mut kin = PlayerKinematics::default();
        let mut feet = Vec3::ZERO;
        step(&mut kin, &mut feet, &live_input());
        assert_eq!(kin.animation, PlayerAnimation::Idle);
        assert!(kin.on_ground);
        assert_eq!(feet.y, 0.0);
        assert_eq!(kin.velocity.y, 0.0);
    }

    #[test]
    fn jump_leaves_ground_and_lands_again() {
        let mut kin = PlayerKinematics::default();
        let mut feet = Vec3::ZERO;
        let jump = InputSnapshot {
            jump: true,
            ..live_input()
        };
        step(&mut kin, &mut feet, &jump);
        assert!(!kin.on_ground);
        assert!(feet.y > 0.0);
        assert_eq!(kin.animation, PlayerAnimation::Jump);

        // Holding jump mid-air must not re-launch.
        let peak_vel = kin.velocity.y;
        step(&mut kin, &mut feet, &jump);
        assert!(kin.velocity.y < peak_vel);

        for _ in 0..120 {
            step(&mut kin, &mut feet, &live_input());
        }
        assert!(kin.on_ground);
        assert_eq!(feet.y, 0.0);
    }

    #[test]
    fn look_pitch_is_clamped() {
        let mut kin = PlayerKinematics::default();
        let mut feet = Vec3::ZERO;
        let input = InputSnapshot {
            look_delta: Vec2::new(0.0, -100_000.0),
            ..live_input()
        };
        step(&mut kin, &mut feet, &input);
        assert_eq!(kin.pitch, GameConfig::default().pitch_limit);
    }

    #[test]
    fn walking_into_wall_is_blocked() {
        let cfg = GameConfig::default();
        let wall = WorldBox::from_center(Vec3::new(0.0, 1.5, -2.0), Vec3::new(5.0, 1.5, 0.25));
        let mut kin = PlayerKinematics::default();
        let mut feet = Vec3::ZERO;
        let input = InputSnapshot {
            forward: true,
            sprint: true,
            ..live_input()
        };
        for _ in 0..240 {
            step_player(&mut kin, &mut feet, &input, DT, &cfg, [&wall]);
        }
        assert!(
            feet.z - cfg.player_half_width >= wall.max.z - 1e-4,
            "player passed into the wall: feet = {feet:?}"
        );
    }

    #[test]
    fn standing_on_a_crate_stays_grounded() {
        let cfg = GameConfig::default();
        let crate_box = WorldBox::from_center(Vec3::new(0.0, 0.5, 0.0), Vec3::splat(0.5));
        let mut kin = PlayerKinematics::default();
        let mut feet = Vec3::new(0.0, 1.0 + cfg.collision_correction, 0.0);
        for frame in 0..10 {
            step_player(&mut kin, &mut feet, &live_input(), DT, &cfg, [&crate_box]);
            assert!(kin.on_ground, "airborne on frame {frame}: feet = {feet:?}");
            assert_eq!(kin.animation, PlayerAnimation::Idle);
        }
        assert!(feet.y >= 1.0);

        let jump = InputSnapshot {
            jump: true,
            ..live_input()
        };
        step_player(&mut kin, &mut feet, &jump, DT, &cfg, [&crate_box]);
        assert!(kin.velocity.y > 0.0, "jump from the crate top");
    }

    #[test]
    fn support_contact_allows_jump() {
        let mut kin = PlayerKinematics {
            on_ground: false,
            support_contact: true,
            ..Default::default()
        };
        let mut feet = Vec3::new(0.0, 2.0, 0.0);
        let jump = InputSnapshot {
            jump: true,
            ..live_input()
        };
        step(&mut kin, &mut feet, &jump);
        assert!(kin.velocity.y > 0.0);
        assert!(!kin.support_contact, "contact flag is consumed each step");
    }
}
