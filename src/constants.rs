//! Centralised gameplay constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//! [`crate::config::GameConfig`] mirrors every value below so that
//! `assets/gameplay.toml` can override them without recompiling.
//!
//! ## Units
//!
//! World units are metres.  Projectile speeds are expressed in **units per
//! 60 Hz tick**; per-frame displacement is `speed × delta × TICK_RATE`, which
//! decouples projectile motion from the actual frame rate.

// ── Player: Movement ──────────────────────────────────────────────────────────

/// Walking speed (u/s) on a single axis.  Diagonal input is normalised so the
/// combined speed never exceeds this value.
pub const WALK_SPEED: f32 = 5.0;

/// Sprint speed (u/s) while Shift is held.
pub const SPRINT_SPEED: f32 = 8.5;

/// Initial upward velocity (u/s) applied on jump.
pub const JUMP_SPEED: f32 = 5.5;

/// Downward acceleration (u/s²) of the simplified player integrator.
///
/// Deliberately stronger than 9.81 so jumps feel snappy rather than floaty.
pub const PLAYER_GRAVITY: f32 = 18.0;

/// World-space height of the floor plane the player is clamped to.
pub const GROUND_HEIGHT: f32 = 0.0;

/// Camera height above the player's feet.
pub const EYE_HEIGHT: f32 = 1.6;

/// Horizontal half-extent of the player's collision box.
pub const PLAYER_HALF_WIDTH: f32 = 0.35;

/// Full height of the player's collision box (feet to head).
pub const PLAYER_HEIGHT: f32 = 1.8;

/// Extra distance added on top of the penetration depth when the player is
/// pushed out of an obstacle.  Keeps the next frame's overlap test negative.
pub const COLLISION_CORRECTION: f32 = 0.02;

/// Radians of yaw/pitch per pixel of mouse motion.
pub const MOUSE_SENSITIVITY: f32 = 0.002;

/// Maximum absolute pitch (rad); slightly under π/2 to avoid gimbal flip.
pub const PITCH_LIMIT: f32 = 1.54;

/// Minimum upward component of a contact normal for the contact to count as
/// standing on ground.
pub const GROUND_NORMAL_THRESHOLD: f32 = 0.7;

// ── Weapons: Animation Timing ─────────────────────────────────────────────────

/// Duration (s) of the recoil kick after a shot.
pub const RECOIL_DURATION: f32 = 0.12;

/// Duration (s) of the raise animation after switching weapons.
pub const SWITCH_DURATION: f32 = 0.35;

/// Grace period (s) between emptying a magazine and the automatic reload.
pub const AUTO_RELOAD_DELAY: f32 = 0.3;

// ── Weapons: Scope ────────────────────────────────────────────────────────────

/// Unscoped vertical field of view (degrees).
pub const HIP_FOV_DEGREES: f32 = 75.0;

/// Duration (s) of the eased FOV interpolation when entering/leaving scope.
pub const SCOPE_TRANSITION: f32 = 0.2;

/// Peak breathing sway (rad) applied to the view while scoped.
pub const SCOPE_SWAY_AMPLITUDE: f32 = 0.0025;

/// Angular rate (rad/s) of the breathing sway phase.
pub const SCOPE_SWAY_RATE: f32 = 1.3;

// ── Projectiles ───────────────────────────────────────────────────────────────

/// Maximum cumulative travel distance before a projectile is discarded.
pub const PROJECTILE_MAX_TRAVEL: f32 = 100.0;

/// Distance along the view direction at which projectiles spawn, so the first
/// ray cast never starts inside the player's own collider.
pub const MUZZLE_OFFSET: f32 = 0.5;

/// Downward bend applied to an arcing projectile's direction per 60 Hz tick.
pub const ARC_DROP_PER_TICK: f32 = 0.0025;

/// Baseline tick rate that projectile speeds are expressed against.
pub const TICK_RATE: f32 = 60.0;

// ── Impact Effects ────────────────────────────────────────────────────────────

/// Maximum number of paint decals alive at once; oldest are evicted first.
pub const DECAL_MAX_COUNT: usize = 60;

/// Seconds a decal stays in the scene before it is evicted.
pub const DECAL_MAX_AGE: f32 = 12.0;

/// Base radius of a paint splat decal.
pub const DECAL_RADIUS: f32 = 0.22;

/// Droplets spawned per impact.
pub const DROPLET_COUNT: u32 = 10;

/// Droplet lifetime range (s).  The upper bound must stay under 1.5 s.
pub const DROPLET_LIFETIME_MIN: f32 = 0.6;
pub const DROPLET_LIFETIME_MAX: f32 = 1.4;

/// Downward acceleration (u/s²) applied to droplets.
pub const DROPLET_GRAVITY: f32 = 9.8;

/// Per-tick velocity retention for droplets (viscous damping).
pub const DROPLET_DAMPING: f32 = 0.92;

/// Speed range (u/s) of droplets leaving the impact point.
pub const DROPLET_SPEED_MIN: f32 = 1.5;
pub const DROPLET_SPEED_MAX: f32 = 4.0;

/// Paint colours (sRGB) used when an impact has no weapon tint.
pub const PAINT_PALETTE: [[f32; 3]; 6] = [
    [0.95, 0.15, 0.55],
    [0.10, 0.80, 0.95],
    [0.98, 0.85, 0.10],
    [0.35, 0.95, 0.25],
    [0.98, 0.45, 0.05],
    [0.60, 0.25, 0.95],
];

// ── Targets ───────────────────────────────────────────────────────────────────

/// Hit points of a training target in the demo arena.
pub const TARGET_HP: f32 = 100.0;
