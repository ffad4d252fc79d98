//! Runtime gameplay configuration loaded from `assets/gameplay.toml`.
//!
//! [`GameConfig`] is a Bevy [`Resource`] that mirrors every constant in
//! [`crate::constants`].  At startup, [`load_game_config`] reads
//! `assets/gameplay.toml` and overwrites the defaults with any values present
//! in the file.  Missing keys fall back to the compile-time defaults, so a
//! minimal TOML can override just the values you care about.
//!
//! Weapon definitions are **not** part of this file: they form a static table
//! in [`crate::weapon::definition`] and never change at runtime.
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `GameConfig::default()`.

use crate::constants::*;
use crate::error::{validate_positive, validate_range, ConfigError};
use bevy::prelude::*;
use serde::Deserialize;

/// Path of the optional override file, relative to the working directory.
pub const CONFIG_PATH: &str = "assets/gameplay.toml";

/// Runtime-tunable gameplay configuration.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // ── Player: Movement ──────────────────────────────────────────────────────
    pub walk_speed: f32,
    pub sprint_speed: f32,
    pub jump_speed: f32,
    pub player_gravity: f32,
    pub ground_height: f32,
    pub eye_height: f32,
    pub player_half_width: f32,
    pub player_height: f32,
    pub collision_correction: f32,
    pub mouse_sensitivity: f32,
    pub pitch_limit: f32,
    pub ground_normal_threshold: f32,

    // ── Weapons: Animation Timing ─────────────────────────────────────────────
    pub recoil_duration: f32,
    pub switch_duration: f32,
    pub auto_reload_delay: f32,

    // ── Weapons: Scope ────────────────────────────────────────────────────────
    pub hip_fov_degrees: f32,
    pub scope_transition: f32,
    pub scope_sway_amplitude: f32,
    pub scope_sway_rate: f32,

    // ── Projectiles ───────────────────────────────────────────────────────────
    pub projectile_max_travel: f32,
    pub muzzle_offset: f32,
    pub arc_drop_per_tick: f32,
    pub tick_rate: f32,

    // ── Impact Effects ────────────────────────────────────────────────────────
    pub decal_max_count: usize,
    pub decal_max_age: f32,
    pub decal_radius: f32,
    pub droplet_count: u32,
    pub droplet_lifetime_min: f32,
    pub droplet_lifetime_max: f32,
    pub droplet_gravity: f32,
    pub droplet_damping: f32,
    pub droplet_speed_min: f32,
    pub droplet_speed_max: f32,

    // ── Targets ───────────────────────────────────────────────────────────────
    pub target_hp: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            // Player: Movement
            walk_speed: WALK_SPEED,
            sprint_speed: SPRINT_SPEED,
            jump_speed: JUMP_SPEED,
            player_gravity: PLAYER_GRAVITY,
            ground_height: GROUND_HEIGHT,
            eye_height: EYE_HEIGHT,
            player_half_width: PLAYER_HALF_WIDTH,
            player_height: PLAYER_HEIGHT,
            collision_correction: COLLISION_CORRECTION,
            mouse_sensitivity: MOUSE_SENSITIVITY,
            pitch_limit: PITCH_LIMIT,
            ground_normal_threshold: GROUND_NORMAL_THRESHOLD,
            // Weapons: Animation Timing
            recoil_duration: RECOIL_DURATION,
            switch_duration: SWITCH_DURATION,
            auto_reload_delay: AUTO_RELOAD_DELAY,
            // Weapons: Scope
            hip_fov_degrees: HIP_FOV_DEGREES,
            scope_transition: SCOPE_TRANSITION,
            scope_sway_amplitude: SCOPE_SWAY_AMPLITUDE,
            scope_sway_rate: SCOPE_SWAY_RATE,
            // Projectiles
            projectile_max_travel: PROJECTILE_MAX_TRAVEL,
            muzzle_offset: MUZZLE_OFFSET,
            arc_drop_per_tick: ARC_DROP_PER_TICK,
            tick_rate: TICK_RATE,
            // Impact Effects
            decal_max_count: DECAL_MAX_COUNT,
            decal_max_age: DECAL_MAX_AGE,
            decal_radius: DECAL_RADIUS,
            droplet_count: DROPLET_COUNT,
            droplet_lifetime_min: DROPLET_LIFETIME_MIN,
            droplet_lifetime_max: DROPLET_LIFETIME_MAX,
            droplet_gravity: DROPLET_GRAVITY,
            droplet_damping: DROPLET_DAMPING,
            droplet_speed_min: DROPLET_SPEED_MIN,
            droplet_speed_max: DROPLET_SPEED_MAX,
            // Targets
            target_hp: TARGET_HP,
        }
    }
}

impl GameConfig {
    /// Reject values that would break an invariant of the simulation
    /// (zero-length animations, droplets that outlive the 1.5 s bound, a
    /// sprint slower than a walk, ...).
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_positive("walk_speed", self.walk_speed)?;
        validate_range("sprint_speed", self.sprint_speed, self.walk_speed, 50.0)?;
        validate_positive("player_gravity", self.player_gravity)?;
        validate_positive("player_half_width", self.player_half_width)?;
        validate_positive("player_height", self.player_height)?;
        validate_range("eye_height", self.eye_height, 0.0, self.player_height)?;
        validate_range("pitch_limit", self.pitch_limit, 0.0, std::f32::consts::FRAC_PI_2)?;
        validate_range("ground_normal_threshold", self.ground_normal_threshold, 0.0, 1.0)?;
        validate_positive("recoil_duration", self.recoil_duration)?;
        validate_positive("switch_duration", self.switch_duration)?;
        validate_range("auto_reload_delay", self.auto_reload_delay, 0.0, 5.0)?;
        validate_range("hip_fov_degrees", self.hip_fov_degrees, 30.0, 120.0)?;
        validate_positive("scope_transition", self.scope_transition)?;
        validate_positive("projectile_max_travel", self.projectile_max_travel)?;
        validate_positive("tick_rate", self.tick_rate)?;
        validate_range("droplet_damping", self.droplet_damping, 0.0, 1.0)?;
        validate_range(
            "droplet_speed_max",
            self.droplet_speed_max,
            self.droplet_speed_min,
            100.0,
        )?;
        validate_positive("decal_max_age", self.decal_max_age)?;
        validate_range(
            "droplet_lifetime_max",
            self.droplet_lifetime_max,
            self.droplet_lifetime_min,
            1.5,
        )?;
        if self.decal_max_count == 0 {
            return Err(ConfigError::OutOfRange {
                name: "decal_max_count",
                value: 0.0,
                safe_range: "[1, ∞)".to_string(),
            });
        }
        Ok(())
    }
}

/// Parse a TOML document into a validated [`GameConfig`].
pub fn parse_game_config(contents: &str) -> Result<GameConfig, ConfigError> {
    let config: GameConfig =
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Startup system: attempt to load `assets/gameplay.toml` and overwrite the
/// `GameConfig` resource with any values present in the file.
///
/// Missing keys retain their compiled defaults.  Parse and validation errors
/// are printed to stderr but do not abort the game.  A missing file is
/// silently ignored (defaults are already in place from `insert_resource`).
pub fn load_game_config(mut config: ResMut<GameConfig>) {
    match std::fs::read_to_string(CONFIG_PATH) {
        Ok(contents) => match parse_game_config(&contents) {
            Ok(loaded) => {
                *config = loaded;
                println!("✓ Loaded gameplay config from {CONFIG_PATH}");
            }
            Err(e) => {
                eprintln!("⚠ Rejected {CONFIG_PATH}: {e}; using defaults");
            }
        },
        Err(_) => {
            println!("ℹ No {CONFIG_PATH} found; using compiled defaults");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let cfg = parse_game_config("walk_speed = 4.0\nscope_transition = 0.3\n")
            .expect("partial config should parse");
        assert!((cfg.walk_speed - 4.0).abs() < 1e-6);
        assert!((cfg.scope_transition - 0.3).abs() < 1e-6);
        assert!((cfg.sprint_speed - SPRINT_SPEED).abs() < 1e-6);
        assert_eq!(cfg.decal_max_count, DECAL_MAX_COUNT);
    }

    #[test]
    fn sprint_slower_than_walk_is_rejected() {
        let err = parse_game_config("walk_speed = 6.0\nsprint_speed = 3.0\n").unwrap_err();
        match err {
            ConfigError::OutOfRange { name, .. } => assert_eq!(name, "sprint_speed"),
            other => panic!("expected OutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn droplet_lifetime_above_bound_is_rejected() {
        assert!(parse_game_config("droplet_lifetime_max = 2.0\n").is_err());
    }

    #[test]
    fn malformed_toml_reports_parse_error() {
        let err = parse_game_config("walk_speed = \"fast\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
