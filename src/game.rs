//! Top-level game state, frame ordering, and the [`GamePlugin`] that wires
//! every gameplay plugin together.
//!
//! ## States
//!
//! | State     | Description                                        |
//! |-----------|----------------------------------------------------|
//! | `Playing` | Default; all gameplay sets run                     |
//! | `Paused`  | Escape; cursor released, physics and clock stopped |
//!
//! ## Frame order (`Update`)
//!
//! ```text
//! Input → Player → Weapons → Projectiles → Effects → View
//! ```
//!
//! `Player`, `Weapons`, `Projectiles` and `Effects` only run while
//! `Playing`.  The camera follows the body inside `Player`, so shots fired
//! in `Weapons` leave from this frame's pose.  `Input` and `View` always run
//! so the snapshot reflects the pause and the viewmodel and FOV stay
//! current.

use crate::damage::DamagePlugin;
use crate::input::{capture_input_system, InputSnapshot};
use crate::particles::ImpactPlugin;
use crate::player::PlayerPlugin;
use crate::projectile::ProjectilePlugin;
use crate::weapon::WeaponPlugin;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, CursorOptions, PrimaryWindow};
use bevy_rapier3d::prelude::*;

// ── Game state ────────────────────────────────────────────────────────────────

#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameState {
    #[default]
    Playing,
    Paused,
}

/// Ordered stages of one gameplay frame.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSet {
    Input,
    Player,
    Weapons,
    Projectiles,
    Effects,
    View,
}

// ── Plugin ────────────────────────────────────────────────────────────────────

/// Registers the state machine, the frame sets, input capture and all
/// gameplay plugins.
///
/// Expects a [`crate::config::GameConfig`] resource to be inserted by the
/// caller (the binary loads it from disk; tests use the defaults).
pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .init_resource::<InputSnapshot>()
            .configure_sets(
                Update,
                (
                    FrameSet::Input,
                    FrameSet::Player,
                    FrameSet::Weapons,
                    FrameSet::Projectiles,
                    FrameSet::Effects,
                    FrameSet::View,
                )
                    .chain(),
            )
            .configure_sets(
                Update,
                (
                    FrameSet::Player,
                    FrameSet::Weapons,
                    FrameSet::Projectiles,
                    FrameSet::Effects,
                )
                    .run_if(in_state(GameState::Playing)),
            )
            .add_systems(
                Update,
                (
                    capture_input_system,
                    toggle_pause_system,
                    grab_cursor_on_click_system.run_if(in_state(GameState::Playing)),
                )
                    .chain()
                    .in_set(FrameSet::Input),
            )
            .add_systems(
                OnEnter(GameState::Paused),
                (release_cursor_system, pause_physics, pause_clock),
            )
            .add_systems(OnExit(GameState::Paused), (resume_physics, resume_clock))
            .add_plugins((
                PlayerPlugin,
                WeaponPlugin,
                ProjectilePlugin,
                ImpactPlugin,
                DamagePlugin,
            ));
    }
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Escape flips between `Playing` and `Paused`.
pub fn toggle_pause_system(
    keys: Res<ButtonInput<KeyCode>>,
    state: Res<State<GameState>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    if !keys.just_pressed(KeyCode::Escape) {
        return;
    }
    let next = match state.get() {
        GameState::Playing => GameState::Paused,
        GameState::Paused => GameState::Playing,
    };
    info!("game state {:?} → {:?}", state.get(), next);
    next_state.set(next);
}

/// Capture the pointer when the player clicks into the window.
pub fn grab_cursor_on_click_system(
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mut q_cursor: Query<&mut CursorOptions, With<PrimaryWindow>>,
) {
    if !mouse_buttons.just_pressed(MouseButton::Left) {
        return;
    }
    let Ok(mut cursor) = q_cursor.single_mut() else {
        return;
    };
    if cursor.grab_mode == CursorGrabMode::None {
        cursor.grab_mode = CursorGrabMode::Locked;
        cursor.visible = false;
        debug!("pointer locked");
    }
}

pub fn release_cursor_system(mut q_cursor: Query<&mut CursorOptions, With<PrimaryWindow>>) {
    let Ok(mut cursor) = q_cursor.single_mut() else {
        return;
    };
    cursor.grab_mode = CursorGrabMode::None;
    cursor.visible = true;
}

/// Freeze the Rapier pipeline while paused.
pub fn pause_physics(mut config: Query<&mut RapierConfiguration>) {
    for mut cfg in config.iter_mut() {
        cfg.physics_pipeline_active = false;
    }
}

pub fn resume_physics(mut config: Query<&mut RapierConfiguration>) {
    for mut cfg in config.iter_mut() {
        cfg.physics_pipeline_active = true;
    }
}

/// Stop the virtual clock so reloads, recoil and scope transitions hold
/// their progress while paused.
pub fn pause_clock(mut time: ResMut<Time<Virtual>>) {
    time.pause();
}

pub fn resume_clock(mut time: ResMut<Time<Virtual>>) {
    time.unpause();
}
