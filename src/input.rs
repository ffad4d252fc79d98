//! Input capture: raw keyboard/mouse state → [`InputSnapshot`].
//!
//! The snapshot is rebuilt at the start of every frame and is the *only*
//! input the player controller and the weapon bindings read.  Tests populate
//! it directly instead of simulating devices.
//!
//! | Input            | Field                                    |
//! |------------------|------------------------------------------|
//! | W / A / S / D    | `forward` / `left` / `back` / `right`     |
//! | Shift            | `sprint`                                 |
//! | Space            | `jump`                                   |
//! | Left mouse       | `fire_held`, `fire_pressed`              |
//! | Right mouse      | `scope_pressed`, `scope_released`        |
//! | R                | `reload_pressed`                         |
//! | 1 – 4            | `switch_to`                              |
//! | Mouse motion     | `look_delta` (only while pointer-locked) |

use crate::game::GameState;
use crate::weapon::WeaponKind;
use bevy::input::mouse::AccumulatedMouseMotion;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, CursorOptions, PrimaryWindow};

/// Number keys mapped to weapon slots.
pub const SLOT_KEYS: [(KeyCode, WeaponKind); WeaponKind::COUNT] = [
    (KeyCode::Digit1, WeaponKind::Pistol),
    (KeyCode::Digit2, WeaponKind::Rifle),
    (KeyCode::Digit3, WeaponKind::Sniper),
    (KeyCode::Digit4, WeaponKind::Lobber),
];

/// Everything the simulation needs to know about input for one frame.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct InputSnapshot {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub sprint: bool,
    pub jump: bool,
    /// Mouse motion this frame (pixels); zero unless pointer-locked.
    pub look_delta: Vec2,
    /// Fire button is down.
    pub fire_held: bool,
    /// Fire button went down this frame.
    pub fire_pressed: bool,
    pub scope_pressed: bool,
    pub scope_released: bool,
    pub reload_pressed: bool,
    /// Weapon slot key pressed this frame.
    pub switch_to: Option<WeaponKind>,
    /// The cursor is captured and mouse motion drives the view.
    pub pointer_locked: bool,
    pub paused: bool,
}

impl InputSnapshot {
    /// Whether gameplay input should be acted upon this frame.
    #[inline]
    pub fn live(&self) -> bool {
        self.pointer_locked && !self.paused
    }
}

/// Rebuild [`InputSnapshot`] from the device resources.
pub fn capture_input_system(
    keys: Res<ButtonInput<KeyCode>>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    motion: Option<Res<AccumulatedMouseMotion>>,
    q_cursor: Query<&CursorOptions, With<PrimaryWindow>>,
    state: Res<State<GameState>>,
    mut snapshot: ResMut<InputSnapshot>,
) {
    let pointer_locked = q_cursor
        .single()
        .map(|cursor| cursor.grab_mode != CursorGrabMode::None)
        .unwrap_or(false);

    *snapshot = InputSnapshot {
        forward: keys.pressed(KeyCode::KeyW),
        back: keys.pressed(KeyCode::KeyS),
        left: keys.pressed(KeyCode::KeyA),
        right: keys.pressed(KeyCode::KeyD),
        sprint: keys.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]),
        jump: keys.pressed(KeyCode::Space),
        look_delta: if pointer_locked {
            motion.map(|m| m.delta).unwrap_or(Vec2::ZERO)
        } else {
            Vec2::ZERO
        },
        fire_held: mouse_buttons.pressed(MouseButton::Left),
        fire_pressed: mouse_buttons.just_pressed(MouseButton::Left),
        scope_pressed: mouse_buttons.just_pressed(MouseButton::Right),
        scope_released: mouse_buttons.just_released(MouseButton::Right),
        reload_pressed: keys.just_pressed(KeyCode::KeyR),
        switch_to: SLOT_KEYS
            .iter()
            .find(|(key, _)| keys.just_pressed(*key))
            .map(|(_, kind)| *kind),
        pointer_locked,
        paused: *state.get() == GameState::Paused,
    };
}
