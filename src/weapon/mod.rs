//! Weapons: static registry, the arsenal state machine, scope, and the Bevy
//! systems that drive them.
//!
//! ## Sub-module layout
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`definition`] | `WeaponKind`, `WeaponDefinition`, `WEAPON_TABLE` |
//! | [`arsenal`] | `Arsenal`: ammo, cooldowns, recoil/reload/switch animation |
//! | [`scope`] | Scoped FOV transition and breathing sway |
//! | [`systems`] | Input binding, action application, tick, viewmodel, FOV, pause teardown |

pub mod arsenal;
pub mod definition;
pub mod scope;
pub mod systems;

// ── Flat re-exports ───────────────────────────────────────────────────────────

pub use arsenal::{
    Arsenal, ArsenalEvent, ArsenalTiming, ShotFired, ViewOffset, WeaponAnimation,
    WeaponRuntimeState,
};
pub use definition::{WeaponDefinition, WeaponKind, WEAPON_TABLE};
pub use scope::{ease_in_out, ScopeState};
pub use systems::{
    apply_weapon_actions_system, bind_weapon_actions_system, camera_fov_system,
    release_scope_on_pause, setup_arsenal, weapon_model_system, weapon_tick_system, AmmoChanged,
    WeaponAction, WeaponModel,
};

use crate::game::{FrameSet, GameState};
use bevy::prelude::*;

pub struct WeaponPlugin;

impl Plugin for WeaponPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<WeaponAction>()
            .add_message::<AmmoChanged>()
            .add_systems(Startup, setup_arsenal)
            .add_systems(OnEnter(GameState::Paused), release_scope_on_pause)
            .add_systems(
                Update,
                (
                    bind_weapon_actions_system,
                    apply_weapon_actions_system,
                    weapon_tick_system,
                )
                    .chain()
                    .in_set(FrameSet::Weapons),
            )
            .add_systems(
                Update,
                (weapon_model_system, camera_fov_system).in_set(FrameSet::View),
            );
    }
}
