//! Bevy glue around the [`Arsenal`] state machine.
//!
//! | System                          | Set       | Purpose                                          |
//! |---------------------------------|-----------|--------------------------------------------------|
//! | `bind_weapon_actions_system`    | `Weapons` | `InputSnapshot` → `WeaponAction` messages         |
//! | `apply_weapon_actions_system`   | `Weapons` | Run actions on the arsenal, spawn projectiles     |
//! | `weapon_tick_system`            | `Weapons` | Finish animations, auto-reload, advance sway      |
//! | `weapon_model_system`           | `View`    | Pose and show/hide the viewmodels                 |
//! | `camera_fov_system`             | `View`    | Drive the camera FOV from the scope transition    |
//! | `release_scope_on_pause`        | `OnEnter(Paused)` | Leave the scope; its release edge is lost while paused |
//!
//! Rejected actions are logged at `debug` level and otherwise ignored; the
//! arsenal is unchanged by a rejection.

use super::arsenal::{Arsenal, ArsenalEvent};
use super::definition::WeaponKind;
use crate::config::GameConfig;
use crate::error::WeaponError;
use crate::input::InputSnapshot;
use crate::player::PlayerCamera;
use crate::projectile::spawn_projectile;
use bevy::prelude::*;

// ── Messages & components ─────────────────────────────────────────────────────

/// A request against the arsenal, decoupled from the device that produced it.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub enum WeaponAction {
    Fire,
    Reload,
    Switch(WeaponKind),
    /// `true` to enter the scope, `false` to leave it.
    Scope(bool),
}

/// Magazine contents changed (shot, reload completed, weapon switched).
#[derive(Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmmoChanged {
    pub kind: WeaponKind,
    pub ammo: u32,
    pub capacity: u32,
}

/// First-person model of one weapon, parented to the camera.
#[derive(Component, Debug, Clone, Copy)]
pub struct WeaponModel {
    pub kind: WeaponKind,
    /// Resting pose relative to the camera.
    pub baseline: Transform,
}

// ── Startup ───────────────────────────────────────────────────────────────────

/// Insert the [`Arsenal`] built from the loaded config, unless one exists.
pub fn setup_arsenal(
    mut commands: Commands,
    config: Res<GameConfig>,
    existing: Option<Res<Arsenal>>,
) {
    if existing.is_some() {
        return;
    }
    let arsenal = Arsenal::new(&config);
    info!(
        "arsenal ready: {} ({} rounds)",
        arsenal.active().name(),
        arsenal.ammo(arsenal.active())
    );
    commands.insert_resource(arsenal);
}

// ── Update systems ────────────────────────────────────────────────────────────

/// Translate this frame's input into [`WeaponAction`]s.
///
/// Automatic weapons fire while the trigger is held; the others fire once
/// per press.
pub fn bind_weapon_actions_system(
    input: Res<InputSnapshot>,
    arsenal: Res<Arsenal>,
    mut actions: MessageWriter<WeaponAction>,
) {
    if !input.live() {
        return;
    }
    if let Some(kind) = input.switch_to {
        actions.write(WeaponAction::Switch(kind));
    }
    if input.reload_pressed {
        actions.write(WeaponAction::Reload);
    }
    if input.scope_pressed {
        actions.write(WeaponAction::Scope(true));
    }
    if input.scope_released {
        actions.write(WeaponAction::Scope(false));
    }
    let trigger = if arsenal.active_definition().automatic {
        input.fire_held
    } else {
        input.fire_pressed
    };
    if trigger {
        actions.write(WeaponAction::Fire);
    }
}

/// Apply queued [`WeaponAction`]s in order.
///
/// A successful shot spawns a projectile from the camera pose.  Actions are
/// dropped while there is no camera to shoot from.
pub fn apply_weapon_actions_system(
    mut commands: Commands,
    mut actions: MessageReader<WeaponAction>,
    mut arsenal: ResMut<Arsenal>,
    mut ammo_changed: MessageWriter<AmmoChanged>,
    time: Res<Time>,
    config: Res<GameConfig>,
    q_camera: Query<&Transform, With<PlayerCamera>>,
) {
    let Ok(camera) = q_camera.single() else {
        actions.clear();
        return;
    };
    let now = time.elapsed_secs();

    for action in actions.read() {
        let result = match *action {
            WeaponAction::Fire => arsenal.fire(now).map(|shot| {
                let def = *arsenal.definition(shot.kind);
                spawn_projectile(&mut commands, &def, camera, shot.scoped, &config);
                ammo_changed.write(AmmoChanged {
                    kind: shot.kind,
                    ammo: shot.ammo_remaining,
                    capacity: def.magazine_capacity,
                });
            }),
            WeaponAction::Reload => arsenal.start_reload(now).map(|()| {
                info!("reloading {}", arsenal.active().name());
            }),
            WeaponAction::Switch(kind) => arsenal.switch_to(kind, now).map(|()| {
                info!("switched to {}", kind.name());
                ammo_changed.write(AmmoChanged {
                    kind,
                    ammo: arsenal.ammo(kind),
                    capacity: arsenal.definition(kind).magazine_capacity,
                });
            }),
            WeaponAction::Scope(active) => arsenal.toggle_scope(active, now).map(|changed| {
                if changed {
                    debug!("scope {}", if active { "engaged" } else { "released" });
                }
            }),
        };

        match result {
            Ok(()) => {}
            Err(e @ WeaponError::OutOfAmmo { .. }) => info!("{e}; reloading"),
            Err(e) => debug!("{action:?} rejected: {e}"),
        }
    }
}

/// Complete elapsed animations, start due auto-reloads, and breathe.
pub fn weapon_tick_system(
    mut arsenal: ResMut<Arsenal>,
    mut ammo_changed: MessageWriter<AmmoChanged>,
    time: Res<Time>,
    config: Res<GameConfig>,
) {
    arsenal.advance_sway(time.delta_secs(), config.scope_sway_rate);

    for event in arsenal.tick(time.elapsed_secs()) {
        match event {
            ArsenalEvent::AutoReloadStarted { kind } => {
                info!("{} magazine empty; auto-reloading", kind.name());
            }
            ArsenalEvent::ReloadCompleted { kind, ammo } => {
                info!("{} reloaded ({ammo} rounds)", kind.name());
                ammo_changed.write(AmmoChanged {
                    kind,
                    ammo,
                    capacity: arsenal.definition(kind).magazine_capacity,
                });
            }
            ArsenalEvent::SwitchCompleted { kind } => {
                debug!("{} ready", kind.name());
            }
        }
    }
}

/// Leave the scope when the game pauses.
///
/// Weapon bindings don't run while paused, so a right-button release during
/// the pause would otherwise never reach the arsenal.
pub fn release_scope_on_pause(arsenal: Option<ResMut<Arsenal>>, time: Res<Time>) {
    let Some(mut arsenal) = arsenal else {
        return;
    };
    if let Ok(true) = arsenal.toggle_scope(false, time.elapsed_secs()) {
        debug!("scope released on pause");
    }
}

/// Show only the active weapon's model (hidden while scoped) and pose it
/// from its baseline plus the current animation offset.
pub fn weapon_model_system(
    arsenal: Res<Arsenal>,
    time: Res<Time>,
    mut q_models: Query<(&WeaponModel, &mut Transform, &mut Visibility)>,
) {
    let now = time.elapsed_secs();
    let offset = arsenal.view_offset(now);
    let scoped = arsenal.scope().is_scoped();

    for (model, mut transform, mut visibility) in q_models.iter_mut() {
        let active = model.kind == arsenal.active();
        *visibility = if active && !scoped {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        *transform = if active {
            offset.apply(&model.baseline)
        } else {
            model.baseline
        };
    }
}

/// Write the arsenal's (possibly transitioning) FOV into the camera.
pub fn camera_fov_system(
    arsenal: Res<Arsenal>,
    time: Res<Time>,
    mut q_camera: Query<&mut Projection, With<PlayerCamera>>,
) {
    let Ok(mut projection) = q_camera.single_mut() else {
        return;
    };
    let fov = arsenal.fov(time.elapsed_secs()).to_radians();
    if let Projection::Perspective(perspective) = &mut *projection {
        if (perspective.fov - fov).abs() > f32::EPSILON {
            perspective.fov = fov;
        }
    }
}
