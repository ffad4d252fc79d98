//! The weapon state machine.
//!
//! [`Arsenal`] owns every weapon's mutable state (ammo, last shot) plus the
//! single transient [`WeaponAnimation`] and the orthogonal [`ScopeState`].
//! All methods take an explicit `now` (seconds) supplied by the caller's tick,
//! never a wall-clock read, so sequences of actions replay deterministically.
//!
//! ## Transitions
//!
//! ```text
//! Idle ──fire──▶ Recoil ──elapsed──▶ Idle
//!                  └──mag empty──▶ (+0.3 s) Reloading
//! Idle ──reload──▶ Reloading ──elapsed──▶ Idle   (ammo = capacity)
//! Idle ──switch──▶ Switching ──elapsed──▶ Idle
//! Unscoped ◀──toggle_scope──▶ Scoped            (scope-capable weapons only)
//! ```
//!
//! Starting Recoil, Reloading or Switching replaces whatever animation was
//! running: there is only ever one.  A switch discards reload progress.

use super::definition::{WeaponDefinition, WeaponKind, WEAPON_TABLE};
use super::scope::{ease_in_out, ScopeState};
use crate::config::GameConfig;
use crate::error::{WeaponError, WeaponResult};
use bevy::prelude::*;

/// Mutable per-weapon state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponRuntimeState {
    /// Rounds in the magazine, always `<= magazine_capacity`.
    pub ammo: u32,
    /// Time of the last successful shot.
    pub last_fired: Option<f32>,
}

/// The single transient animation of the active weapon.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum WeaponAnimation {
    #[default]
    Idle,
    Recoil {
        started: f32,
    },
    Reloading {
        kind: WeaponKind,
        started: f32,
        duration: f32,
    },
    Switching {
        from: WeaponKind,
        started: f32,
    },
}

impl WeaponAnimation {
    #[inline]
    pub fn is_reloading(&self) -> bool {
        matches!(self, WeaponAnimation::Reloading { .. })
    }

    #[inline]
    pub fn is_switching(&self) -> bool {
        matches!(self, WeaponAnimation::Switching { .. })
    }
}

/// A shot accepted by [`Arsenal::fire`]; the caller spawns the projectile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotFired {
    pub kind: WeaponKind,
    pub ammo_remaining: u32,
    /// Whether the shot was taken while scoped (narrower spread).
    pub scoped: bool,
}

/// State changes produced by [`Arsenal::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArsenalEvent {
    /// A reload began without an explicit request (magazine emptied).
    AutoReloadStarted { kind: WeaponKind },
    ReloadCompleted { kind: WeaponKind, ammo: u32 },
    SwitchCompleted { kind: WeaponKind },
}

/// Viewmodel displacement derived from the current animation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewOffset {
    /// Local-space translation added to the weapon's baseline position.
    pub translation: Vec3,
    /// Rotation about the local X axis (rad); positive tips the muzzle up.
    pub pitch: f32,
}

impl ViewOffset {
    pub const ZERO: Self = Self {
        translation: Vec3::ZERO,
        pitch: 0.0,
    };

    /// Apply this offset to a baseline transform.
    pub fn apply(&self, baseline: &Transform) -> Transform {
        let mut t = *baseline;
        t.translation += self.translation;
        t.rotation = baseline.rotation * Quat::from_rotation_x(self.pitch);
        t
    }
}

/// Timings the state machine needs from [`GameConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArsenalTiming {
    pub recoil_duration: f32,
    pub switch_duration: f32,
    pub auto_reload_delay: f32,
    pub scope_transition: f32,
    pub hip_fov: f32,
}

impl From<&GameConfig> for ArsenalTiming {
    fn from(config: &GameConfig) -> Self {
        Self {
            recoil_duration: config.recoil_duration,
            switch_duration: config.switch_duration,
            auto_reload_delay: config.auto_reload_delay,
            scope_transition: config.scope_transition,
            hip_fov: config.hip_fov_degrees,
        }
    }
}

/// All weapons carried by the player.
#[derive(Resource, Debug, Clone)]
pub struct Arsenal {
    definitions: [WeaponDefinition; WeaponKind::COUNT],
    runtime: [WeaponRuntimeState; WeaponKind::COUNT],
    active: WeaponKind,
    animation: WeaponAnimation,
    scope: ScopeState,
    /// When set, a reload of the active weapon starts at this time.
    auto_reload_at: Option<f32>,
    timing: ArsenalTiming,
}

impl Default for Arsenal {
    fn default() -> Self {
        Self::new(&GameConfig::default())
    }
}

impl Arsenal {
    /// Full magazines for every weapon in [`WEAPON_TABLE`], pistol active.
    pub fn new(config: &GameConfig) -> Self {
        Self::with_definitions(WEAPON_TABLE, ArsenalTiming::from(config))
    }

    /// Build from an explicit definition table (one row per kind, in index order).
    pub fn with_definitions(
        definitions: [WeaponDefinition; WeaponKind::COUNT],
        timing: ArsenalTiming,
    ) -> Self {
        let runtime = definitions.map(|d| WeaponRuntimeState {
            ammo: d.magazine_capacity,
            last_fired: None,
        });
        Self {
            definitions,
            runtime,
            active: WeaponKind::default(),
            animation: WeaponAnimation::Idle,
            scope: ScopeState::new(timing.hip_fov),
            auto_reload_at: None,
            timing,
        }
    }

    /// Replace one weapon's magazine contents, clamped to capacity.
    pub fn with_ammo(mut self, kind: WeaponKind, ammo: u32) -> Self {
        let capacity = self.definitions[kind.index()].magazine_capacity;
        self.runtime[kind.index()].ammo = ammo.min(capacity);
        self
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    #[inline]
    pub fn active(&self) -> WeaponKind {
        self.active
    }

    #[inline]
    pub fn definition(&self, kind: WeaponKind) -> &WeaponDefinition {
        &self.definitions[kind.index()]
    }

    #[inline]
    pub fn active_definition(&self) -> &WeaponDefinition {
        self.definition(self.active)
    }

    #[inline]
    pub fn runtime(&self, kind: WeaponKind) -> &WeaponRuntimeState {
        &self.runtime[kind.index()]
    }

    #[inline]
    pub fn ammo(&self, kind: WeaponKind) -> u32 {
        self.runtime[kind.index()].ammo
    }

    #[inline]
    pub fn animation(&self) -> WeaponAnimation {
        self.animation
    }

    #[inline]
    pub fn scope(&self) -> &ScopeState {
        &self.scope
    }

    #[inline]
    pub fn timing(&self) -> &ArsenalTiming {
        &self.timing
    }

    /// Whether an automatic reload is queued.
    #[inline]
    pub fn auto_reload_pending(&self) -> bool {
        self.auto_reload_at.is_some()
    }

    /// Current camera FOV in degrees.
    pub fn fov(&self, now: f32) -> f32 {
        self.scope.fov(now, self.timing.scope_transition)
    }

    // ── Actions ───────────────────────────────────────────────────────────────

    /// Pull the trigger of the active weapon.
    pub fn fire(&mut self, now: f32) -> WeaponResult<ShotFired> {
        match self.animation {
            WeaponAnimation::Reloading { kind, .. } => {
                return Err(WeaponError::Reloading { kind });
            }
            WeaponAnimation::Switching { .. } => {
                return Err(WeaponError::Switching { to: self.active });
            }
            WeaponAnimation::Idle | WeaponAnimation::Recoil { .. } => {}
        }

        let kind = self.active;
        let def = self.definitions[kind.index()];
        let state = &mut self.runtime[kind.index()];

        if let Some(last) = state.last_fired {
            let since = now - last;
            if since < def.fire_interval {
                return Err(WeaponError::Cooldown {
                    remaining: def.fire_interval - since,
                });
            }
        }

        if state.ammo == 0 {
            self.begin_reload(now);
            return Err(WeaponError::OutOfAmmo { kind });
        }

        state.ammo -= 1;
        state.last_fired = Some(now);
        let ammo_remaining = state.ammo;

        self.animation = WeaponAnimation::Recoil { started: now };
        if ammo_remaining == 0 {
            self.auto_reload_at = Some(now + self.timing.auto_reload_delay);
        }

        Ok(ShotFired {
            kind,
            ammo_remaining,
            scoped: self.scope.is_scoped(),
        })
    }

    /// Start reloading the active weapon.
    pub fn start_reload(&mut self, now: f32) -> WeaponResult<()> {
        let kind = self.active;
        if self.animation.is_reloading() {
            return Err(WeaponError::AlreadyReloading { kind });
        }
        if self.ammo(kind) >= self.definition(kind).magazine_capacity {
            return Err(WeaponError::MagazineFull { kind });
        }
        self.begin_reload(now);
        Ok(())
    }

    /// Make `kind` the active weapon.
    ///
    /// Any reload or switch in progress is dropped on the spot: reload
    /// progress is lost and the magazine keeps its pre-reload count.
    pub fn switch_to(&mut self, kind: WeaponKind, now: f32) -> WeaponResult<()> {
        if kind == self.active {
            return Err(WeaponError::AlreadyActive { kind });
        }
        self.cancel();
        self.auto_reload_at = None;
        if self.scope.is_scoped() {
            self.scope
                .release(self.timing.hip_fov, now, self.timing.scope_transition);
        }
        let from = self.active;
        self.active = kind;
        self.animation = WeaponAnimation::Switching { from, started: now };
        Ok(())
    }

    /// Enter or leave the scoped view.
    ///
    /// Returns `Ok(false)` when the requested state is already the current
    /// one, `Ok(true)` when a transition started.
    pub fn toggle_scope(&mut self, active: bool, now: f32) -> WeaponResult<bool> {
        if active == self.scope.is_scoped() {
            return Ok(false);
        }
        let transition = self.timing.scope_transition;
        if active {
            let Some(fov) = self.active_definition().scope_fov_degrees else {
                return Err(WeaponError::ScopeUnavailable { kind: self.active });
            };
            self.scope.engage(fov, now, transition);
        } else {
            self.scope.release(self.timing.hip_fov, now, transition);
        }
        Ok(true)
    }

    /// Drop the running animation and return to `Idle`.
    ///
    /// The viewmodel pose is recomputed from the baseline every frame, so
    /// returning to `Idle` restores it exactly.  Returns the cancelled
    /// animation (`Idle` if nothing was running).
    pub fn cancel(&mut self) -> WeaponAnimation {
        std::mem::take(&mut self.animation)
    }

    /// Advance the breathing sway.
    pub fn advance_sway(&mut self, delta: f32, rate: f32) {
        self.scope.advance_sway(delta, rate);
    }

    /// Complete elapsed animations and start any due auto-reload.
    pub fn tick(&mut self, now: f32) -> Vec<ArsenalEvent> {
        let mut events = Vec::new();

        match self.animation {
            WeaponAnimation::Recoil { started }
                if now - started >= self.timing.recoil_duration =>
            {
                self.animation = WeaponAnimation::Idle;
            }
            WeaponAnimation::Reloading {
                kind,
                started,
                duration,
            } if now - started >= duration => {
                let capacity = self.definitions[kind.index()].magazine_capacity;
                self.runtime[kind.index()].ammo = capacity;
                self.animation = WeaponAnimation::Idle;
                events.push(ArsenalEvent::ReloadCompleted {
                    kind,
                    ammo: capacity,
                });
            }
            WeaponAnimation::Switching { started, .. }
                if now - started >= self.timing.switch_duration =>
            {
                self.animation = WeaponAnimation::Idle;
                events.push(ArsenalEvent::SwitchCompleted { kind: self.active });
            }
            _ => {}
        }

        if let Some(due) = self.auto_reload_at {
            if now >= due {
                self.auto_reload_at = None;
                let kind = self.active;
                let needs_ammo = self.ammo(kind) < self.definition(kind).magazine_capacity;
                if needs_ammo && !self.animation.is_reloading() {
                    self.begin_reload(now);
                    events.push(ArsenalEvent::AutoReloadStarted { kind });
                }
            }
        }

        events
    }

    /// Viewmodel displacement for the current animation at `now`.
    ///
    /// Exactly [`ViewOffset::ZERO`] when idle or once the animation's
    /// duration has elapsed, so the model always lands back on its baseline.
    pub fn view_offset(&self, now: f32) -> ViewOffset {
        match self.animation {
            WeaponAnimation::Idle => ViewOffset::ZERO,
            WeaponAnimation::Recoil { started } => {
                let Some(t) = progress(now - started, self.timing.recoil_duration) else {
                    return ViewOffset::ZERO;
                };
                let kick = self.active_definition().recoil_kick * (1.0 - t).powi(2);
                ViewOffset {
                    translation: Vec3::new(0.0, 0.0, kick),
                    pitch: kick * 2.0,
                }
            }
            WeaponAnimation::Reloading {
                started, duration, ..
            } => {
                let Some(t) = progress(now - started, duration) else {
                    return ViewOffset::ZERO;
                };
                let dip = (t * std::f32::consts::PI).sin();
                ViewOffset {
                    translation: Vec3::new(0.0, -0.25 * dip, 0.0),
                    pitch: -0.6 * dip,
                }
            }
            WeaponAnimation::Switching { started, .. } => {
                let Some(t) = progress(now - started, self.timing.switch_duration) else {
                    return ViewOffset::ZERO;
                };
                let lowered = 1.0 - ease_in_out(t);
                ViewOffset {
                    translation: Vec3::new(0.0, -0.3 * lowered, 0.0),
                    pitch: -0.4 * lowered,
                }
            }
        }
    }

    fn begin_reload(&mut self, now: f32) {
        let kind = self.active;
        self.auto_reload_at = None;
        self.animation = WeaponAnimation::Reloading {
            kind,
            started: now,
            duration: self.definitions[kind.index()].reload_duration,
        };
    }
}

/// Fraction of `duration` covered by `elapsed`, or `None` once complete.
fn progress(elapsed: f32, duration: f32) -> Option<f32> {
    if duration <= 0.0 || elapsed >= duration {
        None
    } else {
        Some((elapsed / duration).max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arsenal() -> Arsenal {
        Arsenal::default()
    }

    // ── fire ──────────────────────────────────────────────────────────────────

    #[test]
    fn fire_respects_interval() {
        // Pistol: capacity 20, 250 ms interval.
        let mut a = arsenal();
        assert_eq!(a.fire(0.0).unwrap().ammo_remaining, 19);
        assert!(matches!(a.fire(0.1), Err(WeaponError::Cooldown { .. })));
        assert_eq!(a.ammo(WeaponKind::Pistol), 19);
        assert_eq!(
            a.runtime(WeaponKind::Pistol).last_fired,
            Some(0.0),
            "a rejected shot keeps the last shot time"
        );
        assert_eq!(a.fire(0.26).unwrap().ammo_remaining, 18);
        assert_eq!(a.runtime(WeaponKind::Pistol).last_fired, Some(0.26));
        assert_eq!(a.runtime(WeaponKind::Rifle).last_fired, None);
    }

    #[test]
    fn fire_starts_recoil() {
        let mut a = arsenal();
        a.fire(1.0).unwrap();
        assert_eq!(a.animation(), WeaponAnimation::Recoil { started: 1.0 });
        a.tick(1.0 + a.timing().recoil_duration);
        assert_eq!(a.animation(), WeaponAnimation::Idle);
    }

    #[test]
    fn empty_magazine_rejects_and_starts_reload() {
        let mut a = arsenal().with_ammo(WeaponKind::Pistol, 0);
        let err = a.fire(0.0).unwrap_err();
        assert_eq!(
            err,
            WeaponError::OutOfAmmo {
                kind: WeaponKind::Pistol
            }
        );
        assert!(a.animation().is_reloading());
        assert_eq!(a.ammo(WeaponKind::Pistol), 0);
    }

    #[test]
    fn fire_rejected_while_reloading() {
        let mut a = arsenal().with_ammo(WeaponKind::Pistol, 3);
        a.start_reload(0.0).unwrap();
        assert!(matches!(a.fire(0.5), Err(WeaponError::Reloading { .. })));
        assert_eq!(a.ammo(WeaponKind::Pistol), 3);
    }

    #[test]
    fn fire_rejected_while_switching() {
        let mut a = arsenal();
        a.switch_to(WeaponKind::Rifle, 0.0).unwrap();
        assert!(matches!(a.fire(0.1), Err(WeaponError::Switching { .. })));
        assert_eq!(a.ammo(WeaponKind::Rifle), 40);
    }

    #[test]
    fn last_round_schedules_auto_reload() {
        let mut a = arsenal().with_ammo(WeaponKind::Pistol, 1);
        a.fire(0.0).unwrap();
        assert_eq!(a.ammo(WeaponKind::Pistol), 0);
        assert!(a.auto_reload_pending());

        assert!(a.tick(0.2).is_empty(), "reload must wait for the grace period");
        let events = a.tick(0.3);
        assert_eq!(
            events,
            vec![ArsenalEvent::AutoReloadStarted {
                kind: WeaponKind::Pistol
            }]
        );
        let events = a.tick(0.3 + 1.5);
        assert_eq!(
            events,
            vec![ArsenalEvent::ReloadCompleted {
                kind: WeaponKind::Pistol,
                ammo: 20
            }]
        );
        assert_eq!(a.ammo(WeaponKind::Pistol), 20);
    }

    // ── reload ────────────────────────────────────────────────────────────────

    #[test]
    fn reload_twice_is_rejected_without_side_effects() {
        let mut a = arsenal().with_ammo(WeaponKind::Pistol, 7);
        a.start_reload(0.0).unwrap();
        let before = a.animation();
        assert_eq!(
            a.start_reload(0.5),
            Err(WeaponError::AlreadyReloading {
                kind: WeaponKind::Pistol
            })
        );
        assert_eq!(a.animation(), before, "second reload must not restart the timer");
        assert_eq!(a.ammo(WeaponKind::Pistol), 7);
    }

    #[test]
    fn reload_with_full_magazine_is_rejected() {
        let mut a = arsenal();
        assert!(matches!(a.start_reload(0.0), Err(WeaponError::MagazineFull { .. })));
        assert_eq!(a.animation(), WeaponAnimation::Idle);
    }

    #[test]
    fn reload_not_complete_before_duration() {
        let mut a = arsenal().with_ammo(WeaponKind::Pistol, 2);
        a.start_reload(0.0).unwrap();
        assert!(a.tick(1.49).is_empty());
        assert_eq!(a.ammo(WeaponKind::Pistol), 2);
        a.tick(1.5);
        assert_eq!(a.ammo(WeaponKind::Pistol), 20);
    }

    #[test]
    fn reload_cancels_recoil() {
        let mut a = arsenal();
        a.fire(0.0).unwrap();
        a.start_reload(0.01).unwrap();
        assert!(a.animation().is_reloading());
    }

    // ── switch ────────────────────────────────────────────────────────────────

    #[test]
    fn switch_to_active_weapon_is_rejected() {
        let mut a = arsenal();
        assert_eq!(
            a.switch_to(WeaponKind::Pistol, 0.0),
            Err(WeaponError::AlreadyActive {
                kind: WeaponKind::Pistol
            })
        );
        assert_eq!(a.animation(), WeaponAnimation::Idle);
    }

    #[test]
    fn switch_discards_reload_progress() {
        let mut a = arsenal().with_ammo(WeaponKind::Pistol, 4);
        a.start_reload(0.0).unwrap();
        a.switch_to(WeaponKind::Rifle, 1.0).unwrap();
        assert!(a.animation().is_switching());
        // Long after the pistol reload would have finished.
        a.tick(10.0);
        assert_eq!(a.ammo(WeaponKind::Pistol), 4);
        assert_eq!(a.active(), WeaponKind::Rifle);
    }

    #[test]
    fn switch_drops_pending_auto_reload() {
        let mut a = arsenal().with_ammo(WeaponKind::Pistol, 1);
        a.fire(0.0).unwrap();
        a.switch_to(WeaponKind::Rifle, 0.1).unwrap();
        assert!(!a.auto_reload_pending());
        let events = a.tick(1.0);
        assert_eq!(
            events,
            vec![ArsenalEvent::SwitchCompleted {
                kind: WeaponKind::Rifle
            }]
        );
        assert!(!a.animation().is_reloading());
    }

    #[test]
    fn switch_tears_down_scope() {
        let mut a = arsenal();
        a.switch_to(WeaponKind::Sniper, 0.0).unwrap();
        a.tick(1.0);
        assert!(a.toggle_scope(true, 1.0).unwrap());
        a.switch_to(WeaponKind::Pistol, 2.0).unwrap();
        assert!(!a.scope().is_scoped());
        assert_eq!(a.fov(3.0), a.timing().hip_fov);
    }

    // ── scope ─────────────────────────────────────────────────────────────────

    #[test]
    fn scope_requires_capable_weapon() {
        let mut a = arsenal();
        assert_eq!(
            a.toggle_scope(true, 0.0),
            Err(WeaponError::ScopeUnavailable {
                kind: WeaponKind::Pistol
            })
        );
        // Releasing an unscoped pistol is a plain no-op.
        assert_eq!(a.toggle_scope(false, 0.0), Ok(false));
    }

    #[test]
    fn scope_shots_report_scoped() {
        let mut a = arsenal();
        a.switch_to(WeaponKind::Sniper, 0.0).unwrap();
        a.tick(1.0);
        a.toggle_scope(true, 1.0).unwrap();
        assert!(a.fire(2.0).unwrap().scoped);
    }

    // ── view offset ───────────────────────────────────────────────────────────

    #[test]
    fn view_offset_returns_to_baseline_after_reload() {
        let mut a = arsenal().with_ammo(WeaponKind::Pistol, 0);
        a.start_reload(0.0).unwrap();
        assert_ne!(a.view_offset(0.75), ViewOffset::ZERO);
        assert_eq!(a.view_offset(1.5), ViewOffset::ZERO);
        a.tick(1.5);
        assert_eq!(a.view_offset(1.5), ViewOffset::ZERO);
    }

    #[test]
    fn cancel_returns_previous_animation() {
        let mut a = arsenal();
        a.fire(0.0).unwrap();
        assert_eq!(a.cancel(), WeaponAnimation::Recoil { started: 0.0 });
        assert_eq!(a.cancel(), WeaponAnimation::Idle);
        assert_eq!(a.view_offset(0.01), ViewOffset::ZERO);
    }

    #[test]
    fn apply_offset_to_baseline_is_identity_when_zero() {
        let base = Transform::from_xyz(0.3, -0.25, -0.6);
        assert_eq!(ViewOffset::ZERO.apply(&base), base);
    }
}
