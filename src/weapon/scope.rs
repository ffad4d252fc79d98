//! Scope state: eased field-of-view interpolation and breathing sway.
//!
//! The sway is an *additive* yaw/pitch offset applied on top of the player's
//! look angles when the camera is positioned, so releasing the scope restores
//! the pre-scope orientation exactly: the offset simply drops back to zero.

use bevy::prelude::*;

/// Smoothstep easing on `t ∈ [0, 1]`.
#[inline]
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScopeState {
    scoped: bool,
    /// FOV (degrees) at the start of the current transition.
    from_fov: f32,
    /// FOV (degrees) the current transition is heading to.
    to_fov: f32,
    /// Time the current transition started; `None` when settled.
    started: Option<f32>,
    /// Breathing phase (rad); advances only while scoped.
    sway_phase: f32,
}

impl ScopeState {
    pub fn new(hip_fov: f32) -> Self {
        Self {
            scoped: false,
            from_fov: hip_fov,
            to_fov: hip_fov,
            started: None,
            sway_phase: 0.0,
        }
    }

    #[inline]
    pub fn is_scoped(&self) -> bool {
        self.scoped
    }

    /// Current FOV in degrees at time `now`.
    pub fn fov(&self, now: f32, transition: f32) -> f32 {
        let Some(started) = self.started else {
            return self.to_fov;
        };
        let t = if transition > 0.0 {
            (now - started) / transition
        } else {
            1.0
        };
        if t >= 1.0 {
            return self.to_fov;
        }
        self.from_fov + (self.to_fov - self.from_fov) * ease_in_out(t)
    }

    /// Begin narrowing towards `scope_fov`.  Starts from wherever the FOV
    /// currently is, so a quick release/re-press doesn't snap.
    pub fn engage(&mut self, scope_fov: f32, now: f32, transition: f32) {
        self.from_fov = self.fov(now, transition);
        self.to_fov = scope_fov;
        self.started = Some(now);
        self.scoped = true;
        self.sway_phase = 0.0;
    }

    /// Begin widening back to `hip_fov` and stop the sway.
    pub fn release(&mut self, hip_fov: f32, now: f32, transition: f32) {
        self.from_fov = self.fov(now, transition);
        self.to_fov = hip_fov;
        self.started = Some(now);
        self.scoped = false;
        self.sway_phase = 0.0;
    }

    /// Advance the breathing phase.  No-op while unscoped.
    pub fn advance_sway(&mut self, delta: f32, rate: f32) {
        if self.scoped {
            self.sway_phase = (self.sway_phase + delta * rate) % std::f32::consts::TAU;
        }
    }

    /// Additive (yaw, pitch) view offset in radians.  Zero while unscoped.
    ///
    /// Pitch runs at twice the yaw frequency, tracing a slow figure-eight.
    pub fn sway(&self, amplitude: f32) -> Vec2 {
        if !self.scoped {
            return Vec2::ZERO;
        }
        Vec2::new(
            self.sway_phase.sin() * amplitude,
            (self.sway_phase * 2.0).sin() * amplitude * 0.5,
        )
    }
}
