//! Error types for weapon actions and configuration.
//!
//! Weapon operations never panic and never half-apply: a rejected action
//! returns one of the [`WeaponError`] reasons below and leaves the
//! [`crate::weapon::Arsenal`] untouched (the one exception is
//! [`WeaponError::OutOfAmmo`], which reports that a reload was started in
//! place of the shot).  Systems log the reason and move on to the next frame.
//!
//! ## Usage
//!
//! ```rust,ignore
//! match arsenal.fire(now) {
//!     Ok(shot) => spawn_projectile(&mut commands, shot),
//!     Err(WeaponError::Cooldown { .. }) => {}
//!     Err(e) => debug!("fire rejected: {e}"),
//! }
//! ```

use crate::weapon::WeaponKind;
use std::fmt;

/// Reason a weapon action was rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeaponError {
    /// The fire interval since the last successful shot has not elapsed.
    Cooldown {
        /// Seconds until the weapon may fire again.
        remaining: f32,
    },

    /// The magazine is empty.  A reload has been started instead of the shot.
    OutOfAmmo { kind: WeaponKind },

    /// A reload animation is in progress.
    Reloading { kind: WeaponKind },

    /// A weapon switch animation is in progress.
    Switching { to: WeaponKind },

    /// `start_reload` was called while already reloading.
    AlreadyReloading { kind: WeaponKind },

    /// `start_reload` was called with a full magazine.
    MagazineFull { kind: WeaponKind },

    /// `switch_to` named the weapon that is already active.
    AlreadyActive { kind: WeaponKind },

    /// The active weapon has no scope.
    ScopeUnavailable { kind: WeaponKind },
}

impl fmt::Display for WeaponError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeaponError::Cooldown { remaining } => {
                write!(f, "weapon cooling down ({:.0} ms left)", remaining * 1000.0)
            }
            WeaponError::OutOfAmmo { kind } => {
                write!(f, "{} is empty; reloading", kind.name())
            }
            WeaponError::Reloading { kind } => write!(f, "{} is reloading", kind.name()),
            WeaponError::Switching { to } => write!(f, "switching to {}", to.name()),
            WeaponError::AlreadyReloading { kind } => {
                write!(f, "{} is already reloading", kind.name())
            }
            WeaponError::MagazineFull { kind } => {
                write!(f, "{} magazine is already full", kind.name())
            }
            WeaponError::AlreadyActive { kind } => {
                write!(f, "{} is already the active weapon", kind.name())
            }
            WeaponError::ScopeUnavailable { kind } => {
                write!(f, "{} has no scope", kind.name())
            }
        }
    }
}

impl std::error::Error for WeaponError {}

/// Convenience alias: a `Result` using `WeaponError` as the error type.
pub type WeaponResult<T> = Result<T, WeaponError>;

/// Rejected `assets/gameplay.toml` contents.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The file is not valid TOML or a value has the wrong type.
    Parse(String),

    /// A value is outside its safe operating range.
    OutOfRange {
        /// Name of the config key (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the safe range.
        safe_range: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(msg) => write!(f, "parse error: {msg}"),
            ConfigError::OutOfRange {
                name,
                value,
                safe_range,
            } => write!(
                f,
                "'{}' = {} is outside safe range {}",
                name, value, safe_range
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error if `value` is not strictly positive.
pub fn validate_positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name,
            value,
            safe_range: "(0.0, ∞)".to_string(),
        })
    }
}

/// Returns an error if `value` is outside the closed range `[min, max]`.
pub fn validate_range(
    name: &'static str,
    value: f32,
    min: f32,
    max: f32,
) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name,
            value,
            safe_range: format!("[{min}, {max}]"),
        })
    }
}
