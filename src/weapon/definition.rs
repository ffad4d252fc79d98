//! Static weapon registry.
//!
//! Every weapon variant is a [`WeaponKind`]; its immutable tuning lives in a
//! [`WeaponDefinition`] row of [`WEAPON_TABLE`].  Behaviour that differs per
//! weapon (trigger mode, projectile arc, scope) is driven by fields of the
//! definition so a `match` on `WeaponKind` is only needed for presentation.
//!
//! | Weapon   | Interval | Damage | Mag | Reload | Trigger | Notes           |
//! |----------|----------|--------|-----|--------|---------|-----------------|
//! | Pistol   | 250 ms   | 15     | 20  | 1.5 s  | semi    |                 |
//! | Rifle    | 100 ms   | 10     | 40  | 2.0 s  | auto    |                 |
//! | Sniper   | 1200 ms  | 60     | 5   | 2.5 s  | semi    | 20° scope       |
//! | Lobber   | 800 ms   | 35     | 6   | 2.2 s  | semi    | arcing paintball|

/// Closed set of weapon variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WeaponKind {
    #[default]
    Pistol,
    Rifle,
    Sniper,
    Lobber,
}

impl WeaponKind {
    pub const COUNT: usize = 4;

    /// All kinds in slot order (slot 1 = `Pistol`).
    pub const ALL: [WeaponKind; Self::COUNT] = [
        WeaponKind::Pistol,
        WeaponKind::Rifle,
        WeaponKind::Sniper,
        WeaponKind::Lobber,
    ];

    /// Index into per-weapon arrays.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            WeaponKind::Pistol => 0,
            WeaponKind::Rifle => 1,
            WeaponKind::Sniper => 2,
            WeaponKind::Lobber => 3,
        }
    }

    /// Human-readable name used in logs.
    pub const fn name(self) -> &'static str {
        match self {
            WeaponKind::Pistol => "Pistol",
            WeaponKind::Rifle => "Rifle",
            WeaponKind::Sniper => "Sniper",
            WeaponKind::Lobber => "Lobber",
        }
    }

    /// Immutable tuning for this weapon.
    #[inline]
    pub fn definition(self) -> &'static WeaponDefinition {
        &WEAPON_TABLE[self.index()]
    }
}

/// Immutable per-weapon tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponDefinition {
    pub kind: WeaponKind,
    /// Minimum seconds between two successful shots.
    pub fire_interval: f32,
    /// Damage applied to a `Damageable` entity per hit.
    pub damage: f32,
    /// Projectile speed in units per 60 Hz tick.
    pub projectile_speed: f32,
    /// Visual radius of the paintball.
    pub projectile_radius: f32,
    /// Half-angle (rad) of the accuracy cone when firing from the hip.
    pub spread: f32,
    /// Half-angle (rad) of the accuracy cone while scoped.
    pub scoped_spread: f32,
    pub magazine_capacity: u32,
    /// Seconds for a full reload.
    pub reload_duration: f32,
    /// Holding the trigger keeps firing (otherwise one shot per click).
    pub automatic: bool,
    /// Projectile direction bends downward each tick.
    pub arcing: bool,
    /// Scoped field of view in degrees; `None` for weapons without a scope.
    pub scope_fov_degrees: Option<f32>,
    /// Backward kick (u) of the viewmodel at the start of the recoil animation.
    pub recoil_kick: f32,
    /// Paint colour (sRGB) of projectiles and splats.
    pub paint: [f32; 3],
}

impl WeaponDefinition {
    #[inline]
    pub fn scope_capable(&self) -> bool {
        self.scope_fov_degrees.is_some()
    }

    /// Accuracy cone half-angle for the given scope state.
    #[inline]
    pub fn spread_for(&self, scoped: bool) -> f32 {
        if scoped && self.scope_capable() {
            self.scoped_spread
        } else {
            self.spread
        }
    }
}

/// One row per [`WeaponKind`], in [`WeaponKind::index`] order.
pub static WEAPON_TABLE: [WeaponDefinition; WeaponKind::COUNT] = [
    WeaponDefinition {
        kind: WeaponKind::Pistol,
        fire_interval: 0.25,
        damage: 15.0,
        projectile_speed: 1.0,
        projectile_radius: 0.05,
        spread: 0.02,
        scoped_spread: 0.02,
        magazine_capacity: 20,
        reload_duration: 1.5,
        automatic: false,
        arcing: false,
        scope_fov_degrees: None,
        recoil_kick: 0.05,
        paint: [0.95, 0.15, 0.55],
    },
    WeaponDefinition {
        kind: WeaponKind::Rifle,
        fire_interval: 0.1,
        damage: 10.0,
        projectile_speed: 1.4,
        projectile_radius: 0.045,
        spread: 0.035,
        scoped_spread: 0.035,
        magazine_capacity: 40,
        reload_duration: 2.0,
        automatic: true,
        arcing: false,
        scope_fov_degrees: None,
        recoil_kick: 0.03,
        paint: [0.10, 0.80, 0.95],
    },
    WeaponDefinition {
        kind: WeaponKind::Sniper,
        fire_interval: 1.2,
        damage: 60.0,
        projectile_speed: 2.5,
        projectile_radius: 0.04,
        spread: 0.03,
        scoped_spread: 0.001,
        magazine_capacity: 5,
        reload_duration: 2.5,
        automatic: false,
        arcing: false,
        scope_fov_degrees: Some(20.0),
        recoil_kick: 0.12,
        paint: [0.98, 0.85, 0.10],
    },
    WeaponDefinition {
        kind: WeaponKind::Lobber,
        fire_interval: 0.8,
        damage: 35.0,
        projectile_speed: 0.5,
        projectile_radius: 0.12,
        spread: 0.03,
        scoped_spread: 0.03,
        magazine_capacity: 6,
        reload_duration: 2.2,
        automatic: false,
        arcing: true,
        scope_fov_degrees: None,
        recoil_kick: 0.09,
        paint: [0.35, 0.95, 0.25],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_rows_match_their_kind() {
        for kind in WeaponKind::ALL {
            assert_eq!(kind.definition().kind, kind, "row {} out of order", kind.index());
        }
    }

    #[test]
    fn only_sniper_has_a_scope() {
        let scoped: Vec<_> = WeaponKind::ALL
            .into_iter()
            .filter(|k| k.definition().scope_capable())
            .collect();
        assert_eq!(scoped, vec![WeaponKind::Sniper]);
    }

    #[test]
    fn scoped_spread_is_never_wider() {
        for kind in WeaponKind::ALL {
            let def = kind.definition();
            assert!(def.spread_for(true) <= def.spread_for(false));
        }
    }

    #[test]
    fn scoped_spread_ignored_without_scope() {
        let def = WeaponKind::Pistol.definition();
        assert_eq!(def.spread_for(true), def.spread);
    }
}
