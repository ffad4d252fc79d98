//! Damage from paintball hits.
//!
//! Any entity with a [`Damageable`] component loses health when a
//! [`ProjectileImpact`] names it (or a collider child of it).  Each impact is
//! applied exactly once; an entity reaching zero health is despawned.

use crate::game::FrameSet;
use crate::projectile::ProjectileImpact;
use bevy::prelude::*;

#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Damageable {
    pub hp: f32,
    pub max_hp: f32,
}

impl Damageable {
    pub fn new(max_hp: f32) -> Self {
        Self { hp: max_hp, max_hp }
    }

    /// Subtract `amount` (clamped at zero).  Returns `true` when this hit
    /// brought the health to zero.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if self.hp <= 0.0 || amount <= 0.0 {
            return false;
        }
        self.hp = (self.hp - amount).max(0.0);
        self.hp == 0.0
    }

    #[inline]
    pub fn is_destroyed(&self) -> bool {
        self.hp <= 0.0
    }
}

pub struct DamagePlugin;

impl Plugin for DamagePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, apply_impact_damage_system.in_set(FrameSet::Effects));
    }
}

pub fn apply_impact_damage_system(
    mut commands: Commands,
    mut impacts: MessageReader<ProjectileImpact>,
    mut q_damageable: Query<(&mut Damageable, Option<&Name>)>,
    q_parent: Query<&ChildOf>,
) {
    for impact in impacts.read() {
        let target = if q_damageable.contains(impact.target) {
            impact.target
        } else {
            match q_parent.get(impact.target) {
                Ok(child_of) if q_damageable.contains(child_of.parent()) => child_of.parent(),
                _ => continue,
            }
        };
        let Ok((mut damageable, name)) = q_damageable.get_mut(target) else {
            continue;
        };

        let label = name.map(|n| n.as_str()).unwrap_or("target");
        if damageable.take_damage(impact.damage) {
            info!("{label} destroyed by {}", impact.kind.name());
            commands.entity(target).despawn();
        } else if !damageable.is_destroyed() {
            debug!(
                "{label} hit for {:.0} ({:.0}/{:.0})",
                impact.damage, damageable.hp, damageable.max_hp
            );
        }
    }
}
