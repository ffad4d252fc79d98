//! Axis-aligned obstacle boxes: cache, player push-out, and ray queries.
//!
//! Every static obstacle in the arena carries an [`Obstacle`] component.  The
//! [`ObstacleCache`] holds their world-space boxes and is rebuilt lazily: only
//! when an obstacle is added, moved, or removed, never every frame.
//!
//! The player is tested against every cached box each frame (brute force).
//! Arena scenes hold tens of obstacles, so no spatial index is used.

use bevy::prelude::*;

/// Static collidable box.  Half extents are in local space and scaled by the
/// entity's `Transform::scale`; rotation is ignored.
#[derive(Component, Debug, Clone, Copy)]
pub struct Obstacle {
    pub half_extents: Vec3,
}

/// World-space axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldBox {
    pub min: Vec3,
    pub max: Vec3,
}

impl WorldBox {
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Box of a standing player whose feet are at `feet`.
    pub fn player(feet: Vec3, half_width: f32, height: f32) -> Self {
        Self {
            min: feet - Vec3::new(half_width, 0.0, half_width),
            max: feet + Vec3::new(half_width, height, half_width),
        }
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Strict overlap (touching faces do not count).
    pub fn overlaps(&self, other: &WorldBox) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// Slab-method ray test.  `dir` must be normalised.  Returns the hit
    /// distance and the outward face normal, ignoring hits beyond `max_dist`.
    ///
    /// A ray starting inside the box hits at distance 0 with the normal
    /// facing back along the ray, matching a solid Rapier ray cast.
    pub fn ray_hit(&self, origin: Vec3, dir: Vec3, max_dist: f32) -> Option<(f32, Vec3)> {
        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;
        let mut normal = Vec3::ZERO;

        for axis in 0..3 {
            let o = origin[axis];
            let d = dir[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);
            if d.abs() < 1e-8 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let mut t1 = (lo - o) / d;
            let mut t2 = (hi - o) / d;
            let mut face = -1.0;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
                face = 1.0;
            }
            if t1 > t_near {
                t_near = t1;
                normal = Vec3::ZERO;
                normal[axis] = face;
            }
            t_far = t_far.min(t2);
            if t_near > t_far {
                return None;
            }
        }

        if t_far < 0.0 || t_near > max_dist {
            return None;
        }
        if t_near < 0.0 {
            return Some((0.0, -dir));
        }
        Some((t_near, normal))
    }
}

/// World-space boxes of every [`Obstacle`], rebuilt on change.
#[derive(Resource, Debug, Default)]
pub struct ObstacleCache {
    pub boxes: Vec<(Entity, WorldBox)>,
    pub(crate) dirty: bool,
}

impl ObstacleCache {
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Iterator over the cached boxes without their entities.
    pub fn iter_boxes(&self) -> impl Iterator<Item = &WorldBox> + Clone {
        self.boxes.iter().map(|(_, b)| b)
    }
}

/// Flag the cache when any obstacle appears, moves, or disappears.
pub fn mark_obstacle_cache_dirty_system(
    changed: Query<(), (With<Obstacle>, Or<(Added<Obstacle>, Changed<Transform>)>)>,
    mut removed: RemovedComponents<Obstacle>,
    mut cache: ResMut<ObstacleCache>,
) {
    let any_removed = removed.read().count() > 0;
    if any_removed || !changed.is_empty() {
        cache.mark_dirty();
    }
}

/// Rebuild the cache if flagged.
pub fn rebuild_obstacle_cache_system(
    q: Query<(Entity, &Obstacle, &Transform)>,
    mut cache: ResMut<ObstacleCache>,
) {
    if !cache.dirty {
        return;
    }
    cache.boxes = q
        .iter()
        .map(|(entity, obstacle, transform)| {
            (
                entity,
                WorldBox::from_center(
                    transform.translation,
                    obstacle.half_extents * transform.scale.abs(),
                ),
            )
        })
        .collect();
    cache.dirty = false;
    debug!("obstacle cache rebuilt: {} boxes", cache.boxes.len());
}

/// Outcome of pushing the player out of obstacles for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PushOut {
    /// Number of overlapping obstacles resolved.
    pub contacts: u32,
    /// The player was pushed up out of a box top (now standing on it).
    pub landed: bool,
    /// Top of a box the player rests on: feet at most `correction` above
    /// it, not rising, and horizontally over it.
    pub resting_on: Option<f32>,
}

/// Resolve overlaps between the player box and each obstacle.
///
/// For every overlapping box the axis of least penetration is the separating
/// axis; the player moves out along it by the penetration depth plus
/// `correction`, and its velocity along that axis is zeroed.
pub fn push_out_of_obstacles<'a>(
    feet: &mut Vec3,
    velocity: &mut Vec3,
    half_width: f32,
    height: f32,
    correction: f32,
    obstacles: impl IntoIterator<Item = &'a WorldBox>,
) -> PushOut {
    let mut result = PushOut::default();

    for obstacle in obstacles {
        let player = WorldBox::player(*feet, half_width, height);
        if !player.overlaps(obstacle) {
            if velocity.y <= 0.0 && rests_on(&player, obstacle, correction) {
                let top = obstacle.max.y;
                result.resting_on = Some(result.resting_on.map_or(top, |t: f32| t.max(top)));
            }
            continue;
        }

        let pc = player.center();
        let oc = obstacle.center();
        let mut best_axis = 0;
        let mut best_depth = f32::INFINITY;
        for axis in 0..3 {
            let depth =
                (player.max[axis] - obstacle.min[axis]).min(obstacle.max[axis] - player.min[axis]);
            if depth < best_depth {
                best_depth = depth;
                best_axis = axis;
            }
        }

        let sign = if pc[best_axis] >= oc[best_axis] { 1.0 } else { -1.0 };
        feet[best_axis] += sign * (best_depth + correction);
        velocity[best_axis] = 0.0;
        result.contacts += 1;
        if best_axis == 1 && sign > 0.0 {
            result.landed = true;
        }
    }

    result
}

fn rests_on(player: &WorldBox, obstacle: &WorldBox, correction: f32) -> bool {
    let gap = player.min.y - obstacle.max.y;
    (0.0..=correction + 1e-4).contains(&gap)
        && player.min.x < obstacle.max.x
        && player.max.x > obstacle.min.x
        && player.min.z < obstacle.max.z
        && player.max.z > obstacle.min.z
}
