//! Paintball projectiles: spawning, ballistics, and hit detection.
//!
//! ## Pipeline (runs in `FrameSet::Projectiles`)
//!
//! | System                            | Purpose                                        |
//! |-----------------------------------|------------------------------------------------|
//! | `attach_projectile_mesh_system`   | Give freshly-spawned projectiles a paint sphere |
//! | `advance_projectiles_system`      | Move, ray-test, and retire every projectile     |
//!
//! Each frame a projectile (a) bends downward if it arcs, (b) moves
//! `speed × delta × tick_rate` units along its direction, then (c) casts a
//! ray from the new position along the direction for the distance it just
//! covered.  On its first frame it also tests the muzzle offset (camera to
//! spawn point) and the stretch it just moved, so point-blank shots can't
//! start inside a wall.  A hit consumes the projectile and writes one
//! [`ProjectileImpact`]; flying past `projectile_max_travel` discards it
//! silently.
//!
//! Ray queries go through [`SceneRaycast`].  In the game the Rapier query
//! pipeline answers them; without a physics world (headless tests) the
//! [`ObstacleCache`] boxes do.

use crate::config::GameConfig;
use crate::game::FrameSet;
use crate::player::{ObstacleCache, PlayerHitbox};
use crate::weapon::{WeaponDefinition, WeaponKind};
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;
use rand::Rng;

// ── Components & messages ─────────────────────────────────────────────────────

/// A paintball in flight.
///
/// `position` is authoritative; the entity's `Transform` mirrors it for
/// rendering.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Projectile {
    pub position: Vec3,
    /// Unit travel direction.
    pub direction: Vec3,
    /// Distance covered since spawn.
    pub travelled: f32,
    pub damage: f32,
    /// Units per 60 Hz tick.
    pub speed: f32,
    pub radius: f32,
    pub arcing: bool,
    pub paint: [f32; 3],
    pub kind: WeaponKind,
    /// Camera position it was fired from; cleared after the first frame.
    pub launch: Option<Vec3>,
}

/// A projectile struck something.  Written exactly once per projectile.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct ProjectileImpact {
    pub kind: WeaponKind,
    /// Entity owning the struck collider.
    pub target: Entity,
    pub point: Vec3,
    /// Outward surface normal at `point`.
    pub normal: Vec3,
    /// Travel direction of the projectile when it struck.
    pub direction: Vec3,
    pub damage: f32,
    pub paint: [f32; 3],
}

/// Shared unit sphere used by every projectile (scaled by its radius).
#[derive(Resource)]
pub struct ProjectileMesh(pub Handle<Mesh>);

// ── Plugin ────────────────────────────────────────────────────────────────────

pub struct ProjectilePlugin;

impl Plugin for ProjectilePlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<ProjectileImpact>()
            .add_systems(
                Startup,
                init_projectile_mesh.run_if(
                    resource_exists::<Assets<Mesh>>
                        .and(resource_exists::<Assets<StandardMaterial>>),
                ),
            )
            .add_systems(
                Update,
                (
                    attach_projectile_mesh_system.run_if(resource_exists::<ProjectileMesh>),
                    advance_projectiles_system,
                )
                    .chain()
                    .in_set(FrameSet::Projectiles),
            );
    }
}

// ── Spawning ──────────────────────────────────────────────────────────────────

impl Projectile {
    /// Build a projectile leaving `origin` (the camera pose).
    ///
    /// It starts `muzzle_offset` units along the view direction, heading in a
    /// direction randomised inside the weapon's spread cone.
    pub fn new(
        def: &WeaponDefinition,
        origin: &Transform,
        scoped: bool,
        muzzle_offset: f32,
        rng: &mut impl Rng,
    ) -> Self {
        let forward = origin.forward().as_vec3();
        Self {
            position: origin.translation + forward * muzzle_offset,
            direction: apply_spread(forward, def.spread_for(scoped), rng),
            travelled: 0.0,
            damage: def.damage,
            speed: def.projectile_speed,
            radius: def.projectile_radius,
            arcing: def.arcing,
            paint: def.paint,
            kind: def.kind,
            launch: Some(origin.translation),
        }
    }

    /// Move one frame.  Returns the distance covered.
    pub fn advance(&mut self, delta: f32, arc_drop_per_tick: f32, tick_rate: f32) -> f32 {
        let ticks = delta * tick_rate;
        if self.arcing {
            self.direction.y -= arc_drop_per_tick * ticks;
            self.direction = self.direction.normalize_or_zero();
        }
        let step = self.speed * ticks;
        self.position += self.direction * step;
        self.travelled += step;
        step
    }
}

/// Spawn a projectile entity for a shot of `def` taken from `origin`.
pub fn spawn_projectile(
    commands: &mut Commands,
    def: &WeaponDefinition,
    origin: &Transform,
    scoped: bool,
    config: &GameConfig,
) -> Entity {
    let mut rng = rand::thread_rng();
    let projectile = Projectile::new(def, origin, scoped, config.muzzle_offset, &mut rng);
    let transform =
        Transform::from_translation(projectile.position).with_scale(Vec3::splat(projectile.radius));
    commands
        .spawn((projectile, transform, Visibility::default()))
        .id()
}

/// Perturb `direction` by a random offset inside a cone of half-angle
/// `spread` (radians).  Samples are uniform over the cone's disc.
pub fn apply_spread(direction: Vec3, spread: f32, rng: &mut impl Rng) -> Vec3 {
    let direction = direction.normalize_or_zero();
    if spread <= 0.0 || direction == Vec3::ZERO {
        return direction;
    }

    let angle = rng.gen::<f32>() * std::f32::consts::TAU;
    let radius = rng.gen::<f32>().sqrt() * spread.tan();

    let up = if direction.y.abs() < 0.9 {
        Vec3::Y
    } else {
        Vec3::X
    };
    let right = direction.cross(up).normalize();
    let up = right.cross(direction).normalize();

    (direction + right * (radius * angle.cos()) + up * (radius * angle.sin())).normalize()
}

// ── Ray queries ───────────────────────────────────────────────────────────────

/// Closest surface hit along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub entity: Entity,
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
}

/// Anything that can answer "what does this ray hit first?".
pub trait SceneRaycast {
    /// `direction` is a unit vector; hits farther than `max_distance` are ignored.
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit>;
}

impl SceneRaycast for ObstacleCache {
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        self.boxes
            .iter()
            .filter_map(|(entity, world_box)| {
                world_box
                    .ray_hit(origin, direction, max_distance)
                    .map(|(distance, normal)| RayHit {
                        entity: *entity,
                        point: origin + direction * distance,
                        normal,
                        distance,
                    })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}

/// Rapier-backed ray queries against every collider in the physics world.
pub struct RapierScene<'a, 'w> {
    pub context: &'a RapierContext<'w>,
    pub filter: QueryFilter<'a>,
}

impl SceneRaycast for RapierScene<'_, '_> {
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        self.context
            .cast_ray_and_get_normal(origin, direction, max_distance, true, self.filter)
            .map(|(entity, hit)| RayHit {
                entity,
                point: hit.point,
                // Solid casts starting inside a collider report no normal.
                normal: if hit.normal.length_squared() > 0.0 {
                    hit.normal
                } else {
                    -direction
                },
                distance: hit.time_of_impact,
            })
    }
}

/// Outcome of one projectile frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProjectileStep {
    Flying,
    Impact(RayHit),
    /// Exceeded its maximum travel distance without hitting anything.
    Expired,
}

/// Advance `projectile` by `delta` and test the distance just covered.
pub fn resolve_projectile_step(
    projectile: &mut Projectile,
    delta: f32,
    config: &GameConfig,
    scene: &impl SceneRaycast,
) -> ProjectileStep {
    let start = projectile.position;
    let step = projectile.advance(delta, config.arc_drop_per_tick, config.tick_rate);
    if step > 0.0 {
        if let Some(muzzle) = projectile.launch.take() {
            let first_frame = cast_segment(scene, muzzle, start)
                .or_else(|| cast_segment(scene, start, projectile.position));
            if let Some(hit) = first_frame {
                return ProjectileStep::Impact(hit);
            }
        }
        if let Some(hit) = scene.cast_ray(projectile.position, projectile.direction, step) {
            return ProjectileStep::Impact(hit);
        }
    }
    if projectile.travelled > config.projectile_max_travel {
        ProjectileStep::Expired
    } else {
        ProjectileStep::Flying
    }
}

fn cast_segment(scene: &impl SceneRaycast, from: Vec3, to: Vec3) -> Option<RayHit> {
    let span = to - from;
    let length = span.length();
    if length <= f32::EPSILON {
        return None;
    }
    scene.cast_ray(from, span / length, length)
}

// ── Systems ───────────────────────────────────────────────────────────────────

fn init_projectile_mesh(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>) {
    let handle = meshes.add(Sphere::new(1.0).mesh().uv(16, 12));
    commands.insert_resource(ProjectileMesh(handle));
}

/// Attach the shared sphere and an unlit paint-coloured material to every
/// newly-spawned [`Projectile`].
pub fn attach_projectile_mesh_system(
    mut commands: Commands,
    projectile_mesh: Res<ProjectileMesh>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    query: Query<(Entity, &Projectile), Added<Projectile>>,
) {
    for (entity, projectile) in query.iter() {
        let [r, g, b] = projectile.paint;
        let material = materials.add(StandardMaterial {
            base_color: Color::srgb(r, g, b),
            unlit: true,
            ..default()
        });
        commands.entity(entity).insert((
            Mesh3d(projectile_mesh.0.clone()),
            MeshMaterial3d(material),
        ));
    }
}

/// Move every projectile and retire the ones that hit or flew too far.
#[allow(clippy::too_many_arguments)]
pub fn advance_projectiles_system(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<GameConfig>,
    rapier_context: ReadRapierContext,
    cache: Res<ObstacleCache>,
    q_hitbox: Query<Entity, With<PlayerHitbox>>,
    mut q_projectiles: Query<(Entity, &mut Projectile, &mut Transform)>,
    mut impacts: MessageWriter<ProjectileImpact>,
) {
    let delta = time.delta_secs();
    let rapier = rapier_context.single().ok();
    let mut filter = QueryFilter::default().exclude_sensors();
    if let Ok(hitbox) = q_hitbox.single() {
        filter = filter.exclude_collider(hitbox);
    }

    for (entity, mut projectile, mut transform) in q_projectiles.iter_mut() {
        let step = match &rapier {
            Some(context) => {
                let scene = RapierScene {
                    context,
                    filter,
                };
                resolve_projectile_step(&mut projectile, delta, &config, &scene)
            }
            None => resolve_projectile_step(&mut projectile, delta, &config, &*cache),
        };

        match step {
            ProjectileStep::Flying => {
                transform.translation = projectile.position;
            }
            ProjectileStep::Impact(hit) => {
                debug!(
                    "{} paintball hit {:?} at {:.2?} after {:.1} u",
                    projectile.kind.name(),
                    hit.entity,
                    hit.point,
                    projectile.travelled
                );
                impacts.write(ProjectileImpact {
                    kind: projectile.kind,
                    target: hit.entity,
                    point: hit.point,
                    normal: hit.normal,
                    direction: projectile.direction,
                    damage: projectile.damage,
                    paint: projectile.paint,
                });
                commands.entity(entity).despawn();
            }
            ProjectileStep::Expired => {
                commands.entity(entity).despawn();
            }
        }
    }
}
