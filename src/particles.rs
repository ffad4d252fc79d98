//! Paint impact effects: splat decals and droplet bursts.
//!
//! ## Design
//!
//! Every [`ProjectileImpact`] produces one splat [`Decal`] lying on the struck
//! surface and a burst of [`Droplet`] particles.  Both are plain ECS entities
//! spawned with only `&mut Commands`; meshes and materials are attached one
//! frame later by the `attach_*` systems, which only run when the render
//! assets exist (headless apps skip them).
//!
//! | System                       | Purpose                                          |
//! |------------------------------|--------------------------------------------------|
//! | `spawn_impact_effects_system`| Decal + droplets for each impact                 |
//! | `decal_expiry_system`        | Age-based eviction from the [`DecalPool`]        |
//! | `droplet_update_system`      | Gravity, damping, flatten, despawn               |
//! | `attach_decal_mesh_system`   | Build each decal's procedural splat mesh         |
//! | `attach_droplet_mesh_system` | Shared droplet sphere + per-droplet material     |
//! | `droplet_fade_system`        | Fade droplet alpha over its lifetime             |
//!
//! ## Surfaces
//!
//! A normal whose vertical component dominates is a floor (or ceiling); the
//! splat is rolled randomly about the normal.  Anything else is a wall: the
//! splat keeps its local −Y pointing down the wall and grows a drip.

use crate::config::GameConfig;
use crate::constants::PAINT_PALETTE;
use crate::game::FrameSet;
use crate::projectile::ProjectileImpact;
use bevy::prelude::*;
use bevy_asset::RenderAssetUsages;
use bevy_mesh::{Indices, PrimitiveTopology};
use rand::Rng;
use std::collections::VecDeque;

/// Decals float this far off the surface to avoid z-fighting.
const DECAL_SURFACE_OFFSET: f32 = 0.01;

// ── Surface classification ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    Floor,
    Wall,
}

pub fn classify_surface(normal: Vec3) -> SurfaceKind {
    if normal.y.abs() >= normal.x.abs().max(normal.z.abs()) {
        SurfaceKind::Floor
    } else {
        SurfaceKind::Wall
    }
}

/// Random accent colour from the fixed paint palette.
pub fn pick_accent(rng: &mut impl Rng) -> [f32; 3] {
    PAINT_PALETTE[rng.gen_range(0..PAINT_PALETTE.len())]
}

// ── Splat shape ───────────────────────────────────────────────────────────────

/// Irregular splat outline in the decal's local XY plane (unit radius,
/// normal +Z, −Y down the surface).
#[derive(Debug, Clone, PartialEq)]
pub struct SplatShape {
    pub outline: Vec<Vec2>,
}

impl SplatShape {
    pub fn generate(surface: SurfaceKind, rng: &mut impl Rng) -> Self {
        let n = rng.gen_range(10..=16);
        let mut outline: Vec<Vec2> = (0..n)
            .map(|i| {
                let jitter = rng.gen_range(-0.25..0.25);
                let angle = (i as f32 + jitter) / n as f32 * std::f32::consts::TAU;
                let mut radius = rng.gen_range(0.65..1.0);
                if rng.gen_bool(0.15) {
                    radius = rng.gen_range(1.1..1.35);
                }
                Vec2::new(angle.cos(), angle.sin()) * radius
            })
            .collect();

        if surface == SurfaceKind::Wall {
            // Drip from the lowest outline point.
            if let Some(drip) = outline
                .iter_mut()
                .min_by(|a, b| a.y.total_cmp(&b.y))
            {
                drip.y = drip.y.min(-1.0) - rng.gen_range(0.6..1.6);
                drip.x *= 0.35;
            }
        }

        Self { outline }
    }

    /// Triangle-fan mesh around the origin.
    pub fn to_mesh(&self) -> Mesh {
        let n = self.outline.len();
        let mut positions: Vec<[f32; 3]> = Vec::with_capacity(n + 1);
        let mut uvs: Vec<[f32; 2]> = Vec::with_capacity(n + 1);

        positions.push([0.0, 0.0, 0.0]);
        uvs.push([0.5, 0.5]);
        for p in &self.outline {
            positions.push([p.x, p.y, 0.0]);
            uvs.push([p.x * 0.5 + 0.5, p.y * 0.5 + 0.5]);
        }
        let normals = vec![[0.0, 0.0, 1.0]; n + 1];

        let mut indices: Vec<u32> = Vec::with_capacity(n * 3);
        for i in 0..n as u32 {
            indices.extend_from_slice(&[0, i + 1, (i + 1) % n as u32 + 1]);
        }

        let mut mesh = Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::RENDER_WORLD,
        );
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
        mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
        mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
        mesh.insert_indices(Indices::U32(indices));
        mesh
    }
}

/// Orientation mapping the decal's local +Z onto `normal`.
pub fn splat_rotation(normal: Vec3, surface: SurfaceKind, roll: f32) -> Quat {
    let normal = normal.normalize_or_zero();
    match surface {
        SurfaceKind::Floor => Quat::from_rotation_arc(Vec3::Z, normal) * Quat::from_rotation_z(roll),
        SurfaceKind::Wall => Transform::IDENTITY.looking_to(-normal, Vec3::Y).rotation,
    }
}

// ── Components & resources ────────────────────────────────────────────────────

#[derive(Component, Debug, Clone)]
pub struct Decal {
    pub spawned: f32,
    pub shape: SplatShape,
    pub colour: [f32; 3],
}

/// One paint droplet of an impact burst.
#[derive(Component, Debug, Clone)]
pub struct Droplet {
    pub velocity: Vec3,
    pub age: f32,
    /// Seconds; the droplet despawns when `age >= lifetime`.
    pub lifetime: f32,
    pub colour: [f32; 3],
    /// Base scale before flattening.
    pub size: f32,
    pub material: Option<Handle<StandardMaterial>>,
}

/// Live decals, oldest first.  Bounded by count and by age.
#[derive(Resource, Debug, Clone)]
pub struct DecalPool {
    entries: VecDeque<(Entity, f32)>,
    max_count: usize,
    max_age: f32,
}

impl DecalPool {
    pub fn new(max_count: usize, max_age: f32) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_count),
            max_count,
            max_age,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.entries.iter().any(|(e, _)| *e == entity)
    }

    /// Track a new decal.  Returns the decals evicted to stay within the
    /// count limit (oldest first).
    pub fn push(&mut self, entity: Entity, now: f32) -> Vec<Entity> {
        self.entries.push_back((entity, now));
        let mut evicted = Vec::new();
        while self.entries.len() > self.max_count {
            if let Some((old, _)) = self.entries.pop_front() {
                evicted.push(old);
            }
        }
        evicted
    }

    /// Remove and return every decal older than the age limit.
    pub fn expire(&mut self, now: f32) -> Vec<Entity> {
        let mut expired = Vec::new();
        while let Some(&(entity, spawned)) = self.entries.front() {
            if now - spawned < self.max_age {
                break;
            }
            self.entries.pop_front();
            expired.push(entity);
        }
        expired
    }
}

/// Shared droplet sphere (created at startup when render assets exist).
#[derive(Resource)]
pub struct ImpactMeshes {
    pub droplet: Handle<Mesh>,
}

// ── Plugin ────────────────────────────────────────────────────────────────────

pub struct ImpactPlugin;

impl Plugin for ImpactPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Startup,
            (
                setup_decal_pool,
                init_impact_meshes.run_if(
                    resource_exists::<Assets<Mesh>>
                        .and(resource_exists::<Assets<StandardMaterial>>),
                ),
            ),
        )
        .add_systems(
            Update,
            (
                spawn_impact_effects_system,
                decal_expiry_system,
                droplet_update_system,
                (
                    attach_decal_mesh_system,
                    attach_droplet_mesh_system,
                    droplet_fade_system,
                )
                    .run_if(resource_exists::<ImpactMeshes>),
            )
                .chain()
                .in_set(FrameSet::Effects),
        );
    }
}

// ── Startup ───────────────────────────────────────────────────────────────────

/// Insert a [`DecalPool`] sized from the loaded config, unless one exists.
pub fn setup_decal_pool(
    mut commands: Commands,
    config: Res<GameConfig>,
    existing: Option<Res<DecalPool>>,
) {
    if existing.is_none() {
        commands.insert_resource(DecalPool::new(config.decal_max_count, config.decal_max_age));
    }
}

fn init_impact_meshes(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>) {
    let droplet = meshes.add(Sphere::new(1.0).mesh().uv(8, 6));
    commands.insert_resource(ImpactMeshes { droplet });
}

// ── Spawn helpers ─────────────────────────────────────────────────────────────

/// Spawn the splat decal for an impact.  Returns the decal entity.
pub fn spawn_decal(
    commands: &mut Commands,
    impact: &ProjectileImpact,
    now: f32,
    radius: f32,
    rng: &mut impl Rng,
) -> Entity {
    let surface = classify_surface(impact.normal);
    let roll = rng.gen_range(0.0..std::f32::consts::TAU);
    let transform = Transform {
        translation: impact.point + impact.normal * DECAL_SURFACE_OFFSET,
        rotation: splat_rotation(impact.normal, surface, roll),
        scale: Vec3::splat(radius * rng.gen_range(0.8..1.25)),
    };
    commands
        .spawn((
            Decal {
                spawned: now,
                shape: SplatShape::generate(surface, rng),
                colour: impact.paint,
            },
            transform,
            Visibility::default(),
        ))
        .id()
}

/// Initial droplet velocity: the incoming direction reflected off the
/// surface, randomly spread and kept on the outer side of the surface.
pub fn droplet_velocity(
    incoming: Vec3,
    normal: Vec3,
    speed_range: (f32, f32),
    rng: &mut impl Rng,
) -> Vec3 {
    let reflected = incoming - 2.0 * incoming.dot(normal) * normal;
    let jitter = Vec3::new(
        rng.gen_range(-1.0..1.0),
        rng.gen_range(-1.0..1.0),
        rng.gen_range(-1.0..1.0),
    ) * 0.6;
    let mut dir = (reflected.normalize_or_zero() * 0.5 + normal * 0.5 + jitter).normalize_or_zero();
    if dir.dot(normal) < 0.1 {
        dir = (dir + normal).normalize_or_zero();
    }
    let (lo, hi) = speed_range;
    dir * rng.gen_range(lo..=hi)
}

pub fn spawn_droplets(
    commands: &mut Commands,
    impact: &ProjectileImpact,
    config: &GameConfig,
    rng: &mut impl Rng,
) {
    let accent = pick_accent(rng);
    for _ in 0..config.droplet_count {
        let colour = if rng.gen_bool(0.5) { impact.paint } else { accent };
        let size = rng.gen_range(0.015..0.035);
        commands.spawn((
            Droplet {
                velocity: droplet_velocity(
                    impact.direction,
                    impact.normal,
                    (config.droplet_speed_min, config.droplet_speed_max),
                    rng,
                ),
                age: 0.0,
                lifetime: rng.gen_range(config.droplet_lifetime_min..=config.droplet_lifetime_max),
                colour,
                size,
                material: None,
            },
            Transform::from_translation(impact.point + impact.normal * 0.02)
                .with_scale(Vec3::splat(size)),
            Visibility::default(),
        ));
    }
}

/// Integrate one droplet for `dt`.  Returns `false` once it has expired.
pub fn step_droplet(
    droplet: &mut Droplet,
    transform: &mut Transform,
    dt: f32,
    gravity: f32,
    damping: f32,
) -> bool {
    droplet.age += dt;
    if droplet.age >= droplet.lifetime {
        return false;
    }
    droplet.velocity.y -= gravity * dt;
    droplet.velocity *= damping.powf(dt * 60.0);
    transform.translation += droplet.velocity * dt;

    let t = droplet.age / droplet.lifetime;
    transform.scale = Vec3::new(1.0 + t, (1.0 - 0.8 * t).max(0.05), 1.0 + t) * droplet.size;
    true
}

// ── Update systems ────────────────────────────────────────────────────────────

pub fn spawn_impact_effects_system(
    mut commands: Commands,
    mut impacts: MessageReader<ProjectileImpact>,
    mut pool: ResMut<DecalPool>,
    time: Res<Time>,
    config: Res<GameConfig>,
) {
    let now = time.elapsed_secs();
    let mut rng = rand::thread_rng();

    for impact in impacts.read() {
        let decal = spawn_decal(&mut commands, impact, now, config.decal_radius, &mut rng);
        for old in pool.push(decal, now) {
            commands.entity(old).try_despawn();
        }
        spawn_droplets(&mut commands, impact, &config, &mut rng);
    }
}

pub fn decal_expiry_system(mut commands: Commands, mut pool: ResMut<DecalPool>, time: Res<Time>) {
    for old in pool.expire(time.elapsed_secs()) {
        commands.entity(old).try_despawn();
    }
}

pub fn droplet_update_system(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<GameConfig>,
    mut query: Query<(Entity, &mut Droplet, &mut Transform)>,
) {
    let dt = time.delta_secs();
    for (entity, mut droplet, mut transform) in query.iter_mut() {
        if !step_droplet(
            &mut droplet,
            &mut transform,
            dt,
            config.droplet_gravity,
            config.droplet_damping,
        ) {
            commands.entity(entity).despawn();
        }
    }
}

/// Build and attach each new decal's splat mesh.
pub fn attach_decal_mesh_system(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    query: Query<(Entity, &Decal), Added<Decal>>,
) {
    for (entity, decal) in query.iter() {
        let [r, g, b] = decal.colour;
        let material = materials.add(StandardMaterial {
            base_color: Color::srgb(r, g, b),
            perceptual_roughness: 0.35,
            depth_bias: 1.0,
            ..default()
        });
        commands.entity(entity).insert((
            Mesh3d(meshes.add(decal.shape.to_mesh())),
            MeshMaterial3d(material),
        ));
    }
}

pub fn attach_droplet_mesh_system(
    mut commands: Commands,
    impact_meshes: Res<ImpactMeshes>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut query: Query<(Entity, &mut Droplet), Added<Droplet>>,
) {
    for (entity, mut droplet) in query.iter_mut() {
        let [r, g, b] = droplet.colour;
        let handle = materials.add(StandardMaterial {
            base_color: Color::srgba(r, g, b, 1.0),
            alpha_mode: AlphaMode::Blend,
            unlit: true,
            ..default()
        });
        droplet.material = Some(handle.clone());
        commands.entity(entity).insert((
            Mesh3d(impact_meshes.droplet.clone()),
            MeshMaterial3d(handle),
        ));
    }
}

/// Quadratic alpha fade over each droplet's lifetime.
pub fn droplet_fade_system(
    mut materials: ResMut<Assets<StandardMaterial>>,
    query: Query<&Droplet>,
) {
    for droplet in query.iter() {
        let Some(handle) = &droplet.material else {
            continue;
        };
        if let Some(mat) = materials.get_mut(handle) {
            let t = (droplet.age / droplet.lifetime).clamp(0.0, 1.0);
            let [r, g, b] = droplet.colour;
            mat.base_color = Color::srgba(r, g, b, (1.0 - t).powi(2));
        }
    }
}
