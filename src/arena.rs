//! Demo arena: floor, perimeter walls, crates, training targets, lights, the
//! first-person camera with its weapon models, and the player body.

use crate::config::GameConfig;
use crate::damage::Damageable;
use crate::player::{spawn_player, Obstacle, PlayerCamera};
use crate::weapon::{WeaponKind, WeaponModel};
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

const ARENA_HALF_SIZE: f32 = 20.0;
const WALL_HEIGHT: f32 = 3.0;
const WALL_THICKNESS: f32 = 0.5;

/// Crate centres on the floor (x, z) and their half size.
const CRATES: [(f32, f32, f32); 6] = [
    (-4.0, -3.0, 0.5),
    (-3.0, -3.0, 0.5),
    (3.5, -6.0, 0.75),
    (6.0, 2.0, 0.5),
    (-7.0, 5.0, 1.0),
    (0.0, -10.0, 0.6),
];

/// Target centres on the floor (x, z).
const TARGETS: [(f32, f32); 4] = [(-6.0, -12.0), (-2.0, -14.0), (2.0, -14.0), (6.0, -12.0)];
const TARGET_HALF_EXTENTS: Vec3 = Vec3::new(0.4, 0.8, 0.1);

/// Spawn a static box that blocks the player and stops paintballs.
pub fn spawn_obstacle(
    commands: &mut Commands,
    mesh: Handle<Mesh>,
    material: Handle<StandardMaterial>,
    center: Vec3,
    half_extents: Vec3,
) -> Entity {
    commands
        .spawn((
            Obstacle { half_extents },
            Mesh3d(mesh),
            MeshMaterial3d(material),
            Transform::from_translation(center),
            RigidBody::Fixed,
            Collider::cuboid(half_extents.x, half_extents.y, half_extents.z),
        ))
        .id()
}

/// Startup system: build the arena.
pub fn setup_arena(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    config: Res<GameConfig>,
) {
    // ── Floor ─────────────────────────────────────────────────────────────────
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(
            ARENA_HALF_SIZE * 2.0,
            ARENA_HALF_SIZE * 2.0,
        ))),
        MeshMaterial3d(materials.add(Color::srgb(0.55, 0.57, 0.6))),
        Transform::from_xyz(0.0, config.ground_height, 0.0),
        RigidBody::Fixed,
        Collider::cuboid(ARENA_HALF_SIZE, 0.05, ARENA_HALF_SIZE),
    ));

    // ── Walls ─────────────────────────────────────────────────────────────────
    let wall_material = materials.add(Color::srgb(0.82, 0.8, 0.76));
    let long = Vec3::new(ARENA_HALF_SIZE, WALL_HEIGHT * 0.5, WALL_THICKNESS * 0.5);
    let side = Vec3::new(WALL_THICKNESS * 0.5, WALL_HEIGHT * 0.5, ARENA_HALF_SIZE);
    let y = config.ground_height + WALL_HEIGHT * 0.5;
    for (center, half) in [
        (Vec3::new(0.0, y, -ARENA_HALF_SIZE), long),
        (Vec3::new(0.0, y, ARENA_HALF_SIZE), long),
        (Vec3::new(-ARENA_HALF_SIZE, y, 0.0), side),
        (Vec3::new(ARENA_HALF_SIZE, y, 0.0), side),
    ] {
        let mesh = meshes.add(Cuboid::from_size(half * 2.0));
        spawn_obstacle(&mut commands, mesh, wall_material.clone(), center, half);
    }

    // ── Crates ────────────────────────────────────────────────────────────────
    let crate_material = materials.add(Color::srgb(0.6, 0.42, 0.24));
    for (x, z, h) in CRATES {
        let half = Vec3::splat(h);
        let mesh = meshes.add(Cuboid::from_size(half * 2.0));
        let center = Vec3::new(x, config.ground_height + h, z);
        spawn_obstacle(&mut commands, mesh, crate_material.clone(), center, half);
    }

    // ── Training targets ──────────────────────────────────────────────────────
    let target_mesh = meshes.add(Cuboid::from_size(TARGET_HALF_EXTENTS * 2.0));
    let target_material = materials.add(Color::srgb(0.95, 0.95, 0.95));
    for (i, (x, z)) in TARGETS.into_iter().enumerate() {
        let center = Vec3::new(x, config.ground_height + TARGET_HALF_EXTENTS.y, z);
        let target = spawn_obstacle(
            &mut commands,
            target_mesh.clone(),
            target_material.clone(),
            center,
            TARGET_HALF_EXTENTS,
        );
        commands.entity(target).insert((
            Damageable::new(config.target_hp),
            Name::new(format!("Target {}", i + 1)),
        ));
    }

    // ── Lights ────────────────────────────────────────────────────────────────
    commands.spawn((
        DirectionalLight {
            illuminance: 9_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(8.0, 16.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.spawn((
        PointLight {
            intensity: 400_000.0,
            range: 40.0,
            ..default()
        },
        Transform::from_xyz(0.0, 6.0, 0.0),
    ));

    // ── Camera + weapon models ────────────────────────────────────────────────
    let feet = Vec3::new(0.0, config.ground_height, 8.0);
    commands
        .spawn((
            PlayerCamera,
            Camera3d::default(),
            Projection::Perspective(PerspectiveProjection {
                fov: config.hip_fov_degrees.to_radians(),
                near: 0.05,
                ..default()
            }),
            Transform::from_translation(feet + Vec3::Y * config.eye_height),
        ))
        .with_children(|camera| {
            for kind in WeaponKind::ALL {
                let (size, baseline) = weapon_model_pose(kind);
                let [r, g, b] = kind.definition().paint;
                camera.spawn((
                    WeaponModel { kind, baseline },
                    Mesh3d(meshes.add(Cuboid::from_size(size))),
                    MeshMaterial3d(materials.add(Color::srgb(r * 0.6, g * 0.6, b * 0.6))),
                    baseline,
                    Visibility::Hidden,
                ));
            }
        });

    spawn_player(&mut commands, &config, feet);
    info!(
        "arena ready: {} crates, {} targets",
        CRATES.len(),
        TARGETS.len()
    );
}

/// Model box size and resting pose (camera space) for each weapon.
fn weapon_model_pose(kind: WeaponKind) -> (Vec3, Transform) {
    let size = match kind {
        WeaponKind::Pistol => Vec3::new(0.06, 0.1, 0.25),
        WeaponKind::Rifle => Vec3::new(0.07, 0.1, 0.55),
        WeaponKind::Sniper => Vec3::new(0.06, 0.09, 0.8),
        WeaponKind::Lobber => Vec3::new(0.14, 0.14, 0.45),
    };
    let baseline = Transform::from_xyz(0.22, -0.2, -0.25 - size.z * 0.5);
    (size, baseline)
}
