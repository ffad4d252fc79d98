//! Headless tests of the weapon pipeline: `WeaponAction` messages in,
//! projectiles / ammo notifications / camera FOV out.
//!
//! The app runs the real [`GamePlugin`] under [`MinimalPlugins`] with a fixed
//! 1/60 s time step.  Actions are written directly as messages, so no input
//! device or window is involved.

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use splatline::config::GameConfig;
use splatline::game::{FrameSet, GamePlugin, GameState};
use splatline::player::PlayerCamera;
use splatline::projectile::Projectile;
use splatline::weapon::{
    AmmoChanged, Arsenal, WeaponAction, WeaponAnimation, WeaponKind, WeaponModel,
};
use std::time::Duration;

const DT: f32 = 1.0 / 60.0;

#[derive(Resource, Default)]
struct AmmoLog(Vec<AmmoChanged>);

fn record_ammo(mut reader: MessageReader<AmmoChanged>, mut log: ResMut<AmmoLog>) {
    log.0.extend(reader.read().copied());
}

fn weapon_test_app(arsenal: Option<Arsenal>) -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(DT)));
    app.init_resource::<ButtonInput<KeyCode>>();
    app.init_resource::<ButtonInput<MouseButton>>();
    app.insert_resource(GameConfig::default());
    if let Some(arsenal) = arsenal {
        app.insert_resource(arsenal);
    }
    app.init_resource::<AmmoLog>();
    app.add_plugins(GamePlugin);
    app.add_systems(Update, record_ammo.after(FrameSet::Weapons));

    let config = GameConfig::default();
    app.world_mut()
        .spawn((
            PlayerCamera,
            Transform::from_xyz(0.0, 1.6, 0.0),
            Projection::Perspective(PerspectiveProjection {
                fov: config.hip_fov_degrees.to_radians(),
                ..default()
            }),
        ))
        .with_children(|camera| {
            for kind in WeaponKind::ALL {
                let baseline = Transform::from_xyz(0.2, -0.2, -0.4);
                camera.spawn((WeaponModel { kind, baseline }, baseline, Visibility::Hidden));
            }
        });

    app.update();
    app
}

fn act(app: &mut App, action: WeaponAction) {
    app.world_mut().write_message(action);
}

fn run_frames(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

fn projectile_count(app: &mut App) -> usize {
    app.world_mut()
        .query::<&Projectile>()
        .iter(app.world())
        .count()
}

fn model_visibility(app: &mut App, kind: WeaponKind) -> Visibility {
    app.world_mut()
        .query::<(&WeaponModel, &Visibility)>()
        .iter(app.world())
        .find(|(m, _)| m.kind == kind)
        .map(|(_, v)| *v)
        .expect("model exists")
}

#[test]
fn fire_spawns_projectile_ahead_of_camera() {
    let mut app = weapon_test_app(None);
    act(&mut app, WeaponAction::Fire);
    app.update();

    let arsenal = app.world().resource::<Arsenal>();
    assert_eq!(arsenal.ammo(WeaponKind::Pistol), 19);

    let projectiles: Vec<Projectile> = app
        .world_mut()
        .query::<&Projectile>()
        .iter(app.world())
        .cloned()
        .collect();
    assert_eq!(projectiles.len(), 1);
    let p = &projectiles[0];
    assert_eq!(p.kind, WeaponKind::Pistol);
    assert!(p.direction.z < -0.99, "heads down the view axis: {:?}", p.direction);
    assert!(p.position.z < 0.0);

    let log = &app.world().resource::<AmmoLog>().0;
    assert_eq!(
        log.last(),
        Some(&AmmoChanged {
            kind: WeaponKind::Pistol,
            ammo: 19,
            capacity: 20
        })
    );
}

#[test]
fn fire_rate_is_limited_by_interval() {
    let mut app = weapon_test_app(None);
    // Half a second of trigger spam at 60 Hz.
    for _ in 0..30 {
        act(&mut app, WeaponAction::Fire);
        app.update();
    }
    let shots = 20 - app.world().resource::<Arsenal>().ammo(WeaponKind::Pistol);
    assert!(
        (2..=3).contains(&shots),
        "0.25 s interval allows 2-3 shots in 0.5 s, got {shots}"
    );
}

#[test]
fn empty_magazine_auto_reloads() {
    let arsenal = Arsenal::default().with_ammo(WeaponKind::Pistol, 1);
    let mut app = weapon_test_app(Some(arsenal));

    act(&mut app, WeaponAction::Fire);
    app.update();
    assert_eq!(app.world().resource::<Arsenal>().ammo(WeaponKind::Pistol), 0);

    // Past the auto-reload delay: reloading without an explicit request.
    run_frames(&mut app, 30);
    let arsenal = app.world().resource::<Arsenal>();
    assert!(matches!(
        arsenal.animation(),
        WeaponAnimation::Reloading {
            kind: WeaponKind::Pistol,
            ..
        }
    ));
    assert_eq!(arsenal.ammo(WeaponKind::Pistol), 0);

    // Reload duration (1.5 s) plus slack.
    run_frames(&mut app, 100);
    let arsenal = app.world().resource::<Arsenal>();
    assert_eq!(arsenal.ammo(WeaponKind::Pistol), 20);
    assert_eq!(arsenal.animation(), WeaponAnimation::Idle);

    let log = &app.world().resource::<AmmoLog>().0;
    assert_eq!(log.last().map(|a| a.ammo), Some(20));
}

#[test]
fn reload_request_while_reloading_changes_nothing() {
    let arsenal = Arsenal::default().with_ammo(WeaponKind::Pistol, 7);
    let mut app = weapon_test_app(Some(arsenal));

    act(&mut app, WeaponAction::Reload);
    app.update();
    run_frames(&mut app, 10);
    act(&mut app, WeaponAction::Reload);
    app.update();
    assert_eq!(app.world().resource::<Arsenal>().ammo(WeaponKind::Pistol), 7);

    run_frames(&mut app, 100);
    assert_eq!(app.world().resource::<Arsenal>().ammo(WeaponKind::Pistol), 20);
}

#[test]
fn scope_twice_equals_scope_once() {
    let mut app = weapon_test_app(None);
    act(&mut app, WeaponAction::Switch(WeaponKind::Sniper));
    app.update();
    run_frames(&mut app, 30);

    act(&mut app, WeaponAction::Scope(true));
    app.update();
    act(&mut app, WeaponAction::Scope(true));
    app.update();
    run_frames(&mut app, 30);

    let arsenal = app.world().resource::<Arsenal>();
    assert!(arsenal.scope().is_scoped());
    let sway = arsenal
        .scope()
        .sway(GameConfig::default().scope_sway_amplitude);
    assert!(sway != Vec2::ZERO, "sway runs while scoped");

    let fov = app
        .world_mut()
        .query_filtered::<&Projection, With<PlayerCamera>>()
        .single(app.world())
        .map(|p| match p {
            Projection::Perspective(pp) => pp.fov,
            _ => 0.0,
        })
        .expect("camera exists");
    let scoped = WeaponKind::Sniper
        .definition()
        .scope_fov_degrees
        .expect("sniper has a scope")
        .to_radians();
    assert!((fov - scoped).abs() < 1e-4, "fov {fov} vs {scoped}");
    assert_eq!(model_visibility(&mut app, WeaponKind::Sniper), Visibility::Hidden);

    act(&mut app, WeaponAction::Scope(false));
    app.update();
    run_frames(&mut app, 30);
    let arsenal = app.world().resource::<Arsenal>();
    assert!(!arsenal.scope().is_scoped());
    assert_eq!(
        arsenal.scope().sway(GameConfig::default().scope_sway_amplitude),
        Vec2::ZERO
    );
    assert_eq!(
        model_visibility(&mut app, WeaponKind::Sniper),
        Visibility::Inherited
    );
    assert_eq!(model_visibility(&mut app, WeaponKind::Pistol), Visibility::Hidden);
}

#[test]
fn scope_request_on_pistol_is_rejected() {
    let mut app = weapon_test_app(None);
    act(&mut app, WeaponAction::Scope(true));
    app.update();
    assert!(!app.world().resource::<Arsenal>().scope().is_scoped());
}

#[test]
fn switch_mid_reload_discards_progress() {
    let arsenal = Arsenal::default().with_ammo(WeaponKind::Pistol, 3);
    let mut app = weapon_test_app(Some(arsenal));

    act(&mut app, WeaponAction::Reload);
    app.update();
    run_frames(&mut app, 20);
    act(&mut app, WeaponAction::Switch(WeaponKind::Rifle));
    app.update();

    let arsenal = app.world().resource::<Arsenal>();
    assert_eq!(arsenal.active(), WeaponKind::Rifle);
    assert!(arsenal.animation().is_switching());
    assert!(!arsenal.animation().is_reloading());

    run_frames(&mut app, 120);
    let arsenal = app.world().resource::<Arsenal>();
    assert_eq!(arsenal.ammo(WeaponKind::Pistol), 3);
    assert_eq!(arsenal.animation(), WeaponAnimation::Idle);
}

#[test]
fn paused_game_ignores_weapon_actions() {
    let mut app = weapon_test_app(None);
    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::Paused);
    app.update();

    act(&mut app, WeaponAction::Fire);
    app.update();
    assert_eq!(projectile_count(&mut app), 0);
    assert_eq!(app.world().resource::<Arsenal>().ammo(WeaponKind::Pistol), 20);
}

#[test]
fn pausing_releases_the_scope() {
    let mut app = weapon_test_app(None);
    act(&mut app, WeaponAction::Switch(WeaponKind::Sniper));
    app.update();
    run_frames(&mut app, 30);
    act(&mut app, WeaponAction::Scope(true));
    app.update();
    run_frames(&mut app, 30);
    assert!(app.world().resource::<Arsenal>().scope().is_scoped());

    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::Paused);
    app.update();
    let arsenal = app.world().resource::<Arsenal>();
    assert!(!arsenal.scope().is_scoped());
    assert_eq!(
        arsenal.scope().sway(GameConfig::default().scope_sway_amplitude),
        Vec2::ZERO
    );
    assert_eq!(
        model_visibility(&mut app, WeaponKind::Sniper),
        Visibility::Inherited
    );

    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::Playing);
    app.update();
    run_frames(&mut app, 30);
    assert!(!app.world().resource::<Arsenal>().scope().is_scoped());
    let fov = app
        .world_mut()
        .query_filtered::<&Projection, With<PlayerCamera>>()
        .single(app.world())
        .map(|p| match p {
            Projection::Perspective(pp) => pp.fov,
            _ => 0.0,
        })
        .expect("camera exists");
    let hip = GameConfig::default().hip_fov_degrees.to_radians();
    assert!((fov - hip).abs() < 1e-4, "fov {fov} vs hip {hip}");
}
