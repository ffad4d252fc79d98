//! Headless tests of the player pipeline: held keys → `InputSnapshot` →
//! controller → body and camera transforms.
//!
//! A bare `Window` entity with locked `CursorOptions` stands in for a
//! pointer-locked window.  `MinimalPlugins` has no input plugin, so keys
//! pressed on `ButtonInput` stay held until released by the test.

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use bevy::window::{CursorGrabMode, CursorOptions, PrimaryWindow};
use splatline::config::GameConfig;
use splatline::game::{GamePlugin, GameState};
use splatline::player::{
    spawn_player, Obstacle, Player, PlayerAnimation, PlayerCamera, PlayerKinematics,
};
use splatline::projectile::Projectile;
use splatline::weapon::WeaponAction;
use std::time::Duration;

const DT: f32 = 1.0 / 60.0;

fn movement_test_app(locked: bool) -> App {
    let mut app = App::new();
    app.add_plugins((MinimalPlugins, StatesPlugin));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(DT)));
    app.init_resource::<ButtonInput<KeyCode>>();
    app.init_resource::<ButtonInput<MouseButton>>();
    app.insert_resource(GameConfig::default());
    app.add_plugins(GamePlugin);

    app.world_mut().spawn((
        Window::default(),
        PrimaryWindow,
        CursorOptions {
            grab_mode: if locked {
                CursorGrabMode::Locked
            } else {
                CursorGrabMode::None
            },
            visible: !locked,
            ..default()
        },
    ));
    app.world_mut().spawn((PlayerCamera, Transform::default()));
    app.add_systems(Startup, |mut commands: Commands, config: Res<GameConfig>| {
        spawn_player(&mut commands, &config, Vec3::ZERO);
    });
    app.update();
    app
}

fn hold(app: &mut App, key: KeyCode) {
    app.world_mut().resource_mut::<ButtonInput<KeyCode>>().press(key);
}

fn run_frames(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

fn player(app: &mut App) -> (Vec3, PlayerKinematics) {
    app.world_mut()
        .query_filtered::<(&Transform, &PlayerKinematics), With<Player>>()
        .single(app.world())
        .map(|(t, k)| (t.translation, k.clone()))
        .expect("one player")
}

fn camera(app: &mut App) -> Vec3 {
    app.world_mut()
        .query_filtered::<&Transform, With<PlayerCamera>>()
        .single(app.world())
        .map(|t| t.translation)
        .expect("one camera")
}

#[test]
fn holding_forward_walks_down_negative_z() {
    let mut app = movement_test_app(true);
    hold(&mut app, KeyCode::KeyW);
    run_frames(&mut app, 60);

    let config = GameConfig::default();
    let (feet, kin) = player(&mut app);
    assert!(feet.z < -config.walk_speed * 0.8, "feet = {feet:?}");
    assert!(feet.z > -config.walk_speed * 1.1, "feet = {feet:?}");
    assert_eq!(feet.y, config.ground_height);
    assert_eq!(kin.animation, PlayerAnimation::Walk);

    let eye = camera(&mut app);
    assert!((eye - (feet + Vec3::Y * config.eye_height)).length() < 1e-4);
}

#[test]
fn unlocked_pointer_keeps_player_still() {
    let mut app = movement_test_app(false);
    hold(&mut app, KeyCode::KeyW);
    run_frames(&mut app, 30);
    let (feet, kin) = player(&mut app);
    assert_eq!(feet, Vec3::ZERO);
    assert_eq!(kin.animation, PlayerAnimation::Idle);
}

#[test]
fn paused_game_freezes_player() {
    let mut app = movement_test_app(true);
    app.world_mut()
        .resource_mut::<NextState<GameState>>()
        .set(GameState::Paused);
    app.update();

    hold(&mut app, KeyCode::KeyW);
    run_frames(&mut app, 30);
    assert_eq!(player(&mut app).0, Vec3::ZERO);
}

#[test]
fn wall_stops_the_player() {
    let mut app = movement_test_app(true);
    let config = GameConfig::default();
    let wall_half = Vec3::new(5.0, 1.5, 0.25);
    let wall_z = -3.0;
    app.world_mut().spawn((
        Obstacle {
            half_extents: wall_half,
        },
        Transform::from_xyz(0.0, 1.5, wall_z),
    ));

    hold(&mut app, KeyCode::KeyW);
    hold(&mut app, KeyCode::ShiftLeft);
    run_frames(&mut app, 120);

    let (feet, kin) = player(&mut app);
    let wall_face = wall_z + wall_half.z;
    assert!(
        feet.z - config.player_half_width >= wall_face - 1e-3,
        "player inside wall: feet = {feet:?}"
    );
    assert!(
        feet.z - config.player_half_width < wall_face + 0.1,
        "player stopped short of the wall: feet = {feet:?}"
    );
    assert_eq!(kin.velocity.z, 0.0);
}

#[test]
fn jump_lands_back_on_the_ground() {
    let mut app = movement_test_app(true);
    hold(&mut app, KeyCode::Space);
    app.update();
    app.world_mut()
        .resource_mut::<ButtonInput<KeyCode>>()
        .release(KeyCode::Space);
    run_frames(&mut app, 5);
    let (feet, kin) = player(&mut app);
    assert!(feet.y > 0.0);
    assert_eq!(kin.animation, PlayerAnimation::Jump);

    run_frames(&mut app, 90);
    let (feet, kin) = player(&mut app);
    assert_eq!(feet.y, GameConfig::default().ground_height);
    assert!(kin.on_ground);
}

#[test]
fn shot_leaves_from_this_frames_eye_position() {
    let mut app = movement_test_app(true);
    hold(&mut app, KeyCode::KeyD);
    run_frames(&mut app, 10);

    app.world_mut().write_message(WeaponAction::Fire);
    app.update();

    let config = GameConfig::default();
    let (feet, _) = player(&mut app);
    let eye = feet + Vec3::Y * config.eye_height;
    let shot = app
        .world_mut()
        .query::<&Projectile>()
        .single(app.world())
        .map(|p| p.position)
        .expect("one projectile");

    // One strafe frame is walk_speed / 60 ≈ 0.083; spread adds at most ~0.03.
    assert!(
        (shot.x - eye.x).abs() < 0.04,
        "shot x {} lags the eye x {}",
        shot.x,
        eye.x
    );
    assert!((shot.y - eye.y).abs() < 0.04);
}
