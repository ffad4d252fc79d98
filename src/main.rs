use bevy::prelude::*;
use bevy::window::WindowResolution;
use bevy_rapier3d::prelude::*;
use splatline::arena::setup_arena;
use splatline::config::{load_game_config, GameConfig};
use splatline::game::GamePlugin;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Splatline".into(),
                resolution: WindowResolution::new(1280, 720),
                ..Default::default()
            }),
            ..Default::default()
        }))
        .insert_resource(ClearColor(Color::srgb(0.53, 0.75, 0.92)))
        // Compiled defaults; load_game_config overwrites them from
        // assets/gameplay.toml (if present) before any Startup system runs.
        .insert_resource(GameConfig::default())
        .add_systems(PreStartup, load_game_config)
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
        .add_plugins(GamePlugin)
        .add_systems(Startup, setup_arena)
        .run();
}
