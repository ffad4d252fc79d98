//! Splatline: first-person paintball gameplay core.
//!
//! Player movement and collision, a multi-weapon firing/reload/scope state
//! machine, paintball ballistics with hit detection, and procedural paint
//! splatter, built on Bevy and Rapier 3D.

pub mod arena;
pub mod config;
pub mod constants;
pub mod damage;
pub mod error;
pub mod game;
pub mod input;
pub mod particles;
pub mod player;
pub mod projectile;
pub mod weapon;
