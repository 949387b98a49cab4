//! The Stolen Crown
//!
//! A small tile-based RPG engine. Every screen is a [`game::Mode`]; the
//! [`game::Controller`] owns them all and flips between them when the active
//! one reports it is done. Modes draw by pushing [`render::DrawCommand`]s into
//! a [`render::Frame`], so everything below the front-end runs headless.
//!
//! The SDL front-end lives behind the `sdl` feature.

pub mod actor;
pub mod animation;
pub mod assets;
pub mod audio;
pub mod battle;
pub mod collision;
pub mod combat;
pub mod config;
pub mod error;
pub mod game;
pub mod grid;
pub mod gui;
pub mod input_system;
pub mod inventory;
pub mod item;
pub mod level;
pub mod player;
pub mod progress;
pub mod render;
pub mod save;
pub mod shop;
pub mod text;
pub mod timer;

#[cfg(feature = "sdl")]
pub mod canvas;

pub use error::GameError;
pub use game::{Controller, GameContext, Mode, ModeId};
