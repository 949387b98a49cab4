// Game module - mode scheduling and the state shared between modes
//
// This module contains:
// - mod.rs: ModeId, ModeStatus and the Mode trait every screen implements
// - context.rs: GameContext, the explicit bag of shared services
// - controller.rs: Controller, which owns the modes and flips between them

pub mod context;
pub mod controller;

pub use context::GameContext;
pub use controller::Controller;

use crate::error::GameError;
use crate::input_system::InputEvent;
use crate::render::Frame;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every screen the game can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeId {
    MainMenu,
    Instructions,
    LoadGame,
    Town,
    Castle,
    House,
    BrotherHouse,
    Overworld,
    Dungeon,
    Dungeon2,
    Dungeon3,
    Dungeon4,
    Dungeon5,
    Inn,
    WeaponShop,
    ArmorShop,
    MagicShop,
    PotionShop,
    Battle,
    DeathScene,
    Credits,
}

impl ModeId {
    pub const ALL: [ModeId; 21] = [
        ModeId::MainMenu,
        ModeId::Instructions,
        ModeId::LoadGame,
        ModeId::Town,
        ModeId::Castle,
        ModeId::House,
        ModeId::BrotherHouse,
        ModeId::Overworld,
        ModeId::Dungeon,
        ModeId::Dungeon2,
        ModeId::Dungeon3,
        ModeId::Dungeon4,
        ModeId::Dungeon5,
        ModeId::Inn,
        ModeId::WeaponShop,
        ModeId::ArmorShop,
        ModeId::MagicShop,
        ModeId::PotionShop,
        ModeId::Battle,
        ModeId::DeathScene,
        ModeId::Credits,
    ];

    pub const LEVELS: [ModeId; 10] = [
        ModeId::Town,
        ModeId::Castle,
        ModeId::House,
        ModeId::BrotherHouse,
        ModeId::Overworld,
        ModeId::Dungeon,
        ModeId::Dungeon2,
        ModeId::Dungeon3,
        ModeId::Dungeon4,
        ModeId::Dungeon5,
    ];

    pub const SHOPS: [ModeId; 5] = [
        ModeId::Inn,
        ModeId::WeaponShop,
        ModeId::ArmorShop,
        ModeId::MagicShop,
        ModeId::PotionShop,
    ];

    /// Snake-case name, also the map file stem for levels.
    pub fn as_str(self) -> &'static str {
        match self {
            ModeId::MainMenu => "main_menu",
            ModeId::Instructions => "instructions",
            ModeId::LoadGame => "load_game",
            ModeId::Town => "town",
            ModeId::Castle => "castle",
            ModeId::House => "house",
            ModeId::BrotherHouse => "brother_house",
            ModeId::Overworld => "overworld",
            ModeId::Dungeon => "dungeon",
            ModeId::Dungeon2 => "dungeon2",
            ModeId::Dungeon3 => "dungeon3",
            ModeId::Dungeon4 => "dungeon4",
            ModeId::Dungeon5 => "dungeon5",
            ModeId::Inn => "inn",
            ModeId::WeaponShop => "weapon_shop",
            ModeId::ArmorShop => "armor_shop",
            ModeId::MagicShop => "magic_shop",
            ModeId::PotionShop => "potion_shop",
            ModeId::Battle => "battle",
            ModeId::DeathScene => "death_scene",
            ModeId::Credits => "credits",
        }
    }

    pub fn is_level(self) -> bool {
        Self::LEVELS.contains(&self)
    }
}

impl fmt::Display for ModeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModeId {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModeId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| GameError::Config(format!("no mode named '{}'", s)))
    }
}

/// Scheduling flags every mode carries.
///
/// A mode asks to leave by setting `next` and then `done`; the controller
/// acts on it at the top of the following tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModeStatus {
    pub done: bool,
    pub next: Option<ModeId>,
    /// Mode that was active before this one was entered
    pub previous: Option<ModeId>,
}

impl ModeStatus {
    /// Request a switch to `next`.
    pub fn finish(&mut self, next: ModeId) {
        self.next = Some(next);
        self.done = true;
    }
}

/// One screen of the game.
pub trait Mode {
    fn id(&self) -> ModeId;

    fn status(&self) -> &ModeStatus;

    fn status_mut(&mut self) -> &mut ModeStatus;

    /// Called every time the mode becomes active. Builds all per-visit state.
    fn startup(&mut self, ctx: &mut GameContext) -> Result<(), GameError>;

    /// Raw key events, delivered before `update` in the same tick.
    fn get_event(&mut self, _event: InputEvent, _ctx: &mut GameContext) {}

    fn update(&mut self, ctx: &mut GameContext) -> Result<(), GameError>;

    fn draw(&self, ctx: &GameContext, frame: &mut Frame);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_names_round_trip() {
        for id in ModeId::ALL {
            assert_eq!(id.as_str().parse::<ModeId>().unwrap(), id);
        }
        assert!("castle_roof".parse::<ModeId>().is_err());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&ModeId::BrotherHouse).unwrap();
        assert_eq!(json, "\"brother_house\"");
        assert_eq!(ModeId::WeaponShop.to_string(), "weapon_shop");
    }

    #[test]
    fn test_finish_sets_next_and_done() {
        let mut status = ModeStatus::default();
        status.finish(ModeId::Town);
        assert!(status.done);
        assert_eq!(status.next, Some(ModeId::Town));
        assert!(ModeId::Dungeon3.is_level());
        assert!(!ModeId::Inn.is_level());
    }
}
