//! The player's persistent progress
//!
//! One [`ProgressRecord`] exists per session. It is created fresh on the
//! instructions screen or loaded from the save slot, every mode reads and
//! mutates it through the game context, and it is the only state that survives
//! a mode switch.
//!
//! # Invariants
//!
//! - `current <= maximum` for health and magic; every mutation goes through
//!   [`Meter`], which clamps.
//! - No inventory entry has quantity 0 (see [`Inventory`]).

use crate::animation::Direction;
use crate::combat;
use crate::game::ModeId;
use crate::inventory::Inventory;
use crate::item::ItemRegistry;
use crate::item::registry::{ETHER_POTION, HEALING_POTION, RAPIER};
use log::warn;
use serde::{Deserialize, Serialize};

/// Random encounter budget for a new game.
pub const STARTING_BATTLE_COUNTER: i32 = 50;

/// Number of treasure chests in the world, ids `1..=TREASURE_CHESTS`.
pub const TREASURE_CHESTS: usize = 5;

/// A clamped current/maximum pair (health, magic).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MeterData")]
pub struct Meter {
    current: u32,
    maximum: u32,
}

/// Unchecked wire form of a [`Meter`].
#[derive(Deserialize)]
struct MeterData {
    current: u32,
    maximum: u32,
}

impl TryFrom<MeterData> for Meter {
    type Error = String;

    fn try_from(data: MeterData) -> Result<Self, Self::Error> {
        if data.current > data.maximum {
            return Err(format!(
                "meter current {} exceeds maximum {}",
                data.current, data.maximum
            ));
        }
        Ok(Meter {
            current: data.current,
            maximum: data.maximum,
        })
    }
}

impl Meter {
    pub fn full(maximum: u32) -> Self {
        Meter {
            current: maximum,
            maximum,
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn maximum(&self) -> u32 {
        self.maximum
    }

    /// Adds up to the maximum. Returns the amount actually gained.
    pub fn restore(&mut self, amount: u32) -> u32 {
        let before = self.current;
        self.current = self.current.saturating_add(amount).min(self.maximum);
        self.current - before
    }

    /// Removes down to zero. Returns the amount actually lost.
    pub fn drain(&mut self, amount: u32) -> u32 {
        let before = self.current;
        self.current = self.current.saturating_sub(amount);
        before - self.current
    }

    pub fn refill(&mut self) {
        self.current = self.maximum;
    }

    pub fn is_empty(&self) -> bool {
        self.current == 0
    }

    fn grow_maximum(&mut self, amount: u32) {
        self.maximum += amount;
    }
}

/// Result of applying a battle's experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelUp {
    pub new_level: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub level: u32,
    pub health: Meter,
    pub magic: Meter,
    pub experience_to_next_level: i32,
}

impl PlayerStats {
    pub fn new(health: u32, magic: u32) -> Self {
        PlayerStats {
            level: 1,
            health: Meter::full(health),
            magic: Meter::full(magic),
            experience_to_next_level: 30,
        }
    }

    /// Applies an experience award.
    ///
    /// At or below zero remaining experience the player gains one level: max
    /// health +25%, max magic +20% (truncating), and the next threshold is
    /// reduced by the overflow. Current health and magic are left alone.
    pub fn gain_experience(&mut self, award: u32) -> Option<LevelUp> {
        self.experience_to_next_level -= award as i32;
        if self.experience_to_next_level > 0 {
            return None;
        }

        let overflow = -self.experience_to_next_level;
        self.level += 1;
        let health_gain = self.health.maximum() / 4;
        let magic_gain = self.magic.maximum() / 5;
        self.health.grow_maximum(health_gain);
        self.magic.grow_maximum(magic_gain);
        self.experience_to_next_level = combat::experience_for_level(self.level) - overflow;

        Some(LevelUp {
            new_level: self.level,
        })
    }

    /// Inn room: everything back to full.
    pub fn full_restore(&mut self) {
        self.health.refill();
        self.magic.refill();
    }
}

/// Story progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestFlags {
    /// First random battle is the scripted three-devil fight
    pub start_of_game: bool,
    pub talked_to_king: bool,
    pub talked_to_sick_brother: bool,
    pub has_brother_elixir: bool,
    pub elixir_received: bool,
    /// The crown has been taken back from the evil wizard
    pub crown_quest: bool,
    pub delivered_crown: bool,
    /// `true` while chest `i + 1` is still unopened
    treasure: [bool; TREASURE_CHESTS],
}

impl Default for QuestFlags {
    fn default() -> Self {
        QuestFlags {
            start_of_game: true,
            talked_to_king: false,
            talked_to_sick_brother: false,
            has_brother_elixir: false,
            elixir_received: false,
            crown_quest: false,
            delivered_crown: false,
            treasure: [true; TREASURE_CHESTS],
        }
    }
}

impl QuestFlags {
    /// Unknown chest ids count as already opened.
    pub fn chest_unopened(&self, id: u32) -> bool {
        chest_slot(id).is_some_and(|slot| self.treasure[slot])
    }

    pub fn open_chest(&mut self, id: u32) {
        if let Some(slot) = chest_slot(id) {
            self.treasure[slot] = false;
        }
    }
}

fn chest_slot(id: u32) -> Option<usize> {
    let slot = (id as usize).checked_sub(1)?;
    (slot < TREASURE_CHESTS).then_some(slot)
}

/// Starting values that come from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewGameSettings {
    pub starting_gold: u32,
    pub starting_health: u32,
    pub starting_magic: u32,
}

impl Default for NewGameSettings {
    fn default() -> Self {
        NewGameSettings {
            starting_gold: 100,
            starting_health: 70,
            starting_magic: 70,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub inventory: Inventory,
    pub stats: PlayerStats,
    pub quest: QuestFlags,
    /// Tile the player stood on when leaving a level
    pub last_location: (i32, i32),
    pub last_direction: Direction,
    /// Mode the player came from, used to pick re-entry points
    pub last_state: Option<ModeId>,
    /// Sprite that triggered the pending battle, if any
    pub battle_type: Option<String>,
    /// Tile steps left before a random encounter, in units of 5
    pub battle_counter: i32,
}

impl ProgressRecord {
    pub fn new_game(settings: &NewGameSettings, registry: &ItemRegistry) -> Self {
        let mut inventory = Inventory::new(settings.starting_gold);

        for (name, quantity) in [(HEALING_POTION, 2), (ETHER_POTION, 1), (RAPIER, 1)] {
            if let Some(definition) = registry.get(name) {
                inventory.add_item(definition, quantity);
            }
        }
        if let Err(e) = inventory.equip_weapon(RAPIER) {
            warn!("new game starts unarmed: {}", e);
        }

        ProgressRecord {
            inventory,
            stats: PlayerStats::new(settings.starting_health, settings.starting_magic),
            quest: QuestFlags::default(),
            last_location: (0, 0),
            last_direction: Direction::Down,
            last_state: None,
            battle_type: None,
            battle_counter: STARTING_BATTLE_COUNTER,
        }
    }
}

impl Default for ProgressRecord {
    fn default() -> Self {
        Self::new_game(&NewGameSettings::default(), &ItemRegistry::create_default())
    }
}
