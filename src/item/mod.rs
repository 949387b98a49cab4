// Item system module
//
// This module provides the item catalogue for the game, including:
// - Item definitions and categories
// - Item registry with every weapon, armor, spell and potion
// - Item grants handed out by chests and quest characters

pub mod definition;
pub mod registry;

use serde::{Deserialize, Serialize};

// Re-export main types for convenient access
pub use definition::{ItemCategory, ItemDefinition};
pub use registry::ItemRegistry;

/// Name used for gold in chest and quest grants.
pub const GOLD: &str = "GOLD";

/// Items given away by a chest or a character, e.g. `{"name": "GOLD", "quantity": 100}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemGrant {
    pub name: String,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

impl ItemGrant {
    pub fn new(name: impl Into<String>, quantity: u32) -> Self {
        ItemGrant {
            name: name.into(),
            quantity,
        }
    }

    pub fn is_gold(&self) -> bool {
        self.name == GOLD
    }
}

fn default_quantity() -> u32 {
    1
}
