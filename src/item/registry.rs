use std::collections::HashMap;

use super::definition::{ItemCategory, ItemDefinition};

pub const RAPIER: &str = "Rapier";
pub const LONG_SWORD: &str = "Long Sword";
pub const CHAIN_MAIL: &str = "Chain Mail";
pub const WOODEN_SHIELD: &str = "Wooden Shield";
pub const CURE: &str = "Cure";
pub const FIRE_BLAST: &str = "Fire Blast";
pub const HEALING_POTION: &str = "Healing Potion";
pub const ETHER_POTION: &str = "Ether Potion";
pub const ELIXIR: &str = "ELIXIR";
pub const ROOM: &str = "room";

/// Central registry of all item definitions
///
/// This is the single source of truth for what items exist in the game.
/// Shops, chests and the new-game inventory all look their numbers up here.
#[derive(Debug, Clone)]
pub struct ItemRegistry {
    items: HashMap<String, ItemDefinition>,
}

impl ItemRegistry {
    /// Creates a new empty registry
    pub fn new() -> Self {
        ItemRegistry {
            items: HashMap::new(),
        }
    }

    /// Creates a registry with all game items pre-registered
    pub fn create_default() -> Self {
        let mut registry = Self::new();
        registry.register_base_items();
        registry
    }

    /// Registers an item, replacing and returning any previous definition
    /// with the same name.
    pub fn register(&mut self, item: ItemDefinition) -> Option<ItemDefinition> {
        self.items.insert(item.name.clone(), item)
    }

    pub fn get(&self, name: &str) -> Option<&ItemDefinition> {
        self.items.get(name)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    // ======================================================================
    // Item Registration - Base Game Items
    // ======================================================================

    fn register_base_items(&mut self) {
        use ItemCategory::*;

        let items = [
            ItemDefinition::new(RAPIER, Weapon, 50).with_power(9),
            ItemDefinition::new(LONG_SWORD, Weapon, 150).with_power(12),
            ItemDefinition::new(CHAIN_MAIL, Armor, 50).with_power(2),
            ItemDefinition::new(WOODEN_SHIELD, Armor, 75).with_power(3),
            ItemDefinition::new(CURE, Spell, 50)
                .with_power(50)
                .with_magic_points(25),
            ItemDefinition::new(FIRE_BLAST, Spell, 150)
                .with_power(15)
                .with_magic_points(25),
            ItemDefinition::new(HEALING_POTION, Potion, 15).with_power(30),
            ItemDefinition::new(ETHER_POTION, Potion, 15).with_power(30),
            ItemDefinition::new(ELIXIR, QuestItem, 1000),
            ItemDefinition::new(ROOM, Service, 30),
        ];

        for item in items {
            self.register(item);
        }
    }
}

impl Default for ItemRegistry {
    fn default() -> Self {
        Self::create_default()
    }
}
