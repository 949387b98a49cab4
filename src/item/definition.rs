use serde::{Deserialize, Serialize};

/// What kind of thing an item is, which decides how shops and menus treat it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    /// Equipped one at a time; its power is the player's hit ceiling
    Weapon,
    /// Any number can be worn; powers add up against enemy hits
    Armor,
    /// Learned once, cast for magic points
    Spell,
    /// Stackable consumable
    Potion,
    /// Story item that only moves through dialogue
    QuestItem,
    /// Bought and consumed on the spot (inn room)
    Service,
}

/// The blueprint for an item type
///
/// This defines the static properties shared by every copy of an item. The
/// progress record stores the numbers it needs per entry, so a save stays
/// readable even if the registry changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDefinition {
    /// Unique name, also the inventory key
    pub name: String,

    pub category: ItemCategory,

    /// Weapon/armor strength, spell strength, or potion strength
    pub power: Option<u32>,

    /// Magic cost for spells
    pub magic_points: Option<u32>,

    /// Shop price in gold
    pub value: u32,
}

impl ItemDefinition {
    pub fn new(name: impl Into<String>, category: ItemCategory, value: u32) -> Self {
        ItemDefinition {
            name: name.into(),
            category,
            power: None,
            magic_points: None,
            value,
        }
    }

    pub fn with_power(mut self, power: u32) -> Self {
        self.power = Some(power);
        self
    }

    pub fn with_magic_points(mut self, magic_points: u32) -> Self {
        self.magic_points = Some(magic_points);
        self
    }

    /// Whether owning a second copy makes sense.
    pub fn stackable(&self) -> bool {
        matches!(self.category, ItemCategory::Potion)
    }
}
