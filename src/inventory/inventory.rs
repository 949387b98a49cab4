use std::collections::BTreeMap;

use super::error::InventoryError;
use crate::item::{ItemCategory, ItemDefinition, ItemRegistry};
use serde::{Deserialize, Serialize};

/// One line of the inventory: how many, and the numbers that came with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemEntry {
    pub quantity: u32,
    pub value: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magic_points: Option<u32>,
}

impl ItemEntry {
    pub fn from_definition(definition: &ItemDefinition, quantity: u32) -> Self {
        ItemEntry {
            quantity,
            value: definition.value,
            power: definition.power,
            magic_points: definition.magic_points,
        }
    }
}

/// The player's belongings
///
/// Gold is a plain counter, separate from the item map: running out of gold
/// leaves a balance of 0, while running out of an item removes its entry.
/// No entry is ever stored with quantity 0.
///
/// Equipped gear must also be present in `items`; selling is refused while an
/// item is equipped, so the two never drift apart.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Inventory {
    gold: u32,
    items: BTreeMap<String, ItemEntry>,
    equipped_weapon: Option<String>,
    #[serde(default)]
    equipped_armor: Vec<String>,
}

impl Inventory {
    /// Creates an empty inventory with the given purse
    pub fn new(gold: u32) -> Self {
        Inventory {
            gold,
            ..Self::default()
        }
    }

    // ======================================================================
    // Gold
    // ======================================================================

    pub fn gold(&self) -> u32 {
        self.gold
    }

    pub fn add_gold(&mut self, amount: u32) {
        self.gold = self.gold.saturating_add(amount);
    }

    /// Takes `price` gold, or fails without touching the balance.
    pub fn spend_gold(&mut self, price: u32) -> Result<(), InventoryError> {
        if price > self.gold {
            return Err(InventoryError::InsufficientGold {
                price,
                available: self.gold,
            });
        }
        self.gold -= price;
        Ok(())
    }

    // ======================================================================
    // Items
    // ======================================================================

    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ItemEntry> {
        self.items.get(name)
    }

    /// Counts how many of a specific item are in the inventory
    pub fn quantity(&self, name: &str) -> u32 {
        self.items.get(name).map_or(0, |entry| entry.quantity)
    }

    /// Iterates entries in name order
    pub fn items(&self) -> impl Iterator<Item = (&str, &ItemEntry)> {
        self.items.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Adds `quantity` of an item, stacking onto an existing entry.
    pub fn add_item(&mut self, definition: &ItemDefinition, quantity: u32) {
        if quantity == 0 {
            return;
        }

        self.items
            .entry(definition.name.clone())
            .and_modify(|entry| entry.quantity += quantity)
            .or_insert_with(|| ItemEntry::from_definition(definition, quantity));
    }

    /// Inserts a raw entry, used when a save is rebuilt by hand or in tests.
    pub fn insert_entry(&mut self, name: impl Into<String>, entry: ItemEntry) {
        if entry.quantity > 0 {
            self.items.insert(name.into(), entry);
        }
    }

    /// Removes `quantity` of an item, dropping the entry when it reaches zero.
    ///
    /// Returns how many are left.
    pub fn remove_item(&mut self, name: &str, quantity: u32) -> Result<u32, InventoryError> {
        let entry = self
            .items
            .get_mut(name)
            .ok_or_else(|| InventoryError::UnknownItem(name.to_string()))?;

        if quantity > entry.quantity {
            return Err(InventoryError::InsufficientQuantity {
                name: name.to_string(),
                requested: quantity,
                available: entry.quantity,
            });
        }

        entry.quantity -= quantity;
        let remaining = entry.quantity;

        if remaining == 0 {
            self.items.remove(name);
            self.unequip(name);
        }

        Ok(remaining)
    }

    // ======================================================================
    // Equipment
    // ======================================================================

    pub fn equipped_weapon(&self) -> Option<&str> {
        self.equipped_weapon.as_deref()
    }

    pub fn equipped_armor(&self) -> &[String] {
        &self.equipped_armor
    }

    pub fn is_equipped(&self, name: &str) -> bool {
        self.equipped_weapon.as_deref() == Some(name)
            || self.equipped_armor.iter().any(|armor| armor == name)
    }

    /// Makes an owned item the active weapon.
    pub fn equip_weapon(&mut self, name: &str) -> Result<(), InventoryError> {
        if !self.contains(name) {
            return Err(InventoryError::UnknownItem(name.to_string()));
        }
        self.equipped_weapon = Some(name.to_string());
        Ok(())
    }

    /// Puts on an owned piece of armor; wearing it twice is a no-op.
    pub fn equip_armor(&mut self, name: &str) -> Result<(), InventoryError> {
        if !self.contains(name) {
            return Err(InventoryError::UnknownItem(name.to_string()));
        }
        if !self.equipped_armor.iter().any(|armor| armor == name) {
            self.equipped_armor.push(name.to_string());
        }
        Ok(())
    }

    /// Takes armor off if worn, puts it on otherwise. Returns whether it is now worn.
    pub fn toggle_armor(&mut self, name: &str) -> Result<bool, InventoryError> {
        if let Some(position) = self.equipped_armor.iter().position(|armor| armor == name) {
            self.equipped_armor.remove(position);
            Ok(false)
        } else {
            self.equip_armor(name)?;
            Ok(true)
        }
    }

    fn unequip(&mut self, name: &str) {
        if self.equipped_weapon.as_deref() == Some(name) {
            self.equipped_weapon = None;
        }
        self.equipped_armor.retain(|armor| armor != name);
    }

    /// Power of the equipped weapon, 0 when bare-handed.
    pub fn weapon_power(&self) -> u32 {
        self.equipped_weapon
            .as_deref()
            .and_then(|name| self.items.get(name))
            .and_then(|entry| entry.power)
            .unwrap_or(0)
    }

    /// Sum of the power of every worn armor piece.
    pub fn armor_power(&self) -> u32 {
        self.equipped_armor
            .iter()
            .filter_map(|name| self.items.get(name))
            .filter_map(|entry| entry.power)
            .sum()
    }

    /// Names of owned items in a category, in name order.
    pub fn names_in(&self, category: ItemCategory, registry: &ItemRegistry) -> Vec<String> {
        self.items
            .keys()
            .filter(|name| {
                registry
                    .get(name)
                    .is_some_and(|definition| definition.category == category)
            })
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::registry::{CHAIN_MAIL, HEALING_POTION, RAPIER, WOODEN_SHIELD};

    fn registry() -> ItemRegistry {
        ItemRegistry::create_default()
    }

    #[test]
    fn test_add_stacks_onto_existing_entry() {
        let registry = registry();
        let potion = registry.get(HEALING_POTION).unwrap();
        let mut inventory = Inventory::new(0);

        inventory.add_item(potion, 2);
        inventory.add_item(potion, 1);

        assert_eq!(inventory.quantity(HEALING_POTION), 3);
        assert_eq!(inventory.get(HEALING_POTION).unwrap().power, Some(30));
    }

    #[test]
    fn test_remove_to_zero_drops_entry() {
        let registry = registry();
        let mut inventory = Inventory::new(0);
        inventory.add_item(registry.get(HEALING_POTION).unwrap(), 2);

        assert_eq!(inventory.remove_item(HEALING_POTION, 1), Ok(1));
        assert_eq!(inventory.remove_item(HEALING_POTION, 1), Ok(0));
        assert!(!inventory.contains(HEALING_POTION));
        assert!(inventory.items().all(|(_, entry)| entry.quantity > 0));
    }

    #[test]
    fn test_remove_too_many_fails() {
        let registry = registry();
        let mut inventory = Inventory::new(0);
        inventory.add_item(registry.get(HEALING_POTION).unwrap(), 1);

        let result = inventory.remove_item(HEALING_POTION, 2);
        assert!(matches!(
            result,
            Err(InventoryError::InsufficientQuantity { requested: 2, available: 1, .. })
        ));
        assert_eq!(inventory.quantity(HEALING_POTION), 1);

        assert_eq!(
            inventory.remove_item("Excalibur", 1),
            Err(InventoryError::UnknownItem("Excalibur".to_string()))
        );
    }

    #[test]
    fn test_spend_gold() {
        let mut inventory = Inventory::new(40);
        assert!(inventory.spend_gold(30).is_ok());
        assert_eq!(inventory.gold(), 10);
        assert_eq!(
            inventory.spend_gold(30),
            Err(InventoryError::InsufficientGold { price: 30, available: 10 })
        );
        assert_eq!(inventory.gold(), 10);
    }

    #[test]
    fn test_equipment_powers() {
        let registry = registry();
        let mut inventory = Inventory::new(0);
        assert_eq!(inventory.weapon_power(), 0);

        inventory.add_item(registry.get(RAPIER).unwrap(), 1);
        inventory.add_item(registry.get(CHAIN_MAIL).unwrap(), 1);
        inventory.add_item(registry.get(WOODEN_SHIELD).unwrap(), 1);
        inventory.equip_weapon(RAPIER).unwrap();
        inventory.equip_armor(CHAIN_MAIL).unwrap();
        inventory.equip_armor(WOODEN_SHIELD).unwrap();
        inventory.equip_armor(WOODEN_SHIELD).unwrap();

        assert_eq!(inventory.weapon_power(), 9);
        assert_eq!(inventory.armor_power(), 5);
        assert!(inventory.is_equipped(CHAIN_MAIL));

        assert_eq!(inventory.toggle_armor(CHAIN_MAIL), Ok(false));
        assert_eq!(inventory.armor_power(), 3);
    }

    #[test]
    fn test_cannot_equip_unowned() {
        let mut inventory = Inventory::new(0);
        assert!(inventory.equip_weapon(RAPIER).is_err());
        assert!(inventory.equipped_weapon().is_none());
    }
}
