// Inventory system module
//
// This module provides inventory management for the game, including:
// - Gold purse and item entries with quantity, value and power
// - Equipped weapon and armor
// - Errors for impossible removals and purchases

pub mod error;
#[allow(clippy::module_inception)]
pub mod inventory;

// Re-export main types
pub use error::InventoryError;
pub use inventory::{Inventory, ItemEntry};
