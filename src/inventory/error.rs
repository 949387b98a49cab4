use thiserror::Error;

/// Errors that can occur during inventory operations
///
/// Shops turn these into dialogue ("not enough gold", ...) instead of
/// propagating them; they only surface as real errors for programming mistakes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    /// Item name isn't in the inventory (or the registry)
    #[error("unknown item: {0}")]
    UnknownItem(String),

    /// Tried to remove more items than exist
    #[error("insufficient {name} (requested: {requested}, available: {available})")]
    InsufficientQuantity {
        name: String,
        requested: u32,
        available: u32,
    },

    #[error("insufficient gold (price: {price}, available: {available})")]
    InsufficientGold { price: u32, available: u32 },
}
