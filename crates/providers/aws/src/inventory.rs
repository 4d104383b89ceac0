//! Embedded AWS inventory classification.

use skyforge_core::{Inventory, Result};

/// The classification table shipped with the crate.
const INVENTORY_JSON: &str = include_str!("../data/inventory.json");

/// Build the default AWS inventory from the embedded classification table.
///
/// # Errors
///
/// Returns an invalid-inventory error only if the embedded table is broken,
/// which a unit test guards against.
pub fn default_inventory() -> Result<Inventory> {
    Inventory::from_json(INVENTORY_JSON)
}
