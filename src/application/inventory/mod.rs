mod errors;
mod inventory_service;

pub use errors::{InventoryApplicationError, Result};
pub use inventory_service::import_items;
