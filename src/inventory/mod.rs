//! File inventory: the canonical table of tracked files.
//!
//! The inventory is produced once per scan and is read-only input to the
//! graph builder. Only the builder writes the derived reference sets.

mod scanner;
mod types;

pub use scanner::scan;
pub use types::{normalize_key, FileKey, FileRecord, Inventory, InventoryEntry, Referrer};
