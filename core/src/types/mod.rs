//! Wire and domain types for the inventory feed.

pub mod resource;
pub mod snapshot;

pub use resource::{Resource, ResourceStatus};
pub use snapshot::{InventorySnapshot, StatusSummary};
