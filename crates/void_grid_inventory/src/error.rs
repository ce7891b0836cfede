//! Error types for the grid inventory

use crate::command::PeerId;
use crate::handle::ItemHandle;
use crate::item::ItemType;
use crate::list::ItemId;
use crate::pickup::SourceId;
use thiserror::Error;

/// Inventory errors. None of these escape the coordinator: it logs them and
/// turns the user-visible ones into events.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InventoryError {
    /// A room query found nowhere to put the item
    #[error("No room in inventory for {0}")]
    NoRoom(ItemType),

    /// A slot referenced an item that no longer exists
    #[error("Stale item reference: {0:?}")]
    StaleReference(ItemHandle),

    /// A footprint would leave the grid
    #[error("Footprint {width}x{height} anchored at index {index} exceeds grid bounds")]
    OutOfBounds { index: usize, width: i32, height: i32 },

    /// A mutation was attempted without write authority
    #[error("Operation requires inventory authority")]
    AuthorityViolation,

    /// A replicated change named an item this list does not know
    #[error("Unknown item: {0:?}")]
    UnknownItem(ItemId),

    /// No instance of the requested type exists
    #[error("No item of type '{0}' in inventory")]
    NoItemOfType(ItemType),

    /// The world does not know the pickup source
    #[error("Unknown pickup source: {0:?}")]
    UnknownSource(SourceId),

    /// A command arrived twice or out of order
    #[error("Duplicate command {sequence} from peer {peer:?}")]
    DuplicateCommand { peer: PeerId, sequence: u64 },

    /// Configuration failed validation or parsing
    #[error("Invalid inventory configuration: {0}")]
    InvalidConfig(String),

    /// The command channel has no receiver
    #[error("Command channel closed")]
    ChannelClosed,

    /// The bounded command channel is full
    #[error("Command channel full")]
    ChannelFull,

    /// A drag operation needs a held item
    #[error("No item is being held")]
    NotHolding,
}

/// Result type for inventory operations
pub type Result<T> = std::result::Result<T, InventoryError>;
