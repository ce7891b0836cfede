//! Void Grid Inventory - Spatial Grid Inventory
//!
//! This crate places items in fixed-size 2D slot grids and keeps those grids
//! in step with a server-owned item list.
//!
//! # Features
//!
//! - Items with multi-cell footprints, icons and stack limits
//! - Deterministic room queries with stacking and remainders
//! - One grid per item category
//! - Server-authoritative item list with idempotent replication
//! - Command queue from any peer to the authority
//! - Drag-and-drop placement with swap and merge
//! - Change events for observers
//!
//! # Example
//!
//! ```ignore
//! use void_grid_inventory::prelude::*;
//!
//! let mut inventory = InventoryComponent::authority(&InventoryConfig::default())?;
//! let mut world = PickupRegistry::new();
//!
//! let potion = ItemDescriptor::new("GameItems.Consumables.Potions.Red", ItemCategory::Consumable)
//!     .with_image("icons/potion_red.png")
//!     .with_stackable(10, 3);
//! let source = world.spawn(potion);
//!
//! if let Some(pickup) = world.get(source).cloned() {
//!     inventory.try_add_item(&pickup)?;
//! }
//! inventory.process_commands(&mut world)?;
//! ```

pub mod command;
pub mod component;
pub mod config;
pub mod drag;
pub mod error;
pub mod events;
pub mod grid;
pub mod handle;
pub mod item;
pub mod list;
pub mod pickup;
pub mod spatial;

pub mod prelude {
    pub use crate::command::{command_channel, CommandEnvelope, CommandReceiver, CommandSender, PeerId, ServerCommand};
    pub use crate::component::{AddRequest, InventoryComponent, NetRole};
    pub use crate::config::{GridConfig, InventoryConfig};
    pub use crate::drag::{
        check_hover_position, DragPlacementController, DragState, DropOutcome, HeldItem,
        HoverUpdate, PointerButton, SpaceQueryResult, TileParameters, TileQuadrant,
    };
    pub use crate::error::{InventoryError, Result};
    pub use crate::events::{InventoryEvent, InventoryEventBus, SubscriberId};
    pub use crate::grid::{
        GridSlot, GridSlotState, InventoryGrid, SlotAvailability, SlotAvailabilityResult,
        SlottedItem,
    };
    pub use crate::handle::{ItemArena, ItemHandle};
    pub use crate::item::{
        FragmentKind, GridFragment, ImageFragment, ItemCategory, ItemDescriptor, ItemFragment,
        ItemType, StackableFragment,
    };
    pub use crate::list::{InventoryItem, ItemId, ItemList, ListChange, ListNotification};
    pub use crate::pickup::{PickupComponent, PickupRegistry, PickupWorld, SourceId};
    pub use crate::spatial::SpatialInventory;
}

pub use prelude::*;
