//! One grid per item category

use crate::config::InventoryConfig;
use crate::error::Result;
use crate::grid::{InventoryGrid, SlotAvailabilityResult};
use crate::handle::ItemHandle;
use crate::item::{ItemCategory, ItemDescriptor};
use crate::list::{ItemList, ListNotification};

/// The spatial view of an inventory: a grid for every configured category,
/// kept in step with an [`ItemList`] through its notifications.
#[derive(Debug, Clone)]
pub struct SpatialInventory {
    grids: Vec<InventoryGrid>,
    active: Option<ItemCategory>,
}

impl SpatialInventory {
    /// Create empty grids from config. The first grid is shown.
    pub fn new(config: &InventoryConfig) -> Self {
        let grids: Vec<InventoryGrid> = config.grids.iter().map(InventoryGrid::from_config).collect();
        let active = grids.first().map(|grid| grid.category());
        Self { grids, active }
    }

    pub fn grid(&self, category: ItemCategory) -> Option<&InventoryGrid> {
        self.grids.iter().find(|grid| grid.category() == category)
    }

    pub fn grid_mut(&mut self, category: ItemCategory) -> Option<&mut InventoryGrid> {
        self.grids.iter_mut().find(|grid| grid.category() == category)
    }

    pub fn grids(&self) -> &[InventoryGrid] {
        &self.grids
    }

    /// Room query against the grid for the descriptor's category. Items
    /// without a grid never fit.
    pub fn has_room_for_item(&self, descriptor: &ItemDescriptor) -> SlotAvailabilityResult {
        match self.grid(descriptor.category) {
            Some(grid) => grid.has_room_for_item(descriptor),
            None => SlotAvailabilityResult::no_room(descriptor),
        }
    }

    /// Room query that only merges into stacks of `handle`
    pub fn has_room_for_instance(
        &self,
        descriptor: &ItemDescriptor,
        handle: ItemHandle,
    ) -> SlotAvailabilityResult {
        match self.grid(descriptor.category) {
            Some(grid) => grid.has_room_for_instance(descriptor, handle),
            None => SlotAvailabilityResult::no_room(descriptor),
        }
    }

    /// Mirror one list notification into the matching grid
    pub fn apply(&mut self, notification: &ListNotification, list: &ItemList) -> Result<()> {
        match notification {
            ListNotification::Added(handle) => {
                let Some(category) = list.get(*handle).map(|item| item.category()) else {
                    log::debug!("{:?} was removed before it could be placed", handle);
                    return Ok(());
                };
                if let Some(grid) = self.grid_mut(category) {
                    grid.add_item(*handle, list)?;
                }
            }
            ListNotification::Removed { handle, item } => {
                if let Some(grid) = self.grid_mut(item.category()) {
                    grid.remove_item(*handle);
                }
            }
            ListNotification::StackChanged {
                handle,
                previous,
                current,
            } => {
                let Some(category) = list.get(*handle).map(|item| item.category()) else {
                    return Ok(());
                };
                let Some(grid) = self.grid_mut(category) else {
                    return Ok(());
                };
                if current > previous {
                    grid.add_stacks(*handle, current - previous, list)?;
                } else {
                    grid.remove_stacks(*handle, previous - current);
                }
            }
        }
        Ok(())
    }

    /// Rebuild every grid from the list
    pub fn rebuild(&mut self, list: &ItemList) -> Result<()> {
        for grid in &mut self.grids {
            grid.rebuild(list)?;
        }
        Ok(())
    }

    /// Switch the displayed grid. Returns false if no grid has that category.
    pub fn show(&mut self, category: ItemCategory) -> bool {
        if self.grid(category).is_none() {
            return false;
        }
        self.active = Some(category);
        true
    }

    pub fn active_category(&self) -> Option<ItemCategory> {
        self.active
    }

    pub fn active_grid(&self) -> Option<&InventoryGrid> {
        self.active.and_then(|category| self.grid(category))
    }

    pub fn active_grid_mut(&mut self) -> Option<&mut InventoryGrid> {
        let category = self.active?;
        self.grid_mut(category)
    }
}
