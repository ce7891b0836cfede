//! Spatial grid allocation
//!
//! An [`InventoryGrid`] is a fixed Rows x Columns array of [`GridSlot`]s
//! addressed by `index = x + y * columns`. Items may cover more than one
//! cell; the lowest index of the covered rectangle is the item's anchor, every
//! covered cell points back to it, and the stack count is only meaningful on
//! the anchor.
//!
//! Placement is split in two. [`InventoryGrid::has_room_for_item`] is a pure
//! query producing a [`SlotAvailabilityResult`]; [`InventoryGrid::commit`]
//! writes such a result into the slots.

use crate::config::GridConfig;
use crate::error::{InventoryError, Result};
use crate::handle::ItemHandle;
use crate::item::{ItemCategory, ItemDescriptor, ItemType};
use crate::list::{InventoryItem, ItemList};
use glam::{IVec2, Vec2};
use std::collections::{BTreeMap, HashSet};

/// Visual state of a slot. Never authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridSlotState {
    Unoccupied,
    Occupied,
    Selected,
    GrayedOut,
}

impl Default for GridSlotState {
    fn default() -> Self {
        Self::Unoccupied
    }
}

/// One cell of the grid
#[derive(Debug, Clone, PartialEq)]
pub struct GridSlot {
    tile_index: usize,
    item: Option<ItemHandle>,
    upper_left_index: Option<usize>,
    stack_count: u32,
    state: GridSlotState,
}

impl GridSlot {
    fn new(tile_index: usize) -> Self {
        Self {
            tile_index,
            item: None,
            upper_left_index: None,
            stack_count: 0,
            state: GridSlotState::Unoccupied,
        }
    }

    pub fn tile_index(&self) -> usize {
        self.tile_index
    }

    /// Item covering this cell (non-owning)
    pub fn item(&self) -> Option<ItemHandle> {
        self.item
    }

    /// Anchor of the item covering this cell
    pub fn upper_left_index(&self) -> Option<usize> {
        self.upper_left_index
    }

    /// Cached stack count; only valid on an anchor
    pub fn stack_count(&self) -> u32 {
        self.stack_count
    }

    pub fn state(&self) -> GridSlotState {
        self.state
    }

    pub fn is_occupied(&self) -> bool {
        self.item.is_some()
    }

    fn clear(&mut self) {
        self.item = None;
        self.upper_left_index = None;
        self.stack_count = 0;
        self.state = GridSlotState::Unoccupied;
    }
}

/// Per-anchor data the renderer needs to draw an item and the grid needs to
/// judge stacking without resolving the item handle.
#[derive(Debug, Clone, PartialEq)]
pub struct SlottedItem {
    pub handle: ItemHandle,
    pub item_type: ItemType,
    pub dimensions: IVec2,
    pub stackable: bool,
    pub max_stack_size: u32,
    pub padding: f32,
    /// Icon path; None means nothing is drawn for this item
    pub icon: Option<String>,
}

impl SlottedItem {
    /// Build from a descriptor
    pub fn new(handle: ItemHandle, descriptor: &ItemDescriptor) -> Self {
        Self {
            handle,
            item_type: descriptor.item_type.clone(),
            dimensions: descriptor.dimensions(),
            stackable: descriptor.is_stackable(),
            max_stack_size: descriptor.max_stack_size(),
            padding: descriptor.padding(),
            icon: descriptor.image().map(|image| image.icon.clone()),
        }
    }
}

/// Room found in a single slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotAvailability {
    /// Anchor index to fill
    pub index: usize,
    /// Units to put there (0 for non-stackable items)
    pub amount_to_fill: u32,
    /// Whether the slot already holds a stack of this item type
    pub item_at_index: bool,
}

/// Outcome of a room query
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SlotAvailabilityResult {
    /// First existing stack chosen as a merge target
    pub item: Option<ItemHandle>,
    /// Units that fit
    pub total_room_to_fill: u32,
    /// Units that do not fit
    pub remainder: u32,
    /// Whether the queried item stacks
    pub stackable: bool,
    /// Slots to fill, in ascending index order
    pub slot_availabilities: Vec<SlotAvailability>,
}

impl SlotAvailabilityResult {
    /// Result for an item that cannot go anywhere
    pub fn no_room(descriptor: &ItemDescriptor) -> Self {
        let stackable = descriptor.is_stackable();
        Self {
            stackable,
            remainder: if stackable { descriptor.stack_count() } else { 1 },
            ..Default::default()
        }
    }

    pub fn has_room(&self) -> bool {
        self.total_room_to_fill > 0
    }
}

/// Grid allocator for one item category
#[derive(Debug, Clone)]
pub struct InventoryGrid {
    category: ItemCategory,
    rows: usize,
    columns: usize,
    tile_size: f32,
    slots: Vec<GridSlot>,
    /// Anchor index -> item drawn there
    slotted: BTreeMap<usize, SlottedItem>,
}

impl InventoryGrid {
    /// Create an empty grid with 64px tiles
    pub fn new(category: ItemCategory, rows: usize, columns: usize) -> Self {
        Self::from_config(&GridConfig::new(category, rows, columns))
    }

    /// Create an empty grid from config
    pub fn from_config(config: &GridConfig) -> Self {
        let slots = (0..config.rows * config.columns).map(GridSlot::new).collect();
        Self {
            category: config.category,
            rows: config.rows,
            columns: config.columns,
            tile_size: config.tile_size,
            slots,
            slotted: BTreeMap::new(),
        }
    }

    pub fn category(&self) -> ItemCategory {
        self.category
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    pub fn slots(&self) -> &[GridSlot] {
        &self.slots
    }

    pub fn slot(&self, index: usize) -> Option<&GridSlot> {
        self.slots.get(index)
    }

    /// Items anchored in this grid, by anchor index
    pub fn slotted_items(&self) -> impl Iterator<Item = (usize, &SlottedItem)> {
        self.slotted.iter().map(|(index, item)| (*index, item))
    }

    /// Item anchored at `index`
    pub fn slotted_item(&self, index: usize) -> Option<&SlottedItem> {
        self.slotted.get(&index)
    }

    /// Anchor and item covering `index`
    pub fn item_at(&self, index: usize) -> Option<(usize, &SlottedItem)> {
        let anchor = self.slots.get(index)?.upper_left_index?;
        self.slotted.get(&anchor).map(|item| (anchor, item))
    }

    /// Whether any stack of `handle` is in this grid
    pub fn contains_item(&self, handle: ItemHandle) -> bool {
        self.slotted.values().any(|item| item.handle == handle)
    }

    /// Units of `handle` across all of its stacks here
    pub fn stack_total(&self, handle: ItemHandle) -> u32 {
        self.slotted
            .iter()
            .filter(|(_, item)| item.handle == handle)
            .map(|(anchor, item)| {
                if item.stackable {
                    self.slots[*anchor].stack_count
                } else {
                    1
                }
            })
            .sum()
    }

    pub fn matches_category(&self, item: &InventoryItem) -> bool {
        item.category() == self.category
    }

    pub fn index_from_position(&self, position: IVec2) -> i32 {
        position.x + position.y * self.columns as i32
    }

    pub fn position_from_index(&self, index: usize) -> IVec2 {
        IVec2::new((index % self.columns) as i32, (index / self.columns) as i32)
    }

    /// Whether a footprint anchored at `index` stays inside the grid
    pub fn is_in_grid_bounds(&self, index: usize, dimensions: IVec2) -> bool {
        if index >= self.slots.len() {
            return false;
        }
        let end_column = (index % self.columns) as i32 + dimensions.x;
        let end_row = (index / self.columns) as i32 + dimensions.y;
        end_column <= self.columns as i32 && end_row <= self.rows as i32
    }

    /// Whether a footprint with its upper-left cell at `position` stays
    /// inside the grid
    pub fn is_position_in_bounds(&self, position: IVec2, dimensions: IVec2) -> bool {
        position.x >= 0
            && position.y >= 0
            && position.x + dimensions.x <= self.columns as i32
            && position.y + dimensions.y <= self.rows as i32
    }

    /// Cells of a footprint anchored at `index`, clipped to the grid, row by row
    pub fn footprint(&self, index: usize, dimensions: IVec2) -> Vec<usize> {
        let origin = self.position_from_index(index);
        let mut cells = Vec::with_capacity((dimensions.x * dimensions.y).max(0) as usize);
        for y in origin.y..origin.y + dimensions.y {
            for x in origin.x..origin.x + dimensions.x {
                if x >= 0 && y >= 0 && (x as usize) < self.columns && (y as usize) < self.rows {
                    cells.push(x as usize + y as usize * self.columns);
                }
            }
        }
        cells
    }

    /// Compute every slot that should receive units of `descriptor`.
    ///
    /// Slots are scanned once in ascending index order, so the lowest index
    /// offering room always wins. A candidate anchor passes when every cell of
    /// the footprint is unclaimed and either empty or part of a same-type
    /// stackable item anchored at exactly this index whose stack has room.
    pub fn has_room_for_item(&self, descriptor: &ItemDescriptor) -> SlotAvailabilityResult {
        self.room_query(descriptor, None)
    }

    /// Room query that only merges into stacks of `handle`. Stacks of other
    /// instances of the same type count as occupied.
    pub fn has_room_for_instance(
        &self,
        descriptor: &ItemDescriptor,
        handle: ItemHandle,
    ) -> SlotAvailabilityResult {
        self.room_query(descriptor, Some(handle))
    }

    fn room_query(&self, descriptor: &ItemDescriptor, owner: Option<ItemHandle>) -> SlotAvailabilityResult {
        let stackable = descriptor.is_stackable();
        let max_stack_size = descriptor.max_stack_size();
        let dimensions = descriptor.dimensions();
        let mut amount_to_fill = if stackable { descriptor.stack_count() } else { 1 };

        let mut result = SlotAvailabilityResult {
            stackable,
            remainder: amount_to_fill,
            ..Default::default()
        };

        let mut checked_indices = HashSet::new();
        for index in 0..self.slots.len() {
            if amount_to_fill == 0 {
                break;
            }
            if checked_indices.contains(&index) {
                continue;
            }
            if !self.is_in_grid_bounds(index, dimensions) {
                continue;
            }

            let Some(tentatively_claimed) = self.room_at_index(
                index,
                dimensions,
                &checked_indices,
                &descriptor.item_type,
                max_stack_size,
                owner,
            ) else {
                continue;
            };

            let amount_in_slot =
                self.fill_amount_for_slot(stackable, max_stack_size, amount_to_fill, index);
            if amount_in_slot == 0 {
                continue;
            }
            checked_indices.extend(tentatively_claimed);

            let slot = &self.slots[index];
            let item_at_index = slot.item.is_some();
            if item_at_index && result.item.is_none() {
                result.item = slot.item;
            }

            result.total_room_to_fill += amount_in_slot;
            result.slot_availabilities.push(SlotAvailability {
                index: if item_at_index {
                    slot.upper_left_index.unwrap_or(index)
                } else {
                    index
                },
                amount_to_fill: if stackable { amount_in_slot } else { 0 },
                item_at_index,
            });

            amount_to_fill -= amount_in_slot;
            result.remainder = amount_to_fill;
        }

        result
    }

    fn room_at_index(
        &self,
        index: usize,
        dimensions: IVec2,
        checked_indices: &HashSet<usize>,
        item_type: &ItemType,
        max_stack_size: u32,
        owner: Option<ItemHandle>,
    ) -> Option<Vec<usize>> {
        let mut tentatively_claimed = Vec::new();
        for sub_index in self.footprint(index, dimensions) {
            if !self.check_slot_constraints(
                index,
                sub_index,
                checked_indices,
                item_type,
                max_stack_size,
                owner,
            ) {
                return None;
            }
            tentatively_claimed.push(sub_index);
        }
        Some(tentatively_claimed)
    }

    fn check_slot_constraints(
        &self,
        index: usize,
        sub_index: usize,
        checked_indices: &HashSet<usize>,
        item_type: &ItemType,
        max_stack_size: u32,
        owner: Option<ItemHandle>,
    ) -> bool {
        if checked_indices.contains(&sub_index) {
            return false;
        }

        let sub_slot = &self.slots[sub_index];
        if sub_slot.item.is_none() {
            return true;
        }

        // Stacking only happens through the anchor of the existing item
        if sub_slot.upper_left_index != Some(index) {
            return false;
        }

        let Some(existing) = self.slotted.get(&index) else {
            return false;
        };
        if !existing.stackable || !existing.item_type.matches_exact(item_type) {
            return false;
        }
        if owner.is_some_and(|owner| owner != existing.handle) {
            return false;
        }

        self.slots[index].stack_count < max_stack_size
    }

    fn fill_amount_for_slot(
        &self,
        stackable: bool,
        max_stack_size: u32,
        amount_to_fill: u32,
        index: usize,
    ) -> u32 {
        if !stackable {
            return 1;
        }
        let room_in_slot = max_stack_size.saturating_sub(self.stack_amount(index));
        amount_to_fill.min(room_in_slot)
    }

    fn stack_amount(&self, index: usize) -> u32 {
        let slot = &self.slots[index];
        match slot.upper_left_index {
            Some(anchor) => self.slots[anchor].stack_count,
            None => slot.stack_count,
        }
    }

    /// Write a room query result into the grid for `handle`.
    ///
    /// Merge entries grow the existing anchor's stack; fresh entries claim
    /// their footprint. The item and every merge target are re-resolved
    /// through `list` first. A merge target that is stale or belongs to
    /// another instance is skipped, as is a footprint that filled up since
    /// the query. Returns the units placed.
    pub fn commit(
        &mut self,
        result: &SlotAvailabilityResult,
        handle: ItemHandle,
        list: &ItemList,
    ) -> Result<u32> {
        let item = list
            .get(handle)
            .ok_or(InventoryError::StaleReference(handle))?;
        let descriptor = item.descriptor();

        let mut placed = 0;
        for availability in &result.slot_availabilities {
            if availability.item_at_index {
                let target = self.slots.get(availability.index).and_then(|s| s.item);
                match target {
                    Some(target) if target == handle && list.contains(target) => {
                        placed += self.add_stacks_at_index(availability.index, availability.amount_to_fill);
                    }
                    Some(target) if target != handle => {
                        log::warn!(
                            "Stack at {} belongs to {:?}, not {:?}; skipping {} units",
                            availability.index,
                            target,
                            handle,
                            availability.amount_to_fill
                        );
                    }
                    _ => {
                        log::warn!(
                            "Stack target at {} is gone; skipping {} units of {}",
                            availability.index,
                            availability.amount_to_fill,
                            descriptor.item_type
                        );
                    }
                }
                continue;
            }

            let footprint = self.footprint(availability.index, descriptor.dimensions());
            if footprint.iter().any(|cell| self.slots[*cell].item.is_some()) {
                log::warn!(
                    "Slot {} filled up before commit; skipping {}",
                    availability.index,
                    descriptor.item_type
                );
                continue;
            }

            self.add_item_at_index(handle, descriptor, availability.index)?;
            self.update_grid_slots(
                handle,
                descriptor,
                availability.index,
                result.stackable,
                availability.amount_to_fill,
            )?;
            placed += if result.stackable {
                availability.amount_to_fill
            } else {
                1
            };
        }

        Ok(placed)
    }

    /// Register the item anchored at `index` for drawing
    pub fn add_item_at_index(
        &mut self,
        handle: ItemHandle,
        descriptor: &ItemDescriptor,
        index: usize,
    ) -> Result<()> {
        let dimensions = descriptor.dimensions();
        if !self.is_in_grid_bounds(index, dimensions) {
            return Err(InventoryError::OutOfBounds {
                index,
                width: dimensions.x,
                height: dimensions.y,
            });
        }
        if descriptor.image().is_none() {
            log::debug!("{} has no image; it will not be drawn", descriptor.item_type);
        }
        self.slotted.insert(index, SlottedItem::new(handle, descriptor));
        Ok(())
    }

    /// Claim the footprint anchored at `index` for `handle`
    pub fn update_grid_slots(
        &mut self,
        handle: ItemHandle,
        descriptor: &ItemDescriptor,
        index: usize,
        stackable: bool,
        stack_amount: u32,
    ) -> Result<()> {
        let dimensions = descriptor.dimensions();
        if !self.is_in_grid_bounds(index, dimensions) {
            return Err(InventoryError::OutOfBounds {
                index,
                width: dimensions.x,
                height: dimensions.y,
            });
        }

        if stackable {
            self.slots[index].stack_count = stack_amount;
        }
        for cell in self.footprint(index, dimensions) {
            let slot = &mut self.slots[cell];
            slot.item = Some(handle);
            slot.upper_left_index = Some(index);
            slot.state = GridSlotState::Occupied;
        }
        log::debug!("Placed {} at {} ({}x{})", descriptor.item_type, index, dimensions.x, dimensions.y);
        Ok(())
    }

    fn add_stacks_at_index(&mut self, index: usize, amount: u32) -> u32 {
        let anchor = self.slots[index].upper_left_index.unwrap_or(index);
        let max_stack_size = self
            .slotted
            .get(&anchor)
            .map(|item| item.max_stack_size)
            .unwrap_or(u32::MAX);
        let slot = &mut self.slots[anchor];
        let added = amount.min(max_stack_size.saturating_sub(slot.stack_count));
        if added < amount {
            log::warn!("Stack at {} overflowed by {}", anchor, amount - added);
        }
        slot.stack_count += added;
        added
    }

    /// Place a newly added item in stacks of its own. Ignores items of other
    /// categories and items already shown here. Returns the units placed.
    pub fn add_item(&mut self, handle: ItemHandle, list: &ItemList) -> Result<u32> {
        let item = list
            .get(handle)
            .ok_or(InventoryError::StaleReference(handle))?;
        if !self.matches_category(item) {
            return Ok(0);
        }
        if self.contains_item(handle) {
            log::debug!("{:?} is already in the {:?} grid", handle, self.category);
            return Ok(0);
        }

        let result = self.has_room_for_instance(item.descriptor(), handle);
        if result.remainder > 0 {
            log::warn!(
                "{:?} grid cannot show {} units of {}",
                self.category,
                result.remainder,
                item.item_type()
            );
        }
        self.commit(&result, handle, list)
    }

    /// Place `amount` more units of an item already in the list
    pub fn add_stacks(&mut self, handle: ItemHandle, amount: u32, list: &ItemList) -> Result<u32> {
        let item = list
            .get(handle)
            .ok_or(InventoryError::StaleReference(handle))?;
        if !self.matches_category(item) || amount == 0 {
            return Ok(0);
        }

        let result = self.has_room_for_instance(&item.descriptor().with_stack_count(amount), handle);
        if result.remainder > 0 {
            log::warn!(
                "{:?} grid cannot show {} units of {}",
                self.category,
                result.remainder,
                item.item_type()
            );
        }
        self.commit(&result, handle, list)
    }

    /// Clear every stack of `handle`. Returns the number of stacks removed.
    pub fn remove_item(&mut self, handle: ItemHandle) -> usize {
        let anchors: Vec<usize> = self
            .slotted
            .iter()
            .filter(|(_, item)| item.handle == handle)
            .map(|(anchor, _)| *anchor)
            .collect();
        for anchor in &anchors {
            self.remove_item_at(*anchor);
        }
        anchors.len()
    }

    /// Take `amount` units of `handle` out of its stacks, highest anchor
    /// first. Emptied stacks are cleared. Returns the units removed.
    pub fn remove_stacks(&mut self, handle: ItemHandle, amount: u32) -> u32 {
        let anchors: Vec<usize> = self
            .slotted
            .iter()
            .rev()
            .filter(|(_, item)| item.handle == handle)
            .map(|(anchor, _)| *anchor)
            .collect();

        let mut remaining = amount;
        for anchor in anchors {
            if remaining == 0 {
                break;
            }
            let count = self.slots[anchor].stack_count;
            let taken = count.min(remaining);
            remaining -= taken;
            if taken == count {
                self.remove_item_at(anchor);
            } else {
                self.slots[anchor].stack_count -= taken;
            }
        }
        amount - remaining
    }

    /// Detach the item covering `index` from the grid. Returns it with its
    /// stack count.
    pub fn remove_item_at(&mut self, index: usize) -> Option<(SlottedItem, u32)> {
        let anchor = self.slots.get(index)?.upper_left_index?;
        let item = self.slotted.remove(&anchor)?;
        let stack_count = self.slots[anchor].stack_count;
        for cell in self.footprint(anchor, item.dimensions) {
            self.slots[cell].clear();
        }
        Some((item, stack_count))
    }

    /// Put a detached item back at `index`. Fails when the footprint leaves
    /// the grid or overlaps another item.
    pub fn place_item(&mut self, index: usize, item: SlottedItem, stack_count: u32) -> Result<()> {
        let dimensions = item.dimensions;
        let out_of_bounds = InventoryError::OutOfBounds {
            index,
            width: dimensions.x,
            height: dimensions.y,
        };
        if !self.is_in_grid_bounds(index, dimensions) {
            return Err(out_of_bounds);
        }
        let footprint = self.footprint(index, dimensions);
        if footprint.iter().any(|cell| self.slots[*cell].item.is_some()) {
            return Err(out_of_bounds);
        }

        for cell in footprint {
            let slot = &mut self.slots[cell];
            slot.item = Some(item.handle);
            slot.upper_left_index = Some(index);
            slot.state = GridSlotState::Occupied;
        }
        self.slots[index].stack_count = if item.stackable { stack_count } else { 0 };
        self.slotted.insert(index, item);
        Ok(())
    }

    /// Lowest anchor whose footprint is in bounds and completely empty
    pub fn first_free_anchor(&self, dimensions: IVec2) -> Option<usize> {
        (0..self.slots.len()).find(|index| {
            self.is_in_grid_bounds(*index, dimensions)
                && self
                    .footprint(*index, dimensions)
                    .iter()
                    .all(|cell| self.slots[*cell].item.is_none())
        })
    }

    /// Change the stack count cached at an anchor
    pub fn set_stack_count(&mut self, index: usize, stack_count: u32) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.stack_count = stack_count;
        }
    }

    /// Set a slot's visual state
    pub fn set_slot_state(&mut self, index: usize, state: GridSlotState) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.state = state;
        }
    }

    /// Reset a slot's visual state from its contents
    pub fn restore_slot_state(&mut self, index: usize) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.state = if slot.item.is_some() {
                GridSlotState::Occupied
            } else {
                GridSlotState::Unoccupied
            };
        }
    }

    /// Empty every slot
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.clear();
        }
        self.slotted.clear();
    }

    /// Rebuild the grid from the list alone, oldest item first. The same
    /// list always yields the same layout.
    pub fn rebuild(&mut self, list: &ItemList) -> Result<()> {
        self.clear();
        let handles: Vec<ItemHandle> = list.all_items().map(|(handle, _)| handle).collect();
        for handle in handles {
            self.add_item(handle, list)?;
        }
        Ok(())
    }

    /// Top-left pixel position of an item anchored at `index`, relative to
    /// the grid canvas
    pub fn draw_position(&self, index: usize) -> Vec2 {
        let padding = self.slotted.get(&index).map(|item| item.padding).unwrap_or(0.0);
        self.position_from_index(index).as_vec2() * self.tile_size + Vec2::splat(padding)
    }

    /// Pixel size of an item's icon
    pub fn draw_size(&self, item: &SlottedItem) -> Vec2 {
        item.dimensions.as_vec2() * (self.tile_size - item.padding * 2.0)
    }
}
