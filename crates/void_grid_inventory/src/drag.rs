//! Drag-and-drop rearrangement inside a grid
//!
//! [`DragPlacementController`] is a two-state machine. A primary click on an
//! occupied slot detaches that item from the grid and holds it. While
//! holding, pointer moves map the cursor onto a candidate anchor and
//! highlight what a release would do there. A release places, merges or
//! swaps; a release over an invalid target keeps the item held.

use crate::error::{InventoryError, Result};
use crate::grid::{GridSlotState, InventoryGrid, SlottedItem};
use crate::handle::ItemHandle;
use glam::{IVec2, Vec2};
use std::collections::BTreeSet;

/// Quarter of a tile the cursor is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileQuadrant {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl TileQuadrant {
    pub fn is_right(self) -> bool {
        matches!(self, Self::TopRight | Self::BottomRight)
    }

    pub fn is_bottom(self) -> bool {
        matches!(self, Self::BottomLeft | Self::BottomRight)
    }
}

/// Where the cursor is, in grid terms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileParameters {
    /// Hovered cell
    pub coordinates: IVec2,
    /// Index of the hovered cell; may be outside the grid
    pub index: i32,
    pub quadrant: TileQuadrant,
}

/// What occupies a candidate footprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpaceQueryResult {
    /// Footprint is in bounds and empty
    pub has_space: bool,
    /// The single item in the footprint, if exactly one
    pub valid_item: Option<ItemHandle>,
    /// Anchor of `valid_item`
    pub upper_left_index: Option<usize>,
}

/// Item attached to the cursor
#[derive(Debug, Clone, PartialEq)]
pub struct HeldItem {
    pub slotted: SlottedItem,
    pub stack_count: u32,
    /// Anchor it was picked up from
    pub previous_index: usize,
}

/// Controller state
#[derive(Debug, Clone, PartialEq)]
pub enum DragState {
    Idle,
    Holding(HeldItem),
}

impl Default for DragState {
    fn default() -> Self {
        Self::Idle
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

/// Result of a release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// Held item now occupies the empty footprint at `index`
    Placed { index: usize },
    /// Units moved onto the stack at `index`; `remaining` are still held
    Merged { index: usize, remaining: u32 },
    /// Held item placed at `index`; the displaced item is now held
    Swapped { index: usize },
    /// Nothing changed; the item stays held
    Rejected,
}

/// Highlight changes produced by a pointer move
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HoverUpdate {
    pub selected: Vec<usize>,
    pub grayed_out: Vec<usize>,
    /// Cells restored to Occupied or Unoccupied
    pub cleared: Vec<usize>,
}

/// Cell under a canvas-relative position
pub fn calculate_hovered_coordinates(local_position: Vec2, tile_size: f32) -> IVec2 {
    (local_position / tile_size).floor().as_ivec2()
}

/// Quadrant of the tile under a canvas-relative position. The half-tile
/// line belongs to the right and bottom quadrants.
pub fn calculate_tile_quadrant(local_position: Vec2, tile_size: f32) -> TileQuadrant {
    let half = tile_size / 2.0;
    let right = local_position.x.rem_euclid(tile_size) >= half;
    let bottom = local_position.y.rem_euclid(tile_size) >= half;
    match (right, bottom) {
        (false, false) => TileQuadrant::TopLeft,
        (true, false) => TileQuadrant::TopRight,
        (false, true) => TileQuadrant::BottomLeft,
        (true, true) => TileQuadrant::BottomRight,
    }
}

/// Upper-left cell of a footprint centered on the hovered cell. Even
/// dimensions shift one cell toward the cursor's side of the tile.
pub fn calculate_starting_coordinate(
    coordinates: IVec2,
    dimensions: IVec2,
    quadrant: TileQuadrant,
) -> IVec2 {
    let even_width = (dimensions.x % 2 == 0 && quadrant.is_right()) as i32;
    let even_height = (dimensions.y % 2 == 0 && quadrant.is_bottom()) as i32;
    IVec2::new(
        coordinates.x - dimensions.x / 2 + even_width,
        coordinates.y - dimensions.y / 2 + even_height,
    )
}

/// Inspect the footprint with its upper-left cell at `position`
pub fn check_hover_position(
    grid: &InventoryGrid,
    position: IVec2,
    dimensions: IVec2,
) -> SpaceQueryResult {
    if !grid.is_position_in_bounds(position, dimensions) {
        return SpaceQueryResult::default();
    }

    let index = grid.index_from_position(position) as usize;
    let anchors: BTreeSet<usize> = grid
        .footprint(index, dimensions)
        .into_iter()
        .filter_map(|cell| grid.slot(cell).and_then(|slot| slot.upper_left_index()))
        .collect();

    let mut anchors = anchors.into_iter();
    match (anchors.next(), anchors.next()) {
        (None, _) => SpaceQueryResult {
            has_space: true,
            ..Default::default()
        },
        (Some(anchor), None) => SpaceQueryResult {
            has_space: false,
            valid_item: grid.slot(anchor).and_then(|slot| slot.item()),
            upper_left_index: Some(anchor),
        },
        _ => SpaceQueryResult::default(),
    }
}

/// Drag state machine for one grid at a time
#[derive(Debug, Clone, Default)]
pub struct DragPlacementController {
    state: DragState,
    /// Last computed pointer mapping
    tile_parameters: Option<TileParameters>,
    drop_index: Option<usize>,
    space_query: SpaceQueryResult,
    highlighted: Vec<usize>,
}

impl DragPlacementController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_holding(&self) -> bool {
        matches!(self.state, DragState::Holding(_))
    }

    pub fn held_item(&self) -> Option<&HeldItem> {
        match &self.state {
            DragState::Holding(held) => Some(held),
            DragState::Idle => None,
        }
    }

    /// Anchor the held item would be released at
    pub fn drop_index(&self) -> Option<usize> {
        self.drop_index
    }

    pub fn space_query(&self) -> SpaceQueryResult {
        self.space_query
    }

    pub fn tile_parameters(&self) -> Option<TileParameters> {
        self.tile_parameters
    }

    /// Handle a click on a slot. A primary click on an occupied slot while
    /// idle picks the item up. Returns whether it did.
    pub fn on_slot_clicked(
        &mut self,
        grid: &mut InventoryGrid,
        index: usize,
        button: PointerButton,
    ) -> bool {
        if button != PointerButton::Primary || self.is_holding() {
            return false;
        }
        let Some(anchor) = grid.item_at(index).map(|(anchor, _)| anchor) else {
            return false;
        };
        let Some((slotted, stack_count)) = grid.remove_item_at(anchor) else {
            return false;
        };

        log::debug!("Picked up {} from {}", slotted.item_type, anchor);
        self.state = DragState::Holding(HeldItem {
            slotted,
            stack_count,
            previous_index: anchor,
        });
        self.reset_hover(grid);
        true
    }

    /// Map the cursor onto the grid and refresh the highlight. Returns None
    /// when idle or when the cursor is still over the same tile quadrant.
    pub fn update_pointer(
        &mut self,
        grid: &mut InventoryGrid,
        canvas_position: Vec2,
        cursor_position: Vec2,
    ) -> Option<HoverUpdate> {
        let held = self.held_item()?.clone();
        let tile_size = grid.tile_size();
        let local = cursor_position - canvas_position;

        let coordinates = calculate_hovered_coordinates(local, tile_size);
        let parameters = TileParameters {
            coordinates,
            index: grid.index_from_position(coordinates),
            quadrant: calculate_tile_quadrant(local, tile_size),
        };
        if self.tile_parameters == Some(parameters) {
            return None;
        }
        self.tile_parameters = Some(parameters);

        let dimensions = held.slotted.dimensions;
        let start = calculate_starting_coordinate(coordinates, dimensions, parameters.quadrant);
        self.drop_index = grid
            .is_position_in_bounds(start, dimensions)
            .then(|| grid.index_from_position(start) as usize);
        self.space_query = check_hover_position(grid, start, dimensions);

        let mut update = HoverUpdate {
            cleared: self.clear_highlight(grid),
            ..Default::default()
        };

        if let (true, Some(drop_index)) = (self.space_query.has_space, self.drop_index) {
            update.selected = grid.footprint(drop_index, dimensions);
        } else if let Some(anchor) = self.space_query.upper_left_index {
            let cells = grid
                .slotted_item(anchor)
                .map(|target| grid.footprint(anchor, target.dimensions))
                .unwrap_or_default();
            if can_merge(grid, &held, anchor) {
                update.selected = cells;
            } else {
                update.grayed_out = cells;
            }
        }

        for cell in &update.selected {
            grid.set_slot_state(*cell, GridSlotState::Selected);
        }
        for cell in &update.grayed_out {
            grid.set_slot_state(*cell, GridSlotState::GrayedOut);
        }
        self.highlighted = update
            .selected
            .iter()
            .chain(update.grayed_out.iter())
            .copied()
            .collect();
        Some(update)
    }

    /// Commit the held item at the current drop index
    pub fn release(&mut self, grid: &mut InventoryGrid) -> Result<DropOutcome> {
        let DragState::Holding(held) = std::mem::take(&mut self.state) else {
            return Err(InventoryError::NotHolding);
        };

        let outcome = match self.drop_index {
            Some(index) if self.space_query.has_space => {
                match grid.place_item(index, held.slotted.clone(), held.stack_count) {
                    Ok(()) => {
                        log::debug!("Placed {} at {}", held.slotted.item_type, index);
                        DropOutcome::Placed { index }
                    }
                    Err(e) => {
                        self.state = DragState::Holding(held);
                        return Err(e);
                    }
                }
            }
            Some(index) => match self.space_query.upper_left_index {
                Some(anchor) if can_merge(grid, &held, anchor) => {
                    let target_count = grid.slot(anchor).map(|slot| slot.stack_count()).unwrap_or(0);
                    let room = held.slotted.max_stack_size.saturating_sub(target_count);
                    let moved = room.min(held.stack_count);
                    grid.set_stack_count(anchor, target_count + moved);

                    let remaining = held.stack_count - moved;
                    log::debug!("Merged {} units into {}", moved, anchor);
                    if remaining > 0 {
                        self.state = DragState::Holding(HeldItem {
                            stack_count: remaining,
                            ..held
                        });
                    }
                    DropOutcome::Merged {
                        index: anchor,
                        remaining,
                    }
                }
                Some(anchor) => {
                    let Some((target, target_count)) = grid.remove_item_at(anchor) else {
                        self.state = DragState::Holding(held);
                        return Ok(DropOutcome::Rejected);
                    };
                    if let Err(e) = grid.place_item(index, held.slotted.clone(), held.stack_count) {
                        if let Err(restore) = grid.place_item(anchor, target, target_count) {
                            log::warn!("Could not restore item at {}: {}", anchor, restore);
                        }
                        self.state = DragState::Holding(held);
                        return Err(e);
                    }
                    log::debug!("Swapped {} into {}", held.slotted.item_type, index);
                    self.state = DragState::Holding(HeldItem {
                        slotted: target,
                        stack_count: target_count,
                        previous_index: anchor,
                    });
                    DropOutcome::Swapped { index }
                }
                None => {
                    self.state = DragState::Holding(held);
                    return Ok(DropOutcome::Rejected);
                }
            },
            None => {
                self.state = DragState::Holding(held);
                return Ok(DropOutcome::Rejected);
            }
        };

        self.reset_hover(grid);
        Ok(outcome)
    }

    /// Put the held item back where it came from, or in the first free
    /// footprint if that spot has been taken since
    pub fn cancel(&mut self, grid: &mut InventoryGrid) -> Result<usize> {
        let DragState::Holding(held) = std::mem::take(&mut self.state) else {
            return Err(InventoryError::NotHolding);
        };

        let dimensions = held.slotted.dimensions;
        let target = if check_hover_position(
            grid,
            grid.position_from_index(held.previous_index),
            dimensions,
        )
        .has_space
        {
            Some(held.previous_index)
        } else {
            grid.first_free_anchor(dimensions)
        };

        let Some(index) = target else {
            let item_type = held.slotted.item_type.clone();
            self.state = DragState::Holding(held);
            return Err(InventoryError::NoRoom(item_type));
        };
        if let Err(e) = grid.place_item(index, held.slotted.clone(), held.stack_count) {
            self.state = DragState::Holding(held);
            return Err(e);
        }

        self.reset_hover(grid);
        Ok(index)
    }

    /// Drop the held item if it refers to `handle`. Used when the item
    /// leaves the list mid-drag.
    pub fn discard_if_held(&mut self, handle: ItemHandle) -> bool {
        let held = self
            .held_item()
            .map(|held| held.slotted.handle == handle)
            .unwrap_or(false);
        if held {
            log::debug!("Discarding held {:?}", handle);
            self.state = DragState::Idle;
            self.tile_parameters = None;
            self.drop_index = None;
            self.space_query = SpaceQueryResult::default();
            self.highlighted.clear();
        }
        held
    }

    /// Forget any held item without touching a grid
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn clear_highlight(&mut self, grid: &mut InventoryGrid) -> Vec<usize> {
        let cleared = std::mem::take(&mut self.highlighted);
        for cell in &cleared {
            grid.restore_slot_state(*cell);
        }
        cleared
    }

    fn reset_hover(&mut self, grid: &mut InventoryGrid) {
        self.clear_highlight(grid);
        self.tile_parameters = None;
        self.drop_index = None;
        self.space_query = SpaceQueryResult::default();
    }
}

/// Same instance, stackable, and the target stack has room
fn can_merge(grid: &InventoryGrid, held: &HeldItem, anchor: usize) -> bool {
    let Some(target) = grid.slotted_item(anchor) else {
        return false;
    };
    let target_count = grid.slot(anchor).map(|slot| slot.stack_count()).unwrap_or(0);
    held.slotted.stackable
        && target.stackable
        && target.handle == held.slotted.handle
        && target.item_type.matches_exact(&held.slotted.item_type)
        && target_count < target.max_stack_size
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ItemCategory, ItemDescriptor};
    use crate::list::ItemList;

    const TILE: f32 = 64.0;

    fn grid() -> InventoryGrid {
        InventoryGrid::new(ItemCategory::Craftable, 4, 4)
    }

    fn stone() -> ItemDescriptor {
        ItemDescriptor::new("GameItems.Craftables.Stone", ItemCategory::Craftable)
    }

    fn plank() -> ItemDescriptor {
        ItemDescriptor::new("GameItems.Craftables.Plank", ItemCategory::Craftable).with_grid(2, 1)
    }

    fn ore(count: u32) -> ItemDescriptor {
        ItemDescriptor::new("GameItems.Craftables.Ore", ItemCategory::Craftable).with_stackable(10, count)
    }

    fn place(grid: &mut InventoryGrid, list: &mut ItemList, descriptor: ItemDescriptor) -> ItemHandle {
        let handle = list.add_entry(descriptor);
        grid.add_item(handle, list).unwrap();
        handle
    }

    /// Cursor position at the center of a cell, nudged into a quadrant
    fn cursor(x: i32, y: i32, right: bool, bottom: bool) -> Vec2 {
        let offset = |far: bool| if far { TILE * 0.75 } else { TILE * 0.25 };
        Vec2::new(x as f32 * TILE + offset(right), y as f32 * TILE + offset(bottom))
    }

    #[test]
    fn test_pointer_geometry() {
        assert_eq!(calculate_hovered_coordinates(Vec2::new(130.0, 10.0), TILE), IVec2::new(2, 0));
        assert_eq!(calculate_hovered_coordinates(Vec2::new(-1.0, 10.0), TILE), IVec2::new(-1, 0));
        assert_eq!(calculate_tile_quadrant(Vec2::new(40.0, 10.0), TILE), TileQuadrant::TopRight);
        assert_eq!(calculate_tile_quadrant(Vec2::new(-10.0, 40.0), TILE), TileQuadrant::BottomRight);
        assert_eq!(calculate_tile_quadrant(Vec2::new(32.0, 32.0), TILE), TileQuadrant::BottomRight);
        assert_eq!(calculate_tile_quadrant(Vec2::new(31.9, 96.0), TILE), TileQuadrant::BottomLeft);

        // On the half-tile line an even footprint shifts toward the cursor
        let on_line = Vec2::new(2.0 * TILE + 32.0, 2.0 * TILE + 32.0);
        let quadrant = calculate_tile_quadrant(on_line, TILE);
        assert_eq!(
            calculate_starting_coordinate(calculate_hovered_coordinates(on_line, TILE), IVec2::new(2, 2), quadrant),
            IVec2::new(2, 2)
        );

        let even = IVec2::new(2, 2);
        let odd = IVec2::new(3, 1);
        let cell = IVec2::new(2, 2);
        assert_eq!(calculate_starting_coordinate(cell, even, TileQuadrant::TopLeft), IVec2::new(1, 1));
        assert_eq!(calculate_starting_coordinate(cell, even, TileQuadrant::BottomRight), IVec2::new(2, 2));
        assert_eq!(calculate_starting_coordinate(cell, odd, TileQuadrant::BottomRight), IVec2::new(1, 2));
    }

    #[test]
    fn test_hover_query() {
        let mut grid = grid();
        let mut list = ItemList::new();
        let first = place(&mut grid, &mut list, stone());
        place(&mut grid, &mut list, stone());

        let empty = check_hover_position(&grid, IVec2::new(0, 1), IVec2::new(2, 2));
        assert!(empty.has_space);

        let single = check_hover_position(&grid, IVec2::new(0, 0), IVec2::ONE);
        assert!(!single.has_space);
        assert_eq!(single.valid_item, Some(first));
        assert_eq!(single.upper_left_index, Some(0));

        let both = check_hover_position(&grid, IVec2::new(0, 0), IVec2::new(2, 1));
        assert_eq!(both, SpaceQueryResult::default());

        let outside = check_hover_position(&grid, IVec2::new(3, 0), IVec2::new(2, 1));
        assert_eq!(outside, SpaceQueryResult::default());
    }

    #[test]
    fn test_pick_up_and_place() {
        let mut grid = grid();
        let mut list = ItemList::new();
        let handle = place(&mut grid, &mut list, plank());
        let mut drag = DragPlacementController::new();

        assert!(!drag.on_slot_clicked(&mut grid, 1, PointerButton::Secondary));
        assert!(drag.on_slot_clicked(&mut grid, 1, PointerButton::Primary));
        assert_eq!(drag.held_item().map(|h| h.previous_index), Some(0));
        assert!(!grid.contains_item(handle));

        let update = drag.update_pointer(&mut grid, Vec2::ZERO, cursor(1, 2, true, false)).unwrap();
        assert_eq!(update.selected, vec![9, 10]);
        assert_eq!(grid.slot(9).map(|s| s.state()), Some(GridSlotState::Selected));
        assert_eq!(drag.drop_index(), Some(9));

        assert_eq!(drag.release(&mut grid), Ok(DropOutcome::Placed { index: 9 }));
        assert!(!drag.is_holding());
        assert_eq!(grid.item_at(10).map(|(anchor, _)| anchor), Some(9));
        assert_eq!(grid.slot(9).map(|s| s.state()), Some(GridSlotState::Occupied));
    }

    #[test]
    fn test_unchanged_pointer_emits_nothing() {
        let mut grid = grid();
        let mut list = ItemList::new();
        place(&mut grid, &mut list, stone());
        let mut drag = DragPlacementController::new();

        assert!(drag.update_pointer(&mut grid, Vec2::ZERO, cursor(2, 2, false, false)).is_none());
        drag.on_slot_clicked(&mut grid, 0, PointerButton::Primary);

        assert!(drag.update_pointer(&mut grid, Vec2::ZERO, cursor(2, 2, false, false)).is_some());
        assert!(drag.update_pointer(&mut grid, Vec2::ZERO, cursor(2, 2, false, false) + Vec2::ONE).is_none());

        let moved = drag.update_pointer(&mut grid, Vec2::ZERO, cursor(3, 2, false, false)).unwrap();
        assert_eq!(moved.cleared, vec![10]);
        assert_eq!(grid.slot(10).map(|s| s.state()), Some(GridSlotState::Unoccupied));
    }

    #[test]
    fn test_swap_with_single_occupant() {
        let mut grid = grid();
        let mut list = ItemList::new();
        let held = place(&mut grid, &mut list, stone());
        let other = place(&mut grid, &mut list, stone());
        let mut drag = DragPlacementController::new();

        drag.on_slot_clicked(&mut grid, 0, PointerButton::Primary);
        let update = drag.update_pointer(&mut grid, Vec2::ZERO, cursor(1, 0, false, false)).unwrap();
        assert_eq!(update.grayed_out, vec![1]);

        assert_eq!(drag.release(&mut grid), Ok(DropOutcome::Swapped { index: 1 }));
        assert_eq!(grid.slot(1).and_then(|s| s.item()), Some(held));
        let now_held = drag.held_item().unwrap();
        assert_eq!(now_held.slotted.handle, other);
        assert_eq!(now_held.previous_index, 1);
    }

    #[test]
    fn test_merge_into_own_stack() {
        let mut grid = grid();
        let mut list = ItemList::new();
        let handle = place(&mut grid, &mut list, ore(14));
        let mut drag = DragPlacementController::new();

        // The 4-stack cannot merge into the full stack, so they swap
        drag.on_slot_clicked(&mut grid, 1, PointerButton::Primary);
        let update = drag.update_pointer(&mut grid, Vec2::ZERO, cursor(0, 0, false, false)).unwrap();
        assert_eq!(update.grayed_out, vec![0]);
        assert_eq!(drag.release(&mut grid), Ok(DropOutcome::Swapped { index: 0 }));
        assert_eq!(drag.held_item().map(|h| h.stack_count), Some(10));

        // Slot 0 is taken now, so cancel falls back to the first free slot
        assert_eq!(drag.cancel(&mut grid), Ok(1));
        assert_eq!(grid.stack_total(handle), 14);

        grid.remove_stacks(handle, 8);
        assert_eq!(grid.slot(1).map(|s| s.stack_count()), Some(2));
        drag.on_slot_clicked(&mut grid, 0, PointerButton::Primary);
        assert_eq!(drag.held_item().map(|h| h.stack_count), Some(4));
        let update = drag.update_pointer(&mut grid, Vec2::ZERO, cursor(1, 0, false, false)).unwrap();
        assert_eq!(update.selected, vec![1]);

        assert_eq!(
            drag.release(&mut grid),
            Ok(DropOutcome::Merged { index: 1, remaining: 0 })
        );
        assert!(!drag.is_holding());
        assert_eq!(grid.slot(1).map(|s| s.stack_count()), Some(6));
        assert_eq!(grid.stack_total(handle), 6);
    }

    #[test]
    fn test_partial_merge_keeps_holding() {
        let mut grid = grid();
        let mut list = ItemList::new();
        let handle = place(&mut grid, &mut list, ore(17));
        let mut drag = DragPlacementController::new();

        grid.remove_stacks(handle, 4);
        assert_eq!(grid.slot(1).map(|s| s.stack_count()), Some(3));
        grid.set_stack_count(0, 8);

        drag.on_slot_clicked(&mut grid, 1, PointerButton::Primary);
        drag.update_pointer(&mut grid, Vec2::ZERO, cursor(0, 0, false, false));
        assert_eq!(
            drag.release(&mut grid),
            Ok(DropOutcome::Merged { index: 0, remaining: 1 })
        );
        assert_eq!(drag.held_item().map(|h| h.stack_count), Some(1));
        assert_eq!(grid.slot(0).map(|s| s.stack_count()), Some(10));
    }

    #[test]
    fn test_invalid_release_keeps_holding() {
        let mut grid = grid();
        let mut list = ItemList::new();
        place(&mut grid, &mut list, stone());
        place(&mut grid, &mut list, stone());
        let plank = place(&mut grid, &mut list, plank());
        let mut drag = DragPlacementController::new();

        drag.on_slot_clicked(&mut grid, 2, PointerButton::Primary);
        assert_eq!(drag.held_item().map(|h| h.slotted.handle), Some(plank));

        // Centered over both stones
        let update = drag.update_pointer(&mut grid, Vec2::ZERO, cursor(0, 0, true, false)).unwrap();
        assert!(update.selected.is_empty() && update.grayed_out.is_empty());
        assert_eq!(drag.release(&mut grid), Ok(DropOutcome::Rejected));
        assert!(drag.is_holding());

        // Off the grid
        drag.update_pointer(&mut grid, Vec2::ZERO, cursor(5, 0, false, false));
        assert_eq!(drag.drop_index(), None);
        assert_eq!(drag.release(&mut grid), Ok(DropOutcome::Rejected));

        assert_eq!(drag.cancel(&mut grid), Ok(2));
        assert!(grid.contains_item(plank));
    }

    #[test]
    fn test_release_without_item() {
        let mut grid = grid();
        let mut drag = DragPlacementController::new();

        assert_eq!(drag.release(&mut grid), Err(InventoryError::NotHolding));
        assert!(!drag.on_slot_clicked(&mut grid, 3, PointerButton::Primary));
    }

    #[test]
    fn test_discard_removed_item() {
        let mut grid = grid();
        let mut list = ItemList::new();
        let handle = place(&mut grid, &mut list, stone());
        let mut drag = DragPlacementController::new();
        drag.on_slot_clicked(&mut grid, 0, PointerButton::Primary);

        assert!(!drag.discard_if_held(ItemHandle::new(9, 0)));
        assert!(drag.discard_if_held(handle));
        assert_eq!(drag.state(), &DragState::Idle);
    }
}
