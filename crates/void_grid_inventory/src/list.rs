//! Authoritative item list
//!
//! The server owns the only writable copy. Every mutation is recorded twice:
//! as a [`ListChange`] to replicate to remote observers and as a
//! [`ListNotification`] for observers living in the same process. Remote
//! mirrors feed the replicated changes back through
//! [`ItemList::apply_replicated`], which is idempotent, and end up raising the
//! same notifications. Observers therefore see one notification per change
//! whatever the topology.

use crate::error::{InventoryError, Result};
use crate::handle::{ItemArena, ItemHandle};
use crate::item::{ItemCategory, ItemDescriptor, ItemType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Network identity of an item instance, assigned by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u64);

/// An item held in the inventory. Owns its own descriptor copy.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryItem {
    id: ItemId,
    descriptor: ItemDescriptor,
}

impl InventoryItem {
    fn new(id: ItemId, descriptor: ItemDescriptor) -> Self {
        Self { id, descriptor }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn descriptor(&self) -> &ItemDescriptor {
        &self.descriptor
    }

    pub fn item_type(&self) -> &ItemType {
        &self.descriptor.item_type
    }

    pub fn category(&self) -> ItemCategory {
        self.descriptor.category
    }

    pub fn is_stackable(&self) -> bool {
        self.descriptor.is_stackable()
    }

    /// Total units across every grid stack of this item
    pub fn stack_count(&self) -> u32 {
        self.descriptor.stack_count()
    }
}

/// A change to replicate to remote observers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ListChange {
    /// A new instance exists
    Added { id: ItemId, descriptor: ItemDescriptor },
    /// An instance is gone
    Removed { id: ItemId },
    /// An instance now holds `stack_count` units (absolute, so re-delivery is harmless)
    StackChanged { id: ItemId, stack_count: u32 },
}

impl ListChange {
    /// Item the change refers to
    pub fn id(&self) -> ItemId {
        match self {
            Self::Added { id, .. } | Self::Removed { id } | Self::StackChanged { id, .. } => *id,
        }
    }
}

/// A change as seen by observers in this process
#[derive(Debug, Clone, PartialEq)]
pub enum ListNotification {
    Added(ItemHandle),
    Removed { handle: ItemHandle, item: InventoryItem },
    StackChanged { handle: ItemHandle, previous: u32, current: u32 },
}

/// The inventory's item collection
#[derive(Default)]
pub struct ItemList {
    items: ItemArena<InventoryItem>,
    /// Insertion order; oldest first
    order: Vec<ItemHandle>,
    ids: HashMap<ItemId, ItemHandle>,
    next_id: u64,
    changes: Vec<ListChange>,
    notifications: Vec<ListNotification>,
}

impl ItemList {
    /// Create an empty list
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Default::default()
        }
    }

    /// Create a new instance from a descriptor copy (authority only)
    pub fn add_entry(&mut self, descriptor: ItemDescriptor) -> ItemHandle {
        let id = ItemId(self.next_id.max(1));
        self.next_id = id.0 + 1;

        let handle = self.insert(id, descriptor.clone());
        log::debug!("Added {} x{} as {:?}", descriptor.item_type, descriptor.stack_count(), id);
        self.changes.push(ListChange::Added { id, descriptor });
        handle
    }

    /// Grow an instance's stack count (authority only). Returns the new count.
    pub fn add_stacks(&mut self, handle: ItemHandle, amount: u32) -> Result<u32> {
        let item = self
            .items
            .get(handle)
            .ok_or(InventoryError::StaleReference(handle))?;
        let current = item.stack_count().saturating_add(amount);
        self.set_stack_count(handle, current)?;
        Ok(current)
    }

    /// Shrink an instance's stack count, removing it at zero (authority only).
    /// Returns the remaining count.
    pub fn remove_stacks(&mut self, handle: ItemHandle, amount: u32) -> Result<u32> {
        let item = self
            .items
            .get(handle)
            .ok_or(InventoryError::StaleReference(handle))?;
        let remaining = item.stack_count().saturating_sub(amount);
        if remaining == 0 {
            self.remove_entry(handle);
        } else {
            self.set_stack_count(handle, remaining)?;
        }
        Ok(remaining)
    }

    /// Remove an instance entirely (authority only)
    pub fn remove_entry(&mut self, handle: ItemHandle) -> Option<InventoryItem> {
        let item = self.take(handle)?;
        log::debug!("Removed {} ({:?})", item.item_type(), item.id());
        self.changes.push(ListChange::Removed { id: item.id() });
        Some(item)
    }

    /// Oldest instance whose type matches exactly
    pub fn find_first_item_by_type(&self, item_type: &ItemType) -> Option<ItemHandle> {
        self.order.iter().copied().find(|handle| {
            self.items
                .get(*handle)
                .map(|item| item.item_type().matches_exact(item_type))
                .unwrap_or(false)
        })
    }

    /// Resolve a handle
    pub fn get(&self, handle: ItemHandle) -> Option<&InventoryItem> {
        self.items.get(handle)
    }

    /// Check if a handle still refers to a live instance
    pub fn contains(&self, handle: ItemHandle) -> bool {
        self.items.contains(handle)
    }

    /// Local handle for a network id
    pub fn handle_of(&self, id: ItemId) -> Option<ItemHandle> {
        self.ids.get(&id).copied()
    }

    /// Every instance, oldest first
    pub fn all_items(&self) -> impl Iterator<Item = (ItemHandle, &InventoryItem)> {
        self.order
            .iter()
            .filter_map(move |handle| self.items.get(*handle).map(|item| (*handle, item)))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Apply a change received from the authority. Returns whether anything
    /// changed; duplicates and stale changes are ignored.
    pub fn apply_replicated(&mut self, change: ListChange) -> bool {
        match change {
            ListChange::Added { id, descriptor } => {
                if self.ids.contains_key(&id) {
                    log::debug!("Ignoring duplicate add of {:?}", id);
                    return false;
                }
                self.next_id = self.next_id.max(id.0 + 1);
                self.insert(id, descriptor);
                true
            }
            ListChange::Removed { id } => match self.ids.get(&id).copied() {
                Some(handle) => self.take(handle).is_some(),
                None => false,
            },
            ListChange::StackChanged { id, stack_count } => {
                let Some(handle) = self.ids.get(&id).copied() else {
                    log::warn!("Stack change for unknown item {:?}", id);
                    return false;
                };
                let unchanged = self
                    .items
                    .get(handle)
                    .map(|item| item.stack_count() == stack_count)
                    .unwrap_or(true);
                if unchanged {
                    return false;
                }
                self.set_stack_count(handle, stack_count).is_ok()
            }
        }
    }

    /// Changes to send to remote observers since the last drain
    pub fn drain_changes(&mut self) -> Vec<ListChange> {
        std::mem::take(&mut self.changes)
    }

    /// Notifications for local observers since the last drain
    pub fn drain_notifications(&mut self) -> Vec<ListNotification> {
        std::mem::take(&mut self.notifications)
    }

    /// Full content as a sequence of adds, oldest first. Sent to observers
    /// that (re)connect.
    pub fn snapshot(&self) -> Vec<ListChange> {
        self.all_items()
            .map(|(_, item)| ListChange::Added {
                id: item.id(),
                descriptor: item.descriptor().clone(),
            })
            .collect()
    }

    /// Drop all content without raising notifications
    pub fn reset(&mut self) {
        self.items.clear();
        self.order.clear();
        self.ids.clear();
        self.changes.clear();
        self.notifications.clear();
    }

    fn insert(&mut self, id: ItemId, descriptor: ItemDescriptor) -> ItemHandle {
        let handle = self.items.insert(InventoryItem::new(id, descriptor));
        self.order.push(handle);
        self.ids.insert(id, handle);
        self.notifications.push(ListNotification::Added(handle));
        handle
    }

    fn take(&mut self, handle: ItemHandle) -> Option<InventoryItem> {
        let item = self.items.remove(handle)?;
        self.order.retain(|h| *h != handle);
        self.ids.remove(&item.id());
        self.notifications.push(ListNotification::Removed {
            handle,
            item: item.clone(),
        });
        Some(item)
    }

    fn set_stack_count(&mut self, handle: ItemHandle, count: u32) -> Result<()> {
        let item = self
            .items
            .get_mut(handle)
            .ok_or(InventoryError::StaleReference(handle))?;
        let previous = item.stack_count();
        item.descriptor.set_stack_count(count);
        let current = item.stack_count();
        if previous == current {
            return Ok(());
        }

        let id = item.id();
        self.changes.push(ListChange::StackChanged {
            id,
            stack_count: current,
        });
        self.notifications.push(ListNotification::StackChanged {
            handle,
            previous,
            current,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn potion(count: u32) -> ItemDescriptor {
        ItemDescriptor::new("GameItems.Consumables.Potions.Red", ItemCategory::Consumable)
            .with_stackable(10, count)
    }

    fn sword() -> ItemDescriptor {
        ItemDescriptor::new("GameItems.Equipment.Weapons.Sword", ItemCategory::Equippable)
            .with_grid(1, 3)
    }

    #[test]
    fn test_add_entry_records_change_and_notification() {
        let mut list = ItemList::new();
        let handle = list.add_entry(potion(3));

        assert_eq!(list.len(), 1);
        assert_eq!(list.get(handle).map(|i| i.stack_count()), Some(3));
        assert_eq!(list.drain_notifications(), vec![ListNotification::Added(handle)]);

        let changes = list.drain_changes();
        assert_eq!(changes.len(), 1);
        assert!(matches!(changes[0], ListChange::Added { id: ItemId(1), .. }));
        assert!(list.drain_changes().is_empty());
    }

    #[test]
    fn test_find_first_item_by_type_is_oldest_first() {
        let mut list = ItemList::new();
        list.add_entry(sword());
        let first = list.add_entry(potion(10));
        let second = list.add_entry(potion(2));

        let found = list.find_first_item_by_type(&ItemType::new("GameItems.Consumables.Potions.Red"));
        assert_eq!(found, Some(first));
        assert_ne!(found, Some(second));
        assert_eq!(list.find_first_item_by_type(&ItemType::new("GameItems.Consumables")), None);
    }

    #[test]
    fn test_add_and_remove_stacks() {
        let mut list = ItemList::new();
        let handle = list.add_entry(potion(3));
        list.drain_notifications();

        assert_eq!(list.add_stacks(handle, 5), Ok(8));
        assert_eq!(list.remove_stacks(handle, 2), Ok(6));
        assert_eq!(
            list.drain_notifications(),
            vec![
                ListNotification::StackChanged { handle, previous: 3, current: 8 },
                ListNotification::StackChanged { handle, previous: 8, current: 6 },
            ]
        );

        assert_eq!(list.remove_stacks(handle, 6), Ok(0));
        assert!(!list.contains(handle));
        assert_eq!(list.add_stacks(handle, 1), Err(InventoryError::StaleReference(handle)));
    }

    #[test]
    fn test_remove_entry() {
        let mut list = ItemList::new();
        let handle = list.add_entry(sword());
        list.drain_changes();

        let removed = list.remove_entry(handle);
        assert!(removed.is_some());
        assert!(list.is_empty());
        assert_eq!(list.remove_entry(handle), None);
        assert_eq!(list.drain_changes(), vec![ListChange::Removed { id: ItemId(1) }]);
    }

    #[test]
    fn test_mirror_applies_changes_idempotently() {
        let mut server = ItemList::new();
        let handle = server.add_entry(potion(3));
        server.add_stacks(handle, 4).unwrap();
        let changes = server.drain_changes();

        let mut mirror = ItemList::new();
        for change in changes.iter().cloned() {
            assert!(mirror.apply_replicated(change));
        }
        // Re-delivery changes nothing
        for change in changes {
            assert!(!mirror.apply_replicated(change));
        }

        assert_eq!(mirror.len(), 1);
        let mirrored = mirror.handle_of(ItemId(1)).and_then(|h| mirror.get(h));
        assert_eq!(mirrored.map(|i| i.stack_count()), Some(7));
        // Mirrors never re-replicate
        assert!(mirror.drain_changes().is_empty());
    }

    #[test]
    fn test_mirror_ignores_unknown_items() {
        let mut mirror = ItemList::new();
        assert!(!mirror.apply_replicated(ListChange::Removed { id: ItemId(9) }));
        assert!(!mirror.apply_replicated(ListChange::StackChanged { id: ItemId(9), stack_count: 3 }));
        assert!(mirror.drain_notifications().is_empty());
    }

    #[test]
    fn test_snapshot_replays_into_equal_mirror() {
        let mut server = ItemList::new();
        server.add_entry(sword());
        server.add_entry(potion(6));

        let mut mirror = ItemList::new();
        for change in server.snapshot() {
            mirror.apply_replicated(change);
        }

        let server_items: Vec<_> = server.all_items().map(|(_, i)| i.clone()).collect();
        let mirror_items: Vec<_> = mirror.all_items().map(|(_, i)| i.clone()).collect();
        assert_eq!(server_items, mirror_items);
    }
}
