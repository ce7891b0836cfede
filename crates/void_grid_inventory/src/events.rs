//! Inventory change events
//!
//! Observers subscribe to an [`InventoryEventBus`]. Events are queued while a
//! batch of changes is applied and delivered by [`InventoryEventBus::dispatch`],
//! once per event and handler, in publish order.

use crate::handle::ItemHandle;
use crate::item::ItemType;
use crate::list::InventoryItem;
use std::collections::VecDeque;

/// Something observers of an inventory may care about
#[derive(Debug, Clone, PartialEq)]
pub enum InventoryEvent {
    /// A new entry joined the list
    ItemAdded { handle: ItemHandle },
    /// An entry left the list
    ItemRemoved { handle: ItemHandle, item: InventoryItem },
    /// An entry's stack count changed
    StackChanged {
        handle: ItemHandle,
        previous: u32,
        current: u32,
    },
    /// A pickup attempt found no room
    NoRoomInInventory { item_type: ItemType },
    /// Grids were rebuilt from the list
    InventoryRebuilt,
}

/// Event handler function type
pub type InventoryEventHandler = Box<dyn Fn(&InventoryEvent) + Send + Sync>;

/// Subscriber ID
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(pub u64);

/// Queue of inventory events and their subscribers
pub struct InventoryEventBus {
    queue: VecDeque<InventoryEvent>,
    handlers: Vec<(SubscriberId, InventoryEventHandler)>,
    next_subscriber_id: u64,
}

impl InventoryEventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            handlers: Vec::new(),
            next_subscriber_id: 1,
        }
    }

    /// Subscribe to every inventory event
    pub fn subscribe<F>(&mut self, handler: F) -> SubscriberId
    where
        F: Fn(&InventoryEvent) + Send + Sync + 'static,
    {
        let id = SubscriberId(self.next_subscriber_id);
        self.next_subscriber_id += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Unsubscribe. Returns false for unknown IDs.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(sub_id, _)| *sub_id != id);
        self.handlers.len() != before
    }

    /// Queue an event
    pub fn publish(&mut self, event: InventoryEvent) {
        self.queue.push_back(event);
    }

    /// Deliver all queued events. Returns how many were delivered.
    pub fn dispatch(&mut self) -> usize {
        let mut delivered = 0;
        while let Some(event) = self.queue.pop_front() {
            for (_, handler) in &self.handlers {
                handler(&event);
            }
            delivered += 1;
        }
        delivered
    }

    /// Drop queued events without delivering them
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.len()
    }
}

impl Default for InventoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InventoryEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryEventBus")
            .field("pending", &self.queue.len())
            .field("subscribers", &self.handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn no_room(tag: &str) -> InventoryEvent {
        InventoryEvent::NoRoomInInventory {
            item_type: ItemType::new(tag),
        }
    }

    #[test]
    fn test_dispatch_in_publish_order() {
        let mut bus = InventoryEventBus::new();
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        bus.subscribe(move |event| sink.lock().push(event.clone()));

        bus.publish(no_room("A"));
        bus.publish(InventoryEvent::InventoryRebuilt);
        assert_eq!(bus.pending_count(), 2);
        assert_eq!(bus.dispatch(), 2);

        let received = received.lock();
        assert_eq!(*received, vec![no_room("A"), InventoryEvent::InventoryRebuilt]);
    }

    #[test]
    fn test_each_handler_sees_each_event_once() {
        let mut bus = InventoryEventBus::new();
        let count = Arc::new(Mutex::new(0));
        for _ in 0..3 {
            let count = count.clone();
            bus.subscribe(move |_| *count.lock() += 1);
        }

        bus.publish(InventoryEvent::InventoryRebuilt);
        bus.dispatch();
        bus.dispatch();

        assert_eq!(*count.lock(), 3);
        assert!(!bus.has_pending());
    }

    #[test]
    fn test_unsubscribe() {
        let mut bus = InventoryEventBus::new();
        let count = Arc::new(Mutex::new(0));
        let counter = count.clone();
        let id = bus.subscribe(move |_| *counter.lock() += 1);

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));

        bus.publish(InventoryEvent::InventoryRebuilt);
        bus.dispatch();
        assert_eq!(*count.lock(), 0);
    }

    #[test]
    fn test_clear_drops_pending() {
        let mut bus = InventoryEventBus::new();
        bus.publish(InventoryEvent::InventoryRebuilt);
        bus.clear();

        assert_eq!(bus.dispatch(), 0);
    }
}
