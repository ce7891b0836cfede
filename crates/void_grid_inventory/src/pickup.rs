//! World pickups that feed the inventory

use crate::error::{InventoryError, Result};
use crate::item::ItemDescriptor;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identifier of a pickup in the world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceId(pub u64);

/// Pickup component for world items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupComponent {
    /// World identifier
    pub id: SourceId,
    /// Item handed to the inventory
    pub descriptor: ItemDescriptor,
    /// Interaction prompt
    pub pickup_message: String,
    /// Whether the pickup can be taken
    pub enabled: bool,
}

impl PickupComponent {
    /// Create a new pickup
    pub fn new(id: SourceId, descriptor: ItemDescriptor) -> Self {
        let pickup_message = format!("Pick up {}", descriptor.name);
        Self {
            id,
            descriptor,
            pickup_message,
            enabled: true,
        }
    }

    /// Set interaction prompt
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.pickup_message = message.into();
        self
    }

    /// Check if can be picked up
    pub fn can_pickup(&self) -> bool {
        self.enabled && self.descriptor.stack_count() > 0
    }

    /// Units left in the pickup
    pub fn remaining(&self) -> u32 {
        self.descriptor.stack_count()
    }
}

/// The part of the world the authority touches when it accepts a pickup
pub trait PickupWorld {
    /// The pickup was fully taken; remove it from the world
    fn consume(&mut self, source: SourceId) -> Result<()>;

    /// The pickup was partially taken; `remaining` units stay behind
    fn set_remaining(&mut self, source: SourceId, remaining: u32) -> Result<()>;
}

/// In-memory pickup storage
#[derive(Debug, Clone, Default)]
pub struct PickupRegistry {
    pickups: HashMap<SourceId, PickupComponent>,
    next_id: u64,
}

impl PickupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a pickup in the world
    pub fn spawn(&mut self, descriptor: ItemDescriptor) -> SourceId {
        self.next_id += 1;
        let id = SourceId(self.next_id);
        self.pickups.insert(id, PickupComponent::new(id, descriptor));
        id
    }

    pub fn get(&self, source: SourceId) -> Option<&PickupComponent> {
        self.pickups.get(&source)
    }

    pub fn contains(&self, source: SourceId) -> bool {
        self.pickups.contains_key(&source)
    }

    pub fn len(&self) -> usize {
        self.pickups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pickups.is_empty()
    }
}

impl PickupWorld for PickupRegistry {
    fn consume(&mut self, source: SourceId) -> Result<()> {
        let pickup = self
            .pickups
            .remove(&source)
            .ok_or(InventoryError::UnknownSource(source))?;
        log::debug!("Consumed pickup {:?} ({})", source, pickup.descriptor.name);
        Ok(())
    }

    fn set_remaining(&mut self, source: SourceId, remaining: u32) -> Result<()> {
        let pickup = self
            .pickups
            .get_mut(&source)
            .ok_or(InventoryError::UnknownSource(source))?;
        pickup.descriptor.set_stack_count(remaining);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemCategory;

    fn arrows(count: u32) -> ItemDescriptor {
        ItemDescriptor::new("GameItems.Consumables.Arrows", ItemCategory::Consumable)
            .with_name("Arrows")
            .with_stackable(20, count)
    }

    #[test]
    fn test_pickup_creation() {
        let pickup = PickupComponent::new(SourceId(1), arrows(12));

        assert_eq!(pickup.pickup_message, "Pick up Arrows");
        assert_eq!(pickup.remaining(), 12);
        assert!(pickup.can_pickup());
        assert!(!PickupComponent::new(SourceId(2), arrows(0)).can_pickup());

        let prompted = pickup.with_message("Take the arrows");
        assert_eq!(prompted.pickup_message, "Take the arrows");
    }

    #[test]
    fn test_consume_despawns() {
        let mut world = PickupRegistry::new();
        let source = world.spawn(arrows(5));

        world.consume(source).unwrap();
        assert!(!world.contains(source));
        assert_eq!(world.consume(source), Err(InventoryError::UnknownSource(source)));
    }

    #[test]
    fn test_set_remaining() {
        let mut world = PickupRegistry::new();
        let source = world.spawn(arrows(15));

        world.set_remaining(source, 4).unwrap();
        assert_eq!(world.get(source).map(|p| p.remaining()), Some(4));
        assert!(world.set_remaining(SourceId(99), 1).is_err());
    }
}
