//! Inventory component
//!
//! [`InventoryComponent`] is what a player entity carries. Every instance
//! owns a list mirror, its grids and a drag controller. Exactly one instance
//! per inventory holds [`NetRole::Authority`]: it owns the command inbox and
//! is the only one that mutates its list. Remote instances send commands and
//! apply the authority's [`ListChange`]s.
//!
//! A standalone game is an authority with no remotes. Its own pickups still
//! go through the command queue, so both topologies run the same code.

use crate::command::{command_channel, CommandEnvelope, CommandReceiver, CommandSender, PeerId, ServerCommand};
use crate::config::InventoryConfig;
use crate::drag::{DragPlacementController, DropOutcome, HoverUpdate, PointerButton};
use crate::error::{InventoryError, Result};
use crate::events::{InventoryEvent, InventoryEventBus, SubscriberId};
use crate::handle::ItemHandle;
use crate::item::ItemCategory;
use crate::list::{ItemList, ListChange, ListNotification};
use crate::pickup::{PickupComponent, PickupWorld};
use crate::spatial::SpatialInventory;
use glam::Vec2;
use std::collections::HashMap;

/// Write authority of a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NetRole {
    /// Owns the list and executes commands
    Authority,
    /// Mirrors the authority's list
    Remote,
}

/// What a pickup attempt asked the authority to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddRequest {
    /// Create a new entry; `amount` is 0 for non-stackable items
    NewItem { amount: u32 },
    /// Grow an existing entry
    Stacks { amount: u32, remainder: u32 },
    /// Nothing fits; no command was sent
    NoRoom,
    /// The pickup is disabled or empty
    Unavailable,
}

/// Player-side inventory coordinator
pub struct InventoryComponent {
    role: NetRole,
    list: ItemList,
    spatial: SpatialInventory,
    drag: DragPlacementController,
    events: InventoryEventBus,
    commands: CommandSender,
    inbox: Option<CommandReceiver>,
    /// Highest sequence executed per peer
    last_sequences: HashMap<PeerId, u64>,
    /// Changes not yet sent to remotes
    outgoing: Vec<ListChange>,
}

impl InventoryComponent {
    /// Create the authoritative component. Its own requests loop back
    /// through its inbox.
    pub fn authority(config: &InventoryConfig) -> Result<Self> {
        config.validate()?;
        let (commands, inbox) = command_channel(config.command_capacity);
        log::info!("Inventory authority created with {} grids", config.grids.len());
        Ok(Self::with_parts(NetRole::Authority, config, commands, Some(inbox)))
    }

    /// Create a remote mirror that sends its requests through `commands`
    pub fn remote(config: &InventoryConfig, commands: CommandSender) -> Result<Self> {
        config.validate()?;
        log::info!("Inventory mirror created for peer {:?}", commands.origin());
        Ok(Self::with_parts(NetRole::Remote, config, commands, None))
    }

    fn with_parts(
        role: NetRole,
        config: &InventoryConfig,
        commands: CommandSender,
        inbox: Option<CommandReceiver>,
    ) -> Self {
        Self {
            role,
            list: ItemList::new(),
            spatial: SpatialInventory::new(config),
            drag: DragPlacementController::new(),
            events: InventoryEventBus::new(),
            commands,
            inbox,
            last_sequences: HashMap::new(),
            outgoing: Vec::new(),
        }
    }

    pub fn role(&self) -> NetRole {
        self.role
    }

    pub fn is_authority(&self) -> bool {
        self.role == NetRole::Authority
    }

    pub fn list(&self) -> &ItemList {
        &self.list
    }

    pub fn spatial(&self) -> &SpatialInventory {
        &self.spatial
    }

    pub fn drag(&self) -> &DragPlacementController {
        &self.drag
    }

    /// Sender for a peer joining this inventory. Forgets the peer's previous
    /// sequence numbers.
    pub fn connect_peer(&mut self, peer: PeerId) -> Result<CommandSender> {
        if !self.is_authority() {
            return Err(InventoryError::AuthorityViolation);
        }
        self.last_sequences.remove(&peer);
        log::debug!("Peer {:?} connected", peer);
        Ok(self.commands.for_peer(peer))
    }

    pub fn subscribe<F>(&mut self, handler: F) -> SubscriberId
    where
        F: Fn(&InventoryEvent) + Send + Sync + 'static,
    {
        self.events.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Ask the authority to take a pickup. Queries the local grids and sends
    /// an add-stacks or add-new-item command depending on what fits.
    pub fn try_add_item(&mut self, pickup: &PickupComponent) -> Result<AddRequest> {
        if !pickup.can_pickup() {
            return Ok(AddRequest::Unavailable);
        }

        let descriptor = &pickup.descriptor;
        let result = self.spatial.has_room_for_item(descriptor);
        if !result.has_room() {
            log::debug!("No room for {}", descriptor.item_type);
            self.events.publish(InventoryEvent::NoRoomInInventory {
                item_type: descriptor.item_type.clone(),
            });
            self.events.dispatch();
            return Ok(AddRequest::NoRoom);
        }

        // Grow the instance whose stack the query found first, counting
        // only room that instance can use
        let target = result
            .item
            .filter(|_| result.stackable)
            .and_then(|handle| self.list.get(handle).map(|item| (handle, item.id())));
        if let Some((handle, id)) = target {
            let result = self.spatial.has_room_for_instance(descriptor, handle);
            self.commands.send(ServerCommand::AddStacks {
                source: pickup.id,
                item: id,
                item_type: descriptor.item_type.clone(),
                amount: result.total_room_to_fill,
                remainder: result.remainder,
            })?;
            return Ok(AddRequest::Stacks {
                amount: result.total_room_to_fill,
                remainder: result.remainder,
            });
        }

        let amount = if result.stackable {
            result.total_room_to_fill
        } else {
            0
        };
        self.commands.send(ServerCommand::AddNewItem {
            source: pickup.id,
            descriptor: descriptor.clone(),
            amount,
        })?;
        Ok(AddRequest::NewItem { amount })
    }

    /// Ask the authority to drop an entry
    pub fn remove_item(&mut self, handle: ItemHandle) -> Result<u64> {
        let id = self
            .list
            .get(handle)
            .map(|item| item.id())
            .ok_or(InventoryError::StaleReference(handle))?;
        self.commands.send(ServerCommand::RemoveItem { item: id })
    }

    /// Execute every queued command. Commands that fail are logged and
    /// skipped. Returns how many succeeded.
    pub fn process_commands(&mut self, world: &mut dyn PickupWorld) -> Result<usize> {
        let envelopes = match &self.inbox {
            Some(inbox) => inbox.drain(),
            None => return Err(InventoryError::AuthorityViolation),
        };

        let mut applied = 0;
        for envelope in envelopes {
            let origin = envelope.origin;
            match self.execute(envelope, world) {
                Ok(()) => applied += 1,
                Err(e) => log::warn!("Rejected command from {:?}: {}", origin, e),
            }
        }
        Ok(applied)
    }

    fn execute(&mut self, envelope: CommandEnvelope, world: &mut dyn PickupWorld) -> Result<()> {
        let last = self.last_sequences.entry(envelope.origin).or_insert(0);
        if envelope.sequence <= *last {
            return Err(InventoryError::DuplicateCommand {
                peer: envelope.origin,
                sequence: envelope.sequence,
            });
        }
        *last = envelope.sequence;

        match envelope.command {
            ServerCommand::AddNewItem {
                source,
                mut descriptor,
                amount,
            } => {
                let carried = descriptor.stack_count();
                let partial = descriptor.is_stackable() && amount > 0;
                if partial {
                    descriptor.set_stack_count(amount);
                }
                self.list.add_entry(descriptor);
                // Local observers must see the entry before the source goes away
                self.flush();

                if partial && carried > amount {
                    world.set_remaining(source, carried - amount)
                } else {
                    world.consume(source)
                }
            }
            ServerCommand::AddStacks {
                source,
                item,
                item_type,
                amount,
                remainder,
            } => {
                let handle = match self.list.handle_of(item) {
                    Some(handle) => handle,
                    None => {
                        log::debug!("{:?} is gone; growing the oldest {}", item, item_type);
                        self.list
                            .find_first_item_by_type(&item_type)
                            .ok_or(InventoryError::NoItemOfType(item_type))?
                    }
                };
                self.list.add_stacks(handle, amount)?;
                self.flush();

                if remainder == 0 {
                    world.consume(source)
                } else {
                    world.set_remaining(source, remainder)
                }
            }
            ServerCommand::RemoveItem { item } => {
                let handle = self
                    .list
                    .handle_of(item)
                    .ok_or(InventoryError::UnknownItem(item))?;
                self.list.remove_entry(handle);
                self.flush();
                Ok(())
            }
        }
    }

    /// Changes made since the last call, for sending to remotes
    pub fn drain_replication(&mut self) -> Vec<ListChange> {
        std::mem::take(&mut self.outgoing)
    }

    /// Full list content for a remote that (re)connects
    pub fn replication_snapshot(&self) -> Vec<ListChange> {
        self.list.snapshot()
    }

    /// Apply changes received from the authority. Duplicates are ignored.
    /// Returns how many changed the mirror.
    pub fn apply_replication(
        &mut self,
        changes: impl IntoIterator<Item = ListChange>,
    ) -> Result<usize> {
        if self.is_authority() {
            return Err(InventoryError::AuthorityViolation);
        }

        let mut applied = 0;
        for change in changes {
            if self.list.apply_replicated(change) {
                applied += 1;
            }
            self.flush();
        }
        Ok(applied)
    }

    /// Replace the mirror with a snapshot and rebuild the grids from it
    pub fn reconnect(&mut self, snapshot: Vec<ListChange>) -> Result<()> {
        if self.is_authority() {
            return Err(InventoryError::AuthorityViolation);
        }

        self.list.reset();
        for change in snapshot {
            self.list.apply_replicated(change);
        }
        self.list.drain_notifications();
        self.rebuild_grids()?;
        log::info!("Inventory mirror resynchronized with {} items", self.list.len());
        Ok(())
    }

    /// Rebuild every grid from the list. A held item is dropped, since the
    /// rebuild places it again.
    pub fn rebuild_grids(&mut self) -> Result<()> {
        self.drag.clear();
        self.spatial.rebuild(&self.list)?;
        self.events.publish(InventoryEvent::InventoryRebuilt);
        self.events.dispatch();
        Ok(())
    }

    /// Switch the displayed grid. A held item is put back first.
    pub fn show(&mut self, category: ItemCategory) -> Result<bool> {
        if self.drag.is_holding() {
            self.cancel_drag()?;
        }
        Ok(self.spatial.show(category))
    }

    /// Click on a slot of the displayed grid
    pub fn click_slot(&mut self, index: usize, button: PointerButton) -> bool {
        match self.spatial.active_grid_mut() {
            Some(grid) => self.drag.on_slot_clicked(grid, index, button),
            None => false,
        }
    }

    /// Pointer moved over the displayed grid
    pub fn pointer_moved(&mut self, canvas_position: Vec2, cursor_position: Vec2) -> Option<HoverUpdate> {
        let grid = self.spatial.active_grid_mut()?;
        self.drag.update_pointer(grid, canvas_position, cursor_position)
    }

    /// Release the held item on the displayed grid
    pub fn release(&mut self) -> Result<DropOutcome> {
        match self.spatial.active_grid_mut() {
            Some(grid) => self.drag.release(grid),
            None => Err(InventoryError::NotHolding),
        }
    }

    /// Put the held item back
    pub fn cancel_drag(&mut self) -> Result<usize> {
        match self.spatial.active_grid_mut() {
            Some(grid) => self.drag.cancel(grid),
            None => Err(InventoryError::NotHolding),
        }
    }

    /// Route list notifications to the grids, the drag controller and the
    /// event bus, then deliver the events
    fn flush(&mut self) {
        for notification in self.list.drain_notifications() {
            if let ListNotification::Removed { handle, .. } = &notification {
                self.drag.discard_if_held(*handle);
            }
            if let Err(e) = self.spatial.apply(&notification, &self.list) {
                log::warn!("Grid update failed: {}", e);
            }
            self.events.publish(match notification {
                ListNotification::Added(handle) => InventoryEvent::ItemAdded { handle },
                ListNotification::Removed { handle, item } => {
                    InventoryEvent::ItemRemoved { handle, item }
                }
                ListNotification::StackChanged {
                    handle,
                    previous,
                    current,
                } => InventoryEvent::StackChanged {
                    handle,
                    previous,
                    current,
                },
            });
        }

        let changes = self.list.drain_changes();
        if self.is_authority() {
            self.outgoing.extend(changes);
        }
        self.events.dispatch();
    }
}

impl std::fmt::Debug for InventoryComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryComponent")
            .field("role", &self.role)
            .field("items", &self.list.len())
            .field("holding", &self.drag.is_holding())
            .field("outgoing", &self.outgoing.len())
            .finish()
    }
}
