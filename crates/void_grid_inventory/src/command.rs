//! Requests from any peer to the inventory authority
//!
//! Non-authoritative peers never mutate their item list. They send a
//! [`ServerCommand`] through a [`CommandSender`]; the authority drains its
//! [`CommandReceiver`] once per tick and applies each command in order.
//! Every envelope carries the sending peer and a per-sender sequence number
//! so the authority can drop duplicates.

use crate::error::{InventoryError, Result};
use crate::item::{ItemDescriptor, ItemType};
use crate::list::ItemId;
use crate::pickup::SourceId;
use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TrySendError};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Network peer identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PeerId(pub u32);

impl PeerId {
    /// The authority itself
    pub const AUTHORITY: PeerId = PeerId(0);
}

/// A mutation request for the authority
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ServerCommand {
    /// Create a new list entry from a pickup. `amount` is 0 for
    /// non-stackable items.
    AddNewItem {
        source: SourceId,
        descriptor: ItemDescriptor,
        amount: u32,
    },
    /// Grow entry `item` by `amount`; `remainder` units stay behind in the
    /// pickup. If `item` is gone the oldest entry of `item_type` grows
    /// instead.
    AddStacks {
        source: SourceId,
        item: ItemId,
        item_type: ItemType,
        amount: u32,
        remainder: u32,
    },
    /// Drop an entry
    RemoveItem { item: ItemId },
}

/// A command with its origin and sequence number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub origin: PeerId,
    pub sequence: u64,
    pub command: ServerCommand,
}

/// Sending half. Clones share one sequence counter.
#[derive(Debug, Clone)]
pub struct CommandSender {
    origin: PeerId,
    sender: Sender<CommandEnvelope>,
    next_sequence: Arc<AtomicU64>,
}

impl CommandSender {
    /// Peer this sender speaks for
    pub fn origin(&self) -> PeerId {
        self.origin
    }

    /// Sender into the same channel for another peer, with its own sequence
    pub fn for_peer(&self, origin: PeerId) -> Self {
        Self {
            origin,
            sender: self.sender.clone(),
            next_sequence: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Send a command. Returns its sequence number.
    pub fn send(&self, command: ServerCommand) -> Result<u64> {
        let sequence = self.next_sequence.fetch_add(1, Ordering::Relaxed);
        self.forward(CommandEnvelope {
            origin: self.origin,
            sequence,
            command,
        })?;
        Ok(sequence)
    }

    /// Pass an envelope along unchanged
    pub fn forward(&self, envelope: CommandEnvelope) -> Result<()> {
        self.sender.try_send(envelope).map_err(|e| match e {
            TrySendError::Full(_) => InventoryError::ChannelFull,
            TrySendError::Disconnected(_) => InventoryError::ChannelClosed,
        })
    }
}

/// Receiving half, owned by the authority
#[derive(Debug)]
pub struct CommandReceiver {
    receiver: Receiver<CommandEnvelope>,
}

impl CommandReceiver {
    /// Take every queued envelope in arrival order
    pub fn drain(&self) -> Vec<CommandEnvelope> {
        let mut envelopes = Vec::new();
        while let Ok(envelope) = self.receiver.try_recv() {
            envelopes.push(envelope);
        }
        envelopes
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

/// Create a command channel. The sender speaks for the authority; use
/// [`CommandSender::for_peer`] to hand senders to other peers.
pub fn command_channel(capacity: Option<usize>) -> (CommandSender, CommandReceiver) {
    let (sender, receiver) = match capacity {
        Some(capacity) => bounded(capacity),
        None => unbounded(),
    };
    (
        CommandSender {
            origin: PeerId::AUTHORITY,
            sender,
            next_sequence: Arc::new(AtomicU64::new(1)),
        },
        CommandReceiver { receiver },
    )
}
