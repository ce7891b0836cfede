//! Generation-checked handles into the item arena
//!
//! Grid slots never own the items they display. They hold an [`ItemHandle`]
//! that resolves through the [`ItemArena`] owned by the item list, so a slot
//! pointing at an item that was consumed in the meantime is detected with a
//! single generation compare instead of dangling.

use core::fmt;

/// A handle to an item instance stored in an [`ItemArena`]
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemHandle {
    index: u32,
    generation: u32,
}

impl ItemHandle {
    /// Create a handle from raw parts
    #[inline]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Arena slot index
    #[inline]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Generation the slot had when this handle was issued
    #[inline]
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for ItemHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ItemHandle({}v{})", self.index, self.generation)
    }
}

struct ArenaEntry<T> {
    generation: u32,
    value: Option<T>,
}

/// Slot storage with generation tracking and index reuse
pub struct ItemArena<T> {
    entries: Vec<ArenaEntry<T>>,
    free_list: Vec<u32>,
    len: usize,
}

impl<T> ItemArena<T> {
    /// Create an empty arena
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            free_list: Vec::new(),
            len: 0,
        }
    }

    /// Store a value and return its handle
    pub fn insert(&mut self, value: T) -> ItemHandle {
        self.len += 1;
        if let Some(index) = self.free_list.pop() {
            let entry = &mut self.entries[index as usize];
            entry.value = Some(value);
            ItemHandle::new(index, entry.generation)
        } else {
            let index = self.entries.len() as u32;
            self.entries.push(ArenaEntry {
                generation: 0,
                value: Some(value),
            });
            ItemHandle::new(index, 0)
        }
    }

    /// Remove a value. The slot's generation is bumped so every outstanding
    /// handle to it turns stale.
    pub fn remove(&mut self, handle: ItemHandle) -> Option<T> {
        let entry = self.entries.get_mut(handle.index as usize)?;
        if entry.generation != handle.generation {
            return None;
        }
        let value = entry.value.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.free_list.push(handle.index);
        self.len -= 1;
        Some(value)
    }

    /// Resolve a handle
    pub fn get(&self, handle: ItemHandle) -> Option<&T> {
        let entry = self.entries.get(handle.index as usize)?;
        if entry.generation != handle.generation {
            return None;
        }
        entry.value.as_ref()
    }

    /// Resolve a handle mutably
    pub fn get_mut(&mut self, handle: ItemHandle) -> Option<&mut T> {
        let entry = self.entries.get_mut(handle.index as usize)?;
        if entry.generation != handle.generation {
            return None;
        }
        entry.value.as_mut()
    }

    /// Check whether a handle still resolves
    pub fn contains(&self, handle: ItemHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Number of live values
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if no values are stored
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Remove every value, invalidating all handles
    pub fn clear(&mut self) {
        for (index, entry) in self.entries.iter_mut().enumerate() {
            if entry.value.take().is_some() {
                entry.generation = entry.generation.wrapping_add(1);
                self.free_list.push(index as u32);
            }
        }
        self.len = 0;
    }

    /// Iterate over live handles and values in slot order
    pub fn iter(&self) -> impl Iterator<Item = (ItemHandle, &T)> {
        self.entries.iter().enumerate().filter_map(|(i, entry)| {
            entry
                .value
                .as_ref()
                .map(|v| (ItemHandle::new(i as u32, entry.generation), v))
        })
    }
}

impl<T> Default for ItemArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut arena = ItemArena::new();
        let a = arena.insert("potion");
        let b = arena.insert("sword");

        assert_ne!(a, b);
        assert_eq!(arena.get(a), Some(&"potion"));
        assert_eq!(arena.get(b), Some(&"sword"));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_removed_handle_is_stale() {
        let mut arena = ItemArena::new();
        let a = arena.insert(1);

        assert_eq!(arena.remove(a), Some(1));
        assert!(!arena.contains(a));
        assert_eq!(arena.remove(a), None);
        assert!(arena.is_empty());
    }

    #[test]
    fn test_reused_index_gets_new_generation() {
        let mut arena = ItemArena::new();
        let old = arena.insert(1);
        arena.remove(old);

        let new = arena.insert(2);
        assert_eq!(new.index(), old.index());
        assert_ne!(new.generation(), old.generation());
        assert_eq!(arena.get(old), None);
        assert_eq!(arena.get(new), Some(&2));
    }

    #[test]
    fn test_clear_invalidates_everything() {
        let mut arena = ItemArena::new();
        let a = arena.insert(1);
        let b = arena.insert(2);
        arena.clear();

        assert!(!arena.contains(a));
        assert!(!arena.contains(b));
        assert_eq!(arena.iter().count(), 0);
    }
}
