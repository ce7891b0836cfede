//! Item descriptors and capability fragments

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Item category. Each category gets its own grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ItemCategory {
    /// Weapons, armor and other wearables
    Equippable,
    /// Potions, food, ammunition
    Consumable,
    /// Crafting materials
    Craftable,
    /// Not shown in any grid
    None,
}

impl Default for ItemCategory {
    fn default() -> Self {
        Self::None
    }
}

/// Hierarchical item type tag, e.g. `GameItems.Consumables.Potions.Red`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemType(String);

impl ItemType {
    /// Create a type tag
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Tag text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Exact tag equality
    pub fn matches_exact(&self, other: &ItemType) -> bool {
        self.0 == other.0
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemType {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

/// Footprint of an item in the grid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridFragment {
    /// Width x height in cells
    pub grid_size: IVec2,
    /// Inset of the icon inside its cells, in pixels
    pub grid_padding: f32,
}

impl GridFragment {
    /// Create a footprint of `width` x `height` cells
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            grid_size: IVec2::new(width.max(1), height.max(1)),
            grid_padding: 0.0,
        }
    }

    /// Set icon padding
    pub fn with_padding(mut self, padding: f32) -> Self {
        self.grid_padding = padding;
        self
    }
}

impl Default for GridFragment {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

/// Icon shown for the item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageFragment {
    /// Icon asset path
    pub icon: String,
    /// Icon size in pixels
    pub icon_dimensions: Vec2,
}

impl ImageFragment {
    /// Create an image fragment with the default 44x44 icon size
    pub fn new(icon: impl Into<String>) -> Self {
        Self {
            icon: icon.into(),
            icon_dimensions: Vec2::new(44.0, 44.0),
        }
    }

    /// Set icon size
    pub fn with_dimensions(mut self, width: f32, height: f32) -> Self {
        self.icon_dimensions = Vec2::new(width, height);
        self
    }
}

/// Stack count and cap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackableFragment {
    /// Maximum units per grid stack
    pub max_stack_size: u32,
    /// Units carried by this descriptor
    pub stack_count: u32,
}

impl StackableFragment {
    /// Create a stackable fragment
    pub fn new(max_stack_size: u32, stack_count: u32) -> Self {
        Self {
            max_stack_size: max_stack_size.max(1),
            stack_count,
        }
    }
}

impl Default for StackableFragment {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

/// Fragment kind, used as the lookup key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FragmentKind {
    Grid,
    Image,
    Stackable,
}

/// A capability attached to a descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemFragment {
    Grid(GridFragment),
    Image(ImageFragment),
    Stackable(StackableFragment),
}

impl ItemFragment {
    /// Kind of this fragment
    pub fn kind(&self) -> FragmentKind {
        match self {
            Self::Grid(_) => FragmentKind::Grid,
            Self::Image(_) => FragmentKind::Image,
            Self::Stackable(_) => FragmentKind::Stackable,
        }
    }
}

/// Everything needed to create an item instance. Carried by world pickups
/// and copied into every instance, so stack count changes stay local to the
/// copy that made them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDescriptor {
    /// Display name
    pub name: String,
    /// Category (selects the grid)
    pub category: ItemCategory,
    /// Type tag (selects stack targets)
    pub item_type: ItemType,
    /// At most one fragment per kind
    fragments: Vec<ItemFragment>,
}

impl ItemDescriptor {
    /// Create a descriptor without fragments
    pub fn new(item_type: impl Into<ItemType>, category: ItemCategory) -> Self {
        let item_type = item_type.into();
        Self {
            name: item_type.to_string(),
            category,
            item_type,
            fragments: Vec::new(),
        }
    }

    /// Set display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Attach a fragment, replacing any existing fragment of the same kind
    pub fn with_fragment(mut self, fragment: ItemFragment) -> Self {
        self.set_fragment(fragment);
        self
    }

    /// Attach a grid footprint
    pub fn with_grid(self, width: i32, height: i32) -> Self {
        self.with_fragment(ItemFragment::Grid(GridFragment::new(width, height)))
    }

    /// Attach an icon
    pub fn with_image(self, icon: impl Into<String>) -> Self {
        self.with_fragment(ItemFragment::Image(ImageFragment::new(icon)))
    }

    /// Make stackable
    pub fn with_stackable(self, max_stack_size: u32, stack_count: u32) -> Self {
        self.with_fragment(ItemFragment::Stackable(StackableFragment::new(
            max_stack_size,
            stack_count,
        )))
    }

    /// Insert or replace a fragment
    pub fn set_fragment(&mut self, fragment: ItemFragment) {
        let kind = fragment.kind();
        match self.fragments.iter_mut().find(|f| f.kind() == kind) {
            Some(existing) => *existing = fragment,
            None => self.fragments.push(fragment),
        }
    }

    /// Look up a fragment by kind
    pub fn fragment(&self, kind: FragmentKind) -> Option<&ItemFragment> {
        self.fragments.iter().find(|f| f.kind() == kind)
    }

    fn fragment_mut(&mut self, kind: FragmentKind) -> Option<&mut ItemFragment> {
        self.fragments.iter_mut().find(|f| f.kind() == kind)
    }

    /// All fragments in insertion order
    pub fn fragments(&self) -> &[ItemFragment] {
        &self.fragments
    }

    pub fn grid(&self) -> Option<&GridFragment> {
        match self.fragment(FragmentKind::Grid) {
            Some(ItemFragment::Grid(grid)) => Some(grid),
            _ => None,
        }
    }

    pub fn image(&self) -> Option<&ImageFragment> {
        match self.fragment(FragmentKind::Image) {
            Some(ItemFragment::Image(image)) => Some(image),
            _ => None,
        }
    }

    pub fn stackable(&self) -> Option<&StackableFragment> {
        match self.fragment(FragmentKind::Stackable) {
            Some(ItemFragment::Stackable(stackable)) => Some(stackable),
            _ => None,
        }
    }

    /// Footprint in cells; 1x1 without a grid fragment
    pub fn dimensions(&self) -> IVec2 {
        self.grid().map(|g| g.grid_size).unwrap_or(IVec2::ONE)
    }

    /// Icon padding; 0 without a grid fragment
    pub fn padding(&self) -> f32 {
        self.grid().map(|g| g.grid_padding).unwrap_or(0.0)
    }

    pub fn is_stackable(&self) -> bool {
        self.stackable().is_some()
    }

    /// Maximum units per stack; 1 when not stackable
    pub fn max_stack_size(&self) -> u32 {
        self.stackable().map(|s| s.max_stack_size).unwrap_or(1)
    }

    /// Units carried; 1 when not stackable
    pub fn stack_count(&self) -> u32 {
        self.stackable().map(|s| s.stack_count).unwrap_or(1)
    }

    /// Change the carried unit count. No-op for non-stackable items.
    pub fn set_stack_count(&mut self, count: u32) {
        if let Some(ItemFragment::Stackable(stackable)) =
            self.fragment_mut(FragmentKind::Stackable)
        {
            stackable.stack_count = count;
        }
    }

    /// Copy of this descriptor carrying `count` units
    pub fn with_stack_count(&self, count: u32) -> Self {
        let mut copy = self.clone();
        copy.set_stack_count(count);
        copy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn potion() -> ItemDescriptor {
        ItemDescriptor::new("GameItems.Consumables.Potions.Red", ItemCategory::Consumable)
            .with_name("Red Potion")
            .with_image("icons/potion_red.png")
            .with_stackable(10, 3)
    }

    #[test]
    fn test_defaults_without_fragments() {
        let rock = ItemDescriptor::new("GameItems.Craftables.Rock", ItemCategory::Craftable);

        assert_eq!(rock.dimensions(), IVec2::ONE);
        assert!(!rock.is_stackable());
        assert_eq!(rock.max_stack_size(), 1);
        assert_eq!(rock.stack_count(), 1);
        assert!(rock.image().is_none());
    }

    #[test]
    fn test_fragment_lookup() {
        let item = potion().with_grid(1, 2);

        assert_eq!(item.dimensions(), IVec2::new(1, 2));
        assert_eq!(item.max_stack_size(), 10);
        assert_eq!(item.stack_count(), 3);
        assert_eq!(item.image().map(|i| i.icon.as_str()), Some("icons/potion_red.png"));
        assert!(item.fragment(FragmentKind::Grid).is_some());
    }

    #[test]
    fn test_one_fragment_per_kind() {
        let item = potion().with_stackable(20, 7);

        assert_eq!(item.fragments().len(), 2);
        assert_eq!(item.max_stack_size(), 20);
        assert_eq!(item.stack_count(), 7);
    }

    #[test]
    fn test_stack_count_is_local_to_copy() {
        let original = potion();
        let mut copy = original.clone();
        copy.set_stack_count(9);

        assert_eq!(original.stack_count(), 3);
        assert_eq!(copy.stack_count(), 9);
        assert_eq!(original.with_stack_count(5).stack_count(), 5);
    }

    #[test]
    fn test_item_type_exact_match() {
        let red = ItemType::new("GameItems.Consumables.Potions.Red");
        let potions = ItemType::new("GameItems.Consumables.Potions");

        assert!(red.matches_exact(&ItemType::from("GameItems.Consumables.Potions.Red")));
        assert!(!red.matches_exact(&potions));
        assert!(!potions.matches_exact(&red));
        assert_eq!(red.to_string(), "GameItems.Consumables.Potions.Red");
    }
}
