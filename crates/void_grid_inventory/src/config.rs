//! Inventory configuration

use crate::error::{InventoryError, Result};
use crate::item::ItemCategory;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Configuration of a single category grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Category of items this grid accepts
    pub category: ItemCategory,
    /// Number of rows
    pub rows: usize,
    /// Number of columns
    pub columns: usize,
    /// Tile edge length in pixels
    #[serde(default = "default_tile_size")]
    pub tile_size: f32,
}

fn default_tile_size() -> f32 {
    64.0
}

impl GridConfig {
    /// Create a grid config with the default tile size
    pub fn new(category: ItemCategory, rows: usize, columns: usize) -> Self {
        Self {
            category,
            rows,
            columns,
            tile_size: default_tile_size(),
        }
    }

    /// Set tile size
    pub fn with_tile_size(mut self, tile_size: f32) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// Total slot count
    pub fn slot_count(&self) -> usize {
        self.rows * self.columns
    }
}

/// Configuration for an inventory component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// One grid per category
    pub grids: Vec<GridConfig>,
    /// Bound of the server command queue (None = unbounded)
    pub command_capacity: Option<usize>,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            grids: vec![
                GridConfig::new(ItemCategory::Equippable, 6, 8),
                GridConfig::new(ItemCategory::Consumable, 6, 8),
                GridConfig::new(ItemCategory::Craftable, 6, 8),
            ],
            command_capacity: None,
        }
    }
}

impl InventoryConfig {
    /// Config without any grid
    pub fn empty() -> Self {
        Self {
            grids: Vec::new(),
            command_capacity: None,
        }
    }

    /// Add a grid, replacing any grid of the same category
    pub fn with_grid(mut self, grid: GridConfig) -> Self {
        self.grids.retain(|g| g.category != grid.category);
        self.grids.push(grid);
        self
    }

    /// Bound the command queue
    pub fn with_command_capacity(mut self, capacity: usize) -> Self {
        self.command_capacity = Some(capacity);
        self
    }

    /// Grid config for a category
    pub fn grid(&self, category: ItemCategory) -> Option<&GridConfig> {
        self.grids.iter().find(|g| g.category == category)
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| InventoryError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check grid sizes and category uniqueness
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for grid in &self.grids {
            if grid.category == ItemCategory::None {
                return Err(InventoryError::InvalidConfig(
                    "category None cannot have a grid".into(),
                ));
            }
            if grid.rows == 0 || grid.columns == 0 {
                return Err(InventoryError::InvalidConfig(format!(
                    "{:?} grid must have at least one row and column",
                    grid.category
                )));
            }
            if grid.tile_size.is_nan() || grid.tile_size <= 0.0 {
                return Err(InventoryError::InvalidConfig(format!(
                    "{:?} grid tile size must be positive",
                    grid.category
                )));
            }
            if !seen.insert(grid.category) {
                return Err(InventoryError::InvalidConfig(format!(
                    "duplicate {:?} grid",
                    grid.category
                )));
            }
        }
        if self.command_capacity == Some(0) {
            return Err(InventoryError::InvalidConfig(
                "command capacity must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = InventoryConfig::default();

        assert_eq!(config.grids.len(), 3);
        assert!(config.validate().is_ok());
        assert_eq!(config.grid(ItemCategory::Consumable).map(|g| g.slot_count()), Some(48));
        assert!(config.grid(ItemCategory::None).is_none());
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "grids": [
                { "category": "Consumable", "rows": 4, "columns": 4 },
                { "category": "Equippable", "rows": 2, "columns": 5, "tile_size": 32.0 }
            ],
            "command_capacity": 64
        }"#;

        let config = InventoryConfig::from_json(json).unwrap();
        assert_eq!(config.grids.len(), 2);
        assert_eq!(config.grid(ItemCategory::Consumable).map(|g| g.tile_size), Some(64.0));
        assert_eq!(config.grid(ItemCategory::Equippable).map(|g| g.tile_size), Some(32.0));
        assert_eq!(config.command_capacity, Some(64));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut duplicate = InventoryConfig::empty()
            .with_grid(GridConfig::new(ItemCategory::Craftable, 2, 2));
        duplicate.grids.push(GridConfig::new(ItemCategory::Craftable, 3, 3));
        assert!(matches!(duplicate.validate(), Err(InventoryError::InvalidConfig(_))));

        let empty_grid = InventoryConfig::empty()
            .with_grid(GridConfig::new(ItemCategory::Craftable, 0, 2));
        assert!(empty_grid.validate().is_err());

        assert!(InventoryConfig::from_json("{ not json").is_err());
    }

    #[test]
    fn test_with_grid_replaces_category() {
        let config = InventoryConfig::default()
            .with_grid(GridConfig::new(ItemCategory::Consumable, 1, 1));

        assert_eq!(config.grids.len(), 3);
        assert_eq!(config.grid(ItemCategory::Consumable).map(|g| g.slot_count()), Some(1));
    }
}
