//! Symbolic constants shared with the game's `defines` table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Facing of a placed entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Bare name as it appears after `defines.direction.`
    pub fn name(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        }
    }

    /// Full dotted Lua name, e.g. `defines.direction.north`
    pub fn symbol(self) -> &'static str {
        match self {
            Direction::North => "defines.direction.north",
            Direction::South => "defines.direction.south",
            Direction::East => "defines.direction.east",
            Direction::West => "defines.direction.west",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.name() == name)
    }

    /// Resolve a step-file symbol, falling back to `North` for names that
    /// don't match. Exported step files depend on this fallback.
    pub fn resolve(name: &str) -> Self {
        Self::from_name(name).unwrap_or(Direction::North)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Inventory slot group targeted by `take` and `put`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InventoryType {
    Fuel,
    Input,
    Main,
    Chest,
}

impl InventoryType {
    pub const ALL: [InventoryType; 4] = [
        InventoryType::Fuel,
        InventoryType::Input,
        InventoryType::Main,
        InventoryType::Chest,
    ];

    pub fn name(self) -> &'static str {
        match self {
            InventoryType::Fuel => "fuel",
            InventoryType::Input => "input",
            InventoryType::Main => "main",
            InventoryType::Chest => "chest",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            InventoryType::Fuel => "defines.inventory.fuel",
            InventoryType::Input => "defines.inventory.input",
            InventoryType::Main => "defines.inventory.main",
            InventoryType::Chest => "defines.inventory.chest",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i.name() == name)
    }

    /// Same fallback rule as [`Direction::resolve`], defaulting to `Main`.
    pub fn resolve(name: &str) -> Self {
        Self::from_name(name).unwrap_or(InventoryType::Main)
    }
}

impl fmt::Display for InventoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
