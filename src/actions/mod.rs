//! Action model: the closed set of things an agent can be told to do.
//!
//! Every other part of the crate (step-script parser, queue, renderers)
//! consumes these types. Constructors validate, so an [`Action`] obtained
//! through them is always well-formed; values built by hand are checked
//! again by [`Action::validate`] before they reach a queue.

pub mod defines;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use defines::{Direction, InventoryType};

/// Quantity sentinel meaning "everything available".
pub const QUANTITY_ALL: i32 = -1;

/// Map coordinates. No range checks are applied here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{},{}}}", self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    EmptyName { field: &'static str },
    #[error("{field} must not contain quotes, backslashes or line breaks")]
    UnquotableName { field: &'static str },
    #[error("quantity must be positive or -1 (all), got {quantity}")]
    InvalidQuantity { quantity: i32 },
    #[error("{field} must be positive, got {ticks}")]
    InvalidTicks { field: &'static str, ticks: i32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Research {
        technology_name: String,
    },
    CancelResearch,
    Walk {
        #[serde(rename = "position")]
        destination: Position,
    },
    Take {
        position: Position,
        item_name: String,
        quantity: i32,
        inventory_type: InventoryType,
    },
    Put {
        position: Position,
        item_name: String,
        quantity: i32,
        inventory_type: InventoryType,
    },
    Craft {
        item_name: String,
        quantity: i32,
    },
    CancelCraft {
        item_name: String,
        quantity: i32,
    },
    Build {
        position: Position,
        item_name: String,
        direction: Direction,
    },
    Rotate {
        position: Position,
        reverse: bool,
    },
    Mine {
        position: Position,
        ticks: i32,
    },
    Recipe {
        position: Position,
        recipe_name: String,
    },
    Wait {
        ticks: i32,
    },
    Drop {
        position: Position,
        item_name: String,
    },
    LaunchRocket {
        position: Position,
    },
    PickUp {
        ticks: i32,
    },
}

/// Fieldless tag for each [`Action`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Research,
    CancelResearch,
    Walk,
    Take,
    Put,
    Craft,
    CancelCraft,
    Build,
    Rotate,
    Mine,
    Recipe,
    Wait,
    Drop,
    LaunchRocket,
    PickUp,
}

impl ActionKind {
    pub const ALL: [ActionKind; 15] = [
        ActionKind::Research,
        ActionKind::CancelResearch,
        ActionKind::Walk,
        ActionKind::Take,
        ActionKind::Put,
        ActionKind::Craft,
        ActionKind::CancelCraft,
        ActionKind::Build,
        ActionKind::Rotate,
        ActionKind::Mine,
        ActionKind::Recipe,
        ActionKind::Wait,
        ActionKind::Drop,
        ActionKind::LaunchRocket,
        ActionKind::PickUp,
    ];

    /// Wire name, identical to the serde tag.
    pub fn name(self) -> &'static str {
        match self {
            ActionKind::Research => "research",
            ActionKind::CancelResearch => "cancel_research",
            ActionKind::Walk => "walk",
            ActionKind::Take => "take",
            ActionKind::Put => "put",
            ActionKind::Craft => "craft",
            ActionKind::CancelCraft => "cancel_craft",
            ActionKind::Build => "build",
            ActionKind::Rotate => "rotate",
            ActionKind::Mine => "mine",
            ActionKind::Recipe => "recipe",
            ActionKind::Wait => "wait",
            ActionKind::Drop => "drop",
            ActionKind::LaunchRocket => "launch_rocket",
            ActionKind::PickUp => "pick_up",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn check_name(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyName { field });
    }
    if value.contains(['"', '\\', '\n', '\r']) {
        return Err(ValidationError::UnquotableName { field });
    }
    Ok(())
}

fn check_quantity(quantity: i32) -> Result<(), ValidationError> {
    if quantity == QUANTITY_ALL || quantity > 0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidQuantity { quantity })
    }
}

fn check_ticks(field: &'static str, ticks: i32) -> Result<(), ValidationError> {
    if ticks > 0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidTicks { field, ticks })
    }
}

impl Action {
    pub fn research(technology_name: impl Into<String>) -> Result<Self, ValidationError> {
        Self::Research {
            technology_name: technology_name.into(),
        }
        .validated()
    }

    pub fn cancel_research() -> Self {
        Self::CancelResearch
    }

    pub fn walk(destination: Position) -> Self {
        Self::Walk { destination }
    }

    pub fn take(
        position: Position,
        item_name: impl Into<String>,
        quantity: i32,
        inventory_type: InventoryType,
    ) -> Result<Self, ValidationError> {
        Self::Take {
            position,
            item_name: item_name.into(),
            quantity,
            inventory_type,
        }
        .validated()
    }

    pub fn put(
        position: Position,
        item_name: impl Into<String>,
        quantity: i32,
        inventory_type: InventoryType,
    ) -> Result<Self, ValidationError> {
        Self::Put {
            position,
            item_name: item_name.into(),
            quantity,
            inventory_type,
        }
        .validated()
    }

    pub fn craft(item_name: impl Into<String>, quantity: i32) -> Result<Self, ValidationError> {
        Self::Craft {
            item_name: item_name.into(),
            quantity,
        }
        .validated()
    }

    pub fn cancel_craft(
        item_name: impl Into<String>,
        quantity: i32,
    ) -> Result<Self, ValidationError> {
        Self::CancelCraft {
            item_name: item_name.into(),
            quantity,
        }
        .validated()
    }

    pub fn build(
        position: Position,
        item_name: impl Into<String>,
        direction: Direction,
    ) -> Result<Self, ValidationError> {
        Self::Build {
            position,
            item_name: item_name.into(),
            direction,
        }
        .validated()
    }

    pub fn rotate(position: Position, reverse: bool) -> Self {
        Self::Rotate { position, reverse }
    }

    pub fn mine(position: Position, ticks: i32) -> Result<Self, ValidationError> {
        Self::Mine { position, ticks }.validated()
    }

    pub fn recipe(
        position: Position,
        recipe_name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::Recipe {
            position,
            recipe_name: recipe_name.into(),
        }
        .validated()
    }

    pub fn wait(ticks: i32) -> Result<Self, ValidationError> {
        Self::Wait { ticks }.validated()
    }

    pub fn drop(position: Position, item_name: impl Into<String>) -> Result<Self, ValidationError> {
        Self::Drop {
            position,
            item_name: item_name.into(),
        }
        .validated()
    }

    pub fn launch_rocket(position: Position) -> Self {
        Self::LaunchRocket { position }
    }

    pub fn pick_up(ticks: i32) -> Result<Self, ValidationError> {
        Self::PickUp { ticks }.validated()
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Research { .. } => ActionKind::Research,
            Action::CancelResearch => ActionKind::CancelResearch,
            Action::Walk { .. } => ActionKind::Walk,
            Action::Take { .. } => ActionKind::Take,
            Action::Put { .. } => ActionKind::Put,
            Action::Craft { .. } => ActionKind::Craft,
            Action::CancelCraft { .. } => ActionKind::CancelCraft,
            Action::Build { .. } => ActionKind::Build,
            Action::Rotate { .. } => ActionKind::Rotate,
            Action::Mine { .. } => ActionKind::Mine,
            Action::Recipe { .. } => ActionKind::Recipe,
            Action::Wait { .. } => ActionKind::Wait,
            Action::Drop { .. } => ActionKind::Drop,
            Action::LaunchRocket { .. } => ActionKind::LaunchRocket,
            Action::PickUp { .. } => ActionKind::PickUp,
        }
    }

    /// Map coordinate the action targets, if it has one.
    pub fn position(&self) -> Option<Position> {
        match self {
            Action::Walk { destination } => Some(*destination),
            Action::Take { position, .. }
            | Action::Put { position, .. }
            | Action::Build { position, .. }
            | Action::Rotate { position, .. }
            | Action::Mine { position, .. }
            | Action::Recipe { position, .. }
            | Action::Drop { position, .. }
            | Action::LaunchRocket { position } => Some(*position),
            Action::Research { .. }
            | Action::CancelResearch
            | Action::Craft { .. }
            | Action::CancelCraft { .. }
            | Action::Wait { .. }
            | Action::PickUp { .. } => None,
        }
    }

    /// Check field invariants on a value that may have been built directly.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Action::Research { technology_name } => check_name("technology_name", technology_name),
            Action::Take {
                item_name,
                quantity,
                ..
            }
            | Action::Put {
                item_name,
                quantity,
                ..
            }
            | Action::Craft {
                item_name,
                quantity,
            }
            | Action::CancelCraft {
                item_name,
                quantity,
            } => {
                check_name("item_name", item_name)?;
                check_quantity(*quantity)
            }
            Action::Build { item_name, .. } | Action::Drop { item_name, .. } => {
                check_name("item_name", item_name)
            }
            Action::Recipe { recipe_name, .. } => check_name("recipe_name", recipe_name),
            Action::Mine { ticks, .. } | Action::Wait { ticks } | Action::PickUp { ticks } => {
                check_ticks("ticks", *ticks)
            }
            Action::CancelResearch
            | Action::Walk { .. }
            | Action::Rotate { .. }
            | Action::LaunchRocket { .. } => Ok(()),
        }
    }

    fn validated(self) -> Result<Self, ValidationError> {
        self.validate()?;
        Ok(self)
    }
}
