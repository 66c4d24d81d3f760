//! Wire renderers: turn a batch of queued actions into something a
//! transport can deliver.
//!
//! Two formats exist, a console command for the RCON channel and a JSON
//! body for the HTTP API. Both go through [`Renderer`] so the queue and the
//! parser never see format details.

pub mod console;
pub mod http;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::actions::{Action, ActionKind};

pub use console::ConsoleRenderer;
pub use http::{ActionsRequest, AgentActions, HttpRenderer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    #[default]
    Console,
    Http,
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireFormat::Console => f.write_str("console"),
            WireFormat::Http => f.write_str("http"),
        }
    }
}

/// What a flush does when nothing is queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyQueuePolicy {
    /// Send the (empty) batch anyway.
    Send,
    /// Refuse with `SessionError::EmptyQueue`.
    Reject,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("{kind} action #{index} has a non-finite coordinate")]
    NonFiniteCoordinate { index: usize, kind: ActionKind },
    #[error("failed to encode request body: {0}")]
    Json(#[from] serde_json::Error),
}

pub trait Renderer {
    type Output;

    fn format(&self) -> WireFormat;

    fn empty_queue(&self) -> EmptyQueuePolicy;

    /// Render the whole batch. Either every action renders or nothing does.
    fn render(&self, agent_id: u32, actions: &[Action]) -> Result<Self::Output, RenderError>;
}

/// World snapshots the backend can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Meta,
    Map,
    State,
}

impl DataType {
    /// Remote-call name on the console channel.
    pub fn call_name(self) -> &'static str {
        match self {
            DataType::Meta => "meta_data",
            DataType::Map => "map_data",
            DataType::State => "state_data",
        }
    }

    /// Path segment on the HTTP API.
    pub fn path_segment(self) -> &'static str {
        match self {
            DataType::Meta => "meta",
            DataType::Map => "map",
            DataType::State => "state",
        }
    }
}

impl std::str::FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "meta" | "meta_data" => Ok(DataType::Meta),
            "map" | "map_data" => Ok(DataType::Map),
            "state" | "state_data" => Ok(DataType::State),
            other => Err(format!("unknown data type '{}'", other)),
        }
    }
}

fn check_coordinates(actions: &[Action]) -> Result<(), RenderError> {
    for (index, action) in actions.iter().enumerate() {
        if let Some(p) = action.position() {
            if !p.x.is_finite() || !p.y.is_finite() {
                return Err(RenderError::NonFiniteCoordinate {
                    index,
                    kind: action.kind(),
                });
            }
        }
    }
    Ok(())
}
