//! fle-bridge: queue, encode and deliver agent actions to a running
//! simulation.
//!
//! Actions come either from typed calls on an [`ActionQueue`] or from a
//! step script run through [`StepParser`]. An [`AgentSession`] owns the
//! queue and flushes it over RCON (console-command format) or the HTTP API
//! (JSON format).

pub mod actions;
pub mod config;
pub mod queue;
pub mod script;
pub mod session;
pub mod transport;
pub mod wire;

pub use actions::{Action, ActionKind, Direction, InventoryType, Position, ValidationError};
pub use config::BridgeConfig;
pub use queue::ActionQueue;
pub use script::StepParser;
pub use session::{AgentSession, FlushReply, SessionError};
pub use wire::{DataType, WireFormat};
