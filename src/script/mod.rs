//! Step-script mini-language: one action per line.
//!
//! ```text
//! -- comments start with two dashes
//! step[1] = {"walk", {10.5, -2.25}}
//! step[2] = {"take", {0.5, -7.5}, "coal", 50, defines.inventory.chest}
//! [3] "craft", 5, "iron-gear-wheel"
//! ```

pub mod parser;
pub mod scanner;

pub use parser::{
    LineError, MalformedStepError, ParseOutcome, ParseReport, ScriptError, StepParser, UnknownStep,
};
pub use scanner::ScanError;
