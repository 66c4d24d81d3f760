use std::path::{Path, PathBuf};

use thiserror::Error;

use super::scanner::{self, ScanError, SymbolCategory};
use crate::actions::{Action, ActionKind, Direction, InventoryType, ValidationError};
use crate::queue::ActionQueue;
use crate::session::{AgentSession, FlushReply, SessionError};

pub const COMMENT_MARKER: &str = "--";

/// Action-type tokens and the kind each one produces. Legacy names written
/// by step exporters sit next to the canonical ones.
pub const PLANS: &[(&str, ActionKind)] = &[
    ("research", ActionKind::Research),
    ("tech", ActionKind::Research),
    ("cancel_research", ActionKind::CancelResearch),
    ("walk", ActionKind::Walk),
    ("take", ActionKind::Take),
    ("put", ActionKind::Put),
    ("craft", ActionKind::Craft),
    ("cancel_craft", ActionKind::CancelCraft),
    ("build", ActionKind::Build),
    ("rotate", ActionKind::Rotate),
    ("mine", ActionKind::Mine),
    ("recipe", ActionKind::Recipe),
    ("wait", ActionKind::Wait),
    ("idle", ActionKind::Wait),
    ("drop", ActionKind::Drop),
    ("launch_rocket", ActionKind::LaunchRocket),
    ("pick_up", ActionKind::PickUp),
];

pub fn plan_for(token: &str) -> Option<ActionKind> {
    PLANS
        .iter()
        .find(|(name, _)| *name == token)
        .map(|(_, kind)| *kind)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line_number}: cannot read {field}: {source} in `{line}`")]
pub struct MalformedStepError {
    pub line_number: usize,
    pub line: String,
    pub field: &'static str,
    pub source: ScanError,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    #[error(transparent)]
    Malformed(#[from] MalformedStepError),
    #[error("line {line_number}: {error}")]
    Invalid {
        line_number: usize,
        error: ValidationError,
    },
}

impl LineError {
    pub fn line_number(&self) -> usize {
        match self {
            LineError::Malformed(e) => e.line_number,
            LineError::Invalid { line_number, .. } => *line_number,
        }
    }
}

/// A step whose action type has no plan. Skipped, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStep {
    pub line_number: usize,
    pub token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseReport {
    pub appended: usize,
    pub unknown: Vec<UnknownStep>,
    pub errors: Vec<LineError>,
}

impl ParseReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Result of parsing a script and flushing the session once.
#[derive(Debug)]
pub struct ParseOutcome {
    pub report: ParseReport,
    pub flush: Result<FlushReply, SessionError>,
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Field-level failure before the line number is attached.
enum Fault {
    Scan(&'static str, ScanError),
    Invalid(ValidationError),
}

impl From<ValidationError> for Fault {
    fn from(e: ValidationError) -> Self {
        Fault::Invalid(e)
    }
}

trait Field<T> {
    fn field(self, name: &'static str) -> Result<T, Fault>;
}

impl<T> Field<T> for Result<T, ScanError> {
    fn field(self, name: &'static str) -> Result<T, Fault> {
        self.map_err(|e| Fault::Scan(name, e))
    }
}

/// Field extraction for one action kind. `rest` is the text after the
/// action-type token.
fn extract(kind: ActionKind, rest: &str) -> Result<Action, Fault> {
    let action = match kind {
        ActionKind::Research => {
            // The trailer is only looked for after the name, never inside it.
            if !scanner::next_is_quoted(rest) && scanner::cancel_flag(rest) {
                Action::cancel_research()
            } else {
                let (name, trailer) = scanner::quoted(rest).field("technology_name")?;
                if scanner::cancel_flag(trailer) {
                    Action::cancel_research()
                } else {
                    Action::research(name)?
                }
            }
        }
        ActionKind::CancelResearch => Action::cancel_research(),
        ActionKind::Walk => {
            let (destination, _) = scanner::position(rest).field("destination")?;
            Action::walk(destination)
        }
        ActionKind::Take | ActionKind::Put => {
            let (position, rest) = scanner::position(rest).field("position")?;
            let (item, rest) = scanner::quoted(rest).field("item_name")?;
            let (quantity, rest) = scanner::between_commas(rest).field("quantity")?;
            let quantity = scanner::parse_int(quantity).field("quantity")?;
            let (inventory, _) =
                scanner::symbol(rest, SymbolCategory::Inventory).field("inventory_type")?;
            let inventory = InventoryType::resolve(inventory);
            if kind == ActionKind::Take {
                Action::take(position, item, quantity, inventory)?
            } else {
                Action::put(position, item, quantity, inventory)?
            }
        }
        ActionKind::Craft | ActionKind::CancelCraft => {
            // Exported steps put the count first; encoded batches lead
            // with the item name.
            let (item, quantity, rest) = if scanner::next_is_quoted(rest) {
                let (item, rest) = scanner::quoted(rest).field("item_name")?;
                let (quantity, rest) = scanner::between_commas(rest)
                    .or_else(|_| scanner::tail(rest))
                    .field("quantity")?;
                (item, quantity, rest)
            } else {
                let (quantity, rest) = scanner::between_commas(rest).field("quantity")?;
                let (item, rest) = scanner::quoted(rest).field("item_name")?;
                (item, quantity, rest)
            };
            let quantity = scanner::parse_int(quantity).field("quantity")?;
            if kind == ActionKind::CancelCraft || scanner::cancel_flag(rest) {
                Action::cancel_craft(item, quantity)?
            } else {
                Action::craft(item, quantity)?
            }
        }
        ActionKind::Build => {
            let (position, rest) = scanner::position(rest).field("position")?;
            let (item, rest) = scanner::quoted(rest).field("item_name")?;
            let (direction, _) =
                scanner::symbol(rest, SymbolCategory::Direction).field("direction")?;
            Action::build(position, item, Direction::resolve(direction))?
        }
        ActionKind::Rotate => {
            let (position, rest) = scanner::position(rest).field("position")?;
            // A missing or unrecognised flag means a forward rotation.
            let reverse = scanner::tail(rest).is_ok_and(|(flag, _)| flag == "true");
            Action::rotate(position, reverse)
        }
        ActionKind::Mine => {
            let (position, rest) = scanner::position(rest).field("position")?;
            let (ticks, _) = scanner::tail(rest).field("ticks")?;
            Action::mine(position, scanner::parse_int(ticks).field("ticks")?)?
        }
        ActionKind::Recipe => {
            let (position, rest) = scanner::position(rest).field("position")?;
            let (recipe, _) = scanner::quoted(rest).field("recipe_name")?;
            Action::recipe(position, recipe)?
        }
        ActionKind::Wait | ActionKind::PickUp => {
            let (ticks, _) = scanner::tail(rest).field("ticks")?;
            let ticks = scanner::parse_int(ticks).field("ticks")?;
            if kind == ActionKind::Wait {
                Action::wait(ticks)?
            } else {
                Action::pick_up(ticks)?
            }
        }
        ActionKind::Drop => {
            let (position, rest) = scanner::position(rest).field("position")?;
            let (item, _) = scanner::quoted(rest).field("item_name")?;
            Action::drop(position, item)?
        }
        ActionKind::LaunchRocket => {
            let (position, _) = scanner::position(rest).field("position")?;
            Action::launch_rocket(position)
        }
    };
    Ok(action)
}

enum Step {
    Action(Action),
    Unknown(String),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StepParser;

impl StepParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse one trimmed, non-comment line.
    fn parse_line(&self, line: &str) -> Result<Step, Fault> {
        let (_index, rest) = scanner::step_index(line).field("step_index")?;
        let (token, rest) = scanner::quoted(rest).field("action_type")?;
        match plan_for(token) {
            Some(kind) => Ok(Step::Action(extract(kind, rest)?)),
            None => Ok(Step::Unknown(token.to_string())),
        }
    }

    /// Parse every line of `script` into `queue` without flushing.
    ///
    /// A bad line is recorded in the report and parsing moves on to the next
    /// one. Unknown action types are skipped silently.
    pub fn parse_into(&self, script: &str, queue: &mut ActionQueue) -> ParseReport {
        let mut report = ParseReport::default();

        for (index, raw) in script.lines().enumerate() {
            let line_number = index + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with(COMMENT_MARKER) {
                continue;
            }

            let fault = match self.parse_line(line) {
                Ok(Step::Action(action)) => match queue.push(action) {
                    Ok(()) => {
                        report.appended += 1;
                        continue;
                    }
                    Err(e) => Fault::Invalid(e),
                },
                Ok(Step::Unknown(token)) => {
                    tracing::debug!(line_number, %token, "skipping unknown step type");
                    report.unknown.push(UnknownStep { line_number, token });
                    continue;
                }
                Err(fault) => fault,
            };

            report.errors.push(match fault {
                Fault::Scan(field, source) => LineError::Malformed(MalformedStepError {
                    line_number,
                    line: line.to_string(),
                    field,
                    source,
                }),
                Fault::Invalid(error) => LineError::Invalid { line_number, error },
            });
        }

        report
    }

    /// Parse `script` into the session's queue, then flush once.
    pub fn parse(&self, script: &str, session: &mut AgentSession) -> ParseOutcome {
        let report = self.parse_into(script, session.queue_mut());
        tracing::info!(
            appended = report.appended,
            unknown = report.unknown.len(),
            errors = report.errors.len(),
            "parsed step script"
        );
        let flush = session.flush();
        ParseOutcome { report, flush }
    }

    pub fn parse_file(
        &self,
        path: &Path,
        session: &mut AgentSession,
    ) -> Result<ParseOutcome, ScriptError> {
        let script = read_script(path)?;
        Ok(self.parse(&script, session))
    }
}

pub fn read_script(path: &Path) -> Result<String, ScriptError> {
    std::fs::read_to_string(path).map_err(|source| ScriptError::Read {
        path: path.to_path_buf(),
        source,
    })
}
