//! Console-command rendering for the RCON channel.
//!
//! Each action becomes a positional Lua table, fields in model order:
//!
//! ```text
//! {"take", {0.5,-7.5}, "coal", 50, defines.inventory.chest}
//! {"craft", "iron-gear-wheel", 5, cancel = false}
//! ```
//!
//! The batch is wrapped in a single `remote.call` addressed to the mod's
//! interface and the owning agent.

use super::{check_coordinates, DataType, EmptyQueuePolicy, RenderError, Renderer, WireFormat};
use crate::actions::Action;

pub const DEFAULT_COMMAND_PREFIX: &str = "/sc";
pub const DEFAULT_HANDLER: &str = "FLE";
pub const DEFAULT_CONTROL_HANDLER: &str = "AICommands";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleRenderer {
    /// Console command that runs Lua silently, normally `/sc`.
    pub command_prefix: String,
    /// Remote interface registered by the scenario mod.
    pub handler: String,
    /// Interface that owns scenario control (`reset`, `execute_steps`).
    pub control_handler: String,
}

impl Default for ConsoleRenderer {
    fn default() -> Self {
        Self {
            command_prefix: DEFAULT_COMMAND_PREFIX.to_string(),
            handler: DEFAULT_HANDLER.to_string(),
            control_handler: DEFAULT_CONTROL_HANDLER.to_string(),
        }
    }
}

fn lua_bool(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}

/// One action as a Lua table literal.
pub fn render_action(action: &Action) -> String {
    match action {
        Action::Research { technology_name } => {
            format!(r#"{{"research", "{}", cancel = false}}"#, technology_name)
        }
        Action::CancelResearch => r#"{"research", cancel = true}"#.to_string(),
        Action::Walk { destination } => format!(r#"{{"walk", {}}}"#, destination),
        Action::Take {
            position,
            item_name,
            quantity,
            inventory_type,
        } => format!(
            r#"{{"take", {}, "{}", {}, {}}}"#,
            position, item_name, quantity, inventory_type
        ),
        Action::Put {
            position,
            item_name,
            quantity,
            inventory_type,
        } => format!(
            r#"{{"put", {}, "{}", {}, {}}}"#,
            position, item_name, quantity, inventory_type
        ),
        Action::Craft {
            item_name,
            quantity,
        } => format!(r#"{{"craft", "{}", {}, cancel = false}}"#, item_name, quantity),
        Action::CancelCraft {
            item_name,
            quantity,
        } => format!(r#"{{"craft", "{}", {}, cancel = true}}"#, item_name, quantity),
        Action::Build {
            position,
            item_name,
            direction,
        } => format!(r#"{{"build", {}, "{}", {}}}"#, position, item_name, direction),
        Action::Rotate { position, reverse } => {
            format!(r#"{{"rotate", {}, {}}}"#, position, lua_bool(*reverse))
        }
        Action::Mine { position, ticks } => format!(r#"{{"mine", {}, {}}}"#, position, ticks),
        Action::Recipe {
            position,
            recipe_name,
        } => format!(r#"{{"recipe", {}, "{}"}}"#, position, recipe_name),
        Action::Wait { ticks } => format!(r#"{{"wait", {}}}"#, ticks),
        Action::Drop {
            position,
            item_name,
        } => format!(r#"{{"drop", {}, "{}"}}"#, position, item_name),
        Action::LaunchRocket { position } => format!(r#"{{"launch_rocket", {}}}"#, position),
        Action::PickUp { ticks } => format!(r#"{{"pick_up", {}}}"#, ticks),
    }
}

/// The whole batch as one table constructor. Empty batches render as `{}`.
pub fn render_table(actions: &[Action]) -> String {
    if actions.is_empty() {
        return "{}".to_string();
    }
    let items: Vec<String> = actions.iter().map(render_action).collect();
    format!("{{ {} }}", items.join(", "))
}

impl ConsoleRenderer {
    fn remote_call(&self, interface: &str, function: &str, args: &[&str]) -> String {
        let mut command = format!(
            r#"{} remote.call("{}", "{}""#,
            self.command_prefix, interface, function
        );
        for arg in args {
            command.push_str(", ");
            command.push_str(arg);
        }
        command.push(')');
        command
    }

    pub fn data_request(&self, agent_id: u32, data_type: DataType, radius: u32) -> String {
        self.remote_call(
            &self.handler,
            data_type.call_name(),
            &[&agent_id.to_string(), &radius.to_string()],
        )
    }

    pub fn reset(&self, agent_count: u32) -> String {
        self.remote_call(&self.control_handler, "reset", &[&agent_count.to_string()])
    }

    pub fn execute(&self) -> String {
        self.remote_call(&self.control_handler, "execute_steps", &[])
    }
}

impl Renderer for ConsoleRenderer {
    type Output = String;

    fn format(&self) -> WireFormat {
        WireFormat::Console
    }

    fn empty_queue(&self) -> EmptyQueuePolicy {
        EmptyQueuePolicy::Send
    }

    fn render(&self, agent_id: u32, actions: &[Action]) -> Result<String, RenderError> {
        check_coordinates(actions)?;
        Ok(self.remote_call(
            &self.handler,
            "add_actions",
            &[&agent_id.to_string(), &render_table(actions)],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::{Direction, InventoryType, Position};

    fn at(x: f64, y: f64) -> Position {
        Position::new(x, y)
    }

    #[test]
    fn test_render_each_kind() {
        let cases = [
            (
                Action::research("steel-axe").unwrap(),
                r#"{"research", "steel-axe", cancel = false}"#,
            ),
            (Action::cancel_research(), r#"{"research", cancel = true}"#),
            (Action::walk(at(10.5, -2.25)), r#"{"walk", {10.5,-2.25}}"#),
            (
                Action::take(at(0.5, -7.5), "coal", 500, InventoryType::Chest).unwrap(),
                r#"{"take", {0.5,-7.5}, "coal", 500, defines.inventory.chest}"#,
            ),
            (
                Action::put(at(1.0, 1.0), "coal", -1, InventoryType::Fuel).unwrap(),
                r#"{"put", {1,1}, "coal", -1, defines.inventory.fuel}"#,
            ),
            (
                Action::craft("iron-gear-wheel", 5).unwrap(),
                r#"{"craft", "iron-gear-wheel", 5, cancel = false}"#,
            ),
            (
                Action::cancel_craft("iron-gear-wheel", 2).unwrap(),
                r#"{"craft", "iron-gear-wheel", 2, cancel = true}"#,
            ),
            (
                Action::build(at(3.5, 4.5), "inserter", Direction::West).unwrap(),
                r#"{"build", {3.5,4.5}, "inserter", defines.direction.west}"#,
            ),
            (Action::rotate(at(3.5, 4.5), true), r#"{"rotate", {3.5,4.5}, true}"#),
            (
                Action::mine(at(30.5, -20.5), 121).unwrap(),
                r#"{"mine", {30.5,-20.5}, 121}"#,
            ),
            (
                Action::recipe(at(2.0, 2.0), "iron-gear-wheel").unwrap(),
                r#"{"recipe", {2,2}, "iron-gear-wheel"}"#,
            ),
            (Action::wait(60).unwrap(), r#"{"wait", 60}"#),
            (Action::drop(at(0.0, 1.0), "wood").unwrap(), r#"{"drop", {0,1}, "wood"}"#),
            (Action::launch_rocket(at(8.0, 8.0)), r#"{"launch_rocket", {8,8}}"#),
            (Action::pick_up(30).unwrap(), r#"{"pick_up", 30}"#),
        ];
        for (action, expected) in cases {
            assert_eq!(render_action(&action), expected);
        }
    }

    #[test]
    fn test_render_batch_command() {
        let actions = vec![
            Action::walk(at(1.0, 2.0)),
            Action::wait(10).unwrap(),
        ];
        let command = ConsoleRenderer::default().render(7, &actions).unwrap();
        assert_eq!(
            command,
            r#"/sc remote.call("FLE", "add_actions", 7, { {"walk", {1,2}}, {"wait", 10} })"#
        );
    }

    #[test]
    fn test_render_empty_batch() {
        let command = ConsoleRenderer::default().render(1, &[]).unwrap();
        assert_eq!(command, r#"/sc remote.call("FLE", "add_actions", 1, {})"#);
    }

    #[test]
    fn test_non_finite_coordinates_abort_render() {
        let actions = vec![
            Action::wait(10).unwrap(),
            Action::walk(at(f64::NAN, 0.0)),
        ];
        let err = ConsoleRenderer::default().render(1, &actions).unwrap_err();
        assert!(matches!(
            err,
            RenderError::NonFiniteCoordinate { index: 1, .. }
        ));
    }

    #[test]
    fn test_control_commands() {
        let renderer = ConsoleRenderer {
            command_prefix: "/c".to_string(),
            handler: "Bridge".to_string(),
            control_handler: "Control".to_string(),
        };
        assert_eq!(
            renderer.data_request(2, DataType::State, 150),
            r#"/c remote.call("Bridge", "state_data", 2, 150)"#
        );
        assert_eq!(renderer.reset(3), r#"/c remote.call("Control", "reset", 3)"#);
        assert_eq!(renderer.execute(), r#"/c remote.call("Control", "execute_steps")"#);
    }

    #[test]
    fn test_default_control_calls_use_scenario_interface() {
        let renderer = ConsoleRenderer::default();
        assert_eq!(renderer.reset(1), r#"/sc remote.call("AICommands", "reset", 1)"#);
        assert_eq!(
            renderer.execute(),
            r#"/sc remote.call("AICommands", "execute_steps")"#
        );
        assert_eq!(
            renderer.data_request(1, DataType::Meta, 150),
            r#"/sc remote.call("FLE", "meta_data", 1, 150)"#
        );
    }
}
