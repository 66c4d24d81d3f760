//! Per-agent ordered buffer of pending actions.
//!
//! Insertion order is execution order. The buffer knows nothing about wire
//! formats; [`crate::session::AgentSession`] drains it on flush.

use crate::actions::{Action, Direction, InventoryType, Position, ValidationError};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionQueue {
    actions: Vec<Action>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append. Invalid actions are never queued.
    pub fn push(&mut self, action: Action) -> Result<(), ValidationError> {
        action.validate()?;
        self.actions.push(action);
        Ok(())
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.actions.clear();
    }

    pub fn research(&mut self, technology_name: &str) -> Result<(), ValidationError> {
        self.push(Action::research(technology_name)?)
    }

    pub fn cancel_research(&mut self) -> Result<(), ValidationError> {
        self.push(Action::cancel_research())
    }

    pub fn walk(&mut self, destination: Position) -> Result<(), ValidationError> {
        self.push(Action::walk(destination))
    }

    pub fn take(
        &mut self,
        position: Position,
        item_name: &str,
        quantity: i32,
        inventory_type: InventoryType,
    ) -> Result<(), ValidationError> {
        self.push(Action::take(position, item_name, quantity, inventory_type)?)
    }

    pub fn put(
        &mut self,
        position: Position,
        item_name: &str,
        quantity: i32,
        inventory_type: InventoryType,
    ) -> Result<(), ValidationError> {
        self.push(Action::put(position, item_name, quantity, inventory_type)?)
    }

    pub fn craft(&mut self, item_name: &str, quantity: i32) -> Result<(), ValidationError> {
        self.push(Action::craft(item_name, quantity)?)
    }

    pub fn cancel_craft(&mut self, item_name: &str, quantity: i32) -> Result<(), ValidationError> {
        self.push(Action::cancel_craft(item_name, quantity)?)
    }

    pub fn build(
        &mut self,
        position: Position,
        item_name: &str,
        direction: Direction,
    ) -> Result<(), ValidationError> {
        self.push(Action::build(position, item_name, direction)?)
    }

    pub fn rotate(&mut self, position: Position, reverse: bool) -> Result<(), ValidationError> {
        self.push(Action::rotate(position, reverse))
    }

    pub fn mine(&mut self, position: Position, ticks: i32) -> Result<(), ValidationError> {
        self.push(Action::mine(position, ticks)?)
    }

    pub fn recipe(&mut self, position: Position, recipe_name: &str) -> Result<(), ValidationError> {
        self.push(Action::recipe(position, recipe_name)?)
    }

    pub fn wait(&mut self, ticks: i32) -> Result<(), ValidationError> {
        self.push(Action::wait(ticks)?)
    }

    pub fn drop(&mut self, position: Position, item_name: &str) -> Result<(), ValidationError> {
        self.push(Action::drop(position, item_name)?)
    }

    pub fn launch_rocket(&mut self, position: Position) -> Result<(), ValidationError> {
        self.push(Action::launch_rocket(position))
    }

    pub fn pick_up(&mut self, ticks: i32) -> Result<(), ValidationError> {
        self.push(Action::pick_up(ticks)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionKind;

    #[test]
    fn test_appends_preserve_order() {
        let mut queue = ActionQueue::new();
        let p = Position::new(1.0, 2.0);
        queue.research("automation").unwrap();
        queue.walk(p).unwrap();
        queue.mine(p, 60).unwrap();
        queue.craft("iron-gear-wheel", 10).unwrap();
        queue.wait(5).unwrap();

        let kinds: Vec<ActionKind> = queue.actions().iter().map(Action::kind).collect();
        assert_eq!(
            kinds,
            vec![
                ActionKind::Research,
                ActionKind::Walk,
                ActionKind::Mine,
                ActionKind::Craft,
                ActionKind::Wait,
            ]
        );
    }

    #[test]
    fn test_rejected_append_leaves_queue_untouched() {
        let mut queue = ActionQueue::new();
        queue.wait(10).unwrap();

        let p = Position::new(0.0, 0.0);
        assert!(queue.take(p, "coal", 0, InventoryType::Chest).is_err());
        assert!(queue.put(p, "coal", -2, InventoryType::Chest).is_err());
        assert!(queue.pick_up(0).is_err());
        assert!(queue.build(p, "", Direction::North).is_err());

        assert_eq!(queue.len(), 1);
        assert_eq!(queue.actions()[0], Action::Wait { ticks: 10 });
    }

    #[test]
    fn test_push_validates_hand_built_actions() {
        let mut queue = ActionQueue::new();
        let err = queue
            .push(Action::Wait { ticks: -1 })
            .unwrap_err();
        assert_eq!(err, ValidationError::InvalidTicks { field: "ticks", ticks: -1 });
        assert!(queue.is_empty());
    }
}
