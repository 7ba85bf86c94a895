use serde::{Deserialize, Serialize};

pub mod agent;
pub mod config;
pub mod environment;
pub mod error;
pub mod map;
pub mod observation;
pub mod policy;
pub mod resource;
pub mod timer;
pub mod world;

pub use error::GridError;

/// Represents a cell on the grid as `(row, col)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Position { row, col }
    }

    /// Returns manhattan distance between two positions
    pub fn manhattan_distance(&self, other: &Position) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

/// Actions the agent is capable of performing, i.e. go in a certain direction.
///
/// The discriminants match the integer encoding a learner emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentAction {
    Left = 0,
    Down = 1,
    Right = 2,
    Up = 3,
}

impl AgentAction {
    pub const ALL: [AgentAction; 4] = [
        AgentAction::Left,
        AgentAction::Down,
        AgentAction::Right,
        AgentAction::Up,
    ];
}

impl TryFrom<i64> for AgentAction {
    type Error = GridError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AgentAction::Left),
            1 => Ok(AgentAction::Down),
            2 => Ok(AgentAction::Right),
            3 => Ok(AgentAction::Up),
            other => Err(GridError::InvalidAction(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_every_defined_action() {
        for action in AgentAction::ALL {
            assert_eq!(AgentAction::try_from(action as i64), Ok(action));
        }
    }

    #[test]
    fn rejects_out_of_range_actions() {
        assert_eq!(AgentAction::try_from(4), Err(GridError::InvalidAction(4)));
        assert_eq!(AgentAction::try_from(-1), Err(GridError::InvalidAction(-1)));
    }

    #[test]
    fn manhattan_distance_is_symmetric() {
        let a = Position::new(0, 4);
        let b = Position::new(3, 1);
        assert_eq!(a.manhattan_distance(&b), 6);
        assert_eq!(b.manhattan_distance(&a), 6);
    }
}
