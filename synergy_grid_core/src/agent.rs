use serde::{Deserialize, Serialize};

use crate::{
    AgentAction, GridError, Position,
    config::ScoringPolicy,
    resource::{Resource, TierChain},
};

/// The agent's body: where it stands and how many points it holds.
///
/// Decision making lives in [`crate::policy`]; this type only applies moves
/// and keeps score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    position: Position,
    score: i64,
    grid_rows: usize,
    grid_cols: usize,
}

impl Agent {
    /// Creates an agent standing at the centre of a `grid_rows` x `grid_cols` grid.
    ///
    /// Fails with [`GridError::InvalidDimension`] if either dimension is zero.
    pub fn new(grid_rows: usize, grid_cols: usize, starting_score: i64) -> Result<Self, GridError> {
        if grid_rows == 0 || grid_cols == 0 {
            return Err(GridError::InvalidDimension {
                rows: grid_rows,
                cols: grid_cols,
            });
        }
        let mut agent = Agent {
            position: Position::new(0, 0),
            score: starting_score,
            grid_rows,
            grid_cols,
        };
        agent.reset(starting_score);
        Ok(agent)
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    /// Moves the agent back to the centre cell and restores its score.
    pub fn reset(&mut self, starting_score: i64) {
        self.position = Position::new(self.grid_rows / 2, self.grid_cols / 2);
        self.score = starting_score;
    }

    /// Moves one cell in the requested direction. Moving into a wall is a no-op.
    pub fn perform_action(&mut self, action: AgentAction) {
        let Position { row, col } = self.position;
        self.position = match action {
            AgentAction::Left => Position::new(row, col.saturating_sub(1)),
            AgentAction::Right => Position::new(row, (col + 1).min(self.grid_cols - 1)),
            AgentAction::Up => Position::new(row.saturating_sub(1), col),
            AgentAction::Down => Position::new((row + 1).min(self.grid_rows - 1), col),
        };
    }

    /// Consumes `resource`, adds its reward to the score and returns the reward.
    pub fn consume_resource(
        &mut self,
        resource: &mut Resource,
        chain: &mut TierChain,
        scoring: ScoringPolicy,
    ) -> i64 {
        let reward = resource.consume(chain, scoring);
        self.score += reward;
        reward
    }

    #[cfg(test)]
    pub(crate) fn place(&mut self, position: Position) {
        self.position = position;
    }
}
