use std::fmt;

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    AgentAction, GridError, Position,
    agent::Agent,
    config::{ScoringPolicy, WorldConfig},
    map::{Grid, Occupancy},
    resource::{Resource, ResourceMeta, ResourceVariant, TierChain},
};

/// Read-only copy of one roster slot, for observers outside the world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSnapshot {
    pub slot: usize,
    pub variant: ResourceVariant,
    pub meta: ResourceMeta,
    /// `None` while the resource is off the grid.
    pub position: Option<Position>,
    pub timer_remaining: u32,
}

/// How many positive, negative and tier resources a roster of `pool_size` holds.
///
/// Without tiers the split is 75% positive / 25% negative. With tiers it is
/// 50% positive, 30% tier (at least one slot per tier), negative for the rest.
/// There is always at least one positive resource to root the chain.
pub fn roster_counts(pool_size: usize, max_tier: u32) -> (usize, usize, usize) {
    let pool_size = pool_size.max(1);
    if max_tier == 0 {
        let positive = (pool_size * 3).div_ceil(4);
        return (positive, pool_size - positive, 0);
    }
    let tier = (pool_size * 3 / 10).max(max_tier as usize);
    let positive = (pool_size / 2).max(1);
    let negative = pool_size.saturating_sub(positive + tier);
    (positive, negative, tier)
}

/// Orchestrates the agent and the resource population on a discrete grid.
///
/// The roster is built once at construction; resources are only toggled on
/// and off the grid afterwards, never reallocated.
#[derive(Debug, Clone)]
pub struct GridWorld {
    grid_rows: usize,
    grid_cols: usize,
    agent: Agent,
    resources: Vec<Resource>,
    chain: TierChain,
    max_active_resources: usize,
    max_tier: u32,
    scoring: ScoringPolicy,
    life_span: u32,
    rng: StdRng,
}

impl GridWorld {
    /// Builds the world and its roster. Call [`GridWorld::reset`] before stepping.
    pub fn new(config: &WorldConfig) -> Result<Self, GridError> {
        config.validate()?;
        let agent = Agent::new(config.grid_rows, config.grid_cols, 0)?;
        let life_span = u32::try_from((config.grid_rows - 1) + (config.grid_cols - 1))
            .map_err(|_| {
                GridError::InvalidConfig("grid too large for resource timers".to_string())
            })?;

        let (positive, negative, tier) = roster_counts(config.resource_pool_size, config.max_tier);
        let mut resources = Vec::with_capacity(positive + negative + tier);
        resources.extend(
            std::iter::repeat_n(ResourceVariant::Positive, positive)
                .chain(std::iter::repeat_n(ResourceVariant::Negative, negative))
                .chain((0..tier).map(|i| ResourceVariant::Tier(i as u32 % config.max_tier + 1)))
                .map(|variant| Resource::new(variant, life_span, &config.rewards)),
        );

        debug!(
            rows = config.grid_rows,
            cols = config.grid_cols,
            positive,
            negative,
            tier,
            "Grid world built"
        );

        Ok(GridWorld {
            grid_rows: config.grid_rows,
            grid_cols: config.grid_cols,
            agent,
            resources,
            chain: TierChain::new(),
            max_active_resources: config.max_active_resources,
            max_tier: config.max_tier,
            scoring: config.rewards.scoring,
            life_span,
            rng: StdRng::seed_from_u64(0),
        })
    }

    /// Starts a new episode: agent back at the centre, every resource off the
    /// grid, chain cleared, and one resource spawned on a free cell.
    ///
    /// All randomness for the episode is drawn from `rng`.
    pub fn reset(&mut self, starting_score: i64, rng: StdRng) -> Result<(), GridError> {
        self.agent.reset(starting_score);
        for resource in &mut self.resources {
            resource.reset();
        }
        self.chain.clear();
        self.rng = rng;

        let slot = self.rng.random_range(0..self.resources.len());
        self.spawn_resource(slot)
    }

    /// Applies `action` and advances every resource by one tick.
    ///
    /// Returns the reward earned this step (0 if nothing was consumed).
    /// Resources are processed in roster order; at most one is consumed per step.
    pub fn perform_agent_action(&mut self, action: AgentAction) -> Result<i64, GridError> {
        self.agent.perform_action(action);
        let agent_position = self.agent.position();

        let mut reward = 0;
        let mut consumed = false;
        let mut ready = Vec::new();

        for (slot, resource) in self.resources.iter_mut().enumerate() {
            if resource.is_active() {
                if resource.tick() {
                    debug!(slot, position = ?resource.position(), "Resource expired");
                    resource.deplete();
                } else if !consumed && resource.position() == agent_position {
                    let earned =
                        self.agent
                            .consume_resource(resource, &mut self.chain, self.scoring);
                    debug!(
                        slot,
                        variant = ?resource.variant(),
                        earned,
                        chain = ?self.chain.as_slice(),
                        "Resource consumed"
                    );
                    reward += earned;
                    consumed = true;
                }
            } else if resource.tick() {
                ready.push(slot);
            }
        }

        let mut active = self.active_count();
        while active < self.max_active_resources && !ready.is_empty() {
            let pick = self.rng.random_range(0..ready.len());
            let slot = ready.swap_remove(pick);
            self.spawn_resource(slot)?;
            active += 1;
        }

        Ok(reward)
    }

    /// Spawns the resource in `slot` on a free cell drawn uniformly at random.
    fn spawn_resource(&mut self, slot: usize) -> Result<(), GridError> {
        let free = self.occupancy().free_cells(self.agent.position());
        if free.is_empty() {
            return Err(GridError::SpawnStarvation {
                active: self.active_count(),
            });
        }
        let position = free[self.rng.random_range(0..free.len())];
        self.resources[slot].spawn(position);
        debug!(slot, variant = ?self.resources[slot].variant(), ?position, "Resource spawned");
        Ok(())
    }

    /// Grid of roster slots currently occupying each cell.
    pub fn occupancy(&self) -> Occupancy {
        let mut grid = Grid::new(self.grid_rows, self.grid_cols);
        for (slot, resource) in self.resources.iter().enumerate() {
            if resource.is_active() {
                grid[resource.position()] = Some(slot);
            }
        }
        grid
    }

    pub fn grid_rows(&self) -> usize {
        self.grid_rows
    }

    pub fn grid_cols(&self) -> usize {
        self.grid_cols
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// The full roster, in construction order.
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn active_resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter().filter(|r| r.is_active())
    }

    pub fn active_count(&self) -> usize {
        self.active_resources().count()
    }

    pub fn chain(&self) -> &TierChain {
        &self.chain
    }

    pub fn max_tier(&self) -> u32 {
        self.max_tier
    }

    pub fn max_active_resources(&self) -> usize {
        self.max_active_resources
    }

    /// Ticks a freshly spawned resource stays collectible.
    pub fn life_span(&self) -> u32 {
        self.life_span
    }

    pub fn resource_snapshot(&self) -> Vec<ResourceSnapshot> {
        self.resources
            .iter()
            .enumerate()
            .map(|(slot, resource)| ResourceSnapshot {
                slot,
                variant: resource.variant(),
                meta: resource.meta(),
                position: resource.is_active().then(|| resource.position()),
                timer_remaining: resource.timer_remaining(),
            })
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn resources_mut(&mut self) -> &mut [Resource] {
        &mut self.resources
    }
}

/// Console dump of the grid: `A` for the agent, `+`/`-` for direct resources,
/// the tier digit for tier resources and `.` for empty floor.
impl fmt::Display for GridWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let occupancy = self.occupancy();
        for row in 0..self.grid_rows {
            for col in 0..self.grid_cols {
                let position = Position::new(row, col);
                let symbol = if position == self.agent.position() {
                    'A'
                } else if let Some(slot) = occupancy[position] {
                    self.resources[slot].variant().symbol()
                } else {
                    '.'
                };
                if col > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{symbol}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
