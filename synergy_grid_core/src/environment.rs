use rand::{SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    AgentAction, GridError, Position,
    config::EnvConfig,
    observation::ObservationEncoder,
    world::{GridWorld, ResourceSnapshot},
};

/// What a caller gets back from [`SynergyGridEnv::reset`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reset {
    /// Normalized observation.
    pub observation: Vec<f32>,
    pub raw_observation: Vec<f32>,
    pub agent_position: Position,
    pub resources: Vec<ResourceSnapshot>,
}

/// The outcome of one [`SynergyGridEnv::step`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Normalized observation after the step.
    pub observation: Vec<f32>,
    pub reward: i64,
    /// The agent's score dropped to zero or below.
    pub terminated: bool,
    /// The step budget is used up.
    pub truncated: bool,
}

impl Step {
    pub fn is_done(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// Episodic wrapper around a [`GridWorld`]: owns the step budget, the
/// starting score and the per-episode seed.
#[derive(Debug, Clone)]
pub struct SynergyGridEnv {
    config: EnvConfig,
    world: GridWorld,
    encoder: ObservationEncoder,
    step_count: u32,
}

impl SynergyGridEnv {
    /// Builds the world and validates the observation layout up front.
    pub fn new(config: EnvConfig) -> Result<Self, GridError> {
        config.validate()?;
        let world = GridWorld::new(&config.world)?;
        let encoder = ObservationEncoder::new(&world, config.max_steps)?;
        Ok(SynergyGridEnv {
            config,
            world,
            encoder,
            step_count: 0,
        })
    }

    /// Starts a new episode. The same `seed` always yields the same episode
    /// for the same sequence of actions; `None` draws a seed from the OS.
    pub fn reset(&mut self, seed: Option<u64>) -> Result<Reset, GridError> {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        self.step_count = 0;
        self.world.reset(self.config.starting_score, rng)?;

        let raw_observation = self.encoder.encode(&self.world, self.steps_remaining());
        let observation = self.encoder.normalize(&raw_observation)?;
        info!(?seed, score = self.config.starting_score, "Episode reset");

        Ok(Reset {
            observation,
            raw_observation,
            agent_position: self.world.agent().position(),
            resources: self.world.resource_snapshot(),
        })
    }

    /// Applies one action and reports reward and episode status.
    pub fn step(&mut self, action: AgentAction) -> Result<Step, GridError> {
        let reward = self.world.perform_agent_action(action)?;
        self.step_count += 1;

        let score = self.world.agent().score();
        let terminated = score <= 0;
        let truncated = self.step_count >= self.config.max_steps;
        debug!(step = self.step_count, ?action, reward, score, "Step");
        if terminated || truncated {
            info!(
                steps = self.step_count,
                score, terminated, truncated, "Episode finished"
            );
        }

        Ok(Step {
            observation: self
                .encoder
                .encode_normalized(&self.world, self.steps_remaining())?,
            reward,
            terminated,
            truncated,
        })
    }

    /// Decodes an integer action (`LEFT=0, DOWN=1, RIGHT=2, UP=3`) and steps.
    pub fn step_raw(&mut self, action: i64) -> Result<Step, GridError> {
        self.step(AgentAction::try_from(action)?)
    }

    pub fn steps_remaining(&self) -> u32 {
        self.config.max_steps.saturating_sub(self.step_count)
    }

    pub fn step_count(&self) -> u32 {
        self.step_count
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn world(&self) -> &GridWorld {
        &self.world
    }

    pub fn encoder(&self) -> &ObservationEncoder {
        &self.encoder
    }
}
