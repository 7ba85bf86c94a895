//! Typed configuration for the grid world and the environment wrapper.
//!
//! Every struct deserializes from YAML with per-field defaults, so a config
//! file only needs to name the values it changes:
//!
//! ```yaml
//! max_steps: 80
//! world:
//!   grid_rows: 7
//!   max_tier: 3
//!   rewards:
//!     scoring: combo
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::GridError;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("failed to parse config YAML: {source}")]
    Yaml { source: serde_yml::Error },

    #[error(transparent)]
    Invalid(#[from] GridError),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// How a tier resource pays out when consumed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringPolicy {
    /// Every correct link of the chain pays the tier's reward.
    #[default]
    StepWise,
    /// Correct links pay nothing; the resource that breaks a chain pays its own reward.
    Combo,
}

/// How a tier resource's reward grows with its tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardGrowth {
    /// `base * (tier + 1)`
    #[default]
    Linear,
    /// `floor(base * 1.5^(tier + 1))`
    Exponential,
}

/// Reward and cooldown constants per resource variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    pub positive_reward: i64,
    pub negative_reward: i64,
    /// Base that tier rewards are scaled from.
    pub tier_base_reward: i64,
    pub positive_cool_down: u32,
    pub negative_cool_down: u32,
    pub tier_cool_down: u32,
    pub growth: RewardGrowth,
    pub scoring: ScoringPolicy,
}

impl Default for RewardConfig {
    fn default() -> Self {
        RewardConfig {
            positive_reward: 5,
            negative_reward: -3,
            tier_base_reward: 5,
            positive_cool_down: 5,
            negative_cool_down: 7,
            tier_cool_down: 10,
            growth: RewardGrowth::Linear,
            scoring: ScoringPolicy::StepWise,
        }
    }
}

/// Shape of the grid and its resource population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub grid_rows: usize,
    pub grid_cols: usize,
    /// Cap on resources simultaneously on the grid.
    pub max_active_resources: usize,
    /// Highest tier resource in the roster; 0 disables tier resources.
    pub max_tier: u32,
    /// Number of resources built into the roster at construction.
    pub resource_pool_size: usize,
    pub rewards: RewardConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig {
            grid_rows: 5,
            grid_cols: 5,
            max_active_resources: 3,
            max_tier: 0,
            resource_pool_size: 8,
            rewards: RewardConfig::default(),
        }
    }
}

impl WorldConfig {
    /// Checks the values that make a world impossible to build.
    pub fn validate(&self) -> Result<(), GridError> {
        if self.grid_rows == 0 || self.grid_cols == 0 {
            return Err(GridError::InvalidDimension {
                rows: self.grid_rows,
                cols: self.grid_cols,
            });
        }
        // One cell always belongs to the agent.
        let limit = self.grid_rows * self.grid_cols - 1;
        if self.max_active_resources == 0 || self.max_active_resources > limit {
            return Err(GridError::TooManyActiveResources {
                requested: self.max_active_resources,
                limit,
                rows: self.grid_rows,
                cols: self.grid_cols,
            });
        }
        if self.resource_pool_size == 0 {
            return Err(GridError::InvalidConfig(
                "resource_pool_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration of the episodic environment wrapped around a [`crate::world::GridWorld`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Step budget after which an episode is truncated.
    pub max_steps: u32,
    pub starting_score: i64,
    pub world: WorldConfig,
}

impl Default for EnvConfig {
    fn default() -> Self {
        EnvConfig {
            max_steps: 50,
            starting_score: 10,
            world: WorldConfig::default(),
        }
    }
}

impl EnvConfig {
    /// Loads and validates a YAML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses and validates a YAML document.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: EnvConfig = serde_yml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), GridError> {
        if self.max_steps == 0 {
            return Err(GridError::InvalidConfig(
                "max_steps must be at least 1".to_string(),
            ));
        }
        self.world.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_constants() {
        let config = EnvConfig::default();
        assert_eq!(config.max_steps, 50);
        assert_eq!(config.starting_score, 10);
        assert_eq!(config.world.grid_rows, 5);
        assert_eq!(config.world.rewards.positive_reward, 5);
        assert_eq!(config.world.rewards.negative_reward, -3);
        assert_eq!(config.world.rewards.scoring, ScoringPolicy::StepWise);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let yaml = "
max_steps: 80
world:
  grid_rows: 7
  max_tier: 3
  rewards:
    scoring: combo
    growth: exponential
";
        let config = EnvConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.max_steps, 80);
        assert_eq!(config.starting_score, 10);
        assert_eq!(config.world.grid_rows, 7);
        assert_eq!(config.world.grid_cols, 5);
        assert_eq!(config.world.max_tier, 3);
        assert_eq!(config.world.rewards.scoring, ScoringPolicy::Combo);
        assert_eq!(config.world.rewards.growth, RewardGrowth::Exponential);
        assert_eq!(config.world.rewards.tier_cool_down, 10);
    }

    #[test]
    fn invalid_yaml_values_are_rejected() {
        let err = EnvConfig::from_yaml_str("world:\n  grid_rows: 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid(GridError::InvalidDimension { rows: 0, cols: 5 })
        ));

        let err = EnvConfig::from_yaml_str("max_steps: [1, 2]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn active_cap_must_leave_room_for_the_agent() {
        let config = WorldConfig {
            grid_rows: 2,
            grid_cols: 2,
            max_active_resources: 4,
            ..WorldConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(GridError::TooManyActiveResources {
                requested: 4,
                limit: 3,
                rows: 2,
                cols: 2,
            })
        );
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = EnvConfig::from_file(Path::new("does/not/exist.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
