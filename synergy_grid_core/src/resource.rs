use serde::{Deserialize, Serialize};

use crate::{
    Position,
    config::{RewardConfig, RewardGrowth, ScoringPolicy},
    timer::Timer,
};

/// Broad family of a resource, used to group direct rewards apart from synergy chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceCategory {
    Direct = 0,
    Synergy = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DirectType {
    Negative = 0,
    Positive = 1,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SynergyType {
    Tier = 0,
}

/// Subtype of a resource within its category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Direct(DirectType),
    Synergy(SynergyType),
}

/// Static classification of a resource. Tier is 0 for non-tiered resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceMeta {
    pub category: ResourceCategory,
    pub kind: ResourceKind,
    pub tier: u32,
}

/// The concrete resource variants that can live in the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceVariant {
    /// Fixed positive reward; roots the tier chain.
    Positive,
    /// Fixed negative reward; always breaks the tier chain.
    Negative,
    /// Pays only when collected right after the tier below it.
    Tier(u32),
}

impl ResourceVariant {
    pub fn meta(&self) -> ResourceMeta {
        match *self {
            ResourceVariant::Positive => ResourceMeta {
                category: ResourceCategory::Direct,
                kind: ResourceKind::Direct(DirectType::Positive),
                tier: 0,
            },
            ResourceVariant::Negative => ResourceMeta {
                category: ResourceCategory::Direct,
                kind: ResourceKind::Direct(DirectType::Negative),
                tier: 0,
            },
            ResourceVariant::Tier(tier) => ResourceMeta {
                category: ResourceCategory::Synergy,
                kind: ResourceKind::Synergy(SynergyType::Tier),
                tier,
            },
        }
    }

    /// Single-character code used by the console dump of the grid.
    pub fn symbol(&self) -> char {
        match *self {
            ResourceVariant::Positive => '+',
            ResourceVariant::Negative => '-',
            ResourceVariant::Tier(tier) => char::from_digit(tier % 10, 10).unwrap_or('T'),
        }
    }
}

/// Tiers collected in order during the current episode.
///
/// Always empty or exactly `[0, 1, ..., k]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierChain {
    tiers: Vec<u32>,
}

impl TierChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn last(&self) -> Option<u32> {
        self.tiers.last().copied()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.tiers
    }

    pub fn clear(&mut self) {
        self.tiers.clear();
    }

    /// Starts a new chain at tier 0 unless one is already running.
    fn root(&mut self) {
        if self.tiers.is_empty() {
            self.tiers.push(0);
        }
    }

    /// Appends `tier` if the chain currently ends at `tier - 1`.
    fn try_extend(&mut self, tier: u32) -> bool {
        match (self.last(), tier.checked_sub(1)) {
            (Some(last), Some(previous)) if last == previous => {
                self.tiers.push(tier);
                true
            }
            _ => false,
        }
    }
}

/// Reward of a tier resource under the given growth policy.
pub fn tier_reward(base: i64, tier: u32, growth: RewardGrowth) -> i64 {
    let multiplier = i64::from(tier) + 1;
    match growth {
        RewardGrowth::Linear => base * multiplier,
        RewardGrowth::Exponential => {
            let exponent = i32::try_from(multiplier).unwrap_or(i32::MAX);
            (base as f64 * 1.5_f64.powi(exponent)).trunc() as i64
        }
    }
}

/// An entity that is toggled on and off the grid for the whole lifetime of a world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    variant: ResourceVariant,
    meta: ResourceMeta,
    position: Position,
    is_active: bool,
    timer: Timer,
    reward: i64,
    life_span: u32,
    cool_down: u32,
}

impl Resource {
    /// Builds an inactive resource whose timer is already completed.
    ///
    /// `life_span` is how many ticks it stays collectible once spawned.
    pub fn new(variant: ResourceVariant, life_span: u32, rewards: &RewardConfig) -> Self {
        let (reward, cool_down) = match variant {
            ResourceVariant::Positive => (rewards.positive_reward, rewards.positive_cool_down),
            ResourceVariant::Negative => (rewards.negative_reward, rewards.negative_cool_down),
            ResourceVariant::Tier(tier) => (
                tier_reward(rewards.tier_base_reward, tier, rewards.growth),
                rewards.tier_cool_down,
            ),
        };
        Resource {
            variant,
            meta: variant.meta(),
            position: Position::new(0, 0),
            is_active: false,
            timer: Timer::new(),
            reward,
            life_span,
            cool_down,
        }
    }

    pub fn variant(&self) -> ResourceVariant {
        self.variant
    }

    pub fn meta(&self) -> ResourceMeta {
        self.meta
    }

    pub fn tier(&self) -> u32 {
        self.meta.tier
    }

    /// Last cell the resource was spawned on. Only meaningful while active.
    pub fn position(&self) -> Position {
        self.position
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn timer_remaining(&self) -> u32 {
        self.timer.remaining()
    }

    /// The full reward this resource is worth when it pays out.
    pub fn reward(&self) -> i64 {
        self.reward
    }

    pub fn life_span(&self) -> u32 {
        self.life_span
    }

    pub fn cool_down(&self) -> u32 {
        self.cool_down
    }

    /// Takes the resource off the grid with an already elapsed cooldown.
    pub fn reset(&mut self) {
        self.is_active = false;
        self.timer.set(0);
    }

    /// Places the resource on `position` and starts its life-span.
    pub fn spawn(&mut self, position: Position) {
        self.position = position;
        self.is_active = true;
        self.timer.set(self.life_span);
    }

    /// Removes the resource without a reward and starts its cooldown.
    pub fn deplete(&mut self) {
        self.is_active = false;
        self.timer.set(self.cool_down);
    }

    /// Counts the timer down and reports whether it has run out.
    pub fn tick(&mut self) -> bool {
        self.timer.tick();
        self.timer.is_completed()
    }

    /// Removes the resource, starts its cooldown and returns the reward earned,
    /// updating `chain` according to the variant's rule.
    pub fn consume(&mut self, chain: &mut TierChain, scoring: ScoringPolicy) -> i64 {
        self.deplete();

        match self.variant {
            ResourceVariant::Positive => {
                chain.root();
                self.reward
            }
            ResourceVariant::Negative => {
                chain.clear();
                self.reward
            }
            ResourceVariant::Tier(tier) => {
                if chain.is_empty() {
                    0
                } else if chain.try_extend(tier) {
                    match scoring {
                        ScoringPolicy::StepWise => self.reward,
                        ScoringPolicy::Combo => 0,
                    }
                } else {
                    chain.clear();
                    match scoring {
                        ScoringPolicy::StepWise => 0,
                        ScoringPolicy::Combo => self.reward,
                    }
                }
            }
        }
    }
}
