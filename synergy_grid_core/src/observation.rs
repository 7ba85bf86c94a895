//! Fixed-shape numeric observations derived from a [`GridWorld`].
//!
//! The raw vector is laid out as
//!
//! ```text
//! [steps_remaining, agent_row, agent_col, chain] ++ [row, col, timer, tier] * roster_len
//! ```
//!
//! `chain` is the tier-chain length, or [`ABSENT`] when tiers are disabled.
//! Slots whose resource is off the grid encode `[ABSENT, ABSENT, 0, ABSENT]`.
//!
//! Normalization divides every field by its raw upper bound, except that the
//! [`ABSENT`] sentinel is passed through untouched wherever a field may hold it.

use std::cmp::Ordering;

use crate::{GridError, world::GridWorld};

/// Sentinel for absent values; never rescaled.
pub const ABSENT: f32 = -1.0;

/// Fields before the per-resource blocks.
pub const HEADER_FIELDS: usize = 4;

/// Fields in each per-resource block.
pub const SLOT_FIELDS: usize = 4;

/// Length of an observation for a roster of `roster_len` resources.
pub const fn observation_len(roster_len: usize) -> usize {
    HEADER_FIELDS + SLOT_FIELDS * roster_len
}

/// Per-field lower and upper bounds of an observation vector.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationBounds {
    low: Vec<f32>,
    high: Vec<f32>,
}

impl ObservationBounds {
    /// Validates that `low` and `high` have the same shape and that every
    /// `high` is strictly greater than its `low`. NaN bounds are rejected.
    pub fn new(low: Vec<f32>, high: Vec<f32>) -> Result<Self, GridError> {
        if low.len() != high.len() {
            return Err(GridError::ShapeMismatch {
                expected: low.len(),
                found: high.len(),
            });
        }
        if let Some((index, (&l, &h))) = low
            .iter()
            .zip(high.iter())
            .enumerate()
            .find(|(_, (l, h))| h.partial_cmp(l) != Some(Ordering::Greater))
        {
            return Err(GridError::BoundsOrder {
                index,
                low: l,
                high: h,
            });
        }
        Ok(ObservationBounds { low, high })
    }

    pub fn len(&self) -> usize {
        self.low.len()
    }

    pub fn is_empty(&self) -> bool {
        self.low.is_empty()
    }

    pub fn low(&self) -> &[f32] {
        &self.low
    }

    pub fn high(&self) -> &[f32] {
        &self.high
    }
}

/// Builds raw and normalized observations for one world layout.
///
/// Bounds are computed and validated once at construction so a malformed
/// layout fails before any episode runs.
#[derive(Debug, Clone)]
pub struct ObservationEncoder {
    raw: ObservationBounds,
    normalized: ObservationBounds,
    /// Fields whose lower bound is the sentinel.
    sentinel_mask: Vec<bool>,
}

impl ObservationEncoder {
    pub fn new(world: &GridWorld, max_steps: u32) -> Result<Self, GridError> {
        let (low, high) = Self::raw_bounds(world, max_steps);
        Self::with_bounds(world, ObservationBounds::new(low, high)?)
    }

    /// Uses caller-supplied raw bounds, which must match the world's observation shape.
    pub fn with_bounds(world: &GridWorld, raw: ObservationBounds) -> Result<Self, GridError> {
        let expected = observation_len(world.resources().len());
        if raw.len() != expected {
            return Err(GridError::ShapeMismatch {
                expected,
                found: raw.len(),
            });
        }
        // Normalization divides by the upper bound.
        if let Some((index, &high)) = raw.high().iter().enumerate().find(|(_, h)| **h <= 0.0) {
            return Err(GridError::InvalidConfig(format!(
                "observation upper bound at index {index} must be positive, got {high}"
            )));
        }

        let sentinel_mask: Vec<bool> = raw.low().iter().map(|&l| l == ABSENT).collect();
        let normalized_low = sentinel_mask
            .iter()
            .map(|&sentinel| if sentinel { ABSENT } else { 0.0 })
            .collect();
        let normalized = ObservationBounds::new(normalized_low, vec![1.0; expected])?;

        Ok(ObservationEncoder {
            raw,
            normalized,
            sentinel_mask,
        })
    }

    fn raw_bounds(world: &GridWorld, max_steps: u32) -> (Vec<f32>, Vec<f32>) {
        // Dimensions of 1 still need a positive divisor.
        let max_row = world.grid_rows().saturating_sub(1).max(1) as f32;
        let max_col = world.grid_cols().saturating_sub(1).max(1) as f32;
        let max_timer = world.life_span().max(1) as f32;
        let max_tier = world.max_tier().max(1) as f32;
        let chain_low = if world.max_tier() == 0 { ABSENT } else { 0.0 };
        let chain_high = (world.max_tier() + 1) as f32;

        let roster_len = world.resources().len();
        let mut low = Vec::with_capacity(observation_len(roster_len));
        let mut high = Vec::with_capacity(observation_len(roster_len));

        low.extend([0.0, 0.0, 0.0, chain_low]);
        high.extend([max_steps as f32, max_row, max_col, chain_high]);
        for _ in 0..roster_len {
            low.extend([ABSENT, ABSENT, 0.0, ABSENT]);
            high.extend([max_row, max_col, max_timer, max_tier]);
        }
        (low, high)
    }

    /// Bounds of the raw observation.
    pub fn raw_space(&self) -> &ObservationBounds {
        &self.raw
    }

    /// Bounds of the normalized observation, as presented to a learner.
    pub fn observation_space(&self) -> &ObservationBounds {
        &self.normalized
    }

    /// Builds the raw observation of `world`.
    pub fn encode(&self, world: &GridWorld, steps_remaining: u32) -> Vec<f32> {
        let agent = world.agent().position();
        let chain = if world.max_tier() == 0 {
            ABSENT
        } else {
            world.chain().len() as f32
        };

        let mut obs = Vec::with_capacity(self.raw.len());
        obs.extend([
            steps_remaining as f32,
            agent.row as f32,
            agent.col as f32,
            chain,
        ]);
        for resource in world.resources() {
            if resource.is_active() {
                let position = resource.position();
                obs.extend([
                    position.row as f32,
                    position.col as f32,
                    resource.timer_remaining() as f32,
                    resource.tier() as f32,
                ]);
            } else {
                obs.extend([ABSENT, ABSENT, 0.0, ABSENT]);
            }
        }
        obs
    }

    /// Rescales a raw observation into `[0, 1]`, keeping sentinel fields at [`ABSENT`].
    pub fn normalize(&self, raw: &[f32]) -> Result<Vec<f32>, GridError> {
        if raw.len() != self.raw.len() {
            return Err(GridError::ShapeMismatch {
                expected: self.raw.len(),
                found: raw.len(),
            });
        }
        Ok(raw
            .iter()
            .zip(self.raw.high())
            .zip(&self.sentinel_mask)
            .map(|((&value, &high), &sentinel)| {
                if sentinel && value == ABSENT {
                    ABSENT
                } else {
                    value / high
                }
            })
            .collect())
    }

    /// Raw observation of `world`, already normalized.
    pub fn encode_normalized(
        &self,
        world: &GridWorld,
        steps_remaining: u32,
    ) -> Result<Vec<f32>, GridError> {
        self.normalize(&self.encode(world, steps_remaining))
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{AgentAction, config::WorldConfig};

    fn world(max_tier: u32) -> GridWorld {
        let mut world = GridWorld::new(&WorldConfig {
            max_tier,
            ..WorldConfig::default()
        })
        .unwrap();
        world.reset(10, StdRng::seed_from_u64(7)).unwrap();
        world
    }

    #[test]
    fn bounds_reject_shape_mismatch() {
        assert_eq!(
            ObservationBounds::new(vec![0.0, 0.0], vec![1.0]),
            Err(GridError::ShapeMismatch {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn bounds_reject_unordered_fields() {
        assert_eq!(
            ObservationBounds::new(vec![0.0, 2.0, 0.0], vec![1.0, 2.0, 1.0]),
            Err(GridError::BoundsOrder {
                index: 1,
                low: 2.0,
                high: 2.0
            })
        );
    }

    #[test]
    fn bounds_reject_nan() {
        assert!(matches!(
            ObservationBounds::new(vec![0.0, 0.0], vec![1.0, f32::NAN]),
            Err(GridError::BoundsOrder { index: 1, .. })
        ));
        assert!(matches!(
            ObservationBounds::new(vec![f32::NAN], vec![1.0]),
            Err(GridError::BoundsOrder { index: 0, .. })
        ));
    }

    #[test]
    fn encoder_rejects_a_zero_upper_bound() {
        let world = world(0);
        let (low, mut high) = ObservationEncoder::raw_bounds(&world, 50);
        // First slot's row: low is the sentinel, so 0 would still be ordered.
        assert_eq!(low[HEADER_FIELDS], ABSENT);
        high[HEADER_FIELDS] = 0.0;
        let bounds = ObservationBounds::new(low, high).unwrap();
        assert!(matches!(
            ObservationEncoder::with_bounds(&world, bounds),
            Err(GridError::InvalidConfig(_))
        ));
    }

    #[test]
    fn encoder_rejects_bounds_for_another_layout() {
        let world = world(0);
        let bounds = ObservationBounds::new(vec![0.0; 5], vec![1.0; 5]).unwrap();
        assert_eq!(
            ObservationEncoder::with_bounds(&world, bounds).unwrap_err(),
            GridError::ShapeMismatch {
                expected: observation_len(world.resources().len()),
                found: 5
            }
        );
    }

    #[test]
    fn raw_layout_matches_world_state() {
        let world = world(2);
        let encoder = ObservationEncoder::new(&world, 50).unwrap();
        let obs = encoder.encode(&world, 42);
        assert_eq!(obs.len(), observation_len(world.resources().len()));
        assert_eq!(&obs[..HEADER_FIELDS], &[42.0, 2.0, 2.0, 0.0]);

        for (slot, resource) in world.resources().iter().enumerate() {
            let block = &obs[HEADER_FIELDS + slot * SLOT_FIELDS..][..SLOT_FIELDS];
            if resource.is_active() {
                let p = resource.position();
                assert_eq!(
                    block,
                    &[
                        p.row as f32,
                        p.col as f32,
                        resource.timer_remaining() as f32,
                        resource.tier() as f32
                    ]
                );
            } else {
                assert_eq!(block, &[ABSENT, ABSENT, 0.0, ABSENT]);
            }
        }
    }

    #[test]
    fn chain_field_is_a_sentinel_without_tiers() {
        let world = world(0);
        let encoder = ObservationEncoder::new(&world, 50).unwrap();
        let obs = encoder.encode(&world, 50);
        assert_eq!(obs[3], ABSENT);
        assert_eq!(encoder.encode_normalized(&world, 50).unwrap()[3], ABSENT);
    }

    #[test]
    fn normalization_preserves_sentinels_and_scales_the_rest() {
        let mut world = world(3);
        let encoder = ObservationEncoder::new(&world, 50).unwrap();
        for step in 0..30 {
            world.perform_agent_action(AgentAction::ALL[step % 4]).unwrap();
            let raw = encoder.encode(&world, 50 - step as u32);
            let normalized = encoder.normalize(&raw).unwrap();
            assert_eq!(normalized.len(), raw.len());
            for (r, n) in raw.iter().zip(&normalized) {
                if *r == ABSENT {
                    assert_eq!(*n, ABSENT);
                } else {
                    assert!((0.0..=1.0).contains(n), "{n} out of range for raw {r}");
                }
            }
        }
    }

    #[test]
    fn normalization_divides_by_raw_high() {
        let world = world(0);
        let encoder = ObservationEncoder::new(&world, 50).unwrap();
        let normalized = encoder.encode_normalized(&world, 25).unwrap();
        // steps 25/50, agent (2, 2) on a 5x5 grid
        assert_eq!(&normalized[..3], &[0.5, 0.5, 0.5]);
    }

    #[test]
    fn normalize_rejects_wrong_length() {
        let world = world(0);
        let encoder = ObservationEncoder::new(&world, 50).unwrap();
        assert!(matches!(
            encoder.normalize(&[0.0; 3]),
            Err(GridError::ShapeMismatch { found: 3, .. })
        ));
    }

    #[test]
    fn observation_space_marks_sentinel_fields() {
        let world = world(1);
        let encoder = ObservationEncoder::new(&world, 50).unwrap();
        let space = encoder.observation_space();
        assert_eq!(&space.low()[..HEADER_FIELDS], &[0.0, 0.0, 0.0, 0.0]);
        assert_eq!(
            &space.low()[HEADER_FIELDS..HEADER_FIELDS + SLOT_FIELDS],
            &[ABSENT, ABSENT, 0.0, ABSENT]
        );
        assert!(space.high().iter().all(|&h| h == 1.0));
        assert_eq!(encoder.raw_space().len(), space.len());
    }
}
