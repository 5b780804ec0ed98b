// Copyright 2025 the Curlicue Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resolved growth parameters.

use core::f64::consts::{FRAC_PI_4, PI, TAU};

use curlicue_geom::normalize_angle;
use rand::Rng;
use rand::rngs::StdRng;

use crate::config::{FractionScheme, ScrollConfig, SizeMode, SizeRandomness};
use crate::error::ConfigError;

/// Relative angle at which every node's curl ends and leaves stop.
pub const END_AT: f64 = FRAC_PI_4;

const SPROUT_ANGLE: f64 = 5.0 * PI / 4.0;
const SPROUT_MAX_ANGLE: f64 = 11.0 * PI / 12.0;

/// Immutable values the engine reads during growth.
///
/// Produced from a [`ScrollConfig`] by [`Params::resolve`]: random choices (twin ratio, origin
/// angle) are drawn, lengths are scaled, and look adjustments are converted to radians.
#[derive(Clone, Debug, PartialEq)]
pub struct Params {
    /// Node budget, roots included.
    pub max_nodes: usize,
    /// Leaf cap per node (8 when the count is random).
    pub max_leaves: usize,
    /// Leaf count of each node is drawn at random.
    pub random_leaf_count: bool,
    /// A twin root is requested.
    pub twin: bool,
    /// Radius of the twin root relative to the first.
    pub twin_ratio: f64,
    /// Leaf size distribution.
    pub size_mode: SizeMode,
    /// Tier sizing sequence.
    pub scheme: FractionScheme,
    /// Five tiers instead of six.
    pub larger_max: bool,
    /// Random variation of leaf radii.
    pub size_randomness: SizeRandomness,
    /// Extra arc, in radians, spread over the tiers.
    pub spread: f64,
    /// Rotation, in radians, of tier positions.
    pub shift: f64,
    /// Opening direction of the first root.
    pub origin_angle: f64,
    /// Sprout stumps once growth stalls.
    pub resprout: bool,
    /// Relative angle where resprouted leaves are placed.
    pub sprout_angle: f64,
    /// Lower edge of the arc resprouted leaves may be adjusted into.
    pub sprout_max_angle: f64,
    /// Default leaf-to-parent radius ratio.
    pub child_proportion: f64,
    /// Scaled radius of the first root.
    pub init_radius: f64,
    /// Scaled radius at or below which nodes stop growing.
    pub min_radius: f64,
    /// Scaled node gap.
    pub node_buffer: f64,
    /// Scaled gap between twin roots.
    pub root_buffer: f64,
    /// Angular gap between leaves.
    pub halo: f64,
    /// Radial offset of roots.
    pub root_lift: f64,
    /// Relative angle where a root's base arc begins.
    pub start_at: f64,
    /// Relative angle where every curl ends.
    pub end_at: f64,
}

impl Params {
    /// Validate `config` and resolve it, drawing any random choices from `rng`.
    pub fn resolve(config: &ScrollConfig, rng: &mut StdRng) -> Result<Self, ConfigError> {
        config.validate()?;

        let twin_ratio = if config.random_twin_ratio
            || config.size_randomness == SizeRandomness::Lots
        {
            rng.gen_range(0.6..1.0)
        } else {
            config.twin_ratio
        };
        let origin_angle = if config.random_origin {
            rng.gen_range(0.0..TAU)
        } else {
            normalize_angle(config.origin_angle)
        };

        let mut params = Self {
            max_nodes: config.max_nodes,
            max_leaves: if config.random_leaf_count {
                8
            } else {
                config.max_leaves
            },
            random_leaf_count: config.random_leaf_count,
            twin: config.twin,
            twin_ratio,
            size_mode: config.size_mode,
            scheme: config.scheme,
            larger_max: config.larger_max(),
            size_randomness: config.size_randomness,
            spread: f64::from(config.spread) * config.halo / 2.0,
            shift: f64::from(config.shift) / 100.0,
            origin_angle,
            resprout: config.resprout,
            sprout_angle: SPROUT_ANGLE + config.resprout_adjustment,
            sprout_max_angle: SPROUT_MAX_ANGLE + config.resprout_adjustment,
            child_proportion: config.child_proportion,
            init_radius: config.init_radius * config.scale,
            min_radius: config.min_radius * config.scale,
            node_buffer: config.node_buffer * config.scale,
            root_buffer: config.root_buffer * config.scale,
            halo: config.halo,
            root_lift: config.root_lift,
            start_at: 0.0,
            end_at: END_AT,
        };
        params.start_at = params.initial_start_at();
        Ok(params)
    }

    fn initial_start_at(&self) -> f64 {
        if !self.twin {
            return 0.1;
        }
        match self.size_mode {
            SizeMode::Uniform => TAU / 6.0,
            SizeMode::SmallToLarge if self.larger_max => 0.0,
            SizeMode::SmallToLarge => 0.1,
            SizeMode::LargeToSmall => 0.785,
        }
    }

    /// Leaf sizes are graduated.
    pub fn graduated(&self) -> bool {
        self.size_mode.is_graduated()
    }

    /// Leaf sizes grow from first to last.
    pub fn small_to_large(&self) -> bool {
        self.size_mode == SizeMode::SmallToLarge
    }

    /// Extra-large leaves may appear.
    pub fn random_large(&self) -> bool {
        self.size_randomness != SizeRandomness::None
    }

    /// Every leaf radius is random.
    pub fn random_sizes(&self) -> bool {
        self.size_randomness == SizeRandomness::Lots
    }

    /// Number of tier spaces the fraction schemes fill.
    pub fn slot_spaces(&self) -> usize {
        if self.larger_max { 5 } else { 6 }
    }

    /// A leaf this small is not worth placing.
    pub fn radius_too_small(&self, radius: f64) -> bool {
        radius <= self.min_radius / 3.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn resolve(config: &ScrollConfig) -> Params {
        Params::resolve(config, &mut StdRng::seed_from_u64(config.seed)).unwrap()
    }

    #[test]
    fn scale_applies_to_lengths_only() {
        let p = resolve(&ScrollConfig {
            scale: 2.0,
            ..ScrollConfig::default()
        });
        assert_eq!(p.init_radius, 100.0);
        assert_eq!(p.min_radius, 40.0);
        assert_eq!(p.node_buffer, 10.0);
        assert_eq!(p.root_buffer, 24.0);
        assert_eq!(p.root_lift, 12.0, "root lift is not scaled");
        assert_eq!(p.halo, 0.05);
    }

    #[test]
    fn start_arc_depends_on_twin_and_sizes() {
        let single = resolve(&ScrollConfig {
            twin: false,
            ..ScrollConfig::default()
        });
        assert_eq!(single.start_at, 0.1);

        let uniform = resolve(&ScrollConfig {
            size_mode: SizeMode::Uniform,
            ..ScrollConfig::default()
        });
        assert!((uniform.start_at - TAU / 6.0).abs() < 1e-12);

        let five = resolve(&ScrollConfig {
            size_mode: SizeMode::SmallToLarge,
            tier_count: 5,
            ..ScrollConfig::default()
        });
        assert_eq!(five.start_at, 0.0);
        assert_eq!(resolve(&ScrollConfig::default()).start_at, 0.785);
    }

    #[test]
    fn adjustments_convert_to_radians() {
        let p = resolve(&ScrollConfig {
            spread: 40,
            shift: -25,
            resprout_adjustment: 0.2,
            ..ScrollConfig::default()
        });
        assert!((p.spread - 40.0 * 0.05 / 2.0).abs() < 1e-12);
        assert!((p.shift + 0.25).abs() < 1e-12);
        assert!((p.sprout_angle - (SPROUT_ANGLE + 0.2)).abs() < 1e-12);
        assert!((p.sprout_max_angle - (SPROUT_MAX_ANGLE + 0.2)).abs() < 1e-12);
    }

    #[test]
    fn random_choices_follow_the_seed() {
        let cfg = ScrollConfig {
            random_twin_ratio: true,
            random_origin: true,
            seed: 77,
            ..ScrollConfig::default()
        };
        let a = resolve(&cfg);
        let b = resolve(&cfg);
        assert_eq!(a, b, "same seed, same parameters");
        assert!((0.6..1.0).contains(&a.twin_ratio));
        assert!((0.0..TAU).contains(&a.origin_angle));
    }

    #[test]
    fn random_leaf_count_forces_eight() {
        let p = resolve(&ScrollConfig {
            random_leaf_count: true,
            max_leaves: 3,
            ..ScrollConfig::default()
        });
        assert_eq!(p.max_leaves, 8);
    }

    #[test]
    fn invalid_config_is_reported() {
        let cfg = ScrollConfig {
            max_nodes: 0,
            ..ScrollConfig::default()
        };
        assert_eq!(
            Params::resolve(&cfg, &mut StdRng::seed_from_u64(0)),
            Err(ConfigError::NoNodes)
        );
    }
}
