// Copyright 2025 the Curlicue Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! User-facing configuration.
//!
//! [`ScrollConfig`] is what a host collects from its UI. It is validated once and then turned
//! into [`Params`](crate::Params), the resolved and scaled values the engine reads.

use core::f64::consts::PI;

use crate::error::ConfigError;

/// How leaf sizes vary around a parent.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SizeMode {
    /// All leaves of a parent share one size (an even split of the available arc).
    Uniform,
    /// Graduated sizes; the first leaf is the largest.
    #[default]
    LargeToSmall,
    /// Graduated sizes; the first leaf is the smallest.
    SmallToLarge,
}

impl SizeMode {
    /// Whether sizes are graduated at all.
    pub const fn is_graduated(self) -> bool {
        !matches!(self, Self::Uniform)
    }
}

/// Numeric sequence used to derive the angular size of each tier.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FractionScheme {
    /// `(5 + i) / T(i + 4)` over triangular numbers; uses one extra tier.
    #[default]
    Triangular,
    /// A smooth linear growth from tier to tier.
    Moderated,
    /// `(1 + i) / F(i + 5)` over Fibonacci numbers.
    Fibonacci,
    /// `1 / (4 + i)`.
    Harmonic,
    /// `(F(i + 5) / (3 + i)) / F(i + 7)`.
    FibonacciRatio,
}

/// How much randomness goes into leaf radii.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SizeRandomness {
    /// Radii follow the tier table exactly.
    #[default]
    None,
    /// Occasionally grow an extra-large leaf.
    Some,
    /// Every leaf radius is drawn at random from the tier table.
    Lots,
}

/// Configuration for one scroll.
///
/// Lengths are in the boundary's units before `scale` is applied; angles are radians.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScrollConfig {
    /// Upper bound on the number of nodes, roots included.
    pub max_nodes: usize,
    /// Upper bound on leaves per node, `2..=8`.
    pub max_leaves: usize,
    /// Draw the leaf count of each node at random (forces `max_leaves` to 8).
    pub random_leaf_count: bool,
    /// Grow a second, mirrored root.
    pub twin: bool,
    /// Radius of the twin root relative to the first, `[0.6, 1]`.
    pub twin_ratio: f64,
    /// Draw the twin ratio at random from `[0.6, 1)`.
    pub random_twin_ratio: bool,
    /// Size distribution of leaves.
    pub size_mode: SizeMode,
    /// Sequence used to size the tiers.
    pub scheme: FractionScheme,
    /// Number of size tiers, 5 (fewer, larger leaves) or 6.
    pub tier_count: u8,
    /// Random variation of leaf radii.
    pub size_randomness: SizeRandomness,
    /// Widen (positive) or narrow (negative) the arc leaves are spread over, `-100..=100`.
    pub spread: i32,
    /// Rotate tier positions around each parent, `-100..=100`.
    pub shift: i32,
    /// Direction of the first root's opening, in radians.
    pub origin_angle: f64,
    /// Pick the origin angle at random.
    pub random_origin: bool,
    /// When growth stalls, sprout one leaf on each too-small childless node.
    pub resprout: bool,
    /// Rotation applied to the resprout arc, within ±25°.
    pub resprout_adjustment: f64,
    /// Radius of a leaf relative to its parent when no tier applies.
    pub child_proportion: f64,
    /// Radius of the first root.
    pub init_radius: f64,
    /// Nodes at or below this radius stop growing.
    pub min_radius: f64,
    /// Minimum gap between nodes and between a node and the boundary.
    pub node_buffer: f64,
    /// Gap between twin roots.
    pub root_buffer: f64,
    /// Minimum angular gap between neighbouring leaves, in radians.
    pub halo: f64,
    /// Radial offset of roots; not affected by `scale`.
    pub root_lift: f64,
    /// Multiplier for radii and buffers.
    pub scale: f64,
    /// Seed for every random decision.
    pub seed: u64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            max_nodes: 200,
            max_leaves: 7,
            random_leaf_count: false,
            twin: true,
            twin_ratio: 1.0,
            random_twin_ratio: false,
            size_mode: SizeMode::LargeToSmall,
            scheme: FractionScheme::Triangular,
            tier_count: 6,
            size_randomness: SizeRandomness::None,
            spread: 0,
            shift: 0,
            origin_angle: 0.0,
            random_origin: false,
            resprout: false,
            resprout_adjustment: 0.0,
            child_proportion: 0.75,
            init_radius: 50.0,
            min_radius: 20.0,
            node_buffer: 5.0,
            root_buffer: 12.0,
            halo: 0.05,
            root_lift: 12.0,
            scale: 1.0,
            seed: 0,
        }
    }
}

/// Largest resprout adjustment, 25 degrees.
pub const MAX_RESPROUT_ADJUSTMENT: f64 = 25.0 * PI / 180.0;

impl ScrollConfig {
    /// Check every field against its valid domain.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_nodes == 0 {
            return Err(ConfigError::NoNodes);
        }
        if !self.random_leaf_count && !(2..=8).contains(&self.max_leaves) {
            return Err(ConfigError::MaxLeaves(self.max_leaves));
        }
        if !(0.6..=1.0).contains(&self.twin_ratio) {
            return Err(ConfigError::TwinRatio(self.twin_ratio));
        }
        if self.tier_count != 5 && self.tier_count != 6 {
            return Err(ConfigError::TierCount(self.tier_count));
        }
        if !(self.child_proportion > 0.0 && self.child_proportion <= 1.0) {
            return Err(ConfigError::ChildProportion(self.child_proportion));
        }
        for (name, value) in [
            ("init_radius", self.init_radius),
            ("min_radius", self.min_radius),
            ("node_buffer", self.node_buffer),
            ("root_buffer", self.root_buffer),
            ("halo", self.halo),
            ("scale", self.scale),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        if self.min_radius >= self.init_radius {
            return Err(ConfigError::MinAboveInit {
                min: self.min_radius,
                init: self.init_radius,
            });
        }
        for (name, value) in [
            ("origin_angle", self.origin_angle),
            ("root_lift", self.root_lift),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { name, value });
            }
        }
        for (name, value) in [("spread", self.spread), ("shift", self.shift)] {
            if !(-100..=100).contains(&value) {
                return Err(ConfigError::Adjustment { name, value });
            }
        }
        let sprout = self.resprout_adjustment;
        if sprout.is_nan() || sprout.abs() > MAX_RESPROUT_ADJUSTMENT {
            return Err(ConfigError::ResproutAdjustment(sprout));
        }
        Ok(())
    }

    /// Whether the configuration uses five tiers instead of six.
    pub const fn larger_max(&self) -> bool {
        self.tier_count == 5
    }
}
