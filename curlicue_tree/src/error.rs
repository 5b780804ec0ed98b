// Copyright 2025 the Curlicue Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Construction errors.
//!
//! Growth itself never fails: a leaf that cannot be placed is dropped and its parent is marked
//! blocked or full. Everything that can be wrong with the inputs is reported up front by
//! [`ScrollTree::new`](crate::ScrollTree::new).

use curlicue_geom::BoundaryError;
use thiserror::Error;

/// An invalid [`ScrollConfig`](crate::ScrollConfig) value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The node budget must allow at least the root.
    #[error("max_nodes must be at least 1")]
    NoNodes,
    /// Leaves per node must be between 2 and 8.
    #[error("max_leaves must be in 2..=8, got {0}")]
    MaxLeaves(usize),
    /// Twin ratio must be in `[0.6, 1]`.
    #[error("twin_ratio must be in [0.6, 1], got {0}")]
    TwinRatio(f64),
    /// Only 5 or 6 size tiers are supported.
    #[error("tier_count must be 5 or 6, got {0}")]
    TierCount(u8),
    /// Child proportion must be in `(0, 1]`.
    #[error("child_proportion must be in (0, 1], got {0}")]
    ChildProportion(f64),
    /// A length that must be positive and finite is not.
    #[error("{name} must be positive and finite, got {value}")]
    NonPositive {
        /// Field name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },
    /// The minimum radius must stay below the initial radius.
    #[error("min_radius ({min}) must be smaller than init_radius ({init})")]
    MinAboveInit {
        /// Configured minimum radius.
        min: f64,
        /// Configured initial radius.
        init: f64,
    },
    /// An angle or factor is NaN or infinite.
    #[error("{name} must be finite, got {value}")]
    NonFinite {
        /// Field name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },
    /// A percentage-style look adjustment is outside `-100..=100`.
    #[error("{name} must be in -100..=100, got {value}")]
    Adjustment {
        /// Field name.
        name: &'static str,
        /// Offending value.
        value: i32,
    },
    /// The resprout angle adjustment is outside ±25°.
    #[error("resprout_adjustment must be within ±25° (±0.436 rad), got {0}")]
    ResproutAdjustment(f64),
}

/// Failure to build a [`ScrollTree`](crate::ScrollTree).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    /// The configuration was rejected.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// The boundary could not be built.
    #[error("invalid boundary: {0}")]
    Boundary(#[from] BoundaryError),
}
