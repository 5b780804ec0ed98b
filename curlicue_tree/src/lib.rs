// Copyright 2025 the Curlicue Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Curlicue Tree: a growth engine for scroll ornaments.
//!
//! A scroll is a tree of spirals. Every node is a circle with a spiral drawn inside it; each
//! leaf is tangent to its parent and curls the other way. Starting from one root (or a
//! mirrored "twin" pair) at the centroid of a region, the engine greedily places leaves
//! around each node, checks them against every committed node and every boundary edge, and
//! when a leaf does not fit, rotates it toward a clear angle or moves it to another size
//! tier before giving up on that node.
//!
//! - [`ScrollConfig`]: what a host collects from its UI; validated with [`ConfigError`].
//! - [`Params`] and [`SlotTable`]: the resolved, immutable values growth reads.
//! - [`ScrollTree`]: owns the nodes and the region; [`ScrollTree::grow`] runs the growth loop.
//! - [`Node`]: one placed spiral, with its envelope and point sequences for drawing.
//! - [`TreeDump`]: a text dump for debugging, with sections chosen by [`DumpFlags`].
//!
//! Growth is deterministic for a given configuration, seed, and region.
//!
//! ## Logging
//!
//! Growth passes, placements, adjustments, and resprouting are reported through
//! [`tracing`] at `debug` and `trace` level. The crate never installs a subscriber.
//!
//! ## Features
//!
//! - `serde`: derive `Serialize`/`Deserialize` for [`ScrollConfig`] and its enums. Missing
//!   fields take their defaults.
//!
//! # Example
//!
//! ```rust
//! use curlicue_tree::{ScrollConfig, ScrollTree, DumpFlags};
//! use curlicue_geom::{Boundary, kurbo::Rect};
//!
//! let region = Boundary::from_rect(Rect::new(0.0, 0.0, 800.0, 600.0)).unwrap();
//! let config = ScrollConfig { max_nodes: 40, seed: 7, ..ScrollConfig::default() };
//!
//! let mut tree = ScrollTree::new(config, region).unwrap();
//! let report = tree.grow();
//! assert!(tree.len() <= 40);
//! assert_eq!(report.added + tree.roots().count(), tree.len());
//!
//! // Every parent precedes its leaves.
//! for (idx, node) in tree.nodes().iter().enumerate() {
//!     if let Some(parent) = node.parent() {
//!         assert!(parent.index() < idx);
//!     }
//! }
//!
//! // One polyline per node, ready to stroke.
//! let paths: Vec<Vec<_>> = tree.spiral_paths().map(Iterator::collect).collect();
//! assert_eq!(paths.len(), tree.len());
//!
//! println!("{}", tree.dump(DumpFlags::BASIC));
//! ```

mod config;
mod dump;
mod error;
mod fit;
mod node;
mod params;
mod slots;
mod tree;
mod types;

pub use config::{
    FractionScheme, MAX_RESPROUT_ADJUSTMENT, ScrollConfig, SizeMode, SizeRandomness,
};
pub use dump::TreeDump;
pub use error::{ConfigError, TreeError};
pub use node::{Conflict, EdgeReading, EnvelopePoints, Node, SpiralPoints, Winding};
pub use params::{END_AT, Params};
pub use slots::SlotTable;
pub use tree::{GrowthReport, ScrollTree};
pub use types::{DumpFlags, NodeFlags, NodeId};
