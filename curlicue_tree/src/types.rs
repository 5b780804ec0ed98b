// Copyright 2025 the Curlicue Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the scroll tree: node identifiers and flag sets.

/// Identifier for a node in a [`ScrollTree`](crate::ScrollTree).
///
/// Nodes are never removed, so an identifier is simply the node's position in the
/// append-only node list. A parent's identifier is always smaller than its leaves'.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "node counts are bounded by the configured budget, far below u32::MAX"
    )]
    pub(crate) const fn new(idx: usize) -> Self {
        Self(idx as u32)
    }

    /// Position of the node in [`ScrollTree::nodes`](crate::ScrollTree::nodes).
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl core::fmt::Display for NodeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

bitflags::bitflags! {
    /// Growth state and role of a node.
    ///
    /// `FULL` and `BLOCKED` are terminal: once set, the node never grows again.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// The node has all the leaves it will get.
        const FULL      = 0b0000_0001;
        /// A placement attempt on this node failed for good.
        const BLOCKED   = 0b0000_0010;
        /// The node is the second (mirrored) root.
        const TWIN      = 0b0000_0100;
        /// The node is the only root; its curl has no twin to fit against.
        const SOLO_ROOT = 0b0000_1000;
    }
}

bitflags::bitflags! {
    /// Sections of a [`TreeDump`](crate::TreeDump) to include for each node.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct DumpFlags: u8 {
        /// Parent, center, radius, angles, slot, and orientation.
        const BASIC     = 0b0000_0001;
        /// Cached distance and closest point for every boundary edge.
        const EDGES     = 0b0000_0010;
        /// Leaf identifiers and attachment angles.
        const LEAVES    = 0b0000_0100;
        /// Neighbor conflicts recorded by the last fit check.
        const NEIGHBORS = 0b0000_1000;
    }
}

impl Default for DumpFlags {
    fn default() -> Self {
        Self::BASIC | Self::LEAVES
    }
}
