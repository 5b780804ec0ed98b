// Copyright 2025 the Curlicue Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Human-readable diagnostic dump of a tree.

use core::fmt;

use crate::node::{Node, Winding};
use crate::tree::ScrollTree;
use crate::types::{DumpFlags, NodeId};

/// Text dump of a [`ScrollTree`], created by [`ScrollTree::dump`].
///
/// The header (parameters, size tiers, boundary) is always written. Each node then gets the
/// sections selected by its [`DumpFlags`].
#[derive(Clone, Copy, Debug)]
pub struct TreeDump<'a> {
    tree: &'a ScrollTree,
    flags: DumpFlags,
}

impl<'a> TreeDump<'a> {
    pub(crate) fn new(tree: &'a ScrollTree, flags: DumpFlags) -> Self {
        Self { tree, flags }
    }

    fn write_header(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.tree.params();
        writeln!(
            f,
            "scroll tree: {} nodes (max {}), seed {}",
            self.tree.len(),
            p.max_nodes,
            self.tree.config().seed
        )?;
        writeln!(
            f,
            "max leaves: {}{}, twin: {} (ratio {:.3}), sizes: {:?}/{:?}, randomness: {:?}",
            p.max_leaves,
            if p.random_leaf_count { " (random)" } else { "" },
            p.twin,
            p.twin_ratio,
            p.size_mode,
            p.scheme,
            p.size_randomness,
        )?;
        writeln!(
            f,
            "radius: init {:.2}, min {:.2}; buffer: node {:.2}, root {:.2}; halo {:.3}; root lift {:.2}",
            p.init_radius, p.min_radius, p.node_buffer, p.root_buffer, p.halo, p.root_lift,
        )?;
        writeln!(
            f,
            "arcs: start {:.3}, end {:.3}, spread {:.3}, shift {:.3}, origin {:.3}; resprout: {} ({:.3}..{:.3})",
            p.start_at,
            p.end_at,
            p.spread,
            p.shift,
            p.origin_angle,
            p.resprout,
            p.sprout_max_angle,
            p.sprout_angle,
        )?;

        let slots = self.tree.slots();
        writeln!(f, "slots:")?;
        for (idx, ((mult, size), angle)) in slots
            .rad_mults()
            .iter()
            .zip(slots.sizes())
            .zip(slots.angles())
            .enumerate()
        {
            writeln!(
                f,
                "  slot #{idx}: radius x{mult:.3}, size {size:.3}, angle {angle:.3}"
            )?;
        }
        writeln!(f, "  active: {:?}", slots.active())?;

        writeln!(f, "boundary:")?;
        write!(f, "{}", self.tree.boundary())
    }

    fn write_node(&self, f: &mut fmt::Formatter<'_>, id: NodeId, node: &Node) -> fmt::Result {
        writeln!(f, "node {id}:")?;
        if self.flags.contains(DumpFlags::BASIC) {
            let parent = node
                .parent()
                .map_or_else(|| "none".to_owned(), |p| p.to_string());
            let winding = match node.winding() {
                Winding::Positive => "+",
                Winding::Negative => "-",
            };
            writeln!(
                f,
                "  parent {parent}, center ({:.2}, {:.2}), radius {:.2}, start {:.3}, end {:.3}, \
                 slot {}, lift {:.2}, winding {winding}, flags {:?}",
                node.center().x,
                node.center().y,
                node.radius(),
                node.start_angle(),
                node.end_angle(),
                node.slot(),
                node.lift(),
                node.flags(),
            )?;
        }
        if self.flags.contains(DumpFlags::EDGES) {
            for (idx, reading) in node.edge_readings().iter().enumerate() {
                match reading.distance {
                    Some(d) => write!(f, "  edge #{idx}: distance {d:.2}")?,
                    None => write!(f, "  edge #{idx}: conflict")?,
                }
                writeln!(f, " at ({:.2}, {:.2})", reading.point.x, reading.point.y)?;
            }
        }
        if self.flags.contains(DumpFlags::LEAVES) && node.has_leaves() {
            for (leaf, angle) in node.leaves().iter().zip(node.leaf_angles()) {
                writeln!(f, "  leaf {leaf} at {angle:.3}")?;
            }
        }
        if self.flags.contains(DumpFlags::NEIGHBORS) {
            for conflict in node.neighbors() {
                writeln!(f, "  neighbor {}: skin {:.2}", conflict.node, conflict.skin)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for TreeDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_header(f)?;
        for (idx, node) in self.tree.nodes().iter().enumerate() {
            self.write_node(f, NodeId::new(idx), node)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ScrollConfig;
    use crate::tree::ScrollTree;
    use crate::types::DumpFlags;
    use curlicue_geom::Boundary;
    use kurbo::Rect;

    fn tree() -> ScrollTree {
        let boundary = Boundary::from_rect(Rect::new(0.0, 0.0, 600.0, 600.0)).unwrap();
        let mut tree = ScrollTree::new(
            ScrollConfig {
                max_nodes: 12,
                ..ScrollConfig::default()
            },
            boundary,
        )
        .unwrap();
        tree.grow();
        tree
    }

    #[test]
    fn header_and_default_sections() {
        let tree = tree();
        let text = tree.dump(DumpFlags::default()).to_string();
        assert!(text.starts_with("scroll tree: "), "header first");
        assert!(text.contains("slots:"), "slot table");
        assert!(text.contains("vertex #1: (0, 600)"), "boundary vertices");
        assert!(text.contains("node #0:"), "root section");
        assert!(text.contains("  parent none,"), "root has no parent");
        assert!(!text.contains("  edge #"), "edges are off by default");
        if tree.nodes()[0].has_leaves() {
            assert!(text.contains("  leaf #"), "leaves are listed");
        }
    }

    #[test]
    fn edge_section_lists_every_edge() {
        let tree = tree();
        let text = tree.dump(DumpFlags::EDGES).to_string();
        let edges = text.matches("  edge #").count();
        assert_eq!(edges, 4 * tree.len(), "four readings per node");
        assert!(!text.contains("  parent "), "basic section is off");
    }
}
