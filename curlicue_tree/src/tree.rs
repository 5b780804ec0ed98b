// Copyright 2025 the Curlicue Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scroll tree: root placement and the growth loop.

use curlicue_geom::{Boundary, complement_angle, tangent_half_angle};
use kurbo::{Point, Vec2};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, trace};

use crate::config::ScrollConfig;
use crate::dump::TreeDump;
use crate::error::TreeError;
use crate::fit::{Placer, check_edge_fit, first_open_angle, root_base_arc, worst_edge_deficit};
use crate::node::{Node, Rules};
use crate::params::Params;
use crate::slots::{SlotTable, index_f64};
use crate::types::{DumpFlags, NodeFlags, NodeId};

/// Upper bound on growth passes.
const MAX_PASSES: usize = 100;
/// Attempts at pushing a root off the boundary.
const ROOT_NUDGES: usize = 8;
/// Extra distance added to each root nudge so rounding does not leave it touching.
const NUDGE_MARGIN: f64 = 0.5;
/// Half the angular offset between twin roots.
const TWIN_SHIFT: f64 = 0.05;

/// Summary of one call to [`ScrollTree::grow`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GrowthReport {
    /// Growth passes over the node list.
    pub passes: usize,
    /// Nodes added, resprouted ones included.
    pub added: usize,
    /// Leaves sprouted on stumps.
    pub sprouted: usize,
    /// The node budget ran out.
    pub budget_exhausted: bool,
}

/// A scroll: roots, the leaves grown from them, and the region they must stay inside.
///
/// Nodes are append-only and every parent precedes its leaves. Geometry of a committed node
/// never changes; only its [`NodeFlags`] and leaf lists do.
pub struct ScrollTree {
    config: ScrollConfig,
    params: Params,
    slots: SlotTable,
    boundary: Boundary,
    nodes: Vec<Node>,
    min_root_base: f64,
    rng: StdRng,
}

impl core::fmt::Debug for ScrollTree {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let full = self.nodes.iter().filter(|n| n.is_full()).count();
        let blocked = self.nodes.iter().filter(|n| n.is_blocked()).count();
        f.debug_struct("ScrollTree")
            .field("nodes", &self.nodes.len())
            .field("full", &full)
            .field("blocked", &blocked)
            .field("max_nodes", &self.params.max_nodes)
            .field("slots", &self.slots.len())
            .field("edges", &self.boundary.edges().len())
            .finish_non_exhaustive()
    }
}

impl ScrollTree {
    /// Validate `config`, resolve it, and plant the roots inside `boundary`.
    ///
    /// The roots are centered on the boundary's centroid. A root that crosses the boundary
    /// is pushed inward; if that fails it is marked blocked and the tree will not grow.
    pub fn new(config: ScrollConfig, boundary: Boundary) -> Result<Self, TreeError> {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let params = Params::resolve(&config, &mut rng)?;
        let slots = SlotTable::build(&params);
        let mut tree = Self {
            nodes: Vec::with_capacity(params.max_nodes),
            config,
            params,
            slots,
            boundary,
            min_root_base: 0.01,
            rng,
        };
        tree.plant_roots();
        Ok(tree)
    }

    /// Build the boundary from `vertices` and then the tree, as [`ScrollTree::new`].
    pub fn from_vertices(
        config: ScrollConfig,
        vertices: impl IntoIterator<Item = Point>,
    ) -> Result<Self, TreeError> {
        let boundary = Boundary::new(vertices)?;
        Self::new(config, boundary)
    }

    /// The configuration the tree was built from.
    pub fn config(&self) -> &ScrollConfig {
        &self.config
    }

    /// Resolved parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Size tiers.
    pub fn slots(&self) -> &SlotTable {
        &self.slots
    }

    /// The region nodes stay inside.
    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    /// All nodes, roots first, in placement order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Look up a node.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree has no nodes. A constructed tree always has at least one root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Identifiers of the root nodes.
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .take_while(|(_, n)| n.is_root())
            .map(|(i, _)| NodeId::new(i))
    }

    /// Drawn spiral of every node, in node order.
    pub fn spiral_paths(&self) -> impl Iterator<Item = crate::node::SpiralPoints> + '_ {
        self.nodes.iter().map(Node::spiral_points)
    }

    /// Diagnostic dump of the tree, showing the sections selected by `flags`.
    pub fn dump(&self, flags: DumpFlags) -> TreeDump<'_> {
        TreeDump::new(self, flags)
    }

    fn budget_left(&self) -> usize {
        self.params.max_nodes.saturating_sub(self.nodes.len())
    }

    fn rules(&self) -> Rules<'_> {
        Rules {
            params: &self.params,
            slots: &self.slots,
            min_root_base: self.min_root_base,
        }
    }

    fn placer(&mut self) -> Placer<'_> {
        Placer {
            nodes: &self.nodes,
            boundary: &self.boundary,
            rules: Rules {
                params: &self.params,
                slots: &self.slots,
                min_root_base: self.min_root_base,
            },
            rng: &mut self.rng,
        }
    }

    // Roots

    fn plant_roots(&mut self) {
        let p = &self.params;
        let centroid = self.boundary.centroid();
        let radius = p.init_radius;
        let angle = p.origin_angle;

        if !p.twin {
            let mut root = Node::new_root(centroid, radius, angle, false, p);
            self.fit_root(&mut root);
            root.anchor_solo();
            debug!(center = ?root.center(), radius, blocked = root.is_blocked(), "planted root");
            self.nodes.push(root);
            return;
        }

        let ratio = p.twin_ratio;
        let (near, far) = center_pair(centroid, angle, radius, ratio, p.root_buffer);
        let mut root = Node::new_root(far, radius, angle, false, p);
        let mut twin = Node::new_root(near, radius * ratio, complement_angle(angle), true, p);

        let offset = self.fit_root(&mut root);
        twin.move_to(twin.center() + offset, &self.params);
        let twin_fits = self.params.max_nodes > 1
            && check_edge_fit(&self.boundary, &self.params, &mut twin, None);
        debug!(
            center = ?root.center(),
            radius,
            blocked = root.is_blocked(),
            twin = twin_fits,
            twin_radius = twin.radius(),
            "planted roots"
        );
        if twin_fits {
            let shared = root.start_point.midpoint(twin.start_point);
            root.start_point = shared;
            twin.start_point = shared;
            self.nodes.push(root);
            self.nodes.push(twin);
        } else {
            self.nodes.push(root);
        }
    }

    /// Record a root's edge readings, pushing it inward while it conflicts. Returns how far
    /// the root moved; a root that cannot be freed is marked blocked.
    fn fit_root(&self, root: &mut Node) -> Vec2 {
        let start = root.center();
        for _ in 0..ROOT_NUDGES {
            if check_edge_fit(&self.boundary, &self.params, root, None) {
                return root.center() - start;
            }
            let Some((deficit, normal)) = worst_edge_deficit(&self.boundary, &self.params, root)
            else {
                break;
            };
            trace!(deficit, normal = ?normal, "nudging root off the boundary");
            root.move_to(root.center() + normal * (deficit + NUDGE_MARGIN), &self.params);
        }
        if !check_edge_fit(&self.boundary, &self.params, root, None) {
            debug!(center = ?root.center(), "root does not fit the boundary");
            root.flags |= NodeFlags::BLOCKED;
        }
        root.center() - start
    }

    // Growth

    /// Grow leaves until the node budget runs out, a pass adds nothing, or the pass limit
    /// is reached.
    ///
    /// Each pass develops every node that can still grow, in node order, including nodes
    /// added during the pass. With resprouting enabled, a pass where every node but one is
    /// sterile first sprouts one leaf on each stump.
    pub fn grow(&mut self) -> GrowthReport {
        let start_len = self.nodes.len();
        let mut report = GrowthReport::default();
        let mut sterile = 0;
        let mut prev_len = 0;

        'passes: while self.budget_left() > 0 && report.passes < MAX_PASSES {
            report.passes += 1;
            debug!(pass = report.passes, nodes = self.nodes.len(), sterile, "growth pass");

            if sterile > 0 && sterile >= self.nodes.len().saturating_sub(1) && self.params.resprout
            {
                let before = self.nodes.len();
                report.sprouted += self.sprout_stumps();
                if self.nodes.len() == before || self.budget_left() == 0 {
                    break;
                }
            }
            sterile = 0;

            if prev_len == self.nodes.len() {
                if !self.params.resprout || !self.has_stumps() {
                    break;
                }
            } else {
                prev_len = self.nodes.len();
            }

            let mut idx = 0;
            while idx < self.nodes.len() {
                if self.nodes[idx].can_grow(self.params.min_radius) {
                    self.develop(NodeId::new(idx), false);
                    if self.budget_left() == 0 {
                        break 'passes;
                    }
                } else {
                    sterile += 1;
                }
                idx += 1;
            }
        }

        report.added = self.nodes.len() - start_len;
        report.budget_exhausted = self.budget_left() == 0;
        debug!(
            passes = report.passes,
            added = report.added,
            sprouted = report.sprouted,
            nodes = self.nodes.len(),
            "growth finished"
        );
        report
    }

    fn has_stumps(&self) -> bool {
        let min = self.params.min_radius;
        self.nodes
            .iter()
            .any(|n| n.is_too_small(min) && !n.has_leaves() && !n.is_blocked())
    }

    fn first_open(&self, id: NodeId) -> f64 {
        first_open_angle(&self.nodes, &self.rules(), id)
    }

    fn leaf_radius(&mut self, parent: NodeId, slot: usize) -> f64 {
        let parent_radius = self.nodes[parent.index()].radius();
        self.slots
            .next_leaf_radius(&self.params, parent_radius, Some(slot), &mut self.rng)
    }

    /// Grow as many leaves on node `id` as fit, then mark it full or blocked.
    fn develop(&mut self, id: NodeId, resprouted: bool) {
        let idx = id.index();
        let max_leaves = if self.params.random_leaf_count {
            SlotTable::random_leaf_count(&self.params, &mut self.rng)
        } else {
            self.params.max_leaves
        };
        if self.nodes[idx].is_root() && !self.nodes[idx].has_leaves() {
            if let Some((_, min_base)) = root_base_arc(&self.nodes, &self.rules(), id) {
                self.min_root_base = min_base;
            }
        }
        let radius_of = |tree: &Self| tree.nodes[idx].radius();
        trace!(node = %id, max_leaves, resprouted, "developing node");

        let mut base = self.first_open(id);
        let mut slot = self.nodes[idx].next_leaf_slot_at(base, max_leaves, &self.rules());
        let mut radius = self.leaf_radius(id, slot);
        let mut arc = tangent_half_angle(radius_of(self), radius);
        let mut angle = self.nodes[idx].next_leaf_angle(arc, base, slot, &self.rules());

        for _ in 0..max_leaves {
            if let Some(mut at) = angle {
                if self.params.radius_too_small(radius) {
                    let promoted = if self.params.graduated() && self.params.small_to_large() {
                        self.promote_tiny_leaf(id, slot)
                    } else {
                        None
                    };
                    let Some((s, r, a)) = promoted else {
                        self.nodes[idx].flags |= NodeFlags::FULL;
                        break;
                    };
                    (slot, radius, at) = (s, r, a);
                }

                if !self.grow_leaf(id, radius, at, slot, false) {
                    if !resprouted {
                        self.nodes[idx].flags |= NodeFlags::BLOCKED;
                    }
                    break;
                }
                if self.budget_left() == 0 {
                    return;
                }

                base = self.first_open(id);
                let last_slot = self.nodes.last().map_or(0, Node::slot);
                if last_slot == 0 {
                    self.nodes[idx].flags |= NodeFlags::FULL;
                    return;
                }
                slot = self.nodes[idx].next_leaf_slot_after(last_slot, max_leaves, &self.rules());
            } else {
                slot = self.nodes[idx].next_leaf_slot_after(slot, max_leaves, &self.rules());
            }

            radius = self.leaf_radius(id, slot);
            arc = tangent_half_angle(radius_of(self), radius);
            if !self.nodes[idx].has_room_for(1.75 * arc, &self.params) {
                self.nodes[idx].flags |= NodeFlags::FULL;
                break;
            }
            angle = self.nodes[idx].next_leaf_angle(arc, base, slot, &self.rules());

            if self.nodes[idx].leaf_count() == max_leaves {
                self.nodes[idx].flags |= NodeFlags::FULL;
                return;
            }
        }
        if self.nodes[idx].has_leaves() {
            self.nodes[idx].flags |= NodeFlags::FULL;
        }
    }

    /// Step a too-small leaf up through the tiers until it is big enough. Returns the new
    /// tier, radius, and angle.
    fn promote_tiny_leaf(&mut self, id: NodeId, mut slot: usize) -> Option<(usize, f64, f64)> {
        let mut radius = self.leaf_radius(id, slot);
        while self.params.radius_too_small(radius) && slot > 0 {
            slot -= 1;
            radius = self.leaf_radius(id, slot);
        }
        if self.params.radius_too_small(radius) {
            return None;
        }
        let angle = self.nodes[id.index()].reslot_angle(slot, true, &self.rules())?;
        debug!(node = %id, slot, radius, angle, "promoted tiny leaf");
        Some((slot, radius, angle))
    }

    /// Place a leaf on `parent` and commit it.
    fn grow_leaf(
        &mut self,
        parent: NodeId,
        radius: f64,
        angle: f64,
        slot: usize,
        no_reslot: bool,
    ) -> bool {
        let Some(mut leaf) = self
            .placer()
            .place_leaf(parent, radius, angle, slot, no_reslot)
        else {
            return false;
        };
        let id = NodeId::new(self.nodes.len());
        self.nodes[parent.index()].attach(id, &mut leaf, &self.params);
        debug!(
            node = %id,
            parent = %parent,
            radius = leaf.radius(),
            slot = leaf.slot(),
            angle = complement_angle(leaf.start_angle()),
            resprouted = no_reslot,
            "added leaf"
        );
        self.nodes.push(leaf);
        true
    }

    /// Grow one leaf on every too-small, childless, unblocked node, smallest tiers first
    /// and larger stumps first within a tier. Returns how many leaves were sprouted.
    fn sprout_stumps(&mut self) -> usize {
        if self.budget_left() == 0 {
            return 0;
        }
        let p = &self.params;
        let min_slot = self.slots.min_active();
        let max_slot = self.slots.max_active();
        let grow_slot = min_slot;
        let stumps: Vec<(NodeId, f64, usize)> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_too_small(p.min_radius) && !n.has_leaves() && !n.is_blocked())
            .map(|(i, n)| (NodeId::new(i), n.radius(), n.slot()))
            .collect();
        debug!(stumps = stumps.len(), "sprouting stumps");

        let mut sprouted = 0;
        for target in min_slot..=max_slot {
            let mut group: Vec<(NodeId, f64)> = stumps
                .iter()
                .filter(|(_, _, slot)| *slot == target)
                .map(|&(id, r, _)| (id, r))
                .collect();
            group.sort_by(|a, b| b.1.total_cmp(&a.1));

            for (id, stump_radius) in group {
                let p = &self.params;
                let mut mult = p.child_proportion;
                if stump_radius < p.min_radius / 2.0 {
                    mult += 0.05;
                }
                let radius = mult * stump_radius * p.init_radius / p.min_radius;
                let angle = self.nodes[id.index()]
                    .absolute(p.sprout_angle + 0.1 * index_f64(grow_slot));

                if self.grow_leaf(id, radius, angle, grow_slot, true) {
                    sprouted += 1;
                    if self.budget_left() == 0 {
                        return sprouted;
                    }
                    let leaf = NodeId::new(self.nodes.len() - 1);
                    if self.nodes[leaf.index()].can_grow(self.params.min_radius) {
                        self.develop(leaf, true);
                        if self.budget_left() == 0 {
                            return sprouted;
                        }
                    }
                } else {
                    self.nodes[id.index()].flags |= NodeFlags::BLOCKED;
                }
            }
        }
        sprouted
    }
}

/// Centers for a twin pair on either side of `centroid` along `angle`, each a half root
/// buffer away from it, with their vertical offsets evened out.
///
/// Returns the center in direction `angle` (for the smaller radius) first.
fn center_pair(
    centroid: Point,
    angle: f64,
    radius: f64,
    ratio: f64,
    root_buffer: f64,
) -> (Point, Point) {
    let half = 0.5 * root_buffer;
    let near = centroid + Vec2::from_angle(angle - TWIN_SHIFT) * (radius + half);
    let far = centroid
        + Vec2::from_angle(complement_angle(angle + TWIN_SHIFT)) * (radius * ratio + half * ratio);
    let lift = ((centroid.y - near.y).abs() - (centroid.y - far.y).abs()).abs() / 2.0;
    (
        Point::new(near.x, near.y - lift),
        Point::new(far.x, far.y - lift),
    )
}
