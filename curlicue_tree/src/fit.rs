// Copyright 2025 the Curlicue Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collision checks and the adjustment strategies that rescue a leaf that does not fit.
//!
//! A candidate leaf is a plain [`Node`] value that is not part of the tree yet. It is checked
//! against every committed node (skin distance) and every boundary edge, then, if needed,
//! rotated around its parent: toward an edge tangent, away from the closest neighbor, or
//! into another size tier. Candidates are cloned for speculative attempts and only the
//! winning copy is handed back for commit.

use curlicue_geom::{
    Boundary, angle_to, complement_angle, edge_fit_arc, normalize_angle, radius_ratio,
};
use rand::rngs::StdRng;
use tracing::{debug, trace};

use crate::node::{Conflict, EdgeReading, Node, Rules};
use crate::params::Params;
use crate::types::NodeId;

/// Skin distance below which siblings conflict, relative to the node buffer.
const SIBLING_CUTOFF: f64 = 0.65;
/// Neighbor conflicts shallower than this share of the buffer get a small nudge first.
const MINOR_CONFLICT: f64 = 0.2;

/// Record the relation between `node` and every boundary edge.
///
/// With a parent, the straight path from the parent's center is also checked for leaving
/// the region through an edge the parent is close to. Returns `true` when no edge
/// conflicts.
pub(crate) fn check_edge_fit(
    boundary: &Boundary,
    params: &Params,
    node: &mut Node,
    parent: Option<&Node>,
) -> bool {
    let buffer = params.node_buffer;
    let center = node.center();
    let reach = parent.map(|p| (p, p.radius() + 2.0 * node.radius() + node.lift() + buffer));

    let mut readings = Vec::with_capacity(boundary.edges().len());
    for (idx, edge) in boundary.edges().iter().enumerate() {
        let crossed = reach.is_some_and(|(parent, reach)| {
            let cached = parent
                .edge_readings()
                .get(idx)
                .and_then(|r| r.distance)
                .unwrap_or(0.0);
            cached.abs() < reach && edge.crosses(parent.center(), center)
        });
        let contact = edge.contact(center);
        let skin = contact.distance - node.envelope_radius(angle_to(center, contact.point));
        let conflict = crossed || skin < buffer / 2.0;
        readings.push(EdgeReading {
            point: contact.point,
            distance: (!conflict).then_some(contact.distance.abs()),
        });
    }
    node.edges = readings;
    !node.has_edge_conflict()
}

/// Largest edge deficit of a root, with the inward normal that resolves it.
pub(crate) fn worst_edge_deficit(
    boundary: &Boundary,
    params: &Params,
    node: &Node,
) -> Option<(f64, kurbo::Vec2)> {
    let center = node.center();
    let mut worst: Option<(f64, kurbo::Vec2)> = None;
    for edge in boundary.edges() {
        let contact = edge.contact(center);
        let skin = contact.distance - node.envelope_radius(angle_to(center, contact.point));
        let deficit = params.node_buffer / 2.0 - skin;
        if deficit > 0.0 && worst.is_none_or(|(d, _)| deficit > d) {
            worst = Some((deficit, edge.inward_normal(contact.point)));
        }
    }
    worst
}

/// Base arc for root `id` and the minimum root base it implies, or `None` when there is no
/// twin to keep clear of.
pub(crate) fn root_base_arc(nodes: &[Node], rules: &Rules<'_>, id: NodeId) -> Option<(f64, f64)> {
    let p = rules.params;
    if !p.twin {
        return None;
    }
    let (first, second) = (nodes.first()?, nodes.get(1)?);
    if !second.is_root() {
        return None;
    }
    let dist = first.center().distance(second.center());

    let mut base = p.start_at;
    let mut min_base = 0.01;
    let other = if id.index() == 0 {
        p.init_radius * p.twin_ratio
    } else {
        p.init_radius
    };
    if p.graduated() && !p.random_sizes() {
        let min_mult = rules.slots.min_mult();
        let mut min_leaf = other * min_mult;
        min_base = (other / dist).min(1.0).asin();
        if p.small_to_large() {
            base += (min_leaf / (other + min_leaf)).asin();
            min_base = base;
        } else {
            if min_mult > 0.33 {
                min_leaf += p.node_buffer;
            }
            base = ((other + min_leaf) / dist).min(1.0).asin();
        }
    }
    Some((base, 0.5 * min_base - 2.0 * p.halo))
}

/// First absolute angle on node `id` where a new leaf may start.
///
/// A root without leaves starts after its base arc. Any other node without leaves starts
/// half a parent-projection in, unless its parent's next leaf crowds it. Otherwise the new
/// leaf starts just past the previous leaf's footprint.
pub(crate) fn first_open_angle(nodes: &[Node], rules: &Rules<'_>, id: NodeId) -> f64 {
    let p = rules.params;
    let node = &nodes[id.index()];
    let Some(last) = node.last_leaf() else {
        return match node.parent() {
            None => {
                let base = root_base_arc(nodes, rules, id).map_or(p.start_at, |(base, _)| base);
                node.remaining(base)
            }
            Some(parent_id) => {
                let parent = &nodes[parent_id.index()];
                parent
                    .obstructing_sibling(id)
                    .and_then(|sib| node.sibling_conflict_angle(&nodes[sib.index()], p.halo))
                    .unwrap_or_else(|| node.base_angle(parent.radius()))
            }
        };
    };
    let prev_arc = node.leaf_arc(nodes[last.index()].radius());
    normalize_angle(node.last_leaf_angle(p) - node.winding().sign() * (p.halo + prev_arc))
}

/// Placement context for one candidate leaf: the committed nodes, the region, and the rules.
pub(crate) struct Placer<'a> {
    pub(crate) nodes: &'a [Node],
    pub(crate) boundary: &'a Boundary,
    pub(crate) rules: Rules<'a>,
    pub(crate) rng: &'a mut StdRng,
}

impl core::fmt::Debug for Placer<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Placer")
            .field("nodes", &self.nodes.len())
            .field("rules", &self.rules)
            .finish_non_exhaustive()
    }
}

impl<'a> Placer<'a> {
    fn parent(&self, id: NodeId) -> &'a Node {
        let nodes: &'a [Node] = self.nodes;
        &nodes[id.index()]
    }

    fn first_open_angle(&self, id: NodeId) -> f64 {
        first_open_angle(self.nodes, &self.rules, id)
    }

    fn adjust(&mut self, leaf: &mut Node, parent: &Node, angle: f64, slot: usize) {
        leaf.adjust(parent, angle, slot, &self.rules, self.rng);
    }

    /// Record every committed node, other than the parent, whose skin is too close.
    fn check_neighbor_fit(&self, leaf: &mut Node) -> bool {
        let buffer = self.rules.params.node_buffer;
        let parent = leaf.parent();
        leaf.neighbors.clear();
        for (idx, other) in self.nodes.iter().enumerate() {
            let id = NodeId::new(idx);
            if parent == Some(id) {
                continue;
            }
            let skin = leaf.surface_distance(other);
            let cutoff = if other.parent() == parent {
                SIBLING_CUTOFF * buffer
            } else {
                buffer
            };
            if skin < cutoff {
                leaf.neighbors.push(Conflict { node: id, skin });
            }
        }
        leaf.neighbors.is_empty()
    }

    fn check_fit(&self, leaf: &mut Node, parent: &Node) -> bool {
        let clear_of_neighbors = self.check_neighbor_fit(leaf);
        let clear_of_edges =
            check_edge_fit(self.boundary, self.rules.params, leaf, Some(parent));
        clear_of_neighbors && clear_of_edges
    }

    /// Build a leaf of `radius` on `parent_id` at `angle` and make it fit, rotating or
    /// reslotting it as needed. `no_reslot` restricts adjustments to the sprout range and
    /// keeps the tier, for resprouted stumps.
    pub(crate) fn place_leaf(
        &mut self,
        parent_id: NodeId,
        radius: f64,
        angle: f64,
        slot: usize,
        no_reslot: bool,
    ) -> Option<Node> {
        let p = self.rules.params;
        let parent = self.parent(parent_id);
        let lift = parent.lift_for(radius, angle, p);
        let mut leaf = Node::new_leaf(parent, parent_id, radius, angle, slot, lift, p);

        let mut fits = self.check_fit(&mut leaf, parent);
        if !fits {
            trace!(
                parent = %parent_id,
                radius,
                angle,
                slot,
                neighbors = leaf.neighbors().len(),
                edge_conflict = leaf.has_edge_conflict(),
                "leaf does not fit, retrying"
            );
            fits = self.try_to_fit(&mut leaf, parent_id, no_reslot);
        }
        if fits && !p.radius_too_small(leaf.radius()) {
            Some(leaf)
        } else {
            debug!(parent = %parent_id, slot = leaf.slot(), "gave up on leaf");
            None
        }
    }

    /// Try adjusting a copy in place; failing that, walk the remaining active tiers.
    fn try_to_fit(&mut self, leaf: &mut Node, parent_id: NodeId, no_reslot: bool) -> bool {
        let p = self.rules.params;
        let slots = self.rules.slots;
        let parent = self.parent(parent_id);

        let mut copy = leaf.clone();
        if self.try_adjust(&mut copy, parent_id, p.max_leaves <= 3, no_reslot) {
            *leaf = copy;
            return true;
        }
        if no_reslot {
            return false;
        }

        let mut copy = leaf.clone();
        let init_start = complement_angle(leaf.start_angle());
        let active = slots.active();
        let first = active
            .iter()
            .position(|&s| s == copy.slot())
            .map_or(0, |i| i + 1);
        for &slot in &active[first..] {
            let Some(angle) = parent.reslot_angle(slot, false, &self.rules) else {
                return false;
            };
            if !parent.angle_in_growth_range(init_start, angle, p) {
                continue;
            }
            let old_slot = copy.slot();
            self.adjust(&mut copy, parent, angle, slot);
            if p.graduated() && !p.small_to_large() && p.radius_too_small(copy.radius()) {
                return false;
            }
            let fits = self.check_fit(&mut copy, parent);
            debug!(
                parent = %parent_id,
                from = old_slot,
                to = slot,
                radius = copy.radius(),
                angle,
                fits,
                "reslotted leaf"
            );
            if fits {
                *leaf = copy;
                return true;
            }
            let mut nudged = copy.clone();
            if self.try_adjust(&mut nudged, parent_id, true, false) {
                *leaf = nudged;
                return true;
            }
        }
        false
    }

    /// Resolve edge conflicts first (only when there are no neighbor conflicts), then
    /// neighbor conflicts.
    fn try_adjust(&mut self, leaf: &mut Node, parent_id: NodeId, back_up: bool, limited: bool) -> bool {
        if leaf.has_edge_conflict() && leaf.neighbors().is_empty() {
            if self.try_adjust_to_edges(leaf, parent_id, limited) {
                return true;
            }
            if leaf.has_edge_conflict() {
                return false;
            }
        }
        if !leaf.neighbors().is_empty() {
            return self.try_adjust_to_neighbors(leaf, parent_id, back_up, limited);
        }
        false
    }

    /// Rotate the leaf so it sits tangent to the conflicting edge, trying the rotation in
    /// the growth direction first.
    fn try_adjust_to_edges(&mut self, leaf: &mut Node, parent_id: NodeId, limited: bool) -> bool {
        let p = self.rules.params;
        let parent = self.parent(parent_id);
        let init_start = self.first_open_angle(parent_id);

        let conflicts: Vec<usize> = leaf
            .edge_readings()
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_conflict())
            .map(|(i, _)| i)
            .collect();
        let edge_idx = match conflicts.as_slice() {
            [only] => *only,
            [] => 0,
            _ => leaf
                .edge_readings()
                .iter()
                .enumerate()
                .min_by(|(_, a), (_, b)| {
                    let center = leaf.center();
                    a.point.distance(center).total_cmp(&b.point.distance(center))
                })
                .map_or(0, |(i, _)| i),
        };
        let Some(edge_point) = parent.edge_readings().get(edge_idx).map(|r| r.point) else {
            return false;
        };
        let Some(arc) = edge_fit_arc(
            edge_point,
            parent.center(),
            parent.radius(),
            leaf.radius(),
            leaf.lift(),
            p.node_buffer,
        ) else {
            return false;
        };

        let toward_edge = angle_to(parent.center(), edge_point);
        let (mut first, mut second) = (toward_edge + arc, toward_edge - arc);
        if parent.winding().sign() < 0.0 && second < first {
            core::mem::swap(&mut first, &mut second);
        }
        let (first, second) = (normalize_angle(first), normalize_angle(second));
        let in_range = |angle: f64| {
            if limited {
                parent.angle_in_sprout_range(angle, p)
            } else {
                parent.angle_in_growth_range(init_start, angle, p)
            }
        };
        let (first_ok, second_ok) = (in_range(first), in_range(second));
        trace!(
            parent = %parent_id,
            edge = edge_idx,
            toward_edge,
            arc,
            first,
            first_ok,
            second,
            second_ok,
            "edge fit angles"
        );
        if !first_ok && !second_ok {
            return false;
        }

        let orig_slot = leaf.slot();
        if first_ok {
            let slot = parent.corrected_slot(first, orig_slot, &self.rules);
            if p.graduated() && p.small_to_large() {
                leaf.set_slot(slot);
            }
            self.adjust(leaf, parent, first, slot);
            let fits = self.check_fit(leaf, parent);
            debug!(parent = %parent_id, angle = first, fits, "adjusted leaf to edge");
            if fits || !second_ok {
                return fits;
            }
            if !leaf.has_edge_conflict()
                && !leaf.neighbors().is_empty()
                && self.try_adjust_to_neighbors(leaf, parent_id, false, limited)
            {
                return true;
            }
        }

        let slot = parent.corrected_slot(second, orig_slot, &self.rules);
        if p.graduated() && p.small_to_large() {
            leaf.set_slot(slot);
        }
        self.adjust(leaf, parent, second, slot);
        let fits = self.check_fit(leaf, parent);
        debug!(parent = %parent_id, angle = second, fits, "adjusted leaf to edge");
        fits
    }

    /// Nudge the leaf a few halos either way from its current angle.
    fn try_min_adjustment(&mut self, leaf: &mut Node, parent_id: NodeId) -> bool {
        let parent = self.parent(parent_id);
        let Some(closest) = leaf.closest_neighbor().copied() else {
            return false;
        };
        let neighbor = &self.nodes[closest.node.index()];
        let mult = radius_ratio(leaf.radius(), neighbor.radius()).max(2.0);
        let start = complement_angle(leaf.start_angle());
        for direction in [-1.0, 1.0] {
            let angle = normalize_angle(start + direction * mult * self.rules.params.halo);
            let mut copy = leaf.clone();
            self.adjust(&mut copy, parent, angle, leaf.slot());
            if self.check_fit(&mut copy, parent) {
                trace!(parent = %parent_id, angle, neighbor = %closest.node, "minimal adjustment worked");
                *leaf = copy;
                return true;
            }
        }
        false
    }

    /// Rotate the leaf away from its closest neighbor until it fits, the attempts run out,
    /// or the attempts start making things worse.
    fn try_adjust_to_neighbors(
        &mut self,
        leaf: &mut Node,
        parent_id: NodeId,
        mut back_up: bool,
        limited: bool,
    ) -> bool {
        let p = self.rules.params;
        let parent = self.parent(parent_id);
        let orig_slot = leaf.slot();
        let prev_count = leaf.neighbors().len();
        let mut tries = self.rules.slots.active().len();
        let mut tried: Vec<f64> = Vec::new();

        while !leaf.neighbors().is_empty() && tries > 0 {
            tries -= 1;
            let prev_sum = leaf.neighbor_skin_sum();

            let min_skin = leaf.closest_neighbor().map_or(0.0, |c| c.skin);
            if min_skin > MINOR_CONFLICT * p.node_buffer && self.try_min_adjustment(leaf, parent_id) {
                return true;
            }

            // Only the leaf placed just before, on the same parent, is in the way.
            let lone = match leaf.neighbors() {
                [only] => Some(only.node),
                _ => None,
            };
            if let Some(lone) = lone {
                let last = self.nodes.len() - 1;
                if lone.index() == last && self.nodes[last].parent() == leaf.parent() {
                    let first_open = self.first_open_angle(parent_id);
                    let angle = normalize_angle(
                        first_open
                            - parent.winding().sign() * (p.halo + parent.leaf_arc(leaf.radius())),
                    );
                    let slot = leaf.slot();
                    self.adjust(leaf, parent, angle, slot);
                    if self.check_fit(leaf, parent) {
                        trace!(parent = %parent_id, angle, "sibling adjustment worked");
                        return true;
                    }
                    if leaf.neighbors().is_empty() {
                        return false;
                    }
                }
            }

            let Some(angle) = self.neighbor_fit_angle(leaf, parent_id, back_up) else {
                trace!(parent = %parent_id, "no neighbor fit angle");
                return false;
            };
            if limited && !back_up && !parent.angle_in_sprout_range(angle, p) {
                trace!(parent = %parent_id, angle, "resprout adjustment out of range");
                return false;
            }
            if tried.contains(&angle) {
                return false;
            }
            let slot = parent.corrected_slot(angle, orig_slot, &self.rules);
            if leaf.slot().abs_diff(slot) > 2 {
                trace!(parent = %parent_id, from = leaf.slot(), to = slot, "adjustment would change tier too much");
                return false;
            }
            tried.push(angle);

            let fits = if back_up {
                // Try backing up once on a copy; on failure carry on as if it never happened.
                back_up = false;
                let mut copy = leaf.clone();
                if p.graduated() && !p.small_to_large() {
                    copy.set_slot(slot);
                }
                self.adjust(&mut copy, parent, angle, slot);
                if self.check_fit(&mut copy, parent) {
                    *leaf = copy;
                    true
                } else {
                    false
                }
            } else {
                self.adjust(leaf, parent, angle, slot);
                self.check_fit(leaf, parent)
            };
            if fits {
                debug!(parent = %parent_id, angle, "adjusted leaf to neighbor");
                return true;
            }
            if tried.len() > 3
                && leaf.neighbor_skin_sum() < prev_sum
                && prev_count > leaf.neighbors().len()
            {
                trace!(parent = %parent_id, "adjustments are making things worse");
                return false;
            }
        }
        false
    }

    /// Angle that clears the leaf's worst neighbor, backing up against the growth direction
    /// first when `back_up` is set.
    fn neighbor_fit_angle(&self, leaf: &Node, parent_id: NodeId, back_up: bool) -> Option<f64> {
        let p = self.rules.params;
        let parent = self.parent(parent_id);
        let first_open = self.first_open_angle(parent_id);
        let leaf_arc = parent.leaf_arc(leaf.radius());

        let neighbor_id = match leaf.neighbors() {
            [only] => only.node,
            _ => leaf.closest_neighbor()?.node,
        };
        let neighbor = &self.nodes[neighbor_id.index()];
        let fit = self.closest_fit_angle(parent, leaf, neighbor)?;

        let clock = parent.winding().sign();
        let toward = angle_to(parent.center(), neighbor.center());
        if back_up {
            let behind = normalize_angle(toward + clock * fit);
            if parent.angle_in_growth_range(first_open, behind, p) {
                return Some(behind);
            }
        }
        let ahead = normalize_angle(toward - clock * fit);
        let remaining = normalize_angle(clock * (fit - parent.end_angle()));
        (parent.angle_in_growth_range(first_open, ahead, p) && remaining >= 0.5 * leaf_arc)
            .then_some(ahead)
    }

    /// Rotation around `parent` that puts `leaf` a buffer away from `neighbor`.
    fn closest_fit_angle(&self, parent: &Node, leaf: &Node, neighbor: &Node) -> Option<f64> {
        let dist = neighbor.center().distance(parent.center());
        let skin = neighbor.surface_distance(parent);
        let hypotenuse = neighbor.radius() + leaf.radius() + self.rules.params.node_buffer;
        let adjacent = if skin > leaf.radius() {
            neighbor.envelope_radius(angle_to(neighbor.center(), parent.center()))
                + (skin - leaf.lift()) / 2.0
        } else {
            dist / 2.0
        };
        (hypotenuse >= adjacent).then(|| (adjacent / hypotenuse).acos())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ScrollConfig, SizeMode};
    use crate::slots::SlotTable;
    use core::f64::consts::FRAC_PI_2;
    use kurbo::{Point, Rect, Vec2};
    use rand::SeedableRng;

    fn setup(config: &ScrollConfig) -> (Params, SlotTable) {
        let params = Params::resolve(config, &mut StdRng::seed_from_u64(config.seed)).unwrap();
        let slots = SlotTable::build(&params);
        (params, slots)
    }

    fn rules<'a>(params: &'a Params, slots: &'a SlotTable) -> Rules<'a> {
        Rules {
            params,
            slots,
            min_root_base: 0.01,
        }
    }

    fn lone_uniform_root() -> ScrollConfig {
        ScrollConfig {
            twin: false,
            size_mode: SizeMode::Uniform,
            ..ScrollConfig::default()
        }
    }

    fn leaf_angle(leaf: &Node) -> f64 {
        complement_angle(leaf.start_angle())
    }

    #[test]
    fn edge_readings_for_a_centered_root() {
        let (p, _) = setup(&ScrollConfig::default());
        let boundary = Boundary::from_rect(Rect::new(0.0, 0.0, 400.0, 400.0)).unwrap();
        let mut root = Node::new_root(Point::new(200.0, 200.0), 50.0, 0.0, false, &p);
        assert!(check_edge_fit(&boundary, &p, &mut root, None), "root fits the box");
        assert_eq!(root.edge_readings().len(), 4);
        for reading in root.edge_readings() {
            let d = reading.distance.unwrap();
            assert!((d - 200.0).abs() < 1e-9, "distance to each side is 200, got {d}");
        }
    }

    #[test]
    fn edge_conflict_near_a_side() {
        let (p, _) = setup(&ScrollConfig::default());
        let boundary = Boundary::from_rect(Rect::new(0.0, 0.0, 400.0, 400.0)).unwrap();
        let mut root = Node::new_root(Point::new(40.0, 200.0), 50.0, 0.0, false, &p);
        assert!(!check_edge_fit(&boundary, &p, &mut root, None));
        assert!(root.has_edge_conflict());
        let (deficit, normal) = worst_edge_deficit(&boundary, &p, &root).unwrap();
        assert!(deficit > 10.0, "root pokes through the left side: {deficit}");
        assert!((normal.x - 1.0).abs() < 1e-9, "pushed to the right");
    }

    #[test]
    fn leaf_through_an_edge_conflicts() {
        let (p, _) = setup(&ScrollConfig::default());
        let boundary = Boundary::from_rect(Rect::new(0.0, 0.0, 400.0, 400.0)).unwrap();
        let mut root = Node::new_root(Point::new(200.0, 200.0), 50.0, 0.0, false, &p);
        check_edge_fit(&boundary, &p, &mut root, None);
        // Far enough out that the leaf center lands outside the box.
        let mut leaf = Node::new_leaf(&root, NodeId::new(0), 120.0, 0.0, 0, 40.0, &p);
        assert!(leaf.center().x > 400.0);
        assert!(!check_edge_fit(&boundary, &p, &mut leaf, Some(&root)));
    }

    #[test]
    fn solo_root_opens_at_start_arc() {
        let config = ScrollConfig {
            twin: false,
            ..ScrollConfig::default()
        };
        let (p, slots) = setup(&config);
        let rules = Rules {
            params: &p,
            slots: &slots,
            min_root_base: 0.01,
        };
        let nodes = vec![Node::new_root(Point::ORIGIN, 50.0, 0.0, false, &p)];
        assert_eq!(root_base_arc(&nodes, &rules, NodeId::new(0)), None);
        let open = first_open_angle(&nodes, &rules, NodeId::new(0));
        assert!((open - nodes[0].remaining(p.start_at)).abs() < 1e-12);
    }

    #[test]
    fn twin_roots_widen_the_base() {
        let (p, slots) = setup(&ScrollConfig::default());
        let rules = Rules {
            params: &p,
            slots: &slots,
            min_root_base: 0.01,
        };
        let nodes = vec![
            Node::new_root(Point::new(-56.0, 0.0), 50.0, 0.0, false, &p),
            Node::new_root(Point::new(56.0, 0.0), 50.0, core::f64::consts::PI, true, &p),
        ];
        let (base, min_base) = root_base_arc(&nodes, &rules, NodeId::new(0)).unwrap();
        assert!(base > 0.0 && base < core::f64::consts::FRAC_PI_2, "base arc {base}");
        assert!(min_base < base, "minimum base is below the base arc");
    }

    #[test]
    fn placing_a_first_leaf_on_an_open_root() {
        let config = ScrollConfig {
            twin: false,
            ..ScrollConfig::default()
        };
        let (p, slots) = setup(&config);
        let boundary = Boundary::from_rect(Rect::new(-500.0, -500.0, 500.0, 500.0)).unwrap();
        let mut root = Node::new_root(Point::ORIGIN, 50.0, 0.0, false, &p);
        check_edge_fit(&boundary, &p, &mut root, None);
        let nodes = vec![root];
        let mut rng = StdRng::seed_from_u64(1);
        let mut placer = Placer {
            nodes: &nodes,
            boundary: &boundary,
            rules: Rules {
                params: &p,
                slots: &slots,
                min_root_base: 0.01,
            },
            rng: &mut rng,
        };
        let angle = nodes[0].absolute(3.0);
        let leaf = placer
            .place_leaf(NodeId::new(0), 30.0, angle, 2, false)
            .expect("nothing else is in the way");
        assert_eq!(leaf.parent(), Some(NodeId::new(0)));
        assert!(leaf.neighbors().is_empty());
        assert!(!leaf.has_edge_conflict());
    }

    #[test]
    fn leaf_over_the_last_sibling_moves_past_it() {
        let config = ScrollConfig {
            halo: 0.3,
            ..lone_uniform_root()
        };
        let (p, slots) = setup(&config);
        let boundary = Boundary::from_rect(Rect::new(-500.0, -500.0, 500.0, 500.0)).unwrap();
        let mut root = Node::new_root(Point::ORIGIN, 50.0, 0.0, false, &p);
        check_edge_fit(&boundary, &p, &mut root, None);
        let lift = root.lift_for(20.0, 4.0, &p);
        let mut sibling = Node::new_leaf(&root, NodeId::new(0), 20.0, 4.0, 1, lift, &p);
        assert!(check_edge_fit(&boundary, &p, &mut sibling, Some(&root)));
        root.attach(NodeId::new(1), &mut sibling, &p);
        let nodes = vec![root, sibling];

        let first_open = first_open_angle(&nodes, &rules(&p, &slots), NodeId::new(0));
        let expected = normalize_angle(first_open - (p.halo + nodes[0].leaf_arc(20.0)));
        let mut rng = StdRng::seed_from_u64(1);
        let mut placer = Placer {
            nodes: &nodes,
            boundary: &boundary,
            rules: rules(&p, &slots),
            rng: &mut rng,
        };
        // Almost on top of the sibling: far too deep for a small nudge.
        let leaf = placer
            .place_leaf(NodeId::new(0), 20.0, 3.9, 1, false)
            .expect("there is room past the sibling");
        let angle = leaf_angle(&leaf);
        assert!(
            (angle - expected).abs() < 1e-9,
            "leaf starts a halo past the sibling: {angle} vs {expected}"
        );
        assert!(leaf.neighbors().is_empty());
    }

    #[test]
    fn edge_conflict_rotates_the_leaf_tangent_to_the_edge() {
        let (p, slots) = setup(&lone_uniform_root());
        let boundary = Boundary::from_rect(Rect::new(-500.0, -500.0, 110.0, 500.0)).unwrap();
        let mut root = Node::new_root(Point::ORIGIN, 50.0, 0.0, false, &p);
        assert!(check_edge_fit(&boundary, &p, &mut root, None));
        let lift = root.lift_for(30.0, 0.0, &p);
        let edge_point = Point::new(110.0, 0.0);
        let arc = edge_fit_arc(edge_point, Point::ORIGIN, 50.0, 30.0, lift, p.node_buffer)
            .expect("the edge is within reach");
        // Rotating the other way would land inside the end of the curl.
        assert!(arc < p.end_at, "arc {arc}");

        let nodes = vec![root];
        let mut rng = StdRng::seed_from_u64(1);
        let mut placer = Placer {
            nodes: &nodes,
            boundary: &boundary,
            rules: rules(&p, &slots),
            rng: &mut rng,
        };
        let leaf = placer
            .place_leaf(NodeId::new(0), 30.0, 0.0, 1, false)
            .expect("the leaf turns along the edge");
        let expected = normalize_angle(-arc);
        let angle = leaf_angle(&leaf);
        assert!(
            (angle - expected).abs() < 1e-9,
            "leaf sits tangent to the edge: {angle} vs {expected}"
        );
        assert!(!leaf.has_edge_conflict());
        assert!((leaf.radius() - 30.0).abs() < 1e-12, "uniform leaves keep their size");
    }

    #[test]
    fn shallow_conflict_gets_a_small_nudge() {
        let (p, slots) = setup(&lone_uniform_root());
        let boundary = Boundary::from_rect(Rect::new(-500.0, -500.0, 500.0, 500.0)).unwrap();
        let mut root = Node::new_root(Point::ORIGIN, 50.0, 0.0, false, &p);
        check_edge_fit(&boundary, &p, &mut root, None);

        let angle = 3.0;
        let lift = root.lift_for(30.0, angle, &p);
        let candidate = Node::new_leaf(&root, NodeId::new(0), 30.0, angle, 1, lift, &p);
        // A lone node just ahead of the candidate, 3 units apart: inside the buffer, but
        // only barely.
        let ahead = normalize_angle(angle + FRAC_PI_2);
        let back = complement_angle(ahead);
        let blocker_start = normalize_angle(back - 1.0);
        let gap = candidate.envelope_radius(ahead)
            + Node::new_root(Point::ORIGIN, 30.0, blocker_start, false, &p).envelope_radius(back);
        let mut blocker = Node::new_root(
            candidate.center() + Vec2::from_angle(ahead) * (gap + 3.0),
            30.0,
            blocker_start,
            false,
            &p,
        );
        check_edge_fit(&boundary, &p, &mut blocker, None);
        let skin = candidate.surface_distance(&blocker);
        assert!((skin - 3.0).abs() < 1e-6, "skin {skin}");

        let nodes = vec![root, blocker];
        let mut rng = StdRng::seed_from_u64(1);
        let mut placer = Placer {
            nodes: &nodes,
            boundary: &boundary,
            rules: rules(&p, &slots),
            rng: &mut rng,
        };
        let leaf = placer
            .place_leaf(NodeId::new(0), 30.0, angle, 1, false)
            .expect("a nudge clears the blocker");
        let expected = normalize_angle(angle - 2.0 * p.halo);
        let got = leaf_angle(&leaf);
        assert!(
            (got - expected).abs() < 1e-9,
            "nudged back by two halos: {got} vs {expected}"
        );
        assert!(leaf.neighbors().is_empty());
    }

    #[test]
    fn closest_fit_angle_for_near_and_far_neighbors() {
        let (p, slots) = setup(&lone_uniform_root());
        let boundary = Boundary::from_rect(Rect::new(-500.0, -500.0, 500.0, 500.0)).unwrap();
        let parent = Node::new_root(Point::ORIGIN, 50.0, 0.0, false, &p);
        let leaf = Node::new_leaf(&parent, NodeId::new(0), 30.0, 1.0, 0, 5.0, &p);
        let near = Node::new_root(Point::new(80.0, 0.0), 40.0, 0.0, false, &p);
        let far = Node::new_root(Point::new(1000.0, 0.0), 40.0, 0.0, false, &p);
        assert!(near.surface_distance(&parent) <= leaf.radius());

        let nodes: Vec<Node> = Vec::new();
        let mut rng = StdRng::seed_from_u64(1);
        let placer = Placer {
            nodes: &nodes,
            boundary: &boundary,
            rules: rules(&p, &slots),
            rng: &mut rng,
        };
        // Overlapping the parent: the adjacent side is half the center distance.
        let fit = placer
            .closest_fit_angle(&parent, &leaf, &near)
            .expect("a close neighbor has a fit angle");
        let expected = (40.0_f64 / (40.0 + 30.0 + p.node_buffer)).acos();
        assert!((fit - expected).abs() < 1e-12, "fit {fit} vs {expected}");
        assert_eq!(placer.closest_fit_angle(&parent, &leaf, &far), None);
    }

    #[test]
    fn unrescuable_leaf_drops_to_a_lower_tier() {
        let config = ScrollConfig {
            twin: false,
            ..ScrollConfig::default()
        };
        let (p, slots) = setup(&config);
        assert_eq!(slots.active(), &[6, 5, 4, 3, 2, 1, 0]);
        // Turn the root so tier 2 starts well away from the near edge.
        let facing = slots.angles()[2] + FRAC_PI_2 + 0.3;
        let boundary = Boundary::from_rect(Rect::new(-1000.0, -1000.0, 70.0, 1000.0)).unwrap();
        let mut root = Node::new_root(Point::ORIGIN, 50.0, normalize_angle(-facing), false, &p);
        assert!(check_edge_fit(&boundary, &p, &mut root, None));

        let nodes = vec![root];
        let mut rng = StdRng::seed_from_u64(1);
        let mut placer = Placer {
            nodes: &nodes,
            boundary: &boundary,
            rules: rules(&p, &slots),
            rng: &mut rng,
        };
        // Too big to turn tangent to an edge this close, so only a smaller tier helps.
        let leaf = placer
            .place_leaf(NodeId::new(0), 60.0, 0.0, 3, false)
            .expect("the next tier down fits");
        assert_eq!(leaf.slot(), 2);
        assert!((leaf.radius() - 50.0 * slots.rad_mults()[2]).abs() < 1e-9);
        let expected = nodes[0].absolute(slots.angles()[2]);
        let angle = leaf_angle(&leaf);
        assert!(
            (angle - expected).abs() < 1e-9,
            "leaf starts at its tier: {angle} vs {expected}"
        );
        assert!(!leaf.has_edge_conflict());
    }
}
