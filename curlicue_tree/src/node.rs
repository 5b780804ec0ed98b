// Copyright 2025 the Curlicue Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A placed spiral node and the angle bookkeeping around it.
//!
//! A node is drawn as a double spiral that starts at its parent and curls inward. Its
//! outline is not a circle: [`Node::envelope_radius`] approximates the distance from the
//! center to the drawn curve in a given direction, and that is what collision tests use.
//!
//! Leaves are placed around a node by angle. Three frames are used:
//! - absolute: a direction in the plane, `[0, 2π)`;
//! - relative: measured from the node's start angle in the node's winding direction, so both
//!   windings read the same way;
//! - remaining: the absolute direction reached by walking back from the start angle.

use core::f64::consts::{FRAC_PI_2, FRAC_PI_3, PI, TAU};

use curlicue_geom::{angle_to, complement_angle, normalize_angle, tangent_half_angle};
use kurbo::{Point, Vec2};
use rand::rngs::StdRng;

use crate::params::Params;
use crate::slots::SlotTable;
use crate::types::{NodeFlags, NodeId};

/// Scale of the spiral: radial growth per radian, relative to the node radius.
const SPIRAL_SCALE: f64 = 0.099;
/// Total turning of a drawn spiral.
const MAX_SPIRAL_ANGLE: f64 = 2.0 * TAU;
/// Sampling step for point sequences.
const POINT_STEP: f64 = 0.1;

/// Direction in which a node's curl turns. Leaves always turn opposite to their parent.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Winding {
    /// Angles increase along the curl (roots).
    Positive,
    /// Angles decrease along the curl.
    Negative,
}

impl Winding {
    /// `1.0` or `-1.0`.
    pub const fn sign(self) -> f64 {
        match self {
            Self::Positive => 1.0,
            Self::Negative => -1.0,
        }
    }

    /// The opposite winding.
    pub const fn flipped(self) -> Self {
        match self {
            Self::Positive => Self::Negative,
            Self::Negative => Self::Positive,
        }
    }
}

/// A neighbor found too close by the last fit check.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Conflict {
    /// The neighbor.
    pub node: NodeId,
    /// Skin distance to it; below the buffer.
    pub skin: f64,
}

/// Cached relation between a node and one boundary edge.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EdgeReading {
    /// Closest point of the edge to the node center.
    pub point: Point,
    /// Absolute center-to-edge distance, or `None` when the node conflicts with the edge.
    pub distance: Option<f64>,
}

impl EdgeReading {
    /// The node crosses or crowds this edge.
    pub fn is_conflict(&self) -> bool {
        self.distance.is_none()
    }
}

/// Read-only growth rules shared by every node of a tree.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Rules<'a> {
    pub(crate) params: &'a Params,
    pub(crate) slots: &'a SlotTable,
    /// Smallest relative arc kept free at the base of every node.
    pub(crate) min_root_base: f64,
}

/// One placed spiral.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    parent: Option<NodeId>,
    center: Point,
    radius: f64,
    start_angle: f64,
    end_angle: f64,
    winding: Winding,
    pub(crate) flags: NodeFlags,
    slot: usize,
    lift: f64,
    spiral_center: Point,
    envelope_center: Point,
    pub(crate) start_point: Point,
    leaves: Vec<NodeId>,
    leaf_angles: Vec<f64>,
    pub(crate) neighbors: Vec<Conflict>,
    pub(crate) edges: Vec<EdgeReading>,
}

impl Node {
    pub(crate) fn new_root(center: Point, radius: f64, start_angle: f64, twin: bool, params: &Params) -> Self {
        let mut flags = NodeFlags::empty();
        if twin {
            flags |= NodeFlags::TWIN;
        }
        if !params.twin {
            flags |= NodeFlags::SOLO_ROOT;
        }
        let mut node = Self {
            parent: None,
            center,
            radius,
            start_angle: normalize_angle(start_angle),
            end_angle: 0.0,
            winding: Winding::Positive,
            flags,
            slot: 0,
            lift: params.root_lift,
            spiral_center: center,
            envelope_center: center,
            start_point: center,
            leaves: Vec::new(),
            leaf_angles: Vec::new(),
            neighbors: Vec::new(),
            edges: Vec::new(),
        };
        node.refresh(params);
        node.start_point = node.root_anchor(MAX_SPIRAL_ANGLE - 0.1);
        node
    }

    /// Candidate leaf of `parent` in direction `angle` (absolute, from the parent's center).
    ///
    /// Edge readings are inherited from the parent until the leaf is checked.
    pub(crate) fn new_leaf(
        parent: &Self,
        parent_id: NodeId,
        radius: f64,
        angle: f64,
        slot: usize,
        lift: f64,
        params: &Params,
    ) -> Self {
        let center =
            parent.center + Vec2::from_angle(angle) * (parent.radius + radius + lift);
        let mut node = Self {
            parent: Some(parent_id),
            center,
            radius,
            start_angle: complement_angle(angle),
            end_angle: 0.0,
            winding: parent.winding.flipped(),
            flags: NodeFlags::empty(),
            slot,
            lift,
            spiral_center: center,
            envelope_center: center,
            start_point: center,
            leaves: Vec::new(),
            leaf_angles: Vec::new(),
            neighbors: Vec::new(),
            edges: parent.edges.clone(),
        };
        node.refresh(params);
        node
    }

    fn refresh(&mut self, params: &Params) {
        let clock = self.clock();
        self.end_angle = normalize_angle(self.start_angle + clock * params.end_at);
        let spiral_dir = normalize_angle(self.start_angle + clock * 3.0 * PI / 4.0);
        self.spiral_center = self.center + Vec2::from_angle(spiral_dir) * (self.radius / TAU);
        let envelope_dir = normalize_angle(self.start_angle + clock * 2.75);
        self.envelope_center =
            self.center + Vec2::from_angle(envelope_dir) * (PI / 12.0 * self.radius);
    }

    /// Move a root without changing its size or orientation.
    pub(crate) fn move_to(&mut self, center: Point, params: &Params) {
        self.center = center;
        self.refresh(params);
        self.start_point = self.root_anchor(MAX_SPIRAL_ANGLE - 0.1);
    }

    /// Anchor a lone root one full turn further out, since no twin shares its stalk.
    pub(crate) fn anchor_solo(&mut self) {
        self.start_point = self.root_anchor(MAX_SPIRAL_ANGLE);
    }

    pub(crate) fn set_slot(&mut self, slot: usize) {
        self.slot = slot;
    }

    /// Point on a root's own spiral after turning `theta`, used as its stalk anchor.
    pub(crate) fn root_anchor(&self, theta: f64) -> Point {
        self.spiral_center
            + Vec2::from_angle(theta + self.start_angle) * (self.radius * SPIRAL_SCALE * theta)
    }

    /// Parent node, `None` for roots.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Center of the fitting circle.
    pub fn center(&self) -> Point {
        self.center
    }

    /// Radius of the fitting circle.
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Direction from this node's center back toward its parent.
    pub fn start_angle(&self) -> f64 {
        self.start_angle
    }

    /// Direction where the curl ends.
    pub fn end_angle(&self) -> f64 {
        self.end_angle
    }

    /// Turning direction of the curl.
    pub fn winding(&self) -> Winding {
        self.winding
    }

    fn clock(&self) -> f64 {
        self.winding.sign()
    }

    /// State and role flags.
    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    /// The node has all its leaves.
    pub fn is_full(&self) -> bool {
        self.flags.contains(NodeFlags::FULL)
    }

    /// A placement on this node failed for good.
    pub fn is_blocked(&self) -> bool {
        self.flags.contains(NodeFlags::BLOCKED)
    }

    /// The node is the mirrored second root.
    pub fn is_twin(&self) -> bool {
        self.flags.contains(NodeFlags::TWIN)
    }

    /// The node has no parent.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// The node is too small to carry leaves.
    pub fn is_too_small(&self, min_radius: f64) -> bool {
        self.radius.round() <= min_radius
    }

    /// The node may still grow leaves.
    pub fn can_grow(&self, min_radius: f64) -> bool {
        !self.is_full() && !self.is_blocked() && !self.is_too_small(min_radius)
    }

    /// Size tier this node was placed in.
    pub fn slot(&self) -> usize {
        self.slot
    }

    /// Extra radial offset from the parent's fitting circle.
    pub fn lift(&self) -> f64 {
        self.lift
    }

    /// Center of the drawn spiral.
    pub fn spiral_center(&self) -> Point {
        self.spiral_center
    }

    /// Center of the offset circle approximating the inner curl.
    pub fn envelope_center(&self) -> Point {
        self.envelope_center
    }

    /// Where the drawn spiral attaches to its parent.
    pub fn start_point(&self) -> Point {
        self.start_point
    }

    /// Leaves in placement order.
    pub fn leaves(&self) -> &[NodeId] {
        &self.leaves
    }

    /// Absolute attachment angle of every leaf.
    pub fn leaf_angles(&self) -> &[f64] {
        &self.leaf_angles
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.leaf_angles.len()
    }

    /// Whether any leaf has been placed.
    pub fn has_leaves(&self) -> bool {
        !self.leaf_angles.is_empty()
    }

    /// Neighbor conflicts recorded by the last fit check.
    pub fn neighbors(&self) -> &[Conflict] {
        &self.neighbors
    }

    /// Cached reading for every boundary edge.
    pub fn edge_readings(&self) -> &[EdgeReading] {
        &self.edges
    }

    pub(crate) fn has_edge_conflict(&self) -> bool {
        self.edges.iter().any(EdgeReading::is_conflict)
    }

    pub(crate) fn last_leaf(&self) -> Option<NodeId> {
        self.leaves.last().copied()
    }

    /// Neighbor with the smallest skin distance.
    pub(crate) fn closest_neighbor(&self) -> Option<&Conflict> {
        self.neighbors
            .iter()
            .min_by(|a, b| a.skin.total_cmp(&b.skin))
    }

    pub(crate) fn neighbor_skin_sum(&self) -> f64 {
        self.neighbors.iter().map(|c| c.skin).sum()
    }

    /// Record `leaf` as the newest leaf and anchor its stalk on this node's spiral.
    pub(crate) fn attach(&mut self, leaf_id: NodeId, leaf: &mut Self, params: &Params) {
        self.leaves.push(leaf_id);
        self.leaf_angles.push(complement_angle(leaf.start_angle));
        leaf.start_point = self.leaf_anchor(leaf, params.init_radius);
    }

    // Angle frames

    /// Absolute `angle` expressed relative to the start angle, in the winding direction.
    pub fn relative(&self, angle: f64) -> f64 {
        normalize_angle(self.clock() * angle - self.clock() * self.start_angle)
    }

    /// Absolute direction reached by walking `arc` back from the start angle.
    pub fn remaining(&self, arc: f64) -> f64 {
        normalize_angle(self.start_angle - self.clock() * arc)
    }

    /// Absolute direction reached by walking `arc` forward from the start angle.
    pub fn absolute(&self, arc: f64) -> f64 {
        normalize_angle(self.start_angle + self.clock() * arc)
    }

    /// First leaf angle of a non-root node: half of the parent's projection onto it.
    pub(crate) fn base_angle(&self, parent_radius: f64) -> f64 {
        self.remaining((parent_radius / (parent_radius + self.radius)).asin())
    }

    pub(crate) fn remaining_arc_after(&self, angle: f64, params: &Params) -> f64 {
        self.relative(angle) - params.end_at
    }

    pub(crate) fn last_leaf_angle(&self, params: &Params) -> f64 {
        self.leaf_angles
            .last()
            .copied()
            .unwrap_or_else(|| self.remaining(params.start_at))
    }

    pub(crate) fn has_room_for(&self, arc: f64, params: &Params) -> bool {
        if !self.can_grow(params.min_radius) {
            return false;
        }
        if !self.has_leaves() {
            return true;
        }
        self.remaining_arc_after(self.last_leaf_angle(params), params) >= arc
    }

    /// Tiny leaves on the inner curl look crowded without a wider gap.
    pub(crate) fn double_the_gap(&self, params: &Params) -> bool {
        self.remaining_arc_after(self.last_leaf_angle(params), params) <= 2.0 / 7.0 * PI
    }

    // Envelope

    /// Approximate distance from the center to the drawn outline in direction `approach`.
    ///
    /// Piecewise: the top of the spiral bulges past the fitting circle, the inner curl pulls
    /// well inside it (except for a lone root), and the base flares into the stalk. Anywhere
    /// else the fitting radius is used.
    pub fn envelope_radius(&self, approach: f64) -> f64 {
        let toward = Vec2::from_angle(approach);
        if self.angle_in_arc(approach, 0.65 * PI, 1.3 * PI) {
            let high = self.center - Vec2::from_angle(self.start_angle) * (0.25 * self.radius);
            return self.center.distance(high + toward * (0.83 * self.radius));
        }
        if !self.flags.contains(NodeFlags::SOLO_ROOT)
            && self.angle_in_arc(approach, 0.001, 0.651 * PI)
        {
            return self
                .center
                .distance(self.envelope_center + toward * (0.75 * self.radius));
        }
        if self.angle_in_arc(approach, 1.75 * PI, TAU - 0.0001) {
            return self
                .center
                .distance(self.spiral_center + toward * (1.175 * self.radius))
                .ceil();
        }
        self.radius.ceil()
    }

    /// Gap between the outlines of two nodes along the line joining their centers.
    pub fn surface_distance(&self, other: &Self) -> f64 {
        let toward_other = angle_to(self.center, other.center);
        let toward_self = complement_angle(toward_other);
        self.center.distance(other.center)
            - (other.envelope_radius(toward_self) + self.envelope_radius(toward_other))
    }

    // Arcs

    pub(crate) fn angle_in_arc(&self, angle: f64, from: f64, to: f64) -> bool {
        let rel = self.relative(angle);
        from < rel && rel < to
    }

    pub(crate) fn angle_in_sprout_range(&self, angle: f64, params: &Params) -> bool {
        self.angle_in_arc(angle, params.sprout_max_angle, params.sprout_angle)
    }

    pub(crate) fn angle_in_slot_range(&self, angle: f64, slot: usize, rules: &Rules<'_>) -> bool {
        let angles = rules.slots.angles();
        let sizes = rules.slots.sizes();
        let (Some(&slot_angle), Some(&slot_size)) = (angles.get(slot), sizes.get(slot)) else {
            return false;
        };
        let mut from = if slot > 0 {
            angles[slot - 1]
        } else {
            rules.params.end_at
        };
        let mut to = slot_angle + 0.5 * slot_size;
        let shift = rules.params.shift;
        if shift != 0.0 {
            from = normalize_angle(from + shift);
            to = normalize_angle(to + shift);
        }
        self.angle_in_arc(angle, from, to)
    }

    /// `angle` lies between the end of the curl and `scan_from`.
    pub(crate) fn angle_in_growth_range(&self, scan_from: f64, angle: f64, params: &Params) -> bool {
        let rel = self.relative(angle);
        params.end_at < rel && rel < self.relative(scan_from)
    }

    // Slots

    pub(crate) fn can_decrease_leaf_arc(&self, rules: &Rules<'_>) -> bool {
        let p = rules.params;
        (!self.is_twin() || p.twin_ratio == 1.0)
            && !p.random_sizes()
            && p.graduated()
            && p.small_to_large()
            && rules.slots.min_mult() < 0.3
    }

    /// Absolute angle for the next leaf, occupying `arc` on each side, placed after `base`.
    ///
    /// When tiers are restricted or shifted and `base` is outside the tier, the tier start
    /// is used instead. Returns `None` when a shifted tier cannot be reached.
    pub(crate) fn next_leaf_angle(
        &self,
        arc: f64,
        base: f64,
        slot: usize,
        rules: &Rules<'_>,
    ) -> Option<f64> {
        let p = rules.params;
        let mut arc = arc;
        let mut base = base;
        let use_slot_base = p.max_leaves < rules.slots.len() || p.random_leaf_count;
        if (use_slot_base || p.shift != 0.0) && !self.angle_in_slot_range(base, slot, rules) {
            let mut slot_base = rules.slots.angles().get(slot).copied().unwrap_or(p.end_at);
            let max_end = TAU - rules.min_root_base;
            let mut end_range = (self.relative(base) + arc.max(0.15)).min(max_end);
            if p.shift != 0.0 {
                slot_base = normalize_angle(slot_base + p.shift);
                if self.is_root() && !self.has_leaves() {
                    end_range = max_end;
                }
            }
            if p.end_at < slot_base && slot_base < end_range {
                base = self.absolute(slot_base);
            } else if p.shift != 0.0 {
                return None;
            }
        }

        if p.graduated() && !p.small_to_large() && self.double_the_gap(p) {
            arc += 2.0 * p.halo;
        }
        if !self.has_leaves() {
            if !self.is_root() {
                arc += p.halo;
            } else if self.can_decrease_leaf_arc(rules) {
                arc *= 0.9;
            }
        }
        Some(normalize_angle(base - self.clock() * arc))
    }

    /// Tier whose range holds `angle`, preferring `orig`.
    pub(crate) fn corrected_slot(&self, angle: f64, orig: usize, rules: &Rules<'_>) -> usize {
        if self.angle_in_slot_range(angle, orig, rules) {
            return orig;
        }
        (0..rules.slots.len())
            .find(|&slot| self.angle_in_slot_range(angle, slot, rules))
            .unwrap_or(orig)
    }

    /// Tier for a leaf placed at the absolute `angle`.
    pub(crate) fn next_leaf_slot_at(&self, angle: f64, max_leaves: usize, rules: &Rules<'_>) -> usize {
        let slots = rules.slots;
        if rules.params.random_leaf_count {
            return self.slot_from_list(max_leaves, slots.len(), rules);
        }
        let next = slots.find_next_slot(self.relative(angle));
        if rules.params.max_leaves < slots.len() {
            let top = slots.max_active();
            if top < next {
                return top;
            }
        }
        next
    }

    /// Tier for the leaf after one in tier `current`.
    pub(crate) fn next_leaf_slot_after(&self, current: usize, max_leaves: usize, rules: &Rules<'_>) -> usize {
        if rules.params.max_leaves < rules.slots.len() || rules.params.random_leaf_count {
            return self.slot_from_list(max_leaves, current, rules);
        }
        current.saturating_sub(1)
    }

    fn slot_from_list(&self, max_leaves: usize, current: usize, rules: &Rules<'_>) -> usize {
        let slots = rules.slots;
        let random = rules.params.random_leaf_count;
        if !self.has_leaves() && !random && current != slots.max_active() {
            return slots.max_active();
        }
        if current == 0 {
            return 0;
        }
        let max_leaves = if max_leaves == 0 { slots.len() } else { max_leaves };
        let next = if random {
            let mut list = slots.slot_list(rules.params, max_leaves);
            list.reverse();
            list.into_iter().find(|&s| s < current)
        } else {
            slots.active().iter().copied().find(|&s| s < current)
        };
        next.unwrap_or(current - 1)
    }

    /// Absolute angle where tier `slot` (or the one below it) starts.
    pub(crate) fn reslot_angle(&self, slot: usize, decrement: bool, rules: &Rules<'_>) -> Option<f64> {
        let slot = if decrement { slot.checked_sub(1)? } else { slot };
        let angle = rules.slots.angles().get(slot)? + rules.params.shift;
        Some(self.absolute(angle))
    }

    // Placement

    /// Move this candidate leaf to direction `angle` around `parent`, re-sizing it if the
    /// tier changes and sizes are graduated.
    pub(crate) fn adjust(
        &mut self,
        parent: &Self,
        angle: f64,
        new_slot: usize,
        rules: &Rules<'_>,
        rng: &mut StdRng,
    ) {
        let p = rules.params;
        if p.graduated() && self.slot != new_slot {
            self.radius = rules
                .slots
                .next_leaf_radius(p, parent.radius, Some(new_slot), rng);
            self.flags.remove(NodeFlags::FULL | NodeFlags::BLOCKED);
        }
        self.slot = new_slot;
        self.lift = parent.lift_for(self.radius, angle, p);
        self.start_angle = complement_angle(angle);
        self.center =
            parent.center + Vec2::from_angle(angle) * (parent.radius + self.radius + self.lift);
        self.refresh(p);

        self.neighbors.clear();
        self.edges.clone_from(&parent.edges);
    }

    /// Radial lift for a leaf of `leaf_radius` at absolute `angle`, so the leaf clears the
    /// part of this node's curl it attaches to.
    pub(crate) fn lift_for(&self, leaf_radius: f64, angle: f64, params: &Params) -> f64 {
        let clock = self.clock();
        let theta = MAX_SPIRAL_ANGLE - normalize_angle(-self.relative(angle));
        let mult = if theta > MAX_SPIRAL_ANGLE - FRAC_PI_3 {
            0.05
        } else {
            0.05 * (theta / FRAC_PI_2 - 2.0).max(0.0)
        };
        let ratio = (self.radius / params.init_radius - leaf_radius / self.radius)
            .max(params.init_radius / self.radius);
        let adj = clock * mult * ratio * theta / MAX_SPIRAL_ANGLE;

        let on_curve = self.spiral_center
            + Vec2::from_angle(clock * theta + clock * adj + self.start_angle)
                * (self.radius * SPIRAL_SCALE * (theta + adj));
        let parent_lift = self.center.distance(on_curve) - self.radius;
        let mut leaf_lift = leaf_radius * 0.123;
        if self.radius < params.min_radius {
            leaf_lift *= 1.1;
        }
        parent_lift + leaf_lift
    }

    /// Point on this node's spiral where `leaf` attaches.
    ///
    /// The drawn spiral drifts from the ideal attachment angle; the correction below was fit
    /// by eye. It vanishes at `4π - 5π/4` and `4π - π/4`, peaks between them, and grows the
    /// other way toward the center of the spiral.
    fn leaf_anchor(&self, leaf: &Self, init: f64) -> Point {
        const INIT_RATIO_FALLBACK: f64 = 1.2;
        let clock = self.clock();
        let toward_leaf = complement_angle(leaf.start_angle);
        let theta = MAX_SPIRAL_ANGLE - normalize_angle(-self.relative(toward_leaf));

        let parent_init = self.radius / init;
        let leaf_init = leaf.radius / init;
        let init_leaf = init / leaf.radius;
        let mut ratio = leaf_init.max(parent_init);
        if ratio < 1.0 {
            ratio = (leaf_init.min(parent_init) + 0.65).max(INIT_RATIO_FALLBACK);
        }

        let low = MAX_SPIRAL_ANGLE - 5.0 * PI / 4.0;
        let high = MAX_SPIRAL_ANGLE - PI / 4.0;
        let mut rate = 0.2;
        let mut angle_ratio = 0.0;
        if (low..=high).contains(&theta) {
            let peak = (theta - low).min(high - theta);
            angle_ratio = 0.1 + peak / FRAC_PI_2;
        } else if theta < low {
            rate = if theta < MAX_SPIRAL_ANGLE - 3.0 * FRAC_PI_2 { 0.02 } else { 0.01 };
            angle_ratio = -(low - theta) / FRAC_PI_2;
            ratio = init_leaf;
        }

        let adj = angle_ratio * rate * ratio;
        self.spiral_center
            + Vec2::from_angle(clock * theta + clock * adj + self.start_angle)
                * (self.radius * SPIRAL_SCALE * (theta + adj))
    }

    /// Direction where a node's first leaf must start so it clears `sibling`, the node
    /// placed right after it on the same parent. `None` if the sibling is too far to matter.
    pub(crate) fn sibling_conflict_angle(&self, sibling: &Self, halo: f64) -> Option<f64> {
        let dist = self.center.distance(sibling.center);
        if dist >= 2.5 * self.radius + sibling.radius {
            return None;
        }
        let toward = angle_to(self.center, sibling.center);
        let sibling_arc = halo + (sibling.radius / dist).asin();
        Some(normalize_angle(toward - self.clock() * sibling_arc))
    }

    /// The sibling placed right after leaf `id`, if both are leaves of this node.
    pub(crate) fn obstructing_sibling(&self, id: NodeId) -> Option<NodeId> {
        let next = NodeId::new(id.index() + 1);
        (self.leaves.contains(&id) && self.leaves.contains(&next)).then_some(next)
    }

    /// Half the angular footprint of a leaf of `leaf_radius` on this node.
    pub(crate) fn leaf_arc(&self, leaf_radius: f64) -> f64 {
        tangent_half_angle(self.radius, leaf_radius)
    }

    // Points

    /// Points along the drawn double spiral, ending at the stalk anchor.
    pub fn spiral_points(&self) -> SpiralPoints {
        SpiralPoints {
            center: self.spiral_center,
            start_angle: self.start_angle,
            clock: self.clock(),
            scale: self.radius * SPIRAL_SCALE,
            anchor: self.start_point,
            step: 0,
            done: false,
        }
    }

    /// Points along the envelope outline, one every 0.1 rad.
    pub fn envelope_points(&self) -> EnvelopePoints<'_> {
        EnvelopePoints { node: self, step: 0 }
    }
}

fn step_angle(step: u32) -> f64 {
    f64::from(step) * POINT_STEP
}

/// Iterator over [`Node::spiral_points`].
#[derive(Clone, Debug)]
pub struct SpiralPoints {
    center: Point,
    start_angle: f64,
    clock: f64,
    scale: f64,
    anchor: Point,
    step: u32,
    done: bool,
}

impl Iterator for SpiralPoints {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        if self.done {
            return None;
        }
        let theta = step_angle(self.step);
        if theta < MAX_SPIRAL_ANGLE - 0.1 {
            self.step += 1;
            let dir = Vec2::from_angle(self.clock * theta + self.start_angle);
            return Some(self.center + dir * (self.scale * theta));
        }
        self.done = true;
        Some(self.anchor)
    }
}

/// Iterator over [`Node::envelope_points`].
#[derive(Clone, Debug)]
pub struct EnvelopePoints<'a> {
    node: &'a Node,
    step: u32,
}

impl Iterator for EnvelopePoints<'_> {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        let theta = step_angle(self.step);
        if theta >= TAU {
            return None;
        }
        self.step += 1;
        let approach = self.node.remaining(theta);
        let r = self.node.envelope_radius(approach);
        Some(self.node.center + Vec2::from_angle(approach) * r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScrollConfig;
    use rand::SeedableRng;

    const EPS: f64 = 1e-9;

    fn params(twin: bool) -> Params {
        let config = ScrollConfig {
            twin,
            ..ScrollConfig::default()
        };
        Params::resolve(&config, &mut StdRng::seed_from_u64(0)).unwrap()
    }

    fn root(p: &Params) -> Node {
        Node::new_root(Point::ORIGIN, 50.0, 0.0, false, p)
    }

    #[test]
    fn root_geometry() {
        let p = params(false);
        let r = root(&p);
        assert_eq!(r.winding(), Winding::Positive);
        assert!(r.flags().contains(NodeFlags::SOLO_ROOT));
        assert!((r.end_angle() - p.end_at).abs() < EPS);
        assert!((r.spiral_center().distance(r.center()) - 50.0 / TAU).abs() < EPS);
        assert!(r.is_root());
        assert!(r.can_grow(p.min_radius));
    }

    #[test]
    fn leaves_flip_winding_and_touch_the_parent() {
        let p = params(true);
        let parent = Node::new_root(Point::ORIGIN, 50.0, 0.0, false, &p);
        assert!(!parent.flags().contains(NodeFlags::SOLO_ROOT), "twin config");
        let leaf = Node::new_leaf(&parent, NodeId::new(0), 30.0, 1.0, 2, 4.0, &p);
        assert_eq!(leaf.winding(), Winding::Negative);
        assert_eq!(leaf.parent(), Some(NodeId::new(0)));
        assert!((leaf.center().distance(parent.center()) - 84.0).abs() < EPS);
        assert!((leaf.start_angle() - complement_angle(1.0)).abs() < EPS);
        assert!((leaf.end_angle() - normalize_angle(leaf.start_angle() - p.end_at)).abs() < EPS);
    }

    #[test]
    fn angle_frames_agree() {
        let p = params(true);
        let parent = root(&p);
        let leaf = Node::new_leaf(&parent, NodeId::new(0), 30.0, 2.0, 0, 0.0, &p);
        for node in [&parent, &leaf] {
            for arc in [0.1, 1.0, 3.0, 5.5] {
                assert!(
                    (node.relative(node.absolute(arc)) - arc).abs() < EPS,
                    "relative undoes absolute for {arc}"
                );
                let back = node.remaining(arc);
                assert!(
                    (node.relative(back) - (TAU - arc)).abs() < EPS,
                    "remaining walks backwards for {arc}"
                );
            }
        }
    }

    #[test]
    fn envelope_regions() {
        let p = params(false);
        let r = root(&p);
        // Top of the spiral bulges past the fitting circle.
        let top = r.envelope_radius(r.absolute(PI));
        assert!((top - 1.08 * 50.0).abs() < 1e-6, "bulge radius {top}");
        // A lone root has no inner-curl pull.
        assert_eq!(r.envelope_radius(r.absolute(0.3)), 50.0);
        let stalk = r.envelope_radius(r.absolute(1.8 * PI));
        assert_eq!(stalk, stalk.ceil(), "stalk radius is rounded up");

        let twin_cfg = params(true);
        let curled = root(&twin_cfg);
        assert!(
            curled.envelope_radius(curled.absolute(0.3)) < 50.0,
            "inner curl sits inside the fitting circle"
        );
    }

    #[test]
    fn point_sequences() {
        let p = params(false);
        let r = root(&p);
        let spiral: Vec<Point> = r.spiral_points().collect();
        assert_eq!(spiral.len(), 126);
        assert_eq!(spiral.first(), Some(&r.spiral_center()));
        assert_eq!(spiral.last(), Some(&r.start_point()));
        assert_eq!(r.envelope_points().count(), 63);
        assert_eq!(
            r.spiral_points().count(),
            126,
            "iteration restarts from the node"
        );
    }

    #[test]
    fn surface_distance_between_far_nodes() {
        let p = params(true);
        let a = Node::new_root(Point::ORIGIN, 50.0, 0.0, false, &p);
        let b = Node::new_root(Point::new(400.0, 0.0), 50.0, PI, true, &p);
        let gap = a.surface_distance(&b);
        assert!(gap > 250.0 && gap < 320.0, "gap {gap}");
        assert!((gap - b.surface_distance(&a)).abs() < EPS, "symmetric");
    }

    #[test]
    fn attach_records_leaf_and_anchor() {
        let p = params(true);
        let mut parent = root(&p);
        let mut leaf = Node::new_leaf(&parent, NodeId::new(0), 35.0, 2.5, 1, 3.0, &p);
        parent.attach(NodeId::new(1), &mut leaf, &p);
        assert_eq!(parent.leaves(), &[NodeId::new(1)]);
        assert!((parent.leaf_angles()[0] - 2.5).abs() < EPS);
        assert!(
            leaf.start_point().distance(parent.spiral_center()) < 2.0 * parent.radius(),
            "anchor lies on the parent spiral"
        );
        assert_eq!(parent.obstructing_sibling(NodeId::new(1)), None);
    }

    #[test]
    fn lift_is_finite() {
        let p = params(true);
        let r = root(&p);
        for angle in [0.5, 2.0, 4.0, 6.0] {
            let lift = r.lift_for(30.0, angle, &p);
            assert!(lift.is_finite(), "lift at {angle}");
        }
    }
}
