// Copyright 2025 the Curlicue Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Angle arithmetic and the tangent-circle relations used to size and space leaves.
//!
//! All angles are radians. Functions that return an absolute direction normalize it into
//! `[0, 2π)`; relative arcs (half-widths, fractions) are returned as-is.

use core::f64::consts::{PI, TAU};

use kurbo::Point;

/// Wrap an angle into `[0, 2π)` by adding or subtracting whole turns.
///
/// Non-finite input is returned unchanged.
pub fn normalize_angle(angle: f64) -> f64 {
    if !angle.is_finite() {
        return angle;
    }
    let wrapped = angle.rem_euclid(TAU);
    // `rem_euclid` rounds tiny negative inputs up to exactly TAU.
    if wrapped >= TAU { 0.0 } else { wrapped }
}

/// Direction from `from` to `to`, normalized into `[0, 2π)`.
pub fn angle_to(from: Point, to: Point) -> f64 {
    normalize_angle((to - from).atan2())
}

/// The collinear direction pointing the opposite way.
pub fn complement_angle(angle: f64) -> f64 {
    normalize_angle(angle - PI)
}

/// Euclidean distance between two points.
///
/// Axis-aligned pairs produce the same result as the general formula, so there is no
/// special case here.
pub fn distance(p: Point, q: Point) -> f64 {
    p.distance(q)
}

/// Half of the angular footprint of a leaf of radius `leaf_radius` externally tangent to a
/// parent of radius `parent_radius`, as seen from the parent's center.
///
/// `asin(leaf / (parent + leaf))`
pub fn tangent_half_angle(parent_radius: f64, leaf_radius: f64) -> f64 {
    (leaf_radius / (parent_radius + leaf_radius)).asin()
}

/// Inverse of [`tangent_half_angle`] for a unit parent: the relative radius of a tangent
/// circle whose full angular footprint is `fraction`.
///
/// `sin(f/2) / (1 - sin(f/2))`
pub fn radius_for_angular_fraction(fraction: f64) -> f64 {
    let s = (fraction / 2.0).sin();
    s / (1.0 - s)
}

/// Ratio of the larger to the smaller radius, never below `1`.
pub fn radius_ratio(a: f64, b: f64) -> f64 {
    let ratio = a.max(b) / a.min(b);
    if ratio > 1.0 { ratio } else { 1.0 }
}

/// Rotation around a parent that brings a leaf tangent to a boundary point.
///
/// Right triangle with hypotenuse `parent_radius + leaf_radius + lift` (parent center to
/// leaf center) and adjacent side `|edge_point - parent_center| - leaf_radius - buffer`.
/// Returns `None` when the adjacent side is at least as long as the hypotenuse (the leaf
/// already clears the edge, so there is nothing to rotate toward) or when the ratio drops below `0.1`, which would mean a rotation close
/// to a right angle.
pub fn edge_fit_arc(
    edge_point: Point,
    parent_center: Point,
    parent_radius: f64,
    leaf_radius: f64,
    lift: f64,
    buffer: f64,
) -> Option<f64> {
    let hypotenuse = parent_radius + leaf_radius + lift;
    let adjacent = distance(edge_point, parent_center) - leaf_radius - buffer;
    if adjacent >= hypotenuse {
        return None;
    }
    let ratio = adjacent / hypotenuse;
    if ratio.is_nan() || ratio < 0.1 {
        return None;
    }
    Some(ratio.acos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f64::consts::FRAC_PI_2;

    const EPS: f64 = 1e-9;

    #[test]
    fn normalize_wraps_both_directions() {
        assert!((normalize_angle(-FRAC_PI_2) - 3.0 * FRAC_PI_2).abs() < EPS);
        assert!((normalize_angle(5.0 * PI) - PI).abs() < EPS);
        assert!((normalize_angle(-7.0 * TAU + 1.0) - 1.0).abs() < EPS);
        assert_eq!(normalize_angle(TAU), 0.0, "a full turn maps to zero");
        let tiny = normalize_angle(-1e-18);
        assert!((0.0..TAU).contains(&tiny), "result must stay in [0, 2π): {tiny}");
    }

    #[test]
    fn angle_to_and_complement() {
        let o = Point::new(0.0, 0.0);
        assert!((angle_to(o, Point::new(0.0, 1.0)) - FRAC_PI_2).abs() < EPS);
        assert!((angle_to(o, Point::new(0.0, -1.0)) - 3.0 * FRAC_PI_2).abs() < EPS);
        assert!((complement_angle(FRAC_PI_2) - 3.0 * FRAC_PI_2).abs() < EPS);
        assert!((complement_angle(PI) - 0.0).abs() < EPS);
    }

    #[test]
    fn distance_matches_axis_aligned_shortcut() {
        let a = Point::new(3.0, 4.0);
        assert_eq!(distance(a, Point::new(3.0, 10.0)), 6.0);
        assert_eq!(distance(a, Point::new(-2.0, 4.0)), 5.0);
        assert!((distance(Point::ZERO, a) - 5.0).abs() < EPS);
    }

    #[test]
    fn tangent_relations_are_inverse() {
        for fraction in [0.2, 0.5, 0.9, 1.4] {
            let mult = radius_for_angular_fraction(fraction);
            let half = tangent_half_angle(1.0, mult);
            assert!(
                (2.0 * half - fraction).abs() < 1e-9,
                "fraction {fraction} should round-trip, got {}",
                2.0 * half
            );
        }
        // Equal circles subtend 60 degrees on each side.
        assert!((tangent_half_angle(10.0, 10.0) - PI / 6.0).abs() < EPS);
    }

    #[test]
    fn radius_ratio_is_at_least_one() {
        assert_eq!(radius_ratio(2.0, 8.0), 4.0);
        assert_eq!(radius_ratio(8.0, 2.0), 4.0);
        assert_eq!(radius_ratio(5.0, 5.0), 1.0);
    }

    #[test]
    fn edge_fit_arc_rejects_degenerate_triangles() {
        let parent = Point::new(0.0, 0.0);
        // Edge far away: leaf can never reach it.
        assert!(edge_fit_arc(Point::new(500.0, 0.0), parent, 50.0, 20.0, 5.0, 5.0).is_none());
        // Leaf just touches the edge head on: a zero rotation is no adjustment.
        assert!(edge_fit_arc(Point::new(100.0, 0.0), parent, 50.0, 20.0, 5.0, 5.0).is_none());
        // Edge right on the parent: would need to rotate past 90 degrees.
        assert!(edge_fit_arc(Point::new(26.0, 0.0), parent, 50.0, 20.0, 5.0, 5.0).is_none());
        let arc = edge_fit_arc(Point::new(80.0, 0.0), parent, 50.0, 20.0, 5.0, 5.0)
            .expect("edge within reach yields a rotation");
        let expected = ((80.0_f64 - 20.0 - 5.0) / 75.0).acos();
        assert!((arc - expected).abs() < EPS);
    }
}
