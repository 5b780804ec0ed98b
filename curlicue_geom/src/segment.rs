// Copyright 2025 the Curlicue Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point, segment, and circle proximity tests.

use kurbo::{Point, Vec2};

use crate::angle::angle_to;

/// Turn direction of an ordered point triple.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Turn {
    /// The three points lie on one line.
    Collinear,
    /// `p → q → r` turns clockwise (in y-up coordinates).
    Clockwise,
    /// `p → q → r` turns counter-clockwise (in y-up coordinates).
    CounterClockwise,
}

/// Classify the turn made by `p → q → r`.
pub fn orientation(p: Point, q: Point, r: Point) -> Turn {
    let val = (q.y - p.y) * (r.x - q.x) - (q.x - p.x) * (r.y - q.y);
    if val == 0.0 {
        Turn::Collinear
    } else if val > 0.0 {
        Turn::Clockwise
    } else {
        Turn::CounterClockwise
    }
}

/// Whether segment `a-b` properly crosses segment `c-d`.
///
/// Only the general orientation case is considered: collinear configurations are treated as
/// non-intersecting.
pub fn segments_intersect(a: Point, b: Point, c: Point, d: Point) -> bool {
    let o1 = orientation(a, b, c);
    let o2 = orientation(a, b, d);
    let o3 = orientation(c, d, a);
    let o4 = orientation(c, d, b);
    o1 != o2 && o3 != o4
}

/// Distance from `e` to segment `a-b`, together with the closest point on the segment.
///
/// The closest point is `b` when `AB·BE > 0`, `a` when `AB·AE < 0`, and otherwise the
/// perpendicular foot, whose distance is `|AB × AE| / |AB|`.
pub fn point_to_segment_distance(a: Point, b: Point, e: Point) -> (f64, Point) {
    let ab = b - a;
    let be = e - b;
    let ae = e - a;
    if ab.dot(be) > 0.0 {
        return (e.distance(b), b);
    }
    if ab.dot(ae) < 0.0 {
        return (e.distance(a), a);
    }
    let len_sq = ab.hypot2();
    if len_sq == 0.0 {
        return (e.distance(a), a);
    }
    let dist = (ab.cross(ae) / len_sq.sqrt()).abs();
    let t = ab.dot(ae) / len_sq;
    (dist, a + ab * t)
}

/// Signed side of `e` relative to the directed line `a → b`: positive on the left.
pub fn side_of_line(a: Point, b: Point, e: Point) -> f64 {
    (b - a).cross(e - a)
}

/// Distance from `point` to the nearest point on the circle, and that point.
///
/// The nearest point is found by projecting from `center` along the direction to `point`.
pub fn point_to_circle_distance(center: Point, radius: f64, point: Point) -> (f64, Point) {
    let toward = angle_to(center, point);
    let on_circle = center + Vec2::from_angle(toward) * radius;
    (point.distance(on_circle), on_circle)
}
