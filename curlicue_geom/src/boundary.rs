// Copyright 2025 the Curlicue Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounding regions: a polygon, or the inscribed circle that replaces a many-sided polygon.

use core::fmt;

use kurbo::{Circle, Line, Point, Rect, Vec2};
use thiserror::Error;

use crate::segment::{
    point_to_circle_distance, point_to_segment_distance, segments_intersect, side_of_line,
};

/// Polygons with more edges than this are approximated by a single circle.
pub const MAX_STRAIGHT_EDGES: usize = 8;

/// Reasons a vertex list cannot form a [`Boundary`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BoundaryError {
    /// A region needs at least three vertices.
    #[error("boundary needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),
    /// A vertex has a NaN or infinite coordinate.
    #[error("boundary vertex #{index} is not finite: ({x}, {y})")]
    NonFiniteVertex {
        /// Position of the vertex in the input list.
        index: usize,
        /// X coordinate as given.
        x: f64,
        /// Y coordinate as given.
        y: f64,
    },
    /// The vertices enclose no area, so there is no centroid.
    #[error("boundary polygon has zero area")]
    ZeroArea,
}

/// Nearest point of an edge to some query point, with the signed distance to it.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EdgeContact {
    /// Distance to the edge; positive on the interior side, negative outside.
    pub distance: f64,
    /// Closest point on the edge.
    pub point: Point,
}

/// One edge of a [`Boundary`].
///
/// Straight segments are stored with the interior on their left.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Edge {
    /// A straight polygon side.
    Segment(Line),
    /// The single circular edge of a polygon that was converted to a circle.
    Circle(Circle),
}

impl Edge {
    /// Closest point of the edge to `point` and the signed distance to it.
    pub fn contact(&self, point: Point) -> EdgeContact {
        match self {
            Self::Segment(line) => {
                let (dist, closest) = point_to_segment_distance(line.p0, line.p1, point);
                let side = side_of_line(line.p0, line.p1, point);
                let distance = if side < 0.0 { -dist } else { dist };
                EdgeContact {
                    distance,
                    point: closest,
                }
            }
            Self::Circle(circle) => {
                let (dist, closest) = point_to_circle_distance(circle.center, circle.radius, point);
                let inside = point.distance(circle.center) <= circle.radius;
                EdgeContact {
                    distance: if inside { dist } else { -dist },
                    point: closest,
                }
            }
        }
    }

    /// Whether travelling from `from` to `to` leaves the region through this edge.
    ///
    /// For a circular edge this is true as soon as either endpoint is on or past the rim.
    pub fn crosses(&self, from: Point, to: Point) -> bool {
        match self {
            Self::Segment(line) => segments_intersect(line.p0, line.p1, from, to),
            Self::Circle(circle) => {
                from.distance(circle.center) >= circle.radius
                    || to.distance(circle.center) >= circle.radius
            }
        }
    }

    /// Unit direction pointing into the region from the edge near `at`.
    pub fn inward_normal(&self, at: Point) -> Vec2 {
        let v = match self {
            Self::Segment(line) => {
                let d = line.p1 - line.p0;
                Vec2::new(-d.y, d.x)
            }
            Self::Circle(circle) => circle.center - at,
        };
        let len = v.hypot();
        if len > 0.0 { v / len } else { Vec2::ZERO }
    }
}

/// Region that nodes must stay inside.
///
/// Built from an ordered vertex list with consistent winding. Centroid and area come from
/// the shoelace sum. When the polygon has more than [`MAX_STRAIGHT_EDGES`] edges, every edge
/// is replaced by one circle around the centroid whose radius is the smallest
/// vertex-to-centroid distance, so per-placement edge checks stay O(1).
#[derive(Clone, Debug, PartialEq)]
pub struct Boundary {
    vertices: Vec<Point>,
    centroid: Point,
    signed_area: f64,
    edges: Vec<Edge>,
    inscribed: Option<Circle>,
}

impl Boundary {
    /// Build a boundary from its vertices in order.
    pub fn new(vertices: impl IntoIterator<Item = Point>) -> Result<Self, BoundaryError> {
        let vertices: Vec<Point> = vertices.into_iter().collect();
        if vertices.len() < 3 {
            return Err(BoundaryError::TooFewVertices(vertices.len()));
        }
        if let Some((index, v)) = vertices.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(BoundaryError::NonFiniteVertex {
                index,
                x: v.x,
                y: v.y,
            });
        }

        let mut twice_area = 0.0;
        let mut partial_x = 0.0;
        let mut partial_y = 0.0;
        let mut last = vertices[vertices.len() - 1];
        for &v in &vertices {
            let cross = last.x * v.y - v.x * last.y;
            twice_area += cross;
            partial_x += cross * (last.x + v.x);
            partial_y += cross * (last.y + v.y);
            last = v;
        }
        let signed_area = 0.5 * twice_area;
        if signed_area == 0.0 || !signed_area.is_finite() {
            return Err(BoundaryError::ZeroArea);
        }
        let k = 1.0 / (6.0 * signed_area);
        let centroid = Point::new(k * partial_x, k * partial_y);

        let mut boundary = Self {
            vertices,
            centroid,
            signed_area,
            edges: Vec::new(),
            inscribed: None,
        };
        if boundary.vertices.len() > MAX_STRAIGHT_EDGES {
            boundary.become_circular();
        } else {
            boundary.edges = boundary.straight_edges();
        }
        Ok(boundary)
    }

    /// Boundary matching an axis-aligned rectangle.
    pub fn from_rect(rect: Rect) -> Result<Self, BoundaryError> {
        Self::new([
            Point::new(rect.x0, rect.y0),
            Point::new(rect.x0, rect.y1),
            Point::new(rect.x1, rect.y1),
            Point::new(rect.x1, rect.y0),
        ])
    }

    fn straight_edges(&self) -> Vec<Edge> {
        let n = self.vertices.len();
        (0..n)
            .map(|i| {
                let a = self.vertices[(i + n - 1) % n];
                let b = self.vertices[i];
                // Keep the interior on the left of every segment.
                if self.signed_area > 0.0 {
                    Edge::Segment(Line::new(a, b))
                } else {
                    Edge::Segment(Line::new(b, a))
                }
            })
            .collect()
    }

    fn become_circular(&mut self) {
        let radius = self
            .vertices
            .iter()
            .map(|v| v.distance(self.centroid))
            .fold(f64::INFINITY, f64::min);
        let circle = Circle::new(self.centroid, radius);
        self.edges = vec![Edge::Circle(circle)];
        self.inscribed = Some(circle);
    }

    /// Vertices as given.
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Area centroid of the polygon.
    pub fn centroid(&self) -> Point {
        self.centroid
    }

    /// Enclosed area (always positive).
    pub fn area(&self) -> f64 {
        self.signed_area.abs()
    }

    /// Shoelace area; its sign reflects the winding of the vertex list.
    pub fn signed_area(&self) -> f64 {
        self.signed_area
    }

    /// Edges checked during placement.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// The circle standing in for the polygon, if it was converted.
    pub fn inscribed_circle(&self) -> Option<Circle> {
        self.inscribed
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, v) in self.vertices.iter().enumerate() {
            writeln!(f, "vertex #{idx}: ({:.0}, {:.0})", v.x, v.y)?;
        }
        for (idx, edge) in self.edges.iter().enumerate() {
            if let Edge::Segment(line) = edge {
                writeln!(
                    f,
                    "edge #{idx}: ({:.0}, {:.0}), ({:.0}, {:.0})",
                    line.p0.x, line.p0.y, line.p1.x, line.p1.y
                )?;
            }
        }
        if let Some(circle) = self.inscribed {
            writeln!(
                f,
                "polygon converted to a circle with center ({:.0}, {:.0}) and radius {:.0}",
                circle.center.x, circle.center.y, circle.radius
            )?;
        }
        Ok(())
    }
}
