// Copyright 2025 the Curlicue Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Curlicue Geom: plane geometry for packing tangent circles inside a region.
//!
//! This crate holds the closed-form pieces that the Curlicue growth engine builds on:
//!
//! - [`angle`]: angle normalization and the tangent-circle relations that size leaves
//!   and space them around a parent.
//! - [`segment`]: orientation, segment crossing, and point-to-segment/circle distances.
//! - [`boundary`]: the region nodes must stay inside, with centroid, signed edge distances,
//!   and automatic conversion of many-sided polygons to a circle.
//!
//! Geometry types come from [`kurbo`]; nothing here allocates per query.
//!
//! # Example
//!
//! ```rust
//! use curlicue_geom::{Boundary, kurbo::{Point, Rect}};
//!
//! let region = Boundary::from_rect(Rect::new(0.0, 0.0, 400.0, 300.0)).unwrap();
//! assert!((region.centroid() - Point::new(200.0, 150.0)).hypot() < 1e-9);
//!
//! // Signed distances are positive on the inside.
//! let nearest = region
//!     .edges()
//!     .iter()
//!     .map(|e| e.contact(Point::new(390.0, 150.0)).distance)
//!     .fold(f64::INFINITY, f64::min);
//! assert!((nearest - 10.0).abs() < 1e-9);
//! ```

pub mod angle;
pub mod boundary;
pub mod segment;

pub use angle::{
    angle_to, complement_angle, distance, edge_fit_arc, normalize_angle,
    radius_for_angular_fraction, radius_ratio, tangent_half_angle,
};
pub use boundary::{Boundary, BoundaryError, Edge, EdgeContact, MAX_STRAIGHT_EDGES};
pub use kurbo;
pub use segment::{
    Turn, orientation, point_to_circle_distance, point_to_segment_distance, segments_intersect,
    side_of_line,
};
