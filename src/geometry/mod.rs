// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - primitives, containment, polygon topology and booleans

mod bbox;
mod boolean;
pub mod clipper;
pub mod containment;
mod halfedge;
mod line;
mod plane;
mod polygon;
mod polyline;
mod ray;
pub mod solid;
mod transform;
mod trim;
mod vector;

pub use bbox::BoundingBox;
pub use boolean::{boolean_two_sets, BooleanOperation, VoidTreatment};
pub use clipper::{to_clipper_path, to_polygon, ClipperPath, IntPoint};
pub use containment::Containment;
pub use halfedge::{DirectedEdge, EdgeTag, HalfEdgeGraph2d};
pub use line::Line;
pub use plane::{Plane, PlaneClassification};
pub use polygon::Polygon;
pub use polyline::{Curve, Polyline};
pub use ray::Ray;
pub use solid::{FacetKernel, Profile, Solid, SolidFace, SolidKernel, Sweep};
pub use transform::Transform;
pub use vector::{
    are_collinear, are_coplanar, newell_normal, validate_finite, PointExt, VectorExt, EPSILON,
};
