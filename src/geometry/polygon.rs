// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Closed planar polygons
//!
//! Construction validates the vertex loop unless validation is globally
//! switched off through [`crate::config::set_validation_enabled`].

use super::containment::{self, Containment};
use super::plane::Plane;
use super::polyline::{remove_sequential_duplicates, Curve};
use super::transform::Transform;
use super::vector::{are_coplanar, newell_normal, validate_finite, VectorExt, EPSILON};
use crate::config::validation_enabled;
use crate::error::GeometryError;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Closed loop of at least three coplanar vertices.
///
/// The closing segment is implicit; the first vertex is never repeated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point3<f64>>", into = "Vec<Point3<f64>>")]
pub struct Polygon {
    vertices: Vec<Point3<f64>>,
}

impl Polygon {
    /// Create a polygon from an ordered vertex loop.
    ///
    /// Sequential duplicates (including a repeated first vertex) and
    /// zero-width spikes are removed before the loop is checked for
    /// coplanarity and self-intersection.
    pub fn new(vertices: Vec<Point3<f64>>) -> Result<Self, GeometryError> {
        if !validation_enabled() {
            return Ok(Self { vertices });
        }
        for v in &vertices {
            validate_finite(v)?;
        }

        let vertices = remove_spikes(remove_sequential_duplicates(vertices, true));
        if vertices.len() < 3 {
            return Err(GeometryError::TooFewVertices(vertices.len()));
        }
        if !are_coplanar(&vertices) {
            return Err(GeometryError::NotCoplanar);
        }

        let polygon = Self { vertices };
        let segments = polygon.segments();
        let n = segments.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let adjacent = j == i + 1 || (i == 0 && j == n - 1);
                if adjacent {
                    continue;
                }
                let (a, b) = (&segments[i], &segments[j]);
                if a.intersects(b, true).is_some() || a.overlaps(b) {
                    return Err(GeometryError::SelfIntersecting(i, j));
                }
            }
        }
        Ok(polygon)
    }

    /// Axis-aligned rectangle in the plane `z = origin.z`, wound
    /// counter-clockwise
    pub fn rectangle(origin: Point3<f64>, width: f64, depth: f64) -> Result<Self, GeometryError> {
        Self::new(vec![
            origin,
            origin + Vector3::new(width, 0.0, 0.0),
            origin + Vector3::new(width, depth, 0.0),
            origin + Vector3::new(0.0, depth, 0.0),
        ])
    }

    /// Unit normal by Newell's method; counter-clockwise winding about it
    pub fn normal(&self) -> Vector3<f64> {
        newell_normal(&self.vertices)
    }

    pub fn plane(&self) -> Plane {
        Plane {
            origin: self.vertices[0],
            normal: self.normal(),
        }
    }

    pub fn area(&self) -> f64 {
        let mut sum = Vector3::zeros();
        for (i, a) in self.vertices.iter().enumerate() {
            let b = &self.vertices[(i + 1) % self.vertices.len()];
            sum += a.coords.cross(&b.coords);
        }
        sum.norm() / 2.0
    }

    /// Vertex average
    pub fn center(&self) -> Point3<f64> {
        let sum = self
            .vertices
            .iter()
            .fold(Vector3::zeros(), |acc, v| acc + v.coords);
        Point3::from(sum / self.vertices.len() as f64)
    }

    /// Clockwise when viewed from +Z (shoelace sign)
    pub fn is_clockwise(&self) -> bool {
        let mut sum = 0.0;
        for (i, a) in self.vertices.iter().enumerate() {
            let b = &self.vertices[(i + 1) % self.vertices.len()];
            sum += (b.x - a.x) * (b.y + a.y);
        }
        sum > 0.0
    }

    pub fn reversed(&self) -> Self {
        let mut vertices = self.vertices.clone();
        vertices.reverse();
        Self { vertices }
    }

    pub fn transformed(&self, transform: &Transform) -> Self {
        Self {
            vertices: self.vertices.iter().map(|v| transform.apply_point(v)).collect(),
        }
    }

    pub fn translated(&self, offset: Vector3<f64>) -> Self {
        Self {
            vertices: self.vertices.iter().map(|v| v + offset).collect(),
        }
    }

    /// Frame at the first vertex whose local XY plane is this polygon's plane
    pub fn local_frame(&self) -> Transform {
        Transform::from_origin_and_normal(self.vertices[0], self.normal())
    }

    /// Winding-number containment that also accepts points off the
    /// polygon's plane (always `Outside`)
    pub fn contains_3d(&self, point: &Point3<f64>) -> (bool, Containment) {
        if self.plane().signed_distance_to(point).abs() > EPSILON {
            return (false, Containment::Outside);
        }
        let Some(to_local) = self.local_frame().inverted() else {
            return (false, Containment::Outside);
        };
        let local: Vec<Point3<f64>> = self
            .vertices
            .iter()
            .map(|v| to_local.apply_point(v))
            .collect();
        let edges = containment::ring_edges(&local);
        containment::contains(&edges, &to_local.apply_point(point))
    }

    /// Aggregate classification of every vertex of `other`
    pub fn contains_polygon_3d(&self, other: &Polygon) -> Containment {
        containment::aggregate(other.vertices.iter().map(|v| self.contains_3d(v).1))
    }
}

impl Curve for Polygon {
    fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    fn is_closed(&self) -> bool {
        true
    }
}

impl TryFrom<Vec<Point3<f64>>> for Polygon {
    type Error = GeometryError;

    fn try_from(vertices: Vec<Point3<f64>>) -> Result<Self, Self::Error> {
        Self::new(vertices)
    }
}

impl From<Polygon> for Vec<Point3<f64>> {
    fn from(polygon: Polygon) -> Self {
        polygon.vertices
    }
}

/// Remove vertices whose incoming and outgoing edges are anti-parallel,
/// repeating until none remain
fn remove_spikes(mut vertices: Vec<Point3<f64>>) -> Vec<Point3<f64>> {
    remove_spikes_within(&mut vertices, EPSILON);
    vertices
}

/// Spike removal with an explicit tolerance on `dot(incoming, outgoing) + 1`
pub(crate) fn remove_spikes_within(vertices: &mut Vec<Point3<f64>>, tolerance: f64) {
    loop {
        let n = vertices.len();
        if n < 3 {
            return;
        }
        let spike = (0..n).find(|&i| {
            let prev = vertices[(i + n - 1) % n];
            let next = vertices[(i + 1) % n];
            let incoming = (vertices[i] - prev).unitized();
            let outgoing = (next - vertices[i]).unitized();
            incoming.dot(&outgoing) + 1.0 < tolerance
        });
        match spike {
            Some(i) => {
                vertices.remove(i);
                let deduped = remove_sequential_duplicates(std::mem::take(vertices), true);
                *vertices = deduped;
            }
            None => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64) -> Point3<f64> {
        Point3::new(x, y, 0.0)
    }

    fn square() -> Polygon {
        Polygon::new(vec![p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(0.0, 10.0)]).unwrap()
    }

    #[test]
    fn test_construction_drops_duplicates() {
        let polygon = Polygon::new(vec![
            p(0.0, 0.0),
            p(10.0, 0.0),
            p(10.0, 0.0),
            p(10.0, 10.0),
            p(0.0, 10.0),
            p(0.0, 0.0),
        ])
        .unwrap();
        assert_eq!(polygon.vertices().len(), 4);
    }

    #[test]
    fn test_spike_removed() {
        // (10,5) -> (15,5) -> (10,5) is a zero-width spike
        let polygon = Polygon::new(vec![
            p(0.0, 0.0),
            p(10.0, 0.0),
            p(10.0, 5.0),
            p(15.0, 5.0),
            p(10.0, 5.0),
            p(10.0, 10.0),
            p(0.0, 10.0),
        ])
        .unwrap();
        assert_eq!(polygon.vertices().len(), 5);
        assert_relative_eq!(polygon.area(), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_invalid_polygons() {
        assert_eq!(
            Polygon::new(vec![p(0.0, 0.0), p(1.0, 0.0)]),
            Err(GeometryError::TooFewVertices(2))
        );
        assert_eq!(
            Polygon::new(vec![
                p(0.0, 0.0),
                p(1.0, 0.0),
                Point3::new(1.0, 1.0, 1.0),
                p(0.0, 1.0),
            ]),
            Err(GeometryError::NotCoplanar)
        );
        // Bow tie
        assert!(matches!(
            Polygon::new(vec![p(0.0, 0.0), p(10.0, 10.0), p(10.0, 0.0), p(0.0, 10.0)]),
            Err(GeometryError::SelfIntersecting(_, _))
        ));
        // Retraces part of its first edge along y = 0
        assert!(matches!(
            Polygon::new(vec![
                p(0.0, 0.0),
                p(10.0, 0.0),
                p(10.0, 5.0),
                p(15.0, 5.0),
                p(15.0, 0.0),
                p(5.0, 0.0),
                p(5.0, -5.0),
                p(0.0, -5.0),
            ]),
            Err(GeometryError::SelfIntersecting(_, _))
        ));
        assert!(matches!(
            Polygon::new(vec![p(0.0, 0.0), p(f64::INFINITY, 0.0), p(0.0, 1.0)]),
            Err(GeometryError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_winding_consistency() {
        let polygon =
            Polygon::new(vec![p(0.0, 0.0), p(0.0, 10.0), p(10.0, 10.0), p(10.0, 0.0)]).unwrap();
        assert_eq!(polygon.is_clockwise(), !polygon.reversed().is_clockwise());
        assert!(polygon.is_clockwise());
        assert!(!square().is_clockwise());
    }

    #[test]
    fn test_normal_area_center() {
        let polygon = square();
        assert_relative_eq!(polygon.normal(), Vector3::z(), epsilon = 1e-12);
        assert_relative_eq!(polygon.reversed().normal(), -Vector3::z(), epsilon = 1e-12);
        assert_relative_eq!(polygon.area(), 100.0, epsilon = 1e-9);
        assert_eq!(polygon.center(), p(5.0, 5.0));
    }

    #[test]
    fn test_contains_3d() {
        let polygon = square();
        assert_eq!(polygon.contains_3d(&p(5.0, 5.0)), (true, Containment::Inside));
        assert_eq!(polygon.contains_3d(&p(15.0, 15.0)), (false, Containment::Outside));
        assert_eq!(
            polygon.contains_3d(&p(5.0, 0.0)),
            (true, Containment::CoincidesAtEdge)
        );
        assert_eq!(
            polygon.contains_3d(&Point3::new(5.0, 5.0, 1.0)),
            (false, Containment::Outside)
        );
    }

    #[test]
    fn test_contains_3d_vertical() {
        let wall = Polygon::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 3.0),
            Point3::new(0.0, 0.0, 3.0),
        ])
        .unwrap();
        assert!(wall.contains_3d(&Point3::new(2.0, 0.0, 1.5)).0);
        assert!(!wall.contains_3d(&Point3::new(5.0, 0.0, 1.5)).0);
        assert_eq!(
            wall.contains_3d(&Point3::new(4.0, 0.0, 3.0)).1,
            Containment::CoincidesAtVertex
        );
    }

    #[test]
    fn test_serde_validates() {
        let json = serde_json::to_string(&square()).unwrap();
        let back: Polygon = serde_json::from_str(&json).unwrap();
        assert_eq!(back, square());

        let bad = "[[0.0,0.0,0.0],[1.0,0.0,0.0]]";
        assert!(serde_json::from_str::<Polygon>(bad).is_err());
    }
}
