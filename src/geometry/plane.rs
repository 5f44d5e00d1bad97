// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Infinite planes and plane intersections

use super::line::Line;
use super::vector::{VectorExt, EPSILON};
use crate::error::GeometryError;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Side of a plane a point falls on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneClassification {
    /// Positive side of the normal
    Front,
    /// Negative side of the normal
    Back,
    /// Within tolerance of the plane
    OnPlane,
}

/// Plane through `origin` with unit `normal`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Plane {
    pub origin: Point3<f64>,
    pub normal: Vector3<f64>,
}

impl Plane {
    /// Create a plane, normalizing `normal`
    pub fn new(origin: Point3<f64>, normal: Vector3<f64>) -> Result<Self, GeometryError> {
        if normal.is_zero(EPSILON) {
            return Err(GeometryError::ZeroLengthVector);
        }
        Ok(Self {
            origin,
            normal: normal.unitized(),
        })
    }

    /// Horizontal plane at `elevation`
    pub fn xy(elevation: f64) -> Self {
        Self {
            origin: Point3::new(0.0, 0.0, elevation),
            normal: Vector3::z(),
        }
    }

    /// Plane through three points, wound counter-clockwise about the normal
    pub fn from_points(
        a: &Point3<f64>,
        b: &Point3<f64>,
        c: &Point3<f64>,
    ) -> Result<Self, GeometryError> {
        Self::new(*a, (b - a).cross(&(c - a)))
    }

    /// Signed distance, positive on the normal side
    pub fn signed_distance_to(&self, point: &Point3<f64>) -> f64 {
        (point - self.origin).dot(&self.normal)
    }

    /// Classify a point with an absolute tolerance
    pub fn classify(&self, point: &Point3<f64>, tolerance: f64) -> PlaneClassification {
        let distance = self.signed_distance_to(point);
        if distance > tolerance {
            PlaneClassification::Front
        } else if distance < -tolerance {
            PlaneClassification::Back
        } else {
            PlaneClassification::OnPlane
        }
    }

    /// Orthogonal projection of a point onto the plane
    pub fn project(&self, point: &Point3<f64>) -> Point3<f64> {
        point - self.normal * self.signed_distance_to(point)
    }

    /// Same plane up to normal orientation
    pub fn is_coplanar_with(&self, other: &Plane) -> bool {
        self.normal.is_parallel_to(&other.normal, EPSILON)
            && self.signed_distance_to(&other.origin).abs() < EPSILON
    }

    /// Reversed normal
    pub fn flipped(&self) -> Self {
        Self {
            origin: self.origin,
            normal: -self.normal,
        }
    }

    /// Intersection of the infinite line through `origin` along `direction`.
    /// Returns the point and the line parameter, `None` when parallel.
    pub fn intersects_infinite_line(
        &self,
        origin: &Point3<f64>,
        direction: &Vector3<f64>,
    ) -> Option<(Point3<f64>, f64)> {
        let denom = self.normal.dot(direction);
        if denom.abs() < 1e-12 {
            return None;
        }
        let t = (self.origin - origin).dot(&self.normal) / denom;
        Some((origin + direction * t, t))
    }

    /// Intersection with a bounded line, endpoints included
    pub fn intersects_line(&self, line: &Line) -> Option<Point3<f64>> {
        let d0 = self.signed_distance_to(&line.start);
        let d1 = self.signed_distance_to(&line.end);
        if d0.abs() < EPSILON && d1.abs() < EPSILON {
            // Line lies in the plane
            return None;
        }
        if d0.abs() < EPSILON {
            return Some(line.start);
        }
        if d1.abs() < EPSILON {
            return Some(line.end);
        }
        if d0.signum() == d1.signum() {
            return None;
        }
        let t = d0 / (d0 - d1);
        Some(line.point_at(t))
    }

    /// Line of intersection with another plane as `(point, unit direction)`
    pub fn intersects_plane(&self, other: &Plane) -> Option<(Point3<f64>, Vector3<f64>)> {
        let direction = self.normal.cross(&other.normal);
        if direction.is_zero(EPSILON) {
            return None;
        }
        let direction = direction.unitized();
        // Point on both planes closest to this plane's origin
        let in_plane = direction.cross(&self.normal);
        let (point, _) = other.intersects_infinite_line(&self.origin, &in_plane)?;
        Some((point, direction))
    }

    /// Single point shared by three planes, `None` when any two are parallel
    pub fn intersects_planes(a: &Plane, b: &Plane, c: &Plane) -> Option<Point3<f64>> {
        let bc = b.normal.cross(&c.normal);
        let det = a.normal.dot(&bc);
        if det.abs() < EPSILON {
            return None;
        }
        let da = a.normal.dot(&a.origin.coords);
        let db = b.normal.dot(&b.origin.coords);
        let dc = c.normal.dot(&c.origin.coords);
        let ca = c.normal.cross(&a.normal);
        let ab = a.normal.cross(&b.normal);
        Some(Point3::from((bc * da + ca * db + ab * dc) / det))
    }
}
