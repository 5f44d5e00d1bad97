// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Half-infinite rays

use super::containment::Containment;
use super::line::Line;
use super::plane::Plane;
use super::polygon::Polygon;
use super::solid::Solid;
use super::vector::{validate_finite, PointExt, VectorExt, EPSILON};
use crate::config::validation_enabled;
use crate::error::GeometryError;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Ray from `origin` along the unit `direction`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Point3<f64>,
    pub direction: Vector3<f64>,
}

impl Ray {
    pub fn new(origin: Point3<f64>, direction: Vector3<f64>) -> Result<Self, GeometryError> {
        if validation_enabled() {
            validate_finite(&origin)?;
        }
        if direction.is_zero(EPSILON) {
            return Err(GeometryError::ZeroLengthVector);
        }
        Ok(Self {
            origin,
            direction: direction.unitized(),
        })
    }

    pub fn point_at(&self, distance: f64) -> Point3<f64> {
        self.origin + self.direction * distance
    }

    /// Hit on a plane at or in front of the origin
    pub fn intersects_plane(&self, plane: &Plane) -> Option<Point3<f64>> {
        let (point, t) = plane.intersects_infinite_line(&self.origin, &self.direction)?;
        (t >= -EPSILON).then_some(point)
    }

    /// Hit on a bounded line segment at or in front of the origin
    pub fn intersects_line(&self, line: &Line) -> Option<Point3<f64>> {
        let (point, t) = line.intersects_infinite(&self.origin, &self.direction)?;
        (t >= -EPSILON).then_some(point)
    }

    /// Hit on a polygon's interior or boundary
    pub fn intersects_polygon(&self, polygon: &Polygon) -> Option<Point3<f64>> {
        let point = self.intersects_plane(&polygon.plane())?;
        polygon.contains_3d(&point).0.then_some(point)
    }

    /// Every hit on a solid's faces ordered by distance from the origin.
    /// Hits shared by adjacent faces are reported once.
    pub fn intersects_solid(&self, solid: &Solid) -> Option<Vec<Point3<f64>>> {
        let mut hits: Vec<(f64, Point3<f64>)> = Vec::new();
        for face in solid.faces() {
            let Some(point) = self.intersects_polygon(&face.outer) else {
                continue;
            };
            let in_void = face
                .voids
                .iter()
                .any(|void| void.contains_3d(&point).1 == Containment::Inside);
            if in_void {
                continue;
            }
            if hits.iter().any(|(_, p)| p.is_almost_equal(&point, EPSILON)) {
                continue;
            }
            hits.push(((point - self.origin).norm(), point));
        }
        if hits.is_empty() {
            return None;
        }
        hits.sort_by(|a, b| a.0.total_cmp(&b.0));
        Some(hits.into_iter().map(|(_, p)| p).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::solid::{FacetKernel, Profile, SolidKernel};
    use crate::geometry::Polyline;

    #[test]
    fn test_ray_plane() {
        let ray = Ray::new(Point3::new(0.0, 0.0, 5.0), -Vector3::z()).unwrap();
        let hit = ray.intersects_plane(&Plane::xy(0.0)).unwrap();
        assert!(hit.is_almost_equal(&Point3::origin(), EPSILON));

        let away = Ray::new(Point3::new(0.0, 0.0, 5.0), Vector3::z()).unwrap();
        assert!(away.intersects_plane(&Plane::xy(0.0)).is_none());
    }

    #[test]
    fn test_ray_polygon() {
        let square = Polygon::rectangle(Point3::origin(), 10.0, 10.0).unwrap();
        let hit = Ray::new(Point3::new(5.0, 5.0, 3.0), -Vector3::z()).unwrap();
        assert!(hit.intersects_polygon(&square).is_some());
        let miss = Ray::new(Point3::new(15.0, 5.0, 3.0), -Vector3::z()).unwrap();
        assert!(miss.intersects_polygon(&square).is_none());
    }

    #[test]
    fn test_ray_line() {
        let line = Line::new(Point3::new(5.0, -5.0, 0.0), Point3::new(5.0, 5.0, 0.0)).unwrap();
        let ray = Ray::new(Point3::origin(), Vector3::x()).unwrap();
        let hit = ray.intersects_line(&line).unwrap();
        assert!(hit.is_almost_equal(&Point3::new(5.0, 0.0, 0.0), EPSILON));
        let behind = Ray::new(Point3::origin(), -Vector3::x()).unwrap();
        assert!(behind.intersects_line(&line).is_none());
    }

    #[test]
    fn test_ray_solid() {
        let profile = Profile::new(Polygon::rectangle(Point3::origin(), 2.0, 2.0).unwrap());
        let path = Polyline::new(vec![Point3::origin(), Point3::new(0.0, 0.0, 4.0)]).unwrap();
        let solid = FacetKernel.sweep(&profile, &path, 0.0, 0.0, 0.0).unwrap();

        let ray = Ray::new(Point3::new(1.0, 1.0, 10.0), -Vector3::z()).unwrap();
        let hits = ray.intersects_solid(&solid).unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].is_almost_equal(&Point3::new(1.0, 1.0, 4.0), EPSILON));
        assert!(hits[1].is_almost_equal(&Point3::new(1.0, 1.0, 0.0), EPSILON));
    }
}
