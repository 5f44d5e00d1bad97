// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bounded line segments

use super::bbox::BoundingBox;
use super::plane::Plane;
use super::vector::{validate_finite, PointExt, VectorExt, EPSILON};
use crate::config::validation_enabled;
use crate::error::GeometryError;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Directed segment from `start` to `end`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub start: Point3<f64>,
    pub end: Point3<f64>,
}

impl Line {
    /// Create a line; coincident endpoints are rejected
    pub fn new(start: Point3<f64>, end: Point3<f64>) -> Result<Self, GeometryError> {
        if validation_enabled() {
            validate_finite(&start)?;
            validate_finite(&end)?;
            if start.is_almost_equal(&end, EPSILON) {
                return Err(GeometryError::DegenerateLine);
            }
        }
        Ok(Self { start, end })
    }

    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// Unit direction from start to end
    pub fn direction(&self) -> Vector3<f64> {
        (self.end - self.start).unitized()
    }

    /// Point at normalized parameter `t` (0 = start, 1 = end)
    pub fn point_at(&self, t: f64) -> Point3<f64> {
        self.start + (self.end - self.start) * t
    }

    pub fn mid_point(&self) -> Point3<f64> {
        self.point_at(0.5)
    }

    pub fn reversed(&self) -> Self {
        Self {
            start: self.end,
            end: self.start,
        }
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_points([&self.start, &self.end])
    }

    /// Shortest distance from a point to the segment
    pub fn distance_to(&self, point: &Point3<f64>) -> f64 {
        point.distance_to_segment(&self.start, &self.end)
    }

    /// Normalized parameter of the projection of `point` onto the infinite line
    pub fn parameter_of(&self, point: &Point3<f64>) -> f64 {
        let d = self.end - self.start;
        (point - self.start).dot(&d) / d.norm_squared()
    }

    /// Point lies on the segment within `tolerance`
    pub fn point_on_line(&self, point: &Point3<f64>, include_ends: bool, tolerance: f64) -> bool {
        if self.distance_to(point) >= tolerance {
            return false;
        }
        if include_ends {
            return true;
        }
        !point.is_almost_equal(&self.start, tolerance) && !point.is_almost_equal(&self.end, tolerance)
    }

    /// Closest approach parameters `(s, t)` between two infinite lines given
    /// as origin + direction, `None` when parallel
    fn closest_parameters(
        p1: &Point3<f64>,
        d1: &Vector3<f64>,
        p2: &Point3<f64>,
        d2: &Vector3<f64>,
    ) -> Option<(f64, f64)> {
        let r = p1 - p2;
        let a = d1.dot(d1);
        let b = d1.dot(d2);
        let c = d1.dot(&r);
        let e = d2.dot(d2);
        let f = d2.dot(&r);
        let denom = a * e - b * b;
        if denom.abs() < 1e-12 * a * e || d1.is_parallel_to(d2, 1e-10) {
            return None;
        }
        let s = (b * f - c * e) / denom;
        let t = (a * f - b * c) / denom;
        Some((s, t))
    }

    /// Intersection with another segment.
    ///
    /// Parallel, collinear or skew segments return `None`. With
    /// `include_ends == false` an intersection exactly at an endpoint of
    /// either segment is ignored.
    pub fn intersects(&self, other: &Line, include_ends: bool) -> Option<Point3<f64>> {
        let d1 = self.end - self.start;
        let d2 = other.end - other.start;
        let (s, t) = Self::closest_parameters(&self.start, &d1, &other.start, &d2)?;
        let p1 = self.start + d1 * s;
        let p2 = other.start + d2 * t;
        if (p1 - p2).norm() > EPSILON {
            return None;
        }
        let s_tol = EPSILON / d1.norm();
        let t_tol = EPSILON / d2.norm();
        if s < -s_tol || s > 1.0 + s_tol || t < -t_tol || t > 1.0 + t_tol {
            return None;
        }
        if !include_ends {
            let at_end = |p: &Point3<f64>| {
                p.is_almost_equal(&self.start, EPSILON)
                    || p.is_almost_equal(&self.end, EPSILON)
                    || p.is_almost_equal(&other.start, EPSILON)
                    || p.is_almost_equal(&other.end, EPSILON)
            };
            if at_end(&p1) {
                return None;
            }
        }
        Some(p1)
    }

    /// Intersection of this segment with the infinite line through `origin`
    /// along `direction`; returns the point and the parameter along that line
    pub fn intersects_infinite(
        &self,
        origin: &Point3<f64>,
        direction: &Vector3<f64>,
    ) -> Option<(Point3<f64>, f64)> {
        let d1 = self.end - self.start;
        let (s, t) = Self::closest_parameters(&self.start, &d1, origin, direction)?;
        let s_tol = EPSILON / d1.norm();
        if s < -s_tol || s > 1.0 + s_tol {
            return None;
        }
        let p1 = self.start + d1 * s.clamp(0.0, 1.0);
        let p2 = origin + direction * t;
        if (p1 - p2).norm() > EPSILON {
            return None;
        }
        Some((p1, t))
    }

    /// Intersection with a plane, endpoints included
    pub fn intersects_plane(&self, plane: &Plane) -> Option<Point3<f64>> {
        plane.intersects_line(self)
    }

    /// Collinear with `other` within tolerance
    pub fn is_collinear_with(&self, other: &Line) -> bool {
        let d = self.direction();
        let off = |p: &Point3<f64>| {
            let v = p - self.start;
            (v - d * v.dot(&d)).norm() < EPSILON
        };
        off(&other.start) && off(&other.end)
    }

    /// Collinear with `other` and sharing at least one point
    pub fn overlaps(&self, other: &Line) -> bool {
        if !self.is_collinear_with(other) {
            return false;
        }
        let tolerance = EPSILON / self.length();
        let a = self.parameter_of(&other.start);
        let b = self.parameter_of(&other.end);
        a.min(b) <= 1.0 + tolerance && a.max(b) >= -tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn line(a: (f64, f64, f64), b: (f64, f64, f64)) -> Line {
        Line::new(Point3::new(a.0, a.1, a.2), Point3::new(b.0, b.1, b.2)).unwrap()
    }

    #[test]
    fn test_degenerate_line_rejected() {
        let p = Point3::new(1.0, 1.0, 1.0);
        assert_eq!(Line::new(p, p), Err(GeometryError::DegenerateLine));
    }

    #[test]
    fn test_length_and_point_at() {
        let l = line((0.0, 0.0, 0.0), (3.0, 4.0, 0.0));
        assert_relative_eq!(l.length(), 5.0);
        assert!(l.point_at(0.5).is_almost_equal(&Point3::new(1.5, 2.0, 0.0), EPSILON));
    }

    #[test]
    fn test_crossing_lines() {
        let a = line((0.0, 0.0, 0.0), (10.0, 10.0, 0.0));
        let b = line((0.0, 10.0, 0.0), (10.0, 0.0, 0.0));
        let p = a.intersects(&b, false).unwrap();
        assert!(p.is_almost_equal(&Point3::new(5.0, 5.0, 0.0), EPSILON));
    }

    #[test]
    fn test_parallel_and_skew_lines() {
        let a = line((0.0, 0.0, 0.0), (10.0, 0.0, 0.0));
        let b = line((0.0, 1.0, 0.0), (10.0, 1.0, 0.0));
        assert!(a.intersects(&b, true).is_none());

        let skew = line((5.0, -5.0, 1.0), (5.0, 5.0, 1.0));
        assert!(a.intersects(&skew, true).is_none());
    }

    #[test]
    fn test_touching_at_end() {
        let a = line((0.0, 0.0, 0.0), (10.0, 0.0, 0.0));
        let b = line((10.0, 0.0, 0.0), (10.0, 10.0, 0.0));
        assert!(a.intersects(&b, true).is_some());
        assert!(a.intersects(&b, false).is_none());
    }

    #[test]
    fn test_bounds_reject_distant_segments() {
        let a = line((0.0, 0.0, 0.0), (10.0, 10.0, 0.0));
        let near = line((10.0, 0.0, 0.0), (0.0, 10.0, 0.0));
        let far = line((20.0, 0.0, 0.0), (20.0, 10.0, 0.0));
        assert!(a.bounds().intersects(&near.bounds(), EPSILON));
        assert!(!a.bounds().intersects(&far.bounds(), EPSILON));
        assert!(a.intersects(&far, true).is_none());
    }

    #[test]
    fn test_collinear_overlap() {
        let a = line((0.0, 0.0, 0.0), (10.0, 0.0, 0.0));
        // Collinear segments never report a single crossing point
        let inside = line((8.0, 0.0, 0.0), (4.0, 0.0, 0.0));
        assert!(a.intersects(&inside, true).is_none());
        assert!(a.overlaps(&inside));
        assert!(a.overlaps(&line((10.0, 0.0, 0.0), (12.0, 0.0, 0.0))));
        assert!(!a.overlaps(&line((11.0, 0.0, 0.0), (12.0, 0.0, 0.0))));
        assert!(!a.overlaps(&line((0.0, 1.0, 0.0), (10.0, 1.0, 0.0))));
    }

    #[test]
    fn test_point_on_line() {
        let a = line((0.0, 0.0, 0.0), (10.0, 0.0, 0.0));
        assert!(a.point_on_line(&Point3::new(5.0, 0.0, 0.0), false, EPSILON));
        assert!(!a.point_on_line(&Point3::new(0.0, 0.0, 0.0), false, EPSILON));
        assert!(a.point_on_line(&Point3::new(0.0, 0.0, 0.0), true, EPSILON));
        assert!(!a.point_on_line(&Point3::new(5.0, 1.0, 0.0), true, EPSILON));
    }
}
