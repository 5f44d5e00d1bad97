// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Tolerance-aware vector and point helpers
//!
//! Equality of `Vector3`/`Point3` stays exact (nalgebra's `PartialEq`); every
//! fuzzy comparison goes through the explicit `is_almost_equal` family below.

use crate::error::GeometryError;
use crate::utils::math::{clamp, rad_to_deg};
use nalgebra::{Point3, Vector3};

/// Global geometric tolerance
pub const EPSILON: f64 = 1e-5;

/// Tolerance-aware operations on directions
pub trait VectorExt {
    /// Component-wise comparison within `tolerance`
    fn is_almost_equal(&self, other: &Self, tolerance: f64) -> bool;

    /// Length below `tolerance`
    fn is_zero(&self, tolerance: f64) -> bool;

    /// Unit vector, or the zero vector when the length is zero
    fn unitized(&self) -> Self;

    /// Angle in degrees in [0, 180]; 0 when either vector has zero length
    fn angle_to(&self, other: &Self) -> f64;

    /// Counter-clockwise angle in degrees in [0, 360) from `self` to `other`
    /// about `normal`, measured after projecting both into the plane
    fn plane_angle_to(&self, other: &Self, normal: &Self) -> f64;

    /// Parallel or anti-parallel within `tolerance` on the unit dot product
    fn is_parallel_to(&self, other: &Self, tolerance: f64) -> bool;
}

impl VectorExt for Vector3<f64> {
    fn is_almost_equal(&self, other: &Self, tolerance: f64) -> bool {
        (self.x - other.x).abs() < tolerance
            && (self.y - other.y).abs() < tolerance
            && (self.z - other.z).abs() < tolerance
    }

    fn is_zero(&self, tolerance: f64) -> bool {
        self.norm() < tolerance
    }

    fn unitized(&self) -> Self {
        let length = self.norm();
        if length == 0.0 {
            Vector3::zeros()
        } else {
            self / length
        }
    }

    fn angle_to(&self, other: &Self) -> f64 {
        let lengths = self.norm() * other.norm();
        if lengths == 0.0 {
            return 0.0;
        }
        let cos = clamp(self.dot(other) / lengths, -1.0, 1.0);
        rad_to_deg(cos.acos())
    }

    fn plane_angle_to(&self, other: &Self, normal: &Self) -> f64 {
        let n = normal.unitized();
        let a = self - n * self.dot(&n);
        let b = other - n * other.dot(&n);
        if a.norm() == 0.0 || b.norm() == 0.0 {
            return 0.0;
        }
        let angle = rad_to_deg(a.cross(&b).dot(&n).atan2(a.dot(&b)));
        if angle < 0.0 {
            angle + 360.0
        } else if angle >= 360.0 {
            angle - 360.0
        } else {
            angle
        }
    }

    fn is_parallel_to(&self, other: &Self, tolerance: f64) -> bool {
        let a = self.unitized();
        let b = other.unitized();
        if a.norm() == 0.0 || b.norm() == 0.0 {
            return false;
        }
        (a.dot(&b).abs() - 1.0).abs() < tolerance
    }
}

/// Tolerance-aware operations on locations
pub trait PointExt {
    /// Component-wise comparison within `tolerance`
    fn is_almost_equal(&self, other: &Self, tolerance: f64) -> bool;

    /// Distance from this point to the segment `start..end`
    fn distance_to_segment(&self, start: &Self, end: &Self) -> f64;
}

impl PointExt for Point3<f64> {
    fn is_almost_equal(&self, other: &Self, tolerance: f64) -> bool {
        self.coords.is_almost_equal(&other.coords, tolerance)
    }

    fn distance_to_segment(&self, start: &Self, end: &Self) -> f64 {
        let d = end - start;
        let length_sq = d.norm_squared();
        if length_sq == 0.0 {
            return (self - start).norm();
        }
        let t = clamp((self - start).dot(&d) / length_sq, 0.0, 1.0);
        (self - (start + d * t)).norm()
    }
}

/// Reject NaN or infinite components
pub fn validate_finite(point: &Point3<f64>) -> Result<(), GeometryError> {
    if point.x.is_finite() && point.y.is_finite() && point.z.is_finite() {
        Ok(())
    } else {
        Err(GeometryError::NonFinite {
            x: point.x,
            y: point.y,
            z: point.z,
        })
    }
}

/// Newell normal of a closed loop of points; zero for degenerate input
pub fn newell_normal(points: &[Point3<f64>]) -> Vector3<f64> {
    let mut normal = Vector3::zeros();
    for (i, a) in points.iter().enumerate() {
        let b = &points[(i + 1) % points.len()];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal.unitized()
}

/// True when every point lies on one line within `EPSILON`
pub fn are_collinear(points: &[Point3<f64>]) -> bool {
    if points.len() < 3 {
        return true;
    }
    let origin = points[0];
    let Some(far) = points
        .iter()
        .skip(1)
        .find(|p| !p.is_almost_equal(&origin, EPSILON))
    else {
        return true;
    };
    let direction = (far - origin).unitized();
    points.iter().all(|p| {
        let v = p - origin;
        (v - direction * v.dot(&direction)).norm() < EPSILON
    })
}

/// True when every point lies on one plane within `EPSILON`
pub fn are_coplanar(points: &[Point3<f64>]) -> bool {
    if points.len() < 4 || are_collinear(points) {
        return true;
    }
    let normal = newell_normal(points);
    if normal.norm() == 0.0 {
        return true;
    }
    let origin = points[0];
    points
        .iter()
        .all(|p| (p - origin).dot(&normal).abs() < EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_angle_to() {
        let x = Vector3::x();
        let y = Vector3::y();
        assert_relative_eq!(x.angle_to(&y), 90.0, epsilon = 1e-9);
        assert_relative_eq!(x.angle_to(&(-x)), 180.0, epsilon = 1e-9);
        assert_eq!(x.angle_to(&Vector3::zeros()), 0.0);
    }

    #[test]
    fn test_plane_angle_to() {
        let x = Vector3::x();
        let y = Vector3::y();
        let z = Vector3::z();
        assert_relative_eq!(x.plane_angle_to(&y, &z), 90.0, epsilon = 1e-9);
        assert_relative_eq!(y.plane_angle_to(&x, &z), 270.0, epsilon = 1e-9);
        assert_relative_eq!(x.plane_angle_to(&x, &z), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_parallel() {
        let a = Vector3::new(1.0, 1.0, 0.0);
        assert!(a.is_parallel_to(&Vector3::new(-2.0, -2.0, 0.0), EPSILON));
        assert!(!a.is_parallel_to(&Vector3::x(), EPSILON));
        assert!(!a.is_parallel_to(&Vector3::zeros(), EPSILON));
    }

    #[test]
    fn test_exact_equality_is_not_fuzzy() {
        let a = Vector3::new(1.0, 2.0, 3.0);
        let b = Vector3::new(1.0 + 1e-7, 2.0, 3.0);
        assert_ne!(a, b);
        assert!(a.is_almost_equal(&b, EPSILON));
    }

    #[test]
    fn test_collinear_and_coplanar() {
        let line = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(3.0, 3.0, 3.0),
        ];
        assert!(are_collinear(&line));

        let square = [
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        assert!(!are_collinear(&square));
        assert!(are_coplanar(&square));

        let warped = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.5),
            Point3::new(0.0, 1.0, 0.0),
        ];
        assert!(!are_coplanar(&warped));
    }

    #[test]
    fn test_validate_finite() {
        assert!(validate_finite(&Point3::new(1.0, 2.0, 3.0)).is_ok());
        assert!(matches!(
            validate_finite(&Point3::new(f64::NAN, 0.0, 0.0)),
            Err(GeometryError::NonFinite { .. })
        ));
    }

    #[test]
    fn test_distance_to_segment() {
        let p = Point3::new(5.0, 3.0, 0.0);
        let d = p.distance_to_segment(&Point3::origin(), &Point3::new(10.0, 0.0, 0.0));
        assert_relative_eq!(d, 3.0, epsilon = 1e-12);
    }
}
