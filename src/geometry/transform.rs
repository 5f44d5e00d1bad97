// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Affine transforms and local coordinate frames

use super::vector::{VectorExt, EPSILON};
use crate::utils::math::deg_to_rad;
use nalgebra::{Matrix4, Point3, Vector3};

/// Affine transform backed by a homogeneous matrix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub matrix: Matrix4<f64>,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    pub fn translation(offset: Vector3<f64>) -> Self {
        Self {
            matrix: Matrix4::new_translation(&offset),
        }
    }

    /// Rotation about an axis through the origin, angle in degrees
    pub fn rotation(axis: Vector3<f64>, degrees: f64) -> Self {
        let axis = axis.unitized();
        Self {
            matrix: Matrix4::new_rotation(axis * deg_to_rad(degrees)),
        }
    }

    /// Frame whose local XY plane is the plane through `origin` with normal
    /// `z`. Local X follows global X projected into the plane where possible.
    pub fn from_origin_and_normal(origin: Point3<f64>, z: Vector3<f64>) -> Self {
        let z = z.unitized();
        let reference = if z.is_parallel_to(&Vector3::z(), EPSILON) {
            Vector3::x()
        } else {
            Vector3::z()
        };
        let x = if reference == Vector3::x() {
            (reference - z * reference.dot(&z)).unitized()
        } else {
            reference.cross(&z).unitized()
        };
        let y = z.cross(&x).unitized();
        Self::from_axes(origin, x, y, z)
    }

    /// Frame from explicit orthonormal axes
    pub fn from_axes(
        origin: Point3<f64>,
        x: Vector3<f64>,
        y: Vector3<f64>,
        z: Vector3<f64>,
    ) -> Self {
        #[rustfmt::skip]
        let matrix = Matrix4::new(
            x.x, y.x, z.x, origin.x,
            x.y, y.y, z.y, origin.y,
            x.z, y.z, z.z, origin.z,
            0.0, 0.0, 0.0, 1.0,
        );
        Self { matrix }
    }

    /// Inverse transform, `None` for singular matrices
    pub fn inverted(&self) -> Option<Self> {
        self.matrix.try_inverse().map(|matrix| Self { matrix })
    }

    /// Apply `other` after `self`
    pub fn then(&self, other: &Transform) -> Self {
        Self {
            matrix: other.matrix * self.matrix,
        }
    }

    pub fn apply_point(&self, point: &Point3<f64>) -> Point3<f64> {
        self.matrix.transform_point(point)
    }

    pub fn apply_vector(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.matrix.transform_vector(vector)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
