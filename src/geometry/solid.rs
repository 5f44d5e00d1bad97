// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Faceted solids built by sweeping profiles along paths
//!
//! The kernel that turns a profile and a path into a boundary representation
//! sits behind the [`SolidKernel`] trait. [`FacetKernel`] handles straight
//! segments only; smooth sweeps belong to an external kernel.

use super::bbox::BoundingBox;
use super::polygon::Polygon;
use super::polyline::{Curve, Polyline};
use super::transform::Transform;
use super::vector::{VectorExt, EPSILON};
use crate::error::GeometryError;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Planar cross-section in its local XY plane, perimeter wound
/// counter-clockwise about +Z
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub perimeter: Polygon,
    #[serde(default)]
    pub voids: Vec<Polygon>,
}

impl Profile {
    pub fn new(perimeter: Polygon) -> Self {
        Self::with_voids(perimeter, Vec::new())
    }

    /// Profile with openings; windings are normalized
    pub fn with_voids(perimeter: Polygon, voids: Vec<Polygon>) -> Self {
        let perimeter = if perimeter.normal().z < 0.0 {
            perimeter.reversed()
        } else {
            perimeter
        };
        let voids = voids
            .into_iter()
            .map(|v| if v.normal().z > 0.0 { v.reversed() } else { v })
            .collect();
        Self { perimeter, voids }
    }
}

/// Boundary face of a solid, optionally pierced by openings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolidFace {
    pub outer: Polygon,
    #[serde(default)]
    pub voids: Vec<Polygon>,
}

impl SolidFace {
    fn plain(outer: Polygon) -> Self {
        Self {
            outer,
            voids: Vec::new(),
        }
    }
}

/// Closed faceted boundary representation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Solid {
    faces: Vec<SolidFace>,
}

impl Solid {
    pub fn faces(&self) -> &[SolidFace] {
        &self.faces
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_points(self.faces.iter().flat_map(|f| f.outer.vertices()))
    }
}

/// Sweep/extrude backend
pub trait SolidKernel {
    /// Sweep `profile` along `path`, inset by the setbacks from the path's
    /// ends and rotated about the path by `rotation` degrees
    fn sweep(
        &self,
        profile: &Profile,
        path: &dyn Curve,
        start_setback: f64,
        end_setback: f64,
        rotation: f64,
    ) -> Result<Solid, GeometryError>;
}

/// Kernel producing one prism per straight path segment
#[derive(Debug, Clone, Copy, Default)]
pub struct FacetKernel;

impl FacetKernel {
    fn prism(
        &self,
        profile: &Profile,
        start: Point3<f64>,
        end: Point3<f64>,
        rotation: f64,
    ) -> Result<Vec<SolidFace>, GeometryError> {
        let direction = end - start;
        let placement = Transform::rotation(Vector3::z(), rotation)
            .then(&Transform::from_origin_and_normal(start, direction.unitized()));

        let base = profile.perimeter.transformed(&placement);
        let base_voids: Vec<Polygon> = profile
            .voids
            .iter()
            .map(|v| v.transformed(&placement))
            .collect();

        let mut faces = Vec::new();
        faces.push(SolidFace {
            outer: base.reversed(),
            voids: base_voids.iter().map(Polygon::reversed).collect(),
        });
        faces.push(SolidFace {
            outer: base.translated(direction),
            voids: base_voids.iter().map(|v| v.translated(direction)).collect(),
        });
        for ring in std::iter::once(&base).chain(base_voids.iter()) {
            for segment in ring.segments() {
                let side = Polygon::new(vec![
                    segment.start,
                    segment.end,
                    segment.end + direction,
                    segment.start + direction,
                ])?;
                faces.push(SolidFace::plain(side));
            }
        }
        Ok(faces)
    }
}

impl SolidKernel for FacetKernel {
    fn sweep(
        &self,
        profile: &Profile,
        path: &dyn Curve,
        start_setback: f64,
        end_setback: f64,
        rotation: f64,
    ) -> Result<Solid, GeometryError> {
        let mut segments = path.segments();
        if segments.is_empty() {
            return Err(GeometryError::UnsupportedPath(
                "path has no segments".to_string(),
            ));
        }

        let directions: Vec<Vector3<f64>> = segments.iter().map(|s| s.direction()).collect();
        segments[0].start += directions[0] * start_setback;
        let last = segments.len() - 1;
        segments[last].end -= directions[last] * end_setback;

        let mut faces = Vec::new();
        for (i, segment) in segments.iter().enumerate() {
            let along = (segment.end - segment.start).dot(&directions[i]);
            if along < EPSILON {
                return Err(GeometryError::UnsupportedPath(format!(
                    "segment {i} vanishes after setbacks"
                )));
            }
            faces.extend(self.prism(profile, segment.start, segment.end, rotation)?);
        }
        log::debug!(
            "swept profile along {} segment(s) into {} faces",
            segments.len(),
            faces.len()
        );
        Ok(Solid { faces })
    }
}

/// Sweep definition holding its last built solid.
///
/// Setters invalidate the solid; [`Sweep::rebuild`] recomputes it.
#[derive(Debug, Clone)]
pub struct Sweep {
    profile: Profile,
    path: Polyline,
    start_setback: f64,
    end_setback: f64,
    rotation: f64,
    solid: Option<Solid>,
}

impl Sweep {
    pub fn new(profile: Profile, path: Polyline) -> Self {
        Self {
            profile,
            path,
            start_setback: 0.0,
            end_setback: 0.0,
            rotation: 0.0,
            solid: None,
        }
    }

    pub fn with_setbacks(mut self, start: f64, end: f64) -> Self {
        self.set_setbacks(start, end);
        self
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.set_rotation(degrees);
        self
    }

    pub fn set_profile(&mut self, profile: Profile) {
        self.profile = profile;
        self.solid = None;
    }

    pub fn set_path(&mut self, path: Polyline) {
        self.path = path;
        self.solid = None;
    }

    pub fn set_setbacks(&mut self, start: f64, end: f64) {
        self.start_setback = start;
        self.end_setback = end;
        self.solid = None;
    }

    pub fn set_rotation(&mut self, degrees: f64) {
        self.rotation = degrees;
        self.solid = None;
    }

    /// Last built solid, `None` after any setter until the next rebuild
    pub fn solid(&self) -> Option<&Solid> {
        self.solid.as_ref()
    }

    pub fn rebuild(&mut self, kernel: &dyn SolidKernel) -> Result<&Solid, GeometryError> {
        let solid = kernel.sweep(
            &self.profile,
            &self.path,
            self.start_setback,
            self.end_setback,
            self.rotation,
        )?;
        Ok(self.solid.insert(solid))
    }
}
