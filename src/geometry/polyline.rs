// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Open polylines and the `Curve` abstraction shared with polygons

use super::bbox::BoundingBox;
use super::line::Line;
use super::transform::Transform;
use super::vector::{validate_finite, PointExt, EPSILON};
use crate::config::validation_enabled;
use crate::error::GeometryError;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// A piecewise-linear curve
pub trait Curve {
    /// Ordered vertices; closed curves do not repeat the first vertex
    fn vertices(&self) -> &[Point3<f64>];

    /// Whether the last vertex connects back to the first
    fn is_closed(&self) -> bool;

    /// Segments in traversal order, including the closing segment
    fn segments(&self) -> Vec<Line> {
        let vertices = self.vertices();
        let count = if self.is_closed() {
            vertices.len()
        } else {
            vertices.len().saturating_sub(1)
        };
        (0..count)
            .map(|i| Line {
                start: vertices[i],
                end: vertices[(i + 1) % vertices.len()],
            })
            .collect()
    }

    fn length(&self) -> f64 {
        self.segments().iter().map(Line::length).sum()
    }

    fn bounds(&self) -> BoundingBox {
        BoundingBox::from_points(self.vertices())
    }
}

/// Open sequence of at least two vertices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point3<f64>>", into = "Vec<Point3<f64>>")]
pub struct Polyline {
    vertices: Vec<Point3<f64>>,
}

impl Polyline {
    /// Create a polyline, dropping sequential duplicates
    pub fn new(vertices: Vec<Point3<f64>>) -> Result<Self, GeometryError> {
        if !validation_enabled() {
            return Ok(Self { vertices });
        }
        for v in &vertices {
            validate_finite(v)?;
        }
        let vertices = remove_sequential_duplicates(vertices, false);
        if vertices.len() < 2 {
            return Err(GeometryError::TooFewPolylineVertices(vertices.len()));
        }
        Ok(Self { vertices })
    }

    pub fn start(&self) -> Point3<f64> {
        self.vertices[0]
    }

    pub fn end(&self) -> Point3<f64> {
        self.vertices[self.vertices.len() - 1]
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

    /// Copy with every vertex's z replaced by `elevation`
    pub fn at_elevation(&self, elevation: f64) -> Self {
        Self {
            vertices: self
                .vertices
                .iter()
                .map(|v| Point3::new(v.x, v.y, elevation))
                .collect(),
        }
    }
}

impl Curve for Polyline {
    fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    fn is_closed(&self) -> bool {
        false
    }
}

impl From<Line> for Polyline {
    fn from(line: Line) -> Self {
        Self {
            vertices: vec![line.start, line.end],
        }
    }
}

impl TryFrom<Vec<Point3<f64>>> for Polyline {
    type Error = GeometryError;

    fn try_from(vertices: Vec<Point3<f64>>) -> Result<Self, Self::Error> {
        Self::new(vertices)
    }
}

impl From<Polyline> for Vec<Point3<f64>> {
    fn from(polyline: Polyline) -> Self {
        polyline.vertices
    }
}

/// Drop vertices equal (within `EPSILON`) to their predecessor; for closed
/// loops a trailing vertex equal to the first is dropped too
pub(crate) fn remove_sequential_duplicates(
    vertices: Vec<Point3<f64>>,
    closed: bool,
) -> Vec<Point3<f64>> {
    let mut result: Vec<Point3<f64>> = Vec::with_capacity(vertices.len());
    for v in vertices {
        if result
            .last()
            .map_or(true, |last| !last.is_almost_equal(&v, EPSILON))
        {
            result.push(v);
        }
    }
    if closed {
        while result.len() > 1 && result[0].is_almost_equal(&result[result.len() - 1], EPSILON) {
            result.pop();
        }
    }
    result
}
