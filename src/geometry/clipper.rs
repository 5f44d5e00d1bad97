// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Integer-scaled clipping paths
//!
//! Polygons cross into the clipping layer as XY paths on an integer grid of
//! spacing `tolerance`. Encoding and decoding must use the same tolerance.

use super::polygon::{remove_spikes_within, Polygon};
use super::polyline::Curve;
use crate::error::GeometryError;
use crate::utils::math::{from_grid, to_grid};
use geo::coordinate_position::{CoordPos, CoordinatePosition};
use geo::{Coord, LineString, MultiPolygon, Polygon as GeoPolygon};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Grid point of a clipping path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntPoint {
    pub x: i64,
    pub y: i64,
}

/// Closed ring of grid points, first point not repeated
pub type ClipperPath = Vec<IntPoint>;

/// Tolerance on `dot + 1` for stripping near-zero-width spikes left by
/// clipping
const SPIKE_TOLERANCE: f64 = 1e-3;

/// Encode a polygon's XY coordinates as `round(coord / tolerance)`
pub fn to_clipper_path(polygon: &Polygon, tolerance: f64) -> ClipperPath {
    polygon
        .vertices()
        .iter()
        .map(|v| IntPoint {
            x: to_grid(v.x, tolerance),
            y: to_grid(v.y, tolerance),
        })
        .collect()
}

/// Decode a path at `z = 0`
pub fn to_polygon(path: &[IntPoint], tolerance: f64) -> Result<Polygon, GeometryError> {
    Polygon::new(decode(path, tolerance))
}

fn decode(path: &[IntPoint], tolerance: f64) -> Vec<Point3<f64>> {
    path.iter()
        .map(|p| Point3::new(from_grid(p.x, tolerance), from_grid(p.y, tolerance), 0.0))
        .collect()
}

/// Decode a clipped ring, stripping spikes when the plain decode is not a
/// valid polygon. `None` when nothing valid remains.
pub fn to_polygon_repaired(path: &[IntPoint], tolerance: f64) -> Option<Polygon> {
    match to_polygon(path, tolerance) {
        Ok(polygon) => Some(polygon),
        Err(err) => {
            let mut vertices = decode(path, tolerance);
            remove_spikes_within(&mut vertices, SPIKE_TOLERANCE);
            if vertices.len() < 3 {
                log::debug!("dropping clipped ring ({err}); fewer than 3 vertices after cleanup");
                return None;
            }
            match Polygon::new(vertices) {
                Ok(polygon) => Some(polygon),
                Err(retry) => {
                    log::debug!("dropping clipped ring after cleanup: {retry}");
                    None
                }
            }
        }
    }
}

fn to_ring(path: &[IntPoint]) -> LineString<f64> {
    LineString::new(
        path.iter()
            .map(|p| Coord {
                x: p.x as f64,
                y: p.y as f64,
            })
            .collect(),
    )
}

/// Single-ring clipping polygon
pub(crate) fn to_geo(path: &[IntPoint]) -> GeoPolygon<f64> {
    GeoPolygon::new(to_ring(path), Vec::new())
}

/// Multi-polygon of independent rings
pub(crate) fn to_geo_multi(paths: &[ClipperPath]) -> MultiPolygon<f64> {
    MultiPolygon::new(paths.iter().map(|p| to_geo(p)).collect())
}

fn from_ring(ring: &LineString<f64>) -> ClipperPath {
    let mut path: ClipperPath = ring
        .0
        .iter()
        .map(|c| IntPoint {
            x: c.x.round() as i64,
            y: c.y.round() as i64,
        })
        .collect();
    if path.len() > 1 && path.first() == path.last() {
        path.pop();
    }
    path
}

/// Signed doubled area of a grid ring, positive when counter-clockwise
fn doubled_area(path: &[IntPoint]) -> i128 {
    let n = path.len();
    (0..n)
        .map(|i| {
            let a = path[i];
            let b = path[(i + 1) % n];
            a.x as i128 * b.y as i128 - b.x as i128 * a.y as i128
        })
        .sum()
}

/// Outer rings counter-clockwise, holes clockwise, each as its own path
pub(crate) fn from_geo_multi(multi: &MultiPolygon<f64>) -> Vec<ClipperPath> {
    let mut paths = Vec::new();
    for polygon in multi.iter() {
        let mut outer = from_ring(polygon.exterior());
        if doubled_area(&outer) < 0 {
            outer.reverse();
        }
        paths.push(outer);
        for interior in polygon.interiors() {
            let mut hole = from_ring(interior);
            if doubled_area(&hole) > 0 {
                hole.reverse();
            }
            paths.push(hole);
        }
    }
    paths
}

/// Point classification against a path: outside = 0, inside = 1,
/// on the boundary = -1
pub fn point_in_path(point: IntPoint, path: &[IntPoint]) -> i32 {
    let coord = Coord {
        x: point.x as f64,
        y: point.y as f64,
    };
    match to_geo(path).coordinate_position(&coord) {
        CoordPos::Outside => 0,
        CoordPos::Inside => 1,
        CoordPos::OnBoundary => -1,
    }
}
