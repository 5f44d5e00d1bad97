// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Splitting and trimming polygons through the half-edge graph

use super::containment::Containment;
use super::halfedge::{EdgeTag, HalfEdgeGraph2d};
use super::line::Line;
use super::plane::{Plane, PlaneClassification};
use super::polygon::Polygon;
use super::polyline::{Curve, Polyline};
use super::vector::{PointExt, VectorExt, EPSILON};
use crate::error::GeometryError;
use nalgebra::{Point3, Vector3};

/// `start`, every point lying strictly inside the segment, then `end`,
/// ordered along the segment and deduplicated
fn subdivide(start: &Point3<f64>, end: &Point3<f64>, points: &[Point3<f64>]) -> Vec<Point3<f64>> {
    let segment = Line {
        start: *start,
        end: *end,
    };
    let mut inner: Vec<(f64, Point3<f64>)> = points
        .iter()
        .filter(|p| segment.point_on_line(p, false, EPSILON))
        .map(|p| (segment.parameter_of(p), *p))
        .collect();
    inner.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut chain = vec![*start];
    for (_, p) in inner {
        if chain.last().map_or(true, |last| !last.is_almost_equal(&p, EPSILON)) {
            chain.push(p);
        }
    }
    if chain.last().map_or(true, |last| !last.is_almost_equal(end, EPSILON)) {
        chain.push(*end);
    }
    chain
}

/// Add the polygon's boundary to the graph, split at `points`
fn add_split_boundary(graph: &mut HalfEdgeGraph2d, polygon: &Polygon, points: &[Point3<f64>]) {
    for segment in polygon.segments() {
        let chain = subdivide(&segment.start, &segment.end, points);
        for pair in chain.windows(2) {
            graph.add_edge_between(&pair[0], &pair[1], EdgeTag::Boundary);
        }
    }
}

/// Points sorted along `direction` with near-duplicates removed
fn sort_along(
    mut points: Vec<Point3<f64>>,
    origin: &Point3<f64>,
    direction: &Vector3<f64>,
) -> Vec<Point3<f64>> {
    points.sort_by(|a, b| {
        (a - origin)
            .dot(direction)
            .total_cmp(&(b - origin).dot(direction))
    });
    let mut unique: Vec<Point3<f64>> = Vec::with_capacity(points.len());
    for p in points {
        if unique.last().map_or(true, |last| !last.is_almost_equal(&p, EPSILON)) {
            unique.push(p);
        }
    }
    unique
}

/// Small offset for probing the region beside an edge
fn sample_offset(polygon: &Polygon) -> f64 {
    (polygon.bounds().size().norm() * 1e-4).max(EPSILON * 10.0)
}

impl Polygon {
    /// Trim away the part behind `plane`; with `flip` the part in front is
    /// trimmed instead.
    ///
    /// `None` when the plane does not cross the polygon or when trimming
    /// fails.
    pub fn trimmed(&self, plane: &Plane, flip: bool) -> Option<Vec<Polygon>> {
        match self.trim_with_plane(plane, flip) {
            Ok(Some(polygons)) if !polygons.is_empty() => Some(polygons),
            Ok(_) => None,
            Err(err) => {
                log::warn!("polygon trim failed: {err}");
                None
            }
        }
    }

    fn trim_with_plane(
        &self,
        plane: &Plane,
        flip: bool,
    ) -> Result<Option<Vec<Polygon>>, GeometryError> {
        let away = if flip {
            PlaneClassification::Front
        } else {
            PlaneClassification::Back
        };
        let classes: Vec<PlaneClassification> = self
            .vertices()
            .iter()
            .map(|v| plane.classify(v, EPSILON))
            .collect();
        let crosses = classes.contains(&PlaneClassification::Front)
            && classes.contains(&PlaneClassification::Back);
        if !crosses {
            return Ok(None);
        }

        let normal = self.normal();
        let direction = plane.normal.cross(&normal);
        if direction.is_zero(EPSILON) {
            return Err(GeometryError::NotCoplanar);
        }

        // Points where the boundary meets the plane
        let mut on_plane: Vec<Point3<f64>> = Vec::new();
        for segment in self.segments() {
            if let Some(point) = plane.intersects_line(&segment) {
                on_plane.push(point);
            }
        }
        let on_plane = sort_along(on_plane, &self.vertices()[0], &direction);

        let mut graph = HalfEdgeGraph2d::new(normal);
        add_split_boundary(&mut graph, self, &on_plane);
        graph.retag(|from, to, tag| {
            let mid = nalgebra::center(from, to);
            match plane.classify(&mid, EPSILON) {
                PlaneClassification::OnPlane => EdgeTag::Cut,
                side if side == away => EdgeTag::Cut,
                _ => tag,
            }
        });

        for pair in on_plane.windows(2) {
            let mid = nalgebra::center(&pair[0], &pair[1]);
            if self.contains_3d(&mid).1 == Containment::Inside {
                graph.add_edge_pair(&pair[0], &pair[1], EdgeTag::Cut);
            }
        }

        let all_cut = |tag: EdgeTag| tag == EdgeTag::Cut;
        Ok(Some(graph.polygonize(Some(&all_cut), Some(normal))))
    }

    /// Remove the regions lying behind any of the trimming polygons,
    /// keeping everything outside the obstructions
    pub fn trimmed_to(&self, polygons: &[Polygon]) -> Vec<Polygon> {
        let own_plane = self.plane();
        let trims: Vec<(&Polygon, Plane)> = polygons
            .iter()
            .map(|t| (t, t.plane()))
            .filter(|(_, p)| !p.normal.is_parallel_to(&own_plane.normal, EPSILON))
            .collect();
        if trims.is_empty() {
            return vec![self.clone()];
        }

        let mut segments: Vec<(Point3<f64>, Point3<f64>)> = Vec::new();
        for (trim, trim_plane) in &trims {
            let Some((origin, direction)) = own_plane.intersects_plane(trim_plane) else {
                continue;
            };
            let mut crossings: Vec<Point3<f64>> = Vec::new();
            for segment in self.segments().iter().chain(trim.segments().iter()) {
                if let Some((point, _)) = segment.intersects_infinite(&origin, &direction) {
                    crossings.push(point);
                }
            }
            let crossings = sort_along(crossings, &origin, &direction);
            for pair in crossings.windows(2) {
                let mid = nalgebra::center(&pair[0], &pair[1]);
                if self.contains_3d(&mid).1 == Containment::Inside && trim.contains_3d(&mid).0 {
                    segments.push((pair[0], pair[1]));
                }
            }
        }

        // Trims meeting at a T or crossing each other
        let mut points: Vec<Point3<f64>> = segments.iter().flat_map(|(a, b)| [*a, *b]).collect();
        for i in 0..trims.len() {
            for j in (i + 1)..trims.len() {
                let Some(point) = Plane::intersects_planes(&own_plane, &trims[i].1, &trims[j].1)
                else {
                    continue;
                };
                let covered = self.contains_3d(&point).0
                    && trims[i].0.contains_3d(&point).0
                    && trims[j].0.contains_3d(&point).0;
                if covered {
                    points.push(point);
                }
            }
        }
        points.extend_from_slice(self.vertices());

        let normal = own_plane.normal;
        let mut graph = HalfEdgeGraph2d::new(normal);
        add_split_boundary(&mut graph, self, &points);
        for (a, b) in &segments {
            let chain = subdivide(a, b, &points);
            for pair in chain.windows(2) {
                graph.add_edge_pair(&pair[0], &pair[1], EdgeTag::Cut);
            }
        }

        let offset = sample_offset(self);
        graph.retag(|from, to, _| {
            let along = (to - from).unitized();
            let left = normal.cross(&along);
            let sample = nalgebra::center(from, to) + left * offset;
            let behind = trims.iter().any(|(trim, plane)| {
                plane.signed_distance_to(&sample) < 0.0
                    && trim.contains_3d(&plane.project(&sample)).0
            });
            if behind {
                EdgeTag::Cut
            } else {
                EdgeTag::Boundary
            }
        });

        let all_cut = |tag: EdgeTag| tag == EdgeTag::Cut;
        graph.polygonize(Some(&all_cut), Some(normal))
    }

    /// Split by polylines lying in this polygon's plane. Returns the polygon
    /// itself when nothing splits it.
    pub fn split(&self, polylines: &[Polyline]) -> Vec<Polygon> {
        let boundary = self.segments();
        let mut boundary_points: Vec<Point3<f64>> = Vec::new();
        let mut cuts: Vec<(Point3<f64>, Point3<f64>)> = Vec::new();

        for polyline in polylines {
            for segment in polyline.segments() {
                let mut points = vec![segment.start, segment.end];
                for edge in &boundary {
                    if let Some(point) = segment.intersects(edge, true) {
                        points.push(point);
                        boundary_points.push(point);
                    }
                }
                for v in self.vertices() {
                    if segment.point_on_line(v, true, EPSILON) {
                        points.push(*v);
                    }
                }
                let points = sort_along(points, &segment.start, &segment.direction());
                for pair in points.windows(2) {
                    let mid = nalgebra::center(&pair[0], &pair[1]);
                    if self.contains_3d(&mid).1 == Containment::Inside {
                        cuts.push((pair[0], pair[1]));
                    }
                }
            }
        }
        if cuts.is_empty() {
            return vec![self.clone()];
        }

        let mut split_points = boundary_points;
        split_points.extend(cuts.iter().flat_map(|(a, b)| [*a, *b]));

        let normal = self.normal();
        let mut graph = HalfEdgeGraph2d::new(normal);
        add_split_boundary(&mut graph, self, &split_points);
        for (a, b) in &cuts {
            let chain = subdivide(a, b, &split_points);
            for pair in chain.windows(2) {
                graph.add_edge_pair(&pair[0], &pair[1], EdgeTag::Cut);
            }
        }

        let pieces = graph.polygonize(None, Some(normal));
        if pieces.is_empty() {
            log::debug!("split produced no loops, keeping the original polygon");
            return vec![self.clone()];
        }
        pieces
    }
}
