// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Topology-preserving splits of edges, faces and cells

use super::edge::edge_key;
use super::face::face_key;
use super::CellComplex;
use crate::error::CellComplexError;
use crate::geometry::{Containment, Curve, Plane, Polygon, Polyline, EPSILON};
use crate::utils::math::approx_eq;
use nalgebra::{Point3, Vector3};
use std::collections::BTreeSet;

/// Outcome of splitting an edge: the inserted vertex and the new edge
/// running from it to the original end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeSplit {
    pub vertex_id: u64,
    pub edge_id: u64,
}

/// Outcome of splitting a face
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitFaceResult {
    /// Faces replacing the original
    pub faces: Vec<u64>,
    /// Vertices where the polyline crossed existing edges
    pub external_vertices: Vec<u64>,
    /// Polyline vertices inside the original face
    pub internal_vertices: Vec<u64>,
}

/// A point strictly inside `polygon`, preferring its center
fn interior_point(polygon: &Polygon) -> Point3<f64> {
    let center = polygon.center();
    if polygon.contains_3d(&center).1 == Containment::Inside {
        return center;
    }
    let v = polygon.vertices();
    for i in 1..v.len() - 1 {
        let centroid = Point3::from((v[0].coords + v[i].coords + v[i + 1].coords) / 3.0);
        if polygon.contains_3d(&centroid).1 == Containment::Inside {
            return centroid;
        }
    }
    center
}

impl CellComplex {
    /// Split an edge at a point strictly between its ends. The original
    /// edge keeps its id and now ends at the new vertex; every face using
    /// it gains the new edge in loop order.
    pub fn try_split_edge(&mut self, edge_id: u64, point: &Point3<f64>) -> Option<EdgeSplit> {
        let line = self.edge_line(edge_id)?;
        if !line.point_on_line(point, false, self.tolerance) {
            return None;
        }
        let edge = self.edges.get(&edge_id)?.clone();
        let (start, end) = (edge.start_vertex_id, edge.end_vertex_id);

        let existing = self.vertex_id_at(point, None);
        if let Some(vertex_id) = existing {
            if vertex_id == start || vertex_id == end {
                return None;
            }
            if self.edge_between(start, vertex_id).is_some()
                || self.edge_between(vertex_id, end).is_some()
            {
                log::warn!("splitting edge {} would duplicate an edge", edge_id);
                return None;
            }
        }

        // Where the new edge goes in each face's loop
        let mut placements = Vec::with_capacity(edge.faces.len());
        for face_id in &edge.faces {
            let face = self.faces.get(face_id)?;
            let n = face.edge_ids.len();
            let Some(pos) = face.edge_ids.iter().position(|&e| e == edge_id) else {
                continue;
            };
            let previous = self.edges.get(&face.edge_ids[(pos + n - 1) % n])?;
            let forward = previous.has_vertex(start);
            placements.push((*face_id, if forward { pos + 1 } else { pos }));
        }

        let vertex_id = match existing {
            Some(id) => id,
            None => self.add_vertex(point),
        };
        self.edge_lookup.remove(&edge_key(start, end));
        if let Some(e) = self.edges.get_mut(&edge_id) {
            e.end_vertex_id = vertex_id;
        }
        self.edge_lookup.insert(edge_key(start, vertex_id), edge_id);
        if let Some(v) = self.vertices.get_mut(end) {
            v.edges.remove(&edge_id);
        }
        if let Some(v) = self.vertices.get_mut(vertex_id) {
            v.edges.insert(edge_id);
        }

        let new_edge_id = self.next_edge_id;
        self.insert_edge(new_edge_id, vertex_id, end);
        if let Some(e) = self.edges.get_mut(&new_edge_id) {
            e.faces = edge.faces.clone();
        }
        for (face_id, index) in placements {
            if let Some(face) = self.faces.get_mut(&face_id) {
                self.face_lookup.remove(&face_key(&face.edge_ids));
                face.edge_ids.insert(index, new_edge_id);
                self.face_lookup.insert(face_key(&face.edge_ids), face_id);
            }
        }
        log::trace!(
            "split edge {} at vertex {}, new edge {}",
            edge_id,
            vertex_id,
            new_edge_id
        );
        Some(EdgeSplit {
            vertex_id,
            edge_id: new_edge_id,
        })
    }

    /// Split an edge where it crosses `plane`
    pub fn try_split_edge_with_plane(&mut self, edge_id: u64, plane: &Plane) -> Option<EdgeSplit> {
        let line = self.edge_line(edge_id)?;
        let point = plane.intersects_line(&line)?;
        self.try_split_edge(edge_id, &point)
    }

    /// Split a face by a polyline in its plane.
    ///
    /// With `perimeter_split` every edge of the complex crossed by the
    /// polyline is split first so neighbouring faces stay conforming; the
    /// split is abandoned when no edge is crossed. The original face is
    /// removed and its pieces take its place in every cell it belonged to.
    /// Edge splits already made are kept when the face itself does not
    /// split.
    pub fn try_split_face(
        &mut self,
        face_id: u64,
        polyline: &Polyline,
        perimeter_split: bool,
    ) -> Option<SplitFaceResult> {
        if !self.faces.contains_key(&face_id) {
            return None;
        }

        let mut external: Vec<u64> = Vec::new();
        if perimeter_split {
            for segment in polyline.segments() {
                let reach = segment.bounds();
                let edge_ids: Vec<u64> = self.edges.keys().copied().collect();
                for edge_id in edge_ids {
                    let Some(line) = self.edge_line(edge_id) else {
                        continue;
                    };
                    if !reach.intersects(&line.bounds(), EPSILON) {
                        continue;
                    }
                    let Some(point) = segment.intersects(&line, true) else {
                        continue;
                    };
                    if let Some(split) = self.try_split_edge(edge_id, &point) {
                        external.push(split.vertex_id);
                    } else if let Some(vertex_id) = self.vertex_id_at(&point, None) {
                        external.push(vertex_id);
                    }
                }
            }
            external.sort_unstable();
            external.dedup();
            if external.is_empty() {
                log::debug!("polyline crosses no edge of face {}", face_id);
                return None;
            }
        }

        let polygon = self.face_polygon(face_id)?;
        let pieces = polygon.split(std::slice::from_ref(polyline));
        if pieces.len() < 2 {
            log::debug!("face {} not split", face_id);
            return None;
        }

        let mut known: BTreeSet<u64> = self.face_vertex_ids(face_id)?.into_iter().collect();
        known.extend(external.iter().copied());
        let original = self.remove_face(face_id)?;

        let mut faces = Vec::with_capacity(pieces.len());
        let mut internal = Vec::new();
        for piece in &pieces {
            let id = match self.add_polygon_face(piece, None, original.u, original.v) {
                Ok(added) => added.id,
                Err(err) => {
                    log::warn!("dropping piece of face {}: {}", face_id, err);
                    continue;
                }
            };
            for cell_id in &original.cells {
                if let Some(cell) = self.cells.get_mut(cell_id) {
                    if !cell.face_ids.contains(&id) {
                        cell.face_ids.push(id);
                    }
                }
                if let Some(face) = self.faces.get_mut(&id) {
                    face.cells.insert(*cell_id);
                }
            }
            for vertex_id in self.face_vertex_ids(id).unwrap_or_default() {
                if known.insert(vertex_id) {
                    internal.push(vertex_id);
                }
            }
            faces.push(id);
        }
        log::debug!("split face {} into {:?}", face_id, faces);
        Some(SplitFaceResult {
            faces,
            external_vertices: external,
            internal_vertices: internal,
        })
    }

    /// Faces using any edge incident to a vertex
    fn faces_at_vertex(&self, vertex_id: u64) -> BTreeSet<u64> {
        let Some(vertex) = self.vertices.get(vertex_id) else {
            return BTreeSet::new();
        };
        vertex
            .edges
            .iter()
            .filter_map(|e| self.edges.get(e))
            .flat_map(|e| e.faces.iter().copied())
            .collect()
    }

    /// Vertical face lying between two elevations
    fn is_side_face(&self, face_id: u64, bottom: f64, top: f64) -> bool {
        let Some(polygon) = self.face_polygon(face_id) else {
            return false;
        };
        let tolerance = self.tolerance.max(EPSILON);
        polygon.normal().z.abs() < EPSILON
            && polygon
                .vertices()
                .iter()
                .all(|v| v.z > bottom - tolerance && v.z < top + tolerance)
    }

    /// Split a cell with bottom and top faces by a polyline in plan.
    ///
    /// Bottom and top are split by the polyline lifted to their
    /// elevations, side faces are split vertically where it crosses them
    /// and a vertical face is added along every cut. The original cell is
    /// replaced by one cell per bottom piece, reusing the side faces that
    /// share its bottom edges. Returns the new cell ids.
    pub fn try_split_cell(&mut self, cell_id: u64, polyline: &Polyline) -> Option<Vec<u64>> {
        let cell = self.cells.get(&cell_id)?.clone();
        let (bottom_id, top_id) = (cell.bottom_face_id?, cell.top_face_id?);
        let bottom = self.face_polygon(bottom_id)?;
        let top = self.face_polygon(top_id)?;
        let z_bottom = bottom.vertices()[0].z;
        let z_top = top.vertices()[0].z;
        if approx_eq(z_top, z_bottom, EPSILON) {
            return None;
        }
        let rise = Vector3::z() * (z_top - z_bottom);
        let (low, high) = (z_bottom.min(z_top), z_bottom.max(z_top));

        let lower = polyline.at_elevation(z_bottom);
        let upper = polyline.at_elevation(z_top);
        if bottom.split(std::slice::from_ref(&lower)).len() < 2
            || top.split(std::slice::from_ref(&upper)).len() < 2
        {
            log::debug!("polyline does not split cell {}", cell_id);
            return None;
        }
        let bottom_split = self.try_split_face(bottom_id, &lower, true)?;
        let top_split = self.try_split_face(top_id, &upper, true)?;
        let new_bottoms: BTreeSet<u64> = bottom_split.faces.iter().copied().collect();
        let new_tops: BTreeSet<u64> = top_split.faces.iter().copied().collect();

        // Split side faces along verticals through the boundary crossings
        for &vertex_id in &bottom_split.external_vertices {
            let Some(point) = self.vertex_point(vertex_id) else {
                continue;
            };
            let Some(upper_id) = self.vertex_id_at(&(point + rise), None) else {
                continue;
            };
            let Ok(vertical) = Polyline::new(vec![point, point + rise]) else {
                continue;
            };
            let cell_faces: BTreeSet<u64> = match self.cells.get(&cell_id) {
                Some(c) => c.face_ids.iter().copied().collect(),
                None => continue,
            };
            let sides: Vec<u64> = self
                .faces_at_vertex(vertex_id)
                .into_iter()
                .filter(|f| {
                    cell_faces.contains(f) && !new_bottoms.contains(f) && !new_tops.contains(f)
                })
                .filter(|&f| {
                    self.face_vertex_ids(f)
                        .is_some_and(|ids| ids.contains(&upper_id))
                })
                .collect();
            for side in sides {
                self.try_split_face(side, &vertical, false);
            }
        }

        // Vertical faces along the cuts between bottom pieces
        let mut cut_edges: BTreeSet<u64> = BTreeSet::new();
        for face_id in &bottom_split.faces {
            let Some(face) = self.faces.get(face_id) else {
                continue;
            };
            for edge_id in &face.edge_ids {
                let shared = self
                    .edges
                    .get(edge_id)
                    .map_or(0, |e| e.faces.intersection(&new_bottoms).count());
                if shared >= 2 {
                    cut_edges.insert(*edge_id);
                }
            }
        }
        for edge_id in cut_edges {
            let Some(line) = self.edge_line(edge_id) else {
                continue;
            };
            let added = Polygon::new(vec![line.start, line.end, line.end + rise, line.start + rise])
                .map_err(CellComplexError::from)
                .and_then(|quad| {
                    self.add_face(&quad, None, Some(line.end - line.start), Some(Vector3::z()))
                });
            if let Err(err) = added {
                log::warn!("could not add internal face along edge {}: {}", edge_id, err);
            }
        }

        self.remove_cell(cell_id);
        let mut new_cells = Vec::with_capacity(bottom_split.faces.len());
        for &bottom_face in &bottom_split.faces {
            let Some(polygon) = self.face_polygon(bottom_face) else {
                continue;
            };
            let sample = interior_point(&polygon) + rise;
            let top_face = top_split.faces.iter().copied().find(|&f| {
                self.face_polygon(f)
                    .is_some_and(|p| p.contains_3d(&sample).1 == Containment::Inside)
            });
            let Some(top_face) = top_face else {
                log::warn!("no top face above bottom face {}", bottom_face);
                continue;
            };

            let mut sides: BTreeSet<u64> = BTreeSet::new();
            let edge_ids = self
                .faces
                .get(&bottom_face)
                .map(|f| f.edge_ids.clone())
                .unwrap_or_default();
            for edge_id in edge_ids {
                let Some(edge) = self.edges.get(&edge_id) else {
                    continue;
                };
                for &f in &edge.faces {
                    if !new_bottoms.contains(&f) && self.is_side_face(f, low, high) {
                        sides.insert(f);
                    }
                }
            }

            let mut face_ids = vec![bottom_face, top_face];
            face_ids.extend(sides);
            let id = self.next_cell_id;
            if self.add_cell(id, face_ids, Some(bottom_face), Some(top_face)) {
                new_cells.push(id);
            }
        }
        log::debug!("split cell {} into {:?}", cell_id, new_cells);
        Some(new_cells)
    }
}
