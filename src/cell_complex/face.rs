// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

use super::{check_id, Added, CellComplex};
use crate::error::{CellComplexError, GeometryError};
use crate::geometry::{Curve, Polygon};
use ahash::AHashMap;
use nalgebra::{Point3, Vector3};
use std::collections::BTreeSet;

/// Planar loop of edges, optionally carrying U and V grid orientations
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub id: u64,
    /// Edge ids in loop order
    pub edge_ids: Vec<u64>,
    pub u: Option<u64>,
    pub v: Option<u64>,
    pub cells: BTreeSet<u64>,
}

/// Order-independent lookup key for an edge loop
pub(super) fn face_key(edge_ids: &[u64]) -> Vec<u64> {
    let mut key = edge_ids.to_vec();
    key.sort_unstable();
    key
}

impl CellComplex {
    /// Add a face from a polygon, creating vertices, edges and
    /// orientations as needed. A face over the same edge set is returned
    /// instead of duplicated.
    pub fn add_face(
        &mut self,
        polygon: &Polygon,
        id_if_new: Option<u64>,
        u: Option<Vector3<f64>>,
        v: Option<Vector3<f64>>,
    ) -> Result<Added, CellComplexError> {
        let u = u.map(|d| self.add_orientation(&d));
        let v = v.map(|d| self.add_orientation(&d));
        self.add_polygon_face(polygon, id_if_new, u, v)
    }

    /// [`Self::add_face`] with orientations given by id
    pub(super) fn add_polygon_face(
        &mut self,
        polygon: &Polygon,
        id_if_new: Option<u64>,
        u: Option<u64>,
        v: Option<u64>,
    ) -> Result<Added, CellComplexError> {
        let mut vertex_ids: Vec<u64> = polygon
            .vertices()
            .iter()
            .map(|p| self.add_vertex(p))
            .collect();
        vertex_ids.dedup();
        while vertex_ids.len() > 1 && vertex_ids.first() == vertex_ids.last() {
            vertex_ids.pop();
        }
        if vertex_ids.len() < 3 {
            return Err(GeometryError::TooFewVertices(vertex_ids.len()).into());
        }

        let mut edge_ids = Vec::with_capacity(vertex_ids.len());
        for (i, &a) in vertex_ids.iter().enumerate() {
            let b = vertex_ids[(i + 1) % vertex_ids.len()];
            edge_ids.push(self.add_edge([a, b], None)?.id);
        }
        self.add_face_from_edges(edge_ids, id_if_new, u, v)
    }

    /// Add a face over existing edges given in loop order
    pub fn add_face_from_edges(
        &mut self,
        edge_ids: Vec<u64>,
        id_if_new: Option<u64>,
        u: Option<u64>,
        v: Option<u64>,
    ) -> Result<Added, CellComplexError> {
        for &id in &edge_ids {
            if !self.edges.contains_key(&id) {
                return Err(Self::missing("edge", id));
            }
        }
        for id in [u, v].into_iter().flatten() {
            if self.orientations.get(id).is_none() {
                return Err(Self::missing("orientation", id));
            }
        }

        if let Some(id) = id_if_new {
            check_id("face", id)?;
        }

        let key = face_key(&edge_ids);
        if key.windows(2).any(|w| w[0] == w[1]) {
            log::error!("face loop repeats an edge: {:?}", edge_ids);
        }
        if !self.is_closed_loop(&edge_ids) {
            return Err(CellComplexError::OpenLoop(edge_ids));
        }
        if let Some(&existing) = self.face_lookup.get(&key) {
            return match id_if_new {
                Some(id) if id != existing => {
                    Err(CellComplexError::DuplicateId { kind: "face", id })
                }
                _ => Ok(Added {
                    id: existing,
                    is_new: false,
                }),
            };
        }

        let id = id_if_new.unwrap_or(self.next_face_id);
        if self.faces.contains_key(&id) {
            return Err(CellComplexError::DuplicateId { kind: "face", id });
        }
        for edge_id in &edge_ids {
            if let Some(edge) = self.edges.get_mut(edge_id) {
                edge.faces.insert(id);
            }
        }
        self.face_lookup.insert(key, id);
        self.faces.insert(
            id,
            Face {
                id,
                edge_ids,
                u,
                v,
                cells: BTreeSet::new(),
            },
        );
        self.next_face_id = self.next_face_id.max(id + 1);
        Ok(Added { id, is_new: true })
    }

    /// Whether the edges chain into one cycle: at least three edges, every
    /// vertex on exactly two of them, all reachable from the first
    fn is_closed_loop(&self, edge_ids: &[u64]) -> bool {
        let Some(edges) = edge_ids
            .iter()
            .map(|id| self.edges.get(id))
            .collect::<Option<Vec<_>>>()
        else {
            return false;
        };
        if edges.len() < 3 {
            return false;
        }

        let mut incident: AHashMap<u64, Vec<usize>> = AHashMap::new();
        for (i, edge) in edges.iter().enumerate() {
            for vertex_id in edge.vertex_ids() {
                incident.entry(vertex_id).or_default().push(i);
            }
        }
        if incident.values().any(|e| e.len() != 2) {
            return false;
        }

        let start = edges[0].start_vertex_id;
        let mut current = edges[0].end_vertex_id;
        let mut previous = 0;
        let mut walked = 1;
        while current != start {
            let Some(&next) = incident
                .get(&current)
                .and_then(|e| e.iter().find(|&&i| i != previous))
            else {
                return false;
            };
            let Some(other) = edges[next].other_vertex(current) else {
                return false;
            };
            previous = next;
            current = other;
            walked += 1;
        }
        walked == edges.len()
    }

    /// Vertex ids around a face, following its edge loop
    pub fn face_vertex_ids(&self, face_id: u64) -> Option<Vec<u64>> {
        let face = self.faces.get(&face_id)?;
        let edges = face
            .edge_ids
            .iter()
            .map(|id| self.edges.get(id))
            .collect::<Option<Vec<_>>>()?;
        let n = edges.len();
        if n < 3 {
            return None;
        }

        // The loop enters the first edge at the vertex shared with the last
        let first = edges[0];
        let start = if edges[n - 1].has_vertex(first.start_vertex_id) {
            first.start_vertex_id
        } else {
            first.end_vertex_id
        };
        let mut ids = vec![start];
        let mut used = vec![false; n];
        used[0] = true;
        let mut current = first.other_vertex(start)?;
        while current != start {
            ids.push(current);
            let next = (1..n).find(|&i| !used[i] && edges[i].has_vertex(current))?;
            used[next] = true;
            current = edges[next].other_vertex(current)?;
        }
        if used.iter().any(|u| !u) {
            log::warn!("face {} edges do not form a single loop", face_id);
            return None;
        }
        Some(ids)
    }

    /// Polygon through a face's vertices in loop order
    pub fn face_polygon(&self, face_id: u64) -> Option<Polygon> {
        let points = self
            .face_vertex_ids(face_id)?
            .into_iter()
            .map(|id| self.vertex_point(id))
            .collect::<Option<Vec<Point3<f64>>>>()?;
        match Polygon::new(points) {
            Ok(polygon) => Some(polygon),
            Err(err) => {
                log::warn!("face {} is not a valid polygon: {}", face_id, err);
                None
            }
        }
    }

    /// Remove a face and detach it from its edges and cells. Cells that
    /// used it as bottom or top lose that designation.
    pub fn remove_face(&mut self, face_id: u64) -> Option<Face> {
        let face = self.faces.remove(&face_id)?;
        self.face_lookup.remove(&face_key(&face.edge_ids));
        for edge_id in &face.edge_ids {
            if let Some(edge) = self.edges.get_mut(edge_id) {
                edge.faces.remove(&face_id);
            }
        }
        for cell_id in &face.cells {
            if let Some(cell) = self.cells.get_mut(cell_id) {
                cell.face_ids.retain(|&id| id != face_id);
                if cell.bottom_face_id == Some(face_id) {
                    cell.bottom_face_id = None;
                }
                if cell.top_face_id == Some(face_id) {
                    cell.top_face_id = None;
                }
            }
        }
        log::trace!("removed face {}", face_id);
        Some(face)
    }
}
