// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Non-manifold cell complex
//!
//! Vertices, edges, faces and cells are stored by id with back-references
//! in both directions: a vertex knows its edges, an edge its faces, a face
//! its cells. Vertices and orientations are deduplicated by coordinates
//! within the complex tolerance, edges by their unordered vertex pair and
//! faces by their edge set, so adding the same geometry twice returns the
//! existing id. Ids are issued by per-kind counters that never move
//! backwards; removed ids are not reused.

mod cell;
mod data;
mod edge;
mod export;
mod face;
mod located;
mod split;

pub use cell::Cell;
pub use data::{CellComplexData, CellData, EdgeData, FaceData, NextIds};
pub use edge::Edge;
pub use export::{Color, ModelElement};
pub use face::Face;
pub use located::{Located, LocatedKind, LocatedStore, Orientation, Vertex};
pub use split::{EdgeSplit, SplitFaceResult};

use crate::error::CellComplexError;
use crate::geometry::EPSILON;
use ahash::AHashMap;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Largest id accepted from callers and persisted data. Id 0 is reserved.
pub const MAX_ID: u64 = i64::MAX as u64;

/// Reject ids outside `1..=MAX_ID`
pub(crate) fn check_id(kind: &'static str, id: u64) -> Result<u64, CellComplexError> {
    if id == 0 || id > MAX_ID {
        return Err(CellComplexError::InvalidId { kind, id });
    }
    Ok(id)
}

/// Result of an add operation: the id and whether the entity is new
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Added {
    pub id: u64,
    pub is_new: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "CellComplexData", into = "CellComplexData")]
pub struct CellComplex {
    tolerance: f64,
    vertices: LocatedStore<Vertex>,
    orientations: LocatedStore<Orientation>,
    edges: BTreeMap<u64, Edge>,
    edge_lookup: AHashMap<(u64, u64), u64>,
    next_edge_id: u64,
    faces: BTreeMap<u64, Face>,
    face_lookup: AHashMap<Vec<u64>, u64>,
    next_face_id: u64,
    cells: BTreeMap<u64, Cell>,
    next_cell_id: u64,
}

impl CellComplex {
    pub fn new() -> Self {
        Self::with_tolerance(EPSILON)
    }

    /// Empty complex deduplicating coordinates within `tolerance`
    pub fn with_tolerance(tolerance: f64) -> Self {
        Self {
            tolerance,
            vertices: LocatedStore::new(),
            orientations: LocatedStore::new(),
            edges: BTreeMap::new(),
            edge_lookup: AHashMap::new(),
            next_edge_id: 1,
            faces: BTreeMap::new(),
            face_lookup: AHashMap::new(),
            next_face_id: 1,
            cells: BTreeMap::new(),
            next_cell_id: 1,
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Add a vertex or orientation, returning the id of an existing one
    /// within tolerance. An explicit `id_if_new` is used only when the
    /// entity is created and must not collide with another id.
    pub fn add_vertex_or_orientation(
        &mut self,
        kind: LocatedKind,
        value: Vector3<f64>,
        id_if_new: Option<u64>,
    ) -> Result<u64, CellComplexError> {
        let tolerance = self.tolerance;
        let (id, _) = match (kind, id_if_new) {
            (LocatedKind::Point, None) => self.vertices.get_or_insert(value, tolerance),
            (LocatedKind::Point, Some(id)) => self.vertices.insert_with_id(value, id, tolerance)?,
            (LocatedKind::Direction, None) => self.orientations.get_or_insert(value, tolerance),
            (LocatedKind::Direction, Some(id)) => {
                self.orientations.insert_with_id(value, id, tolerance)?
            }
        };
        Ok(id)
    }

    /// Vertex at `point`, created if needed
    pub fn add_vertex(&mut self, point: &Point3<f64>) -> u64 {
        self.vertices.get_or_insert(point.coords, self.tolerance).0
    }

    /// Orientation along `direction`, created if needed
    pub fn add_orientation(&mut self, direction: &Vector3<f64>) -> u64 {
        self.orientations.get_or_insert(*direction, self.tolerance).0
    }

    /// Vertex within the complex tolerance of `point`, scaled by `fuzzy`
    pub fn vertex_id_at(&self, point: &Point3<f64>, fuzzy: Option<f64>) -> Option<u64> {
        self.vertices
            .find(&point.coords, self.tolerance * fuzzy.unwrap_or(1.0))
    }

    pub fn vertex(&self, id: u64) -> Option<&Vertex> {
        self.vertices.get(id)
    }

    pub fn vertex_point(&self, id: u64) -> Option<Point3<f64>> {
        self.vertices.get(id).map(|v| v.point)
    }

    pub fn orientation(&self, id: u64) -> Option<&Orientation> {
        self.orientations.get(id)
    }

    pub fn edge(&self, id: u64) -> Option<&Edge> {
        self.edges.get(&id)
    }

    pub fn face(&self, id: u64) -> Option<&Face> {
        self.faces.get(&id)
    }

    pub fn cell(&self, id: u64) -> Option<&Cell> {
        self.cells.get(&id)
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.iter()
    }

    pub fn orientations(&self) -> impl Iterator<Item = &Orientation> {
        self.orientations.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn faces(&self) -> impl Iterator<Item = &Face> {
        self.faces.values()
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn orientation_count(&self) -> usize {
        self.orientations.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Ids the next new entity of each kind will receive
    pub fn next_ids(&self) -> NextIds {
        NextIds {
            vertex: self.vertices.next_id(),
            orientation: self.orientations.next_id(),
            edge: self.next_edge_id,
            face: self.next_face_id,
            cell: self.next_cell_id,
        }
    }

    fn reserve_ids(&mut self, next: &NextIds) {
        self.vertices.reserve_ids_below(next.vertex);
        self.orientations.reserve_ids_below(next.orientation);
        self.next_edge_id = self.next_edge_id.max(next.edge);
        self.next_face_id = self.next_face_id.max(next.face);
        self.next_cell_id = self.next_cell_id.max(next.cell);
    }

    fn missing(kind: &'static str, id: u64) -> CellComplexError {
        CellComplexError::Missing { kind, id }
    }
}

impl Default for CellComplex {
    fn default() -> Self {
        Self::new()
    }
}
