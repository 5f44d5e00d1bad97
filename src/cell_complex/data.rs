// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Persisted form of a cell complex
//!
//! Only ids, coordinates and forward references are stored. Loading
//! replays everything through the add methods, which rebuild the lookups
//! and back-references.

use super::{check_id, CellComplex, LocatedKind, MAX_ID};
use crate::error::CellComplexError;
use crate::geometry::EPSILON;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeData {
    pub start_vertex_id: u64,
    pub end_vertex_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceData {
    pub edge_ids: Vec<u64>,
    #[serde(default)]
    pub u: Option<u64>,
    #[serde(default)]
    pub v: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellData {
    pub face_ids: Vec<u64>,
    #[serde(default)]
    pub bottom_face_id: Option<u64>,
    #[serde(default)]
    pub top_face_id: Option<u64>,
}

/// Id counters, kept so ids freed before saving are not reissued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextIds {
    pub vertex: u64,
    pub orientation: u64,
    pub edge: u64,
    pub face: u64,
    pub cell: u64,
}

impl Default for NextIds {
    fn default() -> Self {
        Self {
            vertex: 1,
            orientation: 1,
            edge: 1,
            face: 1,
            cell: 1,
        }
    }
}

fn default_tolerance() -> f64 {
    EPSILON
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellComplexData {
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default)]
    pub vertices: BTreeMap<u64, Point3<f64>>,
    #[serde(default)]
    pub orientations: BTreeMap<u64, Vector3<f64>>,
    #[serde(default)]
    pub edges: BTreeMap<u64, EdgeData>,
    #[serde(default)]
    pub faces: BTreeMap<u64, FaceData>,
    #[serde(default)]
    pub cells: BTreeMap<u64, CellData>,
    #[serde(default)]
    pub next_ids: NextIds,
}

impl CellComplex {
    /// Rebuild a complex from persisted data. Any id conflict is an error.
    pub fn from_data(data: CellComplexData) -> Result<Self, CellComplexError> {
        let next = data.next_ids;
        for (kind, counter) in [
            ("vertex", next.vertex),
            ("orientation", next.orientation),
            ("edge", next.edge),
            ("face", next.face),
            ("cell", next.cell),
        ] {
            if counter > MAX_ID + 1 {
                return Err(CellComplexError::InvalidId { kind, id: counter });
            }
        }

        let mut complex = CellComplex::with_tolerance(data.tolerance);

        for (id, point) in &data.vertices {
            complex.add_vertex_or_orientation(LocatedKind::Point, point.coords, Some(*id))?;
        }
        for (id, direction) in &data.orientations {
            complex.add_vertex_or_orientation(LocatedKind::Direction, *direction, Some(*id))?;
        }
        for (id, edge) in &data.edges {
            let added = complex.add_edge([edge.start_vertex_id, edge.end_vertex_id], Some(*id))?;
            if !added.is_new {
                return Err(CellComplexError::DuplicateId { kind: "edge", id: *id });
            }
        }
        for (id, face) in data.faces {
            let added = complex.add_face_from_edges(face.edge_ids, Some(id), face.u, face.v)?;
            if !added.is_new {
                return Err(CellComplexError::DuplicateId { kind: "face", id });
            }
        }
        for (id, cell) in data.cells {
            check_id("cell", id)?;
            if let Some(missing) = cell.face_ids.iter().find(|f| complex.face(**f).is_none()) {
                return Err(CellComplexError::Missing {
                    kind: "face",
                    id: *missing,
                });
            }
            if let Some(face) = [cell.bottom_face_id, cell.top_face_id]
                .into_iter()
                .flatten()
                .find(|f| !cell.face_ids.contains(f))
            {
                return Err(CellComplexError::DetachedFace { cell: id, face });
            }
            if !complex.add_cell(id, cell.face_ids, cell.bottom_face_id, cell.top_face_id) {
                return Err(CellComplexError::DuplicateId { kind: "cell", id });
            }
        }

        complex.reserve_ids(&data.next_ids);
        log::debug!(
            "replayed complex with {} vertices, {} edges, {} faces, {} cells",
            complex.vertex_count(),
            complex.edge_count(),
            complex.face_count(),
            complex.cell_count()
        );
        Ok(complex)
    }

    pub fn to_data(&self) -> CellComplexData {
        CellComplexData {
            tolerance: self.tolerance,
            vertices: self.vertices.iter().map(|v| (v.id, v.point)).collect(),
            orientations: self
                .orientations
                .iter()
                .map(|o| (o.id, o.direction))
                .collect(),
            edges: self
                .edges
                .values()
                .map(|e| {
                    (
                        e.id,
                        EdgeData {
                            start_vertex_id: e.start_vertex_id,
                            end_vertex_id: e.end_vertex_id,
                        },
                    )
                })
                .collect(),
            faces: self
                .faces
                .values()
                .map(|f| {
                    (
                        f.id,
                        FaceData {
                            edge_ids: f.edge_ids.clone(),
                            u: f.u,
                            v: f.v,
                        },
                    )
                })
                .collect(),
            cells: self
                .cells
                .values()
                .map(|c| {
                    (
                        c.id,
                        CellData {
                            face_ids: c.face_ids.clone(),
                            bottom_face_id: c.bottom_face_id,
                            top_face_id: c.top_face_id,
                        },
                    )
                })
                .collect(),
            next_ids: self.next_ids(),
        }
    }
}

impl TryFrom<CellComplexData> for CellComplex {
    type Error = CellComplexError;

    fn try_from(data: CellComplexData) -> Result<Self, Self::Error> {
        CellComplex::from_data(data)
    }
}

impl From<CellComplex> for CellComplexData {
    fn from(complex: CellComplex) -> Self {
        complex.to_data()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Polygon;

    fn two_cells() -> CellComplex {
        let mut complex = CellComplex::new();
        let a = Polygon::rectangle(Point3::origin(), 1.0, 1.0).unwrap();
        let b = Polygon::rectangle(Point3::new(1.0, 0.0, 0.0), 1.0, 1.0).unwrap();
        complex
            .add_cell_from_polygon(&a, 1.0, 0.0, Some(Vector3::x()), Some(Vector3::y()))
            .unwrap();
        complex.add_cell_from_polygon(&b, 1.0, 0.0, None, None).unwrap();
        complex
    }

    #[test]
    fn test_replay_preserves_topology() {
        let complex = two_cells();
        let restored = CellComplex::from_data(complex.to_data()).unwrap();
        assert_eq!(restored.vertex_count(), complex.vertex_count());
        assert_eq!(restored.orientation_count(), complex.orientation_count());
        assert_eq!(restored.edge_count(), complex.edge_count());
        assert_eq!(restored.face_count(), complex.face_count());
        assert_eq!(restored.cell_count(), complex.cell_count());
        assert_eq!(restored.next_ids(), complex.next_ids());

        for edge in complex.edges() {
            assert_eq!(restored.edge(edge.id).unwrap().faces, edge.faces);
        }
        for face in complex.faces() {
            assert_eq!(restored.face(face.id).unwrap().cells, face.cells);
        }
        assert_eq!(restored.to_data(), complex.to_data());
    }

    #[test]
    fn test_removed_ids_not_reissued_after_reload() {
        let mut complex = two_cells();
        let last = complex.faces().map(|f| f.id).max().unwrap();
        complex.remove_face(last);
        let mut restored = CellComplex::from_data(complex.to_data()).unwrap();
        let square = Polygon::rectangle(Point3::new(5.0, 5.0, 0.0), 1.0, 1.0).unwrap();
        let added = restored.add_face(&square, None, None, None).unwrap();
        assert_eq!(added.id, last + 1);
    }

    #[test]
    fn test_replay_rejects_duplicate_vertices() {
        let mut data = CellComplexData {
            tolerance: EPSILON,
            vertices: BTreeMap::new(),
            orientations: BTreeMap::new(),
            edges: BTreeMap::new(),
            faces: BTreeMap::new(),
            cells: BTreeMap::new(),
            next_ids: NextIds::default(),
        };
        data.vertices.insert(1, Point3::new(0.0, 0.0, 0.0));
        data.vertices.insert(2, Point3::new(0.0, 0.0, 0.0));
        assert_eq!(
            CellComplex::from_data(data).unwrap_err(),
            CellComplexError::DuplicateId { kind: "vertex", id: 2 }
        );
    }

    #[test]
    fn test_replay_rejects_duplicate_edges() {
        let mut data = two_cells().to_data();
        let first = data.edges[&1];
        data.edges.insert(100, first);
        assert_eq!(
            CellComplex::from_data(data).unwrap_err(),
            CellComplexError::DuplicateId { kind: "edge", id: 100 }
        );
    }

    #[test]
    fn test_replay_rejects_out_of_range_ids() {
        let mut data = CellComplexData {
            tolerance: EPSILON,
            vertices: BTreeMap::new(),
            orientations: BTreeMap::new(),
            edges: BTreeMap::new(),
            faces: BTreeMap::new(),
            cells: BTreeMap::new(),
            next_ids: NextIds::default(),
        };
        data.vertices.insert(u64::MAX, Point3::origin());
        assert_eq!(
            CellComplex::from_data(data.clone()).unwrap_err(),
            CellComplexError::InvalidId { kind: "vertex", id: u64::MAX }
        );

        data.vertices.clear();
        data.orientations.insert(0, Vector3::x());
        assert_eq!(
            CellComplex::from_data(data.clone()).unwrap_err(),
            CellComplexError::InvalidId { kind: "orientation", id: 0 }
        );

        data.orientations.clear();
        data.next_ids.face = u64::MAX;
        assert_eq!(
            CellComplex::from_data(data).unwrap_err(),
            CellComplexError::InvalidId { kind: "face", id: u64::MAX }
        );

        let mut data = two_cells().to_data();
        let first = data.edges.remove(&1).unwrap();
        data.edges.insert(u64::MAX, first);
        for face in data.faces.values_mut() {
            for edge_id in face.edge_ids.iter_mut().filter(|e| **e == 1) {
                *edge_id = u64::MAX;
            }
        }
        assert_eq!(
            CellComplex::from_data(data).unwrap_err(),
            CellComplexError::InvalidId { kind: "edge", id: u64::MAX }
        );

        let mut data = two_cells().to_data();
        let cell = data.cells.remove(&1).unwrap();
        data.cells.insert(0, cell);
        assert_eq!(
            CellComplex::from_data(data).unwrap_err(),
            CellComplexError::InvalidId { kind: "cell", id: 0 }
        );
    }

    #[test]
    fn test_replay_rejects_open_face_loop() {
        let mut data = two_cells().to_data();
        let face = data.faces.get_mut(&1).unwrap();
        let dropped = face.edge_ids.pop().unwrap();
        let broken = face.edge_ids.clone();
        assert_eq!(
            CellComplex::from_data(data.clone()).unwrap_err(),
            CellComplexError::OpenLoop(broken.clone())
        );

        // An edge from elsewhere in place of the dropped one
        let stray = *data
            .edges
            .keys()
            .find(|&&id| !broken.contains(&id) && id != dropped)
            .unwrap();
        let face = data.faces.get_mut(&1).unwrap();
        face.edge_ids.push(stray);
        let err = CellComplex::from_data(data).unwrap_err();
        assert!(matches!(err, CellComplexError::OpenLoop(_)));
    }

    #[test]
    fn test_replay_rejects_broken_cells() {
        let mut data = two_cells().to_data();
        data.cells.get_mut(&1).unwrap().face_ids.push(999);
        assert_eq!(
            CellComplex::from_data(data).unwrap_err(),
            CellComplexError::Missing { kind: "face", id: 999 }
        );

        let mut data = two_cells().to_data();
        let cell = data.cells.get_mut(&1).unwrap();
        let bottom = cell.bottom_face_id.unwrap();
        cell.face_ids.retain(|&f| f != bottom);
        assert_eq!(
            CellComplex::from_data(data).unwrap_err(),
            CellComplexError::DetachedFace { cell: 1, face: bottom }
        );

        let mut data = two_cells().to_data();
        let other_top = data.cells[&2].top_face_id;
        data.cells.get_mut(&1).unwrap().top_face_id = other_top;
        assert_eq!(
            CellComplex::from_data(data).unwrap_err(),
            CellComplexError::DetachedFace { cell: 1, face: other_top.unwrap() }
        );
    }

    #[test]
    fn test_json_round_trip() {
        let complex = two_cells();
        let json = serde_json::to_string(&complex).unwrap();
        let restored: CellComplex = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.to_data(), complex.to_data());

        let broken = json.replacen("\"start_vertex_id\":1", "\"start_vertex_id\":999", 1);
        assert!(serde_json::from_str::<CellComplex>(&broken).is_err());
    }
}
