// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

use super::{check_id, Added, CellComplex};
use crate::error::CellComplexError;
use crate::geometry::Line;
use std::collections::BTreeSet;

/// Segment between two vertices with the ids of the faces using it
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: u64,
    pub start_vertex_id: u64,
    pub end_vertex_id: u64,
    pub faces: BTreeSet<u64>,
}

impl Edge {
    pub fn vertex_ids(&self) -> [u64; 2] {
        [self.start_vertex_id, self.end_vertex_id]
    }

    /// Vertex at the other end from `vertex_id`
    pub fn other_vertex(&self, vertex_id: u64) -> Option<u64> {
        if vertex_id == self.start_vertex_id {
            Some(self.end_vertex_id)
        } else if vertex_id == self.end_vertex_id {
            Some(self.start_vertex_id)
        } else {
            None
        }
    }

    pub fn has_vertex(&self, vertex_id: u64) -> bool {
        self.start_vertex_id == vertex_id || self.end_vertex_id == vertex_id
    }
}

/// Lookup key independent of edge direction
pub(super) fn edge_key(a: u64, b: u64) -> (u64, u64) {
    (a.min(b), a.max(b))
}

impl CellComplex {
    /// Add the edge between two existing vertices, or return the edge
    /// already joining them in either direction
    pub fn add_edge(
        &mut self,
        vertex_ids: [u64; 2],
        id_if_new: Option<u64>,
    ) -> Result<Added, CellComplexError> {
        if let Some(id) = id_if_new {
            check_id("edge", id)?;
        }
        let [start, end] = vertex_ids;
        if start == end {
            return Err(CellComplexError::DegenerateEdge(start, end));
        }
        for id in vertex_ids {
            if self.vertices.get(id).is_none() {
                return Err(Self::missing("vertex", id));
            }
        }

        if let Some(&existing) = self.edge_lookup.get(&edge_key(start, end)) {
            return match id_if_new {
                Some(id) if id != existing => {
                    Err(CellComplexError::DuplicateId { kind: "edge", id })
                }
                _ => Ok(Added {
                    id: existing,
                    is_new: false,
                }),
            };
        }

        let id = id_if_new.unwrap_or(self.next_edge_id);
        if self.edges.contains_key(&id) {
            return Err(CellComplexError::DuplicateId { kind: "edge", id });
        }
        self.insert_edge(id, start, end);
        Ok(Added { id, is_new: true })
    }

    pub(super) fn insert_edge(&mut self, id: u64, start: u64, end: u64) {
        self.edges.insert(
            id,
            Edge {
                id,
                start_vertex_id: start,
                end_vertex_id: end,
                faces: BTreeSet::new(),
            },
        );
        self.edge_lookup.insert(edge_key(start, end), id);
        for vertex_id in [start, end] {
            if let Some(vertex) = self.vertices.get_mut(vertex_id) {
                vertex.edges.insert(id);
            }
        }
        self.next_edge_id = self.next_edge_id.max(id + 1);
    }

    /// Edge joining two vertices in either direction
    pub fn edge_between(&self, a: u64, b: u64) -> Option<u64> {
        self.edge_lookup.get(&edge_key(a, b)).copied()
    }

    /// Segment geometry of an edge, start to end
    pub fn edge_line(&self, edge_id: u64) -> Option<Line> {
        let edge = self.edges.get(&edge_id)?;
        let start = self.vertex_point(edge.start_vertex_id)?;
        let end = self.vertex_point(edge.end_vertex_id)?;
        Line::new(start, end).ok()
    }
}
