// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Planar half-edge graph used to split and trim polygons
//! Closed loops are recovered from the graph by always taking the leftmost turn

use super::polygon::Polygon;
use super::polyline::{Curve, Polyline};
use super::vector::{PointExt, VectorExt, EPSILON};
use crate::utils::math::to_grid;
use ahash::{AHashMap, AHashSet};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Origin of a directed edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeTag {
    /// Part of an input polygon's boundary
    Boundary,
    /// Introduced by a cutting curve or a trim
    Cut,
}

/// Directed edge between two graph vertices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectedEdge {
    pub from: usize,
    pub to: usize,
    pub tag: EdgeTag,
}

/// Directed planar graph with vertices merged within `EPSILON`
#[derive(Debug, Clone)]
pub struct HalfEdgeGraph2d {
    /// Vertex positions
    pub vertices: Vec<Point3<f64>>,
    /// Outgoing edges, indexed by their `from` vertex
    pub edges_per_vertex: Vec<Vec<DirectedEdge>>,
    /// Loops are wound counter-clockwise about this normal
    normal: Vector3<f64>,
    lookup: AHashMap<(i64, i64, i64), Vec<usize>>,
}

impl HalfEdgeGraph2d {
    /// Create an empty graph whose loops wind about `normal`
    pub fn new(normal: Vector3<f64>) -> Self {
        Self {
            vertices: Vec::new(),
            edges_per_vertex: Vec::new(),
            normal: normal.unitized(),
            lookup: AHashMap::new(),
        }
    }

    /// Graph of every polygon's boundary plus both directions of every
    /// polyline segment. The first polygon's normal is the reference normal.
    pub fn construct(polygons: &[Polygon], polylines: &[Polyline]) -> Self {
        let normal = polygons.first().map_or(Vector3::z(), Polygon::normal);
        let mut graph = Self::new(normal);
        for polygon in polygons {
            graph.add_polygon(polygon);
        }
        for polyline in polylines {
            for segment in polyline.segments() {
                graph.add_edge_pair(&segment.start, &segment.end, EdgeTag::Cut);
            }
        }
        graph
    }

    pub fn normal(&self) -> Vector3<f64> {
        self.normal
    }

    fn grid_key(point: &Point3<f64>) -> (i64, i64, i64) {
        (
            to_grid(point.x, EPSILON),
            to_grid(point.y, EPSILON),
            to_grid(point.z, EPSILON),
        )
    }

    /// Index of the vertex within `EPSILON` of `point`, if any
    pub fn find_vertex(&self, point: &Point3<f64>) -> Option<usize> {
        let (x, y, z) = Self::grid_key(point);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(candidates) = self.lookup.get(&(x + dx, y + dy, z + dz)) else {
                        continue;
                    };
                    if let Some(&index) = candidates
                        .iter()
                        .find(|&&i| self.vertices[i].is_almost_equal(point, EPSILON))
                    {
                        return Some(index);
                    }
                }
            }
        }
        None
    }

    /// Add a vertex, returning the existing index for a coincident point
    pub fn add_vertex(&mut self, point: Point3<f64>) -> usize {
        if let Some(index) = self.find_vertex(&point) {
            return index;
        }
        let index = self.vertices.len();
        self.vertices.push(point);
        self.edges_per_vertex.push(Vec::new());
        self.lookup
            .entry(Self::grid_key(&point))
            .or_default()
            .push(index);
        index
    }

    /// Add a directed edge. Self-loops and repeats of an existing
    /// `from -> to` edge are ignored; returns whether the edge was added.
    pub fn add_edge(&mut self, from: usize, to: usize, tag: EdgeTag) -> bool {
        if from == to || self.edges_per_vertex[from].iter().any(|e| e.to == to) {
            return false;
        }
        self.edges_per_vertex[from].push(DirectedEdge { from, to, tag });
        true
    }

    pub fn add_edge_between(&mut self, from: &Point3<f64>, to: &Point3<f64>, tag: EdgeTag) -> bool {
        let from = self.add_vertex(*from);
        let to = self.add_vertex(*to);
        self.add_edge(from, to, tag)
    }

    /// Add both directions of a segment
    pub fn add_edge_pair(&mut self, a: &Point3<f64>, b: &Point3<f64>, tag: EdgeTag) {
        self.add_edge_between(a, b, tag);
        self.add_edge_between(b, a, tag);
    }

    /// One `Boundary` edge per polygon segment
    pub fn add_polygon(&mut self, polygon: &Polygon) {
        for segment in polygon.segments() {
            self.add_edge_between(&segment.start, &segment.end, EdgeTag::Boundary);
        }
    }

    /// Retag every edge with `f(from, to, current)`
    pub fn retag(&mut self, mut f: impl FnMut(&Point3<f64>, &Point3<f64>, EdgeTag) -> EdgeTag) {
        for edges in &mut self.edges_per_vertex {
            for edge in edges.iter_mut() {
                edge.tag = f(&self.vertices[edge.from], &self.vertices[edge.to], edge.tag);
            }
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges_per_vertex.iter().map(Vec::len).sum()
    }

    /// Outgoing edge at `vertex` making the leftmost turn after arriving
    /// from `previous`. The way back is taken only at dead ends.
    fn next_edge(&self, previous: usize, vertex: usize) -> Option<usize> {
        let outgoing = &self.edges_per_vertex[vertex];
        let back = self.vertices[previous] - self.vertices[vertex];
        let mut best: Option<(usize, f64)> = None;
        for (i, edge) in outgoing.iter().enumerate() {
            if edge.to == previous {
                continue;
            }
            let out = self.vertices[edge.to] - self.vertices[vertex];
            let angle = back.plane_angle_to(&out, &self.normal);
            if best.map_or(true, |(_, a)| angle > a) {
                best = Some((i, angle));
            }
        }
        best.map(|(i, _)| i)
            .or_else(|| outgoing.iter().position(|e| e.to == previous))
    }

    /// Extract closed loops.
    ///
    /// Each directed edge is consumed by at most one loop. A loop whose
    /// edges all satisfy `tag_filter` is excluded; with `normal` set, loops
    /// wound opposite to it are discarded. Loops that do not form a valid
    /// polygon are dropped.
    pub fn polygonize(
        &self,
        tag_filter: Option<&dyn Fn(EdgeTag) -> bool>,
        normal: Option<Vector3<f64>>,
    ) -> Vec<Polygon> {
        let mut visited: Vec<Vec<bool>> = self
            .edges_per_vertex
            .iter()
            .map(|edges| vec![false; edges.len()])
            .collect();
        let mut polygons = Vec::new();
        let max_steps = self.edge_count() + 1;

        for start_vertex in 0..self.vertices.len() {
            for start_index in 0..self.edges_per_vertex[start_vertex].len() {
                if visited[start_vertex][start_index] {
                    continue;
                }
                let Some(path) = self.walk(start_vertex, start_index, &visited, max_steps) else {
                    continue;
                };
                for &(vertex, index) in &path {
                    visited[vertex][index] = true;
                }

                let (indices, tags): (Vec<usize>, Vec<EdgeTag>) = path
                    .iter()
                    .map(|&(vertex, index)| (vertex, self.edges_per_vertex[vertex][index].tag))
                    .unzip();
                if let Some(filter) = tag_filter {
                    if tags.iter().all(|&t| filter(t)) {
                        continue;
                    }
                }
                let points: Vec<Point3<f64>> = indices.iter().map(|&i| self.vertices[i]).collect();
                let polygon = match Polygon::new(points) {
                    Ok(polygon) => polygon,
                    Err(err) => {
                        log::debug!("dropping loop of {} vertices: {err}", indices.len());
                        continue;
                    }
                };
                if let Some(n) = normal {
                    if polygon.normal().dot(&n) < 0.0 {
                        continue;
                    }
                }
                polygons.push(polygon);
            }
        }

        let stranded = visited.iter().flatten().filter(|v| !**v).count();
        if stranded > 0 {
            log::warn!("{} directed edges are not on any closed loop", stranded);
        }
        polygons
    }

    /// Follow leftmost turns from one edge back to it, returning the
    /// `(vertex, edge index)` of every edge on the loop. Fails on an edge
    /// already taken by another loop or a cycle that misses the start.
    fn walk(
        &self,
        start_vertex: usize,
        start_index: usize,
        visited: &[Vec<bool>],
        max_steps: usize,
    ) -> Option<Vec<(usize, usize)>> {
        let mut path = Vec::new();
        let mut seen = AHashSet::new();
        let (mut vertex, mut index) = (start_vertex, start_index);
        for _ in 0..max_steps {
            if visited[vertex][index] || !seen.insert((vertex, index)) {
                return None;
            }
            path.push((vertex, index));

            let edge = self.edges_per_vertex[vertex][index];
            let next = self.next_edge(edge.from, edge.to)?;
            if edge.to == start_vertex && next == start_index {
                return Some(path);
            }
            vertex = edge.to;
            index = next;
        }
        None
    }
}

impl Default for HalfEdgeGraph2d {
    fn default() -> Self {
        Self::new(Vector3::z())
    }
}
