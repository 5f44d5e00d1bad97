// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for geometry construction and cell complex mutation

use thiserror::Error;

/// Invalid geometric input rejected at construction time
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("vector components must be finite, got ({x}, {y}, {z})")]
    NonFinite { x: f64, y: f64, z: f64 },

    #[error("line start and end are coincident")]
    DegenerateLine,

    #[error("vector has zero length")]
    ZeroLengthVector,

    #[error("polyline requires at least 2 distinct vertices, got {0}")]
    TooFewPolylineVertices(usize),

    #[error("polygon requires at least 3 distinct vertices, got {0}")]
    TooFewVertices(usize),

    #[error("polygon vertices are not coplanar")]
    NotCoplanar,

    #[error("polygon is self-intersecting between segments {0} and {1}")]
    SelfIntersecting(usize, usize),

    #[error("unsupported sweep path: {0}")]
    UnsupportedPath(String),
}

/// Errors raised while building or replaying a cell complex
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CellComplexError {
    #[error("{kind} with id {id} already exists")]
    DuplicateId { kind: &'static str, id: u64 },

    #[error("{kind} with id {id} does not exist")]
    Missing { kind: &'static str, id: u64 },

    #[error("{kind} id {id} is outside the valid range")]
    InvalidId { kind: &'static str, id: u64 },

    #[error("edge must connect two distinct vertices, got {0} and {1}")]
    DegenerateEdge(u64, u64),

    #[error("edges {0:?} do not form a single closed loop")]
    OpenLoop(Vec<u64>),

    #[error("cell {cell} uses face {face} as bottom or top without bounding it")]
    DetachedFace { cell: u64, face: u64 },

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}
