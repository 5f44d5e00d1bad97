// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Polycell Kernel
//!
//! Boundary-representation primitives (lines, planes, polylines, polygons,
//! rays, swept solids), winding-number containment, polygon booleans on an
//! integer grid, polygon trimming and splitting through a half-edge graph,
//! and a non-manifold cell complex of vertices, edges, faces and cells.

pub mod cell_complex;
pub mod config;
pub mod error;
pub mod geometry;
pub mod utils;

pub use cell_complex::{CellComplex, CellComplexData, LocatedKind, ModelElement, SplitFaceResult};
pub use config::{set_validation_enabled, validation_enabled, KernelConfig};
pub use error::{CellComplexError, GeometryError};
pub use geometry::{
    boolean_two_sets, BooleanOperation, Containment, Line, Plane, Polygon, Polyline, Ray,
    VoidTreatment,
};

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn test_basic_cell() {
        let footprint = Polygon::rectangle(Point3::origin(), 10.0, 10.0).unwrap();
        let mut complex = CellComplex::new();
        let cell = complex
            .add_cell_from_polygon(&footprint, 3.0, 0.0, None, None)
            .unwrap();
        assert_eq!(complex.cell(cell).unwrap().face_ids.len(), 6);
    }
}
