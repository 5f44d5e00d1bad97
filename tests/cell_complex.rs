// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Cell complex adjacency scenarios

use anyhow::Result;
use nalgebra::{Point3, Vector3};
use polycell::cell_complex::{CellComplex, LocatedKind, ModelElement};
use polycell::geometry::{Curve, Polygon, Polyline};

fn unit_square(x: f64, y: f64) -> Result<Polygon> {
    Ok(Polygon::rectangle(Point3::new(x, y, 0.0), 1.0, 1.0)?)
}

/// Every id in use is below the next id for its kind
fn assert_ids_below_counters(complex: &CellComplex) {
    let next = complex.next_ids();
    assert!(complex.vertices().all(|v| v.id < next.vertex));
    assert!(complex.orientations().all(|o| o.id < next.orientation));
    assert!(complex.edges().all(|e| e.id < next.edge));
    assert!(complex.faces().all(|f| f.id < next.face));
    assert!(complex.cells().all(|c| c.id < next.cell));
}

#[test]
fn test_dedup_is_idempotent() -> Result<()> {
    let mut complex = CellComplex::new();
    let value = Vector3::new(3.0, 4.0, 5.0);
    let first = complex.add_vertex_or_orientation(LocatedKind::Point, value, None)?;
    let counter = complex.next_ids().vertex;
    let second = complex.add_vertex_or_orientation(LocatedKind::Point, value, None)?;
    assert_eq!(first, second);
    assert_eq!(complex.next_ids().vertex, counter);
    Ok(())
}

#[test]
fn test_single_cube() -> Result<()> {
    let mut complex = CellComplex::new();
    let cell = complex.add_cell_from_polygon(&unit_square(0.0, 0.0)?, 1.0, 0.0, None, None)?;

    assert_eq!(complex.cell(cell).map(|c| c.face_ids.len()), Some(6));
    assert_eq!(complex.face_count(), 6);
    assert_eq!(complex.edge_count(), 12);
    // Each face is exterior: it belongs to the one cell only
    assert!(complex.faces().all(|f| f.cells.len() == 1));
    assert!(complex.edges().all(|e| e.faces.len() == 2));
    Ok(())
}

#[test]
fn test_adjacent_cubes() -> Result<()> {
    let mut complex = CellComplex::new();
    let a = complex.add_cell_from_polygon(&unit_square(0.0, 0.0)?, 1.0, 0.0, None, None)?;
    let b = complex.add_cell_from_polygon(&unit_square(1.0, 0.0)?, 1.0, 0.0, None, None)?;

    assert_eq!(complex.face_count(), 11);
    let shared: Vec<_> = complex.faces().filter(|f| f.cells.len() == 2).collect();
    assert_eq!(shared.len(), 1);
    assert_eq!(shared[0].cells.iter().copied().collect::<Vec<_>>(), vec![a, b]);

    let shared_edges = &shared[0].edge_ids;
    for edge in complex.edges() {
        let expected = if shared_edges.contains(&edge.id) { 3 } else { 2 };
        assert_eq!(edge.faces.len(), expected, "edge {}", edge.id);
    }
    Ok(())
}

#[test]
fn test_edge_split_between_cubes() -> Result<()> {
    let mut complex = CellComplex::new();
    complex.add_cell_from_polygon(&unit_square(0.0, 0.0)?, 1.0, 0.0, None, None)?;
    complex.add_cell_from_polygon(&unit_square(1.0, 0.0)?, 1.0, 0.0, None, None)?;
    let faces_before = complex.face_count();

    let low = complex.vertex_id_at(&Point3::new(1.0, 0.0, 0.0), None).expect("corner");
    let high = complex.vertex_id_at(&Point3::new(1.0, 0.0, 1.0), None).expect("corner");
    let edge = complex.edge_between(low, high).expect("vertical edge");
    let users = complex.edge(edge).map(|e| e.faces.clone()).unwrap_or_default();
    assert_eq!(users.len(), 3);

    let split = complex
        .try_split_edge(edge, &Point3::new(1.0, 0.0, 0.25))
        .expect("point lies inside the edge");
    assert_eq!(complex.face_count(), faces_before);
    for face_id in &users {
        let face = complex.face(*face_id).expect("face survives");
        assert!(face.edge_ids.contains(&edge));
        assert!(face.edge_ids.contains(&split.edge_id));
        let polygon = complex.face_polygon(*face_id).expect("valid loop");
        assert_eq!(polygon.vertices().len(), 5);
    }
    assert_ids_below_counters(&complex);
    Ok(())
}

#[test]
fn test_split_cell_in_grid() -> Result<()> {
    let mut complex = CellComplex::new();
    for x in 0..2 {
        complex.add_cell_from_polygon(&unit_square(x as f64, 0.0)?, 1.0, 0.0, None, None)?;
    }
    let cut = Polyline::new(vec![Point3::new(0.5, -1.0, 0.0), Point3::new(0.5, 2.0, 0.0)])?;
    let cells = complex.try_split_cell(1, &cut).expect("cut crosses the first cell");
    assert_eq!(cells.len(), 2);
    assert_eq!(complex.cell_count(), 3);
    for id in &cells {
        assert_eq!(complex.cell(*id).map(|c| c.face_ids.len()), Some(6));
    }
    // The untouched neighbour still shares its side face
    let neighbour = complex.cell(2).expect("neighbour cell");
    assert_eq!(neighbour.face_ids.len(), 6);
    assert_ids_below_counters(&complex);
    Ok(())
}

#[test]
fn test_ids_after_removal() -> Result<()> {
    let mut complex = CellComplex::new();
    let first = complex.add_face(&unit_square(0.0, 0.0)?, None, None, None)?.id;
    complex.remove_face(first);
    let second = complex.add_face(&unit_square(0.0, 0.0)?, None, None, None)?.id;
    assert!(second > first);
    assert!(complex.face(first).is_none());
    assert_ids_below_counters(&complex);
    Ok(())
}

#[test]
fn test_model_elements_cover_faces() -> Result<()> {
    let mut complex = CellComplex::new();
    complex.add_cell_from_polygon(&unit_square(0.0, 0.0)?, 1.0, 0.0, None, None)?;
    let elements = complex.to_model_elements(true, false);
    let panels = elements
        .iter()
        .filter(|e| matches!(e, ModelElement::Panel { .. }))
        .count();
    let markers = elements
        .iter()
        .filter(|e| matches!(e, ModelElement::VertexMarker { .. }))
        .count();
    assert_eq!(panels, 6);
    assert_eq!(markers, 8);
    Ok(())
}
