// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Saving and reloading cell complexes and polygons

use anyhow::Result;
use nalgebra::{Point3, Vector3};
use polycell::cell_complex::{CellComplex, CellComplexData};
use polycell::geometry::{Curve, Polygon, Polyline};
use std::fs;
use tempfile::TempDir;

fn grid(columns: usize, rows: usize) -> Result<CellComplex> {
    let mut complex = CellComplex::new();
    for row in 0..rows {
        for column in 0..columns {
            let footprint =
                Polygon::rectangle(Point3::new(column as f64, row as f64, 0.0), 1.0, 1.0)?;
            complex.add_cell_from_polygon(&footprint, 1.0, 0.0, Some(Vector3::x()), None)?;
        }
    }
    Ok(complex)
}

#[test]
fn test_complex_file_round_trip() -> Result<()> {
    let temp = TempDir::new()?;
    let path = temp.path().join("complex.json");

    let complex = grid(3, 2)?;
    fs::write(&path, serde_json::to_string_pretty(&complex)?)?;
    let restored: CellComplex = serde_json::from_str(&fs::read_to_string(&path)?)?;

    assert_eq!(restored.cell_count(), 6);
    assert_eq!(restored.face_count(), complex.face_count());
    assert_eq!(restored.to_data(), complex.to_data());
    Ok(())
}

#[test]
fn test_split_complex_survives_reload() -> Result<()> {
    let mut complex = grid(2, 1)?;
    let cut = Polyline::new(vec![Point3::new(0.5, -1.0, 0.0), Point3::new(0.5, 2.0, 0.0)])?;
    complex.try_split_cell(1, &cut).expect("cut crosses the cell");

    let json = serde_json::to_string(&complex)?;
    let mut restored: CellComplex = serde_json::from_str(&json)?;
    assert_eq!(restored.cell_count(), complex.cell_count());
    for face in complex.faces() {
        assert_eq!(
            restored.face_polygon(face.id).map(|p| p.vertices().len()),
            complex.face_polygon(face.id).map(|p| p.vertices().len())
        );
    }

    // Fresh ids continue after the saved counters
    let next = complex.next_ids();
    let added = restored.add_face(
        &Polygon::rectangle(Point3::new(10.0, 10.0, 0.0), 1.0, 1.0)?,
        None,
        None,
        None,
    )?;
    assert_eq!(added.id, next.face);
    Ok(())
}

#[test]
fn test_duplicate_face_ids_rejected() -> Result<()> {
    let mut data: CellComplexData = grid(1, 1)?.to_data();
    let first = data.faces.values().next().cloned().expect("a face");
    data.faces.insert(1000, first);
    let json = serde_json::to_string(&data)?;
    assert!(serde_json::from_str::<CellComplex>(&json).is_err());
    Ok(())
}

#[test]
fn test_polygon_json_is_validated() -> Result<()> {
    let polygon = Polygon::rectangle(Point3::origin(), 2.0, 3.0)?;
    let json = serde_json::to_string(&polygon)?;
    let back: Polygon = serde_json::from_str(&json)?;
    assert_eq!(back, polygon);

    let bow_tie = "[[0,0,0],[1,1,0],[1,0,0],[0,1,0]]";
    assert!(serde_json::from_str::<Polygon>(bow_tie).is_err());
    Ok(())
}

fn load(json: &str) -> Result<CellComplex, String> {
    serde_json::from_str::<CellComplex>(json).map_err(|e| e.to_string())
}

#[test]
fn test_corrupt_documents_rejected() -> Result<()> {
    let open_face = r#"{
        "vertices": {
            "1": [0, 0, 0], "2": [1, 0, 0], "3": [1, 1, 0],
            "4": [5, 5, 0], "5": [6, 5, 0]
        },
        "edges": {
            "1": {"start_vertex_id": 1, "end_vertex_id": 2},
            "2": {"start_vertex_id": 2, "end_vertex_id": 3},
            "3": {"start_vertex_id": 4, "end_vertex_id": 5}
        },
        "faces": {"1": {"edge_ids": [1, 2, 3]}}
    }"#;
    let err = load(open_face).expect_err("edges do not close");
    assert!(err.contains("do not form a single closed loop"), "{}", err);

    let closed = open_face.replace(
        r#""3": {"start_vertex_id": 4, "end_vertex_id": 5}"#,
        r#""3": {"start_vertex_id": 3, "end_vertex_id": 1}"#,
    );
    let complex = load(&closed).map_err(anyhow::Error::msg)?;
    assert!(complex.face_polygon(1).is_some());

    let huge_id = r#"{"vertices": {"18446744073709551615": [0, 0, 0]}}"#;
    let err = load(huge_id).expect_err("id out of range");
    assert!(err.contains("outside the valid range"), "{}", err);

    let zero_id = r#"{"vertices": {"0": [0, 0, 0]}}"#;
    assert!(load(zero_id).is_err());

    let mut data = grid(2, 1)?.to_data();
    let top_of_second = data.cells[&2].top_face_id;
    data.cells.get_mut(&1).expect("first cell").top_face_id = top_of_second;
    let err = load(&serde_json::to_string(&data)?).expect_err("top face not bounding");
    assert!(err.contains("without bounding it"), "{}", err);
    Ok(())
}
