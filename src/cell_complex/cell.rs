// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

use super::{check_id, CellComplex};
use crate::error::CellComplexError;
use crate::geometry::{Curve, Polygon};
use nalgebra::Vector3;

/// Closed volume bounded by faces, with optional bottom and top
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub id: u64,
    pub face_ids: Vec<u64>,
    pub bottom_face_id: Option<u64>,
    pub top_face_id: Option<u64>,
}

impl CellComplex {
    /// Register a cell over existing faces. Returns `false` when the id is
    /// taken or out of range, a face does not exist, or the bottom or top
    /// face is not among `face_ids`.
    pub fn add_cell(
        &mut self,
        id: u64,
        face_ids: Vec<u64>,
        bottom_face_id: Option<u64>,
        top_face_id: Option<u64>,
    ) -> bool {
        if self.cells.contains_key(&id) || check_id("cell", id).is_err() {
            return false;
        }
        if let Some(missing) = face_ids.iter().find(|f| !self.faces.contains_key(f)) {
            log::warn!("cell {} references missing face {}", id, missing);
            return false;
        }
        if let Some(detached) = [bottom_face_id, top_face_id]
            .into_iter()
            .flatten()
            .find(|f| !face_ids.contains(f))
        {
            log::warn!("cell {} bottom or top face {} is not one of its faces", id, detached);
            return false;
        }
        for face_id in &face_ids {
            if let Some(face) = self.faces.get_mut(face_id) {
                face.cells.insert(id);
            }
        }
        self.cells.insert(
            id,
            Cell {
                id,
                face_ids,
                bottom_face_id,
                top_face_id,
            },
        );
        self.next_cell_id = self.next_cell_id.max(id + 1);
        true
    }

    /// Extrude a horizontal polygon into a cell: bottom at `elevation`,
    /// top `height` above and one vertical quad per bottom edge. Faces
    /// shared with existing cells are reused.
    pub fn add_cell_from_polygon(
        &mut self,
        polygon: &Polygon,
        height: f64,
        elevation: f64,
        u: Option<Vector3<f64>>,
        v: Option<Vector3<f64>>,
    ) -> Result<u64, CellComplexError> {
        let rise = Vector3::z() * height;
        let bottom = polygon.translated(Vector3::z() * elevation);
        let top = bottom.translated(rise);

        let bottom_id = self.add_face(&bottom, None, u, v)?.id;
        let top_id = self.add_face(&top, None, u, v)?.id;
        let mut face_ids = vec![bottom_id, top_id];
        for segment in bottom.segments() {
            let side = Polygon::new(vec![
                segment.start,
                segment.end,
                segment.end + rise,
                segment.start + rise,
            ])?;
            let along = segment.end - segment.start;
            face_ids.push(self.add_face(&side, None, Some(along), Some(Vector3::z()))?.id);
        }

        let id = self.next_cell_id;
        if !self.add_cell(id, face_ids, Some(bottom_id), Some(top_id)) {
            return Err(CellComplexError::DuplicateId { kind: "cell", id });
        }
        log::debug!("added cell {} at elevation {}", id, elevation);
        Ok(id)
    }

    /// Remove a cell and detach it from its faces
    pub fn remove_cell(&mut self, cell_id: u64) -> Option<Cell> {
        let cell = self.cells.remove(&cell_id)?;
        for face_id in &cell.face_ids {
            if let Some(face) = self.faces.get_mut(face_id) {
                face.cells.remove(&cell_id);
            }
        }
        Some(cell)
    }
}
