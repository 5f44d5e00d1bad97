// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Read-only renderable view of a cell complex

use super::CellComplex;
use crate::geometry::Polygon;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// RGBA color with components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const PANEL: Color = Color::new(0.8, 0.8, 0.8, 0.5);
    pub const VERTEX: Color = Color::new(0.1, 0.1, 0.1, 1.0);
    /// Edge without faces
    pub const LOOSE: Color = Color::new(0.5, 0.5, 0.5, 1.0);
    /// Edge on one face
    pub const NAKED: Color = Color::new(1.0, 0.0, 0.0, 1.0);
    /// Edge on two faces
    pub const MANIFOLD: Color = Color::new(0.0, 0.0, 1.0, 1.0);
    /// Edge on more than two faces
    pub const NON_MANIFOLD: Color = Color::new(0.0, 0.8, 0.0, 1.0);

    /// Edge color by number of incident faces
    pub fn for_face_count(count: usize) -> Color {
        match count {
            0 => Color::LOOSE,
            1 => Color::NAKED,
            2 => Color::MANIFOLD,
            _ => Color::NON_MANIFOLD,
        }
    }
}

/// Edge length of vertex marker cubes
pub const VERTEX_MARKER_SIZE: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ModelElement {
    Panel {
        face_id: u64,
        polygon: Polygon,
        color: Color,
    },
    VertexMarker {
        vertex_id: u64,
        center: Point3<f64>,
        size: f64,
        color: Color,
    },
    EdgeArrow {
        edge_id: u64,
        start: Point3<f64>,
        end: Point3<f64>,
        color: Color,
    },
}

impl CellComplex {
    /// Panels for every face, then optional vertex markers and edge arrows
    pub fn to_model_elements(&self, include_vertices: bool, include_edges: bool) -> Vec<ModelElement> {
        let mut elements: Vec<ModelElement> = self
            .faces
            .keys()
            .filter_map(|&face_id| {
                let polygon = self.face_polygon(face_id)?;
                Some(ModelElement::Panel {
                    face_id,
                    polygon,
                    color: Color::PANEL,
                })
            })
            .collect();

        if include_vertices {
            elements.extend(self.vertices.iter().map(|v| ModelElement::VertexMarker {
                vertex_id: v.id,
                center: v.point,
                size: VERTEX_MARKER_SIZE,
                color: Color::VERTEX,
            }));
        }

        if include_edges {
            for edge in self.edges.values() {
                let (Some(start), Some(end)) = (
                    self.vertex_point(edge.start_vertex_id),
                    self.vertex_point(edge.end_vertex_id),
                ) else {
                    continue;
                };
                elements.push(ModelElement::EdgeArrow {
                    edge_id: edge.id,
                    start,
                    end,
                    color: Color::for_face_count(edge.faces.len()),
                });
            }
        }
        elements
    }
}
