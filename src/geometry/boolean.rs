// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Planar polygon booleans on the integer clipping grid

use super::clipper::{
    from_geo_multi, point_in_path, to_clipper_path, to_geo, to_geo_multi, to_polygon_repaired,
    ClipperPath, IntPoint,
};
use super::polygon::Polygon;
use super::polyline::Curve;
use super::vector::EPSILON;
use crate::utils::math::to_grid;
use geo::{BooleanOps, Contains, Intersects, MultiPolygon, Polygon as GeoPolygon};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BooleanOperation {
    Difference,
    Union,
    Intersection,
    XOr,
}

/// How overlapping polygons within one input set combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VoidTreatment {
    /// Even-odd fill: a polygon nested inside another cuts a hole
    #[default]
    PreserveInternalVoids,
    /// Non-zero fill: nested polygons are solid
    IgnoreInternalVoids,
}

/// Combine one input set into a region under the fill rule
fn fill(paths: &[ClipperPath], voids: VoidTreatment) -> MultiPolygon<f64> {
    let mut region = MultiPolygon::new(Vec::new());
    for path in paths {
        let next = to_geo_multi(std::slice::from_ref(path));
        region = match voids {
            VoidTreatment::PreserveInternalVoids => region.xor(&next),
            VoidTreatment::IgnoreInternalVoids => region.union(&next),
        };
    }
    region
}

/// Boolean of two polygon sets.
///
/// Polygons are projected to XY and snapped to a grid of spacing
/// `tolerance`. Holes come back as separate polygons wound opposite to
/// their container. `None` when the result is empty.
pub fn boolean_two_sets(
    subjects: &[Polygon],
    clips: &[Polygon],
    operation: BooleanOperation,
    voids: VoidTreatment,
    tolerance: f64,
) -> Option<Vec<Polygon>> {
    let encode = |polygons: &[Polygon]| -> Vec<ClipperPath> {
        polygons
            .iter()
            .map(|p| to_clipper_path(p, tolerance))
            .collect()
    };
    let subject = fill(&encode(subjects), voids);
    let clip = fill(&encode(clips), voids);

    let result = match operation {
        BooleanOperation::Difference => subject.difference(&clip),
        BooleanOperation::Union => subject.union(&clip),
        BooleanOperation::Intersection => subject.intersection(&clip),
        BooleanOperation::XOr => subject.xor(&clip),
    };

    let polygons: Vec<Polygon> = from_geo_multi(&result)
        .iter()
        .filter_map(|path| to_polygon_repaired(path, tolerance))
        .collect();
    log::debug!(
        "{:?} of {} subject(s) and {} clip(s) produced {} polygon(s)",
        operation,
        subjects.len(),
        clips.len(),
        polygons.len()
    );
    if polygons.is_empty() {
        None
    } else {
        Some(polygons)
    }
}

fn grid_point(point: &Point3<f64>) -> IntPoint {
    IntPoint {
        x: to_grid(point.x, EPSILON),
        y: to_grid(point.y, EPSILON),
    }
}

impl Polygon {
    pub fn union(&self, other: &Polygon) -> Option<Vec<Polygon>> {
        boolean_two_sets(
            std::slice::from_ref(self),
            std::slice::from_ref(other),
            BooleanOperation::Union,
            VoidTreatment::PreserveInternalVoids,
            EPSILON,
        )
    }

    /// Union of many polygons, nested ones treated as solid
    pub fn union_all(polygons: &[Polygon]) -> Option<Vec<Polygon>> {
        boolean_two_sets(
            polygons,
            &[],
            BooleanOperation::Union,
            VoidTreatment::IgnoreInternalVoids,
            EPSILON,
        )
    }

    pub fn difference(&self, other: &Polygon) -> Option<Vec<Polygon>> {
        boolean_two_sets(
            std::slice::from_ref(self),
            std::slice::from_ref(other),
            BooleanOperation::Difference,
            VoidTreatment::PreserveInternalVoids,
            EPSILON,
        )
    }

    pub fn intersection(&self, other: &Polygon) -> Option<Vec<Polygon>> {
        boolean_two_sets(
            std::slice::from_ref(self),
            std::slice::from_ref(other),
            BooleanOperation::Intersection,
            VoidTreatment::PreserveInternalVoids,
            EPSILON,
        )
    }

    pub fn xor(&self, other: &Polygon) -> Option<Vec<Polygon>> {
        boolean_two_sets(
            std::slice::from_ref(self),
            std::slice::from_ref(other),
            BooleanOperation::XOr,
            VoidTreatment::PreserveInternalVoids,
            EPSILON,
        )
    }

    /// Grid classification of a point in XY: 0 outside, 1 inside,
    /// -1 on the boundary
    fn classify_point(&self, point: &Point3<f64>) -> i32 {
        point_in_path(grid_point(point), &to_clipper_path(self, EPSILON))
    }

    /// Point strictly inside
    pub fn contains_point(&self, point: &Point3<f64>) -> bool {
        self.classify_point(point) == 1
    }

    /// Point inside or on the boundary
    pub fn covers_point(&self, point: &Point3<f64>) -> bool {
        self.classify_point(point) != 0
    }

    /// Point on the boundary
    pub fn touches_point(&self, point: &Point3<f64>) -> bool {
        self.classify_point(point) == -1
    }

    pub fn disjoint_point(&self, point: &Point3<f64>) -> bool {
        self.classify_point(point) == 0
    }

    pub fn intersects_point(&self, point: &Point3<f64>) -> bool {
        !self.disjoint_point(point)
    }

    /// Both polygons as geo polygons on the clipping grid
    fn grid_pair(&self, other: &Polygon) -> (GeoPolygon<f64>, GeoPolygon<f64>) {
        (
            to_geo(&to_clipper_path(self, EPSILON)),
            to_geo(&to_clipper_path(other, EPSILON)),
        )
    }

    /// `other` lies in the interior, clear of the boundary
    pub fn contains(&self, other: &Polygon) -> bool {
        let (mine, theirs) = self.grid_pair(other);
        mine.contains(&theirs) && !mine.exterior().intersects(theirs.exterior())
    }

    /// No point of `other` lies outside; boundary contact allowed
    pub fn covers(&self, other: &Polygon) -> bool {
        let (mine, theirs) = self.grid_pair(other);
        mine.contains(&theirs)
    }

    /// Shares any point with `other`, boundary included
    pub fn intersects(&self, other: &Polygon) -> bool {
        let (mine, theirs) = self.grid_pair(other);
        mine.intersects(&theirs)
    }

    pub fn disjoint(&self, other: &Polygon) -> bool {
        !self.intersects(other)
    }

    /// Boundaries meet but interiors do not overlap
    pub fn touches(&self, other: &Polygon) -> bool {
        self.intersects(other) && self.intersection(other).is_none()
    }
}
