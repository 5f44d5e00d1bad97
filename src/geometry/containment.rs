// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Winding-number point containment
//! Classifies a point against a closed boundary without trigonometry

use super::vector::EPSILON;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Classification of a point relative to a closed boundary.
///
/// Variants are ordered so that coincidence outranks `Inside` when several
/// classifications are aggregated with `max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Containment {
    Outside,
    Inside,
    CoincidesAtEdge,
    CoincidesAtVertex,
}

impl Containment {
    /// Inside or on the boundary
    pub fn is_covered(&self) -> bool {
        *self != Containment::Outside
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Left,
    Right,
    Center,
}

/// Side of the directed edge the location lies on, from the 2D cross product
fn side_of(location: &Point3<f64>, from: &Point3<f64>, to: &Point3<f64>) -> Side {
    let cross = (to.y - from.y) * (location.x - from.x) - (location.y - from.y) * (to.x - from.x);
    if cross > 0.0 {
        Side::Left
    } else if cross < 0.0 {
        Side::Right
    } else {
        Side::Center
    }
}

/// Test a point against a closed boundary given as directed edges in the XY
/// plane. Returns whether the point is covered and how.
///
/// Coincidence with an edge endpoint or with an edge interior short-circuits.
/// Otherwise a winding number is accumulated over edges "ascending" in x
/// relative to the point; the point is inside iff it is non-zero.
pub fn contains(edges: &[(Point3<f64>, Point3<f64>)], location: &Point3<f64>) -> (bool, Containment) {
    let mut winding_number: i32 = 0;

    for (from, to) in edges {
        let to_start = (location - from).xy();
        let to_end = (location - to).xy();
        if to_start.norm() < EPSILON || to_end.norm() < EPSILON {
            return (true, Containment::CoincidesAtVertex);
        }

        let edge = (to - from).xy();
        let edge_length = edge.norm();
        if edge_length > 0.0 {
            let along = to_start.dot(&(edge / edge_length));
            let perpendicular_sq = to_start.norm_squared() - along * along;
            if perpendicular_sq < EPSILON * EPSILON && to_start.dot(&to_end) < 0.0 {
                return (true, Containment::CoincidesAtEdge);
            }
        }

        let ascending = from.x <= location.x;
        if ascending {
            if to.x > location.x && side_of(location, from, to) == Side::Left {
                winding_number += 1;
            }
        } else if to.x <= location.x && side_of(location, from, to) == Side::Right {
            winding_number -= 1;
        }
    }

    if winding_number != 0 {
        (true, Containment::Inside)
    } else {
        (false, Containment::Outside)
    }
}

/// Closed-loop edges from an ordered vertex ring
pub fn ring_edges(vertices: &[Point3<f64>]) -> Vec<(Point3<f64>, Point3<f64>)> {
    (0..vertices.len())
        .map(|i| (vertices[i], vertices[(i + 1) % vertices.len()]))
        .collect()
}

/// Highest-ranked classification over several points; `Outside` if any
/// point is outside, so a shape touching the boundary anywhere reports the
/// coincidence rather than `Inside`
pub fn aggregate(classifications: impl IntoIterator<Item = Containment>) -> Containment {
    let mut result = None;
    for c in classifications {
        if c == Containment::Outside {
            return Containment::Outside;
        }
        result = Some(result.map_or(c, |r: Containment| r.max(c)));
    }
    result.unwrap_or(Containment::Outside)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<(Point3<f64>, Point3<f64>)> {
        ring_edges(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(10.0, 10.0, 0.0),
            Point3::new(0.0, 10.0, 0.0),
        ])
    }

    #[test]
    fn test_inside_outside() {
        let edges = square();
        assert_eq!(contains(&edges, &Point3::new(5.0, 5.0, 0.0)), (true, Containment::Inside));
        assert_eq!(
            contains(&edges, &Point3::new(15.0, 15.0, 0.0)),
            (false, Containment::Outside)
        );
        assert_eq!(
            contains(&edges, &Point3::new(-1.0, 5.0, 0.0)),
            (false, Containment::Outside)
        );
    }

    #[test]
    fn test_coincidence() {
        let edges = square();
        assert_eq!(
            contains(&edges, &Point3::new(5.0, 0.0, 0.0)),
            (true, Containment::CoincidesAtEdge)
        );
        assert_eq!(
            contains(&edges, &Point3::new(10.0, 10.0, 0.0)),
            (true, Containment::CoincidesAtVertex)
        );
    }

    #[test]
    fn test_clockwise_boundary() {
        let mut ring = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
            Point3::new(10.0, 10.0, 0.0),
            Point3::new(0.0, 10.0, 0.0),
        ];
        ring.reverse();
        let edges = ring_edges(&ring);
        assert!(contains(&edges, &Point3::new(2.0, 8.0, 0.0)).0);
        assert!(!contains(&edges, &Point3::new(12.0, 8.0, 0.0)).0);
    }

    #[test]
    fn test_concave_boundary() {
        // U shape opening upward
        let edges = ring_edges(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(9.0, 0.0, 0.0),
            Point3::new(9.0, 9.0, 0.0),
            Point3::new(6.0, 9.0, 0.0),
            Point3::new(6.0, 3.0, 0.0),
            Point3::new(3.0, 3.0, 0.0),
            Point3::new(3.0, 9.0, 0.0),
            Point3::new(0.0, 9.0, 0.0),
        ]);
        assert!(!contains(&edges, &Point3::new(4.5, 6.0, 0.0)).0);
        assert!(contains(&edges, &Point3::new(4.5, 1.0, 0.0)).0);
        assert!(contains(&edges, &Point3::new(1.0, 8.0, 0.0)).0);
    }

    #[test]
    fn test_ordering_and_aggregate() {
        assert!(Containment::CoincidesAtVertex > Containment::CoincidesAtEdge);
        assert!(Containment::CoincidesAtEdge > Containment::Inside);
        assert!(Containment::Inside > Containment::Outside);

        assert_eq!(
            aggregate([Containment::Inside, Containment::CoincidesAtEdge]),
            Containment::CoincidesAtEdge
        );
        assert_eq!(
            aggregate([Containment::CoincidesAtVertex, Containment::Inside]),
            Containment::CoincidesAtVertex
        );
        assert_eq!(
            aggregate([Containment::Inside, Containment::Outside]),
            Containment::Outside
        );
    }
}
