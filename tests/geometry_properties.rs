// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Properties of the geometry primitives

use anyhow::Result;
use approx::assert_relative_eq;
use nalgebra::{Point3, Vector3};
use polycell::geometry::{
    to_clipper_path, to_polygon, Containment, Curve, FacetKernel, Plane, PointExt, Polygon,
    Polyline, Profile, Ray, Sweep, EPSILON,
};
use rand::{Rng, SeedableRng};

fn ten_square() -> Result<Polygon> {
    Ok(Polygon::new(vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(10.0, 0.0, 0.0),
        Point3::new(10.0, 10.0, 0.0),
        Point3::new(0.0, 10.0, 0.0),
    ])?)
}

#[test]
fn test_containment_of_square() -> Result<()> {
    let polygon = ten_square()?;
    assert_eq!(
        polygon.contains_3d(&Point3::new(5.0, 5.0, 0.0)),
        (true, Containment::Inside)
    );
    assert!(!polygon.contains_3d(&Point3::new(15.0, 15.0, 0.0)).0);
    assert_eq!(
        polygon.contains_3d(&Point3::new(5.0, 0.0, 0.0)).1,
        Containment::CoincidesAtEdge
    );
    assert_eq!(
        polygon.contains_3d(&Point3::new(10.0, 10.0, 0.0)).1,
        Containment::CoincidesAtVertex
    );
    Ok(())
}

#[test]
fn test_winding_consistency() -> Result<()> {
    let polygon = Polygon::new(vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.0, 10.0, 0.0),
        Point3::new(10.0, 10.0, 0.0),
        Point3::new(10.0, 0.0, 0.0),
    ])?;
    assert_ne!(polygon.is_clockwise(), polygon.reversed().is_clockwise());
    Ok(())
}

#[test]
fn test_clipper_round_trip_random_convex() -> Result<()> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    for _ in 0..20 {
        let count = rng.gen_range(3..12);
        let radius = rng.gen_range(1.0..50.0);
        let center = Point3::new(rng.gen_range(-100.0..100.0), rng.gen_range(-100.0..100.0), 0.0);
        let vertices = (0..count)
            .map(|i| {
                let angle = i as f64 / count as f64 * std::f64::consts::TAU;
                center + Vector3::new(radius * angle.cos(), radius * angle.sin(), 0.0)
            })
            .collect();
        let polygon = Polygon::new(vertices)?;

        let back = to_polygon(&to_clipper_path(&polygon, EPSILON), EPSILON)?;
        assert_eq!(back.vertices().len(), polygon.vertices().len());
        for (a, b) in back.vertices().iter().zip(polygon.vertices()) {
            assert!(a.is_almost_equal(b, EPSILON));
        }
    }
    Ok(())
}

#[test]
fn test_trim_then_split() -> Result<()> {
    let polygon = ten_square()?;
    let plane = Plane::new(Point3::new(6.0, 0.0, 0.0), Vector3::x())?;
    let kept = polygon.trimmed(&plane, false).expect("plane crosses the square");
    assert_eq!(kept.len(), 1);
    let kept_area = kept[0].area();
    assert!(kept_area > 0.0 && kept_area < 100.0);

    let cut = Polyline::new(vec![Point3::new(-1.0, 5.0, 0.0), Point3::new(11.0, 5.0, 0.0)])?;
    let halves = kept[0].split(&[cut]);
    assert_eq!(halves.len(), 2);
    let total: f64 = halves.iter().map(Polygon::area).sum();
    assert_relative_eq!(total, kept_area, epsilon = 1e-6);
    Ok(())
}

#[test]
fn test_ray_through_swept_box() -> Result<()> {
    let profile = Profile::new(Polygon::rectangle(Point3::new(-1.0, -1.0, 0.0), 2.0, 2.0)?);
    let path = Polyline::new(vec![Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, 5.0)])?;
    let mut sweep = Sweep::new(profile, path);
    let solid = sweep.rebuild(&FacetKernel)?;
    assert_eq!(solid.faces().len(), 6);

    let ray = Ray::new(Point3::new(0.0, 0.0, -10.0), Vector3::z())?;
    let hits = ray.intersects_solid(solid).expect("ray passes through the box");
    assert_eq!(hits.len(), 2);
    assert_relative_eq!(hits[0].z, 0.0, epsilon = 1e-9);
    assert_relative_eq!(hits[1].z, 5.0, epsilon = 1e-9);
    Ok(())
}
