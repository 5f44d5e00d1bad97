// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Coordinate-deduplicated entities: vertices (points) and orientations
//! (directions) share one store keyed by a nested x -> y -> z map

use super::check_id;
use crate::error::CellComplexError;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

/// Which located store an operation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocatedKind {
    Point,
    Direction,
}

/// Entity identified by an id and a coordinate triple
pub trait Located {
    /// Name used in error messages
    const KIND: &'static str;

    fn id(&self) -> u64;

    /// Coordinates used for deduplication
    fn value(&self) -> Vector3<f64>;

    fn create(id: u64, value: Vector3<f64>) -> Self;
}

/// Point in a cell complex with the ids of its incident edges
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub id: u64,
    pub point: Point3<f64>,
    pub edges: BTreeSet<u64>,
}

impl Located for Vertex {
    const KIND: &'static str = "vertex";

    fn id(&self) -> u64 {
        self.id
    }

    fn value(&self) -> Vector3<f64> {
        self.point.coords
    }

    fn create(id: u64, value: Vector3<f64>) -> Self {
        Self {
            id,
            point: Point3::from(value),
            edges: BTreeSet::new(),
        }
    }
}

/// Direction shared by faces as their U or V grid orientation
#[derive(Debug, Clone, PartialEq)]
pub struct Orientation {
    pub id: u64,
    pub direction: Vector3<f64>,
}

impl Located for Orientation {
    const KIND: &'static str = "orientation";

    fn id(&self) -> u64 {
        self.id
    }

    fn value(&self) -> Vector3<f64> {
        self.direction
    }

    fn create(id: u64, value: Vector3<f64>) -> Self {
        Self {
            id,
            direction: value,
        }
    }
}

/// Totally ordered coordinate for use as a map key
#[derive(Debug, Clone, Copy)]
struct CoordKey(f64);

impl PartialEq for CoordKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CoordKey {}

impl PartialOrd for CoordKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CoordKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

type Lookup = BTreeMap<CoordKey, BTreeMap<CoordKey, BTreeMap<CoordKey, u64>>>;

fn around(value: f64, tolerance: f64) -> (Bound<CoordKey>, Bound<CoordKey>) {
    (
        Bound::Included(CoordKey(value - tolerance)),
        Bound::Included(CoordKey(value + tolerance)),
    )
}

/// Id-keyed entities plus a coordinate lookup; ids start at 1
#[derive(Debug, Clone)]
pub struct LocatedStore<T> {
    entities: BTreeMap<u64, T>,
    lookup: Lookup,
    next_id: u64,
}

impl<T: Located> LocatedStore<T> {
    pub fn new() -> Self {
        Self {
            entities: BTreeMap::new(),
            lookup: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn get(&self, id: u64) -> Option<&T> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: u64) -> Option<&mut T> {
        self.entities.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Id the next new entity will receive
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Raise the id counter; it never decreases
    pub fn reserve_ids_below(&mut self, next_id: u64) {
        self.next_id = self.next_id.max(next_id);
    }

    /// Id of an entity whose coordinates are all within `tolerance`
    pub fn find(&self, value: &Vector3<f64>, tolerance: f64) -> Option<u64> {
        for (_, ys) in self.lookup.range(around(value.x, tolerance)) {
            for (_, zs) in ys.range(around(value.y, tolerance)) {
                if let Some((_, id)) = zs.range(around(value.z, tolerance)).next() {
                    return Some(*id);
                }
            }
        }
        None
    }

    fn insert_new(&mut self, id: u64, value: Vector3<f64>) {
        self.entities.insert(id, T::create(id, value));
        self.lookup
            .entry(CoordKey(value.x))
            .or_default()
            .entry(CoordKey(value.y))
            .or_default()
            .insert(CoordKey(value.z), id);
        self.next_id = self.next_id.max(id + 1);
    }

    /// Existing entity within `tolerance`, or a new one with the next id.
    /// Returns the id and whether it was created.
    pub fn get_or_insert(&mut self, value: Vector3<f64>, tolerance: f64) -> (u64, bool) {
        if let Some(id) = self.find(&value, tolerance) {
            return (id, false);
        }
        let id = self.next_id;
        self.insert_new(id, value);
        (id, true)
    }

    /// Like [`Self::get_or_insert`] but a new entity takes `id`. Fails when
    /// `id` is taken or the coordinates already belong to another id.
    pub fn insert_with_id(
        &mut self,
        value: Vector3<f64>,
        id: u64,
        tolerance: f64,
    ) -> Result<(u64, bool), CellComplexError> {
        check_id(T::KIND, id)?;
        match self.find(&value, tolerance) {
            Some(existing) if existing == id => Ok((id, false)),
            Some(_) => Err(CellComplexError::DuplicateId { kind: T::KIND, id }),
            None if self.entities.contains_key(&id) => {
                Err(CellComplexError::DuplicateId { kind: T::KIND, id })
            }
            None => {
                self.insert_new(id, value);
                Ok((id, true))
            }
        }
    }
}

impl<T: Located> Default for LocatedStore<T> {
    fn default() -> Self {
        Self::new()
    }
}
