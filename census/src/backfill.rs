use std::collections::{BTreeSet, HashMap};

use geojson::{Geometry, Value};

use crate::geoid::TractId;
use crate::tract::GeometryRecord;

/// Something that can hand out a geometry for a tract.
pub trait GeometryLookup {
    fn geometry_for(&self, id: &TractId) -> Option<&Value>;
}

/// Geometries keyed by tract, as read from a shapefile.
#[derive(Clone, Debug, Default)]
pub struct ShapeIndex {
    shapes: HashMap<TractId, Value>,
}

impl ShapeIndex {
    /// Keeps the first geometry seen for a tract.
    pub fn insert(&mut self, id: TractId, value: Value) {
        self.shapes.entry(id).or_insert(value);
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Up to `n` ids, for diagnostics.
    pub fn sample_ids(&self, n: usize) -> Vec<&TractId> {
        let mut ids: Vec<_> = self.shapes.keys().collect();
        ids.sort();
        ids.truncate(n);
        ids
    }
}

impl GeometryLookup for ShapeIndex {
    fn geometry_for(&self, id: &TractId) -> Option<&Value> {
        self.shapes.get(id)
    }
}

impl GeometryLookup for HashMap<TractId, Value> {
    fn geometry_for(&self, id: &TractId) -> Option<&Value> {
        self.get(id)
    }
}

/// Wraps a bare Polygon as a one-element MultiPolygon so every backfilled
/// tract has the same geometry type. Other types are left alone.
pub fn promote(value: Value) -> Value {
    match value {
        Value::Polygon(rings) => Value::MultiPolygon(vec![rings]),
        other => other,
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct BackfillOutcome {
    pub updated: usize,
    /// Wanted tracts the source had no geometry for.
    pub still_missing: BTreeSet<TractId>,
    /// Tracts the source resolved but no record carries.
    pub not_in_dataset: BTreeSet<TractId>,
}

/// Injects geometry into every record whose id is in `missing`.
pub fn backfill(
    records: &mut [GeometryRecord],
    missing: &BTreeSet<TractId>,
    source: &impl GeometryLookup,
) -> BackfillOutcome {
    let mut outcome = BackfillOutcome::default();
    let mut seen = BTreeSet::new();

    for record in records.iter_mut() {
        if !missing.contains(&record.id) {
            continue;
        }
        seen.insert(record.id.clone());
        match source.geometry_for(&record.id) {
            Some(value) => {
                record.geometry = Some(Geometry::new(promote(value.clone())));
                outcome.updated += 1;
            }
            None => {
                outcome.still_missing.insert(record.id.clone());
            }
        }
    }

    for id in missing.difference(&seen) {
        if source.geometry_for(id).is_some() {
            outcome.not_in_dataset.insert(id.clone());
        } else {
            outcome.still_missing.insert(id.clone());
        }
    }
    outcome
}
