use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue};
use serde::Serialize;

use crate::demographic::{AgeGroups, DemographicRecord, DemographicTable};
use crate::geoid::TractId;
use crate::tract::{GeometryRecord, GEOID_PROPERTY};

/// Population fields attached to a tract in the merged output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Population {
    #[serde(rename = "GEO_ID")]
    pub geo_id: String,
    #[serde(rename = "NAME")]
    pub name: String,
    pub total_population: u64,
    #[serde(rename = "totalPopulationMOE")]
    pub total_population_moe: u64,
    pub age_groups: AgeGroups,
}

/// A geometry record with its population data attached.
#[derive(Clone, Debug, PartialEq)]
pub struct MergedRecord {
    pub id: TractId,
    pub geometry: Option<Geometry>,
    pub properties: JsonObject,
    pub population: Population,
    /// Whether a demographic row was found for this tract.
    pub matched: bool,
}

impl MergedRecord {
    /// Original properties first, then the population fields, with `GEOID`
    /// rewritten to the numeric form.
    pub fn into_feature(self) -> Feature {
        let mut properties = self.properties;
        if let Ok(JsonValue::Object(population)) = serde_json::to_value(&self.population) {
            properties.extend(population);
        }
        if let Some(numeric) = self.id.numeric() {
            properties.insert(GEOID_PROPERTY.to_string(), JsonValue::from(numeric));
        }
        Feature {
            bbox: None,
            geometry: self.geometry,
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

/// Combines a geometry record with its demographic row, if any. Spatial and
/// administrative fields always come from `geometry`; without a demographic
/// row every count is zero and the name falls back to `CTLabel`.
pub fn merge(geometry: &GeometryRecord, demographic: Option<&DemographicRecord>) -> MergedRecord {
    let population = match demographic {
        Some(d) => Population {
            geo_id: geometry.id.to_string(),
            name: d.name.clone(),
            total_population: d.total_population,
            total_population_moe: d.total_population_moe,
            age_groups: d.age_groups.clone(),
        },
        None => Population {
            geo_id: geometry.id.to_string(),
            name: geometry.ct_label().to_string(),
            total_population: 0,
            total_population_moe: 0,
            age_groups: AgeGroups::default(),
        },
    };
    MergedRecord {
        id: geometry.id.clone(),
        geometry: geometry.geometry.clone(),
        properties: geometry.properties.clone(),
        population,
        matched: demographic.is_some(),
    }
}

#[derive(Debug, Default)]
pub struct MergeOutcome {
    pub records: Vec<MergedRecord>,
    pub matched: usize,
    /// Tracts with no demographic row; zero-filled in `records`.
    pub unmatched: Vec<TractId>,
}

impl MergeOutcome {
    pub fn into_feature_collection(self) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features: self.records.into_iter().map(MergedRecord::into_feature).collect(),
            foreign_members: None,
        }
    }
}

/// Merges every geometry record, in order. Unrecognized ids never match a
/// demographic row, so they come out zero-filled.
pub fn merge_all(records: &[GeometryRecord], demographics: &DemographicTable) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();
    for record in records {
        let demographic = demographics.get(&record.id);
        let merged = merge(record, demographic);
        if merged.matched {
            outcome.matched += 1;
        } else {
            outcome.unmatched.push(record.id.clone());
        }
        outcome.records.push(merged);
    }
    outcome
}
