//! The four data-refresh tasks. Each loads its inputs fresh, hands them to
//! the `census` core and writes its output in one go at the end.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Context;
use tracing::{info, warn};

use census::{
    add_placeholders, backfill, diff, merge_all, sidefile, BackfillOutcome, DemographicTable,
    GeometryLookup, MissingEntry, TractId,
};

use crate::acs::read_demographics;
use crate::config::Paths;
use crate::districts::Districts;
use crate::emit::{write_atomic, write_typescript};
use crate::error::PrepError;
use crate::getter::GeometrySource;

/// A tract present in one dataset only, with the label that dataset gives it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mismatch {
    pub id: TractId,
    pub label: String,
}

/// A tract present in both datasets, for side-by-side comparison.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sample {
    pub id: TractId,
    pub csv_name: String,
    pub ct_label: String,
    pub boro_name: String,
    pub total_population: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Validation {
    pub csv_records: usize,
    pub csv_rejected: Vec<String>,
    pub features: usize,
    pub missing_in_geometry: Vec<Mismatch>,
    pub missing_in_csv: Vec<Mismatch>,
    pub in_both: Vec<Sample>,
    /// Raw GEOIDs of features that could not be normalized.
    pub unrecognized: Vec<String>,
}

impl Validation {
    pub fn passed(&self) -> bool {
        self.missing_in_geometry.is_empty()
            && self.missing_in_csv.is_empty()
            && self.unrecognized.is_empty()
    }

    /// Process exit status for `validate`: 0 when the datasets agree.
    pub fn exit_status(&self) -> u8 {
        if self.passed() {
            0
        } else {
            1
        }
    }
}

/// Compares the demographic extract with the geometry dataset.
pub fn compare(districts: &Districts, table: &DemographicTable) -> Validation {
    let csv_ids: BTreeSet<TractId> = table.ids().cloned().collect();
    let d = diff(&csv_ids, &districts.ids());

    let csv_name = |id: &TractId| table.get(id).map(|r| r.name.clone()).unwrap_or_default();
    Validation {
        csv_records: table.len(),
        csv_rejected: table.rejected.clone(),
        features: districts.records.len(),
        missing_in_geometry: d
            .only_in_a
            .iter()
            .map(|id| Mismatch {
                id: id.clone(),
                label: csv_name(id),
            })
            .collect(),
        missing_in_csv: d
            .only_in_b
            .iter()
            .map(|id| Mismatch {
                id: id.clone(),
                label: districts
                    .find(id)
                    .map(|r| r.ct_label().to_string())
                    .unwrap_or_default(),
            })
            .collect(),
        in_both: d
            .in_both
            .iter()
            .map(|id| {
                let feature = districts.find(id);
                Sample {
                    id: id.clone(),
                    csv_name: csv_name(id),
                    ct_label: feature.map(|r| r.ct_label().to_string()).unwrap_or_default(),
                    boro_name: feature.map(|r| r.boro_name().to_string()).unwrap_or_default(),
                    total_population: table.get(id).map_or(0, |r| r.total_population),
                }
            })
            .collect(),
        unrecognized: districts
            .unrecognized()
            .map(|r| r.id.as_str().to_string())
            .collect(),
    }
}

pub fn validate(paths: &Paths) -> anyhow::Result<Validation> {
    let table = read_demographics(&paths.csv)?;
    let districts = Districts::read(&paths.districts)?;
    Ok(compare(&districts, &table))
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub added: Vec<MissingEntry>,
    pub total_features: usize,
}

/// Adds placeholder features for tracts only the CSV knows about and writes
/// the missing-identifier list. Leaves both files alone when nothing is
/// missing.
pub fn update(paths: &Paths) -> anyhow::Result<UpdateOutcome> {
    let table = read_demographics(&paths.csv)?;
    info!("Found {} districts in CSV", table.len());
    let mut districts = Districts::read(&paths.districts)?;
    info!("Found {} districts in JSON", districts.ids().len());

    let added = add_placeholders(&mut districts.records, &table);
    let total_features = districts.records.len();
    if added.is_empty() {
        return Ok(UpdateOutcome {
            added,
            total_features,
        });
    }

    districts.mark_complete();
    districts.write(&paths.districts)?;
    write_atomic(&paths.missing_list, &sidefile::render(&added))?;
    Ok(UpdateOutcome {
        added,
        total_features,
    })
}

/// Reads the missing-identifier list.
pub fn read_missing_list(path: &Path) -> anyhow::Result<Vec<MissingEntry>> {
    if !path.exists() {
        return Err(PrepError::MissingInput(path.to_path_buf()).into());
    }
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(sidefile::parse(&text))
}

#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub wanted: usize,
    pub found: usize,
    pub backfill: BackfillOutcome,
}

/// Fills in geometry for the tracts on the missing list and rewrites the
/// geometry dataset.
pub async fn fetch_geometry<S>(paths: &Paths, source: &S) -> anyhow::Result<FetchOutcome>
where
    S: GeometrySource + ?Sized,
{
    let entries = read_missing_list(&paths.missing_list)?;
    let wanted: BTreeSet<TractId> = entries.into_iter().map(|e| e.id).collect();
    info!("Found {} missing districts", wanted.len());
    let mut districts = Districts::read(&paths.districts)?;

    let index = source
        .geometries()
        .await
        .with_context(|| format!("loading geometry from {}", source.describe()))?;
    let found = wanted
        .iter()
        .filter(|id| index.geometry_for(id).is_some())
        .count();
    info!("Found geometry for {found} out of {} districts", wanted.len());
    if found == 0 {
        warn!(
            "sample GEOIDs from source: {:?}; looking for: {:?}",
            index.sample_ids(5),
            wanted.iter().take(5).collect::<Vec<_>>()
        );
        return Err(PrepError::NoGeometryMatches {
            wanted: wanted.len(),
        }
        .into());
    }

    let outcome = backfill(&mut districts.records, &wanted, &index);
    districts.write(&paths.districts)?;
    Ok(FetchOutcome {
        wanted: wanted.len(),
        found,
        backfill: outcome,
    })
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub features: usize,
    pub matched: usize,
    pub unmatched: Vec<TractId>,
    pub bytes_written: usize,
}

/// Merges demographics into the geometry dataset and writes the TypeScript
/// module.
pub fn merge(paths: &Paths) -> anyhow::Result<MergeSummary> {
    let table = read_demographics(&paths.csv)?;
    info!("Loaded {} records from CSV", table.len());
    let districts = Districts::read(&paths.districts)?;
    info!("Loaded {} features from JSON", districts.records.len());

    let outcome = merge_all(&districts.records, &table);
    let features = outcome.records.len();
    let matched = outcome.matched;
    let unmatched = outcome.unmatched.clone();
    let collection = outcome.into_feature_collection();

    let bytes_written = write_typescript(&paths.output, &collection)?;
    Ok(MergeSummary {
        features,
        matched,
        unmatched,
        bytes_written,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use census::{normalize, DemographicRecord};
    use geojson::FeatureCollection;
    use serde_json::json;

    fn districts(geoids: &[&str]) -> Districts {
        let features: Vec<_> = geoids
            .iter()
            .map(|g| json!({"type": "Feature", "geometry": null, "properties": {"GEOID": g, "CTLabel": "x"}}))
            .collect();
        let collection: FeatureCollection =
            serde_json::from_value(json!({"type": "FeatureCollection", "features": features})).unwrap();
        Districts::from(collection)
    }

    fn table(geo_ids: &[&str]) -> DemographicTable {
        geo_ids
            .iter()
            .filter_map(|id| {
                DemographicRecord::from_row(|column| match column {
                    "GEO_ID" => Some(*id),
                    "NAME" => Some("Census Tract 1; Queens County; New York"),
                    "S0101_C01_001E" => Some("10"),
                    _ => None,
                })
            })
            .collect()
    }

    #[test]
    fn matching_datasets_pass() {
        let v = compare(
            &districts(&["36081000100", "1400000US36081000200"]),
            &table(&["1400000US36081000100", "1400000US36081000200"]),
        );
        assert!(v.passed());
        assert_eq!(v.exit_status(), 0);
        assert_eq!(v.in_both.len(), 2);
        assert_eq!(v.in_both[0].total_population, 10);
        assert_eq!(v.in_both[0].ct_label, "x");
    }

    #[test]
    fn unrecognized_geoid_fails_validation() {
        let v = compare(&districts(&["36081000100", "BK0101"]), &table(&["1400000US36081000100"]));
        assert_eq!(v.unrecognized, vec!["BK0101".to_string()]);
        assert!(v.missing_in_csv.is_empty());
        assert!(!v.passed());
        assert_eq!(v.exit_status(), 1);
    }

    #[test]
    fn one_sided_tracts_are_labelled() {
        let v = compare(&districts(&["36081000100"]), &table(&["1400000US36081000300"]));
        assert_eq!(
            v.missing_in_geometry,
            vec![Mismatch {
                id: normalize("36081000300"),
                label: "Census Tract 1; Queens County; New York".into(),
            }]
        );
        assert_eq!(
            v.missing_in_csv,
            vec![Mismatch {
                id: normalize("36081000100"),
                label: "x".into(),
            }]
        );
        assert_eq!(v.exit_status(), 1);
    }
}
