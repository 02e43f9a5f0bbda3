use std::collections::BTreeSet;

use geojson::{feature::Id, Geometry, JsonObject, JsonValue, Value};
use serde_json::json;

use crate::borough::TractName;
use crate::demographic::{DemographicRecord, DemographicTable};
use crate::diff::diff;
use crate::geoid::TractId;
use crate::sidefile::MissingEntry;
use crate::tract::GeometryRecord;

/// A geometry record for a tract that only the demographic extract knows
/// about. The geometry is an empty MultiPolygon until backfilled.
pub fn placeholder(record: &DemographicRecord, object_id: u64) -> GeometryRecord {
    let tract = TractName::parse(&record.name);
    let numeric = record.id.numeric().unwrap_or_else(|| record.id.as_str());

    let properties = json!({
        "OBJECTID": object_id,
        "CTLabel": tract.tract_number,
        "BoroCode": tract.boro_code(),
        "BoroName": tract.boro_name(),
        "CT2020": tract.tract_number,
        "BoroCT2020": tract.boro_ct(),
        "CDEligibil": "",
        "NTAName": "",
        "NTA2020": "",
        "CDTA2020": "",
        "CDTANAME": "",
        "GEOID": numeric,
        "PUMA": "",
        "Shape__Area": 0,
        "Shape__Length": 0,
    });
    let properties = match properties {
        JsonValue::Object(map) => map,
        _ => JsonObject::new(),
    };

    GeometryRecord {
        id: record.id.clone(),
        feature_id: Some(Id::Number(object_id.into())),
        geometry: Some(Geometry::new(Value::MultiPolygon(Vec::new()))),
        properties,
    }
}

/// Appends a placeholder for every demographic tract the geometry records
/// lack, in identifier order, and returns the entries for the missing list.
pub fn add_placeholders(
    records: &mut Vec<GeometryRecord>,
    demographics: &DemographicTable,
) -> Vec<MissingEntry> {
    let have: BTreeSet<TractId> = records
        .iter()
        .filter(|r| r.id.is_canonical())
        .map(|r| r.id.clone())
        .collect();
    let want: BTreeSet<TractId> = demographics.ids().cloned().collect();

    let mut missing = Vec::new();
    for id in diff(&want, &have).only_in_a {
        let Some(record) = demographics.get(&id) else {
            continue;
        };
        let object_id = records.len() as u64 + 1;
        records.push(placeholder(record, object_id));
        missing.push(MissingEntry {
            id,
            name: record.name.clone(),
        });
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geoid::normalize;

    fn demographic(geo_id: &str, name: &str) -> DemographicRecord {
        DemographicRecord::from_row(|column| match column {
            "GEO_ID" => Some(geo_id),
            "NAME" => Some(name),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn placeholder_carries_csv_derived_properties() {
        let record = demographic("1400000US36005001903", "Census Tract 19.03; Bronx County; New York");
        let feature = placeholder(&record, 2328).into_feature();

        assert_eq!(feature.id, Some(Id::Number(2328u64.into())));
        let geometry = serde_json::to_value(feature.geometry.unwrap()).unwrap();
        assert_eq!(geometry, json!({"type": "MultiPolygon", "coordinates": []}));

        let props = feature.properties.unwrap();
        assert_eq!(props["GEOID"], json!("36005001903"));
        assert_eq!(props["OBJECTID"], json!(2328));
        assert_eq!(props["CTLabel"], json!("19.03"));
        assert_eq!(props["CT2020"], json!("19.03"));
        assert_eq!(props["BoroCode"], json!("2"));
        assert_eq!(props["BoroName"], json!("Bronx"));
        assert_eq!(props["BoroCT2020"], json!("219.03"));
        assert_eq!(props["NTAName"], json!(""));
        assert_eq!(props["Shape__Area"], json!(0));
    }

    #[test]
    fn only_tracts_missing_from_geometry_get_placeholders() {
        let mut records = vec![GeometryRecord::from_feature(
            serde_json::from_value(json!({
                "type": "Feature",
                "id": 1,
                "geometry": null,
                "properties": {"OBJECTID": 1, "GEOID": "36005000100"}
            }))
            .unwrap(),
        )];
        let table: DemographicTable = [
            demographic("1400000US36005000100", "Census Tract 1; Bronx County; New York"),
            demographic("1400000US36061000700", "Census Tract 7; New York County; New York"),
            demographic("1400000US36005001903", "Census Tract 19.03; Bronx County; New York"),
        ]
        .into_iter()
        .collect();

        let missing = add_placeholders(&mut records, &table);

        let ids: Vec<_> = missing.iter().map(|m| m.id.clone()).collect();
        assert_eq!(ids, vec![normalize("36005001903"), normalize("36061000700")]);
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].feature_id, Some(Id::Number(2u64.into())));
        assert_eq!(records[2].feature_id, Some(Id::Number(3u64.into())));
        assert_eq!(records[2].boro_name(), "Manhattan");
        assert!(!records[2].has_geometry());
    }

    #[test]
    fn nothing_missing_adds_nothing() {
        let mut records = Vec::new();
        let missing = add_placeholders(&mut records, &DemographicTable::default());
        assert!(missing.is_empty());
        assert!(records.is_empty());
    }
}
