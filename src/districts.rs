use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Context;
use geojson::{Bbox, FeatureCollection, JsonObject, JsonValue};

use census::{GeometryRecord, TractId};

use crate::emit::write_atomic;
use crate::error::PrepError;

/// The city's tract feature collection, with each feature keyed by its
/// normalized GEOID. Collection-level members are carried through a rewrite.
#[derive(Clone, Debug, Default)]
pub struct Districts {
    pub records: Vec<GeometryRecord>,
    pub bbox: Option<Bbox>,
    pub foreign_members: Option<JsonObject>,
}

impl Districts {
    pub fn read(path: &Path) -> anyhow::Result<Districts> {
        if !path.exists() {
            return Err(PrepError::MissingInput(path.to_path_buf()).into());
        }
        let collection = std::fs::read_to_string(path)?
            .parse::<FeatureCollection>()
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(Districts::from(collection))
    }

    /// Rewrites the file in place as 2-space indented JSON.
    pub fn write(&self, path: &Path) -> anyhow::Result<()> {
        let collection = FeatureCollection::from(self.clone());
        let json = serde_json::to_string_pretty(&collection)?;
        write_atomic(path, &json)
    }

    /// Canonical tract ids present in the collection.
    pub fn ids(&self) -> BTreeSet<TractId> {
        self.records
            .iter()
            .filter(|r| r.id.is_canonical())
            .map(|r| r.id.clone())
            .collect()
    }

    /// Features whose GEOID didn't normalize.
    pub fn unrecognized(&self) -> impl Iterator<Item = &GeometryRecord> {
        self.records.iter().filter(|r| !r.id.is_canonical())
    }

    pub fn find(&self, id: &TractId) -> Option<&GeometryRecord> {
        self.records.iter().find(|r| &r.id == id)
    }

    /// Clears the ArcGIS `exceededTransferLimit` flag, if the export has a
    /// collection-level `properties` object.
    pub fn mark_complete(&mut self) {
        let properties = self
            .foreign_members
            .as_mut()
            .and_then(|members| members.get_mut("properties"))
            .and_then(JsonValue::as_object_mut);
        if let Some(properties) = properties {
            properties.insert("exceededTransferLimit".to_string(), JsonValue::Bool(false));
        }
    }
}

impl From<FeatureCollection> for Districts {
    fn from(collection: FeatureCollection) -> Self {
        Districts {
            records: collection
                .features
                .into_iter()
                .map(GeometryRecord::from_feature)
                .collect(),
            bbox: collection.bbox,
            foreign_members: collection.foreign_members,
        }
    }
}

impl From<Districts> for FeatureCollection {
    fn from(districts: Districts) -> Self {
        FeatureCollection {
            bbox: districts.bbox,
            features: districts
                .records
                .into_iter()
                .map(GeometryRecord::into_feature)
                .collect(),
            foreign_members: districts.foreign_members,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use census::normalize;
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "type": "FeatureCollection",
            "properties": {"exceededTransferLimit": true},
            "features": [
                {
                    "type": "Feature",
                    "id": 1,
                    "geometry": {"type": "MultiPolygon", "coordinates": [[[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]]},
                    "properties": {"OBJECTID": 1, "GEOID": "36005000100", "CTLabel": "1"}
                },
                {
                    "type": "Feature",
                    "id": 2,
                    "geometry": null,
                    "properties": {"OBJECTID": 2, "GEOID": "1400000US36047000200", "CTLabel": "2"}
                },
                {
                    "type": "Feature",
                    "id": 3,
                    "geometry": null,
                    "properties": {"OBJECTID": 3, "GEOID": "N/A"}
                }
            ]
        })
    }

    #[test]
    fn reads_mixed_geoid_forms() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("districts.json");
        std::fs::write(&path, sample().to_string()).unwrap();

        let districts = Districts::read(&path).unwrap();
        assert_eq!(districts.records.len(), 3);
        assert_eq!(
            districts.ids(),
            BTreeSet::from([normalize("36005000100"), normalize("36047000200")])
        );
        assert_eq!(districts.unrecognized().count(), 1);
        assert_eq!(districts.find(&normalize("36047000200")).unwrap().ct_label(), "2");
    }

    #[test]
    fn rewrite_keeps_collection_members() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("districts.json");
        std::fs::write(&path, sample().to_string()).unwrap();

        let mut districts = Districts::read(&path).unwrap();
        districts.mark_complete();
        districts.write(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\n  \""), "expected 2-space indentation");
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["properties"]["exceededTransferLimit"], json!(false));
        assert_eq!(value["features"][1]["properties"]["GEOID"], json!("1400000US36047000200"));
        assert_eq!(value["features"][2]["id"], json!(3));
    }

    #[test]
    fn missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = Districts::read(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err.downcast_ref::<PrepError>(), Some(PrepError::MissingInput(_))));
    }
}
