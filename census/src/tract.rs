use geojson::{feature::Id, Feature, Geometry, JsonObject, JsonValue};

use crate::geoid::{normalize, TractId};

pub const GEOID_PROPERTY: &str = "GEOID";

/// A feature from the city's tract dataset, keyed by its normalized GEOID.
///
/// Properties are kept as the original JSON object so fields this crate
/// doesn't know about survive a rewrite.
#[derive(Clone, Debug, PartialEq)]
pub struct GeometryRecord {
    pub id: TractId,
    pub feature_id: Option<Id>,
    pub geometry: Option<Geometry>,
    pub properties: JsonObject,
}

impl GeometryRecord {
    pub fn from_feature(feature: Feature) -> GeometryRecord {
        let properties = feature.properties.unwrap_or_default();
        // Some exports write GEOID as a JSON number.
        let raw = match properties.get(GEOID_PROPERTY) {
            Some(JsonValue::String(s)) => s.clone(),
            Some(JsonValue::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        GeometryRecord {
            id: normalize(&raw),
            feature_id: feature.id,
            geometry: feature.geometry,
            properties,
        }
    }

    pub fn into_feature(self) -> Feature {
        Feature {
            bbox: None,
            geometry: self.geometry,
            id: self.feature_id,
            properties: Some(self.properties),
            foreign_members: None,
        }
    }

    /// A string property, or `""` when absent or not a string.
    pub fn text(&self, key: &str) -> &str {
        self.properties
            .get(key)
            .and_then(JsonValue::as_str)
            .unwrap_or_default()
    }

    pub fn ct_label(&self) -> &str {
        self.text("CTLabel")
    }

    pub fn boro_name(&self) -> &str {
        self.text("BoroName")
    }

    /// Whether the feature carries usable coordinates. Placeholders written
    /// by the updater have an empty MultiPolygon.
    pub fn has_geometry(&self) -> bool {
        use geojson::Value;
        match self.geometry.as_ref().map(|g| &g.value) {
            Some(Value::Polygon(rings)) => !rings.is_empty(),
            Some(Value::MultiPolygon(polygons)) => !polygons.is_empty(),
            Some(_) => true,
            None => false,
        }
    }
}
