use std::collections::BTreeMap;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::geoid::{normalize, TractId};

pub const GEO_ID_COLUMN: &str = "GEO_ID";
pub const NAME_COLUMN: &str = "NAME";
pub const TOTAL_POPULATION: &str = "S0101_C01_001E";
pub const TOTAL_POPULATION_MOE: &str = "S0101_C01_001M";

/// One row of the age-band table: estimate column, MOE column, display label.
#[derive(Clone, Copy, Debug)]
pub struct AgeBand {
    pub estimate: &'static str,
    pub moe: &'static str,
    pub label: &'static str,
}

const fn band(estimate: &'static str, moe: &'static str, label: &'static str) -> AgeBand {
    AgeBand { estimate, moe, label }
}

/// S0101 age bands, in output order. Closed list: columns not named here are
/// ignored.
pub const AGE_BANDS: [AgeBand; 18] = [
    band("S0101_C01_002E", "S0101_C01_002M", "Under 5 years"),
    band("S0101_C01_003E", "S0101_C01_003M", "5 to 9 years"),
    band("S0101_C01_004E", "S0101_C01_004M", "10 to 14 years"),
    band("S0101_C01_005E", "S0101_C01_005M", "15 to 19 years"),
    band("S0101_C01_006E", "S0101_C01_006M", "20 to 24 years"),
    band("S0101_C01_007E", "S0101_C01_007M", "25 to 29 years"),
    band("S0101_C01_008E", "S0101_C01_008M", "30 to 34 years"),
    band("S0101_C01_009E", "S0101_C01_009M", "35 to 39 years"),
    band("S0101_C01_010E", "S0101_C01_010M", "40 to 44 years"),
    band("S0101_C01_011E", "S0101_C01_011M", "45 to 49 years"),
    band("S0101_C01_012E", "S0101_C01_012M", "50 to 54 years"),
    band("S0101_C01_013E", "S0101_C01_013M", "55 to 59 years"),
    band("S0101_C01_014E", "S0101_C01_014M", "60 to 64 years"),
    band("S0101_C01_015E", "S0101_C01_015M", "65 to 69 years"),
    band("S0101_C01_016E", "S0101_C01_016M", "70 to 74 years"),
    band("S0101_C01_017E", "S0101_C01_017M", "75 to 79 years"),
    band("S0101_C01_018E", "S0101_C01_018M", "80 to 84 years"),
    band("S0101_C01_019E", "S0101_C01_019M", "85 years and over"),
];

/// Parses a count cell. Blank cells, the `(X)`, `-` and `N` placeholders and
/// anything unparsable read as 0. Counts are non-negative, so a negative
/// value such as `-3` reads as 0 too.
pub fn parse_count(cell: &str) -> u64 {
    let cell = cell.trim().trim_matches('"').trim();
    match cell {
        "" | "(X)" | "-" | "N" => 0,
        _ => cell.replace(',', "").parse().unwrap_or(0),
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AgeCount {
    pub total: u64,
    #[serde(rename = "totalMOE")]
    pub total_moe: u64,
}

/// Counts for every entry of [`AGE_BANDS`], serialized as a label-keyed map
/// in table order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AgeGroups([AgeCount; 18]);

impl AgeGroups {
    pub fn get(&self, label: &str) -> Option<&AgeCount> {
        AGE_BANDS
            .iter()
            .position(|b| b.label == label)
            .map(|i| &self.0[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &AgeCount)> {
        AGE_BANDS.iter().map(|b| b.label).zip(self.0.iter())
    }
}

impl Serialize for AgeGroups {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(AGE_BANDS.len()))?;
        for (label, count) in self.iter() {
            map.serialize_entry(label, count)?;
        }
        map.end()
    }
}

/// One tract's row from the S0101 extract.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DemographicRecord {
    pub id: TractId,
    pub name: String,
    pub total_population: u64,
    pub total_population_moe: u64,
    pub age_groups: AgeGroups,
}

impl DemographicRecord {
    /// Builds a record from a row, given a lookup from column code to cell.
    /// Returns `None` for rows whose `GEO_ID` isn't a tract identifier, such
    /// as the `Geography` label row.
    pub fn from_row<'a>(cell: impl Fn(&str) -> Option<&'a str>) -> Option<DemographicRecord> {
        let raw = cell(GEO_ID_COLUMN)?.trim().trim_matches('"');
        let id = normalize(raw);
        if !id.is_canonical() {
            return None;
        }

        let count = |column: &str| cell(column).map(parse_count).unwrap_or(0);
        let mut age_groups = AgeGroups::default();
        for (slot, band) in age_groups.0.iter_mut().zip(AGE_BANDS.iter()) {
            *slot = AgeCount {
                total: count(band.estimate),
                total_moe: count(band.moe),
            };
        }

        Some(DemographicRecord {
            id,
            name: cell(NAME_COLUMN)
                .unwrap_or_default()
                .trim()
                .trim_matches('"')
                .to_string(),
            total_population: count(TOTAL_POPULATION),
            total_population_moe: count(TOTAL_POPULATION_MOE),
            age_groups,
        })
    }
}

/// Demographic records keyed by tract.
#[derive(Clone, Debug, Default)]
pub struct DemographicTable {
    records: BTreeMap<TractId, DemographicRecord>,
    /// Rows skipped because their `GEO_ID` wasn't a tract identifier.
    pub rejected: Vec<String>,
}

impl DemographicTable {
    /// Later rows for the same tract replace earlier ones.
    pub fn insert(&mut self, record: DemographicRecord) {
        self.records.insert(record.id.clone(), record);
    }

    pub fn get(&self, id: &TractId) -> Option<&DemographicRecord> {
        self.records.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &TractId> {
        self.records.keys()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<DemographicRecord> for DemographicTable {
    fn from_iter<I: IntoIterator<Item = DemographicRecord>>(iter: I) -> Self {
        let mut table = DemographicTable::default();
        for record in iter {
            table.insert(record);
        }
        table
    }
}
