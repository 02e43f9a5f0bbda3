use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use polars::prelude::*;

use census::demographic::{
    DemographicRecord, DemographicTable, AGE_BANDS, GEO_ID_COLUMN, NAME_COLUMN, TOTAL_POPULATION,
    TOTAL_POPULATION_MOE,
};

use crate::error::PrepError;

/// `GEO_ID` values of the descriptive header row ACS downloads carry under
/// the column codes.
const LABEL_ROW_IDS: [&str; 2] = ["Geography", "GEO_ID"];

/// Reads the ACS S0101 extract. Every column is read as text; the count
/// parsing rules live in `census::parse_count`.
pub fn read_demographics(path: &Path) -> anyhow::Result<DemographicTable> {
    if !path.exists() {
        return Err(PrepError::MissingInput(path.to_path_buf()).into());
    }
    let df = CsvReader::from_path(path)?
        .has_header(true)
        .infer_schema(Some(0))
        .truncate_ragged_lines(true)
        .finish()
        .with_context(|| format!("reading {}", path.display()))?;
    let table = demographics_from_frame(&df, path)?;
    tracing::debug!(
        "{} rows, {} tracts, {} rejected in {}",
        df.height(),
        table.len(),
        table.rejected.len(),
        path.display()
    );
    Ok(table)
}

/// Header names can arrive with a UTF-8 BOM or their quotes intact.
fn clean_header(name: &str) -> &str {
    name.trim_start_matches('\u{feff}').trim().trim_matches('"')
}

fn is_mapped(column: &str) -> bool {
    [GEO_ID_COLUMN, NAME_COLUMN, TOTAL_POPULATION, TOTAL_POPULATION_MOE].contains(&column)
        || AGE_BANDS.iter().any(|b| b.estimate == column || b.moe == column)
}

fn demographics_from_frame(df: &DataFrame, path: &Path) -> anyhow::Result<DemographicTable> {
    let mut columns: HashMap<&str, Vec<Option<&str>>> = HashMap::new();
    for series in df.get_columns() {
        let name = clean_header(series.name());
        if !is_mapped(name) || columns.contains_key(name) {
            continue;
        }
        columns.insert(name, series.str()?.into_iter().collect());
    }
    for required in [GEO_ID_COLUMN, NAME_COLUMN] {
        if !columns.contains_key(required) {
            return Err(PrepError::MissingColumn {
                column: required.to_string(),
                path: path.to_path_buf(),
            }
            .into());
        }
    }

    let mut table = DemographicTable::default();
    for row in 0..df.height() {
        let cell = |column: &str| columns.get(column).and_then(|values| values[row]);
        match DemographicRecord::from_row(&cell) {
            Some(record) => table.insert(record),
            None => {
                let raw = cell(GEO_ID_COLUMN).unwrap_or_default().trim().trim_matches('"');
                if !raw.is_empty() && !LABEL_ROW_IDS.contains(&raw) {
                    table.rejected.push(raw.to_string());
                }
            }
        }
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use census::{normalize, AgeCount};
    use std::io::Write;

    fn csv_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn reads_acs_extract() {
        let file = csv_file(concat!(
            "\u{feff}GEO_ID,NAME,S0101_C01_001E,S0101_C01_001M,S0101_C01_002E,S0101_C01_002M,S0101_C02_002E\n",
            "Geography,Geographic Area Name,Estimate!!Total,Margin of Error!!Total,a,b,c\n",
            "\"1400000US36005000100\",\"Census Tract 1; Bronx County; New York\",\"7,080\",\"(X)\",\"120\",\"45\",\"9\"\n",
            "1400000US36005001903,\"Census Tract 19.03; Bronx County; New York\",-,N,,,\n",
            "0500000US36005,\"Bronx County, New York\",1,1,1,1,1\n",
        ));

        let table = read_demographics(file.path()).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rejected, vec!["0500000US36005".to_string()]);

        let tract = table.get(&normalize("36005000100")).unwrap();
        assert_eq!(tract.name, "Census Tract 1; Bronx County; New York");
        assert_eq!(tract.total_population, 7080);
        assert_eq!(tract.total_population_moe, 0);
        assert_eq!(
            tract.age_groups.get("Under 5 years"),
            Some(&AgeCount { total: 120, total_moe: 45 })
        );
        assert_eq!(tract.age_groups.get("5 to 9 years"), Some(&AgeCount::default()));

        let blank = table.get(&normalize("36005001903")).unwrap();
        assert_eq!(blank.total_population, 0);
    }

    #[test]
    fn reads_rows_with_trailing_delimiters() {
        let file = csv_file(concat!(
            "\"GEO_ID\",\"NAME\",\"S0101_C01_001E\",\"S0101_C01_001M\",\n",
            "\"Geography\",\"Geographic Area Name\",\"Estimate!!Total\",\"Margin of Error!!Total\",\n",
            "\"1400000US36005000100\",\"Census Tract 1; Bronx County; New York\",\"7,080\",\"313\",\n",
        ));

        let table = read_demographics(file.path()).unwrap();

        assert_eq!(table.len(), 1);
        assert!(table.rejected.is_empty());
        let tract = table.get(&normalize("36005000100")).unwrap();
        assert_eq!((tract.total_population, tract.total_population_moe), (7080, 313));
    }

    #[test]
    fn missing_name_column_is_fatal() {
        let file = csv_file("GEO_ID,S0101_C01_001E\n1400000US36005000100,5\n");
        let err = read_demographics(file.path()).unwrap_err();
        match err.downcast_ref::<PrepError>() {
            Some(PrepError::MissingColumn { column, .. }) => assert_eq!(column, "NAME"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_demographics(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err.downcast_ref::<PrepError>(), Some(PrepError::MissingInput(_))));
    }
}
