//! Console summaries for each task, plus the optional mismatch CSV.

use std::path::Path;

use polars::prelude::*;

use crate::tasks::{FetchOutcome, MergeSummary, UpdateOutcome, Validation};

const RULE_WIDTH: usize = 60;
const LIST_LIMIT: usize = 20;
const SAMPLE_LIMIT: usize = 5;
const STILL_MISSING_LIMIT: usize = 10;

pub fn banner(title: &str) {
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("{title}");
    println!("{}", "=".repeat(RULE_WIDTH));
}

pub fn validation(v: &Validation) {
    println!("\n=== Census Age/Sex Data (CSV) ===");
    println!("Total records: {}", v.csv_records);
    if !v.csv_rejected.is_empty() {
        println!("Rows without a tract GEO_ID: {}", v.csv_rejected.len());
    }

    println!("\n=== Census Districts JSON ===");
    println!("Total features: {}", v.features);
    if !v.unrecognized.is_empty() {
        println!("Unrecognized GEOIDs: {}", v.unrecognized.len());
    }

    println!("\n=== Validation Results ===");
    println!("Districts in both: {}", v.in_both.len());
    println!("Districts in CSV but missing in JSON: {}", v.missing_in_geometry.len());
    println!("Districts in JSON but missing in CSV: {}", v.missing_in_csv.len());

    for (title, list) in [
        ("Missing in JSON", &v.missing_in_geometry),
        ("Missing in CSV", &v.missing_in_csv),
    ] {
        if list.is_empty() {
            continue;
        }
        println!("\n=== {title} (first {LIST_LIMIT}) ===");
        for (i, m) in list.iter().take(LIST_LIMIT).enumerate() {
            let label = if m.label.is_empty() { "N/A" } else { m.label.as_str() };
            println!("{}. {} - {}", i + 1, m.id, label);
        }
        if list.len() > LIST_LIMIT {
            println!("... and {} more", list.len() - LIST_LIMIT);
        }
    }

    if !v.unrecognized.is_empty() {
        println!("\n=== Unrecognized GEOIDs (first {LIST_LIMIT}) ===");
        for raw in v.unrecognized.iter().take(LIST_LIMIT) {
            println!("  {raw:?}");
        }
    }

    if !v.in_both.is_empty() {
        println!("\n=== Sample Comparison (first {SAMPLE_LIMIT} districts in both) ===");
        for s in v.in_both.iter().take(SAMPLE_LIMIT) {
            println!("\nGEO_ID: {}", s.id);
            println!("  CSV Name: {}", s.csv_name);
            println!("  JSON CTLabel: {}", s.ct_label);
            println!("  JSON BoroName: {}", s.boro_name);
            println!("  CSV Total Population: {}", s.total_population);
        }
    }

    println!("\n=== Summary ===");
    println!("Validation: {}", if v.passed() { "PASSED" } else { "FAILED" });
    if !v.passed() {
        println!("\nIssues found:");
        if !v.missing_in_geometry.is_empty() {
            println!("  - {} district(s) from CSV are missing in JSON", v.missing_in_geometry.len());
        }
        if !v.missing_in_csv.is_empty() {
            println!("  - {} district(s) from JSON are missing in CSV", v.missing_in_csv.len());
        }
        if !v.unrecognized.is_empty() {
            println!("  - {} district(s) in JSON have an unrecognized GEOID", v.unrecognized.len());
        }
    }
}

/// One row per tract missing from either side.
pub fn mismatch_frame(v: &Validation) -> PolarsResult<DataFrame> {
    let rows = v
        .missing_in_geometry
        .iter()
        .map(|m| (m.id.to_string(), "json", m.label.clone()))
        .chain(
            v.missing_in_csv
                .iter()
                .map(|m| (m.id.to_string(), "csv", m.label.clone())),
        )
        .chain(
            v.unrecognized
                .iter()
                .map(|raw| (raw.clone(), "unrecognized", String::new())),
        );

    let mut ids = Vec::new();
    let mut missing_from = Vec::new();
    let mut labels = Vec::new();
    for (id, side, label) in rows {
        ids.push(id);
        missing_from.push(side);
        labels.push(label);
    }
    df!(
        "GEO_ID" => ids,
        "missing_from" => missing_from,
        "label" => labels
    )
}

pub fn write_mismatches(path: &Path, v: &Validation) -> anyhow::Result<()> {
    let mut df = mismatch_frame(v)?;
    let mut file = std::fs::File::create(path)?;
    CsvWriter::new(&mut file).finish(&mut df)?;
    Ok(())
}

pub fn update(outcome: &UpdateOutcome, districts: &Path, missing_list: &Path) {
    println!("\nFound {} missing districts", outcome.added.len());
    if outcome.added.is_empty() {
        println!("No missing districts to add!");
        return;
    }
    println!("\nUpdated {}", districts.display());
    println!("  Added {} districts", outcome.added.len());
    println!("  Total features: {}", outcome.total_features);
    println!("\nWARNING: New districts have empty geometry coordinates!");
    println!("  Geometry data must be added from a shapefile (run fetch-geometry).");
    println!("  Missing districts saved to: {}", missing_list.display());
}

pub fn fetch(outcome: &FetchOutcome, districts: &Path) {
    let still_missing = &outcome.backfill.still_missing;
    if !still_missing.is_empty() {
        println!("\nCould not find geometry for {} districts:", still_missing.len());
        for id in still_missing.iter().take(STILL_MISSING_LIMIT) {
            println!("    {}", id.numeric().unwrap_or_else(|| id.as_str()));
        }
        if still_missing.len() > STILL_MISSING_LIMIT {
            println!("    ... and {} more", still_missing.len() - STILL_MISSING_LIMIT);
        }
    }
    if !outcome.backfill.not_in_dataset.is_empty() {
        println!(
            "\n{} districts have geometry but no feature in {}",
            outcome.backfill.not_in_dataset.len(),
            districts.display()
        );
    }

    println!();
    banner("Summary");
    println!("Updated {} districts with geometry", outcome.backfill.updated);
    if !still_missing.is_empty() {
        println!("{} districts still missing geometry", still_missing.len());
    }
    println!("\nJSON file updated: {}", districts.display());
}

pub fn merge(summary: &MergeSummary, output: &Path) {
    println!("\nMatched {} features", summary.matched);
    if !summary.unmatched.is_empty() {
        println!("{} features missing CSV data", summary.unmatched.len());
    }
    println!("\nGenerated TypeScript file: {}", output.display());
    println!("  Total features: {}", summary.features);
    println!(
        "  File size: {:.2} MB",
        summary.bytes_written as f64 / 1024.0 / 1024.0
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::Mismatch;
    use census::{normalize, TractId};

    fn validation() -> Validation {
        Validation {
            missing_in_geometry: vec![Mismatch {
                id: normalize("36005001903"),
                label: "Census Tract 19.03; Bronx County; New York".into(),
            }],
            missing_in_csv: vec![Mismatch {
                id: normalize("36047000200"),
                label: "2".into(),
            }],
            unrecognized: vec!["N/A".into()],
            ..Validation::default()
        }
    }

    #[test]
    fn mismatch_frame_has_a_row_per_tract() {
        let df = mismatch_frame(&validation()).unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(df.get_column_names(), vec!["GEO_ID", "missing_from", "label"]);
        let sides: Vec<Option<&str>> = df.column("missing_from").unwrap().str().unwrap().into_iter().collect();
        assert_eq!(sides, vec![Some("json"), Some("csv"), Some("unrecognized")]);
    }

    #[test]
    fn writes_mismatch_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mismatches.csv");
        write_mismatches(&path, &validation()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("GEO_ID,missing_from,label"));
        assert_eq!(
            lines.next(),
            Some("1400000US36005001903,json,Census Tract 19.03; Bronx County; New York")
        );
        assert!(text.contains("N/A,unrecognized"));
    }

    #[test]
    fn empty_validation_passes() {
        let v = Validation::default();
        assert!(v.passed());
        assert_eq!(mismatch_frame(&v).unwrap().height(), 0);
        // Unrecognized ids alone fail validation.
        let v = Validation {
            unrecognized: vec![TractId::Unrecognized("x".into()).as_str().to_string()],
            ..Validation::default()
        };
        assert!(!v.passed());
    }
}
