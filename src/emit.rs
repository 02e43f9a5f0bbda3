use std::io::Write;
use std::path::Path;

use anyhow::Context;
use geojson::FeatureCollection;

const HEADER: [&str; 3] = [
    "// Auto-generated from Census ACS 2019-2023 data",
    "// Source: ACSST5Y2023.S0101-Data.csv merged with census-districts.json",
    "// Generated by tractmerge",
];

/// The name the front end imports.
pub const CONSTANT: &str = "censusTracts";

/// Writes `contents` to a temp file next to `path` and renames it over
/// `path`, so an interrupted run leaves the previous file intact. An existing
/// file keeps its permissions.
pub fn write_atomic(path: &Path, contents: &str) -> anyhow::Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temp file in {}", dir.display()))?;
    tmp.write_all(contents.as_bytes())?;
    if let Ok(existing) = std::fs::metadata(path) {
        tmp.as_file().set_permissions(existing.permissions())?;
    }
    tmp.persist(path)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

/// Renders the merged collection as a TypeScript module exporting
/// `censusTracts`.
pub fn typescript(collection: &FeatureCollection) -> anyhow::Result<String> {
    let mut lines: Vec<String> = HEADER.iter().map(|l| l.to_string()).collect();
    lines.push(String::new());
    lines.push(format!("export const {CONSTANT} = "));
    lines.push(serde_json::to_string_pretty(collection)?);
    lines.push(";".to_string());
    Ok(lines.join("\n"))
}

/// Writes the TypeScript module and returns its size in bytes.
pub fn write_typescript(path: &Path, collection: &FeatureCollection) -> anyhow::Result<usize> {
    let source = typescript(collection)?;
    write_atomic(path, &source)?;
    Ok(source.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wraps_collection_in_a_constant() {
        let collection: FeatureCollection = serde_json::from_value(json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": null,
                "properties": {"GEOID": "36005000100", "NAME": "Census Tract 1; Bronx County; New York"}
            }]
        }))
        .unwrap();

        let source = typescript(&collection).unwrap();
        let mut lines = source.lines();
        assert_eq!(lines.next(), Some(HEADER[0]));
        assert!(source.contains("\n\nexport const censusTracts = \n{\n"));
        assert!(source.ends_with("}\n;"));

        let body = source
            .split_once("export const censusTracts = \n")
            .unwrap()
            .1
            .trim_end_matches(';');
        let value: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(value["features"][0]["properties"]["GEOID"], json!("36005000100"));
    }

    #[test]
    fn atomic_write_replaces_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.ts");
        std::fs::write(&path, "old").unwrap();
        write_atomic(&path, "new").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn atomic_write_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("census-districts.json");
        std::fs::write(&path, "{}").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        write_atomic(&path, "{\"type\": \"FeatureCollection\"}").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }
}
