use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use shapefile::dbase::{FieldValue, Record};
use shapefile::Shape;
use tracing::{debug, info};

use census::{normalize, ShapeIndex};

use crate::config::TIGER_2020_NY_TRACTS;
use crate::error::PrepError;
use crate::getter::GeometrySource;

/// Attribute columns that may hold the tract GEOID, in order of preference.
pub const GEOID_COLUMNS: [&str; 4] = ["GEOID", "GEOID20", "GEOID_TRT", "TRACTCE20"];

/// Census Bureau TIGER/Line tract shapefile, fetched as a zip archive.
#[derive(Debug, Clone)]
pub struct TigerTracts {
    pub url: String,
}

impl Default for TigerTracts {
    fn default() -> Self {
        TigerTracts {
            url: TIGER_2020_NY_TRACTS.to_string(),
        }
    }
}

#[async_trait]
impl GeometrySource for TigerTracts {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn geometries(&self) -> anyhow::Result<ShapeIndex> {
        info!("Downloading shapefile from {}", self.url);
        let mut tmpfile = tempfile::tempfile()?;
        let bytes = reqwest::get(&self.url)
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        tmpfile.write_all(&bytes)?;
        info!("Downloaded {:.2} MB", bytes.len() as f64 / 1024.0 / 1024.0);

        // Removed when dropped, after the shapefile has been read.
        let scratch = tempfile::tempdir()?;
        let mut zip = zip::ZipArchive::new(tmpfile).context("opening shapefile archive")?;
        zip.extract(scratch.path())
            .context("extracting shapefile archive")?;

        let shp = find_shapefile(scratch.path())?;
        read_shapefile(&shp)
    }
}

/// First `.shp` in `dir`, by file name.
pub fn find_shapefile(dir: &Path) -> anyhow::Result<PathBuf> {
    let mut found: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("shp"))
        })
        .collect();
    found.sort();
    found
        .into_iter()
        .next()
        .ok_or_else(|| PrepError::NoShapefile(dir.to_path_buf()).into())
}

/// Reads every shape in a shapefile into an index keyed by tract.
pub fn read_shapefile(path: &Path) -> anyhow::Result<ShapeIndex> {
    info!("Loading shapefile: {}", path.display());
    let mut reader = shapefile::Reader::from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let rows = reader
        .iter_shapes_and_records()
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("reading {}", path.display()))?;
    info!("Loaded {} features", rows.len());

    let Some((_, first)) = rows.first() else {
        return Ok(ShapeIndex::default());
    };
    let column = identifier_column(first)?;
    info!("Using GEOID column: {column}");

    let mut index = ShapeIndex::default();
    for (shape, record) in rows {
        let Some(raw) = field_text(&record, column) else {
            continue;
        };
        match shape_to_geojson(shape)? {
            Some(value) => index.insert(normalize(&raw), value),
            None => debug!("null shape for {raw}"),
        }
    }
    Ok(index)
}

/// Picks the GEOID column from the first record's fields.
pub fn identifier_column(record: &Record) -> Result<&'static str, PrepError> {
    GEOID_COLUMNS
        .into_iter()
        .find(|column| record.get(column).is_some())
        .ok_or_else(|| {
            let mut available: Vec<String> =
                HashMap::<String, FieldValue>::from(record.clone()).into_keys().collect();
            available.sort();
            PrepError::NoIdentifierColumn { available }
        })
}

fn field_text(record: &Record, column: &str) -> Option<String> {
    match record.get(column)? {
        FieldValue::Character(Some(text)) => Some(text.trim().to_string()),
        FieldValue::Numeric(Some(n)) => Some(format!("{n:.0}")),
        _ => None,
    }
}

/// Converts a shape to GeoJSON. Single-part polygons come out as `Polygon`,
/// the way the shapefile stores them; null shapes are skipped.
pub fn shape_to_geojson(shape: Shape) -> anyhow::Result<Option<geojson::Value>> {
    if matches!(shape, Shape::NullShape) {
        return Ok(None);
    }
    let geometry = geo::Geometry::<f64>::try_from(shape)
        .map_err(|e| anyhow!("unsupported shape: {e}"))?;
    let geometry = match geometry {
        geo::Geometry::MultiPolygon(geo::MultiPolygon(mut parts)) if parts.len() == 1 => {
            geo::Geometry::Polygon(parts.remove(0))
        }
        other => other,
    };
    Ok(Some(geojson::Value::from(&geometry)))
}
