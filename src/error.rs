//! Hard failures. Anything here ends the run with exit status 1.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrepError {
    #[error("missing input file: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("column {column} not found in {}", path.display())]
    MissingColumn { column: String, path: PathBuf },

    #[error("no GEOID column in shapefile (available columns: {})", available.join(", "))]
    NoIdentifierColumn { available: Vec<String> },

    #[error("no .shp file found in {}", .0.display())]
    NoShapefile(PathBuf),

    #[error("no geometry found for any of the {wanted} missing tracts")]
    NoGeometryMatches { wanted: usize },
}
