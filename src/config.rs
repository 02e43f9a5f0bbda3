use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

pub const DEFAULT_CSV: &str =
    "src/app/_components/data/census_age_sex_data/ACSST5Y2023.S0101-Data.csv";
pub const DEFAULT_DISTRICTS: &str = "src/app/_components/data/census-districts.json";
pub const DEFAULT_OUTPUT: &str = "src/app/_components/data/census-tracts.ts";
pub const DEFAULT_MISSING_LIST: &str = "missing_districts_geoid_list.txt";

/// 2020 TIGER/Line census tracts for New York State (FIPS 36).
pub const TIGER_2020_NY_TRACTS: &str =
    "https://www2.census.gov/geo/tiger/TIGER2020/TRACT/tl_2020_36_tract.zip";

/// Where each task reads and writes.
#[derive(Clone, Debug)]
pub struct Paths {
    pub csv: PathBuf,
    pub districts: PathBuf,
    pub output: PathBuf,
    pub missing_list: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Paths {
            csv: DEFAULT_CSV.into(),
            districts: DEFAULT_DISTRICTS.into(),
            output: DEFAULT_OUTPUT.into(),
            missing_list: DEFAULT_MISSING_LIST.into(),
        }
    }
}

/// Log filter from `RUST_LOG`, falling back to `info` when it is unset or
/// does not parse.
pub fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}
