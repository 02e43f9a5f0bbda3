//! The plain-text list of tracts still waiting for geometry.
//!
//! ```text
//! # Missing districts GEOIDs (for geometry lookup)
//! 36005001903 # Census Tract 19.03; Bronx County; New York
//! ```

use std::fmt::Write;

use crate::geoid::{normalize, TractId};

pub const HEADER: &str = "# Missing districts GEOIDs (for geometry lookup)";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MissingEntry {
    pub id: TractId,
    /// Human-readable tract name; may be empty.
    pub name: String,
}

/// Renders entries with the bare numeric id first. Unrecognized ids are
/// written verbatim.
pub fn render(entries: &[MissingEntry]) -> String {
    let mut out = format!("{HEADER}\n");
    for entry in entries {
        let id = entry.id.numeric().unwrap_or_else(|| entry.id.as_str());
        // Writing to a String never fails.
        let _ = writeln!(out, "{id} # {}", entry.name);
    }
    out
}

/// Parses the list. Blank and `#` lines are skipped; the id is whatever
/// precedes the first `#`.
pub fn parse(text: &str) -> Vec<MissingEntry> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let (id, name) = line.split_once('#').unwrap_or((line, ""));
            let id = id.trim();
            (!id.is_empty()).then(|| MissingEntry {
                id: normalize(id),
                name: name.trim().to_string(),
            })
        })
        .collect()
}
