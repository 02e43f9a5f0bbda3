use std::fmt;

/// Summary-level prefix the ACS extracts put in front of a tract GEOID.
pub const TRACT_PREFIX: &str = "1400000US";

/// A census tract identifier after normalization.
///
/// Sources disagree on whether they store the bare 11-digit GEOID or the
/// `1400000US`-prefixed one. Both normalize to `Canonical`, holding the part
/// after the prefix. Anything else is kept verbatim as `Unrecognized` and never
/// matches a canonical id.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TractId {
    Canonical(String),
    Unrecognized(String),
}

impl TractId {
    /// `1400000US` + numeric, used to match across datasets.
    pub fn prefixed(&self) -> Option<String> {
        match self {
            TractId::Canonical(numeric) => Some(format!("{TRACT_PREFIX}{numeric}")),
            TractId::Unrecognized(_) => None,
        }
    }

    /// The bare numeric GEOID, used for output and storage.
    pub fn numeric(&self) -> Option<&str> {
        match self {
            TractId::Canonical(numeric) => Some(numeric.as_str()),
            TractId::Unrecognized(_) => None,
        }
    }

    pub fn is_canonical(&self) -> bool {
        matches!(self, TractId::Canonical(_))
    }

    /// The string this id was built from, or the numeric form when canonical.
    pub fn as_str(&self) -> &str {
        match self {
            TractId::Canonical(s) | TractId::Unrecognized(s) => s,
        }
    }
}

impl fmt::Display for TractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TractId::Canonical(numeric) => write!(f, "{TRACT_PREFIX}{numeric}"),
            TractId::Unrecognized(raw) => f.write_str(raw),
        }
    }
}

/// Normalizes a raw GEOID. Total: malformed input becomes `Unrecognized`.
pub fn normalize(raw: &str) -> TractId {
    let raw = raw.trim();
    if raw.len() == 11 && raw.bytes().all(|b| b.is_ascii_digit()) {
        TractId::Canonical(raw.to_string())
    } else if let Some(rest) = raw.strip_prefix(TRACT_PREFIX) {
        TractId::Canonical(rest.to_string())
    } else {
        TractId::Unrecognized(raw.to_string())
    }
}
