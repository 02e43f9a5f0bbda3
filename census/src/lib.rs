//! NYC census tract reconciliation: identifier normalization, dataset
//! diffing, demographic merge and geometry backfill. Nothing in here touches
//! the filesystem or the network.

pub mod backfill;
pub mod borough;
pub mod demographic;
pub mod diff;
pub mod geoid;
pub mod merge;
pub mod placeholder;
pub mod sidefile;
pub mod tract;

pub use backfill::{backfill, promote, BackfillOutcome, GeometryLookup, ShapeIndex};
pub use borough::{Borough, TractName};
pub use demographic::{parse_count, AgeCount, AgeGroups, DemographicRecord, DemographicTable, AGE_BANDS};
pub use diff::{diff, Diff};
pub use geoid::{normalize, TractId, TRACT_PREFIX};
pub use merge::{merge, merge_all, MergeOutcome, MergedRecord, Population};
pub use placeholder::{add_placeholders, placeholder};
pub use sidefile::MissingEntry;
pub use tract::GeometryRecord;
