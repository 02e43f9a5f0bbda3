//! Batch preparation of the NYC census tract data: validation of the ACS
//! extract against the city's tract geometry, placeholder creation, TIGER
//! geometry backfill and the merged TypeScript artifact.

pub mod acs;
pub mod config;
pub mod districts;
pub mod emit;
pub mod error;
pub mod getter;
pub mod report;
pub mod tasks;
pub mod tiger;

pub use config::Paths;
pub use error::PrepError;
