// Wage Atlas - Core Library
// Reconciles OFLC prevailing-wage exports into one per-county table and
// answers wage-amount and salary-classification queries over it.

pub mod error;
pub mod config;
pub mod logging;
pub mod model;
pub mod sources;      // Source Readers
pub mod normalizer;   // Hourly basis, canonical area codes
pub mod fips;         // County FIPS resolution
pub mod reconciler;   // Primary/secondary merge + joins
pub mod pipeline;
pub mod cache;        // Injectable unified-table cache
pub mod query;
pub mod aggregate;    // Wage-amount mode
pub mod classify;     // Salary-classification mode
pub mod format;

use anyhow::Result;
use std::sync::Arc;

// Re-export commonly used types
pub use error::{WageError, WageResult};
pub use config::{Config, DataSources, ViewSettings};
pub use model::{
    GeographyRecord, OccupationRecord, WageRecord, UnifiedRecord,
    WageLevel, WageSource, HOURS_PER_YEAR,
};
pub use sources::{
    RawGeographyRow, RawOccupationRow, RawWageRow, RawCountyRow, SourceTable,
    read_table, read_table_from,
};
pub use normalizer::{Normalizer, normalize_area_code, coerce_wage, is_annual_basis};
pub use fips::{FipsResolver, normalize_place_name, state_fips, state_name};
pub use reconciler::{
    Reconciler, Reconciliation, ReconciliationReport, MergeOutcome,
    merge_by_precedence, merge_wage_sources,
};
pub use pipeline::{RawInputs, reconcile_inputs};
pub use cache::{UnifiedCache, UnifiedTable, SourceFingerprint};
pub use query::{
    QueryOutcome, RecordFilter,
    wage_view, classification_view, job_roles, unique_areas, check_county_detail, preview,
};
pub use aggregate::{
    StateWage, CountyWage, WageStats,
    aggregate_by_state, county_wages, summarize, summarize_records,
};
pub use classify::{
    Classification, ClassifiedRecord, ClassificationDistribution, SalaryInput,
    StateClassification, classify, classify_thresholds, classify_records, classify_by_state,
};
pub use format::{format_hourly, format_annual, format_combined, format_optional_hourly};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Unified table for these sources, built on the first call and reused
/// until a source file changes.
pub fn load_unified(cache: &UnifiedCache, sources: &DataSources) -> Result<Arc<UnifiedTable>> {
    cache.load(sources)
}
