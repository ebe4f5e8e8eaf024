// 🧹 Normalizer - canonical area codes, numeric wages, hourly basis
//
// Wage exports mix hourly rows (blank or "High Wage" label) with annual rows
// ("Annual Wage"). Annual rows are divided by the hours-per-year constant so
// every level downstream is hourly.

use crate::fips::state_name;
use crate::model::{GeographyRecord, OccupationRecord, WageRecord, WageSource, HOURS_PER_YEAR};
use crate::sources::{RawGeographyRow, RawOccupationRow, RawWageRow};
use tracing::debug;

/// Canonical string form of an area identifier.
///
/// Numeric identifiers lose leading zeros and integral decimal tails
/// ("01000", "1000.0" → "1000"); anything else is only trimmed.
pub fn normalize_area_code(raw: &str) -> String {
    let trimmed = raw.trim();

    let integral = match trimmed.split_once('.') {
        Some((whole, frac)) if frac.chars().all(|c| c == '0') => whole,
        _ => trimmed,
    };

    if !integral.is_empty() && integral.chars().all(|c| c.is_ascii_digit()) {
        let stripped = integral.trim_start_matches('0');
        if stripped.is_empty() {
            "0".to_string()
        } else {
            stripped.to_string()
        }
    } else {
        trimmed.to_string()
    }
}

/// Parse a wage cell; anything non-numeric becomes None
pub fn coerce_wage(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// "Annual Wage" (any case) means the four levels are yearly figures
pub fn is_annual_basis(label: &str) -> bool {
    label.to_lowercase().contains("annual")
}

// ============================================================================
// NORMALIZER
// ============================================================================

pub struct Normalizer {
    /// Divisor applied to annual-basis rows (default: 2080)
    pub hours_per_year: f64,
}

impl Normalizer {
    pub fn new() -> Self {
        Normalizer {
            hours_per_year: HOURS_PER_YEAR,
        }
    }

    /// Normalize one raw wage row
    pub fn normalize_wage(&self, raw: &RawWageRow, source: WageSource) -> WageRecord {
        let basis_label = raw
            .label
            .as_deref()
            .map(|l| l.trim().to_string())
            .unwrap_or_default();
        let divisor = if is_annual_basis(&basis_label) {
            self.hours_per_year
        } else {
            1.0
        };

        let level = |cell: &Option<String>| {
            cell.as_deref()
                .and_then(coerce_wage)
                .map(|value| value / divisor)
        };

        WageRecord {
            area_code: normalize_area_code(&raw.area),
            soc_code: raw.soc_code.trim().to_string(),
            level_1: level(&raw.level1),
            level_2: level(&raw.level2),
            level_3: level(&raw.level3),
            level_4: level(&raw.level4),
            basis_label,
            source,
        }
    }

    /// Normalize a whole wage export, preserving row order
    pub fn normalize_wages(&self, rows: &[RawWageRow], source: WageSource) -> Vec<WageRecord> {
        let records: Vec<WageRecord> = rows
            .iter()
            .map(|raw| self.normalize_wage(raw, source))
            .collect();

        let annual = records
            .iter()
            .filter(|r| is_annual_basis(&r.basis_label))
            .count();
        debug!(
            source = source.code(),
            rows = records.len(),
            annual_rows = annual,
            "normalized wage rows"
        );

        records
    }

    /// Geography row with canonical area code; FIPS is filled by the resolver
    /// A blank state name is filled in from the postal abbreviation
    pub fn normalize_geography(&self, raw: &RawGeographyRow) -> GeographyRecord {
        let state_abbrev = raw.state_ab.trim().to_uppercase();
        let state = match raw.state.trim() {
            "" => state_name(&state_abbrev).unwrap_or_default().to_string(),
            named => named.to_string(),
        };

        GeographyRecord {
            area_code: normalize_area_code(&raw.area),
            county_name: raw.county_town_name.trim().to_string(),
            state_abbrev,
            state_name: state,
            area_name: raw.area_name.trim().to_string(),
            fips: None,
        }
    }

    pub fn normalize_occupation(&self, raw: &RawOccupationRow) -> OccupationRecord {
        OccupationRecord {
            soc_code: raw.soc_code.trim().to_string(),
            job_title: raw.title.trim().to_string(),
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
