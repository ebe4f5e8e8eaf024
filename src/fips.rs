// 🗺️ FIPS Resolver - (county name, state) → 5-digit county FIPS
//
// "San Francisco County", "san francisco", "SAN FRANCISCO" → all 06075
//
// One matching rule for every row: names are folded (case, accents,
// punctuation, saint/st) and a county is indexed under its full name and
// under its name without the administrative suffix. The first county in
// reference order wins a collision, so resolution is deterministic.

use crate::error::{WageError, WageResult};
use crate::model::GeographyRecord;
use crate::sources::{read_table_from, RawCountyRow, SourceTable};
use anyhow::{Context, Result};
use std::collections::HashMap;
use tracing::{debug, info};

/// Census county and county-equivalent reference (statefp, countyfp, name)
const BUNDLED_COUNTIES: &str = include_str!("../data/counties.csv");

/// (FIPS, postal abbreviation, name)
const STATES: &[(&str, &str, &str)] = &[
    ("01", "AL", "Alabama"),
    ("02", "AK", "Alaska"),
    ("04", "AZ", "Arizona"),
    ("05", "AR", "Arkansas"),
    ("06", "CA", "California"),
    ("08", "CO", "Colorado"),
    ("09", "CT", "Connecticut"),
    ("10", "DE", "Delaware"),
    ("11", "DC", "District of Columbia"),
    ("12", "FL", "Florida"),
    ("13", "GA", "Georgia"),
    ("15", "HI", "Hawaii"),
    ("16", "ID", "Idaho"),
    ("17", "IL", "Illinois"),
    ("18", "IN", "Indiana"),
    ("19", "IA", "Iowa"),
    ("20", "KS", "Kansas"),
    ("21", "KY", "Kentucky"),
    ("22", "LA", "Louisiana"),
    ("23", "ME", "Maine"),
    ("24", "MD", "Maryland"),
    ("25", "MA", "Massachusetts"),
    ("26", "MI", "Michigan"),
    ("27", "MN", "Minnesota"),
    ("28", "MS", "Mississippi"),
    ("29", "MO", "Missouri"),
    ("30", "MT", "Montana"),
    ("31", "NE", "Nebraska"),
    ("32", "NV", "Nevada"),
    ("33", "NH", "New Hampshire"),
    ("34", "NJ", "New Jersey"),
    ("35", "NM", "New Mexico"),
    ("36", "NY", "New York"),
    ("37", "NC", "North Carolina"),
    ("38", "ND", "North Dakota"),
    ("39", "OH", "Ohio"),
    ("40", "OK", "Oklahoma"),
    ("41", "OR", "Oregon"),
    ("42", "PA", "Pennsylvania"),
    ("44", "RI", "Rhode Island"),
    ("45", "SC", "South Carolina"),
    ("46", "SD", "South Dakota"),
    ("47", "TN", "Tennessee"),
    ("48", "TX", "Texas"),
    ("49", "UT", "Utah"),
    ("50", "VT", "Vermont"),
    ("51", "VA", "Virginia"),
    ("53", "WA", "Washington"),
    ("54", "WV", "West Virginia"),
    ("55", "WI", "Wisconsin"),
    ("56", "WY", "Wyoming"),
    ("60", "AS", "American Samoa"),
    ("66", "GU", "Guam"),
    ("69", "MP", "Northern Mariana Islands"),
    ("72", "PR", "Puerto Rico"),
    ("78", "VI", "U.S. Virgin Islands"),
];

/// Longest first, so "city and borough" is tried before "borough"
const COUNTY_SUFFIXES: &[&str] = &[
    "city and borough",
    "planning region",
    "census area",
    "municipality",
    "municipio",
    "borough",
    "parish",
    "county",
];

// ============================================================================
// NAME MATCHING RULE
// ============================================================================

/// Fold a place name to its comparison form
pub fn normalize_place_name(name: &str) -> String {
    let folded: String = name
        .chars()
        .flat_map(|c| c.to_lowercase())
        .filter_map(|c| match c {
            '.' | '\'' | '\u{2019}' => None,
            '-' => Some(' '),
            'á' | 'à' | 'â' | 'ä' | 'ã' => Some('a'),
            'é' | 'è' | 'ê' | 'ë' => Some('e'),
            'í' | 'ì' | 'î' | 'ï' => Some('i'),
            'ó' | 'ò' | 'ô' | 'ö' | 'õ' => Some('o'),
            'ú' | 'ù' | 'û' | 'ü' => Some('u'),
            'ñ' => Some('n'),
            'ç' => Some('c'),
            other => Some(other),
        })
        .collect();

    folded
        .split_whitespace()
        .map(|word| match word {
            "saint" => "st",
            "sainte" => "ste",
            other => other,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Drop a trailing administrative suffix from an already-normalized name
pub fn strip_county_suffix(normalized: &str) -> &str {
    for suffix in COUNTY_SUFFIXES {
        if let Some(rest) = normalized.strip_suffix(suffix) {
            if let Some(rest) = rest.strip_suffix(' ') {
                if !rest.is_empty() {
                    return rest;
                }
            }
        }
    }
    normalized
}

/// State FIPS for a postal code, full name or 2-digit code
pub fn state_fips(state: &str) -> Option<&'static str> {
    let trimmed = state.trim();
    let upper = trimmed.to_uppercase();
    let normalized = normalize_place_name(trimmed);

    STATES
        .iter()
        .find(|(fips, postal, name)| {
            *postal == upper || *fips == trimmed || normalize_place_name(name) == normalized
        })
        .map(|(fips, _, _)| *fips)
}

/// Full state name for a postal code
pub fn state_name(postal: &str) -> Option<&'static str> {
    let upper = postal.trim().to_uppercase();
    STATES
        .iter()
        .find(|(_, p, _)| *p == upper)
        .map(|(_, _, name)| *name)
}

fn pad_digits(raw: &str, width: usize, line: usize, field: &str) -> WageResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.len() > width || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(WageError::InvalidCountyRow {
            line,
            reason: format!("{} must be 1-{} digits, got {:?}", field, width, raw),
        });
    }
    Ok(format!("{:0>width$}", trimmed, width = width))
}

// ============================================================================
// RESOLVER
// ============================================================================

pub struct FipsResolver {
    /// (state FIPS, normalized county name) → 5-digit county FIPS
    counties: HashMap<(String, String), String>,
}

impl FipsResolver {
    /// Build the lookup from county reference rows (in file order)
    pub fn from_rows(rows: &[RawCountyRow]) -> WageResult<Self> {
        let mut counties = HashMap::new();

        for (index, row) in rows.iter().enumerate() {
            let line = index + 2;
            let state = pad_digits(&row.statefp, 2, line, "statefp")?;
            let county = pad_digits(&row.countyfp, 3, line, "countyfp")?;
            let fips = format!("{}{}", state, county);

            let full = normalize_place_name(&row.name);
            let stripped = strip_county_suffix(&full).to_string();

            if stripped != full {
                counties
                    .entry((state.clone(), stripped))
                    .or_insert_with(|| fips.clone());
            }
            counties.entry((state, full)).or_insert(fips);
        }

        info!(entries = counties.len(), "built FIPS lookup");
        Ok(FipsResolver { counties })
    }

    /// Lookup over the Census county table compiled into the crate
    pub fn bundled() -> Result<Self> {
        let rows: Vec<RawCountyRow> = read_table_from(
            BUNDLED_COUNTIES.as_bytes(),
            SourceTable::Counties,
            "bundled county reference",
        )?;
        Self::from_rows(&rows).context("Bundled county reference is invalid")
    }

    /// Resolve a county to its 5-digit FIPS code
    pub fn resolve(&self, county_name: &str, state: &str) -> Option<String> {
        let state = state_fips(state)?;
        let full = normalize_place_name(county_name);
        if full.is_empty() {
            return None;
        }

        let lookup = |name: &str| self.counties.get(&(state.to_string(), name.to_string()));

        lookup(&full)
            .or_else(|| lookup(strip_county_suffix(&full)))
            .cloned()
    }

    /// Attach FIPS codes, dropping rows that do not resolve.
    ///
    /// Returns the kept rows (original order) and the number dropped.
    pub fn resolve_all(&self, rows: Vec<GeographyRecord>) -> (Vec<GeographyRecord>, usize) {
        let total = rows.len();
        let mut kept = Vec::with_capacity(total);

        for mut row in rows {
            match self.resolve(&row.county_name, &row.state_abbrev) {
                Some(fips) => {
                    row.fips = Some(fips);
                    kept.push(row);
                }
                None => {
                    debug!(
                        county = %row.county_name,
                        state = %row.state_abbrev,
                        "no FIPS match, dropping geography row"
                    );
                }
            }
        }

        let dropped = total - kept.len();
        info!(kept = kept.len(), dropped, "resolved county FIPS codes");
        (kept, dropped)
    }

    pub fn len(&self) -> usize {
        self.counties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counties.is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================
