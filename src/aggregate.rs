// 📊 Wage-amount views - state means, county rows, summary statistics
//
// Missing wages are "no data": excluded from means and statistics, never
// counted as zero.

use crate::model::{UnifiedRecord, WageLevel, HOURS_PER_YEAR};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// STATE AGGREGATES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateWage {
    pub state_abbrev: String,
    pub state_name: String,
    pub avg_hourly: f64,
    /// Rows that contributed a value
    pub samples: usize,
}

impl StateWage {
    pub fn avg_annual(&self) -> f64 {
        self.avg_hourly * HOURS_PER_YEAR
    }
}

/// Mean of one wage level per state, sorted by state abbreviation.
///
/// States with no present value for the level are left out.
pub fn aggregate_by_state<'a, I>(records: I, level: WageLevel) -> Vec<StateWage>
where
    I: IntoIterator<Item = &'a UnifiedRecord>,
{
    struct Acc<'r> {
        state_name: &'r str,
        sum: f64,
        samples: usize,
    }

    let mut groups: BTreeMap<&str, Acc> = BTreeMap::new();

    for record in records {
        let acc = groups.entry(record.state_abbrev.as_str()).or_insert(Acc {
            state_name: record.state_name.as_str(),
            sum: 0.0,
            samples: 0,
        });

        if let Some(wage) = record.wage(level).filter(|w| w.is_finite()) {
            acc.sum += wage;
            acc.samples += 1;
        }
    }

    groups
        .into_iter()
        .filter(|(_, acc)| acc.samples > 0)
        .map(|(abbrev, acc)| StateWage {
            state_abbrev: abbrev.to_string(),
            state_name: acc.state_name.to_string(),
            avg_hourly: acc.sum / acc.samples as f64,
            samples: acc.samples,
        })
        .collect()
}

// ============================================================================
// COUNTY ROWS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountyWage {
    pub fips: String,
    pub county_name: String,
    pub state_name: String,
    pub area_name: String,
    pub job_title: Option<String>,
    pub hourly: f64,
    pub annual: f64,
}

/// One row per record with a present value for the level
pub fn county_wages<'a, I>(records: I, level: WageLevel) -> Vec<CountyWage>
where
    I: IntoIterator<Item = &'a UnifiedRecord>,
{
    records
        .into_iter()
        .filter_map(|record| {
            let hourly = record.wage(level)?;
            Some(CountyWage {
                fips: record.fips.clone(),
                county_name: record.county_name.clone(),
                state_name: record.state_name.clone(),
                area_name: record.area_name.clone(),
                job_title: record.job_title.clone(),
                hourly,
                annual: hourly * HOURS_PER_YEAR,
            })
        })
        .collect()
}

// ============================================================================
// STATISTICS
// ============================================================================

/// All-zero for an empty input
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WageStats {
    pub avg: f64,
    pub median: f64,
    pub max: f64,
    pub min: f64,
}

pub fn summarize(values: &[f64]) -> WageStats {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return WageStats::default();
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len();
    let median = if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    };

    WageStats {
        avg: sorted.iter().sum::<f64>() / n as f64,
        median,
        max: sorted[n - 1],
        min: sorted[0],
    }
}

/// Statistics of one level's present values
pub fn summarize_records<'a, I>(records: I, level: WageLevel) -> WageStats
where
    I: IntoIterator<Item = &'a UnifiedRecord>,
{
    let values: Vec<f64> = records.into_iter().filter_map(|r| r.wage(level)).collect();
    summarize(&values)
}

// ============================================================================
// TESTS
// ============================================================================
