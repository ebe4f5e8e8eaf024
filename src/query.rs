// 🔎 Query views over the cached unified table
//
// Every view borrows from the shared table; nothing here mutates it.

use crate::classify::{classify_records, ClassifiedRecord};
use crate::error::{WageError, WageResult};
use crate::model::{UnifiedRecord, WageLevel};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Rows for a view, or an explicit "nothing matched this filter"
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome<T> {
    Data(T),
    NoData,
}

impl<T> QueryOutcome<T> {
    pub fn is_no_data(&self) -> bool {
        matches!(self, QueryOutcome::NoData)
    }

    pub fn data(self) -> Option<T> {
        match self {
            QueryOutcome::Data(data) => Some(data),
            QueryOutcome::NoData => None,
        }
    }
}

impl<T> QueryOutcome<Vec<T>> {
    fn from_rows(rows: Vec<T>) -> Self {
        if rows.is_empty() {
            QueryOutcome::NoData
        } else {
            QueryOutcome::Data(rows)
        }
    }
}

// ============================================================================
// FILTER
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFilter {
    /// None means every job role
    pub job_role: Option<String>,
}

impl RecordFilter {
    pub fn all() -> Self {
        Self::default()
    }

    /// "All" (any case) or an empty name also means every job role
    pub fn for_role(role: Option<&str>) -> Self {
        let job_role = role
            .map(str::trim)
            .filter(|r| !r.is_empty() && !r.eq_ignore_ascii_case("all"))
            .map(str::to_string);
        RecordFilter { job_role }
    }

    pub fn is_all_roles(&self) -> bool {
        self.job_role.is_none()
    }

    pub fn matches(&self, record: &UnifiedRecord) -> bool {
        match &self.job_role {
            Some(role) => record.job_title.as_deref() == Some(role.as_str()),
            None => true,
        }
    }

    pub fn apply<'a>(&self, records: &'a [UnifiedRecord]) -> Vec<&'a UnifiedRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

// ============================================================================
// VIEWS
// ============================================================================

/// Filtered rows that carry a value for the chosen wage level
pub fn wage_view<'a>(
    records: &'a [UnifiedRecord],
    filter: &RecordFilter,
    level: WageLevel,
) -> QueryOutcome<Vec<&'a UnifiedRecord>> {
    let rows = records
        .iter()
        .filter(|r| filter.matches(r) && r.wage(level).is_some())
        .collect();
    QueryOutcome::from_rows(rows)
}

/// Filtered rows labelled for a salary; Unknown rows are left out
pub fn classification_view<'a>(
    records: &'a [UnifiedRecord],
    filter: &RecordFilter,
    salary_hourly: Option<f64>,
) -> QueryOutcome<Vec<ClassifiedRecord<'a>>> {
    let rows = classify_records(filter.apply(records), salary_hourly);
    QueryOutcome::from_rows(rows)
}

/// Sorted distinct job titles
pub fn job_roles(records: &[UnifiedRecord]) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| r.job_title.as_deref())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

pub fn unique_areas<'a, I>(records: I) -> usize
where
    I: IntoIterator<Item = &'a UnifiedRecord>,
{
    records
        .into_iter()
        .map(|r| r.area_code.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// County detail over every job role is refused past the row limit
pub fn check_county_detail(filter: &RecordFilter, rows: usize, limit: usize) -> WageResult<()> {
    if filter.is_all_roles() && rows > limit {
        return Err(WageError::CountyLimitExceeded { rows, limit });
    }
    Ok(())
}

/// First `n` rows for a raw-data preview
pub fn preview<T>(rows: &[T], n: usize) -> &[T] {
    &rows[..rows.len().min(n)]
}

// ============================================================================
// TESTS
// ============================================================================
