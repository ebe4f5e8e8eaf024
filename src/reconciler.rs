// ⚖️ Reconciler - merge wage sources with geography and occupation titles
//
//   wages   = primary ∪ secondary, one row per (area, soc), lower precedence rank wins
//   unified = geography ⋈ wages (inner, area) ⟕ occupations (left, soc)
//
// Output order is geography order, then merged wage order within an area,
// so the same inputs always produce the same table.

use crate::model::{GeographyRecord, OccupationRecord, UnifiedRecord, WageRecord, WageSource};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

// ============================================================================
// WAGE MERGE
// ============================================================================

#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub records: Vec<WageRecord>,
    pub duplicates_discarded: usize,
}

/// Deduplicate wage rows by (area_code, soc_code).
///
/// A key keeps the row whose source has the lowest precedence rank; between
/// rows of equal rank the first one seen stays. The surviving row takes the
/// position where its key first appeared.
pub fn merge_by_precedence<I>(rows: I) -> MergeOutcome
where
    I: IntoIterator<Item = WageRecord>,
{
    let mut records: Vec<WageRecord> = Vec::new();
    let mut positions: HashMap<(String, String), usize> = HashMap::new();
    let mut duplicates_discarded = 0;

    for row in rows {
        let (area, soc) = row.key();
        let key = (area.to_string(), soc.to_string());
        match positions.get(&key) {
            Some(&index) => {
                duplicates_discarded += 1;
                if row.source.precedence() < records[index].source.precedence() {
                    records[index] = row;
                }
            }
            None => {
                positions.insert(key, records.len());
                records.push(row);
            }
        }
    }

    MergeOutcome {
        records,
        duplicates_discarded,
    }
}

/// Primary rows first, secondary rows fill keys the primary lacks
pub fn merge_wage_sources(primary: Vec<WageRecord>, secondary: Vec<WageRecord>) -> MergeOutcome {
    merge_by_precedence(primary.into_iter().chain(secondary))
}

// ============================================================================
// RECONCILIATION REPORT
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub primary_rows: usize,
    pub secondary_rows: usize,
    pub duplicates_discarded: usize,
    pub geography_rows: usize,
    /// Geography rows dropped because no FIPS code resolved
    pub unresolved_geography_rows: usize,
    /// Merged wage rows whose area has no geography row
    pub unmatched_wage_rows: usize,
    pub occupation_rows: usize,
    pub duplicate_occupations: usize,
    pub records: usize,
    pub records_from_secondary: usize,
    pub missing_job_titles: usize,
    pub reconciled_at: Option<DateTime<Utc>>,
}

impl ReconciliationReport {
    pub fn summary(&self) -> String {
        format!(
            "Reconciled {} records ({} from secondary): {} primary + {} secondary wage rows, {} duplicates discarded, {} wage rows without geography, {} geography rows without FIPS, {} records without job title",
            self.records,
            self.records_from_secondary,
            self.primary_rows,
            self.secondary_rows,
            self.duplicates_discarded,
            self.unmatched_wage_rows,
            self.unresolved_geography_rows,
            self.missing_job_titles
        )
    }
}

#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub records: Vec<UnifiedRecord>,
    pub report: ReconciliationReport,
}

// ============================================================================
// RECONCILER
// ============================================================================

pub struct Reconciler;

impl Reconciler {
    pub fn new() -> Self {
        Reconciler
    }

    /// Merge wage sources and join them with geography and occupation titles
    pub fn reconcile(
        &self,
        geography: &[GeographyRecord],
        occupations: &[OccupationRecord],
        wage_primary: Vec<WageRecord>,
        wage_secondary: Vec<WageRecord>,
    ) -> Reconciliation {
        let mut report = ReconciliationReport {
            primary_rows: wage_primary.len(),
            secondary_rows: wage_secondary.len(),
            geography_rows: geography.len(),
            occupation_rows: occupations.len(),
            ..Default::default()
        };

        let merged = merge_wage_sources(wage_primary, wage_secondary);
        report.duplicates_discarded = merged.duplicates_discarded;

        let titles = self.index_titles(occupations, &mut report);

        let mut wages_by_area: HashMap<&str, Vec<&WageRecord>> = HashMap::new();
        for wage in &merged.records {
            wages_by_area.entry(wage.area_code.as_str()).or_default().push(wage);
        }

        let mut records = Vec::new();
        let mut matched_areas: HashSet<&str> = HashSet::new();

        for geo in geography {
            let fips = match &geo.fips {
                Some(fips) => fips,
                None => {
                    report.unresolved_geography_rows += 1;
                    continue;
                }
            };

            let Some(wages) = wages_by_area.get(geo.area_code.as_str()) else {
                continue;
            };
            matched_areas.insert(geo.area_code.as_str());

            for wage in wages {
                let job_title = titles.get(wage.soc_code.as_str()).map(|t| t.to_string());
                records.push(UnifiedRecord {
                    area_code: geo.area_code.clone(),
                    county_name: geo.county_name.clone(),
                    state_abbrev: geo.state_abbrev.clone(),
                    state_name: geo.state_name.clone(),
                    area_name: geo.area_name.clone(),
                    fips: fips.clone(),
                    soc_code: wage.soc_code.clone(),
                    job_title,
                    basis_label: wage.basis_label.clone(),
                    wage_level_1: wage.level_1,
                    wage_level_2: wage.level_2,
                    wage_level_3: wage.level_3,
                    wage_level_4: wage.level_4,
                    source: wage.source,
                });
            }
        }

        report.unmatched_wage_rows = merged
            .records
            .iter()
            .filter(|w| !matched_areas.contains(w.area_code.as_str()))
            .count();
        report.records = records.len();
        report.records_from_secondary = records
            .iter()
            .filter(|r| r.source == WageSource::Secondary)
            .count();
        report.missing_job_titles = records.iter().filter(|r| r.job_title.is_none()).count();
        report.reconciled_at = Some(Utc::now());

        info!(
            records = report.records,
            duplicates = report.duplicates_discarded,
            unmatched_wages = report.unmatched_wage_rows,
            "reconciled wage sources"
        );

        Reconciliation { records, report }
    }

    /// soc_code → title, first title wins on repeated codes
    fn index_titles<'a>(
        &self,
        occupations: &'a [OccupationRecord],
        report: &mut ReconciliationReport,
    ) -> HashMap<&'a str, &'a str> {
        let mut titles = HashMap::new();
        for occ in occupations {
            if titles.contains_key(occ.soc_code.as_str()) {
                report.duplicate_occupations += 1;
                debug!(soc_code = %occ.soc_code, "repeated occupation code, keeping first title");
                continue;
            }
            titles.insert(occ.soc_code.as_str(), occ.job_title.as_str());
        }
        titles
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_wage(area: &str, soc: &str, level_1: f64, source: WageSource) -> WageRecord {
        WageRecord {
            area_code: area.to_string(),
            soc_code: soc.to_string(),
            basis_label: String::new(),
            level_1: Some(level_1),
            level_2: Some(level_1 + 10.0),
            level_3: Some(level_1 + 20.0),
            level_4: Some(level_1 + 30.0),
            source,
        }
    }

    fn create_test_geo(area: &str, county: &str, state: &str, fips: Option<&str>) -> GeographyRecord {
        GeographyRecord {
            area_code: area.to_string(),
            county_name: county.to_string(),
            state_abbrev: state.to_string(),
            state_name: format!("State {}", state),
            area_name: format!("Area {}", area),
            fips: fips.map(|f| f.to_string()),
        }
    }

    fn create_test_occupation(soc: &str, title: &str) -> OccupationRecord {
        OccupationRecord {
            soc_code: soc.to_string(),
            job_title: title.to_string(),
        }
    }

    #[test]
    fn test_primary_wins_duplicate_keys() {
        let primary = vec![create_test_wage("1000", "15-1254", 40.0, WageSource::Primary)];
        let secondary = vec![
            create_test_wage("1000", "15-1254", 99.0, WageSource::Secondary),
            create_test_wage("2000", "11-1021", 30.0, WageSource::Secondary),
        ];

        let merged = merge_wage_sources(primary, secondary);

        assert_eq!(merged.records.len(), 2);
        assert_eq!(merged.duplicates_discarded, 1);
        assert_eq!(merged.records[0].level_1, Some(40.0));
        assert_eq!(merged.records[0].source, WageSource::Primary);
        assert_eq!(merged.records[1].source, WageSource::Secondary);
    }

    #[test]
    fn test_precedence_independent_of_arrival_order() {
        let rows = vec![
            create_test_wage("1000", "15-1254", 99.0, WageSource::Secondary),
            create_test_wage("1000", "15-1254", 40.0, WageSource::Primary),
        ];

        let merged = merge_by_precedence(rows);

        assert_eq!(merged.records.len(), 1);
        assert_eq!(merged.records[0].source, WageSource::Primary);
        assert_eq!(merged.records[0].level_1, Some(40.0));
    }

    #[test]
    fn test_first_row_wins_within_same_source() {
        let rows = vec![
            create_test_wage("1000", "15-1254", 40.0, WageSource::Primary),
            create_test_wage("1000", "15-1254", 41.0, WageSource::Primary),
        ];

        let merged = merge_by_precedence(rows);
        assert_eq!(merged.records.len(), 1);
        assert_eq!(merged.records[0].level_1, Some(40.0));
    }

    #[test]
    fn test_reconcile_joins() {
        let reconciler = Reconciler::new();

        let geography = vec![
            create_test_geo("1000", "San Francisco County", "CA", Some("06075")),
            create_test_geo("1000", "San Mateo County", "CA", Some("06081")),
            create_test_geo("3000", "Unresolved Town", "CT", None),
        ];
        let occupations = vec![create_test_occupation("15-1254", "Web Developers")];
        let primary = vec![
            create_test_wage("1000", "15-1254", 40.0, WageSource::Primary),
            create_test_wage("1000", "99-9999", 20.0, WageSource::Primary),
            create_test_wage("9999", "15-1254", 50.0, WageSource::Primary),
        ];

        let result = reconciler.reconcile(&geography, &occupations, primary, vec![]);

        // 2 counties × 2 wage rows for area 1000
        assert_eq!(result.records.len(), 4);
        assert_eq!(result.records[0].fips, "06075");
        assert_eq!(result.records[0].soc_code, "15-1254");
        assert_eq!(result.records[0].job_title.as_deref(), Some("Web Developers"));
        assert_eq!(result.records[1].soc_code, "99-9999");
        assert_eq!(result.records[1].job_title, None);
        assert_eq!(result.records[2].fips, "06081");

        assert_eq!(result.report.unmatched_wage_rows, 1);
        assert_eq!(result.report.unresolved_geography_rows, 1);
        assert_eq!(result.report.missing_job_titles, 2);
        assert_eq!(result.report.records, 4);
    }

    #[test]
    fn test_secondary_fallback_reaches_unified_table() {
        let reconciler = Reconciler::new();

        let geography = vec![
            create_test_geo("1000", "San Francisco County", "CA", Some("06075")),
            create_test_geo("2000", "Cook County", "IL", Some("17031")),
        ];
        let occupations = vec![create_test_occupation("11-1021", "General and Operations Managers")];
        let primary = vec![create_test_wage("1000", "15-1254", 40.0, WageSource::Primary)];
        let secondary = vec![create_test_wage("2000", "11-1021", 55.0, WageSource::Secondary)];

        let result = reconciler.reconcile(&geography, &occupations, primary, secondary);

        let fallback = result
            .records
            .iter()
            .find(|r| r.area_code == "2000" && r.soc_code == "11-1021")
            .expect("secondary row should be present");
        assert_eq!(fallback.source, WageSource::Secondary);
        assert_eq!(fallback.wage_level_1, Some(55.0));
        assert_eq!(result.report.records_from_secondary, 1);
    }

    #[test]
    fn test_repeated_occupation_codes_do_not_fan_out() {
        let reconciler = Reconciler::new();

        let geography = vec![create_test_geo("1000", "San Francisco County", "CA", Some("06075"))];
        let occupations = vec![
            create_test_occupation("15-1254", "Web Developers"),
            create_test_occupation("15-1254", "Web Developers (alt)"),
        ];
        let primary = vec![create_test_wage("1000", "15-1254", 40.0, WageSource::Primary)];

        let result = reconciler.reconcile(&geography, &occupations, primary, vec![]);

        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].job_title.as_deref(), Some("Web Developers"));
        assert_eq!(result.report.duplicate_occupations, 1);
    }

    #[test]
    fn test_reconcile_is_deterministic() {
        let reconciler = Reconciler::new();

        let geography = vec![
            create_test_geo("1000", "A County", "CA", Some("06001")),
            create_test_geo("2000", "B County", "IL", Some("17001")),
        ];
        let wages = || {
            vec![
                create_test_wage("2000", "11-1021", 30.0, WageSource::Primary),
                create_test_wage("1000", "15-1254", 40.0, WageSource::Primary),
                create_test_wage("1000", "11-1021", 35.0, WageSource::Primary),
            ]
        };

        let first = reconciler.reconcile(&geography, &[], wages(), vec![]);
        let second = reconciler.reconcile(&geography, &[], wages(), vec![]);

        assert_eq!(first.records, second.records);
        assert_eq!(first.records[0].area_code, "1000");
        assert_eq!(first.records[0].soc_code, "15-1254");
        assert_eq!(first.records[2].area_code, "2000");
    }

    #[test]
    fn test_report_summary() {
        let report = ReconciliationReport {
            records: 10,
            records_from_secondary: 2,
            duplicates_discarded: 3,
            ..Default::default()
        };

        let summary = report.summary();
        assert!(summary.contains("10 records (2 from secondary)"));
        assert!(summary.contains("3 duplicates discarded"));
    }
}
