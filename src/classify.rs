// 🏷️ Salary classification - where a salary sits against the four levels
//
// Half-open bands, boundary values belong to the higher level:
//   (0, L1) Below Level 1 | [L1, L2) Level 1 | [L2, L3) Level 2 | [L3, L4) Level 3 | [L4, ∞) Level 4+

use crate::model::{UnifiedRecord, HOURS_PER_YEAR};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// CLASSIFICATION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    #[serde(rename = "Below Level 1")]
    BelowLevel1,
    #[serde(rename = "Level 1 (Entry)")]
    Level1,
    #[serde(rename = "Level 2 (Qualified)")]
    Level2,
    #[serde(rename = "Level 3 (Experienced)")]
    Level3,
    #[serde(rename = "Level 4+ (Fully Competent)")]
    Level4Plus,
    Unknown,
}

impl Classification {
    /// Known labels in ascending order
    pub const RANKED: [Classification; 5] = [
        Classification::BelowLevel1,
        Classification::Level1,
        Classification::Level2,
        Classification::Level3,
        Classification::Level4Plus,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Classification::BelowLevel1 => "Below Level 1",
            Classification::Level1 => "Level 1 (Entry)",
            Classification::Level2 => "Level 2 (Qualified)",
            Classification::Level3 => "Level 3 (Experienced)",
            Classification::Level4Plus => "Level 4+ (Fully Competent)",
            Classification::Unknown => "Unknown",
        }
    }

    pub fn is_known(&self) -> bool {
        *self != Classification::Unknown
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a salary against four thresholds (absent thresholds already 0)
pub fn classify_thresholds(thresholds: [f64; 4], salary_hourly: Option<f64>) -> Classification {
    let salary = match salary_hourly {
        Some(s) if s > 0.0 => s,
        _ => return Classification::Unknown,
    };
    let [level_1, level_2, level_3, level_4] = thresholds;

    if salary < level_1 {
        Classification::BelowLevel1
    } else if salary < level_2 {
        Classification::Level1
    } else if salary < level_3 {
        Classification::Level2
    } else if salary < level_4 {
        Classification::Level3
    } else {
        Classification::Level4Plus
    }
}

pub fn classify(record: &UnifiedRecord, salary_hourly: Option<f64>) -> Classification {
    classify_thresholds(record.thresholds(), salary_hourly)
}

// ============================================================================
// SALARY INPUT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SalaryInput {
    Annual(f64),
    Hourly(f64),
}

impl SalaryInput {
    pub fn hourly(&self) -> f64 {
        match self {
            SalaryInput::Annual(amount) => amount / HOURS_PER_YEAR,
            SalaryInput::Hourly(amount) => *amount,
        }
    }
}

// ============================================================================
// CLASSIFIED VIEWS
// ============================================================================

/// A record paired with its label for one query salary (never stored)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifiedRecord<'a> {
    pub record: &'a UnifiedRecord,
    pub classification: Classification,
}

/// Label every record; rows that come out Unknown are left out
pub fn classify_records<'a, I>(records: I, salary_hourly: Option<f64>) -> Vec<ClassifiedRecord<'a>>
where
    I: IntoIterator<Item = &'a UnifiedRecord>,
{
    records
        .into_iter()
        .map(|record| ClassifiedRecord {
            record,
            classification: classify(record, salary_hourly),
        })
        .filter(|c| c.classification.is_known())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateClassification {
    pub state_abbrev: String,
    pub state_name: String,
    pub classification: Classification,
    pub counties: usize,
}

/// Most frequent label per state, sorted by state abbreviation.
///
/// Ties go to the label seen first in that state's row order.
pub fn classify_by_state(classified: &[ClassifiedRecord<'_>]) -> Vec<StateClassification> {
    struct Tally<'r> {
        state_name: &'r str,
        /// (label, count) in order of first appearance
        counts: Vec<(Classification, usize)>,
        rows: usize,
    }

    let mut states: BTreeMap<&str, Tally> = BTreeMap::new();

    for item in classified {
        let tally = states
            .entry(item.record.state_abbrev.as_str())
            .or_insert(Tally {
                state_name: item.record.state_name.as_str(),
                counts: Vec::new(),
                rows: 0,
            });

        tally.rows += 1;
        match tally
            .counts
            .iter_mut()
            .find(|(label, _)| *label == item.classification)
        {
            Some((_, count)) => *count += 1,
            None => tally.counts.push((item.classification, 1)),
        }
    }

    states
        .into_iter()
        .filter_map(|(abbrev, tally)| {
            let mut best: Option<(Classification, usize)> = None;
            for &(label, count) in &tally.counts {
                if best.map_or(true, |(_, top)| count > top) {
                    best = Some((label, count));
                }
            }

            best.map(|(classification, _)| StateClassification {
                state_abbrev: abbrev.to_string(),
                state_name: tally.state_name.to_string(),
                classification,
                counties: tally.rows,
            })
        })
        .collect()
}

// ============================================================================
// DISTRIBUTION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationDistribution {
    pub total: usize,
    /// Count per known label, ascending label order
    pub counts: Vec<(Classification, usize)>,
}

impl ClassificationDistribution {
    pub fn from_classified(classified: &[ClassifiedRecord<'_>]) -> Self {
        let counts = Classification::RANKED
            .iter()
            .map(|label| {
                let n = classified
                    .iter()
                    .filter(|c| c.classification == *label)
                    .count();
                (*label, n)
            })
            .collect();

        ClassificationDistribution {
            total: classified.len(),
            counts,
        }
    }

    pub fn count(&self, label: Classification) -> usize {
        self.counts
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    /// Share of rows with this label, 0 when there are no rows
    pub fn percentage(&self, label: Classification) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.count(label) as f64 / self.total as f64 * 100.0
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WageSource;

    fn create_test_record(state: &str, levels: [Option<f64>; 4]) -> UnifiedRecord {
        UnifiedRecord {
            area_code: "1000".to_string(),
            county_name: "Test County".to_string(),
            state_abbrev: state.to_string(),
            state_name: format!("State of {}", state),
            area_name: "Test Area".to_string(),
            fips: "06075".to_string(),
            soc_code: "15-1254".to_string(),
            job_title: None,
            basis_label: String::new(),
            wage_level_1: levels[0],
            wage_level_2: levels[1],
            wage_level_3: levels[2],
            wage_level_4: levels[3],
            source: WageSource::Primary,
        }
    }

    const SF: [Option<f64>; 4] = [Some(40.0), Some(50.0), Some(60.0), Some(70.0)];

    #[test]
    fn test_classify_bands() {
        let record = create_test_record("CA", SF);

        assert_eq!(classify(&record, Some(20.0)), Classification::BelowLevel1);
        assert_eq!(classify(&record, Some(45.0)), Classification::Level1);
        assert_eq!(classify(&record, Some(55.0)), Classification::Level2);
        assert_eq!(classify(&record, Some(65.0)), Classification::Level3);
        assert_eq!(classify(&record, Some(90.0)), Classification::Level4Plus);
        assert_eq!(classify(&record, Some(55.0)).label(), "Level 2 (Qualified)");
    }

    #[test]
    fn test_boundaries_belong_to_higher_band() {
        let record = create_test_record("CA", SF);

        assert_eq!(classify(&record, Some(40.0)), Classification::Level1);
        assert_eq!(classify(&record, Some(50.0)), Classification::Level2);
        assert_eq!(classify(&record, Some(60.0)), Classification::Level3);
        assert_eq!(classify(&record, Some(70.0)), Classification::Level4Plus);
    }

    #[test]
    fn test_missing_or_non_positive_salary_is_unknown() {
        let record = create_test_record("CA", SF);

        assert_eq!(classify(&record, None), Classification::Unknown);
        assert_eq!(classify(&record, Some(0.0)), Classification::Unknown);
        assert_eq!(classify(&record, Some(-5.0)), Classification::Unknown);
        assert_eq!(classify(&record, Some(f64::NAN)), Classification::Unknown);
    }

    #[test]
    fn test_absent_thresholds_read_as_zero() {
        let record = create_test_record("CA", [None, Some(50.0), None, None]);

        // 0 ≤ 45 < 50
        assert_eq!(classify(&record, Some(45.0)), Classification::Level1);
        // 50 ≥ L2, L3 = 0, L4 = 0
        assert_eq!(classify(&record, Some(55.0)), Classification::Level4Plus);
    }

    #[test]
    fn test_classify_is_pure() {
        let record = create_test_record("CA", SF);
        let first = classify(&record, Some(55.0));
        for _ in 0..10 {
            assert_eq!(classify(&record, Some(55.0)), first);
        }
    }

    #[test]
    fn test_salary_input_conversion() {
        assert_eq!(SalaryInput::Annual(104000.0).hourly(), 50.0);
        assert_eq!(SalaryInput::Hourly(38.46).hourly(), 38.46);
    }

    #[test]
    fn test_classify_records_drops_unknown() {
        let records = vec![create_test_record("CA", SF), create_test_record("TX", SF)];

        assert!(classify_records(&records, None).is_empty());
        assert_eq!(classify_records(&records, Some(55.0)).len(), 2);
    }

    #[test]
    fn test_state_mode_with_first_seen_tie_break() {
        let records = vec![
            // CA: Level 3, Level 1, Level 1, Level 3 → tie, Level 3 seen first
            create_test_record("CA", [Some(10.0), Some(20.0), Some(30.0), Some(80.0)]),
            create_test_record("CA", [Some(40.0), Some(60.0), Some(70.0), Some(80.0)]),
            create_test_record("CA", [Some(40.0), Some(60.0), Some(70.0), Some(80.0)]),
            create_test_record("CA", [Some(10.0), Some(20.0), Some(30.0), Some(80.0)]),
            // TX: Level 2 twice, Below once
            create_test_record("TX", SF),
            create_test_record("TX", [Some(90.0), Some(95.0), Some(99.0), Some(120.0)]),
            create_test_record("TX", SF),
        ];

        let classified = classify_records(&records, Some(55.0));
        let states = classify_by_state(&classified);

        assert_eq!(states.len(), 2);
        assert_eq!(states[0].state_abbrev, "CA");
        assert_eq!(states[0].classification, Classification::Level3);
        assert_eq!(states[0].counties, 4);
        assert_eq!(states[1].state_abbrev, "TX");
        assert_eq!(states[1].classification, Classification::Level2);
    }

    #[test]
    fn test_distribution_percentages() {
        let records = vec![
            create_test_record("CA", SF),
            create_test_record("CA", SF),
            create_test_record("CA", [Some(10.0), Some(20.0), Some(30.0), Some(40.0)]),
            create_test_record("CA", [Some(60.0), Some(70.0), Some(80.0), Some(90.0)]),
        ];

        let classified = classify_records(&records, Some(55.0));
        let dist = ClassificationDistribution::from_classified(&classified);

        assert_eq!(dist.total, 4);
        assert_eq!(dist.count(Classification::Level2), 2);
        assert_eq!(dist.count(Classification::Level4Plus), 1);
        assert_eq!(dist.count(Classification::BelowLevel1), 1);
        assert_eq!(dist.percentage(Classification::Level2), 50.0);
        assert_eq!(dist.percentage(Classification::Level1), 0.0);
    }

    #[test]
    fn test_empty_distribution_has_zero_percentages() {
        let dist = ClassificationDistribution::from_classified(&[]);

        assert_eq!(dist.total, 0);
        for label in Classification::RANKED {
            assert_eq!(dist.percentage(label), 0.0);
        }
    }

    #[test]
    fn test_labels_serialize_as_text() {
        let json = serde_json::to_string(&Classification::Level4Plus).unwrap();
        assert_eq!(json, "\"Level 4+ (Fully Competent)\"");
    }
}
