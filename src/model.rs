// 📐 Data model - typed rows flowing through the pipeline
//
// Geography ⋈ Wage (inner, on area_code) ⋈ Occupation (left, on soc_code)
// produces one UnifiedRecord per (county row, wage row) pair.

use crate::error::{WageError, WageResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 40 hours/week × 52 weeks
pub const HOURS_PER_YEAR: f64 = 2080.0;

// ============================================================================
// WAGE LEVEL
// ============================================================================

/// One of the four prevailing-wage tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WageLevel {
    Level1,
    Level2,
    Level3,
    Level4,
}

impl WageLevel {
    pub const ALL: [WageLevel; 4] = [
        WageLevel::Level1,
        WageLevel::Level2,
        WageLevel::Level3,
        WageLevel::Level4,
    ];

    pub fn number(&self) -> u8 {
        match self {
            WageLevel::Level1 => 1,
            WageLevel::Level2 => 2,
            WageLevel::Level3 => 3,
            WageLevel::Level4 => 4,
        }
    }

    /// Column name in the unified table
    pub fn column(&self) -> &'static str {
        match self {
            WageLevel::Level1 => "wage_level_1",
            WageLevel::Level2 => "wage_level_2",
            WageLevel::Level3 => "wage_level_3",
            WageLevel::Level4 => "wage_level_4",
        }
    }

    /// Experience tier the level stands for
    pub fn tier(&self) -> &'static str {
        match self {
            WageLevel::Level1 => "Entry",
            WageLevel::Level2 => "Qualified",
            WageLevel::Level3 => "Experienced",
            WageLevel::Level4 => "Fully Competent",
        }
    }
}

impl fmt::Display for WageLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Level {}", self.number())
    }
}

impl FromStr for WageLevel {
    type Err = WageError;

    /// Accepts "2", "Level 2", "level2" or "wage_level_2"
    fn from_str(s: &str) -> WageResult<Self> {
        let lower = s.trim().to_lowercase();
        let digits = lower
            .trim_start_matches("wage_level_")
            .trim_start_matches("level")
            .trim();

        match digits {
            "1" => Ok(WageLevel::Level1),
            "2" => Ok(WageLevel::Level2),
            "3" => Ok(WageLevel::Level3),
            "4" => Ok(WageLevel::Level4),
            _ => Err(WageError::UnknownWageLevel {
                input: s.to_string(),
            }),
        }
    }
}

// ============================================================================
// WAGE SOURCE
// ============================================================================

/// Which wage-survey export a row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WageSource {
    /// ALC export, wins on duplicate keys
    Primary,
    /// EDC export, fills keys the primary lacks
    Secondary,
}

impl WageSource {
    pub fn name(&self) -> &str {
        match self {
            WageSource::Primary => "Primary (ALC)",
            WageSource::Secondary => "Secondary (EDC)",
        }
    }

    pub fn code(&self) -> &str {
        match self {
            WageSource::Primary => "ALC",
            WageSource::Secondary => "EDC",
        }
    }

    /// Lower rank wins when the same key appears in several sources
    pub fn precedence(&self) -> u8 {
        match self {
            WageSource::Primary => 0,
            WageSource::Secondary => 1,
        }
    }
}

// ============================================================================
// RECORDS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeographyRecord {
    pub area_code: String,
    pub county_name: String,
    pub state_abbrev: String,
    pub state_name: String,
    pub area_name: String,
    /// Always 5 digits once resolved; unresolved rows never reach the join
    pub fips: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupationRecord {
    pub soc_code: String,
    pub job_title: String,
}

/// Wage row after normalization: every level is hourly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WageRecord {
    pub area_code: String,
    pub soc_code: String,
    pub basis_label: String,
    pub level_1: Option<f64>,
    pub level_2: Option<f64>,
    pub level_3: Option<f64>,
    pub level_4: Option<f64>,
    pub source: WageSource,
}

impl WageRecord {
    /// Join key used for deduplication
    pub fn key(&self) -> (&str, &str) {
        (&self.area_code, &self.soc_code)
    }
}

/// One county × occupation row of the unified dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnifiedRecord {
    pub area_code: String,
    pub county_name: String,
    pub state_abbrev: String,
    pub state_name: String,
    pub area_name: String,
    pub fips: String,
    pub soc_code: String,
    pub job_title: Option<String>,
    pub basis_label: String,
    pub wage_level_1: Option<f64>,
    pub wage_level_2: Option<f64>,
    pub wage_level_3: Option<f64>,
    pub wage_level_4: Option<f64>,
    pub source: WageSource,
}

impl UnifiedRecord {
    pub fn wage(&self, level: WageLevel) -> Option<f64> {
        match level {
            WageLevel::Level1 => self.wage_level_1,
            WageLevel::Level2 => self.wage_level_2,
            WageLevel::Level3 => self.wage_level_3,
            WageLevel::Level4 => self.wage_level_4,
        }
    }

    /// Four ascending thresholds, absent ones read as 0
    pub fn thresholds(&self) -> [f64; 4] {
        WageLevel::ALL.map(|level| self.wage(level).unwrap_or(0.0))
    }
}
