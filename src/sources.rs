// 📂 Source Readers - flat CSV files into typed raw rows
//
// Column names are a boundary contract with the OFLC export:
//   Geography:   Area, CountyTownName, StateAb, State, AreaName
//   Occupations: soccode, Title
//   Wages:       Area, SocCode, Label, Level1, Level2, Level3, Level4
//   Counties:    statefp, countyfp, name
// Extra columns are ignored, missing ones are an error.

use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

// ============================================================================
// SOURCE TABLES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceTable {
    Geography,
    Occupations,
    WagesPrimary,
    WagesSecondary,
    Counties,
}

impl SourceTable {
    pub fn name(&self) -> &str {
        match self {
            SourceTable::Geography => "geography",
            SourceTable::Occupations => "occupations",
            SourceTable::WagesPrimary => "primary wages",
            SourceTable::WagesSecondary => "secondary wages",
            SourceTable::Counties => "county reference",
        }
    }

    /// Header names the file must carry
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            SourceTable::Geography => &["Area", "CountyTownName", "StateAb", "State", "AreaName"],
            SourceTable::Occupations => &["soccode", "Title"],
            SourceTable::WagesPrimary | SourceTable::WagesSecondary => &[
                "Area", "SocCode", "Label", "Level1", "Level2", "Level3", "Level4",
            ],
            SourceTable::Counties => &["statefp", "countyfp", "name"],
        }
    }
}

// ============================================================================
// RAW ROWS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawGeographyRow {
    #[serde(rename = "Area")]
    pub area: String,

    #[serde(rename = "CountyTownName")]
    pub county_town_name: String,

    #[serde(rename = "StateAb")]
    pub state_ab: String,

    #[serde(rename = "State")]
    pub state: String,

    #[serde(rename = "AreaName")]
    pub area_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawOccupationRow {
    #[serde(rename = "soccode")]
    pub soc_code: String,

    #[serde(rename = "Title")]
    pub title: String,
}

/// Wage cells stay text here; the normalizer coerces them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawWageRow {
    #[serde(rename = "Area")]
    pub area: String,

    #[serde(rename = "SocCode")]
    pub soc_code: String,

    #[serde(rename = "Label", default)]
    pub label: Option<String>,

    #[serde(rename = "Level1", default)]
    pub level1: Option<String>,

    #[serde(rename = "Level2", default)]
    pub level2: Option<String>,

    #[serde(rename = "Level3", default)]
    pub level3: Option<String>,

    #[serde(rename = "Level4", default)]
    pub level4: Option<String>,
}

/// County reference row (state FIPS, county FIPS, county name)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawCountyRow {
    pub statefp: String,
    pub countyfp: String,
    pub name: String,
}

// ============================================================================
// READERS
// ============================================================================

/// Deserialize every row of a table from any reader
pub fn read_table_from<T, R>(reader: R, table: SourceTable, origin: &str) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read {} headers in {}", table.name(), origin))?
        .clone();

    let missing: Vec<&str> = table
        .required_columns()
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|h| h == *column))
        .collect();
    if !missing.is_empty() {
        bail!(
            "{} table {} is missing columns: {}",
            table.name(),
            origin,
            missing.join(", ")
        );
    }

    let mut rows = Vec::new();
    for (line_num, result) in reader.deserialize().enumerate() {
        let row: T = result.with_context(|| {
            // +2 because: 1-indexed + header row
            format!("Failed to parse {} line {} in {}", table.name(), line_num + 2, origin)
        })?;
        rows.push(row);
    }

    Ok(rows)
}

/// Deserialize every row of a table file
pub fn read_table<T: DeserializeOwned>(path: &Path, table: SourceTable) -> Result<Vec<T>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", table.name(), path.display()))?;

    let rows: Vec<T> = read_table_from(file, table, &path.display().to_string())?;
    info!(table = table.name(), rows = rows.len(), path = %path.display(), "loaded source table");

    Ok(rows)
}

pub fn read_geography(path: &Path) -> Result<Vec<RawGeographyRow>> {
    read_table(path, SourceTable::Geography)
}

pub fn read_occupations(path: &Path) -> Result<Vec<RawOccupationRow>> {
    read_table(path, SourceTable::Occupations)
}

pub fn read_wages(path: &Path, table: SourceTable) -> Result<Vec<RawWageRow>> {
    read_table(path, table)
}

pub fn read_counties(path: &Path) -> Result<Vec<RawCountyRow>> {
    read_table(path, SourceTable::Counties)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_geography_rows() {
        let csv = "Area,CountyTownName,StateAb,State,AreaName\n\
                   1000,San Francisco County,CA,California,\"San Francisco, CA\"\n\
                   2000,Cook County,IL,Illinois,\"Chicago, IL\"\n";

        let rows: Vec<RawGeographyRow> =
            read_table_from(csv.as_bytes(), SourceTable::Geography, "inline").unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].area, "1000");
        assert_eq!(rows[0].area_name, "San Francisco, CA");
        assert_eq!(rows[1].state_ab, "IL");
    }

    #[test]
    fn test_wage_rows_keep_cells_as_text() {
        let csv = "Area,SocCode,GeoLvl,Label,Level1,Level2,Level3,Level4,Average\n\
                   1000,15-1254,1,Annual Wage,83200,104000,124800,145600,114400\n\
                   1000,11-1021,1,,45.5,,N/A,80,\n";

        let rows: Vec<RawWageRow> =
            read_table_from(csv.as_bytes(), SourceTable::WagesPrimary, "inline").unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].label.as_deref(), Some("Annual Wage"));
        assert_eq!(rows[0].level1.as_deref(), Some("83200"));
        assert_eq!(rows[1].label, None);
        assert_eq!(rows[1].level2, None);
        assert_eq!(rows[1].level3.as_deref(), Some("N/A"));
    }

    #[test]
    fn test_missing_columns_rejected() {
        let csv = "Area,SocCode,Level1\n1000,15-1254,40\n";

        let result: Result<Vec<RawWageRow>> =
            read_table_from(csv.as_bytes(), SourceTable::WagesSecondary, "inline");

        let message = result.unwrap_err().to_string();
        assert!(message.contains("missing columns"));
        assert!(message.contains("Label"));
        assert!(message.contains("Level4"));
    }

    #[test]
    fn test_read_missing_file_names_path() {
        let result = read_geography(Path::new("does/not/exist.csv"));
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("does/not/exist.csv"));
    }
}
