use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::PathBuf;
use wage_atlas::{
    aggregate_by_state, check_county_detail, classification_view, classify_by_state,
    county_wages, format_annual, format_combined, format_hourly, format_optional_hourly,
    job_roles, load_unified, logging, preview, summarize_records, unique_areas, wage_view,
    Classification, ClassificationDistribution, Config, CountyWage, QueryOutcome, RecordFilter,
    SalaryInput, StateClassification, StateWage, UnifiedCache, UnifiedTable, WageLevel,
    WageSource, WageStats,
};

/// Explore H-1B prevailing wages by state and county
#[derive(Parser)]
#[command(name = "wage-atlas", version)]
#[command(about = "Reconcile OFLC wage exports and query them by state or county")]
struct Cli {
    /// Config file (TOML); missing file means defaults
    #[arg(long, global = true, default_value = wage_atlas::config::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the unified table and print the reconciliation report
    Summary,

    /// List job roles present in the unified table
    Roles,

    /// Wage amounts for one level
    Wages {
        /// Wage level: 1-4 or "Level N"
        #[arg(long, default_value = "2")]
        level: String,

        /// Job title filter ("All" for every role)
        #[arg(long)]
        role: Option<String>,

        #[arg(long, value_enum, default_value_t = Detail::State)]
        detail: Detail,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Where a salary falls against the four wage levels
    Classify {
        /// Annual salary in dollars
        #[arg(long, conflicts_with = "hourly")]
        annual: Option<f64>,

        /// Hourly wage in dollars
        #[arg(long)]
        hourly: Option<f64>,

        /// Job title filter ("All" for every role)
        #[arg(long)]
        role: Option<String>,

        #[arg(long, value_enum, default_value_t = Detail::State)]
        detail: Detail,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Detail {
    State,
    County,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_tracing(&cli.log_level);

    let config = Config::load(&cli.config)?;
    let cache = UnifiedCache::new();
    let table = load_unified(&cache, &config.sources)?;

    match cli.command {
        Command::Summary => run_summary(&table),
        Command::Roles => run_roles(&table),
        Command::Wages {
            level,
            role,
            detail,
            json,
        } => run_wages(&table, &config, &level, role.as_deref(), detail, json),
        Command::Classify {
            annual,
            hourly,
            role,
            detail,
            json,
        } => {
            let salary = match (annual, hourly) {
                (Some(amount), _) => SalaryInput::Annual(amount),
                (None, Some(amount)) => SalaryInput::Hourly(amount),
                (None, None) => SalaryInput::Annual(80_000.0),
            };
            run_classify(&table, &config, salary, role.as_deref(), detail, json)
        }
    }
}

fn run_summary(table: &UnifiedTable) -> Result<()> {
    let report = &table.report;

    println!("🗂️  Unified Wage Table");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Built:                {}", table.built_at.to_rfc3339());
    println!("Fingerprint:          {}", table.fingerprint.as_str());
    println!("Records:              {}", report.records);
    println!("  from secondary:     {}", report.records_from_secondary);
    println!("  without job title:  {}", report.missing_job_titles);
    println!(
        "Wage rows:            {} {}, {} {}",
        report.primary_rows,
        WageSource::Primary.name(),
        report.secondary_rows,
        WageSource::Secondary.name()
    );
    println!("  duplicates dropped: {}", report.duplicates_discarded);
    println!("  no geography match: {}", report.unmatched_wage_rows);
    println!("Geography rows:       {}", report.geography_rows);
    println!("  no FIPS match:      {}", report.unresolved_geography_rows);
    println!("Unique areas:         {}", unique_areas(&table.records));
    println!("Job roles:            {}", job_roles(&table.records).len());

    Ok(())
}

fn run_roles(table: &UnifiedTable) -> Result<()> {
    for role in job_roles(&table.records) {
        println!("{}", role);
    }
    Ok(())
}

fn no_data() -> Result<()> {
    println!("⚠️  No data available for the selected filters. Please try different options.");
    Ok(())
}

#[derive(Serialize)]
struct WagesOutput<'a> {
    level: WageLevel,
    role: Option<&'a str>,
    states: Option<Vec<StateWage>>,
    counties: Option<Vec<CountyWage>>,
    stats: WageStats,
    records: usize,
    unique_areas: usize,
}

fn run_wages(
    table: &UnifiedTable,
    config: &Config,
    level: &str,
    role: Option<&str>,
    detail: Detail,
    json: bool,
) -> Result<()> {
    let level: WageLevel = level.parse()?;
    let filter = RecordFilter::for_role(role);

    let rows = match wage_view(&table.records, &filter, level) {
        QueryOutcome::Data(rows) => rows,
        QueryOutcome::NoData => return no_data(),
    };

    if detail == Detail::County {
        if let Err(e) = check_county_detail(&filter, rows.len(), config.view.county_row_limit) {
            println!("⚠️  {}", e);
            return Ok(());
        }
    }

    let output = WagesOutput {
        level,
        role: filter.job_role.as_deref(),
        states: (detail == Detail::State).then(|| aggregate_by_state(rows.iter().copied(), level)),
        counties: (detail == Detail::County).then(|| county_wages(rows.iter().copied(), level)),
        stats: summarize_records(rows.iter().copied(), level),
        records: rows.len(),
        unique_areas: unique_areas(rows.iter().copied()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let role_label = output.role.unwrap_or("All");
    println!("📊 {} - {} ({}) Wages", role_label, level, level.tier());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if let Some(states) = &output.states {
        for state in states {
            println!(
                "{:<4} {:<28} {:>14} {:>12}",
                state.state_abbrev,
                state.state_name,
                format_hourly(state.avg_hourly),
                format_annual(state.avg_hourly)
            );
        }
    }

    if let Some(counties) = &output.counties {
        for county in preview(counties, config.view.preview_rows) {
            println!(
                "{} {:<28} {:<20} {:>14} {:>12}",
                county.fips,
                county.county_name,
                county.state_name,
                format_hourly(county.hourly),
                format_annual(county.hourly)
            );
        }
        if counties.len() > config.view.preview_rows {
            println!("… {} more rows", counties.len() - config.view.preview_rows);
        }
    }

    println!("\n📈 Wage Statistics");
    println!("Average: {}", format_combined(output.stats.avg));
    println!("Median:  {}", format_combined(output.stats.median));
    println!("Maximum: {}", format_combined(output.stats.max));
    println!("Minimum: {}", format_combined(output.stats.min));

    println!("\nData Points:  {} records", output.records);
    println!("Unique Areas: {}", output.unique_areas);

    Ok(())
}

#[derive(Serialize)]
struct CountyClassification<'a> {
    fips: &'a str,
    county_name: &'a str,
    state_name: &'a str,
    area_name: &'a str,
    job_title: Option<&'a str>,
    classification: Classification,
    wage_level_1: Option<f64>,
    wage_level_2: Option<f64>,
    wage_level_3: Option<f64>,
    wage_level_4: Option<f64>,
}

#[derive(Serialize)]
struct ClassifyOutput<'a> {
    salary_hourly: f64,
    role: Option<&'a str>,
    states: Option<Vec<StateClassification>>,
    counties: Option<Vec<CountyClassification<'a>>>,
    distribution: ClassificationDistribution,
    records: usize,
    unique_areas: usize,
}

fn run_classify(
    table: &UnifiedTable,
    config: &Config,
    salary: SalaryInput,
    role: Option<&str>,
    detail: Detail,
    json: bool,
) -> Result<()> {
    let salary_hourly = salary.hourly();
    if !salary_hourly.is_finite() {
        bail!("salary must be a finite number");
    }
    let filter = RecordFilter::for_role(role);

    let classified = match classification_view(&table.records, &filter, Some(salary_hourly)) {
        QueryOutcome::Data(rows) => rows,
        QueryOutcome::NoData => return no_data(),
    };

    if detail == Detail::County {
        if let Err(e) = check_county_detail(&filter, classified.len(), config.view.county_row_limit) {
            println!("⚠️  {}", e);
            return Ok(());
        }
    }

    let counties = (detail == Detail::County).then(|| {
        classified
            .iter()
            .map(|c| CountyClassification {
                fips: &c.record.fips,
                county_name: &c.record.county_name,
                state_name: &c.record.state_name,
                area_name: &c.record.area_name,
                job_title: c.record.job_title.as_deref(),
                classification: c.classification,
                wage_level_1: c.record.wage_level_1,
                wage_level_2: c.record.wage_level_2,
                wage_level_3: c.record.wage_level_3,
                wage_level_4: c.record.wage_level_4,
            })
            .collect::<Vec<_>>()
    });

    let output = ClassifyOutput {
        salary_hourly,
        role: filter.job_role.as_deref(),
        states: (detail == Detail::State).then(|| classify_by_state(&classified)),
        counties,
        distribution: ClassificationDistribution::from_classified(&classified),
        records: classified.len(),
        unique_areas: unique_areas(classified.iter().map(|c| c.record)),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let role_label = output.role.unwrap_or("All");
    println!(
        "🏷️  {} - Your Salary Classification ({})",
        role_label,
        format_combined(salary_hourly)
    );
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if let Some(states) = &output.states {
        for state in states {
            println!(
                "{:<4} {:<28} {}",
                state.state_abbrev, state.state_name, state.classification
            );
        }
    }

    if let Some(counties) = &output.counties {
        for county in preview(counties, config.view.preview_rows) {
            println!(
                "{} {:<28} {:<20} {:<28} L1 {} | L2 {} | L3 {} | L4 {}",
                county.fips,
                county.county_name,
                county.state_name,
                county.classification.label(),
                format_optional_hourly(county.wage_level_1),
                format_optional_hourly(county.wage_level_2),
                format_optional_hourly(county.wage_level_3),
                format_optional_hourly(county.wage_level_4)
            );
        }
        if counties.len() > config.view.preview_rows {
            println!("… {} more rows", counties.len() - config.view.preview_rows);
        }
    }

    println!("\n📈 Salary Classification Distribution");
    for label in Classification::RANKED {
        println!(
            "{:<28} {:>8} areas  {:>5.1}% of areas",
            label.label(),
            output.distribution.count(label),
            output.distribution.percentage(label)
        );
    }

    println!("\nData Points:  {} records", output.records);
    println!("Unique Areas: {}", output.unique_areas);

    Ok(())
}
