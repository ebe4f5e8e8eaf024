// 🔄 Pipeline - Source Readers → Normalizer → FIPS Resolver → Reconciler
//
// Pure batch transformation: same files in, same table out.

use crate::config::DataSources;
use crate::fips::FipsResolver;
use crate::model::WageSource;
use crate::normalizer::Normalizer;
use crate::reconciler::{Reconciler, Reconciliation};
use crate::sources::{
    read_counties, read_geography, read_occupations, read_wages, RawCountyRow, RawGeographyRow,
    RawOccupationRow, RawWageRow, SourceTable,
};
use anyhow::{Context, Result};
use tracing::{info, warn};

/// Raw rows of every input table
#[derive(Debug, Clone, Default)]
pub struct RawInputs {
    pub geography: Vec<RawGeographyRow>,
    pub occupations: Vec<RawOccupationRow>,
    pub wages_primary: Vec<RawWageRow>,
    pub wages_secondary: Vec<RawWageRow>,
    /// County reference override; None means the bundled table
    pub counties: Option<Vec<RawCountyRow>>,
}

impl RawInputs {
    pub fn read(sources: &DataSources) -> Result<Self> {
        Ok(RawInputs {
            geography: read_geography(&sources.geography)?,
            occupations: read_occupations(&sources.occupations)?,
            wages_primary: read_wages(&sources.wages_primary, SourceTable::WagesPrimary)?,
            wages_secondary: read_wages(&sources.wages_secondary, SourceTable::WagesSecondary)?,
            counties: sources
                .counties
                .as_deref()
                .map(read_counties)
                .transpose()?,
        })
    }
}

/// Normalize, resolve and reconcile already-read rows
pub fn reconcile_inputs(inputs: &RawInputs) -> Result<Reconciliation> {
    let normalizer = Normalizer::new();

    let resolver = match &inputs.counties {
        Some(rows) => FipsResolver::from_rows(rows)
            .context("Failed to build FIPS lookup from county reference")?,
        None => FipsResolver::bundled()?,
    };
    if resolver.is_empty() {
        warn!("county reference is empty, every geography row will be dropped");
    }
    info!(entries = resolver.len(), "FIPS lookup ready");

    let geography = inputs
        .geography
        .iter()
        .map(|raw| normalizer.normalize_geography(raw))
        .collect();
    let (geography, unresolved) = resolver.resolve_all(geography);

    let occupations: Vec<_> = inputs
        .occupations
        .iter()
        .map(|raw| normalizer.normalize_occupation(raw))
        .collect();

    let primary = normalizer.normalize_wages(&inputs.wages_primary, WageSource::Primary);
    let secondary = normalizer.normalize_wages(&inputs.wages_secondary, WageSource::Secondary);

    let mut reconciliation =
        Reconciler::new().reconcile(&geography, &occupations, primary, secondary);
    reconciliation.report.unresolved_geography_rows += unresolved;
    reconciliation.report.geography_rows = inputs.geography.len();

    Ok(reconciliation)
}

/// Read every source file and build the unified table
pub fn run(sources: &DataSources) -> Result<Reconciliation> {
    info!("building unified wage table");
    let inputs = RawInputs::read(sources)?;
    let reconciliation = reconcile_inputs(&inputs)?;
    info!("{}", reconciliation.report.summary());
    Ok(reconciliation)
}
