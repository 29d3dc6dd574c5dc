//! Batch-job contract: one snapshot in, one output document out.

use marketforge_config::{ConfigError, EngineConfig};
use marketforge_core::{AllocationRecord, Market, MarketError, MarketSnapshot, RejectionRecord};
use marketforge_solver::{AllocationError, AllocationOutcome, MarketAllocator};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

/// Everything that can stop a job.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("invalid market snapshot: {0}")]
    Market(#[from] MarketError),

    #[error("allocation aborted: {0}")]
    Allocation(#[from] AllocationError),

    #[error("invalid engine configuration: {0}")]
    Config(#[from] ConfigError),
}

/// The document a job hands back to the data provider.
///
/// Both lists are ordered by merchant id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobOutput {
    pub allocations: Vec<AllocationRecord>,
    pub rejections: Vec<RejectionRecord>,
}

impl From<AllocationOutcome> for JobOutput {
    fn from(outcome: AllocationOutcome) -> Self {
        Self {
            allocations: outcome.allocations,
            rejections: outcome.rejections,
        }
    }
}

/// Builds the market a job allocates, applying configuration overrides.
///
/// A `max_stands_per_merchant` in the configuration replaces the value
/// the snapshot carries.
pub fn prepare_market(
    snapshot: &MarketSnapshot,
    config: &EngineConfig,
) -> Result<Market, JobError> {
    match config.max_stands_per_merchant {
        Some(limit) => {
            let mut snapshot = snapshot.clone();
            snapshot.market.max_stands_per_merchant = Some(limit);
            Ok(Market::from_snapshot(&snapshot)?)
        }
        None => Ok(Market::from_snapshot(snapshot)?),
    }
}

/// Runs one allocation and returns the full run report.
pub fn run(snapshot: &MarketSnapshot, config: &EngineConfig) -> Result<AllocationOutcome, JobError> {
    let market = prepare_market(snapshot, config)?;
    info!(
        event = "job_start",
        market = %market.id,
        merchants = market.merchant_count(),
    );
    let outcome = MarketAllocator::new(config.clone()).allocate(&market)?;
    Ok(outcome)
}

/// Runs one allocation and returns the output document.
pub fn run_job(snapshot: &MarketSnapshot, config: &EngineConfig) -> Result<JobOutput, JobError> {
    run(snapshot, config).map(JobOutput::from)
}
