//! `marketforge check`

use anyhow::Result;
use clap::Args;
use marketforge::prepare_market;
use owo_colors::OwoColorize;

use super::JobArgs;
use crate::files::read_snapshot;

#[derive(Debug, Args)]
pub struct CheckCommand {
    #[command(flatten)]
    pub(super) job: JobArgs,
}

impl CheckCommand {
    pub fn run(self) -> Result<()> {
        let snapshot = read_snapshot(&self.job.input)?;
        let config = self.job.engine_config()?;
        let market = prepare_market(&snapshot, &config)?;

        let holders = market.merchants().filter(|m| m.is_holder()).count();
        let active = market.stands().filter(|s| s.active).count();
        println!(
            "{} {} on {}: {} merchants ({} holders), {} of {} stands active",
            "✓".bright_green(),
            market.id.white().bold(),
            market.date,
            market.merchant_count(),
            holders,
            active,
            market.stands().count(),
        );
        Ok(())
    }
}
