//! `marketforge allocate`

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use marketforge::{run, run_job, JobOutput};

use super::JobArgs;
use crate::files::{read_snapshot, write_document};

#[derive(Debug, Args)]
pub struct AllocateCommand {
    #[command(flatten)]
    pub(super) job: JobArgs,

    /// Output file; stdout when omitted.
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Pretty-print the JSON document.
    #[arg(long)]
    pretty: bool,

    /// Write the full run report (analysis, validation, audit) instead of
    /// the output document.
    #[arg(long)]
    report: bool,
}

impl AllocateCommand {
    pub fn run(self) -> Result<()> {
        let snapshot = read_snapshot(&self.job.input)?;
        let config = self.job.engine_config()?;

        if self.report {
            let outcome = run(&snapshot, &config)?;
            write_document(&outcome, self.output.as_ref(), self.pretty)
        } else {
            let output: JobOutput = run_job(&snapshot, &config)?;
            write_document(&output, self.output.as_ref(), self.pretty)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketforge_test::{MarketBuilder, MerchantFixture};

    #[test]
    fn test_allocate_writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("market.json");
        let output = dir.path().join("out.json");
        let snapshot = MarketBuilder::new("centrum")
            .numbered_row(3)
            .merchant(MerchantFixture::vpl("holder", 1, &["2"]))
            .merchant(MerchantFixture::soll("picky", 2).prefer(&["2"]))
            .build();
        write_document(&snapshot, Some(&input), false).unwrap();

        let cmd = AllocateCommand {
            job: JobArgs {
                input,
                config: None,
                full_assert: true,
            },
            output: Some(output.clone()),
            pretty: false,
            report: false,
        };
        cmd.run().unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(output).unwrap()).unwrap();
        assert_eq!(json["allocations"][0]["merchantId"], "holder");
        assert_eq!(json["allocations"][0]["stands"][0], "2");
        assert_eq!(json["rejections"][0]["merchantId"], "picky");
        assert!(json.get("audit").is_none());
    }
}
