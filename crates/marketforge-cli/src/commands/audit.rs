//! `marketforge audit`

use anyhow::Result;
use clap::Args;
use marketforge::{run, AuditAction, AuditEntry, MerchantId, StandId};
use owo_colors::OwoColorize;

use super::JobArgs;
use crate::files::{read_snapshot, write_document};

#[derive(Debug, Args)]
pub struct AuditCommand {
    #[command(flatten)]
    pub(super) job: JobArgs,

    /// Only entries concerning this merchant.
    #[arg(long, conflicts_with = "stand")]
    merchant: Option<String>,

    /// Only entries touching this stand.
    #[arg(long)]
    stand: Option<String>,

    /// Print entries as JSON.
    #[arg(long)]
    json: bool,
}

impl AuditCommand {
    pub fn run(self) -> Result<()> {
        let snapshot = read_snapshot(&self.job.input)?;
        let config = self.job.engine_config()?;
        let outcome = run(&snapshot, &config)?;

        let merchant = self.merchant.map(MerchantId::from);
        let stand = self.stand.map(StandId::from);
        let entries: Vec<&AuditEntry> = match (&merchant, &stand) {
            (Some(m), _) => outcome.audit.history_of(m).collect(),
            (None, Some(s)) => outcome.audit.history_of_stand(s).collect(),
            (None, None) => outcome.audit.entries().iter().collect(),
        };

        if self.json {
            return write_document(&entries, None, true);
        }
        for entry in entries {
            println!("{}", format_entry(entry));
        }
        Ok(())
    }
}

fn format_entry(entry: &AuditEntry) -> String {
    let action = match entry.action {
        AuditAction::Allocated => "allocated".bright_green().to_string(),
        AuditAction::Expanded => "expanded".green().to_string(),
        AuditAction::Released => "released".yellow().to_string(),
        AuditAction::Reserved => "reserved".cyan().to_string(),
        AuditAction::Rejected(reason) => format!("rejected ({})", reason.message())
            .bright_red()
            .to_string(),
    };
    let stands: Vec<&str> = entry.stands.iter().map(StandId::as_str).collect();
    format!(
        "{:>5}  {:<28} {:<16} {} {}",
        entry.sequence.bright_black(),
        entry.phase.to_string(),
        entry.merchant.as_str().white().bold(),
        action,
        stands.join(",")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketforge::{PhaseId, RejectionReason};

    #[test]
    fn test_format_entry_lists_stands() {
        let entry = AuditEntry {
            sequence: 3,
            phase: PhaseId::NonMovingHolders,
            merchant: MerchantId::from("m1"),
            stands: vec![StandId::from("4"), StandId::from("5")],
            action: AuditAction::Allocated,
        };
        let line = format_entry(&entry);
        assert!(line.contains(&PhaseId::NonMovingHolders.to_string()));
        assert!(line.contains("4,5"));
        assert!(line.contains("m1"));
    }

    #[test]
    fn test_format_rejection_names_reason() {
        let entry = AuditEntry {
            sequence: 9,
            phase: PhaseId::FinalRejection,
            merchant: MerchantId::from("m2"),
            stands: Vec::new(),
            action: AuditAction::Rejected(RejectionReason::MarketFull),
        };
        assert!(format_entry(&entry).contains(RejectionReason::MarketFull.message()));
    }
}
