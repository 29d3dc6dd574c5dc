//! Error display for the CLI.

use marketforge::{AllocationError, ConfigError, JobError, MarketError};
use owo_colors::OwoColorize;

/// Print an error in a user-friendly format.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {}", "Error:".red().bold(), err);

    for cause in err.chain().skip(1) {
        eprintln!("  {} {}", "caused by:".dimmed(), cause);
    }

    if let Some(hint) = err.downcast_ref::<JobError>().and_then(hint_for) {
        eprintln!("\n{}", format!("Hint: {hint}").yellow());
    }
}

fn hint_for(err: &JobError) -> Option<&'static str> {
    match err {
        JobError::Market(MarketError::SharedOwnership { .. }) => {
            Some("each stand may be owned by one merchant; fix the ownedStands lists.")
        }
        JobError::Market(MarketError::UnknownLayoutStand(_)) => {
            Some("every stand id in `rows` needs a matching record in `stands`.")
        }
        JobError::Market(_) => None,
        JobError::Allocation(AllocationError::NoConvergence { .. }) => {
            Some("raise `iteration_limit` in the engine configuration.")
        }
        JobError::Allocation(_) => Some(
            "the engine broke an internal invariant; rerun with --full-assert and RUST_LOG=marketforge_solver=debug.",
        ),
        JobError::Config(ConfigError::Io(_)) => Some("check the --config path."),
        JobError::Config(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketforge::{MerchantId, StandId};

    #[test]
    fn test_hint_for_shared_ownership() {
        let err = JobError::Market(MarketError::SharedOwnership {
            stand: StandId::from("1"),
            first: MerchantId::from("a"),
            second: MerchantId::from("b"),
        });
        assert!(hint_for(&err).is_some_and(|h| h.contains("ownedStands")));
    }

    #[test]
    fn test_no_hint_for_duplicate_merchant() {
        let err = JobError::Market(MarketError::DuplicateMerchant(MerchantId::from("a")));
        assert!(hint_for(&err).is_none());
    }
}
