use marketforge_config::EngineConfig;
use marketforge_core::{Market, MerchantId, RejectionReason, StandId};
use marketforge_test::{MarketBuilder, MerchantFixture};

use super::*;

fn stands(ids: &[&str]) -> Vec<StandId> {
    ids.iter().map(|s| StandId::from(*s)).collect()
}

fn market() -> Market {
    MarketBuilder::new("m")
        .row(&["1", "2", "3"])
        .required_category("kaas", Some(2))
        .tag("kaas", &["1", "2", "3"])
        .merchant(MerchantFixture::soll("a", 1).category("kaas").maximum(2))
        .merchant(MerchantFixture::soll("b", 2))
        .market()
}

#[test]
fn test_allocate_moves_stands_out_of_pool() {
    let market = market();
    let config = EngineConfig::default();
    let mut scope = RunScope::new(&market, &config);
    let a = MerchantId::from("a");

    scope.allocate(&a, stands(&["2", "1"])).unwrap();

    assert!(!scope.is_queued(&a));
    assert_eq!(scope.allocation(&a), Some(&stands(&["1", "2"])[..]));
    assert_eq!(scope.pool().len(), 1);
    assert_eq!(scope.guard().count(&"kaas".into()), 2);
    assert_eq!(scope.audit().history_of(&a).count(), 1);
}

#[test]
fn test_allocate_is_atomic() {
    let market = market();
    let config = EngineConfig::default();
    let mut scope = RunScope::new(&market, &config);
    let a = MerchantId::from("a");
    let b = MerchantId::from("b");
    scope.allocate(&a, stands(&["1"])).unwrap();

    let err = scope.allocate(&b, stands(&["2", "1"])).unwrap_err();
    assert!(matches!(err, AllocationError::StandNotAvailable { ref stand, .. } if stand.as_str() == "1"));
    assert!(scope.is_queued(&b));
    assert!(scope.pool().contains(&StandId::from("2")));

    let err = scope.allocate(&a, stands(&["3"])).unwrap_err();
    assert!(matches!(err, AllocationError::MerchantNotQueued { .. }));
}

#[test]
fn test_expand_and_release() {
    let market = market();
    let config = EngineConfig::default();
    let mut scope = RunScope::new(&market, &config);
    let a = MerchantId::from("a");
    scope.allocate(&a, stands(&["2"])).unwrap();
    scope.expand(&a, stands(&["1"])).unwrap();
    assert_eq!(scope.allocation(&a), Some(&stands(&["1", "2"])[..]));

    let released = scope.release(&a).unwrap();
    assert_eq!(released, stands(&["1", "2"]));
    assert!(scope.is_queued(&a));
    assert_eq!(scope.pool().len(), 3);
    assert_eq!(scope.guard().count(&"kaas".into()), 0);
}

#[test]
fn test_expand_requires_allocation() {
    let market = market();
    let config = EngineConfig::default();
    let mut scope = RunScope::new(&market, &config);

    let err = scope.expand(&MerchantId::from("a"), stands(&["1"])).unwrap_err();
    assert!(matches!(err, AllocationError::MerchantNotQueued { .. }));
}

#[test]
fn test_first_failure_reason_wins() {
    let market = market();
    let config = EngineConfig::default();
    let mut scope = RunScope::new(&market, &config);
    let b = MerchantId::from("b");

    scope.note_failure(&b, RejectionReason::CategoryFull);
    scope.note_failure(&b, RejectionReason::MarketFull);
    assert_eq!(scope.pending_reason(&b), Some(RejectionReason::CategoryFull));

    scope.set_reason(&b, RejectionReason::MinimumUnavailable);
    assert_eq!(scope.pending_reason(&b), Some(RejectionReason::MinimumUnavailable));

    scope.reject(&b, RejectionReason::MinimumUnavailable).unwrap();
    assert_eq!(scope.rejection(&b), Some(RejectionReason::MinimumUnavailable));
    assert!(scope.reject(&b, RejectionReason::MarketFull).is_err());
}

#[test]
fn test_reservations_and_completeness() {
    let market = market();
    let config = EngineConfig::default();
    let mut scope = RunScope::new(&market, &config);
    let a = MerchantId::from("a");
    let b = MerchantId::from("b");

    assert_eq!(scope.reserve(&a, &stands(&["3", "3"])), 1);
    assert_eq!(scope.release_reservations(), 1);

    assert!(scope.check_complete().is_err());
    scope.allocate(&a, stands(&["1"])).unwrap();
    scope.reject(&b, RejectionReason::MarketFull).unwrap();
    scope.check_complete().unwrap();

    let outcome = scope.into_outcome();
    assert_eq!(outcome.allocations.len(), 1);
    assert_eq!(outcome.rejections[0].reason_code, 1);
    assert_eq!(outcome.stands_of(&a), &stands(&["1"])[..]);
}
