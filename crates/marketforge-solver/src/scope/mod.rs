//! Run-level scope.
//!
//! [`RunScope`] owns every piece of mutable state of one allocation run:
//! the stand pool, the merchant queue, the allocation table, the capacity
//! guard and the audit log. Phases and their helpers receive it by
//! mutable reference; nothing is shared between runs.

use std::collections::{BTreeMap, BTreeSet};

use marketforge_config::EngineConfig;
use marketforge_core::{
    AllocationRecord, Market, Merchant, MerchantId, RejectionReason, RejectionRecord, StandId,
};
use tracing::{debug, error, info};

use crate::audit::{AuditAction, AuditLog, PhaseId};
use crate::capacity::CapacityGuard;
use crate::cluster::ClusterFinder;
use crate::error::{AllocationError, Result};
use crate::layout::Layout;
use crate::legality::MarketPressure;
use crate::outcome::AllocationOutcome;
use crate::phase::analyze::MarketAnalysis;
use crate::pool::StandPool;
use crate::validation::ValidationReport;

/// State of one allocation run.
///
/// # Type Parameters
/// * `'m` - Lifetime of the market and configuration
pub struct RunScope<'m> {
    market: &'m Market,
    config: &'m EngineConfig,
    layout: Layout,
    pool: StandPool,
    queue: BTreeSet<MerchantId>,
    allocations: BTreeMap<MerchantId, Vec<StandId>>,
    rejections: BTreeMap<MerchantId, RejectionReason>,
    /// First reason recorded for merchants that could not be placed yet.
    pending_reasons: BTreeMap<MerchantId, RejectionReason>,
    guard: CapacityGuard,
    audit: AuditLog,
    phase: PhaseId,
    analysis: MarketAnalysis,
    validation: ValidationReport,
}

impl<'m> RunScope<'m> {
    /// Opens a run with every active stand free and every merchant queued.
    pub fn new(market: &'m Market, config: &'m EngineConfig) -> Self {
        let layout = Layout::new(&market.rows, &market.obstacles);
        let pool = StandPool::new(market.stands().filter(|s| s.active).map(|s| s.id.clone()));
        let queue = market.merchants().map(|m| m.id.clone()).collect();
        let guard = CapacityGuard::new(market.categories(), config.default_category_maximum);
        Self {
            market,
            config,
            layout,
            pool,
            queue,
            allocations: BTreeMap::new(),
            rejections: BTreeMap::new(),
            pending_reasons: BTreeMap::new(),
            guard,
            audit: AuditLog::new(),
            phase: PhaseId::AnalyzeMarket,
            analysis: MarketAnalysis::default(),
            validation: ValidationReport::default(),
        }
    }

    pub fn market(&self) -> &'m Market {
        self.market
    }

    pub fn config(&self) -> &'m EngineConfig {
        self.config
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn pool(&self) -> &StandPool {
        &self.pool
    }

    pub fn guard(&self) -> &CapacityGuard {
        &self.guard
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    pub fn phase(&self) -> PhaseId {
        self.phase
    }

    pub fn set_phase(&mut self, phase: PhaseId) {
        self.phase = phase;
    }

    pub fn analysis(&self) -> &MarketAnalysis {
        &self.analysis
    }

    pub fn set_analysis(&mut self, analysis: MarketAnalysis) {
        self.analysis = analysis;
    }

    pub fn validation_mut(&mut self) -> &mut ValidationReport {
        &mut self.validation
    }

    /// Looks up a merchant of this market.
    pub fn merchant(&self, id: &MerchantId) -> Result<&'m Merchant> {
        self.market
            .merchant(id)
            .ok_or_else(|| AllocationError::UnknownMerchant {
                merchant: id.clone(),
                phase: self.phase,
            })
    }

    pub fn is_queued(&self, id: &MerchantId) -> bool {
        self.queue.contains(id)
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Queued merchants matching `filter`, in priority order.
    pub fn queued_by(&self, filter: impl Fn(&Merchant) -> bool) -> Vec<&'m Merchant> {
        let market = self.market;
        let mut merchants: Vec<&'m Merchant> = self
            .queue
            .iter()
            .filter_map(|id| market.merchant(id))
            .filter(|m| filter(*m))
            .collect();
        merchants.sort_by(|a, b| a.priority_key().cmp(&b.priority_key()));
        merchants
    }

    /// Allocated merchants matching `filter`, in priority order.
    pub fn allocated_by(&self, filter: impl Fn(&Merchant) -> bool) -> Vec<&'m Merchant> {
        let market = self.market;
        let mut merchants: Vec<&'m Merchant> = self
            .allocations
            .keys()
            .filter_map(|id| market.merchant(id))
            .filter(|m| filter(*m))
            .collect();
        merchants.sort_by(|a, b| a.priority_key().cmp(&b.priority_key()));
        merchants
    }

    pub fn allocation(&self, id: &MerchantId) -> Option<&[StandId]> {
        self.allocations.get(id).map(Vec::as_slice)
    }

    pub fn allocations(&self) -> impl Iterator<Item = (&MerchantId, &[StandId])> {
        self.allocations.iter().map(|(id, s)| (id, s.as_slice()))
    }

    pub fn allocated_count(&self) -> usize {
        self.allocations.len()
    }

    pub fn rejection(&self, id: &MerchantId) -> Option<RejectionReason> {
        self.rejections.get(id).copied()
    }

    /// A cluster finder over the current pool.
    ///
    /// Market pressure is measured against the merchants queued right now.
    pub fn finder(&self) -> ClusterFinder<'_> {
        let queued = self.queue.iter().filter_map(|id| self.market.merchant(id));
        let pressure = MarketPressure::measure(self.market, &self.pool, queued);
        ClusterFinder::new(&self.layout, self.market, &self.pool, pressure)
    }

    /// A cluster finder for one merchant: stands reserved for it count as
    /// free supply when measuring market pressure.
    pub fn finder_for(&self, id: &MerchantId) -> ClusterFinder<'_> {
        let queued = self.queue.iter().filter_map(|q| self.market.merchant(q));
        let pressure = MarketPressure::measure_for(self.market, &self.pool, id, queued);
        ClusterFinder::new(&self.layout, self.market, &self.pool, pressure)
    }

    /// Commits a new allocation.
    ///
    /// Either every stand moves from the pool to the merchant or, if the
    /// merchant is not queued or a stand is not free, nothing changes and
    /// the invariant violation is returned.
    pub fn allocate(&mut self, id: &MerchantId, stands: Vec<StandId>) -> Result<()> {
        let merchant = self.merchant(id)?;
        if !self.queue.contains(id) {
            return Err(self.fail(AllocationError::MerchantNotQueued {
                merchant: id.clone(),
                phase: self.phase,
            }));
        }
        self.check_free(id, &stands)?;

        for stand in &stands {
            self.pool.take(stand);
        }
        let stands = self.layout.ordered(&stands);
        self.queue.remove(id);
        self.pending_reasons.remove(id);
        self.guard.add_allocation(&merchant.categories, stands.len());
        self.audit
            .record(self.phase, id, &stands, AuditAction::Allocated);
        debug!(
            event = "allocation",
            phase = %self.phase,
            merchant = %id,
            stands = ?stands,
        );
        self.allocations.insert(id.clone(), stands);
        Ok(())
    }

    /// Adds stands to an existing allocation.
    pub fn expand(&mut self, id: &MerchantId, stands: Vec<StandId>) -> Result<()> {
        let merchant = self.merchant(id)?;
        if !self.allocations.contains_key(id) {
            return Err(self.fail(AllocationError::MerchantNotQueued {
                merchant: id.clone(),
                phase: self.phase,
            }));
        }
        self.check_free(id, &stands)?;

        for stand in &stands {
            self.pool.take(stand);
        }
        self.guard.add_allocation(&merchant.categories, stands.len());
        self.audit.record(self.phase, id, &stands, AuditAction::Expanded);
        debug!(
            event = "expansion",
            phase = %self.phase,
            merchant = %id,
            stands = ?stands,
        );
        if let Some(current) = self.allocations.get_mut(id) {
            current.extend(stands);
            *current = self.layout.ordered(current);
        }
        Ok(())
    }

    /// Reverts an allocation: stands go back to the pool and the merchant
    /// back to the queue.
    pub fn release(&mut self, id: &MerchantId) -> Result<Vec<StandId>> {
        let merchant = self.merchant(id)?;
        let Some(stands) = self.allocations.remove(id) else {
            return Err(self.fail(AllocationError::MerchantNotQueued {
                merchant: id.clone(),
                phase: self.phase,
            }));
        };
        for stand in &stands {
            self.pool.release(stand.clone());
        }
        self.guard
            .remove_allocation(&merchant.categories, stands.len());
        self.queue.insert(id.clone());
        self.audit.record(self.phase, id, &stands, AuditAction::Released);
        info!(
            event = "reclaim",
            phase = %self.phase,
            merchant = %id,
            stands = ?stands,
        );
        Ok(stands)
    }

    /// Rejects a queued merchant.
    pub fn reject(&mut self, id: &MerchantId, reason: RejectionReason) -> Result<()> {
        if !self.queue.remove(id) {
            return Err(self.fail(AllocationError::MerchantNotQueued {
                merchant: id.clone(),
                phase: self.phase,
            }));
        }
        self.pending_reasons.remove(id);
        self.rejections.insert(id.clone(), reason);
        self.audit
            .record(self.phase, id, &[], AuditAction::Rejected(reason));
        debug!(
            event = "rejection",
            phase = %self.phase,
            merchant = %id,
            reason = ?reason,
        );
        Ok(())
    }

    /// Remembers why a merchant could not be placed. The first reason wins.
    pub fn note_failure(&mut self, id: &MerchantId, reason: RejectionReason) {
        self.pending_reasons.entry(id.clone()).or_insert(reason);
    }

    /// Overrides any earlier reason.
    pub fn set_reason(&mut self, id: &MerchantId, reason: RejectionReason) {
        self.pending_reasons.insert(id.clone(), reason);
    }

    pub fn pending_reason(&self, id: &MerchantId) -> Option<RejectionReason> {
        self.pending_reasons.get(id).copied()
    }

    /// Reserves free stands for a merchant's later expansion.
    ///
    /// Returns how many of the stands were reserved.
    pub fn reserve(&mut self, id: &MerchantId, stands: &[StandId]) -> usize {
        let reserved: Vec<StandId> = stands
            .iter()
            .filter(|stand| self.pool.reserve(stand, id))
            .cloned()
            .collect();
        if !reserved.is_empty() {
            self.audit
                .record(self.phase, id, &reserved, AuditAction::Reserved);
        }
        reserved.len()
    }

    /// Returns reserved stands to general use.
    pub fn release_reservations(&mut self) -> usize {
        self.pool.clear_reservations()
    }

    /// Verifies that no stand is held twice and no merchant has two
    /// dispositions.
    pub fn check_invariants(&self) -> Result<()> {
        let mut holders: BTreeMap<&StandId, Vec<MerchantId>> = BTreeMap::new();
        for (merchant, stands) in &self.allocations {
            for stand in stands {
                holders.entry(stand).or_default().push(merchant.clone());
            }
        }
        if let Some((stand, merchants)) = holders.into_iter().find(|(_, m)| m.len() > 1) {
            return Err(self.fail(AllocationError::DoubleAllocation {
                stand: stand.clone(),
                merchants,
            }));
        }
        let leaked = self
            .allocations
            .iter()
            .flat_map(|(merchant, stands)| stands.iter().map(move |stand| (merchant, stand)))
            .find(|(_, stand)| self.pool.contains(stand));
        if let Some((merchant, stand)) = leaked {
            return Err(self.fail(AllocationError::StandNotAvailable {
                merchant: merchant.clone(),
                stand: stand.clone(),
                phase: self.phase,
            }));
        }

        for id in self.queue.iter().chain(self.rejections.keys()) {
            let dispositions = usize::from(self.queue.contains(id))
                + usize::from(self.allocations.contains_key(id))
                + usize::from(self.rejections.contains_key(id));
            if dispositions != 1 {
                return Err(self.fail(AllocationError::DoubleDisposition {
                    merchant: id.clone(),
                }));
            }
        }
        Ok(())
    }

    /// Verifies that every merchant ended in exactly one of the outcomes.
    pub fn check_complete(&self) -> Result<()> {
        self.check_invariants()?;
        if let Some(id) = self.market.merchants().map(|m| &m.id).find(|id| {
            self.queue.contains(*id)
                || self.allocations.contains_key(*id) == self.rejections.contains_key(*id)
        }) {
            return Err(self.fail(AllocationError::DoubleDisposition {
                merchant: id.clone(),
            }));
        }
        Ok(())
    }

    /// Consumes the run and builds the output.
    pub fn into_outcome(self) -> AllocationOutcome {
        let market = self.market;
        let allocations = self
            .allocations
            .into_iter()
            .filter_map(|(id, stands)| {
                market.merchant(&id).map(|merchant| AllocationRecord {
                    merchant_id: id.clone(),
                    market_id: market.id.clone(),
                    market_date: market.date,
                    stands,
                    merchant: merchant.clone(),
                })
            })
            .collect();
        let rejections = self
            .rejections
            .into_iter()
            .filter_map(|(id, reason)| {
                market
                    .merchant(&id)
                    .map(|merchant| RejectionRecord::new(merchant, &market.id, market.date, reason))
            })
            .collect();
        AllocationOutcome {
            market_id: market.id.clone(),
            market_date: market.date,
            allocations,
            rejections,
            analysis: self.analysis,
            validation: self.validation,
            audit: self.audit,
        }
    }

    fn check_free(&self, id: &MerchantId, stands: &[StandId]) -> Result<()> {
        let mut seen = BTreeSet::new();
        for stand in stands {
            if !self.pool.contains(stand) || !seen.insert(stand) {
                return Err(self.fail(AllocationError::StandNotAvailable {
                    merchant: id.clone(),
                    stand: stand.clone(),
                    phase: self.phase,
                }));
            }
        }
        Ok(())
    }

    fn fail(&self, err: AllocationError) -> AllocationError {
        error!(event = "invariant_violation", phase = %self.phase, error = %err);
        err
    }
}

impl std::fmt::Debug for RunScope<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunScope")
            .field("market", &self.market.id)
            .field("phase", &self.phase)
            .field("queued", &self.queue.len())
            .field("available", &self.pool.len())
            .field("allocated", &self.allocations.len())
            .field("rejected", &self.rejections.len())
            .finish()
    }
}

#[cfg(test)]
mod tests;
