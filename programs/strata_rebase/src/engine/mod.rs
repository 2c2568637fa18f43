// programs/strata_rebase/src/engine/mod.rs
//
// Rebase Engine
// =============
// Pure decision-and-transfer logic, free of account plumbing:
// - fees:         time-scaled management, yield and performance amounts
// - apy:          waterfall selection of the Senior APY tier
// - zones:        Excess / Healthy / Deficit classification
// - spillover:    Senior excess to Junior and Reserve
// - backstop:     Reserve then Junior restore a Senior deficit
// - orchestrator: sequences the above into a plan and commits it

pub mod apy;
pub mod backstop;
pub mod fees;
pub mod orchestrator;
pub mod spillover;
pub mod zones;

pub use apy::{select_apy, ApySelection};
pub use backstop::{execute_backstop, BackstopResult};
pub use fees::{FeeBreakdown, FeeEngine};
pub use orchestrator::{plan_rebase, RebaseInputs, RebasePlan, RebaseSummary, RebaseTransaction, TransferAction};
pub use spillover::{execute_spillover, SpilloverResult};
pub use zones::{classify_zone, ZoneDecision};

use anchor_lang::prelude::*;
use strata_core::math;
use strata_core::TrancheKind;

/// Reported values of the three tranches, moved as one unit
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrancheBalances {
    pub senior: u128,
    pub junior: u128,
    pub reserve: u128,
}

impl TrancheBalances {
    pub fn value_of(&self, kind: TrancheKind) -> u128 {
        match kind {
            TrancheKind::Senior => self.senior,
            TrancheKind::Junior => self.junior,
            TrancheKind::Reserve => self.reserve,
        }
    }

    pub fn value_of_mut(&mut self, kind: TrancheKind) -> &mut u128 {
        match kind {
            TrancheKind::Senior => &mut self.senior,
            TrancheKind::Junior => &mut self.junior,
            TrancheKind::Reserve => &mut self.reserve,
        }
    }

    /// Sum across tranches; transfers must leave it unchanged
    pub fn total(&self) -> Result<u128> {
        math::checked_add(math::checked_add(self.senior, self.junior)?, self.reserve)
    }
}
