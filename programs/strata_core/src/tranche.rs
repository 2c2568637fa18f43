// programs/strata_core/src/tranche.rs

use anchor_lang::prelude::*;

/// The three risk layers sharing one underlying position
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, InitSpace)]
pub enum TrancheKind {
    /// Rebasing, yield-receiving layer
    Senior,
    /// First-loss capital; receives 80% of spillover, backstops second
    Junior,
    /// Protocol reserve; receives 20% of spillover, backstops first
    Reserve,
}

impl TrancheKind {
    /// PDA seed component for accounts keyed by tranche
    pub const fn seed(&self) -> &'static [u8] {
        match self {
            TrancheKind::Senior => b"senior",
            TrancheKind::Junior => b"junior",
            TrancheKind::Reserve => b"reserve",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TrancheKind::Senior => "Senior",
            TrancheKind::Junior => "Junior",
            TrancheKind::Reserve => "Reserve",
        }
    }
}

impl Default for TrancheKind {
    fn default() -> Self {
        TrancheKind::Senior
    }
}
