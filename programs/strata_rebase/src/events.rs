// programs/strata_rebase/src/events.rs

use crate::state::{TrancheKind, Zone};
use anchor_lang::prelude::*;

/// Emitted when the engine and tranche accounts are created
#[event]
pub struct EngineInitialized {
    pub authority: Pubkey,
    pub keeper: Pubkey,
    pub fee_recipient: Pubkey,
    pub tier_apys_bps: [u16; 3],
    pub timestamp: i64,
}

/// Emitted when rebase parameters change
#[event]
pub struct RebaseParamsUpdated {
    pub old_tier_apys_bps: [u16; 3],
    pub new_tier_apys_bps: [u16; 3],
    pub management_fee_bps: u16,
    pub performance_fee_bps: u16,
    pub excess_threshold_bps: u16,
    pub restore_target_bps: u16,
    pub updater: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct ValidationModeUpdated {
    pub enabled: bool,
    pub max_deviation_bps: u16,
    pub max_oracle_age: i64,
    pub updater: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct EngineActiveToggled {
    pub is_active: bool,
    pub updater: Pubkey,
    pub timestamp: i64,
}

/// Emitted when a tranche's reported value is set or adjusted
#[event]
pub struct ReportedValueUpdated {
    pub kind: TrancheKind,
    pub old_value: u128,
    pub new_value: u128,
    /// Zero for absolute overwrites
    pub profit_bps: i32,
    pub timestamp: i64,
}

#[event]
pub struct CalculatedValuePosted {
    pub kind: TrancheKind,
    pub calculated_value: u128,
    pub poster: Pubkey,
    pub timestamp: i64,
}

/// Emitted once per successful rebase
#[event]
pub struct RebaseExecuted {
    pub epoch: u64,
    pub elapsed: u64,
    pub selected_apy_bps: u16,
    pub old_index: u128,
    pub new_index: u128,
    pub new_supply: u128,
    pub zone: Zone,
    pub senior_value: u128,
    pub timestamp: i64,
}

#[event]
pub struct FeesMinted {
    pub recipient: Pubkey,
    pub management_fee_tokens: u128,
    pub performance_fee_tokens: u128,
    pub fee_shares: u128,
    pub timestamp: i64,
}

#[event]
pub struct SpilloverExecuted {
    pub excess: u128,
    pub to_junior: u128,
    pub to_reserve: u128,
    pub timestamp: i64,
}

#[event]
pub struct BackstopExecuted {
    pub deficit: u128,
    pub from_reserve: u128,
    pub from_junior: u128,
    pub timestamp: i64,
}

/// Junior and Reserve together could not restore Senior to target
#[event]
pub struct BackstopInsufficient {
    pub deficit: u128,
    pub shortfall: u128,
    pub senior_value: u128,
    pub timestamp: i64,
}

#[event]
pub struct ZoneTransition {
    pub old_zone: Zone,
    pub new_zone: Zone,
    pub backing_ratio: u128,
    pub timestamp: i64,
}
