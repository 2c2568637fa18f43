// programs/strata_rebase/src/lib.rs
//
// Strata Rebase Program
// =====================
// Runs the monthly rebase across the three tranches:
// - Senior: rebasing token, paid the highest sustainable APY tier
// - Junior: receives 80% of Senior excess, backstops second
// - Reserve: receives 20% of Senior excess, backstops first
// Senior's backing ratio is held between 100% and 110% of supply.

use anchor_lang::prelude::*;

pub mod engine;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod state;

use instructions::*;
use engine::RebaseSummary;
use state::TrancheKind;

declare_id!("StRaTaReBase1111111111111111111111111111111");

#[program]
pub mod strata_rebase {
    use super::*;

    // ==================== INITIALIZATION ====================

    /// Create config, the three tranche accounts and the fee ledger
    pub fn initialize_engine(ctx: Context<InitializeEngine>, params: InitializeEngineParams) -> Result<()> {
        instructions::initialize::initialize_engine(ctx, params)
    }

    /// Create the value oracle for one tranche
    pub fn initialize_value_oracle(ctx: Context<InitializeValueOracle>, kind: TrancheKind) -> Result<()> {
        instructions::initialize::initialize_value_oracle(ctx, kind)
    }

    // ==================== REBASE ====================

    /// Run the full rebase pipeline for the elapsed period
    pub fn rebase(ctx: Context<ExecuteRebase>, expected_epoch: u64) -> Result<RebaseSummary> {
        instructions::rebase::execute_rebase(ctx, expected_epoch)
    }

    /// Preview the next rebase without writing state
    pub fn simulate_rebase(ctx: Context<SimulateRebase>) -> Result<RebaseSummary> {
        instructions::rebase::simulate_rebase(ctx)
    }

    // ==================== REPORTED VALUES ====================

    /// Apply a signed profit/loss (bps) to a tranche's reported value
    pub fn update_reported_value(
        ctx: Context<UpdateReportedValue>,
        kind: TrancheKind,
        profit_bps: i32,
    ) -> Result<()> {
        instructions::value::update_reported_value(ctx, kind, profit_bps)
    }

    /// Overwrite a tranche's reported value
    pub fn set_reported_value(ctx: Context<UpdateReportedValue>, kind: TrancheKind, value: u128) -> Result<()> {
        instructions::value::set_reported_value(ctx, kind, value)
    }

    /// Post an independently calculated value for validation
    pub fn post_calculated_value(ctx: Context<PostCalculatedValue>, kind: TrancheKind, value: u128) -> Result<()> {
        instructions::value::post_calculated_value(ctx, kind, value)
    }

    // ==================== ADMIN ====================

    /// Update rebase parameters (authority only)
    pub fn set_rebase_params(ctx: Context<UpdateRebaseConfig>, input: SetRebaseParamsInput) -> Result<()> {
        instructions::params::set_rebase_params(ctx, input)
    }

    /// Toggle reported-value validation
    pub fn set_validation_mode(
        ctx: Context<UpdateRebaseConfig>,
        enabled: bool,
        max_deviation_bps: u16,
        max_oracle_age: i64,
    ) -> Result<()> {
        instructions::params::set_validation_mode(ctx, enabled, max_deviation_bps, max_oracle_age)
    }

    /// Pause or resume rebases and value updates
    pub fn set_engine_active(ctx: Context<UpdateRebaseConfig>, active: bool) -> Result<()> {
        instructions::params::set_engine_active(ctx, active)
    }
}

/// Public helpers for CPI
pub mod tranche_helpers {
    use super::*;

    pub fn get_tranche_seeds(kind: TrancheKind) -> [&'static [u8]; 2] {
        [state::TrancheState::SEED_PREFIX, kind.seed()]
    }

    pub fn find_tranche_address(kind: TrancheKind) -> (Pubkey, u8) {
        Pubkey::find_program_address(&get_tranche_seeds(kind), &crate::ID)
    }
}
