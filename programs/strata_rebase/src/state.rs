// programs/strata_rebase/src/state.rs

use anchor_lang::prelude::*;
use strata_core::math::{self, WAD};
use strata_core::time::SECONDS_PER_DAY;
pub use strata_core::TrancheKind;

use crate::errors::RebaseError;

/// Engine configuration
/// PDA seeds: ["rebase_config"]
#[account]
#[derive(InitSpace)]
pub struct RebaseConfig {
    /// Authority (DAO) for parameter updates
    pub authority: Pubkey,

    /// Keeper allowed to trigger rebases and push reported values
    pub keeper: Pubkey,

    /// Posts independently calculated tranche values for validation
    pub oracle_authority: Pubkey,

    /// Rebase economics
    pub params: RebaseParams,

    /// Reported-value validation settings
    pub validation: ValueValidation,

    /// Rebases and value updates are rejected while inactive
    pub is_active: bool,

    /// Bump seed
    pub bump: u8,

    /// Reserved
    #[max_len(32)]
    pub reserved: Vec<u8>,
}

impl RebaseConfig {
    pub const SEED_PREFIX: &'static [u8] = b"rebase_config";
}

/// Rebase economics. All rates in basis points.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, InitSpace)]
pub struct RebaseParams {
    /// Candidate annual APYs, highest first
    pub tier_apys_bps: [u16; 3],

    /// Annual management fee on reported value
    pub management_fee_bps: u16,

    /// Share of user yield minted to the fee recipient
    pub performance_fee_bps: u16,

    /// Backing ratio above which Senior spills over (11000 = 110%)
    pub excess_threshold_bps: u16,

    /// Backing ratio the backstop restores Senior to (10090 = 100.9%)
    pub restore_target_bps: u16,

    /// Junior's share of spillover; Reserve gets the rest
    pub junior_spillover_bps: u16,

    /// Minimum seconds between rebases
    pub min_rebase_interval: i64,
}

impl RebaseParams {
    pub const DEFAULT_TIER_APYS_BPS: [u16; 3] = [1300, 1200, 1100]; // 13% / 12% / 11%
    pub const DEFAULT_MANAGEMENT_FEE_BPS: u16 = 100; // 1% per year
    pub const DEFAULT_PERFORMANCE_FEE_BPS: u16 = 200; // 2% of yield
    pub const DEFAULT_EXCESS_THRESHOLD_BPS: u16 = 11000; // 110%
    pub const DEFAULT_RESTORE_TARGET_BPS: u16 = 10090; // 100.9%
    pub const DEFAULT_JUNIOR_SPILLOVER_BPS: u16 = 8000; // 80/20 Junior/Reserve
    pub const DEFAULT_MIN_REBASE_INTERVAL: i64 = SECONDS_PER_DAY as i64;

    /// Deficit trigger. Fixed at par; the APY waterfall checks against it too.
    pub const PAR_BPS: u16 = 10000;

    pub const MAX_MANAGEMENT_FEE_BPS: u16 = 500;
    pub const MAX_PERFORMANCE_FEE_BPS: u16 = 2000;

    pub fn reserve_spillover_bps(&self) -> u16 {
        Self::PAR_BPS.saturating_sub(self.junior_spillover_bps)
    }

    pub fn validate(&self) -> Result<()> {
        let tiers = &self.tier_apys_bps;
        require!(tiers.iter().all(|t| *t > 0), RebaseError::InvalidApyTiers);
        require!(
            tiers.windows(2).all(|pair| pair[0] > pair[1]),
            RebaseError::InvalidApyTiers
        );
        require!(
            self.management_fee_bps <= Self::MAX_MANAGEMENT_FEE_BPS,
            RebaseError::InvalidFeeRate
        );
        require!(
            self.performance_fee_bps <= Self::MAX_PERFORMANCE_FEE_BPS,
            RebaseError::InvalidFeeRate
        );
        require!(
            self.restore_target_bps > Self::PAR_BPS,
            RebaseError::InvalidZoneThresholds
        );
        require!(
            self.excess_threshold_bps > self.restore_target_bps,
            RebaseError::InvalidZoneThresholds
        );
        require!(
            self.junior_spillover_bps <= Self::PAR_BPS,
            RebaseError::InvalidSpilloverSplit
        );
        require!(self.min_rebase_interval >= 0, RebaseError::InvalidRebaseInterval);
        Ok(())
    }
}

impl Default for RebaseParams {
    fn default() -> Self {
        Self {
            tier_apys_bps: Self::DEFAULT_TIER_APYS_BPS,
            management_fee_bps: Self::DEFAULT_MANAGEMENT_FEE_BPS,
            performance_fee_bps: Self::DEFAULT_PERFORMANCE_FEE_BPS,
            excess_threshold_bps: Self::DEFAULT_EXCESS_THRESHOLD_BPS,
            restore_target_bps: Self::DEFAULT_RESTORE_TARGET_BPS,
            junior_spillover_bps: Self::DEFAULT_JUNIOR_SPILLOVER_BPS,
            min_rebase_interval: Self::DEFAULT_MIN_REBASE_INTERVAL,
        }
    }
}

/// Validation of externally supplied values against the value oracle
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, InitSpace)]
pub struct ValueValidation {
    pub enabled: bool,

    /// Allowed divergence from the calculated value
    pub max_deviation_bps: u16,

    /// Calculated values older than this are rejected (seconds)
    pub max_oracle_age: i64,
}

impl ValueValidation {
    pub const DEFAULT_MAX_DEVIATION_BPS: u16 = 100; // 1%
    pub const DEFAULT_MAX_ORACLE_AGE: i64 = 60 * 60; // 1 hour

    /// Reject `proposed` if it diverges from the oracle's calculated value
    /// by more than the tolerance. No-op when validation is disabled.
    pub fn check(&self, proposed: u128, oracle: &ValueOracle, now: i64) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        require!(oracle.posted_at > 0, RebaseError::OracleStale);
        require!(
            now.saturating_sub(oracle.posted_at) <= self.max_oracle_age,
            RebaseError::OracleStale
        );

        let calculated = oracle.calculated_value;
        if calculated == 0 {
            require!(proposed == 0, RebaseError::ValueDeviationTooLarge);
            return Ok(());
        }

        let diff = proposed.abs_diff(calculated);
        let deviation_bps = math::mul_div(diff, math::BPS_DENOMINATOR, calculated)?;
        require!(
            deviation_bps <= self.max_deviation_bps as u128,
            RebaseError::ValueDeviationTooLarge
        );
        Ok(())
    }
}

impl Default for ValueValidation {
    fn default() -> Self {
        Self {
            enabled: false,
            max_deviation_bps: Self::DEFAULT_MAX_DEVIATION_BPS,
            max_oracle_age: Self::DEFAULT_MAX_ORACLE_AGE,
        }
    }
}

/// Per-tranche accounting state
/// PDA seeds: ["tranche", kind.seed()]
#[account]
#[derive(InitSpace)]
pub struct TrancheState {
    pub kind: TrancheKind,

    /// Sum of all share balances (wad)
    pub total_shares: u128,

    /// Shares-to-balance multiplier (wad, Senior only; 1.0 elsewhere)
    pub rebase_index: u128,

    /// Market value of holdings in USD (wad)
    pub reported_value: u128,

    /// Last successful rebase
    pub last_rebase_time: i64,

    /// Incremented once per successful rebase
    pub epoch: u64,

    /// Junior/Reserve: value received from Senior spillover
    pub cumulative_spillover_received: u128,

    /// Junior/Reserve: value provided to Senior as backstop
    pub cumulative_backstop_provided: u128,

    /// Senior: value paid out as spillover
    pub cumulative_spillover_paid: u128,

    /// Senior: value received from backstop
    pub cumulative_backstop_received: u128,

    /// Zone Senior landed in at the last rebase
    pub last_zone: Zone,

    /// APY tier selected at the last rebase
    pub last_selected_apy_bps: u16,

    /// Last reported-value update
    pub last_value_update: i64,

    /// Bump seed
    pub bump: u8,
}

impl TrancheState {
    pub const SEED_PREFIX: &'static [u8] = b"tranche";

    /// Token supply implied by shares and index: `shares * index`
    pub fn total_supply(&self) -> Result<u128> {
        math::wad_mul(self.total_shares, self.rebase_index)
    }

    /// Reported value over supply (wad). Fails on zero supply.
    pub fn backing_ratio(&self) -> Result<u128> {
        math::ratio(self.reported_value, self.total_supply()?)
    }

    pub const MAX_PROFIT_BPS: i32 = 10_000; // +100% per update
    pub const MAX_LOSS_BPS: i32 = 5_000; // -50% per update

    /// Reported value after a signed profit/loss in bps, floored.
    pub fn value_after_profit(&self, profit_bps: i32) -> Result<u128> {
        require!(
            (-Self::MAX_LOSS_BPS..=Self::MAX_PROFIT_BPS).contains(&profit_bps),
            RebaseError::ProfitOutOfBounds
        );

        let delta = math::mul_div(
            self.reported_value,
            profit_bps.unsigned_abs() as u128,
            math::BPS_DENOMINATOR,
        )?;
        if profit_bps >= 0 {
            math::checked_add(self.reported_value, delta)
        } else {
            math::checked_sub(self.reported_value, delta)
        }
    }
}

/// Backing-ratio regime of the Senior tranche
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq, InitSpace)]
pub enum Zone {
    /// Ratio above the excess threshold: spill over to Junior/Reserve
    Excess,
    /// Par to excess threshold inclusive: no transfer
    Healthy,
    /// Below par: backstop from Reserve then Junior
    Deficit,
}

impl Default for Zone {
    fn default() -> Self {
        Zone::Healthy
    }
}

/// Fee share ledger for the protocol fee recipient
/// PDA seeds: ["fee_ledger"]
#[account]
#[derive(InitSpace)]
pub struct FeeLedger {
    pub recipient: Pubkey,

    /// Senior shares minted to the recipient (wad)
    pub fee_shares: u128,

    pub cumulative_management_fee_tokens: u128,

    pub cumulative_performance_fee_tokens: u128,

    pub last_minted_at: i64,

    pub bump: u8,
}

impl FeeLedger {
    pub const SEED_PREFIX: &'static [u8] = b"fee_ledger";
}

/// Independently calculated tranche value
/// PDA seeds: ["value_oracle", kind.seed()]
#[account]
#[derive(InitSpace)]
pub struct ValueOracle {
    pub kind: TrancheKind,

    /// Value computed from the underlying position (wad)
    pub calculated_value: u128,

    /// 0 until the first post
    pub posted_at: i64,

    pub bump: u8,
}

impl ValueOracle {
    pub const SEED_PREFIX: &'static [u8] = b"value_oracle";
}

// ==================== UNIT TESTS ====================
