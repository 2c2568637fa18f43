// programs/strata_rebase/src/engine/fees.rs

use anchor_lang::prelude::*;
use strata_core::math::{self, checked_add};
use strata_core::time::{annual_rate_for_elapsed, epoch_rate_for_elapsed};

/// Token amounts produced by one candidate APY tier
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FeeBreakdown {
    /// Minted to the fee recipient, never deducted from value
    pub management_fee_tokens: u128,

    /// Growth of existing Senior balances
    pub user_yield_tokens: u128,

    /// Share of user yield minted to the fee recipient
    pub performance_fee_tokens: u128,

    /// Tier's monthly rate scaled to elapsed time (wad). Drives the index.
    pub scaled_rate: u128,
}

impl FeeBreakdown {
    pub fn fee_tokens(&self) -> Result<u128> {
        checked_add(self.management_fee_tokens, self.performance_fee_tokens)
    }

    /// Supply after this tier's yield and both fees are minted
    pub fn new_supply(&self, supply: u128) -> Result<u128> {
        let minted = checked_add(self.user_yield_tokens, self.fee_tokens()?)?;
        checked_add(supply, minted)
    }
}

/// Fee calculator bound to one rebase period
#[derive(Clone, Copy, Debug)]
pub struct FeeEngine {
    pub management_fee_bps: u16,
    pub performance_fee_bps: u16,
    pub elapsed: u64,
}

impl FeeEngine {
    pub fn new(management_fee_bps: u16, performance_fee_bps: u16, elapsed: u64) -> Self {
        Self {
            management_fee_bps,
            performance_fee_bps,
            elapsed,
        }
    }

    /// `value * mgmt_rate * elapsed / year`
    pub fn management_fee(&self, value: u128) -> Result<u128> {
        let rate = annual_rate_for_elapsed(self.management_fee_bps, self.elapsed)?;
        math::wad_mul(value, rate)
    }

    /// `user_yield * perf_rate`
    pub fn performance_fee(&self, user_yield: u128) -> Result<u128> {
        math::apply_bps(user_yield, self.performance_fee_bps)
    }

    /// Full breakdown for paying `tier_apy_bps` on `supply`
    pub fn breakdown(&self, value: u128, supply: u128, tier_apy_bps: u16) -> Result<FeeBreakdown> {
        let scaled_rate = epoch_rate_for_elapsed(tier_apy_bps, self.elapsed)?;
        let user_yield_tokens = math::wad_mul(supply, scaled_rate)?;

        Ok(FeeBreakdown {
            management_fee_tokens: self.management_fee(value)?,
            user_yield_tokens,
            performance_fee_tokens: self.performance_fee(user_yield_tokens)?,
            scaled_rate,
        })
    }
}
