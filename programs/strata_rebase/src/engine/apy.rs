// programs/strata_rebase/src/engine/apy.rs

use anchor_lang::prelude::*;
use strata_core::math::{self, WAD};

use super::fees::{FeeBreakdown, FeeEngine};
use crate::errors::RebaseError;

/// Outcome of the APY waterfall
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ApySelection {
    pub selected_apy_bps: u16,

    /// Position of the selected tier, 0 = highest
    pub tier_index: u8,

    pub fees: FeeBreakdown,

    /// Senior supply after yield and fees are minted
    pub new_supply: u128,

    /// No tier kept Senior at par
    pub needs_backstop: bool,
}

/// Pick the highest tier that keeps `value / new_supply >= 1.0`.
///
/// Tiers are tried highest first and the first passing tier wins. If none
/// passes, the lowest tier is selected and flagged for backstop. The
/// management fee is part of `new_supply` for every tier.
pub fn select_apy(
    tiers_bps: &[u16],
    fees: &FeeEngine,
    value: u128,
    supply: u128,
) -> Result<ApySelection> {
    let Some(lowest) = tiers_bps.last() else {
        return err!(RebaseError::NoApyTiers);
    };
    require!(supply > 0, RebaseError::EmptySeniorSupply);

    for (index, tier) in tiers_bps.iter().enumerate() {
        let breakdown = fees.breakdown(value, supply, *tier)?;
        let new_supply = breakdown.new_supply(supply)?;

        if math::ratio(value, new_supply)? >= WAD {
            return Ok(ApySelection {
                selected_apy_bps: *tier,
                tier_index: index as u8,
                fees: breakdown,
                new_supply,
                needs_backstop: false,
            });
        }
    }

    let breakdown = fees.breakdown(value, supply, *lowest)?;
    Ok(ApySelection {
        selected_apy_bps: *lowest,
        tier_index: (tiers_bps.len() - 1) as u8,
        new_supply: breakdown.new_supply(supply)?,
        fees: breakdown,
        needs_backstop: true,
    })
}
