// programs/strata_rebase/src/engine/spillover.rs

use anchor_lang::prelude::*;
use strata_core::math::{self, checked_add, checked_sub};

use super::TrancheBalances;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpilloverResult {
    pub excess: u128,
    pub to_junior: u128,
    pub to_reserve: u128,
}

/// Move Senior value above `target` to Junior and Reserve.
///
/// Reserve's cut is floored and Junior takes the remainder, so
/// `to_junior + to_reserve == excess` exactly.
pub fn execute_spillover(
    balances: &mut TrancheBalances,
    target: u128,
    reserve_share_bps: u16,
) -> Result<SpilloverResult> {
    let excess = balances.senior.saturating_sub(target);
    if excess == 0 {
        return Ok(SpilloverResult::default());
    }

    let to_reserve = math::apply_bps(excess, reserve_share_bps)?;
    let to_junior = checked_sub(excess, to_reserve)?;

    let senior = checked_sub(balances.senior, excess)?;
    let junior = checked_add(balances.junior, to_junior)?;
    let reserve = checked_add(balances.reserve, to_reserve)?;

    balances.senior = senior;
    balances.junior = junior;
    balances.reserve = reserve;

    Ok(SpilloverResult {
        excess,
        to_junior,
        to_reserve,
    })
}
