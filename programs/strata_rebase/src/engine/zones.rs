// programs/strata_rebase/src/engine/zones.rs

use anchor_lang::prelude::*;
use strata_core::math::{self, bps_to_wad};

use crate::state::{RebaseParams, Zone};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZoneDecision {
    pub zone: Zone,

    /// `value / new_supply` (wad)
    pub backing_ratio: u128,

    /// Senior value after transfers: the 110% cap on Excess, the restore
    /// target on Deficit, the current value when Healthy
    pub target_value: u128,
}

/// Classify Senior's post-mint backing ratio.
///
/// Excess above the excess threshold (exclusive), Deficit below par
/// (exclusive), Healthy in between with both bounds inclusive.
pub fn classify_zone(params: &RebaseParams, value: u128, new_supply: u128) -> Result<ZoneDecision> {
    let backing_ratio = math::ratio(value, new_supply)?;

    let decision = if backing_ratio > bps_to_wad(params.excess_threshold_bps) {
        ZoneDecision {
            zone: Zone::Excess,
            backing_ratio,
            target_value: math::apply_bps(new_supply, params.excess_threshold_bps)?,
        }
    } else if backing_ratio < bps_to_wad(RebaseParams::PAR_BPS) {
        ZoneDecision {
            zone: Zone::Deficit,
            backing_ratio,
            target_value: math::apply_bps(new_supply, params.restore_target_bps)?,
        }
    } else {
        ZoneDecision {
            zone: Zone::Healthy,
            backing_ratio,
            target_value: value,
        }
    };

    Ok(decision)
}
