// programs/strata_core/src/time.rs
//
// Elapsed-time scaling. Management fee, tier yield and index growth are all
// derived from elapsed seconds through these helpers.

use anchor_lang::prelude::*;

use crate::math::{mul_div, BPS_DENOMINATOR, WAD};

pub const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// 365-day year used for annual rates
pub const SECONDS_PER_YEAR: u64 = 365 * SECONDS_PER_DAY;

/// Nominal 30-day epoch used for monthly rates
pub const SECONDS_PER_EPOCH: u64 = 30 * SECONDS_PER_DAY;

pub const MONTHS_PER_YEAR: u128 = 12;

/// Scale a per-period rate (wad) to `elapsed` seconds: `rate * elapsed / period`.
pub fn time_scaled_rate(rate_wad: u128, elapsed: u64, period: u64) -> Result<u128> {
    mul_div(rate_wad, elapsed as u128, period as u128)
}

/// Annual rate in bps to its monthly-equivalent wad (annual / 12).
pub fn monthly_rate_wad(annual_bps: u16) -> Result<u128> {
    mul_div(annual_bps as u128, WAD, BPS_DENOMINATOR * MONTHS_PER_YEAR)
}

/// Annual rate in bps to a wad rate scaled to `elapsed` seconds of a 365-day year.
pub fn annual_rate_for_elapsed(annual_bps: u16, elapsed: u64) -> Result<u128> {
    time_scaled_rate(crate::math::bps_to_wad(annual_bps), elapsed, SECONDS_PER_YEAR)
}

/// Monthly-equivalent rate of `annual_bps`, scaled to `elapsed` seconds of a 30-day epoch.
pub fn epoch_rate_for_elapsed(annual_bps: u16, elapsed: u64) -> Result<u128> {
    time_scaled_rate(monthly_rate_wad(annual_bps)?, elapsed, SECONDS_PER_EPOCH)
}
