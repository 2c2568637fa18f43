// programs/strata_core/src/math.rs
//
// Deterministic 18-decimal fixed-point math on u128.
// Products are taken in 256 bits so `a * b / denom` never loses the high word;
// only the final quotient has to fit back into u128.

use anchor_lang::prelude::*;

use crate::MathError;

// Expanded outside the anchor prelude: the macro's generated code needs
// the two-parameter `core::result::Result`.
mod wide {
    uint::construct_uint! {
        /// 256-bit unsigned integer for intermediate products.
        pub struct U256(4);
    }
}

pub use wide::U256;

/// 1.0 in fixed-point (18 fractional digits)
pub const WAD: u128 = 1_000_000_000_000_000_000;

/// 100% in basis points
pub const BPS_DENOMINATOR: u128 = 10_000;

/// One basis point expressed as a wad (1e18 / 1e4)
const WAD_PER_BPS: u128 = WAD / BPS_DENOMINATOR;

/// `a * b / denom`, rounded down.
///
/// Fails with `DivideByZero` when `denom == 0` and with `ArithmeticOverflow`
/// when the quotient does not fit in u128.
pub fn mul_div(a: u128, b: u128, denom: u128) -> Result<u128> {
    if denom == 0 {
        return err!(MathError::DivideByZero);
    }

    let product = U256::from(a)
        .checked_mul(U256::from(b))
        .ok_or(MathError::ArithmeticOverflow)?;
    let quotient = product / U256::from(denom);

    narrow(quotient)
}

/// `a / b` as a wad. `ratio(3, 2) == 1.5e18`.
pub fn ratio(a: u128, b: u128) -> Result<u128> {
    mul_div(a, WAD, b)
}

/// Product of two wads.
pub fn wad_mul(a: u128, b: u128) -> Result<u128> {
    mul_div(a, b, WAD)
}

/// `amount * bps / 10_000`, rounded down.
pub fn apply_bps(amount: u128, bps: u16) -> Result<u128> {
    mul_div(amount, bps as u128, BPS_DENOMINATOR)
}

/// Basis points to wad (10_000 bps == 1e18)
pub const fn bps_to_wad(bps: u16) -> u128 {
    bps as u128 * WAD_PER_BPS
}

/// Whole units to wad
pub fn from_units(units: u64) -> u128 {
    units as u128 * WAD
}

/// Wad to whole units (truncated). Used for logs only.
pub fn to_units(value: u128) -> u128 {
    value / WAD
}

pub fn checked_add(a: u128, b: u128) -> Result<u128> {
    a.checked_add(b)
        .ok_or_else(|| error!(MathError::ArithmeticOverflow))
}

pub fn checked_sub(a: u128, b: u128) -> Result<u128> {
    a.checked_sub(b)
        .ok_or_else(|| error!(MathError::ArithmeticOverflow))
}

fn narrow(value: U256) -> Result<u128> {
    if value > U256::from(u128::MAX) {
        return err!(MathError::ArithmeticOverflow);
    }
    Ok(value.low_u128())
}
