// programs/strata_core/src/lib.rs
//
// Strata Core - Shared Math and Tranche Types
// ===========================================
//
// This crate provides:
// - 18-decimal fixed-point arithmetic (mul_div, ratio, bps helpers)
// - Time scaling of annual/monthly rates by elapsed seconds
// - Tranche identity (Senior / Junior / Reserve) and PDA seed helpers
//
// Everything here is pure and deterministic. No floating point.

use anchor_lang::prelude::*;

declare_id!("StRaTaCoRe111111111111111111111111111111111");

// =============================================================================
// SUBMODULES
// =============================================================================

/// Fixed-point arithmetic on u128 wads
pub mod math;

/// Rate time-scaling helpers
pub mod time;

/// Tranche identity
pub mod tranche;

pub use math::{BPS_DENOMINATOR, WAD};
pub use time::{SECONDS_PER_EPOCH, SECONDS_PER_YEAR};
pub use tranche::TrancheKind;

// =============================================================================
// ERRORS
// =============================================================================

/// Arithmetic failures. Offset so the codes never collide with program errors.
#[error_code(offset = 9000)]
pub enum MathError {
    #[msg("Division by zero")]
    DivideByZero,

    #[msg("Arithmetic overflow")]
    ArithmeticOverflow,
}

// Keep `anchor idl build` happy when it walks every crate under `programs/`.
#[cfg(feature = "idl-build")]
#[program]
pub mod strata_core {}
