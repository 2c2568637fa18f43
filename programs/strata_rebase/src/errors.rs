// programs/strata_rebase/src/errors.rs

use anchor_lang::prelude::*;

#[error_code]
pub enum RebaseError {
    #[msg("Unauthorized: caller lacks permission")]
    Unauthorized,

    #[msg("Rebase engine is paused")]
    EngineInactive,

    #[msg("Minimum rebase interval has not elapsed")]
    RebaseTooSoon,

    #[msg("Expected epoch does not match Senior epoch")]
    StaleEpoch,

    #[msg("Tranche epochs are out of sync")]
    EpochMismatch,

    #[msg("Account does not belong to the expected tranche")]
    TrancheMismatch,

    #[msg("Operation only valid for the Senior tranche")]
    NotSenior,

    #[msg("Senior tranche has zero supply")]
    EmptySeniorSupply,

    #[msg("Invalid APY tiers (must be non-zero and strictly descending)")]
    InvalidApyTiers,

    #[msg("No APY tiers configured")]
    NoApyTiers,

    #[msg("Invalid fee rate")]
    InvalidFeeRate,

    #[msg("Invalid zone thresholds (need 100% < restore target < excess threshold)")]
    InvalidZoneThresholds,

    #[msg("Invalid spillover split (must be <= 10000 bps)")]
    InvalidSpilloverSplit,

    #[msg("Invalid rebase interval")]
    InvalidRebaseInterval,

    #[msg("Profit/loss adjustment out of bounds")]
    ProfitOutOfBounds,

    #[msg("Reported value deviates too far from calculated value")]
    ValueDeviationTooLarge,

    #[msg("Calculated value is stale or missing")]
    OracleStale,

    #[msg("Invalid validation settings")]
    InvalidValidationSettings,
}
