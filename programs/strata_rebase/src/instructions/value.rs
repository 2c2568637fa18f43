// programs/strata_rebase/src/instructions/value.rs

use crate::errors::RebaseError;
use crate::events::{CalculatedValuePosted, ReportedValueUpdated};
use crate::state::{RebaseConfig, TrancheKind, TrancheState, ValueOracle};
use anchor_lang::prelude::*;
use strata_core::math::{self, to_units};

/// Update a tranche's reported value (keeper or authority)
#[derive(Accounts)]
#[instruction(kind: TrancheKind)]
pub struct UpdateReportedValue<'info> {
    #[account(
        seeds = [RebaseConfig::SEED_PREFIX],
        bump = rebase_config.bump,
        constraint = rebase_config.is_active @ RebaseError::EngineInactive,
    )]
    pub rebase_config: Account<'info, RebaseConfig>,

    #[account(
        mut,
        seeds = [TrancheState::SEED_PREFIX, kind.seed()],
        bump = tranche.bump,
        constraint = tranche.kind == kind @ RebaseError::TrancheMismatch,
    )]
    pub tranche: Account<'info, TrancheState>,

    /// Required only while validation mode is on
    #[account(
        seeds = [ValueOracle::SEED_PREFIX, kind.seed()],
        bump = value_oracle.bump,
    )]
    pub value_oracle: Option<Account<'info, ValueOracle>>,

    #[account(
        constraint = keeper.key() == rebase_config.keeper
            || keeper.key() == rebase_config.authority @ RebaseError::Unauthorized
    )]
    pub keeper: Signer<'info>,
}

/// Apply a signed profit/loss, in bps of the current value
pub fn update_reported_value(ctx: Context<UpdateReportedValue>, kind: TrancheKind, profit_bps: i32) -> Result<()> {
    let new_value = ctx.accounts.tranche.value_after_profit(profit_bps)?;
    write_reported_value(ctx, kind, new_value, profit_bps)
}

/// Overwrite the reported value
pub fn set_reported_value(ctx: Context<UpdateReportedValue>, kind: TrancheKind, value: u128) -> Result<()> {
    write_reported_value(ctx, kind, value, 0)
}

fn write_reported_value(
    ctx: Context<UpdateReportedValue>,
    kind: TrancheKind,
    new_value: u128,
    profit_bps: i32,
) -> Result<()> {
    let clock = Clock::get()?;
    let validation = ctx.accounts.rebase_config.validation;

    if validation.enabled {
        let Some(oracle) = ctx.accounts.value_oracle.as_ref() else {
            return err!(RebaseError::OracleStale);
        };
        validation.check(new_value, oracle, clock.unix_timestamp)?;
    }

    let tranche = &mut ctx.accounts.tranche;
    let old_value = tranche.reported_value;
    tranche.reported_value = new_value;
    tranche.last_value_update = clock.unix_timestamp;

    msg!(
        "{} reported value: {} -> {} ({} bps)",
        kind.name(),
        to_units(old_value),
        to_units(new_value),
        profit_bps
    );
    if kind == TrancheKind::Senior {
        if let Ok(ratio) = tranche.backing_ratio() {
            msg!("Senior backing ratio: {} bps", ratio / math::bps_to_wad(1));
        }
    }

    emit!(ReportedValueUpdated {
        kind,
        old_value,
        new_value,
        profit_bps,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}

/// Post an independently calculated value (oracle authority)
#[derive(Accounts)]
#[instruction(kind: TrancheKind)]
pub struct PostCalculatedValue<'info> {
    #[account(
        seeds = [RebaseConfig::SEED_PREFIX],
        bump = rebase_config.bump,
    )]
    pub rebase_config: Account<'info, RebaseConfig>,

    #[account(
        mut,
        seeds = [ValueOracle::SEED_PREFIX, kind.seed()],
        bump = value_oracle.bump,
        constraint = value_oracle.kind == kind @ RebaseError::TrancheMismatch,
    )]
    pub value_oracle: Account<'info, ValueOracle>,

    #[account(
        constraint = oracle_authority.key() == rebase_config.oracle_authority @ RebaseError::Unauthorized
    )]
    pub oracle_authority: Signer<'info>,
}

pub fn post_calculated_value(ctx: Context<PostCalculatedValue>, kind: TrancheKind, value: u128) -> Result<()> {
    let clock = Clock::get()?;
    let oracle = &mut ctx.accounts.value_oracle;

    oracle.calculated_value = value;
    oracle.posted_at = clock.unix_timestamp;

    emit!(CalculatedValuePosted {
        kind,
        calculated_value: value,
        poster: ctx.accounts.oracle_authority.key(),
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
