// programs/strata_rebase/src/instructions/params.rs

use crate::errors::RebaseError;
use crate::events::{EngineActiveToggled, RebaseParamsUpdated, ValidationModeUpdated};
use crate::state::{RebaseConfig, ValueValidation};
use anchor_lang::prelude::*;
use strata_core::math::BPS_DENOMINATOR;

/// Authority-gated configuration update
#[derive(Accounts)]
pub struct UpdateRebaseConfig<'info> {
    #[account(
        mut,
        seeds = [RebaseConfig::SEED_PREFIX],
        bump = rebase_config.bump,
        has_one = authority @ RebaseError::Unauthorized,
    )]
    pub rebase_config: Account<'info, RebaseConfig>,

    pub authority: Signer<'info>,
}

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct SetRebaseParamsInput {
    pub tier_apys_bps: Option<[u16; 3]>,
    pub management_fee_bps: Option<u16>,
    pub performance_fee_bps: Option<u16>,
    pub excess_threshold_bps: Option<u16>,
    pub restore_target_bps: Option<u16>,
    pub junior_spillover_bps: Option<u16>,
    pub min_rebase_interval: Option<i64>,
}

pub fn set_rebase_params(ctx: Context<UpdateRebaseConfig>, input: SetRebaseParamsInput) -> Result<()> {
    let clock = Clock::get()?;
    let config = &mut ctx.accounts.rebase_config;

    let old = config.params;
    let mut params = old;

    if let Some(tiers) = input.tier_apys_bps {
        params.tier_apys_bps = tiers;
    }
    if let Some(fee) = input.management_fee_bps {
        params.management_fee_bps = fee;
    }
    if let Some(fee) = input.performance_fee_bps {
        params.performance_fee_bps = fee;
    }
    if let Some(threshold) = input.excess_threshold_bps {
        params.excess_threshold_bps = threshold;
    }
    if let Some(target) = input.restore_target_bps {
        params.restore_target_bps = target;
    }
    if let Some(split) = input.junior_spillover_bps {
        params.junior_spillover_bps = split;
    }
    if let Some(interval) = input.min_rebase_interval {
        params.min_rebase_interval = interval;
    }

    // Validated as a whole so cross-field bounds hold
    params.validate()?;
    config.params = params;

    msg!("Rebase params updated: tiers {:?} bps", params.tier_apys_bps);

    emit!(RebaseParamsUpdated {
        old_tier_apys_bps: old.tier_apys_bps,
        new_tier_apys_bps: params.tier_apys_bps,
        management_fee_bps: params.management_fee_bps,
        performance_fee_bps: params.performance_fee_bps,
        excess_threshold_bps: params.excess_threshold_bps,
        restore_target_bps: params.restore_target_bps,
        updater: ctx.accounts.authority.key(),
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}

pub fn set_validation_mode(
    ctx: Context<UpdateRebaseConfig>,
    enabled: bool,
    max_deviation_bps: u16,
    max_oracle_age: i64,
) -> Result<()> {
    let clock = Clock::get()?;

    require!(
        max_deviation_bps as u128 <= BPS_DENOMINATOR,
        RebaseError::InvalidValidationSettings
    );
    require!(max_oracle_age > 0, RebaseError::InvalidValidationSettings);

    ctx.accounts.rebase_config.validation = ValueValidation {
        enabled,
        max_deviation_bps,
        max_oracle_age,
    };

    emit!(ValidationModeUpdated {
        enabled,
        max_deviation_bps,
        max_oracle_age,
        updater: ctx.accounts.authority.key(),
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}

pub fn set_engine_active(ctx: Context<UpdateRebaseConfig>, active: bool) -> Result<()> {
    let clock = Clock::get()?;
    ctx.accounts.rebase_config.is_active = active;

    msg!("Rebase engine {}", if active { "activated" } else { "paused" });

    emit!(EngineActiveToggled {
        is_active: active,
        updater: ctx.accounts.authority.key(),
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
