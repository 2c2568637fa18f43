// programs/strata_rebase/src/instructions/initialize.rs

use crate::errors::RebaseError;
use crate::events::EngineInitialized;
use crate::state::{FeeLedger, RebaseConfig, RebaseParams, TrancheKind, TrancheState, ValueOracle, ValueValidation, Zone};
use anchor_lang::prelude::*;
use strata_core::math::WAD;

#[derive(Accounts)]
pub struct InitializeEngine<'info> {
    #[account(
        init,
        payer = authority,
        space = 8 + RebaseConfig::INIT_SPACE,
        seeds = [RebaseConfig::SEED_PREFIX],
        bump
    )]
    pub rebase_config: Account<'info, RebaseConfig>,

    #[account(
        init,
        payer = authority,
        space = 8 + TrancheState::INIT_SPACE,
        seeds = [TrancheState::SEED_PREFIX, TrancheKind::Senior.seed()],
        bump
    )]
    pub senior_tranche: Account<'info, TrancheState>,

    #[account(
        init,
        payer = authority,
        space = 8 + TrancheState::INIT_SPACE,
        seeds = [TrancheState::SEED_PREFIX, TrancheKind::Junior.seed()],
        bump
    )]
    pub junior_tranche: Account<'info, TrancheState>,

    #[account(
        init,
        payer = authority,
        space = 8 + TrancheState::INIT_SPACE,
        seeds = [TrancheState::SEED_PREFIX, TrancheKind::Reserve.seed()],
        bump
    )]
    pub reserve_tranche: Account<'info, TrancheState>,

    #[account(
        init,
        payer = authority,
        space = 8 + FeeLedger::INIT_SPACE,
        seeds = [FeeLedger::SEED_PREFIX],
        bump
    )]
    pub fee_ledger: Account<'info, FeeLedger>,

    #[account(mut)]
    pub authority: Signer<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct InitializeEngineParams {
    pub keeper: Pubkey,
    pub oracle_authority: Pubkey,
    pub fee_recipient: Pubkey,
    pub tier_apys_bps: Option<[u16; 3]>,
    pub management_fee_bps: Option<u16>,
    pub performance_fee_bps: Option<u16>,
    pub excess_threshold_bps: Option<u16>,
    pub restore_target_bps: Option<u16>,
    pub junior_spillover_bps: Option<u16>,
    pub min_rebase_interval: Option<i64>,
    /// Bootstrap Senior shares (wad); deposits are handled elsewhere
    pub initial_senior_shares: u128,
    pub initial_senior_value: u128,
    pub initial_junior_value: u128,
    pub initial_reserve_value: u128,
}

pub fn initialize_engine(ctx: Context<InitializeEngine>, params: InitializeEngineParams) -> Result<()> {
    let clock = Clock::get()?;

    let rebase_params = RebaseParams {
        tier_apys_bps: params
            .tier_apys_bps
            .unwrap_or(RebaseParams::DEFAULT_TIER_APYS_BPS),
        management_fee_bps: params
            .management_fee_bps
            .unwrap_or(RebaseParams::DEFAULT_MANAGEMENT_FEE_BPS),
        performance_fee_bps: params
            .performance_fee_bps
            .unwrap_or(RebaseParams::DEFAULT_PERFORMANCE_FEE_BPS),
        excess_threshold_bps: params
            .excess_threshold_bps
            .unwrap_or(RebaseParams::DEFAULT_EXCESS_THRESHOLD_BPS),
        restore_target_bps: params
            .restore_target_bps
            .unwrap_or(RebaseParams::DEFAULT_RESTORE_TARGET_BPS),
        junior_spillover_bps: params
            .junior_spillover_bps
            .unwrap_or(RebaseParams::DEFAULT_JUNIOR_SPILLOVER_BPS),
        min_rebase_interval: params
            .min_rebase_interval
            .unwrap_or(RebaseParams::DEFAULT_MIN_REBASE_INTERVAL),
    };
    rebase_params.validate()?;

    let config = &mut ctx.accounts.rebase_config;
    config.authority = ctx.accounts.authority.key();
    config.keeper = params.keeper;
    config.oracle_authority = params.oracle_authority;
    config.params = rebase_params;
    config.validation = ValueValidation::default();
    config.is_active = true;
    config.bump = ctx.bumps.rebase_config;
    config.reserved = vec![];

    init_tranche(
        &mut ctx.accounts.senior_tranche,
        TrancheKind::Senior,
        params.initial_senior_shares,
        params.initial_senior_value,
        clock.unix_timestamp,
        ctx.bumps.senior_tranche,
    );
    init_tranche(
        &mut ctx.accounts.junior_tranche,
        TrancheKind::Junior,
        0,
        params.initial_junior_value,
        clock.unix_timestamp,
        ctx.bumps.junior_tranche,
    );
    init_tranche(
        &mut ctx.accounts.reserve_tranche,
        TrancheKind::Reserve,
        0,
        params.initial_reserve_value,
        clock.unix_timestamp,
        ctx.bumps.reserve_tranche,
    );

    let ledger = &mut ctx.accounts.fee_ledger;
    ledger.recipient = params.fee_recipient;
    ledger.fee_shares = 0;
    ledger.cumulative_management_fee_tokens = 0;
    ledger.cumulative_performance_fee_tokens = 0;
    ledger.last_minted_at = 0;
    ledger.bump = ctx.bumps.fee_ledger;

    msg!(
        "Rebase engine initialized: tiers {:?} bps, senior value {}",
        rebase_params.tier_apys_bps,
        strata_core::math::to_units(params.initial_senior_value)
    );

    emit!(EngineInitialized {
        authority: ctx.accounts.authority.key(),
        keeper: params.keeper,
        fee_recipient: params.fee_recipient,
        tier_apys_bps: rebase_params.tier_apys_bps,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}

fn init_tranche(tranche: &mut TrancheState, kind: TrancheKind, shares: u128, value: u128, now: i64, bump: u8) {
    tranche.kind = kind;
    tranche.total_shares = shares;
    tranche.rebase_index = WAD;
    tranche.reported_value = value;
    tranche.last_rebase_time = now;
    tranche.epoch = 0;
    tranche.cumulative_spillover_received = 0;
    tranche.cumulative_backstop_provided = 0;
    tranche.cumulative_spillover_paid = 0;
    tranche.cumulative_backstop_received = 0;
    tranche.last_zone = Zone::Healthy;
    tranche.last_selected_apy_bps = 0;
    tranche.last_value_update = now;
    tranche.bump = bump;
}

/// Create the value oracle for one tranche (authority only)
#[derive(Accounts)]
#[instruction(kind: TrancheKind)]
pub struct InitializeValueOracle<'info> {
    #[account(
        seeds = [RebaseConfig::SEED_PREFIX],
        bump = rebase_config.bump,
    )]
    pub rebase_config: Account<'info, RebaseConfig>,

    #[account(
        init,
        payer = authority,
        space = 8 + ValueOracle::INIT_SPACE,
        seeds = [ValueOracle::SEED_PREFIX, kind.seed()],
        bump
    )]
    pub value_oracle: Account<'info, ValueOracle>,

    #[account(
        mut,
        constraint = authority.key() == rebase_config.authority @ RebaseError::Unauthorized
    )]
    pub authority: Signer<'info>,

    pub system_program: Program<'info, System>,
}

pub fn initialize_value_oracle(ctx: Context<InitializeValueOracle>, kind: TrancheKind) -> Result<()> {
    let oracle = &mut ctx.accounts.value_oracle;
    oracle.kind = kind;
    oracle.calculated_value = 0;
    oracle.posted_at = 0;
    oracle.bump = ctx.bumps.value_oracle;

    msg!("Value oracle created for {} tranche", kind.name());

    Ok(())
}
