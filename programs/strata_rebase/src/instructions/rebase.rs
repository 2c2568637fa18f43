// programs/strata_rebase/src/instructions/rebase.rs

use crate::engine::{plan_rebase, RebaseInputs, RebasePlan, RebaseSummary, RebaseTransaction, TransferAction};
use crate::errors::RebaseError;
use crate::events::{
    BackstopExecuted, BackstopInsufficient, FeesMinted, RebaseExecuted, SpilloverExecuted, ZoneTransition,
};
use crate::state::{FeeLedger, RebaseConfig, TrancheKind, TrancheState, Zone};
use anchor_lang::prelude::*;
use strata_core::math::{bps_to_wad, to_units};

const BPS_WAD: u128 = bps_to_wad(1);

/// Execute one rebase (keeper or authority)
#[derive(Accounts)]
pub struct ExecuteRebase<'info> {
    #[account(
        seeds = [RebaseConfig::SEED_PREFIX],
        bump = rebase_config.bump,
        constraint = rebase_config.is_active @ RebaseError::EngineInactive,
    )]
    pub rebase_config: Account<'info, RebaseConfig>,

    #[account(
        mut,
        seeds = [TrancheState::SEED_PREFIX, TrancheKind::Senior.seed()],
        bump = senior_tranche.bump,
    )]
    pub senior_tranche: Account<'info, TrancheState>,

    #[account(
        mut,
        seeds = [TrancheState::SEED_PREFIX, TrancheKind::Junior.seed()],
        bump = junior_tranche.bump,
    )]
    pub junior_tranche: Account<'info, TrancheState>,

    #[account(
        mut,
        seeds = [TrancheState::SEED_PREFIX, TrancheKind::Reserve.seed()],
        bump = reserve_tranche.bump,
    )]
    pub reserve_tranche: Account<'info, TrancheState>,

    #[account(
        mut,
        seeds = [FeeLedger::SEED_PREFIX],
        bump = fee_ledger.bump,
    )]
    pub fee_ledger: Account<'info, FeeLedger>,

    #[account(
        constraint = keeper.key() == rebase_config.keeper
            || keeper.key() == rebase_config.authority @ RebaseError::Unauthorized
    )]
    pub keeper: Signer<'info>,
}

/// Rebase the Senior tranche and rebalance Junior/Reserve.
///
/// `expected_epoch` must equal the current Senior epoch, so a retried
/// transaction can never apply the same period twice.
pub fn execute_rebase(ctx: Context<ExecuteRebase>, expected_epoch: u64) -> Result<RebaseSummary> {
    let clock = Clock::get()?;
    let now = clock.unix_timestamp;
    let params = ctx.accounts.rebase_config.params;
    let fee_recipient = ctx.accounts.fee_ledger.recipient;

    require!(
        ctx.accounts.senior_tranche.epoch == expected_epoch,
        RebaseError::StaleEpoch
    );
    let old_zone = ctx.accounts.senior_tranche.last_zone;

    let accounts = &mut *ctx.accounts;
    let tx = RebaseTransaction::new(
        &mut accounts.senior_tranche,
        &mut accounts.junior_tranche,
        &mut accounts.reserve_tranche,
        &mut accounts.fee_ledger,
    )?;
    let plan = plan_rebase(&params, &tx.inputs(now)?)?;
    let summary = tx.commit(&plan, now)?;

    log_plan(&plan, &summary);
    emit_rebase_events(&plan, &summary, old_zone, fee_recipient, now);

    Ok(summary)
}

/// Read-only preview of the next rebase
#[derive(Accounts)]
pub struct SimulateRebase<'info> {
    #[account(
        seeds = [RebaseConfig::SEED_PREFIX],
        bump = rebase_config.bump,
    )]
    pub rebase_config: Account<'info, RebaseConfig>,

    #[account(
        seeds = [TrancheState::SEED_PREFIX, TrancheKind::Senior.seed()],
        bump = senior_tranche.bump,
    )]
    pub senior_tranche: Account<'info, TrancheState>,

    #[account(
        seeds = [TrancheState::SEED_PREFIX, TrancheKind::Junior.seed()],
        bump = junior_tranche.bump,
    )]
    pub junior_tranche: Account<'info, TrancheState>,

    #[account(
        seeds = [TrancheState::SEED_PREFIX, TrancheKind::Reserve.seed()],
        bump = reserve_tranche.bump,
    )]
    pub reserve_tranche: Account<'info, TrancheState>,
}

pub fn simulate_rebase(ctx: Context<SimulateRebase>) -> Result<RebaseSummary> {
    let clock = Clock::get()?;
    let senior = &ctx.accounts.senior_tranche;

    let inputs = RebaseInputs::from_tranches(
        senior,
        &ctx.accounts.junior_tranche,
        &ctx.accounts.reserve_tranche,
        clock.unix_timestamp,
    )?;
    let plan = plan_rebase(&ctx.accounts.rebase_config.params, &inputs)?;

    let next_epoch = senior
        .epoch
        .checked_add(1)
        .ok_or(strata_core::MathError::ArithmeticOverflow)?;
    Ok(plan.summary(next_epoch))
}

fn log_plan(plan: &RebasePlan, summary: &RebaseSummary) {
    msg!(
        "Rebase epoch {}: {} bps selected over {}s, index {} -> {}",
        summary.epoch,
        summary.selected_apy_bps,
        summary.elapsed,
        summary.old_index,
        summary.new_index
    );
    msg!(
        "Minted: yield {}, mgmt fee {}, perf fee {}; new supply {}",
        to_units(summary.user_yield_tokens),
        to_units(summary.management_fee_tokens),
        to_units(summary.performance_fee_tokens),
        to_units(summary.new_supply)
    );
    msg!(
        "Backing ratio: {} -> {} bps",
        summary.backing_ratio / BPS_WAD,
        summary.projected_backing_ratio / BPS_WAD
    );

    match plan.transfer {
        TransferAction::Spillover(s) => msg!(
            "Spillover: excess {} -> junior {}, reserve {}",
            to_units(s.excess),
            to_units(s.to_junior),
            to_units(s.to_reserve)
        ),
        TransferAction::Backstop(b) => {
            msg!(
                "Backstop: deficit {} <- reserve {}, junior {}",
                to_units(b.deficit),
                to_units(b.from_reserve),
                to_units(b.from_junior)
            );
            if b.is_insufficient() {
                msg!("WARNING: backstop insufficient, shortfall {}", to_units(b.shortfall));
            }
        }
        TransferAction::None => {}
    }
}

fn emit_rebase_events(plan: &RebasePlan, summary: &RebaseSummary, old_zone: Zone, fee_recipient: Pubkey, now: i64) {
    emit!(RebaseExecuted {
        epoch: summary.epoch,
        elapsed: summary.elapsed,
        selected_apy_bps: summary.selected_apy_bps,
        old_index: summary.old_index,
        new_index: summary.new_index,
        new_supply: summary.new_supply,
        zone: summary.zone,
        senior_value: summary.senior_value,
        timestamp: now,
    });

    if summary.fee_shares > 0 {
        emit!(FeesMinted {
            recipient: fee_recipient,
            management_fee_tokens: summary.management_fee_tokens,
            performance_fee_tokens: summary.performance_fee_tokens,
            fee_shares: summary.fee_shares,
            timestamp: now,
        });
    }

    match plan.transfer {
        TransferAction::Spillover(s) => emit!(SpilloverExecuted {
            excess: s.excess,
            to_junior: s.to_junior,
            to_reserve: s.to_reserve,
            timestamp: now,
        }),
        TransferAction::Backstop(b) => {
            emit!(BackstopExecuted {
                deficit: b.deficit,
                from_reserve: b.from_reserve,
                from_junior: b.from_junior,
                timestamp: now,
            });
            if b.is_insufficient() {
                emit!(BackstopInsufficient {
                    deficit: b.deficit,
                    shortfall: b.shortfall,
                    senior_value: summary.senior_value,
                    timestamp: now,
                });
            }
        }
        TransferAction::None => {}
    }

    if old_zone != summary.zone {
        emit!(ZoneTransition {
            old_zone,
            new_zone: summary.zone,
            backing_ratio: summary.backing_ratio,
            timestamp: now,
        });
    }
}
