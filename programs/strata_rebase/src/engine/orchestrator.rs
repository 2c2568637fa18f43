// programs/strata_rebase/src/engine/orchestrator.rs
//
// Sequences one rebase: interval check, fee and APY selection, zone
// classification, value transfer, index update and fee-share minting.
// `plan_rebase` is pure and shared by simulation and execution; a
// `RebaseTransaction` writes a finished plan back to the accounts.

use anchor_lang::prelude::*;
use strata_core::math::{self, checked_add, WAD};
use strata_core::{MathError, TrancheKind};

use super::apy::{select_apy, ApySelection};
use super::backstop::{execute_backstop, BackstopResult};
use super::fees::FeeEngine;
use super::spillover::{execute_spillover, SpilloverResult};
use super::zones::{classify_zone, ZoneDecision};
use super::TrancheBalances;
use crate::errors::RebaseError;
use crate::state::{FeeLedger, RebaseParams, TrancheState, Zone};

/// Snapshot of everything a rebase reads
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RebaseInputs {
    pub now: i64,
    pub last_rebase_time: i64,
    pub senior_shares: u128,
    pub rebase_index: u128,
    pub balances: TrancheBalances,
}

impl RebaseInputs {
    pub fn from_tranches(
        senior: &TrancheState,
        junior: &TrancheState,
        reserve: &TrancheState,
        now: i64,
    ) -> Result<Self> {
        check_tranche_set(senior, junior, reserve)?;

        Ok(Self {
            now,
            last_rebase_time: senior.last_rebase_time,
            senior_shares: senior.total_shares,
            rebase_index: senior.rebase_index,
            balances: TrancheBalances {
                senior: senior.reported_value,
                junior: junior.reported_value,
                reserve: reserve.reported_value,
            },
        })
    }
}

/// The three accounts must be Senior, Junior, Reserve, all at the same epoch
pub fn check_tranche_set(
    senior: &TrancheState,
    junior: &TrancheState,
    reserve: &TrancheState,
) -> Result<()> {
    require!(senior.kind == TrancheKind::Senior, RebaseError::NotSenior);
    require!(junior.kind == TrancheKind::Junior, RebaseError::TrancheMismatch);
    require!(reserve.kind == TrancheKind::Reserve, RebaseError::TrancheMismatch);
    require!(
        junior.epoch == senior.epoch && reserve.epoch == senior.epoch,
        RebaseError::EpochMismatch
    );
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferAction {
    None,
    Spillover(SpilloverResult),
    Backstop(BackstopResult),
}

impl TransferAction {
    pub fn spillover(&self) -> SpilloverResult {
        match self {
            TransferAction::Spillover(s) => *s,
            _ => SpilloverResult::default(),
        }
    }

    pub fn backstop(&self) -> BackstopResult {
        match self {
            TransferAction::Backstop(b) => *b,
            _ => BackstopResult::default(),
        }
    }
}

/// Fully computed rebase, not yet applied
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RebasePlan {
    pub elapsed: u64,
    pub selection: ApySelection,
    pub zone: ZoneDecision,
    pub transfer: TransferAction,
    pub old_index: u128,
    pub new_index: u128,
    /// Senior shares minted for management + performance fees
    pub fee_shares: u128,
    /// Reported values after the transfer
    pub balances: TrancheBalances,
    /// Senior value over `new_supply` once the transfer has landed (wad)
    pub projected_backing_ratio: u128,
}

impl RebasePlan {
    pub fn backstop_insufficient(&self) -> bool {
        self.transfer.backstop().is_insufficient()
    }

    pub fn summary(&self, epoch: u64) -> RebaseSummary {
        let spillover = self.transfer.spillover();
        let backstop = self.transfer.backstop();

        RebaseSummary {
            epoch,
            elapsed: self.elapsed,
            selected_apy_bps: self.selection.selected_apy_bps,
            needs_backstop: self.selection.needs_backstop,
            zone: self.zone.zone,
            backing_ratio: self.zone.backing_ratio,
            projected_backing_ratio: self.projected_backing_ratio,
            old_index: self.old_index,
            new_index: self.new_index,
            new_supply: self.selection.new_supply,
            management_fee_tokens: self.selection.fees.management_fee_tokens,
            user_yield_tokens: self.selection.fees.user_yield_tokens,
            performance_fee_tokens: self.selection.fees.performance_fee_tokens,
            fee_shares: self.fee_shares,
            spillover_to_junior: spillover.to_junior,
            spillover_to_reserve: spillover.to_reserve,
            backstop_from_reserve: backstop.from_reserve,
            backstop_from_junior: backstop.from_junior,
            backstop_shortfall: backstop.shortfall,
            backstop_insufficient: backstop.is_insufficient(),
            senior_value: self.balances.senior,
            junior_value: self.balances.junior,
            reserve_value: self.balances.reserve,
        }
    }
}

/// Returned by `rebase` and `simulate_rebase`
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct RebaseSummary {
    /// Epoch the rebase closes
    pub epoch: u64,
    pub elapsed: u64,
    pub selected_apy_bps: u16,
    pub needs_backstop: bool,
    pub zone: Zone,
    /// Before spillover/backstop
    pub backing_ratio: u128,
    /// After spillover/backstop
    pub projected_backing_ratio: u128,
    pub old_index: u128,
    pub new_index: u128,
    pub new_supply: u128,
    pub management_fee_tokens: u128,
    pub user_yield_tokens: u128,
    pub performance_fee_tokens: u128,
    pub fee_shares: u128,
    pub spillover_to_junior: u128,
    pub spillover_to_reserve: u128,
    pub backstop_from_reserve: u128,
    pub backstop_from_junior: u128,
    pub backstop_shortfall: u128,
    pub backstop_insufficient: bool,
    pub senior_value: u128,
    pub junior_value: u128,
    pub reserve_value: u128,
}

/// Compute a rebase without touching any account.
pub fn plan_rebase(params: &RebaseParams, inputs: &RebaseInputs) -> Result<RebasePlan> {
    let elapsed = inputs
        .now
        .checked_sub(inputs.last_rebase_time)
        .ok_or(MathError::ArithmeticOverflow)?;
    require!(elapsed >= params.min_rebase_interval, RebaseError::RebaseTooSoon);
    let elapsed = u64::try_from(elapsed).map_err(|_| error!(RebaseError::RebaseTooSoon))?;

    let supply = math::wad_mul(inputs.senior_shares, inputs.rebase_index)?;
    require!(supply > 0, RebaseError::EmptySeniorSupply);

    let senior_value = inputs.balances.senior;
    let fees = FeeEngine::new(params.management_fee_bps, params.performance_fee_bps, elapsed);
    let selection = select_apy(&params.tier_apys_bps, &fees, senior_value, supply)?;
    let zone = classify_zone(params, senior_value, selection.new_supply)?;

    let mut balances = inputs.balances;
    let transfer = match zone.zone {
        Zone::Excess => TransferAction::Spillover(execute_spillover(
            &mut balances,
            zone.target_value,
            params.reserve_spillover_bps(),
        )?),
        Zone::Deficit => TransferAction::Backstop(execute_backstop(&mut balances, zone.target_value)?),
        Zone::Healthy => TransferAction::None,
    };

    let growth = checked_add(WAD, selection.fees.scaled_rate)?;
    let new_index = math::mul_div(inputs.rebase_index, growth, WAD)?;
    let fee_shares = math::mul_div(selection.fees.fee_tokens()?, WAD, new_index)?;
    let projected_backing_ratio = math::ratio(balances.senior, selection.new_supply)?;

    Ok(RebasePlan {
        elapsed,
        selection,
        zone,
        transfer,
        old_index: inputs.rebase_index,
        new_index,
        fee_shares,
        balances,
        projected_backing_ratio,
    })
}

/// Mutable view over every account a rebase writes
pub struct RebaseTransaction<'a> {
    pub senior: &'a mut TrancheState,
    pub junior: &'a mut TrancheState,
    pub reserve: &'a mut TrancheState,
    pub fee_ledger: &'a mut FeeLedger,
}

impl<'a> RebaseTransaction<'a> {
    pub fn new(
        senior: &'a mut TrancheState,
        junior: &'a mut TrancheState,
        reserve: &'a mut TrancheState,
        fee_ledger: &'a mut FeeLedger,
    ) -> Result<Self> {
        check_tranche_set(senior, junior, reserve)?;
        Ok(Self {
            senior,
            junior,
            reserve,
            fee_ledger,
        })
    }

    pub fn inputs(&self, now: i64) -> Result<RebaseInputs> {
        RebaseInputs::from_tranches(&*self.senior, &*self.junior, &*self.reserve, now)
    }

    /// Apply `plan`. Every new value is computed before the first write,
    /// so an overflow leaves all four accounts untouched.
    pub fn commit(self, plan: &RebasePlan, now: i64) -> Result<RebaseSummary> {
        let spillover = plan.transfer.spillover();
        let backstop = plan.transfer.backstop();
        let fees = &plan.selection.fees;

        let epoch = self
            .senior
            .epoch
            .checked_add(1)
            .ok_or(MathError::ArithmeticOverflow)?;

        let senior_shares = checked_add(self.senior.total_shares, plan.fee_shares)?;
        let senior_spillover_paid = checked_add(self.senior.cumulative_spillover_paid, spillover.excess)?;
        let senior_backstop_received =
            checked_add(self.senior.cumulative_backstop_received, backstop.provided())?;

        let junior_spillover = checked_add(self.junior.cumulative_spillover_received, spillover.to_junior)?;
        let junior_backstop = checked_add(
            self.junior.cumulative_backstop_provided,
            backstop.provided_by(TrancheKind::Junior),
        )?;
        let reserve_spillover = checked_add(self.reserve.cumulative_spillover_received, spillover.to_reserve)?;
        let reserve_backstop = checked_add(
            self.reserve.cumulative_backstop_provided,
            backstop.provided_by(TrancheKind::Reserve),
        )?;

        let ledger_shares = checked_add(self.fee_ledger.fee_shares, plan.fee_shares)?;
        let ledger_management = checked_add(
            self.fee_ledger.cumulative_management_fee_tokens,
            fees.management_fee_tokens,
        )?;
        let ledger_performance = checked_add(
            self.fee_ledger.cumulative_performance_fee_tokens,
            fees.performance_fee_tokens,
        )?;

        // All arithmetic done; write.
        let senior = self.senior;
        senior.total_shares = senior_shares;
        senior.rebase_index = plan.new_index;
        senior.reported_value = plan.balances.senior;
        senior.cumulative_spillover_paid = senior_spillover_paid;
        senior.cumulative_backstop_received = senior_backstop_received;
        senior.last_zone = plan.zone.zone;
        senior.last_selected_apy_bps = plan.selection.selected_apy_bps;

        let junior = self.junior;
        junior.reported_value = plan.balances.junior;
        junior.cumulative_spillover_received = junior_spillover;
        junior.cumulative_backstop_provided = junior_backstop;

        let reserve = self.reserve;
        reserve.reported_value = plan.balances.reserve;
        reserve.cumulative_spillover_received = reserve_spillover;
        reserve.cumulative_backstop_provided = reserve_backstop;

        for tranche in [&mut *senior, &mut *junior, &mut *reserve] {
            tranche.epoch = epoch;
            tranche.last_rebase_time = now;
        }

        let ledger = self.fee_ledger;
        ledger.fee_shares = ledger_shares;
        ledger.cumulative_management_fee_tokens = ledger_management;
        ledger.cumulative_performance_fee_tokens = ledger_performance;
        ledger.last_minted_at = now;

        Ok(plan.summary(epoch))
    }
}

// ==================== UNIT TESTS ====================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use strata_core::math::{from_units, to_units};
    use strata_core::time::{SECONDS_PER_DAY, SECONDS_PER_EPOCH};

    const START: i64 = 1_700_000_000;

    fn create_test_tranche(kind: TrancheKind, shares: u64, value: u64) -> TrancheState {
        TrancheState {
            kind,
            total_shares: from_units(shares),
            rebase_index: WAD,
            reported_value: from_units(value),
            last_rebase_time: START,
            epoch: 0,
            cumulative_spillover_received: 0,
            cumulative_backstop_provided: 0,
            cumulative_spillover_paid: 0,
            cumulative_backstop_received: 0,
            last_zone: Zone::Healthy,
            last_selected_apy_bps: 0,
            last_value_update: START,
            bump: 255,
        }
    }

    fn create_test_ledger() -> FeeLedger {
        FeeLedger {
            recipient: Pubkey::default(),
            fee_shares: 0,
            cumulative_management_fee_tokens: 0,
            cumulative_performance_fee_tokens: 0,
            last_minted_at: 0,
            bump: 255,
        }
    }

    fn create_test_inputs(senior: u64, junior: u64, reserve: u64, elapsed: i64) -> RebaseInputs {
        RebaseInputs {
            now: START + elapsed,
            last_rebase_time: START,
            senior_shares: from_units(10_000_000),
            rebase_index: WAD,
            balances: TrancheBalances {
                senior: from_units(senior),
                junior: from_units(junior),
                reserve: from_units(reserve),
            },
        }
    }

    fn assert_close(actual: u128, expected_units: u128) {
        let units = to_units(actual);
        assert!(
            units + 5 >= expected_units && units <= expected_units + 5,
            "expected ~{} got {}",
            expected_units,
            units
        );
    }

    // ==================== SCENARIO TESTS ====================

    #[test]
    fn test_excess_scenario_thirty_days() {
        let params = RebaseParams::default();
        let inputs = create_test_inputs(11_150_000, 2_000_000, 500_000, SECONDS_PER_EPOCH as i64);
        let plan = plan_rebase(&params, &inputs).unwrap();

        assert_close(plan.selection.fees.management_fee_tokens, 9_165);
        assert_close(plan.selection.fees.user_yield_tokens, 108_333);
        assert_close(plan.selection.fees.performance_fee_tokens, 2_167);
        assert_close(plan.selection.new_supply, 10_119_662);
        assert_eq!(plan.selection.selected_apy_bps, 1300);
        assert_eq!(plan.new_index, WAD + 10_833_333_333_333_333);

        assert_eq!(plan.zone.zone, Zone::Excess);
        let spillover = plan.transfer.spillover();
        assert_close(spillover.excess, 18_372);
        assert_eq!(plan.balances.senior, plan.zone.target_value);
        assert_eq!(plan.zone.target_value, math::apply_bps(plan.selection.new_supply, 11_000).unwrap());
        assert_eq!(spillover.to_reserve, math::apply_bps(spillover.excess, 2_000).unwrap());
        assert_eq!(spillover.to_junior + spillover.to_reserve, spillover.excess);
        assert_eq!(plan.balances.total().unwrap(), inputs.balances.total().unwrap());

        let summary = plan.summary(1);
        assert!(summary.backing_ratio > math::bps_to_wad(11_000));
        assert!(summary.projected_backing_ratio <= math::bps_to_wad(11_000));
        assert!(summary.projected_backing_ratio >= math::bps_to_wad(11_000) - 1);
        assert!(summary.projected_backing_ratio < summary.backing_ratio);
    }

    #[test]
    fn test_backstop_reserve_covers_alone() {
        let params = RebaseParams::default();
        let inputs = create_test_inputs(9_800_000, 1_000_000, 625_000, SECONDS_PER_EPOCH as i64);
        let plan = plan_rebase(&params, &inputs).unwrap();

        assert_eq!(plan.zone.zone, Zone::Deficit);
        assert!(plan.selection.needs_backstop);
        assert_eq!(plan.selection.selected_apy_bps, 1100);

        let backstop = plan.transfer.backstop();
        assert!(!backstop.is_insufficient());
        assert_eq!(backstop.from_junior, 0);
        assert_eq!(backstop.from_reserve, backstop.deficit);
        assert_eq!(plan.balances.senior, plan.zone.target_value);
        assert_eq!(plan.balances.junior, from_units(1_000_000));
        assert_eq!(plan.balances.reserve, from_units(625_000) - backstop.from_reserve);

        let summary = plan.summary(1);
        assert!(summary.backing_ratio < WAD);
        assert!(summary.projected_backing_ratio >= math::bps_to_wad(10_090) - 1);
        assert!(summary.projected_backing_ratio <= math::bps_to_wad(10_090));
    }

    #[test]
    fn test_insufficient_backstop_still_plans() {
        let params = RebaseParams::default();
        let inputs = create_test_inputs(9_000_000, 100_000, 50_000, SECONDS_PER_EPOCH as i64);
        let plan = plan_rebase(&params, &inputs).unwrap();

        assert_eq!(plan.zone.zone, Zone::Deficit);
        assert!(plan.backstop_insufficient());
        assert_eq!(plan.balances.junior, 0);
        assert_eq!(plan.balances.reserve, 0);
        assert_eq!(plan.balances.senior, from_units(9_150_000));
        assert!(plan.summary(1).backstop_insufficient);
    }

    #[test]
    fn test_healthy_moves_nothing() {
        let params = RebaseParams::default();
        let inputs = create_test_inputs(10_500_000, 2_000_000, 500_000, SECONDS_PER_EPOCH as i64);
        let plan = plan_rebase(&params, &inputs).unwrap();

        assert_eq!(plan.zone.zone, Zone::Healthy);
        assert_eq!(plan.transfer, TransferAction::None);
        assert_eq!(plan.balances, inputs.balances);
    }

    // ==================== TIMING TESTS ====================

    #[test]
    fn test_rebase_too_soon() {
        let params = RebaseParams::default();
        let inputs = create_test_inputs(10_500_000, 0, 0, SECONDS_PER_DAY as i64 - 1);
        let err = plan_rebase(&params, &inputs).unwrap_err();
        let expected: anchor_lang::error::Error = RebaseError::RebaseTooSoon.into();
        assert_eq!(err, expected);
    }

    #[test]
    fn test_clock_behind_last_rebase() {
        let mut params = RebaseParams::default();
        params.min_rebase_interval = 0;
        let inputs = create_test_inputs(10_500_000, 0, 0, -10);
        assert!(plan_rebase(&params, &inputs).is_err());
    }

    #[test]
    fn test_empty_senior() {
        let params = RebaseParams::default();
        let mut inputs = create_test_inputs(10_500_000, 0, 0, SECONDS_PER_EPOCH as i64);
        inputs.senior_shares = 0;
        let err = plan_rebase(&params, &inputs).unwrap_err();
        let expected: anchor_lang::error::Error = RebaseError::EmptySeniorSupply.into();
        assert_eq!(err, expected);
    }

    // ==================== COMMIT TESTS ====================

    #[test]
    fn test_commit_matches_simulation() {
        let params = RebaseParams::default();
        let mut senior = create_test_tranche(TrancheKind::Senior, 10_000_000, 11_150_000);
        let mut junior = create_test_tranche(TrancheKind::Junior, 2_000_000, 2_000_000);
        let mut reserve = create_test_tranche(TrancheKind::Reserve, 500_000, 500_000);
        let mut ledger = create_test_ledger();
        let now = START + SECONDS_PER_EPOCH as i64;

        let simulated = {
            let inputs = RebaseInputs::from_tranches(&senior, &junior, &reserve, now).unwrap();
            plan_rebase(&params, &inputs).unwrap().summary(senior.epoch + 1)
        };

        let tx = RebaseTransaction::new(&mut senior, &mut junior, &mut reserve, &mut ledger).unwrap();
        let plan = plan_rebase(&params, &tx.inputs(now).unwrap()).unwrap();
        let executed = tx.commit(&plan, now).unwrap();

        assert_eq!(simulated, executed);

        for tranche in [&senior, &junior, &reserve] {
            assert_eq!(tranche.epoch, 1);
            assert_eq!(tranche.last_rebase_time, now);
        }
        assert_eq!(senior.rebase_index, plan.new_index);
        assert_eq!(senior.reported_value, executed.senior_value);
        assert_eq!(senior.total_shares, from_units(10_000_000) + plan.fee_shares);
        assert_eq!(senior.last_zone, Zone::Excess);
        assert_eq!(senior.last_selected_apy_bps, 1300);
        assert_eq!(senior.cumulative_spillover_paid, plan.transfer.spillover().excess);
        assert_eq!(junior.cumulative_spillover_received, executed.spillover_to_junior);
        assert_eq!(reserve.cumulative_spillover_received, executed.spillover_to_reserve);
        assert_eq!(ledger.fee_shares, plan.fee_shares);
        assert_eq!(ledger.last_minted_at, now);

        // Minted supply lands on new_supply up to rounding
        let supply = senior.total_supply().unwrap();
        assert_close(supply, to_units(executed.new_supply));

        // Second rebase right away is rejected
        let inputs = RebaseInputs::from_tranches(&senior, &junior, &reserve, now + 1).unwrap();
        assert!(plan_rebase(&params, &inputs).is_err());
    }

    #[test]
    fn test_commit_records_backstop_counters() {
        let params = RebaseParams::default();
        let mut senior = create_test_tranche(TrancheKind::Senior, 10_000_000, 9_000_000);
        let mut junior = create_test_tranche(TrancheKind::Junior, 1_000_000, 1_000_000);
        let mut reserve = create_test_tranche(TrancheKind::Reserve, 300_000, 300_000);
        let mut ledger = create_test_ledger();
        let now = START + SECONDS_PER_EPOCH as i64;

        let tx = RebaseTransaction::new(&mut senior, &mut junior, &mut reserve, &mut ledger).unwrap();
        let plan = plan_rebase(&params, &tx.inputs(now).unwrap()).unwrap();
        let summary = tx.commit(&plan, now).unwrap();

        assert_eq!(reserve.cumulative_backstop_provided, from_units(300_000));
        assert_eq!(junior.cumulative_backstop_provided, summary.backstop_from_junior);
        assert_eq!(
            senior.cumulative_backstop_received,
            summary.backstop_from_reserve + summary.backstop_from_junior
        );
        assert_eq!(senior.reported_value, plan.zone.target_value);
        assert_eq!(senior.last_zone, Zone::Deficit);
    }

    #[test]
    fn test_commit_reserve_alone_covers_exact_deficit() {
        // No management fee, so new_supply does not depend on Senior's value
        let params = RebaseParams {
            management_fee_bps: 0,
            ..RebaseParams::default()
        };
        let now = START + SECONDS_PER_EPOCH as i64;

        let mut sizing = create_test_inputs(2_900_000, 1_000_000, 625_000, SECONDS_PER_EPOCH as i64);
        sizing.senior_shares = from_units(3_000_000);
        let new_supply = plan_rebase(&params, &sizing).unwrap().selection.new_supply;
        let target = math::apply_bps(new_supply, params.restore_target_bps).unwrap();

        let mut senior = create_test_tranche(TrancheKind::Senior, 3_000_000, 0);
        senior.reported_value = target - from_units(29_000);
        let mut junior = create_test_tranche(TrancheKind::Junior, 1_000_000, 1_000_000);
        let mut reserve = create_test_tranche(TrancheKind::Reserve, 625_000, 625_000);
        let mut ledger = create_test_ledger();

        let tx = RebaseTransaction::new(&mut senior, &mut junior, &mut reserve, &mut ledger).unwrap();
        let plan = plan_rebase(&params, &tx.inputs(now).unwrap()).unwrap();
        assert_eq!(plan.selection.new_supply, new_supply);
        assert_eq!(plan.zone.zone, Zone::Deficit);
        let summary = tx.commit(&plan, now).unwrap();

        assert_eq!(summary.backstop_from_reserve, from_units(29_000));
        assert_eq!(summary.backstop_from_junior, 0);
        assert!(!summary.backstop_insufficient);

        assert_eq!(reserve.cumulative_backstop_provided, from_units(29_000));
        assert_eq!(reserve.reported_value, from_units(625_000 - 29_000));
        assert_eq!(junior.reported_value, from_units(1_000_000));
        assert_eq!(junior.cumulative_backstop_provided, 0);
        assert_eq!(senior.reported_value, target);
        assert_eq!(senior.cumulative_backstop_received, from_units(29_000));
    }

    #[test]
    fn test_transaction_rejects_swapped_tranches() {
        let mut senior = create_test_tranche(TrancheKind::Senior, 1, 1);
        let mut junior = create_test_tranche(TrancheKind::Reserve, 1, 1);
        let mut reserve = create_test_tranche(TrancheKind::Junior, 1, 1);
        let mut ledger = create_test_ledger();
        assert!(RebaseTransaction::new(&mut senior, &mut junior, &mut reserve, &mut ledger).is_err());

        let mut junior = create_test_tranche(TrancheKind::Senior, 1, 1);
        let mut reserve = create_test_tranche(TrancheKind::Reserve, 1, 1);
        let mut not_senior = create_test_tranche(TrancheKind::Junior, 1, 1);
        let err = RebaseTransaction::new(&mut not_senior, &mut junior, &mut reserve, &mut ledger).err();
        let expected: anchor_lang::error::Error = RebaseError::NotSenior.into();
        assert_eq!(err, Some(expected));
    }

    #[test]
    fn test_transaction_rejects_epoch_drift() {
        let mut senior = create_test_tranche(TrancheKind::Senior, 1, 1);
        let mut junior = create_test_tranche(TrancheKind::Junior, 1, 1);
        let mut reserve = create_test_tranche(TrancheKind::Reserve, 1, 1);
        let mut ledger = create_test_ledger();
        junior.epoch = 3;
        assert!(RebaseTransaction::new(&mut senior, &mut junior, &mut reserve, &mut ledger).is_err());
    }

    // ==================== PROPERTY TESTS ====================

    proptest! {
        #[test]
        fn rebase_conserves_value_and_never_lowers_index(
            senior in 1u64..100_000_000,
            junior in 0u64..100_000_000,
            reserve in 0u64..100_000_000,
            shares in 1u64..100_000_000,
            index_bump in 0u128..WAD,
            elapsed in (SECONDS_PER_DAY as i64)..(4 * SECONDS_PER_EPOCH as i64),
        ) {
            let params = RebaseParams::default();
            let mut inputs = create_test_inputs(senior, junior, reserve, elapsed);
            inputs.senior_shares = from_units(shares);
            inputs.rebase_index = WAD + index_bump;

            let plan = plan_rebase(&params, &inputs).unwrap();

            prop_assert!(plan.new_index >= plan.old_index);
            prop_assert_eq!(plan.balances.total().unwrap(), inputs.balances.total().unwrap());

            let backstop = plan.transfer.backstop();
            prop_assert!(backstop.from_reserve <= inputs.balances.reserve);
            prop_assert!(backstop.from_junior <= inputs.balances.junior);

            if !plan.backstop_insufficient() {
                let ratio = math::ratio(plan.balances.senior, plan.selection.new_supply).unwrap();
                prop_assert!(ratio >= WAD);
                prop_assert!(ratio <= math::bps_to_wad(params.excess_threshold_bps));
            }

            prop_assert_eq!(plan, plan_rebase(&params, &inputs).unwrap());
        }
    }
}
