// programs/strata_rebase/src/engine/backstop.rs

use anchor_lang::prelude::*;
use strata_core::math::{checked_add, checked_sub};
use strata_core::TrancheKind;

use super::TrancheBalances;

/// Providers drawn on to cover a Senior deficit, first to last
pub const BACKSTOP_ORDER: [TrancheKind; 2] = [TrancheKind::Reserve, TrancheKind::Junior];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BackstopResult {
    pub deficit: u128,
    pub from_reserve: u128,
    pub from_junior: u128,
    /// Part of the deficit no provider could cover
    pub shortfall: u128,
}

impl BackstopResult {
    pub fn provided(&self) -> u128 {
        self.from_reserve + self.from_junior
    }

    /// Junior and Reserve were exhausted before Senior reached target
    pub fn is_insufficient(&self) -> bool {
        self.shortfall > 0
    }

    pub fn provided_by(&self, kind: TrancheKind) -> u128 {
        match kind {
            TrancheKind::Reserve => self.from_reserve,
            TrancheKind::Junior => self.from_junior,
            TrancheKind::Senior => 0,
        }
    }
}

/// Restore Senior to `target` by drawing on Reserve, then Junior.
///
/// Each provider gives `min(available, remaining)`. A remaining shortfall is
/// reported in the result, not raised as an error.
pub fn execute_backstop(balances: &mut TrancheBalances, target: u128) -> Result<BackstopResult> {
    let deficit = target.saturating_sub(balances.senior);
    let mut result = BackstopResult {
        deficit,
        ..Default::default()
    };
    if deficit == 0 {
        return Ok(result);
    }

    let mut next = *balances;
    let mut remaining = deficit;

    for kind in BACKSTOP_ORDER {
        if remaining == 0 {
            break;
        }

        let available = next.value_of(kind);
        let draw = available.min(remaining);
        if draw == 0 {
            continue;
        }

        *next.value_of_mut(kind) = checked_sub(available, draw)?;
        next.senior = checked_add(next.senior, draw)?;
        remaining -= draw;

        match kind {
            TrancheKind::Reserve => result.from_reserve = draw,
            TrancheKind::Junior => result.from_junior = draw,
            TrancheKind::Senior => {}
        }
    }

    result.shortfall = remaining;
    *balances = next;

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use strata_core::math::from_units;

    #[test]
    fn test_reserve_covers_whole_deficit() {
        let mut balances = TrancheBalances {
            senior: from_units(10_000_000),
            junior: from_units(1_000_000),
            reserve: from_units(625_000),
        };
        let result = execute_backstop(&mut balances, from_units(10_029_000)).unwrap();

        assert_eq!(result.deficit, from_units(29_000));
        assert_eq!(result.from_reserve, from_units(29_000));
        assert_eq!(result.from_junior, 0);
        assert!(!result.is_insufficient());
        assert_eq!(balances.senior, from_units(10_029_000));
        assert_eq!(balances.reserve, from_units(596_000));
        assert_eq!(balances.junior, from_units(1_000_000));
    }

    #[test]
    fn test_junior_covers_after_reserve_drained() {
        let mut balances = TrancheBalances {
            senior: from_units(900),
            junior: from_units(500),
            reserve: from_units(30),
        };
        let result = execute_backstop(&mut balances, from_units(1_000)).unwrap();

        assert_eq!(result.from_reserve, from_units(30));
        assert_eq!(result.from_junior, from_units(70));
        assert_eq!(result.shortfall, 0);
        assert_eq!(balances.reserve, 0);
        assert_eq!(balances.junior, from_units(430));
        assert_eq!(balances.senior, from_units(1_000));
    }

    #[test]
    fn test_insufficient_drains_both_and_flags() {
        let mut balances = TrancheBalances {
            senior: from_units(800),
            junior: from_units(50),
            reserve: from_units(25),
        };
        let result = execute_backstop(&mut balances, from_units(1_000)).unwrap();

        assert_eq!(result.provided(), from_units(75));
        assert_eq!(result.shortfall, from_units(125));
        assert!(result.is_insufficient());
        assert_eq!(balances.junior, 0);
        assert_eq!(balances.reserve, 0);
        assert_eq!(balances.senior, from_units(875));
    }

    #[test]
    fn test_no_deficit_is_noop() {
        let mut balances = TrancheBalances {
            senior: from_units(1_000),
            junior: from_units(1),
            reserve: from_units(1),
        };
        let result = execute_backstop(&mut balances, from_units(1_000)).unwrap();
        assert_eq!(result.provided(), 0);
        assert_eq!(balances.reserve, from_units(1));
    }

    proptest! {
        #[test]
        fn backstop_never_overdraws_and_conserves(
            senior in 0u128..1u128 << 100,
            junior in 0u128..1u128 << 100,
            reserve in 0u128..1u128 << 100,
            target in 0u128..1u128 << 100,
        ) {
            let mut balances = TrancheBalances { senior, junior, reserve };
            let before = balances.total().unwrap();
            let result = execute_backstop(&mut balances, target).unwrap();

            prop_assert!(result.from_reserve <= reserve);
            prop_assert!(result.from_junior <= junior);
            prop_assert_eq!(result.provided() + result.shortfall, result.deficit);
            prop_assert_eq!(balances.total().unwrap(), before);
            // Junior is only touched once Reserve is empty
            if result.from_junior > 0 {
                prop_assert_eq!(balances.reserve, 0);
            }
            if !result.is_insufficient() {
                prop_assert_eq!(balances.senior, senior.max(target));
            }
        }
    }
}
