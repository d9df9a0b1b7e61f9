use proptest::prelude::*;

use common::{ExposureState, RiskConfig};
use risk::{apply_close, effective_limit};

fn config(base: f64, reinvest: f64) -> RiskConfig {
    RiskConfig {
        max_usdc_exposure: base,
        reinvest_profit_pct: reinvest,
        auto_adjust_exposure: true,
        ..RiskConfig::default()
    }
}

proptest! {
    /// The effective limit is never negative, whatever sequence of wins and
    /// losses has been applied.
    #[test]
    fn effective_limit_is_non_negative(
        base in 0.0f64..100_000.0f64,
        reinvest in 0.0f64..100.0f64,
        pnls in prop::collection::vec(-10_000.0f64..10_000.0f64, 0..50),
    ) {
        let cfg = config(base, reinvest);
        let mut state = ExposureState::default();
        for pnl in pnls {
            apply_close(&mut state, pnl, reinvest, true);
            prop_assert!(effective_limit(&cfg, &state) >= 0.0);
        }
    }

    /// A loss always moves the adjustment down by exactly its own size
    /// (modulo the stored 6-dp rounding).
    #[test]
    fn losses_deduct_in_full(
        start in -1_000.0f64..1_000.0f64,
        loss in -10_000.0f64..-0.01f64,
        reinvest in 0.0f64..100.0f64,
    ) {
        let mut state = ExposureState { adjustment_usdc: start };
        apply_close(&mut state, loss, reinvest, true);
        prop_assert!((state.adjustment_usdc - (start + loss)).abs() < 1e-6);
    }

    /// A win never credits more than the full profit.
    #[test]
    fn wins_credit_at_most_the_profit(
        win in 0.0f64..10_000.0f64,
        reinvest in 0.0f64..100.0f64,
    ) {
        let mut state = ExposureState::default();
        apply_close(&mut state, win, reinvest, true);
        prop_assert!(state.adjustment_usdc >= 0.0);
        prop_assert!(state.adjustment_usdc <= win + 1e-6);
    }
}
