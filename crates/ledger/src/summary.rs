use chrono::{DateTime, Utc};

use common::{ClosedTrade, ExposureState, RiskConfig, Summary};

use crate::round_dp;

/// Recompute the portfolio summary from scratch.
///
/// Always derived wholesale from the closed-trade history and the exposure
/// state, never patched incrementally, so a stored summary can be stale at
/// worst but never wrong; a torn write is repaired by the next
/// recomputation.
pub fn compute(
    closed: &[ClosedTrade],
    open_count: usize,
    config: &RiskConfig,
    exposure: &ExposureState,
    now: DateTime<Utc>,
    last_tick: Option<DateTime<Utc>>,
) -> Summary {
    let total: f64 = closed.iter().map(|t| t.pnl_usdc).sum();

    let today = now.date_naive();
    let today_pnl: f64 = closed
        .iter()
        .filter(|t| t.exit_time.date_naive() == today)
        .map(|t| t.pnl_usdc)
        .sum();

    let wins = closed.iter().filter(|t| t.pnl_usdc > 0.0).count();
    let (win_rate, avg_pnl) = if closed.is_empty() {
        (0.0, 0.0)
    } else {
        (
            round_dp(100.0 * wins as f64 / closed.len() as f64, 2),
            round_dp(total / closed.len() as f64, 6),
        )
    };

    // Worst peak-to-trough decline of the cumulative PnL curve, walked in
    // chronological order. Reported as a non-negative magnitude.
    let mut cum = 0.0f64;
    let mut peak = 0.0f64;
    let mut worst = 0.0f64;
    for trade in closed {
        cum += trade.pnl_usdc;
        peak = peak.max(cum);
        worst = worst.min(cum - peak);
    }

    Summary {
        open_count,
        closed_count: closed.len(),
        realized_pnl_usdc_total: round_dp(total, 6),
        realized_pnl_usdc_today: round_dp(today_pnl, 6),
        win_rate,
        avg_pnl_usdc: avg_pnl,
        max_drawdown_usdc: round_dp(-worst, 6),
        base_exposure_usdc: config.max_usdc_exposure,
        adjustment_usdc: exposure.adjustment_usdc,
        effective_max_usdc_exposure: risk::effective_limit(config, exposure),
        reinvest_profit_pct: config.reinvest_profit_pct,
        last_tick_time: last_tick,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::OrderSide;

    fn closed_with_pnl(pnl: f64, exit_time: DateTime<Utc>) -> ClosedTrade {
        ClosedTrade {
            id: uuid::Uuid::new_v4().to_string(),
            symbol: "BTCUSDC".into(),
            side: OrderSide::Buy,
            qty: 1.0,
            entry_price: 100.0,
            exit_price: 100.0 + pnl,
            notional_usdc: 100.0,
            pnl_usdc: pnl,
            pnl_pct: pnl,
            entry_time: exit_time - chrono::Duration::minutes(5),
            exit_time,
            duration_sec: 300.0,
        }
    }

    #[test]
    fn empty_history_yields_zeroed_statistics() {
        let cfg = RiskConfig::default();
        let summary = compute(&[], 0, &cfg, &ExposureState::default(), Utc::now(), None);
        assert_eq!(summary.win_rate, 0.0);
        assert_eq!(summary.avg_pnl_usdc, 0.0);
        assert_eq!(summary.max_drawdown_usdc, 0.0);
        assert_eq!(summary.realized_pnl_usdc_total, 0.0);
        assert_eq!(summary.effective_max_usdc_exposure, cfg.max_usdc_exposure);
    }

    #[test]
    fn drawdown_tracks_worst_peak_to_trough_decline() {
        let now = Utc::now();
        let closed: Vec<ClosedTrade> = [10.0, -5.0, -10.0, 20.0]
            .iter()
            .map(|&pnl| closed_with_pnl(pnl, now))
            .collect();

        let cfg = RiskConfig::default();
        let summary = compute(&closed, 0, &cfg, &ExposureState::default(), now, None);

        // cumulative: 10, 5, -5, 15; worst decline from the peak of 10 is 15
        assert_eq!(summary.max_drawdown_usdc, 15.0);
        assert_eq!(summary.realized_pnl_usdc_total, 15.0);
        assert_eq!(summary.win_rate, 50.0);
        assert_eq!(summary.avg_pnl_usdc, 3.75);
        assert_eq!(summary.closed_count, 4);
    }

    #[test]
    fn today_pnl_excludes_older_closes() {
        let now = Utc::now();
        let closed = vec![
            closed_with_pnl(7.0, now),
            closed_with_pnl(100.0, now - chrono::Duration::days(2)),
        ];
        let cfg = RiskConfig::default();
        let summary = compute(&closed, 0, &cfg, &ExposureState::default(), now, None);
        assert_eq!(summary.realized_pnl_usdc_today, 7.0);
        assert_eq!(summary.realized_pnl_usdc_total, 107.0);
    }

    #[test]
    fn summary_reflects_exposure_adjustment() {
        let cfg = RiskConfig {
            max_usdc_exposure: 100.0,
            ..RiskConfig::default()
        };
        let exposure = ExposureState {
            adjustment_usdc: -15.0,
        };
        let summary = compute(&[], 0, &cfg, &exposure, Utc::now(), None);
        assert_eq!(summary.base_exposure_usdc, 100.0);
        assert_eq!(summary.adjustment_usdc, -15.0);
        assert_eq!(summary.effective_max_usdc_exposure, 85.0);
    }
}
