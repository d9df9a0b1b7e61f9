use tracing::info;

use common::{ExposureState, RiskConfig};

/// Capital available for new positions.
///
/// With auto-adjust off the configured base limit applies unmodified and the
/// accumulated adjustment is ignored. With it on, the limit is the base plus
/// the adjustment, floored at zero. A depleted limit makes no new position
/// affordable; that is the intended brake, not an error.
pub fn effective_limit(config: &RiskConfig, state: &ExposureState) -> f64 {
    if !config.auto_adjust_exposure {
        return config.max_usdc_exposure;
    }
    (config.max_usdc_exposure + state.adjustment_usdc).max(0.0)
}

/// Feed the realized PnL of a close into the exposure adjustment.
///
/// Profits grow the adjustment by `reinvest_pct` percent of the gain; losses
/// shrink it by the full amount. The asymmetry is deliberate: capacity decays
/// fully on drawdown and recovers only partially on wins.
pub fn apply_close(state: &mut ExposureState, pnl_usdc: f64, reinvest_pct: f64, auto_adjust: bool) {
    if !auto_adjust {
        return;
    }

    let delta = if pnl_usdc >= 0.0 {
        pnl_usdc * reinvest_pct / 100.0
    } else {
        pnl_usdc
    };
    state.adjustment_usdc = round6(state.adjustment_usdc + delta);

    info!(
        pnl_usdc,
        delta,
        adjustment_usdc = state.adjustment_usdc,
        "Exposure adjustment updated"
    );
}

fn round6(x: f64) -> f64 {
    (x * 1e6).round() / 1e6
}
