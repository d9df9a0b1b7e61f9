/// Simple moving average crossover indicator.
///
/// Compares a fast SMA against a slow SMA on the latest bar and on the bar
/// before it. A signal fires only when the two averages change relative
/// order between those bars.
#[derive(Debug, Clone, Copy)]
pub struct SmaCrossover {
    pub fast: usize,
    pub slow: usize,
}

/// The result of a crossover computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossoverSignal {
    Bullish, // fast SMA crossed above slow SMA
    Bearish, // fast SMA crossed below slow SMA
    Neutral, // no crossover on the latest bar
}

impl SmaCrossover {
    pub fn new(fast: usize, slow: usize) -> Self {
        assert!(fast >= 1, "crossover fast period must be >= 1");
        assert!(
            fast < slow,
            "crossover fast period must be less than slow period"
        );
        Self { fast, slow }
    }

    /// Compute the crossover signal from a slice of close prices (oldest
    /// first). Returns `None` with fewer than `slow + 1` observations:
    /// insufficient history, not an error.
    ///
    /// The previous-bar comparison uses `<=`/`>=` so a cross can fire when
    /// the two averages were exactly equal on the prior bar.
    pub fn compute(&self, closes: &[f64]) -> Option<CrossoverSignal> {
        if closes.len() < self.slow + 1 {
            return None;
        }

        let n = closes.len();
        let fast = mean(&closes[n - self.fast..]);
        let slow = mean(&closes[n - self.slow..]);
        let fast_prev = mean(&closes[n - self.fast - 1..n - 1]);
        let slow_prev = mean(&closes[n - self.slow - 1..n - 1]);

        if fast_prev <= slow_prev && fast > slow {
            Some(CrossoverSignal::Bullish)
        } else if fast_prev >= slow_prev && fast < slow {
            Some(CrossoverSignal::Bearish)
        } else {
            Some(CrossoverSignal::Neutral)
        }
    }
}

impl Default for SmaCrossover {
    fn default() -> Self {
        Self::new(20, 60)
    }
}

fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 60 flat bars followed by one bar at `last`.
    fn flat_then(last: f64) -> Vec<f64> {
        let mut prices = vec![100.0; 60];
        prices.push(last);
        prices
    }

    #[test]
    fn returns_none_with_insufficient_history() {
        let cross = SmaCrossover::default();
        // 60 bars is one short of the 61 the default windows need
        let prices = vec![100.0; 60];
        assert!(cross.compute(&prices).is_none());
    }

    #[test]
    fn rising_last_bar_is_bullish() {
        let cross = SmaCrossover::default();
        // Flat history: both previous averages equal (boundary <= holds),
        // then a jump pushes the fast mean above the slow mean.
        let signal = cross.compute(&flat_then(110.0));
        assert_eq!(signal, Some(CrossoverSignal::Bullish));
    }

    #[test]
    fn falling_last_bar_is_bearish() {
        let cross = SmaCrossover::default();
        let signal = cross.compute(&flat_then(90.0));
        assert_eq!(signal, Some(CrossoverSignal::Bearish));
    }

    #[test]
    fn flat_series_is_neutral() {
        let cross = SmaCrossover::default();
        let prices = vec![100.0; 61];
        assert_eq!(cross.compute(&prices), Some(CrossoverSignal::Neutral));
    }

    #[test]
    fn steady_uptrend_does_not_re_fire() {
        // Fast already above slow with no order change between bars
        let cross = SmaCrossover::new(3, 6);
        let prices: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        assert_eq!(cross.compute(&prices), Some(CrossoverSignal::Neutral));
    }

    #[test]
    fn exactly_slow_plus_one_bars_is_enough() {
        let cross = SmaCrossover::new(2, 4);
        let prices = vec![10.0, 10.0, 10.0, 10.0, 12.0];
        assert_eq!(cross.compute(&prices), Some(CrossoverSignal::Bullish));
    }

    #[test]
    #[should_panic(expected = "fast period must be less than slow")]
    fn rejects_inverted_windows() {
        let _ = SmaCrossover::new(60, 20);
    }
}
