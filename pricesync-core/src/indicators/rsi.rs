//! Relative Strength Index (RSI).
//!
//! Uses Wilder smoothing of average gains and average losses.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period.
//!
//! The ratio is evaluated with plain IEEE arithmetic and never special-cased:
//! avg_loss == 0 with avg_gain > 0 gives RS = inf and RSI = 100 exactly, and
//! a flat run gives 0/0 = NaN, which is surfaced as a null sample rather than
//! a synthetic 50.

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub const DEFAULT_PERIOD: usize = 14;

    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Number of leading closes that can never carry a value.
    pub fn lookback(&self) -> usize {
        self.period
    }

    /// Compute RSI for a close series ordered by date ascending.
    ///
    /// Returns a `Vec<f64>` of the same length as `closes`; the first
    /// `period` entries are NaN, as is every entry when fewer than
    /// `period + 1` closes are given. Non-finite closes propagate as NaN.
    pub fn compute(&self, closes: &[f64]) -> Vec<f64> {
        let n = closes.len();
        let period = self.period;
        let mut result = vec![f64::NAN; n];

        if n < period + 1 {
            return result;
        }

        let (gains, losses): (Vec<f64>, Vec<f64>) = closes
            .windows(2)
            .map(|w| split_change(w[1] - w[0]))
            .unzip();

        // gains[k] is the change into closes[k + 1]; the seed covers closes[1..=period].
        let p = period as f64;
        let mut avg_gain = gains[..period].iter().sum::<f64>() / p;
        let mut avg_loss = losses[..period].iter().sum::<f64>() / p;
        result[period] = rsi_from_averages(avg_gain, avg_loss);

        for i in (period + 1)..n {
            avg_gain = (avg_gain * (p - 1.0) + gains[i - 1]) / p;
            avg_loss = (avg_loss * (p - 1.0) + losses[i - 1]) / p;
            result[i] = rsi_from_averages(avg_gain, avg_loss);
        }

        result
    }

    /// Same as [`Rsi::compute`], with every undefined value mapped to `None`.
    pub fn samples(&self, closes: &[f64]) -> Vec<Option<f64>> {
        nullable(self.compute(closes))
    }
}

impl Default for Rsi {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PERIOD)
    }
}

/// Map NaN to `None`. Storage has no NaN, only NULL.
pub fn nullable(values: Vec<f64>) -> Vec<Option<f64>> {
    values
        .into_iter()
        .map(|v| if v.is_nan() { None } else { Some(v) })
        .collect()
}

fn split_change(delta: f64) -> (f64, f64) {
    if delta.is_nan() {
        (f64::NAN, f64::NAN)
    } else {
        (delta.max(0.0), (-delta).max(0.0))
    }
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::assert_approx;

    fn rising(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn rsi_all_gains_is_exactly_100() {
        let result = Rsi::new(14).compute(&rising(15));
        assert_eq!(result[14], 100.0);
    }

    #[test]
    fn rsi_all_losses_is_zero() {
        let closes: Vec<f64> = (0..6).map(|i| 105.0 - i as f64).collect();
        let result = Rsi::new(3).compute(&closes);
        assert_approx(result[3], 0.0, 1e-12);
        assert_approx(result[5], 0.0, 1e-12);
    }

    #[test]
    fn flat_run_is_null_not_fifty() {
        let samples = Rsi::new(14).samples(&[10.0; 15]);
        assert_eq!(samples.len(), 15);
        assert!(samples.iter().all(Option::is_none));
    }

    #[test]
    fn seed_threshold() {
        let rsi = Rsi::new(14);

        let short = rsi.samples(&rising(14));
        assert!(short.iter().all(Option::is_none));

        let exact = rsi.samples(&rising(15));
        let non_null: Vec<usize> = exact
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|_| i))
            .collect();
        assert_eq!(non_null, vec![14]);
    }

    #[test]
    fn rsi_mixed_seed_value() {
        // Changes: +0.34, -0.25, -0.48 → avg_gain = 0.34/3, avg_loss = 0.73/3
        let closes = [44.0, 44.34, 44.09, 43.61, 44.33];
        let result = Rsi::new(3).compute(&closes);

        assert!(result[..3].iter().all(|v| v.is_nan()));
        let expected_seed = 100.0 - 100.0 / (1.0 + 0.34 / 0.73);
        assert_approx(result[3], expected_seed, 1e-9);

        // Wilder step for the +0.72 change
        let g = (0.34 / 3.0 * 2.0 + 0.72) / 3.0;
        let l = (0.73 / 3.0 * 2.0 + 0.0) / 3.0;
        assert_approx(result[4], 100.0 - 100.0 / (1.0 + g / l), 1e-9);
    }

    #[test]
    fn smoothing_is_recursive_not_windowed() {
        // After the seed, a single large loss keeps weighing on later values
        // even once it has left any 3-bar window.
        let closes = [10.0, 11.0, 12.0, 13.0, 5.0, 6.0, 7.0, 8.0, 9.0];
        let result = Rsi::new(3).compute(&closes);
        assert!(result[8] < 100.0);
        assert!(result[8] > 0.0);
    }

    #[test]
    fn rsi_bounds() {
        let closes = [100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0];
        let result = Rsi::new(3).compute(&closes);
        for (i, &v) in result.iter().enumerate() {
            if !v.is_nan() {
                assert!(
                    (0.0..=100.0).contains(&v),
                    "RSI out of bounds at bar {i}: {v}"
                );
            }
        }
    }

    #[test]
    fn rsi_nan_propagation() {
        let closes = [100.0, 101.0, f64::NAN, 103.0, 104.0, 105.0];
        let result = Rsi::new(3).compute(&closes);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn empty_input() {
        assert!(Rsi::default().compute(&[]).is_empty());
    }

    #[test]
    fn lookback_and_name() {
        let rsi = Rsi::default();
        assert_eq!(rsi.lookback(), 14);
        assert_eq!(rsi.name(), "rsi_14");
    }
}
