//! Sample statistics over plain return slices.
//!
//! Dispersion measures use the sample (n-1) denominator and return `None`
//! when fewer than two observations are available.

use std::collections::VecDeque;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn variance(values: &[f64]) -> Option<f64> {
    covariance(values, values)
}

pub fn std_dev(values: &[f64]) -> Option<f64> {
    variance(values).map(f64::sqrt)
}

/// Sample covariance of two equally long slices.
pub fn covariance(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() || a.len() < 2 {
        return None;
    }
    let mean_a = mean(a)?;
    let mean_b = mean(b)?;
    let sum: f64 = a
        .iter()
        .zip(b)
        .map(|(x, y)| (x - mean_a) * (y - mean_b))
        .sum();
    Some(sum / (a.len() - 1) as f64)
}

/// Pearson correlation, `None` when either side has zero variance.
pub fn pearson(a: &[f64], b: &[f64]) -> Option<f64> {
    let cov = covariance(a, b)?;
    let denom = (variance(a)? * variance(b)?).sqrt();
    if denom == 0.0 {
        return None;
    }
    Some((cov / denom).clamp(-1.0, 1.0))
}

/// Percentile `q` in [0, 100] with linear interpolation between order
/// statistics: rank = q/100 * (n-1).
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=100.0).contains(&q) {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = q / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

/// Fixed-capacity trailing window with a running sum.
///
/// The running sum drifts once values leave the window, so a window holding
/// one repeated value reports that value exactly instead of `sum / n`.
#[derive(Debug, Clone)]
pub struct RollingWindow {
    capacity: usize,
    buffer: VecDeque<f64>,
    sum: f64,
    // Length of the trailing run of identical values.
    equal_run: usize,
}

impl RollingWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            buffer: VecDeque::with_capacity(capacity),
            sum: 0.0,
            equal_run: 0,
        }
    }

    pub fn push(&mut self, value: f64) {
        if self.capacity == 0 {
            return;
        }
        if self.buffer.len() == self.capacity {
            if let Some(old) = self.buffer.pop_front() {
                self.sum -= old;
            }
        }
        if self.buffer.back() == Some(&value) {
            self.equal_run += 1;
        } else {
            self.equal_run = 1;
        }
        self.buffer.push_back(value);
        self.sum += value;
    }

    pub fn is_full(&self) -> bool {
        self.capacity > 0 && self.buffer.len() == self.capacity
    }

    /// Mean of the window once it is full.
    pub fn mean(&self) -> Option<f64> {
        if !self.is_full() {
            return None;
        }
        if self.equal_run >= self.buffer.len() {
            return self.buffer.back().copied();
        }
        Some(self.sum / self.capacity as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn sample_std_dev() {
        // sample variance of [2,4,4,4,5,5,7,9] = 32/7
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_abs_diff_eq!(std_dev(&values).unwrap(), (32.0_f64 / 7.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn std_dev_needs_two_points() {
        assert_eq!(std_dev(&[1.0]), None);
    }

    #[test]
    fn pearson_perfect_correlation() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [2.0, 4.0, 6.0, 8.0];
        let c = [8.0, 6.0, 4.0, 2.0];
        assert_abs_diff_eq!(pearson(&a, &b).unwrap(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(pearson(&a, &c).unwrap(), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn pearson_zero_variance_is_none() {
        assert_eq!(pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]), None);
    }

    #[test]
    fn percentile_interpolates() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        // rank = 0.05 * 4 = 0.2
        assert_abs_diff_eq!(percentile(&values, 5.0).unwrap(), 1.2, epsilon = 1e-12);
        assert_abs_diff_eq!(percentile(&values, 50.0).unwrap(), 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(percentile(&values, 100.0).unwrap(), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn percentile_ignores_input_order() {
        let values = [5.0, 1.0, 4.0, 2.0, 3.0];
        assert_abs_diff_eq!(percentile(&values, 25.0).unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn rolling_window_mean_after_fill() {
        let mut window = RollingWindow::new(3);
        window.push(1.0);
        window.push(2.0);
        assert_eq!(window.mean(), None);
        window.push(3.0);
        assert_abs_diff_eq!(window.mean().unwrap(), 2.0, epsilon = 1e-12);
        window.push(10.0);
        assert_abs_diff_eq!(window.mean().unwrap(), 5.0, epsilon = 1e-12);
    }

    #[test]
    fn uniform_window_mean_is_exact_after_noise() {
        let mut window = RollingWindow::new(2);
        for value in [0.1, 0.2, 0.0, 0.0] {
            window.push(value);
        }
        assert_eq!(window.mean(), Some(0.0));

        let mut window = RollingWindow::new(3);
        for value in [101.13, 99.87, 100.41, 101.22, 101.22, 101.22] {
            window.push(value);
        }
        assert_eq!(window.mean(), Some(101.22));
    }

    #[test]
    fn broken_run_falls_back_to_running_sum() {
        let mut window = RollingWindow::new(3);
        for value in [4.0, 4.0, 4.0, 1.0] {
            window.push(value);
        }
        assert_abs_diff_eq!(window.mean().unwrap(), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_capacity_window_never_fills() {
        let mut window = RollingWindow::new(0);
        window.push(1.0);
        assert!(!window.is_full());
        assert_eq!(window.mean(), None);
    }
}
