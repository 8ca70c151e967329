//! Rolling-window helpers shared by the band and oscillator indicators.
//!
//! Output at t covers values[t-window+1..=t]. Lookback: window - 1.
//! Any NaN inside a window makes that window's output NaN.

/// Rolling arithmetic mean over a fixed window.
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if window == 0 || n < window {
        return result;
    }

    for i in (window - 1)..n {
        let slice = &values[i + 1 - window..=i];
        if slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        result[i] = slice.iter().sum::<f64>() / window as f64;
    }

    result
}

/// Rolling sample standard deviation (divide by N-1).
///
/// A window of 1 has no sample deviation and yields NaN.
pub fn rolling_sample_std(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if window < 2 || n < window {
        return result;
    }

    for i in (window - 1)..n {
        let slice = &values[i + 1 - window..=i];
        if slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        let mean = slice.iter().sum::<f64>() / window as f64;
        let var = slice.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / (window - 1) as f64;
        result[i] = var.sqrt();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn rolling_mean_3_known_values() {
        let result = rolling_mean(&[10.0, 11.0, 12.0, 13.0, 14.0], 3);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 11.0, DEFAULT_EPSILON);
        assert_approx(result[4], 13.0, DEFAULT_EPSILON);
    }

    #[test]
    fn rolling_mean_skips_windows_with_nan() {
        let result = rolling_mean(&[1.0, f64::NAN, 3.0, 5.0, 7.0], 2);
        assert!(result[1].is_nan());
        assert!(result[2].is_nan());
        assert_approx(result[3], 4.0, DEFAULT_EPSILON);
        assert_approx(result[4], 6.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sample_std_uses_n_minus_one() {
        // [2, 4, 4, 4, 5, 5, 7, 9]: sample variance = 32 / 7
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let result = rolling_sample_std(&values, 8);
        assert_approx(result[7], (32.0_f64 / 7.0).sqrt(), 1e-12);
    }

    #[test]
    fn short_series_is_all_nan() {
        assert!(rolling_mean(&[1.0, 2.0], 3).iter().all(|v| v.is_nan()));
        assert!(rolling_sample_std(&[1.0, 2.0], 1).iter().all(|v| v.is_nan()));
    }
}
