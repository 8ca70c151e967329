//! Bollinger Bands, band width and squeeze flag.
//!
//! - Middle: rolling mean(close, window)
//! - Upper/Lower: middle ± multiplier × rolling sample stddev(close, window)
//! - Width: (upper - lower) / middle
//! - Squeeze: 1.0 when width < ratio × rolling mean(width, squeeze_lookback), else 0.0
//!
//! Bands and width have lookback window - 1. The squeeze flag is NaN until
//! the width average is defined (window - 1 + squeeze_lookback - 1 bars).

use crate::components::indicator::Indicator;
use crate::domain::Bar;

use super::rolling::{rolling_mean, rolling_sample_std};

/// Which Bollinger output series to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollingerOutput {
    Upper,
    Middle,
    Lower,
    Width,
    Squeeze,
}

impl BollingerOutput {
    fn tag(&self) -> &'static str {
        match self {
            BollingerOutput::Upper => "upper",
            BollingerOutput::Middle => "middle",
            BollingerOutput::Lower => "lower",
            BollingerOutput::Width => "width",
            BollingerOutput::Squeeze => "squeeze",
        }
    }
}

/// Shape of the bands and of the squeeze test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerParams {
    pub window: usize,
    pub multiplier: f64,
    pub squeeze_lookback: usize,
    pub squeeze_ratio: f64,
}

impl Default for BollingerParams {
    fn default() -> Self {
        Self {
            window: 20,
            multiplier: 2.0,
            squeeze_lookback: 50,
            squeeze_ratio: 0.75,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    params: BollingerParams,
    output: BollingerOutput,
    name: String,
}

impl Bollinger {
    pub fn new(params: BollingerParams, output: BollingerOutput) -> Self {
        assert!(params.window >= 2, "Bollinger window must be >= 2");
        assert!(
            params.squeeze_lookback >= 1,
            "Bollinger squeeze lookback must be >= 1"
        );
        Self {
            params,
            output,
            name: Self::key(&params, output),
        }
    }

    pub fn key(params: &BollingerParams, output: BollingerOutput) -> String {
        let BollingerParams {
            window,
            multiplier,
            squeeze_lookback,
            squeeze_ratio,
        } = params;
        match output {
            BollingerOutput::Squeeze => format!(
                "bollinger_squeeze_{window}_{multiplier}_{squeeze_lookback}_{squeeze_ratio}"
            ),
            other => format!("bollinger_{}_{window}_{multiplier}", other.tag()),
        }
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.output {
            BollingerOutput::Squeeze => self.params.window + self.params.squeeze_lookback - 2,
            _ => self.params.window - 1,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let p = &self.params;
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let middle = rolling_mean(&closes, p.window);
        if self.output == BollingerOutput::Middle {
            return middle;
        }

        let std = rolling_sample_std(&closes, p.window);
        let band = |sign: f64| -> Vec<f64> {
            middle
                .iter()
                .zip(&std)
                .map(|(m, s)| m + sign * p.multiplier * s)
                .collect()
        };

        match self.output {
            BollingerOutput::Upper => band(1.0),
            BollingerOutput::Lower => band(-1.0),
            BollingerOutput::Width | BollingerOutput::Squeeze => {
                let upper = band(1.0);
                let lower = band(-1.0);
                let width: Vec<f64> = upper
                    .iter()
                    .zip(&lower)
                    .zip(&middle)
                    .map(|((u, l), m)| (u - l) / m)
                    .collect();
                if self.output == BollingerOutput::Width {
                    return width;
                }
                let avg_width = rolling_mean(&width, p.squeeze_lookback);
                width
                    .iter()
                    .zip(&avg_width)
                    .map(|(w, avg)| {
                        if w.is_nan() || avg.is_nan() {
                            f64::NAN
                        } else if *w < p.squeeze_ratio * avg {
                            1.0
                        } else {
                            0.0
                        }
                    })
                    .collect()
            }
            BollingerOutput::Middle => middle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars};

    fn params(window: usize, squeeze_lookback: usize) -> BollingerParams {
        BollingerParams {
            window,
            multiplier: 2.0,
            squeeze_lookback,
            squeeze_ratio: 0.75,
        }
    }

    #[test]
    fn bands_known_values() {
        // closes 1, 2, 3: mean 2, sample std 1
        let bars = make_bars(&[1.0, 2.0, 3.0]);
        let p = params(3, 2);
        let upper = Bollinger::new(p, BollingerOutput::Upper).compute(&bars);
        let middle = Bollinger::new(p, BollingerOutput::Middle).compute(&bars);
        let lower = Bollinger::new(p, BollingerOutput::Lower).compute(&bars);
        let width = Bollinger::new(p, BollingerOutput::Width).compute(&bars);

        assert!(upper[1].is_nan());
        assert_approx(middle[2], 2.0, 1e-12);
        assert_approx(upper[2], 4.0, 1e-12);
        assert_approx(lower[2], 0.0, 1e-12);
        assert_approx(width[2], 2.0, 1e-12);
    }

    #[test]
    fn squeeze_fires_when_width_contracts() {
        // Volatile start, then a flat tail: width collapses below its average.
        let mut closes = vec![100.0, 110.0, 95.0, 112.0, 90.0, 108.0];
        closes.extend(std::iter::repeat(100.0).take(6));
        let bars = make_bars(&closes);
        let p = params(3, 4);
        let squeeze = Bollinger::new(p, BollingerOutput::Squeeze).compute(&bars);

        // width defined from bar 2, average of 4 widths from bar 5
        assert!(squeeze[4].is_nan());
        assert_eq!(squeeze[5], 0.0);
        assert_eq!(*squeeze.last().unwrap(), 0.0, "flat width equals its own average");
        assert!(squeeze[8..].iter().any(|&s| s == 1.0));
    }

    #[test]
    fn squeeze_lookback_combines_windows() {
        let p = params(20, 50);
        assert_eq!(Bollinger::new(p, BollingerOutput::Squeeze).lookback(), 68);
        assert_eq!(Bollinger::new(p, BollingerOutput::Upper).lookback(), 19);
    }

    #[test]
    fn keys_are_distinct_per_output() {
        let p = BollingerParams::default();
        assert_eq!(Bollinger::key(&p, BollingerOutput::Upper), "bollinger_upper_20_2");
        assert_eq!(
            Bollinger::key(&p, BollingerOutput::Squeeze),
            "bollinger_squeeze_20_2_50_0.75"
        );
    }
}
