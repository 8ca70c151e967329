//! Indicator precomputation.
//!
//! All indicators are computed once before the bar loop begins. Series that
//! arrive with the input (precomputed columns) take precedence and are never
//! recomputed.

use crate::components::entry::EntryFilter;
use crate::components::indicator::{Indicator, IndicatorValues};
use crate::domain::Bar;

/// Fill `values` with every indicator `filter` reads that is not already present.
pub fn precompute_indicators(
    bars: &[Bar],
    filter: &dyn EntryFilter,
    mut values: IndicatorValues,
) -> IndicatorValues {
    let indicators = filter.indicators();
    values.compute_missing(&indicators, bars);
    values
}

/// Maximum lookback across a set of indicators.
pub fn compute_warmup(indicators: &[Box<dyn Indicator>]) -> usize {
    indicators.iter().map(|i| i.lookback()).max().unwrap_or(0)
}
