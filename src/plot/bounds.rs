//! Display range for a four-point trend series.

use crate::domain::Series;

/// Range used when a series has no positive value to scale to.
pub const FALLBACK_BOUNDS: Bounds = Bounds { min: 0, max: 1000 };

/// Inclusive y-axis range for a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min: i64,
    pub max: i64,
}

/// `[floor(min * 0.95), ceil(max * 1.05)]` over the positive values.
///
/// Zero and negative values are treated as gaps; a series without any positive
/// value gets [`FALLBACK_BOUNDS`].
pub fn trend_bounds(values: &[i64]) -> Bounds {
    let mut positive = values.iter().copied().filter(|v| *v > 0);
    let Some(first) = positive.next() else {
        return FALLBACK_BOUNDS;
    };
    let (min, max) = positive.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));

    // Integer arithmetic keeps 5% padding exact for currency amounts.
    let lo = i128::from(min) * 95 / 100;
    let hi = (i128::from(max) * 105 + 99) / 100;
    Bounds {
        min: i64::try_from(lo).unwrap_or(i64::MAX),
        max: i64::try_from(hi).unwrap_or(i64::MAX),
    }
}

/// [`trend_bounds`] over a series, absent slots counting as 0.
pub fn series_bounds(series: &Series) -> Bounds {
    trend_bounds(&series.values())
}
