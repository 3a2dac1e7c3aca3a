//! Rolling maximum and minimum over a fixed window.
//!
//! Outputs are aligned with the input: the first `window - 1` positions are
//! NaN, and a series shorter than the window yields NaN everywhere rather than
//! an error. A NaN anywhere inside a window makes that window's extreme NaN.

use std::collections::VecDeque;

use crate::core::{ensure_period, IndicatorResult};

/// Which extreme to track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extremum {
    /// Largest value in the window.
    Max,
    /// Smallest value in the window.
    Min,
}

impl Extremum {
    fn dominates(self, candidate: f64, incumbent: f64) -> bool {
        match self {
            Extremum::Max => candidate >= incumbent,
            Extremum::Min => candidate <= incumbent,
        }
    }
}

/// Rolling extreme of `series` over `window` points, in O(n).
///
/// Keeps a deque of indices whose values are monotonic in `kind`, so the
/// front is always the extreme of the current window.
pub fn rolling_extreme(series: &[f64], window: usize, kind: Extremum) -> IndicatorResult<Vec<f64>> {
    ensure_period("rolling extreme", window)?;
    let mut output = vec![f64::NAN; series.len()];
    if series.len() < window {
        return Ok(output);
    }

    let mut candidates: VecDeque<usize> = VecDeque::with_capacity(window);
    let mut last_nan: Option<usize> = None;
    for (idx, value) in series.iter().copied().enumerate() {
        if value.is_nan() {
            last_nan = Some(idx);
        } else {
            while candidates
                .back()
                .is_some_and(|&back| kind.dominates(value, series[back]))
            {
                candidates.pop_back();
            }
            candidates.push_back(idx);
        }

        let start = (idx + 1).saturating_sub(window);
        while candidates.front().is_some_and(|&front| front < start) {
            candidates.pop_front();
        }
        if idx + 1 < window {
            continue;
        }

        output[idx] = match (last_nan, candidates.front()) {
            (Some(nan), _) if nan >= start => f64::NAN,
            (_, Some(&best)) => series[best],
            (_, None) => f64::NAN,
        };
    }
    Ok(output)
}

/// Rolling maximum; see [`rolling_extreme`].
pub fn rolling_max(series: &[f64], window: usize) -> IndicatorResult<Vec<f64>> {
    rolling_extreme(series, window, Extremum::Max)
}

/// Rolling minimum; see [`rolling_extreme`].
pub fn rolling_min(series: &[f64], window: usize) -> IndicatorResult<Vec<f64>> {
    rolling_extreme(series, window, Extremum::Min)
}
