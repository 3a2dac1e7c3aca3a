//! Least-squares line fitted over a rolling window.

use std::collections::VecDeque;

use crate::core::{collect_series, ensure_period, float_from_usize, Indicator, IndicatorResult};

use super::MaInput;

/// Fits `y = a + b·x` over the last `period` points (`x = 0..period`) and
/// evaluates the line at a fixed horizon.
#[derive(Debug, Clone)]
pub struct LinearRegression {
    period: usize,
    horizon: f64,
    sum_x: f64,
    denominator: f64,
    window: VecDeque<f64>,
}

impl LinearRegression {
    /// Value of the fitted line at the newest point of the window.
    pub fn endpoint(period: usize) -> IndicatorResult<Self> {
        ensure_period("LINEARREG", period)?;
        Ok(Self::with_horizon(period, float_from_usize(period - 1)))
    }

    /// Value of the fitted line one bar past the window (time series forecast).
    pub fn forecast(period: usize) -> IndicatorResult<Self> {
        ensure_period("TSF", period)?;
        Ok(Self::with_horizon(period, float_from_usize(period)))
    }

    fn with_horizon(period: usize, horizon: f64) -> Self {
        let n = float_from_usize(period);
        let sum_x = n * (n - 1.0) / 2.0;
        let sum_xx = (n - 1.0) * n * (2.0 * n - 1.0) / 6.0;
        Self {
            period,
            horizon,
            sum_x,
            denominator: n * sum_xx - sum_x * sum_x,
            window: VecDeque::with_capacity(period),
        }
    }
}

impl Indicator for LinearRegression {
    type Input = f64;
    type Output = f64;

    fn next(&mut self, input: f64) -> Option<f64> {
        self.window.push_back(input);
        if self.window.len() > self.period {
            self.window.pop_front();
        }
        if self.window.len() < self.period {
            return None;
        }
        if self.period == 1 {
            return Some(input);
        }

        let n = float_from_usize(self.period);
        let (sum_y, sum_xy) = self
            .window
            .iter()
            .enumerate()
            .fold((0.0, 0.0), |(sum_y, sum_xy), (x, y)| {
                (sum_y + y, sum_xy + float_from_usize(x) * y)
            });
        let slope = (n * sum_xy - self.sum_x * sum_y) / self.denominator;
        let intercept = (sum_y - slope * self.sum_x) / n;
        Some(intercept + slope * self.horizon)
    }

    fn reset(&mut self) {
        self.window.clear();
    }
}

pub(crate) fn linear_regression_kernel(
    input: &MaInput<'_>,
    period: usize,
) -> IndicatorResult<Vec<f64>> {
    Ok(collect_series(
        &mut LinearRegression::endpoint(period)?,
        input.values(),
    ))
}
