//! Simple and triangular moving averages.

use std::collections::VecDeque;
use std::marker::PhantomData;

use crate::combinators::PipedIndicator;
use crate::core::{
    collect_series, ensure_period, float_from_usize, Indicator, IndicatorResult, Input,
};

use super::MaInput;

/// Arithmetic mean over a rolling window.
///
/// The window is summed afresh on every step so a value depends only on the
/// points inside its window, never on where the series started.
#[derive(Debug, Clone)]
pub struct Sma<I = f64> {
    period: usize,
    divisor: f64,
    window: VecDeque<f64>,
    marker: PhantomData<I>,
}

impl<I> Sma<I>
where
    I: Input,
{
    /// Creates a new SMA with the provided period.
    pub fn new(period: usize) -> IndicatorResult<Self> {
        ensure_period("SMA", period)?;
        Ok(Self {
            period,
            divisor: float_from_usize(period),
            window: VecDeque::with_capacity(period),
            marker: PhantomData,
        })
    }

    /// Returns the configured lookback period.
    pub fn period(&self) -> usize {
        self.period
    }
}

impl<I> Indicator for Sma<I>
where
    I: Input,
{
    type Input = I;
    type Output = f64;

    fn next(&mut self, input: Self::Input) -> Option<Self::Output> {
        self.window.push_back(input.value());
        if self.window.len() > self.period {
            self.window.pop_front();
        }

        if self.window.len() == self.period {
            Some(self.window.iter().sum::<f64>() / self.divisor)
        } else {
            None
        }
    }

    fn reset(&mut self) {
        self.window.clear();
    }
}

/// Triangular moving average: an SMA of an SMA whose periods add up to `period + 1`.
pub fn trima(period: usize) -> IndicatorResult<PipedIndicator<Sma, Sma>> {
    ensure_period("TRIMA", period)?;
    let (first, second) = if period % 2 == 1 {
        ((period + 1) / 2, (period + 1) / 2)
    } else {
        (period / 2, period / 2 + 1)
    };
    Ok(PipedIndicator::new(Sma::new(first)?, Sma::new(second)?))
}

pub(crate) fn sma_kernel(input: &MaInput<'_>, period: usize) -> IndicatorResult<Vec<f64>> {
    Ok(collect_series(&mut Sma::new(period)?, input.values()))
}

pub(crate) fn trima_kernel(input: &MaInput<'_>, period: usize) -> IndicatorResult<Vec<f64>> {
    Ok(collect_series(&mut trima(period)?, input.values()))
}
