//! Weighted-window averages: linear, sine and Hull.

use std::collections::VecDeque;
use std::f64::consts::PI;

use crate::core::{collect_series, ensure_period, float_from_usize, Indicator, IndicatorResult};

use super::MaInput;

/// Average over a rolling window with fixed weights, oldest point first.
#[derive(Debug, Clone)]
pub struct Wma {
    weights: Vec<f64>,
    total_weight: f64,
    window: VecDeque<f64>,
}

impl Wma {
    /// Linearly weighted average: weights `1..=period`, newest heaviest.
    pub fn new(period: usize) -> IndicatorResult<Self> {
        ensure_period("WMA", period)?;
        Ok(Self::from_weights(
            (1..=period).map(float_from_usize).collect(),
        ))
    }

    /// Sine-weighted average: weights `sin(i·π / (period + 1))` for `i = 1..=period`.
    pub fn sine(period: usize) -> IndicatorResult<Self> {
        ensure_period("SINWMA", period)?;
        let step = PI / float_from_usize(period + 1);
        Ok(Self::from_weights(
            (1..=period)
                .map(|i| (float_from_usize(i) * step).sin())
                .collect(),
        ))
    }

    fn from_weights(weights: Vec<f64>) -> Self {
        let total_weight = weights.iter().sum();
        let window = VecDeque::with_capacity(weights.len());
        Self {
            weights,
            total_weight,
            window,
        }
    }

    /// Returns the configured lookback period.
    pub fn period(&self) -> usize {
        self.weights.len()
    }
}

impl Indicator for Wma {
    type Input = f64;
    type Output = f64;

    fn next(&mut self, input: f64) -> Option<f64> {
        self.window.push_back(input);
        if self.window.len() > self.weights.len() {
            self.window.pop_front();
        }
        if self.window.len() < self.weights.len() {
            return None;
        }
        let weighted: f64 = self
            .window
            .iter()
            .zip(&self.weights)
            .map(|(value, weight)| value * weight)
            .sum();
        Some(weighted / self.total_weight)
    }

    fn reset(&mut self) {
        self.window.clear();
    }
}

pub(crate) fn hma_smoothing_period(period: usize) -> usize {
    (float_from_usize(period).sqrt().floor() as usize).max(1)
}

/// Hull moving average: `WMA(2·WMA(x, p/2) - WMA(x, p), √p)`.
#[derive(Debug, Clone)]
pub struct Hma {
    half: Wma,
    full: Wma,
    smooth: Wma,
}

impl Hma {
    /// Creates a Hull average; sub-periods are floored at one.
    pub fn new(period: usize) -> IndicatorResult<Self> {
        ensure_period("HMA", period)?;
        let half = (period / 2).max(1);
        let smooth = hma_smoothing_period(period);
        Ok(Self {
            half: Wma::new(half)?,
            full: Wma::new(period)?,
            smooth: Wma::new(smooth)?,
        })
    }
}

impl Indicator for Hma {
    type Input = f64;
    type Output = f64;

    fn next(&mut self, input: f64) -> Option<f64> {
        let half = self.half.next(input);
        let full = self.full.next(input);
        match (half, full) {
            (Some(half), Some(full)) => self.smooth.next(2.0 * half - full),
            _ => None,
        }
    }

    fn reset(&mut self) {
        self.half.reset();
        self.full.reset();
        self.smooth.reset();
    }
}

pub(crate) fn wma_kernel(input: &MaInput<'_>, period: usize) -> IndicatorResult<Vec<f64>> {
    Ok(collect_series(&mut Wma::new(period)?, input.values()))
}

pub(crate) fn sine_wma_kernel(input: &MaInput<'_>, period: usize) -> IndicatorResult<Vec<f64>> {
    Ok(collect_series(&mut Wma::sine(period)?, input.values()))
}

pub(crate) fn hma_kernel(input: &MaInput<'_>, period: usize) -> IndicatorResult<Vec<f64>> {
    Ok(collect_series(&mut Hma::new(period)?, input.values()))
}
