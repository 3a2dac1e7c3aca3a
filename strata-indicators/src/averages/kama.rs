//! Kaufman adaptive moving average.

use std::collections::VecDeque;

use crate::core::{collect_series, ensure_period, Indicator, IndicatorResult};

use super::MaInput;

const FAST_SMOOTHING: f64 = 2.0 / 3.0;
const SLOW_SMOOTHING: f64 = 2.0 / 31.0;

/// Adapts its smoothing constant to the efficiency ratio of the last `period` changes.
#[derive(Debug, Clone)]
pub struct Kama {
    period: usize,
    window: VecDeque<f64>,
    state: Option<f64>,
}

impl Kama {
    /// Creates a KAMA with the standard 2/30 fast and slow constants.
    pub fn new(period: usize) -> IndicatorResult<Self> {
        ensure_period("KAMA", period)?;
        Ok(Self {
            period,
            window: VecDeque::with_capacity(period + 1),
            state: None,
        })
    }

    fn efficiency_ratio(&self) -> f64 {
        let (Some(first), Some(last)) = (self.window.front(), self.window.back()) else {
            return f64::NAN;
        };
        let change = (last - first).abs();
        let volatility: f64 = self
            .window
            .iter()
            .zip(self.window.iter().skip(1))
            .map(|(prev, next)| (next - prev).abs())
            .sum();
        if volatility <= change || volatility == 0.0 {
            1.0
        } else {
            change / volatility
        }
    }
}

impl Indicator for Kama {
    type Input = f64;
    type Output = f64;

    fn next(&mut self, input: f64) -> Option<f64> {
        self.window.push_back(input);
        if self.window.len() > self.period + 1 {
            self.window.pop_front();
        }
        if self.window.len() <= self.period {
            if self.window.len() == self.period {
                self.state = Some(input);
            }
            return None;
        }

        let ratio = self.efficiency_ratio();
        let smoothing = (ratio * (FAST_SMOOTHING - SLOW_SMOOTHING) + SLOW_SMOOTHING).powi(2);
        let previous = self.state?;
        let next = previous + smoothing * (input - previous);
        self.state = Some(next);
        Some(next)
    }

    fn reset(&mut self) {
        self.window.clear();
        self.state = None;
    }
}

pub(crate) fn kama_kernel(input: &MaInput<'_>, period: usize) -> IndicatorResult<Vec<f64>> {
    Ok(collect_series(&mut Kama::new(period)?, input.values()))
}
