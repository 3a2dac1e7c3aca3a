//! Averages that weight price by traded volume.
//!
//! Both need the candle's own volume aligned to the price they smooth, so the
//! registry flags them as requiring volume context.

use std::collections::VecDeque;

use chrono::{DateTime, NaiveDate};

use crate::core::{ensure_period, Indicator, IndicatorError, IndicatorResult};

use super::{MaInput, MaType};

/// Volume-weighted moving average over a rolling window.
#[derive(Debug, Clone)]
pub struct Vwma {
    period: usize,
    window: VecDeque<(f64, f64)>,
}

impl Vwma {
    /// Creates a VWMA with the provided period.
    pub fn new(period: usize) -> IndicatorResult<Self> {
        ensure_period("VWMA", period)?;
        Ok(Self {
            period,
            window: VecDeque::with_capacity(period),
        })
    }
}

impl Indicator for Vwma {
    /// `(price, volume)` of one candle.
    type Input = (f64, f64);
    type Output = f64;

    fn next(&mut self, input: Self::Input) -> Option<f64> {
        self.window.push_back(input);
        if self.window.len() > self.period {
            self.window.pop_front();
        }
        if self.window.len() < self.period {
            return None;
        }
        let (weighted, volume) = self
            .window
            .iter()
            .fold((0.0, 0.0), |(weighted, total), (price, volume)| {
                (weighted + price * volume, total + volume)
            });
        Some(weighted / volume)
    }

    fn reset(&mut self) {
        self.window.clear();
    }
}

/// One candle as seen by [`SessionVwap`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VwapBar {
    /// Candle open time in epoch milliseconds.
    pub timestamp: f64,
    /// Price being averaged.
    pub price: f64,
    /// Traded volume.
    pub volume: f64,
}

/// Cumulative volume-weighted average price re-anchored at every UTC day.
#[derive(Debug, Clone, Default)]
pub struct SessionVwap {
    session: Option<NaiveDate>,
    weighted: f64,
    volume: f64,
}

impl SessionVwap {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    fn session_of(timestamp: f64) -> Option<NaiveDate> {
        if !timestamp.is_finite() {
            return None;
        }
        DateTime::from_timestamp_millis(timestamp as i64).map(|at| at.date_naive())
    }
}

impl Indicator for SessionVwap {
    type Input = VwapBar;
    type Output = f64;

    fn next(&mut self, bar: VwapBar) -> Option<f64> {
        let session = Self::session_of(bar.timestamp)?;
        if self.session != Some(session) {
            self.session = Some(session);
            self.weighted = 0.0;
            self.volume = 0.0;
        }
        self.weighted += bar.price * bar.volume;
        self.volume += bar.volume;
        Some(self.weighted / self.volume)
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

pub(crate) fn vwma_kernel(input: &MaInput<'_>, period: usize) -> IndicatorResult<Vec<f64>> {
    let context = input
        .context()
        .ok_or(IndicatorError::MissingVolumeContext { ma: MaType::Vwma })?;
    let mut vwma = Vwma::new(period)?;
    Ok(input
        .values()
        .iter()
        .zip(context.volume)
        .map(|(price, volume)| vwma.next((*price, *volume)).unwrap_or(f64::NAN))
        .collect())
}

/// `period` is accepted for a uniform kernel signature; the anchor is the session.
pub(crate) fn vwap_kernel(input: &MaInput<'_>, _period: usize) -> IndicatorResult<Vec<f64>> {
    let context = input
        .context()
        .ok_or(IndicatorError::MissingVolumeContext { ma: MaType::Vwap })?;
    let mut vwap = SessionVwap::new();
    Ok(input
        .values()
        .iter()
        .zip(context.volume)
        .zip(context.timestamps)
        .map(|((price, volume), timestamp)| {
            vwap.next(VwapBar {
                timestamp: *timestamp,
                price: *price,
                volume: *volume,
            })
            .unwrap_or(f64::NAN)
        })
        .collect())
}
