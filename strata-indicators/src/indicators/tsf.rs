//! Time Series Forecast: a least-squares line over the window, projected one
//! bar past its newest point.

use crate::averages::LinearRegression;
use crate::candles::{
    CandleRow, CandleSlicer, Lookback, Source, TrailingWindow, DEFAULT_WARMUP_CANDLES,
};
use crate::core::{collect_series, IndicatorResult};
use crate::output::{Output, OutputMode};

/// Conventional TSF period.
pub const DEFAULT_TSF_PERIOD: usize = 14;

static DEFAULT_SLICER: TrailingWindow = TrailingWindow::new(DEFAULT_WARMUP_CANDLES);

/// Forecast of `source` one bar ahead, fitted over `period` candles.
pub fn tsf(
    candles: &[CandleRow],
    period: usize,
    source: Source,
    mode: OutputMode,
) -> IndicatorResult<Output> {
    tsf_with_slicer(candles, period, source, mode, &DEFAULT_SLICER)
}

/// Same as [`tsf`], with `slicer` choosing the candles for scalar calls.
pub fn tsf_with_slicer(
    candles: &[CandleRow],
    period: usize,
    source: Source,
    mode: OutputMode,
    slicer: &dyn CandleSlicer,
) -> IndicatorResult<Output> {
    let mut kernel = LinearRegression::forecast(period)?;
    let candles = slicer.slice(candles, mode, Lookback::Bars(period));
    tracing::debug!(candles = candles.len(), ?mode, period, %source, "computing tsf");
    let series = collect_series(&mut kernel, &source.extract(candles));
    Ok(Output::from_series(series, mode))
}
