//! Weighted moving average entry points.

use crate::averages::Wma;
use crate::candles::{
    CandleRow, CandleSlicer, Lookback, Source, TrailingWindow, DEFAULT_WARMUP_CANDLES,
};
use crate::core::{collect_series, IndicatorResult};
use crate::output::{Output, OutputMode};

/// Conventional WMA period.
pub const DEFAULT_WMA_PERIOD: usize = 30;

static DEFAULT_SLICER: TrailingWindow = TrailingWindow::new(DEFAULT_WARMUP_CANDLES);

/// Linearly weighted average of `source` over `period` candles.
pub fn wma(
    candles: &[CandleRow],
    period: usize,
    source: Source,
    mode: OutputMode,
) -> IndicatorResult<Output> {
    wma_with_slicer(candles, period, source, mode, &DEFAULT_SLICER)
}

/// Same as [`wma`], with `slicer` choosing the candles for scalar calls.
pub fn wma_with_slicer(
    candles: &[CandleRow],
    period: usize,
    source: Source,
    mode: OutputMode,
    slicer: &dyn CandleSlicer,
) -> IndicatorResult<Output> {
    let mut kernel = Wma::new(period)?;
    let candles = slicer.slice(candles, mode, Lookback::Bars(period));
    tracing::debug!(candles = candles.len(), ?mode, period, %source, "computing wma");
    let series = collect_series(&mut kernel, &source.extract(candles));
    Ok(Output::from_series(series, mode))
}

/// Linearly weighted average of a bare series; never sliced.
pub fn wma_series(series: &[f64], period: usize, mode: OutputMode) -> IndicatorResult<Output> {
    let mut kernel = Wma::new(period)?;
    Ok(Output::from_series(collect_series(&mut kernel, series), mode))
}
