//! Generic moving average over a candle source.
//!
//! Unlike the smoothing stages inside composite indicators, the values here
//! come straight from the candles, so the volume-weighted algorithms are
//! available.

use serde::{Deserialize, Serialize};

use crate::averages::{MaInput, MaRegistry, MaType, MovingAverageProvider, VolumeContext};
use crate::candles::{CandleRow, CandleSlicer, Field, Source, TrailingWindow, DEFAULT_WARMUP_CANDLES};
use crate::core::{ensure_period, IndicatorError, IndicatorResult};
use crate::output::{Output, OutputMode};

static DEFAULT_SLICER: TrailingWindow = TrailingWindow::new(DEFAULT_WARMUP_CANDLES);

/// Parameters of [`Ma`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaParams {
    /// Averaging window.
    pub period: usize,
    /// Averaging algorithm.
    pub matype: MaType,
    /// Candle series to average.
    pub source: Source,
}

impl Default for MaParams {
    fn default() -> Self {
        Self {
            period: 30,
            matype: MaType::Sma,
            source: Source::Close,
        }
    }
}

impl TryFrom<toml::Value> for MaParams {
    type Error = IndicatorError;

    fn try_from(value: toml::Value) -> Result<Self, Self::Error> {
        value.try_into().map_err(|err: toml::de::Error| {
            IndicatorError::invalid_parameter("MA", "params", format!("failed to parse config: {err}"))
        })
    }
}

/// A moving average bound to its provider and slicer.
pub struct Ma<'a> {
    params: MaParams,
    averages: &'a dyn MovingAverageProvider,
    slicer: &'a dyn CandleSlicer,
}

impl<'a> Ma<'a> {
    /// Validates the period and that `averages` knows `params.matype`.
    pub fn new(params: MaParams, averages: &'a dyn MovingAverageProvider) -> IndicatorResult<Self> {
        ensure_period("MA", params.period)?;
        averages.requires_volume(params.matype)?;
        Ok(Self {
            params,
            averages,
            slicer: &DEFAULT_SLICER,
        })
    }

    /// Replaces the default trailing-window slicer.
    pub fn with_slicer(mut self, slicer: &'a dyn CandleSlicer) -> Self {
        self.slicer = slicer;
        self
    }

    /// Computes the average over `candles`.
    pub fn compute(&self, candles: &[CandleRow], mode: OutputMode) -> IndicatorResult<Output> {
        let MaParams {
            period,
            matype,
            source,
        } = self.params;
        let candles = self
            .slicer
            .slice(candles, mode, self.averages.lookback(matype, period));
        tracing::debug!(candles = candles.len(), ?mode, period, ma = %matype, %source, "computing moving average");

        let values = source.extract(candles);
        let volume = Field::Volume.column(candles);
        let timestamps = Field::Timestamp.column(candles);
        let input = MaInput::with_context(
            &values,
            VolumeContext {
                volume: &volume,
                timestamps: &timestamps,
            },
        )?;
        let series = self.averages.compute(matype, &input, period)?;
        Ok(Output::from_series(series, mode))
    }
}

/// Moving average of a candle source with the standard catalog.
pub fn ma(candles: &[CandleRow], params: MaParams, mode: OutputMode) -> IndicatorResult<Output> {
    let registry = MaRegistry::standard();
    Ma::new(params, &registry)?.compute(candles, mode)
}

/// Moving average of a bare series. Volume-weighted types are rejected since
/// there is no candle volume to weight by.
pub fn ma_series(
    series: &[f64],
    period: usize,
    matype: MaType,
    mode: OutputMode,
) -> IndicatorResult<Output> {
    let registry = MaRegistry::standard();
    let values = crate::averages::moving_average(&registry, series, period, matype)?;
    Ok(Output::from_series(values, mode))
}
