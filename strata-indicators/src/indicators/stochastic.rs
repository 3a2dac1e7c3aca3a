//! Stochastic Oscillator (%K and %D).
//!
//! ```text
//! raw = 100 * (close - lowest low) / (highest high - lowest low)
//! %K  = MA(raw, slowk_period, slowk_matype)
//! %D  = MA(%K,  slowd_period, slowd_matype)
//! ```
//!
//! A flat range divides zero by zero and yields NaN, which then flows through
//! both averages untouched.

use serde::{Deserialize, Serialize};

use crate::averages::{MaInput, MaRegistry, MaType, MovingAverageProvider};
use crate::candles::{
    CandleRow, CandleSlicer, Lookback, Source, TrailingWindow, DEFAULT_WARMUP_CANDLES,
};
use crate::core::{ensure_period, IndicatorError, IndicatorResult};
use crate::extrema::{rolling_max, rolling_min};
use crate::output::{Output, OutputMode};

const NAME: &str = "Stochastic";

static DEFAULT_SLICER: TrailingWindow = TrailingWindow::new(DEFAULT_WARMUP_CANDLES);

/// Periods and smoothing algorithms of the oscillator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StochasticParams {
    /// Window of the highest-high / lowest-low range.
    pub fastk_period: usize,
    /// Period of the average that turns the raw value into %K.
    pub slowk_period: usize,
    /// Algorithm smoothing the raw value into %K.
    pub slowk_matype: MaType,
    /// Period of the average that turns %K into %D.
    pub slowd_period: usize,
    /// Algorithm smoothing %K into %D.
    pub slowd_matype: MaType,
}

impl Default for StochasticParams {
    fn default() -> Self {
        Self {
            fastk_period: 14,
            slowk_period: 3,
            slowk_matype: MaType::Sma,
            slowd_period: 3,
            slowd_matype: MaType::Sma,
        }
    }
}

impl TryFrom<toml::Value> for StochasticParams {
    type Error = IndicatorError;

    fn try_from(value: toml::Value) -> Result<Self, Self::Error> {
        value.try_into().map_err(|err: toml::de::Error| {
            IndicatorError::invalid_parameter(NAME, "params", format!("failed to parse config: {err}"))
        })
    }
}

/// %K and %D channels.
#[derive(Debug, Clone, PartialEq)]
pub struct StochasticOutput {
    /// Smoothed stochastic line.
    pub k: Output,
    /// Signal line, the average of %K.
    pub d: Output,
}

/// A validated oscillator bound to its averaging provider and candle slicer.
pub struct Stochastic<'a> {
    params: StochasticParams,
    averages: &'a dyn MovingAverageProvider,
    slicer: &'a dyn CandleSlicer,
}

impl<'a> Stochastic<'a> {
    /// Validates `params` against `averages`.
    ///
    /// Both smoothing stages see derived series that no longer line up with
    /// candle volume, so volume-weighted algorithms are rejected here, before
    /// anything is computed.
    pub fn new(
        params: StochasticParams,
        averages: &'a dyn MovingAverageProvider,
    ) -> IndicatorResult<Self> {
        ensure_period(NAME, params.fastk_period)?;
        ensure_period(NAME, params.slowk_period)?;
        ensure_period(NAME, params.slowd_period)?;
        for (stage, ma) in [("slow %K", params.slowk_matype), ("slow %D", params.slowd_matype)] {
            if averages.requires_volume(ma)? {
                return Err(IndicatorError::NestedVolumeAverage {
                    indicator: NAME,
                    stage,
                    ma,
                });
            }
        }
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

    /// Parameters in use.
    pub fn params(&self) -> &StochasticParams {
        &self.params
    }

    /// History behind the latest %D: the range window chained with both averages.
    pub fn lookback(&self) -> Lookback {
        let params = &self.params;
        Lookback::Bars(params.fastk_period)
            .then(self.averages.lookback(params.slowk_matype, params.slowk_period))
            .then(self.averages.lookback(params.slowd_matype, params.slowd_period))
    }

    /// Computes both lines over `candles`.
    pub fn compute(
        &self,
        candles: &[CandleRow],
        mode: OutputMode,
    ) -> IndicatorResult<StochasticOutput> {
        let params = &self.params;
        let candles = self.slicer.slice(candles, mode, self.lookback());
        tracing::debug!(
            candles = candles.len(),
            ?mode,
            fastk = params.fastk_period,
            slowk = %params.slowk_matype,
            slowd = %params.slowd_matype,
            "computing stochastic"
        );

        let close = Source::Close.extract(candles);
        let highest = rolling_max(&Source::High.extract(candles), params.fastk_period)?;
        let lowest = rolling_min(&Source::Low.extract(candles), params.fastk_period)?;
        let raw: Vec<f64> = close
            .iter()
            .zip(highest.iter().zip(&lowest))
            .map(|(close, (high, low))| 100.0 * (close - low) / (high - low))
            .collect();

        let k = self.averages.compute(
            params.slowk_matype,
            &MaInput::series(&raw),
            params.slowk_period,
        )?;
        let d = self.averages.compute(
            params.slowd_matype,
            &MaInput::series(&k),
            params.slowd_period,
        )?;

        Ok(StochasticOutput {
            k: Output::from_series(k, mode),
            d: Output::from_series(d, mode),
        })
    }
}

/// Computes the oscillator with the standard averaging catalog and default slicing.
pub fn stoch(
    candles: &[CandleRow],
    params: StochasticParams,
    mode: OutputMode,
) -> IndicatorResult<StochasticOutput> {
    let registry = MaRegistry::standard();
    Stochastic::new(params, &registry)?.compute(candles, mode)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(high: f64, low: f64, close: f64) -> CandleRow {
        [0.0, close, close, high, low, 1.0]
    }

    fn params(fastk: usize, slowk: usize, slowd: usize) -> StochasticParams {
        StochasticParams {
            fastk_period: fastk,
            slowk_period: slowk,
            slowd_period: slowd,
            ..StochasticParams::default()
        }
    }

    #[test]
    fn hand_computed_values() {
        let candles = vec![
            candle(10.0, 8.0, 9.0),
            candle(11.0, 9.0, 10.0),
            candle(12.0, 10.0, 12.0),
            candle(12.0, 9.0, 9.0),
        ];
        let out = stoch(&candles, params(2, 1, 2), OutputMode::Sequential).unwrap();
        let k = out.k.as_series().unwrap();
        let d = out.d.as_series().unwrap();
        // Window 2 ranges: [8, 11], [9, 12], [9, 12].
        assert!(k[0].is_nan());
        assert!((k[1] - 200.0 / 3.0).abs() < 1e-12);
        assert!((k[2] - 100.0).abs() < 1e-12);
        assert!((k[3] - 0.0).abs() < 1e-12);
        assert!(d[1].is_nan());
        assert!((d[2] - (200.0 / 3.0 + 100.0) / 2.0).abs() < 1e-12);
        assert!((d[3] - 50.0).abs() < 1e-12);
    }

    #[test]
    fn scalar_mode_returns_last_values() {
        let candles = vec![
            candle(10.0, 8.0, 9.0),
            candle(11.0, 9.0, 10.0),
            candle(12.0, 10.0, 12.0),
            candle(12.0, 9.0, 9.0),
        ];
        let out = stoch(&candles, params(2, 1, 2), OutputMode::Scalar).unwrap();
        assert!((out.k.as_scalar().unwrap() - 0.0).abs() < 1e-12);
        assert!((out.d.as_scalar().unwrap() - 50.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_volume_weighted_smoothing() {
        let registry = MaRegistry::standard();
        for (slowk, slowd) in [(MaType::Vwma, MaType::Sma), (MaType::Sma, MaType::Vwap)] {
            let params = StochasticParams {
                slowk_matype: slowk,
                slowd_matype: slowd,
                ..StochasticParams::default()
            };
            let err = Stochastic::new(params, &registry).err().unwrap();
            assert!(matches!(err, IndicatorError::NestedVolumeAverage { .. }));
        }
    }

    #[test]
    fn rejects_zero_periods() {
        let registry = MaRegistry::standard();
        assert!(Stochastic::new(params(0, 3, 3), &registry).is_err());
        assert!(Stochastic::new(params(14, 0, 3), &registry).is_err());
        assert!(Stochastic::new(params(14, 3, 0), &registry).is_err());
    }

    #[test]
    fn short_history_degrades_to_nan() {
        let candles = vec![candle(2.0, 1.0, 1.5); 5];
        let out = stoch(&candles, StochasticParams::default(), OutputMode::Sequential).unwrap();
        assert_eq!(out.k.as_series().unwrap().len(), 5);
        assert!(out.k.as_series().unwrap().iter().all(|v| v.is_nan()));
        assert!(out.d.latest().is_nan());
    }

    #[test]
    fn lookback_follows_the_smoothing_algorithms() {
        let registry = MaRegistry::standard();
        let lookback = |params| Stochastic::new(params, &registry).unwrap().lookback();
        assert_eq!(lookback(StochasticParams::default()), Lookback::Bars(18));
        let hull = StochasticParams {
            slowk_matype: MaType::Hma,
            slowk_period: 9,
            ..StochasticParams::default()
        };
        assert_eq!(lookback(hull), Lookback::Bars(26));
        let tillson = StochasticParams {
            slowk_matype: MaType::T3,
            slowk_period: 50,
            ..StochasticParams::default()
        };
        assert_eq!(lookback(tillson), Lookback::Full);
    }

    #[test]
    fn params_parse_from_toml() {
        let value: toml::Value = toml::from_str(
            r#"
            fastk_period = 5
            slowk_matype = "ema"
            slowd_matype = 2
            "#,
        )
        .unwrap();
        let params = StochasticParams::try_from(value).unwrap();
        assert_eq!(params.fastk_period, 5);
        assert_eq!(params.slowk_period, 3);
        assert_eq!(params.slowk_matype, MaType::Ema);
        assert_eq!(params.slowd_matype, MaType::Wma);
    }
}
