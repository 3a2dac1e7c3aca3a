//! Candle layout, source extraction, and slicing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::IndicatorError;
use crate::output::OutputMode;

/// One OHLCV record: `[timestamp, open, close, high, low, volume]`.
///
/// Timestamps are epoch milliseconds.
pub type CandleRow = [f64; 6];

/// Default number of trailing candles kept when only the latest value is needed.
pub const DEFAULT_WARMUP_CANDLES: usize = 240;

/// Positional fields of a [`CandleRow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// Open time in epoch milliseconds.
    Timestamp,
    /// Opening price.
    Open,
    /// Closing price.
    Close,
    /// Highest price.
    High,
    /// Lowest price.
    Low,
    /// Traded volume.
    Volume,
}

impl Field {
    /// Column index of the field inside a row.
    pub const fn offset(self) -> usize {
        match self {
            Field::Timestamp => 0,
            Field::Open => 1,
            Field::Close => 2,
            Field::High => 3,
            Field::Low => 4,
            Field::Volume => 5,
        }
    }

    /// Copies the field out of every candle.
    pub fn column(self, candles: &[CandleRow]) -> Vec<f64> {
        let offset = self.offset();
        candles.iter().map(|candle| candle[offset]).collect()
    }
}

/// Price series derived from candles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Opening price.
    Open,
    /// Highest price.
    High,
    /// Lowest price.
    Low,
    /// Closing price.
    #[default]
    Close,
    /// Traded volume.
    Volume,
    /// `(high + low) / 2`.
    Hl2,
    /// `(high + low + close) / 3`.
    Hlc3,
    /// `(open + high + low + close) / 4`.
    Ohlc4,
}

impl Source {
    /// Extracts the series from the candles.
    pub fn extract(self, candles: &[CandleRow]) -> Vec<f64> {
        let field = |candle: &CandleRow, field: Field| candle[field.offset()];
        match self {
            Source::Open => Field::Open.column(candles),
            Source::High => Field::High.column(candles),
            Source::Low => Field::Low.column(candles),
            Source::Close => Field::Close.column(candles),
            Source::Volume => Field::Volume.column(candles),
            Source::Hl2 => candles
                .iter()
                .map(|c| (field(c, Field::High) + field(c, Field::Low)) / 2.0)
                .collect(),
            Source::Hlc3 => candles
                .iter()
                .map(|c| (field(c, Field::High) + field(c, Field::Low) + field(c, Field::Close)) / 3.0)
                .collect(),
            Source::Ohlc4 => candles
                .iter()
                .map(|c| {
                    (field(c, Field::Open)
                        + field(c, Field::High)
                        + field(c, Field::Low)
                        + field(c, Field::Close))
                        / 4.0
                })
                .collect(),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Source::Open => "open",
            Source::High => "high",
            Source::Low => "low",
            Source::Close => "close",
            Source::Volume => "volume",
            Source::Hl2 => "hl2",
            Source::Hlc3 => "hlc3",
            Source::Ohlc4 => "ohlc4",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Source {
    type Err = IndicatorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Source::Open),
            "high" => Ok(Source::High),
            "low" => Ok(Source::Low),
            "close" => Ok(Source::Close),
            "volume" => Ok(Source::Volume),
            "hl2" => Ok(Source::Hl2),
            "hlc3" => Ok(Source::Hlc3),
            "ohlc4" => Ok(Source::Ohlc4),
            _ => Err(IndicatorError::UnknownSource(value.to_string())),
        }
    }
}

/// History an indicator needs so its latest value matches a full-history run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookback {
    /// The latest value only depends on this many trailing candles.
    Bars(usize),
    /// The latest value depends on every candle (recursive or cumulative state).
    Full,
}

impl Lookback {
    /// Lookback of a stage fed by `self` and followed by `next`.
    ///
    /// Consecutive window stages overlap by one bar: a 14-bar range followed by
    /// a 3-bar average needs 16 candles.
    pub fn then(self, next: Lookback) -> Lookback {
        match (self, next) {
            (Lookback::Bars(first), Lookback::Bars(second)) => {
                Lookback::Bars((first + second).saturating_sub(1))
            }
            _ => Lookback::Full,
        }
    }
}

/// Chooses which candles an indicator call actually looks at.
pub trait CandleSlicer: Send + Sync {
    /// Returns the candles to compute over. `lookback` is the history the
    /// indicator needs for its latest value.
    fn slice<'c>(&self, candles: &'c [CandleRow], mode: OutputMode, lookback: Lookback)
        -> &'c [CandleRow];
}

/// Keeps only a trailing window of candles when a scalar result is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailingWindow {
    /// Minimum number of trailing candles kept in scalar mode.
    pub warmup_candles: usize,
}

impl TrailingWindow {
    /// Creates a window keeping at least `warmup_candles` candles.
    pub const fn new(warmup_candles: usize) -> Self {
        Self { warmup_candles }
    }
}

impl Default for TrailingWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WARMUP_CANDLES)
    }
}

impl CandleSlicer for TrailingWindow {
    fn slice<'c>(
        &self,
        candles: &'c [CandleRow],
        mode: OutputMode,
        lookback: Lookback,
    ) -> &'c [CandleRow] {
        let Lookback::Bars(bars) = lookback else {
            return candles;
        };
        let keep = self.warmup_candles.max(bars);
        if mode.is_sequential() || candles.len() <= keep {
            return candles;
        }
        tracing::trace!(total = candles.len(), keep, "slicing candles for scalar output");
        &candles[candles.len() - keep..]
    }
}

/// Never slices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FullHistory;

impl CandleSlicer for FullHistory {
    fn slice<'c>(&self, candles: &'c [CandleRow], _: OutputMode, _: Lookback) -> &'c [CandleRow] {
        candles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candles() -> Vec<CandleRow> {
        vec![
            [0.0, 10.0, 11.0, 12.0, 9.0, 100.0],
            [60_000.0, 11.0, 13.0, 14.0, 10.0, 200.0],
        ]
    }

    #[test]
    fn fields_read_fixed_offsets() {
        let candles = candles();
        assert_eq!(Field::Close.column(&candles), vec![11.0, 13.0]);
        assert_eq!(Field::High.column(&candles), vec![12.0, 14.0]);
        assert_eq!(Field::Timestamp.column(&candles), vec![0.0, 60_000.0]);
    }

    #[test]
    fn composite_sources() {
        let candles = candles();
        assert_eq!(Source::Hl2.extract(&candles), vec![10.5, 12.0]);
        assert_eq!(Source::Hlc3.extract(&candles), vec![32.0 / 3.0, 37.0 / 3.0]);
        assert_eq!(Source::Ohlc4.extract(&candles), vec![10.5, 12.0]);
        assert_eq!(Source::Volume.extract(&candles), vec![100.0, 200.0]);
    }

    #[test]
    fn parses_source_names() {
        assert_eq!("HLC3".parse::<Source>().unwrap(), Source::Hlc3);
        assert_eq!(Source::default(), Source::Close);
        assert!(matches!(
            "median".parse::<Source>(),
            Err(IndicatorError::UnknownSource(_))
        ));
    }

    #[test]
    fn trailing_window_only_slices_scalar_calls() {
        let rows = vec![[0.0; 6]; 10];
        let window = TrailingWindow::new(4);
        let bars = Lookback::Bars;
        assert_eq!(window.slice(&rows, OutputMode::Sequential, bars(2)).len(), 10);
        assert_eq!(window.slice(&rows, OutputMode::Scalar, bars(2)).len(), 4);
        assert_eq!(window.slice(&rows, OutputMode::Scalar, bars(6)).len(), 6);
        assert_eq!(window.slice(&rows, OutputMode::Scalar, bars(20)).len(), 10);
        assert_eq!(window.slice(&rows, OutputMode::Scalar, Lookback::Full).len(), 10);
        assert_eq!(FullHistory.slice(&rows, OutputMode::Scalar, bars(1)).len(), 10);
    }

    #[test]
    fn chained_lookbacks_overlap_by_one_bar() {
        let range = Lookback::Bars(14);
        assert_eq!(range.then(Lookback::Bars(3)), Lookback::Bars(16));
        assert_eq!(
            range.then(Lookback::Bars(3)).then(Lookback::Bars(3)),
            Lookback::Bars(18)
        );
        assert_eq!(range.then(Lookback::Full), Lookback::Full);
        assert_eq!(Lookback::Full.then(Lookback::Bars(1)), Lookback::Full);
    }
}
