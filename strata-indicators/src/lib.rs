#![deny(missing_docs)]
#![doc = include_str!("../README.md")]

/// Moving-average catalog, step kernels, and the dispatcher.
pub mod averages;
/// Candle layout, price sources, and slicing policies.
pub mod candles;
/// Indicator composition helpers such as `PipedIndicator`.
pub mod combinators;
/// Foundational traits and the error type.
pub mod core;
/// Sliding-window extrema.
pub mod extrema;
/// Candle-level indicators.
pub mod indicators;
/// Sequential/scalar output contract.
pub mod output;

/// Re-export of the piped indicator combinator for convenience.
pub use crate::combinators::PipedIndicator;
/// Re-export of the core traits and error type to make the crate easy to consume.
pub use crate::core::{collect_series, Indicator, IndicatorError, IndicatorResult, Input};

pub use crate::averages::{
    moving_average, MaEntry, MaInput, MaRegistry, MaType, MovingAverageProvider, VolumeContext,
};
pub use crate::candles::{
    CandleRow, CandleSlicer, Field, FullHistory, Lookback, Source, TrailingWindow,
    DEFAULT_WARMUP_CANDLES,
};
pub use crate::extrema::{rolling_max, rolling_min, Extremum};
pub use crate::indicators::{
    ma, ma_series, stoch, tsf, tsf_with_slicer, wma, wma_series, wma_with_slicer, Ma, MaParams,
    Stochastic, StochasticOutput, StochasticParams,
};
pub use crate::output::{Output, OutputMode};
