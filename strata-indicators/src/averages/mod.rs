//! Moving-average catalog and the dispatcher that composite indicators depend on.
//!
//! Averages are selected by [`MaType`] and evaluated through a
//! [`MovingAverageProvider`]. The standard [`MaRegistry`] maps every type to a
//! pure kernel and records whether that kernel needs the candles' own volume.

pub mod ema;
pub mod kama;
pub mod regression;
pub mod sma;
pub mod volume;
pub mod wma;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::candles::Lookback;
use crate::core::{ensure_period, IndicatorError, IndicatorResult};

pub use ema::{Dema, Ema, Tema, T3, T3_VOLUME_FACTOR};
pub use kama::Kama;
pub use regression::LinearRegression;
pub use sma::{trima, Sma};
pub use volume::{SessionVwap, VwapBar, Vwma};
pub use wma::{Hma, Wma};

use wma::hma_smoothing_period;

/// Averaging algorithms, numbered with their conventional type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MaType {
    /// Simple moving average.
    Sma,
    /// Exponential moving average.
    Ema,
    /// Linearly weighted moving average.
    Wma,
    /// Double exponential moving average.
    Dema,
    /// Triple exponential moving average.
    Tema,
    /// Triangular moving average.
    Trima,
    /// Kaufman adaptive moving average.
    Kama,
    /// Tillson T3.
    T3,
    /// Hull moving average.
    Hma,
    /// Linear regression endpoint.
    LinearReg,
    /// Wilder's smoothing.
    Wilders,
    /// Sine-weighted moving average.
    SineWma,
    /// Volume-weighted moving average.
    Vwma,
    /// Session-anchored volume-weighted average price.
    Vwap,
}

impl MaType {
    /// Every supported type, in code order.
    pub const ALL: [MaType; 14] = [
        MaType::Sma,
        MaType::Ema,
        MaType::Wma,
        MaType::Dema,
        MaType::Tema,
        MaType::Trima,
        MaType::Kama,
        MaType::T3,
        MaType::Hma,
        MaType::LinearReg,
        MaType::Wilders,
        MaType::SineWma,
        MaType::Vwma,
        MaType::Vwap,
    ];

    /// Conventional numeric code of the algorithm.
    pub const fn code(self) -> u8 {
        match self {
            MaType::Sma => 0,
            MaType::Ema => 1,
            MaType::Wma => 2,
            MaType::Dema => 3,
            MaType::Tema => 4,
            MaType::Trima => 5,
            MaType::Kama => 6,
            MaType::T3 => 8,
            MaType::Hma => 10,
            MaType::LinearReg => 11,
            MaType::Wilders => 12,
            MaType::SineWma => 13,
            MaType::Vwma => 24,
            MaType::Vwap => 29,
        }
    }

    /// Lowercase name used in configuration files.
    pub const fn name(self) -> &'static str {
        match self {
            MaType::Sma => "sma",
            MaType::Ema => "ema",
            MaType::Wma => "wma",
            MaType::Dema => "dema",
            MaType::Tema => "tema",
            MaType::Trima => "trima",
            MaType::Kama => "kama",
            MaType::T3 => "t3",
            MaType::Hma => "hma",
            MaType::LinearReg => "linearreg",
            MaType::Wilders => "wilders",
            MaType::SineWma => "sinwma",
            MaType::Vwma => "vwma",
            MaType::Vwap => "vwap",
        }
    }

    /// Number of leading undefined outputs over a series without NaNs.
    pub fn warmup(self, period: usize) -> usize {
        let lag = period.saturating_sub(1);
        match self {
            MaType::Sma
            | MaType::Ema
            | MaType::Wma
            | MaType::Trima
            | MaType::LinearReg
            | MaType::Wilders
            | MaType::SineWma
            | MaType::Vwma => lag,
            MaType::Dema => 2 * lag,
            MaType::Tema => 3 * lag,
            MaType::T3 => 6 * lag,
            MaType::Kama => period,
            MaType::Hma => lag + hma_smoothing_period(period) - 1,
            MaType::Vwap => 0,
        }
    }

    /// Whether every output depends on the whole history rather than a window.
    pub const fn is_recursive(self) -> bool {
        matches!(
            self,
            MaType::Ema
                | MaType::Dema
                | MaType::Tema
                | MaType::Kama
                | MaType::T3
                | MaType::Wilders
                | MaType::Vwap
        )
    }

    /// Input history behind the latest output.
    pub fn lookback(self, period: usize) -> Lookback {
        if self.is_recursive() {
            Lookback::Full
        } else {
            Lookback::Bars(self.warmup(period) + 1)
        }
    }
}

impl fmt::Display for MaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name().to_ascii_uppercase())
    }
}

impl TryFrom<u8> for MaType {
    type Error = IndicatorError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        MaType::ALL
            .into_iter()
            .find(|kind| kind.code() == code)
            .ok_or_else(|| IndicatorError::UnknownMaType(code.to_string()))
    }
}

impl FromStr for MaType {
    type Err = IndicatorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        if let Ok(code) = normalized.parse::<u8>() {
            return MaType::try_from(code);
        }
        MaType::ALL
            .into_iter()
            .find(|kind| kind.name() == normalized)
            .ok_or_else(|| IndicatorError::UnknownMaType(value.to_string()))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MaTypeRepr {
    Code(u8),
    Name(String),
}

impl<'de> Deserialize<'de> for MaType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match MaTypeRepr::deserialize(deserializer)? {
            MaTypeRepr::Code(code) => MaType::try_from(code),
            MaTypeRepr::Name(name) => name.parse(),
        }
        .map_err(serde::de::Error::custom)
    }
}

impl Serialize for MaType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

/// Candle volume and timestamps aligned to the values being averaged.
#[derive(Debug, Clone, Copy)]
pub struct VolumeContext<'a> {
    /// Traded volume per point.
    pub volume: &'a [f64],
    /// Candle open time per point, in epoch milliseconds.
    pub timestamps: &'a [f64],
}

/// Values handed to an averaging kernel.
#[derive(Debug, Clone, Copy)]
pub struct MaInput<'a> {
    values: &'a [f64],
    context: Option<VolumeContext<'a>>,
}

impl<'a> MaInput<'a> {
    /// A derived series with no traceable volume.
    pub fn series(values: &'a [f64]) -> Self {
        Self {
            values,
            context: None,
        }
    }

    /// Values taken straight from candles, together with their volume context.
    pub fn with_context(values: &'a [f64], context: VolumeContext<'a>) -> IndicatorResult<Self> {
        for aligned in [context.volume.len(), context.timestamps.len()] {
            if aligned != values.len() {
                return Err(IndicatorError::LengthMismatch {
                    expected: values.len(),
                    actual: aligned,
                });
            }
        }
        Ok(Self {
            values,
            context: Some(context),
        })
    }

    /// Values to smooth.
    pub fn values(&self) -> &'a [f64] {
        self.values
    }

    /// Volume context, when the values still map one-to-one onto candles.
    pub fn context(&self) -> Option<VolumeContext<'a>> {
        self.context
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no points.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn tail(&self, offset: usize) -> Self {
        Self {
            values: &self.values[offset..],
            context: self.context.map(|context| VolumeContext {
                volume: &context.volume[offset..],
                timestamps: &context.timestamps[offset..],
            }),
        }
    }
}

/// Signature of an averaging kernel: same-length output, NaN where undefined.
pub type MaKernel = fn(&MaInput<'_>, usize) -> IndicatorResult<Vec<f64>>;

/// One algorithm in a registry.
#[derive(Clone, Copy)]
pub struct MaEntry {
    /// Algorithm implemented by the kernel.
    pub kind: MaType,
    /// Whether the kernel needs the candles' own volume.
    pub requires_volume: bool,
    /// Kernel computing the average.
    pub kernel: MaKernel,
}

impl fmt::Debug for MaEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaEntry")
            .field("kind", &self.kind)
            .field("requires_volume", &self.requires_volume)
            .finish_non_exhaustive()
    }
}

impl MaEntry {
    /// Entry for a kernel that only looks at values.
    pub const fn values_only(kind: MaType, kernel: MaKernel) -> Self {
        Self {
            kind,
            requires_volume: false,
            kernel,
        }
    }

    /// Entry for a kernel that needs volume context.
    pub const fn volume_weighted(kind: MaType, kernel: MaKernel) -> Self {
        Self {
            kind,
            requires_volume: true,
            kernel,
        }
    }
}

/// Capability that composite indicators use to smooth intermediate series.
pub trait MovingAverageProvider: Send + Sync {
    /// Whether `kind` needs volume context, or an error when it is not available.
    fn requires_volume(&self, kind: MaType) -> IndicatorResult<bool>;

    /// Computes the full, input-aligned average of `input`.
    fn compute(&self, kind: MaType, input: &MaInput<'_>, period: usize)
        -> IndicatorResult<Vec<f64>>;

    /// Input history behind the latest output of `kind`.
    fn lookback(&self, kind: MaType, period: usize) -> Lookback {
        kind.lookback(period)
    }
}

/// Catalog of averaging kernels keyed by [`MaType`].
#[derive(Debug, Clone, Default)]
pub struct MaRegistry {
    entries: HashMap<MaType, MaEntry>,
}

impl MaRegistry {
    /// Creates a registry without any algorithms.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a registry holding every built-in algorithm.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        for entry in [
            MaEntry::values_only(MaType::Sma, sma::sma_kernel),
            MaEntry::values_only(MaType::Ema, ema::ema_kernel),
            MaEntry::values_only(MaType::Wma, wma::wma_kernel),
            MaEntry::values_only(MaType::Dema, ema::dema_kernel),
            MaEntry::values_only(MaType::Tema, ema::tema_kernel),
            MaEntry::values_only(MaType::Trima, sma::trima_kernel),
            MaEntry::values_only(MaType::Kama, kama::kama_kernel),
            MaEntry::values_only(MaType::T3, ema::t3_kernel),
            MaEntry::values_only(MaType::Hma, wma::hma_kernel),
            MaEntry::values_only(MaType::LinearReg, regression::linear_regression_kernel),
            MaEntry::values_only(MaType::Wilders, ema::wilders_kernel),
            MaEntry::values_only(MaType::SineWma, wma::sine_wma_kernel),
            MaEntry::volume_weighted(MaType::Vwma, volume::vwma_kernel),
            MaEntry::volume_weighted(MaType::Vwap, volume::vwap_kernel),
        ] {
            registry.register(entry);
        }
        registry
    }

    /// Adds or replaces the kernel for `entry.kind`.
    pub fn register(&mut self, entry: MaEntry) {
        if self.entries.insert(entry.kind, entry).is_some() {
            tracing::warn!(
                ma = %entry.kind,
                "moving average already registered; overriding previous kernel"
            );
        }
    }

    /// Looks up the entry for `kind`.
    pub fn entry(&self, kind: MaType) -> Option<&MaEntry> {
        self.entries.get(&kind)
    }

    /// Registered algorithms in code order.
    pub fn kinds(&self) -> Vec<MaType> {
        let mut kinds: Vec<MaType> = self.entries.keys().copied().collect();
        kinds.sort_unstable();
        kinds
    }

    fn require(&self, kind: MaType) -> IndicatorResult<&MaEntry> {
        self.entry(kind)
            .ok_or(IndicatorError::UnsupportedMaType(kind))
    }
}

impl MovingAverageProvider for MaRegistry {
    fn requires_volume(&self, kind: MaType) -> IndicatorResult<bool> {
        self.require(kind).map(|entry| entry.requires_volume)
    }

    /// Leading NaNs are skipped: the kernel sees the series from its first
    /// defined value and the result is padded back to the input length.
    fn compute(
        &self,
        kind: MaType,
        input: &MaInput<'_>,
        period: usize,
    ) -> IndicatorResult<Vec<f64>> {
        let entry = self.require(kind)?;
        ensure_period(kind.name(), period)?;
        if entry.requires_volume && input.context().is_none() {
            return Err(IndicatorError::MissingVolumeContext { ma: kind });
        }

        let offset = input
            .values()
            .iter()
            .position(|value| !value.is_nan())
            .unwrap_or(input.len());
        let mut output = vec![f64::NAN; offset];
        output.extend((entry.kernel)(&input.tail(offset), period)?);
        if output.len() != input.len() {
            return Err(IndicatorError::LengthMismatch {
                expected: input.len(),
                actual: output.len(),
            });
        }
        Ok(output)
    }
}

/// Smooths a derived series with `kind` through `provider`.
pub fn moving_average<P>(
    provider: &P,
    series: &[f64],
    period: usize,
    kind: MaType,
) -> IndicatorResult<Vec<f64>>
where
    P: MovingAverageProvider + ?Sized,
{
    provider.compute(kind, &MaInput::series(series), period)
}
