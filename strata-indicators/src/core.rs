//! Core traits, the error type, and numeric helpers shared by every indicator.

use num_traits::ToPrimitive;
use thiserror::Error;

use crate::averages::MaType;

/// Result alias used across the crate.
pub type IndicatorResult<T> = Result<T, IndicatorError>;

/// Errors surfaced while configuring or evaluating indicators.
///
/// Degenerate data (short histories, flat ranges) is never an error: it shows
/// up as NaN in the output instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    /// A period or window of zero was requested.
    #[error("{indicator}: period must be greater than zero (got {period})")]
    InvalidPeriod {
        /// Indicator that rejected the period.
        indicator: &'static str,
        /// Offending value.
        period: usize,
    },
    /// A non-period parameter is out of range.
    #[error("{indicator}: invalid value for {parameter}: {value}")]
    InvalidParameter {
        /// Indicator that rejected the parameter.
        indicator: &'static str,
        /// Parameter name.
        parameter: &'static str,
        /// Offending value, rendered for display.
        value: String,
    },
    /// A volume-weighted average was requested for a stage that only sees a derived series.
    #[error("{indicator}: {ma} cannot be used for the {stage} stage because it needs candle volume")]
    NestedVolumeAverage {
        /// Composite indicator performing the validation.
        indicator: &'static str,
        /// Pipeline stage that requested the average.
        stage: &'static str,
        /// Rejected averaging algorithm.
        ma: MaType,
    },
    /// A volume-weighted average was evaluated without volume context.
    #[error("{ma} requires candle volume and timestamps")]
    MissingVolumeContext {
        /// Averaging algorithm that needed the context.
        ma: MaType,
    },
    /// The averaging algorithm is not present in the registry in use.
    #[error("moving average {0} is not registered")]
    UnsupportedMaType(MaType),
    /// An averaging code or name could not be parsed.
    #[error("unknown moving average type: {0}")]
    UnknownMaType(String),
    /// A candle source name could not be parsed.
    #[error("unknown candle source: {0}")]
    UnknownSource(String),
    /// Two series that must be aligned have different lengths.
    #[error("series length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        /// Length of the reference series.
        expected: usize,
        /// Length of the series that did not match.
        actual: usize,
    },
}

impl IndicatorError {
    /// Builds an [`IndicatorError::InvalidPeriod`].
    pub fn invalid_period(indicator: &'static str, period: usize) -> Self {
        Self::InvalidPeriod { indicator, period }
    }

    /// Builds an [`IndicatorError::InvalidParameter`].
    pub fn invalid_parameter(
        indicator: &'static str,
        parameter: &'static str,
        value: impl ToString,
    ) -> Self {
        Self::InvalidParameter {
            indicator,
            parameter,
            value: value.to_string(),
        }
    }
}

/// Values that can be fed to a step kernel.
///
/// Anything convertible to `f64` qualifies; values that cannot be represented
/// become NaN.
pub trait Input {
    /// Numeric value of the input.
    fn value(&self) -> f64;
}

impl<T> Input for T
where
    T: ToPrimitive,
{
    fn value(&self) -> f64 {
        self.to_f64().unwrap_or(f64::NAN)
    }
}

/// A step function that consumes one input at a time.
///
/// Kernels of the batch indicators are written against this trait; they are
/// created fresh for every call and never outlive it.
pub trait Indicator {
    /// Value consumed per step.
    type Input;
    /// Value produced once warmed up.
    type Output;

    /// Feeds the next input, returning an output once enough history is available.
    fn next(&mut self, input: Self::Input) -> Option<Self::Output>;

    /// Clears all accumulated state.
    fn reset(&mut self);
}

/// Runs a step kernel over a whole series, writing NaN wherever it has no output.
pub fn collect_series<I>(indicator: &mut I, values: &[f64]) -> Vec<f64>
where
    I: Indicator<Input = f64, Output = f64>,
{
    values
        .iter()
        .map(|value| indicator.next(*value).unwrap_or(f64::NAN))
        .collect()
}

pub(crate) fn float_from_usize(value: usize) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

pub(crate) fn ensure_period(indicator: &'static str, period: usize) -> IndicatorResult<()> {
    if period == 0 {
        return Err(IndicatorError::invalid_period(indicator, period));
    }
    Ok(())
}
