//! Sequential/scalar output contract shared by every indicator.

use serde::{Deserialize, Serialize};

/// Whether a call returns the whole aligned series or only its latest value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// One value per input candle.
    Sequential,
    /// Only the most recent value.
    #[default]
    Scalar,
}

impl OutputMode {
    /// Whether the full series is requested.
    pub fn is_sequential(self) -> bool {
        matches!(self, OutputMode::Sequential)
    }
}

impl From<bool> for OutputMode {
    fn from(sequential: bool) -> Self {
        if sequential {
            OutputMode::Sequential
        } else {
            OutputMode::Scalar
        }
    }
}

/// One output channel of an indicator.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// The full series, aligned with the input candles.
    Sequential(Vec<f64>),
    /// The last element of the series; NaN when the series is empty.
    Scalar(f64),
}

impl Output {
    /// Applies `mode` to a fully computed series.
    pub fn from_series(series: Vec<f64>, mode: OutputMode) -> Self {
        match mode {
            OutputMode::Sequential => Output::Sequential(series),
            OutputMode::Scalar => Output::Scalar(series.last().copied().unwrap_or(f64::NAN)),
        }
    }

    /// The scalar value, or the last element of a sequential output.
    pub fn latest(&self) -> f64 {
        match self {
            Output::Sequential(series) => series.last().copied().unwrap_or(f64::NAN),
            Output::Scalar(value) => *value,
        }
    }

    /// The full series, if this is a sequential output.
    pub fn as_series(&self) -> Option<&[f64]> {
        match self {
            Output::Sequential(series) => Some(series),
            Output::Scalar(_) => None,
        }
    }

    /// The scalar value, if this is a scalar output.
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Output::Sequential(_) => None,
            Output::Scalar(value) => Some(*value),
        }
    }

    /// Consumes the output, returning the series (a scalar becomes a one-element series).
    pub fn into_series(self) -> Vec<f64> {
        match self {
            Output::Sequential(series) => series,
            Output::Scalar(value) => vec![value],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_keeps_the_last_value() {
        let output = Output::from_series(vec![1.0, 2.0, 3.0], OutputMode::Scalar);
        assert_eq!(output.as_scalar(), Some(3.0));
        assert_eq!(output.as_series(), None);
        assert_eq!(output.into_series(), vec![3.0]);
    }

    #[test]
    fn empty_series_scalar_is_nan() {
        let output = Output::from_series(Vec::new(), OutputMode::Scalar);
        assert!(output.latest().is_nan());
    }

    #[test]
    fn sequential_keeps_everything() {
        let output = Output::from_series(vec![f64::NAN, 2.0], OutputMode::from(true));
        assert_eq!(output.as_series().map(<[f64]>::len), Some(2));
        assert_eq!(output.latest(), 2.0);
        assert_eq!(OutputMode::from(false), OutputMode::Scalar);
    }
}
