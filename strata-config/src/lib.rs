//! Layered configuration for Strata indicators.

use std::path::Path;

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat, Map};
use serde::{Deserialize, Serialize};
use strata_indicators::indicators::{DEFAULT_TSF_PERIOD, DEFAULT_WMA_PERIOD};
use strata_indicators::{MaParams, StochasticParams, TrailingWindow, DEFAULT_WARMUP_CANDLES};

/// Prefix of environment overrides, e.g. `STRATA__DATA__WARMUP_CANDLES`.
pub const ENV_PREFIX: &str = "STRATA";

const ENV_SEPARATOR: &str = "__";

/// Top-level settings consumed by indicator callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorSettings {
    /// Candle history handling.
    pub data: DataSettings,
    /// Stochastic oscillator parameters.
    pub stochastic: StochasticParams,
    /// Moving-average defaults.
    pub ma: MaSettings,
}

/// Candle history handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// Trailing candles kept for scalar results.
    pub warmup_candles: usize,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            warmup_candles: DEFAULT_WARMUP_CANDLES,
        }
    }
}

/// Moving-average defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaSettings {
    /// Parameters of the generic moving average.
    #[serde(flatten)]
    pub params: MaParams,
    /// Period of the weighted moving average.
    pub wma_period: usize,
    /// Period of the time series forecast.
    pub tsf_period: usize,
}

impl Default for MaSettings {
    fn default() -> Self {
        Self {
            params: MaParams::default(),
            wma_period: DEFAULT_WMA_PERIOD,
            tsf_period: DEFAULT_TSF_PERIOD,
        }
    }
}

impl IndicatorSettings {
    /// Slicer honouring `data.warmup_candles`.
    pub fn slicer(&self) -> TrailingWindow {
        TrailingWindow::new(self.data.warmup_candles)
    }

    fn validate(self) -> Result<Self> {
        anyhow::ensure!(
            self.data.warmup_candles > 0,
            "data.warmup_candles must be greater than zero"
        );
        Ok(self)
    }
}

/// Loads settings from defaults, an optional TOML file, and the process environment.
pub fn load_settings(path: Option<&Path>) -> Result<IndicatorSettings> {
    load_layers(path, None)
}

/// Parses settings from TOML text layered over the defaults. Environment
/// variables are not consulted.
pub fn from_toml_str(contents: &str) -> Result<IndicatorSettings> {
    let settings = Config::builder()
        .add_source(defaults()?)
        .add_source(File::from_str(contents, FileFormat::Toml))
        .build()
        .context("failed to parse settings")?
        .try_deserialize::<IndicatorSettings>()
        .context("invalid settings")?;
    settings.validate()
}

fn defaults() -> Result<Config> {
    Config::try_from(&IndicatorSettings::default()).context("failed to encode default settings")
}

fn load_layers(path: Option<&Path>, env: Option<Map<String, String>>) -> Result<IndicatorSettings> {
    let mut builder = Config::builder().add_source(defaults()?);
    if let Some(path) = path {
        tracing::debug!(path = %path.display(), "loading settings file");
        builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
    }
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator(ENV_SEPARATOR)
            .separator(ENV_SEPARATOR)
            .try_parsing(true)
            .source(env),
    );
    let settings = builder
        .build()
        .context("failed to build settings")?
        .try_deserialize::<IndicatorSettings>()
        .context("invalid settings")?;
    settings.validate()
}
