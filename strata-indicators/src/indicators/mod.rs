//! Candle-level indicators built on the averaging catalog and extrema engine.

pub mod ma;
pub mod stochastic;
pub mod tsf;
pub mod wma;

pub use ma::{ma, ma_series, Ma, MaParams};
pub use stochastic::{stoch, Stochastic, StochasticOutput, StochasticParams};
pub use tsf::{tsf, tsf_with_slicer, DEFAULT_TSF_PERIOD};
pub use wma::{wma, wma_series, wma_with_slicer, DEFAULT_WMA_PERIOD};
