//! Candle fixtures and assertions for Strata tests.

use std::sync::Once;

use chrono::{DateTime, Duration, TimeZone, Utc};
use tracing_subscriber::EnvFilter;

/// One `[timestamp, open, close, high, low, volume]` row.
pub type Row = [f64; 6];

/// Builds candle rows at a fixed interval.
#[derive(Debug, Clone)]
pub struct CandleBuilder {
    start: DateTime<Utc>,
    interval: Duration,
    rows: Vec<Row>,
}

impl Default for CandleBuilder {
    fn default() -> Self {
        Self::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(), Duration::minutes(1))
    }
}

impl CandleBuilder {
    /// Starts a series at `start` with one candle per `interval`.
    pub fn new(start: DateTime<Utc>, interval: Duration) -> Self {
        Self {
            start,
            interval,
            rows: Vec::new(),
        }
    }

    fn next_timestamp(&self) -> f64 {
        let offset = self.interval * i32::try_from(self.rows.len()).unwrap();
        (self.start + offset).timestamp_millis() as f64
    }

    /// Appends a full candle.
    pub fn push(mut self, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        let ts = self.next_timestamp();
        self.rows.push([ts, open, close, high, low, volume]);
        self
    }

    /// Appends a candle whose open is the previous close and whose range is
    /// `close ± spread`.
    pub fn close(self, close: f64, spread: f64) -> Self {
        let open = self.rows.last().map_or(close, |row| row[2]);
        let high = open.max(close) + spread;
        let low = open.min(close) - spread;
        self.push(open, high, low, close, 1_000.0)
    }

    /// Appends one candle per close.
    pub fn closes(self, closes: impl IntoIterator<Item = f64>, spread: f64) -> Self {
        closes
            .into_iter()
            .fold(self, |builder, close| builder.close(close, spread))
    }

    /// Returns the rows built so far.
    pub fn build(self) -> Vec<Row> {
        self.rows
    }
}

/// Steadily rising closes, starting at 100 and gaining `step` per candle.
pub fn uptrend(len: usize, step: f64) -> Vec<Row> {
    CandleBuilder::default()
        .closes((0..len).map(|i| 100.0 + step * i as f64), 0.5)
        .build()
}

/// Oscillating closes around 100.
pub fn zigzag(len: usize) -> Vec<Row> {
    CandleBuilder::default()
        .closes(
            (0..len).map(|i| {
                let x = i as f64;
                100.0 + (x * 0.6).sin() * 8.0 + (x * 0.11).cos() * 3.0
            }),
            0.75,
        )
        .build()
}

/// `base` followed by `flat` candles whose open, high, low and close are all `price`.
pub fn flat_tail(mut base: Vec<Row>, flat: usize, price: f64) -> Vec<Row> {
    let step = match base.as_slice() {
        [.., prev, last] => last[0] - prev[0],
        _ => 60_000.0,
    };
    let mut ts = base.last().map_or(0.0, |row| row[0]);
    for _ in 0..flat {
        ts += step;
        base.push([ts, price, price, price, price, 1_000.0]);
    }
    base
}

/// Asserts two series are identical bit for bit, treating NaN as equal to NaN.
#[track_caller]
pub fn assert_series_eq(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len(), "series lengths differ");
    for (idx, (lhs, rhs)) in actual.iter().zip(expected).enumerate() {
        let same = (lhs.is_nan() && rhs.is_nan()) || lhs.to_bits() == rhs.to_bits();
        assert!(same, "series differ at {idx}: {lhs} != {rhs}");
    }
}

/// Asserts `actual` is within `tolerance` of `expected`.
#[track_caller]
pub fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected} ± {tolerance}, got {actual}"
    );
}

static TRACING: Once = Once::new();

/// Installs a test-writer subscriber honouring `RUST_LOG`; safe to call from every test.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
        tracing::debug!("test tracing initialised");
    });
}
