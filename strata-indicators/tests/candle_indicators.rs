use chrono::{Duration, TimeZone, Utc};
use strata_indicators::{
    ma, ma_series, tsf, wma, wma_series, MaParams, MaType, OutputMode, Source,
    DEFAULT_WARMUP_CANDLES,
};
use strata_test_utils::{assert_close, assert_series_eq, zigzag, CandleBuilder};

#[test]
fn vwap_reanchors_at_utc_midnight() {
    let start = Utc.with_ymd_and_hms(2024, 3, 1, 22, 0, 0).unwrap();
    let candles = CandleBuilder::new(start, Duration::hours(1))
        .push(10.0, 10.0, 10.0, 10.0, 1.0)
        .push(20.0, 20.0, 20.0, 20.0, 3.0)
        .push(40.0, 40.0, 40.0, 40.0, 2.0)
        .push(10.0, 10.0, 10.0, 10.0, 2.0)
        .build();
    let params = MaParams {
        period: 1,
        matype: MaType::Vwap,
        source: Source::Close,
    };
    let out = ma(&candles, params, OutputMode::Sequential).unwrap();
    let series = out.as_series().unwrap();
    assert_close(series[1], 70.0 / 4.0, 1e-12);
    // 00:00 starts a new session.
    assert_close(series[2], 40.0, 1e-12);
    assert_close(series[3], 25.0, 1e-12);
}

#[test]
fn candle_ma_matches_series_ma_for_value_kinds() {
    let candles = zigzag(120);
    let closes = Source::Close.extract(&candles);
    for kind in [MaType::Ema, MaType::Kama, MaType::Hma, MaType::T3] {
        let params = MaParams {
            period: 10,
            matype: kind,
            source: Source::Close,
        };
        let from_candles = ma(&candles, params, OutputMode::Sequential).unwrap();
        let from_series = ma_series(&closes, 10, kind, OutputMode::Sequential).unwrap();
        assert_series_eq(
            from_candles.as_series().unwrap(),
            from_series.as_series().unwrap(),
        );
    }
}

#[test]
fn scalar_calls_only_look_at_the_trailing_window() {
    let candles = zigzag(DEFAULT_WARMUP_CANDLES + 100);
    let tail = &candles[100..];
    let full = wma(&candles, 30, Source::Hlc3, OutputMode::Scalar).unwrap();
    let trimmed = wma(tail, 30, Source::Hlc3, OutputMode::Scalar).unwrap();
    assert_series_eq(&[full.latest()], &[trimmed.latest()]);

    let closes = Source::Close.extract(&candles);
    let sequential = wma_series(&closes, 30, OutputMode::Sequential).unwrap();
    let scalar = wma(&candles, 30, Source::Close, OutputMode::Scalar).unwrap();
    assert_series_eq(&[sequential.latest()], &[scalar.latest()]);
}

#[test]
fn tsf_degrades_to_nan_on_short_history() {
    let candles = zigzag(5);
    let out = tsf(&candles, 14, Source::Close, OutputMode::Sequential).unwrap();
    assert_eq!(out.as_series().unwrap().len(), 5);
    assert!(out.latest().is_nan());
}
