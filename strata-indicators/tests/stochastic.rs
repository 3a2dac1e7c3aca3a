use std::sync::atomic::{AtomicUsize, Ordering};

use strata_indicators::{
    rolling_max, stoch, FullHistory, IndicatorError, IndicatorResult, Lookback, MaInput,
    MaRegistry, MaType, MovingAverageProvider, OutputMode, Stochastic, StochasticParams,
};
use strata_test_utils::{assert_close, assert_series_eq, flat_tail, init_tracing, uptrend, zigzag};

const VALUE_ONLY: [MaType; 12] = [
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
];

const FINITE_WINDOW: [MaType; 6] = [
    MaType::Sma,
    MaType::Wma,
    MaType::Trima,
    MaType::Hma,
    MaType::LinearReg,
    MaType::SineWma,
];

fn with_smoothing(slowk: MaType, slowd: MaType) -> StochasticParams {
    StochasticParams {
        slowk_matype: slowk,
        slowd_matype: slowd,
        ..StochasticParams::default()
    }
}

fn sequential(candles: &[[f64; 6]], params: StochasticParams) -> (Vec<f64>, Vec<f64>) {
    let out = stoch(candles, params, OutputMode::Sequential).unwrap();
    (out.k.into_series(), out.d.into_series())
}

#[test]
fn scalar_is_the_tail_of_sequential() {
    init_tracing();
    let candles = zigzag(200);
    for slowk in VALUE_ONLY {
        for slowd in [MaType::Sma, slowk] {
            let params = with_smoothing(slowk, slowd);
            let (k, d) = sequential(&candles, params);
            let scalar = stoch(&candles, params, OutputMode::Scalar).unwrap();
            assert_series_eq(&[scalar.k.latest()], &k[k.len() - 1..]);
            assert_series_eq(&[scalar.d.latest()], &d[d.len() - 1..]);
        }
    }
}

#[test]
fn scalar_matches_sequential_beyond_the_trailing_window() {
    let candles = zigzag(600);
    for slowk in VALUE_ONLY {
        for slowd in [MaType::Sma, slowk] {
            let params = with_smoothing(slowk, slowd);
            let (k, d) = sequential(&candles, params);
            let scalar = stoch(&candles, params, OutputMode::Scalar).unwrap();
            assert_series_eq(&[scalar.k.latest(), scalar.d.latest()], &[k[599], d[599]]);
        }
    }
}

#[test]
fn long_tillson_smoothing_stays_defined_in_scalar_mode() {
    let candles = zigzag(600);
    let params = StochasticParams {
        slowk_period: 50,
        slowk_matype: MaType::T3,
        ..StochasticParams::default()
    };
    let (k, d) = sequential(&candles, params);
    assert!(!k[599].is_nan());
    let scalar = stoch(&candles, params, OutputMode::Scalar).unwrap();
    assert_series_eq(&[scalar.k.latest(), scalar.d.latest()], &[k[599], d[599]]);
}

#[test]
fn finite_window_chains_only_need_their_own_history() {
    let registry = MaRegistry::standard();
    let candles = zigzag(600);
    for kind in FINITE_WINDOW {
        let params = with_smoothing(kind, kind);
        let stochastic = Stochastic::new(params, &registry).unwrap();
        let Lookback::Bars(bars) = stochastic.lookback() else {
            panic!("{kind} should have a bounded lookback");
        };
        let tail = &candles[600 - bars..];
        let (k, d) = sequential(&candles, params);
        let out = stochastic.compute(tail, OutputMode::Scalar).unwrap();
        assert_series_eq(&[out.k.latest(), out.d.latest()], &[k[599], d[599]]);
    }
}

#[test]
fn full_history_slicer_matches_sequential_for_every_average() {
    let candles = zigzag(600);
    let registry = MaRegistry::standard();
    for kind in VALUE_ONLY {
        let params = with_smoothing(kind, kind);
        let (k, _) = sequential(&candles, params);
        let scalar = Stochastic::new(params, &registry)
            .unwrap()
            .with_slicer(&FullHistory)
            .compute(&candles, OutputMode::Scalar)
            .unwrap();
        assert_series_eq(&[scalar.k.latest()], &[k[599]]);
    }
}

#[test]
fn volume_weighted_smoothing_is_rejected_before_computing() {
    let candles = zigzag(50);
    for kind in [MaType::Vwma, MaType::Vwap] {
        for params in [with_smoothing(kind, MaType::Sma), with_smoothing(MaType::Sma, kind)] {
            let err = stoch(&candles, params, OutputMode::Sequential).unwrap_err();
            assert!(
                matches!(err, IndicatorError::NestedVolumeAverage { ma, .. } if ma == kind),
                "{err}"
            );
        }
    }
}

#[test]
fn flat_range_is_nan_through_both_stages() {
    let params = StochasticParams::default();
    let candles = flat_tail(zigzag(40), params.fastk_period, 90.0);
    let flat_end = candles.len() - 1;
    let (k, d) = sequential(&candles, params);
    assert!(!k[39].is_nan());
    assert!(k[flat_end].is_nan());
    assert!(d[flat_end].is_nan());

    // One bar short of a full flat window still has a range.
    let candles = flat_tail(zigzag(40), params.fastk_period - 1, 90.0);
    let (k, _) = sequential(&candles, params);
    assert!(!k[candles.len() - 1].is_nan());
}

#[test]
fn uptrend_pushes_k_towards_100() {
    let candles = uptrend(80, 1.0);
    let (k, d) = sequential(&candles, StochasticParams::default());
    for value in &k[20..] {
        assert!(*value >= 90.0 && *value <= 100.0, "k = {value}");
    }
    assert_close(d[79], k[79], 1e-9);
}

#[test]
fn identical_inputs_give_identical_outputs() {
    let candles = zigzag(300);
    let params = with_smoothing(MaType::Kama, MaType::T3);
    let (k1, d1) = sequential(&candles, params);
    let (k2, d2) = sequential(&candles, params);
    assert_series_eq(&k1, &k2);
    assert_series_eq(&d1, &d2);
}

#[test]
fn short_history_is_all_nan_not_an_error() {
    let candles = zigzag(10);
    let (k, d) = sequential(&candles, StochasticParams::default());
    assert_eq!(k.len(), 10);
    assert!(k.iter().chain(&d).all(|v| v.is_nan()));
    let scalar = stoch(&candles, StochasticParams::default(), OutputMode::Scalar).unwrap();
    assert!(scalar.k.latest().is_nan());
}

/// Passes values through unchanged and counts calls.
#[derive(Default)]
struct Passthrough {
    calls: AtomicUsize,
    volume_kinds: Vec<MaType>,
}

impl MovingAverageProvider for Passthrough {
    fn requires_volume(&self, kind: MaType) -> IndicatorResult<bool> {
        Ok(self.volume_kinds.contains(&kind))
    }

    fn compute(
        &self,
        _kind: MaType,
        input: &MaInput<'_>,
        _period: usize,
    ) -> IndicatorResult<Vec<f64>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(input.values().to_vec())
    }
}

#[test]
fn injected_provider_sees_the_raw_stochastic() {
    let provider = Passthrough::default();
    let candles = zigzag(60);
    let params = StochasticParams::default();
    let out = Stochastic::new(params, &provider)
        .unwrap()
        .compute(&candles, OutputMode::Sequential)
        .unwrap();
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);

    let highest = rolling_max(&candles.iter().map(|c| c[3]).collect::<Vec<_>>(), 14).unwrap();
    let k = out.k.as_series().unwrap();
    assert!(k[12].is_nan());
    let expected_last = {
        let low = candles[46..].iter().map(|c| c[4]).fold(f64::INFINITY, f64::min);
        100.0 * (candles[59][2] - low) / (highest[59] - low)
    };
    assert_close(k[59], expected_last, 1e-12);
    assert_series_eq(k, out.d.as_series().unwrap());
}

#[test]
fn injected_capability_flag_drives_validation() {
    let provider = Passthrough {
        volume_kinds: vec![MaType::Ema],
        ..Passthrough::default()
    };
    let err = Stochastic::new(with_smoothing(MaType::Sma, MaType::Ema), &provider)
        .err()
        .unwrap();
    assert_eq!(
        err,
        IndicatorError::NestedVolumeAverage {
            indicator: "Stochastic",
            stage: "slow %D",
            ma: MaType::Ema,
        }
    );
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}
