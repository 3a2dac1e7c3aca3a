//! Exponential averages and the families built by chaining them.

use std::marker::PhantomData;

use crate::core::{
    collect_series, ensure_period, float_from_usize, Indicator, IndicatorResult, Input,
};

use super::MaInput;

/// Volume factor applied by [`T3`].
pub const T3_VOLUME_FACTOR: f64 = 0.7;

/// Exponential average seeded with the SMA of its first `period` inputs.
#[derive(Debug, Clone)]
pub struct Ema<I = f64> {
    period: usize,
    alpha: f64,
    divisor: f64,
    state: Option<f64>,
    warmup_sum: f64,
    warmup_count: usize,
    marker: PhantomData<I>,
}

impl<I> Ema<I>
where
    I: Input,
{
    /// Creates an EMA with the usual `2 / (period + 1)` smoothing factor.
    pub fn new(period: usize) -> IndicatorResult<Self> {
        ensure_period("EMA", period)?;
        Ok(Self::with_alpha(period, 2.0 / float_from_usize(period + 1)))
    }

    /// Creates Wilder's average, an EMA with a `1 / period` smoothing factor.
    pub fn wilders(period: usize) -> IndicatorResult<Self> {
        ensure_period("Wilders", period)?;
        Ok(Self::with_alpha(period, 1.0 / float_from_usize(period)))
    }

    fn with_alpha(period: usize, alpha: f64) -> Self {
        Self {
            period,
            alpha,
            divisor: float_from_usize(period),
            state: None,
            warmup_sum: 0.0,
            warmup_count: 0,
            marker: PhantomData,
        }
    }

    /// Returns the current value, if the average has produced one.
    pub fn value(&self) -> Option<f64> {
        self.state
    }
}

impl<I> Indicator for Ema<I>
where
    I: Input,
{
    type Input = I;
    type Output = f64;

    fn next(&mut self, input: Self::Input) -> Option<Self::Output> {
        let value = input.value();

        let next = match self.state {
            Some(current) => (value - current) * self.alpha + current,
            None => {
                self.warmup_sum += value;
                self.warmup_count += 1;
                if self.warmup_count < self.period {
                    return None;
                }
                self.warmup_sum / self.divisor
            }
        };
        self.state = Some(next);
        Some(next)
    }

    fn reset(&mut self) {
        self.state = None;
        self.warmup_sum = 0.0;
        self.warmup_count = 0;
    }
}

/// Double exponential average: `2·EMA - EMA(EMA)`.
#[derive(Debug, Clone)]
pub struct Dema {
    ema: Ema,
    ema_of_ema: Ema,
}

impl Dema {
    /// Creates a DEMA whose two stages share `period`.
    pub fn new(period: usize) -> IndicatorResult<Self> {
        ensure_period("DEMA", period)?;
        Ok(Self {
            ema: Ema::new(period)?,
            ema_of_ema: Ema::new(period)?,
        })
    }
}

impl Indicator for Dema {
    type Input = f64;
    type Output = f64;

    fn next(&mut self, input: f64) -> Option<f64> {
        let e1 = self.ema.next(input)?;
        let e2 = self.ema_of_ema.next(e1)?;
        Some(2.0 * e1 - e2)
    }

    fn reset(&mut self) {
        self.ema.reset();
        self.ema_of_ema.reset();
    }
}

/// Triple exponential average: `3·e1 - 3·e2 + e3`.
#[derive(Debug, Clone)]
pub struct Tema {
    stages: [Ema; 3],
}

impl Tema {
    /// Creates a TEMA whose three stages share `period`.
    pub fn new(period: usize) -> IndicatorResult<Self> {
        ensure_period("TEMA", period)?;
        Ok(Self {
            stages: [Ema::new(period)?, Ema::new(period)?, Ema::new(period)?],
        })
    }
}

impl Indicator for Tema {
    type Input = f64;
    type Output = f64;

    fn next(&mut self, input: f64) -> Option<f64> {
        let [first, second, third] = &mut self.stages;
        let e1 = first.next(input)?;
        let e2 = second.next(e1)?;
        let e3 = third.next(e2)?;
        Some(3.0 * e1 - 3.0 * e2 + e3)
    }

    fn reset(&mut self) {
        self.stages.iter_mut().for_each(Indicator::reset);
    }
}

/// Tillson's T3: six chained EMAs blended with the volume factor.
#[derive(Debug, Clone)]
pub struct T3 {
    stages: Vec<Ema>,
    coefficients: [f64; 4],
}

impl T3 {
    /// Creates a T3 using [`T3_VOLUME_FACTOR`].
    pub fn new(period: usize) -> IndicatorResult<Self> {
        Self::with_volume_factor(period, T3_VOLUME_FACTOR)
    }

    /// Creates a T3 with a custom volume factor.
    pub fn with_volume_factor(period: usize, volume_factor: f64) -> IndicatorResult<Self> {
        ensure_period("T3", period)?;
        if !volume_factor.is_finite() {
            return Err(crate::IndicatorError::invalid_parameter(
                "T3",
                "volume_factor",
                volume_factor,
            ));
        }
        let v = volume_factor;
        let v2 = v * v;
        let v3 = v2 * v;
        let coefficients = [
            -v3,
            3.0 * v2 + 3.0 * v3,
            -6.0 * v2 - 3.0 * v - 3.0 * v3,
            1.0 + 3.0 * v + v3 + 3.0 * v2,
        ];
        let stages = (0..6)
            .map(|_| Ema::new(period))
            .collect::<IndicatorResult<Vec<_>>>()?;
        Ok(Self {
            stages,
            coefficients,
        })
    }
}

impl Indicator for T3 {
    type Input = f64;
    type Output = f64;

    fn next(&mut self, input: f64) -> Option<f64> {
        let mut levels = [0.0; 6];
        let mut value = input;
        for (level, stage) in levels.iter_mut().zip(self.stages.iter_mut()) {
            value = stage.next(value)?;
            *level = value;
        }
        let [c1, c2, c3, c4] = self.coefficients;
        Some(c1 * levels[5] + c2 * levels[4] + c3 * levels[3] + c4 * levels[2])
    }

    fn reset(&mut self) {
        self.stages.iter_mut().for_each(Indicator::reset);
    }
}

pub(crate) fn ema_kernel(input: &MaInput<'_>, period: usize) -> IndicatorResult<Vec<f64>> {
    Ok(collect_series(&mut Ema::new(period)?, input.values()))
}

pub(crate) fn wilders_kernel(input: &MaInput<'_>, period: usize) -> IndicatorResult<Vec<f64>> {
    Ok(collect_series(&mut Ema::wilders(period)?, input.values()))
}

pub(crate) fn dema_kernel(input: &MaInput<'_>, period: usize) -> IndicatorResult<Vec<f64>> {
    Ok(collect_series(&mut Dema::new(period)?, input.values()))
}

pub(crate) fn tema_kernel(input: &MaInput<'_>, period: usize) -> IndicatorResult<Vec<f64>> {
    Ok(collect_series(&mut Tema::new(period)?, input.values()))
}

pub(crate) fn t3_kernel(input: &MaInput<'_>, period: usize) -> IndicatorResult<Vec<f64>> {
    Ok(collect_series(&mut T3::new(period)?, input.values()))
}
