//! Integration tests for online noise characterization
//!
//! Covers:
//! - Constant and alternating samplers against closed-form statistics
//! - Outlier rejection and exact accepted counts
//! - Timeout returning a partial report, divided by the requested count
//! - Non-finite samples never reaching the statistic
//! - Population vs sample divisor
//! - Driving a run through `poll` from a flight loop
//! - Characterizing a real axis through the simulated bus

#![cfg(test)]

mod common;

use pdc_core::constants::sensors::IMU_OUTX_L_A_REG;
use pdc_core::imu::{Axis, Lsm6dso32};
use pdc_core::noise::{NoiseCharacterizer, NoiseConfig, PartialRunDivisor, VarianceDivisor};
use pdc_core::time::{FixedTime, TimeSource};
use pdc_core::{BusError, SensorError};
use proptest::prelude::*;

use common::{SimulatedBus, IMU};

const G: f32 = 9.806_65;

#[test]
fn test_constant_sampler_has_zero_noise() {
    let clock = FixedTime::new(1_000);
    let characterizer = NoiseCharacterizer::default();

    let report = characterizer.characterize(G, &clock, &mut &clock, || Ok(G)).unwrap();
    assert_eq!(report.accepted, 50);
    assert_eq!(report.rejected, 0);
    assert!(!report.timed_out);
    assert!(report.std_dev.abs() < 1e-6);
    assert!((report.mean - G).abs() < 1e-6);
    // first sample one interval after start, then every 100 ms
    assert_eq!(report.elapsed_ms, 5_000);
}

#[test]
fn test_single_outlier_is_excluded() {
    let clock = FixedTime::new(0);
    let characterizer = NoiseCharacterizer::default();
    let mut calls = 0usize;

    let report = characterizer
        .characterize(G, &clock, &mut &clock, || {
            calls += 1;
            Ok(if calls == 10 { G + 5.0 } else { G })
        })
        .unwrap();

    assert_eq!(calls, 51);
    assert_eq!(report.accepted, 50);
    assert_eq!(report.rejected, 1);
    assert!(report.std_dev.abs() < 1e-6);
}

#[test]
fn test_alternating_samples_match_closed_form() {
    let clock = FixedTime::new(0);
    let characterizer = NoiseCharacterizer::new(NoiseConfig::default().with_samples(10));
    let mut flip = false;

    let report = characterizer
        .characterize(0.0, &clock, &mut &clock, || {
            flip = !flip;
            Ok(if flip { 0.1 } else { -0.1 })
        })
        .unwrap();

    // population σ of ±0.1 is 0.1
    assert!((report.std_dev - 0.1).abs() < 1e-6);
    assert!(report.mean.abs() < 1e-6);
}

#[test]
fn test_timeout_returns_partial_statistic() {
    let clock = FixedTime::new(0);
    let config = NoiseConfig::default()
        .with_samples(50)
        .with_interval_ms(100)
        .with_timeout_ms(1_000);
    let characterizer = NoiseCharacterizer::new(config);
    let mut calls = 0usize;

    // every other sample is an outlier; the budget runs out first
    let report = characterizer
        .characterize(0.0, &clock, &mut &clock, || {
            calls += 1;
            Ok(if calls % 2 == 0 { 10.0 } else { 0.0 })
        })
        .unwrap();

    assert!(report.timed_out);
    assert_eq!(report.accepted + report.rejected, 10);
    assert_eq!(report.accepted, 5);
    assert!(report.elapsed_ms > 1_000);
    assert!(clock.now() <= 1_001);
}

/// ±0.25 around zero with every third read far off, 10 reads fit in the budget
fn short_run(partial: PartialRunDivisor) -> pdc_core::noise::NoiseReport {
    let clock = FixedTime::new(0);
    let config = NoiseConfig::default()
        .with_samples(20)
        .with_timeout_ms(1_000)
        .with_partial_divisor(partial);
    let mut calls = 0usize;
    let mut accepted = 0usize;

    NoiseCharacterizer::new(config)
        .characterize(0.0, &clock, &mut &clock, || {
            calls += 1;
            if calls % 3 == 0 {
                return Ok(5.0);
            }
            accepted += 1;
            Ok(if accepted % 2 == 1 { 0.25 } else { -0.25 })
        })
        .unwrap()
}

#[test]
fn test_timed_out_run_divides_by_requested_count() {
    let report = short_run(PartialRunDivisor::default());
    assert!(report.timed_out);
    assert_eq!((report.accepted, report.rejected), (7, 3));
    // sum of squares is 3/7, spread over the 20 requested samples
    assert!((report.std_dev - 0.146_385).abs() < 1e-5, "got {}", report.std_dev);

    let report = short_run(PartialRunDivisor::Accepted);
    assert!((report.std_dev - 0.247_436).abs() < 1e-5, "got {}", report.std_dev);
}

#[test]
fn test_nan_sample_mid_run_is_rejected() {
    let clock = FixedTime::new(0);
    let characterizer = NoiseCharacterizer::new(NoiseConfig::default().with_samples(5));
    let mut calls = 0usize;

    let report = characterizer
        .characterize(0.0, &clock, &mut &clock, || {
            calls += 1;
            Ok(match calls {
                2 => f32::NAN,
                n if n % 2 == 0 => 0.1,
                _ => -0.1,
            })
        })
        .unwrap();

    assert_eq!(report.accepted, 5);
    assert_eq!(report.rejected, 1);
    assert!(report.mean.is_finite());
    assert!(report.std_dev > 0.05 && report.std_dev.is_finite());
}

#[test]
fn test_timeout_with_nothing_accepted() {
    let clock = FixedTime::new(0);
    let characterizer = NoiseCharacterizer::new(NoiseConfig::default().with_timeout_ms(500));

    let report = characterizer.characterize(G, &clock, &mut &clock, || Ok(0.0)).unwrap();
    assert!(report.timed_out);
    assert_eq!(report.accepted, 0);
    assert_eq!(report.std_dev, 0.0);
    assert_eq!(report.mean, 0.0);
}

#[test]
fn test_too_few_samples_rejected_before_sampling() {
    let clock = FixedTime::new(0);
    let characterizer = NoiseCharacterizer::new(NoiseConfig::default().with_samples(1));
    let mut called = false;

    let result = characterizer.characterize(G, &clock, &mut &clock, || {
        called = true;
        Ok(G)
    });
    assert_eq!(result, Err(SensorError::InvalidSampleCount { requested: 1 }));
    assert!(!called);
    assert_eq!(clock.now(), 0);
}

#[test]
fn test_sampler_error_aborts_run() {
    let clock = FixedTime::new(0);
    let characterizer = NoiseCharacterizer::default();
    let mut calls = 0;

    let result = characterizer.characterize(G, &clock, &mut &clock, || {
        calls += 1;
        if calls == 3 {
            Err(SensorError::Bus(BusError::Timeout))
        } else {
            Ok(G)
        }
    });
    assert_eq!(result, Err(SensorError::Bus(BusError::Timeout)));
}

#[test]
fn test_poll_yields_between_samples() {
    let characterizer = NoiseCharacterizer::new(
        NoiseConfig::default().with_samples(3).with_interval_ms(20),
    );
    let mut run = characterizer.start(G, 0).unwrap();
    let mut sampler = || -> pdc_core::SensorResult<f32> { Ok(G) };

    let mut now = 0;
    let mut yields = 0;
    let report = loop {
        match run.poll(now, &mut sampler) {
            Ok(report) => break report,
            Err(nb::Error::WouldBlock) => {
                yields += 1;
                // the flight loop ticks every 5 ms
                now += 5;
            }
            Err(nb::Error::Other(err)) => panic!("unexpected {err:?}"),
        }
    };

    assert_eq!(report.accepted, 3);
    assert_eq!(report.elapsed_ms, 60);
    assert_eq!(yields, 12);
    assert_eq!(run.statistic().count(), 3);
}

#[test]
fn test_axis_noise_through_the_bus() {
    let mut bus = SimulatedBus::recorder();
    let mut imu = Lsm6dso32::new(IMU);
    imu.accel_mut().configure(&mut bus, 104.0, 4).unwrap();
    bus.set_i16(IMU, IMU_OUTX_L_A_REG + 4, 8192);
    let clock = FixedTime::new(0);
    let characterizer = NoiseCharacterizer::new(NoiseConfig::default().with_samples(5));

    let report = imu
        .accel()
        .characterize_noise(&mut bus, Axis::Z, &characterizer, G, &clock, &mut &clock)
        .unwrap();
    assert_eq!(report.accepted, 5);
    assert!(report.std_dev < 1e-6);
    assert!((report.mean - G).abs() < 1e-3);
}

#[test]
fn test_unconfigured_axis_is_refused() {
    let mut bus = SimulatedBus::recorder();
    let imu = Lsm6dso32::new(IMU);
    let clock = FixedTime::new(0);

    let result = imu.gyro().characterize_noise(
        &mut bus,
        Axis::X,
        &NoiseCharacterizer::default(),
        0.0,
        &clock,
        &mut &clock,
    );
    assert_eq!(result, Err(SensorError::NotConfigured));
    assert!(bus.reads().is_empty());
}

proptest! {
    #[test]
    fn sample_divisor_scales_by_bessel_factor(
        samples in prop::collection::vec(-0.25f32..0.25, 2..60),
    ) {
        let n = samples.len();
        let run = |divisor| {
            let clock = FixedTime::new(0);
            let config = NoiseConfig::default().with_samples(n).with_divisor(divisor);
            let mut values = samples.iter().copied();
            NoiseCharacterizer::new(config)
                .characterize(0.0, &clock, &mut &clock, || Ok(values.next().unwrap_or(0.0)))
                .unwrap()
        };

        let population = run(VarianceDivisor::Population);
        let sample = run(VarianceDivisor::Sample);
        prop_assert_eq!(population.accepted, n);

        let factor = ((n as f64) / (n as f64 - 1.0)).sqrt();
        let expected = f64::from(population.std_dev) * factor;
        prop_assert!((f64::from(sample.std_dev) - expected).abs() <= 1e-5 * expected.max(1e-6));
    }
}
