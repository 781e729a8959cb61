//! Integration tests for the barometer against a simulated register map
//!
//! Covers:
//! - Calibration decoding from literal NVM bytes
//! - Compensated temperature and pressure against hand-computed values
//! - Burst and per-register reads agreeing
//! - Dummy-byte handling, configuration writes and restart
//! - Altitude monotonicity (property test)

#![cfg(test)]

mod common;

use pdc_core::baro::{
    AltitudeModel, Bmp388, CalibrationParameterSet, CompensationEngine,
};
use pdc_core::constants::sensors::{
    BARO_CHIP_ID_REG, BARO_CMD_REG, BARO_ODR_REG, BARO_OSR_REG, BARO_PRESSURE_DATA_REG,
    BARO_PWR_CTRL_REG,
};
use pdc_core::time::{FixedTime, TimeSource};
use pdc_core::{BusError, SensorError};
use proptest::prelude::*;

use common::fixtures::{
    assert_close, expected_coefficients, DATA_BURST, EXPECTED_PRESSURE_PA, EXPECTED_TEMPERATURE_C,
    NVM, RAW_PRESSURE, RAW_TEMPERATURE,
};
use common::{SimulatedBus, BARO};

fn configured_baro(bus: &mut SimulatedBus) -> Bmp388 {
    bus.set_bytes(BARO, BARO_PRESSURE_DATA_REG, &DATA_BURST);
    let mut baro = Bmp388::new(BARO);
    baro.configure(bus, 50.0, 8, 2).unwrap();
    baro
}

#[test]
fn test_nvm_bytes_decode_to_datasheet_coefficients() {
    let params = CalibrationParameterSet::from_nvm(&NVM);
    for (actual, expected) in params.coefficients().iter().zip(expected_coefficients()) {
        assert_eq!(*actual, expected);
    }
}

#[test]
fn test_per_parameter_reads_match_burst() {
    let mut bus = SimulatedBus::recorder();
    let each = CalibrationParameterSet::read_each(&mut bus, BARO).unwrap();
    let burst = CalibrationParameterSet::read_burst(&mut bus, BARO).unwrap();
    assert_eq!(each, burst);
    assert_eq!(each, CalibrationParameterSet::from_nvm(&NVM));
    // one extra byte per transaction for the dummy
    assert_eq!(bus.reads()[0], (BARO, 0x31, 3));
}

#[test]
fn test_compensation_matches_hand_computation() {
    let engine = CompensationEngine::new(&CalibrationParameterSet::from_nvm(&NVM));

    let temperature = engine.compensate_temperature(RAW_TEMPERATURE).unwrap();
    assert_close(temperature, EXPECTED_TEMPERATURE_C, 1e-9);

    let pressure = engine.compensate_pressure(RAW_PRESSURE, temperature).unwrap();
    assert_close(pressure, EXPECTED_PRESSURE_PA, 1e-9);
}

#[test]
fn test_configure_writes_registers_then_loads_calibration() {
    let mut bus = SimulatedBus::recorder();
    let baro = configured_baro(&mut bus);

    // 50 Hz → 2; OSR ×2 temperature (1) in [5:3], ×8 pressure (3) in [2:0]
    assert_eq!(bus.writes_to(BARO, BARO_ODR_REG), vec![2]);
    assert_eq!(bus.writes_to(BARO, BARO_OSR_REG), vec![(1 << 3) | 3]);
    assert_eq!(baro.calibration(), Some(&CalibrationParameterSet::from_nvm(&NVM)));
    assert_eq!(baro.configuration().unwrap().pressure_oversampling, 8);
}

#[test]
fn test_unsupported_settings_write_nothing() {
    let mut bus = SimulatedBus::recorder();
    let mut baro = Bmp388::new(BARO);

    assert!(matches!(baro.configure(&mut bus, 60.0, 1, 1), Err(SensorError::Configuration { .. })));
    assert!(matches!(baro.configure(&mut bus, 50.0, 1, 64), Err(SensorError::Configuration { .. })));
    assert!(bus.writes().is_empty());
    assert!(baro.configuration().is_none());
}

#[test]
fn test_interrupted_configure_leaves_driver_unconfigured() {
    let mut bus = SimulatedBus::recorder();
    let mut baro = configured_baro(&mut bus);
    bus.clear_log();

    // the ODR write lands, the OSR write does not
    bus.fail_after(1, BusError::Timeout);
    let result = baro.configure(&mut bus, 25.0, 4, 1);

    assert_eq!(result, Err(SensorError::Bus(BusError::Timeout)));
    assert_eq!(bus.writes_to(BARO, BARO_ODR_REG), vec![3]);
    assert!(baro.configuration().is_none());
    assert!(baro.calibration().is_none());

    bus.fail_with(None);
    assert_eq!(baro.read_pressure(&mut bus), Err(SensorError::NotConfigured));
    baro.configure(&mut bus, 25.0, 4, 1).unwrap();
    assert_eq!(baro.configuration().unwrap().output_frequency_hz, 25.0);
}

#[test]
fn test_readings_before_configuration_fail() {
    let mut bus = SimulatedBus::recorder();
    let baro = Bmp388::new(BARO);
    assert_eq!(baro.read_pressure(&mut bus), Err(SensorError::NotConfigured));
    assert_eq!(baro.read_temperature(&mut bus), Err(SensorError::NotConfigured));
}

#[test]
fn test_burst_matches_per_register_reads() {
    let mut bus = SimulatedBus::recorder();
    let baro = configured_baro(&mut bus);

    let raw = baro.read_raw(&mut bus).unwrap();
    assert_eq!(raw.pressure, RAW_PRESSURE);
    assert_eq!(raw.temperature, RAW_TEMPERATURE);
    assert_eq!(baro.read_raw_pressure(&mut bus).unwrap(), raw.pressure);
    assert_eq!(baro.read_raw_temperature(&mut bus).unwrap(), raw.temperature);

    let measurement = baro.read_measurement(&mut bus).unwrap();
    assert_close(measurement.temperature_c, EXPECTED_TEMPERATURE_C, 1e-9);
    assert_close(measurement.pressure_pa, EXPECTED_PRESSURE_PA, 1e-9);
    assert_close(baro.read_temperature(&mut bus).unwrap(), measurement.temperature_c, 1e-12);

    let altitude = AltitudeModel::default().altitude(EXPECTED_PRESSURE_PA);
    assert_close(measurement.altitude_m, altitude, 1e-9);
    assert!(altitude < 0.0, "above-standard pressure reads below sea level");
}

#[test]
fn test_plausibility_check_rejects_garbage_conversion() {
    let mut bus = SimulatedBus::recorder();
    bus.set_bytes(BARO, BARO_PRESSURE_DATA_REG, &[0xFF; 6]);
    let mut baro = Bmp388::new(BARO).with_plausibility_check(true);
    baro.configure(&mut bus, 50.0, 8, 2).unwrap();

    assert!(matches!(
        baro.read_measurement(&mut bus),
        Err(SensorError::ImplausibleReading { .. })
    ));
}

#[test]
fn test_zero_altitude_references_the_pad() {
    let mut bus = SimulatedBus::recorder();
    let mut baro = configured_baro(&mut bus);

    let ground = baro.zero_altitude(&mut bus).unwrap();
    assert_close(ground, EXPECTED_PRESSURE_PA, 1e-9);
    assert!(baro.read_altitude(&mut bus).unwrap().abs() < 1e-6);
}

#[test]
fn test_identity_skips_dummy_byte() {
    let mut bus = SimulatedBus::recorder();
    let clock = FixedTime::new(0);
    let baro = Bmp388::new(BARO);

    assert!(baro.is_alive(&mut bus, &mut &clock));
    assert_eq!(bus.reads(), &[(BARO, BARO_CHIP_ID_REG, 2)]);
    assert_eq!(clock.now(), 0);
}

#[test]
fn test_restart_sequence() {
    let mut bus = SimulatedBus::recorder();
    let mut baro = configured_baro(&mut bus);
    let clock = FixedTime::new(0);
    bus.clear_log();

    baro.restart(&mut bus, &mut &clock).unwrap();
    assert_eq!(bus.writes_to(BARO, BARO_CMD_REG), vec![0xB6]);
    assert_eq!(bus.writes_to(BARO, BARO_PWR_CTRL_REG), vec![0x33]);
    assert_eq!(clock.now(), 2000);
    assert!(baro.configuration().is_none());
    assert_eq!(baro.read_pressure(&mut bus), Err(SensorError::NotConfigured));
}

#[test]
fn test_ground_reference_must_be_positive() {
    assert!(AltitudeModel::with_ground_reference(-5.0).is_err());
    assert!(AltitudeModel::with_ground_reference(f64::NAN).is_err());
}

proptest! {
    #[test]
    fn altitude_never_increases_with_pressure(
        reference in 800.0f64..1100.0,
        low in 30_000.0f64..125_000.0,
        step in 0.0f64..10_000.0,
    ) {
        let model = AltitudeModel::new(reference).unwrap();
        let high = low + step;
        prop_assert!(model.altitude(high) <= model.altitude(low));
    }

    #[test]
    fn altitude_is_zero_at_reference(reference in 300.0f64..1250.0) {
        let model = AltitudeModel::new(reference).unwrap();
        prop_assert!(model.altitude(reference * 100.0).abs() < 1e-6);
    }
}
