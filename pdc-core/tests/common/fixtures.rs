//! Calibration fixtures
//!
//! One plausible NVM image with its decoded coefficients and compensated
//! results worked out by hand (double precision).
//!
//! ```text
//! T1 = 27504  T2 = 26435  T3 = -7
//! P1 = 6000   P2 = -14000 P3 = 36  P4 = 0   P5 = 25000  P6 = 29000
//! P7 = 3      P8 = -7     P9 = 14000        P10 = 10    P11 = -60
//! ```

#![allow(dead_code)]

/// Registers 0x31..=0x45
pub const NVM: [u8; 21] = [
    0x70, 0x6B, // T1
    0x43, 0x67, // T2
    0xF9, // T3
    0x70, 0x17, // P1
    0x50, 0xC9, // P2
    0x24, // P3
    0x00, // P4
    0xA8, 0x61, // P5
    0x48, 0x71, // P6
    0x03, // P7
    0xF9, // P8
    0xB0, 0x36, // P9
    0x0A, // P10
    0xC4, // P11
];

/// Raw temperature count, 0x7AECC0
pub const RAW_TEMPERATURE: u32 = 8_056_000;
/// Raw pressure count, 0x989680
pub const RAW_PRESSURE: u32 = 10_000_000;

/// Bytes of RAW_PRESSURE then RAW_TEMPERATURE as they sit at 0x04..=0x09
pub const DATA_BURST: [u8; 6] = [0x80, 0x96, 0x98, 0xC0, 0xEC, 0x7A];

/// compT for RAW_TEMPERATURE (°C)
pub const EXPECTED_TEMPERATURE_C: f64 = 24.962_594_626_020_29;
/// compP for RAW_PRESSURE at EXPECTED_TEMPERATURE_C (Pa)
pub const EXPECTED_PRESSURE_PA: f64 = 101_646.542_055_191_41;

/// Decoded coefficients in table order
pub fn expected_coefficients() -> [f64; 14] {
    let p = |exp: i32| 2f64.powi(exp);
    [
        27504.0 * 256.0,
        26435.0 / p(30),
        -7.0 / p(48),
        (6000.0 - 16384.0) / p(20),
        (-14000.0 - 16384.0) / p(29),
        36.0 / p(32),
        0.0,
        25000.0 * 8.0,
        29000.0 / p(6),
        3.0 / p(8),
        -7.0 / p(15),
        14000.0 / p(48),
        10.0 / p(48),
        -60.0 / p(65),
    ]
}

/// Relative comparison for compensated values
pub fn assert_close(actual: f64, expected: f64, rel: f64) {
    let scale = expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= rel * scale,
        "expected {expected}, got {actual}"
    );
}
