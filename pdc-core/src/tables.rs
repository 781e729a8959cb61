//! Datasheet configuration tables
//!
//! Each table pairs a configuration value with the bit code that the device
//! expects *before* shifting into its register field.
//!
//! ```text
//! Table               Field               Source
//! ----------------------------------------------------------------
//! ACCEL_RANGE_G       CTRL1_XL [3:1]      LSM6DSO32 §9.14 (FS_XL, padded)
//! GYRO_RANGE_DPS      CTRL2_G  [3:1]      LSM6DSO32 §9.15 (FS_G | FS_125)
//! IMU_ODR_HZ          CTRLx    [7:4]      LSM6DSO32 §9.14/§9.15
//! BARO_ODR_HZ         ODR      [4:0]      BMP388 §4.3.20
//! BARO_OSR            OSR [5:3]/[2:0]     BMP388 §4.3.19
//! ```
//!
//! The accelerometer range code is written into bits [3:1] like the
//! gyroscope's, with bit 1 always clear, so both axis sensors share one
//! control-register layout.

use crate::codec::CodeTable;

/// Accelerometer full scale (±g)
pub const ACCEL_RANGE_G: CodeTable<u16> = CodeTable::new(
    "unsupported accelerometer range",
    &[(4, 0), (32, 2), (8, 4), (16, 6)],
);

/// Gyroscope full scale (±dps)
pub const GYRO_RANGE_DPS: CodeTable<u16> = CodeTable::new(
    "unsupported gyroscope range",
    &[(250, 0), (125, 1), (500, 2), (1000, 4), (2000, 6)],
);

/// IMU output data rate (Hz), shared by accelerometer and gyroscope
pub const IMU_ODR_HZ: CodeTable<f32> = CodeTable::new(
    "unsupported IMU output data rate",
    &[
        (0.0, 0),
        (12.5, 1),
        (26.0, 2),
        (52.0, 3),
        (104.0, 4),
        (208.0, 5),
        (416.0, 6),
        (833.0, 7),
        (1660.0, 8),
        (3330.0, 9),
        (6660.0, 10),
    ],
);

/// Barometer output data rate (Hz)
pub const BARO_ODR_HZ: CodeTable<f32> = CodeTable::new(
    "unsupported barometer output data rate",
    &[
        (200.0, 0),
        (100.0, 1),
        (50.0, 2),
        (25.0, 3),
        (12.5, 4),
        (6.25, 5),
        (3.1, 6),
        (0.78, 7),
        (0.39, 8),
        (0.2, 9),
        (0.1, 10),
        (0.05, 11),
        (0.02, 12),
        (0.01, 13),
    ],
);

/// Barometer oversampling factor, used for both pressure and temperature
pub const BARO_OSR: CodeTable<u8> = CodeTable::new(
    "unsupported oversampling factor",
    &[(1, 0), (2, 1), (4, 2), (8, 3), (16, 4), (32, 5)],
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_round_trips() {
        for range in ACCEL_RANGE_G.values() {
            assert_eq!(ACCEL_RANGE_G.decode(ACCEL_RANGE_G.encode(range).unwrap()), Ok(range));
        }
        for range in GYRO_RANGE_DPS.values() {
            assert_eq!(GYRO_RANGE_DPS.decode(GYRO_RANGE_DPS.encode(range).unwrap()), Ok(range));
        }
        for hz in IMU_ODR_HZ.values() {
            assert_eq!(IMU_ODR_HZ.decode(IMU_ODR_HZ.encode(hz).unwrap()), Ok(hz));
        }
        for hz in BARO_ODR_HZ.values() {
            assert_eq!(BARO_ODR_HZ.decode(BARO_ODR_HZ.encode(hz).unwrap()), Ok(hz));
        }
        for osr in BARO_OSR.values() {
            assert_eq!(BARO_OSR.decode(BARO_OSR.encode(osr).unwrap()), Ok(osr));
        }
    }

    #[test]
    fn unsupported_values_are_rejected() {
        for range in [0u16, 2, 5, 12, 64, 65535] {
            assert!(ACCEL_RANGE_G.encode(range).is_err());
        }
        for range in [0u16, 100, 245, 4000] {
            assert!(GYRO_RANGE_DPS.encode(range).is_err());
        }
        assert!(IMU_ODR_HZ.encode(12.0).is_err());
        assert!(IMU_ODR_HZ.encode(13.0).is_err());
        assert!(BARO_ODR_HZ.encode(6.0).is_err());
        assert!(BARO_OSR.encode(3).is_err());
    }

    #[test]
    fn datasheet_codes() {
        assert_eq!(ACCEL_RANGE_G.encode(32), Ok(2));
        assert_eq!(GYRO_RANGE_DPS.encode(125), Ok(1));
        assert_eq!(IMU_ODR_HZ.encode(12.5), Ok(1));
        assert_eq!(BARO_ODR_HZ.encode(12.5), Ok(4));
        assert_eq!(BARO_ODR_HZ.len(), 14);
    }
}
