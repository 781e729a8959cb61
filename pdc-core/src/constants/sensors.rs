//! Register Maps for the On-Board Sensors
//!
//! Addresses, identity values and command bytes for the LSM6DSO32 inertial
//! unit and the BMP388 barometer.

// ===== LSM6DSO32 (IMU) =====

/// WHO_AM_I identity register.
pub const IMU_WHO_AM_I_REG: u8 = 0x0F;

/// Fixed value of WHO_AM_I.
///
/// Source: ST LSM6DSO32 datasheet, section 9.12
pub const IMU_WHO_AM_I_VAL: u8 = 0x6C;

/// Accelerometer control register (ODR bits [7:4], full scale bits [3:2]).
pub const IMU_CTRL1_XL_REG: u8 = 0x10;

/// Gyroscope control register (ODR bits [7:4], full scale bits [3:1]).
pub const IMU_CTRL2_G_REG: u8 = 0x11;

/// Control register 3 (reboot, software reset, address auto-increment).
pub const IMU_CTRL3_C_REG: u8 = 0x12;

/// Control register 5 (self-test enables).
pub const IMU_CTRL5_C_REG: u8 = 0x14;

/// Gyroscope X-axis low byte. Y and Z follow at +2 and +4.
pub const IMU_OUTX_L_G_REG: u8 = 0x22;

/// Accelerometer X-axis low byte. Y and Z follow at +2 and +4.
pub const IMU_OUTX_L_A_REG: u8 = 0x28;

/// BOOT | SW_RESET written to CTRL3_C.
pub const IMU_RESET_CMD: u8 = 0x81;

/// CTRL5_C value enabling the positive accelerometer self-test.
pub const IMU_SELF_TEST_ACCEL: u8 = 0x01;

/// CTRL5_C value enabling the positive gyroscope self-test.
pub const IMU_SELF_TEST_GYRO: u8 = 0x04;

/// Minimum accelerometer self-test displacement (g) at ±4 g.
///
/// Source: ST LSM6DSO32 datasheet, table 3
pub const IMU_SELF_TEST_ACCEL_MIN_G: f32 = 0.050;

/// Maximum accelerometer self-test displacement (g) at ±4 g.
pub const IMU_SELF_TEST_ACCEL_MAX_G: f32 = 1.700;

/// Minimum gyroscope self-test displacement (dps) at ±2000 dps.
pub const IMU_SELF_TEST_GYRO_MIN_DPS: f32 = 150.0;

/// Maximum gyroscope self-test displacement (dps) at ±2000 dps.
pub const IMU_SELF_TEST_GYRO_MAX_DPS: f32 = 700.0;

// ===== BMP388 (BAROMETER) =====

/// CHIP_ID identity register.
pub const BARO_CHIP_ID_REG: u8 = 0x00;

/// Fixed value of CHIP_ID.
///
/// Source: Bosch BMP388 datasheet, section 4.3.1
pub const BARO_CHIP_ID_VAL: u8 = 0x50;

/// First pressure data register (DATA_0..DATA_2, 24 bits, LSB first).
pub const BARO_PRESSURE_DATA_REG: u8 = 0x04;

/// First temperature data register (DATA_3..DATA_5, 24 bits, LSB first).
pub const BARO_TEMPERATURE_DATA_REG: u8 = 0x07;

/// Power control register.
pub const BARO_PWR_CTRL_REG: u8 = 0x1B;

/// Oversampling register (temperature bits [5:3], pressure bits [2:0]).
pub const BARO_OSR_REG: u8 = 0x1C;

/// Output data rate register (bits [4:0]).
pub const BARO_ODR_REG: u8 = 0x1D;

/// Command register.
pub const BARO_CMD_REG: u8 = 0x7E;

/// Soft reset command.
pub const BARO_SOFT_RESET_CMD: u8 = 0xB6;

/// PWR_CTRL value: normal mode, pressure and temperature enabled.
pub const BARO_PWR_NORMAL_MODE: u8 = 0b0011_0011;

/// First calibration register (NVM_PAR_T1, LSB).
pub const BARO_NVM_START_REG: u8 = 0x31;

/// Length of the calibration block 0x31..=0x45.
pub const BARO_NVM_LEN: usize = 21;

/// Bytes in one pressure + temperature burst.
pub const BARO_DATA_BURST_LEN: usize = 6;
