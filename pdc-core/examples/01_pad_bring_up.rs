//! Pad Bring-Up Example
//!
//! Walks through the startup sequence the recorder runs on the launch pad,
//! against a toy register map instead of real hardware.
//!
//! ## What You'll Learn
//!
//! - Implementing `RegisterBus` for your board
//! - Building a `RecorderConfig` and bringing both sensors up
//! - Reading calibrated acceleration, pressure and altitude
//! - Characterizing accelerometer noise before flight
//!
//! ## Running the Example
//!
//! ```bash
//! cargo run --example 01_pad_bring_up
//! ```

use pdc_core::{
    config::{ImuConfig, RecorderConfig},
    imu::Axis,
    time::FixedTime,
    BusError, DeviceId, Recorder, RegisterBus,
};

const IMU: DeviceId = DeviceId(5);
const BARO: DeviceId = DeviceId(4);

/// Two register maps behind one "SPI bus"
struct BenchBus {
    imu: [u8; 256],
    baro: [u8; 256],
    tick: u16,
}

impl BenchBus {
    fn new() -> Self {
        let mut imu = [0u8; 256];
        imu[0x0F] = 0x6C;
        // Z axis reads +1 g at ±4 g
        imu[0x2C..0x2E].copy_from_slice(&8192i16.to_le_bytes());

        let mut baro = [0u8; 256];
        baro[0x00] = 0x50;
        baro[0x04..0x0A].copy_from_slice(&[0x80, 0x96, 0x98, 0xC0, 0xEC, 0x7A]);
        baro[0x31..0x46].copy_from_slice(&[
            0x70, 0x6B, 0x43, 0x67, 0xF9, 0x70, 0x17, 0x50, 0xC9, 0x24, 0x00, 0xA8, 0x61, 0x48,
            0x71, 0x03, 0xF9, 0xB0, 0x36, 0x0A, 0xC4,
        ]);

        Self { imu, baro, tick: 0 }
    }
}

impl RegisterBus for BenchBus {
    fn read_register(&mut self, device: DeviceId, address: u8, buf: &mut [u8]) -> Result<(), BusError> {
        // A little jitter on the accelerometer Z low byte
        self.tick = self.tick.wrapping_add(1);
        self.imu[0x2C] = (self.tick % 7) as u8;

        let (map, skip) = match device {
            IMU => (&self.imu, 0),
            BARO => (&self.baro, 1),
            _ => return Err(BusError::Nack { address }),
        };
        for (i, byte) in buf.iter_mut().enumerate().skip(skip) {
            *byte = map[(usize::from(address) + i - skip) & 0xFF];
        }
        Ok(())
    }

    fn write_register(&mut self, device: DeviceId, address: u8, value: u8) -> Result<(), BusError> {
        match device {
            IMU => self.imu[usize::from(address)] = value,
            BARO => self.baro[usize::from(address)] = value,
            _ => return Err(BusError::Nack { address }),
        }
        Ok(())
    }
}

fn main() -> Result<(), pdc_core::SensorError> {
    println!("PDC pad bring-up");
    println!("================\n");

    let mut bus = BenchBus::new();
    // Simulated time so the example finishes instantly
    let clock = FixedTime::new(0);

    let config = RecorderConfig::default()
        .with_imu(ImuConfig::default().with_accel(104.0, 4).with_gyro(104.0, 500));
    let mut recorder = Recorder::new(config)?;

    recorder.bring_up(&mut bus, &mut &clock)?;
    println!("Sensors up after {} ms of settling", clock_ms(&clock));

    let accel = recorder.imu().accel().read_all(&mut bus)?;
    println!("Acceleration (m/s²): x={:.3} y={:.3} z={:.3}", accel[0], accel[1], accel[2]);

    let baro = recorder.baro().read_measurement(&mut bus)?;
    println!("Temperature: {:.2} °C", baro.temperature_c);
    println!("Pressure:    {:.1} Pa", baro.pressure_pa);
    println!("Altitude:    {:.1} m (sea-level reference)", baro.altitude_m);

    let ground = recorder.baro_mut().zero_altitude(&mut bus)?;
    println!("Altitude re-referenced to pad pressure {:.1} Pa", ground);

    let noise = recorder.accel_noise(&mut bus, &clock, &mut &clock, Axis::Z, 9.806_65)?;
    println!(
        "\nAccel Z noise: σ = {:.5} m/s² over {} samples ({} rejected, {} ms{})",
        noise.std_dev,
        noise.accepted,
        noise.rejected,
        noise.elapsed_ms,
        if noise.timed_out { ", timed out" } else { "" }
    );

    Ok(())
}

fn clock_ms(clock: &FixedTime) -> u64 {
    use pdc_core::time::TimeSource;
    clock.now()
}
