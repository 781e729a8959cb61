//! Common test utilities for integration tests
//!
//! This module provides:
//! - A simulated register map standing in for the SPI bus
//! - Calibration fixtures with hand-computed compensation results
//! - Helpers to place raw readings into device registers

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};

use pdc_core::{BusError, DeviceId, RegisterBus};

pub mod fixtures;

/// IMU chip select used throughout the tests
pub const IMU: DeviceId = DeviceId(5);
/// Barometer chip select used throughout the tests
pub const BARO: DeviceId = DeviceId(4);

/// Registers to patch when a given value is written to a given register
struct WriteHook {
    device: DeviceId,
    register: u8,
    value: u8,
    patches: Vec<(u8, u8)>,
}

/// In-memory register maps for every device on the bus
///
/// Reads auto-increment through the map. Devices registered with
/// [`SimulatedBus::with_dummy_byte`] return a garbage byte first, like the
/// barometer does.
#[derive(Default)]
pub struct SimulatedBus {
    registers: HashMap<DeviceId, [u8; 256]>,
    dummy: HashSet<DeviceId>,
    hooks: Vec<WriteHook>,
    writes: Vec<(DeviceId, u8, u8)>,
    reads: Vec<(DeviceId, u8, usize)>,
    failing: Option<BusError>,
    healthy_transactions: Option<usize>,
}

impl SimulatedBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Both recorder devices with their identity registers populated
    pub fn recorder() -> Self {
        let mut bus = Self::new().with_dummy_byte(BARO);
        bus.set(IMU, 0x0F, 0x6C);
        bus.set(BARO, 0x00, 0x50);
        bus.load_nvm(BARO, &fixtures::NVM);
        bus
    }

    pub fn with_dummy_byte(mut self, device: DeviceId) -> Self {
        self.dummy.insert(device);
        self
    }

    fn map(&mut self, device: DeviceId) -> &mut [u8; 256] {
        self.registers.entry(device).or_insert([0; 256])
    }

    pub fn get(&self, device: DeviceId, address: u8) -> u8 {
        self.registers.get(&device).map_or(0, |map| map[usize::from(address)])
    }

    pub fn set(&mut self, device: DeviceId, address: u8, value: u8) {
        self.map(device)[usize::from(address)] = value;
    }

    pub fn set_bytes(&mut self, device: DeviceId, address: u8, bytes: &[u8]) {
        let map = self.map(device);
        let start = usize::from(address);
        map[start..start + bytes.len()].copy_from_slice(bytes);
    }

    /// Store a signed 16-bit output, little-endian
    pub fn set_i16(&mut self, device: DeviceId, address: u8, value: i16) {
        self.set_bytes(device, address, &value.to_le_bytes());
    }

    /// Store a 24-bit conversion result, little-endian
    pub fn set_u24(&mut self, device: DeviceId, address: u8, value: u32) {
        let bytes = value.to_le_bytes();
        self.set_bytes(device, address, &bytes[..3]);
    }

    pub fn load_nvm(&mut self, device: DeviceId, nvm: &[u8; 21]) {
        self.set_bytes(device, 0x31, nvm);
    }

    /// Patch registers whenever `value` is written to `register`
    pub fn on_write(&mut self, device: DeviceId, register: u8, value: u8, patches: &[(u8, u8)]) {
        self.hooks.push(WriteHook { device, register, value, patches: patches.to_vec() });
    }

    /// Make every transaction fail with `error` until cleared
    pub fn fail_with(&mut self, error: Option<BusError>) {
        self.failing = error;
        self.healthy_transactions = None;
    }

    /// Let `transactions` more reads or writes through, then fail with `error`
    pub fn fail_after(&mut self, transactions: usize, error: BusError) {
        self.healthy_transactions = Some(transactions);
        self.failing = Some(error);
    }

    fn check_fault(&mut self) -> Result<(), BusError> {
        match self.healthy_transactions {
            Some(0) | None => self.failing.map_or(Ok(()), Err),
            Some(ref mut left) => {
                *left -= 1;
                Ok(())
            }
        }
    }

    pub fn writes(&self) -> &[(DeviceId, u8, u8)] {
        &self.writes
    }

    /// Values written to one register, in order
    pub fn writes_to(&self, device: DeviceId, register: u8) -> Vec<u8> {
        self.writes
            .iter()
            .filter(|&&(d, r, _)| d == device && r == register)
            .map(|&(_, _, v)| v)
            .collect()
    }

    /// Transactions as (device, start address, bytes clocked)
    pub fn reads(&self) -> &[(DeviceId, u8, usize)] {
        &self.reads
    }

    pub fn clear_log(&mut self) {
        self.writes.clear();
        self.reads.clear();
    }
}

impl RegisterBus for SimulatedBus {
    fn read_register(&mut self, device: DeviceId, address: u8, buf: &mut [u8]) -> Result<(), BusError> {
        self.check_fault()?;
        self.reads.push((device, address, buf.len()));

        let dummy = self.dummy.contains(&device);
        let map = *self.map(device);
        let mut next = usize::from(address);
        for (i, byte) in buf.iter_mut().enumerate() {
            if dummy && i == 0 {
                *byte = 0xA5;
                continue;
            }
            *byte = map[next & 0xFF];
            next += 1;
        }
        Ok(())
    }

    fn write_register(&mut self, device: DeviceId, address: u8, value: u8) -> Result<(), BusError> {
        self.check_fault()?;
        self.writes.push((device, address, value));
        self.set(device, address, value);

        let patches: Vec<(u8, u8)> = self
            .hooks
            .iter()
            .filter(|hook| hook.device == device && hook.register == address && hook.value == value)
            .flat_map(|hook| hook.patches.iter().copied())
            .collect();
        for (register, patched) in patches {
            self.set(device, register, patched);
        }
        Ok(())
    }
}
