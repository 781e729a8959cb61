//! Time management for the recorder
//!
//! Two small abstractions keep timing out of the measurement code:
//! - [`TimeSource`] answers "what time is it" in milliseconds
//! - [`Delay`] blocks the caller for a number of milliseconds
//!
//! On the flight computer both come from the board support package; under
//! `std` the monotonic clock and thread sleep are used; in tests a
//! [`FixedTime`] implements both so a delay advances the clock.

use core::cell::Cell;

/// Timestamp in milliseconds since an arbitrary epoch (boot for monotonic sources)
pub type Timestamp = u64;

/// Source of time for the system
pub trait TimeSource {
    /// Get current timestamp in milliseconds
    fn now(&self) -> Timestamp;
}

/// Blocking millisecond delay
pub trait Delay {
    /// Block the caller for at least `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);
}

/// Monotonic time source backed by `std::time::Instant`
///
/// Starts at 0 when created, always increases.
#[cfg(feature = "std")]
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    start: std::time::Instant,
}

#[cfg(feature = "std")]
impl MonotonicClock {
    /// Create a clock whose epoch is now
    pub fn new() -> Self {
        Self { start: std::time::Instant::now() }
    }
}

#[cfg(feature = "std")]
impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl TimeSource for MonotonicClock {
    fn now(&self) -> Timestamp {
        self.start.elapsed().as_millis() as Timestamp
    }
}

/// Thread-sleep delay (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

#[cfg(feature = "std")]
impl Delay for StdDelay {
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}

/// Manually driven time source for testing
///
/// Uses interior mutability so one instance can serve as both the clock and
/// the delay of a blocking run: every delay advances the clock.
#[derive(Debug, Clone, Default)]
pub struct FixedTime {
    timestamp: Cell<Timestamp>,
}

impl FixedTime {
    /// Create a clock frozen at `timestamp`
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp: Cell::new(timestamp) }
    }

    /// Jump to an absolute time
    pub fn set(&self, timestamp: Timestamp) {
        self.timestamp.set(timestamp);
    }

    /// Move the clock forward
    pub fn advance(&self, ms: u64) {
        self.timestamp.set(self.timestamp.get().saturating_add(ms));
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.timestamp.get()
    }
}

impl Delay for &FixedTime {
    fn delay_ms(&mut self, ms: u32) {
        self.advance(u64::from(ms));
    }
}

/// Milliseconds elapsed between two timestamps, zero if the clock went backwards
pub fn elapsed_ms(earlier: Timestamp, later: Timestamp) -> u64 {
    later.saturating_sub(earlier)
}
