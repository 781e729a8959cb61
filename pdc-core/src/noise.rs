//! Online Noise Characterization
//!
//! Estimates the standard deviation of a sensor output while the vehicle sits
//! on the pad, without storing the samples.
//!
//! ## Algorithm
//!
//! Welford's single-pass update, for each accepted sample `x` (k = 1, 2, ...):
//!
//! ```text
//! mean_k  = mean_{k-1} + (x - mean_{k-1}) / k
//! M2_k    = M2_{k-1}   + (x - mean_{k-1}) · (x - mean_k)
//! σ       = sqrt(M2_n / divisor)          divisor = n or n - 1
//! ```
//!
//! A run that times out with k < N accepted samples still divides by the
//! requested N (or N - 1) unless [`PartialRunDivisor::Accepted`] is chosen.
//!
//! ## Outlier rejection
//!
//! The sensor is expected to read close to a known `reference` at rest (1 g
//! on a vertical accelerometer axis, 0 dps on a gyroscope). A sample further
//! than `reject_threshold` from it is discarded and the same sample slot is
//! retried; it does not count towards `samples`. Non-finite samples are
//! always discarded.
//!
//! ## Time budget
//!
//! Samples are spaced at least `interval_ms` apart. Rejected samples still
//! spend that time, so a sensor that never produces an acceptable value runs
//! out the `timeout_ms` budget and returns a partial report with
//! `timed_out = true`. A timeout is a degraded result, not an error.
//!
//! ## Driving a run
//!
//! [`NoiseRun::poll`] is non-blocking and returns `nb::Error::WouldBlock`
//! until the run completes, so a flight loop can interleave other device
//! polling. [`NoiseCharacterizer::characterize`] drives the same state
//! machine with a blocking [`Delay`].
//!
//! ```rust
//! use pdc_core::noise::{NoiseCharacterizer, NoiseConfig};
//! use pdc_core::time::FixedTime;
//!
//! let clock = FixedTime::new(0);
//! let characterizer = NoiseCharacterizer::new(NoiseConfig::default());
//! let report = characterizer
//!     .characterize(9.80665, &clock, &mut &clock, || Ok(9.80665))
//!     .unwrap();
//! assert_eq!(report.accepted, 50);
//! assert!(report.std_dev < 1e-6);
//! ```

use crate::constants::time::{
    DEFAULT_NOISE_INTERVAL_MS, DEFAULT_NOISE_SAMPLES, DEFAULT_NOISE_TIMEOUT_MS,
    DEFAULT_REJECT_THRESHOLD,
};
use crate::errors::{SensorError, SensorResult};
use crate::time::{elapsed_ms, Delay, TimeSource, Timestamp};

/// Denominator used when turning the sum of squares into a variance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VarianceDivisor {
    /// Divide by the number of accepted samples (population variance)
    #[default]
    Population,
    /// Divide by one less than the number of accepted samples (Bessel's correction)
    Sample,
}

/// Sample count a timed-out run divides by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PartialRunDivisor {
    /// Keep the requested sample count N as the basis
    #[default]
    Requested,
    /// Use the k samples actually accepted before the timeout
    Accepted,
}

/// Parameters of a noise run
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoiseConfig {
    /// Accepted samples to collect (at least 2)
    pub samples: usize,
    /// Largest accepted distance from the reference value (physical units)
    pub reject_threshold: f32,
    /// Minimum spacing between samples (milliseconds)
    pub interval_ms: u32,
    /// Wall-clock budget for the whole run (milliseconds)
    pub timeout_ms: u64,
    /// Variance denominator
    pub divisor: VarianceDivisor,
    /// Basis of the denominator when the run times out
    pub partial_divisor: PartialRunDivisor,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            samples: DEFAULT_NOISE_SAMPLES,
            reject_threshold: DEFAULT_REJECT_THRESHOLD,
            interval_ms: DEFAULT_NOISE_INTERVAL_MS,
            timeout_ms: DEFAULT_NOISE_TIMEOUT_MS,
            divisor: VarianceDivisor::Population,
            partial_divisor: PartialRunDivisor::Requested,
        }
    }
}

impl NoiseConfig {
    /// Set the number of accepted samples
    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = samples;
        self
    }

    /// Set the rejection band around the reference value
    pub fn with_reject_threshold(mut self, threshold: f32) -> Self {
        self.reject_threshold = threshold;
        self
    }

    /// Set the minimum spacing between samples
    pub fn with_interval_ms(mut self, interval_ms: u32) -> Self {
        self.interval_ms = interval_ms;
        self
    }

    /// Set the wall-clock budget
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set the variance denominator
    pub fn with_divisor(mut self, divisor: VarianceDivisor) -> Self {
        self.divisor = divisor;
        self
    }

    /// Set the denominator basis used after a timeout
    pub fn with_partial_divisor(mut self, partial_divisor: PartialRunDivisor) -> Self {
        self.partial_divisor = partial_divisor;
        self
    }

    /// Check the parameters before a run starts
    pub fn validate(&self) -> SensorResult<()> {
        if self.samples < 2 {
            return Err(SensorError::InvalidSampleCount { requested: self.samples });
        }
        if !self.reject_threshold.is_finite() || self.reject_threshold < 0.0 {
            return Err(SensorError::Configuration {
                reason: "reject threshold must be a non-negative number",
            });
        }
        Ok(())
    }
}

/// Running Welford state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseStatistic {
    count: usize,
    mean: f64,
    sum_sq: f64,
    rejected: usize,
    start: Timestamp,
}

impl NoiseStatistic {
    /// Empty statistic for a run starting at `start`
    pub fn new(start: Timestamp) -> Self {
        Self { count: 0, mean: 0.0, sum_sq: 0.0, rejected: 0, start }
    }

    /// Fold one accepted sample into the running mean and sum of squares
    pub fn push(&mut self, sample: f32) {
        let sample = f64::from(sample);
        self.count += 1;
        let delta = sample - self.mean;
        self.mean += delta / self.count as f64;
        self.sum_sq += delta * (sample - self.mean);
    }

    /// Count one discarded sample
    pub fn reject(&mut self) {
        self.rejected += 1;
    }

    /// Accepted samples so far
    pub fn count(&self) -> usize {
        self.count
    }

    /// Discarded samples so far
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// Running mean (0 before the first accepted sample)
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Running sum of squared deviations
    pub fn sum_sq(&self) -> f64 {
        self.sum_sq
    }

    /// When the run started
    pub fn start(&self) -> Timestamp {
        self.start
    }

    /// Standard deviation over the accepted samples
    ///
    /// Zero when the divisor would be zero (no samples, or a single sample
    /// with [`VarianceDivisor::Sample`]).
    pub fn std_dev(&self, divisor: VarianceDivisor) -> f64 {
        self.std_dev_over(self.count, divisor)
    }

    /// Standard deviation with `basis` samples in the denominator
    ///
    /// Lets a partial run divide by the sample count it was asked for.
    pub fn std_dev_over(&self, basis: usize, divisor: VarianceDivisor) -> f64 {
        let denominator = match divisor {
            VarianceDivisor::Population => basis,
            VarianceDivisor::Sample => basis.saturating_sub(1),
        };
        if denominator == 0 {
            return 0.0;
        }
        libm::sqrt(self.sum_sq / denominator as f64)
    }
}

/// Outcome of a noise run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseReport {
    /// Standard deviation of the accepted samples
    pub std_dev: f32,
    /// Mean of the accepted samples (0 when none were accepted)
    pub mean: f32,
    /// Samples folded into the statistic
    pub accepted: usize,
    /// Samples discarded as outliers
    pub rejected: usize,
    /// Wall-clock time the run took (milliseconds)
    pub elapsed_ms: u64,
    /// True when the budget ran out before `samples` were accepted
    pub timed_out: bool,
}

/// One noise run in progress
#[derive(Debug, Clone)]
pub struct NoiseRun {
    config: NoiseConfig,
    reference: f32,
    statistic: NoiseStatistic,
    next_sample_at: Timestamp,
}

impl NoiseRun {
    /// Advance the run by at most one sample
    ///
    /// Returns `WouldBlock` while waiting for the next sample slot or while
    /// more samples are needed, the finished report once `samples` have been
    /// accepted or the budget is spent, and the sampler's error if a read
    /// fails.
    pub fn poll<F>(&mut self, now: Timestamp, sampler: &mut F) -> nb::Result<NoiseReport, SensorError>
    where
        F: FnMut() -> SensorResult<f32>,
    {
        if elapsed_ms(self.statistic.start(), now) > self.config.timeout_ms {
            log_warn!(
                "noise run timed out with {}/{} samples ({} rejected)",
                self.statistic.count(),
                self.config.samples,
                self.statistic.rejected()
            );
            return Ok(self.report(now, true));
        }

        if now < self.next_sample_at {
            return Err(nb::Error::WouldBlock);
        }

        let sample = sampler().map_err(nb::Error::Other)?;
        self.next_sample_at = now.saturating_add(u64::from(self.config.interval_ms));

        if !sample.is_finite() || libm::fabsf(self.reference - sample) > self.config.reject_threshold {
            log_debug!("noise sample {} rejected (reference {})", sample, self.reference);
            self.statistic.reject();
            return Err(nb::Error::WouldBlock);
        }

        self.statistic.push(sample);
        if self.statistic.count() >= self.config.samples {
            return Ok(self.report(now, false));
        }

        Err(nb::Error::WouldBlock)
    }

    /// Milliseconds until the run next needs attention
    ///
    /// The earlier of the next sample slot and the first instant past the
    /// timeout.
    pub fn wait_ms(&self, now: Timestamp) -> u64 {
        let deadline = self
            .statistic
            .start()
            .saturating_add(self.config.timeout_ms)
            .saturating_add(1);
        self.next_sample_at.min(deadline).saturating_sub(now)
    }

    /// Current state of the estimator
    pub fn statistic(&self) -> &NoiseStatistic {
        &self.statistic
    }

    fn report(&self, now: Timestamp, timed_out: bool) -> NoiseReport {
        let basis = match (timed_out, self.config.partial_divisor) {
            (true, PartialRunDivisor::Requested) => self.config.samples,
            _ => self.statistic.count(),
        };
        NoiseReport {
            std_dev: self.statistic.std_dev_over(basis, self.config.divisor) as f32,
            mean: self.statistic.mean() as f32,
            accepted: self.statistic.count(),
            rejected: self.statistic.rejected(),
            elapsed_ms: elapsed_ms(self.statistic.start(), now),
            timed_out,
        }
    }
}

/// Factory for noise runs sharing one configuration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NoiseCharacterizer {
    config: NoiseConfig,
}

impl NoiseCharacterizer {
    /// Characterizer with the given parameters
    pub fn new(config: NoiseConfig) -> Self {
        Self { config }
    }

    /// Parameters used for every run
    pub fn config(&self) -> &NoiseConfig {
        &self.config
    }

    /// Start a run against `reference`, with the first sample due one interval after `now`
    pub fn start(&self, reference: f32, now: Timestamp) -> SensorResult<NoiseRun> {
        self.config.validate()?;
        if !reference.is_finite() {
            return Err(SensorError::Configuration { reason: "reference value must be finite" });
        }

        log_debug!(
            "noise run started: {} samples around {} ± {}",
            self.config.samples,
            reference,
            self.config.reject_threshold
        );

        Ok(NoiseRun {
            config: self.config,
            reference,
            statistic: NoiseStatistic::new(now),
            next_sample_at: now.saturating_add(u64::from(self.config.interval_ms)),
        })
    }

    /// Run to completion, sleeping on `delay` between samples
    pub fn characterize<T, D, F>(
        &self,
        reference: f32,
        clock: &T,
        delay: &mut D,
        mut sampler: F,
    ) -> SensorResult<NoiseReport>
    where
        T: TimeSource + ?Sized,
        D: Delay + ?Sized,
        F: FnMut() -> SensorResult<f32>,
    {
        let mut run = self.start(reference, clock.now())?;

        loop {
            match run.poll(clock.now(), &mut sampler) {
                Ok(report) => {
                    log_info!(
                        "noise σ = {} over {} samples ({} rejected, {} ms)",
                        report.std_dev,
                        report.accepted,
                        report.rejected,
                        report.elapsed_ms
                    );
                    return Ok(report);
                }
                Err(nb::Error::WouldBlock) => {
                    let wait = run.wait_ms(clock.now());
                    if wait > 0 {
                        delay.delay_ms(u32::try_from(wait).unwrap_or(u32::MAX));
                    }
                }
                Err(nb::Error::Other(err)) => return Err(err),
            }
        }
    }
}
