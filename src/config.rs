//! Acquisition settings.
//!
//! Channel and input range are fixed when the device attaches, so everything
//! here is about timing and how a reading is handed back to the caller.

use fugit::{ExtU32, MicrosDurationU32};

use crate::{error::ConfigError, register::SampleAlignment, scaling::Precision};

/// Bounded polling used by every wait state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Status checks before giving up. Never zero.
    attempts: u32,
    /// Suspension between two checks.
    interval: MicrosDurationU32,
}

impl RetryPolicy {
    pub const DEFAULT_ATTEMPTS: u32 = 25;

    pub const fn new(attempts: u32, interval: MicrosDurationU32) -> Result<Self, ConfigError> {
        if attempts == 0 {
            Err(ConfigError::ZeroAttempts)
        } else {
            Ok(Self { attempts, interval })
        }
    }

    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    pub const fn interval(&self) -> MicrosDurationU32 {
        self.interval
    }
}

impl Default for RetryPolicy {
    /// 25 checks, 5ms apart.
    fn default() -> Self {
        Self {
            attempts: Self::DEFAULT_ATTEMPTS,
            interval: 5.millis(),
        }
    }
}

/// How to wait for the conversion after triggering.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum PostTriggerWait {
    /// Poll the status register with the [`RetryPolicy`].
    #[default]
    Poll,
    /// Suspend once for the given time, then read the sample without checking status.
    ///
    /// Only sensible when the conversion time is known.
    Fixed(MicrosDurationU32),
}

/// Form of a successful reading.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// ASCII line, e.g. `1.2503 V\n`.
    #[default]
    Formatted,
    /// The aligned code as two little-endian bytes.
    Raw,
}

/// What the caller gets back when a wait state runs out of attempts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutReport {
    /// A short ASCII line naming the stage.
    #[default]
    Diagnostic,
    /// Nothing, the read returns zero bytes.
    Silent,
}

/// Use [`AcquisitionConfig::builder`] to create a configuration.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AcquisitionConfig {
    retry: RetryPolicy,
    post_trigger: PostTriggerWait,
    precision: Precision,
    alignment: SampleAlignment,
    output: OutputMode,
    timeout_report: TimeoutReport,
}

impl AcquisitionConfig {
    pub fn builder() -> AcquisitionConfigBuilder {
        AcquisitionConfigBuilder::default()
    }

    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }

    pub fn post_trigger(&self) -> PostTriggerWait {
        self.post_trigger
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn alignment(&self) -> SampleAlignment {
        self.alignment
    }

    pub fn output(&self) -> OutputMode {
        self.output
    }

    pub fn timeout_report(&self) -> TimeoutReport {
        self.timeout_report
    }
}

/// Use this type to create an [`AcquisitionConfig`].
pub struct AcquisitionConfigBuilder {
    attempts: u32,
    interval: MicrosDurationU32,
    post_trigger: PostTriggerWait,
    precision: u8,
    alignment: SampleAlignment,
    output: OutputMode,
    timeout_report: TimeoutReport,
}

impl Default for AcquisitionConfigBuilder {
    fn default() -> Self {
        let retry = RetryPolicy::default();
        AcquisitionConfigBuilder {
            attempts: retry.attempts(),
            interval: retry.interval(),
            post_trigger: PostTriggerWait::default(),
            precision: Precision::default().digits(),
            alignment: SampleAlignment::default(),
            output: OutputMode::default(),
            timeout_report: TimeoutReport::default(),
        }
    }
}

impl AcquisitionConfigBuilder {
    /// Let's build it!
    pub fn build(self) -> Result<AcquisitionConfig, ConfigError> {
        Ok(AcquisitionConfig {
            retry: RetryPolicy::new(self.attempts, self.interval)?,
            post_trigger: self.post_trigger,
            precision: Precision::new(self.precision)?,
            alignment: self.alignment,
            output: self.output,
            timeout_report: self.timeout_report,
        })
    }

    /// Number of status checks per wait state.
    pub fn attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    /// Suspension between status checks.
    pub fn interval(mut self, interval: MicrosDurationU32) -> Self {
        self.interval = interval;
        self
    }

    pub fn post_trigger(mut self, wait: PostTriggerWait) -> Self {
        self.post_trigger = wait;
        self
    }

    /// Decimal places kept in the fixed-point reading.
    pub fn precision(mut self, digits: u8) -> Self {
        self.precision = digits;
        self
    }

    pub fn alignment(mut self, alignment: SampleAlignment) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    pub fn timeout_report(mut self, report: TimeoutReport) -> Self {
        self.timeout_report = report;
        self
    }
}
