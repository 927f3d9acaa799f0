//! The poll, trigger, read sequence for one reading.
//!
//! ```text
//! WaitReady -> Drain -> Trigger -> WaitData -> Read -> Done
//!     |          |                    |
//!     +----------+--------------------+----> TimedOut(stage)
//! ```
//!
//! Each wait state checks the status register at most `attempts` times and
//! suspends through [`DelayNs`] between checks, so nothing spins and nothing
//! blocks for longer than the retry budget.

use embedded_hal::delay::DelayNs;
use log::{debug, trace, warn};
use strum_macros::{EnumIter, IntoStaticStr};

use crate::{
    config::{AcquisitionConfig, PostTriggerWait},
    error::Result,
    register::RawSample,
    scaling::FixedPointVoltage,
    window::{RegisterIo, RegisterWindow},
};

/// The wait state which ran out of attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, IntoStaticStr)]
pub enum TimeoutStage {
    /// The converter never reported ready before the trigger.
    #[strum(serialize = "waiting for device")]
    WaitingForDevice,
    /// The FIFO kept reporting stale samples.
    #[strum(serialize = "discarding data")]
    DiscardingData,
    /// The triggered conversion never completed.
    #[strum(serialize = "waiting for data")]
    WaitingForData,
}

impl TimeoutStage {
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }
}

/// A completed reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    /// The FIFO word as read.
    pub raw: RawSample,
    /// Code after removing the channel bits.
    pub code: i16,
    pub voltage: FixedPointVoltage,
}

/// Result of one acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionOutcome {
    Success(Reading),
    Timeout(TimeoutStage),
}

impl AcquisitionOutcome {
    /// Turn a timeout into its [`Error`](crate::error::Error) variant.
    pub fn into_result<I: embedded_io::Error>(self) -> Result<Reading, I> {
        match self {
            AcquisitionOutcome::Success(reading) => Ok(reading),
            AcquisitionOutcome::Timeout(stage) => Err(stage.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    WaitReady,
    Drain,
    Trigger,
    WaitData,
    Read,
}

/// One acquisition, borrowing the window and the delay for its duration.
pub struct Acquisition<'a, P: RegisterIo, D: DelayNs> {
    window: &'a mut RegisterWindow<P>,
    delay: &'a mut D,
    config: &'a AcquisitionConfig,
}

impl<'a, P: RegisterIo, D: DelayNs> Acquisition<'a, P, D> {
    pub fn new(
        window: &'a mut RegisterWindow<P>,
        delay: &'a mut D,
        config: &'a AcquisitionConfig,
    ) -> Self {
        Self {
            window,
            delay,
            config,
        }
    }

    /// Run to a terminal state.
    ///
    /// Timeouts come back as [`AcquisitionOutcome::Timeout`], `Err` is only
    /// returned when the register backend itself fails.
    pub fn run(mut self) -> Result<AcquisitionOutcome, P::Error> {
        let mut phase = Phase::WaitReady;
        loop {
            trace!("Acquisition phase {:?}", phase);
            phase = match phase {
                Phase::WaitReady => {
                    if !self.wait_ready_before_trigger()? {
                        return Ok(self.timed_out(TimeoutStage::WaitingForDevice));
                    }
                    Phase::Drain
                }
                Phase::Drain => {
                    if !self.drain()? {
                        return Ok(self.timed_out(TimeoutStage::DiscardingData));
                    }
                    Phase::Trigger
                }
                Phase::Trigger => {
                    self.window.write_trigger()?;
                    Phase::WaitData
                }
                Phase::WaitData => {
                    if !self.wait_data()? {
                        return Ok(self.timed_out(TimeoutStage::WaitingForData));
                    }
                    Phase::Read
                }
                Phase::Read => return Ok(AcquisitionOutcome::Success(self.read()?)),
            };
        }
    }

    fn suspend(&mut self) {
        self.delay
            .delay_us(self.config.retry().interval().to_micros());
    }

    fn timed_out(&self, stage: TimeoutStage) -> AcquisitionOutcome {
        warn!(
            "Timeout {} after {} attempts",
            stage.as_str(),
            self.config.retry().attempts()
        );
        AcquisitionOutcome::Timeout(stage)
    }

    /// Check, then suspend before the next check.
    fn wait_ready_before_trigger(&mut self) -> Result<bool, P::Error> {
        let attempts = self.config.retry().attempts();
        for attempt in 1..=attempts {
            if self.window.read_status()?.is_ready() {
                return Ok(true);
            }
            if attempt < attempts {
                self.suspend();
            }
        }
        Ok(false)
    }

    /// Discard stale samples until the FIFO reports empty.
    fn drain(&mut self) -> Result<bool, P::Error> {
        let attempts = self.config.retry().attempts();
        for attempt in 1..=attempts {
            let status = self.window.read_status()?;
            if !status.has_pending_sample() {
                return Ok(true);
            }
            let stale = self.window.read_data()?;
            debug!("Discarded stale sample {:#06x}", stale.0);
            if attempt < attempts {
                self.suspend();
            }
        }
        Ok(false)
    }

    /// Give the conversion time to run, then check.
    fn wait_data(&mut self) -> Result<bool, P::Error> {
        match self.config.post_trigger() {
            PostTriggerWait::Fixed(duration) => {
                self.delay.delay_us(duration.to_micros());
                Ok(true)
            }
            PostTriggerWait::Poll => {
                for _ in 0..self.config.retry().attempts() {
                    self.suspend();
                    if self.window.read_status()?.is_ready() {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }

    fn read(&mut self) -> Result<Reading, P::Error> {
        let raw = self.window.read_data()?;
        let code = raw.code(self.config.alignment());
        let voltage = FixedPointVoltage::from_code(code, self.config.precision());
        debug!("Sample {:#06x} => {} V", raw.0, voltage);
        Ok(Reading { raw, code, voltage })
    }
}

/// Run one acquisition against `window`.
pub fn acquire<P: RegisterIo, D: DelayNs>(
    window: &mut RegisterWindow<P>,
    delay: &mut D,
    config: &AcquisitionConfig,
) -> Result<AcquisitionOutcome, P::Error> {
    Acquisition::new(window, delay, config).run()
}
