//! Device session: attach, read, detach.

use embedded_hal::delay::DelayNs;
use log::info;
use spin::relax::RelaxStrategy;

use crate::{
    acquisition::{Acquisition, AcquisitionOutcome},
    config::AcquisitionConfig,
    error::Result,
    output,
    register::{AdcRegister, CHANNEL_0, RANGE_BIPOLAR_10V, TRIGGER_SOFTWARE},
    window::{RegisterIo, RegisterWindow},
};

/// One attached PCI-9111.
///
/// Created when the device attaches, with a register window the host has
/// already claimed. The session owns the window until [`Self::detach`], and every
/// acquisition needs `&mut self`, so only one can ever be in flight.
/// Use [`SharedDevice`] when several callers need to read.
///
/// For its methods, "acquire" runs the converter and returns the outcome as a
/// value, where as "read" also renders it into a caller buffer the way a
/// character device read would.
pub struct Pci9111<P: RegisterIo, D: DelayNs> {
    window: RegisterWindow<P>,
    delay: D,
    config: AcquisitionConfig,
}

impl<P: RegisterIo, D: DelayNs> Pci9111<P, D> {
    /// Take over the window and fix channel 0, ±10V range and software triggering.
    pub fn attach(
        mut window: RegisterWindow<P>,
        delay: D,
        config: AcquisitionConfig,
    ) -> Result<Self, P::Error> {
        window.write_config(AdcRegister::ChannelControl, CHANNEL_0)?;
        window.write_config(AdcRegister::RANGE_CONTROL, RANGE_BIPOLAR_10V)?;
        window.write_config(AdcRegister::TriggerMode, TRIGGER_SOFTWARE)?;
        info!(
            "PCI-9111 attached at {:#x}, {} ports",
            window.base(),
            window.length()
        );
        Ok(Self {
            window,
            delay,
            config,
        })
    }

    pub fn config(&self) -> &AcquisitionConfig {
        &self.config
    }

    /// Replace the acquisition settings. Channel and range are not affected.
    pub fn set_config(&mut self, config: AcquisitionConfig) {
        self.config = config;
    }

    /// Run one acquisition.
    pub fn acquire(&mut self) -> Result<AcquisitionOutcome, P::Error> {
        Acquisition::new(&mut self.window, &mut self.delay, &self.config).run()
    }

    /// Run one acquisition and write the reply into `buf`.
    ///
    /// Returns the number of bytes written. Timeouts are reported through the
    /// reply as configured, not as `Err`.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, P::Error> {
        let outcome = self.acquire()?;
        output::render(&outcome, &self.config, buf)
    }

    /// Hand the window and delay back to the host.
    pub fn detach(self) -> (RegisterWindow<P>, D) {
        info!("PCI-9111 at {:#x} detached", self.window.base());
        (self.window, self.delay)
    }
}

/// How a [`SharedDevice`] waits for the lock.
///
/// Hosted builds yield the thread, `no-std` builds spin.
#[cfg(not(feature = "no-std"))]
pub type DefaultRelax = crate::delay::YieldNow;
#[cfg(feature = "no-std")]
pub type DefaultRelax = spin::relax::Spin;

/// A [`Pci9111`] behind a lock, for callers that share one device.
///
/// The lock is held for a whole acquisition, so register accesses of two reads
/// never interleave. A waiting caller runs `R` between lock attempts.
pub struct SharedDevice<P: RegisterIo, D: DelayNs, R: RelaxStrategy = DefaultRelax> {
    inner: spin::mutex::Mutex<Pci9111<P, D>, R>,
}

impl<P: RegisterIo, D: DelayNs, R: RelaxStrategy> SharedDevice<P, D, R> {
    pub fn new(device: Pci9111<P, D>) -> Self {
        Self {
            inner: spin::mutex::Mutex::new(device),
        }
    }

    pub fn acquire(&self) -> Result<AcquisitionOutcome, P::Error> {
        self.inner.lock().acquire()
    }

    pub fn read(&self, buf: &mut [u8]) -> Result<usize, P::Error> {
        self.inner.lock().read(buf)
    }

    pub fn into_inner(self) -> Pci9111<P, D> {
        self.inner.into_inner()
    }
}
