//! Our error types for the PCI-9111 acquisition core.

use thiserror::Error;

use crate::acquisition::TimeoutStage;

pub type Result<T, I> = core::result::Result<T, Error<I>>;

/// Errors raised while driving the A/D converter.
///
/// `I` is the error type of the register backend, see [`RegisterIo`](crate::window::RegisterIo).
#[derive(Error, Debug)]
pub enum Error<I: embedded_io::Error> {
    #[error("Register access error")]
    Io(I),
    #[error("Register window at {base:#x} with length {length:#x} is not usable")]
    InvalidWindow { base: u32, length: u16 },
    #[error("Output buffer too small: {needed} bytes needed, {capacity} available")]
    BufferTooSmall { needed: usize, capacity: usize },
    #[error("Timeout waiting for device")]
    ReadyTimeout,
    #[error("Timeout discarding data")]
    DrainTimeout,
    #[error("Timeout waiting for data")]
    DataTimeout,
}

impl<I: embedded_io::Error> Error<I> {
    /// Whether this error is one of the transient timeouts. The next read may succeed.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Error::ReadyTimeout | Error::DrainTimeout | Error::DataTimeout
        )
    }

    /// The wait state behind a timeout error.
    pub fn timeout_stage(&self) -> Option<TimeoutStage> {
        match self {
            Error::ReadyTimeout => Some(TimeoutStage::WaitingForDevice),
            Error::DrainTimeout => Some(TimeoutStage::DiscardingData),
            Error::DataTimeout => Some(TimeoutStage::WaitingForData),
            _ => None,
        }
    }
}

impl<I: embedded_io::Error> From<TimeoutStage> for Error<I> {
    fn from(stage: TimeoutStage) -> Self {
        match stage {
            TimeoutStage::WaitingForDevice => Error::ReadyTimeout,
            TimeoutStage::DiscardingData => Error::DrainTimeout,
            TimeoutStage::WaitingForData => Error::DataTimeout,
        }
    }
}

/// Rejected acquisition settings.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Retry policy needs at least one attempt")]
    ZeroAttempts,
    #[error("Precision of {0} digits does not fit the fixed-point range")]
    PrecisionTooLarge(u8),
}
