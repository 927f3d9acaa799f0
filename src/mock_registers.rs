//! We use this mocking module in unit tests to emulate the adapter's register window.

use std::collections::VecDeque;

use embedded_hal::delay::DelayNs;
use thiserror::Error;

use crate::{register::StatusFlags, window::RegisterIo};

const STATUS_OFFSET: u32 = 0x08;
const FIFO_OFFSET: u32 = 0x00;

/// A single register access, in the order it reached the mock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read(u32),
    WriteWord(u32, u16),
    WriteByte(u32, u8),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum MockError {
    /// Generic simulated error for testing
    #[error("Simulated register error")]
    Simulated,
    /// Port outside of the emulated registers
    #[error("Port {0:#x} is not mapped")]
    Unmapped(u32),
}

impl embedded_io::Error for MockError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            MockError::Simulated => embedded_io::ErrorKind::Other,
            MockError::Unmapped(_) => embedded_io::ErrorKind::InvalidInput,
        }
    }
}

/// Our mock type used to emulate the PCI-9111 registers.
///
/// Status words are served from a script first, then `idle_status` forever.
/// FIFO words likewise, falling back to zero.
pub struct MockRegisters {
    base: u32,
    status_script: VecDeque<u16>,
    idle_status: u16,
    data: VecDeque<u16>,
    accesses: Vec<Access>,
    should_error_on_read: bool,
    /// Yield the thread on every access so concurrent callers get a chance to interleave.
    yield_on_access: bool,
}

impl MockRegisters {
    /// A converter that is ready with an empty FIFO.
    pub fn new(base: u32) -> Self {
        Self {
            base,
            status_script: VecDeque::new(),
            idle_status: StatusFlags::READY_BIT,
            data: VecDeque::new(),
            accesses: Vec::new(),
            should_error_on_read: false,
            yield_on_access: false,
        }
    }

    /// Queue a status word to be returned by the next unserved status read.
    pub fn push_status(&mut self, word: u16) {
        self.status_script.push_back(word);
    }

    /// Status word returned once the script is exhausted.
    pub fn set_idle_status(&mut self, word: u16) {
        self.idle_status = word;
    }

    /// Queue a FIFO word.
    pub fn push_data(&mut self, word: u16) {
        self.data.push_back(word);
    }

    /// Configure whether read operations should fail with an error
    pub fn set_read_error(&mut self, should_error: bool) {
        self.should_error_on_read = should_error;
    }

    pub fn set_yield_on_access(&mut self, should_yield: bool) {
        self.yield_on_access = should_yield;
    }

    /// Every access recorded so far.
    pub fn accesses(&self) -> &[Access] {
        &self.accesses
    }

    pub fn into_accesses(self) -> Vec<Access> {
        self.accesses
    }

    fn record(&mut self, access: Access) {
        self.accesses.push(access);
        if self.yield_on_access {
            std::thread::yield_now();
        }
    }
}

impl embedded_io::ErrorType for MockRegisters {
    type Error = MockError;
}

impl RegisterIo for MockRegisters {
    fn read_u16(&mut self, port: u32) -> Result<u16, Self::Error> {
        if self.should_error_on_read {
            return Err(MockError::Simulated);
        }
        self.record(Access::Read(port));
        match port.checked_sub(self.base) {
            Some(STATUS_OFFSET) => Ok(self
                .status_script
                .pop_front()
                .unwrap_or(self.idle_status)),
            Some(FIFO_OFFSET) => Ok(self.data.pop_front().unwrap_or(0)),
            _ => Err(MockError::Unmapped(port)),
        }
    }

    fn write_u16(&mut self, port: u32, value: u16) -> Result<(), Self::Error> {
        self.record(Access::WriteWord(port, value));
        Ok(())
    }

    fn write_u8(&mut self, port: u32, value: u8) -> Result<(), Self::Error> {
        self.record(Access::WriteByte(port, value));
        Ok(())
    }
}

/// Simulated clock. Records every suspension instead of sleeping.
#[derive(Debug, Default)]
pub struct MockDelay {
    calls: usize,
    total_ns: u64,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls
    }

    pub fn total_us(&self) -> u64 {
        self.total_ns / 1_000
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.calls += 1;
        self.total_ns += u64::from(ns);
    }

    fn delay_us(&mut self, us: u32) {
        self.calls += 1;
        self.total_ns += u64::from(us) * 1_000;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_script_then_idle() {
        let mut mock = MockRegisters::new(0x100);
        mock.push_status(0x0000);
        mock.set_idle_status(0x0090);

        assert_eq!(mock.read_u16(0x108), Ok(0x0000));
        assert_eq!(mock.read_u16(0x108), Ok(0x0090));
        assert_eq!(mock.read_u16(0x108), Ok(0x0090));
    }

    #[test]
    fn test_fifo_drains_to_zero() {
        let mut mock = MockRegisters::new(0x100);
        mock.push_data(0x1230);
        assert_eq!(mock.read_u16(0x100), Ok(0x1230));
        assert_eq!(mock.read_u16(0x100), Ok(0x0000));
    }

    #[test]
    fn test_unmapped_port() {
        let mut mock = MockRegisters::new(0x100);
        assert_eq!(mock.read_u16(0x0FE), Err(MockError::Unmapped(0x0FE)));
        assert_eq!(mock.read_u16(0x10C), Err(MockError::Unmapped(0x10C)));
    }

    #[test]
    fn test_accesses_are_recorded_in_order() {
        let mut mock = MockRegisters::new(0x100);
        mock.write_u8(0x106, 0x00).unwrap();
        mock.read_u16(0x108).unwrap();
        mock.write_u16(0x10D, 0x00FF).unwrap();
        assert_eq!(
            mock.accesses(),
            [
                Access::WriteByte(0x106, 0x00),
                Access::Read(0x108),
                Access::WriteWord(0x10D, 0x00FF),
            ]
        );
    }

    #[test]
    fn test_read_error_simulation() {
        let mut mock = MockRegisters::new(0x100);
        mock.set_read_error(true);
        assert_eq!(mock.read_u16(0x108), Err(MockError::Simulated));
        assert!(mock.accesses().is_empty());
    }

    #[test]
    fn test_mock_error_is_an_embedded_io_error() {
        fn kind_of<E: embedded_io::Error>(err: &E) -> embedded_io::ErrorKind {
            err.kind()
        }
        assert_eq!(kind_of(&MockError::Simulated), embedded_io::ErrorKind::Other);
        assert_eq!(MockError::Unmapped(0x10C).to_string(), "Port 0x10c is not mapped");
    }

    #[test]
    fn test_mock_delay_accumulates() {
        let mut delay = MockDelay::new();
        delay.delay_us(5_000);
        delay.delay_ms(1);
        assert_eq!(delay.total_us(), 6_000);
    }
}
