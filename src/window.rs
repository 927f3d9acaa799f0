//! Register interface over the claimed I/O window.

use core::num::NonZeroU32;

use embedded_io::{ReadExactError, SeekFrom};
use thiserror::Error;

use crate::{
    error::{Error, Result},
    register::{AdcRegister, RawSample, StatusFlags, TRIGGER_ARM, WINDOW_EXTENT},
};

/// Port style access to the adapter.
///
/// Ports are absolute addresses. Every call must reach the hardware in the
/// order issued, implementations may not cache or coalesce accesses.
pub trait RegisterIo: embedded_io::ErrorType {
    /// Read a 16-bit word.
    fn read_u16(&mut self, port: u32) -> core::result::Result<u16, Self::Error>;
    /// Write a 16-bit word.
    fn write_u16(&mut self, port: u32, value: u16) -> core::result::Result<(), Self::Error>;
    /// Write a single byte.
    fn write_u8(&mut self, port: u32, value: u8) -> core::result::Result<(), Self::Error>;
}

/// A reserved I/O range, handed over by whoever claimed the PCI resources.
///
/// Base and length are fixed for the lifetime of the window.
pub struct RegisterWindow<P: RegisterIo> {
    base: NonZeroU32,
    length: u16,
    io: P,
}

impl<P: RegisterIo> RegisterWindow<P> {
    /// Wrap an already claimed range.
    ///
    /// Fails with [`Error::InvalidWindow`] when the base is zero or the range does
    /// not cover the register map. No register is touched in that case.
    pub fn new(base: u32, length: u16, io: P) -> Result<Self, P::Error> {
        let fits = base.checked_add(u32::from(length)).is_some();
        match NonZeroU32::new(base) {
            Some(base) if fits && length >= WINDOW_EXTENT => Ok(Self { base, length, io }),
            _ => Err(Error::InvalidWindow { base, length }),
        }
    }

    pub fn base(&self) -> u32 {
        self.base.get()
    }

    pub fn length(&self) -> u16 {
        self.length
    }

    /// Give the backend back, e.g. when the device detaches.
    pub fn release(self) -> P {
        self.io
    }

    fn port(&self, register: AdcRegister) -> u32 {
        self.base.get() + u32::from(register.offset())
    }

    /// Read a fresh status word.
    pub fn read_status(&mut self) -> Result<StatusFlags, P::Error> {
        let port = self.port(AdcRegister::Status);
        let word = self.io.read_u16(port).map_err(Error::Io)?;
        Ok(StatusFlags::from_word(word))
    }

    /// Pop one word from the A/D FIFO.
    pub fn read_data(&mut self) -> Result<RawSample, P::Error> {
        let port = self.port(AdcRegister::AdFifo);
        let word = self.io.read_u16(port).map_err(Error::Io)?;
        Ok(RawSample(word))
    }

    /// Arm one conversion.
    pub fn write_trigger(&mut self) -> Result<(), P::Error> {
        let port = self.port(AdcRegister::SoftwareTrigger);
        self.io.write_u16(port, TRIGGER_ARM).map_err(Error::Io)
    }

    /// Write a configuration byte. Used once when the device attaches.
    pub fn write_config(&mut self, register: AdcRegister, value: u8) -> Result<(), P::Error> {
        let port = self.port(register);
        self.io.write_u8(port, value).map_err(Error::Io)
    }
}

/// Errors from [`SeekPort`].
#[derive(Error, Debug)]
pub enum PortError<E: embedded_io::Error> {
    #[error("Port stream error")]
    Stream(E),
    #[error("Port stream ended during a read")]
    UnexpectedEof,
}

impl<E: embedded_io::Error> embedded_io::Error for PortError<E> {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            PortError::Stream(err) => err.kind(),
            PortError::UnexpectedEof => embedded_io::ErrorKind::InvalidData,
        }
    }
}

impl<E: embedded_io::Error> From<ReadExactError<E>> for PortError<E> {
    fn from(err: ReadExactError<E>) -> Self {
        match err {
            ReadExactError::UnexpectedEof => PortError::UnexpectedEof,
            ReadExactError::Other(err) => PortError::Stream(err),
        }
    }
}

/// [`RegisterIo`] over a seekable byte stream addressed by port number,
/// which is how `/dev/port` exposes I/O space. Words are little-endian.
pub struct SeekPort<T> {
    stream: T,
}

impl<T> SeekPort<T>
where
    T: embedded_io::Read + embedded_io::Write + embedded_io::Seek,
{
    pub fn new(stream: T) -> Self {
        Self { stream }
    }

    pub fn into_inner(self) -> T {
        self.stream
    }

    fn seek_to(&mut self, port: u32) -> core::result::Result<(), PortError<T::Error>> {
        self.stream
            .seek(SeekFrom::Start(u64::from(port)))
            .map_err(PortError::Stream)?;
        Ok(())
    }
}

impl<T> embedded_io::ErrorType for SeekPort<T>
where
    T: embedded_io::ErrorType,
{
    type Error = PortError<T::Error>;
}

impl<T> RegisterIo for SeekPort<T>
where
    T: embedded_io::Read + embedded_io::Write + embedded_io::Seek,
{
    fn read_u16(&mut self, port: u32) -> core::result::Result<u16, Self::Error> {
        self.seek_to(port)?;
        let mut word = [0u8; 2];
        self.stream.read_exact(&mut word)?;
        Ok(u16::from_le_bytes(word))
    }

    fn write_u16(&mut self, port: u32, value: u16) -> core::result::Result<(), Self::Error> {
        self.seek_to(port)?;
        self.stream
            .write_all(&value.to_le_bytes())
            .map_err(PortError::Stream)?;
        self.stream.flush().map_err(PortError::Stream)
    }

    fn write_u8(&mut self, port: u32, value: u8) -> core::result::Result<(), Self::Error> {
        self.seek_to(port)?;
        self.stream.write_all(&[value]).map_err(PortError::Stream)?;
        self.stream.flush().map_err(PortError::Stream)
    }
}
