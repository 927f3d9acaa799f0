//! This module is used to define the registers of the PCI-9111 A/D window.

use modular_bitfield::prelude::*;
use strum_macros::EnumIter;

/// Register offsets, relative to the base of the I/O window (PCI BAR 2).
#[derive(Debug, Copy, Clone, PartialEq, Eq, EnumIter)]
#[repr(u16)]
pub enum AdcRegister {
    /// __R__ - A/D FIFO data word.
    ///
    /// The 12-bit code sits in bits 15..4, the channel it was taken from in bits 3..0.
    AdFifo = 0x00,
    /// __W__ - Channel select. Only channel 0 is used.
    ChannelControl = 0x06,
    /// __R__ - A/D status word. See [`StatusFlags`].
    ///
    /// __W__ - Input range select when written as a byte. `0` => ±10V.
    Status = 0x08,
    /// __W__ - Trigger source. `0` => software trigger, polled.
    TriggerMode = 0x0A,
    /// __W__ - Software trigger. Any non-zero write arms one conversion.
    SoftwareTrigger = 0x0D,
}

impl AdcRegister {
    /// The range control register shares its offset with the status register.
    pub const RANGE_CONTROL: AdcRegister = AdcRegister::Status;

    /// Offset of this register within the window.
    pub const fn offset(self) -> u16 {
        self as u16
    }

    /// Access width of this register in bytes.
    pub const fn width(self) -> u16 {
        match self {
            AdcRegister::ChannelControl | AdcRegister::TriggerMode => 1,
            AdcRegister::AdFifo | AdcRegister::Status | AdcRegister::SoftwareTrigger => 2,
        }
    }
}

/// Smallest window which covers every register in [`AdcRegister`].
pub const WINDOW_EXTENT: u16 = 0x10;

/// Channel written to [`AdcRegister::ChannelControl`] at attach.
pub const CHANNEL_0: u8 = 0x00;
/// Range code written to [`AdcRegister::RANGE_CONTROL`] at attach.
pub const RANGE_BIPOLAR_10V: u8 = 0x00;
/// Trigger mode written to [`AdcRegister::TriggerMode`] at attach.
pub const TRIGGER_SOFTWARE: u8 = 0x00;
/// Value written to [`AdcRegister::SoftwareTrigger`]. Only non-zero matters.
pub const TRIGGER_ARM: u16 = 0x00FF;

/// Decoded A/D status word.
///
/// Polarity used throughout this crate: a set `ready` bit means the converter
/// is idle, a set `not_empty` bit means a sample is waiting in the FIFO.
/// Use [`Self::is_ready`] and [`Self::has_pending_sample`] rather than testing raw bits.
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusFlags {
    /// Echo of the selected input range.
    pub range: B4,
    pub not_empty: bool,
    pub half_full: bool,
    pub full: bool,
    pub ready: bool,
    #[skip]
    __: B8,
}

impl StatusFlags {
    pub const READY_BIT: u16 = 1 << 7;
    pub const NOT_EMPTY_BIT: u16 = 1 << 4;

    /// Decode a status word as read from [`AdcRegister::Status`].
    pub fn from_word(word: u16) -> Self {
        Self::from_bytes(word.to_le_bytes())
    }

    /// The raw status word.
    pub fn as_word(&self) -> u16 {
        u16::from_le_bytes((*self).into_bytes())
    }

    /// Converter idle, a new conversion may be triggered or its result read.
    pub fn is_ready(&self) -> bool {
        self.ready()
    }

    /// An unread sample is sitting in the FIFO.
    pub fn has_pending_sample(&self) -> bool {
        self.not_empty()
    }
}

/// How the 12-bit code is extracted from the FIFO word.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum SampleAlignment {
    /// Shift the channel nibble off. Codes are in `0..=4095`.
    #[default]
    ShiftRight,
    /// Clear the channel nibble and keep the word as a signed 16-bit value.
    MaskLowNibble,
}

/// A FIFO word, exactly as read from [`AdcRegister::AdFifo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSample(pub u16);

impl RawSample {
    /// Channel number carried in the low nibble.
    pub const fn channel(&self) -> u8 {
        (self.0 & 0x000F) as u8
    }

    /// The conversion code with the channel bits removed.
    pub const fn code(&self, alignment: SampleAlignment) -> i16 {
        match alignment {
            SampleAlignment::ShiftRight => (self.0 >> 4) as i16,
            SampleAlignment::MaskLowNibble => (self.0 & 0xFFF0) as i16,
        }
    }
}
