//! This crate drives the A/D converter of the ADLINK PCI-9111 data acquisition adapter.
//!
//! It supports `no-std` environments by use of the `no-std` feature flag.
//!
//! Claiming the PCI resources is left to the host. Once it has reserved the
//! I/O window on BAR 2, wrap it in a [`window::RegisterWindow`] and attach a
//! [`device::Pci9111`]. Every read then runs one software triggered conversion:
//!
//! 1. Wait for the converter to become ready.
//! 2. Discard any stale samples left in the FIFO.
//! 3. Trigger a conversion and wait for it to complete.
//! 4. Read the sample and scale it to volts with fixed-point arithmetic.
//!
//! Hardware setup used at attach:
//! * Channel: 0
//! * Input range: ±10V
//! * Trigger: software, polled
//!
//! A reading is handed back either as an ASCII line like `1.2503 V\n` or as
//! the two raw bytes of the sample, see [`config::OutputMode`].

#![cfg_attr(feature = "no-std", no_std)]

pub mod acquisition;
pub mod config;
#[cfg(not(feature = "no-std"))]
pub mod delay;
pub mod device;
pub mod error;
pub mod output;
pub mod register;
pub mod scaling;
pub mod window;

#[cfg(test)]
mod mock_registers;
