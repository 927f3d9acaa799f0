//! What a read hands back to the caller.

use core::fmt::Write;

use crate::{
    acquisition::{AcquisitionOutcome, Reading},
    config::{AcquisitionConfig, OutputMode, TimeoutReport},
    error::{Error, Result},
};

/// Longest line we produce: sign, 15 digits, point, unit and line end.
pub const MAX_LINE_LEN: usize = 32;

/// Bytes in a raw reading.
pub const RAW_LEN: usize = 2;

type Line = heapless::String<MAX_LINE_LEN>;

fn format_reading(reading: &Reading) -> Line {
    let mut line = Line::new();
    // Cannot overflow, see MAX_LINE_LEN.
    let _ = writeln!(line, "{} V", reading.voltage);
    line
}

fn copy_out<I: embedded_io::Error>(bytes: &[u8], buf: &mut [u8]) -> Result<usize, I> {
    let capacity = buf.len();
    let target = buf.get_mut(..bytes.len()).ok_or(Error::BufferTooSmall {
        needed: bytes.len(),
        capacity,
    })?;
    target.copy_from_slice(bytes);
    Ok(bytes.len())
}

/// Write `outcome` into `buf` as configured and return the number of bytes written.
///
/// Nothing is written if the reply does not fit.
pub fn render<I: embedded_io::Error>(
    outcome: &AcquisitionOutcome,
    config: &AcquisitionConfig,
    buf: &mut [u8],
) -> Result<usize, I> {
    match (outcome, config.output()) {
        (AcquisitionOutcome::Success(reading), OutputMode::Formatted) => {
            copy_out(format_reading(reading).as_bytes(), buf)
        }
        (AcquisitionOutcome::Success(reading), OutputMode::Raw) => {
            copy_out(&reading.code.to_le_bytes(), buf)
        }
        (AcquisitionOutcome::Timeout(stage), _) => match config.timeout_report() {
            TimeoutReport::Silent => Ok(0),
            TimeoutReport::Diagnostic => {
                let mut line = Line::new();
                let _ = writeln!(line, "timeout {}", stage.as_str());
                copy_out(line.as_bytes(), buf)
            }
        },
    }
}

/// Decode a raw reading as produced with [`OutputMode::Raw`].
pub fn decode_raw(bytes: &[u8]) -> Option<i16> {
    let word: [u8; RAW_LEN] = bytes.get(..RAW_LEN)?.try_into().ok()?;
    Some(i16::from_le_bytes(word))
}
