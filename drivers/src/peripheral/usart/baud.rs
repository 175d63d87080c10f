//! Baud-rate divisor computation.
//!
//! With oversampling by 16 the BRR register holds `USARTDIV` in 12.4 fixed
//! point, so the value to program is simply `clock_hz / baud_rate`. Rounding
//! that quotient to nearest instead of truncating halves the worst-case
//! quantisation error of the baud generator.

use crate::hal::serial::SerialError;

/// Smallest BRR value the generator accepts (`USARTDIV` = 1.0).
pub const MIN_DIVISOR: u32 = 16;

/// BRR is 16 bits wide.
pub const MAX_DIVISOR: u32 = 0xFFFF;

/// Input clock and desired baud rate.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BaudConfig {
    /// Peripheral input clock in Hz.
    pub clock_hz: u32,
    /// Desired baud rate in bits per second.
    pub baud_rate: u32,
}

impl BaudConfig {
    pub const fn new(clock_hz: u32, baud_rate: u32) -> Self {
        Self {
            clock_hz,
            baud_rate,
        }
    }

    /// `round(clock_hz / baud_rate)`, computed as
    /// `(clock_hz + baud_rate / 2) / baud_rate`.
    ///
    /// No range check: a baud rate above twice the clock yields 0, and a
    /// zero baud rate yields 0 rather than dividing by zero. Both are
    /// invalid hardware settings; see [`BaudConfig::checked_divisor`].
    pub const fn divisor(&self) -> u32 {
        if self.baud_rate == 0 {
            return 0;
        }
        let clock = self.clock_hz as u64;
        let baud = self.baud_rate as u64;
        ((clock + baud / 2) / baud) as u32
    }

    /// The divisor, rejected unless the baud generator can represent it.
    pub const fn checked_divisor(&self) -> Result<u16, SerialError> {
        if self.clock_hz == 0 || self.baud_rate == 0 {
            return Err(SerialError::InvalidConfig);
        }
        let divisor = self.divisor();
        if divisor < MIN_DIVISOR || divisor > MAX_DIVISOR {
            return Err(SerialError::InvalidConfig);
        }
        Ok(divisor as u16)
    }

    /// Baud rate the hardware actually produces with [`BaudConfig::divisor`].
    pub const fn actual_baud(&self) -> Option<u32> {
        let divisor = self.divisor();
        if divisor == 0 {
            return None;
        }
        let clock = self.clock_hz as u64;
        let divisor = divisor as u64;
        Some(((clock + divisor / 2) / divisor) as u32)
    }
}
