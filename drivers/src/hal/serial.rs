//! Serial Port (UART) Hardware Abstraction Layer.
//!
//! This module defines platform-independent traits for serial communication.
//! Blocking operations wait for the hardware without a timeout; the
//! [`NonBlockingSerial`] extension polls once and reports
//! [`SerialError::WouldBlock`] instead.

use core::fmt;

/// Serial port configuration.
///
/// The frame-format enums name every format a UART commonly offers. A port
/// that cannot produce a requested format rejects it with
/// [`SerialError::InvalidConfig`]; the STM32F4 USART driver supports 8N1
/// only.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Peripheral input clock in Hz.
    pub clock_hz: u32,
    /// Baud rate in bits per second.
    pub baud_rate: u32,
    /// Number of data bits per frame.
    pub data_bits: DataBits,
    /// Parity checking mode.
    pub parity: Parity,
    /// Number of stop bits.
    pub stop_bits: StopBits,
}

impl SerialConfig {
    /// Create a standard 8N1 configuration.
    ///
    /// 8N1 means: 8 data bits, no parity, 1 stop bit.
    pub const fn new_8n1(clock_hz: u32, baud_rate: u32) -> Self {
        Self {
            clock_hz,
            baud_rate,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

impl Default for SerialConfig {
    /// Default configuration: 16 MHz peripheral clock, 115200 baud, 8N1.
    fn default() -> Self {
        Self::new_8n1(16_000_000, 115_200)
    }
}

/// Number of data bits per frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DataBits {
    Eight,
    /// Not supported by the STM32F4 USART driver.
    Nine,
}

/// Parity mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Parity {
    /// No parity bit.
    None,
    /// Odd parity. Not supported by the STM32F4 USART driver.
    Odd,
    /// Even parity. Not supported by the STM32F4 USART driver.
    Even,
}

/// Number of stop bits.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StopBits {
    /// One stop bit.
    One,
    /// Two stop bits. Not supported by the STM32F4 USART driver.
    Two,
}

/// Serial port errors.
///
/// None of these can come out of a blocking read or write: those wait for
/// the hardware instead of failing.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SerialError {
    /// Operation would block but non-blocking mode was requested.
    WouldBlock,
    /// The poll budget of a bounded operation ran out.
    Timeout,
    /// Invalid configuration parameter.
    InvalidConfig,
}

impl fmt::Display for SerialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SerialError::WouldBlock => f.write_str("serial port not ready"),
            SerialError::Timeout => f.write_str("serial port timed out"),
            SerialError::InvalidConfig => f.write_str("invalid serial configuration"),
        }
    }
}

/// Serial port trait.
///
/// This trait provides the core interface for serial communication.
pub trait SerialPort {
    /// Error type for serial operations.
    type Error: fmt::Debug;

    /// Configure and enable the serial port.
    ///
    /// This must be called before using the serial port.
    fn configure(&mut self, config: SerialConfig) -> Result<(), Self::Error>;

    /// Write a single byte (blocking).
    fn write_byte(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Write multiple bytes (blocking).
    fn write(&mut self, bytes: &[u8]) -> Result<usize, Self::Error> {
        for &byte in bytes {
            self.write_byte(byte)?;
        }
        Ok(bytes.len())
    }

    /// Read a single byte (blocking).
    fn read_byte(&mut self) -> Result<u8, Self::Error>;

    /// Read multiple bytes (blocking).
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, Self::Error> {
        for byte in buffer.iter_mut() {
            *byte = self.read_byte()?;
        }
        Ok(buffer.len())
    }

    /// Wait until the last byte has left the shift register.
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Check if the serial port is busy transmitting.
    fn is_busy(&self) -> bool;

    /// Access the non-blocking interface, if the port has one.
    fn as_nonblocking(&mut self) -> Option<&mut dyn NonBlockingSerial<Error = Self::Error>> {
        None
    }
}

/// Extension trait for non-blocking operations.
pub trait NonBlockingSerial: SerialPort {
    /// Try to write a byte without blocking.
    fn try_write_byte(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Try to read a byte without blocking.
    fn try_read_byte(&mut self) -> Result<u8, Self::Error>;
}
