//! STM32F4 Driver Subsystem
//!
//! This crate provides a layered architecture for the Nucleo-F446RE:
//!
//! # Module Organization
//!
//! - [`hal`]: Platform-independent trait definitions
//! - [`hw`]: Memory map and register offsets from the reference manual
//! - [`peripheral`]: Reusable peripheral drivers (USART)
//! - [`platform`]: Chip-specific clock, GPIO and board bring-up
//! - [`console`]: Retargeted character output and the logger
//!
//! # Usage Example
//!
//! ```no_run
//! use drivers::peripheral::usart::Directions;
//! use drivers::platform::stm32f446::{Board, board};
//!
//! let Board { mut rcc, mut gpioa, mut usart2, .. } = Board::take().unwrap();
//! board::init_usart2(&mut rcc, &mut gpioa, &mut usart2, Directions::TX).unwrap();
//! for &byte in b"HI\r\n" {
//!     usart2.write_byte(byte);
//! }
//! ```

#![cfg_attr(not(test), no_std)]

pub mod console;
pub mod hal;
pub mod hw;
pub mod peripheral;
pub mod platform;

// Re-export commonly used types
pub use hal::gpio::{InputPin, OutputPin, PinLevel, StatefulOutputPin};
pub use hal::serial::{SerialConfig, SerialError, SerialPort};
pub use peripheral::usart::{BaudConfig, Directions, Usart};
