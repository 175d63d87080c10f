//! Hardware Abstraction Layer (HAL) - Platform-Independent Traits
//!
//! These traits are implemented by the chip-specific drivers so that
//! application code (the console, the firmware loops) does not depend on
//! register layouts.
//!
//! # Available Interfaces
//!
//! - [`gpio`]: Digital input/output pins
//! - [`serial`]: Serial port (UART) communication

pub mod gpio;
pub mod serial;
