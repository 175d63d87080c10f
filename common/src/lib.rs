//! Low-level building blocks shared by the drivers.
//!
//! - [`mmio`]: word-sized register access behind the [`RegisterIo`] trait
//! - [`bits`]: helpers for multi-bit register fields
//! - `sim`: an in-memory register file for host tests (feature `sim`)

#![cfg_attr(not(any(test, feature = "sim")), no_std)]

pub mod bits;
pub mod mmio;
#[cfg(any(test, feature = "sim"))]
pub mod sim;

pub use mmio::{Mmio, RegisterIo};
