//! Memory-mapped register access.
//!
//! Drivers never touch raw pointers directly. They go through
//! [`RegisterIo`], which is implemented by [`Mmio`] for real hardware and
//! by the simulated register file for host tests.

use core::ptr::{read_volatile, write_volatile};

/// Word-sized access to a block of registers, addressed by byte offset.
pub trait RegisterIo {
    /// Read the 32-bit register at `offset`.
    fn read(&self, offset: usize) -> u32;

    /// Write the 32-bit register at `offset`.
    fn write(&mut self, offset: usize, value: u32);

    /// Read-modify-write a register.
    #[inline]
    fn modify<F>(&mut self, offset: usize, f: F)
    where
        F: FnOnce(u32) -> u32,
    {
        let value = self.read(offset);
        self.write(offset, f(value));
    }

    /// Set every bit of `mask`, leaving the others untouched.
    #[inline]
    fn set_bits(&mut self, offset: usize, mask: u32) {
        self.modify(offset, |value| value | mask);
    }

    /// Clear every bit of `mask`, leaving the others untouched.
    #[inline]
    fn clear_bits(&mut self, offset: usize, mask: u32) {
        self.modify(offset, |value| value & !mask);
    }
}

impl<T: RegisterIo + ?Sized> RegisterIo for &mut T {
    #[inline]
    fn read(&self, offset: usize) -> u32 {
        (**self).read(offset)
    }

    #[inline]
    fn write(&mut self, offset: usize, value: u32) {
        (**self).write(offset, value)
    }
}

/// Volatile access to a register block at a fixed physical address.
///
/// Not `Clone`: a register block has one owner at a time.
#[derive(Debug)]
pub struct Mmio {
    base: usize,
}

impl Mmio {
    /// Wrap the register block starting at `base`.
    ///
    /// # Safety
    ///
    /// - `base` must be the address of a valid, word-aligned register block
    /// - Only one `Mmio` should exist per register block
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    /// Base address of the register block.
    pub const fn base(&self) -> usize {
        self.base
    }
}

impl RegisterIo for Mmio {
    #[inline]
    fn read(&self, offset: usize) -> u32 {
        // SAFETY: `new` requires `base` to point at a mapped register block.
        unsafe { read_volatile((self.base + offset) as *const u32) }
    }

    #[inline]
    fn write(&mut self, offset: usize, value: u32) {
        // SAFETY: see `read`.
        unsafe { write_volatile((self.base + offset) as *mut u32, value) }
    }
}
