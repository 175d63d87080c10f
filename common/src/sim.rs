//! In-memory register file for host tests.
//!
//! [`SimRegisters`] stores one word per register and journals every write
//! made through [`RegisterIo`], so tests can assert both the final register
//! state and the exact order of hardware accesses. Changes made from the
//! "hardware side" go through [`SimRegisters::poke`] and are not journaled.

use crate::mmio::RegisterIo;
use std::cell::Cell;
use std::vec::Vec;

/// A single journaled register write.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Write {
    pub offset: usize,
    pub value: u32,
}

/// Simulated register block.
#[derive(Debug)]
pub struct SimRegisters {
    words: Vec<u32>,
    reads: Vec<Cell<usize>>,
    journal: Vec<Write>,
}

impl SimRegisters {
    /// A zeroed register block spanning `size` bytes.
    pub fn new(size: usize) -> Self {
        let len = size.div_ceil(4);
        Self {
            words: vec![0; len],
            reads: (0..len).map(|_| Cell::new(0)).collect(),
            journal: Vec::new(),
        }
    }

    /// A register block with reset values applied.
    pub fn with_reset(size: usize, reset: &[(usize, u32)]) -> Self {
        let mut regs = Self::new(size);
        for &(offset, value) in reset {
            regs.poke(offset, value);
        }
        regs
    }

    fn index(&self, offset: usize) -> usize {
        assert!(offset % 4 == 0, "unaligned register offset {offset:#x}");
        let index = offset / 4;
        assert!(
            index < self.words.len(),
            "register offset {offset:#x} outside simulated block"
        );
        index
    }

    /// Current register value without counting it as a read.
    pub fn peek(&self, offset: usize) -> u32 {
        self.words[self.index(offset)]
    }

    /// Change a register from the hardware side.
    pub fn poke(&mut self, offset: usize, value: u32) {
        let index = self.index(offset);
        self.words[index] = value;
    }

    /// Number of reads made through [`RegisterIo`] at `offset`.
    pub fn reads(&self, offset: usize) -> usize {
        self.reads[self.index(offset)].get()
    }

    /// Every write, in order.
    pub fn writes(&self) -> &[Write] {
        &self.journal
    }

    /// Values written to `offset`, in order.
    pub fn writes_to(&self, offset: usize) -> Vec<u32> {
        self.journal
            .iter()
            .filter(|w| w.offset == offset)
            .map(|w| w.value)
            .collect()
    }

    /// Forget journaled writes and read counters.
    pub fn clear_journal(&mut self) {
        self.journal.clear();
        for count in &self.reads {
            count.set(0);
        }
    }
}

impl RegisterIo for SimRegisters {
    fn read(&self, offset: usize) -> u32 {
        let index = self.index(offset);
        let count = &self.reads[index];
        count.set(count.get() + 1);
        self.words[index]
    }

    fn write(&mut self, offset: usize, value: u32) {
        let index = self.index(offset);
        self.words[index] = value;
        self.journal.push(Write { offset, value });
    }
}
