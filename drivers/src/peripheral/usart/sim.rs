//! Behavioural USART model for host tests.
//!
//! Built on [`SimRegisters`], with the status flags driven the way the
//! hardware drives them:
//!
//! - writing DR clears TXE and TC; both rise again after `tx_latency`
//!   status polls
//! - queued receive bytes raise RXNE after their own poll delay; reading DR
//!   clears RXNE
//!
//! Every byte written to DR lands on the simulated wire together with the
//! number of status polls that preceded it.

use crate::hw::stm32f446::{
    USART_BLOCK_SIZE, USART_DR_OFFSET, USART_SR_OFFSET, USART_SR_RESET,
};
use crate::peripheral::usart::Sr;
use common::RegisterIo;
use common::sim::SimRegisters;
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::collections::VecDeque;

pub(crate) struct UsartModel {
    regs: RefCell<SimRegisters>,
    tx_latency: u32,
    tx_countdown: Cell<u32>,
    tx_held: Cell<bool>,
    polls_since_write: Cell<u32>,
    rx_queue: RefCell<VecDeque<(u8, u32)>>,
    rx_data: Cell<u8>,
    wire: Vec<u8>,
    tx_waits: Vec<u32>,
    overruns: usize,
}

impl UsartModel {
    pub(crate) fn new() -> Self {
        Self {
            regs: RefCell::new(SimRegisters::with_reset(
                USART_BLOCK_SIZE,
                &[(USART_SR_OFFSET, USART_SR_RESET)],
            )),
            tx_latency: 1,
            tx_countdown: Cell::new(0),
            tx_held: Cell::new(false),
            polls_since_write: Cell::new(0),
            rx_queue: RefCell::new(VecDeque::new()),
            rx_data: Cell::new(0),
            wire: Vec::new(),
            tx_waits: Vec::new(),
            overruns: 0,
        }
    }

    /// Status polls between a DR write and TXE rising again.
    pub(crate) fn with_tx_latency(mut self, polls: u32) -> Self {
        self.tx_latency = polls;
        self
    }

    /// Drop TXE/TC and raise them on the `polls`-th status read.
    pub(crate) fn busy_for(&mut self, polls: u32) {
        self.update_sr(|sr| sr - (Sr::TXE | Sr::TC));
        self.tx_countdown.set(polls);
    }

    /// Drop TXE/TC until [`UsartModel::release_tx`].
    pub(crate) fn hold_tx(&mut self) {
        self.update_sr(|sr| sr - (Sr::TXE | Sr::TC));
        self.tx_held.set(true);
    }

    pub(crate) fn release_tx(&mut self) {
        self.tx_held.set(false);
        self.tx_countdown.set(0);
        self.update_sr(|sr| sr | Sr::TXE | Sr::TC);
    }

    /// Queue `byte`; RXNE rises on the `polls`-th status read once it
    /// reaches the front of the queue.
    pub(crate) fn receive_after(&mut self, byte: u8, polls: u32) {
        self.rx_queue.get_mut().push_back((byte, polls.max(1)));
    }

    pub(crate) fn wire(&self) -> &[u8] {
        &self.wire
    }

    /// Status polls observed before each transmitted byte.
    pub(crate) fn tx_waits(&self) -> &[u32] {
        &self.tx_waits
    }

    /// DR writes made while TXE was clear.
    pub(crate) fn overruns(&self) -> usize {
        self.overruns
    }

    pub(crate) fn registers(&self) -> Ref<'_, SimRegisters> {
        self.regs.borrow()
    }

    pub(crate) fn registers_mut(&mut self) -> RefMut<'_, SimRegisters> {
        self.regs.borrow_mut()
    }

    fn sr(&self) -> Sr {
        Sr::from_bits_retain(self.regs.borrow().peek(USART_SR_OFFSET))
    }

    fn update_sr(&self, f: impl FnOnce(Sr) -> Sr) {
        let sr = f(self.sr());
        self.regs.borrow_mut().poke(USART_SR_OFFSET, sr.bits());
    }

    /// Advance the hardware by one status poll.
    fn tick(&self) {
        self.polls_since_write.set(self.polls_since_write.get() + 1);

        let countdown = self.tx_countdown.get();
        if !self.tx_held.get() && countdown > 0 {
            self.tx_countdown.set(countdown - 1);
            if countdown == 1 {
                self.update_sr(|sr| sr | Sr::TXE | Sr::TC);
            }
        }

        if !self.sr().contains(Sr::RXNE) {
            let arrived = {
                let mut queue = self.rx_queue.borrow_mut();
                let due = match queue.front_mut() {
                    Some((_, remaining)) => {
                        *remaining -= 1;
                        *remaining == 0
                    }
                    None => false,
                };
                if due { queue.pop_front() } else { None }
            };
            if let Some((byte, _)) = arrived {
                self.rx_data.set(byte);
                self.update_sr(|sr| sr | Sr::RXNE);
            }
        }
    }
}

impl RegisterIo for UsartModel {
    fn read(&self, offset: usize) -> u32 {
        match offset {
            USART_SR_OFFSET => {
                self.tick();
                self.regs.borrow().read(offset)
            }
            USART_DR_OFFSET => {
                self.regs.borrow().read(offset);
                self.update_sr(|sr| sr - Sr::RXNE);
                u32::from(self.rx_data.get())
            }
            _ => self.regs.borrow().read(offset),
        }
    }

    fn write(&mut self, offset: usize, value: u32) {
        if offset == USART_DR_OFFSET {
            if !self.sr().contains(Sr::TXE) {
                self.overruns += 1;
            }
            self.wire.push(value as u8);
            self.tx_waits.push(self.polls_since_write.replace(0));
            self.update_sr(|sr| sr - (Sr::TXE | Sr::TC));
            self.tx_countdown.set(self.tx_latency);
        }
        self.regs.get_mut().write(offset, value);
    }
}
