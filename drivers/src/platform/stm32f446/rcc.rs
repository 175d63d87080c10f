//! Reset and clock control: peripheral clock gating.
//!
//! Every peripheral starts with its bus clock gated off; its registers
//! read as zero and ignore writes until the matching enable bit is set.

use super::gpio::Port;
use crate::hw::stm32f446::{RCC_AHB1ENR_OFFSET, RCC_APB1ENR_OFFSET, RCC_APB2ENR_OFFSET, RCC_BASE};
use crate::peripheral::usart::Instance;
use common::{Mmio, RegisterIo};

/// Enable register and bit for a USART instance.
const fn usart_enable_bit(instance: Instance) -> (usize, u32) {
    match instance {
        Instance::Usart2 => (RCC_APB1ENR_OFFSET, 1 << 17),
        Instance::Usart3 => (RCC_APB1ENR_OFFSET, 1 << 18),
        Instance::Uart4 => (RCC_APB1ENR_OFFSET, 1 << 19),
        Instance::Uart5 => (RCC_APB1ENR_OFFSET, 1 << 20),
        Instance::Usart1 => (RCC_APB2ENR_OFFSET, 1 << 4),
        Instance::Usart6 => (RCC_APB2ENR_OFFSET, 1 << 5),
    }
}

/// RCC driver.
pub struct Rcc<R: RegisterIo = Mmio> {
    regs: R,
}

impl Rcc<Mmio> {
    /// # Safety
    ///
    /// Only one instance should exist.
    pub const unsafe fn new() -> Self {
        Self {
            regs: unsafe { Mmio::new(RCC_BASE) },
        }
    }
}

impl<R: RegisterIo> Rcc<R> {
    /// Wrap an arbitrary register block.
    pub const fn from_registers(regs: R) -> Self {
        Self { regs }
    }

    /// Release the register block.
    pub fn free(self) -> R {
        self.regs
    }

    fn enable(&mut self, offset: usize, mask: u32) {
        self.regs.set_bits(offset, mask);
        // The clock reaches the peripheral two bus cycles after the write.
        // Reading back stalls long enough for the first access to land.
        let _ = self.regs.read(offset);
    }

    /// Ungate the AHB1 clock of a GPIO port.
    pub fn enable_gpio(&mut self, port: Port) {
        self.enable(RCC_AHB1ENR_OFFSET, 1 << port.index());
    }

    pub fn is_gpio_enabled(&self, port: Port) -> bool {
        self.regs.read(RCC_AHB1ENR_OFFSET) & (1 << port.index()) != 0
    }

    /// Ungate the APB clock of a USART.
    pub fn enable_usart(&mut self, instance: Instance) {
        let (offset, mask) = usart_enable_bit(instance);
        self.enable(offset, mask);
    }

    pub fn is_usart_enabled(&self, instance: Instance) -> bool {
        let (offset, mask) = usart_enable_bit(instance);
        self.regs.read(offset) & mask != 0
    }
}
