//! STM32F4 USART Driver
//!
//! Blocking, polled, byte-oriented access to one USART instance.
//!
//! # Features
//!
//! - Round-to-nearest baud divisor ([`BaudConfig`])
//! - Named enable flags instead of raw CR1 masks ([`Cr1`], [`Directions`])
//! - Blocking I/O that spins on the status register with no timeout
//! - Single-poll and poll-budget variants as opt-in extras
//!
//! The caller must already have enabled the USART clock and routed the
//! TX/RX pins to the USART alternate function (see
//! [`crate::platform::stm32f446::board`]).
//!
//! # Blocking
//!
//! [`Usart::write_byte`] and [`Usart::read_byte`] wait for as long as the
//! hardware takes. If the status flag never rises (clock gated, peripheral
//! disabled, direction not enabled) they never return.
//!
//! # Example
//!
//! ```no_run
//! use drivers::hw::stm32f446::{HSI_HZ, USART2_BASE};
//! use drivers::peripheral::usart::{Directions, Usart};
//!
//! let mut uart = unsafe { Usart::new(USART2_BASE) };
//! uart.configure(HSI_HZ, 115_200);
//! uart.enable(Directions::TX);
//! for &byte in b"HI\r\n" {
//!     uart.write_byte(byte);
//! }
//! ```

mod baud;
#[cfg(test)]
pub(crate) mod sim;

pub use baud::{BaudConfig, MAX_DIVISOR, MIN_DIVISOR};

use crate::hal::serial::{
    DataBits, NonBlockingSerial, Parity, SerialConfig, SerialError, SerialPort, StopBits,
};
use crate::hw::stm32f446::{
    USART_BRR_OFFSET, USART_CR1_OFFSET, USART_CR2_OFFSET, USART_DR_OFFSET, USART_SR_OFFSET,
    USART1_BASE, USART2_BASE, USART3_BASE, USART6_BASE, UART4_BASE, UART5_BASE,
};
use bitflags::bitflags;
use common::{Mmio, RegisterIo};

bitflags! {
    /// USART_SR flags (RM0390 30.6.1).
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct Sr: u32 {
        /// Read data register not empty.
        const RXNE = 1 << 5;
        /// Transmission complete.
        const TC = 1 << 6;
        /// Transmit data register empty.
        const TXE = 1 << 7;
    }
}

bitflags! {
    /// USART_CR1 enable and frame-format bits (RM0390 30.6.4).
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct Cr1: u32 {
        /// Receiver enable.
        const RE = 1 << 2;
        /// Transmitter enable.
        const TE = 1 << 3;
        /// Odd parity (with PCE).
        const PS = 1 << 9;
        /// Parity control enable.
        const PCE = 1 << 10;
        /// 9 data bits.
        const M = 1 << 12;
        /// USART enable.
        const UE = 1 << 13;
    }
}

bitflags! {
    /// Transfer directions to enable. Values are the CR1 bit positions.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct Directions: u32 {
        const TX = Cr1::TE.bits();
        const RX = Cr1::RE.bits();
    }
}

/// USART_CR2 STOP field; 0b00 is one stop bit.
const CR2_STOP_MASK: u32 = 0b11 << 12;

/// USART instances of the STM32F446.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Instance {
    Usart1,
    Usart2,
    Usart3,
    Uart4,
    Uart5,
    Usart6,
}

impl Instance {
    /// Base address of the instance's register block.
    pub const fn base(self) -> usize {
        match self {
            Instance::Usart1 => USART1_BASE,
            Instance::Usart2 => USART2_BASE,
            Instance::Usart3 => USART3_BASE,
            Instance::Uart4 => UART4_BASE,
            Instance::Uart5 => UART5_BASE,
            Instance::Usart6 => USART6_BASE,
        }
    }
}

/// USART driver.
///
/// Holds nothing but the register block; every setting lives in hardware.
pub struct Usart<R: RegisterIo = Mmio> {
    regs: R,
}

impl Usart<Mmio> {
    /// Create a driver for the USART at `base`.
    ///
    /// # Safety
    ///
    /// - `base` must point to a valid USART register block
    /// - Only one instance should exist per USART hardware
    pub const unsafe fn new(base: usize) -> Self {
        Self {
            regs: unsafe { Mmio::new(base) },
        }
    }

    /// Create a driver for a numbered instance.
    ///
    /// # Safety
    ///
    /// Only one instance should exist per USART hardware.
    pub const unsafe fn instance(instance: Instance) -> Self {
        unsafe { Self::new(instance.base()) }
    }
}

impl<R: RegisterIo> Usart<R> {
    /// Wrap an arbitrary register block.
    pub const fn from_registers(regs: R) -> Self {
        Self { regs }
    }

    /// Release the register block.
    pub fn free(self) -> R {
        self.regs
    }

    #[inline]
    fn status(&self) -> Sr {
        Sr::from_bits_retain(self.regs.read(USART_SR_OFFSET))
    }

    /// Spin until `flag` is set.
    #[inline]
    fn wait_for(&self, flag: Sr) {
        while !self.status().contains(flag) {
            core::hint::spin_loop();
        }
    }

    /// Spin until `flag` is set, giving up after `polls` status reads.
    fn wait_for_bounded(&self, flag: Sr, polls: u32) -> Result<(), SerialError> {
        for _ in 0..polls {
            if self.status().contains(flag) {
                return Ok(());
            }
            core::hint::spin_loop();
        }
        Err(SerialError::Timeout)
    }

    /// Program BRR with `round(clock_hz / baud_rate)`.
    ///
    /// Nothing is validated. A baud rate above twice the clock (or zero)
    /// programs divisor 0 and leaves the line with no usable bit timing;
    /// divisors wider than 16 bits are truncated by the register. Use
    /// [`SerialPort::configure`] for a checked setup.
    pub fn configure(&mut self, clock_hz: u32, baud_rate: u32) {
        let divisor = BaudConfig::new(clock_hz, baud_rate).divisor();
        self.regs.write(USART_BRR_OFFSET, divisor & MAX_DIVISOR);
    }

    /// The divisor currently programmed in BRR.
    pub fn divisor(&self) -> u16 {
        (self.regs.read(USART_BRR_OFFSET) & MAX_DIVISOR) as u16
    }

    /// Enable `directions` and the USART itself.
    ///
    /// Bits are OR-ed into CR1, so repeating the call is harmless. Call
    /// after [`Usart::configure`] and before the first transfer.
    pub fn enable(&mut self, directions: Directions) {
        self.regs
            .set_bits(USART_CR1_OFFSET, directions.bits() | Cr1::UE.bits());
    }

    /// Clear UE, stopping the USART at the end of the current byte.
    pub fn disable(&mut self) {
        self.regs.clear_bits(USART_CR1_OFFSET, Cr1::UE.bits());
    }

    /// Directions currently enabled in CR1.
    pub fn directions(&self) -> Directions {
        Directions::from_bits_truncate(self.regs.read(USART_CR1_OFFSET))
    }

    /// Whether UE is set.
    pub fn is_enabled(&self) -> bool {
        Cr1::from_bits_truncate(self.regs.read(USART_CR1_OFFSET)).contains(Cr1::UE)
    }

    /// Wait for TXE, then write `value` to DR.
    pub fn write_byte(&mut self, value: u8) {
        self.wait_for(Sr::TXE);
        self.regs.write(USART_DR_OFFSET, u32::from(value));
    }

    /// Wait for RXNE, then return the received byte.
    pub fn read_byte(&mut self) -> u8 {
        self.wait_for(Sr::RXNE);
        (self.regs.read(USART_DR_OFFSET) & 0xFF) as u8
    }

    /// Write `value` if TXE is already set.
    pub fn try_write_byte(&mut self, value: u8) -> Result<(), SerialError> {
        if !self.status().contains(Sr::TXE) {
            return Err(SerialError::WouldBlock);
        }
        self.regs.write(USART_DR_OFFSET, u32::from(value));
        Ok(())
    }

    /// Read a byte if RXNE is already set.
    pub fn try_read_byte(&mut self) -> Result<u8, SerialError> {
        if !self.status().contains(Sr::RXNE) {
            return Err(SerialError::WouldBlock);
        }
        Ok((self.regs.read(USART_DR_OFFSET) & 0xFF) as u8)
    }

    /// [`Usart::write_byte`] with at most `polls` status reads.
    pub fn write_byte_timeout(&mut self, value: u8, polls: u32) -> Result<(), SerialError> {
        self.wait_for_bounded(Sr::TXE, polls)?;
        self.regs.write(USART_DR_OFFSET, u32::from(value));
        Ok(())
    }

    /// [`Usart::read_byte`] with at most `polls` status reads.
    pub fn read_byte_timeout(&mut self, polls: u32) -> Result<u8, SerialError> {
        self.wait_for_bounded(Sr::RXNE, polls)?;
        Ok((self.regs.read(USART_DR_OFFSET) & 0xFF) as u8)
    }

    /// Write every byte of `bytes`, blocking on each.
    pub fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.write_byte(byte);
        }
    }

    /// Fill `buffer`, blocking on each byte.
    pub fn read(&mut self, buffer: &mut [u8]) {
        for byte in buffer.iter_mut() {
            *byte = self.read_byte();
        }
    }

    /// Wait for TC: the last byte has left the shift register.
    pub fn flush(&mut self) {
        self.wait_for(Sr::TC);
    }

    /// A frame is still being shifted out.
    pub fn is_busy(&self) -> bool {
        !self.status().contains(Sr::TC)
    }
}

// ============================================================================
// HAL Implementation
// ============================================================================

impl<R: RegisterIo> SerialPort for Usart<R> {
    type Error = SerialError;

    /// Checked counterpart of [`Usart::configure`]: only 8N1 is supported
    /// and the divisor must fit the baud generator. Programs the 8N1 frame
    /// format, then enables both directions.
    fn configure(&mut self, config: SerialConfig) -> Result<(), SerialError> {
        if !matches!(config.data_bits, DataBits::Eight) {
            return Err(SerialError::InvalidConfig);
        }

        if !matches!(config.parity, Parity::None) {
            return Err(SerialError::InvalidConfig);
        }

        if !matches!(config.stop_bits, StopBits::One) {
            return Err(SerialError::InvalidConfig);
        }

        let divisor = BaudConfig::new(config.clock_hz, config.baud_rate).checked_divisor()?;
        self.regs.write(USART_BRR_OFFSET, u32::from(divisor));
        // frame bits only take effect while UE is clear
        self.disable();
        self.regs
            .clear_bits(USART_CR1_OFFSET, (Cr1::M | Cr1::PCE | Cr1::PS).bits());
        self.regs.clear_bits(USART_CR2_OFFSET, CR2_STOP_MASK);
        self.enable(Directions::all());

        Ok(())
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), SerialError> {
        Usart::write_byte(self, byte);
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8, SerialError> {
        Ok(Usart::read_byte(self))
    }

    fn flush(&mut self) -> Result<(), SerialError> {
        Usart::flush(self);
        Ok(())
    }

    fn is_busy(&self) -> bool {
        Usart::is_busy(self)
    }

    fn as_nonblocking(&mut self) -> Option<&mut dyn NonBlockingSerial<Error = SerialError>> {
        Some(self)
    }
}

impl<R: RegisterIo> NonBlockingSerial for Usart<R> {
    fn try_write_byte(&mut self, byte: u8) -> Result<(), SerialError> {
        Usart::try_write_byte(self, byte)
    }

    fn try_read_byte(&mut self) -> Result<u8, SerialError> {
        Usart::try_read_byte(self)
    }
}

#[cfg(test)]
mod tests {
    use super::sim::UsartModel;
    use super::*;
    use crate::hw::stm32f446::USART_SR_RESET;

    fn usart(model: &mut UsartModel) -> Usart<&mut UsartModel> {
        Usart::from_registers(model)
    }

    #[test]
    fn flag_bits_match_reference_manual() {
        assert_eq!(Cr1::RE.bits(), 0x0004);
        assert_eq!(Cr1::TE.bits(), 0x0008);
        assert_eq!(Cr1::UE.bits(), 0x2000);
        assert_eq!((Cr1::M | Cr1::PCE | Cr1::PS).bits(), 0x1600);
        assert_eq!(Sr::RXNE.bits(), 0x20);
        assert_eq!((Sr::TXE | Sr::TC).bits(), USART_SR_RESET);
    }

    #[test]
    fn configure_programs_rounded_divisor() {
        let mut model = UsartModel::new();
        let mut uart = usart(&mut model);
        uart.configure(16_000_000, 115_200);
        assert_eq!(uart.divisor(), 139);
        drop(uart);
        assert_eq!(model.registers().writes_to(USART_BRR_OFFSET), vec![139]);
    }

    #[test]
    fn configure_writes_degenerate_divisor_unchecked() {
        let mut model = UsartModel::new();
        let mut uart = usart(&mut model);
        uart.configure(1_000, 3_000);
        assert_eq!(uart.divisor(), 0);
        uart.configure(16_000_000, 0);
        assert_eq!(uart.divisor(), 0);
    }

    #[test]
    fn enable_sets_directions_and_ue() {
        let mut model = UsartModel::new();
        let mut uart = usart(&mut model);
        uart.enable(Directions::TX);
        assert_eq!(uart.directions(), Directions::TX);
        assert!(uart.is_enabled());

        uart.enable(Directions::RX);
        assert_eq!(uart.directions(), Directions::all());
        drop(uart);
        assert_eq!(
            model.registers().peek(USART_CR1_OFFSET),
            (Cr1::TE | Cr1::RE | Cr1::UE).bits()
        );
    }

    #[test]
    fn enable_is_idempotent() {
        let mut once = UsartModel::new();
        usart(&mut once).enable(Directions::all());

        let mut twice = UsartModel::new();
        let mut uart = usart(&mut twice);
        uart.enable(Directions::all());
        uart.enable(Directions::all());
        drop(uart);

        assert_eq!(
            once.registers().peek(USART_CR1_OFFSET),
            twice.registers().peek(USART_CR1_OFFSET)
        );
    }

    #[test]
    fn enable_preserves_unrelated_cr1_bits() {
        // PCE (parity control) set by someone else
        let mut model = UsartModel::new();
        model.registers_mut().poke(USART_CR1_OFFSET, 1 << 10);
        usart(&mut model).enable(Directions::TX);
        assert_eq!(
            model.registers().peek(USART_CR1_OFFSET),
            (1 << 10) | (Cr1::TE | Cr1::UE).bits()
        );
    }

    #[test]
    fn disable_clears_only_ue() {
        let mut model = UsartModel::new();
        let mut uart = usart(&mut model);
        uart.enable(Directions::all());
        uart.disable();
        assert!(!uart.is_enabled());
        assert_eq!(uart.directions(), Directions::all());
    }

    #[test]
    fn write_byte_waits_for_txe_then_latches_value() {
        let mut model = UsartModel::new();
        model.busy_for(3);
        let mut uart = usart(&mut model);
        uart.write_byte(0x41);
        drop(uart);

        assert_eq!(model.wire(), &[0x41]);
        assert_eq!(model.tx_waits(), &[3]);
        assert_eq!(model.overruns(), 0);
        assert_eq!(model.registers().writes_to(USART_DR_OFFSET), vec![0x41]);
    }

    #[test]
    fn one_data_write_per_ready_signal() {
        let mut model = UsartModel::new().with_tx_latency(2);
        let mut uart = usart(&mut model);
        uart.write(b"abc");
        drop(uart);

        assert_eq!(model.wire(), b"abc");
        assert_eq!(model.overruns(), 0);
        // First byte finds TXE set from reset; the rest wait out the latency.
        assert_eq!(model.tx_waits(), &[1, 2, 2]);
    }

    #[test]
    fn read_byte_blocks_until_rxne() {
        let mut model = UsartModel::new();
        model.receive_after(b'1', 5);
        let mut uart = usart(&mut model);
        assert_eq!(uart.read_byte(), b'1');
        drop(uart);
        assert_eq!(model.registers().reads(USART_SR_OFFSET), 5);
    }

    #[test]
    fn read_returns_data_register_at_rxne() {
        let mut model = UsartModel::new();
        model.receive_after(b'x', 1);
        model.receive_after(b'y', 2);
        let mut uart = usart(&mut model);
        let mut buffer = [0u8; 2];
        uart.read(&mut buffer);
        assert_eq!(&buffer, b"xy");
    }

    #[test]
    fn try_variants_report_would_block() {
        let mut model = UsartModel::new();
        model.hold_tx();
        let mut uart = usart(&mut model);
        assert_eq!(uart.try_write_byte(b'a'), Err(SerialError::WouldBlock));
        assert_eq!(uart.try_read_byte(), Err(SerialError::WouldBlock));
        drop(uart);
        assert!(model.wire().is_empty());

        model.release_tx();
        model.receive_after(b'z', 1);
        let mut uart = usart(&mut model);
        assert_eq!(uart.try_write_byte(b'a'), Ok(()));
        assert_eq!(uart.try_read_byte(), Ok(b'z'));
    }

    #[test]
    fn bounded_variants_time_out() {
        let mut model = UsartModel::new();
        model.hold_tx();
        model.receive_after(b'q', 10);
        let mut uart = usart(&mut model);
        assert_eq!(uart.write_byte_timeout(b'a', 4), Err(SerialError::Timeout));
        assert_eq!(uart.read_byte_timeout(4), Err(SerialError::Timeout));
        assert_eq!(uart.read_byte_timeout(0), Err(SerialError::Timeout));
        // The remaining polls are enough.
        assert_eq!(uart.read_byte_timeout(10), Ok(b'q'));
        drop(uart);
        assert!(model.wire().is_empty());
    }

    #[test]
    fn flush_waits_for_transmission_complete() {
        let mut model = UsartModel::new().with_tx_latency(4);
        let mut uart = usart(&mut model);
        uart.write_byte(b'!');
        assert!(uart.is_busy());
        uart.flush();
        assert!(!uart.is_busy());
    }

    #[test]
    fn hal_configure_is_checked() {
        let mut model = UsartModel::new();
        let mut uart = usart(&mut model);

        let too_fast = SerialConfig::new_8n1(1_000, 3_000);
        assert_eq!(
            SerialPort::configure(&mut uart, too_fast),
            Err(SerialError::InvalidConfig)
        );
        let even_parity = SerialConfig {
            parity: Parity::Even,
            ..SerialConfig::default()
        };
        assert_eq!(
            SerialPort::configure(&mut uart, even_parity),
            Err(SerialError::InvalidConfig)
        );
        let nine_bits = SerialConfig {
            data_bits: DataBits::Nine,
            ..SerialConfig::default()
        };
        assert_eq!(
            SerialPort::configure(&mut uart, nine_bits),
            Err(SerialError::InvalidConfig)
        );
        let two_stop_bits = SerialConfig {
            stop_bits: StopBits::Two,
            ..SerialConfig::default()
        };
        assert_eq!(
            SerialPort::configure(&mut uart, two_stop_bits),
            Err(SerialError::InvalidConfig)
        );
        assert!(!uart.is_enabled());

        assert_eq!(SerialPort::configure(&mut uart, SerialConfig::default()), Ok(()));
        assert_eq!(uart.divisor(), 139);
        assert_eq!(uart.directions(), Directions::all());
        assert!(uart.is_enabled());
    }

    #[test]
    fn hal_configure_resets_a_stale_frame_format() {
        let mut model = UsartModel::new();
        model
            .registers_mut()
            .poke(USART_CR1_OFFSET, (Cr1::M | Cr1::PCE | Cr1::PS | Cr1::UE).bits());
        model.registers_mut().poke(USART_CR2_OFFSET, 0b10 << 12);
        let mut uart = usart(&mut model);

        assert_eq!(SerialPort::configure(&mut uart, SerialConfig::default()), Ok(()));
        drop(uart);

        let regs = model.registers();
        assert_eq!(
            regs.peek(USART_CR1_OFFSET),
            (Cr1::UE | Cr1::TE | Cr1::RE).bits()
        );
        assert_eq!(regs.peek(USART_CR2_OFFSET) & CR2_STOP_MASK, 0);
    }

    #[test]
    fn hal_interface_reaches_the_hardware() {
        let mut model = UsartModel::new();
        model.receive_after(b'k', 1);
        let mut uart = usart(&mut model);
        let port: &mut dyn SerialPort<Error = SerialError> = &mut uart;
        assert_eq!(port.write(b"ok"), Ok(2));
        assert_eq!(port.read_byte(), Ok(b'k'));
        let nonblocking = port.as_nonblocking().expect("usart is non-blocking capable");
        assert_eq!(nonblocking.try_read_byte(), Err(SerialError::WouldBlock));
        drop(uart);
        assert_eq!(model.wire(), b"ok");
    }

    #[test]
    fn hi_crlf_end_to_end() {
        let mut model = UsartModel::new().with_tx_latency(1);
        let mut uart = usart(&mut model);
        uart.configure(16_000_000, 115_200);
        uart.enable(Directions::TX);
        for &byte in b"HI\r\n" {
            uart.write_byte(byte);
        }
        drop(uart);

        assert_eq!(model.wire(), b"HI\r\n");
        assert_eq!(model.tx_waits().len(), 4);
        assert!(model.tx_waits().iter().all(|&polls| polls == 1));
        assert_eq!(model.overruns(), 0);
        assert_eq!(model.registers().peek(USART_BRR_OFFSET), 139);
    }

    #[test]
    fn instance_addresses() {
        assert_eq!(Instance::Usart2.base(), 0x4000_4400);
        assert_eq!(Instance::Usart1.base(), 0x4001_1000);
        assert_eq!(Instance::Usart6.base(), 0x4001_1400);
    }
}
