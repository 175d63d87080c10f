//! STM32F446 GPIO Port Driver
//!
//! One [`Gpio`] owns one port (GPIOA, GPIOB, ...). Pins are addressed by
//! number (0-15). [`Pin`] binds a port to a single pin and implements the
//! HAL pin traits.
//!
//! Output changes go through BSRR (bit n sets pin n, bit n+16 resets it),
//! so they do not disturb the other pins of the port. [`Gpio::toggle`] is
//! the exception: it XORs ODR.

use crate::hal::gpio::{InputPin, OutputPin, PinLevel, PullMode, StatefulOutputPin};
use crate::hw::stm32f446::{
    GPIO_AFRH_OFFSET, GPIO_AFRL_OFFSET, GPIO_BSRR_OFFSET, GPIO_IDR_OFFSET, GPIO_MODER_OFFSET,
    GPIO_ODR_OFFSET, GPIO_OTYPER_OFFSET, GPIO_PORT_STRIDE, GPIO_PUPDR_OFFSET, GPIOA_BASE,
};
use common::bits::{field, replace_field};
use common::{Mmio, RegisterIo};
use core::fmt;

/// Pins per port.
pub const PINS_PER_PORT: u8 = 16;

/// Highest alternate function number (AF15).
pub const MAX_ALTERNATE_FUNCTION: u8 = 15;

/// GPIO ports of the STM32F446.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Port {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
}

impl Port {
    /// Port number; also the port's clock-enable bit in RCC_AHB1ENR.
    pub const fn index(self) -> u32 {
        self as u32
    }

    /// Base address of the port's register block.
    pub const fn base(self) -> usize {
        GPIOA_BASE + self as usize * GPIO_PORT_STRIDE
    }
}

/// Pin mode (MODER, 2 bits per pin).
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    Input = 0b00,
    Output = 0b01,
    Alternate = 0b10,
    Analog = 0b11,
}

impl Mode {
    const fn from_bits(bits: u32) -> Self {
        match bits & 0b11 {
            0b00 => Mode::Input,
            0b01 => Mode::Output,
            0b10 => Mode::Alternate,
            _ => Mode::Analog,
        }
    }
}

/// Output driver type (OTYPER, 1 bit per pin).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OutputType {
    PushPull,
    OpenDrain,
}

/// Pull resistor configuration (PUPDR, 2 bits per pin).
#[repr(u32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Pull {
    Off = 0b00,
    Up = 0b01,
    Down = 0b10,
}

impl From<PullMode> for Pull {
    fn from(mode: PullMode) -> Self {
        match mode {
            PullMode::None => Pull::Off,
            PullMode::Up => Pull::Up,
            PullMode::Down => Pull::Down,
        }
    }
}

/// Errors that can occur when operating on GPIO pins.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GpioError {
    /// The requested pin number is outside 0-15.
    InvalidPin,
    /// The requested alternate function is outside AF0-AF15.
    InvalidAlternateFunction,
}

impl fmt::Display for GpioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpioError::InvalidPin => f.write_str("pin number out of range"),
            GpioError::InvalidAlternateFunction => {
                f.write_str("alternate function out of range")
            }
        }
    }
}

fn check_pin(pin: u8) -> Result<(), GpioError> {
    if pin < PINS_PER_PORT {
        Ok(())
    } else {
        Err(GpioError::InvalidPin)
    }
}

/// Register and bit shift holding the alternate function of `pin`.
fn afr_location(pin: u8) -> (usize, u32) {
    if pin < 8 {
        (GPIO_AFRL_OFFSET, u32::from(pin) * 4)
    } else {
        (GPIO_AFRH_OFFSET, u32::from(pin - 8) * 4)
    }
}

/// GPIO port driver.
pub struct Gpio<R: RegisterIo = Mmio> {
    regs: R,
}

impl Gpio<Mmio> {
    /// Create a driver for `port`.
    ///
    /// # Safety
    ///
    /// Only one instance should exist per port, and the port clock must be
    /// enabled before the driver is used.
    pub const unsafe fn new(port: Port) -> Self {
        Self {
            regs: unsafe { Mmio::new(port.base()) },
        }
    }
}

impl<R: RegisterIo> Gpio<R> {
    /// Wrap an arbitrary register block.
    pub const fn from_registers(regs: R) -> Self {
        Self { regs }
    }

    /// Release the register block.
    pub fn free(self) -> R {
        self.regs
    }

    /// Configure the mode of `pin`.
    pub fn set_mode(&mut self, pin: u8, mode: Mode) -> Result<(), GpioError> {
        check_pin(pin)?;
        let shift = u32::from(pin) * 2;
        self.regs
            .modify(GPIO_MODER_OFFSET, |v| replace_field(v, 2, shift, mode as u32));
        Ok(())
    }

    /// Current mode of `pin`.
    pub fn mode(&self, pin: u8) -> Result<Mode, GpioError> {
        check_pin(pin)?;
        let moder = self.regs.read(GPIO_MODER_OFFSET);
        Ok(Mode::from_bits(field(moder, 2, u32::from(pin) * 2)))
    }

    /// Select push-pull or open-drain output for `pin`.
    pub fn set_output_type(&mut self, pin: u8, output: OutputType) -> Result<(), GpioError> {
        check_pin(pin)?;
        let bit = 1u32 << pin;
        match output {
            OutputType::PushPull => self.regs.clear_bits(GPIO_OTYPER_OFFSET, bit),
            OutputType::OpenDrain => self.regs.set_bits(GPIO_OTYPER_OFFSET, bit),
        }
        Ok(())
    }

    /// Route `pin` to alternate function `af` (AF0-AF15).
    ///
    /// Only takes effect once the pin is in [`Mode::Alternate`].
    pub fn set_alternate_function(&mut self, pin: u8, af: u8) -> Result<(), GpioError> {
        check_pin(pin)?;
        if af > MAX_ALTERNATE_FUNCTION {
            return Err(GpioError::InvalidAlternateFunction);
        }
        let (offset, shift) = afr_location(pin);
        self.regs
            .modify(offset, |v| replace_field(v, 4, shift, u32::from(af)));
        Ok(())
    }

    /// Alternate function currently selected for `pin`.
    pub fn alternate_function(&self, pin: u8) -> Result<u8, GpioError> {
        check_pin(pin)?;
        let (offset, shift) = afr_location(pin);
        Ok(field(self.regs.read(offset), 4, shift) as u8)
    }

    /// Configure the internal pull resistor for `pin`.
    pub fn set_pull(&mut self, pin: u8, pull: Pull) -> Result<(), GpioError> {
        check_pin(pin)?;
        let shift = u32::from(pin) * 2;
        self.regs
            .modify(GPIO_PUPDR_OFFSET, |v| replace_field(v, 2, shift, pull as u32));
        Ok(())
    }

    /// Drive `pin` high.
    pub fn set_high(&mut self, pin: u8) -> Result<(), GpioError> {
        check_pin(pin)?;
        self.regs.write(GPIO_BSRR_OFFSET, 1 << pin);
        Ok(())
    }

    /// Drive `pin` low.
    pub fn set_low(&mut self, pin: u8) -> Result<(), GpioError> {
        check_pin(pin)?;
        self.regs.write(GPIO_BSRR_OFFSET, 1 << (u32::from(pin) + 16));
        Ok(())
    }

    /// Invert the output latch of `pin`.
    pub fn toggle(&mut self, pin: u8) -> Result<(), GpioError> {
        check_pin(pin)?;
        self.regs.modify(GPIO_ODR_OFFSET, |v| v ^ (1 << pin));
        Ok(())
    }

    /// Input level of `pin`.
    pub fn read(&self, pin: u8) -> Result<PinLevel, GpioError> {
        check_pin(pin)?;
        Ok(PinLevel::from(self.regs.read(GPIO_IDR_OFFSET) & (1 << pin) != 0))
    }

    /// Output latch level of `pin`.
    pub fn output_level(&self, pin: u8) -> Result<PinLevel, GpioError> {
        check_pin(pin)?;
        Ok(PinLevel::from(self.regs.read(GPIO_ODR_OFFSET) & (1 << pin) != 0))
    }

    /// Bind the port to a single pin, consuming it.
    pub fn into_pin(self, pin: u8) -> Result<Pin<R>, GpioError> {
        check_pin(pin)?;
        Ok(Pin { port: self, pin })
    }

    /// Borrow a single pin of the port.
    pub fn pin(&mut self, pin: u8) -> Result<Pin<&mut R>, GpioError> {
        Gpio::from_registers(&mut self.regs).into_pin(pin)
    }
}

/// A single GPIO pin.
pub struct Pin<R: RegisterIo = Mmio> {
    port: Gpio<R>,
    pin: u8,
}

impl<R: RegisterIo> Pin<R> {
    /// Pin number within the port.
    pub fn number(&self) -> u8 {
        self.pin
    }

    /// Give the port back.
    pub fn release(self) -> Gpio<R> {
        self.port
    }
}

impl<R: RegisterIo> InputPin for Pin<R> {
    type Error = GpioError;

    fn read(&self) -> Result<PinLevel, GpioError> {
        self.port.read(self.pin)
    }
}

impl<R: RegisterIo> OutputPin for Pin<R> {
    type Error = GpioError;

    fn set_high(&mut self) -> Result<(), GpioError> {
        self.port.set_high(self.pin)
    }

    fn set_low(&mut self) -> Result<(), GpioError> {
        self.port.set_low(self.pin)
    }
}

impl<R: RegisterIo> StatefulOutputPin for Pin<R> {
    fn output_level(&self) -> Result<PinLevel, GpioError> {
        self.port.output_level(self.pin)
    }

    fn toggle(&mut self) -> Result<(), GpioError> {
        self.port.toggle(self.pin)
    }
}
