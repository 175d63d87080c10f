//! Nucleo-F446RE bring-up.
//!
//! The board runs from the 16 MHz HSI after reset with no prescalers, so
//! SYSCLK and the APB1 clock feeding USART2 are both 16 MHz. USART2 is wired
//! to the ST-LINK virtual COM port on PA2 (TX) and PA3 (RX), AF7.

use super::gpio::{Gpio, GpioError, Mode, Port};
use super::rcc::Rcc;
use crate::hw::stm32f446::HSI_HZ;
use crate::peripheral::usart::{Directions, Instance, Usart};
use common::RegisterIo;
use log::debug;

pub const SYS_FREQ_HZ: u32 = HSI_HZ;
pub const APB1_CLK_HZ: u32 = SYS_FREQ_HZ;
pub const UART_BAUDRATE: u32 = 115_200;

/// User LED LD2.
pub const LED_PORT: Port = Port::A;
pub const LED_PIN: u8 = 5;

/// User button B1.
pub const BUTTON_PORT: Port = Port::C;
pub const BUTTON_PIN: u8 = 13;

pub const USART2_PORT: Port = Port::A;
pub const USART2_TX_PIN: u8 = 2;
pub const USART2_RX_PIN: u8 = 3;
pub const USART2_AF: u8 = 7;

/// Make LD2 (PA5) a push-pull output.
pub fn init_led<RR, GR>(rcc: &mut Rcc<RR>, gpioa: &mut Gpio<GR>) -> Result<(), GpioError>
where
    RR: RegisterIo,
    GR: RegisterIo,
{
    rcc.enable_gpio(LED_PORT);
    gpioa.set_mode(LED_PIN, Mode::Output)
}

/// Make B1 (PC13) an input.
pub fn init_button<RR, GR>(rcc: &mut Rcc<RR>, gpioc: &mut Gpio<GR>) -> Result<(), GpioError>
where
    RR: RegisterIo,
    GR: RegisterIo,
{
    rcc.enable_gpio(BUTTON_PORT);
    gpioc.set_mode(BUTTON_PIN, Mode::Input)
}

/// Route the USART2 pins needed for `directions` to AF7.
pub fn init_usart2_pins<RR, GR>(
    rcc: &mut Rcc<RR>,
    gpioa: &mut Gpio<GR>,
    directions: Directions,
) -> Result<(), GpioError>
where
    RR: RegisterIo,
    GR: RegisterIo,
{
    rcc.enable_gpio(USART2_PORT);

    if directions.contains(Directions::TX) {
        gpioa.set_mode(USART2_TX_PIN, Mode::Alternate)?;
        gpioa.set_alternate_function(USART2_TX_PIN, USART2_AF)?;
    }

    if directions.contains(Directions::RX) {
        gpioa.set_mode(USART2_RX_PIN, Mode::Alternate)?;
        gpioa.set_alternate_function(USART2_RX_PIN, USART2_AF)?;
    }

    Ok(())
}

/// Full USART2 bring-up: pins, clock, 115200 baud, enable `directions`.
pub fn init_usart2<RR, GR, UR>(
    rcc: &mut Rcc<RR>,
    gpioa: &mut Gpio<GR>,
    usart: &mut Usart<UR>,
    directions: Directions,
) -> Result<(), GpioError>
where
    RR: RegisterIo,
    GR: RegisterIo,
    UR: RegisterIo,
{
    init_usart2_pins(rcc, gpioa, directions)?;
    rcc.enable_usart(Instance::Usart2);
    usart.configure(APB1_CLK_HZ, UART_BAUDRATE);
    usart.enable(directions);

    debug!(
        "usart2: {} baud, brr={}, {:?}",
        UART_BAUDRATE,
        usart.divisor(),
        directions
    );
    Ok(())
}
