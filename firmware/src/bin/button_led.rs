//! LD2 follows the B1 input level.
//!
//! B1 pulls PC13 low while pressed, so the LED is lit while the button is
//! released.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use drivers::platform::stm32f446::{board, Board};
use drivers::{InputPin, OutputPin};
use panic_halt as _;

#[entry]
fn main() -> ! {
    let Some(Board { mut rcc, mut gpioa, mut gpioc, .. }) = Board::take() else {
        panic!("board already taken");
    };

    if board::init_led(&mut rcc, &mut gpioa).is_err()
        || board::init_button(&mut rcc, &mut gpioc).is_err()
    {
        panic!("gpio init");
    }

    let (Ok(mut led), Ok(button)) = (
        gpioa.into_pin(board::LED_PIN),
        gpioc.into_pin(board::BUTTON_PIN),
    ) else {
        panic!("gpio pins");
    };

    loop {
        if let Ok(level) = button.read() {
            led.set_level(level).ok();
        }
    }
}
