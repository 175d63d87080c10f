//! Toggle LD2 (PA5) forever.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use drivers::StatefulOutputPin;
use drivers::platform::stm32f446::{board, Board};
use panic_halt as _;

/// Busy-wait between toggles, in core cycles.
const DELAY_CYCLES: u32 = 100_000;

#[entry]
fn main() -> ! {
    let Some(Board { mut rcc, mut gpioa, .. }) = Board::take() else {
        panic!("board already taken");
    };

    if board::init_led(&mut rcc, &mut gpioa).is_err() {
        panic!("led init");
    }
    let Ok(mut led) = gpioa.into_pin(board::LED_PIN) else {
        panic!("led pin");
    };

    loop {
        // the pin number was checked by `into_pin`; toggle cannot fail
        led.toggle().ok();
        cortex_m::asm::delay(DELAY_CYCLES);
    }
}
