//! Drive LD2 from the virtual COM port: `1` turns it on, any other byte
//! turns it off.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use drivers::console;
use drivers::platform::stm32f446::{board, Board};
use drivers::{Directions, OutputPin, PinLevel};
use log::{info, LevelFilter};
use panic_halt as _;

#[entry]
fn main() -> ! {
    let Some(Board { mut rcc, mut gpioa, mut usart2, .. }) = Board::take() else {
        panic!("board already taken");
    };

    if board::init_usart2(&mut rcc, &mut gpioa, &mut usart2, Directions::all()).is_err()
        || board::init_led(&mut rcc, &mut gpioa).is_err()
    {
        panic!("board init");
    }
    let Ok(mut led) = gpioa.into_pin(board::LED_PIN) else {
        panic!("led pin");
    };

    console::install(usart2);
    let _ = console::init_logger(LevelFilter::Info);
    info!("send 1 to light LD2");

    loop {
        let Some(key) = console::read_byte() else {
            continue;
        };
        led.set_level(PinLevel::from(key == b'1')).ok();
    }
}
