//! Print a greeting over USART2 (TX only) forever.

#![no_std]
#![no_main]

use cortex_m_rt::entry;
use drivers::platform::stm32f446::{board, Board};
use drivers::{console, uprint, Directions};
use panic_halt as _;

#[entry]
fn main() -> ! {
    let Some(Board { mut rcc, mut gpioa, mut usart2, .. }) = Board::take() else {
        panic!("board already taken");
    };

    if board::init_usart2(&mut rcc, &mut gpioa, &mut usart2, Directions::TX).is_err() {
        panic!("usart2 init");
    }
    console::install(usart2);

    loop {
        uprint!("Hello from the Nucleo-F446RE\n\r");
    }
}
