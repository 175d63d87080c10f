//! STM32F446 (Nucleo-F446RE) platform.
//!
//! [`Board::take`] hands out the peripheral handles the firmware needs,
//! once. Bring-up sequences live in [`board`].

pub mod board;
pub mod gpio;
pub mod rcc;

use crate::peripheral::usart::{Instance, Usart};
use core::sync::atomic::{AtomicBool, Ordering};
use gpio::{Gpio, Port};
use rcc::Rcc;

pub const NAME: &str = "STM32F446RE (Nucleo-F446RE)";

static TAKEN: AtomicBool = AtomicBool::new(false);

/// Owned handles to the peripherals used by the board.
pub struct Board {
    pub rcc: Rcc,
    pub gpioa: Gpio,
    pub gpioc: Gpio,
    pub usart2: Usart,
}

impl Board {
    /// Take the board peripherals. Returns `None` on every call after the
    /// first.
    pub fn take() -> Option<Self> {
        if TAKEN.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(unsafe { Self::steal() })
        }
    }

    /// Create the handles unconditionally.
    ///
    /// # Safety
    ///
    /// Aliases any handles already handed out by [`Board::take`].
    pub unsafe fn steal() -> Self {
        unsafe {
            Self {
                rcc: Rcc::new(),
                gpioa: Gpio::new(Port::A),
                gpioc: Gpio::new(Port::C),
                usart2: Usart::instance(Instance::Usart2),
            }
        }
    }
}
