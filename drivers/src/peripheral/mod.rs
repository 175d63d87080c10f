//! Peripheral Drivers
//!
//! This module contains drivers for peripherals shared across the STM32F4
//! family.
//!
//! # Available Peripherals
//!
//! - [`usart`]: STM32F4 USART (SR/DR/BRR/CR1 register layout)

pub mod usart;
