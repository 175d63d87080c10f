//! STM32F446 memory map and register offsets (RM0390).

use core::mem::offset_of;

// ============================================================================
// Bus and peripheral base addresses
// ============================================================================

pub const PERIPH_BASE: usize = 0x4000_0000;
pub const APB1PERIPH_BASE: usize = PERIPH_BASE;
pub const APB2PERIPH_BASE: usize = PERIPH_BASE + 0x0001_0000;
pub const AHB1PERIPH_BASE: usize = PERIPH_BASE + 0x0002_0000;

pub const GPIOA_BASE: usize = AHB1PERIPH_BASE;
/// Distance between consecutive GPIO ports (GPIOA, GPIOB, ...).
pub const GPIO_PORT_STRIDE: usize = 0x400;
pub const RCC_BASE: usize = AHB1PERIPH_BASE + 0x3800;

pub const USART2_BASE: usize = APB1PERIPH_BASE + 0x4400;
pub const USART3_BASE: usize = APB1PERIPH_BASE + 0x4800;
pub const UART4_BASE: usize = APB1PERIPH_BASE + 0x4C00;
pub const UART5_BASE: usize = APB1PERIPH_BASE + 0x5000;
pub const USART1_BASE: usize = APB2PERIPH_BASE + 0x1000;
pub const USART6_BASE: usize = APB2PERIPH_BASE + 0x1400;

/// Internal RC oscillator; SYSCLK and both APB clocks after reset.
pub const HSI_HZ: u32 = 16_000_000;

// ============================================================================
// RCC
// ============================================================================

pub const RCC_AHB1ENR_OFFSET: usize = 0x30;
pub const RCC_APB1ENR_OFFSET: usize = 0x40;
pub const RCC_APB2ENR_OFFSET: usize = 0x44;
/// Address window reserved for the RCC.
pub const RCC_BLOCK_SIZE: usize = 0x400;

// ============================================================================
// GPIO
// ============================================================================

/// Memory-mapped GPIO port registers.
#[repr(C)]
pub struct GpioRegisters {
    pub moder: u32,
    pub otyper: u32,
    pub ospeedr: u32,
    pub pupdr: u32,
    pub idr: u32,
    pub odr: u32,
    pub bsrr: u32,
    pub lckr: u32,
    pub afrl: u32,
    pub afrh: u32,
}

pub const GPIO_MODER_OFFSET: usize = offset_of!(GpioRegisters, moder);
pub const GPIO_OTYPER_OFFSET: usize = offset_of!(GpioRegisters, otyper);
pub const GPIO_PUPDR_OFFSET: usize = offset_of!(GpioRegisters, pupdr);
pub const GPIO_IDR_OFFSET: usize = offset_of!(GpioRegisters, idr);
pub const GPIO_ODR_OFFSET: usize = offset_of!(GpioRegisters, odr);
pub const GPIO_BSRR_OFFSET: usize = offset_of!(GpioRegisters, bsrr);
pub const GPIO_AFRL_OFFSET: usize = offset_of!(GpioRegisters, afrl);
pub const GPIO_AFRH_OFFSET: usize = offset_of!(GpioRegisters, afrh);
pub const GPIO_BLOCK_SIZE: usize = core::mem::size_of::<GpioRegisters>();

const _: () = assert!(GPIO_ODR_OFFSET == 0x14);
const _: () = assert!(GPIO_BSRR_OFFSET == 0x18);
const _: () = assert!(GPIO_AFRH_OFFSET == 0x24);

// ============================================================================
// USART
// ============================================================================

/// Memory-mapped USART registers.
#[repr(C)]
pub struct UsartRegisters {
    pub sr: u32,
    pub dr: u32,
    pub brr: u32,
    pub cr1: u32,
    pub cr2: u32,
    pub cr3: u32,
    pub gtpr: u32,
}

pub const USART_SR_OFFSET: usize = offset_of!(UsartRegisters, sr);
pub const USART_DR_OFFSET: usize = offset_of!(UsartRegisters, dr);
pub const USART_BRR_OFFSET: usize = offset_of!(UsartRegisters, brr);
pub const USART_CR1_OFFSET: usize = offset_of!(UsartRegisters, cr1);
pub const USART_CR2_OFFSET: usize = offset_of!(UsartRegisters, cr2);
pub const USART_BLOCK_SIZE: usize = core::mem::size_of::<UsartRegisters>();

const _: () = assert!(USART_BRR_OFFSET == 0x08);
const _: () = assert!(USART_CR1_OFFSET == 0x0C);
const _: () = assert!(USART_CR2_OFFSET == 0x10);

/// Status register value after reset: TXE and TC set.
pub const USART_SR_RESET: u32 = 0x0000_00C0;
