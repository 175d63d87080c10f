//! Bit-field helpers for registers that pack several pins per word.
//!
//! GPIO registers on the STM32 family use fixed-width fields per pin:
//! 2 bits in `MODER`/`PUPDR`, 4 bits in `AFRL`/`AFRH`.

/// Mask of `width` bits starting at `shift`.
#[inline]
pub const fn field_mask(width: u32, shift: u32) -> u32 {
    let ones = if width >= 32 { u32::MAX } else { (1 << width) - 1 };
    ones << shift
}

/// Extract the field of `width` bits at `shift` from `reg`.
#[inline]
pub const fn field(reg: u32, width: u32, shift: u32) -> u32 {
    (reg & field_mask(width, shift)) >> shift
}

/// Return `reg` with the field at `shift` replaced by `value`.
///
/// Bits of `value` beyond `width` are discarded.
#[inline]
pub const fn replace_field(reg: u32, width: u32, shift: u32, value: u32) -> u32 {
    let mask = field_mask(width, shift);
    (reg & !mask) | ((value << shift) & mask)
}
