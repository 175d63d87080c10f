//! Platform Layer
//!
//! Chip-specific clock gating, pin multiplexing and board bring-up. The
//! chip is chosen at build time through Cargo features and re-exported as
//! [`current`].
//!
//! # Usage
//!
//! ```no_run
//! use drivers::platform::current::{Board, board};
//!
//! let Board { mut rcc, mut gpioa, .. } = Board::take().unwrap();
//! board::init_led(&mut rcc, &mut gpioa).unwrap();
//! ```

// Platform selection based on Cargo features
cfg_if::cfg_if! {
    if #[cfg(feature = "stm32f446")] {
        pub mod stm32f446;
        pub use stm32f446 as current;
    } else {
        compile_error!(
            "No platform selected!\n\
            Use: cargo build --features stm32f446"
        );
    }
}
