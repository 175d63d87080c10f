//! Raw register layouts and addresses.
//!
//! Nothing in here touches hardware; the drivers in [`crate::peripheral`]
//! and [`crate::platform`] use these constants through
//! [`common::RegisterIo`].

pub mod stm32f446;
