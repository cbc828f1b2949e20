//! Input decoding, hardware initialisation, and peripheral helpers.

pub mod button;
pub mod hw_init;
