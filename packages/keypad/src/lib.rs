#![no_std]

pub mod decoder;
pub mod edge;
pub mod indicator;
pub mod layout;
pub mod mpr121;
pub mod platform;
pub mod queue;

/// Period of one decoder tick/indicator step, in milliseconds.
pub const TICK_PERIOD_MS: u64 = 100;
