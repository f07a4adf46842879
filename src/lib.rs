#![no_std]

pub mod platform;
