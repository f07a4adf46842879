use core::cell::RefCell;

use embassy_sync::{
    blocking_mutex::{raw::CriticalSectionRawMutex, Mutex},
    channel::Channel,
};
use keypad::queue::OutputQueue;

use super::types::ScanEvent;

pub(crate) const UART_BAUD: u32 = 115_200;
pub(crate) const I2C_TIMEOUT_MS: u64 = 40;

/// How often the broker drains the output queue.
pub(crate) const BROKER_POLL_MS: u64 = 50;
/// Broker iterations between telemetry log lines (one per minute).
pub(crate) const STATS_LOG_TICKS: u32 = (60_000 / BROKER_POLL_MS) as u32;

/// Per-poll scan trace; noisy, so compiled out by default.
pub(crate) const SCAN_TRACE_ENABLED: bool = false;

pub(crate) const OUTPUT_QUEUE_LEN: usize = 32;

pub(crate) static SCAN_EVENTS: Channel<CriticalSectionRawMutex, ScanEvent, 4> = Channel::new();
pub(crate) static KEY_EVENTS: Channel<CriticalSectionRawMutex, u8, 8> = Channel::new();

pub(crate) static OUTPUT_QUEUE: Mutex<
    CriticalSectionRawMutex,
    RefCell<OutputQueue<OUTPUT_QUEUE_LEN>>,
> = Mutex::new(RefCell::new(OutputQueue::new()));
