//! Pull-style consumer interface over the shared output queue. The decoder
//! task is the only producer, the broker the only consumer; the critical
//! section makes the pair safe from their two invocation contexts.

use super::config::OUTPUT_QUEUE;

pub(crate) fn push(byte: u8) -> bool {
    OUTPUT_QUEUE.lock(|queue| queue.borrow_mut().push(byte))
}

pub(crate) fn pop() -> Option<u8> {
    OUTPUT_QUEUE.lock(|queue| queue.borrow_mut().pop())
}

pub(crate) fn is_empty() -> bool {
    OUTPUT_QUEUE.lock(|queue| queue.borrow().is_empty())
}

pub(crate) fn dropped() -> u32 {
    OUTPUT_QUEUE.lock(|queue| queue.borrow().dropped())
}
