use core::sync::atomic::{AtomicU32, Ordering};

static POLLS_SERVED: AtomicU32 = AtomicU32::new(0);
static SCAN_ERRORS: AtomicU32 = AtomicU32::new(0);
static KEYS_DECODED: AtomicU32 = AtomicU32::new(0);

pub(crate) fn count_poll() {
    POLLS_SERVED.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn count_scan_error() {
    SCAN_ERRORS.fetch_add(1, Ordering::Relaxed);
}

pub(crate) fn count_key() {
    KEYS_DECODED.fetch_add(1, Ordering::Relaxed);
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Snapshot {
    pub polls: u32,
    pub scan_errors: u32,
    pub keys: u32,
}

pub(crate) fn snapshot() -> Snapshot {
    Snapshot {
        polls: POLLS_SERVED.load(Ordering::Relaxed),
        scan_errors: SCAN_ERRORS.load(Ordering::Relaxed),
        keys: KEYS_DECODED.load(Ordering::Relaxed),
    }
}
