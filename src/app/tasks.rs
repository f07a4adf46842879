use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Ticker, Timer};
use keypad::{
    decoder::MultiTapDecoder,
    edge::EdgeDetector,
    indicator::{next_wake, IndicatorBlink},
};

use super::{
    config::{
        BROKER_POLL_MS, KEY_EVENTS, OUTPUT_QUEUE_LEN, SCAN_EVENTS, SCAN_TRACE_ENABLED,
        STATS_LOG_TICKS,
    },
    output, telemetry,
    types::{BrokerUart, IndicatorPin, PadDriver, PadIrqPin, ScanEvent},
};

#[embassy_executor::task]
pub(crate) async fn irq_task(mut irq: PadIrqPin) {
    loop {
        irq.wait_for_falling_edge().await;
        let _ = SCAN_EVENTS.try_send(ScanEvent::Irq);
        // Re-arm on level return so a pad held down cannot starve the next edge.
        if irq.is_low() {
            irq.wait_for_rising_edge().await;
        }
    }
}

#[embassy_executor::task]
pub(crate) async fn scan_task(mut pad: PadDriver) {
    let mut edges = EdgeDetector::new();

    loop {
        match SCAN_EVENTS.receive().await {
            ScanEvent::Irq => {}
        }
        let mask = match pad.touched() {
            Ok(mask) => mask,
            Err(_) => {
                // Reading the status register is also what clears the
                // interrupt line; a failed poll leaves the previous mask in
                // place and the next edge retries.
                telemetry::count_scan_error();
                continue;
            }
        };
        telemetry::count_poll();
        if SCAN_TRACE_ENABLED {
            esp_println::println!("keypad: scan mask={:#05x}", mask);
        }
        for key in edges.poll(mask) {
            KEY_EVENTS.send(key).await;
        }
    }
}

#[embassy_executor::task]
pub(crate) async fn decoder_task(mut indicator: IndicatorPin) {
    let mut decoder = MultiTapDecoder::new();
    let mut blink = IndicatorBlink::new();
    let mut restart = false;

    loop {
        // One tick step: repeat-window countdown, blink phase, LED drive.
        decoder.tick();
        let lit = blink.tick(decoder.mode(), restart);
        if lit {
            indicator.set_high();
        } else {
            indicator.set_low();
        }
        restart = false;

        let key = match next_wake(decoder.mode(), decoder.timer_active()) {
            Some(period_ms) => {
                match select(KEY_EVENTS.receive(), Timer::after_millis(period_ms)).await {
                    Either::First(key) => Some(key),
                    Either::Second(()) => None,
                }
            }
            // Nothing to animate or expire: sleep until a key event arrives.
            None => Some(KEY_EVENTS.receive().await),
        };

        if let Some(key) = key {
            restart = apply_key(&mut decoder, key);
        }
    }
}

/// Runs one keystroke through the decoder and queues whatever it emitted.
/// Returns the decoder's request for an immediate indicator restart.
fn apply_key(decoder: &mut MultiTapDecoder, key: u8) -> bool {
    let output = decoder.on_key(key);
    for byte in output.bytes.into_iter().flatten() {
        // A full queue drops the byte; the queue itself keeps count.
        let _ = output::push(byte);
    }
    telemetry::count_key();
    output.refresh
}

#[embassy_executor::task]
pub(crate) async fn broker_task(mut uart: BrokerUart) {
    let mut ticker = Ticker::every(Duration::from_millis(BROKER_POLL_MS));
    let mut dropped_seen = 0u32;
    let mut ticks = 0u32;

    loop {
        ticker.next().await;

        if !output::is_empty() {
            let mut buf = [0u8; OUTPUT_QUEUE_LEN];
            let mut len = 0;
            while len < buf.len() {
                match output::pop() {
                    Some(byte) => {
                        buf[len] = byte;
                        len += 1;
                    }
                    None => break,
                }
            }
            let _ = uart.write_async(&buf[..len]).await;
        }

        let dropped = output::dropped();
        if dropped != dropped_seen {
            esp_println::println!(
                "keypad: queue overflow dropped={} (+{})",
                dropped,
                dropped - dropped_seen
            );
            dropped_seen = dropped;
        }

        ticks += 1;
        if ticks % STATS_LOG_TICKS == 0 {
            let stats = telemetry::snapshot();
            esp_println::println!(
                "keypad: stats polls={} keys={} scan_errors={} dropped={}",
                stats.polls,
                stats.keys,
                stats.scan_errors,
                dropped
            );
        }
    }
}
