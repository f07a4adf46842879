//! Multi-tap decoder: logical key indices in, text/control bytes out.
//!
//! Two states. `idle` means no repeat window is open; any character key
//! starts a fresh character and arms the window. `repeat_window` means the
//! last character key can still be cycled: pressing it again replaces the
//! previous byte (backspace + next candidate) instead of starting a new one.
//! The window closes when the tick countdown reaches zero.

use statig::{blocking::IntoStateMachineExt as _, prelude::*};

use crate::layout::{self, Mode, COMMIT_KEY, MODE_SWITCH_KEY};
use crate::TICK_PERIOD_MS;

pub const REPEAT_WINDOW_MS: u32 = 2_000;
pub const REPEAT_WINDOW_TICKS: u32 = REPEAT_WINDOW_MS / TICK_PERIOD_MS as u32;

#[derive(Clone, Copy, Debug)]
enum DecoderEvent {
    Key { key: u8 },
    Tick,
}

/// Result of one keystroke: at most two bytes for the output queue, plus a
/// request to re-run the indicator step immediately.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DecoderOutput {
    pub bytes: [Option<u8>; 2],
    pub refresh: bool,
}

#[derive(Clone, Copy, Debug, Default)]
struct DispatchContext {
    bytes: [Option<u8>; 2],
    refresh: bool,
}

impl DispatchContext {
    fn emit(&mut self, byte: u8) {
        for slot in &mut self.bytes {
            if slot.is_none() {
                *slot = Some(byte);
                return;
            }
        }
    }

    fn request_refresh(&mut self) {
        self.refresh = true;
    }

    fn finish(self) -> DecoderOutput {
        DecoderOutput {
            bytes: self.bytes,
            refresh: self.refresh,
        }
    }
}

pub struct MultiTapDecoder {
    machine: statig::blocking::StateMachine<MultiTapHsm>,
}

impl Default for MultiTapDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiTapDecoder {
    pub fn new() -> Self {
        Self {
            machine: MultiTapHsm::new().state_machine(),
        }
    }

    /// Feeds one physical electrode index. Indices outside the pad range are
    /// ignored without touching decoder state.
    pub fn on_key(&mut self, raw_key: u8) -> DecoderOutput {
        let Some(key) = layout::remap(raw_key) else {
            return DecoderOutput::default();
        };
        let mut context = DispatchContext::default();
        self.machine
            .handle_with_context(&DecoderEvent::Key { key }, &mut context);
        context.finish()
    }

    /// One countdown step of the repeat window.
    pub fn tick(&mut self) {
        let mut context = DispatchContext::default();
        self.machine
            .handle_with_context(&DecoderEvent::Tick, &mut context);
    }

    pub fn mode(&self) -> Mode {
        self.machine.inner().mode
    }

    pub fn timer_active(&self) -> bool {
        self.machine.inner().ticks_left > 0
    }
}

struct MultiTapHsm {
    mode: Mode,
    last_key: u8,
    pos: usize,
    ticks_left: u32,
}

impl MultiTapHsm {
    fn new() -> Self {
        Self {
            mode: Mode::Lower,
            last_key: 0,
            pos: 0,
            ticks_left: 0,
        }
    }

    fn switch_mode(&mut self, context: &mut DispatchContext) {
        self.mode = self.mode.next();
        self.ticks_left = 0;
        context.request_refresh();
    }

    fn commit(&mut self, context: &mut DispatchContext) {
        self.mode = Mode::Lower;
        self.ticks_left = 0;
        context.emit(layout::CARRIAGE_RETURN);
        context.request_refresh();
    }

    fn start_character(&mut self, context: &mut DispatchContext, key: u8) {
        let seq = layout::sequence(self.mode, key);
        context.emit(seq[0]);
        self.pos = 0;
        self.last_key = key;
        self.ticks_left = REPEAT_WINDOW_TICKS;
        context.request_refresh();
    }

    fn cycle_character(&mut self, context: &mut DispatchContext) {
        let seq = layout::sequence(self.mode, self.last_key);
        self.pos = (self.pos + 1) % seq.len();
        context.emit(layout::BACKSPACE);
        context.emit(seq[self.pos]);
        self.ticks_left = REPEAT_WINDOW_TICKS;
        context.request_refresh();
    }
}

#[state_machine(initial = "State::idle()")]
impl MultiTapHsm {
    #[state]
    fn idle(&mut self, context: &mut DispatchContext, event: &DecoderEvent) -> Outcome<State> {
        match event {
            DecoderEvent::Key { key } if *key == MODE_SWITCH_KEY => {
                self.switch_mode(context);
                Handled
            }
            DecoderEvent::Key { key } if *key == COMMIT_KEY => {
                self.commit(context);
                Handled
            }
            DecoderEvent::Key { key } => {
                self.start_character(context, *key);
                Transition(State::repeat_window())
            }
            DecoderEvent::Tick => Handled,
        }
    }

    #[state]
    fn repeat_window(
        &mut self,
        context: &mut DispatchContext,
        event: &DecoderEvent,
    ) -> Outcome<State> {
        match event {
            DecoderEvent::Key { key } if *key == MODE_SWITCH_KEY => {
                self.switch_mode(context);
                Transition(State::idle())
            }
            DecoderEvent::Key { key } if *key == COMMIT_KEY => {
                self.commit(context);
                Transition(State::idle())
            }
            DecoderEvent::Key { key } => {
                // Nav entries are single control bytes; a repeated nav press
                // re-emits the same byte instead of cycling.
                if *key == self.last_key && self.mode != Mode::Nav {
                    self.cycle_character(context);
                } else {
                    self.start_character(context, *key);
                }
                Handled
            }
            DecoderEvent::Tick => {
                self.ticks_left = self.ticks_left.saturating_sub(1);
                if self.ticks_left == 0 {
                    Transition(State::idle())
                } else {
                    Handled
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{ARROW_UP, BACKSPACE, CARRIAGE_RETURN};
    use crate::queue::OutputQueue;

    /// Physical electrode whose logical remap is `logical`.
    fn physical(logical: u8) -> u8 {
        (0u8..12)
            .find(|raw| layout::remap(*raw) == Some(logical))
            .unwrap()
    }

    fn bytes(output: DecoderOutput) -> std::vec::Vec<u8> {
        output.bytes.into_iter().flatten().collect()
    }

    fn press(decoder: &mut MultiTapDecoder, logical: u8) -> std::vec::Vec<u8> {
        bytes(decoder.on_key(physical(logical)))
    }

    fn switch_to(decoder: &mut MultiTapDecoder, mode: Mode) {
        while decoder.mode() != mode {
            press(decoder, MODE_SWITCH_KEY);
        }
    }

    #[test]
    fn first_press_emits_first_candidate() {
        let mut decoder = MultiTapDecoder::new();
        assert_eq!(press(&mut decoder, 1), std::vec![b'a']);
        assert_eq!(decoder.mode(), Mode::Lower);
        assert!(decoder.timer_active());
    }

    #[test]
    fn first_press_emits_first_candidate_in_every_mode() {
        for (mode, expected) in [
            (Mode::Lower, b'a'),
            (Mode::Upper, b'A'),
            (Mode::Numeric, b'2'),
            (Mode::Nav, ARROW_UP),
        ] {
            let mut decoder = MultiTapDecoder::new();
            switch_to(&mut decoder, mode);
            assert_eq!(press(&mut decoder, 1), std::vec![expected]);
        }
    }

    #[test]
    fn first_press_matches_the_layout_table_everywhere() {
        for mode in [Mode::Lower, Mode::Upper, Mode::Numeric, Mode::Nav] {
            for key in (0..12u8).filter(|key| *key != MODE_SWITCH_KEY && *key != COMMIT_KEY) {
                let mut decoder = MultiTapDecoder::new();
                switch_to(&mut decoder, mode);
                assert_eq!(
                    press(&mut decoder, key),
                    std::vec![layout::sequence(mode, key)[0]]
                );
            }
        }
    }

    #[test]
    fn repeat_press_cycles_with_backspace_and_wraps() {
        let mut decoder = MultiTapDecoder::new();
        assert_eq!(press(&mut decoder, 1), std::vec![b'a']);
        assert_eq!(press(&mut decoder, 1), std::vec![BACKSPACE, b'b']);
        assert_eq!(press(&mut decoder, 1), std::vec![BACKSPACE, b'c']);
        assert_eq!(press(&mut decoder, 1), std::vec![BACKSPACE, b'a']);
    }

    #[test]
    fn a_different_key_starts_a_new_character() {
        let mut decoder = MultiTapDecoder::new();
        assert_eq!(press(&mut decoder, 1), std::vec![b'a']);
        assert_eq!(press(&mut decoder, 2), std::vec![b'd']);
        assert_eq!(press(&mut decoder, 2), std::vec![BACKSPACE, b'e']);
    }

    #[test]
    fn expired_window_starts_a_new_character() {
        let mut decoder = MultiTapDecoder::new();
        assert_eq!(press(&mut decoder, 1), std::vec![b'a']);
        for _ in 0..REPEAT_WINDOW_TICKS {
            decoder.tick();
        }
        assert!(!decoder.timer_active());
        assert_eq!(press(&mut decoder, 1), std::vec![b'a']);
    }

    #[test]
    fn window_survives_one_tick_short_of_expiry() {
        let mut decoder = MultiTapDecoder::new();
        press(&mut decoder, 1);
        for _ in 0..REPEAT_WINDOW_TICKS - 1 {
            decoder.tick();
        }
        assert!(decoder.timer_active());
        assert_eq!(press(&mut decoder, 1), std::vec![BACKSPACE, b'b']);
    }

    #[test]
    fn every_keystroke_rearms_the_window() {
        let mut decoder = MultiTapDecoder::new();
        press(&mut decoder, 1);
        for _ in 0..REPEAT_WINDOW_TICKS - 1 {
            decoder.tick();
        }
        assert_eq!(press(&mut decoder, 1), std::vec![BACKSPACE, b'b']);
        for _ in 0..REPEAT_WINDOW_TICKS - 1 {
            decoder.tick();
        }
        assert_eq!(press(&mut decoder, 1), std::vec![BACKSPACE, b'c']);
    }

    #[test]
    fn mode_switch_cycles_four_modes_and_emits_nothing() {
        let mut decoder = MultiTapDecoder::new();
        let mut seen = std::vec::Vec::new();
        for _ in 0..4 {
            let output = decoder.on_key(physical(MODE_SWITCH_KEY));
            assert_eq!(bytes(output), std::vec::Vec::<u8>::new());
            assert!(output.refresh);
            seen.push(decoder.mode());
        }
        assert_eq!(
            seen,
            std::vec![Mode::Upper, Mode::Numeric, Mode::Nav, Mode::Lower]
        );
    }

    #[test]
    fn mode_switch_closes_the_repeat_window() {
        let mut decoder = MultiTapDecoder::new();
        assert_eq!(press(&mut decoder, 1), std::vec![b'a']);
        press(&mut decoder, MODE_SWITCH_KEY);
        assert!(!decoder.timer_active());
        // Same key again: a fresh character in the new mode, no backspace.
        assert_eq!(press(&mut decoder, 1), std::vec![b'A']);
    }

    #[test]
    fn commit_emits_return_and_resets_to_default_mode() {
        let mut decoder = MultiTapDecoder::new();
        switch_to(&mut decoder, Mode::Upper);
        assert_eq!(press(&mut decoder, 1), std::vec![b'A']);
        let output = decoder.on_key(physical(COMMIT_KEY));
        assert_eq!(bytes(output), std::vec![CARRIAGE_RETURN]);
        assert!(output.refresh);
        assert_eq!(decoder.mode(), Mode::Lower);
        assert!(!decoder.timer_active());
    }

    #[test]
    fn commit_from_idle_still_emits_return() {
        let mut decoder = MultiTapDecoder::new();
        assert_eq!(press(&mut decoder, COMMIT_KEY), std::vec![CARRIAGE_RETURN]);
    }

    #[test]
    fn nav_mode_never_cycles() {
        let mut decoder = MultiTapDecoder::new();
        switch_to(&mut decoder, Mode::Nav);
        for _ in 0..3 {
            assert_eq!(press(&mut decoder, 1), std::vec![ARROW_UP]);
        }
    }

    #[test]
    fn backspace_key_repeats_as_plain_backspaces() {
        let mut decoder = MultiTapDecoder::new();
        assert_eq!(press(&mut decoder, 10), std::vec![BACKSPACE]);
        // Single-candidate sequence: the cycle wraps straight back onto it.
        assert_eq!(press(&mut decoder, 10), std::vec![BACKSPACE, BACKSPACE]);
    }

    #[test]
    fn numeric_mode_zero_key() {
        let mut decoder = MultiTapDecoder::new();
        switch_to(&mut decoder, Mode::Numeric);
        assert_eq!(press(&mut decoder, 10), std::vec![b'0']);
    }

    #[test]
    fn out_of_range_key_is_a_no_op() {
        let mut decoder = MultiTapDecoder::new();
        press(&mut decoder, 1);
        let before_mode = decoder.mode();
        let output = decoder.on_key(12);
        assert_eq!(output, DecoderOutput::default());
        assert_eq!(decoder.mode(), before_mode);
        // The open window is untouched: the next press still cycles.
        assert_eq!(press(&mut decoder, 1), std::vec![BACKSPACE, b'b']);
    }

    #[test]
    fn triple_tap_fills_the_queue_in_replacement_order() {
        let mut decoder = MultiTapDecoder::new();
        let mut queue: OutputQueue<8> = OutputQueue::new();
        for _ in 0..3 {
            for byte in decoder.on_key(physical(1)).bytes.into_iter().flatten() {
                assert!(queue.push(byte));
            }
        }
        let mut drained = std::vec::Vec::new();
        while let Some(byte) = queue.pop() {
            drained.push(byte);
        }
        assert_eq!(drained, std::vec![b'a', BACKSPACE, b'b', BACKSPACE, b'c']);
    }
}
