//! Static keypad layout: the physical-to-logical remap permutation and the
//! per-mode candidate sequences. Sequences carry their length explicitly;
//! there is no terminator byte, so control codes can appear anywhere.

pub const KEY_COUNT: usize = 12;
pub const MODE_COUNT: usize = 4;

/// Logical key that cycles the mode forward.
pub const MODE_SWITCH_KEY: u8 = 9;
/// Logical key that commits the line.
pub const COMMIT_KEY: u8 = 11;

pub const BACKSPACE: u8 = 0x08;
pub const TAB: u8 = 0x09;
pub const CARRIAGE_RETURN: u8 = 0x0D;
pub const ARROW_LEFT: u8 = 0xB4;
pub const ARROW_UP: u8 = 0xB5;
pub const ARROW_DOWN: u8 = 0xB6;
pub const ARROW_RIGHT: u8 = 0xB7;

// The mode-switch and commit slots are placeholders; the decoder intercepts
// those keys before any table lookup.
const MODE_SWITCH_SLOT: &[u8] = &[0x01];
const COMMIT_SLOT: &[u8] = &[CARRIAGE_RETURN];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Lower,
    Upper,
    Numeric,
    Nav,
}

impl Mode {
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Forward cycle, wrapping back to `Lower` after `Nav`.
    pub const fn next(self) -> Mode {
        match self {
            Mode::Lower => Mode::Upper,
            Mode::Upper => Mode::Numeric,
            Mode::Numeric => Mode::Nav,
            Mode::Nav => Mode::Lower,
        }
    }
}

/// Physical electrode order → logical numeric-keypad order.
const KEY_REMAP: [u8; KEY_COUNT] = [2, 5, 8, 11, 1, 4, 7, 10, 0, 3, 6, 9];

/// Remaps a physical electrode index; `None` outside the pad range.
pub fn remap(raw: u8) -> Option<u8> {
    KEY_REMAP.get(raw as usize).copied()
}

const LAYOUT: [[&[u8]; KEY_COUNT]; MODE_COUNT] = [
    // Lowercase
    [
        b" ,.!?",
        b"abc",
        b"def",
        b"ghi",
        b"jkl",
        b"mno",
        b"pqr",
        b"stuv",
        b"wxyz",
        MODE_SWITCH_SLOT,
        &[BACKSPACE],
        COMMIT_SLOT,
    ],
    // Uppercase
    [
        b" ,.!?",
        b"ABC",
        b"DEF",
        b"GHI",
        b"JKL",
        b"MNO",
        b"PQR",
        b"STUV",
        b"WXYZ",
        MODE_SWITCH_SLOT,
        &[BACKSPACE],
        COMMIT_SLOT,
    ],
    // Numeric/symbol
    [
        b"1(",
        b"2)",
        b"3{",
        b"4}",
        b"5+",
        b"6-",
        b"7/",
        b"8_",
        b"9%",
        MODE_SWITCH_SLOT,
        b"0",
        COMMIT_SLOT,
    ],
    // Navigation: single control bytes, never cycled.
    [
        b"?",
        &[ARROW_UP],
        b"?",
        &[ARROW_LEFT],
        b"?",
        &[ARROW_RIGHT],
        &[TAB],
        &[ARROW_DOWN],
        b"?",
        MODE_SWITCH_SLOT,
        &[BACKSPACE],
        COMMIT_SLOT,
    ],
];

/// Candidate byte sequence for a logical key in the given mode.
pub fn sequence(mode: Mode, key: u8) -> &'static [u8] {
    LAYOUT[mode.index()][key as usize]
}
