//! Segment shapes for the two eyes.
//!
//! Each eye is an eight-segment display: seven bar segments and a center
//! dot. The bars are a standard seven-segment digit turned on its side, so
//! the "left loop" (`tl`, `l`, `bl`, `m`) and the "right loop" (`m`, `tr`,
//! `r`, `br`) each draw a small circle.
//!
//! Glyphs for digits and letters are written in the usual `abcdefg`
//! seven-segment notation and rotated into the eye layout by
//! [`EyeState::from_seven_segment`].

/// The lit segments of one eye.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct EyeState(u8);

impl EyeState {
    /// Top-left bar.
    pub const TL: u8 = 1 << 0;
    /// Left bar.
    pub const L: u8 = 1 << 1;
    /// Bottom-left bar.
    pub const BL: u8 = 1 << 2;
    /// Middle bar.
    pub const M: u8 = 1 << 3;
    /// Center dot.
    pub const DOT: u8 = 1 << 4;
    /// Top-right bar.
    pub const TR: u8 = 1 << 5;
    /// Right bar.
    pub const R: u8 = 1 << 6;
    /// Bottom-right bar.
    pub const BR: u8 = 1 << 7;

    /// All segments dark.
    pub const OFF: EyeState = EyeState(0);

    /// Builds an eye from a segment mask (see the associated bit constants).
    pub const fn from_bits(bits: u8) -> Self {
        EyeState(bits)
    }

    /// The raw segment mask.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether segment slot `index` (0..8, in driver channel order) is lit.
    pub const fn segment(self, index: usize) -> bool {
        index < 8 && self.0 & (1 << index) != 0
    }

    /// Whether the center dot is lit.
    pub const fn dot(self) -> bool {
        self.0 & Self::DOT != 0
    }

    /// Returns this eye with the center dot forced on.
    pub const fn with_dot(self) -> Self {
        EyeState(self.0 | Self::DOT)
    }

    /// Rotates a standard seven-segment mask (`a` in bit 0 through `g` in
    /// bit 6) into the eye layout.
    pub const fn from_seven_segment(abcdefg: u8) -> Self {
        const MAP: [u8; 7] = [
            EyeState::R,  // a
            EyeState::BR, // b
            EyeState::BL, // c
            EyeState::L,  // d
            EyeState::TL, // e
            EyeState::TR, // f
            EyeState::M,  // g
        ];
        let mut bits = 0;
        let mut i = 0;
        while i < 7 {
            if abcdefg & (1 << i) != 0 {
                bits |= MAP[i];
            }
            i += 1;
        }
        EyeState(bits)
    }

    /// Glyph for a decimal digit; values above 9 render as `E`.
    pub const fn digit(n: u8) -> Self {
        const DIGITS: [u8; 10] = [
            0b011_1111, // 0
            0b000_0110, // 1
            0b101_1011, // 2
            0b100_1111, // 3
            0b110_0110, // 4
            0b110_1101, // 5
            0b111_1101, // 6
            0b000_0111, // 7
            0b111_1111, // 8
            0b110_1111, // 9
        ];
        if n < 10 {
            Self::from_seven_segment(DIGITS[n as usize])
        } else {
            Self::LETTER_E
        }
    }

    /// Glyph for `E`.
    pub const LETTER_E: EyeState = EyeState::from_seven_segment(0b111_1001);

    /// Small circle on the left loop.
    pub const CIRCLE_LEFT: EyeState = EyeState(Self::TL | Self::L | Self::BL | Self::M);
    /// Small circle on the right loop.
    pub const CIRCLE_RIGHT: EyeState = EyeState(Self::M | Self::TR | Self::R | Self::BR);
    /// Both loops lit.
    pub const CIRCLE_BIG: EyeState =
        EyeState(Self::TL | Self::L | Self::BL | Self::TR | Self::R | Self::BR);
    /// Happy arch on the left loop.
    pub const HAPPY_LEFT: EyeState = EyeState(Self::TL | Self::L | Self::M);
    /// Happy arch on the right loop.
    pub const HAPPY_RIGHT: EyeState = EyeState(Self::M | Self::TR | Self::R);
    /// Wide happy arch.
    pub const HAPPY_BIG: EyeState = EyeState(Self::TL | Self::L | Self::TR | Self::R);
    /// Sad arch on the left loop.
    pub const SAD_LEFT: EyeState = EyeState(Self::L | Self::BL | Self::M);
    /// Sad arch on the right loop.
    pub const SAD_RIGHT: EyeState = EyeState(Self::M | Self::R | Self::BR);
    /// Pupil looking to the left side.
    pub const SIDE_LEFT: EyeState = EyeState(Self::TL | Self::L | Self::BL);
    /// Pupil looking to the right side.
    pub const SIDE_RIGHT: EyeState = EyeState(Self::TR | Self::R | Self::BR);
    /// Closed lid, right half.
    pub const BLINK_RIGHT: EyeState = EyeState(Self::BR);
    /// Closed lid, left half.
    pub const BLINK_LEFT: EyeState = EyeState(Self::BL);
    /// Closed lid through the middle.
    pub const BLINK_MIDDLE: EyeState = EyeState(Self::M);
}

/// The two eyes, as rendered together.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct EyePair {
    /// Eye on driver channels 0..8.
    pub left: EyeState,
    /// Eye on driver channels 8..16.
    pub right: EyeState,
}

impl EyePair {
    /// Both eyes closed mid-blink.
    pub const BLINK: EyePair = EyePair::new(EyeState::BLINK_RIGHT, EyeState::BLINK_LEFT);

    /// Pairs two eyes.
    pub const fn new(left: EyeState, right: EyeState) -> Self {
        EyePair { left, right }
    }

    /// A two-digit readout of `n`, tens on the left. Values above 99 clamp.
    pub const fn number(n: u8) -> Self {
        let n = if n > 99 { 99 } else { n };
        EyePair::new(EyeState::digit(n / 10), EyeState::digit(n % 10))
    }

    /// An error readout: `E` followed by the digit of `code`.
    pub const fn error_code(code: u8) -> Self {
        EyePair::new(EyeState::LETTER_E, EyeState::digit(code))
    }

    /// The eye for index 0 (left) or 1 (right).
    pub const fn eye(&self, index: usize) -> EyeState {
        if index == 0 { self.left } else { self.right }
    }
}

/// Named idle faces.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
#[repr(u8)]
pub enum Face {
    /// Round, relaxed eyes.
    #[default]
    Normal = 0,
    /// Happy arches.
    Happy,
    /// Sad arches.
    Sad,
    /// Wide open.
    Big,
    /// Looking left.
    Left,
    /// Looking right.
    Right,
    /// Wide happy arches.
    BigHappy,
    /// One wide eye, one small.
    Dafuq,
}

impl Face {
    /// Every face, in catalog order.
    pub const ALL: [Face; 8] = [
        Face::Normal,
        Face::Happy,
        Face::Sad,
        Face::Big,
        Face::Left,
        Face::Right,
        Face::BigHappy,
        Face::Dafuq,
    ];

    /// Looks a face up by catalog index.
    pub fn from_index(index: u8) -> Option<Face> {
        Face::ALL.get(index as usize).copied()
    }

    /// Catalog index of this face.
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// How this face looks.
    pub const fn eyes(self) -> EyePair {
        match self {
            Face::Normal => EyePair::new(EyeState::CIRCLE_RIGHT, EyeState::CIRCLE_LEFT),
            Face::Happy => EyePair::new(EyeState::HAPPY_LEFT, EyeState::HAPPY_RIGHT),
            Face::Sad => EyePair::new(EyeState::SAD_RIGHT, EyeState::SAD_LEFT),
            Face::Big => EyePair::new(EyeState::CIRCLE_BIG, EyeState::CIRCLE_BIG),
            Face::Left => EyePair::new(EyeState::SIDE_LEFT, EyeState::SIDE_LEFT),
            Face::Right => EyePair::new(EyeState::SIDE_RIGHT, EyeState::SIDE_RIGHT),
            Face::BigHappy => EyePair::new(EyeState::HAPPY_BIG, EyeState::HAPPY_BIG),
            Face::Dafuq => EyePair::new(EyeState::CIRCLE_BIG, EyeState::CIRCLE_LEFT),
        }
    }
}
