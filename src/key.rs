//! # Key Signatures
//!
//! A key signature is a position on the circle of fifths. Positive values
//! are sharp keys, negative values flat keys, zero is C major / A minor.
//!
//! The accidental tracker only needs two things from a key signature:
//! the ordered list of altered letters and the polarity of the alteration.
//!
//! ```text
//! fifths  altered letters      polarity
//!   +2    F C                  sharp
//!    0    (none)               flat
//!   -3    B E A                flat
//! ```

use crate::pitch::{AccidentalKind, NoteLetter};
use serde::Serialize;
use std::ops::RangeInclusive;

/// Order in which sharps are added to a key signature
static ORDER_OF_SHARPS: [NoteLetter; 7] = [
    NoteLetter::F,
    NoteLetter::C,
    NoteLetter::G,
    NoteLetter::D,
    NoteLetter::A,
    NoteLetter::E,
    NoteLetter::B,
];

/// Order in which flats are added to a key signature
static ORDER_OF_FLATS: [NoteLetter; 7] = [
    NoteLetter::B,
    NoteLetter::E,
    NoteLetter::A,
    NoteLetter::D,
    NoteLetter::G,
    NoteLetter::C,
    NoteLetter::F,
];

/// Mode for key signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Major,
    Minor,
}

/// Key signature (number of sharps/flats)
/// Positive = sharps, Negative = flats, Zero = C major / A minor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct KeySignature {
    pub fifths: i8, // -7 to +7 (flats to sharps)
    pub mode: Mode,
}

impl KeySignature {
    pub fn new(fifths: i8, mode: Mode) -> Self {
        Self { fifths, mode }
    }

    /// Parse a key signature string like "G", "D", "F", "Bb", "Eb", etc.
    /// Also supports minor keys: "Am", "Dm", "Ebm", etc.
    /// Also supports sharp/flat count notation: "#", "##", ... or "bb", "bbb", ...
    pub fn from_str(s: &str) -> Option<Self> {
        let trimmed = s.trim();

        if !trimmed.is_empty() && trimmed.chars().all(|c| c == '#') {
            return Self::from_count(trimmed.len(), 1..=7, 1);
        }

        // A lone "b" is B major, so flat counts start at two
        if trimmed.len() >= 2 && trimmed.chars().all(|c| c == 'b') {
            return Self::from_count(trimmed.len(), 2..=7, -1);
        }

        if let Some(tonic) = trimmed.strip_suffix('m').filter(|t| !t.is_empty()) {
            let fifths = match tonic {
                "A" => 0,
                "E" => 1,
                "B" => 2,
                "F#" => 3,
                "C#" => 4,
                "G#" => 5,
                "D#" => 6,
                "A#" => 7,
                "D" => -1,
                "G" => -2,
                "C" => -3,
                "F" => -4,
                "Bb" => -5,
                "Eb" => -6,
                "Ab" => -7,
                _ => return None,
            };
            return Some(Self::new(fifths, Mode::Minor));
        }

        let fifths = match trimmed {
            "C" => 0,
            "G" => 1,
            "D" => 2,
            "A" => 3,
            "E" => 4,
            "B" => 5,
            "F#" => 6,
            "C#" => 7,
            "F" => -1,
            "Bb" => -2,
            "Eb" => -3,
            "Ab" => -4,
            "Db" => -5,
            "Gb" => -6,
            "Cb" => -7,
            _ => return None,
        };
        Some(Self::new(fifths, Mode::Major))
    }

    fn from_count(count: usize, allowed: RangeInclusive<usize>, sign: i8) -> Option<Self> {
        if !allowed.contains(&count) {
            return None;
        }
        let count = i8::try_from(count).ok()?;
        Some(Self::new(sign * count, Mode::Major))
    }

    /// Letters altered by this signature, in the order they are written
    pub fn altered_letters(&self) -> &'static [NoteLetter] {
        let count = self.fifths.unsigned_abs().min(7) as usize;
        if self.fifths > 0 {
            &ORDER_OF_SHARPS[..count]
        } else {
            &ORDER_OF_FLATS[..count]
        }
    }

    /// Sharp for sharp keys, flat otherwise (including C major)
    pub fn polarity(&self) -> AccidentalKind {
        if self.fifths > 0 {
            AccidentalKind::Sharp
        } else {
            AccidentalKind::Flat
        }
    }

    /// Accidental this signature implies for an unmarked note of `letter`
    pub fn accidental_for(&self, letter: NoteLetter) -> AccidentalKind {
        if self.altered_letters().contains(&letter) {
            self.polarity()
        } else {
            AccidentalKind::None
        }
    }
}
