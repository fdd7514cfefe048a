//! # Pitch Model
//!
//! Note letters, accidental kinds and resolved pitches as seen by the
//! accidental tracker.
//!
//! ## Pitch Keys
//! A [`PitchKey`] identifies one staff position: a note letter in a specific
//! octave, independent of whatever accidental is applied to it.
//!
//! ```text
//! key = letter.ordinal() + octave * 12
//!
//! F5  -> 5 + 60 = 65
//! F#5 -> 65        (same staff position)
//! F4  -> 5 + 48 = 53
//! ```
//!
//! The letter ordinal is the letter's half-tone position above C, so every
//! (letter, octave) pair maps to a distinct key.

use serde::Serialize;
use std::fmt;

/// Integer identity of a staff position (letter within an octave)
pub type PitchKey = i32;

/// Lowest octave covered by key signature alterations
pub const MIN_OCTAVE: i32 = -9;
/// Highest octave covered by key signature alterations
pub const MAX_OCTAVE: i32 = 8;

/// Note letters C through B
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum NoteLetter {
    #[default]
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl NoteLetter {
    /// Half-tone position of the natural letter above C
    pub fn ordinal(self) -> i32 {
        match self {
            NoteLetter::C => 0,
            NoteLetter::D => 2,
            NoteLetter::E => 4,
            NoteLetter::F => 5,
            NoteLetter::G => 7,
            NoteLetter::A => 9,
            NoteLetter::B => 11,
        }
    }

    /// Parse an uppercase letter
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'C' => Some(NoteLetter::C),
            'D' => Some(NoteLetter::D),
            'E' => Some(NoteLetter::E),
            'F' => Some(NoteLetter::F),
            'G' => Some(NoteLetter::G),
            'A' => Some(NoteLetter::A),
            'B' => Some(NoteLetter::B),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NoteLetter::C => "C",
            NoteLetter::D => "D",
            NoteLetter::E => "E",
            NoteLetter::F => "F",
            NoteLetter::G => "G",
            NoteLetter::A => "A",
            NoteLetter::B => "B",
        }
    }
}

/// Accidental classification of a pitch
///
/// `None` means no accidental was given; `Natural` means one was explicitly
/// requested. Both sound at zero half tones but only sharps and flats count
/// as an alteration (see [`AccidentalKind::is_alteration`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccidentalKind {
    #[default]
    None,
    Natural,
    Sharp,
    Flat,
    DoubleSharp,
    DoubleFlat,
}

impl AccidentalKind {
    /// Half-tone offset from the natural letter
    pub fn half_tones(self) -> i32 {
        match self {
            AccidentalKind::None | AccidentalKind::Natural => 0,
            AccidentalKind::Sharp => 1,
            AccidentalKind::Flat => -1,
            AccidentalKind::DoubleSharp => 2,
            AccidentalKind::DoubleFlat => -2,
        }
    }

    /// True for an actual sharp, flat, double sharp or double flat
    pub fn is_alteration(self) -> bool {
        !matches!(self, AccidentalKind::None | AccidentalKind::Natural)
    }

    /// The symbol drawn when a glyph is attached for this kind.
    /// A pitch without an accidental is shown with a natural sign.
    pub fn glyph(self) -> AccidentalKind {
        match self {
            AccidentalKind::None => AccidentalKind::Natural,
            other => other,
        }
    }

    /// MusicXML `<accidental>` value
    pub fn musicxml_name(self) -> &'static str {
        match self {
            AccidentalKind::None | AccidentalKind::Natural => "natural",
            AccidentalKind::Sharp => "sharp",
            AccidentalKind::Flat => "flat",
            AccidentalKind::DoubleSharp => "double-sharp",
            AccidentalKind::DoubleFlat => "flat-flat",
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            AccidentalKind::None => "",
            AccidentalKind::Natural => "n",
            AccidentalKind::Sharp => "#",
            AccidentalKind::Flat => "b",
            AccidentalKind::DoubleSharp => "##",
            AccidentalKind::DoubleFlat => "bb",
        }
    }
}

/// A resolved pitch: letter, octave and the accidental it sounds with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Pitch {
    pub letter: NoteLetter,
    pub octave: i32,
    pub accidental: AccidentalKind,
}

impl Pitch {
    pub fn new(letter: NoteLetter, octave: i32, accidental: AccidentalKind) -> Self {
        Self {
            letter,
            octave,
            accidental,
        }
    }

    /// Staff position of this pitch, ignoring its accidental
    pub fn key(&self) -> PitchKey {
        // Saturates far outside the tracked octaves
        self.octave.saturating_mul(12).saturating_add(self.letter.ordinal())
    }

    pub fn accidental_half_tones(&self) -> i32 {
        self.accidental.half_tones()
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.letter.as_str(),
            self.accidental.symbol(),
            self.octave
        )
    }
}
