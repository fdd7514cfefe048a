//! # Score Model
//!
//! The in-memory score the engraving pass walks over.
//!
//! ## Type Hierarchy
//! ```text
//! Score
//!   ├── Metadata (title, composer, key sig, time sig)
//!   └── Vec<Part>
//!         ├── name: String
//!         ├── key_signature: KeySignature (initial key)
//!         ├── clef: Clef
//!         └── Vec<Measure>
//!               ├── key_change: Option<KeySignature>
//!               └── voices: Vec<Vec<Element>>
//!
//! Element (enum)
//!   ├── Note
//!   │     ├── pitch: Pitch (letter, octave, accidental)
//!   │     ├── duration: Duration
//!   │     ├── dotted: bool
//!   │     └── display_accidental: Option<AccidentalKind>  (set by engraving)
//!   └── Rest
//!         ├── duration: Duration
//!         └── dotted: bool
//! ```
//!
//! ## Raw Types
//! `RawScore`, `RawPart` and `RawMeasure` mirror the YAML document and are
//! turned into the types above by the `parser` module.

use crate::key::KeySignature;
use crate::pitch::{AccidentalKind, Pitch};
use serde::Deserialize;

/// Time signature (e.g., 4/4, 3/4, 6/8)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSignature {
    pub beats: u8,
    pub beat_type: u8,
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self {
            beats: 4,
            beat_type: 4,
        }
    }
}

impl TimeSignature {
    /// Length of a full measure as a fraction of a whole note
    pub fn measure_fraction(&self) -> f64 {
        self.beats as f64 / self.beat_type as f64
    }
}

/// Note duration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Duration {
    Whole,
    Half,
    #[default]
    Quarter,
    Eighth,
    Sixteenth,
    ThirtySecond,
}

impl Duration {
    /// Parse a duration suffix: w, h, q, 8, 16, 32
    pub fn from_suffix(s: &str) -> Option<Self> {
        match s {
            "w" => Some(Duration::Whole),
            "h" => Some(Duration::Half),
            "q" => Some(Duration::Quarter),
            "8" => Some(Duration::Eighth),
            "16" => Some(Duration::Sixteenth),
            "32" => Some(Duration::ThirtySecond),
            _ => None,
        }
    }

    /// Returns the duration as a fraction of a whole note
    pub fn as_fraction(&self) -> f64 {
        match self {
            Duration::Whole => 1.0,
            Duration::Half => 0.5,
            Duration::Quarter => 0.25,
            Duration::Eighth => 0.125,
            Duration::Sixteenth => 0.0625,
            Duration::ThirtySecond => 0.03125,
        }
    }

    /// MusicXML type name
    pub fn musicxml_type(&self) -> &'static str {
        match self {
            Duration::Whole => "whole",
            Duration::Half => "half",
            Duration::Quarter => "quarter",
            Duration::Eighth => "eighth",
            Duration::Sixteenth => "16th",
            Duration::ThirtySecond => "32nd",
        }
    }
}

/// Clef a part is written in
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Clef {
    #[default]
    Treble,
    Bass,
}

impl Clef {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "treble" => Some(Clef::Treble),
            "bass" => Some(Clef::Bass),
            _ => None,
        }
    }
}

/// A pitched note
#[derive(Debug, Clone, PartialEq)]
pub struct Note {
    pub pitch: Pitch,
    pub duration: Duration,
    pub dotted: bool,
    /// Accidental glyph to draw, decided by the engraving pass
    pub display_accidental: Option<AccidentalKind>,
}

impl Note {
    pub fn new(pitch: Pitch, duration: Duration, dotted: bool) -> Self {
        Self {
            pitch,
            duration,
            dotted,
            display_accidental: None,
        }
    }
}

/// An element in a voice: either a note or a rest
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Note(Note),
    Rest { duration: Duration, dotted: bool },
}

impl Element {
    /// Pitch of a note; rests have none
    pub fn pitch(&self) -> Option<&Pitch> {
        match self {
            Element::Note(note) => Some(&note.pitch),
            Element::Rest { .. } => None,
        }
    }

    /// Duration as a fraction of a whole note, dots included
    pub fn fraction(&self) -> f64 {
        let (duration, dotted) = match self {
            Element::Note(note) => (note.duration, note.dotted),
            Element::Rest { duration, dotted } => (*duration, *dotted),
        };
        let base = duration.as_fraction();
        if dotted {
            base * 1.5
        } else {
            base
        }
    }
}

/// A single measure of one part
#[derive(Debug, Clone, Default)]
pub struct Measure {
    pub voices: Vec<Vec<Element>>,
    /// Key signature in force from this measure on
    pub key_change: Option<KeySignature>,
}

/// One staff of the score, engraved with its own accidental state
#[derive(Debug, Clone)]
pub struct Part {
    pub name: String,
    pub key_signature: KeySignature,
    pub clef: Clef,
    pub measures: Vec<Measure>,
}

/// Document metadata from the YAML header
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    pub title: Option<String>,
    pub composer: Option<String>,
    pub time_signature: TimeSignature,
    pub key_signature: KeySignature,
}

/// A complete score
#[derive(Debug, Clone)]
pub struct Score {
    pub metadata: Metadata,
    pub parts: Vec<Part>,
}

/// Raw score document for YAML deserialization
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case")]
pub struct RawScore {
    pub title: Option<String>,
    pub composer: Option<String>,
    pub time_signature: Option<String>,
    pub key_signature: Option<String>,
    #[serde(default)]
    pub parts: Vec<RawPart>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case")]
pub struct RawPart {
    pub name: Option<String>,
    pub key_signature: Option<String>,
    pub clef: Option<String>,
    #[serde(default)]
    pub measures: Vec<RawMeasure>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case")]
pub struct RawMeasure {
    /// Key change, e.g. "D" or "Bbm"
    pub key: Option<String>,
    /// Shorthand for a single voice
    pub notes: Option<Vec<String>>,
    #[serde(default)]
    pub voices: Vec<Vec<String>>,
}
