//! # engrave
//!
//! Decides which notes of a score need an accidental glyph, following the
//! usual engraving conventions: accidentals last until the barline, every
//! measure restarts from the key signature, and a courtesy accidental is
//! drawn when a pitch returns to its key-signature value after an
//! alteration in an earlier measure.
//!
//! ## Pipeline
//! 1. Parse a YAML score document (`parser`)
//! 2. Validate measure lengths and pitch range (`semantic`)
//! 3. Drive an [`AccidentalTracker`] over every part (`engrave`)
//! 4. Write MusicXML (`musicxml`) or an accidental report
//!
//! ## Example
//! ```rust
//! let source = r#"
//! key-signature: G
//! parts:
//!   - name: Flute
//!     measures:
//!       - notes: [Fn5, G5, A5, B5]
//!       - notes: [F5, G5, A5, B5]
//! "#;
//!
//! let marks = engrave::accidental_report(source)?;
//! assert_eq!(marks.len(), 2); // the natural, then the courtesy sharp
//! # Ok::<(), engrave::EngraveError>(())
//! ```

pub mod accidentals;
pub mod engrave;
pub mod error;
pub mod key;
pub mod musicxml;
pub mod parser;
pub mod pitch;
pub mod score;
pub mod semantic;

pub use accidentals::{AccidentalSink, AccidentalTracker};
pub use crate::engrave::{accidental_marks, engrave, AccidentalMark};
pub use error::*;
pub use key::{KeySignature, Mode};
pub use musicxml::to_musicxml;
pub use parser::parse;
pub use pitch::{AccidentalKind, NoteLetter, Pitch, PitchKey};
pub use score::*;
pub use semantic::validate;

/// Engrave a YAML score document to MusicXML.
/// This is the main entry point for the library.
pub fn engrave_source(source: &str) -> Result<String, EngraveError> {
    let mut score = parse(source)?;
    validate(&score)?;
    engrave(&mut score);
    Ok(to_musicxml(&score))
}

/// Engrave without validation (useful for partial/incomplete scores)
pub fn engrave_source_unchecked(source: &str) -> Result<String, EngraveError> {
    let mut score = parse(source)?;
    engrave(&mut score);
    Ok(to_musicxml(&score))
}

/// Engrave a YAML score document and list the accidental glyphs it needs
pub fn accidental_report(source: &str) -> Result<Vec<AccidentalMark>, EngraveError> {
    let mut score = parse(source)?;
    validate(&score)?;
    engrave(&mut score);
    Ok(accidental_marks(&score))
}
