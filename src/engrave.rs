//! # Engraving Pass
//!
//! Walks a score in reading order and asks an [`AccidentalTracker`] which
//! notes need an accidental glyph.
//!
//! ## Driving Order
//! ```text
//! for each part (own tracker)
//!   set_active_key_signature(part key)
//!   for each measure
//!     key change?      -> set_active_key_signature(new key)
//!     for each element by onset, top voice first on ties
//!       check_accidental(note, pitch)                     (rests: no pitch)
//!     end_of_measure()
//! ```
//!
//! Voices are interleaved by when their notes sound, so a lower-voice note
//! on beat 1 is judged before an upper-voice alteration on beat 3.
//!
//! Glyphs land in [`Note::display_accidental`]; [`accidental_marks`] lists
//! them afterwards for reporting.

use crate::accidentals::{AccidentalSink, AccidentalTracker};
use crate::pitch::{AccidentalKind, Pitch};
use crate::score::*;
use serde::Serialize;

/// Records glyphs on the notes they belong to
struct DisplayAccidentals {
    attached: usize,
}

impl AccidentalSink<Element> for DisplayAccidentals {
    fn attach_accidental(&mut self, element: &mut Element, pitch: &Pitch) {
        if let Element::Note(note) = element {
            note.display_accidental = Some(pitch.accidental.glyph());
            self.attached += 1;
        }
    }
}

/// Decide the accidental glyphs of every note in the score
pub fn engrave(score: &mut Score) {
    for part in &mut score.parts {
        engrave_part(part);
    }
}

/// Engrave one part with a tracker of its own
pub fn engrave_part(part: &mut Part) {
    let mut tracker = AccidentalTracker::new();
    let mut sink = DisplayAccidentals { attached: 0 };

    tracker.set_active_key_signature(part.key_signature);

    for (i, measure) in part.measures.iter_mut().enumerate() {
        if let Some(key) = measure.key_change {
            log::debug!(
                target: "engrave::pass",
                "{}: key change to {} fifths at measure {}",
                part.name,
                key.fifths,
                i + 1
            );
            tracker.set_active_key_signature(key);
        }

        for (v, index) in onset_order(measure) {
            let element = &mut measure.voices[v][index];
            if let Element::Note(note) = element {
                note.display_accidental = None;
            }
            let pitch = element.pitch().copied();
            tracker.check_accidental(&mut sink, element, pitch.as_ref());
        }

        tracker.end_of_measure();
    }

    log::debug!(
        target: "engrave::pass",
        "{}: {} measure(s), {} accidental(s), {} courtesy obligation(s) left open",
        part.name,
        part.measures.len(),
        sink.attached,
        tracker.dangling_count()
    );
}

/// `(voice, index)` of every element in the order it sounds.
/// Simultaneous elements keep voice order.
fn onset_order(measure: &Measure) -> Vec<(usize, usize)> {
    let mut order = Vec::new();
    for (v, voice) in measure.voices.iter().enumerate() {
        let mut onset: f64 = 0.0;
        for (index, element) in voice.iter().enumerate() {
            order.push((onset, v, index));
            onset += element.fraction();
        }
    }
    // Stable, and onsets are exact binary fractions
    order.sort_by(|a, b| a.0.total_cmp(&b.0));
    order.into_iter().map(|(_, v, index)| (v, index)).collect()
}

/// One accidental glyph placed by the engraving pass
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccidentalMark {
    pub part: String,
    /// 1-indexed
    pub measure: usize,
    /// 1-indexed
    pub voice: usize,
    /// 0-indexed position within the voice, rests included
    pub index: usize,
    pub pitch: String,
    pub glyph: AccidentalKind,
}

/// List every glyph of an engraved score in reading order
pub fn accidental_marks(score: &Score) -> Vec<AccidentalMark> {
    let mut marks = Vec::new();
    for part in &score.parts {
        for (m, measure) in part.measures.iter().enumerate() {
            for (v, voice) in measure.voices.iter().enumerate() {
                for (index, element) in voice.iter().enumerate() {
                    if let Element::Note(Note {
                        pitch,
                        display_accidental: Some(glyph),
                        ..
                    }) = element
                    {
                        marks.push(AccidentalMark {
                            part: part.name.clone(),
                            measure: m + 1,
                            voice: v + 1,
                            index,
                            pitch: pitch.to_string(),
                            glyph: *glyph,
                        });
                    }
                }
            }
        }
    }
    marks
}
