//! # Accidental Tracking
//!
//! Decides, note by note, whether an accidental glyph has to be drawn.
//!
//! ## Engraving Rules
//! - An accidental applies to its staff position (letter + octave) for the
//!   rest of the measure it appears in.
//! - Every measure starts over from the key signature.
//! - When a pitch comes back to its key-signature value after having been
//!   altered in an earlier measure, a courtesy accidental is drawn once.
//!
//! ## State
//! ```text
//! key_signature_alterations   PitchKey -> half tones   rebuilt on key change
//! measure_alterations         PitchKey -> half tones   reset every measure
//! dangling                    {PitchKey}               cleared on key change
//! ```
//!
//! `dangling` holds the staff positions that still owe a courtesy
//! accidental. It survives measure boundaries, which is what makes courtesy
//! accidentals possible.
//!
//! ## Call Order
//! 1. [`AccidentalTracker::set_active_key_signature`] whenever the key changes
//! 2. [`AccidentalTracker::check_accidental`] for every note in score order
//! 3. [`AccidentalTracker::end_of_measure`] after the last note of a measure
//!
//! One tracker belongs to one part. Parts with their own key signatures
//! must not share a tracker.

use crate::key::KeySignature;
use crate::pitch::{Pitch, PitchKey, MAX_OCTAVE, MIN_OCTAVE};
use std::collections::{HashMap, HashSet};

/// Receives the accidental glyphs the tracker decides to draw
pub trait AccidentalSink<N> {
    fn attach_accidental(&mut self, note: &mut N, pitch: &Pitch);
}

impl<N, F> AccidentalSink<N> for F
where
    F: FnMut(&mut N, &Pitch),
{
    fn attach_accidental(&mut self, note: &mut N, pitch: &Pitch) {
        self(note, pitch)
    }
}

/// Accidental state for one part
#[derive(Debug, Clone, Default)]
pub struct AccidentalTracker {
    active_key: Option<KeySignature>,
    key_signature_alterations: HashMap<PitchKey, i32>,
    measure_alterations: HashMap<PitchKey, i32>,
    dangling: HashSet<PitchKey>,
}

impl AccidentalTracker {
    /// Create a tracker with no key signature alterations (C major)
    pub fn new() -> Self {
        Self::default()
    }

    /// Key signature currently in force, if one has been set
    pub fn active_key_signature(&self) -> Option<&KeySignature> {
        self.active_key.as_ref()
    }

    /// Switch to a new key signature.
    ///
    /// Rebuilds the key signature alterations for every covered octave,
    /// drops all outstanding courtesy obligations and starts a fresh measure.
    pub fn set_active_key_signature(&mut self, key: KeySignature) {
        let half_tones = key.polarity().half_tones();

        self.key_signature_alterations.clear();
        self.dangling.clear();
        for octave in MIN_OCTAVE..=MAX_OCTAVE {
            for letter in key.altered_letters() {
                self.key_signature_alterations
                    .insert(letter.ordinal() + octave * 12, half_tones);
            }
        }
        self.active_key = Some(key);

        log::debug!(
            target: "engrave::accidentals",
            "key signature set to {} fifths ({} altered letters)",
            key.fifths,
            key.altered_letters().len()
        );

        self.end_of_measure();
    }

    /// Forget everything altered within the measure just finished.
    /// Courtesy obligations are kept.
    pub fn end_of_measure(&mut self) {
        self.measure_alterations = self.key_signature_alterations.clone();
    }

    /// Check one note and hand it to `sink` if it needs an accidental glyph.
    ///
    /// `pitch` is `None` for rests and other unpitched placeholders.
    pub fn check_accidental<N, S>(&mut self, sink: &mut S, note: &mut N, pitch: Option<&Pitch>)
    where
        S: AccidentalSink<N>,
    {
        let Some(pitch) = pitch else {
            return;
        };

        let key = pitch.key();
        let value = pitch.accidental_half_tones();
        let dangling = self.dangling.contains(&key);

        if let Some(&effective) = self.measure_alterations.get(&key) {
            // Key signature position, or already altered in this measure
            if value == effective && !self.owes_courtesy(key) {
                return;
            }
            if dangling {
                self.dangling.remove(&key);
            }
            let expected = self
                .key_signature_alterations
                .get(&key)
                .copied()
                .unwrap_or(0);
            if value != expected {
                self.dangling.insert(key);
                self.measure_alterations.insert(key, value);
            } else {
                self.measure_alterations.remove(&key);
            }
            self.emit(sink, note, pitch);
        } else if pitch.accidental.is_alteration() {
            self.dangling.insert(key);
            self.measure_alterations.insert(key, value);
            self.emit(sink, note, pitch);
        } else if dangling {
            // Silently back to natural after an earlier alteration
            self.dangling.remove(&key);
            self.emit(sink, note, pitch);
        }
    }

    /// Alteration the key signature applies at `key`, if any
    pub fn key_signature_alteration(&self, key: PitchKey) -> Option<i32> {
        self.key_signature_alterations.get(&key).copied()
    }

    /// Alteration currently in effect at `key` within this measure, if any
    pub fn measure_alteration(&self, key: PitchKey) -> Option<i32> {
        self.measure_alterations.get(&key).copied()
    }

    /// Whether `key` still owes a courtesy accidental
    pub fn is_dangling(&self, key: PitchKey) -> bool {
        self.dangling.contains(&key)
    }

    /// Number of pitches still owing a courtesy accidental
    pub fn dangling_count(&self) -> usize {
        self.dangling.len()
    }

    /// A courtesy accidental is owed at `key` when it was left altered in an
    /// earlier measure and the current measure has not altered it yet.
    /// An alteration made in this measure is still visible on the staff.
    fn owes_courtesy(&self, key: PitchKey) -> bool {
        self.dangling.contains(&key)
            && self.measure_alterations.get(&key) == self.key_signature_alterations.get(&key)
    }

    fn emit<N, S>(&self, sink: &mut S, note: &mut N, pitch: &Pitch)
    where
        S: AccidentalSink<N>,
    {
        log::trace!(target: "engrave::accidentals", "accidental for {}", pitch);
        sink.attach_accidental(note, pitch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::{AccidentalKind, NoteLetter};

    /// Glyphs drawn, in order, as (pitch, note id)
    #[derive(Default)]
    struct Recorder {
        glyphs: Vec<(Pitch, usize)>,
    }

    impl AccidentalSink<usize> for Recorder {
        fn attach_accidental(&mut self, note: &mut usize, pitch: &Pitch) {
            self.glyphs.push((*pitch, *note));
        }
    }

    fn pitch(letter: NoteLetter, octave: i32, accidental: AccidentalKind) -> Pitch {
        Pitch::new(letter, octave, accidental)
    }

    /// Check one pitch and report whether a glyph was drawn
    fn check(tracker: &mut AccidentalTracker, p: Pitch) -> bool {
        let mut recorder = Recorder::default();
        tracker.check_accidental(&mut recorder, &mut 0usize, Some(&p));
        !recorder.glyphs.is_empty()
    }

    fn key(s: &str) -> KeySignature {
        KeySignature::from_str(s).unwrap()
    }

    fn measure_matches_key_signature(tracker: &AccidentalTracker) -> bool {
        tracker.measure_alterations == tracker.key_signature_alterations
    }

    #[test]
    fn test_rest_is_noop() {
        let mut tracker = AccidentalTracker::new();
        let mut recorder = Recorder::default();
        tracker.check_accidental(&mut recorder, &mut 7usize, None);
        assert!(recorder.glyphs.is_empty());
        assert_eq!(tracker.dangling_count(), 0);
    }

    #[test]
    fn test_sink_receives_note_and_pitch() {
        let mut tracker = AccidentalTracker::new();
        let mut recorder = Recorder::default();
        let p = pitch(NoteLetter::C, 4, AccidentalKind::Sharp);
        tracker.check_accidental(&mut recorder, &mut 3usize, Some(&p));
        assert_eq!(recorder.glyphs, vec![(p, 3)]);
    }

    #[test]
    fn test_closure_sink() {
        let mut tracker = AccidentalTracker::new();
        let mut marked = Vec::new();
        let mut sink = |note: &mut &str, p: &Pitch| marked.push(format!("{}:{}", note, p));
        let p = pitch(NoteLetter::B, 4, AccidentalKind::Flat);
        tracker.check_accidental(&mut sink, &mut "n1", Some(&p));
        assert_eq!(marked, vec!["n1:Bb4".to_string()]);
    }

    #[test]
    fn test_untouched_keys_never_emit() {
        let mut tracker = AccidentalTracker::new();
        tracker.set_active_key_signature(key("D"));

        // D major leaves E, G, A, B and D unaltered
        for octave in [MIN_OCTAVE, 0, 4, MAX_OCTAVE] {
            for letter in [NoteLetter::D, NoteLetter::E, NoteLetter::G, NoteLetter::A, NoteLetter::B] {
                assert!(!check(&mut tracker, pitch(letter, octave, AccidentalKind::None)));
                assert!(!check(&mut tracker, pitch(letter, octave, AccidentalKind::Natural)));
            }
            tracker.end_of_measure();
        }
        assert_eq!(tracker.dangling_count(), 0);
    }

    #[test]
    fn test_key_signature_notes_need_no_glyph() {
        let mut tracker = AccidentalTracker::new();
        tracker.set_active_key_signature(key("Bb"));
        assert!(!check(&mut tracker, pitch(NoteLetter::B, 3, AccidentalKind::Flat)));
        assert!(!check(&mut tracker, pitch(NoteLetter::E, 5, AccidentalKind::Flat)));
        assert_eq!(tracker.dangling_count(), 0);
    }

    #[test]
    fn test_repeat_within_measure_is_idempotent() {
        let mut tracker = AccidentalTracker::new();
        tracker.set_active_key_signature(key("C"));
        let g_sharp = pitch(NoteLetter::G, 4, AccidentalKind::Sharp);
        assert!(check(&mut tracker, g_sharp));
        assert!(!check(&mut tracker, g_sharp));
        assert!(!check(&mut tracker, g_sharp));
    }

    #[test]
    fn test_end_of_measure_restores_key_signature() {
        let mut tracker = AccidentalTracker::new();
        tracker.set_active_key_signature(key("A"));
        assert!(measure_matches_key_signature(&tracker));

        check(&mut tracker, pitch(NoteLetter::F, 4, AccidentalKind::Natural));
        check(&mut tracker, pitch(NoteLetter::D, 5, AccidentalKind::Sharp));
        check(&mut tracker, pitch(NoteLetter::B, 2, AccidentalKind::Flat));
        assert!(!measure_matches_key_signature(&tracker));

        tracker.end_of_measure();
        assert!(measure_matches_key_signature(&tracker));
        // obligations survive the barline
        assert_eq!(tracker.dangling_count(), 3);
    }

    #[test]
    fn test_key_change_clears_dangling() {
        let mut tracker = AccidentalTracker::new();
        tracker.set_active_key_signature(key("C"));
        check(&mut tracker, pitch(NoteLetter::F, 5, AccidentalKind::Sharp));
        check(&mut tracker, pitch(NoteLetter::C, 4, AccidentalKind::Sharp));
        assert_eq!(tracker.dangling_count(), 2);

        tracker.set_active_key_signature(key("Eb"));
        assert_eq!(tracker.dangling_count(), 0);
        assert!(measure_matches_key_signature(&tracker));
        assert_eq!(tracker.active_key_signature(), Some(&key("Eb")));
    }

    #[test]
    fn test_key_signature_map_covers_every_octave() {
        let mut tracker = AccidentalTracker::new();
        tracker.set_active_key_signature(key("G"));
        let octaves = (MAX_OCTAVE - MIN_OCTAVE + 1) as usize;
        assert_eq!(tracker.key_signature_alterations.len(), octaves);
        for octave in MIN_OCTAVE..=MAX_OCTAVE {
            let f = pitch(NoteLetter::F, octave, AccidentalKind::None).key();
            assert_eq!(tracker.key_signature_alteration(f), Some(1));
        }

        tracker.set_active_key_signature(key("Ab"));
        assert_eq!(tracker.key_signature_alterations.len(), 4 * octaves);
        let f = pitch(NoteLetter::F, 4, AccidentalKind::None).key();
        assert_eq!(tracker.key_signature_alteration(f), None);
        let d = pitch(NoteLetter::D, 4, AccidentalKind::None).key();
        assert_eq!(tracker.key_signature_alteration(d), Some(-1));
    }

    #[test]
    fn test_courtesy_natural_in_c_major() {
        let mut tracker = AccidentalTracker::new();
        tracker.set_active_key_signature(key("C"));
        let f_sharp = pitch(NoteLetter::F, 5, AccidentalKind::Sharp);
        let f_key = f_sharp.key();

        assert!(check(&mut tracker, f_sharp));
        assert!(tracker.is_dangling(f_key));

        assert!(!check(&mut tracker, f_sharp));

        tracker.end_of_measure();
        assert!(check(&mut tracker, pitch(NoteLetter::F, 5, AccidentalKind::None)));
        assert_eq!(tracker.dangling_count(), 0);

        // obligation settled: later plain F5s are quiet
        assert!(!check(&mut tracker, pitch(NoteLetter::F, 5, AccidentalKind::None)));
        tracker.end_of_measure();
        assert!(!check(&mut tracker, pitch(NoteLetter::F, 5, AccidentalKind::None)));
    }

    #[test]
    fn test_natural_against_g_major_then_courtesy_sharp() {
        let mut tracker = AccidentalTracker::new();
        tracker.set_active_key_signature(key("G"));
        let f_key = pitch(NoteLetter::F, 5, AccidentalKind::None).key();
        assert_eq!(tracker.measure_alteration(f_key), Some(1));

        assert!(check(&mut tracker, pitch(NoteLetter::F, 5, AccidentalKind::None)));
        assert!(tracker.is_dangling(f_key));
        assert_eq!(tracker.measure_alteration(f_key), Some(0));

        tracker.end_of_measure();
        assert!(check(&mut tracker, pitch(NoteLetter::F, 5, AccidentalKind::Sharp)));
        assert!(!tracker.is_dangling(f_key));
        assert_eq!(tracker.measure_alteration(f_key), None);
    }

    #[test]
    fn test_repeated_natural_against_key_is_quiet() {
        let mut tracker = AccidentalTracker::new();
        tracker.set_active_key_signature(key("G"));
        let f_natural = pitch(NoteLetter::F, 4, AccidentalKind::Natural);
        assert!(check(&mut tracker, f_natural));
        assert!(!check(&mut tracker, f_natural));
        assert!(tracker.is_dangling(f_natural.key()));

        // a new measure needs the natural again
        tracker.end_of_measure();
        assert!(check(&mut tracker, f_natural));
    }

    #[test]
    fn test_return_to_key_within_measure_draws_glyph() {
        let mut tracker = AccidentalTracker::new();
        tracker.set_active_key_signature(key("F"));
        let b_key = pitch(NoteLetter::B, 4, AccidentalKind::None).key();

        assert!(check(&mut tracker, pitch(NoteLetter::B, 4, AccidentalKind::Natural)));
        assert!(check(&mut tracker, pitch(NoteLetter::B, 4, AccidentalKind::Flat)));
        assert!(!tracker.is_dangling(b_key));
        assert_eq!(tracker.measure_alteration(b_key), None);
    }

    #[test]
    fn test_other_octave_tracked_independently() {
        let mut tracker = AccidentalTracker::new();
        tracker.set_active_key_signature(key("C"));
        assert!(check(&mut tracker, pitch(NoteLetter::C, 4, AccidentalKind::Sharp)));
        assert!(check(&mut tracker, pitch(NoteLetter::C, 5, AccidentalKind::Sharp)));
        assert!(!check(&mut tracker, pitch(NoteLetter::C, 4, AccidentalKind::Sharp)));
    }

    #[test]
    fn test_explicit_natural_first_time_is_quiet() {
        let mut tracker = AccidentalTracker::new();
        tracker.set_active_key_signature(key("C"));
        assert!(!check(&mut tracker, pitch(NoteLetter::E, 4, AccidentalKind::Natural)));
        assert_eq!(tracker.dangling_count(), 0);
    }

    #[test]
    fn test_natural_cancels_in_measure_alteration() {
        let mut tracker = AccidentalTracker::new();
        tracker.set_active_key_signature(key("C"));
        let e_key = pitch(NoteLetter::E, 4, AccidentalKind::None).key();
        assert!(check(&mut tracker, pitch(NoteLetter::E, 4, AccidentalKind::Flat)));
        assert!(check(&mut tracker, pitch(NoteLetter::E, 4, AccidentalKind::Natural)));
        assert!(!tracker.is_dangling(e_key));
        assert_eq!(tracker.measure_alteration(e_key), None);

        tracker.end_of_measure();
        assert!(!check(&mut tracker, pitch(NoteLetter::E, 4, AccidentalKind::None)));
    }

    #[test]
    fn test_sharp_to_double_sharp_in_measure() {
        let mut tracker = AccidentalTracker::new();
        tracker.set_active_key_signature(key("D"));
        let c_key = pitch(NoteLetter::C, 5, AccidentalKind::None).key();
        assert!(!check(&mut tracker, pitch(NoteLetter::C, 5, AccidentalKind::Sharp)));
        assert!(check(&mut tracker, pitch(NoteLetter::C, 5, AccidentalKind::DoubleSharp)));
        assert!(tracker.is_dangling(c_key));
        assert_eq!(tracker.measure_alteration(c_key), Some(2));
        assert!(!check(&mut tracker, pitch(NoteLetter::C, 5, AccidentalKind::DoubleSharp)));
    }

    #[test]
    fn test_alteration_repeated_next_measure_redraws() {
        let mut tracker = AccidentalTracker::new();
        tracker.set_active_key_signature(key("C"));
        let f_sharp = pitch(NoteLetter::F, 4, AccidentalKind::Sharp);
        assert!(check(&mut tracker, f_sharp));
        tracker.end_of_measure();
        assert!(check(&mut tracker, f_sharp));
        assert!(tracker.is_dangling(f_sharp.key()));
        assert_eq!(tracker.dangling_count(), 1);
    }

    #[test]
    fn test_extreme_octaves_behave_like_interior() {
        for octave in [MIN_OCTAVE, MAX_OCTAVE] {
            let mut tracker = AccidentalTracker::new();
            tracker.set_active_key_signature(key("G"));

            assert!(!check(&mut tracker, pitch(NoteLetter::F, octave, AccidentalKind::Sharp)));
            assert!(check(&mut tracker, pitch(NoteLetter::F, octave, AccidentalKind::Natural)));
            tracker.end_of_measure();
            assert!(check(&mut tracker, pitch(NoteLetter::F, octave, AccidentalKind::Sharp)));

            assert!(check(&mut tracker, pitch(NoteLetter::A, octave, AccidentalKind::Flat)));
            tracker.end_of_measure();
            assert!(check(&mut tracker, pitch(NoteLetter::A, octave, AccidentalKind::None)));
            assert_eq!(tracker.dangling_count(), 0);
        }
    }

    #[test]
    fn test_trackers_do_not_share_state() {
        let mut violin = AccidentalTracker::new();
        let mut cello = AccidentalTracker::new();
        violin.set_active_key_signature(key("G"));
        cello.set_active_key_signature(key("C"));

        let f = pitch(NoteLetter::F, 4, AccidentalKind::Sharp);
        assert!(!check(&mut violin, f));
        assert!(check(&mut cello, f));
        assert_eq!(violin.dangling_count(), 0);
        assert_eq!(cello.dangling_count(), 1);
    }
}
