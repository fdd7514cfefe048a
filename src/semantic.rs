//! # Semantic Validation Module
//!
//! Checks a parsed score for problems the parser cannot see.
//!
//! ## Validation Rules
//!
//! ### Part Names
//! - Every part needs a unique name; parts are referred to by name in
//!   errors and in the accidental report.
//!
//! ### Measures
//! - Every part needs at least one measure, and every measure at least one
//!   voice.
//!
//! ### Measure Duration
//! - Each voice of a measure must fill the time signature exactly.
//! - Dotted notes are counted at one and a half times their value.
//!
//! ### Pitch Range
//! - Every pitch octave must lie in `MIN_OCTAVE..=MAX_OCTAVE`, the range the
//!   accidental tracker covers with key signature alterations.
//!
//! ## Entry Point
//! `validate(score: &Score) -> Result<(), EngraveError>`

use crate::error::EngraveError;
use crate::pitch::{MAX_OCTAVE, MIN_OCTAVE};
use crate::score::*;
use std::collections::HashSet;

/// Validate a score before engraving
pub fn validate(score: &Score) -> Result<(), EngraveError> {
    validate_part_names(score)?;
    for part in &score.parts {
        if part.measures.is_empty() {
            return Err(EngraveError::SemanticError {
                part: part.name.clone(),
                measure: 0,
                message: "Part has no measures".to_string(),
            });
        }
        for (i, measure) in part.measures.iter().enumerate() {
            validate_measure(measure, &score.metadata.time_signature, &part.name, i + 1)?;
        }
    }
    Ok(())
}

fn validate_part_names(score: &Score) -> Result<(), EngraveError> {
    let mut seen = HashSet::new();
    for part in &score.parts {
        if !seen.insert(part.name.as_str()) {
            return Err(EngraveError::SemanticError {
                part: part.name.clone(),
                measure: 0,
                message: "Part name is used more than once".to_string(),
            });
        }
    }
    Ok(())
}

/// Validate a single measure
fn validate_measure(
    measure: &Measure,
    time_signature: &TimeSignature,
    part: &str,
    measure_number: usize,
) -> Result<(), EngraveError> {
    if measure.voices.is_empty() {
        return Err(EngraveError::SemanticError {
            part: part.to_string(),
            measure: measure_number,
            message: "Measure has no notes".to_string(),
        });
    }

    let expected = time_signature.measure_fraction();

    for (v, voice) in measure.voices.iter().enumerate() {
        for element in voice {
            if let Some(pitch) = element.pitch() {
                if !(MIN_OCTAVE..=MAX_OCTAVE).contains(&pitch.octave) {
                    return Err(EngraveError::SemanticError {
                        part: part.to_string(),
                        measure: measure_number,
                        message: format!(
                            "{} is outside the supported octave range {}..={}",
                            pitch, MIN_OCTAVE, MAX_OCTAVE
                        ),
                    });
                }
            }
        }

        let total: f64 = voice.iter().map(Element::fraction).sum();

        // Allow some floating point tolerance
        let tolerance = 0.001;
        if (total - expected).abs() > tolerance {
            return Err(EngraveError::SemanticError {
                part: part.to_string(),
                measure: measure_number,
                message: format!(
                    "Voice {} duration mismatch: expected {} beats, got {} beats",
                    v + 1,
                    expected * time_signature.beat_type as f64,
                    total * time_signature.beat_type as f64
                ),
            });
        }
    }

    Ok(())
}
