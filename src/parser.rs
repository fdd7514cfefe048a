//! # Score Parser
//!
//! Reads a YAML score document into a [`Score`].
//!
//! ## Document Layout
//! ```yaml
//! title: Minuet
//! composer: Anon.
//! key-signature: G
//! time-signature: 3/4
//! parts:
//!   - name: Violin
//!     measures:
//!       - notes: [D5, G4, A4]
//!       - key: D
//!         voices:
//!           - - F5:h
//!             - E5
//!           - - D5:h.
//! ```
//!
//! ## Note Tokens
//! ```text
//! <Letter>[accidental]<octave>[:<duration>][.]     e.g. F#5, Bb3:8, Cn4:h.
//! r[:<duration>][.]                                 e.g. r, r:h
//!
//! accidental  # sharp, ## or x double sharp, b flat, bb double flat, n natural
//! duration    w h q 8 16 32 (default q)
//! ```
//!
//! A note written without an accidental sounds as the key signature in force
//! says, so `F5` in G major is read as F sharp. `n` forces a natural.

use crate::error::EngraveError;
use crate::key::KeySignature;
use crate::pitch::{AccidentalKind, NoteLetter, Pitch};
use crate::score::*;

/// Parse a YAML score document
pub fn parse(source: &str) -> Result<Score, EngraveError> {
    let raw: RawScore =
        serde_yaml::from_str(source).map_err(|e| EngraveError::MetadataError(e.to_string()))?;

    let time_signature = match &raw.time_signature {
        Some(ts) => parse_time_signature(ts)?,
        None => TimeSignature::default(),
    };

    let key_signature = match &raw.key_signature {
        Some(ks) => KeySignature::from_str(ks)
            .ok_or_else(|| EngraveError::MetadataError(format!("Invalid key signature: {}", ks)))?,
        None => KeySignature::default(),
    };

    let metadata = Metadata {
        title: raw.title,
        composer: raw.composer,
        time_signature,
        key_signature,
    };

    if raw.parts.is_empty() {
        return Err(EngraveError::MetadataError(
            "Score must contain at least one part".to_string(),
        ));
    }

    let parts = raw
        .parts
        .into_iter()
        .enumerate()
        .map(|(i, part)| parse_part(part, i, &metadata))
        .collect::<Result<Vec<_>, _>>()?;

    log::debug!(target: "engrave::parser", "parsed {} part(s)", parts.len());

    Ok(Score { metadata, parts })
}

fn parse_part(raw: RawPart, index: usize, metadata: &Metadata) -> Result<Part, EngraveError> {
    let name = raw.name.unwrap_or_else(|| format!("Part {}", index + 1));

    let key_signature = match &raw.key_signature {
        Some(ks) => KeySignature::from_str(ks).ok_or_else(|| {
            EngraveError::MetadataError(format!("Invalid key signature for part '{}': {}", name, ks))
        })?,
        None => metadata.key_signature,
    };

    let clef = match &raw.clef {
        Some(c) => Clef::from_str(c).ok_or_else(|| {
            EngraveError::MetadataError(format!("Invalid clef for part '{}': {}", name, c))
        })?,
        None => Clef::default(),
    };

    // Bare note letters follow whichever key is in force at their measure
    let mut current_key = key_signature;
    let mut measures = Vec::with_capacity(raw.measures.len());

    for (i, raw_measure) in raw.measures.into_iter().enumerate() {
        let number = i + 1;

        let key_change = match &raw_measure.key {
            Some(k) => {
                let key = KeySignature::from_str(k).ok_or_else(|| EngraveError::ParseError {
                    part: name.clone(),
                    measure: number,
                    note: 0,
                    message: format!("Invalid key change: {}", k),
                })?;
                current_key = key;
                Some(key)
            }
            None => None,
        };

        let mut voices = Vec::new();
        for tokens in raw_measure.notes.into_iter().chain(raw_measure.voices) {
            let mut voice = Vec::with_capacity(tokens.len());
            for (j, token) in tokens.iter().enumerate() {
                let element =
                    parse_element(token, &current_key).map_err(|message| EngraveError::ParseError {
                        part: name.clone(),
                        measure: number,
                        note: j + 1,
                        message,
                    })?;
                voice.push(element);
            }
            voices.push(voice);
        }

        measures.push(Measure { voices, key_change });
    }

    Ok(Part {
        name,
        key_signature,
        clef,
        measures,
    })
}

fn parse_time_signature(s: &str) -> Result<TimeSignature, EngraveError> {
    let parts: Vec<&str> = s.split('/').collect();
    if parts.len() != 2 {
        return Err(EngraveError::MetadataError(format!(
            "Invalid time signature: {}",
            s
        )));
    }

    let beats: u8 = parts[0]
        .trim()
        .parse()
        .map_err(|_| EngraveError::MetadataError(format!("Invalid time signature beats: {}", s)))?;
    let beat_type: u8 = parts[1].trim().parse().map_err(|_| {
        EngraveError::MetadataError(format!("Invalid time signature beat type: {}", s))
    })?;

    if beats == 0 || !matches!(beat_type, 1 | 2 | 4 | 8 | 16 | 32) {
        return Err(EngraveError::MetadataError(format!(
            "Invalid time signature: {}",
            s
        )));
    }

    Ok(TimeSignature { beats, beat_type })
}

/// Parse a single note or rest token under `key`
pub fn parse_element(token: &str, key: &KeySignature) -> Result<Element, String> {
    let token = token.trim();

    let (body, dotted) = match token.strip_suffix('.') {
        Some(body) => (body, true),
        None => (token, false),
    };

    let (body, duration) = match body.split_once(':') {
        Some((body, suffix)) => {
            let duration = Duration::from_suffix(suffix)
                .ok_or_else(|| format!("Unknown duration '{}' in '{}'", suffix, token))?;
            (body, duration)
        }
        None => (body, Duration::default()),
    };

    if body == "r" {
        return Ok(Element::Rest { duration, dotted });
    }

    let pitch = parse_pitch(body, key)?;
    Ok(Element::Note(Note::new(pitch, duration, dotted)))
}

/// Parse a pitch like `F#5`, `Bbb-1` or `En4`.
/// Without an explicit accidental the key signature decides.
pub fn parse_pitch(s: &str, key: &KeySignature) -> Result<Pitch, String> {
    let mut chars = s.chars();
    let letter = match chars.next() {
        Some(c) => NoteLetter::from_char(c).ok_or_else(|| format!("Unknown note letter '{}'", c))?,
        None => return Err("Empty note".to_string()),
    };

    let rest = chars.as_str();
    let (accidental, octave) = if let Some(r) = rest.strip_prefix("##") {
        (Some(AccidentalKind::DoubleSharp), r)
    } else if let Some(r) = rest.strip_prefix('x') {
        (Some(AccidentalKind::DoubleSharp), r)
    } else if let Some(r) = rest.strip_prefix("bb") {
        (Some(AccidentalKind::DoubleFlat), r)
    } else if let Some(r) = rest.strip_prefix('#') {
        (Some(AccidentalKind::Sharp), r)
    } else if let Some(r) = rest.strip_prefix('b') {
        (Some(AccidentalKind::Flat), r)
    } else if let Some(r) = rest.strip_prefix('n') {
        (Some(AccidentalKind::Natural), r)
    } else {
        (None, rest)
    };

    let octave: i8 = octave
        .parse()
        .map_err(|_| format!("Invalid octave '{}' in '{}'", octave, s))?;

    let accidental = accidental.unwrap_or_else(|| key.accidental_for(letter));
    Ok(Pitch::new(letter, i32::from(octave), accidental))
}
