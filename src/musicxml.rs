use crate::key::{KeySignature, Mode};
use crate::score::*;

/// Divisions per quarter note; 16 keeps dotted 32nds integral
const DIVISIONS: u32 = 16;

/// Convert a Score to MusicXML format
///
/// Notes carry `<alter>` for the pitch they sound at and an `<accidental>`
/// element only when the engraving pass decided a glyph is needed.
pub fn to_musicxml(score: &Score) -> String {
    let mut xml = String::new();

    // XML declaration and doctype
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(r#"<!DOCTYPE score-partwise PUBLIC "-//Recordare//DTD MusicXML 4.0 Partwise//EN" "http://www.musicxml.org/dtds/partwise.dtd">"#);
    xml.push('\n');

    xml.push_str(r#"<score-partwise version="4.0">"#);
    xml.push('\n');

    if let Some(title) = &score.metadata.title {
        xml.push_str("  <work>\n");
        xml.push_str(&format!("    <work-title>{}</work-title>\n", escape_xml(title)));
        xml.push_str("  </work>\n");
    }

    if let Some(composer) = &score.metadata.composer {
        xml.push_str("  <identification>\n");
        xml.push_str(&format!(
            "    <creator type=\"composer\">{}</creator>\n",
            escape_xml(composer)
        ));
        xml.push_str("  </identification>\n");
    }

    xml.push_str("  <part-list>\n");
    for (i, part) in score.parts.iter().enumerate() {
        xml.push_str(&format!("    <score-part id=\"P{}\">\n", i + 1));
        xml.push_str(&format!("      <part-name>{}</part-name>\n", escape_xml(&part.name)));
        xml.push_str("    </score-part>\n");
    }
    xml.push_str("  </part-list>\n");

    for (i, part) in score.parts.iter().enumerate() {
        xml.push_str(&format!("  <part id=\"P{}\">\n", i + 1));
        for (m, measure) in part.measures.iter().enumerate() {
            xml.push_str(&measure_to_xml(
                measure,
                m + 1,
                part,
                &score.metadata.time_signature,
            ));
        }
        xml.push_str("  </part>\n");
    }

    xml.push_str("</score-partwise>\n");

    xml
}

fn measure_to_xml(
    measure: &Measure,
    number: usize,
    part: &Part,
    time_signature: &TimeSignature,
) -> String {
    let mut xml = String::new();

    xml.push_str(&format!("    <measure number=\"{}\">\n", number));

    if number == 1 {
        // Full attributes on the first measure
        let key = measure.key_change.unwrap_or(part.key_signature);
        xml.push_str("      <attributes>\n");
        xml.push_str(&format!("        <divisions>{}</divisions>\n", DIVISIONS));
        xml.push_str(&key_to_xml(&key));
        xml.push_str("        <time>\n");
        xml.push_str(&format!("          <beats>{}</beats>\n", time_signature.beats));
        xml.push_str(&format!(
            "          <beat-type>{}</beat-type>\n",
            time_signature.beat_type
        ));
        xml.push_str("        </time>\n");
        xml.push_str("        <clef>\n");
        let (sign, line) = match part.clef {
            Clef::Treble => ("G", 2),
            Clef::Bass => ("F", 4),
        };
        xml.push_str(&format!("          <sign>{}</sign>\n", sign));
        xml.push_str(&format!("          <line>{}</line>\n", line));
        xml.push_str("        </clef>\n");
        xml.push_str("      </attributes>\n");
    } else if let Some(key) = &measure.key_change {
        xml.push_str("      <attributes>\n");
        xml.push_str(&key_to_xml(key));
        xml.push_str("      </attributes>\n");
    }

    let mut previous_voice_length = 0;
    for (v, voice) in measure.voices.iter().enumerate() {
        if v > 0 {
            xml.push_str("      <backup>\n");
            xml.push_str(&format!("        <duration>{}</duration>\n", previous_voice_length));
            xml.push_str("      </backup>\n");
        }
        previous_voice_length = 0;
        for element in voice {
            xml.push_str(&element_to_xml(element, v + 1));
            previous_voice_length += element_divisions(element);
        }
    }

    xml.push_str("    </measure>\n");
    xml
}

fn key_to_xml(key: &KeySignature) -> String {
    let mut xml = String::new();
    xml.push_str("        <key>\n");
    xml.push_str(&format!("          <fifths>{}</fifths>\n", key.fifths));
    if key.mode == Mode::Minor {
        xml.push_str("          <mode>minor</mode>\n");
    }
    xml.push_str("        </key>\n");
    xml
}

fn element_to_xml(element: &Element, voice: usize) -> String {
    match element {
        Element::Note(note) => note_to_xml(note, voice),
        Element::Rest { duration, dotted } => rest_to_xml(*duration, *dotted, voice),
    }
}

fn note_to_xml(note: &Note, voice: usize) -> String {
    let mut xml = String::new();

    xml.push_str("      <note>\n");

    xml.push_str("        <pitch>\n");
    xml.push_str(&format!("          <step>{}</step>\n", note.pitch.letter.as_str()));
    let alter = note.pitch.accidental_half_tones();
    if alter != 0 {
        xml.push_str(&format!("          <alter>{}</alter>\n", alter));
    }
    xml.push_str(&format!("          <octave>{}</octave>\n", note.pitch.octave));
    xml.push_str("        </pitch>\n");

    xml.push_str(&format!(
        "        <duration>{}</duration>\n",
        duration_to_divisions(note.duration, note.dotted)
    ));
    xml.push_str(&format!("        <voice>{}</voice>\n", voice));
    xml.push_str(&format!("        <type>{}</type>\n", note.duration.musicxml_type()));

    if note.dotted {
        xml.push_str("        <dot/>\n");
    }

    if let Some(accidental) = note.display_accidental {
        xml.push_str(&format!(
            "        <accidental>{}</accidental>\n",
            accidental.musicxml_name()
        ));
    }

    xml.push_str("      </note>\n");
    xml
}

fn rest_to_xml(duration: Duration, dotted: bool, voice: usize) -> String {
    let mut xml = String::new();

    xml.push_str("      <note>\n");
    xml.push_str("        <rest/>\n");
    xml.push_str(&format!(
        "        <duration>{}</duration>\n",
        duration_to_divisions(duration, dotted)
    ));
    xml.push_str(&format!("        <voice>{}</voice>\n", voice));
    xml.push_str(&format!("        <type>{}</type>\n", duration.musicxml_type()));

    if dotted {
        xml.push_str("        <dot/>\n");
    }

    xml.push_str("      </note>\n");
    xml
}

fn element_divisions(element: &Element) -> u32 {
    match element {
        Element::Note(note) => duration_to_divisions(note.duration, note.dotted),
        Element::Rest { duration, dotted } => duration_to_divisions(*duration, *dotted),
    }
}

/// Convert duration to MusicXML divisions
fn duration_to_divisions(duration: Duration, dotted: bool) -> u32 {
    let base = match duration {
        Duration::Whole => DIVISIONS * 4,
        Duration::Half => DIVISIONS * 2,
        Duration::Quarter => DIVISIONS,
        Duration::Eighth => DIVISIONS / 2,
        Duration::Sixteenth => DIVISIONS / 4,
        Duration::ThirtySecond => DIVISIONS / 8,
    };

    if dotted {
        base + (base / 2)
    } else {
        base
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
