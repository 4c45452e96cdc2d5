//! Typed signatures drawn with the standard Helvetica font.

use crate::Error;
use lopdf::{Dictionary, Object};

/// Characters of WinAnsiEncoding outside of Latin-1.
const WIN_ANSI_EXTRA: [(char, u8); 27] = [
    ('€', 0x80),
    ('‚', 0x82),
    ('ƒ', 0x83),
    ('„', 0x84),
    ('…', 0x85),
    ('†', 0x86),
    ('‡', 0x87),
    ('ˆ', 0x88),
    ('‰', 0x89),
    ('Š', 0x8A),
    ('‹', 0x8B),
    ('Œ', 0x8C),
    ('Ž', 0x8E),
    ('‘', 0x91),
    ('’', 0x92),
    ('“', 0x93),
    ('”', 0x94),
    ('•', 0x95),
    ('–', 0x96),
    ('—', 0x97),
    ('˜', 0x98),
    ('™', 0x99),
    ('š', 0x9A),
    ('›', 0x9B),
    ('œ', 0x9C),
    ('ž', 0x9E),
    ('Ÿ', 0x9F),
];

/// Font dictionary for the signature text.
/// Helvetica is one of the standard 14 fonts, so nothing has to be embedded.
pub(crate) fn helvetica_font() -> Dictionary {
    use lopdf::Object::Name;
    Dictionary::from_iter(vec![
        ("Type", Name(b"Font".to_vec())),
        ("Subtype", Name(b"Type1".to_vec())),
        ("BaseFont", Name(b"Helvetica".to_vec())),
        ("Encoding", Name(b"WinAnsiEncoding".to_vec())),
    ])
}

/// Encode text for a WinAnsiEncoding font. Line breaks and tabs become spaces.
/// The first character without a WinAnsi code is an `UnencodableText` error.
pub fn encode_win_ansi(text: &str) -> Result<Vec<u8>, Error> {
    text.chars()
        .map(|c| match c {
            '\t' | '\n' | '\r' => Ok(b' '),
            ' '..='~' => Ok(c as u8),
            '\u{A0}'..='\u{FF}' => Ok(c as u32 as u8),
            _ => WIN_ANSI_EXTRA
                .iter()
                .find(|(extra, _)| *extra == c)
                .map(|(_, code)| *code)
                .ok_or(Error::UnencodableText(c)),
        })
        .collect()
}

pub fn decode_win_ansi(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| match byte {
            0x80..=0x9F => WIN_ANSI_EXTRA
                .iter()
                .find(|(_, code)| code == byte)
                .map(|(extra, _)| *extra)
                .unwrap_or('?'),
            _ => char::from(*byte),
        })
        .collect()
}

/// Strings shown by `Tj`, `'`, `"` and `TJ` operands.
pub(crate) fn shown_strings(operator: &str, operands: &[Object]) -> Vec<Vec<u8>> {
    let strings = |objects: &[Object]| {
        objects
            .iter()
            .filter_map(|obj| match obj {
                Object::String(bytes, _) => Some(bytes.clone()),
                _ => None,
            })
            .collect::<Vec<_>>()
    };
    match operator {
        "Tj" | "'" | "\"" => operands
            .last()
            .map(|obj| strings(std::slice::from_ref(obj)))
            .unwrap_or_default(),
        "TJ" => match operands.first() {
            Some(Object::Array(items)) => vec![strings(items).concat()],
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}
