//! Java's "modified UTF-8", the string encoding of NBT.
//!
//! It differs from standard UTF-8 in two ways: `U+0000` is written as the two byte sequence
//! `C0 80`, and characters outside the basic multilingual plane are written as a surrogate pair
//! with each half encoded as its own three byte sequence.

use std::borrow::Cow;

/// Encode a string, borrowing the input when it is already valid modified UTF-8
pub fn encode(text: &str) -> Cow<'_, [u8]> {
    if text.bytes().all(|b| b != 0 && b < 0xF0) {
        return Cow::Borrowed(text.as_bytes());
    }

    let mut out = Vec::with_capacity(text.len() + 8);
    for unit in text.encode_utf16() {
        match unit {
            0x0001..=0x007F => out.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                out.push(0xC0 | (unit >> 6) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                out.push(0xE0 | (unit >> 12) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }
    Cow::Owned(out)
}

/// Decode a byte sequence, returning `None` if it is malformed
///
/// A raw `00` byte is accepted as `U+0000`, as Java's decoder does, even though the encoder never
/// produces one.
pub fn decode(bytes: &[u8]) -> Option<String> {
    if bytes.iter().all(|b| *b < 0x80) {
        return String::from_utf8(bytes.to_vec()).ok();
    }

    let mut units = Vec::with_capacity(bytes.len());
    let mut iter = bytes.iter().copied();
    while let Some(first) = iter.next() {
        let unit = match first {
            0x00..=0x7F => first as u16,
            0xC0..=0xDF => {
                let second = continuation(iter.next())?;
                ((first as u16 & 0x1F) << 6) | second
            }
            0xE0..=0xEF => {
                let second = continuation(iter.next())?;
                let third = continuation(iter.next())?;
                ((first as u16 & 0x0F) << 12) | (second << 6) | third
            }
            _ => return None,
        };
        units.push(unit);
    }

    char::decode_utf16(units)
        .collect::<Result<String, _>>()
        .ok()
}

fn continuation(byte: Option<u8>) -> Option<u16> {
    match byte {
        Some(b) if b & 0xC0 == 0x80 => Some((b & 0x3F) as u16),
        _ => None,
    }
}
