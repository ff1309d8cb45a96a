//! # Code Page 437 Encoding
//!
//! Receipt text goes out as one byte per character using the printer's
//! PC437 table (`ESC t 0`). Printable ASCII passes through unchanged; the
//! upper half maps through [`UPPER_HALF`].
//!
//! Two entry points:
//! - [`sanitize`] runs on untrusted input *before* it becomes a receipt
//!   line: typographic characters are transliterated, control characters
//!   and anything else without a PC437 glyph are dropped.
//! - [`encode`] runs at codegen time and expects already-sanitized text. A
//!   non-representable character here is a bug upstream: debug builds
//!   panic, release builds print `?` and log a warning.

/// PC437 bytes 0x80–0xFF, indexed by `byte - 0x80`.
const UPPER_HALF: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å', //
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ', //
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»', //
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐', //
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧', //
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀', //
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩', //
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{00A0}',
];

/// Map a character to its PC437 byte, if it has one.
///
/// Control characters are deliberately unmapped: a stray `ESC` inside a
/// customer note would otherwise be executed as a printer command.
pub fn to_byte(ch: char) -> Option<u8> {
    match ch {
        ' '..='~' => Some(ch as u8),
        _ => UPPER_HALF
            .iter()
            .position(|&c| c == ch)
            .map(|i| 0x80 + i as u8),
    }
}

/// Whether `ch` can be printed as a single PC437 byte.
#[inline]
pub fn is_representable(ch: char) -> bool {
    to_byte(ch).is_some()
}

/// ASCII stand-ins for characters that commonly show up in POS data
/// (copied from phones and spreadsheets) but have no PC437 glyph.
fn transliterate(ch: char) -> Option<&'static str> {
    let s = match ch {
        '\t' => " ",
        '‘' | '’' | '‚' | '′' | '`' => "'",
        '“' | '”' | '„' | '″' => "\"",
        '–' | '—' | '−' | '‐' => "-",
        '…' => "...",
        '•' => "*",
        '€' => "EUR",
        '×' => "x",
        'À' | 'Á' | 'Â' | 'Ã' => "A",
        'ã' => "a",
        'È' | 'Ê' | 'Ë' => "E",
        'Ì' | 'Í' | 'Î' | 'Ï' => "I",
        'Ò' | 'Ó' | 'Ô' | 'Õ' => "O",
        'õ' => "o",
        'Ù' | 'Ú' | 'Û' => "U",
        'ý' => "y",
        'Ý' => "Y",
        _ => return None,
    };
    Some(s)
}

/// Make arbitrary input text safe for [`encode`].
///
/// Transliterates what it can and drops the rest; dropped characters are
/// logged once per call.
pub fn sanitize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut dropped = 0usize;
    for ch in s.chars() {
        if is_representable(ch) {
            out.push(ch);
        } else if let Some(rep) = transliterate(ch) {
            out.push_str(rep);
        } else {
            dropped += 1;
        }
    }
    if dropped > 0 {
        tracing::warn!(dropped, input = %s, "dropped characters without a PC437 glyph");
    }
    out
}

/// Encode sanitized text as PC437 bytes.
pub fn encode(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    for ch in s.chars() {
        match to_byte(ch) {
            Some(byte) => out.push(byte),
            None => {
                debug_assert!(
                    false,
                    "cp437: non-representable character {:?} (U+{:04X}) reached the encoder",
                    ch, ch as u32
                );
                tracing::warn!(
                    "cp437: unmapped character '{}' (U+{:04X}), replacing with '?'",
                    ch,
                    ch as u32
                );
                out.push(b'?');
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passthrough() {
        assert_eq!(encode("Cuci Kering x2"), b"Cuci Kering x2");
    }

    #[test]
    fn test_empty_string() {
        assert_eq!(encode(""), b"");
    }

    #[test]
    fn test_accented_latin() {
        assert_eq!(encode("é"), vec![0x82]);
        assert_eq!(encode("ñ"), vec![0xA4]);
        assert_eq!(encode("Ñ"), vec![0xA5]);
        assert_eq!(encode("ü"), vec![0x81]);
    }

    #[test]
    fn test_table_edges() {
        assert_eq!(to_byte('Ç'), Some(0x80));
        assert_eq!(to_byte('■'), Some(0xFE));
        assert_eq!(to_byte('\u{00A0}'), Some(0xFF));
        assert_eq!(to_byte('─'), Some(0xC4));
    }

    #[test]
    fn test_control_chars_not_representable() {
        assert!(!is_representable('\x1B'));
        assert!(!is_representable('\n'));
        assert!(!is_representable('\x7F'));
    }

    #[test]
    fn test_sanitize_transliterates() {
        assert_eq!(sanitize("“Bu Ani’s” – express…"), "\"Bu Ani's\" - express...");
        assert_eq!(sanitize("Jas\tHitam"), "Jas Hitam");
    }

    #[test]
    fn test_sanitize_drops_unmappable() {
        assert_eq!(sanitize("Siti 😀"), "Siti ");
        assert_eq!(sanitize("a\x1Bb"), "ab");
        assert_eq!(sanitize("洗衣"), "");
    }

    #[test]
    fn test_sanitized_text_always_encodes() {
        let raw = "Pelanggan: Zoë “VIP” ★ 洗 – €5";
        let clean = sanitize(raw);
        assert!(clean.chars().all(is_representable));
        assert_eq!(encode(&clean).len(), clean.chars().count());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "non-representable")]
    fn test_encode_panics_in_debug_on_unmapped() {
        encode("★");
    }
}
