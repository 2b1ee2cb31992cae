//! Unicode case folding for case-insensitive matching.
//!
//! Folding maps every character to a canonical representative of its case
//! orbit: ASCII letters fold to lowercase, everything else folds through
//! [`char::to_lowercase`] when that yields exactly one character of the
//! same encoded length, and stays put otherwise. Orbits whose members
//! differ in encoded length cannot be compared by folded literals at all;
//! those characters are enumerated in [`UNSAFE_FOLD_ORBITS`] and the
//! case-insensitive constructors compile them to character sets instead.
//!
//! Consequences of this choice: the Kelvin sign, the Angstrom sign, `ſ`
//! and `İ` fold to themselves, so `ti("k")` does not match `"K"` (Kelvin)
//! and `ti("İ")` matches only the precomposed `"İ"`.

use phf::{Map, phf_map};

/// Characters whose simple case fold changes the UTF-8 encoded length,
/// mapped to every member of their case orbit.
pub(crate) static UNSAFE_FOLD_ORBITS: Map<char, &'static str> = phf_map! {
    // Cyrillic rounded/alternate letterforms vs their modern counterparts.
    '\u{1C80}' => "\u{1C80}\u{0412}\u{0432}", // ᲀ В в
    '\u{0412}' => "\u{1C80}\u{0412}\u{0432}",
    '\u{0432}' => "\u{1C80}\u{0412}\u{0432}",
    '\u{1C81}' => "\u{1C81}\u{0414}\u{0434}", // ᲁ Д д
    '\u{0414}' => "\u{1C81}\u{0414}\u{0434}",
    '\u{0434}' => "\u{1C81}\u{0414}\u{0434}",
    '\u{1C82}' => "\u{1C82}\u{041E}\u{043E}", // ᲂ О о
    '\u{041E}' => "\u{1C82}\u{041E}\u{043E}",
    '\u{043E}' => "\u{1C82}\u{041E}\u{043E}",
    '\u{1C83}' => "\u{1C83}\u{0421}\u{0441}", // ᲃ С с
    '\u{0421}' => "\u{1C83}\u{0421}\u{0441}",
    '\u{0441}' => "\u{1C83}\u{0421}\u{0441}",
    '\u{1C84}' => "\u{1C84}\u{1C85}\u{0422}\u{0442}", // ᲄ ᲅ Т т
    '\u{1C85}' => "\u{1C84}\u{1C85}\u{0422}\u{0442}",
    '\u{0422}' => "\u{1C84}\u{1C85}\u{0422}\u{0442}",
    '\u{0442}' => "\u{1C84}\u{1C85}\u{0422}\u{0442}",
    '\u{1C86}' => "\u{1C86}\u{042A}\u{044A}", // ᲆ Ъ ъ
    '\u{042A}' => "\u{1C86}\u{042A}\u{044A}",
    '\u{044A}' => "\u{1C86}\u{042A}\u{044A}",
    '\u{1C87}' => "\u{1C87}\u{0462}\u{0463}", // ᲇ Ѣ ѣ
    '\u{0462}' => "\u{1C87}\u{0462}\u{0463}",
    '\u{0463}' => "\u{1C87}\u{0462}\u{0463}",
    // German sharp s.
    '\u{1E9E}' => "\u{1E9E}\u{00DF}", // ẞ ß
    '\u{00DF}' => "\u{1E9E}\u{00DF}",
    // Greek iota orbit: combining ypogegrammeni, capital iota, small iota,
    // prosgegrammeni.
    '\u{0345}' => "\u{0345}\u{0399}\u{03B9}\u{1FBE}",
    '\u{0399}' => "\u{0345}\u{0399}\u{03B9}\u{1FBE}",
    '\u{03B9}' => "\u{0345}\u{0399}\u{03B9}\u{1FBE}",
    '\u{1FBE}' => "\u{0345}\u{0399}\u{03B9}\u{1FBE}",
    // Ohm sign vs Greek omega.
    '\u{2126}' => "\u{2126}\u{03A9}\u{03C9}", // Ω Ω ω
    '\u{03A9}' => "\u{2126}\u{03A9}\u{03C9}",
    '\u{03C9}' => "\u{2126}\u{03A9}\u{03C9}",
    // Angstrom sign vs A with ring.
    '\u{212B}' => "\u{212B}\u{00C5}\u{00E5}", // Å Å å
    '\u{00C5}' => "\u{212B}\u{00C5}\u{00E5}",
    '\u{00E5}' => "\u{212B}\u{00C5}\u{00E5}",
    // Latin capitals in the 2C60/A720 blocks whose lowercase forms live in
    // the two-byte IPA range.
    '\u{2C62}' => "\u{2C62}\u{026B}", // Ɫ ɫ
    '\u{026B}' => "\u{2C62}\u{026B}",
    '\u{2C64}' => "\u{2C64}\u{027D}", // Ɽ ɽ
    '\u{027D}' => "\u{2C64}\u{027D}",
    '\u{2C65}' => "\u{2C65}\u{023A}", // ⱥ Ⱥ
    '\u{023A}' => "\u{2C65}\u{023A}",
    '\u{2C66}' => "\u{2C66}\u{023E}", // ⱦ Ⱦ
    '\u{023E}' => "\u{2C66}\u{023E}",
    '\u{2C6D}' => "\u{2C6D}\u{0251}", // Ɑ ɑ
    '\u{0251}' => "\u{2C6D}\u{0251}",
    '\u{2C6E}' => "\u{2C6E}\u{0271}", // Ɱ ɱ
    '\u{0271}' => "\u{2C6E}\u{0271}",
    '\u{2C6F}' => "\u{2C6F}\u{0250}", // Ɐ ɐ
    '\u{0250}' => "\u{2C6F}\u{0250}",
    '\u{2C70}' => "\u{2C70}\u{0252}", // Ɒ ɒ
    '\u{0252}' => "\u{2C70}\u{0252}",
    '\u{2C7E}' => "\u{2C7E}\u{023F}", // Ȿ ȿ
    '\u{023F}' => "\u{2C7E}\u{023F}",
    '\u{2C7F}' => "\u{2C7F}\u{0240}", // Ɀ ɀ
    '\u{0240}' => "\u{2C7F}\u{0240}",
    '\u{A78D}' => "\u{A78D}\u{0265}", // Ɥ ɥ
    '\u{0265}' => "\u{A78D}\u{0265}",
    '\u{A7AA}' => "\u{A7AA}\u{0266}", // Ɦ ɦ
    '\u{0266}' => "\u{A7AA}\u{0266}",
    '\u{A7AB}' => "\u{A7AB}\u{025C}", // Ɜ ɜ
    '\u{025C}' => "\u{A7AB}\u{025C}",
    '\u{A7AC}' => "\u{A7AC}\u{0261}", // Ɡ ɡ
    '\u{0261}' => "\u{A7AC}\u{0261}",
    '\u{A7AD}' => "\u{A7AD}\u{026C}", // Ɬ ɬ
    '\u{026C}' => "\u{A7AD}\u{026C}",
    '\u{A7AE}' => "\u{A7AE}\u{026A}", // Ɪ ɪ
    '\u{026A}' => "\u{A7AE}\u{026A}",
    '\u{A7B0}' => "\u{A7B0}\u{029E}", // Ʞ ʞ
    '\u{029E}' => "\u{A7B0}\u{029E}",
    '\u{A7B1}' => "\u{A7B1}\u{0287}", // Ʇ ʇ
    '\u{0287}' => "\u{A7B1}\u{0287}",
    '\u{A7B2}' => "\u{A7B2}\u{029D}", // Ʝ ʝ
    '\u{029D}' => "\u{A7B2}\u{029D}",
};

// Orbits with several lowercase members, where `to_lowercase` alone does
// not unify them.
static FOLD_ONE: Map<char, char> = phf_map! {
    '\u{03C2}' => '\u{03C3}', // final sigma ς => σ
    '\u{00B5}' => '\u{03BC}', // micro sign µ => μ
};

/// Fold one character to its canonical case representative.
pub(crate) fn fold_rune(c: char) -> char {
    if c.is_ascii() {
        return c.to_ascii_lowercase();
    }
    if let Some(&f) = FOLD_ONE.get(&c) {
        return f;
    }
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) if l.len_utf8() == c.len_utf8() => l,
        _ => c,
    }
}

/// Fold a valid string character by character.
pub(crate) fn fold_str(s: &str) -> String {
    s.chars().map(fold_rune).collect()
}

/// Fold a byte slice that may start or end in the middle of a UTF-8
/// sequence. Undecodable bytes are copied through unchanged, so folding
/// never changes the length of a partial sequence.
pub(crate) fn fold_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut rest = bytes;
    while !rest.is_empty() {
        match std::str::from_utf8(rest) {
            Ok(s) => {
                push_folded(&mut out, s);
                break;
            }
            Err(e) => {
                let (valid, after) = rest.split_at(e.valid_up_to());
                if let Ok(s) = std::str::from_utf8(valid) {
                    push_folded(&mut out, s);
                }
                let bad = e.error_len().unwrap_or(after.len());
                out.extend_from_slice(&after[..bad]);
                rest = &after[bad..];
            }
        }
    }
    out
}

fn push_folded(out: &mut Vec<u8>, s: &str) {
    let mut buf = [0u8; 4];
    for c in s.chars() {
        out.extend_from_slice(fold_rune(c).encode_utf8(&mut buf).as_bytes());
    }
}

/// Whether folding `text` cannot change its encoded length.
pub(crate) fn is_fold_safe(text: &str) -> bool {
    text.chars().all(|c| !UNSAFE_FOLD_ORBITS.contains_key(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_folds_to_lowercase() {
        assert_eq!(fold_str("Hello, World!"), "hello, world!");
    }

    #[test]
    fn cyrillic_folds_within_length() {
        assert_eq!(fold_str("Ё"), "ё");
        assert_eq!(fold_str("ПРИВЕТ"), "привет");
    }

    #[test]
    fn sigma_orbit_is_unified() {
        assert_eq!(fold_rune('Σ'), 'σ');
        assert_eq!(fold_rune('ς'), 'σ');
        assert_eq!(fold_rune('σ'), 'σ');
    }

    #[test]
    fn micro_sign_joins_mu() {
        assert_eq!(fold_rune('µ'), 'μ');
        assert_eq!(fold_rune('Μ'), 'μ');
    }

    #[test]
    fn length_changing_folds_stay_put() {
        // Kelvin sign, Angstrom sign, long s, dotted capital I.
        assert_eq!(fold_rune('\u{212A}'), '\u{212A}');
        assert_eq!(fold_rune('\u{212B}'), '\u{212B}');
        assert_eq!(fold_rune('ſ'), 'ſ');
        assert_eq!(fold_rune('İ'), 'İ');
    }

    #[test]
    fn fold_is_idempotent_on_safe_text() {
        for s in ["abcXYZ", "Ёжик", "Σσς", "中文"] {
            let once = fold_str(s);
            assert_eq!(fold_str(&once), once);
            assert_eq!(once.len(), s.len());
        }
    }

    #[test]
    fn unsafe_orbit_members_are_flagged() {
        assert!(!is_fold_safe("ß"));
        assert!(!is_fold_safe("ẞ"));
        assert!(!is_fold_safe("Åå"));
        assert!(is_fold_safe("ordinary text"));
        assert!(is_fold_safe("ſK"));
    }

    #[test]
    fn orbit_lists_contain_their_keys() {
        for (k, orbit) in UNSAFE_FOLD_ORBITS.entries() {
            assert!(orbit.chars().any(|c| c == *k), "{k:?} missing from orbit");
        }
    }

    #[test]
    fn fold_bytes_preserves_partial_sequences() {
        let s = "好A"; // 3-byte rune followed by ASCII
        let cut = &s.as_bytes()[1..]; // starts mid-rune
        let folded = fold_bytes(cut);
        assert_eq!(folded.len(), cut.len());
        assert_eq!(&folded[..2], &cut[..2]);
        assert_eq!(folded[2], b'a');
    }
}
