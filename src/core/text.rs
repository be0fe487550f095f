//! Reduction of free text to the SEPA character set.
//!
//! Banks reject pain.001 files containing characters outside the "Latin"
//! subset agreed by the EPC: `a-z A-Z 0-9 / - ? : ( ) . , ' +` and space.
//! Accented letters are transliterated to their base letter, everything
//! else becomes a space.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Maximum length of `Nm` in the standard profile.
pub const NAME_MAX_LEN: usize = 70;
/// Maximum length of `Nm` in the short profile.
pub const SHORT_NAME_MAX_LEN: usize = 35;
/// Maximum length of `Ustrd`.
pub const REMITTANCE_MAX_LEN: usize = 140;
/// Maximum length of `MsgId`, `InstrId`, `Othr/Id` and `Issr`.
pub const ID_MAX_LEN: usize = 35;
/// Maximum length of `EndToEndId` and `PmtInfId` as emitted here.
pub const END_TO_END_MAX_LEN: usize = 30;
/// Maximum length of a single `AdrLine`.
pub const ADDRESS_LINE_MAX_LEN: usize = 70;
/// Maximum length of `TwnNm`.
pub const TOWN_MAX_LEN: usize = 35;

/// Whether `c` belongs to the SEPA character set.
pub fn is_sepa_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '/' | '-' | '?' | ':' | '(' | ')' | '.' | ',' | '\'' | '+' | ' ')
}

/// Reduce `text` to the SEPA character set and cut it to `max_len` characters.
///
/// Leading slashes are removed, whitespace runs collapse to one space and the
/// result is trimmed. The operation is idempotent.
///
/// ```
/// use pain001::core::text::sanitize;
///
/// assert_eq!(sanitize("/Überweisung für Rechnung #42", 35), "Uberweisung fur Rechnung 42");
/// assert_eq!(sanitize("Straße", 10), "Strasse");
/// ```
pub fn sanitize(text: &str, max_len: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.nfd() {
        if is_combining_mark(c) {
            continue;
        }
        let mapped = transliterate(c);
        for m in mapped.chars() {
            if m.is_whitespace() || !is_sepa_char(m) {
                pending_space = true;
                continue;
            }
            // Leading slashes and spaces never survive.
            if out.is_empty() && m == '/' {
                pending_space = false;
                continue;
            }
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(m);
        }
    }

    if out.len() > max_len {
        // Only ASCII remains, so byte and char positions coincide.
        out.truncate(max_len);
        let trimmed_len = out.trim_end().len();
        out.truncate(trimmed_len);
    }
    out
}

/// Like [`sanitize`], but returns `"/"` when nothing is left. Used for tags
/// that must not be empty.
pub fn sanitize_non_empty(text: &str, max_len: usize) -> String {
    let s = sanitize(text, max_len);
    if s.is_empty() { "/".to_string() } else { s }
}

/// The rightmost `n` characters of `s`, without the slashes and spaces the
/// cut may leave at the front.
pub fn rightmost(s: &str, n: usize) -> &str {
    let count = s.chars().count();
    let tail = if count <= n {
        s
    } else {
        match s.char_indices().nth(count - n) {
            Some((idx, _)) => &s[idx..],
            None => "",
        }
    };
    tail.trim_start_matches(['/', ' '])
}

fn transliterate(c: char) -> std::borrow::Cow<'static, str> {
    let s = match c {
        'ß' => "ss",
        'Æ' => "AE",
        'æ' => "ae",
        'Œ' => "OE",
        'œ' => "oe",
        'Ø' => "O",
        'ø' => "o",
        'Đ' | 'Ð' => "D",
        'đ' | 'ð' => "d",
        'Ł' => "L",
        'ł' => "l",
        'Þ' => "TH",
        'þ' => "th",
        '&' => "+",
        '‘' | '’' | '`' | '´' => "'",
        '–' | '—' | '_' => "-",
        _ => return std::borrow::Cow::Owned(c.to_string()),
    };
    std::borrow::Cow::Borrowed(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_diacritics() {
        assert_eq!(sanitize("Crème brûlée à Genève", 70), "Creme brulee a Geneve");
        assert_eq!(sanitize("Åsa Öberg", 70), "Asa Oberg");
        assert_eq!(sanitize("Łódź", 70), "Lodz");
    }

    #[test]
    fn replaces_forbidden_characters() {
        assert_eq!(sanitize("Invoice #123 @ 50%", 70), "Invoice 123 50");
        assert_eq!(sanitize("a\tb\n\nc", 70), "a b c");
        assert_eq!(sanitize("Smith & Sons", 70), "Smith + Sons");
    }

    #[test]
    fn removes_leading_slashes() {
        assert_eq!(sanitize("/abc", 70), "abc");
        assert_eq!(sanitize("// /abc/def", 70), "abc/def");
        assert_eq!(sanitize("  / x", 70), "x");
    }

    #[test]
    fn truncates_after_sanitizing() {
        assert_eq!(sanitize("Ünïcödé", 3), "Uni");
        assert_eq!(sanitize("abc def", 4), "abc");
        assert_eq!(sanitize("abcdef", 0), "");
    }

    #[test]
    fn idempotent_on_samples() {
        for input in [
            "  //Zürich   Hauptbahnhof ",
            "Müller & Söhne GmbH, Köln",
            "€ 100,- für \"Miete\"",
            "abc  def  ghi jkl",
        ] {
            for n in [0, 1, 5, 12, 35, 140] {
                let once = sanitize(input, n);
                assert_eq!(sanitize(&once, n), once, "input {input:?} n {n}");
                assert!(once.chars().count() <= n);
            }
        }
    }

    #[test]
    fn non_empty_fallback() {
        assert_eq!(sanitize_non_empty("###", 70), "/");
        assert_eq!(sanitize_non_empty("", 70), "/");
        assert_eq!(sanitize_non_empty("Bob", 70), "Bob");
    }

    #[test]
    fn rightmost_chars() {
        assert_eq!(rightmost("abcdef", 3), "def");
        assert_eq!(rightmost("abc", 30), "abc");
        assert_eq!(rightmost("", 5), "");
        assert_eq!(rightmost("INV2024/ABC", 4), "ABC");
        assert_eq!(rightmost("ab / cd", 4), "cd");
        assert_eq!(rightmost("//", 5), "");
    }
}
