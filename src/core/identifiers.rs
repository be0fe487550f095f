//! IBAN, BIC, LEI and creditor-reference validation.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static BIC_PRE_09: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]{6}[A-Z2-9][A-NP-Z0-9]([A-Z0-9]{3})?$").expect("valid BIC regex")
});

static BIC_09: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z0-9]{4}[A-Z]{2}[A-Z0-9]{2}([A-Z0-9]{3})?$").expect("valid BICFI regex")
});

static LEI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9]{18}[0-9]{2}$").expect("valid LEI regex"));

static BBA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\+{3}|\*{3})?(\d{3})/?(\d{4})/?(\d{5})(?:\+{3}|\*{3})?$")
        .expect("valid BBA regex")
});

static ISO11649: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^RF\d{2}[A-Z0-9]{1,21}$").expect("valid RF regex"));

/// Strip all whitespace and uppercase.
pub fn compact(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase()
}

/// Canonical IBAN form: no spaces, uppercase.
pub fn normalize_iban(iban: &str) -> String {
    compact(iban)
}

/// The two-letter country prefix of an IBAN, if present.
pub fn iban_country(iban: &str) -> Option<String> {
    let iban = normalize_iban(iban);
    let prefix = iban.get(..2)?;
    prefix
        .chars()
        .all(|c| c.is_ascii_alphabetic())
        .then(|| prefix.to_string())
}

/// Expected IBAN length for a country, per the SWIFT IBAN registry.
pub fn iban_length(country: &str) -> Option<usize> {
    IBAN_LENGTHS
        .binary_search_by(|(code, _)| (*code).cmp(country))
        .ok()
        .map(|idx| IBAN_LENGTHS[idx].1)
}

/// Validate an IBAN: known country, registry length and mod-97 check = 1.
///
/// ```
/// use pain001::core::identifiers::iban_valid;
///
/// assert!(iban_valid("BE68 5390 0754 7034"));
/// assert!(!iban_valid("BE68 5390 0754 7035"));
/// ```
pub fn iban_valid(iban: &str) -> bool {
    let iban = normalize_iban(iban);
    if iban.len() < 5 || !iban.is_ascii() {
        return false;
    }

    let country = &iban[..2];
    let check_digits = &iban[2..4];
    if !country.chars().all(|c| c.is_ascii_uppercase())
        || !check_digits.chars().all(|c| c.is_ascii_digit())
        || !iban[4..].chars().all(|c| c.is_ascii_alphanumeric())
    {
        return false;
    }

    if iban_length(country) != Some(iban.len()) {
        return false;
    }

    // Move first 4 characters to the end
    let rearranged = format!("{}{}", &iban[4..], &iban[..4]);
    mod97(&rearranged) == Some(1)
}

/// Whether `iban` is a Swiss/Liechtenstein QR-IBAN (IID in 30000–31999).
pub fn is_qr_iban(iban: &str) -> bool {
    let iban = normalize_iban(iban);
    if !(iban.starts_with("CH") || iban.starts_with("LI")) || iban.len() < 9 {
        return false;
    }
    let iid = &iban[4..9];
    if !iid.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    iid.parse::<u32>()
        .map(|n| (30000..=31999).contains(&n))
        .unwrap_or(false)
}

/// Validate a BIC. `strict_09` selects the pain.001.001.09 `BICFIDec2014`
/// pattern, which allows digits in the institution code.
pub fn bic_valid(bic: &str, strict_09: bool) -> bool {
    let bic = compact(bic);
    if bic.len() != 8 && bic.len() != 11 {
        return false;
    }
    if strict_09 {
        BIC_09.is_match(&bic)
    } else {
        BIC_PRE_09.is_match(&bic)
    }
}

/// Validate an ISO 17442 LEI by pattern: 18 alphanumerics and 2 digits.
pub fn lei_valid(lei: &str) -> bool {
    LEI.is_match(&compact(lei))
}

/// Structured creditor reference families recognized in remittance memos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferenceKind {
    /// Belgian structured communication (`+++123/4567/89012+++`).
    Bba,
    /// Swiss QR reference paired with a QR-IBAN.
    Qrr,
    /// Finnish national reference (7-3-1 check digit).
    Finnish,
    /// Norwegian KID / Swedish OCR (MOD-10).
    NorwegianSwedish,
    /// ISO 11649 creditor reference (`RF..`).
    Iso11649,
    /// Anything else.
    Unstructured,
}

/// Decide whether `reference` is a structured creditor reference.
///
/// Checks run in a fixed order: BBA, QRR, Finnish, Norwegian/Swedish,
/// ISO 11649. A QR-IBAN always yields [`ReferenceKind::Qrr`]; the reference
/// itself is not checked against the IBAN.
pub fn classify_structured_reference(
    reference: &str,
    partner_country: Option<&str>,
    creditor_iban: Option<&str>,
) -> ReferenceKind {
    let country = partner_country.map(|c| c.trim().to_ascii_uppercase());
    let country = country.as_deref();
    let compacted = compact(reference);

    if country == Some("BE") && bba_valid(reference) {
        return ReferenceKind::Bba;
    }
    if creditor_iban.is_some_and(is_qr_iban) {
        return ReferenceKind::Qrr;
    }
    if country == Some("FI") && finnish_reference_valid(&compacted) {
        return ReferenceKind::Finnish;
    }
    if matches!(country, Some("NO") | Some("SE")) && mod10_reference_valid(&compacted) {
        return ReferenceKind::NorwegianSwedish;
    }
    if iso11649_valid(&compacted) {
        return ReferenceKind::Iso11649;
    }
    ReferenceKind::Unstructured
}

/// The value to write into `CdtrRefInf/Ref` for a classified reference.
///
/// BBA references are reduced to their 12 digits, QRR references are
/// left-padded with zeros to 27 digits and must be numeric. Returns `None`
/// when the reference cannot be expressed in the given kind.
pub fn structured_reference_value(kind: ReferenceKind, reference: &str) -> Option<String> {
    let compacted = compact(reference);
    match kind {
        ReferenceKind::Bba => {
            let caps = BBA.captures(&compacted)?;
            Some(format!("{}{}{}", &caps[1], &caps[2], &caps[3]))
        }
        ReferenceKind::Qrr => {
            if compacted.is_empty()
                || compacted.len() > 27
                || !compacted.chars().all(|c| c.is_ascii_digit())
            {
                return None;
            }
            Some(format!("{compacted:0>27}"))
        }
        ReferenceKind::Finnish | ReferenceKind::NorwegianSwedish | ReferenceKind::Iso11649 => {
            Some(compacted)
        }
        ReferenceKind::Unstructured => None,
    }
}

/// Belgian structured communication: 12 digits, first ten mod 97 (97 for 0)
/// equal to the last two.
pub fn bba_valid(reference: &str) -> bool {
    let compacted = compact(reference);
    let Some(caps) = BBA.captures(&compacted) else {
        return false;
    };
    let digits = format!("{}{}{}", &caps[1], &caps[2], &caps[3]);
    let (Ok(base), Ok(check)) = (digits[..10].parse::<u64>(), digits[10..].parse::<u64>()) else {
        return false;
    };
    let expected = match base % 97 {
        0 => 97,
        r => r,
    };
    expected == check
}

/// Finnish reference: 4–20 digits, last digit computed with weights 7, 3, 1
/// from the right.
pub fn finnish_reference_valid(reference: &str) -> bool {
    let digits = compact(reference);
    if !(4..=20).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    let (base, check) = digits.split_at(digits.len() - 1);
    let weights = [7u32, 3, 1];
    let sum: u32 = base
        .chars()
        .rev()
        .zip(weights.iter().cycle())
        .filter_map(|(c, w)| c.to_digit(10).map(|d| d * w))
        .sum();
    let expected = (10 - sum % 10) % 10;
    check.parse::<u32>().ok() == Some(expected)
}

/// Norwegian KID / Swedish OCR: 2–25 digits with a valid MOD-10 (Luhn)
/// check digit.
pub fn mod10_reference_valid(reference: &str) -> bool {
    let digits = compact(reference);
    if !(2..=25).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    let sum: u32 = digits
        .chars()
        .rev()
        .enumerate()
        .filter_map(|(i, c)| c.to_digit(10).map(|d| (i, d)))
        .map(|(i, d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

/// ISO 11649 creditor reference: `RF`, two check digits, up to 21
/// alphanumerics, mod-97 check = 1.
pub fn iso11649_valid(reference: &str) -> bool {
    let reference = compact(reference);
    if !ISO11649.is_match(&reference) {
        return false;
    }
    let rearranged = format!("{}{}", &reference[4..], &reference[..4]);
    mod97(&rearranged) == Some(1)
}

/// Mod 97 of the numeric expansion of an alphanumeric string (A=10 … Z=35),
/// computed piecewise because the number exceeds u128 for long inputs.
fn mod97(s: &str) -> Option<u32> {
    let mut remainder: u32 = 0;
    for c in s.chars() {
        let value = c.to_digit(36)?;
        remainder = if value < 10 {
            (remainder * 10 + value) % 97
        } else {
            (remainder * 100 + value) % 97
        };
    }
    Some(remainder)
}

/// IBAN lengths by country (SWIFT IBAN registry). Sorted for binary search.
static IBAN_LENGTHS: &[(&str, usize)] = &[
    ("AD", 24),
    ("AE", 23),
    ("AL", 28),
    ("AT", 20),
    ("AZ", 28),
    ("BA", 20),
    ("BE", 16),
    ("BG", 22),
    ("BH", 22),
    ("BI", 27),
    ("BR", 29),
    ("BY", 28),
    ("CH", 21),
    ("CR", 22),
    ("CY", 28),
    ("CZ", 24),
    ("DE", 22),
    ("DJ", 27),
    ("DK", 18),
    ("DO", 28),
    ("EE", 20),
    ("EG", 29),
    ("ES", 24),
    ("FI", 18),
    ("FK", 18),
    ("FO", 18),
    ("FR", 27),
    ("GB", 22),
    ("GE", 22),
    ("GI", 23),
    ("GL", 18),
    ("GR", 27),
    ("GT", 28),
    ("HR", 21),
    ("HU", 28),
    ("IE", 22),
    ("IL", 23),
    ("IQ", 23),
    ("IS", 26),
    ("IT", 27),
    ("JO", 30),
    ("KW", 30),
    ("KZ", 20),
    ("LB", 28),
    ("LC", 32),
    ("LI", 21),
    ("LT", 20),
    ("LU", 20),
    ("LV", 21),
    ("LY", 25),
    ("MC", 27),
    ("MD", 24),
    ("ME", 22),
    ("MK", 19),
    ("MN", 20),
    ("MR", 27),
    ("MT", 31),
    ("MU", 30),
    ("NI", 28),
    ("NL", 18),
    ("NO", 15),
    ("OM", 23),
    ("PK", 24),
    ("PL", 28),
    ("PS", 29),
    ("PT", 25),
    ("QA", 29),
    ("RO", 24),
    ("RS", 22),
    ("RU", 33),
    ("SA", 24),
    ("SC", 31),
    ("SD", 18),
    ("SE", 24),
    ("SI", 19),
    ("SK", 24),
    ("SM", 27),
    ("SO", 23),
    ("ST", 25),
    ("SV", 28),
    ("TL", 23),
    ("TN", 24),
    ("TR", 26),
    ("UA", 29),
    ("VA", 22),
    ("VG", 24),
    ("XK", 20),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_ibans() {
        for iban in [
            "BE68539007547034",
            "FR7630006000011234567890189",
            "DE89 3704 0044 0532 0130 00",
            "ch9300762011623852957",
            "SE4550000000058398257466",
            "AT611904300234573201",
            "NO9386011117947",
            "NL91ABNA0417164300",
            "LI21088100002324013AA",
        ] {
            assert!(iban_valid(iban), "{iban} should be valid");
        }
    }

    #[test]
    fn invalid_ibans() {
        assert!(!iban_valid("DE89370400440532013001")); // checksum
        assert!(!iban_valid("DE8937040044053201300")); // length
        assert!(!iban_valid("XX89370400440532013000")); // country
        assert!(!iban_valid("DE89-3704-0044-0532-0130-00"));
        assert!(!iban_valid(""));
    }

    #[test]
    fn iban_country_prefix() {
        assert_eq!(iban_country("be68 5390"), Some("BE".to_string()));
        assert_eq!(iban_country("12"), None);
        assert_eq!(iban_country("B"), None);
    }

    #[test]
    fn qr_iban_detection() {
        assert!(is_qr_iban("CH44 3199 9123 0008 8901 2"));
        assert!(!is_qr_iban("CH9300762011623852957"));
        assert!(!is_qr_iban("DE44319991230008890120"));
        assert!(!is_qr_iban("CH44"));
    }

    #[test]
    fn bic_patterns() {
        assert!(bic_valid("AGRIFRPP", false));
        assert!(bic_valid("GEBABEBB", false));
        assert!(bic_valid("COBADEFFXXX", false));
        assert!(bic_valid("cobadeff xxx", false));
        assert!(!bic_valid("AGRIFRP", false));
        assert!(!bic_valid("AGRIFR1P", false)); // location 1st char may not be 0/1
        assert!(!bic_valid("AGRIFRPO", false)); // location 2nd char may not be O
        assert!(!bic_valid("A1B2FRPP", false));
        assert!(bic_valid("A1B2FRPP", true));
        assert!(!bic_valid("A1B2F1PP", true));
    }

    #[test]
    fn lei_pattern() {
        assert!(lei_valid("529900T8BM49AURSDO55"));
        assert!(!lei_valid("529900T8BM49AURSDO5A"));
        assert!(!lei_valid("529900T8BM49AURSDO5"));
    }

    #[test]
    fn belgian_reference() {
        assert!(bba_valid("+++090/9337/55493+++"));
        assert!(bba_valid("***090/9337/55493***"));
        assert!(bba_valid("090933755493"));
        assert!(!bba_valid("+++090/9337/55494+++"));
        assert_eq!(
            structured_reference_value(ReferenceKind::Bba, "+++090/9337/55493+++").as_deref(),
            Some("090933755493")
        );
    }

    #[test]
    fn finnish_reference() {
        assert!(finnish_reference_valid("1232"));
        assert!(finnish_reference_valid("12345614"));
        assert!(!finnish_reference_valid("1233"));
        assert!(!finnish_reference_valid("12"));
    }

    #[test]
    fn mod10_reference() {
        assert!(mod10_reference_valid("12345674"));
        assert!(mod10_reference_valid("79927398713"));
        assert!(!mod10_reference_valid("4992739871"));
    }

    #[test]
    fn iso11649_reference() {
        assert!(iso11649_valid("RF18539007547034"));
        assert!(iso11649_valid("RF18 5390 0754 7034"));
        assert!(iso11649_valid("RF712348231"));
        assert!(!iso11649_valid("RF19539007547034"));
        assert!(!iso11649_valid("XX18539007547034"));
    }

    #[test]
    fn classification_order() {
        assert_eq!(
            classify_structured_reference("+++090/9337/55493+++", Some("BE"), None),
            ReferenceKind::Bba
        );
        // BBA only for Belgian partners
        assert_eq!(
            classify_structured_reference("+++090/9337/55493+++", Some("FR"), None),
            ReferenceKind::Unstructured
        );
        assert_eq!(
            classify_structured_reference("123", Some("CH"), Some("CH4431999123000889012")),
            ReferenceKind::Qrr
        );
        assert_eq!(
            classify_structured_reference("1232", Some("fi"), None),
            ReferenceKind::Finnish
        );
        assert_eq!(
            classify_structured_reference("12345674", Some("NO"), None),
            ReferenceKind::NorwegianSwedish
        );
        assert_eq!(
            classify_structured_reference("RF18539007547034", Some("DE"), None),
            ReferenceKind::Iso11649
        );
        assert_eq!(
            classify_structured_reference("Invoice 123", Some("DE"), None),
            ReferenceKind::Unstructured
        );
    }

    #[test]
    fn qrr_value_is_padded() {
        assert_eq!(
            structured_reference_value(ReferenceKind::Qrr, "3139471430009017").as_deref(),
            Some("000000000003139471430009017")
        );
        assert_eq!(structured_reference_value(ReferenceKind::Qrr, "ABC"), None);
        assert_eq!(
            structured_reference_value(ReferenceKind::Qrr, &"1".repeat(28)),
            None
        );
    }

    #[test]
    fn iban_table_is_sorted() {
        for window in IBAN_LENGTHS.windows(2) {
            assert!(
                window[0].0 < window[1].0,
                "IBAN table not sorted: {} >= {}",
                window[0].0,
                window[1].0
            );
        }
    }
}
