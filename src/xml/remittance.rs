//! `RmtInf`: structured creditor reference or unstructured memo.

use crate::core::identifiers::{
    ReferenceKind, classify_structured_reference, structured_reference_value,
};
use crate::core::text::{REMITTANCE_MAX_LEN, sanitize};
use crate::core::VariantStrategy;

use super::tree::Element;

/// Marker banks use to recognize salary transfers in `Ustrd`.
pub const SALARY_PREFIX: &str = "/A/ ";

/// Remittance information for one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Remittance {
    Unstructured(String),
    Structured(StructuredReference),
}

/// Content of `Strd/CdtrRefInf`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredReference {
    pub kind: ReferenceKind,
    /// `Tp/CdOrPrtry/Cd`.
    pub code: Option<&'static str>,
    /// `Tp/CdOrPrtry/Prtry`.
    pub proprietary: Option<&'static str>,
    /// `Tp/Issr`.
    pub issuer: Option<&'static str>,
    /// `Ref`.
    pub reference: String,
}

/// Why a detected reference was written as free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Degradation {
    pub kind: ReferenceKind,
    pub reason: String,
}

/// Inputs of the classification for one payment.
pub struct RemittanceInput<'a> {
    pub memo: &'a str,
    pub creditor_country: Option<&'a str>,
    pub creditor_iban: Option<&'a str>,
    pub salary_payment: bool,
}

/// Classify a memo. Returns `None` when nothing is left to write, and a
/// [`Degradation`] when a structured reference had to fall back to text.
pub fn classify(
    input: &RemittanceInput<'_>,
    strategy: &VariantStrategy,
) -> (Option<Remittance>, Option<Degradation>) {
    let kind = classify_structured_reference(
        input.memo,
        input.creditor_country,
        input.creditor_iban,
    );

    let degradation = match kind {
        ReferenceKind::Unstructured => None,
        ReferenceKind::Qrr if !strategy.qrr_allowed => Some(Degradation {
            kind,
            reason: format!("QRR references cannot be emitted by {}", strategy.variant),
        }),
        _ => match structured_reference_value(kind, input.memo) {
            Some(reference) => {
                return (Some(Remittance::Structured(structured(kind, reference))), None);
            }
            None => Some(Degradation {
                kind,
                reason: format!("'{}' is not a valid {kind:?} reference", input.memo.trim()),
            }),
        },
    };

    (unstructured(input, strategy), degradation)
}

fn structured(kind: ReferenceKind, reference: String) -> StructuredReference {
    let (code, proprietary, issuer) = match kind {
        ReferenceKind::Bba => (Some("SCOR"), None, Some("BBA")),
        ReferenceKind::Qrr => (None, Some("QRR"), None),
        ReferenceKind::Iso11649 => (Some("SCOR"), None, Some("ISO")),
        ReferenceKind::Finnish | ReferenceKind::NorwegianSwedish | ReferenceKind::Unstructured => {
            (Some("SCOR"), None, None)
        }
    };
    StructuredReference {
        kind,
        code,
        proprietary,
        issuer,
        reference,
    }
}

fn unstructured(input: &RemittanceInput<'_>, strategy: &VariantStrategy) -> Option<Remittance> {
    if input.salary_payment && strategy.sepa {
        let text = sanitize(input.memo, REMITTANCE_MAX_LEN - SALARY_PREFIX.len());
        if text.is_empty() {
            return None;
        }
        return Some(Remittance::Unstructured(format!("{SALARY_PREFIX}{text}")));
    }
    let text = sanitize(input.memo, REMITTANCE_MAX_LEN);
    (!text.is_empty()).then_some(Remittance::Unstructured(text))
}

impl Remittance {
    /// The `RmtInf` element.
    pub fn to_element(&self) -> Element {
        match self {
            Self::Unstructured(text) => Element::wrap("RmtInf", Element::text("Ustrd", text)),
            Self::Structured(s) => {
                let cd_or_prtry = match (s.code, s.proprietary) {
                    (_, Some(prtry)) => Element::text("Prtry", prtry),
                    (code, None) => Element::text("Cd", code.unwrap_or("SCOR")),
                };
                let tp = Element::new("Tp")
                    .child(Element::wrap("CdOrPrtry", cd_or_prtry))
                    .child_opt(s.issuer.map(|i| Element::text("Issr", i)));
                let cdtr_ref_inf = Element::new("CdtrRefInf")
                    .child(tp)
                    .child(Element::text("Ref", &s.reference));
                Element::wrap("RmtInf", Element::wrap("Strd", cdtr_ref_inf))
            }
        }
    }
}
