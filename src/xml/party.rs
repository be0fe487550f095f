//! `InitgPty`, `Dbtr` and `Cdtr` party identification.

use crate::core::identifiers::lei_valid;
use crate::core::text::{ID_MAX_LEN, sanitize, sanitize_non_empty};
use crate::core::{InitiatingParty, PartyAccount, PartyProfile, PaymentBatch, VariantStrategy};

use super::address::postal_address;
use super::tree::Element;

/// `GrpHdr/InitgPty`.
pub fn initiating_party(batch: &PaymentBatch, strategy: &VariantStrategy) -> Element {
    let profile = &strategy.initiating_party_profile;
    let party = &batch.initiating_party;
    Element::new("InitgPty")
        .child_opt(
            profile
                .name
                .then(|| Element::text("Nm", sanitize(&party.name, strategy.name_max_len))),
        )
        .child_opt(
            profile
                .address
                .then(|| postal_address(party.address.as_ref(), strategy))
                .flatten(),
        )
        .child_opt(organisation_id(party, profile))
}

/// `PmtInf/Dbtr`. The organisation identification is the initiating
/// company's own.
pub fn debtor(batch: &PaymentBatch, strategy: &VariantStrategy) -> Element {
    let profile = &strategy.debtor_profile;
    let debtor = &batch.debtor;
    Element::new("Dbtr")
        .child_opt(
            profile
                .name
                .then(|| Element::text("Nm", sanitize(&debtor.name, strategy.name_max_len))),
        )
        .child_opt(
            profile
                .address
                .then(|| postal_address(debtor.address.as_ref(), strategy))
                .flatten(),
        )
        .child_opt(organisation_id(&batch.initiating_party, profile))
}

/// `CdtTrfTxInf/Cdtr`: name (`/` when nothing printable is left) and
/// address when resolvable.
pub fn creditor(creditor: &PartyAccount, strategy: &VariantStrategy) -> Element {
    Element::new("Cdtr")
        .child(Element::text(
            "Nm",
            sanitize_non_empty(&creditor.name, strategy.name_max_len),
        ))
        .child_opt(postal_address(creditor.address.as_ref(), strategy))
}

/// `Id/OrgId` with `LEI` first and `Othr` in schema order
/// (`Id`, `SchmeNm`, `Issr`).
fn organisation_id(party: &InitiatingParty, profile: &PartyProfile) -> Option<Element> {
    if !profile.identification {
        return None;
    }

    let lei = party
        .lei
        .as_deref()
        .filter(|lei| profile.lei && lei_valid(lei))
        .map(|lei| Element::text("LEI", lei.trim().to_ascii_uppercase()));

    let othr = party.organization_id.as_ref().and_then(|org| {
        let id = sanitize(&org.id, ID_MAX_LEN);
        if id.is_empty() {
            return None;
        }
        let scheme = profile
            .scheme_code
            .map(str::to_string)
            .or_else(|| org.scheme_code.clone());
        let issuer = org
            .issuer
            .as_deref()
            .filter(|_| profile.issuer)
            .map(|issuer| sanitize(issuer, ID_MAX_LEN))
            .filter(|issuer| !issuer.is_empty());
        Some(
            Element::new("Othr")
                .child(Element::text("Id", id))
                .child_opt(scheme.map(|cd| Element::wrap("SchmeNm", Element::text("Cd", cd))))
                .child_opt(issuer.map(|issr| Element::text("Issr", issr))),
        )
    });

    if lei.is_none() && othr.is_none() {
        return None;
    }
    Some(Element::wrap(
        "Id",
        Element::new("OrgId").child_opt(lei).child_opt(othr),
    ))
}
