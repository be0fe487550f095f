//! `PstlAdr` in the legacy (`AdrLine`) or structured layout.

use crate::core::text::{ADDRESS_LINE_MAX_LEN, TOWN_MAX_LEN, sanitize};
use crate::core::{AddressLayout, PostalAddress, VariantStrategy, has_resolvable_address};

use super::tree::Element;

const STREET_MAX_LEN: usize = 70;
const POST_CODE_MAX_LEN: usize = 16;

/// Build `PstlAdr`, or `None` when [`has_resolvable_address`] rejects the
/// address.
pub fn postal_address(address: Option<&PostalAddress>, strategy: &VariantStrategy) -> Option<Element> {
    if !has_resolvable_address(address, strategy) {
        return None;
    }
    let address = address?;
    let country = address.country.trim().to_ascii_uppercase();

    let street = clean(address.street.as_deref(), STREET_MAX_LEN);
    let zip = clean(address.zip.as_deref(), POST_CODE_MAX_LEN);
    let city = clean(address.city.as_deref(), TOWN_MAX_LEN);

    match strategy.address_layout {
        AddressLayout::Structured => Some(
            Element::new("PstlAdr")
                .child_opt(street.map(|s| Element::text("StrtNm", s)))
                .child_opt(zip.map(|z| Element::text("PstCd", z)))
                .child_opt(city.map(|c| Element::text("TwnNm", c)))
                .child(Element::text("Ctry", country)),
        ),
        AddressLayout::Legacy => {
            let town_line = match (zip, city) {
                (Some(z), Some(c)) => Some(format!("{z} {c}")),
                (Some(z), None) => Some(z),
                (None, Some(c)) => Some(c),
                (None, None) => None,
            };
            Some(
                Element::new("PstlAdr")
                    .child(Element::text("Ctry", country))
                    .children(
                        [street, town_line]
                            .into_iter()
                            .flatten()
                            .map(|line| sanitize(&line, ADDRESS_LINE_MAX_LEN))
                            .map(|line| Element::text("AdrLine", line)),
                    ),
            )
        }
    }
}

fn clean(value: Option<&str>, max_len: usize) -> Option<String> {
    value
        .map(|v| sanitize(v, max_len))
        .filter(|v| !v.is_empty())
}
