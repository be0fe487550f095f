use uuid::Uuid;

use super::amount::{round_amount, within_cap};
use super::countries::{is_known_country_code, is_sepa_country};
use super::error::{IssueKind, Pain001Error, ValidationError};
use super::identifiers::{bic_valid, iban_country, iban_valid};
use super::text::{ID_MAX_LEN, TOWN_MAX_LEN, sanitize};
use super::types::*;
use super::variant::{AddressLayout, VariantStrategy};

/// `NbOfTxs` is `Max15NumericText`.
pub const MAX_TRANSACTIONS: u64 = 999_999_999_999_999;

/// Check a batch against its variant's preconditions.
/// Returns all findings (not just the first); an empty list means the batch
/// can be generated.
pub fn validate_batch(batch: &PaymentBatch) -> Vec<ValidationError> {
    let strategy = batch.variant.strategy();
    let mut errors = Vec::new();

    if batch.payments.is_empty() {
        errors.push(ValidationError::invalid(
            "payments",
            "batch must contain at least one payment",
        ));
    }
    if batch.payments.len() as u64 > MAX_TRANSACTIONS {
        errors.push(ValidationError::invalid(
            "payments",
            format!(
                "{} payments do not fit into NbOfTxs (15 digits)",
                batch.payments.len()
            ),
        ));
    }

    validate_initiating_party(&batch.initiating_party, &strategy, &mut errors);
    validate_debtor(&batch.debtor, &strategy, &mut errors);

    for payment in &batch.payments {
        validate_payment(payment, batch, &strategy, &mut errors);
    }

    errors
}

/// Run [`validate_batch`] and turn findings into a typed error.
pub fn ensure_valid(batch: &PaymentBatch) -> Result<(), Pain001Error> {
    let issues = validate_batch(batch);
    if issues.is_empty() {
        return Ok(());
    }
    let variant = batch.variant;
    if issues.iter().any(|i| i.kind == IssueKind::Configuration) {
        Err(Pain001Error::Configuration { variant, issues })
    } else {
        Err(Pain001Error::Validation { variant, issues })
    }
}

/// Whether a party address produces `PstlAdr` under `strategy`: a known
/// country and, in the legacy layout, a city unless the variant accepts
/// country-only addresses.
pub fn has_resolvable_address(address: Option<&PostalAddress>, strategy: &VariantStrategy) -> bool {
    address.is_some_and(|a| {
        let has_city = a
            .city
            .as_deref()
            .is_some_and(|city| !sanitize(city, TOWN_MAX_LEN).is_empty());
        is_known_country_code(&a.country.trim().to_ascii_uppercase())
            && (strategy.address_layout == AddressLayout::Structured
                || strategy.address_country_only
                || has_city)
    })
}

fn validate_initiating_party(
    party: &InitiatingParty,
    strategy: &VariantStrategy,
    errors: &mut Vec<ValidationError>,
) {
    if strategy.initiating_party_profile.name
        && sanitize(&party.name, strategy.name_max_len).is_empty()
    {
        errors.push(ValidationError::configuration(
            "initiating_party.name",
            "initiating party name is empty after removing unsupported characters",
        ));
    }

    if party.is_company && !has_resolvable_address(party.address.as_ref(), strategy) {
        errors.push(ValidationError::configuration(
            "initiating_party.address.country",
            "company initiating party needs an address with a valid country and city",
        ));
    }

    if let Some(org) = &party.organization_id {
        if sanitize(&org.id, ID_MAX_LEN).is_empty() {
            errors.push(ValidationError::configuration(
                "initiating_party.organization_id",
                "organization identifier must not be empty after removing unsupported characters",
            ));
        }
    }

    if strategy.requires_org_id {
        let configured = party
            .organization_id
            .as_ref()
            .is_some_and(|org| !sanitize(&org.id, ID_MAX_LEN).is_empty() && org.issuer.is_some());
        if !configured {
            errors.push(ValidationError::configuration(
                "initiating_party.organization_id",
                format!(
                    "{} requires an organization identifier and its issuer",
                    strategy.variant
                ),
            ));
        }
    }
}

fn validate_debtor(
    debtor: &PartyAccount,
    strategy: &VariantStrategy,
    errors: &mut Vec<ValidationError>,
) {
    if sanitize(&debtor.name, strategy.name_max_len).is_empty() {
        errors.push(ValidationError::configuration(
            "debtor.name",
            "debtor name is empty after removing unsupported characters",
        ));
    }

    match &debtor.account {
        AccountIdentifier::Iban(iban) if iban.trim().is_empty() => {
            errors.push(ValidationError::configuration(
                "debtor.account",
                "debtor IBAN is missing",
            ));
        }
        AccountIdentifier::Iban(iban) => {
            if !iban_valid(iban) {
                errors.push(ValidationError::configuration(
                    "debtor.account",
                    format!("debtor IBAN '{iban}' is invalid"),
                ));
            } else if strategy.sepa && !iban_country(iban).is_some_and(|c| is_sepa_country(&c)) {
                errors.push(ValidationError::configuration(
                    "debtor.account",
                    format!("debtor IBAN '{iban}' is outside the SEPA area"),
                ));
            }
        }
        AccountIdentifier::Other(_) => {
            errors.push(ValidationError::configuration(
                "debtor.account",
                "debtor account must be an IBAN",
            ));
        }
    }

    if let Some(bic) = &debtor.bic {
        if !bic_valid(bic, strategy.strict_bic) {
            errors.push(ValidationError::configuration(
                "debtor.bic",
                format!("debtor BIC '{bic}' is invalid for {}", strategy.variant),
            ));
        }
    }

    if debtor.is_company && !has_resolvable_address(debtor.address.as_ref(), strategy) {
        errors.push(ValidationError::configuration(
            "debtor.address.country",
            "company debtor needs an address with a valid country and city",
        ));
    }
}

fn validate_payment(
    payment: &Payment,
    batch: &PaymentBatch,
    strategy: &VariantStrategy,
    errors: &mut Vec<ValidationError>,
) {
    let id = payment.id.as_str();
    let mut push = |error: ValidationError| errors.push(error.for_payment(id));

    let rounded = round_amount(payment.amount);
    if payment.amount.is_sign_negative() || payment.amount.is_zero() {
        push(ValidationError::invalid(
            "amount",
            format!("amount {} must be positive", payment.amount),
        ));
    } else if rounded.is_zero() {
        push(ValidationError::invalid(
            "amount",
            format!("amount {} rounds to 0.00", payment.amount),
        ));
    } else if !within_cap(rounded, strategy.variant) {
        push(ValidationError::invalid(
            "amount",
            format!(
                "amount {} exceeds the {} ceiling",
                payment.amount, strategy.variant
            ),
        ));
    }

    if !strategy.accepts_currency(&payment.currency) {
        let message = if strategy.sepa {
            format!("currency {} is not allowed, SEPA transfers must be in EUR", payment.currency)
        } else {
            format!(
                "currency {} is not supported by {}",
                payment.currency, strategy.variant
            )
        };
        push(ValidationError::invalid("currency", message));
    }

    let creditor = &payment.creditor;
    match &creditor.account {
        account if account.as_str().trim().is_empty() => {
            push(ValidationError::invalid(
                "creditor.account",
                "creditor has no bank account",
            ));
        }
        AccountIdentifier::Iban(iban) => {
            if !iban_valid(iban) {
                push(ValidationError::invalid(
                    "creditor.account",
                    format!("creditor IBAN '{iban}' is invalid"),
                ));
            } else if strategy.sepa && !iban_country(iban).is_some_and(|c| is_sepa_country(&c)) {
                push(ValidationError::invalid(
                    "creditor.account",
                    format!("creditor IBAN '{iban}' is outside the SEPA area"),
                ));
            }
        }
        AccountIdentifier::Other(account) => {
            if strategy.requires_creditor_iban() {
                push(ValidationError::invalid(
                    "creditor.account",
                    format!("account '{account}' is not an IBAN, required by {}", strategy.variant),
                ));
            }
        }
    }

    if !batch.options.skip_creditor_bic {
        if let Some(bic) = &creditor.bic {
            if !bic_valid(bic, strategy.strict_bic) {
                push(ValidationError::invalid(
                    "creditor.bic",
                    format!("creditor BIC '{bic}' is invalid for {}", strategy.variant),
                ));
            }
        }
    }

    if strategy.requires_uetr {
        match payment.uetr.as_deref().map(str::trim) {
            None | Some("") => push(ValidationError::invalid(
                "uetr",
                format!("{} requires a UETR on every payment", strategy.variant),
            )),
            Some(uetr) if Uuid::parse_str(uetr).is_err() => push(ValidationError::invalid(
                "uetr",
                format!("UETR '{uetr}' is not a UUID"),
            )),
            Some(_) => {}
        }
    }

    if creditor.is_company && !has_resolvable_address(creditor.address.as_ref(), strategy) {
        push(ValidationError::invalid(
            "creditor.address.country",
            "company creditor needs an address with a valid country and city",
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::builder::*;
    use crate::core::variant::Pain001Variant;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 20).unwrap()
    }

    fn creditor() -> PartyAccount {
        PartyAccountBuilder::iban("Fournisseur", "FR7630006000011234567890189")
            .bic("AGRIFRPP")
            .build()
    }

    fn batch(variant: Pain001Variant, payment: Payment) -> PaymentBatch {
        PaymentBatchBuilder::new(variant)
            .initiating_party(
                InitiatingPartyBuilder::new("ACME")
                    .organization_id("0123456789")
                    .issuer("KBO-BCE")
                    .address(PostalAddressBuilder::new("BE").city("Brussels").build())
                    .build(),
            )
            .debtor(PartyAccountBuilder::iban("ACME", "BE68539007547034").build())
            .add_payment(payment)
            .build_unchecked()
            .unwrap()
    }

    fn payment(amount: rust_decimal::Decimal, currency: &str) -> Payment {
        PaymentBuilder::new("p1", date(), amount, currency)
            .creditor(creditor())
            .build()
            .unwrap()
    }

    #[test]
    fn valid_sepa_batch() {
        let b = batch(Pain001Variant::Sepa03, payment(dec!(100), "EUR"));
        assert!(validate_batch(&b).is_empty(), "{:?}", validate_batch(&b));
    }

    #[test]
    fn sepa_rejects_non_eur() {
        let b = batch(Pain001Variant::Sepa03, payment(dec!(100), "CHF"));
        let errors = validate_batch(&b);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "currency");
        assert_eq!(errors[0].payment.as_deref(), Some("p1"));
    }

    #[test]
    fn amount_caps() {
        let b = batch(Pain001Variant::Sepa03, payment(dec!(1000000000), "EUR"));
        assert!(validate_batch(&b).iter().any(|e| e.field == "amount"));

        let b = batch(Pain001Variant::Swiss03Ch02, payment(dec!(1000000000), "EUR"));
        assert!(validate_batch(&b).is_empty());

        let b = batch(Pain001Variant::Sepa03, payment(dec!(0), "EUR"));
        assert!(validate_batch(&b).iter().any(|e| e.field == "amount"));
    }

    #[test]
    fn sepa09_requires_uetr() {
        let b = batch(Pain001Variant::Sepa09, payment(dec!(1), "EUR"));
        let err = ensure_valid(&b).unwrap_err();
        match err {
            Pain001Error::Validation { issues, .. } => {
                assert_eq!(issues[0].field, "uetr");
                assert_eq!(issues[0].payment.as_deref(), Some("p1"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn sepa09_rejects_malformed_uetr() {
        let p = PaymentBuilder::new("p1", date(), dec!(1), "EUR")
            .creditor(creditor())
            .uetr("not-a-uuid")
            .build()
            .unwrap();
        let errors = validate_batch(&batch(Pain001Variant::Sepa09, p));
        assert!(errors.iter().any(|e| e.field == "uetr"));
    }

    #[test]
    fn bic_pattern_depends_on_variant() {
        let p = PaymentBuilder::new("p1", date(), dec!(1), "EUR")
            .creditor(
                PartyAccountBuilder::iban("X", "FR7630006000011234567890189")
                    .bic("A1B2FRPP")
                    .build(),
            )
            .uetr("0f0e3b4e-7a8c-4d3b-9f7e-2b3c4d5e6f70")
            .build()
            .unwrap();
        let b03 = batch(Pain001Variant::Sepa03, p.clone());
        assert!(validate_batch(&b03).iter().any(|e| e.field == "creditor.bic"));
        let b09 = batch(Pain001Variant::Sepa09, p);
        assert!(validate_batch(&b09).is_empty());
    }

    #[test]
    fn skipped_bic_is_not_checked() {
        let p = PaymentBuilder::new("p1", date(), dec!(1), "EUR")
            .creditor(
                PartyAccountBuilder::iban("X", "FR7630006000011234567890189")
                    .bic("garbage")
                    .build(),
            )
            .build()
            .unwrap();
        let mut b = batch(Pain001Variant::Sepa03, p);
        assert!(!validate_batch(&b).is_empty());
        b.options.skip_creditor_bic = true;
        assert!(validate_batch(&b).is_empty());
    }

    #[test]
    fn debtor_must_have_iban() {
        let mut b = batch(Pain001Variant::Sepa03, payment(dec!(1), "EUR"));
        b.debtor.account = AccountIdentifier::Iban(String::new());
        let err = ensure_valid(&b).unwrap_err();
        assert!(matches!(err, Pain001Error::Configuration { .. }));
        assert!(err.to_string().contains("debtor IBAN is missing"));
    }

    #[test]
    fn swedish_requires_org_id_and_issuer() {
        let mut b = batch(Pain001Variant::Swedish03, payment(dec!(1), "SEK"));
        assert!(validate_batch(&b).is_empty());

        b.initiating_party.organization_id.as_mut().unwrap().issuer = None;
        let err = ensure_valid(&b).unwrap_err();
        assert!(matches!(err, Pain001Error::Configuration { .. }));
        assert_eq!(err.issues()[0].field, "initiating_party.organization_id");
    }

    #[test]
    fn unprintable_org_id_is_rejected() {
        let mut b = batch(Pain001Variant::Swedish03, payment(dec!(1), "SEK"));
        b.initiating_party.organization_id.as_mut().unwrap().id = "###".into();
        let errors = validate_batch(&b);
        assert!(!errors.is_empty());
        assert!(errors
            .iter()
            .all(|e| e.field == "initiating_party.organization_id"));
    }

    #[test]
    fn amounts_are_checked_after_rounding() {
        let b = batch(Pain001Variant::Sepa03, payment(dec!(0.004), "EUR"));
        assert_eq!(validate_batch(&b)[0].field, "amount");

        let b = batch(Pain001Variant::Sepa03, payment(dec!(999999999.995), "EUR"));
        assert_eq!(validate_batch(&b)[0].field, "amount");
    }

    #[test]
    fn companies_need_a_country() {
        let mut b = batch(Pain001Variant::Sepa03, payment(dec!(1), "EUR"));
        b.payments[0].creditor.is_company = true;
        let errors = validate_batch(&b);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "creditor.address.country");
        assert_eq!(errors[0].kind, IssueKind::Validation);

        b.initiating_party.is_company = true;
        b.initiating_party.address = None;
        let err = ensure_valid(&b).unwrap_err();
        assert!(matches!(err, Pain001Error::Configuration { .. }));
        assert_eq!(err.issues().len(), 2);
    }

    #[test]
    fn swiss_accepts_other_accounts() {
        let p = PaymentBuilder::new("p1", date(), dec!(10), "CHF")
            .creditor(PartyAccountBuilder::other("Post", "123-456-789 01").build())
            .build()
            .unwrap();
        assert!(validate_batch(&batch(Pain001Variant::Swiss03Ch02, p.clone())).is_empty());

        let mut p = p;
        p.currency = "EUR".into();
        let errors = validate_batch(&batch(Pain001Variant::Sepa03, p));
        assert!(errors.iter().any(|e| e.field == "creditor.account"));
    }

    #[test]
    fn empty_creditor_account() {
        let p = PaymentBuilder::new("p1", date(), dec!(10), "EUR")
            .creditor(PartyAccountBuilder::iban("X", "  ").build())
            .build()
            .unwrap();
        let errors = validate_batch(&batch(Pain001Variant::Sepa03, p));
        assert_eq!(errors[0].message, "creditor has no bank account");
    }
}
